//! Map validated CLI arguments to the action the binary runs.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{self, backend};
use anyhow::{Context, Result};
use url::Url;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches
        .get_one::<u16>(commands::ARG_PORT)
        .copied()
        .unwrap_or(3000);
    let public_url = matches
        .get_one::<Url>(commands::ARG_PUBLIC_URL)
        .cloned()
        .context("missing required argument: --public-url")?;

    let backend_opts = backend::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        public_url,
        backend_url: backend_opts.url,
        backend_timeout: backend_opts.timeout,
        session_cookie: backend_opts.session_cookie,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn maps_arguments_to_server_action() {
        temp_env::with_vars(
            [
                ("CVPERFECT_PORT", None::<&str>),
                ("CVPERFECT_PUBLIC_URL", None),
                ("CVPERFECT_BACKEND_TIMEOUT", None),
                ("CVPERFECT_SESSION_COOKIE", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "cvperfect",
                    "--port",
                    "4000",
                    "--backend-url",
                    "http://127.0.0.1:8000",
                    "--backend-timeout",
                    "5",
                ]);

                let Action::Server(args) = handler(&matches).unwrap();
                assert_eq!(args.port, 4000);
                assert_eq!(args.backend_url.as_str(), "http://127.0.0.1:8000/");
                assert_eq!(args.public_url.as_str(), "http://localhost:3000/");
                assert_eq!(args.backend_timeout, Duration::from_secs(5));
                assert_eq!(args.session_cookie, "auth_token");
            },
        );
    }
}
