pub mod backend;
pub mod logging;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";
pub const ARG_PUBLIC_URL: &str = "public-url";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("cvperfect")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("3000")
                .env("CVPERFECT_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_PUBLIC_URL)
                .long("public-url")
                .help("Externally visible base URL, used to build sign-in callback URLs")
                .env("CVPERFECT_PUBLIC_URL")
                .default_value("http://localhost:3000")
                .value_parser(backend::validator_http_url()),
        );

    let command = backend::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use url::Url;

    const ENV_VARS: [&str; 6] = [
        "CVPERFECT_PORT",
        "CVPERFECT_PUBLIC_URL",
        "CVPERFECT_BACKEND_URL",
        "CVPERFECT_BACKEND_TIMEOUT",
        "CVPERFECT_SESSION_COOKIE",
        "CVPERFECT_LOG_LEVEL",
    ];

    fn cleared() -> Vec<(&'static str, Option<&'static str>)> {
        ENV_VARS.iter().map(|name| (*name, None)).collect()
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "cvperfect");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(cleared(), || {
            let matches = new().get_matches_from(vec![
                "cvperfect",
                "--backend-url",
                "http://127.0.0.1:8000",
            ]);

            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(3000));
            assert_eq!(
                matches.get_one::<Url>(ARG_PUBLIC_URL).map(Url::as_str),
                Some("http://localhost:3000/")
            );
            assert_eq!(
                matches
                    .get_one::<u64>(backend::ARG_BACKEND_TIMEOUT)
                    .copied(),
                Some(10)
            );
            assert_eq!(
                matches
                    .get_one::<String>(backend::ARG_SESSION_COOKIE)
                    .cloned(),
                Some("auth_token".to_string())
            );
            assert_eq!(
                matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                Some(0)
            );
        });
    }

    #[test]
    fn test_backend_url_required() {
        temp_env::with_vars(cleared(), || {
            let result = new().try_get_matches_from(vec!["cvperfect"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_rejects_non_http_url() {
        temp_env::with_vars(cleared(), || {
            let result =
                new().try_get_matches_from(vec!["cvperfect", "--backend-url", "ftp://files.tld"]);
            assert!(result.is_err());

            let result =
                new().try_get_matches_from(vec!["cvperfect", "--backend-url", "not a url"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("CVPERFECT_PORT", Some("8443")),
                ("CVPERFECT_PUBLIC_URL", Some("https://app.cvperfect.dev")),
                ("CVPERFECT_BACKEND_URL", Some("https://api.cvperfect.dev")),
                ("CVPERFECT_BACKEND_TIMEOUT", Some("30")),
                ("CVPERFECT_SESSION_COOKIE", Some("sid")),
                ("CVPERFECT_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["cvperfect"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8443));
                assert_eq!(
                    matches.get_one::<Url>(ARG_PUBLIC_URL).map(Url::as_str),
                    Some("https://app.cvperfect.dev/")
                );
                assert_eq!(
                    matches
                        .get_one::<Url>(backend::ARG_BACKEND_URL)
                        .map(Url::as_str),
                    Some("https://api.cvperfect.dev/")
                );
                assert_eq!(
                    matches
                        .get_one::<u64>(backend::ARG_BACKEND_TIMEOUT)
                        .copied(),
                    Some(30)
                );
                assert_eq!(
                    matches
                        .get_one::<String>(backend::ARG_SESSION_COOKIE)
                        .cloned(),
                    Some("sid".to_string())
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("CVPERFECT_LOG_LEVEL", Some(level)),
                    ("CVPERFECT_BACKEND_URL", Some("http://127.0.0.1:8000")),
                ],
                || {
                    let matches = new().get_matches_from(vec!["cvperfect"]);
                    assert_eq!(
                        matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                        u8::try_from(index).ok()
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars([("CVPERFECT_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "cvperfect".to_string(),
                    "--backend-url".to_string(),
                    "http://127.0.0.1:8000".to_string(),
                ];

                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}
