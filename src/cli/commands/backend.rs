use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, builder::ValueParser};
use std::time::Duration;
use url::Url;

pub const ARG_BACKEND_URL: &str = "backend-url";
pub const ARG_BACKEND_TIMEOUT: &str = "backend-timeout";
pub const ARG_SESSION_COOKIE: &str = "session-cookie";

#[must_use]
pub fn validator_http_url() -> ValueParser {
    ValueParser::from(move |value: &str| -> std::result::Result<Url, String> {
        let url = Url::parse(value).map_err(|err| format!("invalid URL: {err}"))?;
        match url.scheme() {
            "http" | "https" if url.has_host() => Ok(url),
            _ => Err("URL must be http(s) with a host".to_string()),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BACKEND_URL)
                .short('b')
                .long("backend-url")
                .help("Base URL of the CVPerfect API, example: https://api.cvperfect.dev")
                .env("CVPERFECT_BACKEND_URL")
                .required(true)
                .value_parser(validator_http_url()),
        )
        .arg(
            Arg::new(ARG_BACKEND_TIMEOUT)
                .long("backend-timeout")
                .help("Timeout in seconds for requests to the backend")
                .env("CVPERFECT_BACKEND_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE)
                .long("session-cookie")
                .help("Name of the cookie holding the session credential")
                .env("CVPERFECT_SESSION_COOKIE")
                .default_value("auth_token"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub url: Url,
    pub timeout: Duration,
    pub session_cookie: String,
}

impl Options {
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let url = matches
            .get_one::<Url>(ARG_BACKEND_URL)
            .cloned()
            .context("missing required argument: --backend-url")?;
        let timeout = matches
            .get_one::<u64>(ARG_BACKEND_TIMEOUT)
            .copied()
            .map_or(crate::session::client::DEFAULT_TIMEOUT, Duration::from_secs);
        let session_cookie = matches
            .get_one::<String>(ARG_SESSION_COOKIE)
            .cloned()
            .context("missing required argument: --session-cookie")?;

        Ok(Self {
            url,
            timeout,
            session_cookie,
        })
    }
}
