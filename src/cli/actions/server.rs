use crate::cvperfect::{self, EdgeConfig};
use anyhow::Result;
use std::time::Duration;
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub public_url: Url,
    pub backend_url: Url,
    pub backend_timeout: Duration,
    pub session_cookie: String,
}

impl From<&Args> for EdgeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.backend_url.clone(), args.public_url.clone())
            .with_session_cookie(args.session_cookie.clone())
            .with_backend_timeout(args.backend_timeout)
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    cvperfect::new(args.port, EdgeConfig::from(&args)).await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("public_url", args.public_url.to_string()),
        ("backend_url", args.backend_url.to_string()),
        (
            "backend_timeout",
            format!("{}s", args.backend_timeout.as_secs()),
        ),
        ("session_cookie", args.session_cookie.clone()),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} ({})\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}
