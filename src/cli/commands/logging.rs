use clap::{Arg, Command, builder::ValueParser};

pub const ARG_VERBOSITY: &str = "verbosity";

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accepts a level name or its index (`0` = error .. `4` = trace, `5` is also trace).
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>()
            && parsed <= 5
        {
            return Ok(parsed);
        }

        let level = level.to_lowercase();
        LEVELS
            .iter()
            .position(|name| *name == level)
            .and_then(|index| u8::try_from(index).ok())
            .ok_or_else(|| format!("invalid log level, expected one of: {}", LEVELS.join(", ")))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Edge server log level, repeat -v or set error|warn|info|debug|trace (default: error). RUST_LOG directives still apply")
            .env("CVPERFECT_LOG_LEVEL")
            .global(true)
            .action(clap::ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_level() {
        let command = with_args(Command::new("cvperfect"));
        temp_env::with_vars([("CVPERFECT_LOG_LEVEL", Some("loud"))], || {
            let err = command.try_get_matches_from(vec!["cvperfect"]).unwrap_err();
            assert!(err.to_string().contains("invalid log level"));
        });
    }

    #[test]
    fn level_names_are_case_insensitive() {
        let command = with_args(Command::new("cvperfect"));
        temp_env::with_vars([("CVPERFECT_LOG_LEVEL", Some("DEBUG"))], || {
            let matches = command.try_get_matches_from(vec!["cvperfect"]).unwrap();
            assert_eq!(matches.get_one::<u8>(ARG_VERBOSITY).copied(), Some(3));
        });
    }
}
