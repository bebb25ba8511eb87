use crate::cli::telemetry::LogFormat;
use clap::{builder::ValueParser, Arg, ArgMatches, Command};
use tracing::Level;

pub const ARG_VERBOSITY: &str = "verbosity";
pub const ARG_LOG_FORMAT: &str = "log-format";

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

/// Tracing level for the `-v` count; `None` leaves the default (errors only).
#[must_use]
pub fn verbosity_level(matches: &ArgMatches) -> Option<Level> {
    match matches.get_one::<u8>(ARG_VERBOSITY).copied().unwrap_or(0) {
        0 => None,
        1 => Some(Level::WARN),
        2 => Some(Level::INFO),
        3 => Some(Level::DEBUG),
        // 4 or 5; the value parser rejects anything higher
        _ => Some(Level::TRACE),
    }
}

/// Console format selected with `--log-format`.
#[must_use]
pub fn log_format(matches: &ArgMatches) -> LogFormat {
    matches
        .get_one::<LogFormat>(ARG_LOG_FORMAT)
        .copied()
        .unwrap_or_default()
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("AUTHGATE_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .arg(
            Arg::new(ARG_LOG_FORMAT)
                .long(ARG_LOG_FORMAT)
                .help("Console log format: pretty or json")
                .env("AUTHGATE_LOG_FORMAT")
                .default_value("pretty")
                .value_parser(|value: &str| value.parse::<LogFormat>()),
        )
}
