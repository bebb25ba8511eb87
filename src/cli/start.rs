use crate::cli::{
    actions::Action,
    commands::{self, logging},
    dispatch, telemetry,
};
use anyhow::Result;

/// Parse the command line, install telemetry and resolve the action to run.
///
/// # Errors
///
/// Returns an error if telemetry cannot be installed or the configuration is invalid.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    telemetry::init(
        logging::verbosity_level(&matches),
        logging::log_format(&matches),
    )?;

    dispatch::handler(&matches)
}
