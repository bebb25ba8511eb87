//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action to run, currently only the gateway
//! server with its full configuration.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{idp, session, ARG_PORT};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let idp_opts = idp::Options::parse(matches)?;
    let session_opts = session::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        idp_base_url: idp_opts.base_url,
        client_id: idp_opts.client_id,
        client_secret: idp_opts.client_secret,
        redirect_uri: idp_opts.redirect_uri,
        scopes: idp_opts.scopes,
        post_logout_redirect_uri: idp_opts.post_logout_redirect_uri,
        idp_timeout_seconds: idp_opts.timeout_seconds,
        landing_path: session_opts.landing_path,
        session_ttl_seconds: session_opts.session_ttl_seconds,
        authorization_ttl_seconds: session_opts.authorization_ttl_seconds,
        reaper_interval_seconds: session_opts.reaper_interval_seconds,
        max_pending_logins: session_opts.max_pending_logins,
    }))
}
