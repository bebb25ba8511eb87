//! # Authgate (OAuth2 Authentication Gateway)
//!
//! `authgate` sits in front of protected routes and delegates authentication to
//! an external Identity Provider using the OAuth2 Authorization Code flow.
//!
//! ## Flow
//!
//! - `GET /login` stores a single-use `state` and redirects to the IdP.
//! - `GET /callback` consumes that `state`, exchanges the code for tokens,
//!   fetches userinfo claims and creates a server-side session. The browser
//!   only ever receives an opaque session identifier in an `HttpOnly` cookie.
//! - Guarded routes resolve the cookie to a session or redirect to `/login`.
//! - `GET /logout` destroys the local session first, then redirects to the
//!   IdP logout endpoint.
//!
//! Sessions and pending authorizations live in memory for the lifetime of the
//! process; both tables sit behind injected objects owned by the gateway state.

pub mod auth;
pub mod cli;
pub mod error;
pub mod gateway;
pub mod idp;
pub mod session;

pub use error::Error;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
