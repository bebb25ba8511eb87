use clap::{builder::RangedU64ValueParser, Arg, ArgMatches, Command};

pub const ARG_LANDING_PATH: &str = "landing-path";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_AUTHORIZATION_TTL_SECONDS: &str = "authorization-ttl-seconds";
pub const ARG_REAPER_INTERVAL_SECONDS: &str = "reaper-interval-seconds";
pub const ARG_MAX_PENDING_LOGINS: &str = "max-pending-logins";

#[derive(Debug, Clone)]
pub struct Options {
    pub landing_path: String,
    pub session_ttl_seconds: u64,
    pub authorization_ttl_seconds: u64,
    pub reaper_interval_seconds: u64,
    pub max_pending_logins: usize,
}

impl Options {
    /// Parse session arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the landing path is not a local path.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let landing_path = matches
            .get_one::<String>(ARG_LANDING_PATH)
            .cloned()
            .unwrap_or_else(|| "/profile".to_string());
        if !landing_path.starts_with('/') || landing_path.starts_with("//") {
            anyhow::bail!("--{ARG_LANDING_PATH} must be a local path, got: {landing_path}");
        }

        let get_seconds = |id: &str, default: u64| matches.get_one::<u64>(id).copied().unwrap_or(default);

        Ok(Self {
            landing_path,
            session_ttl_seconds: get_seconds(ARG_SESSION_TTL_SECONDS, 43_200),
            authorization_ttl_seconds: get_seconds(ARG_AUTHORIZATION_TTL_SECONDS, 600),
            reaper_interval_seconds: get_seconds(ARG_REAPER_INTERVAL_SECONDS, 60),
            max_pending_logins: matches
                .get_one::<usize>(ARG_MAX_PENDING_LOGINS)
                .copied()
                .unwrap_or(10_000),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_LANDING_PATH)
                .long(ARG_LANDING_PATH)
                .help("Local path to redirect to after login when no return_to was given")
                .env("AUTHGATE_LANDING_PATH")
                .default_value("/profile"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session lifetime and cookie Max-Age in seconds")
                .env("AUTHGATE_SESSION_TTL_SECONDS")
                .default_value("43200")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_AUTHORIZATION_TTL_SECONDS)
                .long(ARG_AUTHORIZATION_TTL_SECONDS)
                .help("How long a pending login state stays valid, in seconds")
                .env("AUTHGATE_AUTHORIZATION_TTL_SECONDS")
                .default_value("600")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_REAPER_INTERVAL_SECONDS)
                .long(ARG_REAPER_INTERVAL_SECONDS)
                .help("Interval in seconds between purges of expired sessions and states")
                .env("AUTHGATE_REAPER_INTERVAL_SECONDS")
                .default_value("60")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_MAX_PENDING_LOGINS)
                .long(ARG_MAX_PENDING_LOGINS)
                .help("Maximum logins waiting for their callback; further logins get 503")
                .env("AUTHGATE_MAX_PENDING_LOGINS")
                .default_value("10000")
                .value_parser(RangedU64ValueParser::<usize>::new().range(1..)),
        )
}
