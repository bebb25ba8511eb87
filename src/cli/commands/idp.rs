use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;
use url::Url;

pub const ARG_IDP_BASE_URL: &str = "idp-base-url";
pub const ARG_CLIENT_ID: &str = "client-id";
pub const ARG_CLIENT_SECRET: &str = "client-secret";
pub const ARG_REDIRECT_URI: &str = "redirect-uri";
pub const ARG_SCOPES: &str = "scopes";
pub const ARG_POST_LOGOUT_REDIRECT_URI: &str = "post-logout-redirect-uri";
pub const ARG_IDP_TIMEOUT_SECONDS: &str = "idp-timeout-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: Url,
    pub scopes: Vec<String>,
    pub post_logout_redirect_uri: Option<Url>,
    pub timeout_seconds: u64,
}

impl Options {
    /// Parse IdP arguments from matches.
    ///
    /// # Errors
    /// Returns an error if required arguments are missing or a URL is invalid.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let read_required = |id: &str| -> Result<String> {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };

        let redirect_uri = read_required(ARG_REDIRECT_URI)?;
        let redirect_uri = Url::parse(&redirect_uri)
            .with_context(|| format!("Invalid --{ARG_REDIRECT_URI}: {redirect_uri}"))?;

        let post_logout_redirect_uri = matches
            .get_one::<String>(ARG_POST_LOGOUT_REDIRECT_URI)
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                Url::parse(v)
                    .with_context(|| format!("Invalid --{ARG_POST_LOGOUT_REDIRECT_URI}: {v}"))
            })
            .transpose()?;

        let scopes = matches
            .get_one::<String>(ARG_SCOPES)
            .map(|v| v.split_whitespace().map(ToString::to_string).collect::<Vec<_>>())
            .filter(|scopes| !scopes.is_empty())
            .ok_or_else(|| anyhow::anyhow!("--{ARG_SCOPES} must list at least one scope"))?;

        Ok(Self {
            base_url: read_required(ARG_IDP_BASE_URL)?,
            client_id: read_required(ARG_CLIENT_ID)?,
            client_secret: SecretString::from(read_required(ARG_CLIENT_SECRET)?),
            redirect_uri,
            scopes,
            post_logout_redirect_uri,
            timeout_seconds: matches
                .get_one::<u64>(ARG_IDP_TIMEOUT_SECONDS)
                .copied()
                .unwrap_or(10),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IDP_BASE_URL)
                .long(ARG_IDP_BASE_URL)
                .help("Identity provider base URL, e.g. https://tenant.auth0.com")
                .env("AUTHGATE_IDP_BASE_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_CLIENT_ID)
                .long(ARG_CLIENT_ID)
                .help("OAuth2 client ID registered with the identity provider")
                .env("AUTHGATE_CLIENT_ID")
                .required(true),
        )
        .arg(
            Arg::new(ARG_CLIENT_SECRET)
                .long(ARG_CLIENT_SECRET)
                .help("OAuth2 client secret")
                .env("AUTHGATE_CLIENT_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_REDIRECT_URI)
                .long(ARG_REDIRECT_URI)
                .help("Callback URL registered with the identity provider")
                .long_help(
                    "Callback URL registered with the identity provider, e.g. https://app.example.com/callback. Session cookies are marked Secure when it uses https.",
                )
                .env("AUTHGATE_REDIRECT_URI")
                .required(true),
        )
        .arg(
            Arg::new(ARG_SCOPES)
                .long(ARG_SCOPES)
                .help("Space-separated scopes to request")
                .env("AUTHGATE_SCOPES")
                .default_value("openid profile email"),
        )
        .arg(
            Arg::new(ARG_POST_LOGOUT_REDIRECT_URI)
                .long(ARG_POST_LOGOUT_REDIRECT_URI)
                .help("Where the identity provider sends the browser after logout (default: redirect URI origin)")
                .env("AUTHGATE_POST_LOGOUT_REDIRECT_URI"),
        )
        .arg(
            Arg::new(ARG_IDP_TIMEOUT_SECONDS)
                .long(ARG_IDP_TIMEOUT_SECONDS)
                .help("Timeout in seconds for token and userinfo requests")
                .env("AUTHGATE_IDP_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
