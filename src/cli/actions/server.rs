use crate::{
    auth::{AuthFlow, FlowConfig},
    gateway::{self, GatewayConfig, GatewayState},
    idp::{HttpIdentityProvider, IdpConfig},
    session::MemorySessionStore,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub idp_base_url: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: Url,
    pub scopes: Vec<String>,
    pub post_logout_redirect_uri: Option<Url>,
    pub idp_timeout_seconds: u64,
    pub landing_path: String,
    pub session_ttl_seconds: u64,
    pub authorization_ttl_seconds: u64,
    pub reaper_interval_seconds: u64,
    pub max_pending_logins: usize,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the IdP settings are invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let state = build_state(&args)?;

    gateway::new(args.port, Arc::new(state)).await
}

fn build_state(args: &Args) -> Result<GatewayState> {
    let session_ttl = Duration::from_secs(args.session_ttl_seconds);

    let idp_config = IdpConfig::new(
        &args.idp_base_url,
        args.client_id.clone(),
        args.client_secret.clone(),
    )
    .context("Invalid identity provider configuration")?
    .with_scopes(args.scopes.clone())
    .with_timeout(Duration::from_secs(args.idp_timeout_seconds));
    let idp = HttpIdentityProvider::new(idp_config).context("Failed to build IdP client")?;

    let mut flow_config = FlowConfig::new(args.redirect_uri.clone())
        .with_landing_path(&args.landing_path)
        .with_authorization_ttl(Duration::from_secs(args.authorization_ttl_seconds))
        .with_max_pending_authorizations(args.max_pending_logins);
    if let Some(uri) = &args.post_logout_redirect_uri {
        flow_config = flow_config.with_post_logout_redirect_uri(uri.clone());
    }

    let sessions = MemorySessionStore::new(session_ttl);
    let flow = AuthFlow::new(flow_config, Arc::new(idp), Arc::new(sessions));

    let gateway_config = GatewayConfig::new()
        .with_session_ttl(session_ttl)
        .with_reaper_interval(Duration::from_secs(args.reaper_interval_seconds));

    Ok(GatewayState::new(gateway_config, flow))
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("idp_base_url", args.idp_base_url.clone()),
        ("client_id", args.client_id.clone()),
        ("redirect_uri", args.redirect_uri.to_string()),
        ("scopes", args.scopes.join(" ")),
        (
            "post_logout_redirect_uri",
            args.post_logout_redirect_uri
                .as_ref()
                .map_or_else(|| "default".to_string(), ToString::to_string),
        ),
        ("landing_path", args.landing_path.clone()),
        ("session_ttl_seconds", args.session_ttl_seconds.to_string()),
        (
            "authorization_ttl_seconds",
            args.authorization_ttl_seconds.to_string(),
        ),
        ("max_pending_logins", args.max_pending_logins.to_string()),
        ("idp_timeout_seconds", args.idp_timeout_seconds.to_string()),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = "Startup configuration:".to_string();
    for (key, value) in &entries {
        message.push_str(&format!("\n  {key:<max_key_len$}  {value}"));
    }
    info!("{message}");
}
