#![allow(dead_code)]

use async_trait::async_trait;
use authgate::{
    auth::{AuthFlow, FlowConfig},
    gateway::{router, GatewayConfig, GatewayState},
    idp::{IdentityProvider, TokenSet, UserClaims},
    session::MemorySessionStore,
    Error,
};
use axum::{
    body::{to_bytes, Body},
    http::{
        header::{LOCATION, SET_COOKIE},
        Request, Response,
    },
    Router,
};
use secrecy::{ExposeSecret, SecretString};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tower::ServiceExt;
use url::Url;

pub const ACCESS_TOKEN: &str = "tok-very-secret";
pub const ID_TOKEN: &str = "id-token-very-secret";

/// In-process IdP: accepts code `ABC` and returns `u1`/`Alice`.
#[derive(Default)]
pub struct StubIdp {
    pub reject_code: bool,
    pub exchanges: AtomicUsize,
}

impl StubIdp {
    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StubIdp {
    fn authorization_url(&self, redirect_uri: &Url, state: &str) -> Result<Url, Error> {
        let mut url = Url::parse("https://idp.test/authorize")
            .map_err(|e| Error::Configuration(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", "test-client")
            .append_pair("redirect_uri", redirect_uri.as_str())
            .append_pair("state", state);
        Ok(url)
    }

    async fn exchange_code(&self, code: &str, _redirect_uri: &Url) -> Result<TokenSet, Error> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        if self.reject_code || code != "ABC" {
            return Err(Error::UpstreamAuth {
                operation: "token exchange",
                status: Some(400),
                detail: format!("invalid_grant for {ACCESS_TOKEN}"),
            });
        }
        let mut tokens = TokenSet::bearer(ACCESS_TOKEN);
        tokens.id_token = Some(SecretString::from(ID_TOKEN.to_string()));
        Ok(tokens)
    }

    async fn fetch_user_claims(&self, access_token: &SecretString) -> Result<UserClaims, Error> {
        if access_token.expose_secret() != ACCESS_TOKEN {
            return Err(Error::UpstreamAuth {
                operation: "userinfo request",
                status: Some(401),
                detail: "token rejected".to_string(),
            });
        }
        Ok(UserClaims::new("u1")
            .with_name("Alice")
            .with_email("alice@example.com"))
    }

    fn logout_url(&self, return_to: &Url) -> Result<Url, Error> {
        let mut url = Url::parse("https://idp.test/v2/logout")
            .map_err(|e| Error::Configuration(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("returnTo", return_to.as_str())
            .append_pair("client_id", "test-client");
        Ok(url)
    }
}

pub struct TestGateway {
    pub app: Router,
    pub state: Arc<GatewayState>,
    pub idp: Arc<StubIdp>,
}

pub fn gateway(idp: StubIdp, redirect_uri: &str) -> anyhow::Result<TestGateway> {
    build(idp, FlowConfig::new(Url::parse(redirect_uri)?))
}

pub fn gateway_with_pending_limit(
    idp: StubIdp,
    redirect_uri: &str,
    max_pending: usize,
) -> anyhow::Result<TestGateway> {
    build(
        idp,
        FlowConfig::new(Url::parse(redirect_uri)?).with_max_pending_authorizations(max_pending),
    )
}

fn build(idp: StubIdp, config: FlowConfig) -> anyhow::Result<TestGateway> {
    let idp = Arc::new(idp);
    let flow = AuthFlow::new(
        config,
        idp.clone(),
        Arc::new(MemorySessionStore::new(Duration::from_secs(3600))),
    );
    let state = Arc::new(GatewayState::new(
        GatewayConfig::new().with_session_ttl(Duration::from_secs(3600)),
        flow,
    ));
    Ok(TestGateway {
        app: router(state.clone()),
        state,
        idp,
    })
}

impl TestGateway {
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> anyhow::Result<Response<Body>> {
        let mut request = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            request = request.header("cookie", cookie);
        }
        Ok(self.app.clone().oneshot(request.body(Body::empty())?).await?)
    }

    /// Run `/login` and return the issued `state`.
    pub async fn login(&self, uri: &str) -> anyhow::Result<String> {
        let response = self.get(uri, None).await?;
        let location = location(&response).ok_or_else(|| anyhow::anyhow!("missing Location"))?;
        Url::parse(&location)?
            .query_pairs()
            .find(|(key, _)| key == "state")
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| anyhow::anyhow!("authorization URL has no state"))
    }

    /// Complete a login and return the `name=value` session cookie.
    pub async fn authenticate(&self) -> anyhow::Result<String> {
        let state = self.login("/login").await?;
        let response = self
            .get(&format!("/callback?code=ABC&state={state}"), None)
            .await?;
        session_cookie(&response).ok_or_else(|| anyhow::anyhow!("callback set no cookie"))
    }
}

pub fn location(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

pub fn set_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

/// The `name=value` pair of the session `Set-Cookie`, if any.
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    set_cookie(response)
        .and_then(|cookie| cookie.split(';').next().map(str::to_string))
        .filter(|pair| pair.starts_with("authgate_session=") && pair.len() > "authgate_session=".len())
}

pub async fn body_string(response: Response<Body>) -> anyhow::Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}
