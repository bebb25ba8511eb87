use authgate::{
    idp::{HttpIdentityProvider, IdentityProvider, IdpConfig},
    Error,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::time::Duration;
use url::Url;
use wiremock::{
    matchers::{body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn provider(base_url: &str, timeout: Duration) -> anyhow::Result<HttpIdentityProvider> {
    let config = IdpConfig::new(
        base_url,
        "test-client",
        SecretString::from("test-secret".to_string()),
    )?
    .with_timeout(timeout);
    Ok(HttpIdentityProvider::new(config)?)
}

fn callback() -> anyhow::Result<Url> {
    Ok(Url::parse("https://app.example.com/callback")?)
}

#[tokio::test]
async fn exchange_code_posts_the_authorization_code_form() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("client_id=test-client"))
        .and(body_string_contains("client_secret=test-secret"))
        .and(body_string_contains("code=ABC"))
        .and(body_string_contains(
            "redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok",
            "id_token": "id.tok.en",
            "token_type": "Bearer",
            "expires_in": 86400,
            "scope": "openid profile email"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let idp = provider(&server.uri(), Duration::from_secs(5))?;
    let tokens = idp.exchange_code("ABC", &callback()?).await?;

    assert_eq!(tokens.access_token.expose_secret(), "tok");
    assert_eq!(tokens.token_type, "Bearer");
    assert!(tokens.expires_at.is_some());
    assert_eq!(tokens.scope.as_deref(), Some("openid profile email"));
    Ok(())
}

#[tokio::test]
async fn exchange_code_rejection_is_upstream_auth() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid authorization code"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let idp = provider(&server.uri(), Duration::from_secs(5))?;
    let result = idp.exchange_code("EXPIRED", &callback()?).await;

    match result {
        Err(Error::UpstreamAuth {
            operation, status, ..
        }) => {
            assert_eq!(operation, "token exchange");
            assert_eq!(status, Some(400));
        }
        other => panic!("expected UpstreamAuth, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn exchange_code_malformed_body_is_upstream_auth() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let idp = provider(&server.uri(), Duration::from_secs(5))?;
    let result = idp.exchange_code("ABC", &callback()?).await;
    assert!(matches!(result, Err(Error::UpstreamAuth { .. })));
    Ok(())
}

#[tokio::test]
async fn exchange_code_is_not_retried() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let idp = provider(&server.uri(), Duration::from_secs(5))?;
    let result = idp.exchange_code("ABC", &callback()?).await;
    assert!(matches!(
        result,
        Err(Error::UpstreamAuth {
            status: Some(503),
            ..
        })
    ));
    // `expect(1)` is verified when the server drops
    Ok(())
}

#[tokio::test]
async fn exchange_code_timeout_is_network_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "tok" }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let idp = provider(&server.uri(), Duration::from_millis(200))?;
    let result = idp.exchange_code("ABC", &callback()?).await;
    assert!(matches!(result, Err(Error::Network { .. })));
    Ok(())
}

#[tokio::test]
async fn unreachable_idp_is_network_error() -> anyhow::Result<()> {
    // Nothing listens on port 1.
    let idp = provider("http://127.0.0.1:1", Duration::from_secs(2))?;
    let result = idp.exchange_code("ABC", &callback()?).await;
    assert!(matches!(
        result,
        Err(Error::Network {
            operation: "token exchange",
            ..
        })
    ));
    Ok(())
}

#[tokio::test]
async fn fetch_user_claims_sends_bearer_token() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "u1",
            "name": "Alice",
            "email": "alice@example.com",
            "picture": "https://example.com/alice.png",
            "email_verified": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let idp = provider(&server.uri(), Duration::from_secs(5))?;
    let claims = idp
        .fetch_user_claims(&SecretString::from("tok".to_string()))
        .await?;

    assert_eq!(claims.subject, "u1");
    assert_eq!(claims.name.as_deref(), Some("Alice"));
    assert_eq!(claims.email.as_deref(), Some("alice@example.com"));
    assert_eq!(
        claims.picture_url.as_deref(),
        Some("https://example.com/alice.png")
    );
    Ok(())
}

#[tokio::test]
async fn fetch_user_claims_unauthorized_is_upstream_auth() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let idp = provider(&server.uri(), Duration::from_secs(5))?;
    let result = idp
        .fetch_user_claims(&SecretString::from("expired".to_string()))
        .await;
    assert!(matches!(
        result,
        Err(Error::UpstreamAuth {
            operation: "userinfo request",
            status: Some(401),
            ..
        })
    ));
    Ok(())
}

#[tokio::test]
async fn fetch_user_claims_without_subject_is_upstream_auth() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Alice" })))
        .mount(&server)
        .await;

    let idp = provider(&server.uri(), Duration::from_secs(5))?;
    let result = idp
        .fetch_user_claims(&SecretString::from("tok".to_string()))
        .await;
    assert!(matches!(result, Err(Error::UpstreamAuth { .. })));
    Ok(())
}

#[tokio::test]
async fn idp_base_url_with_path_prefix_is_respected() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tenant/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sub": "u1" })))
        .expect(1)
        .mount(&server)
        .await;

    let idp = provider(&format!("{}/tenant/", server.uri()), Duration::from_secs(5))?;
    let claims = idp
        .fetch_user_claims(&SecretString::from("tok".to_string()))
        .await?;
    assert_eq!(claims.subject, "u1");
    Ok(())
}
