//! `ReqwestIdentityClient` against a canned local HTTP server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use unilogin_application::{IdentityClient, ProfileRequest, TokenAuthMethod, TokenRequest};
use unilogin_domain::ProviderError;
use unilogin_infrastructure::{HttpSettings, ReqwestIdentityClient};
use url::Url;

/// Serves one response and returns the raw request it answered.
async fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0_u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if is_complete(&request) {
                break;
            }
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).into_owned()
    });

    (Url::parse(&format!("http://{addr}/")).unwrap(), handle)
}

fn is_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some((head, body)) = text.split_once("\r\n\r\n") else {
        return false;
    };
    let length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    body.len() >= length
}

fn client() -> ReqwestIdentityClient {
    ReqwestIdentityClient::new(&HttpSettings::default()).unwrap()
}

fn token_request(url: Url, auth_method: TokenAuthMethod) -> TokenRequest {
    TokenRequest {
        token_url: url.join("token").unwrap(),
        client_id: "client-1".to_string(),
        client_secret: Some("s3cret".to_string()),
        code: "auth-code".to_string(),
        redirect_uri: Some("https://app.example/cb".to_string()),
        code_verifier: Some("verifier".to_string()),
        auth_method,
    }
}

#[tokio::test]
async fn test_exchange_posts_form_with_secret_in_body() {
    let (url, server) = serve_once("200 OK", r#"{"access_token":"at-1","token_type":"bearer"}"#).await;

    let token = client()
        .exchange_code(token_request(url, TokenAuthMethod::ClientSecretPost))
        .await
        .unwrap();
    assert_eq!(token.access_token, "at-1");

    let request = server.await.unwrap();
    let lower = request.to_ascii_lowercase();
    assert!(request.starts_with("POST /token HTTP/1.1"));
    assert!(lower.contains("content-type: application/x-www-form-urlencoded"));
    assert!(lower.contains("accept: application/json"));
    assert!(lower.contains("user-agent: unilogin/"));
    assert!(request.contains("grant_type=authorization_code"));
    assert!(request.contains("code=auth-code"));
    assert!(request.contains("client_secret=s3cret"));
    assert!(request.contains("code_verifier=verifier"));
    assert!(request.contains("redirect_uri=https%3A%2F%2Fapp.example%2Fcb"));
}

#[tokio::test]
async fn test_exchange_with_basic_auth_keeps_secret_out_of_body() {
    let (url, server) = serve_once("200 OK", r#"{"access_token":"at-2"}"#).await;

    client()
        .exchange_code(token_request(url, TokenAuthMethod::ClientSecretBasic))
        .await
        .unwrap();

    let request = server.await.unwrap();
    // base64("client-1:s3cret")
    assert!(request.contains("Y2xpZW50LTE6czNjcmV0"));
    assert!(!request.contains("client_secret="));
    assert!(request.contains("client_id=client-1"));
}

#[tokio::test]
async fn test_exchange_error_body_is_denied() {
    let (url, server) = serve_once(
        "400 Bad Request",
        r#"{"error":"invalid_grant","error_description":"code expired"}"#,
    )
    .await;

    let err = client()
        .exchange_code(token_request(url, TokenAuthMethod::ClientSecretPost))
        .await
        .unwrap_err();
    assert_eq!(err, ProviderError::denied("code expired"));
    server.await.unwrap();
}

#[tokio::test]
async fn test_fetch_profile_sends_bearer_and_headers() {
    let (url, server) = serve_once("200 OK", r#"{"data":[{"id":"42"}]}"#).await;
    let request = ProfileRequest {
        url: url.join("helix/users").unwrap(),
        headers: vec![("Client-Id".to_string(), "tw-client".to_string())],
        bearer: Some("at-3".to_string()),
    };

    let profile = client().fetch_profile(request).await.unwrap();
    assert_eq!(profile, json!({ "data": [{ "id": "42" }] }));

    let raw = server.await.unwrap();
    let lower = raw.to_ascii_lowercase();
    assert!(raw.starts_with("GET /helix/users HTTP/1.1"));
    assert!(lower.contains("authorization: bearer at-3"));
    assert!(lower.contains("client-id: tw-client"));
}

#[tokio::test]
async fn test_fetch_profile_unauthorized_is_denied() {
    let (url, server) = serve_once("401 Unauthorized", r#"{"message":"Bad credentials"}"#).await;
    let request = ProfileRequest {
        url,
        headers: Vec::new(),
        bearer: Some("expired".to_string()),
    };

    let err = client().fetch_profile(request).await.unwrap_err();
    assert_eq!(err, ProviderError::denied("profile endpoint returned 401"));
    server.await.unwrap();
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let request = ProfileRequest {
        url: Url::parse(&format!("http://{addr}/me")).unwrap(),
        headers: Vec::new(),
        bearer: None,
    };
    let client = ReqwestIdentityClient::with_client(
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()
            .unwrap(),
    );
    let err = client.fetch_profile(request).await.unwrap_err();
    assert!(matches!(err, ProviderError::Network { .. }));
}
