//! HttpRemoteApi - reqwest で create エンドポイントを叩く
//!
//! # エラー判定
//! - 送信自体の失敗 → `Transport`
//! - 2xx 以外 → `Status`（body の `message` があれば添える）
//! - 2xx でも body に `message` があれば → `Rejected`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::ports::{CreateRequest, RemoteApi, RemoteError};

pub struct HttpRemoteApi {
    client: reqwest::Client,
    create_url: Url,
}

impl HttpRemoteApi {
    pub fn new(create_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            create_url,
        }
    }

    /// Build a client with a request timeout (none by default).
    pub fn with_timeout(create_url: Url, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        Ok(Self { client, create_url })
    }

    pub fn create_url(&self) -> &Url {
        &self.create_url
    }
}

/// `message` field of an error payload, if the body is an object carrying one.
fn error_message(body: &serde_json::Value) -> Option<String> {
    let message = body.as_object()?.get("message")?;
    Some(match message.as_str() {
        Some(text) => text.to_string(),
        None => message.to_string(),
    })
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn create(&self, request: CreateRequest) -> Result<serde_json::Value, RemoteError> {
        debug!(url = %self.create_url, records = request.len(), "posting create request");

        let resp = self
            .client
            .post(self.create_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str(&body)
                .ok()
                .and_then(|value: serde_json::Value| error_message(&value))
                .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()));
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        if let Some(message) = error_message(&body) {
            return Err(RemoteError::Rejected { message });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QueuedRecord;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api(server: &MockServer) -> HttpRemoteApi {
        let url = Url::parse(&format!("{}/api/pizzas", server.uri())).unwrap();
        HttpRemoteApi::new(url)
    }

    #[tokio::test]
    async fn timeout_client_keeps_create_url() {
        let url = Url::parse("http://localhost:3001/api/pizzas").unwrap();
        let api = HttpRemoteApi::with_timeout(url.clone(), Duration::from_secs(5)).unwrap();
        assert_eq!(api.create_url(), &url);
    }

    fn zesty() -> QueuedRecord {
        QueuedRecord::new(json!({"pizzaName": "Zesty", "size": "Large"}))
    }

    #[tokio::test]
    async fn batch_is_posted_as_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/pizzas"))
            .and(body_json(json!([{"pizzaName": "Zesty", "size": "Large"}])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": "1", "pizzaName": "Zesty", "size": "Large"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let created = api(&server)
            .create(CreateRequest::Batch(vec![zesty()]))
            .await
            .unwrap();
        assert_eq!(created[0]["_id"], "1");
    }

    #[tokio::test]
    async fn message_in_ok_body_is_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"message": "Pizza validation failed"})),
            )
            .mount(&server)
            .await;

        let err = api(&server)
            .create(CreateRequest::One(zesty()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RemoteError::Rejected { ref message } if message == "Pizza validation failed"
        ));
    }

    #[tokio::test]
    async fn server_error_carries_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "db down"})))
            .mount(&server)
            .await;

        let err = api(&server)
            .create(CreateRequest::Batch(vec![zesty()]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RemoteError::Status { status: 500, message: Some(ref m) } if m == "db down"
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        // 空いているポートを取って即座に閉じる
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let api = HttpRemoteApi::new(Url::parse(&format!("http://127.0.0.1:{port}/api/pizzas")).unwrap());

        let err = api.create(CreateRequest::One(zesty())).await.unwrap_err();
        assert!(matches!(err, RemoteError::Transport(_)));
    }

    #[test]
    fn error_message_only_reads_objects() {
        assert_eq!(error_message(&json!({"message": "x"})), Some("x".to_string()));
        assert_eq!(error_message(&json!([{"message": "x"}])), None);
        assert_eq!(error_message(&json!({"_id": "1"})), None);
    }
}
