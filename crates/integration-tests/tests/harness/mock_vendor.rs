//! Mock Tencent Cloud API backend
//!
//! Every action is a signed JSON POST to `/`, told apart by `X-TC-Action`.

use serde_json::{Value, json};
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, header_exists, method, path},
};

pub struct MockVendor {
    server: MockServer,
}

impl MockVendor {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Endpoint override pointing at this mock
    pub fn endpoint(&self) -> Url {
        self.server.uri().parse().unwrap()
    }

    /// Answer `action` with `response` wrapped in the API envelope
    pub async fn respond(&self, action: &str, response: Value) {
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("X-TC-Action", action))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Response": response })))
            .mount(&self.server)
            .await;
    }

    /// Answer `action` with a vendor error
    pub async fn fail(&self, action: &str, code: &str, message: &str) {
        self.respond(
            action,
            json!({
                "Error": { "Code": code, "Message": message },
                "RequestId": "req-error",
            }),
        )
        .await;
    }

    /// `X-TC-Action` of every request received so far
    pub async fn actions(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| r.headers.get("X-TC-Action"))
            .filter_map(|v| v.to_str().ok().map(str::to_owned))
            .collect()
    }

    /// Decoded body of the last request
    pub async fn last_body(&self) -> Option<Value> {
        let requests = self.server.received_requests().await?;
        requests.last().and_then(|r| serde_json::from_slice(&r.body).ok())
    }
}
