//! Node JSON-RPC client abstraction and the reqwest implementation

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;
use serde_json::Value;

use crate::core::RpcError;

/// Default per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Abstract node RPC client
///
/// Resolves to the `result` member of a well-formed response. Everything the
/// core needs from the node goes through this trait, so tests can swap in an
/// in-memory node.
#[async_trait::async_trait]
pub trait RpcClient: Send + Sync + 'static {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError>;
}

/// Credentials for the `Authorization: Basic` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcAuth {
    /// Contents of the node's `.cookie` file (`__cookie__:<secret>`)
    Cookie(String),
    UserPass { user: String, password: String },
}

impl RpcAuth {
    pub fn header_value(&self) -> String {
        let raw = match self {
            RpcAuth::Cookie(line) => line.trim_end_matches(['\r', '\n']).to_string(),
            RpcAuth::UserPass { user, password } => format!("{user}:{password}"),
        };
        format!("Basic {}", BASE64.encode(raw.as_bytes()))
    }
}

#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    method: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    params: Vec<Value>,
    id: u64,
}

/// HTTP POST transport
pub struct HttpRpcClient {
    http: reqwest::Client,
    url: String,
    auth_header: String,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    pub fn new(url: impl Into<String>, auth: &RpcAuth) -> Result<Self, RpcError> {
        Self::with_timeout(url, auth, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        url: impl Into<String>,
        auth: &RpcAuth,
        timeout: Duration,
    ) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RpcError::Connection(err.to_string()))?;
        Ok(Self {
            http,
            url: url.into(),
            auth_header: auth.header_value(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl RpcClient for HttpRpcClient {
    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value, RpcError> {
        let body = RequestBody {
            method,
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };
        let payload = serde_json::to_string(&body).map_err(|err| RpcError::content(err.to_string()))?;

        let response = self
            .http
            .post(&self.url)
            .header(reqwest::header::AUTHORIZATION, &self.auth_header)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        // The node reports RPC errors with a non-200 status and a JSON body,
        // so the status is not checked here.
        let status = response.status();
        let text = response.text().await.map_err(map_transport_error)?;
        let decoded: Value = serde_json::from_str(&text).map_err(|_| {
            RpcError::content(format!("{method}: undecodable response (HTTP {status})"))
        })?;
        extract_result(method, decoded)
    }
}

fn map_transport_error(err: reqwest::Error) -> RpcError {
    if err.is_timeout() {
        RpcError::Timeout
    } else {
        RpcError::Connection(err.to_string())
    }
}

/// Validate the `{result, error}` envelope and return the result.
pub fn extract_result(method: &str, mut response: Value) -> Result<Value, RpcError> {
    let Some(object) = response.as_object_mut() else {
        return Err(RpcError::content(format!("{method}: response is not an object")));
    };

    let error = object
        .remove("error")
        .ok_or_else(|| RpcError::content(format!("{method}: response has no error field")))?;
    if !error.is_null() {
        let code = error.get("code").and_then(Value::as_i64);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(RpcError::Content {
            message: format!("{method}: {message}"),
            code,
        });
    }

    let result = object
        .remove("result")
        .ok_or_else(|| RpcError::content(format!("{method}: response has no result field")))?;
    if result.is_null() {
        return Err(RpcError::null_result(method));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_result_ok() {
        let result = extract_result("getblockcount", json!({"result": 42, "error": null, "id": 1}));
        assert_eq!(result, Ok(json!(42)));
    }

    #[test]
    fn test_extract_result_node_error() {
        let response = json!({
            "result": null,
            "error": {"code": -5, "message": "Block not found"},
            "id": 1
        });
        let err = extract_result("getblock", response).unwrap_err();
        assert_eq!(err.code(), Some(-5));
    }

    #[test]
    fn test_extract_result_malformed() {
        assert!(matches!(
            extract_result("x", json!({"result": 1})),
            Err(RpcError::Content { code: None, .. })
        ));
        assert!(matches!(
            extract_result("x", json!({"error": null})),
            Err(RpcError::Content { .. })
        ));
        assert!(matches!(
            extract_result("x", json!({"result": null, "error": null})),
            Err(RpcError::NullResult { .. })
        ));
        assert!(matches!(
            extract_result("x", json!([1, 2])),
            Err(RpcError::Content { .. })
        ));
    }

    #[test]
    fn test_auth_header() {
        let auth = RpcAuth::UserPass {
            user: "alice".into(),
            password: "secret".into(),
        };
        assert_eq!(auth.header_value(), "Basic YWxpY2U6c2VjcmV0");

        let cookie = RpcAuth::Cookie("alice:secret\n".into());
        assert_eq!(cookie.header_value(), "Basic YWxpY2U6c2VjcmV0");
    }

    #[test]
    fn test_request_body_omits_empty_params() {
        let body = RequestBody {
            method: "uptime",
            params: Vec::new(),
            id: 7,
        };
        let encoded = serde_json::to_value(&body).expect("serializable");
        assert_eq!(encoded, json!({"method": "uptime", "id": 7}));
    }
}
