//! The request client every API module sends through.
//!
//! API functions build a [`Request`] and hand it to a [`RequestClient`]; the
//! client owns the transport, the base URL and the response envelope.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("server error {code}: {msg}")]
    Business { code: i32, msg: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// Flattens a serializable struct into query pairs. Nulls are dropped and
/// strings are passed without quotes.
pub fn to_query<Q: Serialize + ?Sized>(params: &Q) -> Result<Vec<(String, String)>, ApiError> {
    let value = serde_json::to_value(params)?;
    let Value::Object(map) = value else {
        return Ok(Vec::new());
    };
    Ok(map
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect())
}

/// Transport used by the API modules.
///
/// Implementors only provide [`send`](RequestClient::send); the verb helpers
/// build the request and decode the payload.
#[allow(async_fn_in_trait)]
pub trait RequestClient {
    async fn send(&self, request: Request) -> Result<Value, ApiError>;

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        let value = self.send(Request::get(url).query(query)).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Value, ApiError> {
        self.send(Request::post(url).json(body)?).await
    }

    async fn put<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Value, ApiError> {
        self.send(Request::put(url).json(body)?).await
    }

    async fn delete(&self, url: &str) -> Result<Value, ApiError> {
        self.send(Request::delete(url)).await
    }
}

#[derive(Deserialize)]
struct Envelope {
    code: i32,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    msg: String,
}

/// Unwraps `{code, data, msg}`. Bodies without that shape pass through.
fn unwrap_envelope(value: Value) -> Result<Value, ApiError> {
    let is_envelope = value
        .as_object()
        .is_some_and(|map| map.contains_key("code") && map.contains_key("data"));
    if !is_envelope {
        return Ok(value);
    }
    let envelope: Envelope = serde_json::from_value(value)?;
    if envelope.code == 0 {
        Ok(envelope.data)
    } else {
        Err(ApiError::Business {
            code: envelope.code,
            msg: envelope.msg,
        })
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Envelope>(body)
        .ok()
        .map(|e| e.msg)
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| body.to_string())
}

/// [`RequestClient`] over `reqwest`, resolving paths against a base URL.
#[derive(Clone, Debug)]
pub struct HttpRequestClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRequestClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn build(&self, request: Request) -> reqwest::RequestBuilder {
        let url = self.url(&request.url);
        let mut builder = self
            .http
            .request(request.method, url)
            .header("Accept", "application/json");
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        builder
    }
}

fn handle_response(status: StatusCode, body: &str) -> Result<Value, ApiError> {
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: error_message(body),
        });
    }
    if body.is_empty() {
        return Ok(Value::Null);
    }
    unwrap_envelope(serde_json::from_str(body)?)
}

impl RequestClient for HttpRequestClient {
    async fn send(&self, request: Request) -> Result<Value, ApiError> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");

        let resp = self.build(request).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        handle_response(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Filter {
        page: u32,
        page_size: u32,
        name: Option<String>,
        active: bool,
    }

    #[test]
    fn query_flattening_skips_nulls() {
        let filter = Filter { page: 2, page_size: 20, name: None, active: true };
        let mut query = to_query(&filter).unwrap();
        query.sort();
        assert_eq!(
            query,
            vec![
                ("active".to_string(), "true".to_string()),
                ("page".to_string(), "2".to_string()),
                ("pageSize".to_string(), "20".to_string()),
            ]
        );

        let filter = Filter { page: 1, page_size: 10, name: Some("a b".into()), active: false };
        let query = to_query(&filter).unwrap();
        assert!(query.contains(&("name".to_string(), "a b".to_string())));
    }

    #[test]
    fn envelope_success_yields_data() {
        let data = unwrap_envelope(json!({"code": 0, "data": {"id": 1}, "msg": ""})).unwrap();
        assert_eq!(data, json!({"id": 1}));
    }

    #[test]
    fn envelope_failure_is_business_error() {
        let err = unwrap_envelope(json!({"code": 1001, "data": null, "msg": "duplicate name"}))
            .unwrap_err();
        match err {
            ApiError::Business { code, msg } => {
                assert_eq!(code, 1001);
                assert_eq!(msg, "duplicate name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn plain_bodies_pass_through() {
        assert_eq!(unwrap_envelope(json!([1, 2])).unwrap(), json!([1, 2]));
        assert_eq!(unwrap_envelope(json!({"code": 3})).unwrap(), json!({"code": 3}));
    }

    #[test]
    fn error_message_prefers_envelope_msg() {
        assert_eq!(
            error_message(r#"{"code":404,"data":null,"msg":"demo item not found"}"#),
            "demo item not found"
        );
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn non_success_status_uses_envelope_msg() {
        let body = r#"{"code":404,"data":null,"msg":"demo item not found"}"#;
        match handle_response(StatusCode::NOT_FOUND, body).unwrap_err() {
            ApiError::Status { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "demo item not found");
            }
            other => panic!("unexpected error: {other}"),
        }

        match handle_response(StatusCode::BAD_GATEWAY, "upstream down").unwrap_err() {
            ApiError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn success_responses_are_unwrapped() {
        assert_eq!(handle_response(StatusCode::OK, "").unwrap(), Value::Null);
        assert_eq!(
            handle_response(StatusCode::OK, r#"{"code":0,"data":7,"msg":""}"#).unwrap(),
            json!(7)
        );
        assert!(matches!(
            handle_response(StatusCode::OK, r#"{"code":500,"data":null,"msg":"boom"}"#),
            Err(ApiError::Business { code: 500, .. })
        ));
        assert!(matches!(
            handle_response(StatusCode::OK, "<html>"),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn built_request_carries_headers_query_and_body() {
        let client = HttpRequestClient::new("http://localhost:3000").with_token("secret");
        let request = Request::put("/infra/demo-crud/update")
            .query(vec![
                ("page".to_string(), "1".to_string()),
                ("pageSize".to_string(), "10".to_string()),
            ])
            .json(&json!({"id": 1}))
            .unwrap();

        let built = client.build(request).build().unwrap();
        assert_eq!(built.method(), &Method::PUT);
        assert_eq!(built.url().path(), "/infra/demo-crud/update");
        assert_eq!(built.url().query(), Some("page=1&pageSize=10"));
        assert_eq!(built.headers()["accept"], "application/json");
        assert_eq!(built.headers()["authorization"], "Bearer secret");
        assert_eq!(built.headers()["content-type"], "application/json");
        let body = built.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(serde_json::from_slice::<Value>(body).unwrap(), json!({"id": 1}));
    }

    #[test]
    fn built_request_without_token_or_query() {
        let client = HttpRequestClient::new("http://localhost:3000/");
        let built = client
            .build(Request::get("/infra/demo-crud/get?id=5"))
            .build()
            .unwrap();
        assert_eq!(built.url().as_str(), "http://localhost:3000/infra/demo-crud/get?id=5");
        assert!(built.headers().get("authorization").is_none());
        assert!(built.body().is_none());
    }

    #[test]
    fn urls_join_base_and_path() {
        let client = HttpRequestClient::new("http://localhost:3000/");
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(
            client.url("/infra/demo-crud/get?id=1"),
            "http://localhost:3000/infra/demo-crud/get?id=1"
        );
    }
}
