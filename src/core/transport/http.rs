//! HTTP transport implementation.
//!
//! JSON-RPC over `POST /mcp`. The endpoint is stateless: every request is
//! parsed, dispatched and answered on its own, with no session shared between
//! callers. `GET` and `DELETE` on the endpoint are rejected with 405 since
//! there is neither a server-sent event stream nor a session to terminate.

use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;
use crate::core::server::INSTRUCTIONS;
use crate::domains::tools::{INTERNAL_ERROR, INVALID_PARAMS, ToolError, ToolRequest};

/// JSON-RPC code for unparseable JSON.
pub const PARSE_ERROR: i32 = -32700;

/// JSON-RPC code for a body that is not a valid request object.
pub const INVALID_REQUEST: i32 = -32600;

/// JSON-RPC code for unknown methods.
pub const METHOD_NOT_FOUND: i32 = -32601;

/// Implementation-defined server error, used for unsupported HTTP methods.
pub const SERVER_ERROR: i32 = -32000;

/// MCP protocol versions this server understands, newest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2025-06-18", "2025-03-26", "2024-11-05"];

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
///
/// `id` is always present and is `null` when the request id is unknown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    /// Create an error response.
    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
            id,
        }
    }

    /// Parse error.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::error(Value::Null, PARSE_ERROR, msg)
    }

    /// Invalid request error.
    pub fn invalid_request(id: Value, msg: impl Into<String>) -> Self {
        Self::error(id, INVALID_REQUEST, msg)
    }

    /// Method not found error.
    pub fn method_not_found(id: Value, method: &str) -> Self {
        Self::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    /// Invalid params error.
    pub fn invalid_params(id: Value, msg: impl Into<String>) -> Self {
        Self::error(id, INVALID_PARAMS, msg)
    }

    /// Generic internal error, reported without a request id.
    pub fn internal_error() -> Self {
        Self::error(Value::Null, INTERNAL_ERROR, "Internal server error")
    }

    /// Rejection of an unsupported HTTP method on the endpoint.
    pub fn method_not_allowed() -> Self {
        Self::error(Value::Null, SERVER_ERROR, "Method not allowed.")
    }
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The MCP server instance.
    server: McpServer,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the HTTP transport until Ctrl-C.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = build_router(server, &self.config);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("MCP Streamable HTTP Server listening on {}", addr);
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → Health:   GET /health");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Build the axum router serving the MCP endpoint.
pub fn build_router(server: McpServer, config: &HttpConfig) -> Router {
    let mut app = Router::new()
        .route(
            &config.rpc_path,
            post(handle_rpc)
                .get(method_not_allowed)
                .delete(method_not_allowed),
        )
        .route("/health", get(health_check))
        .with_state(AppState { server })
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// GET and DELETE on the MCP endpoint.
async fn method_not_allowed(method: Method) -> impl IntoResponse {
    info!("Received {} MCP request", method);
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(JsonRpcResponse::method_not_allowed()),
    )
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(State(state): State<AppState>, body: Bytes) -> Response {
    let request = match parse_request(&body) {
        Ok(request) => request,
        Err(rejection) => {
            warn!("Rejected MCP request: {:?}", rejection.error);
            return (StatusCode::BAD_REQUEST, Json(rejection)).into_response();
        }
    };

    tracing::Span::current().record("method", request.method.as_str());
    info!("Received MCP request: {}", request.method);

    if request.method.starts_with("notifications/") {
        info!("Received notification: {}", request.method);
        return StatusCode::ACCEPTED.into_response();
    }

    match process_request(&state, request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Error handling MCP request: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(JsonRpcResponse::internal_error()),
            )
                .into_response()
        }
    }
}

/// Parse the body into a JSON-RPC request, or the error response to send.
fn parse_request(body: &[u8]) -> Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| JsonRpcResponse::parse_error(format!("Parse error: {}", e)))?;

    let id = value.get("id").cloned().unwrap_or(Value::Null);
    let id_present = value.get("id").is_some();

    let request: JsonRpcRequest = serde_json::from_value(value)
        .map_err(|e| JsonRpcResponse::invalid_request(id.clone(), format!("Invalid Request: {}", e)))?;

    if request.jsonrpc != "2.0" {
        return Err(JsonRpcResponse::invalid_request(
            id,
            "Invalid Request: jsonrpc must be \"2.0\"",
        ));
    }

    if request.id.is_none() && !request.method.starts_with("notifications/") {
        let message = if id_present {
            "Invalid Request: id must not be null"
        } else {
            "Invalid Request: missing id"
        };
        return Err(JsonRpcResponse::invalid_request(Value::Null, message));
    }

    Ok(request)
}

/// Process a JSON-RPC request and return the response.
///
/// Errors the caller caused become JSON-RPC error responses; anything else is
/// returned as `Err` and reported as an HTTP 500.
async fn process_request(
    state: &AppState,
    request: JsonRpcRequest,
) -> Result<JsonRpcResponse, ToolError> {
    let id = request.id.unwrap_or(Value::Null);

    match request.method.as_str() {
        "initialize" => Ok(handle_initialize(state, id, request.params)),
        "ping" => Ok(JsonRpcResponse::success(id, json!({}))),
        "tools/list" => Ok(handle_tools_list(state, id)),
        "tools/call" => handle_tools_call(state, id, request.params).await,
        method => {
            warn!("Unknown method: {}", method);
            Ok(JsonRpcResponse::method_not_found(id, method))
        }
    }
}

/// Pick the protocol version to answer an `initialize` with.
fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|s| **s == v))
        .copied()
        .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0])
}

/// Handle initialize request.
fn handle_initialize(state: &AppState, id: Value, params: Option<Value>) -> JsonRpcResponse {
    let requested = params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str);
    let protocol_version = negotiate_protocol_version(requested);
    info!("Initializing with protocol version {}", protocol_version);

    JsonRpcResponse::success(
        id,
        json!({
            "protocolVersion": protocol_version,
            "capabilities": {
                "tools": { "listChanged": false }
            },
            "serverInfo": {
                "name": state.server.name(),
                "version": state.server.version()
            },
            "instructions": INSTRUCTIONS
        }),
    )
}

/// Handle tools/list request.
fn handle_tools_list(state: &AppState, id: Value) -> JsonRpcResponse {
    JsonRpcResponse::success(id, json!({ "tools": state.server.list_tools() }))
}

/// Handle tools/call request.
async fn handle_tools_call(
    state: &AppState,
    id: Value,
    params: Option<Value>,
) -> Result<JsonRpcResponse, ToolError> {
    let Some(params) = params else {
        return Ok(JsonRpcResponse::invalid_params(id, "Missing params"));
    };

    let request: ToolRequest = match serde_json::from_value(params) {
        Ok(request) => request,
        Err(e) => {
            return Ok(JsonRpcResponse::invalid_params(
                id,
                format!("Invalid tools/call params: {}", e),
            ));
        }
    };

    match state.server.dispatch(request).await {
        Ok(result) => {
            let result =
                serde_json::to_value(result).map_err(|e| ToolError::internal(e.to_string()))?;
            Ok(JsonRpcResponse::success(id, result))
        }
        Err(e) if e.is_client_error() => {
            warn!("Tool call rejected: {}", e);
            Ok(JsonRpcResponse::error(id, e.code(), e.to_string()))
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use axum::body::Body;
    use http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;
    use wiremock::matchers::{any, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app_for(base_url: &str) -> Router {
        let mut config = Config::default();
        config.upstream.base_url = base_url.to_string();
        config.upstream.timeout_secs = 5;
        let server = McpServer::new(config).unwrap();
        build_router(server, &HttpConfig::default())
    }

    async fn app_with_mock() -> (MockServer, Router) {
        let upstream = MockServer::start().await;
        let app = app_for(&format!("{}/api/", upstream.uri()));
        (upstream, app)
    }

    fn post_json(body: Value) -> Request<Body> {
        post_raw(body.to_string())
    }

    fn post_raw(body: impl Into<String>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .header("accept", "application/json, text/event-stream")
            .body(Body::from(body.into()))
            .unwrap()
    }

    fn tool_call(id: i64, name: &str, arguments: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn method_not_allowed_body() -> Value {
        json!({
            "jsonrpc": "2.0",
            "error": { "code": -32000, "message": "Method not allowed." },
            "id": null
        })
    }

    #[tokio::test]
    async fn test_get_is_method_not_allowed() {
        let app = app_for("http://127.0.0.1:1/api/");
        let request = Request::builder()
            .method("GET")
            .uri("/mcp")
            .header("accept", "text/event-stream")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, method_not_allowed_body());
    }

    #[tokio::test]
    async fn test_delete_is_method_not_allowed() {
        let app = app_for("http://127.0.0.1:1/api/");
        let request = Request::builder()
            .method("DELETE")
            .uri("/mcp")
            .header("content-type", "application/json")
            .header("mcp-session-id", "abc")
            .body(Body::from(r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#))
            .unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, method_not_allowed_body());
    }

    #[tokio::test]
    async fn test_client_list_proxies_single_get() {
        let (upstream, app) = app_with_mock().await;
        Mock::given(method("GET"))
            .and(path("/api/client"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "result": "Contoso, Fabrikam" })),
            )
            .expect(1)
            .mount(&upstream)
            .await;

        let (status, body) = send(app, post_json(tool_call(7, "get-client-list", json!({})))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 7);
        assert_eq!(body["result"]["content"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["result"]["content"][0]["type"], "text");
        assert_eq!(body["result"]["content"][0]["text"], "Contoso, Fabrikam");
    }

    #[tokio::test]
    async fn test_account_tool_stringifies_result() {
        let (upstream, app) = app_with_mock().await;
        Mock::given(method("GET"))
            .and(path("/api/pipelineDetails/001368083"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "result": [{ "stage": "won" }] })),
            )
            .expect(1)
            .mount(&upstream)
            .await;

        let request = tool_call(
            8,
            "get-pipeline-details-by-account",
            json!({ "uduns": "001368083" }),
        );
        let (status, body) = send(app, post_json(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["content"][0]["text"], r#"[{"stage":"won"}]"#);
    }

    #[tokio::test]
    async fn test_upstream_error_status_passes_result_through() {
        let (upstream, app) = app_with_mock().await;
        Mock::given(method("GET"))
            .and(path("/api/forecast/42"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "result": "No forecast for account" })),
            )
            .expect(1)
            .mount(&upstream)
            .await;

        let request = tool_call(11, "get-forecast-by-account", json!({ "uduns": "42" }));
        let (status, body) = send(app, post_json(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 11);
        assert_eq!(body["result"]["content"][0]["text"], "No forecast for account");
    }

    #[tokio::test]
    async fn test_missing_uduns_is_invalid_params() {
        let (upstream, app) = app_with_mock().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&upstream)
            .await;

        let (status, body) = send(
            app,
            post_json(tool_call(3, "get-announcements-by-account", json!({}))),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 3);
        assert_eq!(body["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let app = app_for("http://127.0.0.1:1/api/");
        let (status, body) = send(app, post_json(tool_call(4, "nonexistent-tool", json!({})))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], INVALID_PARAMS);
        assert!(
            body["error"]["message"]
                .as_str()
                .unwrap()
                .contains("nonexistent-tool")
        );
    }

    #[tokio::test]
    async fn test_upstream_unreachable_is_internal_error() {
        let app = app_for("http://127.0.0.1:1/api/");
        let request = tool_call(5, "get-impact-by-account", json!({ "uduns": "42" }));

        let (status, body) = send(app, post_json(request)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({
                "jsonrpc": "2.0",
                "error": { "code": -32603, "message": "Internal server error" },
                "id": null
            })
        );
    }

    #[tokio::test]
    async fn test_upstream_garbage_is_internal_error() {
        let (upstream, app) = app_with_mock().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&upstream)
            .await;

        let (status, body) = send(app, post_json(tool_call(6, "get-client-list", json!({})))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], INTERNAL_ERROR);
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let app = app_for("http://127.0.0.1:1/api/");
        let (status, body) = send(app, post_raw("{ not json")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], PARSE_ERROR);
        assert_eq!(body["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_wrong_version_is_invalid_request() {
        let app = app_for("http://127.0.0.1:1/api/");
        let request = json!({ "jsonrpc": "1.0", "id": 9, "method": "ping" });
        let (status, body) = send(app, post_json(request)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], INVALID_REQUEST);
        assert_eq!(body["id"], 9);
    }

    #[tokio::test]
    async fn test_null_id_is_invalid_request() {
        let app = app_for("http://127.0.0.1:1/api/");

        let request = json!({ "jsonrpc": "2.0", "id": null, "method": "tools/list" });
        let (status, body) = send(app.clone(), post_json(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], INVALID_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid Request: id must not be null");
        assert_eq!(body["id"], Value::Null);

        let request = json!({ "jsonrpc": "2.0", "method": "tools/list" });
        let (status, body) = send(app, post_json(request)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid Request: missing id");
    }

    #[tokio::test]
    async fn test_initialize_advertises_identity() {
        let app = app_for("http://127.0.0.1:1/api/");
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "test", "version": "0.0.1" }
            }
        });

        let (status, body) = send(app, post_json(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["serverInfo"]["name"], "mcp-streamable-http");
        assert_eq!(body["result"]["serverInfo"]["version"], "1.0.0");
        assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
        assert!(body["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let app = app_for("http://127.0.0.1:1/api/");
        let request = json!({ "jsonrpc": "2.0", "id": 2, "method": "tools/list" });

        let (status, body) = send(app, post_json(request)).await;

        assert_eq!(status, StatusCode::OK);
        let tools = body["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 8);
        assert_eq!(tools[0]["name"], "get-client-list");
        assert_eq!(tools[7]["name"], "get-top-insights-by-account");
        assert_eq!(tools[7]["inputSchema"]["required"], json!(["uduns"]));
    }

    #[tokio::test]
    async fn test_notification_is_accepted() {
        let app = app_for("http://127.0.0.1:1/api/");
        let request = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });

        let (status, body) = send(app, post_json(request)).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let app = app_for("http://127.0.0.1:1/api/");
        let request = json!({ "jsonrpc": "2.0", "id": 10, "method": "resources/list" });

        let (status, body) = send(app, post_json(request)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"]["code"], METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health() {
        let app = app_for("http://127.0.0.1:1/api/");
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[test]
    fn test_negotiate_protocol_version() {
        assert_eq!(negotiate_protocol_version(Some("2025-03-26")), "2025-03-26");
        assert_eq!(negotiate_protocol_version(Some("1999-01-01")), "2025-06-18");
        assert_eq!(negotiate_protocol_version(None), "2025-06-18");
    }
}
