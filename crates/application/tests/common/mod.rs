//! In-process admin backend used by the integration tests.
#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use bastion_application::{
    ApiClient, ClientSettings, HttpTransport, MemorySessionStorage, SessionStore, TransportError,
    TransportRequest,
};
use bastion_domain::{ApiResponse, BaseUrl, HttpMethod};
use parking_lot::Mutex;
use serde_json::{Value, json};

pub const BASE_URL: &str = "http://admin.test";
pub const PASSWORD: &str = "correct-horse";

#[derive(Debug)]
struct BackendState {
    generation: usize,
    access_token: String,
    refresh_token: String,
    refresh_status: u16,
    always_unauthorized: bool,
    unreachable: Vec<String>,
}

/// Fake admin API with rotating tokens.
///
/// Every call yields to the runtime once before answering so concurrent
/// callers interleave.
#[derive(Debug, Clone)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState {
                generation: 1,
                access_token: "access-1".to_string(),
                refresh_token: "refresh-1".to_string(),
                refresh_status: 200,
                always_unauthorized: false,
                unreachable: Vec::new(),
            })),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Invalidates the current access token; the refresh token stays valid.
    pub fn expire_access_token(&self) {
        self.state.lock().access_token = "revoked".to_string();
    }

    pub fn fail_refresh_with(&self, status: u16) {
        self.state.lock().refresh_status = status;
    }

    pub fn reject_every_token(&self) {
        self.state.lock().always_unauthorized = true;
    }

    /// Makes requests to `path` fail without a response.
    pub fn make_unreachable(&self, path: &str) {
        self.state.lock().unreachable.push(path.to_string());
    }

    pub fn current_access_token(&self) -> String {
        self.state.lock().access_token.clone()
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.url.path() == path)
            .count()
    }

    pub fn last_request_to(&self, path: &str) -> Option<TransportRequest> {
        self.requests
            .lock()
            .iter()
            .rev()
            .find(|r| r.url.path() == path)
            .cloned()
    }

    fn route(&self, request: &TransportRequest) -> Result<ApiResponse, TransportError> {
        let mut state = self.state.lock();
        if state.unreachable.iter().any(|p| p == request.url.path()) {
            return Err(TransportError::ConnectionRefused {
                host: "admin.test".to_string(),
                port: 80,
            });
        }
        let authorized = !state.always_unauthorized
            && request.header("Authorization")
                == Some(format!("Bearer {}", state.access_token).as_str());
        let body: Value = request
            .body
            .as_deref()
            .map_or(Value::Null, |b| serde_json::from_slice(b).unwrap());

        let response = match (request.method, request.url.path()) {
            (HttpMethod::Post, "/api/auth/admin/login") => {
                if body["password"] == PASSWORD {
                    json_response(
                        200,
                        &json!({
                            "accessToken": state.access_token,
                            "refreshToken": state.refresh_token,
                            "user": user_json(),
                        }),
                    )
                } else {
                    json_response(
                        401,
                        &json!({ "message": "Invalid credentials", "statusCode": 401 }),
                    )
                }
            }
            (HttpMethod::Post, "/api/auth/refresh") => {
                if state.refresh_status != 200 {
                    json_response(
                        state.refresh_status,
                        &json!({ "message": "Refresh failed", "success": false }),
                    )
                } else if body["refreshToken"] == state.refresh_token.as_str() {
                    state.generation += 1;
                    state.access_token = format!("access-{}", state.generation);
                    state.refresh_token = format!("refresh-{}", state.generation);
                    json_response(
                        200,
                        &json!({
                            "success": true,
                            "data": {
                                "accessToken": state.access_token,
                                "refreshToken": state.refresh_token,
                            },
                        }),
                    )
                } else {
                    json_response(401, &json!({ "message": "Invalid refresh token" }))
                }
            }
            (HttpMethod::Post, "/api/auth/logout") => ApiResponse::new(204, vec![], Vec::new()),
            _ if !authorized => json_response(401, &json!({ "message": "Token expired" })),
            (HttpMethod::Get, "/api/auth/me") => {
                json_response(200, &json!({ "success": true, "data": user_json() }))
            }
            (HttpMethod::Get, "/api/admin/tenants") => json_response(
                200,
                &json!({
                    "success": true,
                    "data": [{ "id": "t-1", "name": "Acme" }, { "id": "t-2", "name": "Globex" }],
                }),
            ),
            (HttpMethod::Get, "/api/admin/settings") => {
                json_response(403, &json!({ "message": ["Forbidden resource", "missing scope"] }))
            }
            (HttpMethod::Post, "/api/admin/tenants/t-9/suspend") => json_response(
                200,
                &json!({ "success": false, "message": "Tenant already suspended" }),
            ),
            _ => json_response(404, &json!({ "message": "Cannot find route" })),
        };
        Ok(response)
    }
}

impl HttpTransport for FakeBackend {
    async fn execute(&self, request: &TransportRequest) -> Result<ApiResponse, TransportError> {
        tokio::task::yield_now().await;
        self.requests.lock().push(request.clone());
        self.route(request)
    }
}

pub fn json_response(status: u16, body: &Value) -> ApiResponse {
    ApiResponse::new(
        status,
        vec![("content-type".to_string(), "application/json".to_string())],
        serde_json::to_vec(body).unwrap(),
    )
}

pub fn user_json() -> Value {
    json!({
        "id": "u-1",
        "email": "ops@example.com",
        "firstName": "Ada",
        "lastName": "Ops",
        "role": "support_admin",
        "permissions": ["tenants.read", "tickets.write"],
        "twoFactorEnabled": false,
    })
}

pub fn settings() -> ClientSettings {
    ClientSettings::new(BaseUrl::parse(BASE_URL).unwrap())
}

/// Client wired to a fresh backend and an empty in-memory storage.
pub fn client() -> (FakeBackend, MemorySessionStorage, ApiClient<FakeBackend>) {
    let backend = FakeBackend::new();
    let storage = MemorySessionStorage::new();
    let client = ApiClient::new(
        backend.clone(),
        SessionStore::new(Arc::new(storage.clone())),
        settings(),
    );
    (backend, storage, client)
}
