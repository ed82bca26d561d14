#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use hbnb_portal::session::{ManualClock, MemoryCookieJar, SessionStore};
use hbnb_portal::{Portal, PortalConfig};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;

/// Path prefix the mock API is mounted under, like the real deployment.
pub const API_PREFIX: &str = "/api/v1";

/// One request seen by the mock API.
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: Method,
    /// Path relative to [`API_PREFIX`].
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl Hit {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

type Responder = Arc<dyn Fn(&Hit) -> (StatusCode, String) + Send + Sync>;

struct MockRoute {
    responder: Responder,
    delay: Option<Duration>,
}

struct MockState {
    routes: HashMap<(Method, String), MockRoute>,
    hits: Mutex<Vec<Hit>>,
}

/// Builder for a fake listing API.
pub struct MockApi {
    routes: HashMap<(Method, String), MockRoute>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Answer `method path` with a fixed JSON body.
    pub fn json(self, method: Method, path: &str, status: u16, body: Value) -> Self {
        self.raw(method, path, status, &body.to_string())
    }

    /// Answer `method path` with a fixed raw body.
    pub fn raw(self, method: Method, path: &str, status: u16, body: &str) -> Self {
        let status = StatusCode::from_u16(status).expect("Invalid status");
        let body = body.to_string();
        self.respond_with(method, path, move |_| (status, body.clone()))
    }

    /// Answer `method path` by inspecting the request.
    pub fn respond_with(
        mut self,
        method: Method,
        path: &str,
        responder: impl Fn(&Hit) -> (StatusCode, String) + Send + Sync + 'static,
    ) -> Self {
        self.routes.insert(
            (method, path.to_string()),
            MockRoute {
                responder: Arc::new(responder),
                delay: None,
            },
        );
        self
    }

    /// Hold the response to `method path` back for `delay`.
    pub fn delayed(mut self, method: Method, path: &str, delay: Duration) -> Self {
        if let Some(route) = self.routes.get_mut(&(method, path.to_string())) {
            route.delay = Some(delay);
        }
        self
    }

    pub async fn start(self) -> TestContext {
        let state = Arc::new(MockState {
            routes: self.routes,
            hits: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local address");
        let server_handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let base_url = Url::parse(&format!("http://{addr}{API_PREFIX}")).expect("Invalid URL");

        TestContext {
            base_url,
            state,
            server_handle,
        }
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header = |name: HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let hit = Hit {
        method: method.clone(),
        path: uri
            .path()
            .strip_prefix(API_PREFIX)
            .unwrap_or(uri.path())
            .to_string(),
        authorization: header(AUTHORIZATION),
        content_type: header(CONTENT_TYPE),
        body,
    };
    state.hits.lock().unwrap().push(hit.clone());

    let Some(route) = state.routes.get(&(method, hit.path.clone())) else {
        return (
            StatusCode::NOT_FOUND,
            [(CONTENT_TYPE, "application/json")],
            json!({ "error": "Not found" }).to_string(),
        )
            .into_response();
    };

    if let Some(delay) = route.delay {
        tokio::time::sleep(delay).await;
    }

    let (status, body) = (route.responder)(&hit);
    (status, [(CONTENT_TYPE, "application/json")], body).into_response()
}

pub struct TestContext {
    pub base_url: Url,
    state: Arc<MockState>,
    server_handle: tokio::task::JoinHandle<()>,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

impl TestContext {
    pub fn config(&self) -> PortalConfig {
        PortalConfig::new(self.base_url.clone())
    }

    /// Portal with a fresh in-memory jar.
    pub fn portal(&self) -> Portal {
        Portal::new(self.config(), Arc::new(MemoryCookieJar::new()))
            .expect("Failed to build portal")
    }

    /// Portal that already holds `token`.
    pub fn logged_in_portal(&self, token: &str) -> Portal {
        let portal = self.portal();
        portal.session().set_token(token).expect("Failed to store token");
        portal
    }

    /// Portal whose jar and store share a manual clock.
    pub fn portal_with_clock(&self, clock: Arc<ManualClock>) -> Portal {
        let jar = Arc::new(MemoryCookieJar::with_clock(clock.clone()));
        Portal::with_session(self.config(), SessionStore::with_clock(jar, clock))
            .expect("Failed to build portal")
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.state.hits.lock().unwrap().clone()
    }

    pub fn hits_for(&self, method: Method, path: &str) -> Vec<Hit> {
        self.hits()
            .into_iter()
            .filter(|hit| hit.method == method && hit.path == path)
            .collect()
    }

    pub fn hit_count(&self) -> usize {
        self.state.hits.lock().unwrap().len()
    }
}

/// A base URL nothing listens on.
pub async fn unreachable_base() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local address");
    drop(listener);
    Url::parse(&format!("http://{addr}{API_PREFIX}")).expect("Invalid URL")
}

pub const TOKEN: &str = "eyJhbGciOiJIUzI1NiJ9.eyJzdWIiOiJ1MSJ9.sig";

/// A small API with two users, two places, amenities and reviews.
///
/// `POST /auth/login` accepts `ada@example.com` / `secret`. `POST /reviews`
/// requires `Bearer TOKEN`, rejects a second review of `p1` and reviews of
/// the reviewer's own place `p2`.
pub fn hbnb_api() -> MockApi {
    MockApi::new()
        .respond_with(Method::POST, "/auth/login", |hit| {
            let body = hit.json();
            if body["email"] == "ada@example.com" && body["password"] == "secret" {
                (StatusCode::OK, json!({ "access_token": TOKEN }).to_string())
            } else {
                (
                    StatusCode::UNAUTHORIZED,
                    json!({ "error": "Invalid credentials" }).to_string(),
                )
            }
        })
        .json(
            Method::GET,
            "/places",
            200,
            json!([
                {
                    "id": "p1",
                    "title": "Cozy Loft",
                    "price": 80.0,
                    "latitude": 45.76,
                    "longitude": 4.83,
                    "owner_id": "u2",
                    "country": "France"
                },
                {
                    "id": "p2",
                    "title": "Beach Villa",
                    "price": 250.0,
                    "owner_id": "u1",
                    "country": "Spain"
                }
            ]),
        )
        .json(
            Method::GET,
            "/places/p1",
            200,
            json!({
                "id": "p1",
                "title": "Cozy Loft",
                "description": "Quiet loft near the river",
                "price": 80.0,
                "owner_id": "u2",
                "amenities": ["a1", "Balcony", { "id": "a2", "name": "Kitchen" }]
            }),
        )
        .json(
            Method::GET,
            "/places/p2",
            200,
            json!({
                "id": "p2",
                "title": "Beach Villa",
                "price": 250.0,
                "owner": { "id": "u1", "first_name": "Ada", "last_name": "Lovelace" },
                "amenities": []
            }),
        )
        .json(
            Method::GET,
            "/users/u1",
            200,
            json!({ "id": "u1", "first_name": "Ada", "last_name": "Lovelace" }),
        )
        .json(
            Method::GET,
            "/users/u2",
            200,
            json!({ "id": "u2", "first_name": "Grace", "last_name": "Hopper" }),
        )
        .json(
            Method::GET,
            "/amenities/a1",
            200,
            json!({ "id": "a1", "name": "Wifi" }),
        )
        .json(
            Method::GET,
            "/reviews/place/p1",
            200,
            json!([
                { "id": "r1", "text": "Lovely stay", "rating": 5, "user_id": "u1" },
                { "id": "r2", "text": "", "rating": 3, "user_id": "ghost" },
                { "id": "r3", "comment": "Would return", "rating": 4, "user_id": "u1" }
            ]),
        )
        .json(Method::GET, "/reviews/place/p2", 200, json!([]))
        .respond_with(Method::POST, "/reviews", |hit| {
            if hit.authorization.as_deref() != Some(format!("Bearer {TOKEN}").as_str()) {
                return (
                    StatusCode::UNAUTHORIZED,
                    json!({ "message": "Token has expired" }).to_string(),
                );
            }
            let body = hit.json();
            match body["place_id"].as_str() {
                Some("p1") => (
                    StatusCode::BAD_REQUEST,
                    json!({ "message": "You have already reviewed this place" }).to_string(),
                ),
                Some("p2") => (
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "You cannot review your own place" }).to_string(),
                ),
                _ => (
                    StatusCode::CREATED,
                    json!({ "id": "r9", "place_id": body["place_id"], "text": body["text"] })
                        .to_string(),
                ),
            }
        })
}
