//! In-process stand-in for the Booknetic app plugin routes.
//!
//! Each test spawns its own [`MockPlugin`] on an ephemeral port and tweaks
//! its behavior through the shared state.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "secret";

/// How a route should answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Ok,
    Status(StatusCode),
    /// 200 with a body that is not JSON.
    Garbage,
    /// Wait this long before answering 200.
    Delay(Duration),
}

#[derive(Debug)]
pub struct MockState {
    pub info: Reply,
    pub info_body: Value,
    pub logout: Reply,
    pub app_content: Reply,
    pub posts: Reply,
    /// Query strings seen by `GET posts`, in order.
    pub post_queries: Vec<HashMap<String, String>>,
    /// Bodies seen by `POST contact`.
    pub contact_bodies: Vec<Value>,
    /// `Accept` header of the most recent info probe.
    pub info_accept: Option<String>,
    /// `Content-Type` header of the most recent `GET posts`.
    pub posts_content_type: Option<String>,
    /// `Accept` header of the most recent `GET posts`.
    pub posts_accept: Option<String>,
    pub logout_calls: usize,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            info: Reply::Ok,
            info_body: json!({
                "site_name": "Studio Bookings",
                "app_name": "Studio App",
                "api_version": "1.2.0",
                "features": { "booking": true, "posts": true }
            }),
            logout: Reply::Ok,
            app_content: Reply::Ok,
            posts: Reply::Ok,
            post_queries: Vec::new(),
            contact_bodies: Vec::new(),
            info_accept: None,
            posts_content_type: None,
            posts_accept: None,
            logout_calls: 0,
        }
    }
}

#[derive(Clone, Default)]
pub struct MockPlugin {
    pub state: Arc<Mutex<MockState>>,
}

impl MockPlugin {
    /// Start serving on 127.0.0.1 and return the site's base url.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock plugin");
        let addr: SocketAddr = listener.local_addr().expect("No local addr");
        let app = router(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Mock plugin crashed");
        });
        format!("http://{}", addr)
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        let mut state = self.state.lock().expect("mock state poisoned");
        f(&mut state)
    }
}

/// A url nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("No local addr");
    drop(listener);
    format!("http://{}", addr)
}

fn router(plugin: MockPlugin) -> Router {
    let api = Router::new()
        .route("/info", get(info))
        .route("/app-content", get(app_content))
        .route("/posts", get(list_posts))
        .route("/posts/{id}", get(get_post))
        .route("/pages", get(pages))
        .route("/categories", get(categories))
        .route("/contact", post(contact))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/user", get(current_user));

    Router::new()
        .nest("/wp-json/booknetic-app/v1", api)
        .with_state(plugin)
}

async fn answer(reply: Reply, body: Value) -> Response {
    match reply {
        Reply::Ok => Json(body).into_response(),
        Reply::Status(status) => (status, "mock failure").into_response(),
        Reply::Garbage => (
            [(header::CONTENT_TYPE, "application/json")],
            "<html>not json</html>",
        )
            .into_response(),
        Reply::Delay(delay) => {
            tokio::time::sleep(delay).await;
            Json(body).into_response()
        }
    }
}

fn sample_post(id: u64, featured: bool) -> Value {
    json!({
        "id": id,
        "title": format!("Post {}", id),
        "excerpt": "Short summary",
        "date": "2026-01-15T10:00:00",
        "link": format!("https://studio.example/?p={}", id),
        "featured_image": if featured { json!("https://studio.example/img.jpg") } else { Value::Null },
        "author": "staff"
    })
}

async fn info(State(plugin): State<MockPlugin>, headers: HeaderMap) -> Response {
    let (reply, body) = plugin.with(|s| {
        s.info_accept = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        (s.info.clone(), s.info_body.clone())
    });
    answer(reply, body).await
}

async fn app_content(State(plugin): State<MockPlugin>) -> Response {
    let reply = plugin.with(|s| s.app_content.clone());
    answer(
        reply,
        json!({
            "hero_section": {
                "title": "Book your next class",
                "subtitle": "Yoga, pilates and more",
                "button_text": "Book now"
            },
            "features": [
                { "title": "Easy booking", "description": "Two taps", "icon": "calendar" },
                { "title": "Reminders", "description": "Never miss a class" }
            ],
            "contact_info": { "phone": "+1 555 0100", "email": "hello@studio.example" }
        }),
    )
    .await
}

async fn list_posts(
    State(plugin): State<MockPlugin>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let per_page: u64 = query
        .get("per_page")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);
    let reply = plugin.with(|s| {
        s.posts_content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        s.posts_accept = headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        s.post_queries.push(query);
        s.posts.clone()
    });
    let posts: Vec<Value> = (1..=per_page).map(|id| sample_post(id, id % 2 == 1)).collect();
    answer(reply, json!({ "posts": posts, "total": 42, "pages": 5 })).await
}

async fn get_post(Path(id): Path<u64>) -> Response {
    if id == 404 {
        return (StatusCode::NOT_FOUND, "no such post").into_response();
    }
    Json(sample_post(id, true)).into_response()
}

async fn pages() -> Json<Value> {
    Json(json!([
        { "id": 2, "title": "About", "content": "<p>About us</p>", "link": "https://studio.example/about" },
        { "id": 3, "title": "Pricing" }
    ]))
}

async fn categories() -> Json<Value> {
    Json(json!([
        { "id": 1, "name": "News", "slug": "news", "count": 4 },
        { "id": 5, "name": "Classes", "slug": "classes" }
    ]))
}

async fn contact(State(plugin): State<MockPlugin>, Json(body): Json<Value>) -> Json<Value> {
    plugin.with(|s| s.contact_bodies.push(body));
    Json(json!({ "success": true, "message": "Thanks" }))
}

async fn login(Json(body): Json<Value>) -> Response {
    let username = body.get("username").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    if username == Some(USERNAME) && password == Some(PASSWORD) {
        Json(json!({
            "success": true,
            "user": {
                "id": 7,
                "username": USERNAME,
                "displayName": "Alice Smith",
                "email": "alice@studio.example",
                "roles": ["subscriber"]
            }
        }))
        .into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response()
    }
}

async fn logout(State(plugin): State<MockPlugin>) -> Response {
    let reply = plugin.with(|s| {
        s.logout_calls += 1;
        s.logout.clone()
    });
    answer(reply, json!({ "success": true })).await
}

async fn current_user() -> Json<Value> {
    Json(json!({ "username": USERNAME, "display_name": "Alice S." }))
}
