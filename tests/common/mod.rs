//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use course_router::config::{CourseConfig, RouterConfig, UserConfig};
use course_router::{HttpServer, Shutdown};

/// Default routes plus a course and three users:
/// `alice` (member), `bob` (not a member) and `root` (superuser).
pub fn test_config() -> RouterConfig {
    let mut config = RouterConfig::default();
    config.users = vec![
        user("alice", false),
        user("bob", false),
        user("root", true),
    ];
    config.courses = vec![CourseConfig {
        semester: "2024_fall".into(),
        course: "cs101".into(),
        members: vec!["alice".into()],
    }];
    config
}

fn user(id: &str, superuser: bool) -> UserConfig {
    UserConfig {
        id: id.into(),
        name: String::new(),
        superuser,
    }
}

/// A running server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a server with the built-in handlers.
pub async fn spawn_server(config: RouterConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::with_builtin_handlers(config).unwrap();
    let shutdown = Shutdown::new();
    let (_tx, updates) = mpsc::unbounded_channel();

    let running = shutdown.clone();
    tokio::spawn(async move {
        server.run(listener, updates, running).await.unwrap();
    });

    TestServer { addr, shutdown }
}

/// Client that does not follow redirects and keeps no cookies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// Sign in as `user_id` through the login-check route, returning the session id.
pub async fn login(server: &TestServer, user_id: &str) -> String {
    let body: serde_json::Value = client()
        .post(server.url(&format!("/authentication/check_login?user_id={user_id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "success", "login failed: {body}");
    body["data"]["session_id"].as_str().unwrap().to_string()
}
