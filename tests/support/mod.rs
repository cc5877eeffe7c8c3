#![allow(dead_code)]

use axum::http::{header, HeaderMap};
use axum::Router;
use std::time::Duration;

use bosh_test::bosh;


/// `some-username:some-password`
pub const BASIC_AUTH: &str = "Basic c29tZS11c2VybmFtZTpzb21lLXBhc3N3b3Jk";


/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}


pub fn authorized(headers: &HeaderMap) -> bool {
    headers.get(header::AUTHORIZATION).and_then(|value| value.to_str().ok()) == Some(BASIC_AUTH)
}


pub fn client(url: &str) -> bosh::Client {
    bosh::Client::new(bosh::Config {
        url: url.to_string(),
        username: "some-username".to_string(),
        password: "some-password".to_string(),
        task_polling_interval: Duration::from_millis(1),
        ..bosh::Config::default()
    }).unwrap()
}
