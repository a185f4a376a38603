//! In-process HTTP server for gateway and dispatcher tests.

use axum::http::HeaderMap;
use axum::Router;
use serde_json::{json, Value};

use crate::gateway::TOKEN_HEADER;

/// Serve `router` on an ephemeral port and return its base URL.
pub(crate) async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub(crate) fn token_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

pub(crate) fn document_json(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "",
        "patientId": "p1",
        "doctorId": "d1",
        "fileUrl": format!("/uploads/{id}.pdf"),
        "uploadDate": "2024-03-01T10:00:00Z",
        "isPrivate": true,
        "tags": []
    })
}

pub(crate) fn patient_json(name: &str) -> Value {
    json!({
        "_id": "u1",
        "name": name,
        "email": "asha@example.com",
        "userType": "patient",
        "aadhaarNumber": "123412341234"
    })
}
