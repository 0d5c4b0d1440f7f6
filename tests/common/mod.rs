#![allow(dead_code)]

use mockito::ServerGuard;
use reqwest::Client;
use serde_json::json;
use videyhost::client::ApiClient;
use videyhost::models::User;
use videyhost::services::SessionStore;

pub fn api(server: &ServerGuard) -> ApiClient {
    ApiClient::with_client(server.url(), Client::new())
}

pub fn video_body(id: u64) -> String {
    json!({
        "video_id": id,
        "video_url": format!("https://cdn.videy.co/{}.mp4", id),
        "title": "Sunset at Kuta",
        "description": "Golden hour",
        "duration": "00:42",
        "upload_date": "2024-10-01 08:00:00",
    })
    .to_string()
}

pub fn signed_in(user_id: u64) -> SessionStore {
    let session = SessionStore::in_memory();
    session
        .set_user(&User {
            user_id,
            username: Some("rina".to_string()),
            email: Some("rina@example.com".to_string()),
            name: Some("Rina".to_string()),
        })
        .unwrap();
    session
}
