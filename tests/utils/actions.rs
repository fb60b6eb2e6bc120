use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt; // for `oneshot`

use coderoom::{InboundMessage, RelayEvent};

use super::setup::TestSetup;

const BOUNDARY: &str = "coderoom-test-boundary";

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Feed one raw frame from a client through the relay
    pub async fn send_raw(&self, client: &str, raw: &str) {
        self.app_state
            .relay
            .handle_event(self.client(client), RelayEvent::parse(raw.as_bytes()))
            .await;
    }

    pub async fn send_join(&self, client: &str, room: &str) {
        self.send_raw(client, &serde_json::json!({"type": "join", "room": room}).to_string())
            .await;
    }

    pub async fn send_text(&self, client: &str, text: &str) {
        self.app_state
            .relay
            .handle_event(
                self.client(client),
                RelayEvent::Message(InboundMessage::Text {
                    text: text.to_string(),
                }),
            )
            .await;
    }

    pub async fn disconnect(&self, client: &str) {
        self.app_state
            .relay
            .handle_event(self.client(client), RelayEvent::Disconnect)
            .await;
    }

    /// GET /api/create-room, returning the issued code
    pub async fn create_room(&self) -> String {
        let request = Request::builder()
            .uri("/api/create-room")
            .body(Body::empty())
            .unwrap();
        let (status, body) = self.call(request).await;
        assert_eq!(status, StatusCode::OK);
        body["roomCode"].as_str().unwrap().to_string()
    }

    /// POST /api/upload with optional room and file parts
    pub async fn upload(
        &self,
        room: Option<&str>,
        file: Option<(&str, &[u8])>,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(room, file)))
            .unwrap();
        self.call(request).await
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }
}

fn multipart_body(room: Option<&str>, file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(room) = room {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"room\"\r\n\r\n{room}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
