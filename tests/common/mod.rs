#![allow(dead_code)]

use async_trait::async_trait;
use byteorder::{LittleEndian, WriteBytesExt};
use dominions_status::api::{GameApi, GameDetails, NationEntry};
use dominions_status::protocol::packet::{GeneralInfo, NUM_NATIONS, PAYLOAD_OFFSET, STATUS_REQUEST};
use dominions_status::{GameId, StatusError};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde_json::{json, Value};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpListener;

/// A status body with sentinel values everywhere except what the test cares about.
pub fn general_info(name: &str, turn: u32, remaining_ms: u32) -> GeneralInfo {
    GeneralInfo {
        preamble: [0xAA; 6],
        name: name.to_string(),
        settings: [0xBB; 6],
        remaining_ms,
        timer_flag: 0xCC,
        nation_slots: vec![[0xDD, 0xEE, 0xFF]; NUM_NATIONS],
        turn,
        trailer: 0x1234_5678,
        tail: 0x99,
    }
}

pub fn frame(body: &[u8], compressed: bool) -> Vec<u8> {
    let payload = if compressed {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(body).unwrap();
        encoder.finish().unwrap()
    } else {
        body.to_vec()
    };

    let mut out = vec![b'f', if compressed { b'J' } else { b'H' }];
    out.write_u32::<LittleEndian>((PAYLOAD_OFFSET - 6 + payload.len()) as u32)
        .unwrap();
    out.write_u32::<LittleEndian>(body.len() as u32).unwrap();
    out.extend_from_slice(&payload);
    out
}

/// Loopback status server answering a single query with `reply`.
pub async fn status_server(reply: Vec<u8>) -> u16 {
    // Scoped here: tokio's AsyncWriteExt also covers Vec<u8> and would clash with byteorder.
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; STATUS_REQUEST.len()];
        socket.read_exact(&mut request).await.unwrap();
        assert_eq!(request, STATUS_REQUEST);
        socket.write_all(&reply).await.unwrap();
        let mut close = [0u8; 7];
        let _ = socket.read_exact(&mut close).await;
    });

    port
}

/// Hosting API double serving canned JSON.
pub struct MockApi {
    pub details: Value,
    pub status: Value,
    pub fail_nations: bool,
    pub calls: AtomicUsize,
}

impl MockApi {
    pub fn new(details: Value, status: Value) -> Self {
        Self {
            details,
            status,
            fail_nations: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn atlantis() -> Self {
        Self::new(
            json!({"name": "TestGame"}),
            json!({"nations": [
                {"nationid": 1, "name": "Atlantis", "epithet": "",
                 "controller": "1", "turnplayed": "2"}
            ]}),
        )
    }
}

#[async_trait]
impl GameApi for MockApi {
    async fn game_details(&self, _id: GameId) -> Result<GameDetails, StatusError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        serde_json::from_value(self.details.clone())
            .map_err(|e| StatusError::Upstream(e.to_string()))
    }

    async fn game_nations(&self, _id: GameId) -> Result<Vec<NationEntry>, StatusError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_nations {
            let message = "HTTP status server error (500)";
            return Err(StatusError::Upstream(message.into()));
        }
        let nations = self
            .status
            .get("nations")
            .cloned()
            .ok_or_else(|| StatusError::Upstream("missing nations".into()))?;
        serde_json::from_value(nations).map_err(|e| StatusError::Upstream(e.to_string()))
    }
}
