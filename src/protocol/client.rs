// src/protocol/client.rs
use log::{debug, error};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use super::packet::{self, close_request, expected_frame_len, MAX_FRAME_LEN, STATUS_REQUEST};
use crate::error::StatusError;
use crate::models::game::GameStatus;

/// Deadline for the whole exchange: connect, request, reply and close.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

const RECV_CHUNK: usize = 512;

/// Asks the status server at `host:port` for the current turn and timer.
pub async fn query(host: &str, port: u16) -> Result<GameStatus, StatusError> {
    query_with_timeout(host, port, QUERY_TIMEOUT).await
}

pub async fn query_with_timeout(
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<GameStatus, StatusError> {
    let addr = format!("{}:{}", host, port);

    // Dropping the exchange future on timeout drops the stream with it.
    let frame = match tokio::time::timeout(timeout, exchange(&addr)).await {
        Ok(result) => result?,
        Err(_) => {
            error!("Timed out querying status server {} after {:?}", addr, timeout);
            return Err(StatusError::Timeout { addr, after: timeout });
        }
    };

    debug!("Received {} byte status frame from {}", frame.len(), addr);

    let info = packet::decode_frame(&frame).map_err(|e| {
        error!("Failed to decode status frame from {}: {}", addr, e);
        e
    })?;

    debug!(
        "Status from {}: name={:?} turn={} remaining_ms={}",
        addr, info.name, info.turn, info.remaining_ms
    );
    Ok(info.status())
}

async fn exchange(addr: &str) -> Result<Vec<u8>, StatusError> {
    let connection_error = |source: std::io::Error| {
        error!("Status server {} connection failed: {}", addr, source);
        StatusError::Connection {
            addr: addr.to_string(),
            source,
        }
    };

    let mut stream = TcpStream::connect(addr).await.map_err(connection_error)?;
    debug!("Connected to status server {}", addr);

    stream
        .write_all(&STATUS_REQUEST)
        .await
        .map_err(connection_error)?;
    let frame = read_frame(&mut stream).await.map_err(connection_error)?;

    if let Err(e) = stream.write_all(&close_request()).await {
        debug!("Could not send close request to {}: {}", addr, e);
    }
    if let Err(e) = stream.shutdown().await {
        debug!("Could not shut down connection to {}: {}", addr, e);
    }

    Ok(frame)
}

/// Reads until the frame announced by its header is complete, the peer hangs up,
/// or the frame outgrows anything a status server sends.
async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut frame = Vec::with_capacity(RECV_CHUNK);
    let mut chunk = [0u8; RECV_CHUNK];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        frame.extend_from_slice(&chunk[..n]);

        if frame.len() >= MAX_FRAME_LEN {
            break;
        }
        if let Some(expected) = expected_frame_len(&frame) {
            if frame.len() >= expected {
                break;
            }
        }
    }

    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::packet::HEADER_LEN;
    use crate::protocol::test_support::{body, frame};
    use tokio::net::TcpListener;

    /// Serves one reply and hands back what the client sent before and after it.
    async fn serve_once(reply: Vec<u8>) -> (u16, tokio::task::JoinHandle<(Vec<u8>, Vec<u8>)>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; STATUS_REQUEST.len()];
            socket.read_exact(&mut request).await.unwrap();
            socket.write_all(&reply).await.unwrap();
            let mut close = vec![0u8; HEADER_LEN];
            socket.read_exact(&mut close).await.unwrap();
            (request, close)
        });

        (port, handle)
    }

    #[tokio::test]
    async fn query_reads_compressed_reply() {
        let (port, server) = serve_once(frame(&body(b"TestGame\0\0", 42, 3_600_000), true)).await;

        let status = query("127.0.0.1", port).await.unwrap();
        assert_eq!(status.name, "TestGame");
        assert_eq!(status.turn, 42);
        assert_eq!(status.hours_remaining, 1.0);

        let (request, close) = server.await.unwrap();
        assert_eq!(request, STATUS_REQUEST);
        assert_eq!(close, close_request());
    }

    #[tokio::test]
    async fn query_reads_reply_larger_than_one_chunk() {
        let reply = frame(&body(b"Big\0", 7, 7_200_000), false);
        assert!(reply.len() > RECV_CHUNK);
        let (port, server) = serve_once(reply).await;

        let status = query("127.0.0.1", port).await.unwrap();
        assert_eq!(status.turn, 7);
        assert_eq!(status.hours_remaining, 2.0);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn garbage_reply_is_a_decode_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; STATUS_REQUEST.len()];
            socket.read_exact(&mut request).await.unwrap();
            socket.write_all(b"fH").await.unwrap();
        });

        let err = query("127.0.0.1", port).await.unwrap_err();
        assert!(matches!(err, StatusError::Decode(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let err = query_with_timeout("127.0.0.1", port, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, StatusError::Timeout { .. }), "got {:?}", err);
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn refused_connection_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = query("127.0.0.1", port).await.unwrap_err();
        assert!(matches!(err, StatusError::Connection { .. }), "got {:?}", err);
    }
}
