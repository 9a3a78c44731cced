//! Shared helpers: unique pipe names and scripted pipe servers.

use std::time::Duration;

use interprocess::local_socket::tokio::{Listener, Stream};
use interprocess::local_socket::traits::tokio::Listener as _;
use interprocess::local_socket::{GenericNamespaced, ListenerOptions, ToNsName};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::task::JoinHandle;

/// How a test server answers each chunk it receives.
#[derive(Debug, Clone, Copy)]
pub enum Responder {
    /// Write every chunk straight back.
    Echo,
    /// Write every chunk back after a delay.
    Delayed(Duration),
    /// Swallow the first chunk, echo the rest.
    SkipFirst,
    /// Accept the connection and close it at once.
    Hangup,
}

/// A pipe name no other test uses.
pub fn unique_pipe_name() -> String {
    format!("pipe-relay-test-{}", uuid::Uuid::new_v4())
}

/// Bind a listener for `name`; must be called inside a tokio runtime.
pub fn listen(name: &str) -> Listener {
    let ns_name = name
        .to_ns_name::<GenericNamespaced>()
        .expect("valid pipe name");
    ListenerOptions::new()
        .name(ns_name)
        .create_tokio()
        .expect("create pipe listener")
}

/// Serve one connection on `name`; the task yields every byte received.
pub fn spawn_server(name: &str, responder: Responder) -> JoinHandle<Vec<u8>> {
    let listener = listen(name);
    tokio::spawn(async move {
        let stream = listener.accept().await.expect("accept relay connection");
        serve(stream, responder).await
    })
}

async fn serve(mut stream: Stream, responder: Responder) -> Vec<u8> {
    let mut seen = Vec::new();
    if matches!(responder, Responder::Hangup) {
        return seen;
    }

    let mut buf = [0_u8; 4096];
    let mut chunk_index = 0_usize;
    loop {
        let n = match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        seen.extend_from_slice(&buf[..n]);

        let reply = match responder {
            Responder::Echo => true,
            Responder::Delayed(delay) => {
                tokio::time::sleep(delay).await;
                true
            }
            Responder::SkipFirst => chunk_index > 0,
            Responder::Hangup => false,
        };
        chunk_index += 1;

        if reply && stream.write_all(&buf[..n]).await.is_err() {
            break;
        }
    }
    seen
}
