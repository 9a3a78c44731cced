//! Client side of the named channel.
//!
//! Pipe names are resolved with the `interprocess` crate's namespaced
//! naming: a named pipe under `\\.\pipe\` on Windows and a local socket in
//! the platform's socket namespace elsewhere. The relay never creates or
//! hosts the endpoint; a server must already be listening.

use interprocess::local_socket::tokio::Stream;
use interprocess::local_socket::traits::tokio::Stream as _;
use interprocess::local_socket::{GenericNamespaced, ToNsName};
use tracing::{debug, info};

use crate::{AppError, Result};

/// Connected, bidirectional channel stream.
pub type Channel = Stream;

/// Fully-qualified address a pipe name resolves to, for display.
#[must_use]
pub fn pipe_address(name: &str) -> String {
    if cfg!(windows) {
        format!(r"\\.\pipe\{name}")
    } else if cfg!(any(target_os = "linux", target_os = "android")) {
        format!("@{name}")
    } else {
        format!("/tmp/{name}")
    }
}

/// Open an existing channel by its logical name.
///
/// # Errors
///
/// Returns `AppError::Connect` if the name is not valid on this platform or
/// no server accepts the connection.
pub async fn connect(name: &str) -> Result<Channel> {
    let address = pipe_address(name);
    debug!(%address, "resolving pipe name");

    let ns_name = name
        .to_ns_name::<GenericNamespaced>()
        .map_err(AppError::Connect)?;
    let stream = Stream::connect(ns_name).await.map_err(AppError::Connect)?;

    info!(%address, "connected to pipe");
    Ok(stream)
}
