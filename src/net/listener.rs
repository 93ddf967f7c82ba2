//! Ephemeral TCP listener for local relays.
//!
//! # Responsibilities
//! - Bind to a free port chosen by the operating system
//! - Report the bound address for relay URL construction

use std::net::SocketAddr;

use tokio::net::TcpListener;

/// A bound listener and the address the OS gave it.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind `host` on port 0.
    pub async fn bind_ephemeral(host: &str) -> std::io::Result<Self> {
        let inner = TcpListener::bind((host, 0)).await?;
        let local_addr = inner.local_addr()?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Port the OS assigned.
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Hand the socket to a server.
    pub fn into_inner(self) -> TcpListener {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_assigns_port() {
        let a = Listener::bind_ephemeral("127.0.0.1").await.unwrap();
        let b = Listener::bind_ephemeral("127.0.0.1").await.unwrap();
        assert_ne!(a.port(), 0);
        assert_ne!(a.port(), b.port());
        assert!(a.local_addr().ip().is_loopback());
    }
}
