use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use tokio::net::TcpStream;

/// Port for the source of inbound client connections
#[async_trait]
pub trait ListenerPort: Send + Sync {
    /// Wait for the next client connection
    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)>;

    fn local_addr(&self) -> io::Result<SocketAddr>;
}
