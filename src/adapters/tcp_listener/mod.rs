use async_trait::async_trait;
use std::io;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};

use crate::ports::ListenerPort;

#[async_trait]
impl ListenerPort for TcpListener {
    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpListener::local_addr(self)
    }
}
