mod pump;

pub use pump::{pump, Closer};

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, Instrument, Span};

use crate::domain::TunnelStats;

/// An opaque relay between a hijacked client connection and a destination.
pub struct Tunnel<C, D> {
    client: C,
    destination: D,
}

impl<C, D> Tunnel<C, D>
where
    C: AsyncRead + AsyncWrite + Send + 'static,
    D: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn new(client: C, destination: D) -> Self {
        Self { client, destination }
    }

    /// Runs one pump task per direction and waits for both to exit.
    pub async fn run(self, span: Span) -> TunnelStats {
        let (client_read, client_write) = tokio::io::split(self.client);
        let (destination_read, destination_write) = tokio::io::split(self.destination);
        let closer = Closer::new();

        let upstream = tokio::spawn(pump(client_read, destination_write, closer.clone()).instrument(span.clone()));
        let downstream = tokio::spawn(pump(destination_read, client_write, closer).instrument(span.clone()));

        let (upstream, downstream) = tokio::join!(upstream, downstream);

        let stats = TunnelStats {
            client_to_destination: settle(upstream, "client -> destination", &span),
            destination_to_client: settle(downstream, "destination -> client", &span),
        };

        info!(
            parent: &span,
            sent = stats.client_to_destination,
            received = stats.destination_to_client,
            "tunnel closed"
        );
        stats
    }
}

fn settle(joined: Result<std::io::Result<u64>, tokio::task::JoinError>, direction: &str, span: &Span) -> u64 {
    match joined {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            debug!(parent: span, direction, error = %e, "pump ended with I/O error");
            0
        }
        Err(e) => {
            debug!(parent: span, direction, error = %e, "pump task did not complete");
            0
        }
    }
}
