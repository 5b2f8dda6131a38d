//! OS signal handling.

use futures::Stream;
use tracing::error;

/// Every Ctrl-C / SIGINT delivered to the process, as a stream.
pub fn interrupts() -> impl Stream<Item = ()> + Send + 'static {
    futures::stream::unfold((), |()| async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => Some(((), ())),
            Err(e) => {
                error!("Failed to listen for interrupt signal: {}", e);
                None
            }
        }
    })
}
