use std::io;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;

const BUFFER_SIZE: usize = 16 * 1024;

/// Close latch shared by the two pumps of a tunnel.
///
/// Closing is idempotent: only the first call reports that it did anything.
#[derive(Clone)]
pub struct Closer {
    tx: Arc<watch::Sender<bool>>,
}

impl Closer {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Returns `true` if this call closed the latch.
    pub fn close(&self) -> bool {
        !self.tx.send_replace(true)
    }

    pub fn is_closed(&self) -> bool {
        *self.tx.borrow()
    }

    pub async fn closed(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so this only returns once the latch is set.
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

impl Default for Closer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies `source` into `destination` until EOF, an I/O error, or the latch
/// closes. Then shuts the destination down, closes the latch, and drops both
/// halves. Returns the number of bytes delivered.
pub async fn pump<R, W>(mut source: R, mut destination: W, closer: Closer) -> io::Result<u64>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut transferred = 0u64;

    let outcome = {
        let copy = copy_until_eof(&mut source, &mut destination, &mut transferred);
        tokio::select! {
            res = copy => res,
            _ = closer.closed() => Ok(()),
        }
    };

    let _ = destination.shutdown().await;
    closer.close();

    outcome.map(|_| transferred)
}

async fn copy_until_eof<R, W>(source: &mut R, destination: &mut W, transferred: &mut u64) -> io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; BUFFER_SIZE];
    loop {
        let n = source.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        destination.write_all(&buf[..n]).await?;
        destination.flush().await?;
        *transferred += n as u64;
    }
}
