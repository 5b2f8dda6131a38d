use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, info_span, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

use burrow::adapters::{ReqwestDownloader, TcpDialer};
use burrow::lifecycle::{self, signals, Lifecycle};
use burrow::ports::FileDownloaderPort;
use burrow::ProxyConfig;

#[derive(Parser, Debug)]
#[clap(version = env!("BURROW_VERSION"), author = env!("CARGO_PKG_AUTHORS"))]
pub struct Opts {
    /// Log at debug level (RUST_LOG takes precedence)
    #[clap(long, short = 'v', global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the proxy
    Serve {
        /// listen on this network address
        #[clap(long, short = 'b')]
        bind: Option<String>,

        /// configuration file (defaults to the per-user burrow config)
        #[clap(long, short = 'c')]
        config: Option<PathBuf>,

        /// seconds allowed for connecting to a destination
        #[clap(long)]
        dial_timeout: Option<u64>,
    },
    /// Download a URL to a file
    Fetch {
        url: Url,

        output: PathBuf,

        /// HTTP proxy to go through, e.g. http://127.0.0.1:8889
        #[clap(long)]
        via: Option<Url>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();
    init_tracing(opts.verbose);

    match opts.command {
        Command::Serve {
            bind,
            config,
            dial_timeout,
        } => {
            let mut config = ProxyConfig::load(config.as_deref())?;
            if let Some(bind) = bind {
                config.bind = bind;
            }
            if let Some(secs) = dial_timeout {
                config.dial_timeout_secs = secs;
            }
            serve(config).await
        }
        Command::Fetch { url, output, via } => {
            let downloader = ReqwestDownloader::new(via.as_ref())?;
            let written = downloader.download(&url, &output).await?;
            info!("wrote {} bytes to {}", written, output.display());
            Ok(())
        }
    }
}

async fn serve(config: ProxyConfig) -> Result<(), Box<dyn std::error::Error>> {
    match rlimit::increase_nofile_limit(u64::MAX) {
        Ok(limit) => tracing::debug!("open file limit raised to {}", limit),
        Err(e) => warn!("could not raise open file limit: {}", e),
    }

    let span = info_span!("burrow");
    let server = lifecycle::start(&config, Arc::new(TcpDialer::new()), span.clone()).await?;
    info!(
        parent: &span,
        version = env!("BURROW_VERSION"),
        address = %server.local_addr(),
        dial_timeout = config.dial_timeout_secs,
        "proxy started"
    );

    Lifecycle::new(span).run(server, signals::interrupts()).await?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "burrow=debug,info" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)))
        .init();
}
