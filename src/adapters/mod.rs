pub mod hyper_server;
pub mod reqwest_client;
pub mod tcp_dialer;
pub mod tcp_listener;
pub mod tunnel;

pub use hyper_server::{HyperConnector, HyperProxyAdapter};
pub use reqwest_client::ReqwestDownloader;
pub use tcp_dialer::TcpDialer;
pub use tunnel::Tunnel;
