mod adapter;
mod connection;
mod connector;
mod hijack;

pub use adapter::{copy_headers, Body, HyperProxyAdapter};
pub use connection::serve_connection;
pub use connector::HyperConnector;
pub use hijack::hijack;
