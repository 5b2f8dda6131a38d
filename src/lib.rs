//! burrow: a small forward HTTP proxy.
//!
//! `CONNECT` requests become opaque TCP tunnels; every other request is
//! relayed to its origin with the response streamed back unchanged.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod lifecycle;
pub mod ports;

pub use config::ProxyConfig;
