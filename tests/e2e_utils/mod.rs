#![cfg(test)]
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod burrow_server;
pub mod origin;

pub use burrow_server::TestBurrowServer;
pub use origin::{closed_port, read_head, read_until_eof, spawn_origin};
