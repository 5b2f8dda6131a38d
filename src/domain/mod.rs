pub mod errors;
pub mod media;
pub mod models;
pub mod service;

pub use errors::*;
pub use media::*;
pub use models::*;
pub use service::ProxyService;
