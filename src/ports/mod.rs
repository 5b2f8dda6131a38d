pub mod dialer;
pub mod downloader;
pub mod listener;
pub mod media;

pub use dialer::DialerPort;
pub use downloader::FileDownloaderPort;
pub use listener::ListenerPort;
pub use media::StreamResolverPort;
