//! Outbound HTTP: the JSON fetch client and the anti-bot proxy client
//! (component F).

pub mod client;
pub mod proxy;

pub use client::HttpFetcher;
pub use proxy::FsrProxyBackend;
