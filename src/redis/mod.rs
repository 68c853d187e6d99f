pub mod client;
pub mod config;
pub mod info;
pub mod slowlog;
pub mod tls;

pub use client::RedisClient;
pub use config::RedisSettings;
pub use info::{RawStatusMap, Scalar};
