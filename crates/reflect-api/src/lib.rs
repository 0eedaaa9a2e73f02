// reflect-api: Async Rust client for the Q-SYS Reflect Enterprise Management API

pub mod client;
pub mod error;
pub mod mapping;
pub mod transport;
pub mod types;

pub use client::ReflectClient;
pub use error::Error;
pub use mapping::{DeviceMapping, MappedDevice};
pub use transport::TransportConfig;
pub use types::SystemRecord;
