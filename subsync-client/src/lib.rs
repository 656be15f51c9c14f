#![deny(clippy::unwrap_used)]

pub mod api;
pub mod cache;
pub mod config;
pub mod error;

pub use api::{HttpSubscriptionApi, ServiceSubscriptionApi, SubscriptionApi};
pub use cache::{CacheState, SubscriptionCache};
pub use config::ClientOptions;
pub use error::TransportError;
