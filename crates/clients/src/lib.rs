//! Calling sibling services.
//!
//! Each downstream service is reached through a trait:
//!
//! - [`ProductDirectory`]: product lookups, availability, stock reserve/release
//! - [`CartGateway`]: reading and clearing a user's cart
//! - [`UserDirectory`]: resolving a bearer token to an identity
//!
//! The `Http*` types implement them over plain HTTP with a fixed per-call
//! timeout and no retries. The `InMemory*` types are test doubles with
//! failure injection. Services also implement the traits for themselves so
//! they can be wired together in one process.

pub mod cart;
pub mod error;
pub mod http;
pub mod memory;
pub mod models;
pub mod product;
pub mod user;

pub use cart::{CartGateway, HttpCartGateway};
pub use error::ClientError;
pub use http::{HttpClientConfig, build_http_client};
pub use memory::{InMemoryCartGateway, InMemoryProductDirectory, InMemoryUserDirectory};
pub use models::{Availability, CartLine, CartSnapshot, ProductInfo, StockLevel, UserInfo};
pub use product::{HttpProductDirectory, ProductDirectory};
pub use user::{HttpUserDirectory, UserDirectory};
