pub mod config;
pub mod data;
pub mod error;
pub mod server;
pub mod storage;
pub mod store;

pub use error::{Result, StoreError};
pub use store::TabularStore;
