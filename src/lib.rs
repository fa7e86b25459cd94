pub mod config;
pub mod error;
pub mod models;
pub mod persist;
pub mod reports;
pub mod server;
pub mod store;

pub use error::{Error, Result};
