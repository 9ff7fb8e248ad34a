pub mod common;
pub mod config;
pub mod distance;
pub mod indexing;
pub mod ingestion; // text input
pub mod pca;
pub mod types;
pub mod uncertain;
pub use self::config::Config;
