pub mod error;
pub use error::KnnError;
