// src/core/ingestion/mod.rs

//! Text input: field tokenization and number-vector parsing.

pub mod parser;
pub mod tokenizer;

pub use self::parser::{NumberVectorParser, ParseOutcome, RejectedRecord};
pub use self::tokenizer::Tokenizer;
