//! kaiwa-llm: turning language-model output into suggestions
//!
//! - Alias-tolerant extraction of sentence pairs from free-form model text
//! - Accumulation of streamed responses
//! - Construction of the suggestion prompt

pub mod config;
pub mod error;
pub mod extractor;
pub mod accumulator;
pub mod prompt;


pub use config::SuggestionConfig;
pub use error::*;
pub use extractor::{extract, extract_at};
pub use accumulator::ResponseAccumulator;
pub use prompt::{require_api_key, SuggestionPrompt};
