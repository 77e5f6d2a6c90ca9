pub mod openai;

pub use openai::{CompletionError, OpenAIClient};
