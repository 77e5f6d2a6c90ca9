pub mod ai;
pub mod config;
pub mod generate;
pub mod html;
pub mod input;
pub mod prompt;
pub mod sanitize;
pub mod state;

// Re-export main types for convenience
pub use ai::OpenAIClient;
pub use config::{ClientConfig, ConfigError, ServerConfig};
pub use generate::{
    select_generator, DashboardGenerator, DemoGenerator, GenerateError, LiveGenerator,
};
pub use html::escape_html;
pub use input::{validate_input, InputError, ValidInput};
pub use prompt::{build_user_message, PromptPair, SystemPrompt};
pub use sanitize::{sanitize, RegexSanitizer, Sanitizer};
pub use state::{ErrorBody, GenerationRequest, GenerationResponse, GENERATE_PATH, HEALTH_PATH};
