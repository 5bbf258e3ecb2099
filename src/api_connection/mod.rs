pub mod chain;
pub mod connection;
pub mod endpoints;

pub use chain::{Completion, ProviderChain};
pub use connection::{ApiConnectionError, GeminiProvider, LlmProvider, OpenRouterProvider};
pub use endpoints::{InlineImage, ModelPrompt};
