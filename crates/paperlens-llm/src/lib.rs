//! Model invocation over external LLM APIs (Gemini/OpenAI/Anthropic/Groq).
//!
//! The rest of PaperLens only sees [`LanguageModel`]: one prompt in, one text
//! response out. Providers are reached over their streaming endpoints and the
//! token deltas are concatenated into the final response.

pub mod config;
pub mod model;
pub mod providers;
pub mod types;

pub use config::{LLMConfig, ResolvedModel};
pub use model::{HttpModel, LanguageModel, ModelError};
pub use types::*;

#[cfg(any(test, feature = "fixtures"))]
pub use model::StubModel;
