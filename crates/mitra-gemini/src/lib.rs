pub mod advisor;
pub mod client;
pub mod error;
pub mod prompt;
pub mod types;

pub use advisor::CropAdvisor;
pub use client::GeminiClient;
pub use error::GeminiError;
pub use types::{GenerationConfig, Part, Role, Turn};
