//! Remote collaborators of the deck pipeline: draft generation and stock
//! images, configured from the environment.

pub mod config;
pub mod error;
pub mod generation;
pub mod images;
pub mod prompts;

pub use config::{AgentConfig, RetryPolicy};
pub use error::{ConfigError, GenerationError};
pub use generation::{ContentGenerator, DraftGenerator};
pub use images::{ImageDownloader, ImageSearch, StockImages};
