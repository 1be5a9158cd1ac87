pub mod batch;
pub mod client;
pub mod error;
pub mod fence;
pub mod item;
pub mod prompt;
pub mod prompt_user;
pub mod response;
pub mod settings;

pub use batch::{DEFAULT_BATCH_SIZE, short_answer_id};
pub use client::{GeminiClient, GenerationRequest, apply_fallback};
pub use error::GenerationError;
pub use item::{DocumentBased, GeneratedItem, ItemKind, ItemShape, LongEssay, ShortAnswer};
pub use settings::{KeySource, Settings};
