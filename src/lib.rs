pub mod commands;
pub mod llm;
pub mod palette;
pub mod period;
pub mod progress;
pub mod resources;
pub mod store;
pub mod utils;
