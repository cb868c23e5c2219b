pub mod config;
pub mod core;
pub mod scores;
pub mod ui;
pub mod utils;

pub use config::Config;
pub use core::{RoundEngine, RoundSession, RoundSnapshot, RoundState};
pub use scores::{ScoreBoard, ScoreRecord, ScoreSubmission};
pub use ui::GameInterface;

// Re-export commonly used types
pub type Result<T> = anyhow::Result<T>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
