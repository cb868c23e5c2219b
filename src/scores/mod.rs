pub mod board;
pub mod record;

pub use board::ScoreBoard;
pub use record::{ScoreRecord, ScoreSubmission};
