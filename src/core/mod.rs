pub mod deck;
pub mod engine;
pub mod events;
pub mod round_state;
pub mod scoring;
pub mod session;

pub use deck::{Card, DeckRng, Symbol};
pub use engine::{ClearTicket, RoundComplete, RoundEngine, SelectEvent, SelectOutcome};
pub use events::{EventLogger, RoundEvent, RoundEventHandler, RoundEventType};
pub use round_state::{CardFace, CardView, Phase, RoundSnapshot, RoundState, RoundStatistics};
pub use session::{RoundSession, SessionTimings};
