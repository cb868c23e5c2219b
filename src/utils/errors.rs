use thiserror::Error;

pub type GameResult<T> = Result<T, GameError>;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Score board error: {message}")]
    ScoreBoard { message: String },

    #[error("Invalid score submission: {message}")]
    InvalidSubmission { message: String },

    #[error("Round session error: {message}")]
    Session { message: String },

    #[error("Input error: {message}")]
    Input { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl GameError {
    pub fn score_board<S: Into<String>>(message: S) -> Self {
        Self::ScoreBoard {
            message: message.into(),
        }
    }

    pub fn invalid_submission<S: Into<String>>(message: S) -> Self {
        Self::InvalidSubmission {
            message: message.into(),
        }
    }

    pub fn session<S: Into<String>>(message: S) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    pub fn input<S: Into<String>>(message: S) -> Self {
        Self::Input {
            message: message.into(),
        }
    }

    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
