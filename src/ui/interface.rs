use dialoguer::{Confirm, Input, Select};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::core::{RoundComplete, RoundEngine, RoundSession, RoundSnapshot, SelectEvent};
use crate::scores::{ScoreBoard, ScoreSubmission};
use crate::ui::{Display, ThemeManager};
use crate::utils::{GameError, GameResult};

/// How long past the mismatch delay to wait for the pair to turn back.
const CLEAR_GRACE: Duration = Duration::from_secs(1);
const CLEAR_POLL: Duration = Duration::from_millis(25);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CardInput {
    Card(usize),
    Quit,
    Invalid,
}

/// Polls until a mismatched pair has been turned face down, giving up after
/// `timeout` with whatever the board shows then.
async fn await_pair_cleared(session: &RoundSession, timeout: Duration) -> GameResult<RoundSnapshot> {
    let deadline = Instant::now() + timeout;
    loop {
        let snapshot = session.snapshot().await?;
        if snapshot.face_up_count() < 2 || Instant::now() >= deadline {
            return Ok(snapshot);
        }
        sleep(CLEAR_POLL).await;
    }
}

fn parse_card_input(input: &str) -> CardInput {
    let input = input.trim();
    if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
        return CardInput::Quit;
    }
    match input.parse::<usize>() {
        Ok(number) if number > 0 => CardInput::Card(number - 1),
        _ => CardInput::Invalid,
    }
}

pub struct GameInterface {
    score_board: ScoreBoard,
    display: Display,
    config: Config,
    player_name: Option<String>,
}

impl GameInterface {
    pub fn new(config: Config) -> GameResult<Self> {
        info!("Initializing game interface");

        config.ensure_directories()?;

        let mut display = Display::new(ThemeManager::new(), config.ui.text_width, config.ui.columns)
            .map_err(|e| GameError::configuration(format!("Failed to create display: {}", e)))?;

        if !display.set_theme(&config.ui.theme) {
            warn!("Unknown theme '{}', using default", config.ui.theme);
        }

        let player_name = config
            .game
            .player_name
            .clone()
            .filter(|name| !name.trim().is_empty());

        Ok(Self {
            score_board: ScoreBoard::new(config.get_scores_dir()),
            display,
            config,
            player_name,
        })
    }

    pub async fn run(&mut self) -> GameResult<()> {
        info!("Starting game interface");

        loop {
            match self.show_main_menu().await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    error!("Main menu error: {}", e);
                    self.display.show_error(&format!("An error occurred: {}", e)).ok();
                    self.display.wait_for_enter().ok();
                }
            }
        }

        self.display.show_message("Thanks for playing!", "success").ok();
        Ok(())
    }

    async fn show_main_menu(&mut self) -> GameResult<bool> {
        self.display.clear_screen().ok();
        self.show_game_title()?;

        let choices = ["🎮 Play", "🏆 Leaderboard", "⚙️ Settings", "🚪 Exit"];

        let selection = Select::new()
            .with_prompt("What would you like to do?")
            .items(&choices)
            .default(0)
            .interact()
            .map_err(|e| GameError::input(format!("Menu selection error: {}", e)))?;

        match selection {
            0 => self.play().await?,
            1 => {
                self.display.clear_screen().ok();
                self.show_leaderboard().await?;
                self.display.wait_for_enter()?;
            }
            2 => self.settings_menu()?,
            _ => return Ok(false),
        }

        Ok(true)
    }

    fn show_game_title(&self) -> GameResult<()> {
        let title = r#"
╔╦╗┌─┐┌┬┐┌─┐┬─┐┬ ┬  ╔╦╗┌─┐┌┬┐┌─┐┬ ┬
║║║├┤ ││││ │├┬┘└┬┘  ║║║├─┤ │ │  ├─┤
╩ ╩└─┘┴ ┴└─┘┴└─ ┴   ╩ ╩┴ ┴ ┴ └─┘┴ ┴
"#;
        self.display.show_title(title)?;
        self.display.show_message("Match all the cards to win!", "info")?;
        self.display.show_message(&format!("Version {}", crate::VERSION), "info")?;
        println!();
        Ok(())
    }

    /// Plays rounds until the player stops. The player must have a name
    /// before the first deal.
    pub async fn play(&mut self) -> GameResult<()> {
        if self.player_name.is_none() {
            self.prompt_player_name()?;
        }

        let engine = RoundEngine::new(self.config.deck_rng());
        let (session, handle) = RoundSession::spawn(engine, self.config.session_timings());

        let result = self.round_loop(&session).await;

        session.shutdown().await.ok();
        if let Err(e) = handle.await {
            warn!("Round session task failed: {}", e);
        }

        result
    }

    async fn round_loop(&mut self, session: &RoundSession) -> GameResult<()> {
        let mut snapshot = session.restart(self.config.round_symbols()).await?;
        let mut notice: Option<Notice> = None;

        loop {
            self.render(&snapshot, notice.take())?;

            let card_id = match self.prompt_card(snapshot.cards.len()).await? {
                CardInput::Card(card_id) => card_id,
                CardInput::Quit => {
                    if self.confirm("Abandon this round?", false)? {
                        info!("Round abandoned by player");
                        return Ok(());
                    }
                    snapshot = session.snapshot().await?;
                    continue;
                }
                CardInput::Invalid => {
                    notice = Some(Notice::Warning("Enter a card number or 'q'.".to_string()));
                    snapshot = session.snapshot().await?;
                    continue;
                }
            };

            let outcome = session.select(card_id).await?;
            match outcome.event {
                SelectEvent::Ignored => {
                    notice = Some(Notice::Warning(format!("Card {} can't be picked right now.", card_id + 1)));
                }
                SelectEvent::MismatchResolved(_) => {
                    self.render(&session.snapshot().await?, Some(Notice::Error("No match!".to_string())))?;
                    let timeout = self.config.session_timings().mismatch_delay + CLEAR_GRACE;
                    snapshot = await_pair_cleared(session, timeout).await?;
                    continue;
                }
                SelectEvent::MatchResolved => {
                    notice = Some(Notice::Success("It's a match!".to_string()));
                }
                SelectEvent::Flipped => {}
            }

            if let Some(result) = outcome.completed {
                self.render(&session.snapshot().await?, None)?;
                self.finish_round(&result).await?;

                if !self.confirm("Play again?", true)? {
                    return Ok(());
                }
                snapshot = session.restart(self.config.round_symbols()).await?;
                continue;
            }

            snapshot = session.snapshot().await?;
        }
    }

    fn render(&self, snapshot: &RoundSnapshot, notice: Option<Notice>) -> GameResult<()> {
        self.display.clear_screen().ok();

        if let Some(name) = &self.player_name {
            self.display.show_info(&format!("Player: {}", name))?;
        }
        if self.config.ui.show_stats_in_header {
            self.display.show_round_header(snapshot)?;
        }
        self.display.show_board(snapshot)?;

        match notice {
            Some(Notice::Success(message)) => self.display.show_success(&message)?,
            Some(Notice::Warning(message)) => self.display.show_warning(&message)?,
            Some(Notice::Error(message)) => self.display.show_error(&message)?,
            None => {}
        }
        Ok(())
    }

    async fn prompt_card(&self, deck_size: usize) -> GameResult<CardInput> {
        let prompt = format!("Pick a card (1-{}, q to quit)", deck_size);

        // Blocking read off the runtime so the round clock keeps ticking.
        let answer = tokio::task::spawn_blocking(move || Input::<String>::new().with_prompt(prompt).interact_text())
            .await
            .map_err(|e| GameError::input(format!("Card prompt failed: {}", e)))?
            .map_err(|e| GameError::input(format!("Card input error: {}", e)))?;

        Ok(parse_card_input(&answer))
    }

    async fn finish_round(&mut self, result: &RoundComplete) -> GameResult<()> {
        self.display.show_round_complete(result)?;

        let player_name = self.player_name.clone().unwrap_or_default();
        let submission = ScoreSubmission::from_round(player_name, result);

        // A failed save is reported but never stops the next round.
        match self.score_board.submit(submission).await {
            Ok(record) => {
                info!("Saved score {} for {} ({})", record.score, record.player_name, record.id);
                self.display.show_success(&format!("Score saved: {}", record.display_name()))?;
            }
            Err(e) => {
                warn!("Failed to save score: {}", e);
                self.display.show_error(&format!("Failed to save your score: {}", e))?;
            }
        }

        println!();
        self.show_leaderboard().await
    }

    pub async fn show_leaderboard(&self) -> GameResult<()> {
        match self.score_board.top_scores(self.config.leaderboard.limit).await {
            Ok(records) => self.display.show_leaderboard(&records)?,
            Err(e) => {
                error!("Failed to fetch leaderboard: {}", e);
                self.display.show_error("Failed to load leaderboard. Please try again later.")?;
            }
        }
        Ok(())
    }

    fn prompt_player_name(&mut self) -> GameResult<()> {
        let mut input = Input::<String>::new().with_prompt("Enter your name");
        if let Some(current) = &self.player_name {
            input = input.default(current.clone());
        }

        let name = input
            .validate_with(|name: &String| -> Result<(), &str> {
                if name.trim().is_empty() {
                    Err("Please enter your name to play")
                } else {
                    Ok(())
                }
            })
            .interact_text()
            .map_err(|e| GameError::input(format!("Name input error: {}", e)))?;

        self.player_name = Some(name.trim().to_string());
        Ok(())
    }

    fn confirm(&self, prompt: &str, default: bool) -> GameResult<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| GameError::input(format!("Confirmation error: {}", e)))
    }

    fn settings_menu(&mut self) -> GameResult<()> {
        loop {
            let choices = ["🎨 Change Theme", "📊 Toggle Stats Header", "👤 Change Player Name", "🔙 Back"];

            let selection = Select::new()
                .with_prompt("Settings")
                .items(&choices)
                .interact()
                .map_err(|e| GameError::input(format!("Settings selection error: {}", e)))?;

            match selection {
                0 => self.change_theme()?,
                1 => self.toggle_stats_display()?,
                2 => self.prompt_player_name()?,
                _ => break,
            }
        }

        Ok(())
    }

    fn change_theme(&mut self) -> GameResult<()> {
        let themes = self.display.get_available_themes();

        let selection = Select::new()
            .with_prompt("Choose theme")
            .items(&themes)
            .interact()
            .map_err(|e| GameError::input(format!("Theme selection error: {}", e)))?;

        let selected_theme = &themes[selection];

        if self.display.set_theme(selected_theme) {
            self.config.ui.theme = selected_theme.clone();
            self.display.show_success(&format!("Theme changed to '{}'", selected_theme))?;
        } else {
            self.display.show_error(&format!("Failed to set theme '{}'", selected_theme))?;
        }
        Ok(())
    }

    fn toggle_stats_display(&mut self) -> GameResult<()> {
        self.config.ui.show_stats_in_header = !self.config.ui.show_stats_in_header;
        let status = if self.config.ui.show_stats_in_header { "enabled" } else { "disabled" };
        self.display.show_success(&format!("Stats header {}", status))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SessionTimings;

    #[test]
    fn test_parse_card_input() {
        assert_eq!(parse_card_input("1"), CardInput::Card(0));
        assert_eq!(parse_card_input(" 12 "), CardInput::Card(11));
        assert_eq!(parse_card_input("99"), CardInput::Card(98));
        assert_eq!(parse_card_input("q"), CardInput::Quit);
        assert_eq!(parse_card_input("QUIT"), CardInput::Quit);
        assert_eq!(parse_card_input("0"), CardInput::Invalid);
        assert_eq!(parse_card_input("abc"), CardInput::Invalid);
        assert_eq!(parse_card_input(""), CardInput::Invalid);
    }

    fn mismatch_session(mismatch_delay: Duration) -> RoundSession {
        let mut engine = RoundEngine::with_seed(1);
        engine.start_with_layout(["A", "B", "A", "B"]).unwrap();
        let timings = SessionTimings {
            tick_interval: Duration::from_secs(3600),
            mismatch_delay,
        };
        RoundSession::spawn(engine, timings).0
    }

    #[tokio::test]
    async fn test_waits_for_mismatched_pair_to_clear() {
        let session = mismatch_session(Duration::from_millis(30));
        session.select(0).await.unwrap();
        session.select(1).await.unwrap();

        let snapshot = await_pair_cleared(&session, Duration::from_secs(5)).await.unwrap();
        assert_eq!(snapshot.face_up_count(), 0);
        assert!(session.select(0).await.unwrap().accepted);
    }

    #[tokio::test]
    async fn test_pair_wait_gives_up_after_timeout() {
        let session = mismatch_session(Duration::from_secs(3600));
        session.select(0).await.unwrap();
        session.select(1).await.unwrap();

        let snapshot = await_pair_cleared(&session, Duration::from_millis(60)).await.unwrap();
        assert_eq!(snapshot.face_up_count(), 2);
    }

    #[test]
    fn test_interface_uses_configured_name() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.paths.scores_dir = temp_dir.path().join("scores");
        config.game.player_name = Some("  ".to_string());

        let interface = GameInterface::new(config.clone()).unwrap();
        assert!(interface.player_name.is_none());

        config.game.player_name = Some("Ada".to_string());
        let interface = GameInterface::new(config).unwrap();
        assert_eq!(interface.player_name.as_deref(), Some("Ada"));
        assert!(temp_dir.path().join("scores").exists());
    }
}
