use console::{pad_str, Alignment, Term};
use std::io::{self, Write};

use crate::core::round_state::format_elapsed;
use crate::core::{CardFace, CardView, RoundComplete, RoundSnapshot};
use crate::scores::ScoreRecord;
use crate::ui::ThemeManager;

const CELL_WIDTH: usize = 4;

pub struct Display {
    term: Term,
    theme_manager: ThemeManager,
    text_width: usize,
    columns: usize,
}

impl Display {
    pub fn new(theme_manager: ThemeManager, text_width: usize, columns: usize) -> io::Result<Self> {
        Ok(Self {
            term: Term::stdout(),
            theme_manager,
            text_width,
            columns: columns.max(1),
        })
    }

    pub fn clear_screen(&self) -> io::Result<()> {
        self.term.clear_screen()
    }

    pub fn show_title(&self, title: &str) -> io::Result<()> {
        let styled_title = self.theme_manager.apply_style(title, "title");

        let border = "═".repeat(self.text_width);
        let styled_border = self.theme_manager.apply_style(&border, "separator");

        writeln!(io::stdout(), "{}", styled_title)?;
        writeln!(io::stdout(), "{}", styled_border)?;
        writeln!(io::stdout())?;

        Ok(())
    }

    pub fn show_round_header(&self, snapshot: &RoundSnapshot) -> io::Result<()> {
        let stats_text = format!(
            "Moves: {} | Time: {} | Matched: {} of {}",
            snapshot.move_count,
            format_elapsed(snapshot.elapsed_seconds),
            snapshot.pairs_found,
            snapshot.pairs_total
        );
        let styled_stats = self.theme_manager.apply_style(&stats_text, "stats");
        writeln!(io::stdout(), "{}", styled_stats)?;
        writeln!(io::stdout())?;
        Ok(())
    }

    pub fn show_board(&self, snapshot: &RoundSnapshot) -> io::Result<()> {
        for row in snapshot.cards.chunks(self.columns) {
            let line: Vec<String> = row
                .iter()
                .map(|card| {
                    let (text, style) = card_cell(card);
                    self.theme_manager.apply_style(&text, style)
                })
                .collect();
            writeln!(io::stdout(), "  {}", line.join(" "))?;
        }
        writeln!(io::stdout())?;
        Ok(())
    }

    pub fn show_round_complete(&self, result: &RoundComplete) -> io::Result<()> {
        self.show_separator()?;
        self.show_message("🎉 Game Complete!", "success")?;
        self.show_message(&format!("Score: {}", result.score), "stats")?;
        self.show_message(&format!("Time: {}", format_elapsed(result.elapsed_seconds)), "stats")?;
        self.show_message(&format!("Moves: {}", result.move_count), "stats")?;
        self.show_separator()?;
        Ok(())
    }

    pub fn show_leaderboard(&self, records: &[ScoreRecord]) -> io::Result<()> {
        self.show_message("🏆 Top Scores", "title")?;
        let separator = "═".repeat(50);
        self.show_message(&separator, "separator")?;

        if records.is_empty() {
            self.show_message("No scores yet. Be the first to play!", "info")?;
        } else {
            self.show_message(&format!("{:<6}{:<24}{:>8}{:>10}", "Rank", "Player", "Score", "Time"), "rank")?;
            for (index, record) in records.iter().enumerate() {
                writeln!(io::stdout(), "{}", leaderboard_row(index + 1, record))?;
            }
        }

        self.show_message(&separator, "separator")?;
        Ok(())
    }

    pub fn show_message(&self, message: &str, style: &str) -> io::Result<()> {
        let styled_message = self.theme_manager.apply_style(message, style);
        writeln!(io::stdout(), "{}", styled_message)?;
        Ok(())
    }

    pub fn show_error(&self, error: &str) -> io::Result<()> {
        self.show_message(&format!("❌ {}", error), "error")
    }

    pub fn show_success(&self, message: &str) -> io::Result<()> {
        self.show_message(&format!("✅ {}", message), "success")
    }

    pub fn show_warning(&self, message: &str) -> io::Result<()> {
        self.show_message(&format!("⚠️ {}", message), "warning")
    }

    pub fn show_info(&self, message: &str) -> io::Result<()> {
        self.show_message(&format!("ℹ️ {}", message), "info")
    }

    pub fn show_separator(&self) -> io::Result<()> {
        let separator = "━".repeat(self.text_width);
        let styled = self.theme_manager.apply_style(&separator, "separator");
        writeln!(io::stdout(), "{}", styled)?;
        Ok(())
    }

    pub fn wait_for_enter(&self) -> io::Result<()> {
        let styled_prompt = self.theme_manager.apply_style("Press Enter to continue...", "info");
        print!("{}", styled_prompt);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(())
    }

    pub fn set_theme(&mut self, theme_name: &str) -> bool {
        self.theme_manager.set_theme(theme_name)
    }

    pub fn get_available_themes(&self) -> Vec<String> {
        self.theme_manager.list_themes()
    }
}

/// Board cell text and the theme style to paint it with. Hidden cards show
/// the 1-based number the player types to pick them.
fn card_cell(card: &CardView) -> (String, &'static str) {
    let (label, style) = match &card.face {
        CardFace::Hidden => ((card.id + 1).to_string(), "card_hidden"),
        CardFace::FaceUp(symbol) => (symbol.to_string(), "card_face_up"),
        CardFace::Matched(symbol) => (symbol.to_string(), "card_matched"),
    };
    let padded = pad_str(&label, CELL_WIDTH, Alignment::Center, None);
    (format!("[{}]", padded), style)
}

fn leaderboard_row(rank: usize, record: &ScoreRecord) -> String {
    let name = pad_str(&record.player_name, 24, Alignment::Left, Some("…"));
    format!("{:<6}{}{:>8}{:>10}", rank, name, record.score, format!("{}s", record.time))
}
