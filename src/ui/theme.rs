use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: HashMap<String, ColorConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorConfig {
    pub foreground: Option<String>,
    pub style: Vec<String>,
}

fn color(foreground: &str, style: &[&str]) -> ColorConfig {
    ColorConfig {
        foreground: Some(foreground.to_string()),
        style: style.iter().map(|s| s.to_string()).collect(),
    }
}

pub struct ThemeManager {
    themes: HashMap<String, Theme>,
    current_theme: String,
}

impl ThemeManager {
    pub fn new() -> Self {
        let mut manager = Self {
            themes: HashMap::new(),
            current_theme: "default".to_string(),
        };

        manager.load_default_themes();
        manager
    }

    pub fn set_theme(&mut self, theme_name: &str) -> bool {
        if self.themes.contains_key(theme_name) {
            self.current_theme = theme_name.to_string();
            true
        } else {
            false
        }
    }

    pub fn current_theme_name(&self) -> &str {
        &self.current_theme
    }

    /// Style from the current theme, or from the default theme when the
    /// current one leaves it out.
    fn style_for(&self, style_name: &str) -> Option<&ColorConfig> {
        self.themes
            .get(&self.current_theme)
            .and_then(|theme| theme.colors.get(style_name))
            .or_else(|| self.themes.get("default")?.colors.get(style_name))
    }

    pub fn apply_style(&self, text: &str, style_name: &str) -> String {
        let Some(color_config) = self.style_for(style_name) else {
            return text.to_string();
        };

        let mut styled_text = text.to_string();

        if let Some(fg_color) = &color_config.foreground {
            if let Some(color) = parse_color(fg_color) {
                styled_text = styled_text.color(color).to_string();
            }
        }

        for style in &color_config.style {
            styled_text = match style.as_str() {
                "bold" => styled_text.bold().to_string(),
                "italic" => styled_text.italic().to_string(),
                "underline" => styled_text.underline().to_string(),
                "dimmed" => styled_text.dimmed().to_string(),
                "reversed" => styled_text.reversed().to_string(),
                _ => styled_text,
            };
        }

        styled_text
    }

    pub fn list_themes(&self) -> Vec<String> {
        let mut names: Vec<String> = self.themes.keys().cloned().collect();
        names.sort();
        names
    }

    fn load_default_themes(&mut self) {
        let default_colors = HashMap::from([
            ("title".to_string(), color("cyan", &["bold"])),
            ("card_hidden".to_string(), color("blue", &[])),
            ("card_face_up".to_string(), color("yellow", &["bold"])),
            ("card_matched".to_string(), color("green", &["dimmed"])),
            ("stats".to_string(), color("yellow", &[])),
            ("rank".to_string(), color("magenta", &["bold"])),
            ("error".to_string(), color("red", &["bold"])),
            ("success".to_string(), color("green", &["bold"])),
            ("warning".to_string(), color("yellow", &["bold"])),
            ("info".to_string(), color("blue", &[])),
            ("separator".to_string(), color("bright_black", &["dimmed"])),
        ]);
        self.insert_theme("default", default_colors);

        let dark_colors = HashMap::from([
            ("title".to_string(), color("bright_cyan", &["bold"])),
            ("card_hidden".to_string(), color("bright_blue", &[])),
            ("card_face_up".to_string(), color("bright_yellow", &["bold"])),
            ("card_matched".to_string(), color("bright_green", &[])),
            ("stats".to_string(), color("bright_yellow", &[])),
            ("rank".to_string(), color("bright_magenta", &["bold"])),
            ("error".to_string(), color("bright_red", &["bold"])),
            ("success".to_string(), color("bright_green", &["bold"])),
        ]);
        self.insert_theme("dark", dark_colors);

        let light_colors = HashMap::from([
            ("title".to_string(), color("blue", &["bold"])),
            ("card_hidden".to_string(), color("black", &[])),
            ("card_face_up".to_string(), color("magenta", &["bold"])),
            ("card_matched".to_string(), color("green", &["reversed"])),
            ("stats".to_string(), color("blue", &[])),
        ]);
        self.insert_theme("light", light_colors);
    }

    fn insert_theme(&mut self, name: &str, colors: HashMap<String, ColorConfig>) {
        self.themes.insert(
            name.to_string(),
            Theme {
                name: name.to_string(),
                colors,
            },
        );
    }
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_color(color_name: &str) -> Option<Color> {
    match color_name.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "bright_black" => Some(Color::BrightBlack),
        "bright_red" => Some(Color::BrightRed),
        "bright_green" => Some(Color::BrightGreen),
        "bright_yellow" => Some(Color::BrightYellow),
        "bright_blue" => Some(Color::BrightBlue),
        "bright_magenta" => Some(Color::BrightMagenta),
        "bright_cyan" => Some(Color::BrightCyan),
        "bright_white" => Some(Color::BrightWhite),
        _ => None,
    }
}
