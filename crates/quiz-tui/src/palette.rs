use crossterm::style::Color;
use quiz_core::{Difficulty, Theme};

/// Terminal colors for one theme preference
#[derive(Debug, Clone)]
pub struct Palette {
    /// Default text color
    pub fg: Color,
    /// Headings and the country name on reveal
    pub title: Color,
    /// Revealed clue text
    pub clue: Color,
    /// Hidden clue placeholders and secondary text
    pub muted: Color,
    pub error: Color,
    pub success: Color,
    /// Command names in help text
    pub key: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::dark()
    }
}

impl Palette {
    /// Palette for a stored theme preference; `System` uses the terminal's own colors
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
            Theme::System => Self::terminal(),
        }
    }

    pub fn dark() -> Self {
        Self {
            fg: Color::Rgb { r: 230, g: 230, b: 240 },
            title: Color::Rgb { r: 120, g: 200, b: 255 },
            clue: Color::Rgb { r: 255, g: 255, b: 255 },
            muted: Color::Rgb { r: 140, g: 150, b: 180 },
            error: Color::Rgb { r: 255, g: 90, b: 90 },
            success: Color::Rgb { r: 90, g: 255, b: 130 },
            key: Color::Rgb { r: 255, g: 210, b: 100 },
        }
    }

    pub fn light() -> Self {
        Self {
            fg: Color::Rgb { r: 30, g: 30, b: 40 },
            title: Color::Rgb { r: 30, g: 100, b: 200 },
            clue: Color::Rgb { r: 0, g: 0, b: 0 },
            muted: Color::Rgb { r: 110, g: 110, b: 130 },
            error: Color::Rgb { r: 220, g: 50, b: 50 },
            success: Color::Rgb { r: 40, g: 160, b: 60 },
            key: Color::Rgb { r: 200, g: 120, b: 20 },
        }
    }

    /// Named ANSI colors, so the terminal's scheme decides
    pub fn terminal() -> Self {
        Self {
            fg: Color::Reset,
            title: Color::Cyan,
            clue: Color::Reset,
            muted: Color::DarkGrey,
            error: Color::Red,
            success: Color::Green,
            key: Color::Yellow,
        }
    }

    pub fn difficulty(&self, difficulty: Difficulty) -> Color {
        match difficulty {
            Difficulty::Easy => self.success,
            Difficulty::Medium => self.key,
            Difficulty::Hard => self.error,
        }
    }
}
