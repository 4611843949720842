//! Terminal styling and color utilities.
//!
//! Color output respects the `NO_COLOR` and `TERM=dumb` conventions.

/// ANSI escape codes for text styling and colors.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";
    /// Bright bold white for headings.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Gray for secondary details (cell indices, expansions).
    pub const GRAY: &str = "\x1b[90m";
    /// Cyan for coordinates.
    pub const CYAN: &str = "\x1b[36m";
    /// Green for found segments and energy savings.
    pub const GREEN: &str = "\x1b[32m";
    /// Red for unreachable segments and energy losses.
    pub const RED: &str = "\x1b[31m";
}

/// Resolved color codes, either ANSI sequences or empty strings when color is disabled.
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
    pub cyan: &'static str,
    pub green: &'static str,
    pub red: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
            cyan: colors::CYAN,
            green: colors::GREEN,
            red: colors::RED,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            white_bold: "",
            gray: "",
            cyan: "",
            green: "",
            red: "",
        }
    }

    /// Pick [`ColorPalette::colored`] or [`ColorPalette::plain`] from the environment.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }

    /// Green for savings, red for losses.
    #[must_use]
    pub fn for_savings(&self, savings: f64) -> &'static str {
        if savings >= 0.0 {
            self.green
        } else {
            self.red
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Check if the terminal supports ANSI color codes.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_palette_colored() {
        let p = ColorPalette::colored();
        assert!(!p.reset.is_empty());
        assert!(!p.green.is_empty());
    }

    #[test]
    fn test_color_palette_plain() {
        let p = ColorPalette::plain();
        assert!(p.reset.is_empty());
        assert!(p.white_bold.is_empty());
    }

    #[test]
    fn test_savings_color() {
        let p = ColorPalette::colored();
        assert_eq!(p.for_savings(3.5), colors::GREEN);
        assert_eq!(p.for_savings(-0.1), colors::RED);
        assert_eq!(ColorPalette::plain().for_savings(-1.0), "");
    }
}
