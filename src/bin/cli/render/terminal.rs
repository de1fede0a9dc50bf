use vocab_lib::vocabulary::ItemStatus;

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Wrap text in a color code when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

pub fn status_label(status: ItemStatus, use_color: bool) -> String {
    let color = match status {
        ItemStatus::New => Color::CYAN,
        ItemStatus::Learning => Color::YELLOW,
        ItemStatus::Mastered => Color::GREEN,
    };
    paint(&status.to_string(), color, use_color)
}

/// Ten-cell bar for an accuracy in [0, 1]
pub fn accuracy_bar(accuracy: f64) -> String {
    let filled = (accuracy.clamp(0.0, 1.0) * 10.0).round() as usize;
    format!("{}{}", "\u{2588}".repeat(filled), "\u{2591}".repeat(10 - filled))
}

pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_bar() {
        assert_eq!(accuracy_bar(0.0).chars().filter(|c| *c == '\u{2588}').count(), 0);
        assert_eq!(accuracy_bar(0.46).chars().filter(|c| *c == '\u{2588}').count(), 5);
        assert_eq!(accuracy_bar(3.0).chars().count(), 10);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("überlänge wort", 8), "überl...");
    }

    #[test]
    fn test_paint_without_color() {
        assert_eq!(paint("x", Color::RED, false), "x");
        assert_eq!(paint("x", Color::RED, true), "\x1b[31mx\x1b[0m");
    }
}
