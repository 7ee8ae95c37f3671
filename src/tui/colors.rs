//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Priority;

/// High priority cards
pub const PRIORITY_HIGH: Color = Color::Rgb(200, 40, 40);
/// Medium priority cards
pub const PRIORITY_MEDIUM: Color = Color::Rgb(230, 130, 20);
/// Low priority cards
pub const PRIORITY_LOW: Color = Color::Rgb(210, 190, 40);
/// Today's column border and header
pub const TODAY: Color = Color::Rgb(255, 140, 0);
/// Overdue card background
pub const OVERDUE: Color = Color::Rgb(114, 0, 0);
/// Selection and status bar accent
pub const ACCENT: Color = Color::Rgb(0, 95, 135);

pub fn priority_color(p: Priority) -> Color {
    match p {
        Priority::High => PRIORITY_HIGH,
        Priority::Medium => PRIORITY_MEDIUM,
        Priority::Low => PRIORITY_LOW,
    }
}
