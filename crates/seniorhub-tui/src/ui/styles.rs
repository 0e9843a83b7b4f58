use ratatui::style::{Color, Modifier, Style};

// SeniorHub palette (indigo brand on gray)
pub const INDIGO: Color = Color::Rgb(79, 70, 229); // #4F46E5
pub const INDIGO_DARK: Color = Color::Rgb(67, 56, 202); // #4338CA
pub const INDIGO_LIGHT: Color = Color::Rgb(238, 242, 255); // #EEF2FF
pub const INK: Color = Color::Rgb(17, 24, 39); // #111827
pub const GRAY: Color = Color::Rgb(107, 114, 128); // #6B7280
pub const GRAY_LIGHT: Color = Color::Rgb(156, 163, 175); // #9CA3AF
pub const BORDER: Color = Color::Rgb(229, 231, 235); // #E5E7EB

// Status colors
pub const SUCCESS: Color = Color::Rgb(96, 160, 96);
pub const ERROR: Color = Color::Rgb(192, 64, 64);

pub fn title_style() -> Style {
    Style::default().fg(INDIGO).add_modifier(Modifier::BOLD)
}

/// Focused tile title and the sign-in button
pub fn selected_style() -> Style {
    Style::default()
        .bg(INDIGO_DARK)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    Style::default().fg(Color::White)
}

pub fn muted_style() -> Style {
    Style::default().fg(GRAY)
}

/// User name in the title bar and pending prompts
pub fn highlight_style() -> Style {
    Style::default().fg(INDIGO_LIGHT)
}

pub fn success_style() -> Style {
    Style::default().fg(SUCCESS)
}

pub fn error_style() -> Style {
    Style::default().fg(ERROR)
}

pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(INDIGO)
    } else {
        Style::default().fg(GRAY_LIGHT)
    }
}

pub fn status_bar_style() -> Style {
    Style::default().bg(INK).fg(BORDER)
}

pub fn help_key_style() -> Style {
    Style::default()
        .fg(INDIGO)
        .add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_uses_brand_indigo() {
        assert_eq!(border_style(true).fg, Some(Color::Rgb(0x4F, 0x46, 0xE5)));
        assert_eq!(selected_style().bg, Some(Color::Rgb(0x43, 0x38, 0xCA)));
        assert_eq!(status_bar_style().bg, Some(Color::Rgb(0x11, 0x18, 0x27)));
    }
}
