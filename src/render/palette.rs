use ratatui::style::Color;

/// Colours for the grid cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub head: Color,
    pub body: Color,
    pub apple: Color,
    pub empty: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            head: Color::LightGreen,
            body: Color::Green,
            apple: Color::Red,
            empty: Color::DarkGray,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_stands_out() {
        let palette = Palette::default();
        assert_ne!(palette.head, palette.body);
        assert_ne!(palette.apple, palette.body);
        assert_ne!(palette.apple, palette.empty);
    }
}
