use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub header_accent_bg: Color,
    pub header_accent_fg: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub status_ok: Color,
    pub status_err: Color,
    pub statusbar_bg: Color,
    pub overlay_border: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub accent_mauve: Color,
    pub pill_key_bg: Color,
    pub pill_key_fg: Color,
    pub pill_desc_fg: Color,
    pub surface_bg: Color,
    pub gauge_filled: Color,
    pub gauge_unfilled: Color,
    /// Idle, busy, hot: indexed by [`Theme::load_color`].
    pub heat_colors: [Color; 3],
}

impl Theme {
    pub fn from_config(theme_name: &str) -> Self {
        match theme_name.to_lowercase().as_str() {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn dark() -> Self {
        Theme {
            name: "dark",
            header_accent_bg: Color::Green,
            header_accent_fg: Color::Black,
            selection_bg: Color::Rgb(51, 65, 85),
            selection_fg: Color::White,
            status_ok: Color::Green,
            status_err: Color::Red,
            statusbar_bg: Color::DarkGray,
            overlay_border: Color::DarkGray,
            text_primary: Color::White,
            text_secondary: Color::Gray,
            accent_mauve: Color::Green,
            pill_key_bg: Color::Yellow,
            pill_key_fg: Color::Black,
            pill_desc_fg: Color::White,
            surface_bg: Color::DarkGray,
            gauge_filled: Color::Rgb(103, 232, 249),
            gauge_unfilled: Color::DarkGray,
            heat_colors: [
                Color::Rgb(148, 163, 184),
                Color::Rgb(249, 115, 22),
                Color::Rgb(239, 68, 68),
            ],
        }
    }

    pub fn light() -> Self {
        Theme {
            name: "light",
            header_accent_bg: Color::Rgb(37, 99, 235),
            header_accent_fg: Color::White,
            selection_bg: Color::Rgb(219, 234, 254),
            selection_fg: Color::Black,
            status_ok: Color::Rgb(21, 128, 61),
            status_err: Color::Rgb(185, 28, 28),
            statusbar_bg: Color::Rgb(226, 232, 240),
            overlay_border: Color::Rgb(148, 163, 184),
            text_primary: Color::Black,
            text_secondary: Color::Rgb(71, 85, 105),
            accent_mauve: Color::Rgb(124, 58, 237),
            pill_key_bg: Color::Rgb(37, 99, 235),
            pill_key_fg: Color::White,
            pill_desc_fg: Color::Black,
            surface_bg: Color::Rgb(241, 245, 249),
            gauge_filled: Color::Rgb(37, 99, 235),
            gauge_unfilled: Color::Rgb(226, 232, 240),
            heat_colors: [
                Color::Rgb(71, 85, 105),
                Color::Rgb(194, 65, 12),
                Color::Rgb(185, 28, 28),
            ],
        }
    }

    pub fn load_color(&self, percent: f64) -> Color {
        if percent >= 50.0 {
            self.heat_colors[2]
        } else if percent >= 10.0 {
            self.heat_colors[1]
        } else {
            self.heat_colors[0]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_theme_falls_back_to_dark() {
        assert_eq!(Theme::from_config("LIGHT").name, "light");
        assert_eq!(Theme::from_config("neon").name, "dark");
    }

    #[test]
    fn load_color_steps() {
        let theme = Theme::dark();
        assert_eq!(theme.load_color(0.0), theme.heat_colors[0]);
        assert_eq!(theme.load_color(25.0), theme.heat_colors[1]);
        assert_eq!(theme.load_color(99.0), theme.heat_colors[2]);
    }
}
