use catppuccin::PALETTE;
use ratatui::style::Color;

/// Convert a catppuccin color to a ratatui color.
const fn catppuccin_to_color(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Colors used to paint the page and the dialog.
///
/// Only the roles the views need are kept; each flavor of the Catppuccin
/// palette maps onto them through [`Theme::from_catppuccin`].
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub base: Color,
    pub mantle: Color,
    pub crust: Color,
    pub surface1: Color,
    pub overlay0: Color,
    pub text: Color,
    pub subtext0: Color,
    pub mauve: Color,
    pub red: Color,
    pub green: Color,
    pub peach: Color,
    pub blue: Color,
    pub lavender: Color,
}

impl Theme {
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: catppuccin_to_color(&c.base),
            mantle: catppuccin_to_color(&c.mantle),
            crust: catppuccin_to_color(&c.crust),
            surface1: catppuccin_to_color(&c.surface1),
            overlay0: catppuccin_to_color(&c.overlay0),
            text: catppuccin_to_color(&c.text),
            subtext0: catppuccin_to_color(&c.subtext0),
            mauve: catppuccin_to_color(&c.mauve),
            red: catppuccin_to_color(&c.red),
            green: catppuccin_to_color(&c.green),
            peach: catppuccin_to_color(&c.peach),
            blue: catppuccin_to_color(&c.blue),
            lavender: catppuccin_to_color(&c.lavender),
        }
    }

    // Semantic roles

    #[must_use]
    pub const fn error(&self) -> Color {
        self.red
    }

    #[must_use]
    pub const fn success(&self) -> Color {
        self.green
    }

    #[must_use]
    pub const fn border(&self) -> Color {
        self.surface1
    }

    #[must_use]
    pub const fn border_focused(&self) -> Color {
        self.lavender
    }

    #[must_use]
    pub const fn header(&self) -> Color {
        self.mauve
    }

    #[must_use]
    pub const fn placeholder(&self) -> Color {
        self.overlay0
    }

    #[must_use]
    pub const fn link(&self) -> Color {
        self.blue
    }

    #[must_use]
    pub const fn key_hint(&self) -> Color {
        self.peach
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }
}

/// Look up a theme by name. Returns the default theme if not found.
pub fn theme_from_name(name: &str) -> Theme {
    let flavor = match name.to_lowercase().as_str() {
        "catppuccin mocha" => &PALETTE.mocha,
        "catppuccin macchiato" => &PALETTE.macchiato,
        "catppuccin frappé" | "catppuccin frappe" => &PALETTE.frappe,
        "catppuccin latte" => &PALETTE.latte,
        _ => {
            tracing::warn!(name, "Unknown theme, using the default");
            return Theme::default();
        }
    };
    Theme::from_catppuccin(flavor)
}
