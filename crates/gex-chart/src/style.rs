//! Theme-derived rendering parameters.

use gex_core::ThemeMode;
use serde::Serialize;

/// Legend layout hint for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendOrientation {
    Horizontal,
    Vertical,
}

/// Colors and layout handed to the renderer alongside a card view.
///
/// Derived from `ThemeMode` only; never consulted for data decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartStyle {
    pub theme: ThemeMode,
    pub background_color: &'static str,
    pub font_color: &'static str,
    pub grid_color: &'static str,
    pub legend_orientation: LegendOrientation,
    pub call_color: &'static str,
    pub put_color: &'static str,
    pub net_color: &'static str,
}

impl ChartStyle {
    pub fn for_theme(theme: ThemeMode) -> Self {
        match theme {
            ThemeMode::Dark => Self {
                theme,
                background_color: "#1e1e1e",
                font_color: "#e0e0e0",
                grid_color: "#333333",
                legend_orientation: LegendOrientation::Horizontal,
                call_color: "rgba(40, 167, 69, 0.7)",
                put_color: "rgba(220, 53, 69, 0.7)",
                net_color: "#ffc107",
            },
            ThemeMode::Light => Self {
                theme,
                background_color: "#ffffff",
                font_color: "#212529",
                grid_color: "#e9ecef",
                legend_orientation: LegendOrientation::Horizontal,
                call_color: "rgba(40, 167, 69, 0.7)",
                put_color: "rgba(220, 53, 69, 0.7)",
                net_color: "#0d6efd",
            },
        }
    }
}

impl From<ThemeMode> for ChartStyle {
    fn from(theme: ThemeMode) -> Self {
        Self::for_theme(theme)
    }
}
