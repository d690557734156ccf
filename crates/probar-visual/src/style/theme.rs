//! Theme overrides and their defaults.

use crate::result::VisualResult;
use serde::{Deserialize, Serialize};

/// Corner of the viewport holding the story panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelPosition {
    /// Top right corner
    #[default]
    TopRight,
    /// Top left corner
    TopLeft,
    /// Bottom right corner
    BottomRight,
    /// Bottom left corner
    BottomLeft,
}

impl PanelPosition {
    /// Offset declarations anchoring the panel
    #[must_use]
    pub const fn anchors(self) -> [(&'static str, &'static str); 2] {
        match self {
            Self::TopRight => [("top", "16px"), ("right", "16px")],
            Self::TopLeft => [("top", "16px"), ("left", "16px")],
            Self::BottomRight => [("bottom", "16px"), ("right", "16px")],
            Self::BottomLeft => [("bottom", "16px"), ("left", "16px")],
        }
    }
}

/// Caller overrides; every `None` falls back to the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    /// Cursor fill color
    pub cursor_color: Option<String>,
    /// Cursor size in pixels
    pub cursor_size: Option<u32>,
    /// Highlight outline color
    pub highlight_color: Option<String>,
    /// Click ripple color
    pub ripple_color: Option<String>,
    /// Story panel background
    pub panel_background: Option<String>,
    /// Story panel text color
    pub panel_text: Option<String>,
    /// Accent for the active step and headings
    pub panel_accent: Option<String>,
    /// Result overlay color on success
    pub pass_color: Option<String>,
    /// Result overlay color on failure
    pub fail_color: Option<String>,
    /// Story panel corner
    pub panel_position: Option<PanelPosition>,
}

impl Theme {
    /// Create an empty override set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse overrides from JSON
    pub fn from_json(json: &str) -> VisualResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Override the cursor color
    #[must_use]
    pub fn cursor_color(mut self, color: impl Into<String>) -> Self {
        self.cursor_color = Some(color.into());
        self
    }

    /// Override the cursor size
    #[must_use]
    pub const fn cursor_size(mut self, px: u32) -> Self {
        self.cursor_size = Some(px);
        self
    }

    /// Override the highlight color
    #[must_use]
    pub fn highlight_color(mut self, color: impl Into<String>) -> Self {
        self.highlight_color = Some(color.into());
        self
    }

    /// Override the panel accent color
    #[must_use]
    pub fn panel_accent(mut self, color: impl Into<String>) -> Self {
        self.panel_accent = Some(color.into());
        self
    }

    /// Override the panel corner
    #[must_use]
    pub const fn panel_position(mut self, position: PanelPosition) -> Self {
        self.panel_position = Some(position);
        self
    }

    /// Merge over the defaults.
    ///
    /// A color that could escape its declaration (it contains `;`, `{` or
    /// `}`) is ignored and the default is used instead.
    #[must_use]
    pub fn resolve(&self) -> ResolvedTheme {
        let d = ResolvedTheme::default();
        ResolvedTheme {
            cursor_color: css_value("cursorColor", self.cursor_color.as_ref(), d.cursor_color),
            cursor_size: self.cursor_size.unwrap_or(d.cursor_size).max(8),
            highlight_color: css_value(
                "highlightColor",
                self.highlight_color.as_ref(),
                d.highlight_color,
            ),
            ripple_color: css_value("rippleColor", self.ripple_color.as_ref(), d.ripple_color),
            panel_background: css_value(
                "panelBackground",
                self.panel_background.as_ref(),
                d.panel_background,
            ),
            panel_text: css_value("panelText", self.panel_text.as_ref(), d.panel_text),
            panel_accent: css_value("panelAccent", self.panel_accent.as_ref(), d.panel_accent),
            pass_color: css_value("passColor", self.pass_color.as_ref(), d.pass_color),
            fail_color: css_value("failColor", self.fail_color.as_ref(), d.fail_color),
            panel_position: self.panel_position.unwrap_or(d.panel_position),
        }
    }
}

fn css_value(field: &'static str, value: Option<&String>, default: String) -> String {
    match value {
        Some(v) if v.contains([';', '{', '}']) => {
            tracing::debug!(field, value = %v, "theme value rejected, using default");
            default
        }
        Some(v) => v.clone(),
        None => default,
    }
}

/// Fully populated theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTheme {
    /// Cursor fill color
    pub cursor_color: String,
    /// Cursor size in pixels (at least 8)
    pub cursor_size: u32,
    /// Highlight outline color
    pub highlight_color: String,
    /// Click ripple color
    pub ripple_color: String,
    /// Story panel background
    pub panel_background: String,
    /// Story panel text color
    pub panel_text: String,
    /// Accent for the active step and headings
    pub panel_accent: String,
    /// Result overlay color on success
    pub pass_color: String,
    /// Result overlay color on failure
    pub fail_color: String,
    /// Story panel corner
    pub panel_position: PanelPosition,
}

impl Default for ResolvedTheme {
    fn default() -> Self {
        Self {
            cursor_color: "#ff3b30".to_string(),
            cursor_size: 24,
            highlight_color: "#ffcc00".to_string(),
            ripple_color: "rgba(255, 59, 48, 0.45)".to_string(),
            panel_background: "rgba(20, 22, 30, 0.92)".to_string(),
            panel_text: "#f5f5f7".to_string(),
            panel_accent: "#4a90d9".to_string(),
            pass_color: "#34c759".to_string(),
            fail_color: "#ff3b30".to_string(),
            panel_position: PanelPosition::TopRight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_theme_resolves_to_defaults() {
        assert_eq!(Theme::new().resolve(), ResolvedTheme::default());
    }

    #[test]
    fn test_overrides_win() {
        let resolved = Theme::new()
            .cursor_color("blue")
            .cursor_size(32)
            .panel_position(PanelPosition::BottomLeft)
            .resolve();
        assert_eq!(resolved.cursor_color, "blue");
        assert_eq!(resolved.cursor_size, 32);
        assert_eq!(resolved.panel_position, PanelPosition::BottomLeft);
        assert_eq!(resolved.highlight_color, "#ffcc00");
    }

    #[test]
    fn test_cursor_size_floor() {
        assert_eq!(Theme::new().cursor_size(2).resolve().cursor_size, 8);
    }

    #[test]
    fn test_from_json() {
        let theme =
            Theme::from_json(r##"{"panelAccent": "#123456", "panelPosition": "bottom-right"}"##)
                .unwrap();
        assert_eq!(theme.panel_accent.as_deref(), Some("#123456"));
        assert_eq!(theme.panel_position, Some(PanelPosition::BottomRight));
        assert!(theme.cursor_color.is_none());
    }

    #[test]
    fn test_declaration_breaking_values_fall_back() {
        let resolved = Theme::new()
            .cursor_color("red; } body { display: none")
            .highlight_color("{")
            .panel_accent("rgb(1, 2, 3)")
            .resolve();
        let defaults = ResolvedTheme::default();
        assert_eq!(resolved.cursor_color, defaults.cursor_color);
        assert_eq!(resolved.highlight_color, defaults.highlight_color);
        assert_eq!(resolved.panel_accent, "rgb(1, 2, 3)");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(Theme::from_json("{not json").is_err());
    }

    #[test]
    fn test_anchors() {
        assert_eq!(
            PanelPosition::BottomLeft.anchors(),
            [("bottom", "16px"), ("left", "16px")]
        );
    }
}
