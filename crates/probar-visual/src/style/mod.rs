//! Stylesheet for the instrumentation nodes.
//!
//! [`generate_styles`] is a pure function of the theme. Its output is handed
//! to the page runtime once per document and inserted as a single `<style>`
//! element.

pub mod css_builder;
pub mod theme;

pub use css_builder::{CssBuilder, CssRule, Keyframes};
pub use theme::{PanelPosition, ResolvedTheme, Theme};

use crate::animation::EasingFunction;

/// DOM ids and class names shared with the page runtime script.
pub mod names {
    /// `<style>` element holding the generated stylesheet
    pub const STYLE_ID: &str = "pv-style";
    /// Animated pointer
    pub const CURSOR_ID: &str = "pv-cursor";
    /// Click ripple
    pub const RIPPLE_ID: &str = "pv-ripple";
    /// Page dimming layer
    pub const DIM_ID: &str = "pv-dim";
    /// Pass/fail overlay
    pub const RESULT_ID: &str = "pv-result";
    /// Story narration panel
    pub const STORY_ID: &str = "pv-story";
    /// Marker class on the highlighted element
    pub const HIGHLIGHT_CLASS: &str = "pv-highlight";

    /// Every singleton node id created by the runtime
    pub const NODE_IDS: [&str; 5] = [CURSOR_ID, RIPPLE_ID, DIM_ID, RESULT_ID, STORY_ID];
}

// Stacking order: dim < story < result < ripple < cursor.
const Z_DIM: &str = "2147483640";
const Z_STORY: &str = "2147483643";
const Z_RESULT: &str = "2147483645";
const Z_RIPPLE: &str = "2147483646";
const Z_CURSOR: &str = "2147483647";

/// Render the complete stylesheet for `theme`.
#[must_use]
pub fn generate_styles(theme: &Theme) -> String {
    let t = theme.resolve();
    let size = format!("{}px", t.cursor_size);
    let half = format!("-{}px", t.cursor_size / 2);

    let builder = CssBuilder::new()
        .variable("pv-cursor", &t.cursor_color)
        .variable("pv-highlight", &t.highlight_color)
        .variable("pv-ripple", &t.ripple_color)
        .variable("pv-panel-bg", &t.panel_background)
        .variable("pv-panel-fg", &t.panel_text)
        .variable("pv-accent", &t.panel_accent)
        .variable("pv-pass", &t.pass_color)
        .variable("pv-fail", &t.fail_color);

    let builder = cursor_rules(builder, &size, &half);
    let builder = highlight_rules(builder);
    let builder = story_rules(builder, &t);
    let builder = result_rules(builder);
    focus_rules(builder).build()
}

fn cursor_rules(builder: CssBuilder, size: &str, half: &str) -> CssBuilder {
    builder
        .rule(
            CssRule::new("#pv-cursor")
                .declaration("position", "fixed")
                .declaration("left", "0")
                .declaration("top", "0")
                .declaration("width", size)
                .declaration("height", size)
                .declaration("background", "var(--pv-cursor)")
                .declaration("clip-path", "polygon(0 0, 0 85%, 28% 64%, 48% 100%, 62% 94%, 42% 58%, 78% 58%)")
                .declaration("filter", "drop-shadow(0 1px 2px rgba(0, 0, 0, 0.45))")
                .declaration("transform-origin", "0 0")
                .declaration("pointer-events", "none")
                .declaration("z-index", Z_CURSOR)
                .declaration("will-change", "transform"),
        )
        .rule(
            CssRule::new("#pv-cursor.pv-text")
                .declaration("width", "3px")
                .declaration("clip-path", "none")
                .declaration("border-radius", "1px")
                .declaration("margin-top", half),
        )
        .rule(
            CssRule::new("#pv-cursor.pv-bounce")
                .declaration("animation", "pv-bounce 260ms ease-out"),
        )
        .keyframes(
            Keyframes::new("pv-bounce")
                .frame("0%", &[("scale", "1"), ("translate", "0 0")])
                .frame("40%", &[("scale", "0.8"), ("translate", "0 3px")])
                .frame("100%", &[("scale", "1"), ("translate", "0 0")]),
        )
        .rule(
            CssRule::new("#pv-ripple")
                .declaration("position", "fixed")
                .declaration("left", "0")
                .declaration("top", "0")
                .declaration("width", "36px")
                .declaration("height", "36px")
                .declaration("margin", "-18px 0 0 -18px")
                .declaration("border-radius", "50%")
                .declaration("background", "var(--pv-ripple)")
                .declaration("opacity", "0")
                .declaration("pointer-events", "none")
                .declaration("z-index", Z_RIPPLE),
        )
        .rule(
            CssRule::new("#pv-ripple.pv-rippling")
                .declaration("animation", "pv-ripple 450ms ease-out forwards"),
        )
        .keyframes(
            Keyframes::new("pv-ripple")
                .frame("0%", &[("transform", "scale(0.2)"), ("opacity", "1")])
                .frame("100%", &[("transform", "scale(2.4)"), ("opacity", "0")]),
        )
}

fn highlight_rules(builder: CssBuilder) -> CssBuilder {
    builder.rule(
        CssRule::new(".pv-highlight")
            .declaration("outline", "3px solid var(--pv-highlight) !important")
            .declaration("outline-offset", "2px !important")
            .declaration(
                "box-shadow",
                "0 0 0 6px color-mix(in srgb, var(--pv-highlight) 35%, transparent) !important",
            )
            .declaration("transition", "outline-color 150ms ease, box-shadow 150ms ease"),
    )
}

fn story_rules(builder: CssBuilder, theme: &ResolvedTheme) -> CssBuilder {
    let panel = theme
        .panel_position
        .anchors()
        .iter()
        .fold(CssRule::new("#pv-story"), |rule, (prop, val)| {
            rule.declaration(prop, val)
        })
        .declaration("position", "fixed")
        .declaration("width", "360px")
        .declaration("max-height", "60vh")
        .declaration("overflow", "hidden")
        .declaration("padding", "14px 16px")
        .declaration("border-radius", "10px")
        .declaration("background", "var(--pv-panel-bg)")
        .declaration("color", "var(--pv-panel-fg)")
        .declaration("font", "13px/1.45 system-ui, -apple-system, sans-serif")
        .declaration("box-shadow", "0 8px 28px rgba(0, 0, 0, 0.35)")
        .declaration("pointer-events", "none")
        .declaration("z-index", Z_STORY)
        .declaration("opacity", "1")
        .declaration(
            "transition",
            &format!(
                "opacity 250ms {ease}, transform 250ms {ease}",
                ease = EasingFunction::CubicOut.css()
            ),
        );

    builder
        .rule(panel)
        .rule(
            CssRule::new("#pv-story.pv-hidden")
                .declaration("opacity", "0")
                .declaration("transform", "translateY(-6px)"),
        )
        .rule(
            CssRule::new("#pv-story .pv-feature")
                .declaration("font-weight", "700")
                .declaration("color", "var(--pv-accent)")
                .declaration("margin-bottom", "2px"),
        )
        .rule(
            CssRule::new("#pv-story .pv-scenario")
                .declaration("font-weight", "600")
                .declaration("margin-bottom", "8px"),
        )
        .rule(
            CssRule::new("#pv-story .pv-step")
                .declaration("padding", "3px 8px")
                .declaration("border-left", "3px solid transparent")
                .declaration("transition", "opacity 200ms ease, border-color 200ms ease"),
        )
        .rule(CssRule::new("#pv-story .pv-step.pv-pending").declaration("opacity", "0.5"))
        .rule(
            CssRule::new("#pv-story .pv-step.pv-active")
                .declaration("opacity", "1")
                .declaration("border-left-color", "var(--pv-accent)")
                .declaration("background", "rgba(255, 255, 255, 0.06)"),
        )
        .rule(
            CssRule::new("#pv-story .pv-step.pv-completed")
                .declaration("opacity", "0.8")
                .declaration("border-left-color", "var(--pv-pass)"),
        )
        .rule(
            CssRule::new("#pv-story .pv-keyword")
                .declaration("font-weight", "700")
                .declaration("margin-right", "6px")
                .declaration("color", "var(--pv-accent)"),
        )
}

fn result_rules(builder: CssBuilder) -> CssBuilder {
    builder
        .rule(
            CssRule::new("#pv-result")
                .declaration("position", "fixed")
                .declaration("inset", "0")
                .declaration("display", "flex")
                .declaration("flex-direction", "column")
                .declaration("align-items", "center")
                .declaration("justify-content", "center")
                .declaration("font", "600 28px system-ui, -apple-system, sans-serif")
                .declaration("color", "#fff")
                .declaration("opacity", "0")
                .declaration("visibility", "hidden")
                .declaration("pointer-events", "none")
                .declaration("z-index", Z_RESULT)
                .declaration(
                    "transition",
                    &format!("opacity 300ms {}", EasingFunction::EaseOut.css()),
                ),
        )
        .rule(
            CssRule::new("#pv-result.pv-visible")
                .declaration("opacity", "1")
                .declaration("visibility", "visible"),
        )
        .rule(
            CssRule::new("#pv-result.pv-pass")
                .declaration("background", "color-mix(in srgb, var(--pv-pass) 30%, rgba(0, 0, 0, 0.55))"),
        )
        .rule(
            CssRule::new("#pv-result.pv-fail")
                .declaration("background", "color-mix(in srgb, var(--pv-fail) 35%, rgba(0, 0, 0, 0.6))"),
        )
        .rule(
            CssRule::new("#pv-result .pv-result-icon")
                .declaration("width", "96px")
                .declaration("height", "96px")
                .declaration("border-radius", "50%")
                .declaration("display", "flex")
                .declaration("align-items", "center")
                .declaration("justify-content", "center")
                .declaration("font-size", "56px")
                .declaration("margin-bottom", "12px"),
        )
        .rule(
            CssRule::new("#pv-result.pv-pass .pv-result-icon")
                .declaration("background", "var(--pv-pass)"),
        )
        .rule(
            CssRule::new("#pv-result.pv-fail .pv-result-icon")
                .declaration("background", "var(--pv-fail)"),
        )
        .rule(
            CssRule::new("#pv-result.pv-visible .pv-result-icon")
                .declaration("animation", "pv-icon-pop 420ms cubic-bezier(0.34, 1.56, 0.64, 1)"),
        )
        .keyframes(
            Keyframes::new("pv-icon-pop")
                .frame("0%", &[("transform", "scale(0.3)"), ("opacity", "0")])
                .frame("100%", &[("transform", "scale(1)"), ("opacity", "1")]),
        )
}

fn focus_rules(builder: CssBuilder) -> CssBuilder {
    builder
        .rule(
            CssRule::new("#pv-dim")
                .declaration("position", "fixed")
                .declaration("inset", "0")
                .declaration("background", "rgba(0, 0, 0, 0.55)")
                .declaration("opacity", "0")
                .declaration("pointer-events", "none")
                .declaration("z-index", Z_DIM)
                .declaration("transition", "opacity 250ms ease"),
        )
        .rule(CssRule::new("html.pv-focus-story #pv-dim").declaration("opacity", "1"))
        .rule(
            CssRule::new("html.pv-focus-story #pv-story")
                .declaration("box-shadow", "0 0 0 2px var(--pv-accent), 0 12px 40px rgba(0, 0, 0, 0.5)")
                .declaration("transform", "scale(1.03)"),
        )
        .rule(CssRule::new("html.pv-focus-page #pv-story").declaration("opacity", "0.35"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let theme = Theme::new().cursor_color("#00ff00");
        assert_eq!(generate_styles(&theme), generate_styles(&theme));
    }

    #[test]
    fn test_covers_every_node() {
        let css = generate_styles(&Theme::default());
        for id in names::NODE_IDS {
            assert!(css.contains(&format!("#{id} {{")), "missing rule for #{id}");
        }
        assert!(css.contains(".pv-highlight {"));
    }

    #[test]
    fn test_covers_states_and_animations() {
        let css = generate_styles(&Theme::default());
        for needle in [
            "#pv-cursor.pv-text",
            "@keyframes pv-ripple",
            "@keyframes pv-bounce",
            "@keyframes pv-icon-pop",
            ".pv-step.pv-pending",
            ".pv-step.pv-active",
            ".pv-step.pv-completed",
            "#pv-result.pv-pass",
            "#pv-result.pv-fail",
            "html.pv-focus-story #pv-dim",
            "html.pv-focus-page #pv-story",
        ] {
            assert!(css.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn test_instrumentation_is_non_interactive() {
        let css = generate_styles(&Theme::default());
        assert_eq!(css.matches("pointer-events: none;").count(), 5);
    }

    #[test]
    fn test_theme_overrides_flow_into_variables() {
        let css = generate_styles(
            &Theme::new()
                .cursor_color("#010203")
                .cursor_size(40)
                .highlight_color("hotpink"),
        );
        assert!(css.contains("--pv-cursor: #010203;"));
        assert!(css.contains("--pv-highlight: hotpink;"));
        assert!(css.contains("width: 40px;"));
        assert!(css.contains("margin-top: -20px;"));
    }

    #[test]
    fn test_panel_position() {
        let css = generate_styles(&Theme::new().panel_position(PanelPosition::BottomLeft));
        let panel = &css[css.find("#pv-story {").unwrap()..];
        let panel = &panel[..panel.find('}').unwrap()];
        assert!(panel.contains("bottom: 16px;"));
        assert!(panel.contains("left: 16px;"));
        assert!(!panel.contains("top: 16px;"));
    }
}
