//! Type-safe CSS generation.
//!
//! Rules are collected in insertion order and rendered in one pass, so the
//! same builder calls always produce byte-identical output.

use serde::{Deserialize, Serialize};

/// A CSS rule with selector and declarations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssRule {
    /// CSS selector
    pub selector: String,
    /// Property-value pairs
    pub declarations: Vec<(String, String)>,
}

impl CssRule {
    /// Create a new CSS rule
    #[must_use]
    pub fn new(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            declarations: Vec::new(),
        }
    }

    /// Add a declaration
    #[must_use]
    pub fn declaration(mut self, property: &str, value: &str) -> Self {
        self.declarations
            .push((property.to_string(), value.to_string()));
        self
    }

    /// Render rule to CSS string
    #[must_use]
    pub fn render(&self) -> String {
        self.render_indented("")
    }

    fn render_indented(&self, indent: &str) -> String {
        if self.declarations.is_empty() {
            return String::new();
        }

        let decls = self
            .declarations
            .iter()
            .map(|(prop, val)| format!("{indent}    {prop}: {val};"))
            .collect::<Vec<_>>()
            .join("\n");

        format!("{indent}{} {{\n{decls}\n{indent}}}", self.selector)
    }
}

/// A named `@keyframes` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyframes {
    /// Animation name
    pub name: String,
    /// Frames, each selector being an offset such as `0%` or `to`
    pub frames: Vec<CssRule>,
}

impl Keyframes {
    /// Create an empty keyframes block
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            frames: Vec::new(),
        }
    }

    /// Add a frame at `offset`
    #[must_use]
    pub fn frame(mut self, offset: &str, declarations: &[(&str, &str)]) -> Self {
        let rule = declarations
            .iter()
            .fold(CssRule::new(offset), |rule, (prop, val)| {
                rule.declaration(prop, val)
            });
        self.frames.push(rule);
        self
    }

    /// Render to CSS string
    #[must_use]
    pub fn render(&self) -> String {
        let body = self
            .frames
            .iter()
            .map(|frame| frame.render_indented("    "))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        format!("@keyframes {} {{\n{body}\n}}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Rule(CssRule),
    Keyframes(Keyframes),
}

impl Block {
    fn render(&self) -> String {
        match self {
            Self::Rule(rule) => rule.render(),
            Self::Keyframes(keyframes) => keyframes.render(),
        }
    }
}

/// Type-safe CSS builder
#[derive(Debug, Clone, Default)]
pub struct CssBuilder {
    variables: Vec<(String, String)>,
    blocks: Vec<Block>,
}

impl CssBuilder {
    /// Create a new CSS builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a CSS variable
    #[must_use]
    pub fn variable(mut self, name: &str, value: &str) -> Self {
        self.variables.push((name.to_string(), value.to_string()));
        self
    }

    /// Add a CSS rule
    #[must_use]
    pub fn rule(mut self, rule: CssRule) -> Self {
        self.blocks.push(Block::Rule(rule));
        self
    }

    /// Add a keyframes block
    #[must_use]
    pub fn keyframes(mut self, keyframes: Keyframes) -> Self {
        self.blocks.push(Block::Keyframes(keyframes));
        self
    }

    /// Number of rules and keyframes blocks added so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether nothing but variables has been added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Render the stylesheet
    #[must_use]
    pub fn build(self) -> String {
        let mut content = String::new();

        if !self.variables.is_empty() {
            content.push_str(":root {\n");
            for (name, value) in &self.variables {
                content.push_str(&format!("    --{name}: {value};\n"));
            }
            content.push_str("}\n\n");
        }

        let rendered: Vec<String> = self
            .blocks
            .iter()
            .map(Block::render)
            .filter(|s| !s.is_empty())
            .collect();
        content.push_str(&rendered.join("\n\n"));
        content.push('\n');
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_new() {
        let builder = CssBuilder::new();
        assert!(builder.is_empty());
        assert_eq!(builder.len(), 0);
    }

    #[test]
    fn test_variable() {
        let css = CssBuilder::new().variable("primary", "#ff0000").build();
        assert!(css.contains(":root {"));
        assert!(css.contains("--primary: #ff0000;"));
    }

    #[test]
    fn test_rule_render() {
        let rule = CssRule::new("body")
            .declaration("margin", "0")
            .declaration("padding", "0");

        let rendered = rule.render();
        assert!(rendered.starts_with("body {"));
        assert!(rendered.contains("    margin: 0;"));
        assert!(rendered.contains("    padding: 0;"));
    }

    #[test]
    fn test_rule_empty_declarations() {
        assert!(CssRule::new("div").render().is_empty());
        let css = CssBuilder::new().rule(CssRule::new("div")).build();
        assert!(!css.contains("div"));
    }

    #[test]
    fn test_keyframes_render() {
        let kf = Keyframes::new("spin")
            .frame("from", &[("transform", "rotate(0deg)")])
            .frame("to", &[("transform", "rotate(360deg)")]);
        let rendered = kf.render();
        assert!(rendered.starts_with("@keyframes spin {"));
        assert!(rendered.contains("    from {\n        transform: rotate(0deg);\n    }"));
        assert!(rendered.ends_with('}'));
    }

    #[test]
    fn test_blocks_keep_insertion_order() {
        let css = CssBuilder::new()
            .rule(CssRule::new(".a").declaration("color", "red"))
            .keyframes(Keyframes::new("k").frame("to", &[("opacity", "0")]))
            .rule(CssRule::new(".b").declaration("color", "blue"))
            .build();
        let a = css.find(".a {").unwrap();
        let k = css.find("@keyframes k").unwrap();
        let b = css.find(".b {").unwrap();
        assert!(a < k && k < b);
    }
}
