//! Element locators and geometry.
//!
//! A [`Locator`] is a plain description of how to find an element. It is
//! serialized as-is into runtime commands so the page can resolve it itself,
//! and rendered to a JavaScript query expression for drivers that act through
//! script evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in page (CSS pixel) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    #[must_use]
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Element bounds as reported by `getBoundingClientRect`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// X position
    pub x: f64,
    /// Y position
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the center point
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point is inside this bounding box
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// How to find an element on the page
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Locator {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// First element whose text content includes the string
    Text(String),
}

impl Locator {
    /// Create a CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a test ID locator
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a text locator
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// JavaScript expression evaluating to the element or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        match self {
            Self::Css(s) => format!("document.querySelector({})", js_string(s)),
            Self::TestId(id) => format!(
                "document.querySelector({})",
                js_string(&format!("[data-testid=\"{id}\"]"))
            ),
            Self::Text(t) => format!(
                "Array.from(document.querySelectorAll('body *')).find(el => el.children.length === 0 && (el.textContent || '').includes({}))",
                js_string(t)
            ),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::TestId(id) => write!(f, "testid={id}"),
            Self::Text(t) => write!(f, "text={t}"),
        }
    }
}

/// Encode a string as a JavaScript string literal.
///
/// JSON string syntax is a subset of JavaScript's, so serde_json produces a
/// correctly escaped literal for any input.
pub(crate) fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
