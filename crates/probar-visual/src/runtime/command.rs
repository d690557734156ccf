//! Typed commands for the in-page control object.
//!
//! Each [`RuntimeCall`] serializes to the JSON object the page-side
//! `dispatch` function switches on, e.g.
//! `{"op":"move","x":10.0,"y":20.0,"cx":5.0,"cy":30.0,"durationMs":300}`.

use crate::locator::Locator;
use serde::{Deserialize, Serialize};

/// Shape of the animated pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorShape {
    /// Arrow pointer
    #[default]
    Pointer,
    /// Text caret, used while typing
    Text,
}

/// One line of a narrated scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryStep {
    /// Gherkin keyword ("Given", "When", "Then", "And", ...)
    pub keyword: String,
    /// Step text
    pub text: String,
}

impl StoryStep {
    /// Create a step
    #[must_use]
    pub fn new(keyword: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            text: text.into(),
        }
    }

    /// `Given` step
    #[must_use]
    pub fn given(text: impl Into<String>) -> Self {
        Self::new("Given", text)
    }

    /// `When` step
    #[must_use]
    pub fn when(text: impl Into<String>) -> Self {
        Self::new("When", text)
    }

    /// `Then` step
    #[must_use]
    pub fn then(text: impl Into<String>) -> Self {
        Self::new("Then", text)
    }

    /// `And` step
    #[must_use]
    pub fn and(text: impl Into<String>) -> Self {
        Self::new("And", text)
    }
}

/// A single operation on the page runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum RuntimeCall {
    /// Animate the cursor along the curve through `(cx, cy)` to `(x, y)`
    #[serde(rename_all = "camelCase")]
    Move {
        /// Target x
        x: f64,
        /// Target y
        y: f64,
        /// Control point x
        cx: f64,
        /// Control point y
        cy: f64,
        /// Animation length
        duration_ms: u64,
    },
    /// Change the cursor shape immediately
    SetCursorShape {
        /// New shape
        shape: CursorShape,
    },
    /// Change the cursor shape at the midpoint of the next click bounce
    QueueShapeChange {
        /// New shape
        shape: CursorShape,
    },
    /// Ripple plus bounce at the cursor; returns immediately
    Click,
    /// Mark one element, clearing any previous mark first
    Highlight {
        /// Element to mark
        locator: Locator,
    },
    /// Clear the current mark
    UnhighlightCurrent,
    /// Replace the story and render every step as pending
    #[serde(rename_all = "camelCase")]
    SetStory {
        /// Feature name
        feature: String,
        /// Scenario name
        scenario: String,
        /// Ordered steps
        steps: Vec<StoryStep>,
        /// Keep the panel hidden until the first advance
        start_hidden: bool,
    },
    /// Move the active marker to the next step
    AdvanceStep,
    /// Hide the panel and forget the story
    HideStory,
    /// Show the pass/fail overlay
    ShowResult {
        /// Test outcome
        passed: bool,
    },
    /// Hide the pass/fail overlay
    HideResult,
    /// Dim the page and lift the story panel above it
    FocusStory,
    /// Undim the page and fade the story panel
    FocusPage,
    /// Clear both focus states
    FocusReset,
}

impl RuntimeCall {
    /// Operation name as used by the page-side dispatcher
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::Move { .. } => "move",
            Self::SetCursorShape { .. } => "setCursorShape",
            Self::QueueShapeChange { .. } => "queueShapeChange",
            Self::Click => "click",
            Self::Highlight { .. } => "highlight",
            Self::UnhighlightCurrent => "unhighlightCurrent",
            Self::SetStory { .. } => "setStory",
            Self::AdvanceStep => "advanceStep",
            Self::HideStory => "hideStory",
            Self::ShowResult { .. } => "showResult",
            Self::HideResult => "hideResult",
            Self::FocusStory => "focusStory",
            Self::FocusPage => "focusPage",
            Self::FocusReset => "focusReset",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_move_wire_shape() {
        let call = RuntimeCall::Move {
            x: 10.0,
            y: 20.0,
            cx: 5.0,
            cy: 30.0,
            duration_ms: 300,
        };
        assert_eq!(
            serde_json::to_value(&call).unwrap(),
            json!({"op": "move", "x": 10.0, "y": 20.0, "cx": 5.0, "cy": 30.0, "durationMs": 300})
        );
    }

    #[test]
    fn test_story_wire_shape() {
        let call = RuntimeCall::SetStory {
            feature: "Users".into(),
            scenario: "Add".into(),
            steps: vec![StoryStep::given("a list")],
            start_hidden: true,
        };
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(value["op"], "setStory");
        assert_eq!(value["startHidden"], true);
        assert_eq!(value["steps"][0], json!({"keyword": "Given", "text": "a list"}));
    }

    #[test]
    fn test_unit_variants() {
        assert_eq!(
            serde_json::to_value(RuntimeCall::Click).unwrap(),
            json!({"op": "click"})
        );
        assert_eq!(
            serde_json::to_value(RuntimeCall::FocusReset).unwrap(),
            json!({"op": "focusReset"})
        );
    }

    #[test]
    fn test_shape_wire_names() {
        let value = serde_json::to_value(RuntimeCall::QueueShapeChange {
            shape: CursorShape::Text,
        })
        .unwrap();
        assert_eq!(value, json!({"op": "queueShapeChange", "shape": "text"}));
    }

    #[test]
    fn test_op_matches_serialized_tag() {
        let calls = [
            RuntimeCall::Click,
            RuntimeCall::AdvanceStep,
            RuntimeCall::HideStory,
            RuntimeCall::UnhighlightCurrent,
            RuntimeCall::ShowResult { passed: false },
            RuntimeCall::Highlight {
                locator: Locator::css("#a"),
            },
            RuntimeCall::SetCursorShape {
                shape: CursorShape::Pointer,
            },
        ];
        for call in calls {
            let value = serde_json::to_value(&call).unwrap();
            assert_eq!(value["op"], call.op());
        }
    }

    #[test]
    fn test_step_constructors() {
        assert_eq!(StoryStep::when("x").keyword, "When");
        assert_eq!(StoryStep::then("x").keyword, "Then");
        assert_eq!(StoryStep::and("x").keyword, "And");
    }
}
