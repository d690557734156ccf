//! Easing curves used by the overlay transitions.

use serde::{Deserialize, Serialize};

/// Easing function definitions for animation curves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EasingFunction {
    /// Quadratic ease-out
    EaseOut,
    /// Cubic ease-out
    CubicOut,
}

impl EasingFunction {
    /// CSS `transition-timing-function` equivalent
    #[must_use]
    pub const fn css(&self) -> &'static str {
        match self {
            Self::EaseOut => "cubic-bezier(0.5, 1, 0.89, 1)",
            Self::CubicOut => "cubic-bezier(0.33, 1, 0.68, 1)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_names() {
        assert_eq!(EasingFunction::EaseOut.css(), "cubic-bezier(0.5, 1, 0.89, 1)");
        assert!(EasingFunction::CubicOut.css().starts_with("cubic-bezier"));
        assert_ne!(EasingFunction::EaseOut.css(), EasingFunction::CubicOut.css());
    }
}
