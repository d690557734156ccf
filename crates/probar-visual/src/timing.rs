//! Presentation delays and the effect guard.
//!
//! None of these values are contracts: they only decide how long a viewer
//! gets to see each effect. Durations marked "scaled" are multiplied by
//! [`crate::ModeConfig::timing_multiplier`] before use.

use crate::result::VisualResult;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Delays used by the animator, narrator and fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Timings {
    /// Cursor travel time (scaled)
    pub move_ms: u64,
    /// Pause after an element is highlighted (scaled)
    pub highlight_pause_ms: u64,
    /// Pause after the click ripple (scaled)
    pub click_pause_ms: u64,
    /// Gap between the two ripples of a double click
    pub double_click_gap_ms: u64,
    /// Fixed wait after every real action (never scaled)
    pub settle_ms: u64,
    /// Delay between keystrokes when typing per character (scaled)
    pub type_char_ms: u64,
    /// Story panel fade-in after setup
    pub story_fade_in_ms: u64,
    /// Reveal of the first narrated step
    pub step_reveal_ms: u64,
    /// Each half of the dim/undim choreography between steps
    pub focus_dim_ms: u64,
    /// How long a passing result stays on screen
    pub pass_hold_ms: u64,
    /// How long a failing result stays on screen
    pub fail_hold_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            move_ms: 200,
            highlight_pause_ms: 100,
            click_pause_ms: 120,
            double_click_gap_ms: 120,
            settle_ms: 150,
            type_char_ms: 40,
            story_fade_in_ms: 300,
            step_reveal_ms: 250,
            focus_dim_ms: 300,
            pass_hold_ms: 1200,
            fail_hold_ms: 2500,
        }
    }
}

impl Timings {
    /// Every delay set to zero, for tests that only care about ordering
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            move_ms: 0,
            highlight_pause_ms: 0,
            click_pause_ms: 0,
            double_click_gap_ms: 0,
            settle_ms: 0,
            type_char_ms: 0,
            story_fade_in_ms: 0,
            step_reveal_ms: 0,
            focus_dim_ms: 0,
            pass_hold_ms: 0,
            fail_hold_ms: 0,
        }
    }

    /// Set cursor travel time
    #[must_use]
    pub const fn with_move_ms(mut self, ms: u64) -> Self {
        self.move_ms = ms;
        self
    }

    /// Set the settle delay after real actions
    #[must_use]
    pub const fn with_settle_ms(mut self, ms: u64) -> Self {
        self.settle_ms = ms;
        self
    }

    /// Set the per-keystroke delay
    #[must_use]
    pub const fn with_type_char_ms(mut self, ms: u64) -> Self {
        self.type_char_ms = ms;
        self
    }

    /// Set both result hold durations
    #[must_use]
    pub const fn with_result_hold(mut self, pass_ms: u64, fail_ms: u64) -> Self {
        self.pass_hold_ms = pass_ms;
        self.fail_hold_ms = fail_ms;
        self
    }

    /// Result overlay hold for an outcome
    #[must_use]
    pub const fn result_hold(&self, passed: bool) -> Duration {
        Duration::from_millis(if passed {
            self.pass_hold_ms
        } else {
            self.fail_hold_ms
        })
    }
}

/// Convert milliseconds to a duration
#[must_use]
pub(crate) const fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Run a visual effect, bounded by `limit`, discarding any failure.
///
/// Returns `None` when the effect failed or ran out of time; the reason is
/// logged at debug level and never reaches the caller.
pub(crate) async fn guarded<F, T>(effect: &'static str, limit: Duration, fut: F) -> Option<T>
where
    F: Future<Output = VisualResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Some(value),
        Ok(Err(error)) => {
            tracing::debug!(effect, %error, "visual effect failed");
            None
        }
        Err(_) => {
            tracing::debug!(
                effect,
                timeout_ms = limit.as_millis() as u64,
                "visual effect timed out"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::VisualError;

    #[test]
    fn test_fail_holds_longer_than_pass() {
        let timings = Timings::default();
        assert!(timings.result_hold(false) > timings.result_hold(true));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let timings: Timings = serde_json::from_str(r#"{"moveMs": 50}"#).unwrap();
        assert_eq!(timings.move_ms, 50);
        assert_eq!(timings.settle_ms, Timings::default().settle_ms);
    }

    #[test]
    fn test_builders() {
        let timings = Timings::instant()
            .with_move_ms(10)
            .with_settle_ms(20)
            .with_type_char_ms(5)
            .with_result_hold(1, 2);
        assert_eq!(timings.move_ms, 10);
        assert_eq!(timings.settle_ms, 20);
        assert_eq!(timings.type_char_ms, 5);
        assert_eq!(timings.result_hold(true), ms(1));
        assert_eq!(timings.result_hold(false), ms(2));
    }

    mod guard_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_success_passes_through() {
            let out = guarded("ok", ms(500), async { Ok::<_, VisualError>(7) }).await;
            assert_eq!(out, Some(7));
        }

        #[tokio::test(start_paused = true)]
        async fn test_error_is_swallowed() {
            let out: Option<()> = guarded("err", ms(500), async {
                Err(VisualError::evaluation("boom"))
            })
            .await;
            assert!(out.is_none());
        }

        #[tokio::test(start_paused = true)]
        async fn test_hang_is_cut_at_limit() {
            let start = tokio::time::Instant::now();
            let out: Option<()> = guarded("hang", ms(500), futures::future::pending()).await;
            assert!(out.is_none());
            let elapsed = start.elapsed();
            assert!(elapsed >= ms(500) && elapsed < ms(510));
        }
    }
}
