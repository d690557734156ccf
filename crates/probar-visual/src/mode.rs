//! Mode resolution from process configuration.
//!
//! Every visual behavior in the crate is gated on a [`ModeConfig`] that is
//! resolved once, from environment-like key/value input, and then passed by
//! value into every component. Resolution never fails: a missing or
//! malformed value falls back to its default.

use std::path::PathBuf;
use std::time::Duration;

/// Enables animation, narration and overlays
pub const ENV_VISUAL: &str = "PROBAR_VISUAL";
/// Enables thumbnail capture at teardown
pub const ENV_RECORD: &str = "PROBAR_RECORD";
/// Slow-motion delay in milliseconds
pub const ENV_SLOW_MO: &str = "PROBAR_SLOW_MO";
/// Forces the fast timing multiplier and bulk typing
pub const ENV_FAST: &str = "PROBAR_FAST";
/// Number of parallel grid workers
pub const ENV_GRID_WORKERS: &str = "PROBAR_GRID_WORKERS";
/// Fallback artifact root when the runner supplies none
pub const ENV_ARTIFACT_DIR: &str = "PROBAR_ARTIFACT_DIR";
/// Fallback run identifier when the runner supplies none
pub const ENV_RUN_ID: &str = "PROBAR_RUN_ID";

/// Upper bound on any single page-side effect call
pub const EFFECT_TIMEOUT_MS: u64 = 500;

/// Multiplier applied in fast mode
pub const FAST_MULTIPLIER: f64 = 0.3;
/// Multiplier applied when neither fast nor slow-motion is configured
pub const DEFAULT_MULTIPLIER: f64 = 1.5;
/// Slow-motion milliseconds that correspond to a 1x multiplier
pub const SLOW_MO_UNIT_MS: f64 = 200.0;

/// Process-wide visual mode settings.
///
/// Derived values (`panels_visible`, `focus_toggle_enabled`,
/// `timing_multiplier`) are computed from the raw fields on demand so the
/// struct can never hold an inconsistent combination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModeConfig {
    /// Animation, narration and overlays are active
    pub visual_enabled: bool,
    /// Thumbnail capture at teardown
    pub record_enabled: bool,
    /// Slow-motion delay in milliseconds
    pub slow_mo_ms: u64,
    /// Fast mode
    pub fast_mode: bool,
    /// Number of parallel grid workers (0 = not running a grid)
    pub grid_worker_count: u32,
    /// Artifact root used when the runner does not supply one
    pub artifact_root: Option<PathBuf>,
    /// Run identifier used when the runner does not supply one
    pub run_id: Option<String>,
}

impl ModeConfig {
    /// Resolve from an arbitrary key/value source.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            visual_enabled: parse_flag(ENV_VISUAL, lookup(ENV_VISUAL)),
            record_enabled: parse_flag(ENV_RECORD, lookup(ENV_RECORD)),
            slow_mo_ms: parse_number(ENV_SLOW_MO, lookup(ENV_SLOW_MO)).unwrap_or(0),
            fast_mode: parse_flag(ENV_FAST, lookup(ENV_FAST)),
            grid_worker_count: parse_number(ENV_GRID_WORKERS, lookup(ENV_GRID_WORKERS))
                .unwrap_or(0),
            artifact_root: non_empty(lookup(ENV_ARTIFACT_DIR)).map(PathBuf::from),
            run_id: non_empty(lookup(ENV_RUN_ID)),
        }
    }

    /// Resolve from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Visual mode with every other option at its default
    #[must_use]
    pub fn visual() -> Self {
        Self {
            visual_enabled: true,
            ..Self::default()
        }
    }

    /// Set fast mode
    #[must_use]
    pub const fn with_fast_mode(mut self, fast: bool) -> Self {
        self.fast_mode = fast;
        self
    }

    /// Set slow-motion delay
    #[must_use]
    pub const fn with_slow_mo(mut self, ms: u64) -> Self {
        self.slow_mo_ms = ms;
        self
    }

    /// Set grid worker count
    #[must_use]
    pub const fn with_grid_workers(mut self, workers: u32) -> Self {
        self.grid_worker_count = workers;
        self
    }

    /// Set thumbnail recording
    #[must_use]
    pub const fn with_record(mut self, record: bool) -> Self {
        self.record_enabled = record;
        self
    }

    /// More than one parallel worker
    #[must_use]
    pub const fn grid_mode(&self) -> bool {
        self.grid_worker_count > 1
    }

    /// Story panel and focus effects are shown
    #[must_use]
    pub const fn panels_visible(&self) -> bool {
        self.visual_enabled && !self.grid_mode()
    }

    /// Dim/advance/undim choreography between narrated steps
    #[must_use]
    pub const fn focus_toggle_enabled(&self) -> bool {
        self.slow_mo_ms > 0 && self.panels_visible()
    }

    /// Scale applied to animation durations and typing delays
    #[must_use]
    pub fn timing_multiplier(&self) -> f64 {
        if self.fast_mode {
            FAST_MULTIPLIER
        } else if self.slow_mo_ms > 0 {
            (self.slow_mo_ms as f64 / SLOW_MO_UNIT_MS).max(1.0)
        } else {
            DEFAULT_MULTIPLIER
        }
    }

    /// Scale a base duration by the timing multiplier, to the nearest ms
    #[must_use]
    pub fn scaled(&self, base: Duration) -> Duration {
        let millis = base.as_millis() as f64 * self.timing_multiplier();
        Duration::from_millis(millis.round() as u64)
    }

    /// Bound on a single page-side effect
    #[must_use]
    pub const fn effect_timeout(&self) -> Duration {
        Duration::from_millis(EFFECT_TIMEOUT_MS)
    }

    /// Slow-motion delay as a duration
    #[must_use]
    pub const fn slow_mo(&self) -> Duration {
        Duration::from_millis(self.slow_mo_ms)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(key: &str, value: Option<String>) -> bool {
    let Some(raw) = non_empty(value) else {
        return false;
    };
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        other => {
            tracing::debug!(key, value = other, "unrecognized flag value, using default");
            false
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: Option<String>) -> Option<T> {
    let raw = non_empty(value)?;
    match raw.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::debug!(key, value = %raw, "malformed number, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(pairs: &[(&str, &str)]) -> ModeConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ModeConfig::resolve(|key| map.get(key).cloned())
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_empty_source_uses_defaults() {
            let mode = resolve(&[]);
            assert_eq!(mode, ModeConfig::default());
            assert!(!mode.visual_enabled);
            assert!(!mode.record_enabled);
            assert_eq!(mode.slow_mo_ms, 0);
            assert!(!mode.fast_mode);
            assert_eq!(mode.grid_worker_count, 0);
        }

        #[test]
        fn test_flags_and_numbers() {
            let mode = resolve(&[
                (ENV_VISUAL, "true"),
                (ENV_RECORD, "1"),
                (ENV_SLOW_MO, "600"),
                (ENV_FAST, "off"),
                (ENV_GRID_WORKERS, "4"),
                (ENV_RUN_ID, "run-7"),
                (ENV_ARTIFACT_DIR, "/tmp/artifacts"),
            ]);
            assert!(mode.visual_enabled);
            assert!(mode.record_enabled);
            assert_eq!(mode.slow_mo_ms, 600);
            assert!(!mode.fast_mode);
            assert_eq!(mode.grid_worker_count, 4);
            assert_eq!(mode.run_id.as_deref(), Some("run-7"));
            assert_eq!(mode.artifact_root, Some(PathBuf::from("/tmp/artifacts")));
        }

        #[test]
        fn test_malformed_values_fall_back() {
            let mode = resolve(&[
                (ENV_VISUAL, "sure"),
                (ENV_SLOW_MO, "-5"),
                (ENV_GRID_WORKERS, "many"),
                (ENV_RUN_ID, "   "),
            ]);
            assert!(!mode.visual_enabled);
            assert_eq!(mode.slow_mo_ms, 0);
            assert_eq!(mode.grid_worker_count, 0);
            assert!(mode.run_id.is_none());
        }

        #[test]
        fn test_values_are_trimmed() {
            let mode = resolve(&[(ENV_VISUAL, " YES "), (ENV_SLOW_MO, " 250 ")]);
            assert!(mode.visual_enabled);
            assert_eq!(mode.slow_mo_ms, 250);
        }
    }

    mod derived_tests {
        use super::*;

        #[test]
        fn test_fast_mode_multiplier_ignores_slow_mo() {
            let mode = ModeConfig::visual().with_fast_mode(true).with_slow_mo(600);
            assert!((mode.timing_multiplier() - 0.3).abs() < f64::EPSILON);
        }

        #[test]
        fn test_slow_mo_multiplier() {
            let mode = ModeConfig::visual().with_slow_mo(600);
            assert!((mode.timing_multiplier() - 3.0).abs() < f64::EPSILON);

            let gentle = ModeConfig::visual().with_slow_mo(50);
            assert!((gentle.timing_multiplier() - 1.0).abs() < f64::EPSILON);
        }

        #[test]
        fn test_default_multiplier() {
            let mode = ModeConfig::visual();
            assert!((mode.timing_multiplier() - 1.5).abs() < f64::EPSILON);
        }

        #[test]
        fn test_panels_hidden_in_grid_mode() {
            let grid = ModeConfig::visual().with_grid_workers(4);
            assert!(!grid.panels_visible());

            let single = ModeConfig::visual().with_grid_workers(0);
            assert!(single.panels_visible());

            let one_worker = ModeConfig::visual().with_grid_workers(1);
            assert!(one_worker.panels_visible());
        }

        #[test]
        fn test_panels_require_visual_mode() {
            assert!(!ModeConfig::default().panels_visible());
        }

        #[test]
        fn test_focus_toggle_requires_slow_mo_and_panels() {
            assert!(!ModeConfig::visual().focus_toggle_enabled());
            assert!(ModeConfig::visual().with_slow_mo(300).focus_toggle_enabled());
            assert!(!ModeConfig::visual()
                .with_slow_mo(300)
                .with_grid_workers(3)
                .focus_toggle_enabled());
        }

        #[test]
        fn test_scaled_duration() {
            let mode = ModeConfig::visual();
            assert_eq!(
                mode.scaled(Duration::from_millis(200)),
                Duration::from_millis(300)
            );
            let fast = ModeConfig::visual().with_fast_mode(true);
            assert_eq!(
                fast.scaled(Duration::from_millis(200)),
                Duration::from_millis(60)
            );
        }

        #[test]
        fn test_effect_timeout_constant() {
            assert_eq!(
                ModeConfig::default().effect_timeout(),
                Duration::from_millis(500)
            );
        }
    }
}
