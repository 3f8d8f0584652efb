use crate::logging::LogLevel;
use serde::Serialize;

const DEFAULT_NOTIFICATION_SHOW_DELAY_MS: u32 = 10;
const DEFAULT_NOTIFICATION_LIFETIME_MS: u32 = 5_000;
const DEFAULT_NOTIFICATION_EXIT_MS: u32 = 300;
const DEFAULT_SCROLL_DURATION_MS: u32 = 800;
const DEFAULT_SCROLL_DEBOUNCE_MS: u32 = 100;
const DEFAULT_NAV_CLEARANCE: f64 = 80.0;
const DEFAULT_NAV_LOOKAHEAD: f64 = 100.0;
const DEFAULT_SUBMIT_DELAY_MS: u32 = 1_500;
const DEFAULT_BUTTON_LOADING_MS: u32 = 1_500;
const DEFAULT_SKILL_PULSE_MS: u32 = 500;
const DEFAULT_SCROLL_TOP_THRESHOLD: f64 = 300.0;
const DEFAULT_PARALLAX_RATE: f64 = -0.5;
const DEFAULT_PARALLAX_MIN_WIDTH: f64 = 900.0;
const DEFAULT_TILT_MAX_DEGREES: f64 = 8.0;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const NOTIFICATION_SHOW_DELAY_MS_BOUNDS: (u32, u32) = (0, 1_000);
const NOTIFICATION_LIFETIME_MS_BOUNDS: (u32, u32) = (500, 60_000);
const NOTIFICATION_EXIT_MS_BOUNDS: (u32, u32) = (0, 5_000);
const SCROLL_DURATION_MS_BOUNDS: (u32, u32) = (1, 10_000);
const SCROLL_DEBOUNCE_MS_BOUNDS: (u32, u32) = (0, 2_000);
const NAV_CLEARANCE_BOUNDS: (f64, f64) = (0.0, 1_000.0);
const NAV_LOOKAHEAD_BOUNDS: (f64, f64) = (0.0, 1_000.0);
const SUBMIT_DELAY_MS_BOUNDS: (u32, u32) = (0, 30_000);
const BUTTON_LOADING_MS_BOUNDS: (u32, u32) = (0, 30_000);
const SKILL_PULSE_MS_BOUNDS: (u32, u32) = (0, 10_000);
const SCROLL_TOP_THRESHOLD_BOUNDS: (f64, f64) = (0.0, 100_000.0);
const PARALLAX_RATE_BOUNDS: (f64, f64) = (-2.0, 2.0);
const PARALLAX_MIN_WIDTH_BOUNDS: (f64, f64) = (0.0, 10_000.0);
const TILT_MAX_DEGREES_BOUNDS: (f64, f64) = (0.0, 45.0);

/// Timing and geometry knobs shared by every component.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub notification_show_delay_ms: u32,
    pub notification_lifetime_ms: u32,
    pub notification_exit_ms: u32,
    pub scroll_duration_ms: u32,
    pub scroll_debounce_ms: u32,
    pub nav_clearance: f64,
    pub nav_lookahead: f64,
    pub submit_delay_ms: u32,
    pub button_loading_ms: u32,
    pub skill_pulse_ms: u32,
    pub scroll_top_threshold: f64,
    pub parallax_rate: f64,
    pub parallax_min_width: f64,
    pub tilt_max_degrees: f64,
    pub log_level: LogLevel,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            notification_show_delay_ms: DEFAULT_NOTIFICATION_SHOW_DELAY_MS,
            notification_lifetime_ms: DEFAULT_NOTIFICATION_LIFETIME_MS,
            notification_exit_ms: DEFAULT_NOTIFICATION_EXIT_MS,
            scroll_duration_ms: DEFAULT_SCROLL_DURATION_MS,
            scroll_debounce_ms: DEFAULT_SCROLL_DEBOUNCE_MS,
            nav_clearance: DEFAULT_NAV_CLEARANCE,
            nav_lookahead: DEFAULT_NAV_LOOKAHEAD,
            submit_delay_ms: DEFAULT_SUBMIT_DELAY_MS,
            button_loading_ms: DEFAULT_BUTTON_LOADING_MS,
            skill_pulse_ms: DEFAULT_SKILL_PULSE_MS,
            scroll_top_threshold: DEFAULT_SCROLL_TOP_THRESHOLD,
            parallax_rate: DEFAULT_PARALLAX_RATE,
            parallax_min_width: DEFAULT_PARALLAX_MIN_WIDTH,
            tilt_max_degrees: DEFAULT_TILT_MAX_DEGREES,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl RuntimeConfig {
    /// Builds a config from `data-*` style keys. Missing, unparsable or
    /// out-of-bounds values fall back to the default.
    pub fn from_source(source: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| {
            source(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            notification_show_delay_ms: parse_u32_with_bounds(
                read("data-notification-show-delay-ms"),
                DEFAULT_NOTIFICATION_SHOW_DELAY_MS,
                NOTIFICATION_SHOW_DELAY_MS_BOUNDS,
            ),
            notification_lifetime_ms: parse_u32_with_bounds(
                read("data-notification-lifetime-ms"),
                DEFAULT_NOTIFICATION_LIFETIME_MS,
                NOTIFICATION_LIFETIME_MS_BOUNDS,
            ),
            notification_exit_ms: parse_u32_with_bounds(
                read("data-notification-exit-ms"),
                DEFAULT_NOTIFICATION_EXIT_MS,
                NOTIFICATION_EXIT_MS_BOUNDS,
            ),
            scroll_duration_ms: parse_u32_with_bounds(
                read("data-scroll-duration-ms"),
                DEFAULT_SCROLL_DURATION_MS,
                SCROLL_DURATION_MS_BOUNDS,
            ),
            scroll_debounce_ms: parse_u32_with_bounds(
                read("data-scroll-debounce-ms"),
                DEFAULT_SCROLL_DEBOUNCE_MS,
                SCROLL_DEBOUNCE_MS_BOUNDS,
            ),
            nav_clearance: parse_f64_with_bounds(
                read("data-nav-clearance"),
                DEFAULT_NAV_CLEARANCE,
                NAV_CLEARANCE_BOUNDS,
            ),
            nav_lookahead: parse_f64_with_bounds(
                read("data-nav-lookahead"),
                DEFAULT_NAV_LOOKAHEAD,
                NAV_LOOKAHEAD_BOUNDS,
            ),
            submit_delay_ms: parse_u32_with_bounds(
                read("data-submit-delay-ms"),
                DEFAULT_SUBMIT_DELAY_MS,
                SUBMIT_DELAY_MS_BOUNDS,
            ),
            button_loading_ms: parse_u32_with_bounds(
                read("data-button-loading-ms"),
                DEFAULT_BUTTON_LOADING_MS,
                BUTTON_LOADING_MS_BOUNDS,
            ),
            skill_pulse_ms: parse_u32_with_bounds(
                read("data-skill-pulse-ms"),
                DEFAULT_SKILL_PULSE_MS,
                SKILL_PULSE_MS_BOUNDS,
            ),
            scroll_top_threshold: parse_f64_with_bounds(
                read("data-scroll-top-threshold"),
                DEFAULT_SCROLL_TOP_THRESHOLD,
                SCROLL_TOP_THRESHOLD_BOUNDS,
            ),
            parallax_rate: parse_f64_with_bounds(
                read("data-parallax-rate"),
                DEFAULT_PARALLAX_RATE,
                PARALLAX_RATE_BOUNDS,
            ),
            parallax_min_width: parse_f64_with_bounds(
                read("data-parallax-min-width"),
                DEFAULT_PARALLAX_MIN_WIDTH,
                PARALLAX_MIN_WIDTH_BOUNDS,
            ),
            tilt_max_degrees: parse_f64_with_bounds(
                read("data-tilt-max-degrees"),
                DEFAULT_TILT_MAX_DEGREES,
                TILT_MAX_DEGREES_BOUNDS,
            ),
            log_level: read("data-log-level")
                .and_then(|value| LogLevel::parse(&value))
                .unwrap_or(DEFAULT_LOG_LEVEL),
        }
    }
}

fn parse_u32_with_bounds(value: Option<String>, default: u32, bounds: (u32, u32)) -> u32 {
    value
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_f64_with_bounds(value: Option<String>, default: f64, bounds: (f64, f64)) -> f64 {
    value
        .and_then(|value| value.parse::<f64>().ok())
        .filter(|value| value.is_finite() && (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}
