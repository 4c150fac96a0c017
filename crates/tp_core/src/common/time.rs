//! Time expressions.
//!
//! A time is a number of seconds, or a string with a unit suffix:
//! `s`, `m`/`min`, `h`/`hr`, `ms` or `F` (frames at [`FPS`]).

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::builtin::{check_array, check_bounds, check_order, ArrayOpts, Order};
use crate::config::{ENABLE_TIME_WARNING, FPS, LOGIC_SPF};
use crate::error::{Result, TemplateError};

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)(s|m|min|h|hr|ms|F)$").expect("time regex"));

static TIME_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)?)(|s|m|min|h|hr|ms|F)-(\d+(?:\.\d+)?)(|s|m|min|h|hr|ms|F)$")
        .expect("time range regex")
});

/// Options for [`parse_time`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOpts {
    /// Inclusive lower bound in seconds.
    pub min: Option<f64>,
    /// Inclusive upper bound in seconds.
    pub max: Option<f64>,
    /// Skip the logic-tick alignment warning.
    pub ignore_warning: bool,
    /// Read bare numbers as frame counts instead of seconds.
    pub bare_frames: bool,
}

impl TimeOpts {
    /// Only a lower bound.
    #[must_use]
    pub const fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
            ignore_warning: false,
            bare_frames: false,
        }
    }

    /// Both bounds, inclusive.
    #[must_use]
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            ignore_warning: false,
            bare_frames: false,
        }
    }
}

/// Options for [`parse_time_array`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeArrayOpts {
    /// Element options.
    pub item: TimeOpts,
    /// Length constraints.
    pub array: ArrayOpts,
    /// Ordering of the parsed times.
    pub order: Order,
}

fn unit_scale(unit: &str) -> Option<f64> {
    match unit {
        "F" => Some(1.0 / FPS),
        "s" | "" => Some(1.0),
        "m" | "min" => Some(60.0),
        "h" | "hr" => Some(3600.0),
        "ms" => Some(0.001),
        _ => None,
    }
}

fn scaled(num: &str, unit: &str) -> Option<f64> {
    Some(num.parse::<f64>().ok()? * unit_scale(unit)?)
}

fn str_to_time(text: &str, at: &str) -> Result<f64> {
    TIME_RE
        .captures(text)
        .and_then(|caps| scaled(&caps[1], &caps[2]))
        .ok_or_else(|| TemplateError::field(at, "invalid time"))
}

fn str_to_range(text: &str, at: &str) -> Result<[f64; 2]> {
    let caps = TIME_RANGE_RE
        .captures(text)
        .ok_or_else(|| TemplateError::field(at, "invalid time"))?;
    match (scaled(&caps[1], &caps[2]), scaled(&caps[3], &caps[4])) {
        (Some(begin), Some(end)) => Ok([begin, end]),
        _ => Err(TemplateError::field(at, "invalid time")),
    }
}

/// Bounds check plus the logic-tick alignment warning.
fn check_time(value: f64, raw: &Value, at: &str, opts: TimeOpts) -> Result<f64> {
    check_bounds(value, at, opts.min, opts.max)?;
    if ENABLE_TIME_WARNING && !opts.ignore_warning {
        let ticks = value / LOGIC_SPF;
        if (ticks.round() - ticks).abs() > 0.01 {
            tracing::warn!(location = at, raw = %raw, "time is not aligned to a logic tick");
        }
    }
    Ok(value)
}

/// Parse a time in seconds.
pub fn parse_time(raw: &Value, at: &str, opts: TimeOpts) -> Result<f64> {
    let value = match raw {
        Value::Number(num) => {
            let num = num.as_f64().unwrap_or_default();
            if opts.bare_frames {
                num / FPS
            } else {
                num
            }
        }
        Value::String(text) => str_to_time(text, at)?,
        _ => return Err(TemplateError::field(at, "must be a float/time")),
    };
    check_time(value, raw, at, opts)
}

/// Parse an array of times.
pub fn parse_time_array(raw: &Value, at: &str, opts: &TimeArrayOpts) -> Result<Vec<f64>> {
    let times = check_array(raw, at, opts.array)?
        .iter()
        .enumerate()
        .map(|(idx, item)| parse_time(item, &format!("{at}[{idx}]"), opts.item))
        .collect::<Result<Vec<_>>>()?;
    check_order(&times, at, opts.order)?;
    Ok(times)
}

/// Parse a time range, either a `[begin, end]` pair or a `"<num><unit>-<num><unit>"`
/// string where a missing unit means seconds.
pub fn parse_time_range(raw: &Value, at: &str, opts: TimeOpts) -> Result<[f64; 2]> {
    let range = match raw {
        Value::String(text) => {
            let [begin, end] = str_to_range(text, at)?;
            [
                check_time(begin, raw, &format!("{at}[0]"), opts)?,
                check_time(end, raw, &format!("{at}[1]"), opts)?,
            ]
        }
        _ => {
            let times = parse_time_array(
                raw,
                at,
                &TimeArrayOpts {
                    item: opts,
                    array: ArrayOpts::exact(2),
                    order: Order::Any,
                },
            )?;
            [times[0], times[1]]
        }
    };
    if range[0] > range[1] {
        return Err(TemplateError::field(at, "range[0] must < range[1]"));
    }
    Ok(range)
}

/// Whether `time` lies in the half-open range `[begin, end)`.
#[must_use]
pub fn in_time_range(range: [f64; 2], time: f64) -> bool {
    range[0] <= time && time < range[1]
}
