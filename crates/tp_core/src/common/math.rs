//! Vectors, angles and collision shapes.

use std::f64::consts::PI;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::builtin::{check_array, check_bounds, parse_float, parse_float_array, ArrayOpts, FloatArrayOpts, FloatOpts};
use crate::error::{Result, TemplateError};

/// Tolerance for float comparisons.
pub const EPSILON: f64 = 1e-6;

static ANGLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([LR])(\d+(?:\.\d+)?)$").expect("angle regex"));

/// `|a - b| < EPSILON`.
#[must_use]
pub fn abs_diff_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Options for [`parse_vec2`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Vec2Opts {
    /// Require unit length.
    pub normalized: bool,
    /// Per-component bounds.
    pub bounds: FloatOpts,
}

/// Parse a 2D vector.
pub fn parse_vec2(raw: &Value, at: &str, opts: Vec2Opts) -> Result<[f64; 2]> {
    let values = parse_float_array(
        raw,
        at,
        &FloatArrayOpts {
            item: opts.bounds,
            array: ArrayOpts::exact(2),
            ..FloatArrayOpts::default()
        },
    )?;
    let res = [values[0], values[1]];
    if opts.normalized && !abs_diff_eq(res[0] * res[0] + res[1] * res[1], 1.0) {
        return Err(TemplateError::field(at, "must be normalized"));
    }
    Ok(res)
}

/// Parse an angle on the XZ plane and return radians.
///
/// Numbers are degrees; `L<n>` turns left (positive) and `R<n>` turns right.
/// The angle must lie in `[-180, 180]` degrees before `opts` bounds apply.
pub fn parse_angle_xz(raw: &Value, at: &str, opts: FloatOpts) -> Result<f64> {
    let degree = match raw {
        Value::Number(num) => num.as_f64().unwrap_or_default(),
        Value::String(text) => {
            let caps = ANGLE_RE
                .captures(text)
                .ok_or_else(|| TemplateError::field(at, "must be a angle"))?;
            let sign = if &caps[1] == "L" { 1.0 } else { -1.0 };
            sign * caps[2]
                .parse::<f64>()
                .map_err(|_| TemplateError::field(at, "must be a angle"))?
        }
        _ => return Err(TemplateError::field(at, "must be a angle")),
    };
    if !(-180.0..=180.0).contains(&degree) {
        return Err(TemplateError::field(at, "must be in [-180, 180]"));
    }
    check_bounds(degree, at, opts.min, opts.max)?;
    Ok(degree * PI / 180.0)
}

/// Parse a pair of XZ angles.
pub fn parse_angle_xz_range(raw: &Value, at: &str, opts: FloatOpts) -> Result<[f64; 2]> {
    let items = check_array(raw, at, ArrayOpts::exact(2))?;
    Ok([
        parse_angle_xz(&items[0], &format!("{at}[0]"), opts)?,
        parse_angle_xz(&items[1], &format!("{at}[1]"), opts)?,
    ])
}

/// Raw capsule dimensions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapsuleArgs {
    /// Half height of the cylinder part.
    pub half_height: Value,
    /// Radius of the caps.
    pub radius: Value,
}

/// Vertical capsule used as a movement bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Capsule {
    /// Half height of the cylinder part.
    pub half_height: f64,
    /// Radius of the caps.
    pub radius: f64,
}

impl Capsule {
    /// Validate capsule dimensions.
    pub fn parse(args: &CapsuleArgs, at: &str) -> Result<Self> {
        Ok(Self {
            half_height: parse_float(&args.half_height, &format!("{at}.half_height"), FloatOpts::at_least(0.0))?,
            radius: parse_float(&args.radius, &format!("{at}.radius"), FloatOpts::at_least(0.0))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_vec2_normalized() {
        let opts = Vec2Opts {
            normalized: true,
            ..Vec2Opts::default()
        };
        assert_eq!(parse_vec2(&json!([0, 1]), "v", opts).unwrap(), [0.0, 1.0]);
        let err = parse_vec2(&json!([1, 1]), "v", opts).unwrap_err();
        assert_eq!(err.to_string(), "v: must be normalized");
    }

    #[test]
    fn test_angle_forms() {
        let opts = FloatOpts::default();
        assert!(abs_diff_eq(parse_angle_xz(&json!(90), "a", opts).unwrap(), PI / 2.0));
        assert!(abs_diff_eq(parse_angle_xz(&json!("L90"), "a", opts).unwrap(), PI / 2.0));
        assert!(abs_diff_eq(parse_angle_xz(&json!("R45"), "a", opts).unwrap(), -PI / 4.0));
        let err = parse_angle_xz(&json!(200), "a", opts).unwrap_err();
        assert_eq!(err.to_string(), "a: must be in [-180, 180]");
        let err = parse_angle_xz(&json!("X10"), "a", opts).unwrap_err();
        assert_eq!(err.to_string(), "a: must be a angle");
    }

    #[test]
    fn test_angle_range() {
        let range = parse_angle_xz_range(&json!(["R90", "L90"]), "a", FloatOpts::default()).unwrap();
        assert!(abs_diff_eq(range[0], -PI / 2.0));
        assert!(abs_diff_eq(range[1], PI / 2.0));
    }

    #[test]
    fn test_capsule_rejects_negative() {
        let args = CapsuleArgs {
            half_height: json!(0.5),
            radius: json!(-1),
        };
        let err = Capsule::parse(&args, "c").unwrap_err();
        assert_eq!(err.to_string(), "c.radius: must >= 0");
    }
}
