//! Scalar, array, string and path validators.
//!
//! Every validator takes the raw value, a location label used in error
//! messages, and an options struct. They never mutate their input and
//! return the normalized value or a [`TemplateError::Field`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::{Result, TemplateError};

static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?%$").expect("percent regex"));

/// Bounds for [`parse_int`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IntOpts {
    /// Inclusive lower bound.
    pub min: Option<i64>,
    /// Inclusive upper bound.
    pub max: Option<i64>,
    /// Accept `true`/`false` as 1/0.
    pub allow_bool: bool,
}

impl IntOpts {
    /// Only a lower bound.
    #[must_use]
    pub const fn at_least(min: i64) -> Self {
        Self {
            min: Some(min),
            max: None,
            allow_bool: false,
        }
    }

    /// Both bounds, inclusive.
    #[must_use]
    pub const fn between(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            allow_bool: false,
        }
    }
}

/// Bounds for [`parse_float`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatOpts {
    /// Inclusive lower bound.
    pub min: Option<f64>,
    /// Inclusive upper bound.
    pub max: Option<f64>,
}

impl FloatOpts {
    /// Only a lower bound.
    #[must_use]
    pub const fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Both bounds, inclusive.
    #[must_use]
    pub const fn between(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }
}

/// Length constraints for array validators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrayOpts {
    /// Exact length.
    pub len: Option<usize>,
    /// Minimum length.
    pub min_len: Option<usize>,
    /// Maximum length.
    pub max_len: Option<usize>,
}

impl ArrayOpts {
    /// Exactly `len` elements.
    #[must_use]
    pub const fn exact(len: usize) -> Self {
        Self {
            len: Some(len),
            min_len: None,
            max_len: None,
        }
    }

    /// At least `min_len` elements.
    #[must_use]
    pub const fn at_least(min_len: usize) -> Self {
        Self {
            len: None,
            min_len: Some(min_len),
            max_len: None,
        }
    }

    /// Check a length against these constraints.
    pub fn check_len(&self, len: usize, at: &str) -> Result<()> {
        if let Some(expected) = self.len {
            if len != expected {
                return Err(TemplateError::field(at, format!("length must = {expected}")));
            }
        }
        if let Some(min_len) = self.min_len {
            if len < min_len {
                return Err(TemplateError::field(at, format!("length must >= {min_len}")));
            }
        }
        if let Some(max_len) = self.max_len {
            if len > max_len {
                return Err(TemplateError::field(at, format!("length must <= {max_len}")));
            }
        }
        Ok(())
    }
}

/// Required ordering of a numeric array.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    /// No ordering requirement.
    #[default]
    Any,
    /// Non-decreasing.
    Ascend,
    /// Non-increasing.
    Descend,
}

/// Options for [`parse_int_array`].
#[derive(Debug, Clone, Copy, Default)]
pub struct IntArrayOpts {
    /// Element bounds.
    pub item: IntOpts,
    /// Length constraints, checked on the raw input.
    pub array: ArrayOpts,
    /// Ordering of the parsed elements (excluding `add_first`).
    pub order: Order,
    /// Value prepended to the result.
    pub add_first: Option<i64>,
}

/// Options for [`parse_float_array`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatArrayOpts {
    /// Element bounds.
    pub item: FloatOpts,
    /// Length constraints, checked on the raw input.
    pub array: ArrayOpts,
    /// Ordering of the parsed elements (excluding `add_first`).
    pub order: Order,
    /// Value prepended to the result.
    pub add_first: Option<f64>,
}

/// Options for [`parse_string`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StrOpts<'a> {
    /// Minimum length in characters.
    pub min_len: Option<usize>,
    /// Maximum length in characters.
    pub max_len: Option<usize>,
    /// Closed set of accepted values.
    pub includes: Option<&'a [&'a str]>,
    /// Pattern the value must match.
    pub pattern: Option<&'a Regex>,
}

impl StrOpts<'_> {
    /// Only a maximum length.
    #[must_use]
    pub const fn max_len(max_len: usize) -> Self {
        Self {
            min_len: None,
            max_len: Some(max_len),
            includes: None,
            pattern: None,
        }
    }
}

/// Options for [`parse_string_array`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StrArrayOpts<'a> {
    /// Length constraints of the array.
    pub array: ArrayOpts,
    /// Per-element string options.
    pub item: StrOpts<'a>,
    /// Reject repeated elements.
    pub deduplicate: bool,
}

/// Options for [`parse_file`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOpts<'a> {
    /// Accepted extensions including the dot (`".vrm"`). Empty accepts any.
    pub extensions: &'a [&'a str],
    /// Accept absolute paths.
    pub can_absolute: bool,
}

impl<'a> FileOpts<'a> {
    /// Require one of the given extensions.
    #[must_use]
    pub const fn extensions(extensions: &'a [&'a str]) -> Self {
        Self {
            extensions,
            can_absolute: false,
        }
    }
}

/// Parse a boolean. Numbers are accepted, non-zero meaning `true`.
pub fn parse_bool(raw: &Value, at: &str) -> Result<bool> {
    match raw {
        Value::Bool(value) => Ok(*value),
        Value::Number(num) => Ok(num.as_f64().is_some_and(|value| value != 0.0)),
        _ => Err(TemplateError::field(at, "must be a boolean")),
    }
}

/// Parse an integer, rounding fractional input after the bounds check.
pub fn parse_int(raw: &Value, at: &str, opts: IntOpts) -> Result<i64> {
    let value = match raw {
        Value::Number(num) => num.as_f64().unwrap_or_default(),
        Value::Bool(flag) if opts.allow_bool => f64::from(u8::from(*flag)),
        _ if opts.allow_bool => return Err(TemplateError::field(at, "must be a int/boolean")),
        _ => return Err(TemplateError::field(at, "must be a int")),
    };
    check_bounds(
        value,
        at,
        opts.min.map(|min| min as f64),
        opts.max.map(|max| max as f64),
    )?;
    Ok(value.round() as i64)
}

/// Parse a float. Strings are accepted as decimals or percents (`"12.5%"` is `0.125`).
pub fn parse_float(raw: &Value, at: &str, opts: FloatOpts) -> Result<f64> {
    let value = match raw {
        Value::Number(num) => num.as_f64().unwrap_or_default(),
        Value::String(text) => {
            float_from_str(text).ok_or_else(|| TemplateError::field(at, "must be a float/percent"))?
        }
        _ => return Err(TemplateError::field(at, "must be a float/percent")),
    };
    check_bounds(value, at, opts.min, opts.max)?;
    Ok(value)
}

pub(crate) fn float_from_str(text: &str) -> Option<f64> {
    if PERCENT_RE.is_match(text) {
        let digits = &text[..text.len() - 1];
        digits.parse::<f64>().ok().map(|value| value / 100.0)
    } else {
        text.trim().parse::<f64>().ok()
    }
}

pub(crate) fn check_bounds(value: f64, at: &str, min: Option<f64>, max: Option<f64>) -> Result<()> {
    if let Some(min) = min {
        if value < min {
            return Err(TemplateError::field(at, format!("must >= {min}")));
        }
    }
    if let Some(max) = max {
        if value > max {
            return Err(TemplateError::field(at, format!("must <= {max}")));
        }
    }
    Ok(())
}

/// Check that `raw` is an array satisfying `opts`.
pub fn check_array<'v>(raw: &'v Value, at: &str, opts: ArrayOpts) -> Result<&'v [Value]> {
    let items = raw
        .as_array()
        .ok_or_else(|| TemplateError::field(at, "must be an array"))?;
    opts.check_len(items.len(), at)?;
    Ok(items)
}

/// Check the ordering of already parsed values.
pub fn check_order<T: PartialOrd + Copy>(values: &[T], at: &str, order: Order) -> Result<()> {
    let bad = match order {
        Order::Any => None,
        Order::Ascend => values.windows(2).position(|pair| pair[1] < pair[0]),
        Order::Descend => values.windows(2).position(|pair| pair[1] > pair[0]),
    };
    match (bad, order) {
        (Some(idx), Order::Ascend) => Err(TemplateError::field(
            format!("{at}[{}]", idx + 1),
            "must be ascend",
        )),
        (Some(idx), Order::Descend) => Err(TemplateError::field(
            format!("{at}[{}]", idx + 1),
            "must be descend",
        )),
        _ => Ok(()),
    }
}

/// Check the array shape then parse each element with `parse`.
pub fn parse_array<T, F>(raw: &Value, at: &str, opts: ArrayOpts, mut parse: F) -> Result<Vec<T>>
where
    F: FnMut(&Value, &str) -> Result<T>,
{
    check_array(raw, at, opts)?
        .iter()
        .enumerate()
        .map(|(idx, item)| parse(item, &format!("{at}[{idx}]")))
        .collect()
}

/// Parse an array of booleans.
pub fn parse_bool_array(raw: &Value, at: &str, opts: ArrayOpts) -> Result<Vec<bool>> {
    parse_array(raw, at, opts, parse_bool)
}

/// Parse an array of integers.
pub fn parse_int_array(raw: &Value, at: &str, opts: &IntArrayOpts) -> Result<Vec<i64>> {
    let parsed = parse_array(raw, at, opts.array, |item, at| parse_int(item, at, opts.item))?;
    check_order(&parsed, at, opts.order)?;
    Ok(opts.add_first.into_iter().chain(parsed).collect())
}

/// Parse a `[begin, end]` integer pair with `begin <= end`.
pub fn parse_int_range(raw: &Value, at: &str, opts: IntOpts) -> Result<[i64; 2]> {
    let values = parse_int_array(
        raw,
        at,
        &IntArrayOpts {
            item: opts,
            array: ArrayOpts::exact(2),
            ..IntArrayOpts::default()
        },
    )?;
    if values[0] > values[1] {
        return Err(TemplateError::field(at, "range[0] must < range[1]"));
    }
    Ok([values[0], values[1]])
}

/// Parse an array of floats.
pub fn parse_float_array(raw: &Value, at: &str, opts: &FloatArrayOpts) -> Result<Vec<f64>> {
    let parsed = parse_array(raw, at, opts.array, |item, at| {
        parse_float(item, at, opts.item)
    })?;
    check_order(&parsed, at, opts.order)?;
    Ok(opts.add_first.into_iter().chain(parsed).collect())
}

/// Parse a `[begin, end]` float pair with `begin <= end`.
pub fn parse_float_range(raw: &Value, at: &str, opts: FloatOpts) -> Result<[f64; 2]> {
    let values = parse_float_array(
        raw,
        at,
        &FloatArrayOpts {
            item: opts,
            array: ArrayOpts::exact(2),
            ..FloatArrayOpts::default()
        },
    )?;
    if values[0] > values[1] {
        return Err(TemplateError::field(at, "range[0] must < range[1]"));
    }
    Ok([values[0], values[1]])
}

/// Validate a string.
pub fn parse_string(raw: &str, at: &str, opts: &StrOpts<'_>) -> Result<String> {
    let len = raw.chars().count();
    if let Some(min_len) = opts.min_len {
        if len < min_len {
            return Err(TemplateError::field(at, format!("length must >= {min_len}")));
        }
    }
    if let Some(max_len) = opts.max_len {
        if len > max_len {
            return Err(TemplateError::field(at, format!("length must <= {max_len}")));
        }
    }
    if let Some(includes) = opts.includes {
        if !includes.contains(&raw) {
            return Err(TemplateError::field(
                at,
                format!("must include {}", includes.join(",")),
            ));
        }
    }
    if let Some(pattern) = opts.pattern {
        if !pattern.is_match(raw) {
            return Err(TemplateError::field(
                at,
                format!("must match {}", pattern.as_str()),
            ));
        }
    }
    Ok(raw.to_owned())
}

/// Validate a raw value that must be a string.
pub fn parse_string_value(raw: &Value, at: &str, opts: &StrOpts<'_>) -> Result<String> {
    let text = raw
        .as_str()
        .ok_or_else(|| TemplateError::field(at, "must be a string"))?;
    parse_string(text, at, opts)
}

/// Validate an array of strings.
pub fn parse_string_array(raw: &[String], at: &str, opts: &StrArrayOpts<'_>) -> Result<Vec<String>> {
    opts.array.check_len(raw.len(), at)?;
    let mut res: Vec<String> = Vec::with_capacity(raw.len());
    for (idx, item) in raw.iter().enumerate() {
        let at = format!("{at}[{idx}]");
        if opts.deduplicate && res.contains(item) {
            return Err(TemplateError::field(at, "must be unique"));
        }
        res.push(parse_string(item, &at, &opts.item)?);
    }
    Ok(res)
}

/// Validate a file path and normalize it to forward slashes.
pub fn parse_file(raw: &str, at: &str, opts: &FileOpts<'_>) -> Result<String> {
    if !opts.extensions.is_empty() && !opts.extensions.contains(&extension(raw)) {
        return Err(TemplateError::field(
            at,
            format!("must have extension {}", opts.extensions.join(",")),
        ));
    }
    if !opts.can_absolute && is_absolute(raw) {
        return Err(TemplateError::field(at, "must be a relative path"));
    }
    Ok(normalize_path(raw))
}

/// Extension of the last path component, dot included; empty when there is none.
fn extension(path: &str) -> &str {
    let base = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);
    match base.rfind('.') {
        None | Some(0) => "",
        Some(idx) => &base[idx..],
    }
}

fn is_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/')
        || path.starts_with('\\')
        || (bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':')
}

fn normalize_path(raw: &str) -> String {
    let unified = raw.replace('\\', "/");
    let absolute = unified.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    parts.push("..");
                }
            }
            _ => parts.push(segment),
        }
    }
    let joined = parts.join("/");
    if absolute {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_owned()
    } else {
        joined
    }
}

/// Check that `raw` is an object.
pub fn check_record<'v>(raw: &'v Value, at: &str) -> Result<&'v Map<String, Value>> {
    raw.as_object()
        .ok_or_else(|| TemplateError::field(at, "must be a object"))
}

/// Convert a value already checked to be non-negative into a count.
pub(crate) fn as_count(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(err: TemplateError) -> String {
        err.to_string()
    }

    #[test]
    fn test_parse_bool_accepts_numbers() {
        assert!(parse_bool(&json!(true), "x").unwrap());
        assert!(parse_bool(&json!(2), "x").unwrap());
        assert!(!parse_bool(&json!(0), "x").unwrap());
        assert_eq!(
            message(parse_bool(&json!("yes"), "x").unwrap_err()),
            "x: must be a boolean"
        );
    }

    #[test]
    fn test_parse_int_bounds_and_rounding() {
        assert_eq!(parse_int(&json!(2.6), "x", IntOpts::default()).unwrap(), 3);
        assert_eq!(
            message(parse_int(&json!(-1), "x", IntOpts::at_least(0)).unwrap_err()),
            "x: must >= 0"
        );
        assert_eq!(
            message(parse_int(&json!(5), "x", IntOpts::between(0, 4)).unwrap_err()),
            "x: must <= 4"
        );
        assert_eq!(
            message(parse_int(&json!("1"), "x", IntOpts::default()).unwrap_err()),
            "x: must be a int"
        );
    }

    #[test]
    fn test_parse_int_allow_bool() {
        let opts = IntOpts {
            allow_bool: true,
            ..IntOpts::default()
        };
        assert_eq!(parse_int(&json!(true), "x", opts).unwrap(), 1);
        assert_eq!(
            message(parse_int(&json!("a"), "x", opts).unwrap_err()),
            "x: must be a int/boolean"
        );
    }

    #[test]
    fn test_parse_float_percent() {
        let opts = FloatOpts::default();
        assert!((parse_float(&json!("10%"), "x", opts).unwrap() - 0.10).abs() < 1e-12);
        assert!((parse_float(&json!("5.5%"), "x", opts).unwrap() - 0.055).abs() < 1e-12);
        assert_eq!(parse_float(&json!("0.25"), "x", opts).unwrap(), 0.25);
        assert_eq!(
            message(parse_float(&json!(null), "x", opts).unwrap_err()),
            "x: must be a float/percent"
        );
    }

    #[test]
    fn test_parse_float_bounds_use_parsed_value() {
        let opts = FloatOpts::between(0.0, 1.0);
        assert_eq!(parse_float(&json!("50%"), "x", opts).unwrap(), 0.5);
        assert_eq!(
            message(parse_float(&json!("150%"), "x", opts).unwrap_err()),
            "x: must <= 1"
        );
    }

    #[test]
    fn test_check_array_lengths() {
        assert_eq!(
            message(check_array(&json!(1), "x", ArrayOpts::default()).unwrap_err()),
            "x: must be an array"
        );
        assert_eq!(
            message(check_array(&json!([1]), "x", ArrayOpts::exact(2)).unwrap_err()),
            "x: length must = 2"
        );
        assert_eq!(
            message(check_array(&json!([]), "x", ArrayOpts::at_least(1)).unwrap_err()),
            "x: length must >= 1"
        );
        let opts = ArrayOpts {
            max_len: Some(1),
            ..ArrayOpts::default()
        };
        assert_eq!(
            message(check_array(&json!([1, 2]), "x", opts).unwrap_err()),
            "x: length must <= 1"
        );
    }

    #[test]
    fn test_int_array_order_and_add_first() {
        let opts = IntArrayOpts {
            order: Order::Ascend,
            add_first: Some(0),
            ..IntArrayOpts::default()
        };
        assert_eq!(
            parse_int_array(&json!([1, 2, 2]), "x", &opts).unwrap(),
            vec![0, 1, 2, 2]
        );
        assert_eq!(
            message(parse_int_array(&json!([3, 1]), "x", &opts).unwrap_err()),
            "x[1]: must be ascend"
        );

        let descend = IntArrayOpts {
            order: Order::Descend,
            ..IntArrayOpts::default()
        };
        assert_eq!(
            message(parse_int_array(&json!([1, 3]), "x", &descend).unwrap_err()),
            "x[1]: must be descend"
        );
    }

    #[test]
    fn test_int_range_ordering() {
        assert_eq!(
            message(parse_int_range(&json!([9, 1]), "x", IntOpts::default()).unwrap_err()),
            "x: range[0] must < range[1]"
        );
        assert_eq!(
            parse_int_range(&json!([1, 2]), "x", IntOpts::default()).unwrap(),
            [1, 2]
        );
        assert_eq!(
            parse_int_range(&json!([3, 3]), "x", IntOpts::default()).unwrap(),
            [3, 3]
        );
    }

    #[test]
    fn test_float_array_reports_element_location() {
        let opts = FloatArrayOpts {
            item: FloatOpts::at_least(0.0),
            ..FloatArrayOpts::default()
        };
        assert_eq!(
            message(parse_float_array(&json!([1, -2]), "attr", &opts).unwrap_err()),
            "attr[1]: must >= 0"
        );
        assert_eq!(
            parse_float_range(&json!(["10%", 1]), "x", FloatOpts::default()).unwrap(),
            [0.1, 1.0]
        );
    }

    #[test]
    fn test_parse_string_options() {
        assert_eq!(
            message(parse_string("abcdef", "x", &StrOpts::max_len(3)).unwrap_err()),
            "x: length must <= 3"
        );
        let opts = StrOpts {
            includes: Some(&["Run", "Walk"]),
            ..StrOpts::default()
        };
        assert_eq!(parse_string("Run", "x", &opts).unwrap(), "Run");
        assert_eq!(
            message(parse_string("Dash", "x", &opts).unwrap_err()),
            "x: must include Run,Walk"
        );
        let re = Regex::new("^[a-z]+$").unwrap();
        let opts = StrOpts {
            pattern: Some(&re),
            ..StrOpts::default()
        };
        assert_eq!(
            message(parse_string("A1", "x", &opts).unwrap_err()),
            "x: must match ^[a-z]+$"
        );
    }

    #[test]
    fn test_parse_string_array_deduplicate() {
        let raw = vec!["a".to_owned(), "b".to_owned(), "a".to_owned()];
        let opts = StrArrayOpts {
            deduplicate: true,
            ..StrArrayOpts::default()
        };
        assert_eq!(
            message(parse_string_array(&raw, "x", &opts).unwrap_err()),
            "x[2]: must be unique"
        );
        assert_eq!(
            parse_string_array(&raw, "x", &StrArrayOpts::default()).unwrap(),
            raw
        );
    }

    #[test]
    fn test_parse_file_extension_and_normalization() {
        let vrm = FileOpts::extensions(&[".vrm"]);
        assert_eq!(
            parse_file("models\\girl\\.\\girl.vrm", "x", &vrm).unwrap(),
            "models/girl/girl.vrm"
        );
        assert_eq!(
            message(parse_file("girl.glb", "x", &vrm).unwrap_err()),
            "x: must have extension .vrm"
        );
        let wildcard = FileOpts::extensions(&[".*"]);
        assert_eq!(
            parse_file("anim/a/../idle.*", "x", &wildcard).unwrap(),
            "anim/idle.*"
        );
        assert_eq!(
            message(parse_file("/abs/path", "x", &FileOpts::default()).unwrap_err()),
            "x: must be a relative path"
        );
        let absolute = FileOpts {
            can_absolute: true,
            ..FileOpts::default()
        };
        assert_eq!(parse_file("/abs/./path", "x", &absolute).unwrap(), "/abs/path");
    }

    #[test]
    fn test_check_record() {
        assert!(check_record(&json!({"a": 1}), "x").is_ok());
        assert_eq!(
            message(check_record(&json!([1]), "x").unwrap_err()),
            "x: must be a object"
        );
    }
}
