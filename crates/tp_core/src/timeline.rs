//! Time fragments and the timelines built on them.
//!
//! A timeline is declared as a list of possibly overlapping ranges. Later
//! ranges paint over earlier ones, and the result is a gap-free sequence of
//! [`TimeFragment`]s covering `[0, end]`, each owned by one input range.

use serde::Serialize;
use serde_json::Value;

use crate::common::{check_array, parse_time, parse_time_range, ArrayOpts, TimeOpts};
use crate::error::{Result, TemplateError};

/// Duration constraints of a fragment list.
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentOpts {
    /// Where the fragments must end.
    pub duration: f64,
    /// When set, the end may lie anywhere in `[duration, over_duration]`.
    pub over_duration: Option<f64>,
    /// Skip the logic-tick alignment warning.
    pub ignore_warning: bool,
}

impl FragmentOpts {
    /// Fragments ending exactly at `duration`.
    #[must_use]
    pub const fn new(duration: f64) -> Self {
        Self {
            duration,
            over_duration: None,
            ignore_warning: false,
        }
    }

    /// Fragments ending between `duration` and `over_duration`.
    #[must_use]
    pub const fn with_tail(duration: f64, over_duration: f64) -> Self {
        Self {
            duration,
            over_duration: Some(over_duration),
            ignore_warning: false,
        }
    }

    fn limit(&self) -> f64 {
        self.over_duration.unwrap_or(self.duration)
    }
}

/// A half-open span `[begin, end)` owned by the input range at `index`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeFragment {
    /// Inclusive start in seconds.
    pub begin: f64,
    /// Exclusive end in seconds.
    pub end: f64,
    /// Position of the owning range in the input.
    pub index: usize,
}

/// Fragment under construction; `owner` stays `None` until some range covers it.
#[derive(Debug, Clone, Copy)]
struct Layer {
    begin: f64,
    end: f64,
    owner: Option<usize>,
}

impl Layer {
    const fn new(begin: f64, end: f64, owner: Option<usize>) -> Self {
        Self { begin, end, owner }
    }
}

/// Paint `[begin, end)` with `owner` on top of `layers`.
fn paint(layers: &[Layer], begin: f64, end: f64, owner: usize) -> Vec<Layer> {
    let top = Layer::new(begin, end, Some(owner));
    let mut res = Vec::with_capacity(layers.len() + 2);
    let mut inserted = false;
    for layer in layers {
        if layer.end <= begin {
            res.push(*layer);
        } else if layer.begin >= end {
            if !inserted {
                res.push(top);
                inserted = true;
            }
            res.push(*layer);
        } else {
            if layer.begin < begin {
                res.push(Layer::new(layer.begin, begin, layer.owner));
            }
            if !inserted {
                res.push(top);
                inserted = true;
            }
            if layer.end > end {
                res.push(Layer::new(end, layer.end, layer.owner));
            }
        }
    }
    if !inserted {
        res.push(top);
    }
    res
}

impl TimeFragment {
    /// Create a fragment.
    #[must_use]
    pub const fn new(begin: f64, end: f64, index: usize) -> Self {
        Self { begin, end, index }
    }

    /// Whether `time` lies in `[begin, end)`.
    #[must_use]
    pub fn contains(&self, time: f64) -> bool {
        self.begin <= time && time < self.end
    }

    /// Length in seconds.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end - self.begin
    }

    /// Parse raw ranges (pairs or range strings) and partition them.
    pub fn parse_array(raw: &Value, at: &str, opts: &FragmentOpts) -> Result<Vec<Self>> {
        let items = check_array(raw, at, ArrayOpts::default())?;
        Self::parse_slice(items, at, opts)
    }

    /// Same as [`TimeFragment::parse_array`] over already split items.
    pub fn parse_slice(items: &[Value], at: &str, opts: &FragmentOpts) -> Result<Vec<Self>> {
        if items.is_empty() {
            return Err(TemplateError::timeline(at, "length must >= 1"));
        }
        let range_opts = TimeOpts {
            ignore_warning: opts.ignore_warning,
            ..TimeOpts::between(0.0, opts.limit())
        };
        let ranges = items
            .iter()
            .enumerate()
            .map(|(idx, item)| parse_time_range(item, &format!("{at}[{idx}]"), range_opts))
            .collect::<Result<Vec<_>>>()?;
        Self::partition(&ranges, at, opts)
    }

    /// Partition parsed `[begin, end]` ranges.
    ///
    /// The ranges must jointly start at 0 and end at `duration` (or inside
    /// `[duration, over_duration]`). Each range overrides whatever earlier
    /// ranges it covers; zero-width ranges are ignored. The output is ordered,
    /// contiguous, and every fragment has an owner.
    pub fn partition(ranges: &[[f64; 2]], at: &str, opts: &FragmentOpts) -> Result<Vec<Self>> {
        if ranges.is_empty() {
            return Err(TemplateError::timeline(at, "length must >= 1"));
        }
        let limit = opts.limit();
        for (idx, &[begin, end]) in ranges.iter().enumerate() {
            if begin < 0.0 || begin > end || end > limit {
                return Err(TemplateError::timeline(format!("{at}[{idx}]"), "invalid time range"));
            }
        }

        let begin = ranges.iter().map(|r| r[0]).fold(f64::INFINITY, f64::min);
        let end = ranges.iter().map(|r| r[1]).fold(f64::NEG_INFINITY, f64::max);
        if begin != 0.0 {
            return Err(TemplateError::timeline(at, "Invalid time fragment (begin)"));
        }
        let end_ok = match opts.over_duration {
            None => end == opts.duration,
            Some(over) => opts.duration <= end && end <= over,
        };
        if !end_ok {
            return Err(TemplateError::timeline(at, "Invalid time fragment (end)"));
        }

        let mut layers = vec![Layer::new(begin, end, None)];
        for (idx, &[begin, end]) in ranges.iter().enumerate() {
            if begin == end {
                continue;
            }
            layers = paint(&layers, begin, end, idx);
        }

        layers
            .into_iter()
            .map(|layer| {
                layer
                    .owner
                    .map(|index| Self::new(layer.begin, layer.end, index))
                    .ok_or_else(|| TemplateError::timeline(at, "Invalid time fragment (overlap)"))
            })
            .collect()
    }
}

/// Values attached to consecutive time fragments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRange<V> {
    /// Partition of the timeline.
    pub fragments: Vec<TimeFragment>,
    /// One value per input range, indexed by [`TimeFragment::index`].
    pub values: Vec<V>,
}

impl<V> TimelineRange<V> {
    /// Assemble from already validated parts.
    #[must_use]
    pub fn from_parts(fragments: Vec<TimeFragment>, values: Vec<V>) -> Self {
        Self { fragments, values }
    }

    /// Parse a timeline given as `[{ time, ... }, ...]` or `{ "<range>": value, ... }`.
    ///
    /// In the array form the whole item is handed to `parse_value`.
    pub fn parse<F>(raw: &Value, at: &str, opts: &FragmentOpts, mut parse_value: F) -> Result<Self>
    where
        F: FnMut(&Value, &str) -> Result<V>,
    {
        match raw {
            Value::Array(items) => {
                let times: Vec<Value> = items
                    .iter()
                    .map(|item| item.get("time").cloned().unwrap_or(Value::Null))
                    .collect();
                let fragments = TimeFragment::parse_slice(&times, at, opts)?;
                let values = items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| parse_value(item, &format!("{at}[{idx}]")))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::from_parts(fragments, values))
            }
            Value::Object(map) => {
                let times: Vec<Value> = map.keys().map(|key| Value::String(key.clone())).collect();
                let fragments = TimeFragment::parse_slice(&times, at, opts)?;
                let values = map
                    .iter()
                    .map(|(key, value)| parse_value(value, &format!("{at}[{key}]")))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::from_parts(fragments, values))
            }
            _ => Err(TemplateError::timeline(at, "must be an array/object")),
        }
    }

    /// Value in effect at `time`.
    #[must_use]
    pub fn value_at(&self, time: f64) -> Option<&V> {
        self.fragments
            .iter()
            .find(|frag| frag.contains(time))
            .and_then(|frag| self.values.get(frag.index))
    }
}

/// Values attached to instants, sorted by time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint<V> {
    /// `(time, value)` pairs.
    pub pairs: Vec<(f64, V)>,
}

impl<V> TimelinePoint<V> {
    /// Assemble from pairs, sorting them by time.
    #[must_use]
    pub fn from_pairs(mut pairs: Vec<(f64, V)>) -> Self {
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { pairs }
    }

    /// Parse points given as `[{ time, ... }, ...]` or `{ "<time>": value, ... }`.
    pub fn parse<F>(raw: &Value, at: &str, duration: f64, mut parse_value: F) -> Result<Self>
    where
        F: FnMut(&Value, &str) -> Result<V>,
    {
        let opts = TimeOpts::between(0.0, duration);
        let pairs = match raw {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    let time = item.get("time").unwrap_or(&Value::Null);
                    Ok((
                        parse_time(time, &format!("{at}[{idx}].time"), opts)?,
                        parse_value(item, &format!("{at}[{idx}]"))?,
                    ))
                })
                .collect::<Result<Vec<_>>>()?,
            Value::Object(map) => map
                .iter()
                .map(|(key, value)| {
                    let item_at = format!("{at}[{key}]");
                    Ok((
                        parse_time(&Value::String(key.clone()), &item_at, opts)?,
                        parse_value(value, &item_at)?,
                    ))
                })
                .collect::<Result<Vec<_>>>()?,
            _ => return Err(TemplateError::timeline(at, "must be an array/object")),
        };
        Ok(Self::from_pairs(pairs))
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<V> Default for TimelinePoint<V> {
    fn default() -> Self {
        Self { pairs: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frags(raw: Value, opts: FragmentOpts) -> Vec<TimeFragment> {
        TimeFragment::parse_array(&raw, "?", &opts).unwrap()
    }

    fn frag_err(raw: Value, opts: FragmentOpts) -> String {
        TimeFragment::parse_array(&raw, "?", &opts).unwrap_err().to_string()
    }

    // ========================================================================
    // Fragment validation
    // ========================================================================

    #[test]
    fn test_fragment_bounds() {
        let opts = FragmentOpts::new(15.0);
        assert_eq!(frag_err(json!([]), opts), "?: length must >= 1");
        assert_eq!(frag_err(json!([[-1, 15]]), opts), "?[0][0]: must >= 0");
        assert_eq!(frag_err(json!([[0, 16]]), opts), "?[0][1]: must <= 15");
        assert_eq!(frag_err(json!([[1, 15]]), opts), "?: Invalid time fragment (begin)");
        assert_eq!(frag_err(json!([[0, 14]]), opts), "?: Invalid time fragment (end)");
    }

    #[test]
    fn test_fragment_over_duration() {
        let opts = FragmentOpts::with_tail(15.0, 20.0);
        assert_eq!(frags(json!([[0, 20]]), opts), vec![TimeFragment::new(0.0, 20.0, 0)]);
        assert_eq!(frag_err(json!([[0, 21]]), opts), "?[0][1]: must <= 20");
        assert_eq!(frag_err(json!([[0, 14]]), opts), "?: Invalid time fragment (end)");
    }

    #[test]
    fn test_fragment_gap_is_overlap_error() {
        let err = frag_err(json!([[0, 5], [10, 20]]), FragmentOpts::new(20.0));
        assert_eq!(err, "?: Invalid time fragment (overlap)");
    }

    // ========================================================================
    // Layering
    // ========================================================================

    #[test]
    fn test_fragment_single_and_adjacent() {
        assert_eq!(
            frags(json!([[0, 15]]), FragmentOpts::new(15.0)),
            vec![TimeFragment::new(0.0, 15.0, 0)]
        );
        assert_eq!(
            frags(json!([[0, 10], [10, 15]]), FragmentOpts::new(15.0)),
            vec![TimeFragment::new(0.0, 10.0, 0), TimeFragment::new(10.0, 15.0, 1)]
        );
    }

    #[test]
    fn test_fragment_later_range_splits_earlier() {
        assert_eq!(
            frags(json!([[0, "20s"], ["5s", "10s"]]), FragmentOpts::new(20.0)),
            vec![
                TimeFragment::new(0.0, 5.0, 0),
                TimeFragment::new(5.0, 10.0, 1),
                TimeFragment::new(10.0, 20.0, 0),
            ]
        );
    }

    #[test]
    fn test_fragment_later_range_spans_two() {
        assert_eq!(
            frags(json!([[0, 10], [10, 20], [5, 15]]), FragmentOpts::new(20.0)),
            vec![
                TimeFragment::new(0.0, 5.0, 0),
                TimeFragment::new(5.0, 15.0, 2),
                TimeFragment::new(15.0, 20.0, 1),
            ]
        );
    }

    #[test]
    fn test_fragment_fully_hidden_range_disappears() {
        assert_eq!(
            frags(json!([[8, 10], [0, 15], [14, 20]]), FragmentOpts::new(20.0)),
            vec![TimeFragment::new(0.0, 14.0, 1), TimeFragment::new(14.0, 20.0, 2)]
        );
    }

    #[test]
    fn test_fragment_zero_width_is_skipped() {
        assert_eq!(
            frags(json!([[0, 10], [5, 5]]), FragmentOpts::new(10.0)),
            vec![TimeFragment::new(0.0, 10.0, 0)]
        );
    }

    #[test]
    fn test_partition_rejects_reversed_range() {
        let err = TimeFragment::partition(&[[0.0, 10.0], [6.0, 4.0]], "?", &FragmentOpts::new(10.0))
            .unwrap_err();
        assert_eq!(err.to_string(), "?[1]: invalid time range");
    }

    // ========================================================================
    // Timelines
    // ========================================================================

    #[test]
    fn test_timeline_range_object_form() {
        let raw = json!({ "0-10": 1, "4-6": 2 });
        let timeline = TimelineRange::parse(&raw, "t", &FragmentOpts::new(10.0), |v, at| {
            v.as_i64().ok_or_else(|| TemplateError::field(at, "must be a int"))
        })
        .unwrap();
        assert_eq!(timeline.values, vec![1, 2]);
        assert_eq!(timeline.fragments.len(), 3);
        assert_eq!(timeline.value_at(5.0), Some(&2));
        assert_eq!(timeline.value_at(9.0), Some(&1));
        assert_eq!(timeline.value_at(10.0), None);
    }

    #[test]
    fn test_timeline_range_array_form() {
        let raw = json!([{ "time": [0, 2], "v": "a" }, { "time": "1-2", "v": "b" }]);
        let timeline = TimelineRange::parse(&raw, "t", &FragmentOpts::new(2.0), |item, _| {
            Ok(item["v"].as_str().unwrap_or_default().to_owned())
        })
        .unwrap();
        assert_eq!(
            timeline.fragments,
            vec![TimeFragment::new(0.0, 1.0, 0), TimeFragment::new(1.0, 2.0, 1)]
        );
    }

    #[test]
    fn test_timeline_range_value_location() {
        let raw = json!({ "0-1": "x" });
        let err = TimelineRange::<i64>::parse(&raw, "t", &FragmentOpts::new(1.0), |v, at| {
            v.as_i64().ok_or_else(|| TemplateError::field(at, "must be a int"))
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "t[0-1]: must be a int");
    }

    #[test]
    fn test_timeline_rejects_scalar() {
        let err = TimelineRange::<i64>::parse(&json!(3), "t", &FragmentOpts::new(1.0), |_, _| Ok(0))
            .unwrap_err();
        assert_eq!(err.to_string(), "t: must be an array/object");
    }

    #[test]
    fn test_timeline_point_sorted() {
        let raw = json!({ "2s": "b", "1s": "a" });
        let points = TimelinePoint::parse(&raw, "p", 3.0, |v, _| Ok(v.as_str().unwrap_or_default().to_owned()))
            .unwrap();
        assert_eq!(points.pairs, vec![(1.0, "a".to_owned()), (2.0, "b".to_owned())]);

        let err = TimelinePoint::parse(&json!([{ "time": "4s" }]), "p", 3.0, |_, _| Ok(()))
            .unwrap_err();
        assert_eq!(err.to_string(), "p[0].time: must <= 3");
    }
}
