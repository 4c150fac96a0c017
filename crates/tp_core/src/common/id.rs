//! Resource id grammar.
//!
//! An id is a kind prefix followed by `.sym(.sym)?(.sym)?(^tag)?`, where each
//! symbol is 1 to 64 characters of `[A-Za-z0-9_-]` and the optional tag is a
//! short variant marker such as `^1A` or `^B2`. The first symbol of a variable
//! id may be `#`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::builtin::ArrayOpts;
use crate::error::{Result, TemplateError};

static ID_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\.(#|[A-Za-z0-9_\-]{1,64})(?:\.([A-Za-z0-9_\-]{1,64}))?(?:\.([A-Za-z0-9_\-]{1,64}))?(?:\^([0-9]?[0-9A-Z]|[A-Z][0-9]))?$",
    )
    .expect("id suffix regex")
});

/// Kind prefix of an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdPrefix {
    /// `#`, variable definitions.
    Var,
    /// `Character`.
    Character,
    /// `Style`.
    Style,
    /// `Equipment`.
    Equipment,
    /// `Entry`.
    Entry,
    /// `Perk`.
    Perk,
    /// `AccessoryPool`.
    AccessoryPool,
    /// `Accessory`.
    Accessory,
    /// `Jewel`.
    Jewel,
    /// `Action`.
    Action,
    /// `Material`.
    Material,
    /// `Zone`.
    Zone,
}

impl IdPrefix {
    /// Literal prefix text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Var => "#",
            Self::Character => "Character",
            Self::Style => "Style",
            Self::Equipment => "Equipment",
            Self::Entry => "Entry",
            Self::Perk => "Perk",
            Self::AccessoryPool => "AccessoryPool",
            Self::Accessory => "Accessory",
            Self::Jewel => "Jewel",
            Self::Action => "Action",
            Self::Material => "Material",
            Self::Zone => "Zone",
        }
    }
}

impl fmt::Display for IdPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an id was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdViolation {
    /// Does not start with the expected prefix.
    Prefix,
    /// Suffix does not match the grammar.
    Pattern,
}

impl IdViolation {
    /// Human readable message for `prefix`.
    #[must_use]
    pub fn message(self, prefix: IdPrefix) -> String {
        match self {
            Self::Prefix => format!("must start with \"{prefix}\""),
            Self::Pattern => "must match ID pattern".to_owned(),
        }
    }
}

/// Match `id` against `prefix` and return its symbols (up to three).
pub fn id_symbols(id: &str, prefix: IdPrefix) -> std::result::Result<Vec<&str>, IdViolation> {
    let suffix = id
        .strip_prefix(prefix.as_str())
        .ok_or(IdViolation::Prefix)?;
    let captures = ID_SUFFIX_RE.captures(suffix).ok_or(IdViolation::Pattern)?;
    Ok((1..=3)
        .filter_map(|idx| captures.get(idx).map(|m| m.as_str()))
        .collect())
}

/// Check that `raw` is a well formed id of kind `prefix`.
pub fn parse_id(raw: &str, prefix: IdPrefix, at: &str) -> Result<String> {
    id_symbols(raw, prefix).map_err(|violation| TemplateError::field(at, violation.message(prefix)))?;
    Ok(raw.to_owned())
}

/// Same as [`parse_id`] for a raw value that must be a string.
pub fn parse_id_value(raw: &Value, prefix: IdPrefix, at: &str) -> Result<String> {
    let text = raw
        .as_str()
        .ok_or_else(|| TemplateError::field(at, "must be a ID"))?;
    parse_id(text, prefix, at)
}

/// Options for [`parse_id_array`].
#[derive(Debug, Clone, Default)]
pub struct IdArrayOpts {
    /// Length constraints.
    pub array: ArrayOpts,
    /// Id prepended to the result.
    pub add_first: Option<String>,
    /// Accept repeated ids.
    pub allow_conflict: bool,
}

/// Parse a list of ids, rejecting repeats unless `allow_conflict` is set.
pub fn parse_id_array(raw: &[String], prefix: IdPrefix, at: &str, opts: &IdArrayOpts) -> Result<Vec<String>> {
    opts.array.check_len(raw.len(), at)?;
    let mut res: Vec<String> = opts.add_first.iter().cloned().collect();
    for (idx, id) in raw.iter().enumerate() {
        let at = format!("{at}[{idx}]");
        if !opts.allow_conflict && res.contains(id) {
            return Err(TemplateError::field(at, "ID conflict"));
        }
        res.push(parse_id(id, prefix, &at)?);
    }
    Ok(res)
}

/// Same as [`parse_id_array`] for a raw value that must be an array of strings.
pub fn parse_id_value_array(
    raw: &Value,
    prefix: IdPrefix,
    at: &str,
    opts: &IdArrayOpts,
) -> Result<Vec<String>> {
    let items = raw
        .as_array()
        .ok_or_else(|| TemplateError::field(at, "must be an array"))?;
    let ids = items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            item.as_str()
                .map(str::to_owned)
                .ok_or_else(|| TemplateError::field(format!("{at}[{idx}]"), "must be a ID"))
        })
        .collect::<Result<Vec<_>>>()?;
    parse_id_array(&ids, prefix, at, opts)
}
