//! Accessories and the pools their random entries are drawn from.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Entry;
use crate::common::{
    check_record, field_at, parse_float, parse_id, parse_int, FloatOpts, IdPrefix, IntOpts, RareLevel,
};
use crate::config::MAX_ENTRY_PLUS;
use crate::error::{Result, TemplateError};
use crate::registry::{Registry, Template};

const PATTERN_MESSAGE: &str = "must be a patterns like 'S A A B AB'";

/// Entry source of one upgrade step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PoolPattern {
    /// Draw from `a_entries`.
    A,
    /// Draw from `b_entries`.
    B,
    /// Draw from both pools.
    AB,
}

/// Raw accessory pool input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessoryPoolArgs {
    /// Rarity.
    pub rare: String,
    /// Space separated steps, starting with `S`: `"S A A B AB"`.
    pub patterns: String,
    /// Highest upgrade level, `MAX_ENTRY_PLUS` per step.
    pub max_level: Value,
    /// `{ entry id: weight }` of pool A.
    pub a_entries: Value,
    /// `{ entry id: weight }` of pool B.
    pub b_entries: Value,
}

/// Random entry pool for accessories.
#[derive(Debug, Clone, Serialize)]
pub struct AccessoryPool {
    /// Resource id.
    pub id: String,
    /// Rarity.
    pub rare: RareLevel,
    /// Steps after the initial `S`.
    pub patterns: Vec<PoolPattern>,
    /// Highest upgrade level.
    pub max_level: i64,
    /// Weights of pool A.
    pub a_entries: IndexMap<String, f64>,
    /// Weights of pool B.
    pub b_entries: IndexMap<String, f64>,
}

fn parse_patterns(raw: &str, max_level: i64, id: &str) -> Result<Vec<PoolPattern>> {
    let tokens: Vec<&str> = raw.split(' ').collect();
    let expected = tokens.len() as i64 * MAX_ENTRY_PLUS;
    if max_level != expected {
        return Err(TemplateError::field(field_at(id, "max_level"), format!("must = {expected}")));
    }
    let (first, rest) = tokens.split_first().unwrap_or((&"", &[]));
    if *first != "S" {
        return Err(TemplateError::field(field_at(id, "patterns"), PATTERN_MESSAGE));
    }
    rest.iter()
        .map(|token| match *token {
            "A" => Ok(PoolPattern::A),
            "B" => Ok(PoolPattern::B),
            "AB" => Ok(PoolPattern::AB),
            _ => Err(TemplateError::field(field_at(id, "patterns"), PATTERN_MESSAGE)),
        })
        .collect()
}

fn parse_pool(raw: &Value, at: &str) -> Result<IndexMap<String, f64>> {
    let mut pool = IndexMap::new();
    for (id, weight) in check_record(raw, at)? {
        let item_at = format!("{at}[{id}]");
        let id = parse_id(id, IdPrefix::Entry, &item_at)?;
        pool.insert(id, parse_float(weight, &item_at, FloatOpts::at_least(0.0))?);
    }
    Ok(pool)
}

impl Template for AccessoryPool {
    const PREFIX: IdPrefix = IdPrefix::AccessoryPool;
    const KIND: &'static str = "AccessoryPool";
    type Args = AccessoryPoolArgs;

    fn build(id: &str, args: &AccessoryPoolArgs) -> Result<Self> {
        let at = |field: &str| field_at(id, field);
        let rare = RareLevel::parse(&args.rare, &at("rare"))?;
        let max_level = parse_int(&args.max_level, &at("max_level"), IntOpts::at_least(1))?;
        Ok(Self {
            id: id.to_owned(),
            rare,
            patterns: parse_patterns(&args.patterns, max_level, id)?,
            max_level,
            a_entries: parse_pool(&args.a_entries, &at("a_entries"))?,
            b_entries: parse_pool(&args.b_entries, &at("b_entries"))?,
        })
    }

    fn verify(&self, reg: &Registry) -> Result<()> {
        for id in self.a_entries.keys() {
            reg.find_as::<Entry>(id, &field_at(&self.id, "a_entries"))?;
        }
        for id in self.b_entries.keys() {
            reg.find_as::<Entry>(id, &field_at(&self.id, "b_entries"))?;
        }
        Ok(())
    }
}

name_enum! {
    /// Visual variant of an accessory.
    AccessoryVariant, "must be a AccessoryVariant" {
        /// First variant.
        Variant1,
        /// Second variant.
        Variant2,
        /// Third variant.
        Variant3,
    }
}

/// Raw accessory input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessoryArgs {
    /// Pool random entries are drawn from.
    pub pool: String,
    /// Rarity.
    pub rare: String,
    /// Fixed entry.
    pub entry: String,
    /// Pieces of the fixed entry.
    pub piece: Value,
    /// Visual variant.
    pub variant: String,
}

/// An accessory with one fixed entry and random pooled entries.
#[derive(Debug, Clone, Serialize)]
pub struct Accessory {
    /// Resource id.
    pub id: String,
    /// Pool random entries are drawn from.
    pub pool: String,
    /// Rarity.
    pub rare: RareLevel,
    /// Fixed entry.
    pub entry: String,
    /// Pieces of the fixed entry.
    pub piece: i64,
    /// Visual variant.
    pub variant: AccessoryVariant,
}

impl Template for Accessory {
    const PREFIX: IdPrefix = IdPrefix::Accessory;
    const KIND: &'static str = "Accessory";
    type Args = AccessoryArgs;

    fn build(id: &str, args: &AccessoryArgs) -> Result<Self> {
        let at = |field: &str| field_at(id, field);
        Ok(Self {
            id: id.to_owned(),
            pool: parse_id(&args.pool, IdPrefix::AccessoryPool, &at("pool"))?,
            rare: RareLevel::parse(&args.rare, &at("rare"))?,
            entry: parse_id(&args.entry, IdPrefix::Entry, &at("entry"))?,
            piece: parse_int(&args.piece, &at("piece"), IntOpts::at_least(1))?,
            variant: AccessoryVariant::parse(&args.variant, &at("variant"))?,
        })
    }

    fn verify(&self, reg: &Registry) -> Result<()> {
        let at = |field: &str| field_at(&self.id, field);
        reg.find_as::<AccessoryPool>(&self.pool, &at("pool"))?;
        let entry = reg.find_as::<Entry>(&self.entry, &at("entry"))?;
        if self.piece > entry.max_piece {
            return Err(TemplateError::integrity(at("piece"), "must <= entry.max_piece"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pool_args() -> AccessoryPoolArgs {
        AccessoryPoolArgs {
            rare: "Rare2".into(),
            patterns: "S A B AB".into(),
            max_level: json!(12),
            a_entries: json!({ "Entry.A": 1 }),
            b_entries: json!({ "Entry.B": "50%" }),
        }
    }

    #[test]
    fn test_pool_patterns() {
        let pool = AccessoryPool::build("AccessoryPool.Ring", &pool_args()).unwrap();
        assert_eq!(pool.patterns, vec![PoolPattern::A, PoolPattern::B, PoolPattern::AB]);
        assert_eq!(pool.b_entries["Entry.B"], 0.5);
    }

    #[test]
    fn test_pool_level_must_match_steps() {
        let err = AccessoryPool::build(
            "AccessoryPool.Ring",
            &AccessoryPoolArgs {
                max_level: json!(9),
                ..pool_args()
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "<AccessoryPool.Ring>.max_level: must = 12");
    }

    #[test]
    fn test_pool_pattern_must_start_with_s() {
        let err = AccessoryPool::build(
            "AccessoryPool.Ring",
            &AccessoryPoolArgs {
                patterns: "A A B AB".into(),
                ..pool_args()
            },
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "<AccessoryPool.Ring>.patterns: must be a patterns like 'S A A B AB'"
        );
    }

    #[test]
    fn test_accessory_variant() {
        let args = AccessoryArgs {
            pool: "AccessoryPool.Ring".into(),
            rare: "Rare1".into(),
            entry: "Entry.A".into(),
            piece: json!(1),
            variant: "VariantX".into(),
        };
        let err = Accessory::build("Accessory.Ring", &args).unwrap_err();
        assert_eq!(err.to_string(), "<Accessory.Ring>.variant: must be a AccessoryVariant");
    }
}
