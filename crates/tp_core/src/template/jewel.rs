//! Jewels and jewel slots.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Entry;
use crate::common::{
    check_array, field_at, parse_id, parse_int, parse_int_array, ArrayOpts, IdPrefix, IntArrayOpts,
    IntOpts, RareLevel,
};
use crate::error::{Result, TemplateError};
use crate::registry::{Registry, Template};

static SLOTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([ADS]\d+)?([ADS]\d+)?([ADS]\d+)?$").expect("jewel slots regex"));

/// Jewel slot counts as `[special, attack, defense]`.
pub type JewelSlots = [i64; 3];

const SPECIAL: usize = 0;
const ATTACK: usize = 1;
const DEFENSE: usize = 2;

name_enum! {
    /// Kind of slot a jewel fits in.
    JewelSlot, "must be a JewelSlot" {
        /// Attack slot.
        Attack,
        /// Defense slot.
        Defense,
        /// Special slot.
        Special,
    }
}

name_enum! {
    /// Visual variant of a jewel.
    JewelVariant, "must be a JewelVariant" {
        /// First variant.
        Variant1,
        /// Second variant.
        Variant2,
        /// Third variant.
        Variant3,
        /// Unique variant.
        VariantX,
    }
}

/// Parse slot counts, written as `"S1A2D2"` (any order, any subset) or
/// `[special, attack, defense]`.
pub fn parse_jewel_slots(raw: &Value, at: &str) -> Result<JewelSlots> {
    match raw {
        Value::String(text) => {
            let caps = SLOTS_RE
                .captures(text)
                .ok_or_else(|| TemplateError::field(at, "must be an A_D_S_/[int,int,int]"))?;
            let mut slots = [0; 3];
            for group in caps.iter().skip(1).flatten() {
                let group = group.as_str();
                let count = group[1..].parse().unwrap_or(0);
                match &group[..1] {
                    "S" => slots[SPECIAL] = count,
                    "A" => slots[ATTACK] = count,
                    _ => slots[DEFENSE] = count,
                }
            }
            Ok(slots)
        }
        Value::Array(_) => {
            let counts = parse_int_array(
                raw,
                at,
                &IntArrayOpts {
                    item: IntOpts::at_least(0),
                    array: ArrayOpts::exact(3),
                    ..IntArrayOpts::default()
                },
            )?;
            Ok([counts[0], counts[1], counts[2]])
        }
        _ => Err(TemplateError::field(at, "must be an A_D_S_/[int,int,int]")),
    }
}

/// Parse an array of slot counts, one per level.
pub fn parse_jewel_slots_array(raw: &Value, at: &str, opts: ArrayOpts) -> Result<Vec<JewelSlots>> {
    check_array(raw, at, opts)?
        .iter()
        .enumerate()
        .map(|(idx, item)| parse_jewel_slots(item, &format!("{at}[{idx}]")))
        .collect()
}

/// Raw jewel input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JewelArgs {
    /// Slot kind.
    pub slot: String,
    /// Rarity.
    pub rare: String,
    /// Main entry.
    pub entry: String,
    /// Pieces of the main entry.
    pub piece: Value,
    /// Secondary entry, paired with `sub_piece`.
    #[serde(default)]
    pub sub_entry: Option<String>,
    /// Pieces of the secondary entry.
    #[serde(default)]
    pub sub_piece: Value,
    /// Visual variant.
    pub variant: String,
}

/// A jewel, socketed into a matching slot to add entry pieces.
#[derive(Debug, Clone, Serialize)]
pub struct Jewel {
    /// Resource id.
    pub id: String,
    /// Slot kind.
    pub slot: JewelSlot,
    /// Rarity.
    pub rare: RareLevel,
    /// Main entry.
    pub entry: String,
    /// Pieces of the main entry.
    pub piece: i64,
    /// Secondary entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_entry: Option<String>,
    /// Pieces of the secondary entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_piece: Option<i64>,
    /// Visual variant.
    pub variant: JewelVariant,
}

impl Template for Jewel {
    const PREFIX: IdPrefix = IdPrefix::Jewel;
    const KIND: &'static str = "Jewel";
    type Args = JewelArgs;

    fn build(id: &str, args: &JewelArgs) -> Result<Self> {
        let at = |field: &str| field_at(id, field);
        let slot = JewelSlot::parse(&args.slot, &at("slot"))?;
        let rare = RareLevel::parse(&args.rare, &at("rare"))?;
        let entry = parse_id(&args.entry, IdPrefix::Entry, &at("entry"))?;
        let piece = parse_int(&args.piece, &at("piece"), IntOpts::at_least(1))?;
        let (sub_entry, sub_piece) = match (&args.sub_entry, args.sub_piece.is_null()) {
            (None, true) => (None, None),
            (Some(sub_entry), false) => (
                Some(parse_id(sub_entry, IdPrefix::Entry, &at("sub_entry"))?),
                Some(parse_int(&args.sub_piece, &at("sub_piece"), IntOpts::at_least(1))?),
            ),
            _ => {
                return Err(TemplateError::field(
                    at(""),
                    "sub_entry & sub_piece must be using together",
                ))
            }
        };
        Ok(Self {
            id: id.to_owned(),
            slot,
            rare,
            entry,
            piece,
            sub_entry,
            sub_piece,
            variant: JewelVariant::parse(&args.variant, &at("variant"))?,
        })
    }

    fn verify(&self, reg: &Registry) -> Result<()> {
        let at = |field: &str| field_at(&self.id, field);
        let entry = reg.find_as::<Entry>(&self.entry, &at("entry"))?;
        if entry.max_piece < self.piece {
            return Err(TemplateError::integrity(at("piece"), "must <= entry.max_piece"));
        }
        if let (Some(sub_entry), Some(sub_piece)) = (&self.sub_entry, self.sub_piece) {
            let sub = reg.find_as::<Entry>(sub_entry, &at("sub_entry"))?;
            if sub.max_piece < sub_piece {
                return Err(TemplateError::integrity(at("sub_piece"), "must <= sub_entry.max_piece"));
            }
        }
        Ok(())
    }
}
