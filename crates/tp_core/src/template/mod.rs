//! Domain resource kinds other than actions.
//!
//! Each kind comes as a pair: `XxxArgs`, deserialized from author input, and
//! `Xxx`, the validated resource that is registered and exported.

/// Closed set of names, parsed from strings with a fixed error message.
macro_rules! name_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $message:literal {
            $($(#[$vmeta:meta])* $variant:ident),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)*
        }

        impl $name {
            /// Every accepted value.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// Name as written by authors.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)*
                }
            }

            /// Parse a name.
            pub fn parse(raw: &str, at: &str) -> $crate::error::Result<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|value| value.as_str() == raw)
                    .ok_or_else(|| $crate::error::TemplateError::field(at, $message))
            }
        }
    };
}
pub(crate) use name_enum;

mod accessory;
mod character;
mod entry;
mod equipment;
mod jewel;
mod perk;
mod zone;

use indexmap::IndexMap;
use serde_json::Value;

pub use accessory::{Accessory, AccessoryArgs, AccessoryPool, AccessoryPoolArgs, AccessoryVariant};
pub use character::{Character, CharacterArgs, FixedAttributes, FixedAttributesArgs, Style, StyleArgs};
pub use entry::{parse_entry_table, verify_entry_table, Entry, EntryArgs, EntryTable};
pub use equipment::{Equipment, EquipmentArgs, EquipmentSlot};
pub use jewel::{parse_jewel_slots, parse_jewel_slots_array, Jewel, JewelArgs, JewelSlot, JewelSlots, JewelVariant};
pub use perk::{Perk, PerkArgs};
pub use zone::{Zone, ZoneArgs};

use crate::common::{check_record, parse_id, parse_int, IdPrefix, IntOpts};
use crate::error::Result;

/// The value, unless absent.
pub(crate) fn present(raw: &Value) -> Option<&Value> {
    (!raw.is_null()).then_some(raw)
}

/// Parse `{ parent id: level }`.
pub(crate) fn parse_parents(raw: &Value, prefix: IdPrefix, at: &str) -> Result<Option<IndexMap<String, i64>>> {
    let Some(raw) = present(raw) else {
        return Ok(None);
    };
    let mut parents = IndexMap::new();
    for (id, level) in check_record(raw, at)? {
        let parent_at = format!("{at}[{id}]");
        let id = parse_id(id, prefix, &parent_at)?;
        parents.insert(id, parse_int(level, &parent_at, IntOpts::at_least(0))?);
    }
    Ok(Some(parents))
}

/// Number of levels in an inclusive level range.
pub(crate) fn level_count(level: [i64; 2]) -> usize {
    crate::common::as_count(level[1] - level[0] + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_parents() {
        assert_eq!(parse_parents(&Value::Null, IdPrefix::Perk, "p").unwrap(), None);
        let parents = parse_parents(&json!({ "Perk.A": 2 }), IdPrefix::Perk, "p")
            .unwrap()
            .unwrap();
        assert_eq!(parents["Perk.A"], 2);

        let err = parse_parents(&json!({ "Perk.A": -1 }), IdPrefix::Perk, "p").unwrap_err();
        assert_eq!(err.to_string(), "p[Perk.A]: must >= 0");
        let err = parse_parents(&json!({ "Style.A": 1 }), IdPrefix::Perk, "p").unwrap_err();
        assert_eq!(err.to_string(), "p[Style.A]: must start with \"Perk\"");
    }

    #[test]
    fn test_level_count() {
        assert_eq!(level_count([1, 3]), 3);
        assert_eq!(level_count([0, 0]), 1);
    }
}
