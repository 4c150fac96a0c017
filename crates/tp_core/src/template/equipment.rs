//! Equipment and its upgrade tree.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{level_count, parse_entry_table, parse_jewel_slots_array, parse_parents, present};
use super::{verify_entry_table, Character, EntryTable, JewelSlots};
use crate::attribute::{parse_attribute_table, AttributeGroup, AttributeTable};
use crate::common::{
    field_at, parse_id, parse_int_range, parse_string, ArrayOpts, FloatArrayOpts, IdPrefix, IntOpts,
    StrOpts,
};
use crate::config::MAX_NAME_LEN;
use crate::error::{Result, TemplateError};
use crate::registry::{Registry, Template};

name_enum! {
    /// Equipment slot of a character.
    EquipmentSlot, "must be an EquipmentSlot" {
        /// First slot, usually the main weapon.
        Slot1,
        /// Second slot.
        Slot2,
        /// Third slot.
        Slot3,
    }
}

/// Raw equipment input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentArgs {
    /// Display name.
    pub name: String,
    /// Owning character.
    pub character: String,
    /// Slot.
    pub slot: String,
    /// `{ parent equipment id: parent level }` this one is upgraded from.
    #[serde(default)]
    pub parents: Value,
    /// Inclusive level range.
    pub level: Value,
    /// Attributes, one value per level.
    pub attributes: Value,
    /// Jewel slots, one per level.
    #[serde(default)]
    pub slots: Value,
    /// Entry pieces, one row per level.
    #[serde(default)]
    pub entries: Value,
}

/// A piece of equipment.
#[derive(Debug, Clone, Serialize)]
pub struct Equipment {
    /// Resource id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owning character.
    pub character: String,
    /// Slot.
    pub slot: EquipmentSlot,
    /// Inclusive level range.
    pub level: [i64; 2],
    /// Parents in the upgrade tree.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<IndexMap<String, i64>>,
    /// Attributes per level.
    pub attributes: AttributeTable,
    /// Jewel slots per level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<JewelSlots>>,
    /// Entry pieces per level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<EntryTable>,
}

impl Template for Equipment {
    const PREFIX: IdPrefix = IdPrefix::Equipment;
    const KIND: &'static str = "Equipment";
    type Args = EquipmentArgs;

    fn build(id: &str, args: &EquipmentArgs) -> Result<Self> {
        let at = |field: &str| field_at(id, field);
        let name = parse_string(&args.name, &at("name"), &StrOpts::max_len(MAX_NAME_LEN))?;
        let character = parse_id(&args.character, IdPrefix::Character, &at("character"))?;
        let slot = EquipmentSlot::parse(&args.slot, &at("slot"))?;
        let level = parse_int_range(&args.level, &at("level"), IntOpts::at_least(0))?;
        let levels = ArrayOpts::exact(level_count(level));
        let parents = parse_parents(&args.parents, IdPrefix::Equipment, &at("parents"))?;
        let attributes = parse_attribute_table(
            &args.attributes,
            &[AttributeGroup::Primary, AttributeGroup::Secondary],
            &at("attributes"),
            &FloatArrayOpts {
                array: levels,
                ..FloatArrayOpts::default()
            },
        )?;
        let slots = present(&args.slots)
            .map(|raw| parse_jewel_slots_array(raw, &at("slots"), levels))
            .transpose()?;
        let entries = present(&args.entries)
            .map(|raw| parse_entry_table(raw, &at("entries"), levels))
            .transpose()?;

        Ok(Self {
            id: id.to_owned(),
            name,
            character,
            slot,
            level,
            parents,
            attributes,
            slots,
            entries,
        })
    }

    fn verify(&self, reg: &Registry) -> Result<()> {
        let at = |field: &str| field_at(&self.id, field);
        let character = reg.find_as::<Character>(&self.character, &at("character"))?;
        if !character.equipments.contains(&self.id) {
            return Err(TemplateError::integrity(at("character"), "Character and Equipment mismatch"));
        }

        for (parent_id, &level) in self.parents.iter().flatten() {
            let parent_at = at(&format!("parents[{parent_id}]"));
            let parent = reg.find_as::<Self>(parent_id, &parent_at)?;
            if parent.character != self.character {
                return Err(TemplateError::integrity(parent_at, "Character mismatch with parent"));
            }
            if parent.slot != self.slot {
                return Err(TemplateError::integrity(parent_at, "slot missmatch with parent"));
            }
            if level < parent.level[0] || level > parent.level[1] {
                return Err(TemplateError::integrity(parent_at, "out of parent's level range"));
            }
        }

        if let Some(entries) = &self.entries {
            verify_entry_table(reg, entries, &at("entries"))?;
        }
        Ok(())
    }
}
