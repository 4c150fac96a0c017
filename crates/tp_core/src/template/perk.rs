//! Perks: nodes of a style's talent tree.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    parse_entry_table, parse_jewel_slots_array, parse_parents, present, verify_entry_table, Character,
    EntryTable, JewelSlots, Style,
};
use crate::attribute::{parse_attribute_table, AttributeGroup, AttributeTable};
use crate::common::{
    as_count, field_at, parse_id, parse_id_array, parse_int, parse_string, ArrayOpts, FloatArrayOpts,
    IdArrayOpts, IdPrefix, IntOpts, StrOpts,
};
use crate::config::MAX_NAME_LEN;
use crate::error::{Result, TemplateError};
use crate::registry::{Registry, Template};
use crate::variable::{parse_var_index_table, verify_var_index_table, VarConsumers, VarIndexTable};

/// Raw perk input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerkArgs {
    /// Display name.
    pub name: String,
    /// Owning character.
    pub character: String,
    /// Style that unlocks this perk.
    pub style: String,
    /// Styles that may use this perk once unlocked.
    #[serde(default)]
    pub usable_styles: Option<Vec<String>>,
    /// `{ parent perk id: required parent level }`.
    #[serde(default)]
    pub parents: Value,
    /// Number of levels.
    pub max_level: Value,
    /// Attributes per level.
    #[serde(default)]
    pub attributes: Value,
    /// Jewel slots per level.
    #[serde(default)]
    pub slots: Value,
    /// Entry pieces per level.
    #[serde(default)]
    pub entries: Value,
    /// Variable indexes per level.
    #[serde(default)]
    pub var_indexes: Value,
}

/// A perk.
#[derive(Debug, Clone, Serialize)]
pub struct Perk {
    /// Resource id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owning character.
    pub character: String,
    /// Style that unlocks this perk.
    pub style: String,
    /// Styles that may use this perk, `style` first when not listed.
    pub usable_styles: Vec<String>,
    /// Required parents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<IndexMap<String, i64>>,
    /// Number of levels.
    pub max_level: i64,
    /// Attributes per level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeTable>,
    /// Jewel slots per level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slots: Option<Vec<JewelSlots>>,
    /// Entry pieces per level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<EntryTable>,
    /// Variable indexes per level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var_indexes: Option<VarIndexTable>,
}

impl Template for Perk {
    const PREFIX: IdPrefix = IdPrefix::Perk;
    const KIND: &'static str = "Perk";
    type Args = PerkArgs;

    fn build(id: &str, args: &PerkArgs) -> Result<Self> {
        let at = |field: &str| field_at(id, field);
        let name = parse_string(&args.name, &at("name"), &StrOpts::max_len(MAX_NAME_LEN))?;
        let character = parse_id(&args.character, IdPrefix::Character, &at("character"))?;
        let style = parse_id(&args.style, IdPrefix::Style, &at("style"))?;
        let usable_styles = match &args.usable_styles {
            None => vec![style.clone()],
            Some(styles) => {
                let opts = IdArrayOpts {
                    add_first: (!styles.contains(&style)).then(|| style.clone()),
                    ..IdArrayOpts::default()
                };
                parse_id_array(styles, IdPrefix::Style, &at("usable_styles"), &opts)?
            }
        };
        let parents = parse_parents(&args.parents, IdPrefix::Perk, &at("parents"))?;
        let max_level = parse_int(&args.max_level, &at("max_level"), IntOpts::at_least(0))?;
        let levels = ArrayOpts::exact(as_count(max_level));

        let attributes = present(&args.attributes)
            .map(|raw| {
                parse_attribute_table(
                    raw,
                    &[AttributeGroup::Primary, AttributeGroup::Secondary],
                    &at("attributes"),
                    &FloatArrayOpts {
                        array: levels,
                        ..FloatArrayOpts::default()
                    },
                )
            })
            .transpose()?;
        let slots = present(&args.slots)
            .map(|raw| parse_jewel_slots_array(raw, &at("slots"), levels))
            .transpose()?;
        let entries = present(&args.entries)
            .map(|raw| parse_entry_table(raw, &at("entries"), levels))
            .transpose()?;
        let var_indexes = match present(&args.var_indexes) {
            None => None,
            Some(raw) => parse_var_index_table(raw, &at("var_indexes"), levels.len)?,
        };

        Ok(Self {
            id: id.to_owned(),
            name,
            character,
            style,
            usable_styles,
            parents,
            max_level,
            attributes,
            slots,
            entries,
            var_indexes,
        })
    }

    fn verify(&self, reg: &Registry) -> Result<()> {
        let at = |field: &str| field_at(&self.id, field);
        reg.find_as::<Character>(&self.character, &at("character"))?;
        let style = reg.find_as::<Style>(&self.style, &at("style"))?;
        if style.character != self.character {
            return Err(TemplateError::integrity(at("style"), "Character mismatch with Style"));
        }
        if !style.perks.contains(&self.id) {
            return Err(TemplateError::integrity(at("style"), "Style and Perk mismatch"));
        }

        for (idx, style_id) in self.usable_styles.iter().enumerate() {
            let style_at = at(&format!("usable_styles[{idx}]"));
            let usable = reg.find_as::<Style>(style_id, &style_at)?;
            if usable.character != self.character {
                return Err(TemplateError::integrity(
                    style_at,
                    "Character mismatch with Style (usable_styles)",
                ));
            }
            if !usable.usable_perks.contains(&self.id) {
                return Err(TemplateError::integrity(style_at, "Style and Perk mismatch (usable_styles)"));
            }
        }

        for (parent_id, &level) in self.parents.iter().flatten() {
            let parent_at = at(&format!("parents[{parent_id}]"));
            let parent = reg.find_as::<Self>(parent_id, &parent_at)?;
            if parent.character != self.character {
                return Err(TemplateError::integrity(parent_at, "Character mismatch with parent"));
            }
            if level > parent.max_level {
                return Err(TemplateError::integrity(parent_at, "> parent's max_level"));
            }
        }

        if let Some(entries) = &self.entries {
            verify_entry_table(reg, entries, &at("entries"))?;
        }
        if let Some(table) = &self.var_indexes {
            verify_var_index_table(reg, table, VarConsumers::styles(&self.usable_styles), &at("var_indexes"))?;
        }
        Ok(())
    }
}
