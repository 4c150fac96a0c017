//! Characters and their styles.
//!
//! A [`Character`] holds what every style of it shares: skeleton, bounds and
//! level range. A [`Style`] is one playable build of a character, with its
//! own attributes, perks and actions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{level_count, parse_jewel_slots_array, Equipment, JewelSlots, Perk};
use crate::attribute::{parse_attribute_table, AttributeGroup, AttributeTable};
use crate::common::{
    field_at, parse_file, parse_float, parse_id, parse_id_array, parse_int_range, parse_string,
    parse_vec2, ArrayOpts, Capsule, CapsuleArgs, FileOpts, FloatArrayOpts, FloatOpts, IdArrayOpts,
    IdPrefix, IntOpts, StrOpts, Vec2Opts,
};
use crate::config::{MAX_CHARACTER_NAME_LEN, MAX_NAME_LEN};
use crate::error::{Result, TemplateError};
use crate::registry::{Registry, Template};

/// Raw character input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacterArgs {
    /// Display name.
    pub name: String,
    /// Inclusive level range.
    pub level: Value,
    /// Styles of this character.
    pub styles: Vec<String>,
    /// Equipment of this character.
    pub equipments: Vec<String>,
    /// Movement bounds.
    pub bounding_capsule: CapsuleArgs,
    /// Path prefix of the skeleton files.
    pub skeleton_files: String,
    /// Facing of the model on the XZ plane.
    pub skeleton_toward: Value,
}

/// A playable character.
#[derive(Debug, Clone, Serialize)]
pub struct Character {
    /// Resource id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Inclusive level range.
    pub level: [i64; 2],
    /// Styles of this character.
    pub styles: Vec<String>,
    /// Equipment of this character.
    pub equipments: Vec<String>,
    /// Movement bounds.
    pub bounding_capsule: Capsule,
    /// Path prefix of the skeleton files.
    pub skeleton_files: String,
    /// Unit facing of the model on the XZ plane.
    pub skeleton_toward: [f64; 2],
}

impl Template for Character {
    const PREFIX: IdPrefix = IdPrefix::Character;
    const KIND: &'static str = "Character";
    type Args = CharacterArgs;

    fn build(id: &str, args: &CharacterArgs) -> Result<Self> {
        let at = |field: &str| field_at(id, field);
        Ok(Self {
            id: id.to_owned(),
            name: parse_string(&args.name, &at("name"), &StrOpts::max_len(MAX_CHARACTER_NAME_LEN))?,
            level: parse_int_range(&args.level, &at("level"), IntOpts::at_least(0))?,
            styles: parse_id_array(&args.styles, IdPrefix::Style, &at("styles"), &IdArrayOpts::default())?,
            equipments: parse_id_array(
                &args.equipments,
                IdPrefix::Equipment,
                &at("equipments"),
                &IdArrayOpts::default(),
            )?,
            bounding_capsule: Capsule::parse(&args.bounding_capsule, &at("bounding_capsule"))?,
            skeleton_files: parse_file(&args.skeleton_files, &at("skeleton_files"), &FileOpts::default())?,
            skeleton_toward: parse_vec2(
                &args.skeleton_toward,
                &at("skeleton_toward"),
                Vec2Opts {
                    normalized: true,
                    ..Vec2Opts::default()
                },
            )?,
        })
    }

    fn verify(&self, reg: &Registry) -> Result<()> {
        for (idx, style_id) in self.styles.iter().enumerate() {
            let at = field_at(&self.id, &format!("styles[{idx}]"));
            let style = reg.find_as::<Style>(style_id, &at)?;
            if style.character != self.id {
                return Err(TemplateError::integrity(at, "Character and Style mismatch"));
            }
        }
        for (idx, equip_id) in self.equipments.iter().enumerate() {
            let at = field_at(&self.id, &format!("equipments[{idx}]"));
            let equip = reg.find_as::<Equipment>(equip_id, &at)?;
            if equip.character != self.id {
                return Err(TemplateError::integrity(at, "Character and Equipment mismatch"));
            }
        }
        Ok(())
    }
}

/// Raw level-independent style attributes. Ratios accept percents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixedAttributesArgs {
    /// Damage reduction `P1` in `P1 + (1 - P1) * def / (P2 + def)`.
    pub damage_reduce_param_1: Value,
    /// Damage reduction `P2`.
    pub damage_reduce_param_2: Value,
    /// Damage ratio taken while guarding.
    pub guard_damage_ratio_1: Value,
    /// Deposture reduction `P1`.
    pub deposture_reduce_param_1: Value,
    /// Deposture reduction `P2`.
    pub deposture_reduce_param_2: Value,
    /// Deposture ratio taken while guarding.
    pub guard_deposture_ratio_1: Value,
    /// Bonus damage against weakened enemies.
    pub weak_damage_up: Value,
}

/// Level-independent style attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct FixedAttributes {
    pub damage_reduce_param_1: f64,
    pub damage_reduce_param_2: f64,
    pub guard_damage_ratio_1: f64,
    pub deposture_reduce_param_1: f64,
    pub deposture_reduce_param_2: f64,
    pub guard_deposture_ratio_1: f64,
    pub weak_damage_up: f64,
}

impl FixedAttributes {
    /// Validate every field; ratios lie in `[0, 1]`, the rest are non-negative.
    pub fn parse(args: &FixedAttributesArgs, at: &str) -> Result<Self> {
        let ratio = |raw: &Value, field: &str| parse_float(raw, &format!("{at}.{field}"), FloatOpts::between(0.0, 1.0));
        let positive = |raw: &Value, field: &str| parse_float(raw, &format!("{at}.{field}"), FloatOpts::at_least(0.0));
        Ok(Self {
            damage_reduce_param_1: ratio(&args.damage_reduce_param_1, "damage_reduce_param_1")?,
            damage_reduce_param_2: positive(&args.damage_reduce_param_2, "damage_reduce_param_2")?,
            guard_damage_ratio_1: ratio(&args.guard_damage_ratio_1, "guard_damage_ratio_1")?,
            deposture_reduce_param_1: ratio(&args.deposture_reduce_param_1, "deposture_reduce_param_1")?,
            deposture_reduce_param_2: positive(&args.deposture_reduce_param_2, "deposture_reduce_param_2")?,
            guard_deposture_ratio_1: ratio(&args.guard_deposture_ratio_1, "guard_deposture_ratio_1")?,
            weak_damage_up: positive(&args.weak_damage_up, "weak_damage_up")?,
        })
    }
}

/// Raw style input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleArgs {
    /// Display name.
    pub name: String,
    /// Owning character.
    pub character: String,
    /// Primary and secondary attributes, one value per character level.
    pub attributes: Value,
    /// Jewel slots per level.
    pub slots: Value,
    /// Level-independent attributes.
    pub fixed_attributes: FixedAttributesArgs,
    /// Perks unlocked by this style.
    pub perks: Vec<String>,
    /// Perks of other styles this style may also use.
    #[serde(default)]
    pub usable_perks: Vec<String>,
    /// Actions of this style.
    pub actions: Vec<String>,
    /// Rendered model.
    pub view_model: String,
}

/// A playable style of a character.
#[derive(Debug, Clone, Serialize)]
pub struct Style {
    /// Resource id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Owning character.
    pub character: String,
    /// Attributes per level.
    pub attributes: AttributeTable,
    /// Jewel slots per level.
    pub slots: Vec<JewelSlots>,
    /// Level-independent attributes.
    pub fixed_attributes: FixedAttributes,
    /// Perks unlocked by this style.
    pub perks: Vec<String>,
    /// Every perk this style may use, its own perks included.
    pub usable_perks: Vec<String>,
    /// Actions of this style.
    pub actions: Vec<String>,
    /// Rendered model.
    pub view_model: String,
}

impl Template for Style {
    const PREFIX: IdPrefix = IdPrefix::Style;
    const KIND: &'static str = "Style";
    type Args = StyleArgs;

    fn build(id: &str, args: &StyleArgs) -> Result<Self> {
        let at = |field: &str| field_at(id, field);
        let perks = parse_id_array(&args.perks, IdPrefix::Perk, &at("perks"), &IdArrayOpts::default())?;

        let mut all_perks = args.usable_perks.clone();
        for perk in &args.perks {
            if !all_perks.contains(perk) {
                all_perks.push(perk.clone());
            }
        }
        let usable_perks = parse_id_array(&all_perks, IdPrefix::Perk, &at("usable_perks"), &IdArrayOpts::default())?;

        Ok(Self {
            id: id.to_owned(),
            name: parse_string(&args.name, &at("name"), &StrOpts::max_len(MAX_NAME_LEN))?,
            character: parse_id(&args.character, IdPrefix::Character, &at("character"))?,
            attributes: parse_attribute_table(
                &args.attributes,
                &[AttributeGroup::Primary, AttributeGroup::Secondary],
                &at("attributes"),
                &FloatArrayOpts::default(),
            )?,
            slots: parse_jewel_slots_array(&args.slots, &at("slots"), ArrayOpts::default())?,
            fixed_attributes: FixedAttributes::parse(&args.fixed_attributes, &at("fixed_attributes"))?,
            perks,
            usable_perks,
            actions: parse_id_array(&args.actions, IdPrefix::Action, &at("actions"), &IdArrayOpts::default())?,
            view_model: parse_file(&args.view_model, &at("view_model"), &FileOpts::extensions(&[".vrm"]))?,
        })
    }

    fn verify(&self, reg: &Registry) -> Result<()> {
        let at = |field: &str| field_at(&self.id, field);
        let character = reg.find_as::<Character>(&self.character, &at("character"))?;
        if !character.styles.contains(&self.id) {
            return Err(TemplateError::integrity(at("character"), "Character and Style mismatch"));
        }

        let levels = level_count(character.level);
        if self.attributes.values().any(|values| values.len() != levels) {
            return Err(TemplateError::integrity(at("attributes"), format!("len must = {levels}")));
        }

        for (idx, perk_id) in self.perks.iter().enumerate() {
            let perk_at = at(&format!("perks[{idx}]"));
            let perk = reg.find_as::<Perk>(perk_id, &perk_at)?;
            if perk.style != self.id {
                return Err(TemplateError::integrity(perk_at, "Style and Perk mismatch"));
            }
        }

        for (idx, perk_id) in self.usable_perks.iter().enumerate() {
            let perk_at = at(&format!("usable_perks[{idx}]"));
            let perk = reg.find_as::<Perk>(perk_id, &perk_at)?;
            if !perk.usable_styles.contains(&self.id) {
                return Err(TemplateError::integrity(perk_at, "Style and Perk mismatch"));
            }
        }

        for (idx, action_id) in self.actions.iter().enumerate() {
            let action_at = at(&format!("actions[{idx}]"));
            let action = reg.find_action(action_id, &action_at)?;
            if !action.styles.contains(&self.id) {
                return Err(TemplateError::integrity(action_at, "Style and Action mismatch"));
            }
        }
        Ok(())
    }
}
