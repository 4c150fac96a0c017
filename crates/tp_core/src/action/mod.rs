//! Actions: everything a character can do, from standing still to attacking.
//!
//! Every action kind shares an [`ActionBase`] (owner, usable styles, enable
//! switch). Entering and leaving actions is decided by comparing levels: an
//! action is entered when its enter level beats the current action's derive
//! level.

mod animation;
mod general;
mod idle;
mod keys;
mod movement;

use serde::Serialize;
use serde_json::Value;

pub use animation::{assign_local_ids, Animation, AnimationArgs, AnimationOpts, UNASSIGNED_LOCAL_ID};
pub use general::{ActionGeneral, ActionGeneralArgs, InputMovement, RootMotionInput, RotationInput};
pub use idle::{ActionIdle, ActionIdleArgs};
pub use keys::{
    parse_derive_rules, parse_virtual_key, verify_derive_rules, DeriveRule, DeriveRuleArgs, KeyGroups,
    VirtualDir, VirtualDirKind, VirtualKey, VirtualKeyDir,
};
pub use movement::{
    ActionMove, ActionMoveArgs, ActionMoveStart, ActionMoveStartArgs, ActionMoveStop, ActionMoveStopArgs,
    ActionMoveTurn, ActionMoveTurnArgs, MoveEnterKey,
};

use crate::common::{
    field_at, parse_array, parse_id, parse_id_array, parse_int, FloatOpts, IdArrayOpts, IdPrefix, IntOpts,
};
use crate::error::{Result, TemplateError};
use crate::registry::Registry;
use crate::template::{name_enum, Character, Style};
use crate::variable::{
    parse_var_bool, parse_var_float, parse_var_int, parse_var_value, verify_var_value, VarConsumers, VarOpts,
    VarValue,
};

/// Idle: anything may be entered.
pub const LEVEL_IDLE: i64 = 0;
/// Moving, slightly above idle.
pub const LEVEL_MOVE: i64 = 50;
/// Recovery of a normal attack.
pub const LEVEL_ATTACK: i64 = 100;
/// Recovery of a skill.
pub const LEVEL_SKILL: i64 = 200;
/// High priority derives.
pub const LEVEL_DERIVE: i64 = 300;
/// Recovery of an ultimate.
pub const LEVEL_ULTIMATE: i64 = 400;
/// Startup and active frames of any action.
pub const LEVEL_ACTION: i64 = 500;
/// Cannot be interrupted.
pub const LEVEL_UNBREAKABLE: i64 = 600;

const LEVEL_OPTS: IntOpts = IntOpts::between(LEVEL_IDLE, LEVEL_UNBREAKABLE);

/// Parse an action level.
pub fn parse_action_level(raw: &Value, at: &str) -> Result<i64> {
    parse_int(raw, at, LEVEL_OPTS)
}

/// Parse a Var-capable action level.
pub fn parse_var_action_level(raw: &Value, at: &str) -> Result<VarValue<i64>> {
    parse_var_int(raw, at, VarOpts::default(), LEVEL_OPTS)
}

/// Fields shared by every action kind.
#[derive(Debug, Clone, Serialize)]
pub struct ActionBase {
    /// Whether the action can be used.
    pub enabled: VarValue<bool>,
    /// Owning character.
    pub character: String,
    /// Styles that can use this action.
    pub styles: Vec<String>,
}

impl ActionBase {
    /// Validate the shared fields of action `id`. A missing `enabled` means `true`.
    pub fn parse(id: &str, enabled: &Value, character: &str, styles: &[String]) -> Result<Self> {
        let at = |field: &str| field_at(id, field);
        let enabled = match enabled {
            Value::Null => VarValue::Fixed(true),
            raw => parse_var_bool(raw, &at("enabled"), VarOpts::default())?,
        };
        Ok(Self {
            enabled,
            character: parse_id(character, IdPrefix::Character, &at("character"))?,
            styles: parse_id_array(styles, IdPrefix::Style, &at("styles"), &IdArrayOpts::default())?,
        })
    }

    /// Check the owner and the styles of action `id`.
    pub fn verify(&self, id: &str, reg: &Registry) -> Result<()> {
        let at = |field: &str| field_at(id, field);
        verify_var_value(reg, &self.enabled, self.consumers(), &at("enabled"))?;
        reg.find_as::<Character>(&self.character, &at("character"))?;
        for (idx, style_id) in self.styles.iter().enumerate() {
            let style_at = at(&format!("styles[{idx}]"));
            let style = reg.find_as::<Style>(style_id, &style_at)?;
            if style.character != self.character {
                return Err(TemplateError::integrity(style_at, "character mismatch with styles"));
            }
            if !style.actions.iter().any(|action| action == id) {
                return Err(TemplateError::integrity(style_at, "Style and Action mismatch"));
            }
        }
        Ok(())
    }

    /// Variables in this action are read on behalf of its styles.
    #[must_use]
    pub fn consumers(&self) -> VarConsumers<'_> {
        VarConsumers::styles(&self.styles)
    }
}

name_enum! {
    /// Actions that may be inserted without cancelling pending derives.
    DeriveContinue, "must be a DeriveContinue" {
        /// Dodge.
        Dodge,
        /// Dodge with perfect timing.
        PerfectDodge,
        /// Guard.
        Guard,
        /// Guard with perfect timing.
        PerfectGuard,
    }
}

fn parse_derive_continue(raw: &Value, at: &str) -> Result<DeriveContinue> {
    let name = raw
        .as_str()
        .ok_or_else(|| TemplateError::field(at, "must be a DeriveContinue"))?;
    DeriveContinue::parse(name, at)
}

/// Parse a list of [`DeriveContinue`].
pub fn parse_derive_continue_set(raw: &Value, at: &str) -> Result<Vec<DeriveContinue>> {
    parse_array(raw, at, crate::common::ArrayOpts::default(), parse_derive_continue)
}

/// Parse a Var-capable list of [`DeriveContinue`].
pub fn parse_var_derive_continue_set(raw: &Value, at: &str) -> Result<VarValue<Vec<DeriveContinue>>> {
    parse_var_value(raw, at, VarOpts::default(), parse_derive_continue_set, |raw, at, array| {
        parse_array(raw, at, array, parse_derive_continue_set)
    })
}

/// Damage modifiers of one action phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionAttributes {
    /// Damage reduction ratio.
    pub damage_rdc: VarValue<f64>,
    /// Shield damage reduction ratio.
    pub shield_dmg_rdc: VarValue<f64>,
    /// Poise level, 0 to 4.
    pub poise_level: VarValue<i64>,
}

impl Default for ActionAttributes {
    fn default() -> Self {
        Self {
            damage_rdc: VarValue::Fixed(0.0),
            shield_dmg_rdc: VarValue::Fixed(0.0),
            poise_level: VarValue::Fixed(0),
        }
    }
}

impl ActionAttributes {
    /// Parse from an object; missing fields are zero and other keys are ignored.
    pub fn parse(raw: &Value, at: &str) -> Result<Self> {
        if !raw.is_object() {
            return Err(TemplateError::field(at, "must be a object"));
        }
        let field = |name: &str| raw.get(name).filter(|value| !value.is_null());
        let float = |name: &str| -> Result<VarValue<f64>> {
            field(name).map_or(Ok(VarValue::Fixed(0.0)), |value| {
                parse_var_float(value, &format!("{at}.{name}"), VarOpts::default(), FloatOpts::default())
            })
        };
        Ok(Self {
            damage_rdc: float("damage_rdc")?,
            shield_dmg_rdc: float("shield_dmg_rdc")?,
            poise_level: field("poise_level").map_or(Ok(VarValue::Fixed(0)), |value| {
                parse_var_int(
                    value,
                    &format!("{at}.poise_level"),
                    VarOpts::default(),
                    IntOpts::between(0, 4),
                )
            })?,
        })
    }

    /// Check every variable binding.
    pub fn verify(&self, reg: &Registry, consumers: VarConsumers<'_>, at: &str) -> Result<()> {
        verify_var_value(reg, &self.damage_rdc, consumers, &format!("{at}.damage_rdc"))?;
        verify_var_value(reg, &self.shield_dmg_rdc, consumers, &format!("{at}.shield_dmg_rdc"))?;
        verify_var_value(reg, &self.poise_level, consumers, &format!("{at}.poise_level"))
    }
}
