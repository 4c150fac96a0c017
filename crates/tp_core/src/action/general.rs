//! Single-shot actions: attacks, skills, dodges.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    assign_local_ids, parse_action_level, parse_derive_rules, parse_var_action_level, parse_var_derive_continue_set,
    verify_derive_rules, ActionAttributes, ActionBase, Animation, AnimationArgs, AnimationOpts, DeriveContinue,
    DeriveRule, DeriveRuleArgs, VirtualKeyDir, LEVEL_IDLE,
};
use crate::common::{
    field_at, parse_angle_xz, parse_array, parse_bool, parse_string_value, parse_time, FloatOpts, IdPrefix,
    IntOpts, StrOpts, TimeOpts,
};
use crate::config::DERIVE_TAIL;
use crate::error::{Result, TemplateError};
use crate::registry::{Registry, Template};
use crate::template::present;
use crate::timeline::{FragmentOpts, TimelinePoint, TimelineRange};
use crate::variable::{
    parse_var_float, parse_var_int, parse_var_value, verify_var_value, VarOpts, VarValue,
};

/// Root motion tracks driven by player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RootMotionInput {
    /// Follow the `Move` track.
    #[serde(rename = "move")]
    pub move_track: bool,
    /// Follow the `MoveEx` track.
    #[serde(rename = "move_ex")]
    pub move_ex_track: bool,
}

/// Turn toward the input direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RotationInput {
    /// Time to finish the turn, in seconds.
    pub duration: f64,
    /// Half width of the accepted input cone, in radians. Negative reverses the input.
    pub angle: f64,
}

/// Input controlled movement starting at some point of an action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "T")]
pub enum InputMovement {
    /// Root motion.
    RootMotion(RootMotionInput),
    /// Rotation.
    Rotation(RotationInput),
}

impl InputMovement {
    /// Parse from an object with `move`/`move_ex` or `duration`/`angle`.
    pub fn parse(raw: &Value, at: &str) -> Result<Self> {
        let field = |name: &str| raw.get(name).filter(|value| !value.is_null());
        let flag = |name: &str| field(name).map_or(Ok(false), |value| parse_bool(value, &format!("{at}.{name}")));

        if field("move").is_some() || field("move_ex").is_some() {
            return Ok(Self::RootMotion(RootMotionInput {
                move_track: flag("move")?,
                move_ex_track: flag("move_ex")?,
            }));
        }
        if let Some(angle) = field("angle") {
            return Ok(Self::Rotation(RotationInput {
                duration: parse_time(
                    raw.get("duration").unwrap_or(&Value::Null),
                    &format!("{at}.duration"),
                    TimeOpts::between(0.0, 1000.0),
                )?,
                angle: parse_angle_xz(angle, &format!("{at}.angle"), FloatOpts::default())?,
            }));
        }
        Err(TemplateError::field(at, "invalid input movement"))
    }
}

/// Raw general action input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionGeneralArgs {
    /// Whether the action can be used.
    #[serde(default)]
    pub enabled: Value,
    /// Owning character.
    pub character: String,
    /// Styles that can use this action.
    pub styles: Vec<String>,
    /// The clip, root motion required.
    pub anim_main: AnimationArgs,
    /// Key that enters this action from anywhere.
    #[serde(default)]
    pub enter_key: Value,
    /// Enter level, [`LEVEL_IDLE`] when absent.
    #[serde(default)]
    pub enter_level: Value,
    /// Time to recover one charge.
    #[serde(default)]
    pub cool_down_time: Value,
    /// Charges that can be stored.
    #[serde(default)]
    pub cool_down_round: Value,
    /// Charges at start, `cool_down_round` when absent.
    #[serde(default)]
    pub cool_down_init_round: Value,
    /// Input controlled movement over time.
    #[serde(default)]
    pub input_movements: Value,
    /// Damage modifiers per phase.
    pub attributes: Value,
    /// Derive levels per phase, possibly outliving the clip.
    pub derive_levels: Value,
    /// Derives available only inside this action.
    #[serde(default)]
    pub derives: Option<Vec<DeriveRuleArgs>>,
    /// Actions that keep pending derives alive.
    #[serde(default)]
    pub derive_continues: Value,
    /// Script events fired over time.
    #[serde(default)]
    pub custom_events: Value,
}

/// The common attack or skill.
#[derive(Debug, Clone, Serialize)]
pub struct ActionGeneral {
    /// Resource id.
    pub id: String,
    /// Shared action fields.
    #[serde(flatten)]
    pub base: ActionBase,
    /// The clip.
    pub anim_main: Animation,
    /// Key that enters this action from anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enter_key: Option<VirtualKeyDir>,
    /// Enter level.
    pub enter_level: i64,
    /// Time to recover one charge, in seconds.
    pub cool_down_time: VarValue<f64>,
    /// Charges that can be stored.
    pub cool_down_round: VarValue<i64>,
    /// Charges at start.
    pub cool_down_init_round: VarValue<i64>,
    /// Input controlled movement over time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_movements: Option<TimelinePoint<InputMovement>>,
    /// Damage modifiers per phase.
    pub attributes: TimelineRange<ActionAttributes>,
    /// Derive levels per phase.
    pub derive_levels: TimelineRange<VarValue<i64>>,
    /// Derives available only inside this action.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derives: Option<Vec<DeriveRule>>,
    /// Actions that keep pending derives alive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub derive_continues: Option<VarValue<Vec<DeriveContinue>>>,
    /// Script events fired over time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_events: Option<TimelinePoint<VarValue<String>>>,
}

fn parse_event(raw: &Value, at: &str) -> Result<VarValue<String>> {
    let text = |raw: &Value, at: &str| parse_string_value(raw, at, &StrOpts::default());
    parse_var_value(raw, at, VarOpts::default(), text, |raw, at, array| {
        parse_array(raw, at, array, text)
    })
}

impl Template for ActionGeneral {
    const PREFIX: IdPrefix = IdPrefix::Action;
    const KIND: &'static str = "ActionGeneral";
    type Args = ActionGeneralArgs;

    fn build(id: &str, args: &ActionGeneralArgs) -> Result<Self> {
        let at = |field: &str| field_at(id, field);
        let base = ActionBase::parse(id, &args.enabled, &args.character, &args.styles)?;
        let mut anim_main = Animation::parse(&args.anim_main, &at("anim_main"), AnimationOpts::root_motion(true))?;
        assign_local_ids([Some(&mut anim_main)]);
        let duration = anim_main.duration;

        let enter_key = present(&args.enter_key)
            .map(|raw| VirtualKeyDir::parse(raw, &at("enter_key")))
            .transpose()?;
        let enter_level = match present(&args.enter_level) {
            None => LEVEL_IDLE,
            Some(raw) => parse_action_level(raw, &at("enter_level"))?,
        };

        let cool_down_time = match present(&args.cool_down_time) {
            None => VarValue::Fixed(0.0),
            Some(raw) => parse_var_float(raw, &at("cool_down_time"), VarOpts::default(), FloatOpts::at_least(0.0))?,
        };
        let round = |raw: &Value, field: &str, min: i64| match present(raw) {
            None => Ok(VarValue::Fixed(1)),
            Some(raw) => parse_var_int(raw, &at(field), VarOpts::default(), IntOpts::at_least(min)),
        };
        let cool_down_round = round(&args.cool_down_round, "cool_down_round", 1)?;
        let cool_down_init_round = match present(&args.cool_down_init_round) {
            Some(raw) => round(raw, "cool_down_init_round", 0)?,
            None => cool_down_round.clone(),
        };

        let input_movements = present(&args.input_movements)
            .map(|raw| TimelinePoint::parse(raw, &at("input_movements"), duration, InputMovement::parse))
            .transpose()?;
        let attributes = TimelineRange::parse(
            &args.attributes,
            &at("attributes"),
            &FragmentOpts::new(duration),
            ActionAttributes::parse,
        )?;
        let derive_levels = TimelineRange::parse(
            &args.derive_levels,
            &at("derive_levels"),
            &FragmentOpts::with_tail(duration, duration + DERIVE_TAIL),
            parse_var_action_level,
        )?;
        let derives = args
            .derives
            .as_deref()
            .map(|rules| parse_derive_rules(rules, &at("derives")))
            .transpose()?;
        let derive_continues = present(&args.derive_continues)
            .map(|raw| parse_var_derive_continue_set(raw, &at("derive_continues")))
            .transpose()?;
        let custom_events = present(&args.custom_events)
            .map(|raw| TimelinePoint::parse(raw, &at("custom_events"), duration, parse_event))
            .transpose()?;

        Ok(Self {
            id: id.to_owned(),
            base,
            anim_main,
            enter_key,
            enter_level,
            cool_down_time,
            cool_down_round,
            cool_down_init_round,
            input_movements,
            attributes,
            derive_levels,
            derives,
            derive_continues,
            custom_events,
        })
    }

    fn verify(&self, reg: &Registry) -> Result<()> {
        let at = |field: &str| field_at(&self.id, field);
        self.base.verify(&self.id, reg)?;
        let consumers = self.base.consumers();

        verify_var_value(reg, &self.cool_down_time, consumers, &at("cool_down_time"))?;
        verify_var_value(reg, &self.cool_down_round, consumers, &at("cool_down_round"))?;
        verify_var_value(reg, &self.cool_down_init_round, consumers, &at("cool_down_init_round"))?;
        for (idx, attrs) in self.attributes.values.iter().enumerate() {
            attrs.verify(reg, consumers, &at(&format!("attributes[{idx}]")))?;
        }
        for (idx, level) in self.derive_levels.values.iter().enumerate() {
            verify_var_value(reg, level, consumers, &at(&format!("derive_levels[{idx}]")))?;
        }
        if let Some(derives) = &self.derives {
            verify_derive_rules(reg, derives, consumers, &at("derives"))?;
        }
        if let Some(continues) = &self.derive_continues {
            verify_var_value(reg, continues, consumers, &at("derive_continues"))?;
        }
        for (idx, (_, event)) in self.custom_events.iter().flat_map(|events| events.pairs.iter()).enumerate() {
            verify_var_value(reg, event, consumers, &at(&format!("custom_events[{idx}]")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args() -> ActionGeneralArgs {
        ActionGeneralArgs {
            character: "Character.Hero".into(),
            styles: vec!["Style.Hero.Blade".into()],
            anim_main: AnimationArgs {
                files: "hero/slash".into(),
                duration: json!("2s"),
                root_motion: json!(true),
                ..AnimationArgs::default()
            },
            enter_key: json!("Attack1"),
            attributes: json!({ "0-1s": { "damage_rdc": "10%" }, "1-2s": {} }),
            derive_levels: json!({ "0-1.5s": 500, "1.5-3s": 100 }),
            ..ActionGeneralArgs::default()
        }
    }

    #[test]
    fn test_general_build() {
        let action = ActionGeneral::build("Action.Hero.Slash", &args()).unwrap();
        assert_eq!(action.anim_main.local_id, 0);
        assert_eq!(action.cool_down_round, VarValue::Fixed(1));
        assert_eq!(action.cool_down_init_round, VarValue::Fixed(1));
        assert_eq!(action.attributes.value_at(0.5).unwrap().damage_rdc, VarValue::Fixed(0.1));
        assert_eq!(action.derive_levels.value_at(2.5), Some(&VarValue::Fixed(100)));
    }

    #[test]
    fn test_init_round_follows_round() {
        let action = ActionGeneral::build(
            "Action.Hero.Slash",
            &ActionGeneralArgs {
                cool_down_round: json!(3),
                ..args()
            },
        )
        .unwrap();
        assert_eq!(action.cool_down_init_round, VarValue::Fixed(3));
    }

    #[test]
    fn test_derive_levels_tail_is_bounded() {
        let err = ActionGeneral::build(
            "Action.Hero.Slash",
            &ActionGeneralArgs {
                derive_levels: json!({ "0-1s": 500, "1-8s": 100 }),
                ..args()
            },
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("<Action.Hero.Slash>.derive_levels"));
    }

    #[test]
    fn test_input_movements() {
        let action = ActionGeneral::build(
            "Action.Hero.Slash",
            &ActionGeneralArgs {
                input_movements: json!({
                    "0.5s": { "move": true },
                    "0s": { "duration": "0.2s", "angle": 90 },
                }),
                ..args()
            },
        )
        .unwrap();
        let moves = action.input_movements.unwrap();
        assert!(matches!(moves.pairs[0].1, InputMovement::Rotation(_)));
        assert_eq!(
            moves.pairs[1].1,
            InputMovement::RootMotion(RootMotionInput {
                move_track: true,
                move_ex_track: false,
            })
        );

        let err = InputMovement::parse(&json!({}), "m").unwrap_err();
        assert_eq!(err.to_string(), "m: invalid input movement");
    }

    #[test]
    fn test_custom_events() {
        let action = ActionGeneral::build(
            "Action.Hero.Slash",
            &ActionGeneralArgs {
                custom_events: json!({ "1s": "Shake", "0.5s": ["#.Hero.Sound", ["Low", "High"]] }),
                ..args()
            },
        )
        .unwrap();
        let events = action.custom_events.unwrap();
        assert_eq!(events.pairs[1], (1.0, VarValue::Fixed("Shake".to_owned())));
    }
}
