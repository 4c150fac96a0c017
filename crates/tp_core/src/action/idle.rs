//! Standing still.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{assign_local_ids, ActionBase, Animation, AnimationArgs, AnimationOpts, LEVEL_IDLE};
use crate::common::{field_at, parse_bool, parse_time, IdPrefix, TimeOpts};
use crate::error::Result;
use crate::registry::{Registry, Template};

const DEFAULT_AUTO_IDLE_DELAY: f64 = 10.0;

/// Raw idle action input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionIdleArgs {
    /// Whether the action can be used.
    #[serde(default)]
    pub enabled: Value,
    /// Owning character.
    pub character: String,
    /// Styles that can use this action.
    pub styles: Vec<String>,
    /// Out of combat stance.
    pub anim_idle: AnimationArgs,
    /// Combat stance.
    #[serde(default)]
    pub anim_ready: Option<AnimationArgs>,
    /// Random fidgets played out of combat.
    #[serde(default)]
    pub anim_randoms: Option<Vec<AnimationArgs>>,
    /// Delay before the combat stance falls back to idle.
    #[serde(default)]
    pub auto_idle_delay: Value,
    /// Keep the derives of the previous action.
    #[serde(default)]
    pub derive_keeping: Value,
}

/// The default action of a style.
#[derive(Debug, Clone, Serialize)]
pub struct ActionIdle {
    /// Resource id.
    pub id: String,
    /// Shared action fields.
    #[serde(flatten)]
    pub base: ActionBase,
    /// Out of combat stance.
    pub anim_idle: Animation,
    /// Combat stance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anim_ready: Option<Animation>,
    /// Random fidgets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anim_randoms: Option<Vec<Animation>>,
    /// Delay before falling back to idle, in seconds.
    pub auto_idle_delay: f64,
    /// Always [`LEVEL_IDLE`].
    pub enter_level: i64,
    /// Always [`LEVEL_IDLE`].
    pub derive_level: i64,
    /// Keep the derives of the previous action.
    pub derive_keeping: bool,
    /// Always 0.
    pub poise_level: i64,
}

impl Template for ActionIdle {
    const PREFIX: IdPrefix = IdPrefix::Action;
    const KIND: &'static str = "ActionIdle";
    type Args = ActionIdleArgs;

    fn build(id: &str, args: &ActionIdleArgs) -> Result<Self> {
        let at = |field: &str| field_at(id, field);
        let base = ActionBase::parse(id, &args.enabled, &args.character, &args.styles)?;
        let still = AnimationOpts::root_motion(false);

        let mut anim_idle = Animation::parse(&args.anim_idle, &at("anim_idle"), still)?;
        let mut anim_ready = args
            .anim_ready
            .as_ref()
            .map(|anim| Animation::parse(anim, &at("anim_ready"), still))
            .transpose()?;
        let mut anim_randoms = args
            .anim_randoms
            .as_ref()
            .map(|anims| {
                anims
                    .iter()
                    .enumerate()
                    .map(|(idx, anim)| Animation::parse(anim, &at(&format!("anim_randoms[{idx}]")), still))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        assign_local_ids(
            [Some(&mut anim_idle), anim_ready.as_mut()]
                .into_iter()
                .chain(anim_randoms.iter_mut().flatten().map(Some)),
        );

        let auto_idle_delay = match &args.auto_idle_delay {
            Value::Null => DEFAULT_AUTO_IDLE_DELAY,
            raw => parse_time(raw, &at("auto_idle_delay"), TimeOpts::at_least(0.0))?,
        };
        let derive_keeping = match &args.derive_keeping {
            Value::Null => true,
            raw => parse_bool(raw, &at("derive_keeping"))?,
        };

        Ok(Self {
            id: id.to_owned(),
            base,
            anim_idle,
            anim_ready,
            anim_randoms,
            auto_idle_delay,
            enter_level: LEVEL_IDLE,
            derive_level: LEVEL_IDLE,
            derive_keeping,
            poise_level: 0,
        })
    }

    fn verify(&self, reg: &Registry) -> Result<()> {
        self.base.verify(&self.id, reg)
    }
}
