//! Animation clips referenced by actions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{parse_bool, parse_file, parse_time, FileOpts, TimeOpts};
use crate::error::{Result, TemplateError};

/// Local id of a clip not yet placed in an action.
pub const UNASSIGNED_LOCAL_ID: u16 = u16::MAX;

const DEFAULT_FADE_IN: f64 = 0.1;

/// Raw clip input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimationArgs {
    /// Path prefix shared by the clip files (logic, view, root motion, weapon motion).
    pub files: String,
    /// Clip length.
    #[serde(default)]
    pub duration: Value,
    /// Blend-in time, 0.1s when absent.
    #[serde(default)]
    pub fade_in: Value,
    /// Drive movement from the clip's root motion.
    #[serde(default)]
    pub root_motion: Value,
    /// Record the weapon trail.
    #[serde(default)]
    pub weapon_motion: Value,
}

/// Requirements a consumer puts on a clip.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnimationOpts {
    /// Required root motion setting.
    pub root_motion: Option<bool>,
    /// Required weapon motion setting.
    pub weapon_motion: Option<bool>,
}

impl AnimationOpts {
    /// Require root motion on or off.
    #[must_use]
    pub const fn root_motion(enabled: bool) -> Self {
        Self {
            root_motion: Some(enabled),
            weapon_motion: None,
        }
    }
}

/// A validated clip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Animation {
    /// Path prefix of the clip files.
    pub files: String,
    /// Position inside the owning action.
    pub local_id: u16,
    /// Clip length in seconds; the clip is scaled to fit.
    pub duration: f64,
    /// Blend-in time in seconds.
    pub fade_in: f64,
    /// Root motion enabled.
    pub root_motion: bool,
    /// Weapon motion enabled.
    pub weapon_motion: bool,
}

fn parse_flag(raw: &Value, at: &str, required: Option<bool>) -> Result<bool> {
    let value = match raw {
        Value::Null => false,
        raw => parse_bool(raw, at)?,
    };
    match required {
        Some(required) if required != value => Err(TemplateError::field(at, format!("must be {required}"))),
        _ => Ok(value),
    }
}

impl Animation {
    /// Validate a clip.
    pub fn parse(args: &AnimationArgs, at: &str, opts: AnimationOpts) -> Result<Self> {
        let files = parse_file(&args.files, &format!("{at}.files"), &FileOpts::default())?;
        let duration = parse_time(&args.duration, &format!("{at}.duration"), TimeOpts::at_least(0.0))?;
        let fade_in = match &args.fade_in {
            Value::Null => DEFAULT_FADE_IN,
            raw => parse_time(raw, &format!("{at}.fade_in"), TimeOpts::at_least(0.0))?,
        };
        Ok(Self {
            files,
            local_id: UNASSIGNED_LOCAL_ID,
            duration,
            fade_in,
            root_motion: parse_flag(&args.root_motion, &format!("{at}.root_motion"), opts.root_motion)?,
            weapon_motion: parse_flag(&args.weapon_motion, &format!("{at}.weapon_motion"), opts.weapon_motion)?,
        })
    }
}

/// Number clips by slot. Empty slots keep their position, so optional clips
/// do not shift the ids of the clips after them.
pub fn assign_local_ids<'a, I>(slots: I)
where
    I: IntoIterator<Item = Option<&'a mut Animation>>,
{
    for (pos, slot) in slots.into_iter().enumerate() {
        if let Some(anim) = slot {
            anim.local_id = u16::try_from(pos).unwrap_or(UNASSIGNED_LOCAL_ID);
        }
    }
}
