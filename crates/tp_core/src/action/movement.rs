//! Locomotion: walk, run and dash with their start, turn and stop clips.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    assign_local_ids, parse_action_level, ActionBase, Animation, AnimationArgs, AnimationOpts, LEVEL_MOVE,
};
use crate::common::{
    check_array, field_at, parse_angle_xz_range, parse_bool, parse_float, parse_id_array, parse_time,
    ArrayOpts, FloatOpts, IdArrayOpts, IdPrefix, TimeOpts,
};
use crate::config::FPS;
use crate::error::{Result, TemplateError};
use crate::registry::{FromResource, Registry, Template};
use crate::template::{name_enum, present};

name_enum! {
    /// Key that enters a move action.
    MoveEnterKey, "must include Run,Walk,Dash" {
        /// Run.
        Run,
        /// Walk.
        Walk,
        /// Dash.
        Dash,
    }
}

const ROOT_MOTION: AnimationOpts = AnimationOpts::root_motion(true);
const MIN_TIME: TimeOpts = TimeOpts::at_least(0.0);

/// Time field with a default used when absent.
fn time_or(raw: &Value, at: &str, default: f64, opts: TimeOpts) -> Result<f64> {
    match present(raw) {
        None => Ok(default),
        Some(raw) => parse_time(raw, at, opts),
    }
}

/// Raw start clip input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionMoveStartArgs {
    /// The clip.
    pub anim: AnimationArgs,
    /// XZ angle range of the input that selects this clip.
    pub enter_angle: Value,
    /// End of the in-place turn at the beginning.
    #[serde(default)]
    pub turn_in_place_end: Value,
    /// End of the window where a quick stop is possible.
    #[serde(default)]
    pub quick_stop_end: Value,
}

/// Clip played when starting to move.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionMoveStart {
    /// The clip.
    #[serde(flatten)]
    pub anim: Animation,
    /// XZ angle range in radians.
    pub enter_angle: [f64; 2],
    /// End of the in-place turn, in seconds.
    pub turn_in_place_end: f64,
    /// End of the quick stop window, in seconds.
    pub quick_stop_end: f64,
}

impl ActionMoveStart {
    /// Validate a start clip; `quick_stop_end` defaults to half the clip.
    pub fn parse(args: &ActionMoveStartArgs, at: &str) -> Result<Self> {
        let anim = Animation::parse(&args.anim, at, ROOT_MOTION)?;
        Ok(Self {
            enter_angle: parse_angle_xz_range(&args.enter_angle, &format!("{at}.enter_angle"), FloatOpts::default())?,
            turn_in_place_end: time_or(&args.turn_in_place_end, &format!("{at}.turn_in_place_end"), 0.0, MIN_TIME)?,
            quick_stop_end: time_or(
                &args.quick_stop_end,
                &format!("{at}.quick_stop_end"),
                anim.duration / 2.0,
                MIN_TIME,
            )?,
            anim,
        })
    }
}

/// Raw turn clip input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionMoveTurnArgs {
    /// The clip.
    pub anim: AnimationArgs,
    /// XZ angle range of the input that selects this clip.
    pub enter_angle: Value,
    /// End of the in-place turn at the beginning.
    #[serde(default)]
    pub turn_in_place_end: Value,
}

/// Clip played when turning while moving.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionMoveTurn {
    /// The clip.
    #[serde(flatten)]
    pub anim: Animation,
    /// XZ angle range in radians.
    pub enter_angle: [f64; 2],
    /// End of the in-place turn, in seconds.
    pub turn_in_place_end: f64,
}

impl ActionMoveTurn {
    /// Validate a turn clip.
    pub fn parse(args: &ActionMoveTurnArgs, at: &str) -> Result<Self> {
        let anim = Animation::parse(&args.anim, at, ROOT_MOTION)?;
        Ok(Self {
            enter_angle: parse_angle_xz_range(&args.enter_angle, &format!("{at}.enter_angle"), FloatOpts::default())?,
            turn_in_place_end: time_or(
                &args.turn_in_place_end,
                &format!("{at}.turn_in_place_end"),
                0.0,
                TimeOpts::between(0.0, anim.duration),
            )?,
            anim,
        })
    }
}

/// Raw stop clip input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionMoveStopArgs {
    /// The clip.
    pub anim: AnimationArgs,
    /// `[begin phase, end phase, clip offset]` rows.
    pub enter_phase_table: Value,
    /// End of the slow down.
    pub speed_down_end: Value,
}

/// Clip played when stopping.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionMoveStop {
    /// The clip.
    #[serde(flatten)]
    pub anim: Animation,
    /// Walk cycle phase ranges mapped to clip offsets.
    pub enter_phase_table: Vec<[f64; 3]>,
    /// End of the slow down, in seconds.
    pub speed_down_end: f64,
}

fn parse_phase_table(raw: &Value, at: &str, duration: f64) -> Result<Vec<[f64; 3]>> {
    let phase = FloatOpts::between(0.0, 1.0);
    check_array(raw, at, ArrayOpts::at_least(1))?
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let row_at = format!("{at}[{idx}]");
            let cells = check_array(row, &row_at, ArrayOpts::exact(3))?;
            Ok([
                parse_float(&cells[0], &format!("{row_at}[0]"), phase)?,
                parse_float(&cells[1], &format!("{row_at}[1]"), phase)?,
                parse_time(&cells[2], &format!("{row_at}[2]"), TimeOpts::between(0.0, duration))?,
            ])
        })
        .collect()
}

impl ActionMoveStop {
    /// Validate a stop clip.
    pub fn parse(args: &ActionMoveStopArgs, at: &str) -> Result<Self> {
        let anim = Animation::parse(&args.anim, at, ROOT_MOTION)?;
        Ok(Self {
            enter_phase_table: parse_phase_table(
                &args.enter_phase_table,
                &format!("{at}.enter_phase_table"),
                anim.duration,
            )?,
            speed_down_end: parse_time(&args.speed_down_end, &format!("{at}.speed_down_end"), MIN_TIME)?,
            anim,
        })
    }
}

/// Raw move action input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionMoveArgs {
    /// Whether the action can be used.
    #[serde(default)]
    pub enabled: Value,
    /// Owning character.
    pub character: String,
    /// Styles that can use this action.
    pub styles: Vec<String>,
    /// `Run`, `Walk` or `Dash`.
    pub enter_key: String,
    /// Enter level.
    #[serde(default)]
    pub enter_level: Value,
    /// Derive level while moving.
    #[serde(default)]
    pub derive_level: Value,
    /// Derive level during in-place turns and slow downs.
    #[serde(default)]
    pub special_derive_level: Value,
    /// Forward loop.
    pub anim_move: AnimationArgs,
    /// Speed of `anim_move` in m/s; scales every clip of the action.
    pub move_speed: Value,
    /// Start clips.
    #[serde(default)]
    pub starts: Vec<ActionMoveStartArgs>,
    /// Start time when no start clip matches.
    #[serde(default)]
    pub start_time: Value,
    /// Turn clips.
    #[serde(default)]
    pub turns: Vec<ActionMoveTurnArgs>,
    /// Time of a 180 degree turn when no turn clip matches.
    #[serde(default)]
    pub turn_time: Value,
    /// Stop clips.
    #[serde(default)]
    pub stops: Vec<ActionMoveStopArgs>,
    /// Stop time when no stop clip matches.
    #[serde(default)]
    pub stop_time: Value,
    /// Quick stop time.
    #[serde(default)]
    pub quick_stop_time: Value,
    /// Keep the derives of the previous action.
    #[serde(default)]
    pub derive_keeping: Value,
    /// Move actions that hand over without replaying a start clip.
    #[serde(default)]
    pub smooth_move_froms: Vec<String>,
    /// Duration of the smooth hand over.
    #[serde(default)]
    pub smooth_move_duration: Value,
}

/// A locomotion action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionMove {
    /// Resource id.
    pub id: String,
    /// Shared action fields.
    #[serde(flatten)]
    pub base: ActionBase,
    /// Enter key.
    pub enter_key: MoveEnterKey,
    /// Enter level.
    pub enter_level: i64,
    /// Derive level while moving.
    pub derive_level: i64,
    /// Derive level during in-place turns and slow downs.
    pub special_derive_level: i64,
    /// Forward loop.
    pub anim_move: Animation,
    /// Speed in m/s.
    pub move_speed: f64,
    /// Start clips.
    pub starts: Vec<ActionMoveStart>,
    /// Start time in seconds.
    pub start_time: f64,
    /// Turn clips.
    pub turns: Vec<ActionMoveTurn>,
    /// Time of a 180 degree turn in seconds.
    pub turn_time: f64,
    /// Stop clips.
    pub stops: Vec<ActionMoveStop>,
    /// Stop time in seconds.
    pub stop_time: f64,
    /// Quick stop time in seconds.
    pub quick_stop_time: f64,
    /// Keep the derives of the previous action.
    pub derive_keeping: bool,
    /// Always 0.
    pub poise_level: i64,
    /// Move actions that hand over smoothly.
    pub smooth_move_froms: Vec<String>,
    /// Duration of the smooth hand over in seconds.
    pub smooth_move_duration: f64,
}

fn level_or(raw: &Value, at: &str, default: i64) -> Result<i64> {
    match present(raw) {
        None => Ok(default),
        Some(raw) => parse_action_level(raw, at),
    }
}

impl Template for ActionMove {
    const PREFIX: IdPrefix = IdPrefix::Action;
    const KIND: &'static str = "ActionMove";
    type Args = ActionMoveArgs;

    fn build(id: &str, args: &ActionMoveArgs) -> Result<Self> {
        let at = |field: &str| field_at(id, field);
        let base = ActionBase::parse(id, &args.enabled, &args.character, &args.styles)?;
        let enter_key = MoveEnterKey::parse(&args.enter_key, &at("enter_key"))?;

        let mut anim_move = Animation::parse(&args.anim_move, &at("anim_move"), ROOT_MOTION)?;
        let mut starts = args
            .starts
            .iter()
            .enumerate()
            .map(|(idx, start)| ActionMoveStart::parse(start, &at(&format!("starts[{idx}]"))))
            .collect::<Result<Vec<_>>>()?;
        let mut turns = args
            .turns
            .iter()
            .enumerate()
            .map(|(idx, turn)| ActionMoveTurn::parse(turn, &at(&format!("turns[{idx}]"))))
            .collect::<Result<Vec<_>>>()?;
        let mut stops = args
            .stops
            .iter()
            .enumerate()
            .map(|(idx, stop)| ActionMoveStop::parse(stop, &at(&format!("stops[{idx}]"))))
            .collect::<Result<Vec<_>>>()?;
        assign_local_ids(
            std::iter::once(&mut anim_move)
                .chain(starts.iter_mut().map(|start| &mut start.anim))
                .chain(turns.iter_mut().map(|turn| &mut turn.anim))
                .chain(stops.iter_mut().map(|stop| &mut stop.anim))
                .map(Some),
        );

        let derive_keeping = match present(&args.derive_keeping) {
            None => true,
            Some(raw) => parse_bool(raw, &at("derive_keeping"))?,
        };

        Ok(Self {
            id: id.to_owned(),
            base,
            enter_key,
            enter_level: level_or(&args.enter_level, &at("enter_level"), LEVEL_MOVE)?,
            derive_level: level_or(&args.derive_level, &at("derive_level"), LEVEL_MOVE - 10)?,
            special_derive_level: level_or(&args.special_derive_level, &at("special_derive_level"), LEVEL_MOVE + 10)?,
            anim_move,
            move_speed: parse_float(&args.move_speed, &at("move_speed"), FloatOpts::between(0.0, 1000.0))?,
            starts,
            start_time: time_or(&args.start_time, &at("start_time"), 4.0 / FPS, MIN_TIME)?,
            turns,
            turn_time: time_or(&args.turn_time, &at("turn_time"), 10.0 / FPS, MIN_TIME)?,
            stops,
            stop_time: time_or(&args.stop_time, &at("stop_time"), 6.0 / FPS, MIN_TIME)?,
            quick_stop_time: time_or(&args.quick_stop_time, &at("quick_stop_time"), 0.0, MIN_TIME)?,
            derive_keeping,
            poise_level: 0,
            smooth_move_froms: parse_id_array(
                &args.smooth_move_froms,
                IdPrefix::Action,
                &at("smooth_move_froms"),
                &IdArrayOpts::default(),
            )?,
            smooth_move_duration: time_or(
                &args.smooth_move_duration,
                &at("smooth_move_duration"),
                10.0 / FPS,
                MIN_TIME,
            )?,
        })
    }

    fn verify(&self, reg: &Registry) -> Result<()> {
        self.base.verify(&self.id, reg)?;
        for (idx, id) in self.smooth_move_froms.iter().enumerate() {
            let from_at = field_at(&self.id, &format!("smooth_move_froms[{idx}]"));
            let res = reg.find(id, &from_at)?;
            if Self::from_resource(res).is_none() {
                return Err(TemplateError::integrity(from_at, "must be ActionMove"));
            }
        }
        Ok(())
    }
}
