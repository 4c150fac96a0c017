//! Virtual input keys, directions and derive rules.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::parse_action_level;
use crate::common::{check_array, parse_float, FloatOpts, IdPrefix};
use crate::error::{Result, TemplateError};
use crate::registry::Registry;
use crate::template::name_enum;
use crate::variable::{parse_var_id, verify_var_value_with, VarConsumers, VarOpts, VarValue};

static DIR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(F|B|L|R|)(\d+\.?\d*)$").expect("dir regex"));

name_enum! {
    /// A logical input, mapped from devices by the runtime.
    VirtualKey, "must be a VirtualKey" {
        /// Move stick.
        Move,
        /// Camera stick.
        View,
        /// Dodge.
        Dodge,
        /// Jump.
        Jump,
        /// Guard.
        Guard,
        /// Interact.
        Interact,
        /// Lock on.
        Lock,
        /// Attack 1.
        Attack1,
        /// Attack 2.
        Attack2,
        /// Attack 3.
        Attack3,
        /// Attack 4.
        Attack4,
        /// Attack 5.
        Attack5,
        /// Attack 6.
        Attack6,
        /// Attack 7.
        Attack7,
        /// Spell.
        Spell,
        /// Shot 1.
        Shot1,
        /// Shot 2.
        Shot2,
        /// Aim.
        Aim,
        /// Switch.
        Switch,
        /// Skill 1.
        Skill1,
        /// Skill 2.
        Skill2,
        /// Skill 3.
        Skill3,
        /// Skill 4.
        Skill4,
        /// Skill 5.
        Skill5,
        /// Skill 6.
        Skill6,
        /// Skill 7.
        Skill7,
        /// Skill 8.
        Skill8,
        /// Derive 1.
        Derive1,
        /// Derive 2.
        Derive2,
        /// Derive 3.
        Derive3,
        /// Just timing of attack 1.
        JustAttack1,
        /// Just timing of attack 2.
        JustAttack2,
        /// Just timing of spell.
        JustSpell,
        /// Just timing of shot 1.
        JustShot1,
        /// Just timing of switch.
        JustSwitch,
        /// Just timing of derive 1.
        JustDerive1,
        /// Just timing of derive 2.
        JustDerive2,
        /// Just timing of derive 3.
        JustDerive3,
        /// Item 1.
        Item1,
        /// Item 2.
        Item2,
        /// Item 3.
        Item3,
        /// Item 4.
        Item4,
        /// Item 5.
        Item5,
        /// Item 6.
        Item6,
        /// Item 7.
        Item7,
        /// Item 8.
        Item8,
        /// Idle event.
        Idle,
        /// Walk event.
        Walk,
        /// Run event.
        Run,
        /// Dash event.
        Dash,
        /// Break event 1.
        Break1,
        /// Break event 2.
        Break2,
        /// Break event 3.
        Break3,
    }
}

/// Key groups a field accepts besides the primary keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyGroups {
    /// `Derive*`.
    pub derive: bool,
    /// `Just*`.
    pub just: bool,
    /// `Item*`.
    pub item: bool,
    /// Event keys (`Idle`, `Walk`, `Run`, `Dash`, `Break*`).
    pub event: bool,
}

impl VirtualKey {
    #[allow(clippy::enum_glob_use)]
    fn group_error(self, groups: KeyGroups) -> Option<&'static str> {
        use VirtualKey::*;
        match self {
            Derive1 | Derive2 | Derive3 if !groups.derive => Some("derive key not supported"),
            JustAttack1 | JustAttack2 | JustSpell | JustShot1 | JustSwitch | JustDerive1 | JustDerive2
            | JustDerive3
                if !groups.just =>
            {
                Some("just key not supported")
            }
            Item1 | Item2 | Item3 | Item4 | Item5 | Item6 | Item7 | Item8 if !groups.item => {
                Some("item key not supported")
            }
            Idle | Walk | Run | Dash | Break1 | Break2 | Break3 if !groups.event => Some("event key not supported"),
            _ => None,
        }
    }
}

/// Parse a key name, rejecting groups not enabled in `groups`.
pub fn parse_virtual_key(raw: &str, at: &str, groups: KeyGroups) -> Result<VirtualKey> {
    let key = VirtualKey::parse(raw, at)?;
    match key.group_error(groups) {
        Some(message) => Err(TemplateError::field(at, message)),
        None => Ok(key),
    }
}

fn parse_virtual_key_value(raw: &Value, at: &str) -> Result<VirtualKey> {
    let name = raw
        .as_str()
        .ok_or_else(|| TemplateError::field(at, "must be a VirtualKey"))?;
    parse_virtual_key(name, at, KeyGroups::default())
}

name_enum! {
    /// Stick direction relative to the character.
    VirtualDirKind, "must be Forward/Backward/Left/Right" {
        /// Forward.
        Forward,
        /// Backward.
        Backward,
        /// Left.
        Left,
        /// Right.
        Right,
    }
}

/// A direction with a tolerance, `"F45"` or `["Forward", 45]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VirtualDir {
    /// Direction.
    pub dir: VirtualDirKind,
    /// Cosine of the tolerance angle, in `[-1, 1]`.
    pub cos: f64,
}

const DIR_ANGLE: FloatOpts = FloatOpts::between(0.0, 180.0);

impl VirtualDir {
    /// Parse a direction.
    pub fn parse(raw: &Value, at: &str) -> Result<Self> {
        let (dir, angle) = match raw {
            Value::String(text) => {
                let caps = DIR_RE
                    .captures(text)
                    .ok_or_else(|| TemplateError::field(at, "must match dir pattern"))?;
                let dir = match &caps[1] {
                    "F" => VirtualDirKind::Forward,
                    "B" => VirtualDirKind::Backward,
                    "L" => VirtualDirKind::Left,
                    "R" => VirtualDirKind::Right,
                    _ => return Err(TemplateError::field(at, "must match dir pattern")),
                };
                (dir, parse_float(&Value::String(caps[2].to_owned()), at, DIR_ANGLE)?)
            }
            raw => {
                let items = check_array(raw, at, crate::common::ArrayOpts::exact(2))?;
                let dir = items[0]
                    .as_str()
                    .ok_or_else(|| TemplateError::field(at, "must be Forward/Backward/Left/Right"))
                    .and_then(|name| VirtualDirKind::parse(name, at))?;
                (dir, parse_float(&items[1], &format!("{at}[1]"), DIR_ANGLE)?)
            }
        };
        Ok(Self {
            dir,
            cos: angle.to_radians().cos(),
        })
    }
}

/// A key, optionally combined with a stick direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualKeyDir {
    /// Key.
    pub key: VirtualKey,
    /// Required direction.
    pub dir: Option<VirtualDir>,
}

impl VirtualKeyDir {
    /// Parse `"Key"` or `["Key", dir]`.
    pub fn parse(raw: &Value, at: &str) -> Result<Self> {
        if raw.is_array() {
            let items = check_array(raw, at, crate::common::ArrayOpts::exact(2))?;
            return Ok(Self {
                key: parse_virtual_key_value(&items[0], &format!("{at}[0]"))?,
                dir: Some(VirtualDir::parse(&items[1], &format!("{at}[1]"))?),
            });
        }
        Ok(Self {
            key: parse_virtual_key_value(raw, at)?,
            dir: None,
        })
    }
}

/// Exported as `[key, dir | null]`.
impl Serialize for VirtualKeyDir {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (self.key, self.dir).serialize(serializer)
    }
}

/// Raw derive rule input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeriveRuleArgs {
    /// Key that triggers the derive.
    pub key: Value,
    /// Enter level of the derive.
    pub level: Value,
    /// Derived action, Var-capable.
    pub action: Value,
}

/// A derive available only inside the current action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeriveRule {
    /// Key that triggers the derive.
    pub key: VirtualKeyDir,
    /// Enter level of the derive.
    pub level: i64,
    /// Derived action.
    pub action: VarValue<String>,
}

impl DeriveRule {
    /// Validate a rule.
    pub fn parse(args: &DeriveRuleArgs, at: &str) -> Result<Self> {
        Ok(Self {
            key: VirtualKeyDir::parse(&args.key, &format!("{at}.key"))?,
            level: parse_action_level(&args.level, &format!("{at}.level"))?,
            action: parse_var_id(&args.action, IdPrefix::Action, &format!("{at}.action"), VarOpts::default())?,
        })
    }
}

/// Validate a list of rules.
pub fn parse_derive_rules(rules: &[DeriveRuleArgs], at: &str) -> Result<Vec<DeriveRule>> {
    rules
        .iter()
        .enumerate()
        .map(|(idx, rule)| DeriveRule::parse(rule, &format!("{at}[{idx}]")))
        .collect()
}

/// Resolve every action a rule may derive to.
pub fn verify_derive_rules(
    reg: &Registry,
    rules: &[DeriveRule],
    consumers: VarConsumers<'_>,
    at: &str,
) -> Result<()> {
    for (idx, rule) in rules.iter().enumerate() {
        let action_at = format!("{at}[{idx}].action");
        match &rule.action {
            VarValue::Fixed(id) => {
                reg.find_action(id, &action_at)?;
            }
            value => verify_var_value_with(reg, value, consumers, &action_at, |id, at| {
                reg.find_action(id, at).map(|_| ())
            })?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_virtual_key_groups() {
        assert_eq!(
            parse_virtual_key("Attack1", "k", KeyGroups::default()).unwrap(),
            VirtualKey::Attack1
        );
        let err = parse_virtual_key("Derive1", "k", KeyGroups::default()).unwrap_err();
        assert_eq!(err.to_string(), "k: derive key not supported");
        let groups = KeyGroups {
            derive: true,
            ..KeyGroups::default()
        };
        assert_eq!(parse_virtual_key("Derive1", "k", groups).unwrap(), VirtualKey::Derive1);
        let err = parse_virtual_key("Run", "k", groups).unwrap_err();
        assert_eq!(err.to_string(), "k: event key not supported");
        let err = parse_virtual_key("Attack9", "k", groups).unwrap_err();
        assert_eq!(err.to_string(), "k: must be a VirtualKey");
    }

    #[test]
    fn test_virtual_dir_forms() {
        let dir = VirtualDir::parse(&json!("B90"), "d").unwrap();
        assert_eq!(dir.dir, VirtualDirKind::Backward);
        assert!(dir.cos.abs() < 1e-9);

        let dir = VirtualDir::parse(&json!(["Left", 60]), "d").unwrap();
        assert_eq!(dir.dir, VirtualDirKind::Left);
        assert!((dir.cos - 0.5).abs() < 1e-9);

        let err = VirtualDir::parse(&json!("45"), "d").unwrap_err();
        assert_eq!(err.to_string(), "d: must match dir pattern");
        let err = VirtualDir::parse(&json!(["Up", 60]), "d").unwrap_err();
        assert_eq!(err.to_string(), "d: must be Forward/Backward/Left/Right");
        let err = VirtualDir::parse(&json!("F200"), "d").unwrap_err();
        assert_eq!(err.to_string(), "d: must <= 180");
    }

    #[test]
    fn test_key_dir_serializes_as_pair() {
        let plain = VirtualKeyDir::parse(&json!("Attack1"), "k").unwrap();
        assert_eq!(serde_json::to_string(&plain).unwrap(), r#"["Attack1",null]"#);
        let with_dir = VirtualKeyDir::parse(&json!(["Attack1", "F0"]), "k").unwrap();
        assert_eq!(
            serde_json::to_string(&with_dir).unwrap(),
            r#"["Attack1",{"dir":"Forward","cos":1.0}]"#
        );
    }

    #[test]
    fn test_derive_rule_locations() {
        let rules = [DeriveRuleArgs {
            key: json!("Attack1"),
            level: json!(700),
            action: json!("Action.Hero.Slash"),
        }];
        let err = parse_derive_rules(&rules, "<Action.Hero.Idle>.derives").unwrap_err();
        assert_eq!(err.to_string(), "<Action.Hero.Idle>.derives[0].level: must <= 600");
    }
}
