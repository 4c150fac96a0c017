//! Attribute names and attribute tables.
//!
//! Each attribute belongs to one group. A `$` prefix turns an attribute into
//! its plus form, which scales with upgrades instead of levels.

use indexmap::IndexMap;
use serde_json::Value;

use crate::common::{check_record, parse_float_array, FloatArrayOpts};
use crate::error::{Result, TemplateError};

/// Base stats.
pub const PRIMARY_ATTRIBUTES: &[&str] = &[
    "MaxHealth",
    "HealthCureRatio",
    "MaxPosture",
    "PostureRecovery",
    "PhysicalAttack",
    "ElementalAttack",
    "ArcaneAttack",
    "PhysicalDefense",
    "ElementalDefense",
    "ArcaneDefense",
];

/// Percentage modifiers.
pub const SECONDARY_ATTRIBUTES: &[&str] = &[
    "MaxHealthUp",
    "MaxPostureUp",
    "PostureRecoveryUp",
    "AttackUp",
    "AttackDown",
    "PhysicalAttackUp",
    "PhysicalAttackDown",
    "ElementalAttackUp",
    "ElementalAttackDown",
    "ArcaneAttackUp",
    "ArcaneAttackDown",
    "DefenseUp",
    "DefenseDown",
    "PhysicalDefenseUp",
    "PhysicalDefenseDown",
    "CutDefenseUp",
    "CutDefenseDown",
    "BluntDefenseUp",
    "BluntDefenseDown",
    "AmmoDefenseUp",
    "AmmoDefenseDown",
    "ElementalDefenseUp",
    "ElementalDefenseDown",
    "FireDefenseUp",
    "FireDefenseDown",
    "IceDefenseUp",
    "IceDefenseDown",
    "ThunderDefenseUp",
    "ThunderDefenseDown",
    "ArcaneDefenseUp",
    "ArcaneDefenseDown",
    "CriticalChance",
    "CriticalDamage",
    "DamageUp",
    "DamageDown",
    "PhysicalDamageUp",
    "PhysicalDamageDown",
    "CutDamageUp",
    "CutDamageDown",
    "BluntDamageUp",
    "BluntDamageDown",
    "AmmoDamageUp",
    "AmmoDamageDown",
    "ElementalDamageUp",
    "ElementalDamageDown",
    "FireDamageUp",
    "FireDamageDown",
    "IceDamageUp",
    "IceDamageDown",
    "ThunderDamageUp",
    "ThunderDamageDown",
    "ArcaneDamageUp",
    "ArcaneDamageDown",
    "NormalDamageUp",
    "NormalDamageDown",
    "SkillDamageUp",
    "SkillDamageDown",
    "BurstDamageUp",
    "BurstDamageDown",
    "MeleeDamageUp",
    "MeleeDamageDown",
    "RangedDamageUp",
    "RangedDamageDown",
    "DepostureUp",
    "DepostureDown",
    "PhysicalDepostureUp",
    "PhysicalDepostureDown",
    "ElementalDepostureUp",
    "ElementalDepostureDown",
    "ArcaneDepostureUp",
    "ArcaneDepostureDown",
    "MeleeDepostureUp",
    "MeleeDepostureDown",
    "RangedDepostureUp",
    "RangedDepostureDown",
    "PerfectDodgeTime",
    "PerfectGuardTime",
];

/// Multipliers applied last.
pub const FINAL_ATTRIBUTES: &[&str] = &[
    "FinalMaxHealthRatio",
    "FinalMaxPostureRatio",
    "FinalPostureRecoveryRatio",
    "FinalDamageRatio",
    "FinalPhysicalDamageRatio",
    "FinalCutDamageRatio",
    "FinalBluntDamageRatio",
    "FinalAmmoDamageRatio",
    "FinalElementalDamageRatio",
    "FinalFireDamageRatio",
    "FinalIceDamageRatio",
    "FinalThunderDamageRatio",
    "FinalArcaneDamageRatio",
    "FinalNormalDamageRatio",
    "FinalSkillDamageRatio",
    "FinalBurstDamageRatio",
    "FinalMeleeDamageRatio",
    "FinalRangedDamageRatio",
    "FinalDepostureRatio",
    "FinalPhysicalDepostureRatio",
    "FinalElementalDepostureRatio",
    "FinalArcaneDepostureRatio",
    "FinalNormalDepostureRatio",
    "FinalSkillDepostureRatio",
    "FinalBurstDepostureRatio",
    "FinalMeleeDepostureRatio",
    "FinalRangedDepostureRatio",
];

/// Attribute group of a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeGroup {
    /// [`PRIMARY_ATTRIBUTES`].
    Primary,
    /// `$` + [`PRIMARY_ATTRIBUTES`].
    PrimaryPlus,
    /// [`SECONDARY_ATTRIBUTES`].
    Secondary,
    /// `$` + [`SECONDARY_ATTRIBUTES`].
    SecondaryPlus,
    /// [`FINAL_ATTRIBUTES`].
    Final,
    /// `$` + [`FINAL_ATTRIBUTES`].
    FinalPlus,
}

impl AttributeGroup {
    /// Group of `name`, if it is a known attribute.
    #[must_use]
    pub fn of(name: &str) -> Option<Self> {
        let (base, plus) = match name.strip_prefix('$') {
            Some(base) => (base, true),
            None => (name, false),
        };
        let group = if PRIMARY_ATTRIBUTES.contains(&base) {
            Self::Primary
        } else if SECONDARY_ATTRIBUTES.contains(&base) {
            Self::Secondary
        } else if FINAL_ATTRIBUTES.contains(&base) {
            Self::Final
        } else {
            return None;
        };
        Some(if plus { group.plus() } else { group })
    }

    const fn plus(self) -> Self {
        match self {
            Self::Primary | Self::PrimaryPlus => Self::PrimaryPlus,
            Self::Secondary | Self::SecondaryPlus => Self::SecondaryPlus,
            Self::Final | Self::FinalPlus => Self::FinalPlus,
        }
    }
}

/// `{ attribute: [value per level] }`.
pub type AttributeTable = IndexMap<String, Vec<f64>>;

fn check_group(name: &str, groups: &[AttributeGroup], at: &str) -> Result<()> {
    match AttributeGroup::of(name) {
        Some(group) if groups.contains(&group) => Ok(()),
        _ => Err(TemplateError::field(format!("{at}[{name}]"), "attribute not includes")),
    }
}

/// Parse an attribute table whose names belong to `groups`.
pub fn parse_attribute_table(
    raw: &Value,
    groups: &[AttributeGroup],
    at: &str,
    opts: &FloatArrayOpts,
) -> Result<AttributeTable> {
    let mut table = AttributeTable::new();
    for (name, values) in check_record(raw, at)? {
        check_group(name, groups, at)?;
        table.insert(name.clone(), parse_float_array(values, &format!("{at}[{name}]"), opts)?);
    }
    Ok(table)
}

/// Parse an attribute table, splitting `$` names into a plus table keyed by
/// the bare name. Empty tables are `None`.
pub fn parse_attribute_plus_table(
    raw: &Value,
    groups: &[AttributeGroup],
    at: &str,
    opts: &FloatArrayOpts,
) -> Result<(Option<AttributeTable>, Option<AttributeTable>)> {
    let mut table = AttributeTable::new();
    let mut plus_table = AttributeTable::new();
    for (name, values) in check_record(raw, at)? {
        check_group(name, groups, at)?;
        let parsed = parse_float_array(values, &format!("{at}[{name}]"), opts)?;
        match name.strip_prefix('$') {
            Some(base) => plus_table.insert(base.to_owned(), parsed),
            None => table.insert(name.clone(), parsed),
        };
    }
    Ok((
        (!table.is_empty()).then_some(table),
        (!plus_table.is_empty()).then_some(plus_table),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ArrayOpts;
    use serde_json::json;

    #[test]
    fn test_group_of() {
        assert_eq!(AttributeGroup::of("MaxHealth"), Some(AttributeGroup::Primary));
        assert_eq!(AttributeGroup::of("$AttackUp"), Some(AttributeGroup::SecondaryPlus));
        assert_eq!(AttributeGroup::of("FinalDamageRatio"), Some(AttributeGroup::Final));
        assert_eq!(AttributeGroup::of("Charisma"), None);
    }

    #[test]
    fn test_table_rejects_wrong_group() {
        let err = parse_attribute_table(
            &json!({ "FinalDamageRatio": [1] }),
            &[AttributeGroup::Primary],
            "a",
            &FloatArrayOpts::default(),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "a[FinalDamageRatio]: attribute not includes");
    }

    #[test]
    fn test_table_parses_percent_and_length() {
        let opts = FloatArrayOpts {
            array: ArrayOpts::exact(2),
            ..FloatArrayOpts::default()
        };
        let table = parse_attribute_table(
            &json!({ "MaxHealth": [100, 200], "AttackUp": ["10%", "20%"] }),
            &[AttributeGroup::Primary, AttributeGroup::Secondary],
            "a",
            &opts,
        )
        .unwrap();
        assert_eq!(table["AttackUp"], vec![0.1, 0.2]);

        let err = parse_attribute_table(&json!({ "MaxHealth": [1] }), &[AttributeGroup::Primary], "a", &opts)
            .unwrap_err();
        assert_eq!(err.to_string(), "a[MaxHealth]: length must = 2");
    }

    #[test]
    fn test_plus_table_strips_prefix() {
        let (table, plus) = parse_attribute_plus_table(
            &json!({ "$MaxHealth": [5], "AttackUp": [1] }),
            &[AttributeGroup::PrimaryPlus, AttributeGroup::Secondary],
            "a",
            &FloatArrayOpts::default(),
        )
        .unwrap();
        assert_eq!(table.unwrap().keys().collect::<Vec<_>>(), vec!["AttackUp"]);
        assert_eq!(plus.unwrap()["MaxHealth"], vec![5.0]);
    }
}
