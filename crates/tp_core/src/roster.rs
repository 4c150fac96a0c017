//! Roster files: declarative lists of variables and resources.
//!
//! A roster is read from RON or JSON and registered into a [`Registry`] in a
//! fixed kind order. Within a kind, resources keep the order of the file.

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::action::{ActionGeneral, ActionGeneralArgs, ActionIdle, ActionIdleArgs, ActionMove, ActionMoveArgs};
use crate::error::{Result, TemplateError};
use crate::registry::{Registry, Template};
use crate::template::{
    Accessory, AccessoryArgs, AccessoryPool, AccessoryPoolArgs, Character, CharacterArgs, Entry, EntryArgs,
    Equipment, EquipmentArgs, Jewel, JewelArgs, Perk, PerkArgs, Style, StyleArgs, Zone, ZoneArgs,
};
use crate::variable::VarDefinition;

/// Every declaration of one authoring run, keyed by id.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Roster {
    /// Variable definitions.
    pub vars: IndexMap<String, VarDefinition>,
    /// Characters.
    pub characters: IndexMap<String, CharacterArgs>,
    /// Styles.
    pub styles: IndexMap<String, StyleArgs>,
    /// Equipment.
    pub equipments: IndexMap<String, EquipmentArgs>,
    /// Entries.
    pub entries: IndexMap<String, EntryArgs>,
    /// Perks.
    pub perks: IndexMap<String, PerkArgs>,
    /// Jewels.
    pub jewels: IndexMap<String, JewelArgs>,
    /// Accessory pools.
    pub accessory_pools: IndexMap<String, AccessoryPoolArgs>,
    /// Accessories.
    pub accessories: IndexMap<String, AccessoryArgs>,
    /// Zones.
    pub zones: IndexMap<String, ZoneArgs>,
    /// Idle actions.
    pub idle_actions: IndexMap<String, ActionIdleArgs>,
    /// General actions.
    pub general_actions: IndexMap<String, ActionGeneralArgs>,
    /// Move actions.
    pub move_actions: IndexMap<String, ActionMoveArgs>,
}

const INLINE: &str = "<inline>";

fn add_all<T: Template>(reg: &mut Registry, items: &IndexMap<String, T::Args>) -> Result<()> {
    for (id, args) in items {
        reg.add::<T>(id, args)?;
    }
    Ok(())
}

impl Roster {
    /// Parse a RON roster.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Self::parse_ron(text, INLINE)
    }

    /// Parse a JSON roster.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::parse_json(text, INLINE)
    }

    /// Load a roster file. `.json` files are read as JSON, anything else as RON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let label = path.display().to_string();
        let roster = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&text, &label)?,
            _ => Self::parse_ron(&text, &label)?,
        };
        tracing::info!(path = %label, resources = roster.len(), "loaded roster");
        Ok(roster)
    }

    fn parse_ron(text: &str, label: &str) -> Result<Self> {
        ron::from_str(text).map_err(|err| TemplateError::Load {
            path: label.to_owned(),
            message: err.to_string(),
        })
    }

    fn parse_json(text: &str, label: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| TemplateError::Load {
            path: label.to_owned(),
            message: err.to_string(),
        })
    }

    /// Number of declared resources, variables excluded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.characters.len()
            + self.styles.len()
            + self.equipments.len()
            + self.entries.len()
            + self.perks.len()
            + self.jewels.len()
            + self.accessory_pools.len()
            + self.accessories.len()
            + self.zones.len()
            + self.idle_actions.len()
            + self.general_actions.len()
            + self.move_actions.len()
    }

    /// Whether no resource is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Define the variables, then add every resource kind by kind.
    pub fn register(&self, reg: &mut Registry) -> Result<()> {
        reg.define_vars(&self.vars)?;
        add_all::<Character>(reg, &self.characters)?;
        add_all::<Style>(reg, &self.styles)?;
        add_all::<Equipment>(reg, &self.equipments)?;
        add_all::<Entry>(reg, &self.entries)?;
        add_all::<Perk>(reg, &self.perks)?;
        add_all::<Jewel>(reg, &self.jewels)?;
        add_all::<AccessoryPool>(reg, &self.accessory_pools)?;
        add_all::<Accessory>(reg, &self.accessories)?;
        add_all::<Zone>(reg, &self.zones)?;
        add_all::<ActionIdle>(reg, &self.idle_actions)?;
        add_all::<ActionGeneral>(reg, &self.general_actions)?;
        add_all::<ActionMove>(reg, &self.move_actions)?;
        tracing::debug!(resources = reg.len(), vars = self.vars.len(), "registered roster");
        Ok(())
    }

    /// Build and verify a fresh registry from this roster.
    pub fn build_registry(&self) -> Result<Registry> {
        let mut reg = Registry::new();
        self.register(&mut reg)?;
        reg.verify()?;
        Ok(reg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZONES: &str = r#"(
        zones: {
            "Zone.Hall": (name: "Hall", zone_file: "zones/hall.json", view_zone_file: "zones/hall.tscn"),
            "Zone.Yard": (name: "Yard", zone_file: "zones/yard.json", view_zone_file: "zones/yard.tscn"),
        },
    )"#;

    #[test]
    fn test_from_ron_str_keeps_order() {
        let roster = Roster::from_ron_str(ZONES).unwrap();
        assert_eq!(roster.len(), 2);
        let ids: Vec<_> = roster.zones.keys().cloned().collect();
        assert_eq!(ids, vec!["Zone.Hall", "Zone.Yard"]);

        let reg = roster.build_registry().unwrap();
        let ids: Vec<_> = reg.resources().map(|res| res.id().to_owned()).collect();
        assert_eq!(ids, vec!["Zone.Hall", "Zone.Yard"]);
    }

    #[test]
    fn test_from_json_str_with_vars() {
        let roster = Roster::from_json_str(
            r##"{ "vars": { "#.Hero.Power": { "max_level": 2, "owners": "*" } } }"##,
        )
        .unwrap();
        assert!(roster.is_empty());
        let mut reg = Registry::new();
        roster.register(&mut reg).unwrap();
        assert!(reg.find_var("#.Hero.Power", "v").unwrap().no_limit);
    }

    #[test]
    fn test_parse_error_is_load_error() {
        let err = Roster::from_ron_str("(zones: {").unwrap_err();
        assert!(matches!(err, TemplateError::Load { ref path, .. } if path == "<inline>"));
    }

    #[test]
    fn test_duplicate_across_kinds() {
        let mut reg = Registry::new();
        let roster = Roster::from_ron_str(ZONES).unwrap();
        roster.register(&mut reg).unwrap();
        let err = roster.register(&mut reg).unwrap_err();
        assert_eq!(err.to_string(), "<Zone.Hall>.id: id cannot repeat");
    }
}
