//! Test fixtures and helpers.
//!
//! A small but complete roster: one character with two styles, equipment,
//! perks, entries, jewels, an accessory pool, a zone and one action of each
//! kind. Every cross reference resolves, so [`hero_registry`] verifies.

use tp_core::registry::Registry;
use tp_core::roster::Roster;

/// Id of the fixture character.
pub const HERO: &str = "Character.Hero";
/// Melee style of the fixture character.
pub const BLADE: &str = "Style.Hero.Blade";
/// Ranged style of the fixture character.
pub const BOW: &str = "Style.Hero.Bow";

/// The fixture roster, as JSON.
pub const HERO_ROSTER_JSON: &str = r##"{
    "vars": {
        "#.Hero.Power": { "max_level": 2, "owners": "Character.Hero" },
        "#.Hero.Blade.Combo": { "max_level": 1, "owners": ["Style.Hero.Blade"] },
        "#.Shared": { "max_level": 1, "owners": "*" }
    },
    "characters": {
        "Character.Hero": {
            "name": "Hero",
            "level": [1, 2],
            "styles": ["Style.Hero.Blade", "Style.Hero.Bow"],
            "equipments": ["Equipment.Hero.Sword", "Equipment.Hero.SwordPlus"],
            "bounding_capsule": { "half_height": 0.5, "radius": 0.3 },
            "skeleton_files": "model/hero/*",
            "skeleton_toward": [0, 1]
        }
    },
    "styles": {
        "Style.Hero.Blade": {
            "name": "Blade",
            "character": "Character.Hero",
            "attributes": { "MaxHealth": [100, 200], "PhysicalAttack": [10, 20] },
            "slots": ["A1", "A1D1"],
            "fixed_attributes": {
                "damage_reduce_param_1": 0,
                "damage_reduce_param_2": 500,
                "guard_damage_ratio_1": "50%",
                "deposture_reduce_param_1": 0,
                "deposture_reduce_param_2": 500,
                "guard_deposture_ratio_1": 0.5,
                "weak_damage_up": 0.2
            },
            "perks": ["Perk.Hero.Swift"],
            "actions": ["Action.Hero.Idle", "Action.Hero.Slash", "Action.Hero.Run"],
            "view_model": "model/hero_blade.vrm"
        },
        "Style.Hero.Bow": {
            "name": "Bow",
            "character": "Character.Hero",
            "attributes": { "MaxHealth": [90, 180] },
            "slots": ["D1", "D2"],
            "fixed_attributes": {
                "damage_reduce_param_1": 0,
                "damage_reduce_param_2": 400,
                "guard_damage_ratio_1": "60%",
                "deposture_reduce_param_1": 0,
                "deposture_reduce_param_2": 400,
                "guard_deposture_ratio_1": 0.6,
                "weak_damage_up": 0.1
            },
            "perks": ["Perk.Hero.Aim"],
            "usable_perks": ["Perk.Hero.Swift"],
            "actions": ["Action.Hero.Idle"],
            "view_model": "model/hero_bow.vrm"
        }
    },
    "equipments": {
        "Equipment.Hero.Sword": {
            "name": "Sword",
            "character": "Character.Hero",
            "slot": "Slot1",
            "level": [1, 2],
            "attributes": { "PhysicalAttack": [10, 20] },
            "slots": ["A1", "A1D1"],
            "entries": { "Entry.Power": [[1, 0], [2, 3]] }
        },
        "Equipment.Hero.SwordPlus": {
            "name": "Sword+",
            "character": "Character.Hero",
            "slot": "Slot1",
            "parents": { "Equipment.Hero.Sword": 2 },
            "level": [3, 4],
            "attributes": { "PhysicalAttack": [30, 40] }
        }
    },
    "entries": {
        "Entry.Power": {
            "name": "Power",
            "max_piece": 2,
            "attributes": { "AttackUp": ["5%", "10%"], "$AttackUp": ["1%", "2%"] },
            "var_indexes": { "#.Shared": [0, 1] }
        },
        "Entry.Guard": {
            "name": "Guard",
            "max_piece": 3,
            "attributes": { "DefenseUp": ["5%", "10%", "15%"] }
        }
    },
    "perks": {
        "Perk.Hero.Swift": {
            "name": "Swift",
            "character": "Character.Hero",
            "style": "Style.Hero.Blade",
            "usable_styles": ["Style.Hero.Bow"],
            "max_level": 2,
            "attributes": { "AttackUp": ["1%", "2%"] },
            "var_indexes": { "#.Hero.Power": [1, 2] }
        },
        "Perk.Hero.Aim": {
            "name": "Aim",
            "character": "Character.Hero",
            "style": "Style.Hero.Bow",
            "parents": { "Perk.Hero.Swift": 1 },
            "max_level": 1
        }
    },
    "jewels": {
        "Jewel.Power": {
            "slot": "Attack",
            "rare": "Rare1",
            "entry": "Entry.Power",
            "piece": 1,
            "sub_entry": "Entry.Guard",
            "sub_piece": 1,
            "variant": "Variant1"
        }
    },
    "accessory_pools": {
        "AccessoryPool.Ring": {
            "rare": "Rare2",
            "patterns": "S A B AB",
            "max_level": 12,
            "a_entries": { "Entry.Power": 1 },
            "b_entries": { "Entry.Guard": "50%" }
        }
    },
    "accessories": {
        "Accessory.Ring.Power": {
            "pool": "AccessoryPool.Ring",
            "rare": "Rare1",
            "entry": "Entry.Power",
            "piece": 1,
            "variant": "Variant1"
        }
    },
    "zones": {
        "Zone.Hall": {
            "name": "Hall",
            "zone_file": "zones/hall.json",
            "view_zone_file": "zones/hall.tscn"
        }
    },
    "idle_actions": {
        "Action.Hero.Idle": {
            "character": "Character.Hero",
            "styles": ["Style.Hero.Blade", "Style.Hero.Bow"],
            "anim_idle": { "files": "hero/idle", "duration": "2s" }
        }
    },
    "general_actions": {
        "Action.Hero.Slash": {
            "enabled": ["#.Hero.Blade.Combo", [false, true]],
            "character": "Character.Hero",
            "styles": ["Style.Hero.Blade"],
            "anim_main": { "files": "hero/slash", "duration": "2s", "root_motion": true },
            "enter_key": "Attack1",
            "attributes": { "0-1s": { "damage_rdc": "10%" }, "1-2s": {} },
            "derive_levels": { "0-1.5s": 500, "1.5-3s": 100 },
            "derives": [
                {
                    "key": "Attack1",
                    "level": 100,
                    "action": ["#.Hero.Power", ["Action.Hero.Idle", "Action.Hero.Slash", "Action.Hero.Idle"]]
                }
            ]
        }
    },
    "move_actions": {
        "Action.Hero.Run": {
            "character": "Character.Hero",
            "styles": ["Style.Hero.Blade"],
            "enter_key": "Run",
            "anim_move": { "files": "hero/run", "duration": "1s", "root_motion": true },
            "move_speed": 5,
            "starts": [
                {
                    "anim": { "files": "hero/run_start", "duration": "1s", "root_motion": true },
                    "enter_angle": ["L45", "R45"]
                }
            ],
            "stops": [
                {
                    "anim": { "files": "hero/run_stop", "duration": "1s", "root_motion": true },
                    "enter_phase_table": [[0, 0.5, "0.2s"], [0.5, 1, "0.6s"]],
                    "speed_down_end": "0.4s"
                }
            ]
        }
    }
}"##;

/// Parse [`HERO_ROSTER_JSON`].
///
/// # Panics
///
/// Panics if the fixture no longer parses.
#[must_use]
pub fn hero_roster() -> Roster {
    Roster::from_json_str(HERO_ROSTER_JSON).expect("fixture roster parses")
}

/// Registry built from [`hero_roster`], not yet verified.
///
/// # Panics
///
/// Panics if a fixture resource fails field validation.
#[must_use]
pub fn hero_registry_unverified() -> Registry {
    let mut reg = Registry::new();
    hero_roster().register(&mut reg).expect("fixture roster registers");
    reg
}

/// Registry built from [`hero_roster`] with every reference verified.
///
/// # Panics
///
/// Panics if the fixture fails validation.
#[must_use]
pub fn hero_registry() -> Registry {
    hero_roster().build_registry().expect("fixture roster verifies")
}
