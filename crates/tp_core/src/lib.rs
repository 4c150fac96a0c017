//! # Turning Point templates
//!
//! Authoring layer for game character data. Designers declare resources
//! (characters, styles, equipment, perks, actions, ...) as raw arguments; this
//! crate validates them, checks the references between them and exports the
//! whole graph in a deterministic format read by the runtime.
//!
//! The pipeline has three steps:
//! 1. [`Registry::add`](registry::Registry::add) validates each resource's own fields.
//! 2. [`Registry::verify`](registry::Registry::verify) checks cross-resource references.
//! 3. [`export::write`] serializes `symbol.json`, `index.json` and `data.json`.
//!
//! ## Crate Structure
//!
//! - [`common`] - Field validators (numbers, times, ids, paths, angles)
//! - [`timeline`] - Time fragment partitioning and timelines
//! - [`variable`] - Var-capable values and variable ownership
//! - [`registry`] - Resource registry and two-phase lifecycle
//! - [`export`] - Deterministic on-disk output
//! - [`template`] - Domain resource kinds
//! - [`action`] - Action resource kinds
//! - [`roster`] - Declarative roster files

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod action;
pub mod attribute;
pub mod common;
pub mod config;
pub mod error;
pub mod export;
pub mod registry;
pub mod roster;
pub mod template;
pub mod timeline;
pub mod variable;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::action::{ActionBase, ActionGeneral, ActionIdle, ActionMove};
    pub use crate::common::{field_at, IdPrefix, RareLevel};
    pub use crate::error::{Result, TemplateError};
    pub use crate::export::{ExportArtifacts, ExportSummary};
    pub use crate::registry::{Registry, Resource, Template};
    pub use crate::roster::Roster;
    pub use crate::template::{
        Accessory, AccessoryPool, Character, Entry, Equipment, Jewel, Perk, Style, Zone,
    };
    pub use crate::timeline::{FragmentOpts, TimeFragment, TimelinePoint, TimelineRange};
    pub use crate::variable::{Var, VarDefinition, VarOwners, VarValue};
}
