//! Zones: playable scenes.

use serde::{Deserialize, Serialize};

use crate::common::{field_at, parse_file, parse_string, FileOpts, IdPrefix, StrOpts};
use crate::config::MAX_NAME_LEN;
use crate::error::Result;
use crate::registry::{Registry, Template};

/// Raw zone input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZoneArgs {
    /// Display name.
    pub name: String,
    /// Logic zone file (`.json`).
    pub zone_file: String,
    /// Rendered zone file.
    pub view_zone_file: String,
}

/// A zone.
#[derive(Debug, Clone, Serialize)]
pub struct Zone {
    /// Resource id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Logic zone file.
    pub zone_file: String,
    /// Rendered zone file.
    pub view_zone_file: String,
}

impl Template for Zone {
    const PREFIX: IdPrefix = IdPrefix::Zone;
    const KIND: &'static str = "Zone";
    type Args = ZoneArgs;

    fn build(id: &str, args: &ZoneArgs) -> Result<Self> {
        Ok(Self {
            id: id.to_owned(),
            name: parse_string(&args.name, &field_at(id, "name"), &StrOpts::max_len(MAX_NAME_LEN))?,
            zone_file: parse_file(
                &args.zone_file,
                &field_at(id, "zone_file"),
                &FileOpts::extensions(&[".json"]),
            )?,
            view_zone_file: parse_file(&args.view_zone_file, &field_at(id, "view_zone_file"), &FileOpts::default())?,
        })
    }

    fn verify(&self, _reg: &Registry) -> Result<()> {
        Ok(())
    }
}
