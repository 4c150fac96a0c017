//! Pure field validators shared by every template.

pub mod builtin;
pub mod id;
pub mod math;
pub mod time;

use serde::{Deserialize, Serialize};

pub use builtin::*;
pub use id::*;
pub use math::*;
pub use time::*;

use crate::error::{Result, TemplateError};

/// Location label of a resource field, `<id>.field`.
#[must_use]
pub fn field_at(id: &str, field: &str) -> String {
    format!("<{id}>.{field}")
}

/// Rarity tier of jewels, accessories and pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RareLevel {
    /// Common.
    Rare1,
    /// Uncommon.
    Rare2,
    /// Rare.
    Rare3,
}

impl RareLevel {
    /// Parse a rarity name.
    pub fn parse(raw: &str, at: &str) -> Result<Self> {
        match raw {
            "Rare1" => Ok(Self::Rare1),
            "Rare2" => Ok(Self::Rare2),
            "Rare3" => Ok(Self::Rare3),
            _ => Err(TemplateError::field(at, "must be a RareLevel")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_at() {
        assert_eq!(field_at("Style.A", "perks[0]"), "<Style.A>.perks[0]");
    }

    #[test]
    fn test_rare_level() {
        assert_eq!(RareLevel::parse("Rare2", "r").unwrap(), RareLevel::Rare2);
        assert_eq!(
            RareLevel::parse("Rare4", "r").unwrap_err().to_string(),
            "r: must be a RareLevel"
        );
    }
}
