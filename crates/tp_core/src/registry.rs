//! Resource registry.
//!
//! Resources go through two phases. [`Registry::add`] validates fields and
//! registers the resource under its id; [`Registry::verify`] later checks
//! cross-references once every resource is known.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::action::{ActionBase, ActionGeneral, ActionIdle, ActionMove};
use crate::common::{id_symbols, IdPrefix};
use crate::error::{Result, TemplateError};
use crate::template::{
    Accessory, AccessoryPool, Character, Entry, Equipment, Jewel, Perk, Style, Zone,
};
use crate::variable::VarMeta;

/// Typed view into [`Resource`].
pub trait FromResource {
    /// Borrow back out of [`Resource`] when the kind matches.
    fn from_resource(res: &Resource) -> Option<&Self>;
}

/// A resource kind.
pub trait Template: Sized + Into<Resource> + FromResource {
    /// Id prefix of this kind.
    const PREFIX: IdPrefix;
    /// Kind name, as written in the `T` tag of exported records.
    const KIND: &'static str;
    /// Raw author input.
    type Args;

    /// Validate fields and build the resource.
    fn build(id: &str, args: &Self::Args) -> Result<Self>;

    /// Check references to other resources.
    fn verify(&self, reg: &Registry) -> Result<()>;
}

macro_rules! resource_kinds {
    ($($kind:ident),* $(,)?) => {
        /// Any registered resource, tagged by kind.
        #[derive(Debug, Clone, Serialize)]
        #[serde(tag = "T")]
        #[allow(missing_docs)]
        pub enum Resource {
            $($kind($kind),)*
        }

        impl Resource {
            /// Resource id.
            #[must_use]
            pub fn id(&self) -> &str {
                match self {
                    $(Self::$kind(res) => &res.id,)*
                }
            }

            /// Kind name.
            #[must_use]
            pub const fn kind(&self) -> &'static str {
                match self {
                    $(Self::$kind(_) => <$kind as Template>::KIND,)*
                }
            }

            /// Check references to other resources.
            pub fn verify(&self, reg: &Registry) -> Result<()> {
                match self {
                    $(Self::$kind(res) => res.verify(reg),)*
                }
            }
        }

        $(
            impl From<$kind> for Resource {
                fn from(res: $kind) -> Self {
                    Self::$kind(res)
                }
            }

            impl FromResource for $kind {
                fn from_resource(res: &Resource) -> Option<&Self> {
                    match res {
                        Resource::$kind(inner) => Some(inner),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )*
    };
}

resource_kinds!(
    Character,
    Style,
    Equipment,
    Entry,
    Perk,
    Jewel,
    AccessoryPool,
    Accessory,
    Zone,
    ActionIdle,
    ActionGeneral,
    ActionMove,
);

impl Resource {
    /// Shared action fields, when this is an action.
    #[must_use]
    pub fn action_base(&self) -> Option<&ActionBase> {
        match self {
            Self::ActionIdle(action) => Some(&action.base),
            Self::ActionGeneral(action) => Some(&action.base),
            Self::ActionMove(action) => Some(&action.base),
            _ => None,
        }
    }
}

/// All resources, symbols and variables of one authoring run.
#[derive(Debug, Default)]
pub struct Registry {
    resources: IndexMap<String, Resource>,
    symbols: BTreeSet<String>,
    pub(crate) vars: IndexMap<String, VarMeta>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a resource.
    pub fn add<T: Template>(&mut self, id: &str, args: &T::Args) -> Result<()> {
        let at = format!("<{id}>.id");
        let symbols = id_symbols(id, T::PREFIX)
            .map_err(|violation| TemplateError::invalid_id(&at, violation.message(T::PREFIX)))?;
        if self.resources.contains_key(id) {
            return Err(TemplateError::DuplicateId { id: id.to_owned() });
        }
        let res = T::build(id, args)?;
        self.symbols.extend(symbols.into_iter().map(str::to_owned));
        self.resources.insert(id.to_owned(), res.into());
        tracing::debug!(id, kind = T::KIND, "registered resource");
        Ok(())
    }

    /// Look up any resource.
    pub fn find(&self, id: &str, at: &str) -> Result<&Resource> {
        self.resources.get(id).ok_or_else(|| TemplateError::NotFound {
            location: at.to_owned(),
            id: id.to_owned(),
        })
    }

    /// Look up a resource of kind `T`.
    pub fn find_as<T: Template>(&self, id: &str, at: &str) -> Result<&T> {
        T::from_resource(self.find(id, at)?).ok_or_else(|| TemplateError::TypeMismatch {
            location: at.to_owned(),
            id: id.to_owned(),
            expected: T::KIND,
        })
    }

    /// Look up an action of any kind.
    pub fn find_action(&self, id: &str, at: &str) -> Result<&ActionBase> {
        self.find(id, at)?
            .action_base()
            .ok_or_else(|| TemplateError::TypeMismatch {
                location: at.to_owned(),
                id: id.to_owned(),
                expected: "Action",
            })
    }

    /// Resource by id, if registered.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// Verify every resource in registration order.
    pub fn verify(&self) -> Result<()> {
        for res in self.resources.values() {
            res.verify(self)?;
        }
        tracing::debug!(resources = self.resources.len(), "verified registry");
        Ok(())
    }

    /// Resources in registration order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Every id symbol seen so far, sorted.
    #[must_use]
    pub fn symbols(&self) -> &BTreeSet<String> {
        &self.symbols
    }

    /// Defined variables in definition order.
    pub fn vars(&self) -> impl Iterator<Item = &VarMeta> {
        self.vars.values()
    }

    /// Number of registered resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether no resource is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::ZoneArgs;

    fn zone_args() -> ZoneArgs {
        ZoneArgs {
            name: "Demo".into(),
            zone_file: "zones/demo.json".into(),
            view_zone_file: "zones/demo.*".into(),
        }
    }

    #[test]
    fn test_add_and_find() {
        let mut reg = Registry::new();
        reg.add::<Zone>("Zone.Demo.Hall", &zone_args()).unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.find("Zone.Demo.Hall", "?").unwrap().kind(), "Zone");
        assert_eq!(reg.find_as::<Zone>("Zone.Demo.Hall", "?").unwrap().name, "Demo");
        assert_eq!(
            reg.symbols().iter().cloned().collect::<Vec<_>>(),
            vec!["Demo".to_owned(), "Hall".to_owned()]
        );
    }

    #[test]
    fn test_add_rejects_bad_ids() {
        let mut reg = Registry::new();
        let err = reg.add::<Zone>("Style.Demo", &zone_args()).unwrap_err();
        assert_eq!(err.to_string(), "<Style.Demo>.id: must start with \"Zone\"");
        let err = reg.add::<Zone>("Zone.Demo.^", &zone_args()).unwrap_err();
        assert_eq!(err.to_string(), "<Zone.Demo.^>.id: must match ID pattern");
        assert!(reg.is_empty());
        assert!(reg.symbols().is_empty());
    }

    #[test]
    fn test_add_twice_fails() {
        let mut reg = Registry::new();
        reg.add::<Zone>("Zone.Demo", &zone_args()).unwrap();
        let err = reg.add::<Zone>("Zone.Demo", &zone_args()).unwrap_err();
        assert!(matches!(err, TemplateError::DuplicateId { .. }));
        assert_eq!(err.to_string(), "<Zone.Demo>.id: id cannot repeat");
    }

    #[test]
    fn test_find_errors() {
        let mut reg = Registry::new();
        reg.add::<Zone>("Zone.Demo", &zone_args()).unwrap();
        let err = reg.find("Zone.Other", "<X>.y").unwrap_err();
        assert_eq!(err.to_string(), "<X>.y: Resource \"Zone.Other\" not found");
        let err = reg.find_as::<Character>("Zone.Demo", "<X>.y").unwrap_err();
        assert_eq!(err.to_string(), "<X>.y: Resource type miss match");
        assert!(reg.find_action("Zone.Demo", "<X>.y").is_err());
    }

    #[test]
    fn test_record_tag_leads() {
        let mut reg = Registry::new();
        reg.add::<Zone>("Zone.Demo", &zone_args()).unwrap();
        let json = serde_json::to_string(reg.get("Zone.Demo").unwrap()).unwrap();
        assert!(json.starts_with(r#"{"T":"Zone","id":"Zone.Demo","#), "{json}");
    }
}
