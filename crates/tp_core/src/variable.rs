//! Variables: field values that change with an external progression level.
//!
//! A Var-capable field accepts either a plain value or `["#.Var.Id", [v0, v1, ...]]`.
//! The variable must be defined on the [`Registry`] with a `max_level`, and the
//! bound array then carries exactly `max_level + 1` values. Each variable is
//! owned by characters and/or styles, and only those may read it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{
    check_record, parse_bool, parse_bool_array, parse_float, parse_float_array, parse_id,
    parse_id_value, parse_id_value_array, parse_int, parse_int_array, ArrayOpts, FloatArrayOpts,
    FloatOpts, IdArrayOpts, IdPrefix, IntArrayOpts, IntOpts,
};
use crate::error::{Result, TemplateError};
use crate::registry::Registry;
use crate::template::{Character, Style};

/// Metadata of a defined variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarMeta {
    /// Variable id, `#.` prefixed.
    pub id: String,
    /// Highest level; a bound value carries `max_level + 1` entries.
    pub max_level: usize,
    /// Readable by anyone.
    pub no_limit: bool,
    /// Owning characters.
    pub characters: Vec<String>,
    /// Owning styles.
    pub styles: Vec<String>,
}

/// Who may read a variable, as written by authors.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawOwners")]
pub enum VarOwners {
    /// `"*"`.
    Any,
    /// A single character or style id.
    One(String),
    /// A list of character or style ids.
    Many(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOwners {
    One(String),
    Many(Vec<String>),
}

impl From<RawOwners> for VarOwners {
    fn from(raw: RawOwners) -> Self {
        match raw {
            RawOwners::One(id) if id == "*" => Self::Any,
            RawOwners::One(id) => Self::One(id),
            RawOwners::Many(ids) => Self::Many(ids),
        }
    }
}

/// Raw definition of one variable.
#[derive(Debug, Clone, Deserialize)]
pub struct VarDefinition {
    /// Highest level, at least 1.
    pub max_level: Value,
    /// Owning scope.
    pub owners: VarOwners,
}

impl VarDefinition {
    /// Definition with an integer max level.
    #[must_use]
    pub fn new(max_level: i64, owners: VarOwners) -> Self {
        Self {
            max_level: Value::from(max_level),
            owners,
        }
    }
}

/// A value bound to a variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Var<T> {
    /// Variable id.
    pub id: String,
    /// One value per level.
    pub values: Vec<T>,
}

/// Either a plain value or a variable binding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VarValue<T> {
    /// Same value at every level.
    Fixed(T),
    /// Value chosen by level.
    Var(Var<T>),
}

impl<T> VarValue<T> {
    /// The fixed value, if not a variable.
    pub fn as_fixed(&self) -> Option<&T> {
        match self {
            Self::Fixed(value) => Some(value),
            Self::Var(_) => None,
        }
    }

    /// Every value this field may take.
    pub fn candidates(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::Fixed(value) => std::slice::from_ref(value).iter(),
            Self::Var(var) => var.values.iter(),
        }
    }
}

impl<T> From<T> for VarValue<T> {
    fn from(value: T) -> Self {
        Self::Fixed(value)
    }
}

/// Options for [`parse_var_value`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VarOpts {
    /// Reject plain values.
    pub must_var: bool,
    /// Exact length of the bound values.
    pub len: Option<usize>,
    /// Minimum length of the bound values.
    pub min_len: Option<usize>,
    /// Maximum length of the bound values.
    pub max_len: Option<usize>,
}

impl VarOpts {
    /// Only variable bindings are accepted.
    #[must_use]
    pub const fn must_var() -> Self {
        Self {
            must_var: true,
            len: None,
            min_len: None,
            max_len: None,
        }
    }

    /// Bounds of the bound values; a binding always spans at least two levels.
    fn values_array(self) -> ArrayOpts {
        ArrayOpts {
            len: self.len.map(|len| len.max(2)),
            min_len: Some(self.min_len.unwrap_or(0).max(2)),
            max_len: self.max_len.map(|len| len.max(2)),
        }
    }
}

fn var_binding(raw: &Value) -> Option<(&str, &Value)> {
    let items = raw.as_array()?;
    let id = items.first()?.as_str()?;
    if !id.starts_with("#.") {
        return None;
    }
    Some((id, items.get(1).unwrap_or(&Value::Null)))
}

/// Parse a plain value with `parse`, or a variable binding whose values are
/// parsed with `parse_array`.
pub fn parse_var_value<T, P, A>(
    raw: &Value,
    at: &str,
    opts: VarOpts,
    parse: P,
    parse_array: A,
) -> Result<VarValue<T>>
where
    P: FnOnce(&Value, &str) -> Result<T>,
    A: FnOnce(&Value, &str, ArrayOpts) -> Result<Vec<T>>,
{
    if let Some((id, values)) = var_binding(raw) {
        let id = parse_id(id, IdPrefix::Var, &format!("{at}[0]"))?;
        let values = parse_array(values, &format!("{at}.values"), opts.values_array())?;
        return Ok(VarValue::Var(Var { id, values }));
    }
    if opts.must_var {
        return Err(TemplateError::field(at, "must be a VarValueArgs<R>"));
    }
    parse(raw, at).map(VarValue::Fixed)
}

/// Var-capable boolean.
pub fn parse_var_bool(raw: &Value, at: &str, opts: VarOpts) -> Result<VarValue<bool>> {
    parse_var_value(raw, at, opts, parse_bool, parse_bool_array)
}

/// Var-capable integer.
pub fn parse_var_int(raw: &Value, at: &str, opts: VarOpts, item: IntOpts) -> Result<VarValue<i64>> {
    parse_var_value(
        raw,
        at,
        opts,
        |raw, at| parse_int(raw, at, item),
        |raw, at, array| {
            parse_int_array(
                raw,
                at,
                &IntArrayOpts {
                    item,
                    array,
                    ..IntArrayOpts::default()
                },
            )
        },
    )
}

/// Var-capable float.
pub fn parse_var_float(raw: &Value, at: &str, opts: VarOpts, item: FloatOpts) -> Result<VarValue<f64>> {
    parse_var_value(
        raw,
        at,
        opts,
        |raw, at| parse_float(raw, at, item),
        |raw, at, array| {
            parse_float_array(
                raw,
                at,
                &FloatArrayOpts {
                    item,
                    array,
                    ..FloatArrayOpts::default()
                },
            )
        },
    )
}

/// Var-capable id. Bound values may repeat.
pub fn parse_var_id(raw: &Value, prefix: IdPrefix, at: &str, opts: VarOpts) -> Result<VarValue<String>> {
    parse_var_value(
        raw,
        at,
        opts,
        |raw, at| parse_id_value(raw, prefix, at),
        |raw, at, array| {
            parse_id_value_array(
                raw,
                prefix,
                at,
                &IdArrayOpts {
                    array,
                    add_first: None,
                    allow_conflict: true,
                },
            )
        },
    )
}

/// The character or styles on whose behalf a variable is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct VarConsumers<'a> {
    /// Reading character.
    pub character: Option<&'a str>,
    /// Reading styles.
    pub styles: &'a [String],
}

impl<'a> VarConsumers<'a> {
    /// No ownership check beyond existence.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            character: None,
            styles: &[],
        }
    }

    /// Read by a character.
    #[must_use]
    pub const fn character(character: &'a str) -> Self {
        Self {
            character: Some(character),
            styles: &[],
        }
    }

    /// Read by styles.
    #[must_use]
    pub const fn styles(styles: &'a [String]) -> Self {
        Self {
            character: None,
            styles,
        }
    }
}

/// A character may read a variable owned by it, or owned by every one of its
/// styles. A style may read a variable owned by it or by its character.
fn check_owners(reg: &Registry, meta: &VarMeta, consumers: VarConsumers<'_>, at: &str) -> Result<()> {
    if meta.no_limit {
        return Ok(());
    }
    if let Some(character_id) = consumers.character {
        let character = reg.find_as::<Character>(character_id, at)?;
        let ok = meta.characters.iter().any(|id| id == character_id)
            || character.styles.iter().all(|style| meta.styles.contains(style));
        if !ok {
            return Err(TemplateError::var(at, format!("{character_id} not defined in {}", meta.id)));
        }
    }
    for style_id in consumers.styles {
        let style = reg.find_as::<Style>(style_id, at)?;
        let ok = meta.styles.contains(style_id) || meta.characters.contains(&style.character);
        if !ok {
            return Err(TemplateError::var(at, format!("{style_id} not defined in {}", meta.id)));
        }
    }
    Ok(())
}

/// Check a variable binding: defined, readable by `consumers`, right length.
pub fn verify_var_value<T>(
    reg: &Registry,
    value: &VarValue<T>,
    consumers: VarConsumers<'_>,
    at: &str,
) -> Result<()> {
    verify_var_value_with(reg, value, consumers, at, |_, _| Ok(()))
}

/// Same as [`verify_var_value`], then run `each` on every bound value.
pub fn verify_var_value_with<T, F>(
    reg: &Registry,
    value: &VarValue<T>,
    consumers: VarConsumers<'_>,
    at: &str,
    mut each: F,
) -> Result<()>
where
    F: FnMut(&T, &str) -> Result<()>,
{
    let VarValue::Var(var) = value else {
        return Ok(());
    };
    let meta = reg.find_var(&var.id, at)?;
    check_owners(reg, meta, consumers, at)?;
    if meta.max_level + 1 != var.values.len() {
        return Err(TemplateError::var(
            at,
            format!("{} must have {} values", var.id, meta.max_level + 1),
        ));
    }
    for (idx, item) in var.values.iter().enumerate() {
        each(item, &format!("{at}[{idx}]"))?;
    }
    Ok(())
}

/// Per-level variable indexes, `{ "#.Var": [index per level] }`.
pub type VarIndexTable = IndexMap<String, Vec<i64>>;

fn parse_var_index_row(raw: &Value, at: &str, len: Option<usize>) -> Result<Vec<i64>> {
    parse_int_array(
        raw,
        at,
        &IntArrayOpts {
            item: IntOpts {
                min: Some(0),
                max: None,
                allow_bool: true,
            },
            array: ArrayOpts {
                len,
                ..ArrayOpts::default()
            },
            ..IntArrayOpts::default()
        },
    )
}

/// Parse a var index table. An empty object yields `None`.
pub fn parse_var_index_table(raw: &Value, at: &str, len: Option<usize>) -> Result<Option<VarIndexTable>> {
    let record = check_record(raw, at)?;
    let mut table = VarIndexTable::new();
    for (id, values) in record {
        let row_at = format!("{at}[{id}]");
        let id = parse_id(id, IdPrefix::Var, &row_at)?;
        table.insert(id, parse_var_index_row(values, &row_at, len)?);
    }
    Ok((!table.is_empty()).then_some(table))
}

/// Parse a var index table whose `$`-prefixed keys form a second, plus table.
pub fn parse_var_index_plus_table(
    raw: &Value,
    at: &str,
    len: Option<usize>,
) -> Result<(Option<VarIndexTable>, Option<VarIndexTable>)> {
    let record = check_record(raw, at)?;
    let mut table = VarIndexTable::new();
    let mut plus_table = VarIndexTable::new();
    for (key, values) in record {
        let row_at = format!("{at}[{key}]");
        match key.strip_prefix('$') {
            Some(id) => {
                let id = parse_id(id, IdPrefix::Var, &row_at)?;
                plus_table.insert(id, parse_var_index_row(values, &row_at, len)?);
            }
            None => {
                let id = parse_id(key, IdPrefix::Var, &row_at)?;
                table.insert(id, parse_var_index_row(values, &row_at, len)?);
            }
        }
    }
    Ok((
        (!table.is_empty()).then_some(table),
        (!plus_table.is_empty()).then_some(plus_table),
    ))
}

/// Check every variable of a var index table: defined, readable by
/// `consumers`, and each index within its levels.
pub fn verify_var_index_table(
    reg: &Registry,
    table: &VarIndexTable,
    consumers: VarConsumers<'_>,
    at: &str,
) -> Result<()> {
    for (id, indexes) in table {
        let meta = reg.find_var(id, at)?;
        check_owners(reg, meta, consumers, at)?;
        for (idx, &index) in indexes.iter().enumerate() {
            if index > meta.max_level as i64 {
                return Err(TemplateError::var(
                    format!("{at}[{id}][{idx}]"),
                    format!("must <= {}", meta.max_level),
                ));
            }
        }
    }
    Ok(())
}

fn classify_owner(meta: &mut VarMeta, owner: &str, at: &str) -> Result<()> {
    if owner.starts_with("Character.") {
        meta.characters.push(parse_id(owner, IdPrefix::Character, at)?);
    } else if owner.starts_with("Style.") {
        meta.styles.push(parse_id(owner, IdPrefix::Style, at)?);
    } else {
        return Err(TemplateError::var(at, "invalid or unsupported ID"));
    }
    Ok(())
}

impl Registry {
    /// Define variables. Each id may be defined once per registry.
    pub fn define_vars<'a, I>(&mut self, defs: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a String, &'a VarDefinition)>,
    {
        for (var_id, def) in defs {
            let at = format!("Var.define({var_id})");
            if self.vars.contains_key(var_id) {
                return Err(TemplateError::var(at, "define multiple times"));
            }
            let id = parse_id(var_id, IdPrefix::Var, &at)?;
            let max_level = parse_int(&def.max_level, &format!("{at}[0]"), IntOpts::at_least(1))?;
            let mut meta = VarMeta {
                id,
                max_level: max_level as usize,
                no_limit: false,
                characters: Vec::new(),
                styles: Vec::new(),
            };
            match &def.owners {
                VarOwners::Any => meta.no_limit = true,
                VarOwners::One(owner) => classify_owner(&mut meta, owner, &format!("{at}[1]"))?,
                VarOwners::Many(owners) => {
                    for (idx, owner) in owners.iter().enumerate() {
                        classify_owner(&mut meta, owner, &format!("{at}[1][{idx}]"))?;
                    }
                }
            }
            tracing::debug!(var = %meta.id, max_level = meta.max_level, "defined variable");
            self.vars.insert(var_id.clone(), meta);
        }
        Ok(())
    }

    /// Look up a variable definition.
    pub fn find_var(&self, id: &str, at: &str) -> Result<&VarMeta> {
        self.vars
            .get(id)
            .ok_or_else(|| TemplateError::var(at, format!("Var \"{id}\" not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn defs(items: &[(&str, i64, VarOwners)]) -> IndexMap<String, VarDefinition> {
        items
            .iter()
            .map(|(id, level, owners)| ((*id).to_owned(), VarDefinition::new(*level, owners.clone())))
            .collect()
    }

    // ========================================================================
    // Definitions
    // ========================================================================

    #[test]
    fn test_define_classifies_owners() {
        let mut reg = Registry::new();
        reg.define_vars(&defs(&[
            ("#.A", 2, VarOwners::Any),
            (
                "#.B",
                1,
                VarOwners::Many(vec!["Character.X".into(), "Style.X.Y".into()]),
            ),
        ]))
        .unwrap();
        assert!(reg.find_var("#.A", "?").unwrap().no_limit);
        let meta = reg.find_var("#.B", "?").unwrap();
        assert_eq!(meta.characters, vec!["Character.X".to_owned()]);
        assert_eq!(meta.styles, vec!["Style.X.Y".to_owned()]);
    }

    #[test]
    fn test_define_twice_fails() {
        let mut reg = Registry::new();
        let table = defs(&[("#.A", 2, VarOwners::Any)]);
        reg.define_vars(&table).unwrap();
        let err = reg.define_vars(&table).unwrap_err();
        assert_eq!(err.to_string(), "Var.define(#.A): define multiple times");
    }

    #[test]
    fn test_define_rejects_bad_owner_and_level() {
        let mut reg = Registry::new();
        let err = reg
            .define_vars(&defs(&[("#.A", 1, VarOwners::Many(vec!["Zone.X".into()]))]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Var.define(#.A)[1][0]: invalid or unsupported ID");

        let err = reg
            .define_vars(&defs(&[("#.B", 0, VarOwners::Any)]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Var.define(#.B)[0]: must >= 1");
    }

    #[test]
    fn test_owners_deserialize() {
        let def: VarDefinition = serde_json::from_value(json!({ "max_level": 2, "owners": "*" })).unwrap();
        assert_eq!(def.owners, VarOwners::Any);
        let def: VarDefinition =
            serde_json::from_value(json!({ "max_level": 2, "owners": ["Style.A"] })).unwrap();
        assert_eq!(def.owners, VarOwners::Many(vec!["Style.A".into()]));
    }

    #[test]
    fn test_find_var_missing() {
        let err = Registry::new().find_var("#.Nope", "<Perk.A>.x").unwrap_err();
        assert_eq!(err.to_string(), "<Perk.A>.x: Var \"#.Nope\" not found");
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    #[test]
    fn test_parse_plain_and_bound() {
        let plain = parse_var_int(&json!(3), "f", VarOpts::default(), IntOpts::default()).unwrap();
        assert_eq!(plain, VarValue::Fixed(3));

        let bound = parse_var_int(&json!(["#.L", [1, 2, 3]]), "f", VarOpts::default(), IntOpts::default())
            .unwrap();
        assert_eq!(
            bound,
            VarValue::Var(Var {
                id: "#.L".into(),
                values: vec![1, 2, 3]
            })
        );
    }

    #[test]
    fn test_parse_bound_needs_two_values() {
        let opts = VarOpts {
            len: Some(1),
            ..VarOpts::default()
        };
        let err = parse_var_bool(&json!(["#.L", [true]]), "f", opts).unwrap_err();
        assert_eq!(err.to_string(), "f.values: length must = 2");

        let err = parse_var_float(&json!(["#.L", [0.5]]), "f", VarOpts::default(), FloatOpts::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "f.values: length must >= 2");
    }

    #[test]
    fn test_parse_must_var() {
        let err = parse_var_bool(&json!(true), "f", VarOpts::must_var()).unwrap_err();
        assert_eq!(err.to_string(), "f: must be a VarValueArgs<R>");
    }

    #[test]
    fn test_parse_bad_var_id() {
        let err = parse_var_bool(&json!(["#.^", [true, false]]), "f", VarOpts::default()).unwrap_err();
        assert_eq!(err.to_string(), "f[0]: must match ID pattern");
    }

    #[test]
    fn test_parse_var_id_allows_repeats() {
        let value = parse_var_id(
            &json!(["#.L", ["Action.A", "Action.A"]]),
            IdPrefix::Action,
            "f",
            VarOpts::default(),
        )
        .unwrap();
        assert_eq!(value.candidates().count(), 2);
    }

    #[test]
    fn test_var_value_serializes_transparently() {
        assert_eq!(serde_json::to_string(&VarValue::Fixed(1)).unwrap(), "1");
        let bound = VarValue::Var(Var {
            id: "#.L".to_owned(),
            values: vec![true, false],
        });
        assert_eq!(
            serde_json::to_string(&bound).unwrap(),
            r##"{"id":"#.L","values":[true,false]}"##
        );
    }

    // ========================================================================
    // Ownership and cardinality
    // ========================================================================

    fn add_character(reg: &mut Registry, id: &str, styles: &[&str]) {
        let args = crate::template::CharacterArgs {
            name: "C".into(),
            level: json!([1, 2]),
            styles: styles.iter().map(|s| (*s).to_owned()).collect(),
            equipments: Vec::new(),
            bounding_capsule: crate::common::CapsuleArgs {
                half_height: json!(0.5),
                radius: json!(0.3),
            },
            skeleton_files: "model/c/*".into(),
            skeleton_toward: json!([0, 1]),
        };
        reg.add::<Character>(id, &args).unwrap();
    }

    fn bound(id: &str, values: &[i64]) -> VarValue<i64> {
        VarValue::Var(Var {
            id: id.to_owned(),
            values: values.to_vec(),
        })
    }

    #[test]
    fn test_character_consumer_needs_ownership() {
        let mut reg = Registry::new();
        add_character(&mut reg, "Character.X", &[]);
        add_character(&mut reg, "Character.Y", &["Style.Y.A"]);
        reg.define_vars(&defs(&[("#.V", 1, VarOwners::One("Character.X".into()))]))
            .unwrap();
        let value = bound("#.V", &[0, 1]);

        verify_var_value(&reg, &value, VarConsumers::character("Character.X"), "f").unwrap();
        let err = verify_var_value(&reg, &value, VarConsumers::character("Character.Y"), "f").unwrap_err();
        assert_eq!(err.to_string(), "f: Character.Y not defined in #.V");
    }

    #[test]
    fn test_character_consumer_through_every_style() {
        let mut reg = Registry::new();
        add_character(&mut reg, "Character.W", &["Style.W.A", "Style.W.B"]);
        reg.define_vars(&defs(&[
            (
                "#.Both",
                1,
                VarOwners::Many(vec!["Style.W.A".into(), "Style.W.B".into()]),
            ),
            ("#.Half", 1, VarOwners::Many(vec!["Style.W.A".into()])),
        ]))
        .unwrap();

        verify_var_value(&reg, &bound("#.Both", &[0, 1]), VarConsumers::character("Character.W"), "f")
            .unwrap();
        let err = verify_var_value(&reg, &bound("#.Half", &[0, 1]), VarConsumers::character("Character.W"), "f")
            .unwrap_err();
        assert_eq!(err.to_string(), "f: Character.W not defined in #.Half");
    }

    #[test]
    fn test_character_without_styles_reads_any_character_var() {
        let mut reg = Registry::new();
        add_character(&mut reg, "Character.X", &[]);
        add_character(&mut reg, "Character.Z", &[]);
        reg.define_vars(&defs(&[("#.V", 1, VarOwners::One("Character.X".into()))]))
            .unwrap();
        verify_var_value(&reg, &bound("#.V", &[0, 1]), VarConsumers::character("Character.Z"), "f")
            .unwrap();
    }

    #[test]
    fn test_value_count_follows_max_level() {
        let mut reg = Registry::new();
        reg.define_vars(&defs(&[("#.L", 2, VarOwners::Any)])).unwrap();

        verify_var_value(&reg, &bound("#.L", &[1, 2, 3]), VarConsumers::any(), "f").unwrap();
        for values in [&[1, 2][..], &[1, 2, 3, 4][..]] {
            let err = verify_var_value(&reg, &bound("#.L", values), VarConsumers::any(), "f").unwrap_err();
            assert_eq!(err.to_string(), "f: #.L must have 3 values");
        }
    }

    // ========================================================================
    // Index tables
    // ========================================================================

    #[test]
    fn test_index_tables() {
        assert_eq!(parse_var_index_table(&json!({}), "t", None).unwrap(), None);
        let table = parse_var_index_table(&json!({ "#.A": [0, 1] }), "t", Some(2))
            .unwrap()
            .unwrap();
        assert_eq!(table["#.A"], vec![0, 1]);

        let (table, plus) =
            parse_var_index_plus_table(&json!({ "$#.A": [1], "#.B": [0] }), "t", None).unwrap();
        assert_eq!(table.unwrap()["#.B"], vec![0]);
        assert_eq!(plus.unwrap()["#.A"], vec![1]);

        let err = parse_var_index_table(&json!({ "#.A": [-1] }), "t", None).unwrap_err();
        assert_eq!(err.to_string(), "t[#.A][0]: must >= 0");
    }

    #[test]
    fn test_index_table_level_bound() {
        let mut reg = Registry::new();
        reg.define_vars(&defs(&[("#.A", 2, VarOwners::Any)])).unwrap();
        let mut table = VarIndexTable::new();
        table.insert("#.A".into(), vec![0, 2]);
        verify_var_index_table(&reg, &table, VarConsumers::any(), "t").unwrap();

        table.insert("#.A".into(), vec![0, 3]);
        let err = verify_var_index_table(&reg, &table, VarConsumers::any(), "t").unwrap_err();
        assert_eq!(err.to_string(), "t[#.A][1]: must <= 2");
    }
}
