//! Entries: skills that activate once enough pieces are collected.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::present;
use crate::attribute::{parse_attribute_plus_table, AttributeGroup, AttributeTable};
use crate::common::{
    as_count, check_array, check_record, field_at, parse_id, parse_int, parse_string, ArrayOpts,
    FloatArrayOpts, IdPrefix, IntOpts, StrOpts,
};
use crate::config::{MAX_ENTRY_PLUS, MAX_NAME_LEN};
use crate::error::{Result, TemplateError};
use crate::registry::{Registry, Template};
use crate::variable::{parse_var_index_plus_table, verify_var_index_table, VarConsumers, VarIndexTable};

/// `{ entry id: [[piece, plus], ...] }`, one row per level.
pub type EntryTable = IndexMap<String, Vec<[i64; 2]>>;

fn plus_error(at: String) -> TemplateError {
    TemplateError::field(at, format!("[1] must <= [0] * {MAX_ENTRY_PLUS}"))
}

/// Parse an entry table whose rows satisfy `opts`.
pub fn parse_entry_table(raw: &Value, at: &str, opts: ArrayOpts) -> Result<EntryTable> {
    let mut table = EntryTable::new();
    for (id, rows) in check_record(raw, at)? {
        let row_at = format!("{at}[{id}]");
        let entry_id = parse_id(id, IdPrefix::Entry, &row_at)?;
        let parsed = check_array(rows, &row_at, opts)?
            .iter()
            .enumerate()
            .map(|(idx, pair)| {
                let pair_at = format!("{row_at}[{idx}]");
                let items = check_array(pair, &pair_at, ArrayOpts::exact(2))?;
                let piece = parse_int(&items[0], &format!("{pair_at}[0]"), IntOpts::at_least(0))?;
                let plus = parse_int(&items[1], &format!("{pair_at}[1]"), IntOpts::at_least(0))?;
                if plus > piece * MAX_ENTRY_PLUS {
                    return Err(plus_error(pair_at));
                }
                Ok([piece, plus])
            })
            .collect::<Result<Vec<_>>>()?;
        table.insert(entry_id, parsed);
    }
    Ok(table)
}

/// Check that every row stays within its entry's `max_piece`.
pub fn verify_entry_table(reg: &Registry, table: &EntryTable, at: &str) -> Result<()> {
    for (id, rows) in table {
        let entry = reg.find_as::<Entry>(id, &format!("{at}[{id}]"))?;
        for (idx, &[piece, plus]) in rows.iter().enumerate() {
            if piece > entry.max_piece {
                return Err(TemplateError::integrity(
                    format!("{at}[{id}][{idx}]"),
                    "[0] must <= entry.max_piece",
                ));
            }
            if plus > piece * MAX_ENTRY_PLUS {
                return Err(plus_error(format!("{at}[{id}][{idx}]")));
            }
        }
    }
    Ok(())
}

/// Raw entry input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryArgs {
    /// Display name.
    pub name: String,
    /// Pieces needed for the full effect.
    pub max_piece: Value,
    /// Attributes per piece; `$` names scale with `+` upgrades.
    #[serde(default)]
    pub attributes: Value,
    /// Variable indexes per piece; `$` keys scale with `+` upgrades.
    #[serde(default)]
    pub var_indexes: Value,
}

/// An entry carried by equipment, jewels and accessories.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    /// Resource id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Pieces needed for the full effect.
    pub max_piece: i64,
    /// Attribute gain per piece count, starting with 0 for no pieces.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AttributeTable>,
    /// Attribute gain per `MAX_ENTRY_PLUS` upgrades.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes_plus: Option<AttributeTable>,
    /// Variable indexes per piece count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var_indexes: Option<VarIndexTable>,
    /// Variable indexes per `MAX_ENTRY_PLUS` upgrades.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var_indexes_plus: Option<VarIndexTable>,
}

impl Template for Entry {
    const PREFIX: IdPrefix = IdPrefix::Entry;
    const KIND: &'static str = "Entry";
    type Args = EntryArgs;

    fn build(id: &str, args: &EntryArgs) -> Result<Self> {
        let at = |field: &str| field_at(id, field);
        let name = parse_string(&args.name, &at("name"), &StrOpts::max_len(MAX_NAME_LEN))?;
        let max_piece = parse_int(&args.max_piece, &at("max_piece"), IntOpts::at_least(1))?;
        let pieces = as_count(max_piece);

        let (attributes, attributes_plus) = match present(&args.attributes) {
            None => (None, None),
            Some(raw) => parse_attribute_plus_table(
                raw,
                &[
                    AttributeGroup::Primary,
                    AttributeGroup::Secondary,
                    AttributeGroup::SecondaryPlus,
                ],
                &at("attributes"),
                &FloatArrayOpts {
                    array: ArrayOpts::exact(pieces),
                    add_first: Some(0.0),
                    ..FloatArrayOpts::default()
                },
            )?,
        };
        let (var_indexes, var_indexes_plus) = match present(&args.var_indexes) {
            None => (None, None),
            Some(raw) => parse_var_index_plus_table(raw, &at("var_indexes"), Some(pieces))?,
        };

        Ok(Self {
            id: id.to_owned(),
            name,
            max_piece,
            attributes,
            attributes_plus,
            var_indexes,
            var_indexes_plus,
        })
    }

    fn verify(&self, reg: &Registry) -> Result<()> {
        if let Some(table) = &self.var_indexes {
            verify_var_index_table(reg, table, VarConsumers::any(), &field_at(&self.id, "var_indexes"))?;
        }
        if let Some(table) = &self.var_indexes_plus {
            verify_var_index_table(
                reg,
                table,
                VarConsumers::any(),
                &field_at(&self.id, "var_indexes_plus"),
            )?;
        }
        Ok(())
    }
}
