/*
Composes SchemaResolver + BTreeWalker + RecordCodec: resolves the target
table, walks its rows, applies the optional predicate, and projects the
requested columns into pipe-delimited output lines.
*/

use std::cmp::Ordering;

use crate::database::Database;
use crate::error::DbError;
use crate::sql_data_types::Value;
use crate::sql_parser::{Op, ParsedQuery};

pub struct QueryEngine;

impl QueryEngine {
    pub fn execute(db: &mut Database, query: &ParsedQuery) -> Result<Vec<String>, DbError> {
        let resolved = db.schema_resolver().resolve(&query.table)?;

        let indices: Vec<usize> = if query.all_cols {
            (0..resolved.columns.len()).collect()
        } else {
            query
                .col_names
                .iter()
                .map(|name| {
                    resolved
                        .column_index(name)
                        .ok_or_else(|| DbError::UnknownColumn(name.clone()))
                })
                .collect::<Result<Vec<usize>, DbError>>()?
        };

        let predicate_idx = match &query.cond {
            Some(cond) => Some(
                resolved
                    .column_index(&cond.col)
                    .ok_or_else(|| DbError::UnknownColumn(cond.col.clone()))?,
            ),
            None => None,
        };

        let id_alias_idx = resolved
            .columns
            .iter()
            .position(|c| c.name == "id" && c.declared_type == "integer");

        let rows = db.btree_walker().walk(resolved.root_page)?;

        let mut kept = Vec::new();
        for (row_id, mut values) in rows {
            if values.len() != resolved.columns.len() {
                return Err(DbError::MalformedRecord(format!(
                    "row {row_id} in '{}' has {} columns, expected {}",
                    query.table,
                    values.len(),
                    resolved.columns.len()
                )));
            }

            if let Some(idx) = id_alias_idx {
                if matches!(values.get(idx), Some(Value::Null)) {
                    values[idx] = Value::Int(row_id);
                }
            }

            if let (Some(cond), Some(idx)) = (&query.cond, predicate_idx) {
                if !evaluate_predicate(&values[idx], cond.op, &cond.value) {
                    continue;
                }
            }

            kept.push(values);
        }

        if query.count_cols {
            return Ok(vec![kept.len().to_string()]);
        }

        Ok(kept
            .into_iter()
            .map(|values| {
                indices
                    .iter()
                    .map(|&i| values[i].to_string())
                    .collect::<Vec<_>>()
                    .join("|")
            })
            .collect())
    }
}

fn evaluate_predicate(value: &Value, op: Op, literal: &str) -> bool {
    let ordering = match value {
        Value::Text(bytes) => bytes.as_slice().cmp(literal.as_bytes()),
        Value::Blob(bytes) => bytes.as_slice().cmp(literal.as_bytes()),
        Value::Int(n) => match literal.parse::<i64>() {
            Ok(lit) => n.cmp(&lit),
            Err(_) => return false,
        },
        Value::Float(x) => match literal.parse::<f64>() {
            Ok(lit) => match x.partial_cmp(&lit) {
                Some(ord) => ord,
                None => return false,
            },
            Err(_) => return false,
        },
        Value::Null => return false,
    };

    match op {
        Op::Eq => ordering == Ordering::Equal,
        Op::Ne => ordering != Ordering::Equal,
        Op::Lt => ordering == Ordering::Less,
        Op::Gt => ordering == Ordering::Greater,
        Op::Le => ordering != Ordering::Greater,
        Op::Ge => ordering != Ordering::Less,
    }
}
