/*
The sqlite_schema table, rooted at page 1, describes every other table and
index in the file. Its row shape is fixed: type, name, tbl_name, rootpage,
sql, in that order.
*/

use std::fs::File;

use crate::btree::BTreeWalker;
use crate::error::DbError;
use crate::sql_data_types::Value;
use crate::sql_parser::{self, Action};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub declared_type: String,
}

#[derive(Debug, Clone)]
pub struct TableInfo {
    pub obj_type: String,
    pub name: String,
    pub tbl_name: String,
    pub root_page: u32,
    pub sql: String,
}

#[derive(Debug, Clone)]
pub struct ResolvedTable {
    pub root_page: u32,
    pub columns: Vec<ColumnDef>,
}

impl ResolvedTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

pub struct SchemaResolver<'f> {
    file: &'f mut File,
    page_size: usize,
}

impl<'f> SchemaResolver<'f> {
    pub fn new(file: &'f mut File, page_size: usize) -> Self {
        SchemaResolver { file, page_size }
    }

    /// Every schema entry whose type is "table", in cell-pointer order.
    /// Includes `sqlite_sequence`; callers filter it out at the CLI boundary.
    pub fn list_tables(&mut self) -> Result<Vec<TableInfo>, DbError> {
        let mut walker = BTreeWalker::new(self.file, self.page_size);
        let rows = walker.walk(1)?;

        let mut tables = Vec::new();
        for (_, values) in rows {
            let info = schema_row_to_table_info(&values)?;
            if info.obj_type == "table" {
                tables.push(info);
            }
        }
        Ok(tables)
    }

    pub fn resolve(&mut self, name: &str) -> Result<ResolvedTable, DbError> {
        let tables = self.list_tables()?;
        let info = tables
            .into_iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| DbError::TableNotFound(name.to_string()))?;

        let parsed = sql_parser::parse(&info.sql.to_lowercase())?;
        if parsed.action() != Action::Create {
            return Err(DbError::MalformedRecord(format!(
                "schema sql for table '{name}' is not a CREATE TABLE statement"
            )));
        }

        let columns = parsed
            .col_names
            .into_iter()
            .zip(parsed.col_dtypes)
            .map(|(name, declared_type)| ColumnDef {
                name,
                declared_type,
            })
            .collect();

        Ok(ResolvedTable {
            root_page: info.root_page,
            columns,
        })
    }
}

fn schema_row_to_table_info(values: &[Value]) -> Result<TableInfo, DbError> {
    if values.len() != 5 {
        return Err(DbError::MalformedRecord(format!(
            "sqlite_schema row has {} columns, expected 5",
            values.len()
        )));
    }

    Ok(TableInfo {
        obj_type: text_column(&values[0], "type")?,
        name: text_column(&values[1], "name")?,
        tbl_name: text_column(&values[2], "tbl_name")?,
        root_page: int_column(&values[3], "rootpage")?,
        sql: text_column(&values[4], "sql").unwrap_or_default(),
    })
}

fn text_column(value: &Value, field: &str) -> Result<String, DbError> {
    match value {
        Value::Text(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        Value::Null => Ok(String::new()),
        other => Err(DbError::MalformedRecord(format!(
            "sqlite_schema.{field} is not text: {other:?}"
        ))),
    }
}

fn int_column(value: &Value, field: &str) -> Result<u32, DbError> {
    match value {
        Value::Int(n) => Ok(*n as u32),
        other => Err(DbError::MalformedRecord(format!(
            "sqlite_schema.{field} is not an integer: {other:?}"
        ))),
    }
}
