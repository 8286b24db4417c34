use anyhow::{bail, Result};
use env_logger::Env;
use sqlite_query_engine::database::Database;
use sqlite_query_engine::query::QueryEngine;
use sqlite_query_engine::sql_parser;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        bail!("Usage: {} <database path> <command>", args[0]);
    }

    let mut db = Database::open(&args[1])?;
    let command = &args[2];

    match command.as_str() {
        ".dbinfo" => {
            println!("database page size: {}", db.page_size());
            println!("number of tables: {}", db.table_count()?);
        }
        ".tables" => {
            let names: Vec<String> = db
                .schema_resolver()
                .list_tables()?
                .into_iter()
                .filter(|t| t.tbl_name != "sqlite_sequence")
                .map(|t| t.name)
                .collect();
            println!("{}", names.join(" "));
        }
        _ if command.to_lowercase().starts_with("select") => {
            let parsed = sql_parser::parse(&command.to_lowercase())?;
            for line in QueryEngine::execute(&mut db, &parsed)? {
                println!("{line}");
            }
        }
        _ => bail!("Invalid command: {command}"),
    }

    Ok(())
}
