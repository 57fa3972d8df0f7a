//! Banks command - list registered statement formats

use anyhow::Result;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let formats = ctx.statement_service.formats();

    if json {
        println!("{}", serde_json::to_string_pretty(formats)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec![
        "Token",
        "Bank",
        "Header marker",
        "Desc col",
        "Amount col",
        "Occurrence",
        "Offset",
    ]);
    for format in formats {
        table.add_row(vec![
            format.token.clone(),
            format.display_name.clone(),
            format.header_marker.clone(),
            format.description_column.to_string(),
            format.amount_column.to_string(),
            format.marker_occurrence.to_string(),
            format.data_offset.to_string(),
        ]);
    }
    println!("{table}");
    println!();
    println!("Statement files are matched by token in the filename, e.g. citi-20250625.csv");

    Ok(())
}
