//! Customers command - show the customer directory for one bank

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use counterpart_core::config::Config;
use counterpart_core::{CounterpartContext, CustomerRecord};

use super::get_counterpart_dir;
use crate::output;

pub fn run(bank: &str, customers: Option<PathBuf>, json: bool) -> Result<()> {
    let counterpart_dir = get_counterpart_dir();
    std::fs::create_dir_all(&counterpart_dir).with_context(|| {
        format!(
            "Failed to create counterpart directory: {:?}",
            counterpart_dir
        )
    })?;

    let mut config = Config::load(&counterpart_dir)?;
    if let Some(customers) = customers {
        config.customers_file = Some(customers);
    }
    let ctx = CounterpartContext::with_config(&counterpart_dir, config);

    let format = ctx.statement_service.format_for_token(bank).ok_or_else(|| {
        anyhow::anyhow!("Unknown bank token '{}'. Run 'cpt banks' to list them.", bank)
    })?;
    let directory = ctx.directory_service.load(&format.display_name)?;

    if json {
        let records: Vec<&CustomerRecord> = directory.iter().collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("{}", format.display_name.bold());
    println!();

    let mut table = output::create_table();
    table.set_header(vec!["Keyword", "Customer ID", "Name", "GL account"]);
    for record in directory.iter() {
        table.add_row(vec![
            record.keyword.clone(),
            record.customer_id.clone(),
            record.display_name.clone(),
            record.gl_account.clone(),
        ]);
    }
    println!("{table}");
    println!();
    println!(
        "{} records from {}",
        directory.len(),
        ctx.directory_service.table_path().display()
    );

    Ok(())
}
