use colored::*;
use is_terminal::IsTerminal;
use std::io;
use tabled::{
    settings::{object::Rows, Alignment, Color, Modify, Style},
    Table, Tabled,
};
use toolhub::search::SearchResponse;
use toolhub::{SearchParams, ToolHub};

use crate::cli::OutputFormat;
use crate::error::{CliResult, IntoCliResult};
use crate::list::table_description;

#[derive(Tabled)]
struct SearchResultRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn run_search_command(
    hub: &ToolHub,
    params: SearchParams,
    format: OutputFormat,
) -> CliResult<()> {
    let response = hub.search(&params)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(response.as_ref()).cli_general_error()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(response.as_ref()).cli_general_error()?;
            print!("{}", yaml);
        }
        OutputFormat::Table => display_table(&response),
    }

    Ok(())
}

fn display_table(response: &SearchResponse) {
    if response.tools.is_empty() {
        println!("No tools found matching '{}'.", response.query);
        return;
    }

    let rows: Vec<SearchResultRow> = response
        .tools
        .iter()
        .map(|tool| SearchResultRow {
            name: tool.name.clone(),
            category: tool.category.clone().unwrap_or_default(),
            score: tool.score.map(|s| format!("{:.2}", s)).unwrap_or_default(),
            description: tool
                .description
                .as_deref()
                .map(table_description)
                .unwrap_or_default(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());

    let is_tty = io::stdout().is_terminal();
    if is_tty {
        table.with(Modify::new(Rows::one(0)).with(Color::FG_BRIGHT_CYAN));
        table.with(Modify::new(Rows::one(1)).with(Color::FG_GREEN));
    }

    table.with(Modify::new(Rows::new(1..)).with(Alignment::left()));

    println!("{}", table);

    if is_tty {
        println!();
        println!(
            "Showing {} of {} matches. Use {} for input schemas.",
            response.returned.to_string().bright_white(),
            response.total_found.to_string().bright_white(),
            "--detail full --format json".cyan()
        );
    }
}
