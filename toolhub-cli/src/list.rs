use colored::*;
use is_terminal::IsTerminal;
use serde::Serialize;
use std::collections::HashSet;
use std::io;
use tabled::{
    settings::{object::Rows, Alignment, Color, Modify, Style},
    Table, Tabled,
};
use toolhub::{ToolHub, ToolPriority};

use crate::cli::OutputFormat;
use crate::error::{CliResult, IntoCliResult};

const DESCRIPTION_WIDTH: usize = 60;

#[derive(Tabled)]
struct ToolRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Helper")]
    helper: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInfo {
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub priority: ToolPriority,
    pub is_helper: bool,
    pub tags: Vec<String>,
    pub advertised: bool,
    pub description: String,
}

/// Collect the tools to list, in registry order
///
/// Without `all`, tools hidden by the discovery mode are left out.
pub fn collect_tools(hub: &ToolHub, category: Option<&str>, all: bool) -> CliResult<Vec<ToolInfo>> {
    let advertised: HashSet<String> = hub
        .advertised_tools()?
        .into_iter()
        .map(|descriptor| descriptor.name)
        .collect();

    let tools = hub
        .registry()
        .entries()?
        .into_iter()
        .filter(|(descriptor, _)| all || advertised.contains(&descriptor.name))
        .filter(|(_, metadata)| category.map_or(true, |c| metadata.category == c))
        .map(|(descriptor, metadata)| ToolInfo {
            advertised: advertised.contains(&descriptor.name),
            name: descriptor.name,
            category: metadata.category,
            subcategory: metadata.subcategory,
            priority: metadata.priority,
            is_helper: metadata.is_helper,
            tags: metadata.tags,
            description: descriptor.description,
        })
        .collect();

    Ok(tools)
}

pub fn run_list_command(
    hub: &ToolHub,
    format: OutputFormat,
    category: Option<String>,
    all: bool,
) -> CliResult<()> {
    let tools = collect_tools(hub, category.as_deref(), all)?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&tools).cli_general_error()?;
            println!("{}", json);
        }
        OutputFormat::Yaml => {
            let yaml = serde_yaml::to_string(&tools).cli_general_error()?;
            print!("{}", yaml);
        }
        OutputFormat::Table => display_table(&tools, hub),
    }

    Ok(())
}

/// First line of a description, shortened for table cells
pub(crate) fn table_description(description: &str) -> String {
    let first_line = description.lines().next().unwrap_or("").trim();
    if first_line.chars().count() > DESCRIPTION_WIDTH {
        let cut: String = first_line.chars().take(DESCRIPTION_WIDTH - 3).collect();
        format!("{}...", cut)
    } else {
        first_line.to_string()
    }
}

fn display_table(tools: &[ToolInfo], hub: &ToolHub) {
    if tools.is_empty() {
        println!("No tools found matching the criteria.");
        return;
    }

    let is_tty = io::stdout().is_terminal();

    let rows: Vec<ToolRow> = tools
        .iter()
        .map(|tool| ToolRow {
            name: tool.name.clone(),
            category: match &tool.subcategory {
                Some(sub) => format!("{}/{}", tool.category, sub),
                None => tool.category.clone(),
            },
            priority: tool.priority.to_string(),
            helper: if tool.is_helper { "yes" } else { "" }.to_string(),
            description: table_description(&tool.description),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());

    if is_tty {
        table.with(Modify::new(Rows::one(0)).with(Color::FG_BRIGHT_CYAN));

        for (i, tool) in tools.iter().enumerate() {
            let row_index = i + 1;
            if !tool.advertised {
                table.with(Modify::new(Rows::one(row_index)).with(Color::FG_BRIGHT_BLACK));
            } else if tool.priority == ToolPriority::Critical {
                table.with(Modify::new(Rows::one(row_index)).with(Color::FG_GREEN));
            }
        }
    }

    table.with(Modify::new(Rows::new(1..)).with(Alignment::left()));

    println!("{}", table);

    if is_tty {
        println!();
        println!(
            "{} {} mode, {} of {} tools shown",
            "Discovery:".bright_white(),
            hub.config().discovery_mode,
            tools.len(),
            hub.registry().resolved_count()
        );
        println!("  {} Critical tools", "●".green());
        println!("  {} Not advertised to clients", "●".bright_black());
    }
}
