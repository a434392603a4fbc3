use clap::CommandFactory;
use is_terminal::IsTerminal;
use std::process;
use toolhub::SearchParams;
use toolhub_cli::cli::{Cli, Commands};
use toolhub_cli::error::{handle_cli_result, CliResult};
use toolhub_cli::exit_codes::{EXIT_SUCCESS, EXIT_WARNING};
use toolhub_cli::{call, completions, config, list, logging, search, serve};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    let Some(command) = cli.command else {
        let exit_code = match Cli::command().print_help() {
            Ok(()) => EXIT_SUCCESS,
            Err(_) => EXIT_WARNING,
        };
        process::exit(exit_code);
    };

    let is_mcp_mode = matches!(command, Commands::Serve) && !std::io::stdin().is_terminal();
    logging::init(
        logging::log_level(cli.verbose, cli.debug, cli.quiet),
        is_mcp_mode,
    );

    let config_path = cli.config.as_deref();
    let result: CliResult<()> = match command {
        Commands::Serve => {
            tracing::info!("Starting MCP server");
            match config::build_hub(config_path) {
                Ok(hub) => serve::run_server(hub).await,
                Err(e) => Err(e),
            }
        }
        Commands::List {
            format,
            category,
            all,
        } => config::build_hub(config_path)
            .and_then(|hub| list::run_list_command(&hub, format, category, all)),
        Commands::Search {
            query,
            limit,
            category,
            helper,
            detail,
            format,
        } => {
            let mut params = SearchParams::new(query).with_detail_level(detail);
            params.limit = limit;
            params.category = category;
            params.is_helper = helper;
            config::build_hub(config_path)
                .and_then(|hub| search::run_search_command(&hub, params, format))
        }
        Commands::Call { tool, arguments } => match config::build_hub(config_path) {
            Ok(hub) => call::run_call_command(&hub, &tool, arguments.as_deref()).await,
            Err(e) => Err(e),
        },
        Commands::Completion { shell } => {
            tracing::debug!("Generating completion for {:?}", shell);
            completions::print_completion(shell).map_err(|e| {
                toolhub_cli::error::CliError::new(format!("Completion error: {}", e), EXIT_WARNING)
            })
        }
    };

    process::exit(handle_cli_result(result));
}
