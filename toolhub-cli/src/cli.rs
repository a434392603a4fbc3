use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::io;
use std::path::PathBuf;
use toolhub::DetailLevel;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[derive(Parser, Debug)]
#[command(name = "toolhub")]
#[command(version)]
#[command(about = "An MCP tool hub with ranked tool discovery and batched calls")]
#[command(long_about = "
toolhub is an MCP (Model Context Protocol) server that exposes a registry of
tools together with a search_tools tool for ranked discovery and a batch_call
tool for running several calls concurrently.

Example usage:
  toolhub serve                        # Run as MCP server on stdio
  toolhub list --format json           # Show the registered tools
  toolhub search \"filter json\"         # Rank tools against a query
  toolhub call echo '{\"message\":\"hi\"}'  # Call one tool
  toolhub completion bash > ~/.bashrc.d/toolhub
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read configuration from this YAML file instead of the search path
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run as MCP server over stdio
    #[command(long_about = "
Runs toolhub as an MCP server on stdin/stdout. The server advertises tools
according to the configured discovery mode and answers tool calls until the
client disconnects or ctrl-c is received.

When stdin is not a terminal, logs are written to ~/.toolhub/mcp.log
(override the file name with TOOLHUB_LOG_FILE).

Example:
  toolhub serve
")]
    Serve,

    /// List registered tools
    #[command(long_about = "
Lists the tools a client would see. By default only the tools advertised
under the configured discovery mode are shown; --all shows every registered
tool.

Examples:
  toolhub list
  toolhub list --all --category utility
  toolhub list --format yaml
")]
    List {
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Only show tools in this category
        #[arg(long)]
        category: Option<String>,

        /// Show every registered tool regardless of discovery mode
        #[arg(long)]
        all: bool,
    },

    /// Search tools with the ranking used by search_tools
    #[command(long_about = "
Ranks the registered tools against a free-text query. An empty query or '*'
matches every tool passing the filters.

Examples:
  toolhub search echo
  toolhub search \"json fields\" --limit 3 --detail full --format json
  toolhub search '*' --category discovery
")]
    Search {
        /// Free-text query
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Restrict results to one category
        #[arg(long)]
        category: Option<String>,

        /// Restrict results to helper (true) or non-helper (false) tools
        #[arg(long)]
        helper: Option<bool>,

        /// Detail level: name_only, name_and_description or full
        #[arg(long, default_value_t = DetailLevel::NameAndDescription)]
        detail: DetailLevel,

        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Call one tool and print its result
    #[command(long_about = "
Calls a registered tool with a JSON object of arguments and prints the text
of its result. A tool error result exits with status 1.

Examples:
  toolhub call echo '{\"message\": \"hello\"}'
  toolhub call batch_call '{\"calls\": [{\"tool\": \"echo\", \"arguments\": {\"message\": \"a\"}}]}'
")]
    Call {
        /// Name of the tool
        tool: String,

        /// Arguments as a JSON object
        arguments: Option<String>,
    },

    /// Generate shell completion scripts
    #[command(long_about = "
Generates shell completion scripts for various shells.

Examples:
  toolhub completion bash > ~/.bashrc.d/toolhub
  toolhub completion zsh > ~/.zfunc/_toolhub
  toolhub completion fish > ~/.config/fish/completions/toolhub.fish
")]
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn try_parse_from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(args)
    }

    pub fn is_tty() -> bool {
        io::stdout().is_terminal()
    }

    pub fn should_use_color() -> bool {
        Self::is_tty() && std::env::var("NO_COLOR").is_err()
    }
}
