pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::filter::{FilterOptions, ParamMode, Precedence};

#[derive(Parser)]
#[command(name = "listing")]
#[command(about = "Listing CLI - Explain or run filtered, sorted, paginated listing queries")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Reject malformed parameter values instead of ignoring them")]
    pub strict: bool,

    #[arg(
        long,
        global = true,
        value_parser = parse_precedence,
        help = "Conflict rule for parameters on the same field: most-specific | last-specified"
    )]
    pub precedence: Option<Precedence>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Show the filter, sort and page a query string resolves to")]
    Explain {
        #[arg(help = "Collection name (students, grades, products)")]
        collection: String,

        #[arg(help = "Query string, e.g. 'minAge=18&sortBy=age'", default_value = "")]
        query: String,

        #[arg(long, help = "Also print the PostgreSQL statements")]
        sql: bool,
    },

    #[command(about = "Run a query string against the bundled fixtures")]
    Query {
        #[arg(help = "Collection name (students, grades, products)")]
        collection: String,

        #[arg(help = "Query string, e.g. 'cities=Madrid,Bilbao&limit=5'", default_value = "")]
        query: String,
    },

    #[command(about = "List collections and the parameters they accept")]
    Collections,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

fn parse_precedence(s: &str) -> Result<Precedence, String> {
    Precedence::parse(s).ok_or_else(|| format!("unknown precedence '{}', expected most-specific or last-specified", s))
}

/// Configured filter options with command-line overrides applied.
pub fn resolve_options(cli: &Cli, base: FilterOptions) -> FilterOptions {
    let mut options = base;
    if cli.strict {
        options.param_mode = ParamMode::Strict;
    }
    if let Some(precedence) = cli.precedence {
        options.precedence = precedence;
    }
    options
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let options = resolve_options(&cli, FilterOptions::from_config(&crate::config::config().filter));

    match cli.command {
        Commands::Explain { collection, query, sql } => {
            commands::explain::handle(&collection, &query, sql, options, output_format)
        }
        Commands::Query { collection, query } => {
            commands::query::handle(&collection, &query, options, output_format).await
        }
        Commands::Collections => commands::collections::handle(output_format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_explain_with_global_flags() {
        let cli = Cli::try_parse_from([
            "listing", "explain", "students", "minAge=18", "--sql", "--json", "--precedence", "last-specified",
        ])
        .unwrap();
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Json);
        assert_eq!(cli.precedence, Some(Precedence::LastSpecified));
        assert!(matches!(cli.command, Commands::Explain { sql: true, .. }));
    }

    #[test]
    fn rejects_unknown_precedence() {
        assert!(Cli::try_parse_from(["listing", "--precedence", "random", "collections"]).is_err());
    }

    #[test]
    fn flags_override_configured_options() {
        let cli = Cli::try_parse_from(["listing", "--strict", "query", "students"]).unwrap();
        let options = resolve_options(&cli, FilterOptions::default());
        assert_eq!(options.param_mode, ParamMode::Strict);
        assert_eq!(options.precedence, Precedence::MostSpecific);
        assert_eq!(OutputFormat::from_cli(&cli), OutputFormat::Text);
    }
}
