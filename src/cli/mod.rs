use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::bail;
use clap::{Args, Parser, Subcommand};

use crate::config::AppConfig;
use crate::logging;
use crate::services::format::format_number;
use crate::services::query::{top_cities, DEFAULT_YEAR};
use crate::services::{display_city_name, DataLoaderService, QueryService};
use crate::types::{Summary, TopCity};

/// Terminal dashboard for the Olist Brazilian e-commerce dataset
#[derive(Parser)]
#[command(name = "olistdash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the Olist CSV files
    #[arg(long, global = true, env = "OLISTDASH_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// City boundary GeoJSON (URL or local path)
    #[arg(long, global = true, env = "OLISTDASH_BOUNDARIES")]
    boundaries: Option<String>,

    /// Start without the choropleth map
    #[arg(long, global = true)]
    no_map: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive TUI (default)
    Tui,

    #[command(flatten)]
    Query(QueryCommand),
}

/// Subcommands that print a report and exit
#[derive(Subcommand)]
enum QueryCommand {
    /// Show the summary cards and top cities for a selection
    Summary {
        #[command(flatten)]
        query: QueryArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the product categories
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rank customer cities by distinct orders
    Cities {
        #[command(flatten)]
        query: QueryArgs,

        /// Number of cities to show
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Year/category selection shared by the query commands
#[derive(Args, Debug, Clone, PartialEq, Eq)]
struct QueryArgs {
    /// Purchase year
    #[arg(long, default_value_t = DEFAULT_YEAR, value_parser = clap::value_parser!(i32).range(2016..=2018))]
    year: i32,

    /// Product category (defaults to cama_mesa_banho, or the first category)
    #[arg(long)]
    category: Option<String>,
}

impl QueryArgs {
    /// Validate the category against the loaded data
    fn resolve_category<'a>(&'a self, query: &'a QueryService) -> anyhow::Result<&'a str> {
        match &self.category {
            Some(category) => {
                if !query.categories().iter().any(|c| c == category) {
                    bail!(
                        "unknown category '{}' (run `olistdash categories` for the list)",
                        category
                    );
                }
                Ok(category)
            }
            None => match query.default_category() {
                Some(category) => Ok(category),
                None => bail!("no product categories in the data"),
            },
        }
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            None | Some(Commands::Tui) => {
                let config =
                    AppConfig::new(self.data_dir, self.boundaries.as_deref(), !self.no_map)?;
                logging::init_file(&config.log_path());
                crate::tui::run(config)
            }
            Some(Commands::Query(command)) => {
                logging::init_stderr();
                let config = AppConfig::for_queries(self.data_dir, self.boundaries.as_deref());
                let loaded = DataLoaderService::new(config).load()?;
                let query = QueryService::new(loaded.tables);
                run_command(command, &query)
            }
        }
    }
}

fn run_command(command: QueryCommand, query: &QueryService) -> anyhow::Result<()> {
    match command {
        QueryCommand::Summary { query: args, json } => {
            let category = args.resolve_category(query)?;
            let summary = query.summarize(args.year, category);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!("{}", render_summary(&summary));
            }
            Ok(())
        }
        QueryCommand::Categories { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(query.categories())?);
            } else {
                for category in query.categories() {
                    println!("{}", category);
                }
            }
            Ok(())
        }
        QueryCommand::Cities {
            query: args,
            limit,
            json,
        } => {
            let category = args.resolve_category(query)?;
            let summary = query.summarize(args.year, category);
            let cities = top_cities(&summary.map_data, limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&cities)?);
            } else {
                print!("{}", render_cities(&cities));
            }
            Ok(())
        }
    }
}

/// Plain-text summary report
fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} / {}", summary.year, summary.category);
    for (title, value) in [
        ("REVENUE - BRL", &summary.cards.revenue),
        ("TOTAL ORDERS", &summary.cards.total_orders),
        ("AVG TICKET PER ORDER - BRL", &summary.cards.avg_ticket),
        ("TRANSACTION APPROVAL RATE", &summary.cards.approval_rate),
    ] {
        let _ = writeln!(out, "  {:<28}{:>12}", title, value);
    }
    out.push('\n');
    out.push_str(&render_cities(&summary.top_cities));
    out
}

/// Plain-text CITY / ORDERS table
fn render_cities(cities: &[TopCity]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  {:<28}{:>12}", "CITY", "ORDERS");
    if cities.is_empty() {
        let _ = writeln!(out, "  (no orders)");
    }
    for city in cities {
        let _ = writeln!(
            out,
            "  {:<28}{:>12}",
            display_city_name(&city.city),
            format_number(city.orders)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SummaryCards;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["olistdash"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.no_map);
    }

    #[test]
    fn test_cli_parse_summary_defaults() {
        let cli = Cli::try_parse_from(["olistdash", "summary"]).unwrap();
        match cli.command {
            Some(Commands::Query(QueryCommand::Summary { query, json })) => {
                assert_eq!(query.year, 2017);
                assert_eq!(query.category, None);
                assert!(!json);
            }
            _ => panic!("expected summary"),
        }
    }

    #[test]
    fn test_cli_parse_summary_with_selection() {
        let cli = Cli::try_parse_from([
            "olistdash",
            "--data-dir",
            "data",
            "summary",
            "--year",
            "2018",
            "--category",
            "pet_shop",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, PathBuf::from("data"));
        assert!(matches!(
            cli.command,
            Some(Commands::Query(QueryCommand::Summary { ref query, json: true }))
                if query.year == 2018 && query.category.as_deref() == Some("pet_shop")
        ));
    }

    #[test]
    fn test_cli_rejects_year_out_of_range() {
        assert!(Cli::try_parse_from(["olistdash", "summary", "--year", "2019"]).is_err());
        assert!(Cli::try_parse_from(["olistdash", "cities", "--year", "2015"]).is_err());
    }

    #[test]
    fn test_cli_parse_cities_limit() {
        let cli = Cli::try_parse_from(["olistdash", "cities", "--limit", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Query(QueryCommand::Cities {
                limit: 3,
                json: false,
                ..
            }))
        ));
    }

    #[test]
    fn test_cli_parse_categories_is_query_command() {
        let cli = Cli::try_parse_from(["olistdash", "categories", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Query(QueryCommand::Categories { json: true }))
        ));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["olistdash", "tui", "--no-map"]).unwrap();
        assert!(cli.no_map);
        assert!(matches!(cli.command, Some(Commands::Tui)));
    }

    // ========== Rendering tests ==========

    fn summary() -> Summary {
        Summary {
            year: 2017,
            category: "pet_shop".into(),
            revenue_brl: 110.0,
            total_orders: 1,
            approved_orders: 1,
            cards: SummaryCards {
                revenue: "0k".into(),
                total_orders: "1".into(),
                avg_ticket: "110.00".into(),
                approval_rate: "100.00%".into(),
            },
            top_cities: vec![TopCity {
                city: "sao paulo".into(),
                orders: 1,
            }],
            map_data: Vec::new(),
        }
    }

    #[test]
    fn test_render_summary() {
        let out = render_summary(&summary());
        assert!(out.starts_with("2017 / pet_shop\n"));
        assert!(out.contains("110.00"));
        assert!(out.contains("100.00%"));
        assert!(out.contains("Sao Paulo"));
    }

    #[test]
    fn test_render_cities_empty() {
        let out = render_cities(&[]);
        assert!(out.contains("CITY"));
        assert!(out.contains("(no orders)"));
    }
}
