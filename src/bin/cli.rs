//! epitrends CLI
//!
//! Command-line access to the trends aggregations:
//! - Time series per disease
//! - Metric correlation
//! - Quarter x year heat map
//! - Distribution and summary
//!
//! Data comes from a local CSV/JSON file or the disease backend.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use epitrends::api::dto::CorrelationResponse;
use epitrends::config::{generate_default_config, Config};
use epitrends::source::{StaticSource, TrendSource, UpstreamSource};
use epitrends::trends::{
    correlate, disease_names, distribution, heat_map, search_diseases, summarize,
    time_series_chart, ChartData, DiseaseTrends, Granularity, HeatMap, Metric, NameValue,
    Selection, SeriesOptions, TrendFilter, TrendSummary, DEFAULT_DISTRIBUTION_LIMIT, QUARTERS,
};

#[derive(Parser)]
#[command(name = "epitrends")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Disease trends analytics")]
#[command(long_about = "epitrends aggregates disease surveillance data into time series,\ncorrelations, heat maps and summaries.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Read trend points from a CSV file
    #[arg(long, global = true, conflicts_with = "json")]
    pub csv: Option<PathBuf>,

    /// Read trend points from a JSON file
    #[arg(long, global = true)]
    pub json: Option<PathBuf>,

    /// Disease backend URL (default: from config)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Config file (default: standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Time series per disease
    Series {
        /// Bucket size (quarterly, yearly)
        #[arg(short, long, default_value = "quarterly")]
        granularity: Granularity,
        /// Metric to chart
        #[arg(short, long, default_value = "cases")]
        metric: Metric,
        /// Diseases to chart (default: top five by metric total)
        #[arg(short, long, value_delimiter = ',')]
        diseases: Vec<String>,
        /// First year to include
        #[arg(long)]
        start_year: Option<i32>,
        /// Last year to include
        #[arg(long)]
        end_year: Option<i32>,
    },

    /// Correlate two metrics
    Correlate {
        /// X axis metric
        #[arg(short, long, default_value = "cases")]
        x: Metric,
        /// Y axis metric
        #[arg(short, long, default_value = "mortalityRate")]
        y: Metric,
    },

    /// Quarter x year heat map
    Heatmap {
        #[arg(short, long, default_value = "cases")]
        metric: Metric,
    },

    /// Top diseases by metric total
    Distribution {
        #[arg(short, long, default_value = "cases")]
        metric: Metric,
        #[arg(short, long, default_value_t = DEFAULT_DISTRIBUTION_LIMIT)]
        limit: usize,
    },

    /// Dashboard summary
    Summary,

    /// List disease names
    Diseases {
        /// Case-insensitive substring
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "epitrends=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let source = build_source(&cli)?;
    let trends = source
        .trends()
        .await
        .with_context(|| format!("Failed to load trends from {}", source.describe()))?;

    run(&cli, &trends)
}

fn build_source(cli: &Cli) -> Result<Arc<dyn TrendSource>> {
    if let Some(path) = &cli.csv {
        let source = StaticSource::from_csv(path)
            .with_context(|| format!("Failed to import {}", path.display()))?;
        return Ok(Arc::new(source));
    }
    if let Some(path) = &cli.json {
        let source = StaticSource::from_json(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        return Ok(Arc::new(source));
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.backend_url {
        config.upstream.base_url = url.clone();
    }

    if let Some(path) = config.upstream.dataset.clone() {
        let source = if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            StaticSource::from_json(&path)?
        } else {
            StaticSource::from_csv(&path)?
        };
        return Ok(Arc::new(source));
    }

    let source = UpstreamSource::new(config.upstream.client_config(), config.cache.stale_after())?;
    Ok(Arc::new(source))
}

fn run(cli: &Cli, trends: &DiseaseTrends) -> Result<()> {
    let json = cli.format == OutputFormat::Json;

    match &cli.command {
        Commands::Series {
            granularity,
            metric,
            diseases,
            start_year,
            end_year,
        } => {
            let filter = TrendFilter {
                start_year: *start_year,
                end_year: *end_year,
                quarters: Vec::new(),
            };
            filter.validate()?;

            let options = SeriesOptions {
                granularity: *granularity,
                metric: *metric,
                selection: Selection::from_names(diseases.iter().cloned()),
                filter,
            };
            let chart = time_series_chart(Some(trends), &options);

            if json {
                println!("{}", serde_json::to_string_pretty(&chart)?);
            } else {
                print_series(&chart, *metric);
            }
        }

        Commands::Correlate { x, y } => {
            let correlation = correlate(&trends.points, *x, *y);
            if correlation.sample_size == 0 {
                bail!("No points carry both {} and {}", x.label(), y.label());
            }

            if json {
                let response = CorrelationResponse::from(correlation);
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("{} vs {}", x.label(), y.label());
                println!("  Coefficient: {}", correlation);
                println!("  Sample size: {}", correlation.sample_size);
            }
        }

        Commands::Heatmap { metric } => {
            let map = heat_map(Some(trends), *metric);
            if json {
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else {
                print_heat_map(&map);
            }
        }

        Commands::Distribution { metric, limit } => {
            let entries = distribution(&trends.points, *metric, *limit);
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print_distribution(&entries, *metric);
            }
        }

        Commands::Summary => {
            let summary = summarize(&trends.points);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
        }

        Commands::Diseases { search } => {
            let all = disease_names(&trends.points);
            let names: Vec<&String> = match search {
                Some(query) => search_diseases(&all, query),
                None => all.iter().collect(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else if names.is_empty() {
                println!("No matching diseases.");
            } else {
                for name in names {
                    println!("{}", name);
                }
            }
        }

        Commands::Config { .. } => {}
    }

    Ok(())
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn print_series(chart: &ChartData, metric: Metric) {
    if chart.is_empty() {
        println!("No data.");
        return;
    }

    println!("{}", metric.label());
    print!("{:<20}", "Disease");
    for label in &chart.labels {
        print!(" {:>10}", label);
    }
    println!();
    println!("{}", "-".repeat(20 + chart.labels.len() * 11));

    for dataset in &chart.datasets {
        print!("{:<20}", truncate(&dataset.label, 20));
        for value in &dataset.data {
            print!(" {:>10}", format_value(*value));
        }
        println!();
    }
}

fn print_heat_map(map: &HeatMap) {
    if map.is_empty() {
        println!("No data.");
        return;
    }

    println!("{} by quarter (max {})", map.metric.label(), format_value(map.max_value));
    print!("{:<8}", "");
    for year in &map.years {
        print!(" {:>10}", year);
    }
    println!();

    for (quarter, row) in QUARTERS.iter().zip(&map.rows) {
        print!("{:<8}", format!("Q{}", quarter));
        for cell in row {
            print!(" {:>10}", format_value(cell.value));
        }
        println!();
    }
}

fn print_distribution(entries: &[NameValue], metric: Metric) {
    if entries.is_empty() {
        println!("No data.");
        return;
    }

    println!("{:<30} {:>14}", "Disease", metric.label());
    println!("{}", "-".repeat(45));
    for entry in entries {
        println!("{:<30} {:>14}", truncate(&entry.name, 30), format_value(entry.value));
    }
}

fn print_summary(summary: &TrendSummary) {
    println!("Total cases:     {}", summary.total_cases);
    println!("Diseases:        {}", summary.total_diseases);
    match summary.average_incidence_rate {
        Some(rate) => println!("Avg incidence:   {:.2}", rate),
        None => println!("Avg incidence:   n/a"),
    }
    println!(
        "Trend:           {:?} ({:+.2}%)",
        summary.trend_direction, summary.change_percent
    );

    if !summary.top_diseases.is_empty() {
        println!();
        println!("Top diseases:");
        for disease in &summary.top_diseases {
            println!("  {:<28} {:>12}", truncate(&disease.name, 28), disease.cases);
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
