use abyssal_core::{init_logging, rank_cells, AppConfig};
use abyssal_lib::pipeline;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file; defaults apply when it does not exist
    #[arg(short, long, default_value = "abyssal.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every source table, merge, score and export
    Merge {
        /// Directory the source paths are relative to
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Merged CSV artifact
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the records as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Run report location
        #[arg(long)]
        report: Option<PathBuf>,

        /// Accept cell tables with gaps in the (row, col) grid
        #[arg(long)]
        allow_sparse: bool,
    },
    /// Print the best cells of an exported artifact
    Rank {
        /// Merged CSV artifact; defaults to the configured output
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    init_logging("abyssal=info");
    let args = Args::parse();
    let mut config = AppConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    match args.command {
        Command::Merge {
            data_dir,
            output,
            json,
            report,
            allow_sparse,
        } => {
            if let Some(dir) = data_dir {
                config.sources.base_dir = Some(dir);
            }
            if let Some(output) = output {
                config.export.output = output;
            }
            if json.is_some() {
                config.export.json = json;
            }
            if report.is_some() {
                config.export.report = report;
            }
            if allow_sparse {
                config.pipeline.require_dense_grid = false;
            }

            let summary = pipeline::run(&config)?;
            println!(
                "Merged {} cells into {} ({} warnings)",
                summary.records.len(),
                config.export.output.display(),
                summary.warnings.len()
            );
        }
        Command::Rank { input, limit, json } => {
            let input = input.unwrap_or_else(|| config.export.output.clone());
            let records = abyssal_io::load_merged(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let ranked = rank_cells(&records, limit);
            if json {
                println!("{}", abyssal_io::to_json_pretty(&ranked)?);
            } else {
                println!("{:>4}  {:>10}  {:<12}  {:>12}  {:>10}  {:>10}", "#", "cell", "biome", "value", "difficulty", "score");
                for (i, record) in ranked.iter().enumerate() {
                    println!(
                        "{:>4}  {:>10}  {:<12}  {:>12.2}  {:>10.3}  {:>10.4}",
                        i + 1,
                        record.key().to_string(),
                        record.cell.cell.biome.as_str(),
                        record.total_value,
                        record.difficulty,
                        record.score
                    );
                }
            }
        }
    }

    Ok(())
}
