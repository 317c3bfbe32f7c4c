use abyssal_io::RunReport;
use abyssal_lib::render_markdown;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Summarise a merged artifact as markdown", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "merged.csv")]
    input: PathBuf,

    /// Run report written by `abyssal merge`; skipped when missing
    #[arg(short, long, default_value = "merge_report.json")]
    run_report: PathBuf,

    #[arg(short, long, default_value = "report.md")]
    output: PathBuf,

    /// Number of cells in the top table
    #[arg(short, long, default_value_t = 20)]
    top: usize,
}

fn main() -> anyhow::Result<()> {
    abyssal_core::init_logging("abyssal=info");
    let args = Args::parse();

    println!("Summarising {}...", args.input.display());
    let records = abyssal_io::load_merged(&args.input)?;

    let run_report = if args.run_report.exists() {
        Some(RunReport::load(&args.run_report)?)
    } else {
        tracing::warn!(path = %args.run_report.display(), "No run report, summarising artifact only");
        None
    };

    let report = render_markdown(&records, run_report.as_ref(), args.top);
    std::fs::write(&args.output, report)?;
    println!("Report generated: {}", args.output.display());

    Ok(())
}
