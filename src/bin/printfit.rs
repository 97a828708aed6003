use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use printfit::{LayoutAdjuster, LayoutAdjusterBuilder, PrepareReport, PrintPrepError, Px};

#[derive(Parser)]
#[command(name = "printfit", version, about = "Prepare HTML documents for paged print export")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Prepare a single HTML file
    Prepare(PrepareArgs),

    /// Prepare many HTML files in parallel
    Batch(BatchArgs),
}

#[derive(clap::Args)]
struct RuleArgs {
    /// Force a page break after every Nth block and table row
    #[arg(long, default_value_t = printfit::DEFAULT_BREAK_EVERY)]
    break_every: usize,

    /// Labels longer than this many characters are enlarged
    #[arg(long, default_value_t = 16)]
    label_threshold: usize,

    /// Font size applied to an enlarged label, in CSS pixels
    #[arg(long, default_value_t = 42.0)]
    label_font_size: f32,

    /// Line height applied to an enlarged label, in CSS pixels
    #[arg(long, default_value_t = 47.0)]
    label_line_height: f32,

    /// Max height applied to an enlarged label, in CSS pixels
    #[arg(long, default_value_t = 94.0)]
    label_max_height: f32,

    /// Selector for paginated blocks
    #[arg(long, default_value = printfit::DEFAULT_BLOCK_SELECTOR)]
    block_selector: String,

    /// Selector for paginated table rows
    #[arg(long, default_value = printfit::DEFAULT_ROW_SELECTOR)]
    row_selector: String,

    /// Selector for the name label
    #[arg(long, default_value = printfit::DEFAULT_LABEL_SELECTOR)]
    label_selector: String,

    /// Number of resize events replayed after load
    #[arg(long, default_value_t = 0)]
    resize: usize,

    /// Write a JSONL trace of every adjustment pass
    #[arg(long)]
    debug_log: Option<PathBuf>,
}

impl RuleArgs {
    fn builder(&self) -> LayoutAdjusterBuilder {
        let mut builder = LayoutAdjuster::builder()
            .break_every(self.break_every)
            .label_threshold(self.label_threshold)
            .label_font_size(Px::from_f32(self.label_font_size))
            .label_line_height(Px::from_f32(self.label_line_height))
            .label_max_height(Px::from_f32(self.label_max_height))
            .block_selector(self.block_selector.clone())
            .row_selector(self.row_selector.clone())
            .label_selector(self.label_selector.clone());
        if let Some(path) = &self.debug_log {
            builder = builder.debug_log(path.clone());
        }
        builder
    }
}

#[derive(clap::Args)]
struct PrepareArgs {
    /// HTML file to prepare
    input: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the JSON report to stderr
    #[arg(long)]
    report: bool,

    #[command(flatten)]
    rules: RuleArgs,
}

#[derive(clap::Args)]
struct BatchArgs {
    /// HTML files to prepare
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory receiving prepared files (same file names)
    #[arg(long)]
    out_dir: PathBuf,

    #[command(flatten)]
    rules: RuleArgs,
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Command::Prepare(args) => do_prepare(args),
        Command::Batch(args) => do_batch(args),
    };
    match result {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    }
}

fn do_prepare(args: PrepareArgs) -> Result<i32, PrintPrepError> {
    let adjuster = args.rules.builder().build()?;
    let html = std::fs::read_to_string(&args.input)?;
    let prepared = adjuster.prepare(&html, args.rules.resize);
    match &args.output {
        Some(path) => std::fs::write(path, &prepared.html)?,
        None => print!("{}", prepared.html),
    }
    warn_handler_failures(&args.input, &prepared.report);
    if args.report {
        eprintln!("{}", prepared.report.to_json());
    }
    Ok(0)
}

fn do_batch(args: BatchArgs) -> Result<i32, PrintPrepError> {
    let adjuster = args.rules.builder().build()?;
    std::fs::create_dir_all(&args.out_dir)?;
    let summary = run_batch(&adjuster, &args.inputs, &args.out_dir, args.rules.resize);
    eprintln!("{} written, {} failed", summary.written, summary.failed);
    Ok(if summary.failed == 0 { 0 } else { 1 })
}

#[derive(Debug, Default, PartialEq, Eq)]
struct BatchSummary {
    written: usize,
    failed: usize,
}

/// Reads, prepares and writes each input. A file that cannot be read or
/// written counts as one failure; the other files still go through.
fn run_batch(
    adjuster: &LayoutAdjuster,
    inputs: &[PathBuf],
    out_dir: &Path,
    resize: usize,
) -> BatchSummary {
    let mut summary = BatchSummary::default();
    let mut readable = Vec::with_capacity(inputs.len());
    let mut sources = Vec::with_capacity(inputs.len());
    for path in inputs {
        match std::fs::read_to_string(path) {
            Ok(html) => {
                readable.push(path);
                sources.push(html);
            }
            Err(err) => {
                summary.failed += 1;
                eprintln!("error: {}: {err}", path.display());
            }
        }
    }

    let results = adjuster.prepare_batch(&sources, resize);
    for (path, prepared) in readable.into_iter().zip(results) {
        warn_handler_failures(path, &prepared.report);
        let target = output_path(out_dir, path);
        if let Err(err) = std::fs::write(&target, &prepared.html) {
            summary.failed += 1;
            eprintln!("error: {}: {err}", target.display());
            continue;
        }
        summary.written += 1;
        eprintln!(
            "{} -> {} ({} block breaks, {} row breaks)",
            path.display(),
            target.display(),
            prepared.report.page_breaks.blocks.marked,
            prepared.report.page_breaks.rows.marked,
        );
    }
    summary
}

fn warn_handler_failures(input: &Path, report: &PrepareReport) {
    for failure in &report.failures {
        eprintln!(
            "warning: {}: {} handler failed: {}",
            input.display(),
            failure.event.as_str(),
            failure.message
        );
    }
}

fn output_path(out_dir: &Path, input: &Path) -> PathBuf {
    match input.file_name() {
        Some(name) => out_dir.join(name),
        None => out_dir.join("prepared.html"),
    }
}
