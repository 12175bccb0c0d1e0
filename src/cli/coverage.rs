use clap::Args;

use crate::cli::assemble::build_map;
use crate::cli::{created_at, InputArgs, OutputFormat};
use crate::coverage::{analyze_coverage, CoverageStats};

#[derive(Args)]
pub struct CoverageArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Allowed disagreement (bp) between a placement and an offset hint
    #[arg(long)]
    pub offset_slack: Option<u64>,

    /// Length of the target region (bp) for a coverage percentage
    #[arg(long)]
    pub region_length: Option<u64>,
}

pub fn run(args: CoverageArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut inputs = args.input.load()?;
    if let Some(slack) = args.offset_slack {
        inputs.config.assembly.offset_slack = slack;
    }
    let (_, map) = build_map(&inputs)?;
    let stats = analyze_coverage(&map);
    let region_coverage = args.region_length.and_then(|len| stats.coverage_of(len));

    if verbose && !stats.has_data() {
        eprintln!("No clones to analyze");
    }

    match format {
        OutputFormat::Text => print_text_coverage(&stats, region_coverage),
        OutputFormat::Json => print_json_coverage(&stats, region_coverage)?,
        OutputFormat::Tsv => print_tsv_coverage(&stats, region_coverage),
    }

    Ok(())
}

fn optional_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn print_text_coverage(stats: &CoverageStats, region_coverage: Option<f64>) {
    println!("Coverage Summary");
    println!("{}", "=".repeat(60));

    println!("  Input clones: {}", stats.input_clones);
    println!("  Placed clones: {}", stats.placed_clones);
    println!(
        "  Unplaced clones: {} ({})",
        stats.unplaced_clones,
        optional_percent(stats.unplaced_fraction)
    );
    println!("  Segments: {}", stats.segment_count);
    println!("  Total span: {} bp", stats.total_span);
    println!(
        "  Average clone length: {}",
        stats
            .average_clone_length
            .map_or_else(|| "n/a".to_string(), |len| format!("{len:.0} bp"))
    );
    if region_coverage.is_some() {
        println!("  Region coverage: {}", optional_percent(region_coverage));
    }
    println!(
        "  Sequenced clones: {} placed, {} unplaced ({} bp placed)",
        stats.sequenced.placed, stats.sequenced.unplaced, stats.sequenced.placed_length
    );

    if !stats.per_segment.is_empty() {
        println!("\nSegments:");
        for segment in &stats.per_segment {
            println!(
                "  {:>4}: {} clones, {} sequenced, span {} bp",
                segment.index + 1,
                segment.clones,
                segment.sequenced,
                segment.span
            );
        }
    }

    if !stats.per_library.is_empty() {
        println!("\nLibraries:");
        for (library, counts) in &stats.per_library {
            println!(
                "  {library}: {} placed, {} unplaced",
                counts.placed, counts.unplaced
            );
        }
    }
}

fn print_json_coverage(stats: &CoverageStats, region_coverage: Option<f64>) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "created_at": created_at(),
        "coverage": stats,
        "region_coverage": region_coverage,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_coverage(stats: &CoverageStats, region_coverage: Option<f64>) {
    let optional = |v: Option<f64>| v.map_or_else(String::new, |v| format!("{v:.4}"));
    println!(
        "input_clones\tplaced_clones\tunplaced_clones\tsegments\ttotal_span\taverage_clone_length\tunplaced_fraction\tregion_coverage"
    );
    println!(
        "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        stats.input_clones,
        stats.placed_clones,
        stats.unplaced_clones,
        stats.segment_count,
        stats.total_span,
        optional(stats.average_clone_length),
        optional(stats.unplaced_fraction),
        optional(region_coverage),
    );
}
