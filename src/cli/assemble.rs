use clap::Args;

use crate::assembly::assembler::{assemble_map, MergeDecision};
use crate::assembly::segment::{PhysicalMap, UnplacedReason};
use crate::cli::{created_at, InputArgs, Inputs, OutputFormat};
use crate::core::clone::BacClone;
use crate::matching::pairs::{find_pairs, PairSet};
use crate::parsing::attributes::range_mid;

#[derive(Args)]
pub struct AssembleArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Allowed disagreement (bp) between a placement and an offset hint
    #[arg(long)]
    pub offset_slack: Option<u64>,
}

/// Find pairs and assemble them into a map
pub(crate) fn build_map(inputs: &Inputs) -> anyhow::Result<(PairSet, PhysicalMap)> {
    let pairs = find_pairs(&inputs.clones, &inputs.libraries, &inputs.config.pairing);
    let map = assemble_map(&inputs.clones, &pairs.relations, &inputs.config.assembly)?;
    Ok((pairs, map))
}

pub fn run(args: AssembleArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut inputs = args.input.load()?;
    if let Some(slack) = args.offset_slack {
        inputs.config.assembly.offset_slack = slack;
    }

    let (pairs, map) = build_map(&inputs)?;
    let mut clones = inputs.clones;
    map.apply_placements(&mut clones);

    if verbose {
        eprintln!(
            "{} segments, {} clones placed, {} unplaced, {} relations excluded",
            map.segments.len(),
            map.placed_count(),
            map.unplaced.len(),
            map.diagnostics.len()
        );
    }

    match format {
        OutputFormat::Text => print_text_map(&map, &pairs),
        OutputFormat::Json => print_json_map(&map, &pairs, &clones)?,
        OutputFormat::Tsv => print_tsv_map(&clones),
    }

    Ok(())
}

fn describe_decision(decision: &MergeDecision) -> String {
    match decision {
        MergeDecision::Rejected { class } => format!("not assembled ({class})"),
        MergeDecision::Downgraded { reason } => format!("downgraded: {reason:?}"),
        MergeDecision::Merged { .. } | MergeDecision::Redundant => "assembled".to_string(),
    }
}

fn print_text_map(map: &PhysicalMap, pairs: &PairSet) {
    println!("Physical Map");
    println!("{}", "=".repeat(60));

    if map.segments.is_empty() {
        println!("\nNo segments assembled.");
    }
    for (index, segment) in map.segments.iter().enumerate() {
        println!(
            "\nSegment {} ({} clones, span {} bp)",
            index + 1,
            segment.len(),
            segment.span
        );
        for clone in &segment.clones {
            println!(
                "  {:<20} {:>10} - {:<10} {}{}",
                clone.id.as_str(),
                clone.start,
                clone.end(),
                clone.library,
                if clone.sequenced { "  [sequenced]" } else { "" }
            );
        }
    }

    if !map.unplaced.is_empty() {
        println!("\nUnplaced clones:");
        for clone in &map.unplaced {
            let reason = match &clone.reason {
                UnplacedReason::NoConfirmedOverlap => "no confirmed overlap".to_string(),
                UnplacedReason::InvalidFragmentData { reason } => {
                    format!("invalid fragment data: {reason}")
                }
            };
            println!("  {} ({})", clone.id, reason);
        }
    }

    if !map.diagnostics.is_empty() {
        println!("\nExcluded relations:");
        for diagnostic in &map.diagnostics {
            println!(
                "  {} <-> {}: {}",
                diagnostic.relation.clone_a,
                diagnostic.relation.clone_b,
                describe_decision(&diagnostic.decision)
            );
        }
    }

    if !pairs.errors.is_empty() {
        println!("\nProblems:");
        for error in &pairs.errors {
            println!("  - {error}");
        }
    }
}

fn print_json_map(map: &PhysicalMap, pairs: &PairSet, clones: &[BacClone]) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "created_at": created_at(),
        "map": map,
        "clones": clones,
        "errors": pairs.errors,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_map(clones: &[BacClone]) {
    println!("clone\tlibrary\tsegment\tstart\tend\tsequenced\tlocation_mid");
    for clone in clones {
        let location = clone
            .attributes
            .get("location")
            .and_then(|value| range_mid(value))
            .map_or_else(String::new, |mid| mid.to_string());
        match clone.placement {
            Some(placement) => println!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                clone.id,
                clone.library,
                placement.segment + 1,
                placement.start,
                placement.end,
                clone.sequenced,
                location
            ),
            None => println!(
                "{}\t{}\t\t\t\t{}\t{}",
                clone.id, clone.library, clone.sequenced, location
            ),
        }
    }
}
