use clap::Args;

use crate::cli::{created_at, InputArgs, OutputFormat};
use crate::core::types::RelationClass;
use crate::matching::pairs::{find_pairs, OverlapRelation, PairSet};

#[derive(Args)]
pub struct PairsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Also list ambiguous and rejected relations
    #[arg(long)]
    pub all: bool,
}

pub fn run(args: PairsArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let inputs = args.input.load()?;
    let pairs = find_pairs(&inputs.clones, &inputs.libraries, &inputs.config.pairing);

    if verbose {
        eprintln!(
            "{} clones: {} confirmed, {} ambiguous, {} rejected, {} errors",
            inputs.clones.len(),
            pairs.count(RelationClass::Confirmed),
            pairs.count(RelationClass::Ambiguous),
            pairs.count(RelationClass::Rejected),
            pairs.errors.len()
        );
    }

    match format {
        OutputFormat::Text => print_text_pairs(&pairs, args.all),
        OutputFormat::Json => print_json_pairs(&pairs, args.all)?,
        OutputFormat::Tsv => print_tsv_pairs(&pairs, args.all),
    }

    Ok(())
}

fn shown(pairs: &PairSet, all: bool) -> impl Iterator<Item = &OverlapRelation> {
    pairs
        .relations
        .iter()
        .filter(move |r| all || r.class == RelationClass::Confirmed)
}

fn print_text_pairs(pairs: &PairSet, all: bool) {
    println!("Overlapping Clone Pairs");
    println!("{}", "=".repeat(60));

    let mut any = false;
    for relation in shown(pairs, all) {
        any = true;
        let offset = relation
            .evidence
            .offset_hint
            .map_or_else(|| "-".to_string(), |o| o.to_string());
        println!(
            "  {} <-> {}  matched: {}  ({:.1}%)  offset: {}  [{}]",
            relation.clone_a,
            relation.clone_b,
            relation.evidence.matched,
            relation.evidence.fraction * 100.0,
            offset,
            relation.class
        );
    }
    if !any {
        println!("  No overlapping pairs found.");
    }

    if !pairs.errors.is_empty() {
        println!("\nProblems:");
        for error in &pairs.errors {
            println!("  - {error}");
        }
    }
}

fn print_json_pairs(pairs: &PairSet, all: bool) -> anyhow::Result<()> {
    let relations: Vec<_> = shown(pairs, all).collect();
    let output = serde_json::json!({
        "created_at": created_at(),
        "relations": relations,
        "errors": pairs.errors,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_pairs(pairs: &PairSet, all: bool) {
    println!("clone_a\tclone_b\tmatched\tfraction\tshared_length\toffset_hint\tclass");
    for relation in shown(pairs, all) {
        println!(
            "{}\t{}\t{}\t{:.4}\t{}\t{}\t{}",
            relation.clone_a,
            relation.clone_b,
            relation.evidence.matched,
            relation.evidence.fraction,
            relation.evidence.shared_length,
            relation
                .evidence
                .offset_hint
                .map_or_else(String::new, |o| o.to_string()),
            relation.class,
        );
    }
}
