//! GO graph CLI
//!
//! - Building a term store from a GO OBO-Graph JSON release (`parse-go`)
//! - Looking terms up, fuzzy search, relationship browsing and stats
//! - Hashtag diagnostics and probabilistic text augmentation

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use gograph_augment::{AugmentationOptions, TextAugmentor};
use gograph_ingest_go::{parse_go_json_file, IngestOptions};
use gograph_ontology::{
    normalize_accession, Direction, RelatedTerm, RelationKind, Term, TermRepository,
};
use gograph_store::{SearchOptions, TermStore};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gograph")]
#[command(author, version, about = "Gene Ontology term store, search and text augmentation")]
struct Cli {
    /// More log output (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StoreArgs {
    /// Term store snapshot produced by `parse-go`.
    #[arg(short = 'd', long = "database", env = "GOGRAPH_DB")]
    database: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a term store from a GO OBO-Graph JSON file.
    ParseGo {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// GO namespace to keep, or `all`.
        #[arg(long, default_value = gograph_ingest_go::DEFAULT_NAMESPACE)]
        namespace: String,
        #[arg(long)]
        include_deprecated: bool,
        /// Overwrite an existing store.
        #[arg(long)]
        force: bool,
    },

    /// Show one term.
    GetTerm {
        #[command(flatten)]
        store: StoreArgs,
        go_id: String,
        #[arg(long)]
        json: bool,
    },

    /// Fuzzy search over names and synonyms.
    Search {
        #[command(flatten)]
        store: StoreArgs,
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        #[arg(long, default_value_t = 30.0)]
        min_score: f64,
        #[arg(long)]
        json: bool,
    },

    /// IS_A and PART_OF relatives in both directions.
    Relationships {
        #[command(flatten)]
        store: StoreArgs,
        go_id: String,
        #[arg(long, default_value_t = 3)]
        max_distance: usize,
        #[arg(long)]
        json: bool,
    },

    /// Term, synonym and relationship counts.
    Stats {
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long)]
        json: bool,
    },

    /// Show how each hashtag in TEXT resolves.
    AnalyzeHashtags {
        #[command(flatten)]
        store: StoreArgs,
        text: String,
        #[arg(long)]
        json: bool,
    },

    /// Generate annotated variations of TEXT.
    AugmentText {
        #[command(flatten)]
        store: StoreArgs,
        text: String,
        #[command(flatten)]
        knobs: AugmentArgs,
        #[arg(long)]
        json: bool,
    },
}

/// Flags override values loaded from `--options`.
#[derive(Args)]
struct AugmentArgs {
    /// JSON file with augmentation options.
    #[arg(long)]
    options: Option<PathBuf>,
    #[arg(short = 'n', long)]
    num_variations: Option<usize>,
    #[arg(long)]
    synonym_prob: Option<f64>,
    #[arg(long)]
    definition_prob: Option<f64>,
    #[arg(long)]
    go_id_prob: Option<f64>,
    #[arg(long)]
    is_a_parent_prob: Option<f64>,
    #[arg(long)]
    is_a_children_prob: Option<f64>,
    #[arg(long)]
    part_of_parent_prob: Option<f64>,
    #[arg(long)]
    part_of_children_prob: Option<f64>,
    /// Legacy: replaces all four relationship probabilities.
    #[arg(long)]
    relationship_prob: Option<f64>,
    #[arg(long)]
    definition_max_length: Option<usize>,
    #[arg(long)]
    max_distance: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
}

impl AugmentArgs {
    fn to_options(&self) -> Result<AugmentationOptions> {
        let mut options = match &self.options {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read options file {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("invalid options file {}", path.display()))?
            }
            None => AugmentationOptions::default(),
        };

        fn set<T: Copy>(target: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *target = value;
            }
        }
        set(&mut options.num_variations, self.num_variations);
        set(&mut options.synonym_probability, self.synonym_prob);
        set(&mut options.definition_probability, self.definition_prob);
        set(&mut options.go_id_probability, self.go_id_prob);
        set(&mut options.is_a_parent_probability, self.is_a_parent_prob);
        set(&mut options.is_a_children_probability, self.is_a_children_prob);
        set(&mut options.part_of_parent_probability, self.part_of_parent_prob);
        set(&mut options.part_of_children_probability, self.part_of_children_prob);
        set(&mut options.max_relationship_distance, self.max_distance);
        if self.relationship_prob.is_some() {
            options.relationship_prob = self.relationship_prob;
        }
        if self.definition_max_length.is_some() {
            options.definition_max_length = self.definition_max_length;
        }
        if self.seed.is_some() {
            options.seed = self.seed;
        }

        options.validate()?;
        Ok(options)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::ParseGo {
            input,
            output,
            namespace,
            include_deprecated,
            force,
        } => cmd_parse_go(&input, &output, &namespace, include_deprecated, force),
        Commands::GetTerm { store, go_id, json } => cmd_get_term(&store, &go_id, json),
        Commands::Search {
            store,
            query,
            limit,
            min_score,
            json,
        } => cmd_search(&store, &query, limit, min_score, json),
        Commands::Relationships {
            store,
            go_id,
            max_distance,
            json,
        } => cmd_relationships(&store, &go_id, max_distance, json),
        Commands::Stats { store, json } => cmd_stats(&store, json),
        Commands::AnalyzeHashtags { store, text, json } => cmd_analyze(&store, &text, json),
        Commands::AugmentText {
            store,
            text,
            knobs,
            json,
        } => cmd_augment(&store, &text, &knobs, json),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(args: &StoreArgs) -> Result<TermStore> {
    TermStore::open(&args.database)
        .with_context(|| format!("failed to open term store {}", args.database.display()))
}

fn accession_arg(raw: &str) -> Result<String> {
    normalize_accession(raw).ok_or_else(|| anyhow!("not a GO accession: {raw}"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_parse_go(
    input: &Path,
    output: &Path,
    namespace: &str,
    include_deprecated: bool,
    force: bool,
) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    println!("{} GO graph {}", "Parsing".green().bold(), input.display());

    let options = IngestOptions {
        namespace: (namespace != "all").then(|| namespace.to_string()),
        include_deprecated,
    };
    let (ontology, report) = parse_go_json_file(input, &options)
        .with_context(|| format!("failed to parse {}", input.display()))?;
    let store = TermStore::from_ontology(ontology);
    store.save(output)?;

    let stats = store.stats();
    tracing::info!(?report, path = %output.display(), "term store written");
    println!("  {} {}", "→".cyan(), output.display());
    println!(
        "  {} {} terms, {} synonyms, {} IS_A, {} PART_OF",
        "→".yellow(),
        stats.terms,
        stats.synonyms,
        stats.is_a_relationships,
        stats.part_of_relationships
    );
    println!(
        "  {} skipped: {} deprecated, {} other namespace, {} non-GO; {} edges dropped",
        "→".yellow(),
        report.skipped_deprecated,
        report.skipped_namespace,
        report.skipped_non_go,
        report.edges_dropped
    );
    Ok(())
}

fn cmd_get_term(args: &StoreArgs, go_id: &str, json: bool) -> Result<()> {
    let store = open_store(args)?;
    let accession = accession_arg(go_id)?;
    let term = store
        .term(&accession)
        .ok_or_else(|| anyhow!("term {accession} not found"))?;

    if json {
        return print_json(term);
    }
    print_term(term);
    Ok(())
}

fn print_term(term: &Term) {
    println!("{} {}", term.accession.cyan().bold(), term.name.bold());
    if let Some(namespace) = &term.namespace {
        println!("  {} {}", "namespace:".dimmed(), namespace);
    }
    if !term.definition.is_empty() {
        println!("  {} {}", "definition:".dimmed(), term.definition);
    }
    if !term.synonyms.is_empty() {
        println!("  {} {}", "synonyms:".dimmed(), term.synonyms.join(", "));
    }
    if !term.comment.is_empty() {
        println!("  {} {}", "comment:".dimmed(), term.comment);
    }
}

fn cmd_search(args: &StoreArgs, query: &str, limit: usize, min_score: f64, json: bool) -> Result<()> {
    let store = open_store(args)?;
    let hits = store.search(query, &SearchOptions { limit, min_score });

    if json {
        return print_json(&hits);
    }
    if hits.is_empty() {
        println!("{} no terms match {:?}", "Search".yellow().bold(), query);
        return Ok(());
    }
    println!("{} {} hit(s) for {:?}", "Search".green().bold(), hits.len(), query);
    for hit in &hits {
        println!(
            "  {:>5.1}  {}  {}  {}",
            hit.score,
            hit.term.accession.cyan(),
            hit.term.name,
            format!("[{} {:?}]", hit.match_type.as_str(), hit.matched_text).dimmed()
        );
    }
    Ok(())
}

#[derive(Serialize)]
struct RelationshipGroup {
    kind: RelationKind,
    direction: Direction,
    related: Vec<RelatedTerm>,
}

fn cmd_relationships(args: &StoreArgs, go_id: &str, max_distance: usize, json: bool) -> Result<()> {
    if max_distance == 0 {
        bail!("--max-distance must be at least 1");
    }
    let store = open_store(args)?;
    let accession = accession_arg(go_id)?;
    let term = store
        .term(&accession)
        .ok_or_else(|| anyhow!("term {accession} not found"))?;

    let mut groups = Vec::new();
    for kind in RelationKind::ALL {
        for direction in Direction::ALL {
            let related = store.get_related_within(&accession, kind, direction, max_distance)?;
            groups.push(RelationshipGroup {
                kind,
                direction,
                related,
            });
        }
    }

    if json {
        return print_json(&groups);
    }
    println!("{} {} {}", "Relationships".green().bold(), term.accession.cyan(), term.name);
    for group in &groups {
        println!(
            "  {} {} ({})",
            group.kind.label().bold(),
            group.direction,
            group.related.len()
        );
        for related in &group.related {
            println!(
                "    {}{} {}",
                "  ".repeat(related.distance.saturating_sub(1)),
                related.term.accession.cyan(),
                related.term.name
            );
        }
    }
    Ok(())
}

fn cmd_stats(args: &StoreArgs, json: bool) -> Result<()> {
    let store = open_store(args)?;
    let stats = store.stats();
    if json {
        return print_json(&stats);
    }
    println!("{} {}", "Store".green().bold(), args.database.display());
    println!("  terms:                 {}", stats.terms);
    println!("  synonyms:              {}", stats.synonyms);
    println!("  IS_A relationships:    {}", stats.is_a_relationships);
    println!("  PART_OF relationships: {}", stats.part_of_relationships);
    Ok(())
}

fn cmd_analyze(args: &StoreArgs, text: &str, json: bool) -> Result<()> {
    let augmentor = TextAugmentor::new(open_store(args)?);
    let analysis = augmentor.analyze(text)?;

    if json {
        return print_json(&analysis);
    }
    if analysis.is_empty() {
        println!("{} no hashtags found", "Analyze".yellow().bold());
        return Ok(());
    }
    for entry in &analysis {
        match &entry.term {
            Some(term) => println!(
                "  {} {} → {} {}",
                "✓".green(),
                entry.surface,
                term.accession.cyan(),
                term.name
            ),
            None => println!(
                "  {} {} → {}",
                "✗".red(),
                entry.surface,
                "no matching GO term".dimmed()
            ),
        }
    }
    Ok(())
}

fn cmd_augment(args: &StoreArgs, text: &str, knobs: &AugmentArgs, json: bool) -> Result<()> {
    let options = knobs.to_options()?;
    let augmentor = TextAugmentor::new(open_store(args)?);
    let variations = augmentor.augment_text(text, &options)?;

    if json {
        return print_json(&variations);
    }
    println!("{} {}", "Original".green().bold(), text);
    for (i, variation) in variations.iter().enumerate() {
        println!("  {} {}", format!("{}.", i + 1).cyan(), variation);
    }
    Ok(())
}
