//! Subcommand implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use kinrec_embedstore::{EmbeddingStore, RedbStore};
use kinrec_matcher::Modality;
use kinrec_recognize::Recognizer;
use serde::Serialize;

use crate::Cli;
use crate::config::{self, FACE_DB_FILE, VOICE_DB_FILE};

/// Vector input, inline or from a file.
#[derive(Args, Debug)]
pub struct VectorArgs {
    /// Vector as a JSON array, e.g. '[0.1, 0.2, 0.3]'
    #[arg(long, conflicts_with = "vector_file")]
    pub vector: Option<String>,

    /// File holding the vector as a JSON array
    #[arg(long)]
    pub vector_file: Option<PathBuf>,
}

impl VectorArgs {
    fn read(&self) -> Result<Vec<f32>> {
        let raw = match (&self.vector, &self.vector_file) {
            (Some(inline), _) => inline.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("read vector file {}", path.display()))?,
            (None, None) => bail!("either --vector or --vector-file is required"),
        };
        parse_vector(&raw)
    }
}

fn parse_vector(raw: &str) -> Result<Vec<f32>> {
    serde_json::from_str(raw.trim()).context("vector must be a JSON array of numbers")
}

#[derive(Args, Debug)]
pub struct EnrollArgs {
    /// Modality (face or voice)
    #[arg(short, long, default_value = "face")]
    pub modality: Modality,

    /// Owning identity
    #[arg(long)]
    pub owner: String,

    /// Partition the enrollment is matched within
    #[arg(short, long)]
    pub partition: String,

    #[command(flatten)]
    pub input: VectorArgs,
}

#[derive(Args, Debug)]
pub struct MatchArgs {
    /// Modality (face or voice)
    #[arg(short, long, default_value = "face")]
    pub modality: Modality,

    /// Partition to search
    #[arg(short, long)]
    pub partition: String,

    #[command(flatten)]
    pub input: VectorArgs,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Modality (face or voice)
    #[arg(short, long, default_value = "face")]
    pub modality: Modality,

    /// Claimed identity
    #[arg(long)]
    pub owner: String,

    /// Partition to search
    #[arg(short, long)]
    pub partition: String,

    #[command(flatten)]
    pub input: VectorArgs,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Identity whose face and voice enrollments are removed
    #[arg(long)]
    pub owner: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Modality (face or voice)
    #[arg(short, long, default_value = "face")]
    pub modality: Modality,

    /// Partition to list
    #[arg(short, long)]
    pub partition: String,
}

/// Loads the config and opens both stores.
fn open(cli: &Cli) -> Result<Recognizer> {
    let cfg = config::load(cli.config.as_deref())?;
    let dir = config::store_dir(cli.db.as_deref())?;

    let open_store = |file: &str| -> Result<Arc<dyn EmbeddingStore>> {
        let path = dir.join(file);
        let store = RedbStore::open_with_config(&path, cfg.store.clone())
            .with_context(|| format!("open store {}", path.display()))?;
        Ok(Arc::new(store))
    };
    let face = open_store(FACE_DB_FILE)?;
    let voice = open_store(VOICE_DB_FILE)?;

    tracing::debug!(store = %dir.display(), "kinrec: opened stores");
    Ok(Recognizer::from_config(&cfg, face, voice)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct Enrolled<'a> {
    record_id: u64,
    modality: Modality,
    owner_id: &'a str,
    partition_key: &'a str,
}

pub async fn enroll(cli: &Cli, args: &EnrollArgs) -> Result<()> {
    let recognizer = open(cli)?;
    let vector = args.input.read()?;
    let id = recognizer
        .enroll_vector(args.modality, &args.owner, &args.partition, &vector)
        .await?;

    if cli.json {
        print_json(&Enrolled {
            record_id: id.0,
            modality: args.modality,
            owner_id: &args.owner,
            partition_key: &args.partition,
        })
    } else {
        println!(
            "enrolled {} record {id} for {} in {}",
            args.modality, args.owner, args.partition
        );
        Ok(())
    }
}

pub async fn identify(cli: &Cli, args: &MatchArgs) -> Result<()> {
    let recognizer = open(cli)?;
    let vector = args.input.read()?;
    let outcome = recognizer
        .recognize_vector(args.modality, &args.partition, &vector)
        .await?;

    if cli.json {
        print_json(&outcome)
    } else {
        println!("{outcome}");
        Ok(())
    }
}

pub async fn verify(cli: &Cli, args: &VerifyArgs) -> Result<()> {
    let recognizer = open(cli)?;
    let vector = args.input.read()?;
    let verification = recognizer
        .verify_vector(args.modality, &args.partition, &args.owner, &vector)
        .await?;

    if cli.json {
        print_json(&verification)
    } else {
        println!(
            "{} {} (score {:.3}, threshold {:.2})",
            verification.owner_id,
            if verification.verified {
                "verified"
            } else {
                "rejected"
            },
            verification.score,
            verification.threshold
        );
        Ok(())
    }
}

pub async fn remove(cli: &Cli, args: &RemoveArgs) -> Result<()> {
    let recognizer = open(cli)?;
    let removed = recognizer.remove_owner(&args.owner).await?;

    if cli.json {
        print_json(&serde_json::json!({ "owner_id": args.owner, "removed": removed }))
    } else {
        println!("removed {removed} records of {}", args.owner);
        Ok(())
    }
}

#[derive(Serialize)]
struct Listed {
    record_id: u64,
    owner_id: String,
    dimensionality: usize,
    created_at: String,
}

pub async fn list(cli: &Cli, args: &ListArgs) -> Result<()> {
    let recognizer = open(cli)?;
    let mut records = recognizer
        .matcher(args.modality)
        .store()
        .list_by_partition(&args.partition)
        .await?;
    records.sort_by_key(|r| r.id);

    let listed: Vec<Listed> = records
        .into_iter()
        .map(|r| Listed {
            record_id: r.id.0,
            dimensionality: r.dimension(),
            owner_id: r.owner_id,
            created_at: r.created_at.to_rfc3339(),
        })
        .collect();

    if cli.json {
        return print_json(&listed);
    }
    if listed.is_empty() {
        println!("no {} enrollments in {}", args.modality, args.partition);
        return Ok(());
    }
    for r in &listed {
        println!(
            "{:>6}  {:<24} {:>4}d  {}",
            r.record_id, r.owner_id, r.dimensionality, r.created_at
        );
    }
    Ok(())
}

pub async fn stats(cli: &Cli) -> Result<()> {
    let recognizer = open(cli)?;
    let mut counts = serde_json::Map::new();
    for modality in Modality::ALL {
        let n = recognizer.matcher(modality).store().len().await?;
        counts.insert(modality.to_string(), n.into());
    }

    if cli.json {
        print_json(&counts)
    } else {
        for (modality, n) in &counts {
            println!("{modality}: {n} records");
        }
        Ok(())
    }
}

pub fn show_config(cli: &Cli) -> Result<()> {
    let cfg = config::load(cli.config.as_deref())?;
    if cli.json {
        print_json(&cfg)
    } else {
        print!("{}", serde_yaml::to_string(&cfg)?);
        Ok(())
    }
}
