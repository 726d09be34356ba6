//! # Tagging Subcommands
//!
//! `embed`, `extract` and `inspect` over files on disk.
//!
//! `embed` takes either an explicit `--code` or a `--title`/`--owner` pair,
//! in which case the code comes from the registry (an unused code for the
//! same track is reused) and is marked used once the file is written. A file
//! the codecs cannot handle is never written; the command exits `1`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use isrc_core::IsrcCode;
use isrc_meta::{EmbedFields, EmbedOutcome, MetadataWriter};

use crate::config::Settings;
use crate::open_registry;

/// Arguments for `isrc embed`.
#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Container to tag.
    pub input: PathBuf,

    /// Code to embed. Without it, one is taken from the registry.
    #[arg(long)]
    pub code: Option<String>,

    /// Track title. Required when no `--code` is given.
    #[arg(long)]
    pub title: Option<String>,

    /// Owner or artist name. Required when no `--code` is given.
    #[arg(long)]
    pub owner: Option<String>,

    /// Genre written where the container supports it.
    #[arg(long)]
    pub genre: Option<String>,

    /// Write the tagged file here.
    #[arg(long, short, conflicts_with = "in_place")]
    pub output: Option<PathBuf>,

    /// Overwrite the input file.
    #[arg(long)]
    pub in_place: bool,
}

/// Arguments for `isrc extract`.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Files to read.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Print one JSON object per file.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `isrc inspect`.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// File to describe.
    pub path: PathBuf,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Embed a code into a file.
pub async fn run_embed(args: &EmbedArgs, settings: &Settings) -> Result<u8> {
    let destination = match (&args.output, args.in_place) {
        (Some(path), false) => path.clone(),
        (None, true) => args.input.clone(),
        _ => bail!("one of --output or --in-place is required"),
    };

    let data = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let mut fields = EmbedFields::new();
    if let Some(title) = &args.title {
        fields = fields.with_title(title);
    }
    if let Some(owner) = &args.owner {
        fields = fields.with_artist(owner);
    }
    if let Some(genre) = &args.genre {
        fields = fields.with_genre(genre);
    }

    let mut registry = None;
    let code = match &args.code {
        Some(code) => IsrcCode::parse_lenient(code).with_context(|| format!("invalid ISRC {code:?}"))?,
        None => {
            let (Some(title), Some(owner)) = (&args.title, &args.owner) else {
                bail!("--title and --owner are required when --code is not given");
            };
            let mut opened = open_registry(settings).await?;
            let code = opened.obtain(title, owner).await.context("failed to obtain ISRC")?;
            registry = Some(opened);
            code
        }
    };

    let writer = MetadataWriter::new();
    let (format, bytes) = match writer.embed(&data, &code, &fields) {
        EmbedOutcome::Embedded { format, bytes } => (format, bytes),
        EmbedOutcome::Unchanged { reason, .. } => {
            if let Some(registry) = registry.as_mut() {
                registry.flush().await.context("failed to persist registry")?;
            }
            println!("UNCHANGED: {} ({reason})", args.input.display());
            return Ok(1);
        }
    };

    tokio::fs::write(&destination, &bytes)
        .await
        .with_context(|| format!("failed to write {}", destination.display()))?;
    tracing::info!(code = %code, %format, path = %destination.display(), "wrote tagged file");

    if let Some(registry) = registry.as_mut() {
        let context = BTreeMap::from([
            ("file".to_string(), file_name(&destination)),
            ("format".to_string(), format.name().to_string()),
        ]);
        registry.mark_used(&code, Some(context)).await;
        registry.flush().await.context("failed to persist registry")?;
    }

    println!("{code}  {}", destination.display());
    Ok(0)
}

/// Read embedded codes. Exits `1` if any file has none.
pub fn run_extract(args: &ExtractArgs) -> Result<u8> {
    let writer = MetadataWriter::new();
    let mut missing = 0usize;
    for path in &args.paths {
        let data = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let code = writer.extract(&data);
        if code.is_none() {
            missing += 1;
        }
        if args.json {
            let out = serde_json::json!({ "path": path, "code": code });
            println!("{}", serde_json::to_string(&out)?);
        } else {
            match code {
                Some(code) => println!("{code}  {}", path.display()),
                None => println!("NONE  {}", path.display()),
            }
        }
    }
    Ok(if missing == 0 { 0 } else { 1 })
}

/// Print a JSON report describing a container.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let data = std::fs::read(&args.path).with_context(|| format!("failed to read {}", args.path.display()))?;
    let report = MetadataWriter::new().inspect(&data, Some(&file_name(&args.path)));
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}
