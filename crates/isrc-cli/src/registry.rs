//! # Registry Subcommands
//!
//! `generate`, `mark-used`, `summary` and `export`. Each opens the registry
//! from the store directory, applies one operation and flushes before
//! returning, so the document on disk is current when the process exits.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use isrc_core::IsrcCode;

use crate::config::Settings;
use crate::open_registry;

/// Arguments for `isrc generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Track title recorded against the code.
    #[arg(long)]
    pub title: String,

    /// Owner or artist name recorded against the code.
    #[arg(long)]
    pub owner: String,

    /// Return an unused code already issued for this title and owner, if any.
    #[arg(long)]
    pub reuse: bool,

    /// Print the registry entry as JSON instead of the bare code.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `isrc mark-used`.
#[derive(Args, Debug)]
pub struct MarkUsedArgs {
    /// The code to mark.
    pub code: String,

    /// Context recorded with the usage, as `key=value`. Repeatable.
    #[arg(long = "context", value_parser = parse_key_value)]
    pub context: Vec<(String, String)>,
}

/// Arguments for `isrc summary`.
#[derive(Args, Debug)]
pub struct SummaryArgs {
    /// Print as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `isrc export`.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Write the CSV here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got {s:?}")),
    }
}

/// Issue (or reuse) a code and persist it.
pub async fn run_generate(args: &GenerateArgs, settings: &Settings) -> Result<u8> {
    let mut registry = open_registry(settings).await?;
    let code = if args.reuse {
        let code = registry.obtain(&args.title, &args.owner).await?;
        registry.flush().await.context("failed to persist registry")?;
        code
    } else {
        registry
            .generate_and_flush(&args.title, &args.owner)
            .await
            .context("failed to issue ISRC")?
    };

    if args.json {
        let entry = registry.entry(&code);
        let out = serde_json::json!({ "code": code, "entry": entry });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{code}");
    }
    Ok(0)
}

/// Mark a code as used. Exits `1` if the registry never issued it.
pub async fn run_mark_used(args: &MarkUsedArgs, settings: &Settings) -> Result<u8> {
    let code = IsrcCode::parse_lenient(&args.code).with_context(|| format!("invalid ISRC {:?}", args.code))?;
    let context: BTreeMap<String, String> = args.context.iter().cloned().collect();
    let context = (!context.is_empty()).then_some(context);

    let mut registry = open_registry(settings).await?;
    if !registry.mark_used(&code, context).await {
        println!("UNKNOWN: {code} was not issued by this registry");
        return Ok(1);
    }
    registry.flush().await.context("failed to persist registry")?;
    println!("USED: {code}");
    Ok(0)
}

/// Print registry counts.
pub async fn run_summary(args: &SummaryArgs, settings: &Settings) -> Result<u8> {
    let registry = open_registry(settings).await?;
    let summary = registry.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        let range = registry.range();
        println!("Year:             {}", summary.year);
        println!("Range:            {:05}-{:05}", range.start, range.end);
        println!("Last designation: {:05}", summary.last_designation);
        println!("Total:            {}", summary.total);
        println!("Used:             {}", summary.used);
        println!("Available:        {}", summary.available);
    }
    Ok(0)
}

/// Export every issued code as CSV.
pub async fn run_export(args: &ExportArgs, settings: &Settings) -> Result<u8> {
    let registry = open_registry(settings).await?;
    let csv = registry.export_csv();
    match &args.output {
        Some(path) => {
            tokio::fs::write(path, csv)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), rows = registry.summary().total, "exported registry");
        }
        None => print!("{csv}"),
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;

    fn settings(dir: &std::path::Path) -> Settings {
        Settings {
            config: CliConfig::default(),
            store_dir: dir.to_path_buf(),
            owner_key: Some("user-42".to_string()),
        }
    }

    fn generate_args(title: &str, reuse: bool) -> GenerateArgs {
        GenerateArgs {
            title: title.to_string(),
            owner: "Ayo".to_string(),
            reuse,
            json: false,
        }
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("file=a.mp3").unwrap(), ("file".into(), "a.mp3".into()));
        assert_eq!(parse_key_value("note=a=b").unwrap(), ("note".into(), "a=b".into()));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[tokio::test]
    async fn test_generate_persists() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        assert_eq!(run_generate(&generate_args("One", false), &settings).await.unwrap(), 0);
        assert_eq!(run_generate(&generate_args("Two", false), &settings).await.unwrap(), 0);

        let registry = open_registry(&settings).await.unwrap();
        assert_eq!(registry.summary().total, 2);
        assert_eq!(registry.summary().available, 2);
    }

    #[tokio::test]
    async fn test_generate_reuse_returns_unused_code() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        run_generate(&generate_args("Same", true), &settings).await.unwrap();
        run_generate(&generate_args("Same", true), &settings).await.unwrap();

        let registry = open_registry(&settings).await.unwrap();
        assert_eq!(registry.summary().total, 1);
    }

    #[tokio::test]
    async fn test_mark_used_known_and_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        run_generate(&generate_args("Track", false), &settings).await.unwrap();
        let code = open_registry(&settings)
            .await
            .unwrap()
            .find_unused_for("Track", "Ayo")
            .unwrap();

        let args = MarkUsedArgs {
            code: code.to_compact(),
            context: vec![("file".into(), "track.mp3".into())],
        };
        assert_eq!(run_mark_used(&args, &settings).await.unwrap(), 0);

        let registry = open_registry(&settings).await.unwrap();
        let entry = registry.entry(&code).unwrap();
        assert!(entry.used);
        assert_eq!(entry.context.as_ref().unwrap()["file"], "track.mp3");

        let unknown = MarkUsedArgs {
            code: "ZA-80G-25-99999".into(),
            context: vec![],
        };
        assert_eq!(run_mark_used(&unknown, &settings).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_used_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let args = MarkUsedArgs {
            code: "not-a-code".into(),
            context: vec![],
        };
        assert!(run_mark_used(&args, &settings(dir.path())).await.is_err());
    }

    #[tokio::test]
    async fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        run_generate(&generate_args("Quoted, \"title\"", false), &settings).await.unwrap();

        let out = dir.path().join("codes.csv");
        let args = ExportArgs { output: Some(out.clone()) };
        assert_eq!(run_export(&args, &settings).await.unwrap(), 0);

        let csv = std::fs::read_to_string(out).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(isrc_registry::registry::CSV_HEADER));
        let row = lines.next().unwrap();
        assert!(row.contains("Available"));
        assert!(lines.next().is_none());
    }

    #[tokio::test]
    async fn test_summary_on_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let args = SummaryArgs { json: true };
        assert_eq!(run_summary(&args, &settings(dir.path())).await.unwrap(), 0);
    }
}
