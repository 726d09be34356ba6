//! # isrc-cli — CLI Tool for the ISRC Stack
//!
//! Provides the `isrc` command-line interface over the registry and the
//! metadata codecs.
//!
//! ## Subcommands
//!
//! - `isrc generate` — Issue the next code for a track.
//! - `isrc mark-used` — Record that an issued code has been consumed.
//! - `isrc summary` — Counts for the current registry.
//! - `isrc export` — Every issued code as CSV.
//! - `isrc embed` — Write a code into an MP3, WAV, JPEG or PNG file.
//! - `isrc extract` — Read the code back out of one or more files.
//! - `isrc inspect` — Describe a container and its embedded code.
//! - `isrc validate` — Check codes against the canonical format.
//!
//! ```bash
//! isrc --owner-key user-42 generate --title "Night Drive" --owner "Ayo"
//! isrc embed track.mp3 --title "Night Drive" --owner "Ayo" --in-place
//! isrc extract track.mp3 cover.jpg
//! ```
//!
//! ## Exit Codes
//!
//! Handlers return `0` on success and `1` when the command ran but the
//! outcome was negative (an invalid code, a file left unchanged). Errors
//! also exit with `1` after being logged.

pub mod config;
pub mod registry;
pub mod tag;
pub mod validate;

use std::sync::Arc;

use anyhow::{Context, Result};
use isrc_registry::{FileStore, Registry};

pub use config::{CliConfig, Settings};

/// Open the registry described by `settings`, backed by a [`FileStore`].
pub async fn open_registry(settings: &Settings) -> Result<Registry> {
    let store = FileStore::new(&settings.store_dir);
    tracing::debug!(dir = %settings.store_dir.display(), "opening registry");
    Registry::open(
        settings.config.registry.clone(),
        Arc::new(store),
        settings.owner_key.as_deref(),
    )
    .await
    .context("failed to open registry")
}
