//! Model download and installation management.
//!
//! Handles downloading Whisper models from HuggingFace, verifying their integrity,
//! and storing them in the user's cache directory.

use crate::error::{Result, SalesqlError};
use crate::models::catalog::{ModelInfo, get_model, list_models, resolve_name};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use sha1::{Digest, Sha1};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Get the directory where models are stored.
///
/// Uses `~/.cache/salesql/models/` on Linux/Unix.
pub fn models_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("salesql")
        .join("models")
}

/// Get the full path for a model file.
///
/// Always returns a path regardless of whether the model is in the catalog.
/// The file may or may not exist on disk.
pub fn model_path(name: &str) -> PathBuf {
    let resolved = resolve_name(name);
    let filename = format!("ggml-{resolved}.bin");
    models_dir().join(filename)
}

/// Check if a model is installed.
pub fn is_model_installed(name: &str) -> bool {
    model_path(name).exists()
}

/// Find any installed catalog model, preferring smaller ones.
pub fn find_any_installed_model() -> Option<String> {
    list_models()
        .iter()
        .find(|m| is_model_installed(m.name))
        .map(|m| m.name.to_string())
}

/// One-line summary for `salesql models list`.
pub fn format_model_info(model: &ModelInfo) -> String {
    let lang = if model.english_only {
        "en-only"
    } else {
        "multi"
    };
    let installed = if is_model_installed(model.name) {
        ", installed"
    } else {
        ""
    };
    format!("{} ({}MB, {}{})", model.name, model.size_mb, lang, installed)
}

/// Core download: fetch url, save to path, verify sha1 if non-empty.
async fn download_to_path(
    name: &str,
    url: &str,
    sha1: &str,
    size_mb: u32,
    output_path: &Path,
    progress: bool,
) -> Result<()> {
    // Create models directory if it doesn't exist
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| SalesqlError::Other(format!("Failed to create models directory: {e}")))?;
    }

    if progress {
        eprintln!("Downloading {name} ({size_mb} MB)...");
    }

    let client = reqwest::Client::new();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| SalesqlError::Other(format!("Failed to start download: {e}")))?;

    if !response.status().is_success() {
        return Err(SalesqlError::Other(format!(
            "Download failed with status: {}",
            response.status()
        )));
    }

    let total_size = response.content_length().unwrap_or(0);

    // Set up progress bar
    let pb = if progress {
        let pb = ProgressBar::new(total_size);
        pb.set_style(
            // SAFETY: hardcoded template string — always valid
            #[allow(clippy::expect_used)]
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .expect("hardcoded progress bar template")
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    // Download with streaming and hash calculation
    let mut hasher = Sha1::new();
    let mut stream = response.bytes_stream();
    let mut file = fs::File::create(output_path)
        .map_err(|e| SalesqlError::Other(format!("Failed to create output file: {e}")))?;

    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| SalesqlError::Other(format!("Failed to read download chunk: {e}")))?;

        file.write_all(&chunk)
            .map_err(|e| SalesqlError::Other(format!("Failed to write to file: {e}")))?;

        hasher.update(&chunk);

        if let Some(ref pb) = pb {
            pb.inc(chunk.len() as u64);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Downloaded");
    }

    // Verify SHA-1 checksum
    if !sha1.is_empty() {
        let calculated_hash = format!("{:x}", hasher.finalize());
        if calculated_hash != sha1 {
            if let Err(e) = fs::remove_file(output_path) {
                eprintln!("salesql: failed to remove corrupted download: {e}");
            }
            return Err(SalesqlError::Other(format!(
                "SHA-1 checksum mismatch. Expected: {sha1}, got: {calculated_hash}"
            )));
        }
        if progress {
            eprintln!("Checksum verified");
        }
    }

    if progress {
        eprintln!("Model installed to: {}", output_path.display());
    }

    Ok(())
}

/// Download a Whisper model from the static catalog.
///
/// # Errors
///
/// Returns an error if:
/// - The model is not in the catalog
/// - The download fails
/// - The SHA-1 checksum doesn't match (if provided in catalog)
/// - The file cannot be written
pub async fn download_model(name: &str, progress: bool) -> Result<PathBuf> {
    let path = model_path(name);

    if path.exists() {
        if !progress {
            eprintln!(
                "Model '{}' is already installed at {}",
                name,
                path.display()
            );
        }
        return Ok(path);
    }

    let resolved = resolve_name(name);
    let info = get_model(resolved).ok_or_else(|| {
        SalesqlError::Other(format!(
            "Model '{name}' not found in catalog.\n\
             Run 'salesql models list' to see available models."
        ))
    })?;

    download_to_path(
        info.name,
        &info.url(),
        info.sha1,
        info.size_mb,
        &path,
        progress,
    )
    .await?;
    Ok(path)
}

/// Resolve the model for a run: use the configured name, download if missing.
///
/// With `no_download` set, a missing model is an error instead.
pub async fn ensure_model(name: &str, no_download: bool, progress: bool) -> Result<PathBuf> {
    let path = model_path(name);
    if path.exists() {
        return Ok(path);
    }
    if no_download {
        return Err(SalesqlError::TranscriptionModelNotFound {
            path: path.display().to_string(),
        });
    }
    download_model(name, progress).await
}
