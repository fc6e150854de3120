use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use tempfile::NamedTempFile;

/// Download `file_url` to `out_path` through a temp file in the target
/// directory, renaming only after the full body arrived. Refuses to
/// overwrite an existing file unless `force` is set.
pub fn download_file(file_url: &str, out_path: &PathBuf, force: bool) -> Result<()> {
    if !force && out_path.exists() {
        bail!("Refusing to overwrite existing file: {} (use --force)", out_path.display());
    }
    let dir = out_path.parent().unwrap_or(Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create dir {}", dir.display()))?;

    let client = Client::builder()
        .user_agent(concat!("aprova/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(300))
        .build()?;

    let mut response = client
        .get(file_url)
        .send()
        .with_context(|| format!("GET {file_url}"))?
        .error_for_status()
        .with_context(|| format!("GET {file_url} returned error status"))?;

    let mut tmp = NamedTempFile::new_in(dir).context("create temp file")?;
    std::io::copy(&mut response, &mut tmp)
        .with_context(|| format!("write {}", out_path.display()))?;
    tmp.as_file().sync_all().ok(); // best-effort fsync
    tmp.persist(out_path)
        .with_context(|| format!("rename to {}", out_path.display()))?;

    Ok(())
}
