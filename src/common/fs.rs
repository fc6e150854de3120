use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use zip::ZipArchive;

/// Create the directory if it doesn't exist; error if a non-directory
/// exists there.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            anyhow::bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Extract a `.zip` archive into `dest_dir`, removing the archive after a
/// successful extraction when `delete_after` is set.
pub fn extract_zip(zip_path: &Path, dest_dir: &Path, delete_after: bool) -> Result<()> {
    let file = fs::File::open(zip_path)
        .with_context(|| format!("Failed to open {}", zip_path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Failed to read zip archive {}", zip_path.display()))?;

    archive
        .extract(dest_dir)
        .with_context(|| format!("Failed to extract {} to {}", zip_path.display(), dest_dir.display()))?;

    if delete_after {
        fs::remove_file(zip_path)
            .with_context(|| format!("Failed to delete {}", zip_path.display()))?;
    }

    Ok(())
}
