//! Filesystem path helpers.

use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Move every entry of `from` into `to`, leaving `from` empty.
///
/// Entries keep their names; subdirectories move as a whole. An entry whose
/// name already exists in `to` is an error and stops the move, so nothing
/// is silently overwritten.
pub fn move_dir_contents(from: &Path, to: &Path) -> Result<()> {
    let entries =
        fs::read_dir(from).with_context(|| format!("Failed to read {}", from.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read {}", from.display()))?;
        let target = to.join(entry.file_name());

        if target.symlink_metadata().is_ok() {
            bail!(
                "Cannot move {}: {} already exists",
                entry.path().display(),
                target.display()
            );
        }

        fs::rename(entry.path(), &target).with_context(|| {
            format!(
                "Failed to move {} to {}",
                entry.path().display(),
                target.display()
            )
        })?;
    }

    Ok(())
}
