//! Save backup: archive the saves directory before a run and rotate old
//! archives out.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use tracing::{debug, info};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use glaunch_core::paths::{backups_dir, saves_dir};
use glaunch_core::settings::LauncherSettings;

const BACKUP_PREFIX: &str = "SaveBackup_";

/// Archive `<home>/Saves` into `<home>/Backups/SaveBackup_<timestamp>.zip`
/// and rotate down to `max_backups`, oldest first.
///
/// Returns the archive path, or `None` when backups are disabled or there is
/// nothing to back up.
pub fn backup_saves(settings: &LauncherSettings, home: &Path) -> Result<Option<PathBuf>> {
    if !settings.options.backup_saves {
        return Ok(None);
    }

    let saves = saves_dir(home);
    if !saves.is_dir() {
        info!(path = %saves.display(), "no saves directory, skipping backup");
        return Ok(None);
    }

    let backups = backups_dir(home);
    fs::create_dir_all(&backups)
        .with_context(|| format!("creating backup directory {}", backups.display()))?;

    let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
    let archive_path = backups.join(format!("{BACKUP_PREFIX}{stamp}.zip"));
    write_archive(&saves, &archive_path)
        .with_context(|| format!("writing {}", archive_path.display()))?;
    info!(archive = %archive_path.display(), "saves backed up");

    rotate_backups(&backups, settings.options.max_backups as usize)?;
    Ok(Some(archive_path))
}

fn write_archive(saves: &Path, archive_path: &Path) -> Result<()> {
    let file = fs::File::create(archive_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    add_dir(&mut zip, saves, saves, options)?;
    zip.finish()?;
    Ok(())
}

fn add_dir(
    zip: &mut ZipWriter<fs::File>,
    root: &Path,
    dir: &Path,
    options: SimpleFileOptions,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let relative = path
            .strip_prefix(root)
            .context("directory entry outside archive root")?
            .to_string_lossy()
            .replace('\\', "/");

        if path.is_dir() {
            zip.add_directory(format!("{relative}/"), options)?;
            add_dir(zip, root, &path, options)?;
        } else {
            zip.start_file(relative, options)?;
            let mut file = fs::File::open(&path)?;
            io::copy(&mut file, zip)?;
        }
    }
    Ok(())
}

/// Remove the oldest `SaveBackup_*.zip` archives until at most `max` remain.
/// The timestamp format sorts lexicographically, so a name sort is an age
/// sort.
fn rotate_backups(backups: &Path, max: usize) -> Result<()> {
    let mut archives: Vec<PathBuf> = fs::read_dir(backups)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(BACKUP_PREFIX) && n.ends_with(".zip"))
        })
        .collect();
    archives.sort();

    while archives.len() > max {
        let oldest = archives.remove(0);
        debug!(archive = %oldest.display(), "removing old backup");
        fs::remove_file(&oldest)
            .with_context(|| format!("removing old backup {}", oldest.display()))?;
    }
    Ok(())
}
