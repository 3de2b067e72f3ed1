//! Well-known paths inside the launcher home directory.

use std::path::{Path, PathBuf};

/// Lock file holding the owning launcher's pid.
pub const LOCK_FILE_NAME: &str = "glaunch.pid";

/// Settings file name, looked up next to the launch target first and in the
/// launcher home second.
pub const SETTINGS_FILE_NAME: &str = "glaunch.json";

/// Path of the single-instance lock file for a given home directory.
#[must_use]
pub fn lock_file_path(home: &Path) -> PathBuf {
    home.join(LOCK_FILE_NAME)
}

/// Directory the save-backup feature archives.
#[must_use]
pub fn saves_dir(home: &Path) -> PathBuf {
    home.join("Saves")
}

/// Directory save backups are written to.
#[must_use]
pub fn backups_dir(home: &Path) -> PathBuf {
    home.join("Backups")
}

/// Candidate settings-file locations, in lookup order: the directory holding
/// the launch target (per-game settings), then the launcher home.
#[must_use]
pub fn settings_candidates(home: &Path, target: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = target.and_then(Path::parent) {
        if !dir.as_os_str().is_empty() {
            candidates.push(dir.join(SETTINGS_FILE_NAME));
        }
    }
    candidates.push(home.join(SETTINGS_FILE_NAME));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_file_lives_in_home() {
        let path = lock_file_path(Path::new("/opt/launcher"));
        assert_eq!(path, PathBuf::from("/opt/launcher/glaunch.pid"));
    }

    #[test]
    fn settings_candidates_prefer_target_directory() {
        let candidates = settings_candidates(
            Path::new("/opt/launcher"),
            Some(Path::new("/games/doom/doom.exe")),
        );
        assert_eq!(
            candidates,
            [
                PathBuf::from("/games/doom/glaunch.json"),
                PathBuf::from("/opt/launcher/glaunch.json"),
            ]
        );
    }

    #[test]
    fn settings_candidates_without_target() {
        let candidates = settings_candidates(Path::new("/opt/launcher"), None);
        assert_eq!(candidates, [PathBuf::from("/opt/launcher/glaunch.json")]);
    }
}
