use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const GTM_DIR: &str = ".gtm";
pub const CONFIG_FILE: &str = ".gtm/config.yaml";
pub const STATE_DB_FILE: &str = ".gtm/state.redb";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn gtm_dir(root: &Path) -> PathBuf {
    root.join(GTM_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured database path against the project root.
///
/// Absolute paths are returned unchanged.
pub fn resolve_db_path(root: &Path, db_path: &Path) -> PathBuf {
    if db_path.is_absolute() {
        db_path.to_path_buf()
    } else {
        root.join(db_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_db_path_joins_root() {
        let root = Path::new("/srv/gtm");
        assert_eq!(
            resolve_db_path(root, Path::new(STATE_DB_FILE)),
            PathBuf::from("/srv/gtm/.gtm/state.redb")
        );
    }

    #[test]
    fn absolute_db_path_is_kept() {
        let root = Path::new("/srv/gtm");
        assert_eq!(
            resolve_db_path(root, Path::new("/var/lib/gtm.redb")),
            PathBuf::from("/var/lib/gtm.redb")
        );
    }
}
