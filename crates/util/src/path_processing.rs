use std::path::{Path, PathBuf};

use dirs_next::home_dir;

/// Replace a leading `~` component with the user's home directory.
///
/// Only a bare `~` component is expanded; `~other` names are left alone, as
/// is everything when no home directory is known.
pub fn expand_tilde(path: &str) -> PathBuf {
    let path = Path::new(path.trim());
    match (path.strip_prefix("~"), home_dir()) {
        (Ok(rest), Some(home)) if rest.as_os_str().is_empty() => home,
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
