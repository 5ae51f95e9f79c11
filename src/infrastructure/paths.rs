//! Data directory resolution and tilde expansion.

use std::path::{Path, PathBuf};

/// Returns the default data directory for chapel state and traces.
///
/// Resolution order:
/// 1. `$XDG_DATA_HOME/chapel`
/// 2. `$HOME/.local/share/chapel`
/// 3. `./.chapel` when neither variable is set
///
/// # Examples
///
/// ```
/// use chapel::infrastructure::default_data_dir;
///
/// assert!(default_data_dir().ends_with("chapel") || default_data_dir().ends_with(".chapel"));
/// ```
#[must_use]
pub fn default_data_dir() -> PathBuf {
    resolve_data_dir(non_empty_var("XDG_DATA_HOME"), non_empty_var("HOME"))
}

fn non_empty_var(name: &str) -> Option<PathBuf> {
    std::env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from)
}

fn resolve_data_dir(xdg_data_home: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    match (xdg_data_home, home) {
        (Some(xdg), _) => xdg.join("chapel"),
        (None, Some(home)) => home.join(".local").join("share").join("chapel"),
        (None, None) => PathBuf::from(".chapel"),
    }
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, and every path when `HOME` is unset, are
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use chapel::infrastructure::expand_tilde;
/// use std::path::PathBuf;
///
/// assert_eq!(expand_tilde("/absolute/path"), PathBuf::from("/absolute/path"));
/// ```
#[must_use]
pub fn expand_tilde(path: impl AsRef<Path>) -> PathBuf {
    expand_with_home(path.as_ref(), non_empty_var("HOME").as_deref())
}

fn expand_with_home(path: &Path, home: Option<&Path>) -> PathBuf {
    let Some(home) = home else {
        return path.to_path_buf();
    };
    match path.strip_prefix("~") {
        Ok(rest) if rest.as_os_str().is_empty() => home.to_path_buf(),
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xdg_data_home_wins() {
        assert_eq!(
            resolve_data_dir(Some("/xdg".into()), Some("/home/anu".into())),
            PathBuf::from("/xdg/chapel")
        );
        assert_eq!(
            resolve_data_dir(None, Some("/home/anu".into())),
            PathBuf::from("/home/anu/.local/share/chapel")
        );
        assert_eq!(resolve_data_dir(None, None), PathBuf::from(".chapel"));
    }

    #[test]
    fn tilde_expansion() {
        let home = Path::new("/home/anu");
        assert_eq!(expand_with_home(Path::new("~/church"), Some(home)), PathBuf::from("/home/anu/church"));
        assert_eq!(expand_with_home(Path::new("~"), Some(home)), PathBuf::from("/home/anu"));
        assert_eq!(expand_with_home(Path::new("/srv/site"), Some(home)), PathBuf::from("/srv/site"));
        assert_eq!(expand_with_home(Path::new("~other/x"), Some(home)), PathBuf::from("~other/x"));
        assert_eq!(expand_with_home(Path::new("~/church"), None), PathBuf::from("~/church"));
    }
}
