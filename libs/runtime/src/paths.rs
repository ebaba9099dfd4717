//! Platform-appropriate directory resolution for `server.home_dir`.

pub mod home_dir {
    use anyhow::{Context, Result};
    use std::path::PathBuf;

    /// Resolves `home_dir` to an absolute path, expanding a leading `~` and
    /// falling back to a platform default (`$HOME`/`.{default_subdir}` on
    /// Unix, `%APPDATA%\{default_subdir}` on Windows) when `home_dir` is
    /// `None`. Creates the directory when `create` is true.
    pub fn resolve_home_dir(home_dir: Option<String>, default_subdir: &str, create: bool) -> Result<PathBuf> {
        let resolved = match home_dir {
            Some(raw) => expand_tilde(&raw)?,
            None => platform_default(default_subdir)?,
        };

        if create {
            std::fs::create_dir_all(&resolved)
                .with_context(|| format!("failed to create home_dir '{}'", resolved.display()))?;
        }

        Ok(resolved)
    }

    fn expand_tilde(raw: &str) -> Result<PathBuf> {
        if let Some(rest) = raw.strip_prefix("~/") {
            let home = user_home_dir().context("cannot expand '~': no home directory available")?;
            Ok(home.join(rest))
        } else if raw == "~" {
            user_home_dir().context("cannot expand '~': no home directory available")
        } else {
            Ok(PathBuf::from(raw))
        }
    }

    fn platform_default(default_subdir: &str) -> Result<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").context("APPDATA is not set")?;
            Ok(PathBuf::from(appdata).join(default_subdir))
        }
        #[cfg(not(target_os = "windows"))]
        {
            let home = user_home_dir().context("HOME is not set")?;
            Ok(home.join(default_subdir))
        }
    }

    fn user_home_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("USERPROFILE").ok().map(PathBuf::from)
        }
        #[cfg(not(target_os = "windows"))]
        {
            std::env::var("HOME").ok().map(PathBuf::from)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn explicit_absolute_path_is_kept_as_is() {
            let resolved = resolve_home_dir(Some("/tmp/explicit_defs_home".to_string()), ".defs", false).unwrap();
            assert_eq!(resolved, PathBuf::from("/tmp/explicit_defs_home"));
        }

        #[test]
        fn tilde_expands_against_home() {
            let tmp = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", tmp.path());
            let resolved = resolve_home_dir(Some("~/.defs_test".to_string()), ".defs", false).unwrap();
            assert_eq!(resolved, tmp.path().join(".defs_test"));
        }

        #[test]
        fn none_falls_back_to_platform_default_and_creates_it() {
            let tmp = tempfile::tempdir().unwrap();
            std::env::set_var("HOME", tmp.path());
            let resolved = resolve_home_dir(None, ".defs", true).unwrap();
            assert_eq!(resolved, tmp.path().join(".defs"));
            assert!(resolved.exists());
        }
    }
}
