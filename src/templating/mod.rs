//! Property file templating.
//!
//! # Data Flow
//! ```text
//! Settings (from env)
//!     → oauth_patch / database_patch (key → value assignments)
//!     → store.rs read (whole file)
//!     → patch.rs apply (per-key report)
//!     → MissingKeyPolicy (warn or fail)
//!     → store.rs write (only if changed)
//! ```

pub mod patch;
pub mod store;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::MissingKeyPolicy;
use crate::config::{DatabaseSettings, OAuthSettings};

pub use patch::{PatchReport, PatchResult, PropertyPatch};
pub use store::{FsStore, PropertyStore};

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is missing keys: {}", .path.display(), .keys.join(", "))]
    MissingKeys { path: PathBuf, keys: Vec<String> },
}

/// Outcome of templating one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub report: PatchReport,
}

/// Assignments for oauth.properties.
pub fn oauth_patch(oauth: &OAuthSettings) -> PropertyPatch {
    PropertyPatch::new()
        .set("config.client_id", oauth.client_id.as_str())
        .set("config.client_secret", oauth.client_secret.as_str())
        .set("config.callbackURL", oauth.callback_url())
}

/// Assignments for database.properties.
pub fn database_patch(db: &DatabaseSettings) -> PropertyPatch {
    PropertyPatch::new()
        .set("database.url", db.jdbc_url())
        .set("database.username", db.user.as_str())
        .set("database.password", db.password.as_str())
}

/// Read `path`, apply `patch`, write it back if anything changed.
pub fn template_file<S: PropertyStore>(
    store: &S,
    path: &Path,
    patch: &PropertyPatch,
    on_missing: MissingKeyPolicy,
) -> Result<FileReport, TemplateError> {
    let original = store.read(path).map_err(|source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let PatchResult { text, report } = patch.apply(&original);

    if !report.is_complete() {
        match on_missing {
            MissingKeyPolicy::Fail => {
                return Err(TemplateError::MissingKeys {
                    path: path.to_path_buf(),
                    keys: report.missing,
                });
            }
            MissingKeyPolicy::Warn => {
                tracing::warn!(
                    path = %path.display(),
                    missing = ?report.missing,
                    "Property keys not found; their values were left unchanged"
                );
            }
        }
    }

    if report.changed {
        store.write(path, &text).map_err(|source| TemplateError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            keys = ?report.matched,
            "Property file updated"
        );
    } else {
        tracing::debug!(path = %path.display(), "Property file already up to date");
    }

    Ok(FileReport {
        path: path.to_path_buf(),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io;

    #[derive(Default)]
    struct MemoryStore {
        files: RefCell<HashMap<PathBuf, String>>,
        writes: RefCell<u32>,
    }

    impl MemoryStore {
        fn with(path: &str, contents: &str) -> Self {
            let store = Self::default();
            store
                .files
                .borrow_mut()
                .insert(PathBuf::from(path), contents.to_string());
            store
        }

        fn get(&self, path: &str) -> String {
            self.files.borrow()[Path::new(path)].clone()
        }
    }

    impl PropertyStore for MemoryStore {
        fn read(&self, path: &Path) -> io::Result<String> {
            self.files
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
        }

        fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
            *self.writes.borrow_mut() += 1;
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), contents.to_string());
            Ok(())
        }
    }

    fn oauth() -> OAuthSettings {
        OAuthSettings {
            client_id: "cid".into(),
            client_secret: "sec".into(),
            base_url: "http://host".into(),
        }
    }

    const OAUTH_FILE: &str = "/etc/default/rss/oauth.properties";

    #[test]
    fn oauth_file_is_filled_in() {
        let store = MemoryStore::with(
            OAUTH_FILE,
            "config.client_id=\nconfig.client_secret=\nconfig.callbackURL=\n",
        );
        let report = template_file(
            &store,
            Path::new(OAUTH_FILE),
            &oauth_patch(&oauth()),
            MissingKeyPolicy::Warn,
        )
        .unwrap();

        assert!(report.report.is_complete());
        assert_eq!(
            store.get(OAUTH_FILE),
            "config.client_id=cid\nconfig.client_secret=sec\nconfig.callbackURL=http://host/fiware-rss/callback\n"
        );
    }

    #[test]
    fn unchanged_file_is_not_rewritten() {
        let store = MemoryStore::with(OAUTH_FILE, "config.client_id=cid\n");
        let patch = PropertyPatch::new().set("config.client_id", "cid");
        template_file(&store, Path::new(OAUTH_FILE), &patch, MissingKeyPolicy::Warn).unwrap();
        assert_eq!(*store.writes.borrow(), 0);
    }

    #[test]
    fn missing_keys_fail_under_strict_policy() {
        let store = MemoryStore::with(OAUTH_FILE, "config.client_id=\n");
        let err = template_file(
            &store,
            Path::new(OAUTH_FILE),
            &oauth_patch(&oauth()),
            MissingKeyPolicy::Fail,
        )
        .unwrap_err();

        match err {
            TemplateError::MissingKeys { keys, .. } => {
                assert_eq!(keys, vec!["config.client_secret", "config.callbackURL"])
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*store.writes.borrow(), 0);
    }

    #[test]
    fn missing_keys_only_warn_by_default() {
        let store = MemoryStore::with(OAUTH_FILE, "config.client_id=\n");
        let report = template_file(
            &store,
            Path::new(OAUTH_FILE),
            &oauth_patch(&oauth()),
            MissingKeyPolicy::Warn,
        )
        .unwrap();
        assert_eq!(report.report.missing.len(), 2);
        assert_eq!(store.get(OAUTH_FILE), "config.client_id=cid\n");
    }

    #[test]
    fn unreadable_file_names_path() {
        let store = MemoryStore::default();
        let err = template_file(
            &store,
            Path::new("/etc/default/rss/database.properties"),
            &PropertyPatch::new().set("database.username", "root"),
            MissingKeyPolicy::Warn,
        )
        .unwrap_err();
        assert!(err.to_string().contains("database.properties"));
    }

    #[test]
    fn database_patch_builds_jdbc_url() {
        let db = DatabaseSettings {
            user: "root".into(),
            password: "toor".into(),
            host: "db".into(),
            port: 3306,
        };
        let result = database_patch(&db).apply(
            "database.url=jdbc:mysql://localhost:3306/RSS\n\
             database.username=root\n\
             database.password=root\n",
        );
        assert_eq!(
            result.text,
            "database.url=jdbc:mysql://db:3306/RSS\n\
             database.username=root\n\
             database.password=toor\n"
        );
    }
}
