//! Manifest discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BelayError, Result};
use crate::manifest::schema::Manifest;

/// Default manifest file name.
pub const MANIFEST_FILE: &str = "belay.yml";

/// Find the manifest for a project root.
///
/// Looks for `belay.yml`, then `belay.yaml`.
pub fn find_manifest(project_root: &Path) -> Option<PathBuf> {
    for candidate in [MANIFEST_FILE, "belay.yaml"] {
        let path = project_root.join(candidate);
        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Load and validate a manifest from an explicit path.
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            BelayError::ManifestNotFound {
                path: path.to_path_buf(),
            }
        } else {
            BelayError::Io(e)
        }
    })?;

    let manifest: Manifest =
        serde_yaml::from_str(&content).map_err(|e| BelayError::ManifestParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    manifest.validate()?;
    Ok(manifest)
}

/// Resolve the manifest path from an optional override and load it.
pub fn resolve(project_root: &Path, explicit: Option<&Path>) -> Result<(PathBuf, Manifest)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => find_manifest(project_root).ok_or_else(|| BelayError::ManifestNotFound {
            path: project_root.join(MANIFEST_FILE),
        })?,
    };
    let manifest = load_manifest(&path)?;
    Ok((path, manifest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_manifest(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn finds_yml_before_yaml() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "belay.yaml", "components: {}\n");
        write_manifest(dir.path(), "belay.yml", "components: {}\n");
        let found = find_manifest(dir.path()).unwrap();
        assert!(found.ends_with("belay.yml"));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifest(&dir.path().join("belay.yml")).unwrap_err();
        assert!(matches!(err, BelayError::ManifestNotFound { .. }));
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_manifest(dir.path(), "belay.yml", "components: [not, a, map]\n");
        let err = load_manifest(&path).unwrap_err();
        match err {
            BelayError::ManifestParseError { path: p, .. } => {
                assert!(p.ends_with("belay.yml"));
            }
            other => panic!("expected ManifestParseError, got {other:?}"),
        }
    }

    #[test]
    fn resolve_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let custom = write_manifest(dir.path(), "pipeline.yml", "components: {}\n");
        let (path, _manifest) = resolve(dir.path(), Some(&custom)).unwrap();
        assert_eq!(path, custom);
    }

    #[test]
    fn resolve_without_manifest_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve(dir.path(), None).unwrap_err();
        assert!(matches!(err, BelayError::ManifestNotFound { .. }));
    }
}
