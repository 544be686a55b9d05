//! Output directory helpers.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Returns the workspace root directory.
///
/// This is determined by walking up from the current crate's manifest directory.
pub fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Creates a fresh temporary output directory.
pub fn output_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("mapexport-test-")
        .tempdir()
        .expect("failed to create temp output dir")
}

/// Lists the PNG files in `dir`, sorted by name.
pub fn list_pngs(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_root_has_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }

    #[test]
    fn test_list_pngs_filters_and_sorts() {
        let dir = output_dir();
        std::fs::write(dir.path().join("b.png"), b"x").unwrap();
        std::fs::write(dir.path().join("a.png"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        let files = list_pngs(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.png"));
    }

    #[test]
    fn test_list_pngs_missing_dir() {
        assert!(list_pngs(Path::new("/nonexistent/mapexport")).is_empty());
    }
}
