use crate::error::{PipelineError, Result};
use std::path::{Path, PathBuf};

/// A weather source file paired with the station identifier derived from its
/// file name (name minus extension).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationFile {
    pub station_id: String,
    pub path: PathBuf,
}

/// Enumerate station files in the weather source directory.
///
/// Returns them sorted lexicographically by file name so progress reporting
/// and logs are reproducible across invocations.
pub fn discover_station_files(dir: &Path) -> Result<Vec<StationFile>> {
    let entries = std::fs::read_dir(dir).map_err(|e| PipelineError::SourceUnavailable {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| PipelineError::SourceUnavailable {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let station_id = match path.file_stem().and_then(|s| s.to_str()) {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => continue,
        };
        files.push(StationFile { station_id, path });
    }

    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discovers_sorted_station_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("USC00257715.txt"), "").unwrap();
        std::fs::write(dir.path().join("USC00110072.txt"), "").unwrap();
        std::fs::write(dir.path().join("USC00338552.txt"), "").unwrap();

        let files = discover_station_files(dir.path()).unwrap();

        assert_eq!(files.len(), 3);
        assert_eq!(files[0].station_id, "USC00110072");
        assert_eq!(files[1].station_id, "USC00257715");
        assert_eq!(files[2].station_id, "USC00338552");
    }

    #[test]
    fn test_skips_subdirectories() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("A.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = discover_station_files(dir.path()).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].station_id, "A");
    }

    #[test]
    fn test_missing_directory_is_source_unavailable() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("no_such_dir");

        let err = discover_station_files(&missing).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::SourceUnavailable { ref path, .. } if *path == missing
        ));
    }
}
