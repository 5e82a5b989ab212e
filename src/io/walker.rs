use crate::error::{BenchError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A discovered per-protein input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProteinFile {
    pub protein: String,
    pub path: PathBuf,
}

/// Derive the protein identifier from a file path: the first `.`-delimited
/// token of the base name (`1abcA.apc.mat` → `1abcA`).
pub fn protein_id(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let id = name.split('.').next().unwrap_or("");
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// List the regular files directly inside `dir` whose name satisfies `accept`,
/// sorted by file name.
///
/// A missing directory is reported as [`BenchError::FileNotFound`].
fn scan_dir(dir: &Path, accept: impl Fn(&str) -> bool) -> Result<Vec<ProteinFile>> {
    if !dir.is_dir() {
        return Err(BenchError::FileNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => continue,
        };
        if !accept(name) {
            continue;
        }
        let Some(protein) = protein_id(path) else {
            log::debug!("Skipping file without protein id: {}", path.display());
            continue;
        };
        files.push(ProteinFile {
            protein,
            path: path.to_path_buf(),
        });
    }

    Ok(files)
}

/// Discover structure files (names ending in `pdb`) in `dir`.
pub fn discover_structures(dir: &Path) -> Result<Vec<ProteinFile>> {
    let files = scan_dir(dir, |name| name.ends_with("pdb"))?;
    log::info!("Discovered {} structure files in {}", files.len(), dir.display());
    Ok(files)
}

/// Discover score-matrix files in `dir` whose name contains `filter`
/// (an empty filter accepts every file).
///
/// Returns protein id → path. When several files map to the same protein the
/// last one in file-name order wins.
pub fn discover_score_files(dir: &Path, filter: &str) -> Result<BTreeMap<String, PathBuf>> {
    let files = scan_dir(dir, |name| name.contains(filter))?;
    let mut by_protein = BTreeMap::new();
    for file in files {
        if let Some(previous) = by_protein.insert(file.protein.clone(), file.path) {
            log::debug!(
                "Protein {} matched more than one file in {}; replacing {}",
                file.protein,
                dir.display(),
                previous.display()
            );
        }
    }
    log::info!(
        "Discovered {} score files matching '{}' in {}",
        by_protein.len(),
        filter,
        dir.display()
    );
    Ok(by_protein)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_protein_id() {
        assert_eq!(protein_id(Path::new("/data/1abcA.apc.mat")), Some("1abcA".to_string()));
        assert_eq!(protein_id(Path::new("2xyz.pdb")), Some("2xyz".to_string()));
        assert_eq!(protein_id(Path::new("noext")), Some("noext".to_string()));
        assert_eq!(protein_id(Path::new(".hidden")), None);
    }

    #[test]
    fn test_discover_score_files_with_filter() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("1abc.apc.mat"), "0").unwrap();
        fs::write(root.join("1abc.raw.mat"), "0").unwrap();
        fs::write(root.join("2def.apc.mat"), "0").unwrap();
        fs::create_dir_all(root.join("nested")).unwrap();
        fs::write(root.join("nested/3ghi.apc.mat"), "0").unwrap();

        let files = discover_score_files(root, "apc.mat").unwrap();
        assert_eq!(files.len(), 2);
        assert!(files["1abc"].ends_with("1abc.apc.mat"));
        assert!(files.contains_key("2def"));
        assert!(!files.contains_key("3ghi"));

        let raw = discover_score_files(root, "raw.mat").unwrap();
        assert_eq!(raw.len(), 1);

        let all = discover_score_files(root, "").unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_discover_structures() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("1abc.pdb"), "").unwrap();
        fs::write(root.join("2def.pdb"), "").unwrap();
        fs::write(root.join("notes.txt"), "").unwrap();

        let files = discover_structures(root).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].protein, "1abc");
        assert_eq!(files[1].protein, "2def");
    }

    #[test]
    fn test_missing_dir_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        let err = discover_score_files(&missing, "").unwrap_err();
        assert!(matches!(err, BenchError::FileNotFound(_)));
    }
}
