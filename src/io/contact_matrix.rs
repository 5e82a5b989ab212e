//! Contact-score matrix reader.
//!
//! A matrix file holds whitespace-separated rows of scores. Lines starting with
//! `#>META>` carry a JSON object with run metadata; any other `#` line is a
//! comment. Files ending in `.gz` are decompressed on the fly.

use crate::error::{BenchError, Result};
use crate::matrix::SquareMatrix;
use flate2::read::GzDecoder;
use serde_json::Value as JsonValue;
use std::io::Read;
use std::path::Path;

const META_PREFIX: &str = "#>META>";

/// Key/value metadata attached to a contact matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata(JsonValue);

impl Default for Metadata {
    fn default() -> Self {
        Self(JsonValue::Object(serde_json::Map::new()))
    }
}

impl Metadata {
    pub fn new(value: JsonValue) -> Self {
        Self(value)
    }

    /// First value bound to `key`.
    ///
    /// Keys of the current object win over anything nested below it. Otherwise
    /// nested objects and arrays are searched depth-first in file order.
    pub fn find_key(&self, key: &str) -> Option<&JsonValue> {
        find_in(&self.0, key)
    }

    /// Numeric value for `key`. Booleans count as 0/1; anything else non-numeric is `None`.
    pub fn find_f64(&self, key: &str) -> Option<f64> {
        match self.find_key(key)? {
            JsonValue::Number(n) => n.as_f64(),
            JsonValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn find_usize(&self, key: &str) -> Option<usize> {
        let value = self.find_f64(key)?;
        if value >= 0.0 && value.fract() == 0.0 {
            Some(value as usize)
        } else {
            None
        }
    }
}

fn find_in<'a>(value: &'a JsonValue, key: &str) -> Option<&'a JsonValue> {
    match value {
        JsonValue::Object(map) => {
            if let Some(found) = map.get(key) {
                return Some(found);
            }
            map.values().find_map(|v| find_in(v, key))
        }
        JsonValue::Array(items) => items.iter().find_map(|v| find_in(v, key)),
        _ => None,
    }
}

/// Parse matrix text into scores and metadata.
///
/// Several `#>META>` lines are merged; later keys overwrite earlier ones.
pub fn parse_matrix(content: &str, path: &str) -> Result<(SquareMatrix, Metadata)> {
    let mut rows = Vec::new();
    let mut meta = serde_json::Map::new();

    for (line_no, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(json) = trimmed.strip_prefix(META_PREFIX) {
            let value: JsonValue = serde_json::from_str(json.trim()).map_err(|e| {
                BenchError::Parse(format!("metadata JSON error in {} line {}: {}", path, line_no + 1, e))
            })?;
            match value {
                JsonValue::Object(map) => meta.extend(map),
                other => {
                    return Err(BenchError::Parse(format!(
                        "metadata in {} line {} is not a JSON object: {}",
                        path,
                        line_no + 1,
                        other
                    )))
                }
            }
            continue;
        }
        if trimmed.starts_with('#') {
            continue;
        }

        let row = trimmed
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>().map_err(|e| {
                    BenchError::Parse(format!(
                        "bad score '{}' in {} line {}: {}",
                        tok,
                        path,
                        line_no + 1,
                        e
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    let matrix = SquareMatrix::from_rows(rows)
        .map_err(|e| BenchError::Parse(format!("{}: {}", path, e)))?;
    Ok((matrix, Metadata(JsonValue::Object(meta))))
}

fn read_text(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(BenchError::FileNotFound(path.to_path_buf()));
    }
    let is_gz = path.extension().and_then(|e| e.to_str()) == Some("gz");
    if is_gz {
        let file = std::fs::File::open(path)?;
        let mut decoder = GzDecoder::new(file);
        let mut content = String::new();
        decoder.read_to_string(&mut content)?;
        Ok(content)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

/// Read a contact matrix file from disk.
pub fn read_matrix(path: &Path) -> Result<(SquareMatrix, Metadata)> {
    let content = read_text(path)?;
    parse_matrix(&content, &path.display().to_string())
}

/// Read only the metadata of a contact matrix file, without parsing scores.
pub fn read_metadata(path: &Path) -> Result<Metadata> {
    let content = read_text(path)?;
    let display = path.display().to_string();
    let mut meta = serde_json::Map::new();
    for line in content.lines() {
        if let Some(json) = line.trim().strip_prefix(META_PREFIX) {
            if let JsonValue::Object(map) = serde_json::from_str(json.trim())
                .map_err(|e| BenchError::Parse(format!("metadata JSON error in {}: {}", display, e)))?
            {
                meta.extend(map);
            }
        }
    }
    Ok(Metadata(JsonValue::Object(meta)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
0.0 0.5 0.1
0.5 0.0 0.9
# a comment
0.1 0.9 0.0
#>META> {\"workflow\": [{\"msafile\": {\"ncol\": 3, \"nrow\": 120, \"neff\": 55.5}, \"results\": {\"opt_code\": 1, \"runtime\": 12.5}}]}
";

    #[test]
    fn test_parse_matrix_with_metadata() {
        let (mat, meta) = parse_matrix(SAMPLE, "sample.mat").unwrap();
        assert_eq!(mat.size(), 3);
        assert_eq!(mat.get(1, 2), 0.9);
        assert_eq!(meta.find_usize("ncol"), Some(3));
        assert_eq!(meta.find_f64("neff"), Some(55.5));
        assert_eq!(meta.find_f64("opt_code"), Some(1.0));
        assert_eq!(meta.find_f64("runtime"), Some(12.5));
        assert!(meta.find_key("missing").is_none());
    }

    #[test]
    fn test_parse_matrix_without_metadata() {
        let (mat, meta) = parse_matrix("1 2\n3 4\n", "plain.mat").unwrap();
        assert_eq!(mat.size(), 2);
        assert_eq!(meta, Metadata::default());
    }

    #[test]
    fn test_parse_matrix_bad_token() {
        let err = parse_matrix("1 x\n3 4\n", "bad.mat").unwrap_err();
        assert!(matches!(err, BenchError::Parse(_)));
        assert!(err.to_string().contains("bad.mat"));
    }

    #[test]
    fn test_parse_matrix_not_square() {
        let err = parse_matrix("1 2 3\n3 4 5\n", "rect.mat").unwrap_err();
        assert!(matches!(err, BenchError::Parse(_)));
    }

    #[test]
    fn test_find_key_prefers_shallow_then_first_nested() {
        let meta = Metadata::new(json!({
            "a": {"x": 1},
            "b": [{"x": 2}, {"y": 3}],
            "y": 4
        }));
        assert_eq!(meta.find_f64("x"), Some(1.0));
        assert_eq!(meta.find_f64("y"), Some(4.0));
    }

    #[test]
    fn test_find_key_nested_in_file_order() {
        let meta = Metadata::new(serde_json::from_str(r#"{"b": {"neff": 1}, "a": {"neff": 2}}"#).unwrap());
        assert_eq!(meta.find_f64("neff"), Some(1.0));

        let meta =
            Metadata::new(serde_json::from_str(r#"{"workflow": [{"runtime": 1}], "runtime": 2}"#).unwrap());
        assert_eq!(meta.find_f64("runtime"), Some(2.0));

        let text = "1 2\n3 4\n#>META> {\"z\": {\"ncol\": 2}, \"m\": {\"ncol\": 9}}\n";
        let (_, meta) = parse_matrix(text, "order.mat").unwrap();
        assert_eq!(meta.find_usize("ncol"), Some(2));
    }

    #[test]
    fn test_find_f64_non_numeric() {
        let meta = Metadata::new(json!({"name": "pll", "converged": true}));
        assert_eq!(meta.find_f64("name"), None);
        assert_eq!(meta.find_f64("converged"), Some(1.0));
    }

    #[test]
    fn test_read_matrix_gz_and_metadata_only() {
        let temp_dir = TempDir::new().unwrap();
        let plain = temp_dir.path().join("1abc.apc.mat");
        std::fs::write(&plain, SAMPLE).unwrap();

        let gz = temp_dir.path().join("1abc.apc.mat.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        std::fs::write(&gz, encoder.finish().unwrap()).unwrap();

        let (from_plain, meta_plain) = read_matrix(&plain).unwrap();
        let (from_gz, meta_gz) = read_matrix(&gz).unwrap();
        assert_eq!(from_plain, from_gz);
        assert_eq!(meta_plain, meta_gz);

        let meta_only = read_metadata(&plain).unwrap();
        assert_eq!(meta_only.find_f64("runtime"), Some(12.5));
    }

    #[test]
    fn test_read_matrix_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_matrix(&temp_dir.path().join("nope.mat")).unwrap_err();
        assert!(matches!(err, BenchError::FileNotFound(_)));
    }
}
