//! Structure reader: residue-residue Cb distance maps from PDB files.
//!
//! Only ATOM records of the first MODEL and the first chain are used. Each
//! residue is represented by its CB atom, or CA for glycine and for residues
//! whose CB is missing. Residue `n` (PDB sequence number) maps to row `n - 1`.

use crate::error::{BenchError, Result};
use crate::matrix::SquareMatrix;
use std::collections::BTreeMap;
use std::path::Path;

/// Representative coordinates for one residue.
#[derive(Debug, Clone, Copy, Default)]
struct ResidueAtoms {
    ca: Option<[f64; 3]>,
    cb: Option<[f64; 3]>,
    glycine: bool,
}

impl ResidueAtoms {
    fn representative(&self) -> Option<[f64; 3]> {
        if self.glycine {
            return self.ca;
        }
        self.cb.or(self.ca)
    }
}

/// Parse PDB text and return the representative coordinate per residue
/// sequence number.
fn residue_coordinates(content: &str, path: &str) -> Result<BTreeMap<i32, [f64; 3]>> {
    let mut residues: BTreeMap<i32, ResidueAtoms> = BTreeMap::new();
    let mut chain: Option<char> = None;
    let mut seen_model = false;

    for (line_no, line) in content.lines().enumerate() {
        if line.starts_with("ENDMDL") {
            break;
        }
        if line.starts_with("MODEL") {
            if seen_model {
                break;
            }
            seen_model = true;
            continue;
        }
        if !line.starts_with("ATOM  ") {
            continue;
        }
        if line.len() < 54 {
            return Err(BenchError::Parse(format!(
                "ATOM record too short in {} line {}",
                path,
                line_no + 1
            )));
        }

        let chain_id = safe_slice(line, 21, 22).chars().next().unwrap_or(' ');
        match chain {
            None => chain = Some(chain_id),
            Some(c) if c != chain_id => continue,
            _ => {}
        }

        let atom_name = safe_slice(line, 12, 16).trim();
        if atom_name != "CA" && atom_name != "CB" {
            continue;
        }

        let seq_num = safe_slice(line, 22, 26).trim().parse::<i32>().map_err(|e| {
            BenchError::Parse(format!(
                "bad residue number in {} line {}: {}",
                path,
                line_no + 1,
                e
            ))
        })?;
        let coords = parse_coords(line).map_err(|e| {
            BenchError::Parse(format!("{} in {} line {}", e, path, line_no + 1))
        })?;

        let residue = residues.entry(seq_num).or_default();
        residue.glycine = safe_slice(line, 17, 20).trim() == "GLY";
        // First alternate location wins.
        let slot = if atom_name == "CA" { &mut residue.ca } else { &mut residue.cb };
        if slot.is_none() {
            *slot = Some(coords);
        }
    }

    if residues.is_empty() {
        return Err(BenchError::Parse(format!("no CA/CB ATOM records found in {}", path)));
    }

    Ok(residues
        .into_iter()
        .filter_map(|(seq, atoms)| atoms.representative().map(|c| (seq, c)))
        .collect())
}

fn parse_coords(line: &str) -> std::result::Result<[f64; 3], String> {
    let mut coords = [0.0; 3];
    for (axis, (start, end)) in [(30, 38), (38, 46), (46, 54)].into_iter().enumerate() {
        coords[axis] = safe_slice(line, start, end)
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("bad coordinate: {}", e))?;
    }
    Ok(coords)
}

/// Compute the `length × length` distance map from PDB text.
///
/// Pairs involving residues without coordinates, or with sequence numbers
/// outside `1..=length`, are `NaN`.
pub fn parse_distance_map(content: &str, length: usize, path: &str) -> Result<SquareMatrix> {
    let coords = residue_coordinates(content, path)?;

    let mut positions: Vec<Option<[f64; 3]>> = vec![None; length];
    for (seq, xyz) in coords {
        let idx = seq - 1;
        if idx >= 0 && (idx as usize) < length {
            positions[idx as usize] = Some(xyz);
        }
    }

    let mut map = SquareMatrix::filled(length, f64::NAN);
    for i in 0..length {
        let Some(a) = positions[i] else { continue };
        for j in i..length {
            let Some(b) = positions[j] else { continue };
            let d = ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt();
            map.set(i, j, d);
            map.set(j, i, d);
        }
    }
    Ok(map)
}

/// Read a PDB file and compute its distance map for a protein of `length` residues.
pub fn distance_map(path: &Path, length: usize) -> Result<SquareMatrix> {
    if !path.exists() {
        return Err(BenchError::FileNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    parse_distance_map(&content, length, &path.display().to_string())
}

/// Safe substring that handles short lines gracefully.
fn safe_slice(s: &str, start: usize, end: usize) -> &str {
    let len = s.len();
    if start >= len {
        return "";
    }
    s.get(start..end.min(len)).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(serial: u32, name: &str, res: &str, chain: char, seq: i32, xyz: [f64; 3]) -> String {
        format!(
            "ATOM  {:>5} {:<4} {:>3} {}{:>4}    {:>8.3}{:>8.3}{:>8.3}  1.00  0.00           C",
            serial, name, res, chain, seq, xyz[0], xyz[1], xyz[2]
        )
    }

    #[test]
    fn test_cb_with_glycine_fallback() {
        let pdb = [
            atom(1, "CA", "ALA", 'A', 1, [0.0, 0.0, 0.0]),
            atom(2, "CB", "ALA", 'A', 1, [1.0, 0.0, 0.0]),
            atom(3, "CA", "GLY", 'A', 2, [4.0, 0.0, 0.0]),
            atom(4, "CA", "SER", 'A', 3, [1.0, 6.0, 0.0]),
        ]
        .join("\n");

        let map = parse_distance_map(&pdb, 3, "test.pdb").unwrap();
        // residue 1 uses CB (1,0,0); residue 2 is glycine and uses CA.
        assert!((map.get(0, 1) - 3.0).abs() < 1e-9);
        // residue 3 has no CB and falls back to CA.
        assert!((map.get(0, 2) - 6.0).abs() < 1e-9);
        assert_eq!(map.get(1, 0), map.get(0, 1));
        assert_eq!(map.get(0, 0), 0.0);
    }

    #[test]
    fn test_missing_residues_are_nan() {
        let pdb = [
            atom(1, "CA", "ALA", 'A', 1, [0.0, 0.0, 0.0]),
            atom(2, "CA", "ALA", 'A', 3, [3.0, 4.0, 0.0]),
            atom(3, "CA", "ALA", 'A', 9, [3.0, 4.0, 0.0]),
        ]
        .join("\n");

        let map = parse_distance_map(&pdb, 4, "gap.pdb").unwrap();
        assert!((map.get(0, 2) - 5.0).abs() < 1e-9);
        assert!(map.get(0, 1).is_nan());
        assert!(map.get(1, 1).is_nan());
        assert!(map.get(0, 3).is_nan());
    }

    #[test]
    fn test_first_model_and_chain_only() {
        let pdb = [
            "MODEL        1".to_string(),
            atom(1, "CA", "ALA", 'A', 1, [0.0, 0.0, 0.0]),
            atom(2, "CA", "ALA", 'B', 2, [9.0, 0.0, 0.0]),
            atom(3, "CA", "ALA", 'A', 2, [2.0, 0.0, 0.0]),
            "ENDMDL".to_string(),
            "MODEL        2".to_string(),
            atom(4, "CA", "ALA", 'A', 2, [7.0, 0.0, 0.0]),
        ]
        .join("\n");

        let map = parse_distance_map(&pdb, 2, "nmr.pdb").unwrap();
        assert!((map.get(0, 1) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_atoms_is_error() {
        let err = parse_distance_map("HEADER    EMPTY\n", 3, "empty.pdb").unwrap_err();
        assert!(matches!(err, BenchError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = distance_map(Path::new("/nonexistent/1abc.pdb"), 10).unwrap_err();
        assert!(matches!(err, BenchError::FileNotFound(_)));
    }
}
