pub mod contact_matrix;
pub mod pdb;
pub mod walker;

pub use contact_matrix::{read_matrix, read_metadata, Metadata};
pub use pdb::distance_map;
pub use walker::{discover_score_files, discover_structures, protein_id, ProteinFile};
