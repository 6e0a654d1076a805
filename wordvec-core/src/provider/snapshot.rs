//! Binary table snapshots
//!
//! Layout: the `WVSNAP` magic, then a bincode-encoded [`TableSnapshot`].
//! Loading re-runs the table builder so a snapshot can never produce a table
//! that violates the construction invariants.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Result, VectorError};
use crate::table::{TableMetadata, VectorTable, VocabularyEntry};

const MAGIC: &[u8; 6] = b"WVSNAP";
const SNAPSHOT_VERSION: u32 = 1;

/// Serialized form of a [`VectorTable`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub version: u32,
    pub metadata: TableMetadata,
    pub dimension: usize,
    pub entries: Vec<VocabularyEntry>,
}

impl TableSnapshot {
    pub fn from_table(table: &VectorTable) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            metadata: table.metadata().clone(),
            dimension: table.dimension(),
            entries: table.entries().to_vec(),
        }
    }

    /// Rebuild the table, validating every entry again
    pub fn into_table(self) -> Result<VectorTable> {
        if self.version != SNAPSHOT_VERSION {
            return Err(VectorError::invalid_table(format!(
                "unsupported snapshot version {} (expected {})",
                self.version, SNAPSHOT_VERSION
            )));
        }

        // tokens were normalized when the snapshot was taken
        let mut builder = VectorTable::builder()
            .lowercase(false)
            .min_count(self.metadata.min_count)
            .dimension(self.dimension)
            .created_at(self.metadata.created_at);
        if let Some(source) = self.metadata.source {
            builder = builder.source(source);
        }
        for entry in self.entries {
            builder.push(entry.token, entry.count, entry.vector);
        }
        builder.build()
    }
}

/// Encode a table into `writer`
pub fn write_snapshot<W: Write>(table: &VectorTable, writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    writer.write_all(MAGIC)?;
    bincode::serialize_into(&mut writer, &TableSnapshot::from_table(table))?;
    writer.flush()?;
    Ok(())
}

/// Decode a table from `reader`
pub fn read_snapshot<R: Read>(reader: R) -> Result<VectorTable> {
    let mut reader = BufReader::new(reader);
    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            VectorError::invalid_table("not a wordvec snapshot (file too short)")
        } else {
            VectorError::Io(e)
        }
    })?;
    if &magic != MAGIC {
        return Err(VectorError::invalid_table("not a wordvec snapshot"));
    }

    let snapshot: TableSnapshot = bincode::deserialize_from(&mut reader)?;
    snapshot.into_table()
}

/// Write a snapshot file
pub fn save_snapshot(table: &VectorTable, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_snapshot(table, file)?;
    log::info!(
        "Wrote snapshot with {} vectors to: {}",
        table.len(),
        path.display()
    );
    Ok(())
}

/// Read a snapshot file
pub fn load_snapshot(path: &Path) -> Result<VectorTable> {
    if !path.exists() {
        return Err(VectorError::not_found(path.display().to_string()));
    }

    log::info!("Loading snapshot from: {}", path.display());
    let table = read_snapshot(File::open(path)?)?;
    log::info!(
        "Loaded {} vectors ({}d) from snapshot",
        table.len(),
        table.dimension()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> VectorTable {
        VectorTable::builder()
            .min_count(2)
            .source("toy")
            .entry("cat", 5, vec![1.0, 0.0])
            .entry("dog", 4, vec![0.9, 0.1])
            .entry("car", 3, vec![0.0, 1.0])
            .entry("rare", 1, vec![0.5, 0.5])
            .build()
            .unwrap()
    }

    #[test]
    fn test_snapshot_preserves_table() {
        let table = toy();
        let mut bytes = Vec::new();
        write_snapshot(&table, &mut bytes).unwrap();
        assert!(bytes.starts_with(MAGIC));

        let restored = read_snapshot(bytes.as_slice()).unwrap();
        assert_eq!(restored.entries(), table.entries());
        assert_eq!(restored.metadata().min_count, 2);
        assert_eq!(restored.metadata().source.as_deref(), Some("toy"));
        assert_eq!(
            restored.metadata().created_at,
            table.metadata().created_at
        );
    }

    #[test]
    fn test_rejects_foreign_bytes() {
        let err = read_snapshot(&b"3 2\ncat 1 0\n"[..]).unwrap_err();
        assert!(err.to_string().contains("not a wordvec snapshot"));

        let err = read_snapshot(&b"WV"[..]).unwrap_err();
        assert!(matches!(err, VectorError::InvalidTable(_)));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let mut snapshot = TableSnapshot::from_table(&toy());
        snapshot.version = 99;
        let err = snapshot.into_table().unwrap_err();
        assert!(err.to_string().contains("unsupported snapshot version 99"));
    }

    #[test]
    fn test_tampered_snapshot_is_revalidated() {
        let mut snapshot = TableSnapshot::from_table(&toy());
        snapshot.entries[1].vector = vec![0.0, 0.0];
        assert!(matches!(
            snapshot.into_table(),
            Err(VectorError::InvalidTable(_))
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toy.wvsnap");
        save_snapshot(&toy(), &path).unwrap();
        let table = load_snapshot(&path).unwrap();
        assert_eq!(table.len(), 3);
        assert!(!table.contains("rare"));

        assert!(matches!(
            load_snapshot(&dir.path().join("missing.wvsnap")),
            Err(VectorError::NotFound(_))
        ));
    }
}
