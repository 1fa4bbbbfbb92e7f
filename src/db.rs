//! Database layer: named f32 arrays in a single SQLite file.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use rusqlite::{Connection, OpenFlags, OptionalExtension};

use crate::error::{Result, SynthError};
use crate::matrix::Matrix;

const ARRAY_TABLE: &str = "arrays";

fn write_err(e: impl std::error::Error + Send + Sync + 'static) -> SynthError {
    SynthError::Io(std::io::Error::other(e))
}

#[derive(Debug)]
pub struct ArrayFile {
    conn: Connection,
    path: PathBuf,
}

impl ArrayFile {
    /// Create a fresh array file at `path`, replacing whatever is there.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
        let conn = Connection::open(&path).map_err(write_err)?;
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {ARRAY_TABLE} (
            name TEXT PRIMARY KEY,
            rows INT NOT NULL,
            cols INT NOT NULL,
            data BLOB NOT NULL
            )"
            ),
            (),
        )
        .map_err(write_err)?;
        Ok(Self { conn, path })
    }

    /// Open an existing array file read-only.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| SynthError::cache_read(&path, e))?;
        Ok(Self { conn, path })
    }

    /// Store all named arrays in one transaction.
    pub fn write_arrays(&mut self, arrays: &[(&str, &Matrix)]) -> Result<()> {
        let tx = self.conn.transaction().map_err(write_err)?;
        for (name, m) in arrays {
            let blob = Self::encode(m.as_slice())?;
            tx.execute(
                &format!("INSERT INTO {ARRAY_TABLE} (name, rows, cols, data) VALUES (?1, ?2, ?3, ?4)"),
                (name, m.rows() as i64, m.cols() as i64, blob),
            )
            .map_err(write_err)?;
            tracing::debug!("Wrote array {name} with shape {:?}", m.shape());
        }
        tx.commit().map_err(write_err)
    }

    /// Fetch a named array.
    pub fn read_array(&self, name: &str) -> Result<Matrix> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT rows, cols, data FROM {ARRAY_TABLE} WHERE name=?1"),
                [name],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| SynthError::cache_read(&self.path, e))?;
        let Some((rows, cols, blob)) = row else {
            return Err(SynthError::cache_read(
                &self.path,
                format!("array {name} is missing"),
            ));
        };
        if rows < 0 || cols < 0 {
            return Err(SynthError::cache_read(
                &self.path,
                format!("array {name} has negative shape ({rows}, {cols})"),
            ));
        }
        let len = (rows as usize).checked_mul(cols as usize).ok_or_else(|| {
            SynthError::cache_read(
                &self.path,
                format!("array {name} has impossible shape ({rows}, {cols})"),
            )
        })?;
        let data = self.decode(&blob)?;
        if data.len() != len {
            return Err(SynthError::cache_read(
                &self.path,
                format!(
                    "array {name} of shape ({rows}, {cols}) holds {} values",
                    data.len()
                ),
            ));
        }
        Matrix::new(rows as usize, cols as usize, data).map_err(|e| {
            SynthError::cache_read(&self.path, format!("array {name}: {e}"))
        })
    }

    /// f32 values to compressed little-endian bytes.
    pub(crate) fn encode(values: &[f32]) -> Result<Vec<u8>> {
        let mut bytes = vec![0; values.len() * 4];
        LittleEndian::write_f32_into(values, &mut bytes);
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&bytes)?;
        Ok(enc.finish()?)
    }

    /// Inverse of [ArrayFile::encode].
    fn decode(&self, blob: &[u8]) -> Result<Vec<f32>> {
        let mut bytes = vec![];
        ZlibDecoder::new(blob)
            .read_to_end(&mut bytes)
            .map_err(|e| SynthError::cache_read(&self.path, format!("corrupt array data: {e}")))?;
        if bytes.len() % 4 != 0 {
            return Err(SynthError::cache_read(
                &self.path,
                format!("array data of {} bytes is not a multiple of 4", bytes.len()),
            ));
        }
        let mut v = vec![0f32; bytes.len() / 4];
        LittleEndian::read_f32_into(&bytes, &mut v);
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_sanity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_test.sqlite");
        let a = Matrix::new(2, 3, vec![0.0, 0.25, 0.5, 0.75, 1.0, 0.1]).unwrap();
        let b = Matrix::new(0, 3, vec![]).unwrap();
        {
            let mut f = ArrayFile::create(&path).unwrap();
            f.write_arrays(&[("a", &a), ("b", &b)]).unwrap();
        }
        let f = ArrayFile::open(&path).unwrap();
        assert_eq!(f.read_array("a").unwrap(), a);
        assert_eq!(f.read_array("b").unwrap(), b);
        assert!(matches!(
            f.read_array("c"),
            Err(SynthError::CacheRead { .. })
        ));
    }

    #[test]
    fn test_not_a_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.sqlite");
        std::fs::write(&path, vec![7u8; 4096]).unwrap();
        let res = ArrayFile::open(&path).and_then(|f| f.read_array("a"));
        assert!(matches!(res, Err(SynthError::CacheRead { .. })));
    }
}
