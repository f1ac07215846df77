//! Read-only access to materialized DAG files.
//!
//! A DAG file is an 8-byte magic prefix followed by consecutive
//! 64-byte dataset items. The Merkle layer groups item pairs into
//! 128-byte words: word `i` occupies bytes
//! `[8 + 128·i, 8 + 128·(i+1))`.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

use ethproof_mtree::{Word, WORD_LENGTH};

use crate::error::{EthashError, EthashResult};
use crate::params;

/// An open DAG file. Reads are positioned; the handle is single-owner
/// and closed on drop.
#[derive(Debug)]
pub struct DagFile {
    file: File,
    path: PathBuf,
    data_len: u64,
}

impl DagFile {
    /// Open a materialized DAG file.
    pub fn open(path: impl AsRef<Path>) -> EthashResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                EthashError::DagMissing { path: path.clone() }
            } else {
                EthashError::Io(e)
            }
        })?;
        let len = file.metadata()?.len();
        if len < params::DAG_MAGIC_LENGTH {
            return Err(EthashError::MalformedDag {
                reason: format!("{} bytes, shorter than the magic prefix", len),
            });
        }
        let data_len = len - params::DAG_MAGIC_LENGTH;
        debug!(path = %path.display(), data_len, "opened DAG file");
        Ok(Self {
            file,
            path,
            data_len,
        })
    }

    /// Path this DAG was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of 64-byte dataset items behind the magic prefix.
    pub fn node_count(&self) -> u64 {
        self.data_len / params::HASH_BYTES as u64
    }

    /// Number of 128-byte Merkle words behind the magic prefix.
    pub fn word_count(&self) -> u64 {
        self.data_len / WORD_LENGTH as u64
    }

    /// Read one dataset item as 16 little-endian 32-bit words, the
    /// form hashimoto mixes with.
    pub fn read_node_words(&mut self, index: u64) -> EthashResult<[u32; params::HASH_WORDS]> {
        if index >= self.node_count() {
            return Err(EthashError::NodeOutOfRange {
                index,
                nodes: self.node_count(),
            });
        }
        let offset = params::DAG_MAGIC_LENGTH + index * params::HASH_BYTES as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        let mut buf = [0u8; params::HASH_BYTES];
        self.file.read_exact(&mut buf)?;

        let mut words = [0u32; params::HASH_WORDS];
        for (i, word) in words.iter_mut().enumerate() {
            *word = u32::from_le_bytes(buf[i * 4..(i + 1) * 4].try_into().expect("4-byte chunk"));
        }
        Ok(words)
    }

    /// Stream 128-byte words starting at `start_word`. The stream ends
    /// at `count` words or at a clean end of file, whichever comes
    /// first; a partial trailing word is an error.
    pub fn words(&mut self, start_word: u64, count: u64) -> EthashResult<WordStream<'_>> {
        let offset = params::DAG_MAGIC_LENGTH + start_word * WORD_LENGTH as u64;
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(WordStream {
            reader: BufReader::with_capacity(1 << 20, &mut self.file),
            remaining: count,
        })
    }
}

/// Iterator over consecutive 128-byte words of a DAG file.
pub struct WordStream<'a> {
    reader: BufReader<&'a mut File>,
    remaining: u64,
}

impl Iterator for WordStream<'_> {
    type Item = EthashResult<Word>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        read_word(&mut self.reader).transpose()
    }
}

/// Read one full word, retrying interrupted reads. A clean end of file
/// at a word boundary yields `None`; mid-word it is malformed.
fn read_word(reader: &mut impl Read) -> EthashResult<Option<Word>> {
    let mut buf = [0u8; WORD_LENGTH];
    let mut filled = 0;
    while filled < WORD_LENGTH {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => {
                return Err(EthashError::MalformedDag {
                    reason: format!("trailing {} bytes, not a whole 128-byte word", filled),
                })
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Some(Word(buf)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Write a synthetic DAG: 8-byte magic then `nodes` 64-byte items,
    /// item `i` filled with `i as u8`.
    fn write_dag(dir: &Path, nodes: u64) -> PathBuf {
        let path = dir.join("full-Rtest");
        let mut f = File::create(&path).unwrap();
        f.write_all(&[0xFE; 8]).unwrap();
        for i in 0..nodes {
            f.write_all(&[i as u8; params::HASH_BYTES]).unwrap();
        }
        path
    }

    #[test]
    fn test_open_missing_dag() {
        let dir = tempfile::tempdir().unwrap();
        let err = DagFile::open(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, EthashError::DagMissing { .. }));
    }

    #[test]
    fn test_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dag(dir.path(), 6);
        let dag = DagFile::open(&path).unwrap();
        assert_eq!(dag.node_count(), 6);
        assert_eq!(dag.word_count(), 3);
    }

    #[test]
    fn test_read_node_words() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dag(dir.path(), 4);
        let mut dag = DagFile::open(&path).unwrap();

        let words = dag.read_node_words(2).unwrap();
        assert_eq!(words, [u32::from_le_bytes([2, 2, 2, 2]); 16]);

        let err = dag.read_node_words(4).unwrap_err();
        assert!(matches!(
            err,
            EthashError::NodeOutOfRange { index: 4, nodes: 4 }
        ));
    }

    #[test]
    fn test_word_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dag(dir.path(), 6);
        let mut dag = DagFile::open(&path).unwrap();

        let words: Vec<Word> = dag.words(1, 2).unwrap().map(|w| w.unwrap()).collect();
        assert_eq!(words.len(), 2);
        // Word 1 = items 2 and 3.
        assert_eq!(words[0].0[0], 2);
        assert_eq!(words[0].0[64], 3);
        assert_eq!(words[1].0[0], 4);
    }

    #[test]
    fn test_word_stream_ends_at_eof() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dag(dir.path(), 4);
        let mut dag = DagFile::open(&path).unwrap();
        let words: Vec<_> = dag.words(0, 100).unwrap().collect();
        assert_eq!(words.len(), 2);
        assert!(words.iter().all(|w| w.is_ok()));
    }

    #[test]
    fn test_partial_trailing_word_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("truncated");
        let mut f = File::create(&path).unwrap();
        f.write_all(&[0xFE; 8]).unwrap();
        f.write_all(&[0u8; 200]).unwrap(); // one word and a half
        drop(f);

        let mut dag = DagFile::open(&path).unwrap();
        let results: Vec<_> = dag.words(0, 2).unwrap().collect();
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(EthashError::MalformedDag { .. })
        ));
    }

    #[test]
    fn test_too_short_for_magic_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stub");
        File::create(&path).unwrap().write_all(&[1, 2, 3]).unwrap();
        assert!(matches!(
            DagFile::open(&path),
            Err(EthashError::MalformedDag { .. })
        ));
    }
}
