//! G-code file reading and writing
//!
//! Files are read whole: the pre-pass needs every line before the streaming
//! pass starts. Output replaces the destination atomically, so an in-place
//! rewrite never leaves a truncated file behind.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use wavekit_core::{Error, GcodeError, Result};

/// Buffer size for reading and writing (256 KB)
const IO_BUFFER_SIZE: usize = 256 * 1024;

/// Files above this size get a memory warning
const LARGE_FILE_BYTES: u64 = 500 * 1024 * 1024;

/// A G-code file on disk
#[derive(Debug, Clone)]
pub struct GcodeFile {
    path: PathBuf,
    file_size: u64,
}

impl GcodeFile {
    /// Open a G-code file
    ///
    /// # Errors
    /// Returns an I/O error if the path does not exist or is not a file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::NotFound,
                format!("File does not exist: {}", path.display()),
            )));
        }

        if !path.is_file() {
            return Err(Error::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("Path is not a file: {}", path.display()),
            )));
        }

        let file_size = fs::metadata(&path)?.len();
        Ok(Self { path, file_size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File size in bytes
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Read every line, without terminators
    ///
    /// # Errors
    /// Returns an I/O error on read failure and [`GcodeError::EmptyInput`]
    /// for a file with no lines.
    pub fn read_lines(&self) -> Result<Vec<String>> {
        if self.file_size > LARGE_FILE_BYTES {
            tracing::warn!(
                "Reading very large file ({}MB) into memory",
                self.file_size / (1024 * 1024)
            );
        }

        let reader = BufReader::with_capacity(IO_BUFFER_SIZE, File::open(&self.path)?);
        let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;

        if lines.is_empty() {
            return Err(GcodeError::EmptyInput {
                source_name: self.path.display().to_string(),
            }
            .into());
        }

        tracing::debug!("Read {} lines from {}", lines.len(), self.path.display());
        Ok(lines)
    }
}

/// Write `lines` to `path`, each followed by `\n`
///
/// The content goes to a temporary file next to `path` first and is then
/// renamed over it.
pub fn write_lines<S: AsRef<str>>(path: impl AsRef<Path>, lines: &[S]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::with_capacity(IO_BUFFER_SIZE, temp.as_file());
        for line in lines {
            writer.write_all(line.as_ref().as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Wrote {} lines to {}", lines.len(), path.display());
    Ok(())
}
