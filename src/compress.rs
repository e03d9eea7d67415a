//! Transparent gzip and zstd handling for grid files.
//!
//! Compression is chosen by file extension (.gz/.gzip → gzip, .zst/.zstd →
//! zstd). Writers compress on the fly; reads decompress the whole file into
//! memory.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

/// Compression format implied by a file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Zstd,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("gz" | "gzip") => Compression::Gzip,
            Some("zst" | "zstd") => Compression::Zstd,
            _ => Compression::None,
        }
    }
}

/// A file sink that compresses according to its extension.
///
/// Call [`GridFile::finish`] to write any compression trailer and flush; a
/// dropped writer still closes the file but may leave a truncated stream.
pub enum GridFile {
    Plain(BufWriter<File>),
    Gzip(flate2::write::GzEncoder<BufWriter<File>>),
    Zstd(zstd::Encoder<'static, BufWriter<File>>),
}

impl GridFile {
    /// Create (or truncate) `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to create file: {}", path.display()))?;
        let buffered = BufWriter::with_capacity(128 * 1024, file);
        Ok(match Compression::from_path(path) {
            Compression::None => GridFile::Plain(buffered),
            Compression::Gzip => GridFile::Gzip(flate2::write::GzEncoder::new(
                buffered,
                flate2::Compression::default(),
            )),
            Compression::Zstd => GridFile::Zstd(
                zstd::Encoder::new(buffered, 0).with_context(|| {
                    format!("failed to initialize zstd encoder for: {}", path.display())
                })?,
            ),
        })
    }

    /// Finish the compressed stream (if any) and flush to disk.
    pub fn finish(self) -> Result<()> {
        let mut inner = match self {
            GridFile::Plain(w) => w,
            GridFile::Gzip(w) => w.finish().context("failed to finish gzip stream")?,
            GridFile::Zstd(w) => w.finish().context("failed to finish zstd stream")?,
        };
        inner.flush().context("failed to flush output file")?;
        Ok(())
    }
}

impl Write for GridFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            GridFile::Plain(w) => w.write(buf),
            GridFile::Gzip(w) => w.write(buf),
            GridFile::Zstd(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            GridFile::Plain(w) => w.flush(),
            GridFile::Gzip(w) => w.flush(),
            GridFile::Zstd(w) => w.flush(),
        }
    }
}

/// Read a file, decompressing it if its extension says so.
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    let file =
        File::open(path).with_context(|| format!("failed to open file: {}", path.display()))?;
    let mut buf = Vec::new();
    match Compression::from_path(path) {
        Compression::None => {
            let mut file = file;
            file.read_to_end(&mut buf)
                .with_context(|| format!("failed to read file: {}", path.display()))?;
        }
        Compression::Gzip => {
            flate2::read::GzDecoder::new(file)
                .read_to_end(&mut buf)
                .with_context(|| format!("failed to decompress gzip file: {}", path.display()))?;
        }
        Compression::Zstd => {
            zstd::Decoder::new(file)
                .with_context(|| {
                    format!("failed to initialize zstd decoder for: {}", path.display())
                })?
                .read_to_end(&mut buf)
                .with_context(|| format!("failed to decompress zstd file: {}", path.display()))?;
        }
    }
    Ok(buf)
}
