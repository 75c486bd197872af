//! Zip archive output.
//!
//! [`ArchiveBuilder`] streams entries into any `Write + Seek` sink in the
//! order they are appended. [`FinishedArchive`] is a flushed archive sitting
//! in a scratch file, removed once it has been streamed out.

use std::fs::File;
use std::io::{self, BufWriter, Seek, Write};
use std::path::Path;

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{QrBatchError, Result};
use crate::scratch::ScratchPath;

/// Download name of a batch archive.
pub const ARCHIVE_FILENAME: &str = "qrcodes.zip";

/// Media type of a batch archive.
pub const ARCHIVE_MEDIA_TYPE: &str = "application/zip";

/// Highest deflate level; archives are downloaded once, so size wins.
pub const DEFAULT_COMPRESSION_LEVEL: i64 = 9;

/// Incremental zip writer with a single owner.
pub struct ArchiveBuilder<W: Write + Seek> {
    writer: ZipWriter<W>,
    options: SimpleFileOptions,
    entries: usize,
}

impl<W: Write + Seek> ArchiveBuilder<W> {
    /// Starts an archive at the default compression level.
    pub fn new(sink: W) -> Self {
        Self::with_compression_level(sink, DEFAULT_COMPRESSION_LEVEL)
    }

    /// Starts an archive with deflate at `level` (0..=9).
    pub fn with_compression_level(sink: W, level: i64) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(level));
        Self { writer: ZipWriter::new(sink), options, entries: 0 }
    }

    /// Appends one entry. Entries land in the archive in call order.
    ///
    /// # Errors
    ///
    /// [`QrBatchError::ArchiveWrite`] if the sink fails or `name` is already
    /// present.
    pub fn append(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.writer.start_file(name, self.options)?;
        self.writer.write_all(bytes).map_err(ZipError::Io)?;
        self.entries += 1;
        Ok(())
    }

    /// Entries appended so far.
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Returns `true` if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Writes the central directory and hands the sink back.
    ///
    /// The returned sink still needs flushing by its owner; see
    /// [`ArchiveBuilder::finalize_file`] for file sinks.
    pub fn finalize(self) -> Result<W> {
        Ok(self.writer.finish()?)
    }
}

impl ArchiveBuilder<BufWriter<File>> {
    /// Finalizes, flushes and syncs a file-backed archive.
    ///
    /// Once this returns every appended entry is on disk.
    pub fn finalize_file(self) -> Result<File> {
        let file = self.finalize()?.into_inner().map_err(|e| QrBatchError::Io(e.into_error()))?;
        file.sync_all()?;
        Ok(file)
    }
}

/// A complete archive in a scratch file, deleted after it is sent.
#[derive(Debug)]
pub struct FinishedArchive {
    scratch: ScratchPath,
    entries: usize,
}

impl FinishedArchive {
    pub(crate) fn new(scratch: ScratchPath, entries: usize) -> Self {
        Self { scratch, entries }
    }

    /// Where the archive currently lives.
    pub fn path(&self) -> &Path {
        self.scratch.path()
    }

    /// Number of entries in the archive.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Archive size in bytes.
    pub fn size_bytes(&self) -> io::Result<u64> {
        Ok(std::fs::metadata(self.path())?.len())
    }

    /// Copies the archive into `out`, then removes the scratch file.
    ///
    /// Removal happens whether or not the copy succeeded; a failed removal is
    /// logged and not reported.
    pub fn stream_to<O: Write>(self, out: &mut O) -> Result<u64> {
        let mut file = File::open(self.path())?;
        let copied = io::copy(&mut file, out)?;
        out.flush()?;
        drop(file);
        self.scratch.release();
        Ok(copied)
    }
}
