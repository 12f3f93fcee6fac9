use crate::assemble::SeriesSink;
use crate::config::{SEARCH_FILE_NAME, WRITE_BUFFER_SIZE};
use crate::models::{SearchRecord, SeriesDetails};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Removes everything a previous run left in `dir` and recreates it empty.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        info!(path = ?dir, "Cleaning output directory");
        fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to clean output directory: {:?}", dir))?;
    }
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))
}

pub fn search_path(dir: &Path) -> PathBuf {
    dir.join(SEARCH_FILE_NAME)
}

pub fn series_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{}.json", id))
}

/// Streams `search.json` as one JSON array without holding it in memory.
///
/// Records go to a `.partial` file that only [`finish`](Self::finish) renames
/// into place, so an aborted run can't leave a truncated index that looks
/// complete.
pub struct SearchIndexWriter {
    writer: BufWriter<File>,
    partial_path: PathBuf,
    final_path: PathBuf,
    count: u64,
}

impl SearchIndexWriter {
    pub fn create(path: PathBuf) -> Result<Self> {
        let partial_path = path.with_extension("json.partial");
        let file = File::create(&partial_path)
            .with_context(|| format!("Failed to create search index: {:?}", partial_path))?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        writer.write_all(b"[")?;

        Ok(Self {
            writer,
            partial_path,
            final_path: path,
            count: 0,
        })
    }

    pub fn append(&mut self, record: &SearchRecord) -> Result<()> {
        if self.count > 0 {
            self.writer.write_all(b",")?;
        }
        serde_json::to_writer(&mut self.writer, record)
            .with_context(|| format!("Failed to write search record: {}", record.id))?;
        self.count += 1;
        Ok(())
    }

    #[cfg(test)]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Closes the array and moves the index to its final name.
    pub fn finish(mut self) -> Result<u64> {
        self.writer.write_all(b"]")?;
        let file = self
            .writer
            .into_inner()
            .map_err(|e| e.into_error())
            .context("Failed to flush search index")?;
        file.sync_all().context("Failed to sync search index")?;
        drop(file);

        fs::rename(&self.partial_path, &self.final_path).with_context(|| {
            format!("Failed to rename search index to: {:?}", self.final_path)
        })?;
        Ok(self.count)
    }

    /// Flushes what was written and leaves it under the `.partial` name.
    pub fn abandon(mut self) {
        if let Err(e) = self.writer.flush() {
            warn!(error = %e, "Failed to flush partial search index");
        }
        warn!(
            path = ?self.partial_path,
            records = self.count,
            "Search index left incomplete"
        );
    }
}

/// Writes the search index entry and the detail document of every series.
pub struct OutputWriter {
    dir: PathBuf,
    search: SearchIndexWriter,
    written: u64,
}

impl OutputWriter {
    /// Opens the search index inside `dir`, which must already exist.
    pub fn create(dir: &Path) -> Result<Self> {
        Ok(Self {
            dir: dir.to_path_buf(),
            search: SearchIndexWriter::create(search_path(dir))?,
            written: 0,
        })
    }

    #[cfg(test)]
    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn finish(self) -> Result<u64> {
        let indexed = self.search.finish()?;
        info!(series = self.written, path = ?search_path(&self.dir), "Search index written");
        Ok(indexed)
    }

    pub fn abandon(self) {
        self.search.abandon();
    }

    fn write_details(&self, details: &SeriesDetails) -> Result<()> {
        let path = series_path(&self.dir, &details.id);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create series file: {:?}", path))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, details)
            .with_context(|| format!("Failed to write series file: {:?}", path))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush series file: {:?}", path))
    }
}

impl SeriesSink for OutputWriter {
    fn emit(&mut self, search: &SearchRecord, details: &SeriesDetails) -> Result<()> {
        self.search.append(search)?;
        self.write_details(details)?;
        self.written += 1;
        Ok(())
    }
}
