use crate::common::Result;
use crate::error::SplitError;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// One listed file: its path and byte length at listing time.
#[derive(Debug, Clone, PartialEq)]
pub struct FileStatus {
    pub path: PathBuf,
    pub len: u64,
}

/// Narrow capability set over the filesystem holding the logs.
///
/// Operations take `&self` and must be safe to call concurrently; the
/// region flusher shares one adapter across its worker threads. Adapters
/// for remote filesystems retry transient failures internally and only
/// surface an error once retries are exhausted.
pub trait FileSystem: Send + Sync + 'static {
    type Reader: BufRead + Send;
    type Writer: Write + Send;

    fn exists(&self, path: &Path) -> Result<bool>;

    /// Lists the files directly under `path` with their lengths, sorted by
    /// path. The sort order is the stable input order for a split run.
    fn list(&self, path: &Path) -> Result<Vec<FileStatus>>;

    fn mkdirs(&self, path: &Path) -> Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    fn delete(&self, path: &Path) -> Result<()>;

    fn delete_recursive(&self, path: &Path) -> Result<()>;

    fn file_len(&self, path: &Path) -> Result<u64>;

    /// Blocks until `path` is no longer open for append and is safe to
    /// read end-to-end. Must be called before reading a dead server's log.
    fn recover_lease(&self, path: &Path) -> Result<()>;

    fn open_reader(&self, path: &Path) -> Result<Self::Reader>;

    /// Opens an append handle positioned at the end, creating the file if
    /// it does not exist.
    fn open_writer(&self, path: &Path) -> Result<Self::Writer>;
}

/// Adapter over the local filesystem.
pub struct LocalFs;

impl FileSystem for LocalFs {
    type Reader = BufReader<File>;
    type Writer = BufWriter<File>;

    fn exists(&self, path: &Path) -> Result<bool> {
        Ok(path.exists())
    }

    fn list(&self, path: &Path) -> Result<Vec<FileStatus>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| SplitError::path_io(path, e))? {
            let entry = entry.map_err(|e| SplitError::path_io(path, e))?;
            let meta = entry
                .metadata()
                .map_err(|e| SplitError::path_io(&entry.path(), e))?;
            if meta.is_file() {
                files.push(FileStatus {
                    path: entry.path(),
                    len: meta.len(),
                });
            }
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(files)
    }

    fn mkdirs(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| SplitError::path_io(path, e))
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        fs::rename(from, to).map_err(|e| SplitError::path_io(from, e))
    }

    fn delete(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).map_err(|e| SplitError::path_io(path, e))
    }

    fn delete_recursive(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path).map_err(|e| SplitError::path_io(path, e))
    }

    fn file_len(&self, path: &Path) -> Result<u64> {
        let meta = fs::metadata(path).map_err(|e| SplitError::path_io(path, e))?;
        Ok(meta.len())
    }

    fn recover_lease(&self, path: &Path) -> Result<()> {
        // Reopen for append and drop the handle. Locally there is no lease
        // to break; the reopen still fails if the file is gone.
        OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| SplitError::path_io(path, e))?;
        Ok(())
    }

    fn open_reader(&self, path: &Path) -> Result<Self::Reader> {
        let file = File::open(path).map_err(|e| SplitError::path_io(path, e))?;
        Ok(BufReader::new(file))
    }

    fn open_writer(&self, path: &Path) -> Result<Self::Writer> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .map_err(|e| SplitError::path_io(path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .seek(SeekFrom::End(0))
            .map_err(|e| SplitError::path_io(path, e))?;
        Ok(writer)
    }
}
