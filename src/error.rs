use failure::Fail;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Fail, Debug)]
pub enum SplitError {
    #[fail(display = "Problem with IO {}", _0)]
    Io(#[cause] io::Error),
    #[fail(display = "Problem with IO on {:?}: {}", path, cause)]
    PathIo {
        path: PathBuf,
        #[cause]
        cause: io::Error,
    },
    #[fail(display = "Error with de/serialization {}", _0)]
    Bincode(#[cause] bincode::Error),
    #[fail(
        display = "Discovered orphan hlog after split: {} log(s) listed, {} processed, {} corrupted",
        listed, processed, corrupted
    )]
    OrphanLog {
        listed: usize,
        processed: usize,
        corrupted: usize,
    },
    #[fail(display = "Interrupted while waiting on region writers, possible data loss")]
    Interrupted,
}

impl SplitError {
    /// An I/O failure tagged with the path it happened on.
    pub fn path_io(path: &Path, cause: io::Error) -> SplitError {
        SplitError::PathIo {
            path: path.to_path_buf(),
            cause,
        }
    }
}

impl From<io::Error> for SplitError {
    fn from(err: io::Error) -> Self {
        SplitError::Io(err)
    }
}

impl From<bincode::Error> for SplitError {
    fn from(err: bincode::Error) -> Self {
        SplitError::Bincode(err)
    }
}
