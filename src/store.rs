//! Directory-backed file storage addressed by name

use std::{
    error, fmt, io,
    path::{Component, Path, PathBuf},
};

/// Files under a root directory, addressed by the name that follows
/// `/files/` in the request path.
///
/// Names may contain `/` to reach nested files, but they can never leave the
/// root: empty names, absolute names and names with a `..` component are
/// rejected with [`StoreError::InvalidName`].
///
/// Contents are never cached, every call goes to the filesystem. Concurrent
/// writes to the same name are not coordinated, the last one wins.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

#[derive(Debug)]
pub enum StoreError {
    NotFound,
    InvalidName,
    Io(io::Error),
}

impl FileStore {
    #[inline]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads the whole file stored under `name`.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(name)?;

        match tokio::fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound),
            Err(_) if tokio::fs::metadata(&path).await.is_ok_and(|m| m.is_dir()) => {
                Err(StoreError::NotFound)
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    /// Stores `data` under `name`, replacing any previous contents.
    pub async fn write(&self, name: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve(name)?;

        tokio::fs::write(&path, data).await.map_err(StoreError::Io)
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(name);

        let is_contained = !name.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

        match is_contained {
            true => Ok(self.root.join(relative)),
            false => Err(StoreError::InvalidName),
        }
    }
}

impl error::Error for StoreError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("file not found"),
            Self::InvalidName => f.write_str("file name escapes the store root"),
            Self::Io(e) => write!(f, "storage failure: {e}"),
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(err: io::Error) -> Self {
        StoreError::Io(err)
    }
}
