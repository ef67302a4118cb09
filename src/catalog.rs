//! Ordered, circular list of the bitmaps found on the card.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::constants::BITMAP_EXTENSION;
use crate::storage::{MountedRoot, Storage, StorageError};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("no bitmap files found in {0}")]
    Empty(PathBuf),
    #[error("failed to list {0}: {1}")]
    Listing(PathBuf, #[source] StorageError),
}

/// A catalogued bitmap. Ordered by the raw bytes of its full path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageFile {
    path: PathBuf,
}

impl ImageFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Ord for ImageFile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path
            .as_os_str()
            .as_encoded_bytes()
            .cmp(other.path.as_os_str().as_encoded_bytes())
    }
}

impl PartialOrd for ImageFile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// True when `name` ends with the bitmap extension, ignoring ASCII case.
pub fn is_bitmap(name: &str) -> bool {
    let name = name.as_bytes();
    let ext = BITMAP_EXTENSION.as_bytes();
    name.len() >= ext.len() && name[name.len() - ext.len()..].eq_ignore_ascii_case(ext)
}

/// Never empty: [`ImageCatalog::build`] refuses to produce one without files.
#[derive(Debug, Clone)]
pub struct ImageCatalog {
    files: Vec<ImageFile>,
}

#[allow(clippy::len_without_is_empty)]
impl ImageCatalog {
    pub fn build<S: Storage + ?Sized>(
        storage: &S,
        root: &MountedRoot,
    ) -> Result<Self, CatalogError> {
        let entries = storage
            .list_entries(root)
            .map_err(|e| CatalogError::Listing(root.path().to_path_buf(), e))?;

        let mut files: Vec<ImageFile> = entries
            .into_iter()
            .filter(|entry| entry.is_file && is_bitmap(&entry.name))
            .map(|entry| ImageFile::new(root.path().join(entry.name)))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(CatalogError::Empty(root.path().to_path_buf()));
        }
        Ok(Self { files })
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// The file at `index`, wrapping past the end.
    pub fn get(&self, index: usize) -> &ImageFile {
        &self.files[index % self.files.len()]
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.files.len()
    }

    pub fn files(&self) -> &[ImageFile] {
        &self.files
    }
}
