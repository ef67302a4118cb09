//! Card mount and directory listing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::bus::{Bus, Pin};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("no card at {0}")]
    NoCard(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Root of a mounted card filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountedRoot {
    path: PathBuf,
}

impl MountedRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_file: bool,
}

pub trait Storage {
    fn mount(&mut self, bus: &Bus, select: Pin) -> Result<MountedRoot, StorageError>;
    fn list_entries(&self, root: &MountedRoot) -> Result<Vec<DirEntry>, StorageError>;
}

/// A host directory standing in for the card.
#[derive(Debug, Clone)]
pub struct CardDirectory {
    device: PathBuf,
}

impl CardDirectory {
    pub fn new(device: impl Into<PathBuf>) -> Self {
        Self { device: device.into() }
    }
}

impl Storage for CardDirectory {
    fn mount(&mut self, _bus: &Bus, select: Pin) -> Result<MountedRoot, StorageError> {
        let metadata = match fs::metadata(&self.device) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NoCard(self.device.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_dir() {
            return Err(StorageError::NoCard(self.device.clone()));
        }
        log::info!(
            "mounted {} (card select {}) as {}",
            self.device.display(),
            select,
            crate::constants::MOUNT_POINT
        );
        Ok(MountedRoot::new(&self.device))
    }

    fn list_entries(&self, root: &MountedRoot) -> Result<Vec<DirEntry>, StorageError> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(root.path())? {
            let entry = entry?;
            let is_file = entry.file_type()?.is_file();
            match entry.file_name().into_string() {
                Ok(name) => entries.push(DirEntry { name, is_file }),
                Err(raw) => log::warn!("skipping entry with non UTF-8 name {:?}", raw),
            }
        }
        Ok(entries)
    }
}
