//! Stitched image persistence.
//!
//! A [`StitchedImage`] is the result of one build. It remembers the request
//! it was built from and the path it saves to by default, which is either
//! the request's explicit output path or
//! `{output_dir}/{lat}_{lon}_{zoom}_{width}_{height}.jpg`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;
use tracing::{info, warn};

use crate::request::BuildRequest;

/// Errors from saving or deleting an image.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("failed to remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
}

/// A completed stitched image.
#[derive(Debug, Clone)]
pub struct StitchedImage {
    image: RgbImage,
    request: BuildRequest,
    path: PathBuf,
}

impl StitchedImage {
    /// Wraps a finished raster. `path` is where [`StitchedImage::save`] writes.
    pub fn new(image: RgbImage, request: BuildRequest, path: PathBuf) -> Self {
        Self {
            image,
            request,
            path,
        }
    }

    /// Default save path for a request.
    pub fn default_path(request: &BuildRequest, output_dir: &Path) -> PathBuf {
        request
            .output
            .clone()
            .unwrap_or_else(|| output_dir.join(request.default_file_name()))
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    pub fn request(&self) -> &BuildRequest {
        &self.request
    }

    /// Path the image saves to and deletes from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Saves to the default path.
    pub fn save(&self) -> Result<PathBuf, OutputError> {
        self.write(&self.path)?;
        Ok(self.path.clone())
    }

    /// Saves to an explicit path and makes it the image's path.
    ///
    /// The format follows the file extension.
    pub fn save_to(&mut self, path: impl Into<PathBuf>) -> Result<PathBuf, OutputError> {
        let path = path.into();
        self.write(&path)?;
        self.path = path.clone();
        Ok(path)
    }

    /// Saves into `folder`, keeping the current file name.
    pub fn save_in(&mut self, folder: impl AsRef<Path>) -> Result<PathBuf, OutputError> {
        let file_name = self
            .path
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(self.request.default_file_name()));
        self.save_to(folder.as_ref().join(file_name))
    }

    /// Deletes the saved file.
    ///
    /// Returns `Ok(false)` and logs a warning if there is nothing to delete.
    pub fn delete(&self) -> Result<bool, OutputError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "File removed");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(path = %self.path.display(), "File does not exist");
                Ok(false)
            }
            Err(source) => Err(OutputError::Remove {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn write(&self, path: &Path) -> Result<(), OutputError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        self.image.save(path).map_err(|source| OutputError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "File saved");
        Ok(())
    }
}
