use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkinGenError {
    #[error("configuration error: {0}")] Configuration(String),
    #[error("generation failed: {0}")] Generation(String),
    #[error("export failed: {0}")] Export(String),
    #[error("reminder failed: {0}")] Notification(String),
    #[error("asset missing: {}", .0.display())] AssetMissing(PathBuf),
    #[error("io error: {0}")] Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SkinGenError>;
