use async_trait::async_trait;
use axum::body::Bytes;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{ArchiveEntry, Archiver};
use crate::core::error::{AppError, Result};

/// Deflate-compressed zip archives built on the blocking pool
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipArchiver;

impl ZipArchiver {
    pub fn new() -> Self {
        Self
    }
}

fn write_zip(entries: Vec<ArchiveEntry>) -> zip::result::ZipResult<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in entries {
        writer.start_file(entry.name, options)?;
        writer.write_all(&entry.content)?;
    }

    Ok(writer.finish()?.into_inner())
}

#[async_trait]
impl Archiver for ZipArchiver {
    async fn archive(&self, entries: Vec<ArchiveEntry>) -> Result<Bytes> {
        let count = entries.len();
        let data = tokio::task::spawn_blocking(move || write_zip(entries))
            .await
            .map_err(|e| AppError::Internal(format!("Zip task failed: {}", e)))?
            .map_err(|e| AppError::Internal(format!("Failed to build zip archive: {}", e)))?;

        tracing::debug!("Packed {} entries into {} byte zip", count, data.len());
        Ok(Bytes::from(data))
    }
}
