//! Static export: record + render configuration → self-contained site bundle.
//!
//! The bundle is `index.html`, `styles.css` and, when a brief exists, `prd.md`.
//! Output is byte-for-byte deterministic for the same inputs: the footer year
//! is an argument and zip entries carry a fixed timestamp.

pub mod css;
pub mod escape;
pub mod html;

use std::io::{Cursor, Write};

use thiserror::Error;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::errors::AppError;
use crate::models::{RenderConfig, ResumeData};

pub const BUNDLE_FILENAME: &str = "portfolio-site.zip";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to add {name} to archive: {source}")]
    Zip {
        name: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to write {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::ExportFailed(err.to_string())
    }
}

/// The files of an exported site, in archive order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteBundle {
    pub files: Vec<(String, String)>,
}

impl SiteBundle {
    /// Deflate-compressed zip archive of every file.
    pub fn to_zip(&self) -> Result<Vec<u8>, ExportError> {
        let mut buf = Vec::new();
        {
            let mut writer = ZipWriter::new(Cursor::new(&mut buf));
            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .last_modified_time(DateTime::default());

            for (name, content) in &self.files {
                writer
                    .start_file(name.as_str(), options)
                    .map_err(|source| ExportError::Zip {
                        name: name.clone(),
                        source,
                    })?;
                writer
                    .write_all(content.as_bytes())
                    .map_err(|source| ExportError::Io {
                        name: name.clone(),
                        source,
                    })?;
            }

            writer.finish().map_err(|source| ExportError::Zip {
                name: BUNDLE_FILENAME.to_string(),
                source,
            })?;
        }
        Ok(buf)
    }
}

pub fn build_bundle(
    record: &ResumeData,
    config: &RenderConfig,
    brief_md: Option<&str>,
    year: i32,
) -> SiteBundle {
    let mut files = vec![
        ("index.html".to_string(), html::index_html(record, config, year)),
        ("styles.css".to_string(), css::stylesheet(&config.theme)),
    ];
    if let Some(brief) = brief_md.filter(|b| !b.trim().is_empty()) {
        files.push(("prd.md".to_string(), brief.to_string()));
    }
    SiteBundle { files }
}

/// Builds the bundle and packs it in one step.
pub fn export_zip(
    record: &ResumeData,
    config: &RenderConfig,
    brief_md: Option<&str>,
    year: i32,
) -> Result<Vec<u8>, AppError> {
    let bundle = build_bundle(record, config, brief_md, year);
    let bytes = bundle.to_zip()?;
    info!(
        "Exported {} ({} files, {} bytes)",
        BUNDLE_FILENAME,
        bundle.files.len(),
        bytes.len()
    );
    Ok(bytes)
}
