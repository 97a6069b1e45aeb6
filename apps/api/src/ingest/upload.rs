//! Upload intake: the size gate and per-extension text decoding.
//!
//! PDF and DOCX decoding is CPU-bound and runs inside `tokio::task::spawn_blocking`.

use std::io::{Cursor, Read};

use axum::extract::multipart::{Field, Multipart};
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;
use tracing::{debug, info};

use crate::errors::AppError;

/// Upload ceiling used when configuration does not override it.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Slack allowed on a declared multipart `Content-Length` for boundaries and part headers.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;

/// Name of the multipart field carrying the résumé.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("Could not read DOCX: {0}")]
    Docx(String),

    #[error("The uploaded file contains no readable text")]
    Empty,
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Json,
    Text,
    Pdf,
    Docx,
}

impl UploadKind {
    /// Dispatches on the lowercase extension; anything unrecognised is read as plain text.
    pub fn from_filename(filename: &str) -> Self {
        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "json" => UploadKind::Json,
            "pdf" => UploadKind::Pdf,
            "docx" => UploadKind::Docx,
            _ => UploadKind::Text,
        }
    }
}

/// A received résumé file.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn kind(&self) -> UploadKind {
        UploadKind::from_filename(&self.filename)
    }
}

/// Result of decoding: JSON text goes to the validator, anything else to extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedUpload {
    Json(String),
    Text(String),
}

/// Rejects a declared size above the limit before anything is read.
pub fn check_declared_size(declared: u64, limit: u64) -> Result<(), AppError> {
    if declared > limit {
        return Err(AppError::FileTooLarge { limit });
    }
    Ok(())
}

/// Pulls the `file` field out of a multipart body, stopping as soon as the
/// running size passes `limit`.
pub async fn read_file_field(multipart: &mut Multipart, limit: u64) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("resume.txt").to_string();
        let bytes = read_limited(field, limit).await?;
        info!("Received upload {filename} ({} bytes)", bytes.len());
        return Ok(Upload { filename, bytes });
    }

    Err(AppError::Validation(format!(
        "multipart body must contain a '{FILE_FIELD}' field"
    )))
}

async fn read_limited(mut field: Field<'_>, limit: u64) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if (buf.len() + chunk.len()) as u64 > limit {
            return Err(AppError::FileTooLarge { limit });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

/// Decodes an upload into JSON or plain text according to its extension.
pub async fn decode_upload(upload: &Upload) -> Result<DecodedUpload, AppError> {
    let kind = upload.kind();
    debug!("Decoding {} as {:?}", upload.filename, kind);

    let text = match kind {
        UploadKind::Json => return Ok(DecodedUpload::Json(lossy_text(&upload.bytes))),
        UploadKind::Text => lossy_text(&upload.bytes),
        UploadKind::Pdf | UploadKind::Docx => {
            let bytes = upload.bytes.clone();
            tokio::task::spawn_blocking(move || match kind {
                UploadKind::Pdf => pdf_text(&bytes),
                _ => docx_text(&bytes),
            })
            .await
            .map_err(|e| decoder_aborted(kind, e))??
        }
    };

    if text.trim().is_empty() {
        return Err(UploadError::Empty.into());
    }
    Ok(DecodedUpload::Text(text))
}

/// A decoder task that panicked or was cancelled, reported against its own format.
fn decoder_aborted(kind: UploadKind, err: impl std::fmt::Display) -> UploadError {
    let reason = format!("decoder aborted: {err}");
    match kind {
        UploadKind::Docx => UploadError::Docx(reason),
        _ => UploadError::Pdf(reason),
    }
}

fn lossy_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn pdf_text(bytes: &[u8]) -> Result<String, UploadError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| UploadError::Pdf(e.to_string()))
}

/// Raw text of `word/document.xml`: one line per paragraph, tabs and breaks kept.
fn docx_text(bytes: &[u8]) -> Result<String, UploadError> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| UploadError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| UploadError::Docx(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| UploadError::Docx(e.to_string()))?;

    document_xml_text(&xml)
}

fn document_xml_text(xml: &str) -> Result<String, UploadError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let text = t.unescape().map_err(|e| UploadError::Docx(e.to_string()))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(UploadError::Docx(e.to_string())),
            _ => {}
        }
    }

    Ok(out)
}
