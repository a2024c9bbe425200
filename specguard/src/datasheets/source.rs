//! Source documents: one `<device_id>.<ext>` file per device.
//!
//! The extension picks how text is obtained: PDFs go through `pdf-extract`,
//! `.txt` files are taken as already-extracted text.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::SpecGuardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Pdf,
    Text,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(SourceKind::Pdf),
            "txt" => Some(SourceKind::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub device_id: String,
    pub path: PathBuf,
    pub kind: SourceKind,
}

impl SourceDocument {
    pub fn from_path(path: &Path) -> Option<Self> {
        let kind = SourceKind::from_path(path)?;
        let device_id = path.file_stem()?.to_str()?.to_string();
        Some(Self {
            device_id,
            path: path.to_path_buf(),
            kind,
        })
    }

    /// Raw text of the whole document, pages joined by newlines.
    pub fn read_text(&self) -> Result<String, SpecGuardError> {
        match self.kind {
            SourceKind::Text => Ok(std::fs::read_to_string(&self.path)?),
            SourceKind::Pdf => pdf_extract::extract_text(&self.path)
                .map_err(|e| SpecGuardError::Pdf(format!("{}: {}", self.path.display(), e))),
        }
    }
}

/// Source documents in `dir`, sorted by file name.
pub fn discover_datasheets(dir: &Path) -> Result<Vec<SourceDocument>, SpecGuardError> {
    let mut documents = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(doc) = SourceDocument::from_path(&path) {
            documents.push(doc);
        }
    }
    documents.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(documents)
}

/// Where the store gets raw document text for a device.
pub trait SourceProvider {
    /// `Ok(None)` when the device has no source document.
    fn source_text(&self, device_id: &str) -> Result<Option<String>, SpecGuardError>;
}

/// Datasheet directory lookup: `<device_id>.pdf`, then `<device_id>.txt`.
pub struct DatasheetDirectory {
    dir: PathBuf,
}

impl DatasheetDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn find(&self, device_id: &str) -> Option<SourceDocument> {
        ["pdf", "PDF", "txt"]
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", device_id, ext)))
            .find(|path| path.is_file())
            .and_then(|path| SourceDocument::from_path(&path))
    }
}

impl SourceProvider for DatasheetDirectory {
    fn source_text(&self, device_id: &str) -> Result<Option<String>, SpecGuardError> {
        self.find(device_id).map(|doc| doc.read_text()).transpose()
    }
}

impl SourceProvider for HashMap<String, String> {
    fn source_text(&self, device_id: &str) -> Result<Option<String>, SpecGuardError> {
        Ok(self.get(device_id).cloned())
    }
}
