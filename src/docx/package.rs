/*!
 * Zip-level access to a DOCX package.
 *
 * Entries are kept as an ordered list of (name, bytes) pairs so the output
 * package preserves the entry order of the input. Media files are stored
 * uncompressed, matching the typical DOCX layout.
 */

use std::io::{Read, Write};
use std::path::Path;

use crate::errors::ParseError;

const DOCUMENT_ENTRY: &str = "word/document.xml";

/// An opened DOCX package with its entries held in memory.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    /// Ordered (entry_name, bytes) pairs from the source zip
    entries: Vec<(String, Vec<u8>)>,
}

impl DocxPackage {
    /// Read a DOCX package from disk.
    pub fn read(path: &Path) -> Result<Self, ParseError> {
        let file = std::fs::File::open(path)
            .map_err(|e| ParseError::Package(format!("{}: {}", path.display(), e)))?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| ParseError::Package(format!("{}: {}", path.display(), e)))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| ParseError::Package(e.to_string()))?;
            let name = entry.name().to_string();
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .map_err(|e| ParseError::Package(format!("{}: {}", name, e)))?;
            entries.push((name, data));
        }

        let package = Self { entries };
        // Fail early if this is a zip but not a word-processing package
        package.document_xml()?;
        Ok(package)
    }

    /// Build a package from raw entries (used by tests).
    pub fn from_entries(entries: Vec<(String, Vec<u8>)>) -> Self {
        Self { entries }
    }

    /// Get the bytes of `word/document.xml`.
    pub fn document_xml(&self) -> Result<&[u8], ParseError> {
        self.entries
            .iter()
            .find(|(name, _)| name == DOCUMENT_ENTRY)
            .map(|(_, data)| data.as_slice())
            .ok_or_else(|| ParseError::MissingEntry(DOCUMENT_ENTRY.to_string()))
    }

    /// Replace the bytes of `word/document.xml`, leaving all other entries alone.
    pub fn set_document_xml(&mut self, data: Vec<u8>) {
        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| name == DOCUMENT_ENTRY) {
            entry.1 = data;
        } else {
            self.entries.push((DOCUMENT_ENTRY.to_string(), data));
        }
    }

    /// Names of media entries (images) in the package.
    pub fn media_entries(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(name, _)| name.starts_with("word/media/"))
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Write the package to disk, passing non-document entries through untouched.
    pub fn write(&self, path: &Path) -> Result<(), std::io::Error> {
        let file = std::fs::File::create(path)?;
        let mut zip = zip::ZipWriter::new(file);
        let deflated = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        let stored = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);

        for (name, data) in &self.entries {
            let opts = if name.starts_with("word/media/") { stored } else { deflated };
            zip.start_file(name.as_str(), opts)?;
            zip.write_all(data)?;
        }
        zip.finish()?;
        Ok(())
    }
}
