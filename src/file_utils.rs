use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::docx::DocxPackage;

/// File system utilities for document discovery and output handling
pub struct FileManager;

impl FileManager {
    /// Check if a file exists
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    /// Check if a directory exists
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    /// Create a directory and its parents if missing
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        if !path.as_ref().exists() {
            std::fs::create_dir_all(path.as_ref())
                .context(format!("Failed to create directory: {:?}", path.as_ref()))?;
        }
        Ok(())
    }

    /// Whether the path looks like a processable document
    pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("docx"))
    }

    /// Build the output path for a translated document:
    /// `report.docx` + `fr` -> `<output_dir>/report.fr.docx`
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        target_language: &str,
    ) -> Result<PathBuf> {
        let stem = input_file
            .as_ref()
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| anyhow!("Invalid input file name: {:?}", input_file.as_ref()))?;

        Ok(output_dir
            .as_ref()
            .join(format!("{}.{}.docx", stem, target_language)))
    }

    /// Whether a file name carries the given language suffix, i.e. is
    /// already a translation output
    pub fn is_translation_output<P: AsRef<Path>>(path: P, target_language: &str) -> bool {
        path.as_ref()
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.ends_with(&format!(".{}", target_language)))
    }

    /// Find all documents under a directory, recursively, in path order
    pub fn find_docx_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        if !Self::dir_exists(&dir) {
            return Err(anyhow!("Directory does not exist: {:?}", dir.as_ref()));
        }

        let mut files: Vec<PathBuf> = WalkDir::new(dir.as_ref())
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| Self::is_docx(path))
            .collect();
        files.sort();

        Ok(files)
    }

    /// Write a package next to its final location and rename into place, so
    /// a crash mid-write never leaves a truncated document
    pub fn write_package<P: AsRef<Path>>(package: &DocxPackage, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::ensure_dir(dir)?;

        let temp = tempfile::Builder::new()
            .prefix(".doctrans-")
            .suffix(".docx")
            .tempfile_in(dir)
            .context("Failed to create temporary output file")?;

        package
            .write(temp.path())
            .context(format!("Failed to write document package: {:?}", temp.path()))?;

        temp.persist(path)
            .map_err(|e| anyhow!("Failed to move output into place: {}", e.error))?;
        Ok(())
    }
}
