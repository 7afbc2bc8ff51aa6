use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: `<dir>/<stem>_translated.<extension>` next to the source
    pub fn translated_output_path<P: AsRef<Path>>(source: P, extension: &str) -> PathBuf {
        let source = source.as_ref();
        let stem = source.file_stem().unwrap_or_default().to_string_lossy();
        let file_name = format!("{}_translated.{}", stem, extension.trim_start_matches('.'));

        match source.parent() {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Write bytes to a file, creating the parent directory first
    pub fn write_bytes<P: AsRef<Path>>(path: P, content: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }
        fs::write(path, content)
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        Self::write_bytes(&path, content.as_bytes())
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }
}
