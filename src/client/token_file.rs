//! Persisted login token

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_TOKEN_FILE: &str = ".profrate_token";

/// A file holding the current token; its absence means logged out
#[derive(Debug, Clone)]
pub struct TokenFile {
    path: PathBuf,
}

impl TokenFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, token: &str) -> io::Result<()> {
        fs::write(&self.path, token)?;
        debug!("Saved token to {}", self.path.display());
        Ok(())
    }

    /// `None` when the file is missing or blank
    pub fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Returns false if there was nothing to delete
    pub fn delete(&self) -> io::Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_token_file_lifecycle() {
        let dir = tempdir().unwrap();
        let file = TokenFile::new(dir.path().join("token"));

        assert_eq!(file.load().unwrap(), None);
        assert!(!file.delete().unwrap());

        file.save("abc123").unwrap();
        assert_eq!(file.load().unwrap(), Some("abc123".to_string()));

        assert!(file.delete().unwrap());
        assert_eq!(file.load().unwrap(), None);
    }

    #[test]
    fn test_blank_file_is_logged_out() {
        let dir = tempdir().unwrap();
        let file = TokenFile::new(dir.path().join("token"));
        file.save("  \n").unwrap();
        assert_eq!(file.load().unwrap(), None);
    }
}
