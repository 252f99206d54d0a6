//! Per-run toggles for the idiom rewriters.
//!
//! Every idiom is independently switchable. File-hijacking insertion is
//! off by default: prepending `Files.createFile` changes the failure mode
//! of code that overwrites an existing file, so hosts opt in explicitly.

use serde::{Deserialize, Serialize};

use crate::idioms::IdiomKind;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewriteConfig {
    #[serde(default = "default_enabled")]
    pub temp_dir_creation: bool,
    #[serde(default = "default_enabled")]
    pub temp_file_disclosure: bool,
    #[serde(default = "default_enabled")]
    pub dir_hijacking: bool,
    #[serde(default)]
    pub file_hijacking: bool,
}

fn default_enabled() -> bool {
    true
}

impl Default for RewriteConfig {
    fn default() -> Self {
        RewriteConfig {
            temp_dir_creation: true,
            temp_file_disclosure: true,
            dir_hijacking: true,
            file_hijacking: false,
        }
    }
}

impl RewriteConfig {
    /// Every idiom on, including the opt-in file-hijacking insertion.
    pub fn all() -> Self {
        RewriteConfig {
            temp_dir_creation: true,
            temp_file_disclosure: true,
            dir_hijacking: true,
            file_hijacking: true,
        }
    }

    /// Every idiom off. Useful as a base for [`set_enabled`](Self::set_enabled).
    pub fn none() -> Self {
        RewriteConfig {
            temp_dir_creation: false,
            temp_file_disclosure: false,
            dir_hijacking: false,
            file_hijacking: false,
        }
    }

    /// Exactly one idiom on.
    pub fn only(kind: IdiomKind) -> Self {
        let mut config = RewriteConfig::none();
        config.set_enabled(kind, true);
        config
    }

    pub fn set_enabled(&mut self, kind: IdiomKind, enabled: bool) {
        match kind {
            IdiomKind::TempDirCreation => self.temp_dir_creation = enabled,
            IdiomKind::TempFileDisclosure => self.temp_file_disclosure = enabled,
            IdiomKind::DirHijacking => self.dir_hijacking = enabled,
            IdiomKind::FileHijacking => self.file_hijacking = enabled,
        }
    }

    pub fn is_enabled(&self, kind: IdiomKind) -> bool {
        match kind {
            IdiomKind::TempDirCreation => self.temp_dir_creation,
            IdiomKind::TempFileDisclosure => self.temp_file_disclosure,
            IdiomKind::DirHijacking => self.dir_hijacking,
            IdiomKind::FileHijacking => self.file_hijacking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_disables_file_hijacking_only() {
        let config = RewriteConfig::default();
        assert!(config.temp_dir_creation);
        assert!(config.temp_file_disclosure);
        assert!(config.dir_hijacking);
        assert!(!config.file_hijacking);
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let config: RewriteConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RewriteConfig::default());
    }

    #[test]
    fn only_enables_a_single_idiom() {
        let config = RewriteConfig::only(IdiomKind::FileHijacking);
        assert!(config.file_hijacking);
        assert!(!config.temp_dir_creation);
        assert!(!config.temp_file_disclosure);
        assert!(!config.dir_hijacking);
    }
}
