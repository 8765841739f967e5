//! Run configuration for a rename migration.
//!
//! Names the source and destination databases and where the rename map
//! comes from. Every field is optional in the file; missing fields fall back
//! to the voter identity defaults.
//!
//! # Example YAML
//!
//! ```yaml
//! source: voter_identity.db
//! destination: voter_list_readable.db
//! mapping_file: renames.yaml
//! ```
//!
//! An inline map may be given instead of `mapping_file`:
//!
//! ```yaml
//! mapping:
//!   tables:
//!     t1: province
//!   columns:
//!     t1: { c1: id, c2: name }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use schema_rename_core::RenameMap;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::mapping_file::load_mapping;

/// Source database used when nothing else is configured.
pub const DEFAULT_SOURCE: &str = "voter_identity.db";

/// Destination database used when nothing else is configured.
pub const DEFAULT_DESTINATION: &str = "voter_list_readable.db";

/// Where a run's rename map comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingSource {
    /// The compiled-in voter identity mapping.
    Builtin,
    /// A JSON or YAML mapping file.
    File(PathBuf),
    /// A map embedded in the run configuration.
    Inline,
}

/// Top-level run configuration.
///
/// # Examples
///
/// ```
/// use schema_rename_config::{MappingSource, RunConfig};
///
/// let config: RunConfig = serde_yaml::from_str("source: old.db\n").unwrap();
/// assert_eq!(config.source.to_str(), Some("old.db"));
/// assert_eq!(config.destination.to_str(), Some("voter_list_readable.db"));
/// assert_eq!(config.mapping_source().unwrap(), MappingSource::Builtin);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Existing database to read from.
    #[serde(default = "default_source")]
    pub source: PathBuf,
    /// Database to create. Any existing file at this path is deleted.
    #[serde(default = "default_destination")]
    pub destination: PathBuf,
    /// Path to a mapping file, relative to the config file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping_file: Option<PathBuf>,
    /// Inline rename map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<RenameMap>,
}

fn default_source() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCE)
}

fn default_destination() -> PathBuf {
    PathBuf::from(DEFAULT_DESTINATION)
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            destination: default_destination(),
            mapping_file: None,
            mapping: None,
        }
    }
}

impl RunConfig {
    /// Loads configuration from a YAML file.
    ///
    /// A relative `mapping_file` is resolved against the directory holding
    /// the configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be read,
    /// [`YamlError`](ConfigError::YamlError) if parsing fails, or
    /// [`InvalidConfig`](ConfigError::InvalidConfig) if both `mapping` and
    /// `mapping_file` are set.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let mut config: Self = serde_yaml::from_reader(reader)?;
        config.mapping_source()?;

        if let (Some(file), Some(dir)) = (config.mapping_file.as_mut(), path.parent()) {
            if file.is_relative() {
                *file = dir.join(&*file);
            }
        }
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Reports which rename map this configuration selects.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`](ConfigError::InvalidConfig) when both an
    /// inline map and a mapping file are given.
    pub fn mapping_source(&self) -> Result<MappingSource> {
        match (&self.mapping_file, &self.mapping) {
            (Some(_), Some(_)) => Err(ConfigError::InvalidConfig(
                "`mapping` and `mapping_file` are mutually exclusive".to_string(),
            )),
            (Some(file), None) => Ok(MappingSource::File(file.clone())),
            (None, Some(_)) => Ok(MappingSource::Inline),
            (None, None) => Ok(MappingSource::Builtin),
        }
    }

    /// Produces the rename map selected by this configuration.
    pub fn resolve_mapping(&self) -> Result<RenameMap> {
        match self.mapping_source()? {
            MappingSource::Builtin => Ok(RenameMap::builtin().clone()),
            MappingSource::File(path) => load_mapping(path),
            MappingSource::Inline => Ok(self.mapping.clone().unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline_yaml() -> &'static str {
        r#"
source: in.db
destination: out.db
mapping:
  tables:
    t1: province
  columns:
    t1:
      c1: id
      c2: name
"#
    }

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.source, PathBuf::from(DEFAULT_SOURCE));
        assert_eq!(config.destination, PathBuf::from(DEFAULT_DESTINATION));
        assert_eq!(config.mapping_source().unwrap(), MappingSource::Builtin);
        assert_eq!(config.resolve_mapping().unwrap().table_count(), 13);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: RunConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.source, PathBuf::from(DEFAULT_SOURCE));
        assert!(config.mapping.is_none());
    }

    #[test]
    fn test_inline_mapping() {
        let config: RunConfig = serde_yaml::from_str(inline_yaml()).unwrap();
        assert_eq!(config.mapping_source().unwrap(), MappingSource::Inline);
        let map = config.resolve_mapping().unwrap();
        assert_eq!(map.table_name("t1"), Some("province"));
        assert_eq!(map.column_name("t1", "c2"), "name");
        assert_eq!(map.table_name("t2"), None);
    }

    #[test]
    fn test_mapping_and_file_conflict() {
        let mut config: RunConfig = serde_yaml::from_str(inline_yaml()).unwrap();
        config.mapping_file = Some(PathBuf::from("other.yaml"));
        assert!(matches!(
            config.mapping_source(),
            Err(ConfigError::InvalidConfig(_))
        ));
    }
}
