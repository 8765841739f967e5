//! Loading and saving [`RenameMap`] files.
//!
//! The format is picked from the file extension: `.json` for JSON,
//! `.yaml` or `.yml` for YAML. Both use the same shape:
//!
//! ```yaml
//! tables:
//!   t1: province
//! columns:
//!   t1:
//!     c1: id
//!     c2: name
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use schema_rename_core::RenameMap;

use crate::error::{ConfigError, Result};

/// Serialization format of a mapping file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingFormat {
    Json,
    Yaml,
}

impl MappingFormat {
    /// Detects the format from `path`'s extension.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Loads a rename map from a JSON or YAML file.
pub fn load_mapping(path: impl AsRef<Path>) -> Result<RenameMap> {
    let path = path.as_ref();
    let format = MappingFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path)?);
    let map = match format {
        MappingFormat::Json => serde_json::from_reader(reader)?,
        MappingFormat::Yaml => serde_yaml::from_reader(reader)?,
    };
    Ok(map)
}

/// Writes a rename map, choosing the format from the extension.
pub fn save_mapping(map: &RenameMap, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = MappingFormat::from_path(path)?;
    let writer = BufWriter::new(File::create(path)?);
    match format {
        MappingFormat::Json => serde_json::to_writer_pretty(writer, map)?,
        MappingFormat::Yaml => serde_yaml::to_writer(writer, map)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            MappingFormat::from_path(Path::new("map.json")).unwrap(),
            MappingFormat::Json
        );
        assert_eq!(
            MappingFormat::from_path(Path::new("map.YML")).unwrap(),
            MappingFormat::Yaml
        );
        assert_eq!(
            MappingFormat::from_path(Path::new("dir/map.yaml")).unwrap(),
            MappingFormat::Yaml
        );
    }

    #[test]
    fn test_unsupported_format() {
        assert!(matches!(
            MappingFormat::from_path(Path::new("map.toml")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(MappingFormat::from_path(Path::new("map")).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_mapping("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
