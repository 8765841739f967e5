//! Configuration loading for schema-rename runs.
//!
//! A run needs three things: the source database, the destination database,
//! and a rename map. [`RunConfig`] carries all three and can be loaded from
//! YAML; rename maps can also live in their own JSON or YAML file read with
//! [`load_mapping`].
//!
//! # Quick start
//!
//! ```no_run
//! use schema_rename_config::{RunConfig, load_mapping};
//!
//! let config = RunConfig::load("schema-rename.yaml").unwrap();
//! let map = config.resolve_mapping().unwrap();
//! println!("{} tables mapped", map.table_count());
//!
//! let custom = load_mapping("renames.json").unwrap();
//! assert!(custom.table_count() > 0);
//! ```

mod error;
mod mapping_file;
mod run;

pub use error::{ConfigError, Result};
pub use mapping_file::{MappingFormat, load_mapping, save_mapping};
pub use run::{DEFAULT_DESTINATION, DEFAULT_SOURCE, MappingSource, RunConfig};
