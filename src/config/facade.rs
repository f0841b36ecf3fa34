//! Loading entry point tying sources and merge policy together.

use crate::config::merge::merge_policy;
use crate::config::sources::{environment, explicit_file, global_file};
use crate::config::WeaverConfig;
use crate::error::AspectError;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from every source and validate it.
    ///
    /// `explicit` names a file that must exist and overrides the user file.
    pub fn load(explicit: Option<&Path>) -> Result<WeaverConfig, AspectError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        builder = global_file::add_to_builder(builder)?;
        if let Some(path) = explicit {
            builder = explicit_file::add_to_builder(builder, path)?;
        }
        builder = environment::add_to_builder(builder);

        let config: WeaverConfig = builder.build()?.try_deserialize()?;
        config.ensure_valid()?;
        debug!(trace = config.dispatch.trace, level = %config.logging.level, "Configuration loaded");
        Ok(config)
    }

    /// Load a single file on top of defaults, ignoring other sources
    pub fn load_from_file(path: &Path) -> Result<WeaverConfig, AspectError> {
        let builder = explicit_file::add_to_builder(merge_policy::builder_with_defaults()?, path)?;
        let config: WeaverConfig = builder.build()?.try_deserialize()?;
        config.ensure_valid()?;
        Ok(config)
    }

    /// Location of the user config file, if one can be determined
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
