//! Definition loading.
//!
//! [`DefinitionLoader`] reads a definition file (YAML or JSON, chosen by
//! extension), merges user aliases into it, converts it into a metadata tree
//! and validates the result.
//!
//! ```no_run
//! use cmdtree_config::{DefinitionLoader, UserAliasSource};
//!
//! let global = DefinitionLoader::new()
//!     .with_user_aliases(UserAliasSource::new().with_location("aliases.conf"))
//!     .load("tool.yaml")
//!     .unwrap();
//! println!("Loaded {} commands", global.default_group_commands.len());
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use cmdtree_core::{GlobalMetadata, RestrictionRegistry, validate_global};
use tracing::debug;

use crate::aliases::UserAliasSource;
use crate::definition::CliDefinition;
use crate::error::{ConfigError, Result};

/// Serialization format of a definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Yaml,
    Json,
}

impl DefinitionFormat {
    /// Picks the format from the file extension (`yaml`, `yml` or `json`).
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Reads a definition file without converting it.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedFormat`] for an unknown extension,
/// [`ConfigError::IoError`] if the file cannot be opened, or the JSON/YAML
/// error if parsing fails.
pub fn read_definition(path: impl AsRef<Path>) -> Result<CliDefinition> {
    let path = path.as_ref();
    let format = DefinitionFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path)?);
    let definition = match format {
        DefinitionFormat::Yaml => serde_yaml::from_reader(reader)?,
        DefinitionFormat::Json => serde_json::from_reader(reader)?,
    };
    Ok(definition)
}

/// Parses definition text in the given format.
pub fn parse_definition(content: &str, format: DefinitionFormat) -> Result<CliDefinition> {
    let definition = match format {
        DefinitionFormat::Yaml => serde_yaml::from_str(content)?,
        DefinitionFormat::Json => serde_json::from_str(content)?,
    };
    Ok(definition)
}

/// Builds validated metadata trees from definitions.
#[derive(Debug, Clone, Default)]
pub struct DefinitionLoader {
    registry: RestrictionRegistry,
    user_aliases: UserAliasSource,
}

impl DefinitionLoader {
    /// Creates a loader using the default restriction registry and no user
    /// aliases.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the restriction registry.
    pub fn with_registry(mut self, registry: RestrictionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the user alias files merged into every loaded definition.
    pub fn with_user_aliases(mut self, source: UserAliasSource) -> Self {
        self.user_aliases = source;
        self
    }

    /// Appends one user alias file.
    pub fn with_alias_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.user_aliases = self.user_aliases.with_location(path);
        self
    }

    pub fn registry(&self) -> &RestrictionRegistry {
        &self.registry
    }

    /// Loads, converts and validates the definition at `path`.
    ///
    /// # Errors
    ///
    /// Any read or parse error, a [`ConfigError::AliasSyntax`] from a user
    /// alias file, a [`ConfigError::Restriction`] for malformed restriction
    /// parameters, or [`ConfigError::InvalidMetadata`] when the resulting
    /// tree fails validation.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<GlobalMetadata> {
        let path = path.as_ref();
        let definition = read_definition(path)?;
        debug!(path = %path.display(), program = %definition.name, "Loaded definition");
        self.build(definition)
    }

    /// Like [`load`](Self::load), from in-memory text.
    pub fn load_str(&self, content: &str, format: DefinitionFormat) -> Result<GlobalMetadata> {
        self.build(parse_definition(content, format)?)
    }

    /// Merges user aliases into `definition` and converts it.
    pub fn build(&self, mut definition: CliDefinition) -> Result<GlobalMetadata> {
        if !self.user_aliases.is_empty() {
            definition.merge_aliases(self.user_aliases.load()?);
        }
        let global = definition.to_metadata(&self.registry)?;

        let errors = validate_global(&global);
        if !errors.is_empty() {
            return Err(ConfigError::InvalidMetadata(errors));
        }
        Ok(global)
    }
}
