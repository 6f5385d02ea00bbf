//! Parser configuration.
//!
//! A [`ParserConfig`] is built once and never mutated. It is cheap to clone
//! (the error handler is shared behind an [`Arc`]) and can be used by any
//! number of concurrent parses.

use std::fmt;
use std::sync::Arc;

use crate::handler::{ErrorHandler, FailFast};
use crate::types::AliasMetadata;

/// Default prefix that forces a token to be read as a builtin.
pub const DEFAULT_FORCE_BUILTIN_PREFIX: char = '!';

/// Default token separating options from positional arguments.
pub const DEFAULT_ARGUMENTS_SEPARATOR: &str = "--";

/// Alias, abbreviation and error-handling policy for a parse.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{AliasMetadata, ParserConfig};
///
/// let config = ParserConfig::builder()
///     .alias(AliasMetadata::new("ls", &["list", "--format", "${1:-table}"]))
///     .aliases_may_chain(true)
///     .build();
///
/// assert!(config.find_alias("ls").is_some());
/// assert!(config.aliases_may_chain());
/// assert!(!config.aliases_override_builtins());
/// assert_eq!(config.force_builtin_prefix(), '!');
/// ```
#[derive(Clone)]
pub struct ParserConfig {
    aliases: Vec<AliasMetadata>,
    aliases_may_chain: bool,
    aliases_override_builtins: bool,
    force_builtin_prefix: char,
    arguments_separator: Option<String>,
    allow_abbreviated_commands: bool,
    allow_abbreviated_options: bool,
    error_handler: Arc<dyn ErrorHandler>,
}

impl ParserConfig {
    /// Returns a builder starting from the default configuration.
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder::default()
    }

    /// Configured aliases, in declaration order.
    pub fn aliases(&self) -> &[AliasMetadata] {
        &self.aliases
    }

    /// Finds an alias by exact name.
    pub fn find_alias(&self, name: &str) -> Option<&AliasMetadata> {
        self.aliases.iter().find(|a| a.name == name)
    }

    /// Whether an expansion may itself start with another alias.
    pub fn aliases_may_chain(&self) -> bool {
        self.aliases_may_chain
    }

    /// Whether an alias may shadow a group or ungrouped command of the same name.
    pub fn aliases_override_builtins(&self) -> bool {
        self.aliases_override_builtins
    }

    /// Prefix that bypasses alias resolution for the leading token.
    pub fn force_builtin_prefix(&self) -> char {
        self.force_builtin_prefix
    }

    /// Token after which everything is a positional argument.
    pub fn arguments_separator(&self) -> Option<&str> {
        self.arguments_separator.as_deref()
    }

    /// Whether a unique prefix of a group or command name selects it.
    pub fn allow_abbreviated_commands(&self) -> bool {
        self.allow_abbreviated_commands
    }

    /// Whether a unique prefix of a long option name selects it.
    pub fn allow_abbreviated_options(&self) -> bool {
        self.allow_abbreviated_options
    }

    /// Handler notified of every parse error.
    pub fn error_handler(&self) -> &dyn ErrorHandler {
        self.error_handler.as_ref()
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfigBuilder::default().build()
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("aliases", &self.aliases)
            .field("aliases_may_chain", &self.aliases_may_chain)
            .field("aliases_override_builtins", &self.aliases_override_builtins)
            .field("force_builtin_prefix", &self.force_builtin_prefix)
            .field("arguments_separator", &self.arguments_separator)
            .field("allow_abbreviated_commands", &self.allow_abbreviated_commands)
            .field("allow_abbreviated_options", &self.allow_abbreviated_options)
            .finish_non_exhaustive()
    }
}

/// Consuming builder for [`ParserConfig`].
#[derive(Clone)]
pub struct ParserConfigBuilder {
    config: ParserConfig,
}

impl Default for ParserConfigBuilder {
    fn default() -> Self {
        Self {
            config: ParserConfig {
                aliases: Vec::new(),
                aliases_may_chain: false,
                aliases_override_builtins: false,
                force_builtin_prefix: DEFAULT_FORCE_BUILTIN_PREFIX,
                arguments_separator: Some(DEFAULT_ARGUMENTS_SEPARATOR.to_string()),
                allow_abbreviated_commands: false,
                allow_abbreviated_options: false,
                error_handler: Arc::new(FailFast),
            },
        }
    }
}

impl ParserConfigBuilder {
    /// Adds an alias.
    ///
    /// Names must be unique; a repeated name is reported by
    /// [`validate_global`](crate::validate_global) and
    /// [`validate_command`](crate::validate_command).
    pub fn alias(mut self, alias: AliasMetadata) -> Self {
        self.config.aliases.push(alias);
        self
    }

    /// Adds several aliases.
    pub fn aliases(self, aliases: impl IntoIterator<Item = AliasMetadata>) -> Self {
        aliases.into_iter().fold(self, Self::alias)
    }

    pub fn aliases_may_chain(mut self, enabled: bool) -> Self {
        self.config.aliases_may_chain = enabled;
        self
    }

    pub fn aliases_override_builtins(mut self, enabled: bool) -> Self {
        self.config.aliases_override_builtins = enabled;
        self
    }

    pub fn force_builtin_prefix(mut self, prefix: char) -> Self {
        self.config.force_builtin_prefix = prefix;
        self
    }

    /// Sets the arguments separator; `None` disables it.
    pub fn arguments_separator(mut self, separator: Option<&str>) -> Self {
        self.config.arguments_separator = separator.map(String::from);
        self
    }

    pub fn allow_abbreviated_commands(mut self, enabled: bool) -> Self {
        self.config.allow_abbreviated_commands = enabled;
        self
    }

    pub fn allow_abbreviated_options(mut self, enabled: bool) -> Self {
        self.config.allow_abbreviated_options = enabled;
        self
    }

    /// Replaces the error handler (default: [`FailFast`]).
    pub fn error_handler(mut self, handler: Arc<dyn ErrorHandler>) -> Self {
        self.config.error_handler = handler;
        self
    }

    pub fn build(self) -> ParserConfig {
        self.config
    }
}
