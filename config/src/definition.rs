//! Serializable command tree definitions.
//!
//! A definition file describes a whole program: global options, groups,
//! commands, restrictions and parser settings. Restrictions are written as
//! [`RestrictionDescriptor`]s and turned into live restrictions through a
//! [`RestrictionRegistry`] when the definition is converted to metadata.
//!
//! # Example YAML
//!
//! ```yaml
//! name: git
//! options:
//!   - names: ["-v", "--verbose"]
//! default_command: status
//! commands:
//!   - name: status
//! groups:
//!   - name: remote
//!     commands:
//!       - name: add
//!         options:
//!           - names: ["-t", "--track"]
//!             arity: 1
//!         arguments:
//!           title: name
//!           required: true
//! parser:
//!   aliases:
//!     - name: ra
//!       arguments: ["remote", "add", "$1"]
//! ```

use cmdtree_core::{
    AliasMetadata, ArgumentsMetadata, CommandMetadata, DEFAULT_ARGUMENTS_SEPARATOR,
    DEFAULT_FORCE_BUILTIN_PREFIX, GlobalMetadata, GroupMetadata, OptionMetadata, ParserConfig,
    RestrictionDescriptor, RestrictionRegistry,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// Root of a definition file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliDefinition {
    /// Program name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Options reachable from every command.
    #[serde(default)]
    pub options: Vec<OptionDefinition>,
    /// Command selected when no command is given at global scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_command: Option<String>,
    /// Commands outside any group.
    #[serde(default)]
    pub commands: Vec<CommandDefinition>,
    #[serde(default)]
    pub groups: Vec<GroupDefinition>,
    /// Global restrictions.
    #[serde(default)]
    pub restrictions: Vec<RestrictionDescriptor>,
    #[serde(default)]
    pub parser: ParserDefinition,
}

/// Parser settings and aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserDefinition {
    pub aliases: Vec<AliasDefinition>,
    pub aliases_may_chain: bool,
    pub aliases_override_builtins: bool,
    pub force_builtin_prefix: char,
    /// `null` disables the separator.
    pub arguments_separator: Option<String>,
    pub allow_abbreviated_commands: bool,
    pub allow_abbreviated_options: bool,
}

impl Default for ParserDefinition {
    fn default() -> Self {
        Self {
            aliases: Vec::new(),
            aliases_may_chain: false,
            aliases_override_builtins: false,
            force_builtin_prefix: DEFAULT_FORCE_BUILTIN_PREFIX,
            arguments_separator: Some(DEFAULT_ARGUMENTS_SEPARATOR.to_string()),
            allow_abbreviated_commands: false,
            allow_abbreviated_options: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDefinition {
    pub name: String,
    /// Replacement tokens; `$N` and `${N:-default}` refer to the tokens
    /// following the alias.
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl AliasDefinition {
    pub fn new(name: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionDefinition {
    /// Names the option answers to, canonical name first.
    pub names: Vec<String>,
    /// Defaults to the long name without dashes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Value tokens per occurrence; `0` makes the option a flag.
    #[serde(default)]
    pub arity: usize,
    #[serde(default)]
    pub restrictions: Vec<RestrictionDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentsDefinition {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub restrictions: Vec<RestrictionDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<ArgumentsDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_command: Option<String>,
    #[serde(default)]
    pub commands: Vec<CommandDefinition>,
    #[serde(default)]
    pub groups: Vec<GroupDefinition>,
}

impl CliDefinition {
    /// Adds aliases whose names are not already defined.
    ///
    /// Aliases declared in the definition always win over merged ones.
    pub fn merge_aliases(&mut self, aliases: impl IntoIterator<Item = AliasDefinition>) {
        for alias in aliases {
            if !self.parser.aliases.iter().any(|a| a.name == alias.name) {
                self.parser.aliases.push(alias);
            }
        }
    }

    /// Converts the definition into a metadata tree.
    ///
    /// Restriction kinds the registry does not recognise are logged and
    /// skipped. A recognised kind with unusable parameters is an error.
    pub fn to_metadata(&self, registry: &RestrictionRegistry) -> Result<GlobalMetadata> {
        let mut global = GlobalMetadata::new(&self.name).with_parser(self.parser.to_config());
        global.description = self.description.clone();
        global.default_command = self.default_command.clone();

        for option in &self.options {
            global = global.with_option(option.to_metadata(registry)?);
        }
        for command in &self.commands {
            global = global.with_command(command.to_metadata(registry)?);
        }
        for group in &self.groups {
            global = global.with_group(group.to_metadata(registry)?);
        }
        for descriptor in &self.restrictions {
            let built = registry
                .global_restriction(descriptor)
                .map_err(|source| ConfigError::Restriction {
                    scope: format!("program '{}'", self.name),
                    source,
                })?;
            match built {
                Some(restriction) => global = global.with_shared_restriction(restriction),
                None => skip(descriptor, &self.name),
            }
        }
        Ok(global)
    }
}

impl ParserDefinition {
    pub fn to_config(&self) -> ParserConfig {
        ParserConfig::builder()
            .aliases(
                self.aliases
                    .iter()
                    .map(|a| AliasMetadata::from_strings(a.name.clone(), a.arguments.clone())),
            )
            .aliases_may_chain(self.aliases_may_chain)
            .aliases_override_builtins(self.aliases_override_builtins)
            .force_builtin_prefix(self.force_builtin_prefix)
            .arguments_separator(self.arguments_separator.as_deref())
            .allow_abbreviated_commands(self.allow_abbreviated_commands)
            .allow_abbreviated_options(self.allow_abbreviated_options)
            .build()
    }
}

impl OptionDefinition {
    pub fn to_metadata(&self, registry: &RestrictionRegistry) -> Result<OptionMetadata> {
        let names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        let mut option = OptionMetadata::with_arity(&names, self.arity);
        if let Some(title) = &self.title {
            option = option.with_title(title);
        }
        option.description = self.description.clone();
        option.required = self.required;

        for descriptor in &self.restrictions {
            let built = registry
                .option_restriction(descriptor)
                .map_err(|source| ConfigError::Restriction {
                    scope: format!("option '{}'", option.canonical_name()),
                    source,
                })?;
            match built {
                Some(restriction) => option = option.with_shared_restriction(restriction),
                None => skip(descriptor, option.canonical_name()),
            }
        }
        Ok(option)
    }
}

impl ArgumentsDefinition {
    pub fn to_metadata(&self, registry: &RestrictionRegistry) -> Result<ArgumentsMetadata> {
        let mut arguments = ArgumentsMetadata::new(&self.title);
        arguments.description = self.description.clone();
        arguments.required = self.required;

        for descriptor in &self.restrictions {
            let built = registry
                .arguments_restriction(descriptor)
                .map_err(|source| ConfigError::Restriction {
                    scope: format!("arguments '{}'", self.title),
                    source,
                })?;
            match built {
                Some(restriction) => arguments = arguments.with_shared_restriction(restriction),
                None => skip(descriptor, &self.title),
            }
        }
        Ok(arguments)
    }
}

impl CommandDefinition {
    pub fn to_metadata(&self, registry: &RestrictionRegistry) -> Result<CommandMetadata> {
        let mut command = CommandMetadata::new(&self.name);
        command.description = self.description.clone();
        for option in &self.options {
            command = command.with_option(option.to_metadata(registry)?);
        }
        if let Some(arguments) = &self.arguments {
            command = command.with_arguments(arguments.to_metadata(registry)?);
        }
        Ok(command)
    }
}

impl GroupDefinition {
    pub fn to_metadata(&self, registry: &RestrictionRegistry) -> Result<GroupMetadata> {
        let mut group = GroupMetadata::new(&self.name);
        group.description = self.description.clone();
        group.default_command = self.default_command.clone();
        for option in &self.options {
            group = group.with_option(option.to_metadata(registry)?);
        }
        for command in &self.commands {
            group = group.with_command(command.to_metadata(registry)?);
        }
        for sub_group in &self.groups {
            group = group.with_sub_group(sub_group.to_metadata(registry)?);
        }
        Ok(group)
    }
}

fn skip(descriptor: &RestrictionDescriptor, owner: &str) {
    warn!(kind = %descriptor.kind, owner = %owner, "Skipping unrecognized restriction");
}
