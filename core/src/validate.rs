//! Metadata tree validation.
//!
//! Catches structural errors in a tree before it is used for parsing: empty
//! names, malformed or duplicate option names, duplicate groups and commands,
//! default commands that do not exist, and unusable aliases.
//!
//! Validation is fail-fast: the first problem found is reported.
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::*;
//!
//! let global = GlobalMetadata::new("git")
//!     .with_option(OptionMetadata::flag(&["-v", "--verbose"]))
//!     .with_command(CommandMetadata::new("status"));
//! assert!(validate_global(&global).is_empty());
//!
//! // Invalid: option name missing its leading dash
//! let bad = GlobalMetadata::new("git").with_option(OptionMetadata::flag(&["verbose"]));
//! assert!(!validate_global(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{CommandMetadata, GlobalMetadata, GroupMetadata, OptionMetadata, ParserConfig};

/// Metadata validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Program name is empty or whitespace-only.
    #[error("program name cannot be empty")]
    EmptyProgramName,
    /// A command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// A group name is empty or whitespace-only.
    #[error("group name cannot be empty")]
    EmptyGroupName,
    /// An option declares no names.
    #[error("option must declare at least one name")]
    MissingOptionName,
    /// Option name does not start with a dash or contains whitespace.
    #[error("invalid option name format: {0}")]
    InvalidOptionName(String),
    /// Two options reachable from the same command share a name.
    #[error("duplicate option in scope: {0}")]
    DuplicateOption(String),
    /// Two commands in the same scope share a name.
    #[error("duplicate command in scope: {0}")]
    DuplicateCommand(String),
    /// Two groups in the same scope share a name.
    #[error("duplicate group in scope: {0}")]
    DuplicateGroup(String),
    /// A default command names no command of its scope.
    #[error("default command '{command}' not found in {scope}")]
    UnknownDefaultCommand { scope: String, command: String },
    /// An alias has an empty name.
    #[error("alias name cannot be empty")]
    EmptyAliasName,
    /// Two aliases share a name.
    #[error("duplicate alias: {0}")]
    DuplicateAlias(String),
    /// An alias name starts with the force-builtin prefix and can never match.
    #[error("alias '{0}' starts with the force-builtin prefix")]
    AliasUsesForcePrefix(String),
}

/// Validates a multi-command tree and its parser configuration.
pub fn validate_global(global: &GlobalMetadata) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if global.name.trim().is_empty() {
        errors.push(ValidationError::EmptyProgramName);
        return errors;
    }

    errors.extend(validate_aliases(&global.parser));
    if !errors.is_empty() {
        return errors;
    }

    let mut scope: Vec<&OptionMetadata> = Vec::new();
    errors.extend(validate_options(&global.options, &mut scope));
    if !errors.is_empty() {
        return errors;
    }

    errors.extend(validate_commands(
        &global.default_group_commands,
        global.default_command.as_deref(),
        &global.name,
        &scope,
    ));
    if !errors.is_empty() {
        return errors;
    }

    errors.extend(validate_groups(&global.groups, &scope));
    errors
}

/// Validates a standalone command and the configuration it is parsed with.
///
/// # Examples
///
/// ```
/// use cmdtree_core::*;
///
/// let command = CommandMetadata::new("serve")
///     .with_option(OptionMetadata::with_value(&["-p", "--port"]))
///     .with_option(OptionMetadata::flag(&["-p"]));
/// let errors = validate_command(&ParserConfig::default(), &command);
/// assert_eq!(errors, vec![ValidationError::DuplicateOption("-p".to_string())]);
/// ```
pub fn validate_command(config: &ParserConfig, command: &CommandMetadata) -> Vec<ValidationError> {
    let mut errors = validate_aliases(config);
    if !errors.is_empty() {
        return errors;
    }
    errors.extend(validate_commands(
        std::slice::from_ref(command),
        None,
        &command.name,
        &[],
    ));
    errors
}

fn validate_aliases(config: &ParserConfig) -> Vec<ValidationError> {
    let prefix = config.force_builtin_prefix();
    let mut seen: HashSet<&str> = HashSet::new();
    for alias in config.aliases() {
        if alias.name.trim().is_empty() {
            return vec![ValidationError::EmptyAliasName];
        }
        if !seen.insert(alias.name.as_str()) {
            return vec![ValidationError::DuplicateAlias(alias.name.clone())];
        }
        if alias.name.starts_with(prefix) {
            return vec![ValidationError::AliasUsesForcePrefix(alias.name.clone())];
        }
    }
    Vec::new()
}

fn validate_groups(groups: &[GroupMetadata], parent: &[&OptionMetadata]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for group in groups {
        let name = group.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyGroupName);
            return errors;
        }
        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateGroup(name.to_string()));
            return errors;
        }

        let mut scope = parent.to_vec();
        errors.extend(validate_options(&group.options, &mut scope));
        if !errors.is_empty() {
            return errors;
        }

        errors.extend(validate_commands(
            &group.commands,
            group.default_command.as_deref(),
            name,
            &scope,
        ));
        if !errors.is_empty() {
            return errors;
        }

        errors.extend(validate_groups(&group.sub_groups, &scope));
        if !errors.is_empty() {
            return errors;
        }
    }

    errors
}

fn validate_commands(
    commands: &[CommandMetadata],
    default_command: Option<&str>,
    scope_name: &str,
    parent: &[&OptionMetadata],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for command in commands {
        let name = command.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyCommandName);
            return errors;
        }
        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateCommand(name.to_string()));
            return errors;
        }

        let mut scope = parent.to_vec();
        errors.extend(validate_options(&command.options, &mut scope));
        if !errors.is_empty() {
            return errors;
        }
    }

    if let Some(default) = default_command {
        if !commands.iter().any(|c| c.name == default) {
            errors.push(ValidationError::UnknownDefaultCommand {
                scope: scope_name.to_string(),
                command: default.to_string(),
            });
        }
    }

    errors
}

/// Checks `options` and appends them to `scope`, rejecting names already
/// present there.
fn validate_options<'a>(
    options: &'a [OptionMetadata],
    scope: &mut Vec<&'a OptionMetadata>,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for option in options {
        if option.names.is_empty() {
            errors.push(ValidationError::MissingOptionName);
            return errors;
        }
        for name in &option.names {
            if !name.starts_with('-') || name.len() < 2 || name.chars().any(char::is_whitespace) {
                errors.push(ValidationError::InvalidOptionName(name.clone()));
                return errors;
            }
            let taken = scope.iter().any(|o| o.matches(name))
                || option.names.iter().filter(|n| *n == name).count() > 1;
            if taken {
                errors.push(ValidationError::DuplicateOption(name.clone()));
                return errors;
            }
        }
        scope.push(option);
    }

    errors
}
