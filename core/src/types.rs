//! Metadata tree definitions.
//!
//! This module defines the immutable model the parser classifies tokens
//! against: a [`GlobalMetadata`] root owning groups, ungrouped commands and
//! global options; [`GroupMetadata`] nodes owning commands and nested groups;
//! and [`CommandMetadata`] leaves owning options and an optional
//! [`ArgumentsMetadata`] declaration.
//!
//! Trees are assembled with the `with_*` builder methods. Nothing in the
//! parser mutates a tree once built, so a tree can be shared freely between
//! threads.

use std::sync::Arc;

use crate::config::ParserConfig;
use crate::restriction::{ArgumentsRestriction, GlobalRestriction, OptionRestriction};
use crate::template::AliasTemplate;

/// An option (flag) declaration.
///
/// An option is known by one or more names; the first is its canonical name.
/// `arity` is the number of value tokens consumed per occurrence: `0` for a
/// presence flag, `1` for `--output out.txt`, and so on.
///
/// # Examples
///
/// ```
/// use cmdtree_core::OptionMetadata;
///
/// let verbose = OptionMetadata::flag(&["-v", "--verbose"]);
/// assert_eq!(verbose.canonical_name(), "-v");
/// assert_eq!(verbose.title, "verbose");
/// assert!(!verbose.takes_value());
///
/// let output = OptionMetadata::with_value(&["-o", "--output"]).required();
/// assert!(output.takes_value());
/// assert!(output.matches("--output"));
/// ```
#[derive(Debug, Clone)]
pub struct OptionMetadata {
    /// Human-readable name used in error messages.
    pub title: String,
    /// All names the option answers to, canonical name first.
    pub names: Vec<String>,
    /// Description for help renderers.
    pub description: Option<String>,
    /// Whether the option must be supplied.
    pub required: bool,
    /// Value tokens consumed per occurrence.
    pub arity: usize,
    /// Post-parse restrictions, evaluated in order.
    pub restrictions: Vec<Arc<dyn OptionRestriction>>,
}

impl OptionMetadata {
    /// Creates a presence flag (arity 0).
    pub fn flag(names: &[&str]) -> Self {
        Self::with_arity(names, 0)
    }

    /// Creates an option taking a single value.
    pub fn with_value(names: &[&str]) -> Self {
        Self::with_arity(names, 1)
    }

    /// Creates an option consuming `arity` values per occurrence.
    pub fn with_arity(names: &[&str], arity: usize) -> Self {
        let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
        Self {
            title: default_title(&names),
            names,
            description: None,
            required: false,
            arity,
            restrictions: Vec::new(),
        }
    }

    /// Overrides the title derived from the option names.
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Marks the option as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attaches a restriction.
    pub fn with_restriction(mut self, restriction: impl OptionRestriction + 'static) -> Self {
        self.restrictions.push(Arc::new(restriction));
        self
    }

    /// Attaches an already shared restriction.
    pub fn with_shared_restriction(mut self, restriction: Arc<dyn OptionRestriction>) -> Self {
        self.restrictions.push(restriction);
        self
    }

    /// Returns the canonical (first declared) name.
    pub fn canonical_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("unknown")
    }

    /// Whether the option consumes value tokens.
    pub fn takes_value(&self) -> bool {
        self.arity > 0
    }

    /// Checks if `name` is one of the option's names.
    pub fn matches(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Title derived from the longest-form name without its dashes.
fn default_title(names: &[String]) -> String {
    names
        .iter()
        .find(|n| n.starts_with("--"))
        .or_else(|| names.first())
        .map(|n| n.trim_start_matches('-').to_string())
        .unwrap_or_default()
}

/// Positional arguments declaration for a command.
///
/// # Examples
///
/// ```
/// use cmdtree_core::ArgumentsMetadata;
///
/// let files = ArgumentsMetadata::new("files").required();
/// assert!(files.required);
/// assert_eq!(files.title, "files");
/// ```
#[derive(Debug, Clone)]
pub struct ArgumentsMetadata {
    /// Name used in error messages and help.
    pub title: String,
    /// Description for help renderers.
    pub description: Option<String>,
    /// Whether at least one argument must be supplied.
    pub required: bool,
    /// Post-parse restrictions, evaluated in order.
    pub restrictions: Vec<Arc<dyn ArgumentsRestriction>>,
}

impl ArgumentsMetadata {
    /// Creates an optional arguments declaration.
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            required: false,
            restrictions: Vec::new(),
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Marks the arguments as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attaches a restriction.
    pub fn with_restriction(mut self, restriction: impl ArgumentsRestriction + 'static) -> Self {
        self.restrictions.push(Arc::new(restriction));
        self
    }

    /// Attaches an already shared restriction.
    pub fn with_shared_restriction(mut self, restriction: Arc<dyn ArgumentsRestriction>) -> Self {
        self.restrictions.push(restriction);
        self
    }
}

/// A command: the leaf a parse resolves to.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{ArgumentsMetadata, CommandMetadata, OptionMetadata};
///
/// let list = CommandMetadata::new("list")
///     .with_option(OptionMetadata::with_value(&["--format"]))
///     .with_arguments(ArgumentsMetadata::new("paths"));
///
/// assert!(list.find_option("--format").is_some());
/// assert!(list.arguments.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandMetadata {
    /// Command name as typed by the user.
    pub name: String,
    /// Description for help renderers.
    pub description: Option<String>,
    /// Command-specific options.
    pub options: Vec<OptionMetadata>,
    /// Positional arguments, if the command accepts any.
    pub arguments: Option<ArgumentsMetadata>,
}

impl CommandMetadata {
    /// Creates a command with no options or arguments.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Adds an option.
    pub fn with_option(mut self, option: OptionMetadata) -> Self {
        self.options.push(option);
        self
    }

    /// Declares the command's positional arguments.
    pub fn with_arguments(mut self, arguments: ArgumentsMetadata) -> Self {
        self.arguments = Some(arguments);
        self
    }

    /// Finds a command option by any of its names.
    pub fn find_option(&self, name: &str) -> Option<&OptionMetadata> {
        self.options.iter().find(|o| o.matches(name))
    }
}

/// A named group of commands, optionally nested.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{CommandMetadata, GroupMetadata};
///
/// let remote = GroupMetadata::new("remote")
///     .with_command(CommandMetadata::new("add"))
///     .with_command(CommandMetadata::new("show"))
///     .with_default_command("show");
///
/// assert_eq!(remote.default_command().unwrap().name, "show");
/// assert!(remote.find_command("add").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct GroupMetadata {
    /// Group name as typed by the user.
    pub name: String,
    /// Description for help renderers.
    pub description: Option<String>,
    /// Options reachable once this group is resolved.
    pub options: Vec<OptionMetadata>,
    /// Name of the command used when none is given after the group.
    pub default_command: Option<String>,
    /// Commands in this group.
    pub commands: Vec<CommandMetadata>,
    /// Nested groups.
    pub sub_groups: Vec<GroupMetadata>,
}

impl GroupMetadata {
    /// Creates an empty group.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Adds a group-level option.
    pub fn with_option(mut self, option: OptionMetadata) -> Self {
        self.options.push(option);
        self
    }

    /// Adds a command.
    pub fn with_command(mut self, command: CommandMetadata) -> Self {
        self.commands.push(command);
        self
    }

    /// Adds a nested group.
    pub fn with_sub_group(mut self, group: GroupMetadata) -> Self {
        self.sub_groups.push(group);
        self
    }

    /// Names the group's default command.
    pub fn with_default_command(mut self, name: &str) -> Self {
        self.default_command = Some(name.to_string());
        self
    }

    /// Finds a command in this group by exact name.
    pub fn find_command(&self, name: &str) -> Option<&CommandMetadata> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Finds a nested group by exact name.
    pub fn find_sub_group(&self, name: &str) -> Option<&GroupMetadata> {
        self.sub_groups.iter().find(|g| g.name == name)
    }

    /// Finds a command, optionally accepting a unique name prefix.
    pub fn match_command(&self, token: &str, abbreviated: bool) -> Option<&CommandMetadata> {
        match_named(&self.commands, token, abbreviated, |c| c.name.as_str())
    }

    /// Finds a nested group, optionally accepting a unique name prefix.
    pub fn match_sub_group(&self, token: &str, abbreviated: bool) -> Option<&GroupMetadata> {
        match_named(&self.sub_groups, token, abbreviated, |g| g.name.as_str())
    }

    /// Resolves the default command, if one is named and exists.
    pub fn default_command(&self) -> Option<&CommandMetadata> {
        self.default_command
            .as_deref()
            .and_then(|name| self.find_command(name))
    }
}

/// A named macro expanding to a template token sequence.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{AliasMetadata, AliasTemplate};
///
/// let ls = AliasMetadata::new("ls", &["list", "--format", "${1:-table}"]);
/// assert_eq!(ls.arguments.len(), 3);
/// assert!(matches!(ls.arguments[2], AliasTemplate::Positional { index: 0, .. }));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasMetadata {
    /// Alias name, matched exactly against the first token.
    pub name: String,
    /// Templates emitted in place of the alias.
    pub arguments: Vec<AliasTemplate>,
}

impl AliasMetadata {
    /// Creates an alias, parsing each argument template.
    pub fn new(name: &str, arguments: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            arguments: arguments.iter().map(|a| AliasTemplate::parse(a)).collect(),
        }
    }

    /// Creates an alias from owned template strings.
    pub fn from_strings(name: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.iter().map(|a| AliasTemplate::parse(a)).collect(),
        }
    }
}

/// Root of a multi-command metadata tree.
///
/// # Examples
///
/// ```
/// use cmdtree_core::*;
///
/// let global = GlobalMetadata::new("git")
///     .with_option(OptionMetadata::flag(&["-v", "--verbose"]))
///     .with_command(CommandMetadata::new("status"))
///     .with_group(GroupMetadata::new("remote").with_command(CommandMetadata::new("add")))
///     .with_default_command("status");
///
/// assert!(global.find_group("remote").is_some());
/// assert_eq!(global.default_command().unwrap().name, "status");
/// ```
#[derive(Debug, Clone, Default)]
pub struct GlobalMetadata {
    /// Program name.
    pub name: String,
    /// Description for help renderers.
    pub description: Option<String>,
    /// Options reachable in every scope.
    pub options: Vec<OptionMetadata>,
    /// Name of the ungrouped command used when no command is given.
    pub default_command: Option<String>,
    /// Commands outside any group.
    pub default_group_commands: Vec<CommandMetadata>,
    /// Top-level groups.
    pub groups: Vec<GroupMetadata>,
    /// Restrictions evaluated against the whole parse state.
    pub restrictions: Vec<Arc<dyn GlobalRestriction>>,
    /// Parser configuration shared by every parse of this tree.
    pub parser: ParserConfig,
}

impl GlobalMetadata {
    /// Creates an empty tree with the default parser configuration.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Adds a global option.
    pub fn with_option(mut self, option: OptionMetadata) -> Self {
        self.options.push(option);
        self
    }

    /// Adds an ungrouped command.
    pub fn with_command(mut self, command: CommandMetadata) -> Self {
        self.default_group_commands.push(command);
        self
    }

    /// Adds a top-level group.
    pub fn with_group(mut self, group: GroupMetadata) -> Self {
        self.groups.push(group);
        self
    }

    /// Names the default ungrouped command.
    pub fn with_default_command(mut self, name: &str) -> Self {
        self.default_command = Some(name.to_string());
        self
    }

    /// Attaches a global restriction.
    pub fn with_restriction(mut self, restriction: impl GlobalRestriction + 'static) -> Self {
        self.restrictions.push(Arc::new(restriction));
        self
    }

    /// Attaches an already shared global restriction.
    pub fn with_shared_restriction(mut self, restriction: Arc<dyn GlobalRestriction>) -> Self {
        self.restrictions.push(restriction);
        self
    }

    /// Replaces the parser configuration.
    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    /// Finds a top-level group by exact name.
    pub fn find_group(&self, name: &str) -> Option<&GroupMetadata> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Finds an ungrouped command by exact name.
    pub fn find_command(&self, name: &str) -> Option<&CommandMetadata> {
        self.default_group_commands.iter().find(|c| c.name == name)
    }

    /// Finds a top-level group, optionally accepting a unique name prefix.
    pub fn match_group(&self, token: &str, abbreviated: bool) -> Option<&GroupMetadata> {
        match_named(&self.groups, token, abbreviated, |g| g.name.as_str())
    }

    /// Finds an ungrouped command, optionally accepting a unique name prefix.
    pub fn match_command(&self, token: &str, abbreviated: bool) -> Option<&CommandMetadata> {
        match_named(&self.default_group_commands, token, abbreviated, |c| c.name.as_str())
    }

    /// Resolves the default ungrouped command, if one is named and exists.
    pub fn default_command(&self) -> Option<&CommandMetadata> {
        self.default_command
            .as_deref()
            .and_then(|name| self.find_command(name))
    }

    /// Whether `name` is a builtin: a top-level group or an ungrouped command.
    pub fn is_builtin(&self, name: &str) -> bool {
        self.find_group(name).is_some() || self.find_command(name).is_some()
    }
}

/// Exact match first; with `abbreviated`, a prefix matching exactly one item.
fn match_named<'a, T>(
    items: &'a [T],
    token: &str,
    abbreviated: bool,
    name: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    if let Some(found) = items.iter().find(|item| name(item) == token) {
        return Some(found);
    }
    if !abbreviated || token.is_empty() {
        return None;
    }
    let mut candidates = items.iter().filter(|item| name(item).starts_with(token));
    let first = candidates.next()?;
    candidates.next().is_none().then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GlobalMetadata {
        GlobalMetadata::new("tool")
            .with_command(CommandMetadata::new("list"))
            .with_command(CommandMetadata::new("login"))
            .with_command(CommandMetadata::new("status"))
            .with_group(
                GroupMetadata::new("remote")
                    .with_command(CommandMetadata::new("add"))
                    .with_sub_group(GroupMetadata::new("branch")),
            )
    }

    #[test]
    fn test_option_title_prefers_long_name() {
        let option = OptionMetadata::with_value(&["-o", "--output"]);
        assert_eq!(option.title, "output");
        assert_eq!(option.canonical_name(), "-o");

        let short_only = OptionMetadata::flag(&["-q"]);
        assert_eq!(short_only.title, "q");
    }

    #[test]
    fn test_option_arity() {
        assert_eq!(OptionMetadata::flag(&["-v"]).arity, 0);
        assert_eq!(OptionMetadata::with_value(&["-o"]).arity, 1);
        assert_eq!(OptionMetadata::with_arity(&["--point"], 2).arity, 2);
    }

    #[test]
    fn test_exact_lookup() {
        let global = sample();
        assert!(global.find_group("remote").is_some());
        assert!(global.find_command("list").is_some());
        assert!(global.find_command("add").is_none());
        assert!(global.is_builtin("status"));
        assert!(!global.is_builtin("rem"));
    }

    #[test]
    fn test_abbreviated_lookup_requires_unique_prefix() {
        let global = sample();
        assert_eq!(global.match_command("st", true).unwrap().name, "status");
        // "l" is shared by list and login.
        assert!(global.match_command("l", true).is_none());
        assert!(global.match_command("st", false).is_none());
        assert_eq!(global.match_group("rem", true).unwrap().name, "remote");
    }

    #[test]
    fn test_exact_match_wins_over_prefix() {
        let global = GlobalMetadata::new("tool")
            .with_command(CommandMetadata::new("log"))
            .with_command(CommandMetadata::new("login"));
        assert_eq!(global.match_command("log", true).unwrap().name, "log");
    }

    #[test]
    fn test_default_command_must_exist() {
        let global = sample().with_default_command("missing");
        assert!(global.default_command().is_none());
    }
}
