//! Scoped token classification.
//!
//! [`StateMachine`] feeds tokens into a [`ParseState`] one at a time. Each
//! token is tried, in order, as:
//!
//! 1. a value owed to the previous option;
//! 2. an argument, once the arguments separator has been seen;
//! 3. the arguments separator itself (only once a command is resolved);
//! 4. an option reachable from the current scope;
//! 5. a group or command name, while no command is resolved;
//! 6. a positional argument of the resolved command.
//!
//! Anything left over is recorded as unparsed input for the validator to
//! report. When step 5 fails the scope's default command is selected, if
//! there is one, and the token is classified again against it.

use cmdtree_core::{CommandMetadata, Location, OptionMetadata, ParseState};
use tracing::{debug, trace};

/// Drives a [`ParseState`] through a token sequence.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{CommandMetadata, GlobalMetadata, OptionMetadata, ParseState};
/// use cmdtree_parser::StateMachine;
///
/// let global = GlobalMetadata::new("tool")
///     .with_option(OptionMetadata::flag(&["-v"]))
///     .with_command(CommandMetadata::new("build"));
///
/// let state = StateMachine::new(ParseState::for_global(&global))
///     .run(["-v", "build"].map(String::from));
/// assert_eq!(state.command().unwrap().name, "build");
/// assert_eq!(state.parsed_options().len(), 1);
/// ```
#[derive(Debug)]
pub struct StateMachine<'m> {
    state: ParseState<'m>,
}

impl<'m> StateMachine<'m> {
    pub fn new(state: ParseState<'m>) -> Self {
        Self { state }
    }

    /// Classifies every token, then applies the default command if none was
    /// resolved.
    pub fn run(mut self, tokens: impl IntoIterator<Item = String>) -> ParseState<'m> {
        for token in tokens {
            self.feed(token);
        }
        self.finish()
    }

    /// Classifies a single token.
    pub fn feed(&mut self, token: String) {
        trace!(token = %token, location = ?self.state.location(), "Classifying token");

        if self.state.location() == Location::ExpectingOptionValue {
            self.state.push_option_value(token);
            return;
        }

        if self.state.separator_seen() {
            self.push_positional(token);
            return;
        }

        if self.state.command().is_some()
            && self.state.config().arguments_separator() == Some(token.as_str())
        {
            trace!("Arguments separator");
            self.state.enter_separator_mode();
            return;
        }

        if self.try_option(&token) {
            return;
        }

        if self.state.command().is_none() && self.state.unparsed_input().is_empty() {
            if self.try_scope(&token) {
                return;
            }
            if let Some(default) = self.default_command() {
                debug!(
                    command = %default.name,
                    token = %token,
                    "Falling through to default command"
                );
                self.state.use_default_command(default);
                self.feed(token);
                return;
            }
        }

        self.push_positional(token);
    }

    /// Resolves the default command when the input named none.
    pub fn finish(mut self) -> ParseState<'m> {
        if self.state.command().is_none() {
            if let Some(default) = self.default_command() {
                debug!(command = %default.name, "Using default command");
                self.state.use_default_command(default);
            }
        }
        self.state
    }

    /// The innermost resolved group's default, or the global default when no
    /// group is resolved.
    fn default_command(&self) -> Option<&'m CommandMetadata> {
        match self.state.group() {
            Some(group) => group.default_command(),
            None => self.state.global().and_then(|g| g.default_command()),
        }
    }

    fn try_scope(&mut self, token: &str) -> bool {
        let abbreviated = self.state.config().allow_abbreviated_commands();

        if let Some(group) = self.state.group() {
            if let Some(sub_group) = group.match_sub_group(token, abbreviated) {
                debug!(group = %sub_group.name, "Resolved group");
                self.state.push_group(sub_group);
                return true;
            }
            if let Some(command) = group.match_command(token, abbreviated) {
                debug!(group = %group.name, command = %command.name, "Resolved command");
                self.state.resolve_command(command);
                return true;
            }
            return false;
        }

        let Some(global) = self.state.global() else {
            return false;
        };
        if let Some(group) = global.match_group(token, abbreviated) {
            debug!(group = %group.name, "Resolved group");
            self.state.push_group(group);
            return true;
        }
        if let Some(command) = global.match_command(token, abbreviated) {
            debug!(command = %command.name, "Resolved command");
            self.state.resolve_command(command);
            return true;
        }
        false
    }

    fn push_positional(&mut self, token: String) {
        let accepts_arguments = self
            .state
            .command()
            .is_some_and(|c| c.arguments.is_some());
        if accepts_arguments {
            self.state.push_argument(token);
        } else {
            debug!(token = %token, "Unrecognized token");
            self.state.push_unparsed(token);
        }
    }

    fn try_option(&mut self, token: &str) -> bool {
        if !token.starts_with('-') || token.len() < 2 {
            return false;
        }
        let options = self.state.reachable_options();
        let abbreviated = self.state.config().allow_abbreviated_options();

        if let Some(option) = lookup(&options, token, abbreviated) {
            trace!(option = option.canonical_name(), "Matched option");
            self.state.begin_option(option);
            return true;
        }

        if let Some((name, value)) = token.split_once('=') {
            if let Some(option) = lookup(&options, name, abbreviated).filter(|o| o.takes_value()) {
                trace!(option = option.canonical_name(), "Matched option with inline value");
                self.state.begin_option(option);
                self.state.push_option_value(value.to_string());
                return true;
            }
        }

        if token.starts_with("--") {
            return false;
        }
        self.try_short_forms(&options, &token[1..])
    }

    /// `-oVALUE` or a cluster of short flags such as `-abc`.
    fn try_short_forms(&mut self, options: &[&'m OptionMetadata], letters: &str) -> bool {
        let mut chars = letters.char_indices();
        let Some((_, first)) = chars.next() else {
            return false;
        };
        let Some((rest_start, _)) = chars.next() else {
            return false;
        };

        if let Some(option) = exact(options, &format!("-{first}")).filter(|o| o.takes_value()) {
            trace!(option = option.canonical_name(), "Matched short option with attached value");
            self.state.begin_option(option);
            self.state.push_option_value(letters[rest_start..].to_string());
            return true;
        }

        let count = letters.chars().count();
        let mut cluster = Vec::with_capacity(count);
        for (position, letter) in letters.chars().enumerate() {
            let Some(option) = exact(options, &format!("-{letter}")) else {
                return false;
            };
            if option.takes_value() && position + 1 != count {
                return false;
            }
            cluster.push(option);
        }

        trace!(cluster = letters, "Matched short option cluster");
        for option in cluster {
            self.state.begin_option(option);
        }
        true
    }
}

fn exact<'m>(options: &[&'m OptionMetadata], name: &str) -> Option<&'m OptionMetadata> {
    options.iter().copied().find(|o| o.matches(name))
}

/// Exact name, or with `abbreviated` a prefix of exactly one option's long
/// name.
fn lookup<'m>(
    options: &[&'m OptionMetadata],
    name: &str,
    abbreviated: bool,
) -> Option<&'m OptionMetadata> {
    if let Some(option) = exact(options, name) {
        return Some(option);
    }
    if !abbreviated || !name.starts_with("--") || name.len() < 3 {
        return None;
    }
    let mut candidates = options.iter().copied().filter(|o| {
        o.names
            .iter()
            .any(|n| n.starts_with("--") && n.starts_with(name))
    });
    let first = candidates.next()?;
    candidates.next().is_none().then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdtree_core::{ArgumentsMetadata, GlobalMetadata, GroupMetadata, ParserConfig};

    fn tree() -> GlobalMetadata {
        GlobalMetadata::new("tool")
            .with_option(OptionMetadata::flag(&["-v", "--verbose"]))
            .with_command(
                CommandMetadata::new("build")
                    .with_option(OptionMetadata::flag(&["-r", "--release"]))
                    .with_option(OptionMetadata::with_value(&["-j", "--jobs"]))
                    .with_option(OptionMetadata::with_value(&["--target"]))
                    .with_option(OptionMetadata::with_value(&["--target-dir"]))
                    .with_arguments(ArgumentsMetadata::new("packages")),
            )
            .with_command(CommandMetadata::new("clean"))
            .with_group(
                GroupMetadata::new("remote")
                    .with_option(OptionMetadata::flag(&["-n", "--dry-run"]))
                    .with_command(
                        CommandMetadata::new("add")
                            .with_arguments(ArgumentsMetadata::new("name")),
                    )
                    .with_command(CommandMetadata::new("show"))
                    .with_sub_group(
                        GroupMetadata::new("branch").with_command(CommandMetadata::new("set")),
                    )
                    .with_default_command("show"),
            )
    }

    fn run<'m>(global: &'m GlobalMetadata, tokens: &[&str]) -> ParseState<'m> {
        StateMachine::new(ParseState::for_global(global))
            .run(tokens.iter().map(|t| t.to_string()))
    }

    fn values<'m>(state: &ParseState<'m>, name: &str) -> Vec<String> {
        state
            .parsed_options()
            .iter()
            .find(|p| p.option.matches(name))
            .map(|p| p.values.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_global_option_then_command() {
        let global = tree();
        let state = run(&global, &["-v", "build", "--jobs", "4", "core"]);
        assert_eq!(state.command().unwrap().name, "build");
        assert_eq!(values(&state, "-j"), vec!["4"]);
        assert_eq!(state.parsed_arguments(), ["core"]);
        assert!(state.unparsed_input().is_empty());
        assert_eq!(state.location(), Location::Args);
    }

    #[test]
    fn test_nested_groups() {
        let global = tree();
        let state = run(&global, &["remote", "-n", "branch", "set"]);
        let groups: Vec<&str> = state.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(groups, vec!["remote", "branch"]);
        assert_eq!(state.command().unwrap().name, "set");
        assert_eq!(state.parsed_options().len(), 1);
    }

    #[test]
    fn test_command_options_unreachable_before_command() {
        let global = tree();
        let state = run(&global, &["--release", "build"]);
        assert!(state.command().is_none());
        assert_eq!(state.unparsed_input(), ["--release", "build"]);
    }

    #[test]
    fn test_inline_and_attached_values() {
        let global = tree();
        let state = run(&global, &["build", "--jobs=8", "-j9", "--target=x86"]);
        assert_eq!(values(&state, "--jobs"), vec!["8", "9"]);
        assert_eq!(values(&state, "--target"), vec!["x86"]);
    }

    #[test]
    fn test_short_cluster() {
        let global = tree();
        let state = run(&global, &["build", "-vrj", "2"]);
        assert_eq!(state.parsed_options().len(), 3);
        assert_eq!(values(&state, "-j"), vec!["2"]);

        // A leading value-taking option reads the rest as its value.
        let state = run(&global, &["build", "-jr"]);
        assert_eq!(values(&state, "-j"), vec!["r"]);
        // Anywhere else it must be last in the cluster.
        let state = run(&global, &["build", "-rjv"]);
        assert!(state.parsed_options().is_empty());
        assert_eq!(state.parsed_arguments(), ["-rjv"]);
    }

    #[test]
    fn test_unknown_short_cluster_is_positional() {
        let global = tree();
        let state = run(&global, &["build", "-xyz"]);
        assert!(state.parsed_options().is_empty());
        assert_eq!(state.parsed_arguments(), ["-xyz"]);
    }

    #[test]
    fn test_separator_switches_to_arguments() {
        let global = tree();
        let state = run(&global, &["build", "--", "--release", "-v"]);
        assert!(state.separator_seen());
        assert!(state.parsed_options().is_empty());
        assert_eq!(state.parsed_arguments(), ["--release", "-v"]);
    }

    #[test]
    fn test_positional_without_arguments_declaration_is_unparsed() {
        let global = tree();
        let state = run(&global, &["clean", "target"]);
        assert_eq!(state.unparsed_input(), ["target"]);
        assert!(state.parsed_arguments().is_empty());
    }

    #[test]
    fn test_unparsed_blocks_later_resolution() {
        let global = tree();
        let state = run(&global, &["bogus", "build"]);
        assert!(state.command().is_none());
        assert_eq!(state.unparsed_input(), ["bogus", "build"]);
    }

    #[test]
    fn test_group_default_fall_through() {
        let global = tree();
        let state = run(&global, &["remote", "origin"]);
        assert_eq!(state.command().unwrap().name, "show");
        assert!(state.default_command_used());
        // show declares no arguments
        assert_eq!(state.unparsed_input(), ["origin"]);

        let state = run(&global, &["remote"]);
        assert_eq!(state.command().unwrap().name, "show");
        assert!(state.default_command_used());
    }

    #[test]
    fn test_global_default_reclassifies_token() {
        let global = tree().with_default_command("build");
        let state = run(&global, &["--release", "core"]);
        assert_eq!(state.command().unwrap().name, "build");
        assert!(state.default_command_used());
        assert_eq!(state.parsed_options().len(), 1);
        assert_eq!(state.parsed_arguments(), ["core"]);
    }

    #[test]
    fn test_abbreviations() {
        let parser = ParserConfig::builder()
            .allow_abbreviated_commands(true)
            .allow_abbreviated_options(true)
            .build();
        let global = tree().with_parser(parser);

        let state = run(&global, &["bu", "--rel", "--jo", "3"]);
        assert_eq!(state.command().unwrap().name, "build");
        assert_eq!(values(&state, "--jobs"), vec!["3"]);
        assert_eq!(state.parsed_options().len(), 2);

        // --targ is a prefix of both --target and --target-dir.
        let state = run(&global, &["build", "--targ", "x"]);
        assert_eq!(state.parsed_arguments(), ["--targ", "x"]);
        // An exact name wins over longer ones sharing its prefix.
        let state = run(&global, &["build", "--target", "x"]);
        assert_eq!(values(&state, "--target"), vec!["x"]);
    }

    #[test]
    fn test_pending_value_at_end() {
        let global = tree();
        let state = run(&global, &["build", "--jobs"]);
        assert_eq!(state.location(), Location::ExpectingOptionValue);
        assert_eq!(state.current_option().unwrap().title, "jobs");
    }

    #[test]
    fn test_single_command_state() {
        let config = ParserConfig::default();
        let command = CommandMetadata::new("grep")
            .with_option(OptionMetadata::flag(&["-i"]))
            .with_arguments(ArgumentsMetadata::new("pattern"));
        let state = StateMachine::new(ParseState::for_command(&config, &command))
            .run(["-i", "build", "src"].map(String::from));
        assert_eq!(state.parsed_arguments(), ["build", "src"]);
        assert!(state.global().is_none());
    }
}
