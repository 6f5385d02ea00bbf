use std::sync::Arc;

use cmdtree_core::{
    AliasMetadata, ArgumentsMetadata, CollectAll, CommandMetadata, Disposition, FailFast,
    GlobalMetadata, GroupMetadata, NoRepeatedOptionsRestriction, OptionMetadata, ParseError,
    ParserConfig, PathKind, PathRestriction, RestrictionViolation, TaggedRestriction,
};
use cmdtree_parser::{
    Cli, CommandAssembler, Invocation, SingleCommand, TokenStream, parse, parse_with,
    resolve_aliases,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tokens(items: &[&str]) -> TokenStream {
    items.iter().copied().collect()
}

fn git(parser: ParserConfig) -> GlobalMetadata {
    GlobalMetadata::new("git")
        .with_option(OptionMetadata::flag(&["-v", "--verbose"]))
        .with_command(
            CommandMetadata::new("list")
                .with_option(OptionMetadata::with_value(&["--format"]))
                .with_arguments(ArgumentsMetadata::new("paths")),
        )
        .with_command(
            CommandMetadata::new("clone")
                .with_option(OptionMetadata::with_value(&["--depth"]))
                .with_arguments(ArgumentsMetadata::new("repository").required()),
        )
        .with_group(
            GroupMetadata::new("remote")
                .with_command(
                    CommandMetadata::new("add").with_arguments(ArgumentsMetadata::new("name")),
                )
                .with_command(CommandMetadata::new("show"))
                .with_default_command("show"),
        )
        .with_parser(parser)
}

fn aliases(entries: &[(&str, &[&str])]) -> ParserConfig {
    ParserConfig::builder()
        .aliases(
            entries
                .iter()
                .map(|(name, arguments)| AliasMetadata::new(name, arguments)),
        )
        .aliases_may_chain(true)
        .build()
}

// ---------------------------------------------------------------------------
// Alias resolution
// ---------------------------------------------------------------------------

#[test]
fn test_alias_positional_default() {
    let config = aliases(&[("ls", &["list", "--format", "${1:-table}"])]);

    let out = resolve_aliases(&config, None, tokens(&["ls"]), &FailFast).unwrap();
    assert_eq!(out.remaining(), ["list", "--format", "table"]);

    let out = resolve_aliases(&config, None, tokens(&["ls", "json"]), &FailFast).unwrap();
    assert_eq!(out.remaining(), ["list", "--format", "json"]);
}

#[test]
fn test_circular_alias_terminates() {
    let config = aliases(&[("a", &["b"]), ("b", &["a"])]);
    let err = resolve_aliases(&config, None, tokens(&["a"]), &FailFast).unwrap_err();
    assert!(matches!(err, ParseError::AliasCircularReference { ref alias, .. } if alias == "a"));
}

#[test]
fn test_circular_alias_with_lenient_handler() {
    let config = aliases(&[("a", &["b"]), ("b", &["a"])]);
    let lenient = |_: &ParseError| Disposition::Continue;
    let out = resolve_aliases(&config, None, tokens(&["a"]), &lenient).unwrap();
    assert_eq!(out.remaining(), ["a"]);
}

#[test]
fn test_forced_builtin_bypasses_alias() {
    let config = aliases(&[("list", &["remote", "show"])]);
    let out = resolve_aliases(&config, None, tokens(&["!list"]), &FailFast).unwrap();
    assert_eq!(out.remaining(), ["list"]);
}

#[test]
fn test_alias_does_not_override_builtin() {
    let config = aliases(&[("list", &["remote", "show"]), ("remote", &["list"])]);
    let global = git(config.clone());

    let input = tokens(&["list", "src"]);
    let out = resolve_aliases(&config, Some(&global), input.clone(), &FailFast).unwrap();
    assert_eq!(out, input);

    let input = tokens(&["remote", "add"]);
    let out = resolve_aliases(&config, Some(&global), input.clone(), &FailFast).unwrap();
    assert_eq!(out, input);
}

#[test]
fn test_unmatched_leading_token_is_fixed_point() {
    let config = aliases(&[("ls", &["list"])]);
    let input = tokens(&["status", "ls", "x"]);
    let once = resolve_aliases(&config, None, input.clone(), &FailFast).unwrap();
    assert_eq!(once, input);
    let twice = resolve_aliases(&config, None, once, &FailFast).unwrap();
    assert_eq!(twice, input);
}

#[test]
fn test_positional_consumption_is_exclusive() {
    let config = aliases(&[("a", &["$1", "$1"])]);
    let out = resolve_aliases(&config, None, tokens(&["a", "x", "y"]), &FailFast).unwrap();
    assert_eq!(out.remaining(), ["x", "x", "y"]);
}

// ---------------------------------------------------------------------------
// Multi-command parsing
// ---------------------------------------------------------------------------

#[test]
fn test_empty_input_without_default_is_command_missing() {
    let global = git(ParserConfig::default());
    assert_eq!(
        parse(&global, Vec::<String>::new()).unwrap_err(),
        ParseError::CommandMissing
    );
}

#[test]
fn test_unknown_leading_token_is_unrecognized() {
    let global = git(ParserConfig::default());
    assert_eq!(
        parse(&global, ["frobnicate"]).unwrap_err(),
        ParseError::CommandUnrecognized(vec!["frobnicate".to_string()])
    );
}

#[test]
fn test_required_arguments_missing() {
    let global = git(ParserConfig::default());
    assert_eq!(
        parse(&global, ["clone", "--depth", "1"]).unwrap_err(),
        ParseError::ArgumentsMissing("repository".to_string())
    );
}

#[test]
fn test_alias_expansion_then_parse() {
    let global = git(aliases(&[("ls", &["list", "--format", "${1:-table}"])]));

    let invocation = parse(&global, ["ls"]).unwrap();
    assert_eq!(invocation.command().name, "list");
    assert_eq!(invocation.value("--format"), Some("table"));

    let invocation = parse(&global, ["ls", "json", "src"]).unwrap();
    assert_eq!(invocation.value("--format"), Some("json"));
    assert_eq!(invocation.arguments(), ["src"]);
}

#[test]
fn test_group_default_command() {
    let global = git(ParserConfig::default());
    let invocation = parse(&global, ["-v", "remote"]).unwrap();
    assert_eq!(invocation.group().unwrap().name, "remote");
    assert_eq!(invocation.command().name, "show");
    assert!(invocation.default_command_used());
}

#[test]
fn test_global_default_command() {
    let global = git(ParserConfig::default()).with_default_command("list");
    let invocation = parse(&global, ["--format", "json", "src"]).unwrap();
    assert_eq!(invocation.command().name, "list");
    assert!(invocation.default_command_used());
    assert_eq!(invocation.arguments(), ["src"]);

    let invocation = parse(&global, Vec::<String>::new()).unwrap();
    assert_eq!(invocation.command().name, "list");
}

#[test]
fn test_leftover_tokens_are_unexpected() {
    let global = git(ParserConfig::default());
    assert_eq!(
        parse(&global, ["remote", "show", "origin"]).unwrap_err(),
        ParseError::ArgumentsUnexpected(vec!["origin".to_string()])
    );
}

#[test]
fn test_option_missing_value() {
    let global = git(ParserConfig::default());
    assert_eq!(
        parse(&global, ["list", "--format"]).unwrap_err(),
        ParseError::OptionMissingValue("format".to_string())
    );
}

#[test]
fn test_required_option_reports_canonical_name() {
    let global = GlobalMetadata::new("tool").with_command(
        CommandMetadata::new("deploy")
            .with_option(OptionMetadata::with_value(&["-e", "--env"]).required()),
    );
    assert_eq!(
        parse(&global, ["deploy"]).unwrap_err(),
        ParseError::OptionMissing("-e".to_string())
    );
}

// ---------------------------------------------------------------------------
// Restrictions
// ---------------------------------------------------------------------------

#[test]
fn test_path_restriction_on_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let existing = dir.path().join("input.txt");
    std::fs::write(&existing, "data").unwrap();
    let missing = dir.path().join("missing.txt");

    let global = GlobalMetadata::new("tool").with_command(
        CommandMetadata::new("cat").with_arguments(
            ArgumentsMetadata::new("files")
                .required()
                .with_restriction(PathRestriction::new(PathKind::File).must_exist()),
        ),
    );

    assert!(parse(&global, ["cat", existing.to_str().unwrap()]).is_ok());
    assert!(matches!(
        parse(&global, ["cat", missing.to_str().unwrap()]).unwrap_err(),
        ParseError::Restriction(RestrictionViolation::PathMissing { .. })
    ));
    assert!(matches!(
        parse(&global, ["cat", dir.path().to_str().unwrap()]).unwrap_err(),
        ParseError::Restriction(RestrictionViolation::PathKindMismatch { .. })
    ));
}

#[test]
fn test_tagged_options_across_scopes() {
    let global = GlobalMetadata::new("tool")
        .with_option(
            OptionMetadata::flag(&["--json"])
                .with_restriction(TaggedRestriction::mutually_exclusive("format")),
        )
        .with_command(
            CommandMetadata::new("export").with_option(
                OptionMetadata::flag(&["--yaml"])
                    .with_restriction(TaggedRestriction::mutually_exclusive("format")),
            ),
        );

    assert!(parse(&global, ["--json", "export"]).is_ok());
    assert_eq!(
        parse(&global, ["--json", "export", "--yaml"]).unwrap_err(),
        ParseError::Restriction(RestrictionViolation::MutuallyExclusive {
            tag: "format".to_string(),
            options: vec!["--json".to_string(), "--yaml".to_string()],
        })
    );
}

#[test]
fn test_repeated_options_rejected() {
    let global = git(ParserConfig::default()).with_restriction(NoRepeatedOptionsRestriction::new());
    assert!(matches!(
        parse(&global, ["list", "--format", "a", "--format", "b"]).unwrap_err(),
        ParseError::Restriction(RestrictionViolation::RepeatedOption { count: 2, .. })
    ));
}

#[test]
fn test_validation_errors_reach_handler() {
    let handler = Arc::new(CollectAll::new());
    let global = git(ParserConfig::builder().error_handler(handler.clone()).build());
    assert!(parse(&global, ["frobnicate"]).is_err());
    assert_eq!(
        handler.take_errors(),
        vec![ParseError::CommandUnrecognized(vec!["frobnicate".to_string()])]
    );
}

// ---------------------------------------------------------------------------
// Orchestration
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
struct CloneCommand {
    repository: String,
    depth: Option<u32>,
}

struct CloneAssembler;

impl CommandAssembler for CloneAssembler {
    type Output = CloneCommand;

    fn assemble(&self, invocation: Invocation<'_>) -> Result<CloneCommand, ParseError> {
        Ok(CloneCommand {
            repository: invocation
                .arguments()
                .first()
                .cloned()
                .ok_or_else(|| ParseError::Assembly("repository missing".into()))?,
            depth: invocation.get("--depth")?,
        })
    }
}

#[test]
fn test_assembler_builds_command() {
    let global = git(ParserConfig::default());
    let clone =
        parse_with(&global, ["clone", "--depth", "1", "repo.git"], CloneAssembler).unwrap();
    assert_eq!(
        clone,
        CloneCommand {
            repository: "repo.git".into(),
            depth: Some(1),
        }
    );

    assert!(matches!(
        parse_with(&global, ["clone", "--depth", "deep", "repo.git"], CloneAssembler),
        Err(ParseError::Assembly(_))
    ));
}

#[test]
fn test_assembler_is_chosen_per_call() {
    let cli = Cli::new(git(ParserConfig::default())).unwrap();

    let clone = cli.parse_with(["clone", "repo.git"], CloneAssembler).unwrap();
    assert_eq!(clone.repository, "repo.git");

    let name = cli
        .parse_with(["clone", "repo.git"], |invocation: Invocation<'_>| {
            Ok::<_, ParseError>(invocation.command().name.clone())
        })
        .unwrap();
    assert_eq!(name, "clone");
}

#[test]
fn test_cli_is_shareable_across_threads() {
    let cli = Arc::new(Cli::new(git(aliases(&[("ls", &["list"])]))).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let cli = Arc::clone(&cli);
            std::thread::spawn(move || {
                let path = format!("src{i}");
                let invocation = cli.parse(["ls", path.as_str()]).unwrap();
                invocation.arguments().to_vec()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), vec![format!("src{i}")]);
    }
}

#[test]
fn test_single_command_entry_point() {
    let command = SingleCommand::new(
        ParserConfig::default(),
        CommandMetadata::new("grep")
            .with_option(OptionMetadata::flag(&["-i", "--ignore-case"]))
            .with_arguments(ArgumentsMetadata::new("pattern").required()),
    )
    .unwrap();

    let invocation = command.parse(["-i", "needle", "haystack.txt"]).unwrap();
    assert!(invocation.is_present("--ignore-case"));
    assert_eq!(invocation.arguments(), ["needle", "haystack.txt"]);

    assert_eq!(
        command.parse(["-i"]).unwrap_err(),
        ParseError::ArgumentsMissing("pattern".to_string())
    );
}
