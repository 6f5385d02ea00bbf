//! Token-level parsing for declarative command trees.
//!
//! Turns a raw token sequence into a validated [`Invocation`] bound against a
//! [`cmdtree_core`] metadata tree:
//!
//! 1. [`resolve_aliases`] expands alias macros at the front of the input.
//! 2. [`StateMachine`] classifies each token against the options, groups and
//!    commands reachable from the current scope.
//! 3. [`validate`] checks structural completeness and runs restrictions.
//! 4. The resulting [`Invocation`] is returned, or handed to a
//!    [`CommandAssembler`].
//!
//! # Example
//!
//! ```
//! use cmdtree_core::*;
//! use cmdtree_parser::Cli;
//!
//! let cli = Cli::new(
//!     GlobalMetadata::new("git")
//!         .with_option(OptionMetadata::flag(&["-v", "--verbose"]))
//!         .with_group(
//!             GroupMetadata::new("remote").with_command(
//!                 CommandMetadata::new("add")
//!                     .with_arguments(ArgumentsMetadata::new("name").required()),
//!             ),
//!         )
//!         .with_parser(
//!             ParserConfig::builder()
//!                 .alias(AliasMetadata::new("ra", &["remote", "add"]))
//!                 .build(),
//!         ),
//! )
//! .unwrap();
//!
//! let invocation = cli.parse(["-v", "remote", "add", "origin"]).unwrap();
//! assert_eq!(invocation.command().name, "add");
//! assert!(invocation.is_present("--verbose"));
//!
//! assert_eq!(
//!     cli.parse(["ra"]).unwrap_err(),
//!     ParseError::ArgumentsMissing("name".to_string())
//! );
//! ```

mod alias;
mod cli;
mod invocation;
mod machine;
mod tokens;
mod validator;

pub use alias::resolve_aliases;
pub use cli::{Cli, SingleCommand, parse, parse_single, parse_single_with, parse_with};
pub use invocation::{CommandAssembler, Invocation, InvocationSummary, OptionSummary};
pub use machine::StateMachine;
pub use tokens::TokenStream;
pub use validator::validate;
