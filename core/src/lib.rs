//! Metadata model and shared primitives for declarative command-line parsing.
//!
//! This crate defines everything a parse is run against and accumulates into:
//!
//! - [`GlobalMetadata`]: root of a multi-command tree holding global options,
//!   ungrouped commands, nested [`GroupMetadata`] and global restrictions.
//! - [`CommandMetadata`]: a command with its [`OptionMetadata`] and optional
//!   [`ArgumentsMetadata`].
//! - [`AliasMetadata`]: a named macro whose arguments are
//!   [`AliasTemplate`]s (`$1`, `${2:-default}` or literals).
//! - [`ParserConfig`]: alias table, abbreviation and separator settings and
//!   the [`ErrorHandler`] consulted when a parse fails.
//! - [`ParseState`]: the mutable accumulator a parse fills in.
//! - Restrictions ([`OptionRestriction`], [`ArgumentsRestriction`],
//!   [`GlobalRestriction`]) checked once a parse is structurally complete,
//!   and the factories ([`RestrictionRegistry`]) that build them from
//!   declarative descriptors.
//!
//! Validation ([`validate_global`], [`validate_command`]) catches structural
//! errors such as duplicate options and unknown default commands.
//!
//! # Example
//!
//! ```
//! use cmdtree_core::*;
//!
//! let global = GlobalMetadata::new("git")
//!     .with_option(OptionMetadata::flag(&["-v", "--verbose"]))
//!     .with_group(
//!         GroupMetadata::new("remote")
//!             .with_command(
//!                 CommandMetadata::new("add")
//!                     .with_option(OptionMetadata::with_value(&["-t", "--track"]))
//!                     .with_arguments(ArgumentsMetadata::new("name").required()),
//!             )
//!             .with_command(CommandMetadata::new("show"))
//!             .with_default_command("show"),
//!     )
//!     .with_parser(
//!         ParserConfig::builder()
//!             .alias(AliasMetadata::new("ra", &["remote", "add", "$1"]))
//!             .build(),
//!     );
//!
//! assert!(global.find_group("remote").unwrap().find_command("add").is_some());
//! assert!(global.parser.find_alias("ra").is_some());
//! assert!(validate_global(&global).is_empty());
//! ```

mod config;
mod error;
mod factory;
mod handler;
pub mod restriction;
mod state;
mod template;
mod types;
mod validate;

pub use config::{
    DEFAULT_ARGUMENTS_SEPARATOR, DEFAULT_FORCE_BUILTIN_PREFIX, ParserConfig, ParserConfigBuilder,
};
pub use error::{ParseError, RestrictionViolation};
pub use factory::{
    ArgumentsRestrictionFactory, ArgumentsRestrictionResult, FactoryError,
    GlobalRestrictionFactory, GlobalRestrictionResult, OptionRestrictionFactory,
    OptionRestrictionResult, PathRestrictionFactory, RestrictionDescriptor, RestrictionRegistry,
    StandardRestrictionFactory,
};
pub use handler::{CollectAll, Disposition, ErrorHandler, FailFast};
pub use restriction::{
    AllowedValuesRestriction, ArgumentsRestriction, FnRestriction, GlobalRestriction,
    LengthRestriction, NoRepeatedOptionsRestriction, NotBlankRestriction, NotEmptyRestriction,
    OccurrencesRestriction, OptionRestriction, PathKind, PathRestriction, PatternRestriction,
    RangeRestriction, RequireExplicitCommandRestriction, TagRule, TaggedRestriction,
    ValueRestriction,
};
pub use state::{Location, ParseState, ParsedOption};
pub use template::AliasTemplate;
pub use types::*;
pub use validate::{ValidationError, validate_command, validate_global};
