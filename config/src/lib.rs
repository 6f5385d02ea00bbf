//! File-based definitions for cmdtree.
//!
//! Loads a program's command tree from a YAML or JSON definition file,
//! merges aliases from user alias files, and resolves restriction
//! descriptors through a [`cmdtree_core::RestrictionRegistry`].
//!
//! # Example
//!
//! ```
//! use cmdtree_config::{DefinitionFormat, DefinitionLoader};
//!
//! let global = DefinitionLoader::new()
//!     .load_str(
//!         r#"
//! name: tool
//! commands:
//!   - name: serve
//!     options:
//!       - names: ["-p", "--port"]
//!         arity: 1
//!         restrictions:
//!           - kind: range
//!             min: 1
//!             max: 65535
//! "#,
//!         DefinitionFormat::Yaml,
//!     )
//!     .unwrap();
//!
//! let serve = global.find_command("serve").unwrap();
//! assert_eq!(serve.options[0].restrictions.len(), 1);
//! ```

mod aliases;
mod definition;
mod error;
mod loader;

pub use aliases::{UserAliasSource, load_alias_file, parse_aliases};
pub use definition::{
    AliasDefinition, ArgumentsDefinition, CliDefinition, CommandDefinition, GroupDefinition,
    OptionDefinition, ParserDefinition,
};
pub use error::{ConfigError, Result};
pub use loader::{DefinitionFormat, DefinitionLoader, parse_definition, read_definition};
