//! Restriction factories.
//!
//! Declarative definitions name restrictions by a `kind` string plus loose
//! parameters ([`RestrictionDescriptor`]). Factories turn descriptors into
//! restriction objects; a factory answers `Ok(None)` for kinds it does not
//! know so several factories can be chained in a [`RestrictionRegistry`].
//!
//! # Examples
//!
//! ```
//! use cmdtree_core::{RestrictionDescriptor, RestrictionRegistry};
//!
//! let registry = RestrictionRegistry::default();
//! let port = RestrictionDescriptor::new("range")
//!     .with_param("min", 1)
//!     .with_param("max", 65535);
//! assert!(registry.option_restriction(&port).unwrap().is_some());
//!
//! let unknown = RestrictionDescriptor::new("telepathy");
//! assert!(registry.option_restriction(&unknown).unwrap().is_none());
//! ```

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::restriction::{
    AllowedValuesRestriction, ArgumentsRestriction, GlobalRestriction, LengthRestriction,
    NoRepeatedOptionsRestriction, NotBlankRestriction, NotEmptyRestriction,
    OccurrencesRestriction, OptionRestriction, PathKind, PathRestriction, PatternRestriction,
    RangeRestriction, RequireExplicitCommandRestriction, TagRule, TaggedRestriction,
};

/// A restriction named by kind, with kind-specific parameters.
///
/// Parameters sit next to `kind` in serialized form:
///
/// ```yaml
/// - kind: range
///   min: 1
///   max: 65535
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestrictionDescriptor {
    pub kind: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl RestrictionDescriptor {
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.params.insert(name.to_string(), value.into());
        self
    }

    /// Reads an optional parameter.
    pub fn param<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, FactoryError> {
        match self.params.get(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|source| FactoryError::InvalidParam {
                    kind: self.kind.clone(),
                    param: name.to_string(),
                    source,
                }),
        }
    }

    /// Reads a parameter that must be present.
    pub fn required_param<T: DeserializeOwned>(&self, name: &str) -> Result<T, FactoryError> {
        self.param(name)?.ok_or_else(|| FactoryError::MissingParam {
            kind: self.kind.clone(),
            param: name.to_string(),
        })
    }

    fn flag(&self, name: &str) -> Result<bool, FactoryError> {
        Ok(self.param(name)?.unwrap_or(false))
    }
}

/// Errors building a restriction from a recognised descriptor.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("restriction '{kind}' requires parameter '{param}'")]
    MissingParam { kind: String, param: String },
    #[error("restriction '{kind}' has invalid parameter '{param}': {source}")]
    InvalidParam {
        kind: String,
        param: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

pub type OptionRestrictionResult = Result<Option<Arc<dyn OptionRestriction>>, FactoryError>;
pub type ArgumentsRestrictionResult = Result<Option<Arc<dyn ArgumentsRestriction>>, FactoryError>;
pub type GlobalRestrictionResult = Result<Option<Arc<dyn GlobalRestriction>>, FactoryError>;

/// Builds option restrictions from descriptors.
pub trait OptionRestrictionFactory: Send + Sync {
    fn option_restriction(&self, descriptor: &RestrictionDescriptor) -> OptionRestrictionResult;
}

/// Builds arguments restrictions from descriptors.
pub trait ArgumentsRestrictionFactory: Send + Sync {
    fn arguments_restriction(
        &self,
        descriptor: &RestrictionDescriptor,
    ) -> ArgumentsRestrictionResult;
}

/// Builds global restrictions from descriptors.
pub trait GlobalRestrictionFactory: Send + Sync {
    fn global_restriction(&self, descriptor: &RestrictionDescriptor) -> GlobalRestrictionResult;
}

/// Recognises `path`, `file` and `directory`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathRestrictionFactory;

impl PathRestrictionFactory {
    fn build(descriptor: &RestrictionDescriptor) -> Result<Option<PathRestriction>, FactoryError> {
        let kind = match descriptor.kind.as_str() {
            "path" => descriptor.param::<PathKind>("kind")?.unwrap_or_default(),
            "file" => PathKind::File,
            "directory" => PathKind::Directory,
            _ => return Ok(None),
        };
        Ok(Some(PathRestriction {
            must_exist: descriptor.flag("must_exist")?,
            readable: descriptor.flag("readable")?,
            writable: descriptor.flag("writable")?,
            executable: descriptor.flag("executable")?,
            kind,
        }))
    }
}

impl OptionRestrictionFactory for PathRestrictionFactory {
    fn option_restriction(&self, descriptor: &RestrictionDescriptor) -> OptionRestrictionResult {
        Ok(Self::build(descriptor)?.map(|r| Arc::new(r) as Arc<dyn OptionRestriction>))
    }
}

impl ArgumentsRestrictionFactory for PathRestrictionFactory {
    fn arguments_restriction(
        &self,
        descriptor: &RestrictionDescriptor,
    ) -> ArgumentsRestrictionResult {
        Ok(Self::build(descriptor)?.map(|r| Arc::new(r) as Arc<dyn ArgumentsRestriction>))
    }
}

/// Recognises the remaining built-in restriction kinds.
///
/// | kind | applies to | params |
/// |------|------------|--------|
/// | `pattern` | options, arguments | `pattern` |
/// | `allowed_values` | options, arguments | `values`, `ignore_case` |
/// | `not_blank`, `not_empty` | options, arguments | |
/// | `length` | options, arguments | `min`, `max` |
/// | `range` | options, arguments | `min`, `max` |
/// | `occurrences` | options, arguments | `min`, `max` |
/// | `mutually_exclusive`, `require_only_one`, `require_some` | options | `tag` |
/// | `require_explicit_command` | global | |
/// | `no_repeated_options` | global | `allowed` |
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRestrictionFactory;

/// Restriction usable on both options and arguments.
enum Shared {
    Pattern(PatternRestriction),
    Allowed(AllowedValuesRestriction),
    NotBlank,
    NotEmpty,
    Length(LengthRestriction),
    Range(RangeRestriction),
    Occurrences(OccurrencesRestriction),
}

impl StandardRestrictionFactory {
    fn shared(descriptor: &RestrictionDescriptor) -> Result<Option<Shared>, FactoryError> {
        let shared = match descriptor.kind.as_str() {
            "pattern" => {
                let pattern: String = descriptor.required_param("pattern")?;
                let restriction = PatternRestriction::new(&pattern)
                    .map_err(|source| FactoryError::InvalidPattern { pattern, source })?;
                Shared::Pattern(restriction)
            }
            "allowed_values" => Shared::Allowed(AllowedValuesRestriction {
                values: descriptor.required_param("values")?,
                ignore_case: descriptor.flag("ignore_case")?,
            }),
            "not_blank" => Shared::NotBlank,
            "not_empty" => Shared::NotEmpty,
            "length" => Shared::Length(LengthRestriction::new(
                descriptor.param("min")?,
                descriptor.param("max")?,
            )),
            "range" => Shared::Range(RangeRestriction::new(
                descriptor.param("min")?,
                descriptor.param("max")?,
            )),
            "occurrences" => Shared::Occurrences(OccurrencesRestriction::new(
                descriptor.param("min")?,
                descriptor.param("max")?,
            )),
            _ => return Ok(None),
        };
        Ok(Some(shared))
    }
}

impl OptionRestrictionFactory for StandardRestrictionFactory {
    fn option_restriction(&self, descriptor: &RestrictionDescriptor) -> OptionRestrictionResult {
        if let Some(shared) = Self::shared(descriptor)? {
            let restriction: Arc<dyn OptionRestriction> = match shared {
                Shared::Pattern(r) => Arc::new(r),
                Shared::Allowed(r) => Arc::new(r),
                Shared::NotBlank => Arc::new(NotBlankRestriction),
                Shared::NotEmpty => Arc::new(NotEmptyRestriction),
                Shared::Length(r) => Arc::new(r),
                Shared::Range(r) => Arc::new(r),
                Shared::Occurrences(r) => Arc::new(r),
            };
            return Ok(Some(restriction));
        }

        let rule = match descriptor.kind.as_str() {
            "mutually_exclusive" => TagRule::MutuallyExclusive,
            "require_only_one" => TagRule::RequireOnlyOne,
            "require_some" => TagRule::RequireSome,
            _ => return Ok(None),
        };
        let tag: String = descriptor.required_param("tag")?;
        Ok(Some(Arc::new(TaggedRestriction::new(rule, &tag))))
    }
}

impl ArgumentsRestrictionFactory for StandardRestrictionFactory {
    fn arguments_restriction(
        &self,
        descriptor: &RestrictionDescriptor,
    ) -> ArgumentsRestrictionResult {
        let Some(shared) = Self::shared(descriptor)? else {
            return Ok(None);
        };
        let restriction: Arc<dyn ArgumentsRestriction> = match shared {
            Shared::Pattern(r) => Arc::new(r),
            Shared::Allowed(r) => Arc::new(r),
            Shared::NotBlank => Arc::new(NotBlankRestriction),
            Shared::NotEmpty => Arc::new(NotEmptyRestriction),
            Shared::Length(r) => Arc::new(r),
            Shared::Range(r) => Arc::new(r),
            Shared::Occurrences(r) => Arc::new(r),
        };
        Ok(Some(restriction))
    }
}

impl GlobalRestrictionFactory for StandardRestrictionFactory {
    fn global_restriction(&self, descriptor: &RestrictionDescriptor) -> GlobalRestrictionResult {
        let restriction: Arc<dyn GlobalRestriction> = match descriptor.kind.as_str() {
            "require_explicit_command" => Arc::new(RequireExplicitCommandRestriction),
            "no_repeated_options" => Arc::new(NoRepeatedOptionsRestriction {
                allowed: descriptor.param("allowed")?.unwrap_or_default(),
            }),
            _ => return Ok(None),
        };
        Ok(Some(restriction))
    }
}

/// Ordered chains of restriction factories, one per attachment point.
///
/// The first factory to recognise a descriptor builds it. Factories added
/// with the `with_*` methods are consulted before the built-in ones.
#[derive(Clone)]
pub struct RestrictionRegistry {
    option: Vec<Arc<dyn OptionRestrictionFactory>>,
    arguments: Vec<Arc<dyn ArgumentsRestrictionFactory>>,
    global: Vec<Arc<dyn GlobalRestrictionFactory>>,
}

impl Default for RestrictionRegistry {
    fn default() -> Self {
        Self {
            option: vec![
                Arc::new(PathRestrictionFactory),
                Arc::new(StandardRestrictionFactory),
            ],
            arguments: vec![
                Arc::new(PathRestrictionFactory),
                Arc::new(StandardRestrictionFactory),
            ],
            global: vec![Arc::new(StandardRestrictionFactory)],
        }
    }
}

impl std::fmt::Debug for RestrictionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestrictionRegistry")
            .field("option_factories", &self.option.len())
            .field("arguments_factories", &self.arguments.len())
            .field("global_factories", &self.global.len())
            .finish()
    }
}

impl RestrictionRegistry {
    /// A registry with no factories at all.
    pub fn empty() -> Self {
        Self {
            option: Vec::new(),
            arguments: Vec::new(),
            global: Vec::new(),
        }
    }

    pub fn with_option_factory(mut self, factory: impl OptionRestrictionFactory + 'static) -> Self {
        self.option.insert(0, Arc::new(factory));
        self
    }

    pub fn with_arguments_factory(
        mut self,
        factory: impl ArgumentsRestrictionFactory + 'static,
    ) -> Self {
        self.arguments.insert(0, Arc::new(factory));
        self
    }

    pub fn with_global_factory(mut self, factory: impl GlobalRestrictionFactory + 'static) -> Self {
        self.global.insert(0, Arc::new(factory));
        self
    }

    pub fn option_restriction(
        &self,
        descriptor: &RestrictionDescriptor,
    ) -> OptionRestrictionResult {
        for factory in &self.option {
            if let Some(restriction) = factory.option_restriction(descriptor)? {
                return Ok(Some(restriction));
            }
        }
        Ok(None)
    }

    pub fn arguments_restriction(
        &self,
        descriptor: &RestrictionDescriptor,
    ) -> ArgumentsRestrictionResult {
        for factory in &self.arguments {
            if let Some(restriction) = factory.arguments_restriction(descriptor)? {
                return Ok(Some(restriction));
            }
        }
        Ok(None)
    }

    pub fn global_restriction(
        &self,
        descriptor: &RestrictionDescriptor,
    ) -> GlobalRestrictionResult {
        for factory in &self.global {
            if let Some(restriction) = factory.global_restriction(descriptor)? {
                return Ok(Some(restriction));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;
    use crate::error::RestrictionViolation;
    use crate::state::ParseState;
    use crate::types::{CommandMetadata, OptionMetadata};

    fn descriptor(yaml: serde_json::Value) -> RestrictionDescriptor {
        serde_json::from_value(yaml).unwrap()
    }

    #[test]
    fn test_descriptor_params_are_flattened() {
        let d = descriptor(serde_json::json!({"kind": "length", "min": 2}));
        assert_eq!(d.kind, "length");
        assert_eq!(d.param::<usize>("min").unwrap(), Some(2));
        assert_eq!(d.param::<usize>("max").unwrap(), None);
    }

    #[test]
    fn test_path_kinds() {
        let factory = PathRestrictionFactory;
        assert!(
            PathRestrictionFactory::build(&RestrictionDescriptor::new("file"))
                .unwrap()
                .is_some_and(|r| r.kind == PathKind::File)
        );
        let path = descriptor(serde_json::json!({
            "kind": "path", "must_exist": true
        }));
        let built = PathRestrictionFactory::build(&path).unwrap().unwrap();
        assert_eq!(built.kind, PathKind::Either);
        assert!(built.must_exist);
        assert!(
            factory
                .option_restriction(&RestrictionDescriptor::new("range"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn test_malformed_params_are_errors() {
        let registry = RestrictionRegistry::default();
        let bad = descriptor(serde_json::json!({"kind": "range", "min": "one"}));
        assert!(matches!(
            registry.option_restriction(&bad),
            Err(FactoryError::InvalidParam { .. })
        ));
        assert!(matches!(
            registry.option_restriction(&RestrictionDescriptor::new("pattern")),
            Err(FactoryError::MissingParam { .. })
        ));
        let bad_regex = RestrictionDescriptor::new("pattern").with_param("pattern", "(");
        assert!(matches!(
            registry.arguments_restriction(&bad_regex),
            Err(FactoryError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_attachment_points() {
        let registry = RestrictionRegistry::default();
        let tagged = RestrictionDescriptor::new("require_some").with_param("tag", "out");
        assert!(registry.option_restriction(&tagged).unwrap().is_some());
        assert!(registry.arguments_restriction(&tagged).unwrap().is_none());
        assert!(registry.global_restriction(&tagged).unwrap().is_none());

        let explicit = RestrictionDescriptor::new("require_explicit_command");
        assert!(registry.global_restriction(&explicit).unwrap().is_some());
        assert!(registry.option_restriction(&explicit).unwrap().is_none());
    }

    #[test]
    fn test_built_restriction_runs() {
        let registry = RestrictionRegistry::default();
        let range = registry
            .option_restriction(
                &RestrictionDescriptor::new("range")
                    .with_param("min", 1)
                    .with_param("max", 10),
            )
            .unwrap()
            .unwrap();
        let command = CommandMetadata::new("run")
            .with_option(OptionMetadata::with_value(&["-n"]).with_shared_restriction(range));
        let option = &command.options[0];
        let config = ParserConfig::default();
        let mut state = ParseState::for_command(&config, &command);
        state.begin_option(option);
        state.push_option_value("42".into());

        assert!(matches!(
            option.restrictions[0].post_validate(&state, option),
            Err(RestrictionViolation::ValueOutOfRange { value: 42, .. })
        ));
    }

    #[derive(Debug)]
    struct Never;

    impl OptionRestrictionFactory for Never {
        fn option_restriction(
            &self,
            descriptor: &RestrictionDescriptor,
        ) -> OptionRestrictionResult {
            if descriptor.kind != "never" {
                return Ok(None);
            }
            Ok(Some(Arc::new(crate::restriction::FnRestriction::new(
                |_: &ParseState<'_>, option: &OptionMetadata| {
                    Err(RestrictionViolation::Custom(format!(
                        "{} is not allowed",
                        option.title
                    )))
                },
            ))))
        }
    }

    #[test]
    fn test_custom_factory_is_consulted() {
        let registry = RestrictionRegistry::default().with_option_factory(Never);
        assert!(
            registry
                .option_restriction(&RestrictionDescriptor::new("never"))
                .unwrap()
                .is_some()
        );
        assert!(
            RestrictionRegistry::empty()
                .option_restriction(&RestrictionDescriptor::new("never"))
                .unwrap()
                .is_none()
        );
    }
}
