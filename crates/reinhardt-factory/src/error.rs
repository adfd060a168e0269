//! Error types for the factory engine.
//!
//! Every fallible operation in this crate returns [`FactoryResult`]. Errors
//! raised by user-supplied recipes, creation hooks and post-generation hooks
//! are never caught or translated by the engine; they reach the caller of the
//! construction call exactly as they were returned.

use thiserror::Error;

use crate::strategy::Strategy;

/// Result type alias for factory operations.
pub type FactoryResult<T> = Result<T, FactoryError>;

/// Errors that can occur while defining or invoking a factory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FactoryError {
	/// A concrete factory was defined without a model.
	#[error(
		"factory `{factory}` has no associated model; declare one with `model::<T>()` or mark the factory abstract"
	)]
	AssociatedClass {
		/// Factory name.
		factory: String,
	},

	/// An abstract factory (including the engine base factories) was invoked.
	#[error("cannot generate instances of abstract factory `{factory}`")]
	AbstractFactory {
		/// Factory name.
		factory: String,
	},

	/// The strategy name does not match any known strategy.
	#[error("unknown strategy: {0}")]
	UnknownStrategy(String),

	/// The factory is locked to the stub strategy.
	#[error("factory `{factory}` does not support the {strategy} strategy")]
	UnsupportedStrategy {
		/// Factory name.
		factory: String,
		/// Rejected strategy.
		strategy: Strategy,
	},

	/// A recipe or constructor referenced an attribute that has not been resolved.
	#[error("attribute not found: {0}")]
	AttributeNotFound(String),

	/// An attribute holds a value of another kind than the one requested.
	#[error("attribute `{name}` does not hold a value of type `{expected}`")]
	TypeMismatch {
		/// Attribute name.
		name: String,
		/// Requested type.
		expected: &'static str,
	},

	/// An attribute could not be decoded into the requested type.
	#[error("attribute `{name}` could not be decoded: {source}")]
	InvalidValue {
		/// Attribute name.
		name: String,
		/// Decoding failure.
		source: serde_json::Error,
	},

	/// A sub-factory attribute was overridden together with `name__field`
	/// arguments that could no longer reach the sub-factory.
	#[error(
		"factory `{factory}`: `{attribute}` was overridden, so `{attribute}__*` arguments cannot be applied"
	)]
	ConflictingOverride {
		/// Factory name.
		factory: String,
		/// Overridden sub-factory attribute.
		attribute: String,
	},

	/// A produced instance is not of the requested type.
	#[error("expected an instance of `{expected}`, found `{found}`")]
	UnexpectedInstance {
		/// Requested type.
		expected: &'static str,
		/// Actual type of the produced instance.
		found: &'static str,
	},

	/// A cycle declaration was declared without values.
	#[error("cycle declaration `{0}` has no values")]
	EmptyCycle(String),

	/// Settings could not be loaded.
	#[error("invalid factory settings: {0}")]
	Settings(String),

	/// Error returned by a user-supplied recipe or hook.
	#[error("{0}")]
	Custom(Box<dyn std::error::Error + Send + Sync>),
}

/// Broad classification of a [`FactoryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// The factory definition is structurally invalid or not instantiable.
	Definition,
	/// A declaration failed while being resolved or applied.
	Resolution,
	/// The strategy is unknown or not allowed for the factory.
	Strategy,
	/// Settings could not be loaded.
	Configuration,
}

impl FactoryError {
	/// Wraps an arbitrary error raised by a recipe, hook or model constructor.
	pub fn custom(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
		Self::Custom(error.into())
	}

	/// Returns the classification of this error.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::AssociatedClass { .. } | Self::AbstractFactory { .. } => ErrorKind::Definition,
			Self::UnknownStrategy(_) | Self::UnsupportedStrategy { .. } => ErrorKind::Strategy,
			Self::Settings(_) => ErrorKind::Configuration,
			Self::AttributeNotFound(_)
			| Self::TypeMismatch { .. }
			| Self::InvalidValue { .. }
			| Self::ConflictingOverride { .. }
			| Self::UnexpectedInstance { .. }
			| Self::EmptyCycle(_)
			| Self::Custom(_) => ErrorKind::Resolution,
		}
	}

	/// Returns the wrapped user error if it is of type `E`.
	pub fn custom_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
		match self {
			Self::Custom(inner) => inner.downcast_ref::<E>(),
			_ => None,
		}
	}
}

impl From<toml::de::Error> for FactoryError {
	fn from(err: toml::de::Error) -> Self {
		Self::Settings(err.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[derive(Debug)]
	struct Boom;

	impl std::fmt::Display for Boom {
		fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
			write!(f, "boom")
		}
	}

	impl std::error::Error for Boom {}

	#[rstest]
	fn test_associated_class_error_display() {
		let err = FactoryError::AssociatedClass {
			factory: "UserFactory".to_string(),
		};
		let msg = err.to_string();
		assert!(msg.contains("UserFactory"));
		assert!(msg.contains("no associated model"));
		assert!(!msg.contains("autodiscovery"));
	}

	#[rstest]
	fn test_unsupported_strategy_display() {
		let err = FactoryError::UnsupportedStrategy {
			factory: "ProfileFactory".to_string(),
			strategy: Strategy::Create,
		};
		assert_eq!(
			err.to_string(),
			"factory `ProfileFactory` does not support the create strategy"
		);
	}

	#[rstest]
	#[case(FactoryError::AbstractFactory { factory: "Factory".into() }, ErrorKind::Definition)]
	#[case(FactoryError::UnknownStrategy("unknown".into()), ErrorKind::Strategy)]
	#[case(FactoryError::AttributeNotFound("does_not_exist".into()), ErrorKind::Resolution)]
	#[case(FactoryError::EmptyCycle("color".into()), ErrorKind::Resolution)]
	#[case(
		FactoryError::ConflictingOverride { factory: "PostFactory".into(), attribute: "author".into() },
		ErrorKind::Resolution
	)]
	#[case(FactoryError::Settings("bad".into()), ErrorKind::Configuration)]
	fn test_error_kind(#[case] err: FactoryError, #[case] kind: ErrorKind) {
		assert_eq!(err.kind(), kind);
	}

	#[rstest]
	fn test_custom_error_is_shown_verbatim() {
		let err = FactoryError::custom(Boom);
		assert_eq!(err.to_string(), "boom");
		assert!(err.custom_ref::<Boom>().is_some());
		assert!(err.custom_ref::<std::io::Error>().is_none());
	}

	#[rstest]
	fn test_toml_error_conversion() {
		let toml_err = toml::from_str::<toml::Table>("= broken").unwrap_err();
		let err: FactoryError = toml_err.into();
		assert!(matches!(err, FactoryError::Settings(_)));
	}
}
