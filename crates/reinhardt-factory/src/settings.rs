//! Engine settings.
//!
//! Settings are plain values: they configure a root factory and are never
//! stored globally. Definitions derived from [`Factory::base`] use the
//! defaults.
//!
//! ```toml
//! default_strategy = "build"
//! register_factories = false
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{FactoryError, FactoryResult};
use crate::factory::{Factory, FactoryBuilder};
use crate::strategy::Strategy;

/// Settings of a root factory.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactorySettings {
	/// Strategy name inherited by definitions that do not set one.
	///
	/// Kept as a name so that an unknown strategy is reported when a factory
	/// is invoked, not when the settings are loaded.
	pub default_strategy: String,

	/// Whether defined factories are added to the global registry.
	pub register_factories: bool,
}

impl Default for FactorySettings {
	fn default() -> Self {
		Self {
			default_strategy: Strategy::Create.as_str().to_string(),
			register_factories: true,
		}
	}
}

impl FactorySettings {
	/// Sets the default strategy.
	pub fn with_default_strategy(self, strategy: Strategy) -> Self {
		self.with_default_strategy_named(strategy.as_str())
	}

	/// Sets the default strategy by name.
	pub fn with_default_strategy_named(mut self, strategy: impl Into<String>) -> Self {
		self.default_strategy = strategy.into();
		self
	}

	/// Enables or disables registration of defined factories.
	pub fn with_registration(mut self, enabled: bool) -> Self {
		self.register_factories = enabled;
		self
	}

	/// Parse settings from a TOML string.
	pub fn from_toml_str(content: &str) -> FactoryResult<Self> {
		Ok(toml::from_str(content)?)
	}

	/// Load settings from a TOML file.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::Settings`] if the file cannot be read or parsed.
	pub fn from_file(path: impl AsRef<Path>) -> FactoryResult<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path)
			.map_err(|e| FactoryError::Settings(format!("{}: {}", path.display(), e)))?;
		Self::from_toml_str(&content)
	}

	/// Creates an abstract root factory carrying these settings.
	pub fn root(&self) -> Arc<Factory> {
		tracing::debug!(
			default_strategy = %self.default_strategy,
			register_factories = self.register_factories,
			"root factory configured"
		);
		Factory::root("Factory", &self.default_strategy, self.register_factories)
	}

	/// Starts a definition derived from a new root carrying these settings.
	pub fn builder(&self, name: impl Into<String>) -> FactoryBuilder {
		self.root().extend(name)
	}
}
