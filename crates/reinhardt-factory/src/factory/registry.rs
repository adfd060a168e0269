//! Factory registry for dynamic factory discovery.
//!
//! Definitions register themselves by name when they are defined, unless the
//! root they derive from was built with registration disabled
//! (see [`FactorySettings`](crate::settings::FactorySettings)). Registering a
//! name again replaces the previous definition.
//!
//! The registry is process-wide and never pruned: every registered
//! definition stays reachable until [`clear_factories`] runs. Code that
//! defines throwaway factories in a loop or per test should derive them from
//! a root with registration disabled:
//!
//! ```ignore
//! let local = FactorySettings::default().with_registration(false);
//! let users = local.builder("UserFactory").model::<User>().define()?;
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::definition::Factory;
use super::model::Model;

/// Global factory registry.
static FACTORY_REGISTRY: Lazy<RwLock<HashMap<String, Arc<Factory>>>> =
	Lazy::new(|| RwLock::new(HashMap::new()));

/// Model type to factory name mapping.
static MODEL_FACTORY_MAP: Lazy<RwLock<HashMap<TypeId, String>>> =
	Lazy::new(|| RwLock::new(HashMap::new()));

/// Registers a factory in the global registry.
///
/// Concrete factories with a model also become the factory returned by
/// [`get_factory_for_model`] for that model.
pub fn register_factory(factory: Arc<Factory>) {
	let name = factory.name().to_string();
	if let Some(target) = factory.target().filter(|_| !factory.is_abstract()) {
		MODEL_FACTORY_MAP
			.write()
			.insert(target.type_id(), name.clone());
	}
	tracing::debug!(factory = %name, "factory registered");
	FACTORY_REGISTRY.write().insert(name, factory);
}

/// Gets a factory by name.
pub fn get_factory(name: &str) -> Option<Arc<Factory>> {
	FACTORY_REGISTRY.read().get(name).cloned()
}

/// Gets the most recently registered concrete factory of model `M`.
pub fn get_factory_for_model<M: Model>() -> Option<Arc<Factory>> {
	let name = MODEL_FACTORY_MAP
		.read()
		.get(&TypeId::of::<M>())
		.cloned()?;
	get_factory(&name)
}

/// Checks if a factory is registered under `name`.
pub fn has_factory(name: &str) -> bool {
	FACTORY_REGISTRY.read().contains_key(name)
}

/// Returns all registered factory names.
pub fn factory_names() -> Vec<String> {
	FACTORY_REGISTRY.read().keys().cloned().collect()
}

/// Clears all registered factories.
///
/// This is primarily useful for testing.
pub fn clear_factories() {
	FACTORY_REGISTRY.write().clear();
	MODEL_FACTORY_MAP.write().clear();
}

/// Returns the number of registered factories.
pub fn factory_count() -> usize {
	FACTORY_REGISTRY.read().len()
}

/// Factory registry handle for scoped operations.
#[derive(Debug, Default)]
pub struct FactoryRegistry;

impl FactoryRegistry {
	/// Creates a new registry handle.
	pub fn new() -> Self {
		Self
	}

	/// Gets a factory by name.
	pub fn get(&self, name: &str) -> Option<Arc<Factory>> {
		get_factory(name)
	}

	/// Gets the factory registered for model `M`.
	pub fn get_for_model<M: Model>(&self) -> Option<Arc<Factory>> {
		get_factory_for_model::<M>()
	}

	/// Checks if a factory is registered.
	pub fn has(&self, name: &str) -> bool {
		has_factory(name)
	}

	/// Returns all registered factory names.
	pub fn names(&self) -> Vec<String> {
		factory_names()
	}

	/// Returns the number of registered factories.
	pub fn len(&self) -> usize {
		factory_count()
	}

	/// Returns true if no factories are registered.
	pub fn is_empty(&self) -> bool {
		factory_count() == 0
	}

	/// Clears all factories (primarily for testing).
	pub fn clear(&self) {
		clear_factories();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::FactoryResult;
	use crate::settings::FactorySettings;
	use crate::value::Attributes;
	use rstest::rstest;
	use serial_test::serial;

	#[derive(Debug)]
	struct Ticket {
		title: String,
	}

	impl Model for Ticket {
		fn from_attributes(mut attributes: Attributes) -> FactoryResult<Self> {
			Ok(Self {
				title: attributes.take("title")?,
			})
		}
	}

	#[rstest]
	#[serial(factory_registry)]
	fn test_defined_factories_register_themselves() {
		let factory = Factory::builder("registry::TicketFactory")
			.model::<Ticket>()
			.attr("title", "bug")
			.define()
			.unwrap();

		assert!(has_factory("registry::TicketFactory"));
		let found = get_factory("registry::TicketFactory").unwrap();
		assert!(Arc::ptr_eq(&found, &factory));
		assert!(factory_names().contains(&"registry::TicketFactory".to_string()));
	}

	#[rstest]
	#[serial(factory_registry)]
	fn test_get_factory_for_model() {
		let factory = Factory::builder("registry::ModelTicketFactory")
			.model::<Ticket>()
			.attr("title", "feature")
			.define()
			.unwrap();

		let found = get_factory_for_model::<Ticket>().unwrap();
		assert!(Arc::ptr_eq(&found, &factory));
		let ticket: Ticket = found.build().unwrap().downcast().unwrap();
		assert_eq!(ticket.title, "feature");
	}

	#[rstest]
	#[serial(factory_registry)]
	fn test_registration_can_be_disabled() {
		let root = FactorySettings::default().with_registration(false).root();
		root.extend("registry::UnlistedTicketFactory")
			.model::<Ticket>()
			.define()
			.unwrap();

		assert!(!has_factory("registry::UnlistedTicketFactory"));
	}

	#[rstest]
	#[serial(factory_registry)]
	fn test_factory_registry_handle_and_clear() {
		let registry = FactoryRegistry::new();
		Factory::builder("registry::HandleTicketFactory")
			.model::<Ticket>()
			.define()
			.unwrap();

		assert!(!registry.is_empty());
		assert!(registry.has("registry::HandleTicketFactory"));
		assert!(registry.get("registry::HandleTicketFactory").is_some());
		assert!(registry.names().len() >= 1);

		registry.clear();
		assert!(!registry.has("registry::HandleTicketFactory"));
		assert!(registry.get_for_model::<Ticket>().is_none());
	}
}
