//! A single invocation of a factory.

use std::any::Any;

use indexmap::IndexMap;

use super::definition::Factory;
use super::dispatch;
use crate::declarations::Declaration;
use crate::error::{FactoryError, FactoryResult};
use crate::post_generation;
use crate::resolver::{self, Resolution};
use crate::strategy::Strategy;
use crate::value::{Attributes, Instance, Value};

/// Builder of a single factory invocation.
///
/// Overrides set on the call replace the declaration of the same name and are
/// never evaluated as declarations. Names addressed to a post-generation
/// declaration (`name`, `name__param`) or to a sub-factory (`name__field`) are
/// routed to it instead of becoming attributes. Overriding a sub-factory
/// attribute while also passing `name__field` arguments fails with
/// [`FactoryError::ConflictingOverride`] rather than dropping those arguments.
///
/// # Example
///
/// ```ignore
/// let user: User = users
///     .call()
///     .set("username", "ada")
///     .set("groups__count", 2)
///     .create()?
///     .downcast()?;
/// ```
#[derive(Clone)]
pub struct FactoryCall<'a> {
	factory: &'a Factory,
	kwargs: Attributes,
	declarations: IndexMap<String, Declaration>,
	strategy: Option<Strategy>,
	sequence: Option<i64>,
	parent: Option<&'a Attributes>,
}

impl<'a> FactoryCall<'a> {
	pub(crate) fn new(factory: &'a Factory) -> Self {
		Self {
			factory,
			kwargs: Attributes::new(),
			declarations: IndexMap::new(),
			strategy: None,
			sequence: None,
			parent: None,
		}
	}

	/// Runs the call as a sub-factory of an outer call that has resolved `parent`.
	pub(crate) fn parent(mut self, parent: &'a Attributes) -> Self {
		self.parent = Some(parent);
		self
	}

	/// Overrides an attribute for this call.
	pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.kwargs.insert(name, value);
		self
	}

	/// Overrides several attributes for this call.
	pub fn with_attributes(mut self, attributes: Attributes) -> Self {
		self.kwargs.extend(attributes);
		self
	}

	/// Adds or replaces a declaration for this call only.
	pub fn declare(mut self, name: impl Into<String>, declaration: Declaration) -> Self {
		self.declarations.insert(name.into(), declaration);
		self
	}

	/// Uses `strategy` instead of the factory's default.
	pub fn strategy(mut self, strategy: Strategy) -> Self {
		self.strategy = Some(strategy);
		self
	}

	/// Uses `sequence` as the sequence value without advancing the counter.
	pub fn force_sequence(mut self, sequence: i64) -> Self {
		self.sequence = Some(sequence);
		self
	}

	/// Generates an instance with the build strategy.
	pub fn build(self) -> FactoryResult<Instance> {
		self.strategy(Strategy::Build).generate()
	}

	/// Generates an instance with the create strategy.
	pub fn create(self) -> FactoryResult<Instance> {
		self.strategy(Strategy::Create).generate()
	}

	/// Generates a stub.
	pub fn stub(self) -> FactoryResult<Instance> {
		self.strategy(Strategy::Stub).generate()
	}

	/// Generates an instance and downcasts it to `T`.
	pub fn generate_as<T: Any>(self) -> FactoryResult<T> {
		self.generate()?.downcast()
	}

	/// Generates an instance.
	///
	/// # Errors
	///
	/// Fails if the factory is abstract, if its strategy is unknown or not
	/// supported, or with the first error raised while resolving attributes,
	/// constructing the model or running post-generation declarations.
	pub fn generate(self) -> FactoryResult<Instance> {
		let factory = self.factory;
		let strategy = self.checked_strategy()?;
		let Resolution {
			attributes,
			post_generation,
			sequence,
		} = resolver::resolve(
			factory,
			strategy,
			self.kwargs,
			&self.declarations,
			self.sequence,
			self.parent,
		)?;

		tracing::debug!(
			factory = %factory.name(),
			strategy = %strategy,
			sequence,
			"generating instance"
		);

		let mut instance = dispatch::dispatch(factory, strategy, attributes)?;
		post_generation::execute(factory.name(), &mut instance, post_generation)?;
		Ok(instance)
	}

	/// Generates `count` instances with the same overrides.
	///
	/// Each instance draws its own sequence value unless one is forced.
	pub fn generate_batch(self, count: usize) -> FactoryResult<Vec<Instance>> {
		(0..count).map(|_| self.clone().generate()).collect()
	}

	/// Resolves the attributes the call would construct its object with.
	///
	/// Sub-factories are still invoked with the call's strategy and
	/// post-generation declarations do not run.
	pub fn attributes(self) -> FactoryResult<Attributes> {
		let strategy = self.checked_strategy()?;
		let resolution = resolver::resolve(
			self.factory,
			strategy,
			self.kwargs,
			&self.declarations,
			self.sequence,
			self.parent,
		)?;
		Ok(resolution.attributes)
	}

	fn checked_strategy(&self) -> FactoryResult<Strategy> {
		let factory = self.factory;
		if factory.is_abstract() {
			return Err(FactoryError::AbstractFactory {
				factory: factory.name().to_string(),
			});
		}

		let strategy = match self.strategy {
			Some(strategy) => strategy,
			None => factory.strategy()?,
		};
		if factory.is_strategy_locked() && strategy != Strategy::Stub {
			return Err(FactoryError::UnsupportedStrategy {
				factory: factory.name().to_string(),
				strategy,
			});
		}
		Ok(strategy)
	}
}

impl std::fmt::Debug for FactoryCall<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FactoryCall")
			.field("factory", &self.factory.name())
			.field("kwargs", &self.kwargs)
			.field("declarations", &self.declarations.keys().collect::<Vec<_>>())
			.field("strategy", &self.strategy)
			.field("sequence", &self.sequence)
			.field("parent", &self.parent.map(|parent| parent.names().collect::<Vec<_>>()))
			.finish()
	}
}
