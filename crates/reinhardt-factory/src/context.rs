//! Resolution context handed to lazy declarations.

use std::any::Any;

use serde::de::DeserializeOwned;

use crate::error::{FactoryError, FactoryResult};
use crate::strategy::Strategy;
use crate::value::{Attributes, Value};

/// Read-only view of a factory call in progress.
///
/// A context only exposes the attributes resolved *before* the declaration
/// being evaluated. Asking for a later (or undeclared) attribute fails with
/// [`FactoryError::AttributeNotFound`].
///
/// When the factory runs as a sub-factory, [`parent`](Self::parent) exposes
/// the attributes the outer call had resolved before reaching it.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
	factory: &'a str,
	resolved: &'a Attributes,
	parent: Option<&'a Attributes>,
	sequence: i64,
	strategy: Strategy,
}

impl<'a> ResolutionContext<'a> {
	pub(crate) fn new(
		factory: &'a str,
		resolved: &'a Attributes,
		sequence: i64,
		strategy: Strategy,
	) -> Self {
		Self {
			factory,
			resolved,
			parent: None,
			sequence,
			strategy,
		}
	}

	pub(crate) fn with_parent(mut self, parent: Option<&'a Attributes>) -> Self {
		self.parent = parent;
		self
	}

	/// Name of the factory being invoked.
	pub fn factory_name(&self) -> &'a str {
		self.factory
	}

	/// Sequence value of this call.
	pub fn sequence(&self) -> i64 {
		self.sequence
	}

	/// Strategy of this call.
	pub fn strategy(&self) -> Strategy {
		self.strategy
	}

	/// Attributes resolved so far.
	pub fn attributes(&self) -> &'a Attributes {
		self.resolved
	}

	/// Returns true if `name` has already been resolved.
	pub fn contains(&self, name: &str) -> bool {
		self.resolved.contains(name)
	}

	/// Returns a previously resolved attribute.
	pub fn get(&self, name: &str) -> FactoryResult<&'a Value> {
		self.resolved
			.get(name)
			.ok_or_else(|| FactoryError::AttributeNotFound(name.to_string()))
	}

	/// Returns a previously resolved attribute decoded into `T`.
	pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> FactoryResult<T> {
		self.resolved.get_as(name)
	}

	/// Attributes of the outer call, if this factory runs as a sub-factory.
	///
	/// Only the outer attributes declared before the sub-factory are present.
	pub fn parent(&self) -> Option<&'a Attributes> {
		self.parent
	}

	/// Returns an attribute of the outer call decoded into `T`.
	///
	/// Fails with [`FactoryError::AttributeNotFound`] outside a sub-factory.
	pub fn parent_get_as<T: DeserializeOwned>(&self, name: &str) -> FactoryResult<T> {
		self.parent
			.ok_or_else(|| FactoryError::AttributeNotFound(format!("..{}", name)))?
			.get_as(name)
	}

	/// Returns a previously resolved object, such as a sub-factory product.
	pub fn object<T: Any>(&self, name: &str) -> FactoryResult<&'a T> {
		self.resolved.object(name)
	}
}
