//! Plain attribute holders produced by the stub strategy.

use crate::value::{Attributes, Value};

/// Object produced by [`Strategy::Stub`](crate::strategy::Strategy::Stub).
///
/// It exposes exactly the resolved attributes and nothing else: it has no
/// identity, is never persisted and does not depend on the factory's model.
#[derive(Debug, Clone, PartialEq)]
pub struct Stub {
	factory: String,
	attributes: Attributes,
}

impl Stub {
	pub(crate) fn new(factory: impl Into<String>, attributes: Attributes) -> Self {
		Self {
			factory: factory.into(),
			attributes,
		}
	}

	/// Name of the factory that produced the stub.
	pub fn factory_name(&self) -> &str {
		&self.factory
	}

	/// Returns an attribute.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.attributes.get(name)
	}

	/// Returns true if the stub has the attribute `name`.
	pub fn has(&self, name: &str) -> bool {
		self.attributes.contains(name)
	}

	/// Sets an attribute, e.g. from a post-generation hook.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
		self.attributes.insert(name, value);
	}

	/// All attributes.
	pub fn attributes(&self) -> &Attributes {
		&self.attributes
	}

	/// Consumes the stub and returns its attributes.
	pub fn into_attributes(self) -> Attributes {
		self.attributes
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_stub_exposes_exactly_its_attributes() {
		let mut stub = Stub::new("UserFactory", Attributes::new().with("one", "one"));

		assert_eq!(stub.factory_name(), "UserFactory");
		assert_eq!(stub.get("one").and_then(Value::as_str), Some("one"));
		assert!(!stub.has("id"));

		stub.set("id", 3);
		assert_eq!(stub.attributes().names().collect::<Vec<_>>(), vec!["one", "id"]);
		assert_eq!(stub.into_attributes().len(), 2);
	}
}
