//! Attribute values, resolved attribute mappings and produced instances.
//!
//! Factories deal with heterogeneous values: plain data produced by literals,
//! sequences and lazy recipes, and whole objects produced by nested factories.
//! [`Value`] covers both. Plain data is stored as [`serde_json::Value`] so that
//! model constructors can decode it into their own field types with serde.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;

use crate::error::{FactoryError, FactoryResult};

/// Separator between an owning declaration and one of its parameters,
/// as in `author__username`.
pub const NAMESPACE_SEPARATOR: &str = "__";

/// A shared object produced by a nested factory.
#[derive(Clone)]
pub struct ObjectValue {
	type_name: &'static str,
	inner: Arc<dyn Any + Send + Sync>,
}

impl ObjectValue {
	/// Returns the type name of the wrapped object.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Returns a reference to the object if it is of type `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.inner.downcast_ref::<T>()
	}

	/// Returns a shared handle to the object if it is of type `T`.
	pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
		self.inner.clone().downcast::<T>().ok()
	}
}

/// A single attribute value.
#[derive(Clone)]
pub enum Value {
	/// Plain data.
	Data(serde_json::Value),
	/// An object, typically produced by a nested factory.
	Object(ObjectValue),
}

impl Value {
	/// The null value.
	pub fn null() -> Self {
		Self::Data(serde_json::Value::Null)
	}

	/// Wraps an arbitrary object.
	pub fn object<T: Any + Send + Sync>(object: T) -> Self {
		Self::Object(ObjectValue {
			type_name: type_name::<T>(),
			inner: Arc::new(object),
		})
	}

	/// Returns the plain data, if this is not an object.
	pub fn as_data(&self) -> Option<&serde_json::Value> {
		match self {
			Self::Data(data) => Some(data),
			Self::Object(_) => None,
		}
	}

	/// Returns the wrapped object if it is of type `T`.
	pub fn as_object<T: Any>(&self) -> Option<&T> {
		match self {
			Self::Object(object) => object.downcast_ref::<T>(),
			Self::Data(_) => None,
		}
	}

	/// Returns the string content, if this is a string.
	pub fn as_str(&self) -> Option<&str> {
		self.as_data().and_then(serde_json::Value::as_str)
	}

	/// Returns the integer content, if this is an integer.
	pub fn as_i64(&self) -> Option<i64> {
		self.as_data().and_then(serde_json::Value::as_i64)
	}

	/// Returns the boolean content, if this is a boolean.
	pub fn as_bool(&self) -> Option<bool> {
		self.as_data().and_then(serde_json::Value::as_bool)
	}

	/// Returns true if this is plain null.
	pub fn is_null(&self) -> bool {
		matches!(self, Self::Data(serde_json::Value::Null))
	}

	/// Decodes plain data into `T`. `name` is only used for error reporting.
	pub fn decode<T: DeserializeOwned>(&self, name: &str) -> FactoryResult<T> {
		match self {
			Self::Data(data) => {
				serde_json::from_value(data.clone()).map_err(|source| FactoryError::InvalidValue {
					name: name.to_string(),
					source,
				})
			}
			Self::Object(_) => Err(FactoryError::TypeMismatch {
				name: name.to_string(),
				expected: type_name::<T>(),
			}),
		}
	}
}

impl fmt::Debug for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Data(data) => write!(f, "{}", data),
			Self::Object(object) => write!(f, "<{}>", object.type_name),
		}
	}
}

impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Data(a), Self::Data(b)) => a == b,
			(Self::Object(a), Self::Object(b)) => Arc::ptr_eq(&a.inner, &b.inner),
			_ => false,
		}
	}
}

impl From<serde_json::Value> for Value {
	fn from(value: serde_json::Value) -> Self {
		Self::Data(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Self::Data(value.into())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Self::Data(value.into())
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Self::Data(value.into())
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Self::Data(value.into())
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Self::Data(value.into())
	}
}

impl From<u32> for Value {
	fn from(value: u32) -> Self {
		Self::Data(value.into())
	}
}

impl From<u64> for Value {
	fn from(value: u64) -> Self {
		Self::Data(value.into())
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Self::Data(value.into())
	}
}

impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		value.map_or_else(Value::null, Into::into)
	}
}

/// Ordered mapping of attribute names to values.
///
/// Used for resolved attributes, per-call overrides and post-generation
/// parameters. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
	values: IndexMap<String, Value>,
}

impl Attributes {
	/// Creates an empty mapping.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a value and returns the mapping, for chained construction.
	pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(name, value);
		self
	}

	/// Inserts a value. An existing value keeps its position and is replaced.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.values.insert(name.into(), value.into())
	}

	/// Returns the value for `name`.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.values.get(name)
	}

	/// Returns true if `name` is present.
	pub fn contains(&self, name: &str) -> bool {
		self.values.contains_key(name)
	}

	/// Removes `name`, preserving the order of the remaining values.
	pub fn remove(&mut self, name: &str) -> Option<Value> {
		self.values.shift_remove(name)
	}

	/// Returns the number of values.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns true if there are no values.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Returns the names in order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.values.keys().map(String::as_str)
	}

	/// Iterates over `(name, value)` pairs in order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.values.iter().map(|(name, value)| (name.as_str(), value))
	}

	/// Adds every value of `other`, replacing values with the same name.
	pub fn extend(&mut self, other: Attributes) {
		self.values.extend(other.values);
	}

	/// Removes every `outer__inner` entry and returns them keyed by `inner`.
	///
	/// The bare `outer` entry, if any, is left in place.
	pub fn take_namespace(&mut self, outer: &str) -> Attributes {
		let prefix = format!("{}{}", outer, NAMESPACE_SEPARATOR);
		let names: Vec<String> = self
			.values
			.keys()
			.filter(|name| name.len() > prefix.len() && name.starts_with(&prefix))
			.cloned()
			.collect();

		let mut namespace = Attributes::new();
		for name in names {
			if let Some(value) = self.values.shift_remove(&name) {
				namespace.insert(&name[prefix.len()..], value);
			}
		}
		namespace
	}

	/// Returns `name` decoded into `T`.
	pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> FactoryResult<T> {
		self.require(name)?.decode(name)
	}

	/// Returns a reference to the object stored under `name`.
	pub fn object<T: Any>(&self, name: &str) -> FactoryResult<&T> {
		self.require(name)?
			.as_object::<T>()
			.ok_or_else(|| FactoryError::TypeMismatch {
				name: name.to_string(),
				expected: type_name::<T>(),
			})
	}

	/// Removes `name` and decodes it into `T`.
	pub fn take<T: DeserializeOwned>(&mut self, name: &str) -> FactoryResult<T> {
		let value = self
			.remove(name)
			.ok_or_else(|| FactoryError::AttributeNotFound(name.to_string()))?;
		value.decode(name)
	}

	/// Removes `name` and decodes it into `T`; a missing or null value yields `None`.
	pub fn take_opt<T: DeserializeOwned>(&mut self, name: &str) -> FactoryResult<Option<T>> {
		match self.remove(name) {
			Some(value) if !value.is_null() => value.decode(name).map(Some),
			_ => Ok(None),
		}
	}

	/// Removes `name` and returns the shared object it holds.
	pub fn take_object<T: Any + Send + Sync>(&mut self, name: &str) -> FactoryResult<Arc<T>> {
		let value = self
			.remove(name)
			.ok_or_else(|| FactoryError::AttributeNotFound(name.to_string()))?;
		let object = match &value {
			Value::Object(object) => object.downcast::<T>(),
			Value::Data(_) => None,
		};
		object.ok_or_else(|| FactoryError::TypeMismatch {
			name: name.to_string(),
			expected: type_name::<T>(),
		})
	}

	fn require(&self, name: &str) -> FactoryResult<&Value> {
		self.get(name)
			.ok_or_else(|| FactoryError::AttributeNotFound(name.to_string()))
	}
}

impl IntoIterator for Attributes {
	type Item = (String, Value);
	type IntoIter = indexmap::map::IntoIter<String, Value>;

	fn into_iter(self) -> Self::IntoIter {
		self.values.into_iter()
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attributes {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut attributes = Attributes::new();
		for (name, value) in iter {
			attributes.insert(name, value);
		}
		attributes
	}
}

/// An object produced by a factory call.
pub struct Instance {
	type_name: &'static str,
	inner: Box<dyn Any + Send + Sync>,
}

impl Instance {
	/// Wraps a produced object.
	pub fn new<T: Any + Send + Sync>(object: T) -> Self {
		Self {
			type_name: type_name::<T>(),
			inner: Box::new(object),
		}
	}

	/// Returns the type name of the produced object.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Returns true if the produced object is of type `T`.
	pub fn is<T: Any>(&self) -> bool {
		self.inner.is::<T>()
	}

	/// Returns a reference to the object if it is of type `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.inner.downcast_ref::<T>()
	}

	/// Returns a mutable reference to the object if it is of type `T`.
	pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
		self.inner.downcast_mut::<T>()
	}

	/// Unwraps the object as `T`.
	pub fn downcast<T: Any>(self) -> FactoryResult<T> {
		let found = self.type_name;
		self.inner
			.downcast::<T>()
			.map(|object| *object)
			.map_err(|_| FactoryError::UnexpectedInstance {
				expected: type_name::<T>(),
				found,
			})
	}

	/// Converts the instance into a shareable attribute value.
	pub fn into_value(self) -> Value {
		Value::Object(ObjectValue {
			type_name: self.type_name,
			inner: Arc::from(self.inner),
		})
	}
}

impl fmt::Debug for Instance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Instance")
			.field("type_name", &self.type_name)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[derive(Debug, PartialEq)]
	struct Author {
		name: String,
	}

	#[rstest]
	fn test_insert_keeps_position_on_replace() {
		let mut attributes = Attributes::new().with("one", 1).with("two", 2);
		attributes.insert("one", "uno");

		assert_eq!(attributes.names().collect::<Vec<_>>(), vec!["one", "two"]);
		assert_eq!(attributes.get("one"), Some(&Value::from("uno")));
	}

	#[rstest]
	fn test_remove_preserves_order() {
		let mut attributes = Attributes::new().with("a", 1).with("b", 2).with("c", 3);
		attributes.remove("b");
		assert_eq!(attributes.names().collect::<Vec<_>>(), vec!["a", "c"]);
	}

	#[rstest]
	fn test_take_namespace_strips_prefix() {
		let mut attributes = Attributes::new()
			.with("tags", "x")
			.with("tags__count", 3)
			.with("title", "hello")
			.with("tags__prefix", "t-")
			.with("tagsuffix__x", 1);

		let namespace = attributes.take_namespace("tags");

		assert_eq!(namespace.names().collect::<Vec<_>>(), vec!["count", "prefix"]);
		assert_eq!(namespace.get("count"), Some(&Value::from(3)));
		assert_eq!(
			attributes.names().collect::<Vec<_>>(),
			vec!["tags", "title", "tagsuffix__x"]
		);
	}

	#[rstest]
	fn test_take_decodes_data() {
		let mut attributes = Attributes::new()
			.with("name", "alice")
			.with("tags", json!(["a", "b"]));

		let name: String = attributes.take("name").unwrap();
		let tags: Vec<String> = attributes.take("tags").unwrap();

		assert_eq!(name, "alice");
		assert_eq!(tags, vec!["a", "b"]);
		assert!(attributes.is_empty());
	}

	#[rstest]
	fn test_take_missing_attribute() {
		let mut attributes = Attributes::new();
		let err = attributes.take::<String>("missing").unwrap_err();
		assert!(matches!(err, FactoryError::AttributeNotFound(ref name) if name == "missing"));
	}

	#[rstest]
	fn test_take_opt_treats_null_as_missing() {
		let mut attributes = Attributes::new().with("one", Value::null()).with("two", 2);

		assert_eq!(attributes.take_opt::<i64>("one").unwrap(), None);
		assert_eq!(attributes.take_opt::<i64>("two").unwrap(), Some(2));
		assert_eq!(attributes.take_opt::<i64>("three").unwrap(), None);
	}

	#[rstest]
	fn test_take_invalid_value() {
		let mut attributes = Attributes::new().with("age", "not a number");
		let err = attributes.take::<u32>("age").unwrap_err();
		assert!(matches!(err, FactoryError::InvalidValue { ref name, .. } if name == "age"));
	}

	#[rstest]
	fn test_objects_are_shared_and_compared_by_identity() {
		let value = Value::object(Author {
			name: "ada".to_string(),
		});
		let copy = value.clone();
		let other = Value::object(Author {
			name: "ada".to_string(),
		});

		assert_eq!(value, copy);
		assert_ne!(value, other);
		assert_eq!(value.as_object::<Author>().unwrap().name, "ada");
		assert!(value.as_data().is_none());
	}

	#[rstest]
	fn test_take_object_and_type_mismatch() {
		let mut attributes = Attributes::new()
			.with(
				"author",
				Value::object(Author {
					name: "ada".to_string(),
				}),
			)
			.with("title", "notes");

		let author = attributes.take_object::<Author>("author").unwrap();
		assert_eq!(author.name, "ada");

		let err = attributes.take_object::<Author>("title").unwrap_err();
		assert!(matches!(err, FactoryError::TypeMismatch { ref name, .. } if name == "title"));
	}

	#[rstest]
	fn test_instance_downcast() {
		let mut instance = Instance::new(Author {
			name: "grace".to_string(),
		});
		assert!(instance.is::<Author>());
		instance.downcast_mut::<Author>().unwrap().name.push('!');

		let author = instance.downcast::<Author>().unwrap();
		assert_eq!(author.name, "grace!");
	}

	#[rstest]
	fn test_instance_downcast_mismatch() {
		let instance = Instance::new(42_u8);
		let err = instance.downcast::<String>().unwrap_err();
		assert!(matches!(err, FactoryError::UnexpectedInstance { found: "u8", .. }));
	}

	#[rstest]
	fn test_instance_into_value() {
		let value = Instance::new(Author {
			name: "linus".to_string(),
		})
		.into_value();
		assert_eq!(value.as_object::<Author>().unwrap().name, "linus");
		assert_eq!(format!("{:?}", value), format!("<{}>", type_name::<Author>()));
	}

	#[rstest]
	fn test_option_conversion() {
		assert!(Value::from(None::<i64>).is_null());
		assert_eq!(Value::from(Some("x")).as_str(), Some("x"));
	}

	#[rstest]
	fn test_collect_attributes() {
		let attributes: Attributes = vec![("a", 1), ("b", 2)].into_iter().collect();
		assert_eq!(attributes.len(), 2);
		assert_eq!(attributes.get_as::<i64>("b").unwrap(), 2);
	}
}
