//! Model contract consumed by factories.

use std::any::{Any, TypeId};
use std::fmt;

use crate::error::FactoryResult;
use crate::value::{Attributes, Instance};

/// A type factories can produce.
///
/// # Example
///
/// ```ignore
/// struct User {
///     id: Option<i64>,
///     username: String,
/// }
///
/// impl Model for User {
///     fn from_attributes(mut attributes: Attributes) -> FactoryResult<Self> {
///         Ok(Self {
///             id: None,
///             username: attributes.take("username")?,
///         })
///     }
///
///     fn create(attributes: Attributes) -> FactoryResult<Self> {
///         let mut user = Self::from_attributes(attributes)?;
///         user.id = Some(database::insert(&user)?);
///         Ok(user)
///     }
/// }
/// ```
pub trait Model: Any + Send + Sync + Sized {
	/// Name shown when displaying factories of this model.
	fn model_name() -> &'static str {
		let full = std::any::type_name::<Self>();
		full.rsplit("::").next().unwrap_or(full)
	}

	/// Constructs an instance from resolved attributes (build strategy).
	fn from_attributes(attributes: Attributes) -> FactoryResult<Self>;

	/// Constructs and persists an instance (create strategy).
	///
	/// Defaults to [`from_attributes`](Self::from_attributes).
	fn create(attributes: Attributes) -> FactoryResult<Self> {
		Self::from_attributes(attributes)
	}
}

/// Type-erased model of a factory.
#[derive(Clone, Copy)]
pub struct Target {
	name: &'static str,
	type_id: TypeId,
	build: fn(Attributes) -> FactoryResult<Instance>,
	create: fn(Attributes) -> FactoryResult<Instance>,
}

impl Target {
	/// Describes model `M`.
	pub fn of<M: Model>() -> Self {
		Self {
			name: M::model_name(),
			type_id: TypeId::of::<M>(),
			build: build_model::<M>,
			create: create_model::<M>,
		}
	}

	/// Display name of the model.
	pub fn name(&self) -> &'static str {
		self.name
	}

	/// Type id of the model.
	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	/// Returns true if the model is `M`.
	pub fn is<M: Any>(&self) -> bool {
		self.type_id == TypeId::of::<M>()
	}

	/// Constructs an instance without persisting it.
	pub fn build(&self, attributes: Attributes) -> FactoryResult<Instance> {
		(self.build)(attributes)
	}

	/// Constructs an instance through the model's persistence hook.
	pub fn create(&self, attributes: Attributes) -> FactoryResult<Instance> {
		(self.create)(attributes)
	}
}

impl PartialEq for Target {
	fn eq(&self, other: &Self) -> bool {
		self.type_id == other.type_id
	}
}

impl Eq for Target {}

impl fmt::Debug for Target {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Target").field(&self.name).finish()
	}
}

fn build_model<M: Model>(attributes: Attributes) -> FactoryResult<Instance> {
	M::from_attributes(attributes).map(Instance::new)
}

fn create_model<M: Model>(attributes: Attributes) -> FactoryResult<Instance> {
	M::create(attributes).map(Instance::new)
}
