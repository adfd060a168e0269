//! Attribute declarations.
//!
//! A [`Declaration`] is the recipe of a single attribute. Immediate
//! declarations are resolved before the object is constructed, in declaration
//! order; [`Declaration::PostGeneration`] is deferred until the object exists.
//!
//! # Example
//!
//! ```ignore
//! use reinhardt_factory::prelude::*;
//!
//! let users = Factory::builder("UserFactory")
//!     .model::<User>()
//!     .sequence("username", |n| format!("user{}", n))
//!     .lazy("email", |ctx| {
//!         Ok(format!("{}@example.com", ctx.get_as::<String>("username")?))
//!     })
//!     .attr("is_active", true)
//!     .define()?;
//! ```

mod merge;

pub use merge::{DeclarationSet, merge_declarations};

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;

use crate::context::ResolutionContext;
use crate::error::{FactoryError, FactoryResult};
use crate::factory::Factory;
use crate::post_generation::{PostGeneration, PostGenerationArgs};
use crate::value::{Instance, Value};

/// Recipe of a sequence declaration.
pub type SequenceFn = Arc<dyn Fn(i64) -> FactoryResult<Value> + Send + Sync>;

/// Recipe of a lazy declaration.
pub type LazyFn = Arc<dyn Fn(&ResolutionContext<'_>) -> FactoryResult<Value> + Send + Sync>;

/// Recipe of a single attribute.
#[derive(Clone)]
pub enum Declaration {
	/// A fixed value, cloned on every call.
	Literal(Value),
	/// A function of the call's sequence value.
	Sequence(SequenceFn),
	/// A function of the attributes resolved before this one.
	LazyAttribute(LazyFn),
	/// An object produced by another factory with the same strategy.
	SubFactory(SubFactory),
	/// Values handed out in turn, wrapping around at the end.
	Cycle(Cycle),
	/// A hook run after the object has been produced.
	PostGeneration(PostGeneration),
}

impl Declaration {
	/// A fixed value.
	pub fn literal(value: impl Into<Value>) -> Self {
		Self::Literal(value.into())
	}

	/// A value computed from the call's sequence value.
	pub fn sequence<F, V>(recipe: F) -> Self
	where
		F: Fn(i64) -> V + Send + Sync + 'static,
		V: Into<Value>,
	{
		Self::Sequence(Arc::new(move |n: i64| Ok(recipe(n).into())))
	}

	/// A value computed from previously resolved attributes.
	pub fn lazy<F, V>(recipe: F) -> Self
	where
		F: Fn(&ResolutionContext<'_>) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		Self::LazyAttribute(Arc::new(move |ctx: &ResolutionContext<'_>| {
			recipe(ctx).map(Into::into)
		}))
	}

	/// A lazy value that also receives the call's sequence value.
	pub fn lazy_sequence<F, V>(recipe: F) -> Self
	where
		F: Fn(&ResolutionContext<'_>, i64) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		Self::lazy(move |ctx: &ResolutionContext<'_>| recipe(ctx, ctx.sequence()))
	}

	/// A copy of a previously resolved attribute.
	pub fn self_attribute(name: impl Into<String>) -> Self {
		let name = name.into();
		Self::lazy(move |ctx: &ResolutionContext<'_>| ctx.get(&name).cloned())
	}

	/// An object produced by `factory`.
	pub fn sub_factory(factory: &Arc<Factory>) -> Self {
		Self::SubFactory(SubFactory::new(factory))
	}

	/// Values handed out in turn.
	pub fn cycle<I, V>(values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<Value>,
	{
		Self::Cycle(Cycle::new(values))
	}

	/// A hook run after the object has been produced.
	pub fn post_generation<F>(hook: F) -> Self
	where
		F: Fn(&mut Instance, &PostGenerationArgs) -> FactoryResult<()> + Send + Sync + 'static,
	{
		Self::PostGeneration(PostGeneration::new(hook))
	}

	/// Short name of the variant, used in logs.
	pub fn kind(&self) -> &'static str {
		match self {
			Self::Literal(_) => "literal",
			Self::Sequence(_) => "sequence",
			Self::LazyAttribute(_) => "lazy_attribute",
			Self::SubFactory(_) => "sub_factory",
			Self::Cycle(_) => "cycle",
			Self::PostGeneration(_) => "post_generation",
		}
	}

	/// Returns true for deferred declarations.
	pub fn is_post_generation(&self) -> bool {
		matches!(self, Self::PostGeneration(_))
	}

	/// Returns true if `outer__inner` names are parameters of this declaration.
	pub(crate) fn owns_parameters(&self) -> bool {
		matches!(self, Self::PostGeneration(_) | Self::SubFactory(_))
	}
}

impl fmt::Debug for Declaration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
			Self::SubFactory(sub) => f.debug_tuple("SubFactory").field(sub).finish(),
			Self::Cycle(cycle) => f.debug_tuple("Cycle").field(cycle).finish(),
			other => write!(f, "{}", other.kind()),
		}
	}
}

impl From<PostGeneration> for Declaration {
	fn from(declaration: PostGeneration) -> Self {
		Self::PostGeneration(declaration)
	}
}

impl From<SubFactory> for Declaration {
	fn from(declaration: SubFactory) -> Self {
		Self::SubFactory(declaration)
	}
}

/// Reference to another factory, with default declarations for the nested call.
#[derive(Clone)]
pub struct SubFactory {
	factory: Arc<Factory>,
	defaults: IndexMap<String, Declaration>,
}

impl SubFactory {
	/// Creates a reference to `factory`.
	pub fn new(factory: &Arc<Factory>) -> Self {
		Self {
			factory: Arc::clone(factory),
			defaults: IndexMap::new(),
		}
	}

	/// Adds a declaration for the nested call, replacing the nested factory's
	/// declaration of the same name.
	pub fn with(mut self, name: impl Into<String>, declaration: Declaration) -> Self {
		self.defaults.insert(name.into(), declaration);
		self
	}

	/// Adds a fixed value for the nested call.
	pub fn with_value(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.with(name, Declaration::literal(value))
	}

	/// The referenced factory.
	pub fn factory(&self) -> &Arc<Factory> {
		&self.factory
	}

	/// Declarations added for the nested call.
	pub fn defaults(&self) -> &IndexMap<String, Declaration> {
		&self.defaults
	}
}

impl fmt::Debug for SubFactory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SubFactory")
			.field("factory", &self.factory.name())
			.field("defaults", &self.defaults.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// Values handed out in turn.
///
/// The position is shared by every clone, so a factory and its subclasses
/// walk the same cycle.
#[derive(Clone)]
pub struct Cycle {
	values: Arc<[Value]>,
	position: Arc<AtomicUsize>,
}

impl Cycle {
	/// Creates a cycle over `values`.
	pub fn new<I, V>(values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<Value>,
	{
		Self {
			values: values.into_iter().map(Into::into).collect(),
			position: Arc::new(AtomicUsize::new(0)),
		}
	}

	pub(crate) fn next_value(&self, name: &str) -> FactoryResult<Value> {
		if self.values.is_empty() {
			return Err(FactoryError::EmptyCycle(name.to_string()));
		}
		let index = self.position.fetch_add(1, Ordering::SeqCst) % self.values.len();
		Ok(self.values[index].clone())
	}
}

impl fmt::Debug for Cycle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Cycle")
			.field("values", &self.values)
			.field("position", &self.position.load(Ordering::SeqCst))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::strategy::Strategy;
	use crate::value::Attributes;
	use rstest::rstest;

	fn resolve_plain(declaration: &Declaration, ctx: &ResolutionContext<'_>) -> Value {
		match declaration {
			Declaration::Literal(value) => value.clone(),
			Declaration::Sequence(recipe) => recipe(ctx.sequence()).unwrap(),
			Declaration::LazyAttribute(recipe) => recipe(ctx).unwrap(),
			Declaration::Cycle(cycle) => cycle.next_value("test").unwrap(),
			other => panic!("unexpected declaration {:?}", other),
		}
	}

	#[rstest]
	fn test_literal_and_sequence() {
		let resolved = Attributes::new();
		let ctx = ResolutionContext::new("F", &resolved, 4, Strategy::Build);

		let literal = Declaration::literal("fixed");
		let sequence = Declaration::sequence(|n| format!("user{}", n));

		assert_eq!(resolve_plain(&literal, &ctx), Value::from("fixed"));
		assert_eq!(resolve_plain(&sequence, &ctx), Value::from("user4"));
	}

	#[rstest]
	fn test_lazy_reads_context() {
		let resolved = Attributes::new().with("username", "ada");
		let ctx = ResolutionContext::new("F", &resolved, 0, Strategy::Build);

		let email = Declaration::lazy(|ctx| {
			Ok(format!("{}@example.com", ctx.get_as::<String>("username")?))
		});
		let copy = Declaration::self_attribute("username");
		let numbered = Declaration::lazy_sequence(|ctx, n| {
			Ok(format!("{}-{}", ctx.get_as::<String>("username")?, n))
		});

		assert_eq!(resolve_plain(&email, &ctx), Value::from("ada@example.com"));
		assert_eq!(resolve_plain(&copy, &ctx), Value::from("ada"));
		assert_eq!(resolve_plain(&numbered, &ctx), Value::from("ada-0"));
	}

	#[rstest]
	fn test_lazy_propagates_missing_attribute() {
		let resolved = Attributes::new();
		let ctx = ResolutionContext::new("F", &resolved, 0, Strategy::Build);
		let declaration = Declaration::lazy(|ctx| ctx.get_as::<String>("does_not_exist"));

		let Declaration::LazyAttribute(recipe) = declaration else {
			panic!("expected a lazy attribute");
		};
		let err = recipe(&ctx).unwrap_err();
		assert!(matches!(err, FactoryError::AttributeNotFound(_)));
	}

	#[rstest]
	fn test_cycle_wraps_around_and_is_shared_by_clones() {
		let cycle = Cycle::new(["red", "green"]);
		let clone = cycle.clone();

		assert_eq!(cycle.next_value("color").unwrap(), Value::from("red"));
		assert_eq!(clone.next_value("color").unwrap(), Value::from("green"));
		assert_eq!(cycle.next_value("color").unwrap(), Value::from("red"));
	}

	#[rstest]
	fn test_empty_cycle_fails() {
		let cycle = Cycle::new(Vec::<Value>::new());
		let err = cycle.next_value("color").unwrap_err();
		assert!(matches!(err, FactoryError::EmptyCycle(ref name) if name == "color"));
	}

	#[rstest]
	fn test_kind_and_post_generation_flag() {
		let declaration: Declaration = PostGeneration::noop().into();
		assert!(declaration.is_post_generation());
		assert!(declaration.owns_parameters());
		assert_eq!(declaration.kind(), "post_generation");
		assert!(!Declaration::literal(1).is_post_generation());
		assert!(!Declaration::literal(1).owns_parameters());
	}
}
