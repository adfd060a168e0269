//! Factory definitions and their builder.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::call::FactoryCall;
use super::model::{Model, Target};
use super::registry;
use crate::context::ResolutionContext;
use crate::declarations::{Declaration, DeclarationSet, merge_declarations};
use crate::error::{FactoryError, FactoryResult};
use crate::post_generation::PostGeneration;
use crate::sequence::SequenceCounter;
use crate::strategy::Strategy;
use crate::value::{Attributes, Instance, Value};

/// Creation hook replacing [`Model::create`] for the create strategy.
pub type CreateHook = Arc<dyn Fn(&Target, Attributes) -> FactoryResult<Instance> + Send + Sync>;

/// Hook adjusting resolved attributes before the model is constructed.
pub type PrepareHook = Arc<dyn Fn(&mut Attributes, Strategy) -> FactoryResult<()> + Send + Sync>;

static BASE_FACTORY: Lazy<Arc<Factory>> =
	Lazy::new(|| Factory::root("Factory", Strategy::Create.as_str(), true));

static STUB_BASE_FACTORY: Lazy<Arc<Factory>> =
	Lazy::new(|| Factory::root("StubFactory", Strategy::Stub.as_str(), true));

fn is_stub_strategy(name: &str) -> bool {
	name.parse::<Strategy>()
		.is_ok_and(|strategy| strategy == Strategy::Stub)
}

/// A factory definition.
///
/// Definitions are created with a [`FactoryBuilder`] and shared behind an
/// [`Arc`]. Apart from the default strategy they are immutable once defined.
///
/// # Example
///
/// ```ignore
/// use reinhardt_factory::prelude::*;
///
/// let users = Factory::builder("UserFactory")
///     .model::<User>()
///     .sequence("username", |n| format!("user{}", n))
///     .define()?;
///
/// let admins = users
///     .extend("AdminFactory")
///     .attr("is_staff", true)
///     .define()?;
///
/// let admin: User = admins.call().set("username", "root").build()?.downcast()?;
/// ```
pub struct Factory {
	name: String,
	target: Option<Target>,
	is_abstract: bool,
	is_root: bool,
	strategy: RwLock<String>,
	strategy_locked: bool,
	declarations: IndexMap<String, Declaration>,
	declaration_set: DeclarationSet,
	sequence: Arc<SequenceCounter>,
	create_hook: Option<CreateHook>,
	prepare_hook: Option<PrepareHook>,
	registers: bool,
}

impl Factory {
	/// Creates an abstract root definition.
	pub(crate) fn root(name: &str, strategy: &str, registers: bool) -> Arc<Self> {
		Arc::new(Self {
			name: name.to_string(),
			target: None,
			is_abstract: true,
			is_root: true,
			strategy: RwLock::new(strategy.to_string()),
			strategy_locked: is_stub_strategy(strategy),
			declarations: IndexMap::new(),
			declaration_set: DeclarationSet::default(),
			sequence: Arc::new(SequenceCounter::new()),
			create_hook: None,
			prepare_hook: None,
			registers,
		})
	}

	/// The engine's base factory. Abstract; its default strategy is create.
	pub fn base() -> Arc<Factory> {
		Arc::clone(&BASE_FACTORY)
	}

	/// The engine's stub-only base factory. Abstract; locked to the stub strategy.
	pub fn stub_base() -> Arc<Factory> {
		Arc::clone(&STUB_BASE_FACTORY)
	}

	/// Starts a definition derived from [`Factory::base`].
	///
	/// The definition is added to the global registry when defined. Use
	/// [`FactorySettings::builder`](crate::settings::FactorySettings::builder)
	/// with registration disabled for short-lived factories.
	pub fn builder(name: impl Into<String>) -> FactoryBuilder {
		FactoryBuilder::new(name, Self::base())
	}

	/// Starts a definition derived from [`Factory::stub_base`].
	pub fn stub_builder(name: impl Into<String>) -> FactoryBuilder {
		FactoryBuilder::new(name, Self::stub_base())
	}

	/// Starts a definition derived from this one.
	pub fn extend(self: &Arc<Self>, name: impl Into<String>) -> FactoryBuilder {
		FactoryBuilder::new(name, Arc::clone(self))
	}

	/// Name of the factory.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Model of the factory, if any.
	pub fn target(&self) -> Option<&Target> {
		self.target.as_ref()
	}

	/// Returns true if the factory cannot be invoked.
	pub fn is_abstract(&self) -> bool {
		self.is_abstract
	}

	/// Default strategy of the factory.
	///
	/// The strategy is stored by name; an unknown name is reported here, when
	/// the factory is invoked, rather than when it is defined.
	pub fn strategy(&self) -> FactoryResult<Strategy> {
		self.strategy.read().parse()
	}

	/// Name of the default strategy, as assigned.
	pub fn strategy_name(&self) -> String {
		self.strategy.read().clone()
	}

	/// Returns true if the factory only supports the stub strategy.
	pub fn is_strategy_locked(&self) -> bool {
		self.strategy_locked
	}

	/// Reassigns the default strategy.
	///
	/// A stub-only factory accepts the assignment but rejects persisting
	/// strategies when it is invoked.
	pub fn use_strategy(&self, strategy: Strategy) {
		self.use_strategy_named(strategy.as_str());
	}

	/// Reassigns the default strategy by name, without validating it.
	pub fn use_strategy_named(&self, strategy: impl Into<String>) {
		let strategy = strategy.into();
		if self.strategy_locked && !is_stub_strategy(&strategy) {
			tracing::warn!(
				factory = %self.name,
				strategy = %strategy,
				"stub-only factory assigned a non-stub strategy; invocations will fail"
			);
		} else {
			tracing::debug!(factory = %self.name, strategy = %strategy, "default strategy reassigned");
		}
		*self.strategy.write() = strategy;
	}

	/// All declarations, merged with the parent's, in declaration order.
	pub fn declarations(&self) -> &IndexMap<String, Declaration> {
		&self.declarations
	}

	/// Declarations partitioned into attributes, post-generation declarations
	/// and parameters.
	pub fn declaration_set(&self) -> &DeclarationSet {
		&self.declaration_set
	}

	/// Sequence counter of the factory's hierarchy.
	pub fn sequence(&self) -> &Arc<SequenceCounter> {
		&self.sequence
	}

	/// Returns true if both factories draw from the same sequence counter.
	pub fn shares_sequence_with(&self, other: &Factory) -> bool {
		Arc::ptr_eq(&self.sequence, &other.sequence)
	}

	pub(crate) fn create_hook(&self) -> Option<&CreateHook> {
		self.create_hook.as_ref()
	}

	pub(crate) fn prepare_hook(&self) -> Option<&PrepareHook> {
		self.prepare_hook.as_ref()
	}

	/// Starts a call of this factory.
	pub fn call(&self) -> FactoryCall<'_> {
		FactoryCall::new(self)
	}

	/// Generates an instance with the default strategy.
	pub fn generate(&self) -> FactoryResult<Instance> {
		self.call().generate()
	}

	/// Generates an instance with the build strategy.
	pub fn build(&self) -> FactoryResult<Instance> {
		self.call().build()
	}

	/// Generates an instance with the create strategy.
	pub fn create(&self) -> FactoryResult<Instance> {
		self.call().create()
	}

	/// Generates a stub.
	pub fn stub(&self) -> FactoryResult<Instance> {
		self.call().stub()
	}

	/// Generates `count` instances with `strategy`.
	pub fn generate_batch(&self, strategy: Strategy, count: usize) -> FactoryResult<Vec<Instance>> {
		self.call().strategy(strategy).generate_batch(count)
	}

	/// Generates `count` instances with the build strategy.
	pub fn build_batch(&self, count: usize) -> FactoryResult<Vec<Instance>> {
		self.generate_batch(Strategy::Build, count)
	}

	/// Generates `count` instances with the create strategy.
	pub fn create_batch(&self, count: usize) -> FactoryResult<Vec<Instance>> {
		self.generate_batch(Strategy::Create, count)
	}

	/// Generates `count` stubs.
	pub fn stub_batch(&self, count: usize) -> FactoryResult<Vec<Instance>> {
		self.generate_batch(Strategy::Stub, count)
	}
}

impl fmt::Display for Factory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.target {
			Some(target) => write!(f, "<{} for {}>", self.name, target.name()),
			None => write!(f, "<{}>", self.name),
		}
	}
}

impl fmt::Debug for Factory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Factory")
			.field("name", &self.name)
			.field("target", &self.target)
			.field("is_abstract", &self.is_abstract)
			.field("strategy", &*self.strategy.read())
			.field("strategy_locked", &self.strategy_locked)
			.field("declarations", &self.declarations.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

/// Builder of a [`Factory`] definition.
///
/// Everything not set on the builder is inherited from the parent definition:
/// model, default strategy, hooks and declarations.
pub struct FactoryBuilder {
	name: String,
	parent: Arc<Factory>,
	target: Option<Target>,
	is_abstract: bool,
	strategy: Option<String>,
	declarations: IndexMap<String, Declaration>,
	create_hook: Option<CreateHook>,
	prepare_hook: Option<PrepareHook>,
}

impl FactoryBuilder {
	pub(crate) fn new(name: impl Into<String>, parent: Arc<Factory>) -> Self {
		Self {
			name: name.into(),
			parent,
			target: None,
			is_abstract: false,
			strategy: None,
			declarations: IndexMap::new(),
			create_hook: None,
			prepare_hook: None,
		}
	}

	/// Sets the model produced by the factory.
	pub fn model<M: Model>(self) -> Self {
		self.target(Target::of::<M>())
	}

	/// Sets the model produced by the factory from a type-erased target.
	pub fn target(mut self, target: Target) -> Self {
		self.target = Some(target);
		self
	}

	/// Marks the factory abstract: it may be extended but not invoked.
	pub fn abstract_factory(mut self) -> Self {
		self.is_abstract = true;
		self
	}

	/// Sets the default strategy.
	pub fn strategy(self, strategy: Strategy) -> Self {
		self.strategy_named(strategy.as_str())
	}

	/// Sets the default strategy by name. The name is validated on invocation.
	pub fn strategy_named(mut self, strategy: impl Into<String>) -> Self {
		self.strategy = Some(strategy.into());
		self
	}

	/// Declares an attribute.
	pub fn declare(mut self, name: impl Into<String>, declaration: Declaration) -> Self {
		self.declarations.insert(name.into(), declaration);
		self
	}

	/// Declares a fixed attribute value.
	pub fn attr(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.declare(name, Declaration::literal(value))
	}

	/// Declares an attribute computed from the sequence value.
	pub fn sequence<F, V>(self, name: impl Into<String>, recipe: F) -> Self
	where
		F: Fn(i64) -> V + Send + Sync + 'static,
		V: Into<Value>,
	{
		self.declare(name, Declaration::sequence(recipe))
	}

	/// Declares an attribute computed from previously declared attributes.
	pub fn lazy<F, V>(self, name: impl Into<String>, recipe: F) -> Self
	where
		F: Fn(&ResolutionContext<'_>) -> FactoryResult<V> + Send + Sync + 'static,
		V: Into<Value>,
	{
		self.declare(name, Declaration::lazy(recipe))
	}

	/// Declares an attribute produced by another factory.
	pub fn sub_factory(self, name: impl Into<String>, factory: &Arc<Factory>) -> Self {
		self.declare(name, Declaration::sub_factory(factory))
	}

	/// Declares a post-generation hook.
	pub fn post_generation(self, name: impl Into<String>, declaration: PostGeneration) -> Self {
		self.declare(name, Declaration::PostGeneration(declaration))
	}

	/// Replaces the model's create hook for the create strategy.
	pub fn create_hook<F>(mut self, hook: F) -> Self
	where
		F: Fn(&Target, Attributes) -> FactoryResult<Instance> + Send + Sync + 'static,
	{
		self.create_hook = Some(Arc::new(hook));
		self
	}

	/// Adjusts resolved attributes before the model is constructed.
	///
	/// The hook runs for the build and create strategies, not for stubs.
	pub fn prepare_hook<F>(mut self, hook: F) -> Self
	where
		F: Fn(&mut Attributes, Strategy) -> FactoryResult<()> + Send + Sync + 'static,
	{
		self.prepare_hook = Some(Arc::new(hook));
		self
	}

	/// Validates and registers the definition.
	///
	/// # Errors
	///
	/// Returns [`FactoryError::AssociatedClass`] if the factory is concrete,
	/// not stub-only, and neither it nor its parents declare a model.
	pub fn define(self) -> FactoryResult<Arc<Factory>> {
		let parent = self.parent;
		let target = self.target.or(parent.target);
		let strategy = self.strategy.unwrap_or_else(|| parent.strategy_name());
		let strategy_locked = parent.strategy_locked || is_stub_strategy(&strategy);

		if !self.is_abstract && !strategy_locked && target.is_none() {
			return Err(FactoryError::AssociatedClass { factory: self.name });
		}

		let sequence = if !parent.is_root && parent.target == target {
			Arc::clone(&parent.sequence)
		} else {
			Arc::new(SequenceCounter::new())
		};

		let declarations = merge_declarations(&parent.declarations, &self.declarations);
		let declaration_set = DeclarationSet::partition(&declarations);

		let factory = Arc::new(Factory {
			name: self.name,
			target,
			is_abstract: self.is_abstract,
			is_root: false,
			strategy: RwLock::new(strategy),
			strategy_locked,
			declarations,
			declaration_set,
			sequence,
			create_hook: self.create_hook.or_else(|| parent.create_hook.clone()),
			prepare_hook: self.prepare_hook.or_else(|| parent.prepare_hook.clone()),
			registers: parent.registers,
		});

		tracing::debug!(
			factory = %factory.name,
			parent = %parent.name,
			attributes = factory.declaration_set.attributes().len(),
			post_generation = factory.declaration_set.post_generation().len(),
			"factory defined"
		);

		if factory.registers {
			registry::register_factory(Arc::clone(&factory));
		}

		Ok(factory)
	}
}

impl fmt::Debug for FactoryBuilder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FactoryBuilder")
			.field("name", &self.name)
			.field("parent", &self.parent.name)
			.field("target", &self.target)
			.field("declarations", &self.declarations.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[derive(Debug)]
	struct Note {
		body: String,
	}

	impl Model for Note {
		fn from_attributes(mut attributes: Attributes) -> FactoryResult<Self> {
			Ok(Self {
				body: attributes.take("body")?,
			})
		}
	}

	#[rstest]
	fn test_base_factories_are_abstract() {
		assert!(Factory::base().is_abstract());
		assert!(Factory::stub_base().is_abstract());
		assert!(Factory::stub_base().is_strategy_locked());
		assert!(!Factory::base().is_strategy_locked());
	}

	#[rstest]
	fn test_define_inherits_model_and_strategy() {
		let parent = Factory::builder("definition::NoteFactory")
			.model::<Note>()
			.strategy(Strategy::Build)
			.attr("body", "text")
			.define()
			.unwrap();
		let child = parent.extend("definition::ChildNoteFactory").define().unwrap();

		assert!(child.target().unwrap().is::<Note>());
		assert_eq!(child.strategy().unwrap(), Strategy::Build);
		assert!(child.shares_sequence_with(&parent));
		assert!(child.declaration_set().has_attribute("body"));
	}

	#[rstest]
	fn test_first_level_factories_get_their_own_counter() {
		let first = Factory::builder("definition::FirstNoteFactory")
			.model::<Note>()
			.define()
			.unwrap();
		let second = Factory::builder("definition::SecondNoteFactory")
			.model::<Note>()
			.define()
			.unwrap();

		assert!(!first.shares_sequence_with(&second));
	}

	#[rstest]
	fn test_abstract_parent_does_not_share_counter_with_concrete_child() {
		let parent = Factory::builder("definition::AbstractNoteFactory")
			.abstract_factory()
			.define()
			.unwrap();
		let child = parent
			.extend("definition::ConcreteNoteFactory")
			.model::<Note>()
			.define()
			.unwrap();

		assert!(parent.is_abstract());
		assert!(!child.is_abstract());
		assert!(!child.shares_sequence_with(&parent));
	}

	#[rstest]
	fn test_display_names_factory_and_model() {
		let factory = Factory::builder("definition::DisplayNoteFactory")
			.model::<Note>()
			.define()
			.unwrap();
		assert_eq!(factory.to_string(), "<definition::DisplayNoteFactory for Note>");
		assert_eq!(Factory::base().to_string(), "<Factory>");
	}

	#[rstest]
	fn test_use_strategy_named_is_validated_lazily() {
		let factory = Factory::builder("definition::LazyStrategyNoteFactory")
			.model::<Note>()
			.define()
			.unwrap();
		factory.use_strategy_named("bogus");

		assert_eq!(factory.strategy_name(), "bogus");
		assert!(matches!(factory.strategy(), Err(FactoryError::UnknownStrategy(_))));
	}
}
