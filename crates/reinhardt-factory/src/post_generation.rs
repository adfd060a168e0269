//! Post-generation declarations and their executor.
//!
//! A post-generation declaration runs after the primary object has been
//! produced. It receives the object, the active strategy and its own
//! arguments, gathered from the call's keyword arguments:
//!
//! - `name=value` becomes [`PostGenerationArgs::extracted`];
//! - `name__param=value` becomes parameter `param`.
//!
//! Parameters may also be declared on the factory itself (`name__param` as a
//! declaration); call-time values replace declared ones.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::error::{FactoryError, FactoryResult};
use crate::strategy::Strategy;
use crate::value::{Attributes, Instance, Value};

/// Hook signature of a post-generation declaration.
pub type PostGenerationFn =
	Arc<dyn Fn(&mut Instance, &PostGenerationArgs) -> FactoryResult<()> + Send + Sync>;

/// A deferred action executed on the produced object.
#[derive(Clone)]
pub struct PostGeneration {
	hook: PostGenerationFn,
}

impl PostGeneration {
	/// Creates a declaration from a hook over the type-erased instance.
	pub fn new<F>(hook: F) -> Self
	where
		F: Fn(&mut Instance, &PostGenerationArgs) -> FactoryResult<()> + Send + Sync + 'static,
	{
		Self {
			hook: Arc::new(hook),
		}
	}

	/// Creates a declaration from a hook over the model type `T`.
	///
	/// Stub products carry no model, so the hook is skipped for them. Any other
	/// instance that is not a `T` is reported as
	/// [`FactoryError::UnexpectedInstance`].
	pub fn for_model<T, F>(hook: F) -> Self
	where
		T: Any,
		F: Fn(&mut T, &PostGenerationArgs) -> FactoryResult<()> + Send + Sync + 'static,
	{
		Self::new(
			move |instance: &mut Instance, args: &PostGenerationArgs| match instance
				.downcast_mut::<T>()
			{
				Some(model) => hook(model, args),
				None if args.strategy() == Strategy::Stub => Ok(()),
				None => Err(FactoryError::UnexpectedInstance {
					expected: type_name::<T>(),
					found: instance.type_name(),
				}),
			},
		)
	}

	/// A declaration that does nothing; useful as a parameter holder.
	pub fn noop() -> Self {
		Self::new(|_: &mut Instance, _: &PostGenerationArgs| Ok(()))
	}

	pub(crate) fn call(&self, instance: &mut Instance, args: &PostGenerationArgs) -> FactoryResult<()> {
		(self.hook)(instance, args)
	}
}

impl Default for PostGeneration {
	fn default() -> Self {
		Self::noop()
	}
}

impl fmt::Debug for PostGeneration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PostGeneration").finish_non_exhaustive()
	}
}

/// Arguments passed to a post-generation hook.
#[derive(Debug, Clone)]
pub struct PostGenerationArgs {
	name: String,
	strategy: Strategy,
	extracted: Option<Value>,
	params: Attributes,
}

impl PostGenerationArgs {
	pub(crate) fn new(
		name: impl Into<String>,
		strategy: Strategy,
		extracted: Option<Value>,
		params: Attributes,
	) -> Self {
		Self {
			name: name.into(),
			strategy,
			extracted,
			params,
		}
	}

	/// Name of the declaration.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Strategy of the call that produced the object.
	pub fn strategy(&self) -> Strategy {
		self.strategy
	}

	/// Returns true if the object was produced by the create strategy.
	pub fn create(&self) -> bool {
		self.strategy.persists()
	}

	/// Value passed under the declaration's own name, if any.
	pub fn extracted(&self) -> Option<&Value> {
		self.extracted.as_ref()
	}

	/// Namespaced parameters (`name__param`), keyed by `param`.
	pub fn params(&self) -> &Attributes {
		&self.params
	}

	/// Returns a single parameter.
	pub fn param(&self, name: &str) -> Option<&Value> {
		self.params.get(name)
	}
}

/// Removes the arguments addressed to the post-generation declaration `name`
/// from the call's keyword arguments.
///
/// Returns the value passed as `name` itself and the `name__param` values
/// keyed by `param`.
pub(crate) fn extract_arguments(name: &str, kwargs: &mut Attributes) -> (Option<Value>, Attributes) {
	let extracted = kwargs.remove(name);
	let params = kwargs.take_namespace(name);
	(extracted, params)
}

/// A post-generation declaration ready to run, with its arguments.
#[derive(Debug)]
pub(crate) struct PendingPostGeneration {
	pub(crate) declaration: PostGeneration,
	pub(crate) args: PostGenerationArgs,
}

/// Runs pending declarations against `instance`, in order.
///
/// The first failure aborts the call and is returned unchanged.
pub(crate) fn execute(
	factory: &str,
	instance: &mut Instance,
	pending: Vec<PendingPostGeneration>,
) -> FactoryResult<()> {
	for PendingPostGeneration { declaration, args } in pending {
		tracing::trace!(
			factory = %factory,
			declaration = %args.name(),
			strategy = %args.strategy(),
			"running post-generation declaration"
		);
		declaration.call(instance, &args)?;
	}
	Ok(())
}
