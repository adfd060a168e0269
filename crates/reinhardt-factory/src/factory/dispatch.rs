//! Turns resolved attributes into an object according to the strategy.

use super::definition::Factory;
use crate::error::{FactoryError, FactoryResult};
use crate::strategy::Strategy;
use crate::stub::Stub;
use crate::value::{Attributes, Instance};

pub(crate) fn dispatch(
	factory: &Factory,
	strategy: Strategy,
	mut attributes: Attributes,
) -> FactoryResult<Instance> {
	if strategy == Strategy::Stub {
		return Ok(Instance::new(Stub::new(factory.name(), attributes)));
	}

	let target = factory
		.target()
		.ok_or_else(|| FactoryError::AssociatedClass {
			factory: factory.name().to_string(),
		})?;

	if let Some(prepare) = factory.prepare_hook() {
		prepare(&mut attributes, strategy)?;
	}

	match strategy {
		Strategy::Create => match factory.create_hook() {
			Some(hook) => hook(target, attributes),
			None => target.create(attributes),
		},
		_ => target.build(attributes),
	}
}
