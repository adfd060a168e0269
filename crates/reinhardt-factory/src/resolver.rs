//! Attribute resolution for a single factory call.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::context::ResolutionContext;
use crate::declarations::{Declaration, DeclarationSet, SubFactory, merge_declarations};
use crate::error::{FactoryError, FactoryResult};
use crate::factory::Factory;
use crate::post_generation::{PendingPostGeneration, PostGenerationArgs, extract_arguments};
use crate::strategy::Strategy;
use crate::value::{Attributes, Instance, NAMESPACE_SEPARATOR, Value};

/// Outcome of resolving a call: constructor attributes and deferred hooks.
#[derive(Debug)]
pub(crate) struct Resolution {
	pub(crate) attributes: Attributes,
	pub(crate) post_generation: Vec<PendingPostGeneration>,
	pub(crate) sequence: i64,
}

/// Resolves the attributes of one call of `factory`.
///
/// `extra` declarations are merged over the factory's for this call only.
/// The factory's counter is advanced once unless `forced_sequence` is given.
/// `parent` holds the outer call's attributes when the factory runs as a
/// sub-factory.
pub(crate) fn resolve(
	factory: &Factory,
	strategy: Strategy,
	kwargs: Attributes,
	extra: &IndexMap<String, Declaration>,
	forced_sequence: Option<i64>,
	parent: Option<&Attributes>,
) -> FactoryResult<Resolution> {
	let merged;
	let set = if extra.is_empty() {
		factory.declaration_set()
	} else {
		merged = DeclarationSet::partition(&merge_declarations(factory.declarations(), extra));
		&merged
	};
	let sequence = forced_sequence.unwrap_or_else(|| factory.sequence().next());

	Resolver {
		factory,
		strategy,
		sequence,
		set,
		parent,
	}
	.run(kwargs)
}

struct Resolver<'a> {
	factory: &'a Factory,
	strategy: Strategy,
	sequence: i64,
	set: &'a DeclarationSet,
	parent: Option<&'a Attributes>,
}

impl Resolver<'_> {
	fn run(&self, mut kwargs: Attributes) -> FactoryResult<Resolution> {
		let post_arguments: Vec<(Option<Value>, Attributes)> = self
			.set
			.post_generation()
			.keys()
			.map(|name| extract_arguments(name, &mut kwargs))
			.collect();

		let mut nested: HashMap<&str, Attributes> = self
			.set
			.attributes()
			.iter()
			.filter(|(_, declaration)| matches!(declaration, Declaration::SubFactory(_)))
			.map(|(name, _)| (name.as_str(), kwargs.take_namespace(name)))
			.collect();

		let mut resolved = Attributes::new();
		for (name, declaration) in self.set.attributes() {
			let value = match kwargs.remove(name) {
				Some(value) => {
					if nested.get(name.as_str()).is_some_and(|fields| !fields.is_empty()) {
						return Err(FactoryError::ConflictingOverride {
							factory: self.factory.name().to_string(),
							attribute: name.clone(),
						});
					}
					value
				}
				None => {
					let overrides = nested.remove(name.as_str()).unwrap_or_default();
					self.resolve_declaration(name, declaration, &resolved, overrides)?
				}
			};
			tracing::trace!(
				factory = %self.factory.name(),
				attribute = %name,
				kind = declaration.kind(),
				"attribute resolved"
			);
			resolved.insert(name.as_str(), value);
		}

		// Undeclared overrides reach the constructor unchanged.
		resolved.extend(kwargs);

		let post_generation = self
			.set
			.post_generation()
			.iter()
			.zip(post_arguments)
			.map(|((name, declaration), (extracted, call_params))| {
				let params = self.post_generation_params(name, &resolved, call_params)?;
				Ok(PendingPostGeneration {
					declaration: declaration.clone(),
					args: PostGenerationArgs::new(name.clone(), self.strategy, extracted, params),
				})
			})
			.collect::<FactoryResult<Vec<_>>>()?;

		Ok(Resolution {
			attributes: resolved,
			post_generation,
			sequence: self.sequence,
		})
	}

	/// Declared parameters of `name`, evaluated after every attribute, with
	/// call-time parameters taking precedence.
	fn post_generation_params(
		&self,
		name: &str,
		resolved: &Attributes,
		call_params: Attributes,
	) -> FactoryResult<Attributes> {
		let mut params = Attributes::new();
		if let Some(declared) = self.set.parameters(name) {
			for (param, declaration) in declared {
				if call_params.contains(param) {
					continue;
				}
				let path = format!("{}{}{}", name, NAMESPACE_SEPARATOR, param);
				let value = self.resolve_declaration(&path, declaration, resolved, Attributes::new())?;
				params.insert(param.as_str(), value);
			}
		}
		params.extend(call_params);
		Ok(params)
	}

	fn resolve_declaration(
		&self,
		name: &str,
		declaration: &Declaration,
		resolved: &Attributes,
		overrides: Attributes,
	) -> FactoryResult<Value> {
		match declaration {
			Declaration::Literal(value) => Ok(value.clone()),
			Declaration::Sequence(recipe) => recipe(self.sequence),
			Declaration::LazyAttribute(recipe) => {
				let ctx =
					ResolutionContext::new(self.factory.name(), resolved, self.sequence, self.strategy)
						.with_parent(self.parent);
				recipe(&ctx)
			}
			Declaration::Cycle(cycle) => cycle.next_value(name),
			Declaration::SubFactory(sub) => self.resolve_sub_factory(name, sub, resolved, overrides),
			// Only reachable as a parameter value; hooks cannot be nested.
			Declaration::PostGeneration(_) => Ok(Value::null()),
		}
	}

	fn resolve_sub_factory(
		&self,
		name: &str,
		sub: &SubFactory,
		resolved: &Attributes,
		overrides: Attributes,
	) -> FactoryResult<Value> {
		let mut call = sub
			.factory()
			.call()
			.strategy(self.strategy)
			.parent(resolved)
			.with_attributes(overrides);
		for (field, declaration) in sub.defaults() {
			call = call.declare(field.as_str(), declaration.clone());
		}
		if let Some(declared) = self.set.parameters(name) {
			for (field, declaration) in declared {
				call = call.declare(field.as_str(), declaration.clone());
			}
		}

		tracing::trace!(
			factory = %self.factory.name(),
			attribute = %name,
			sub_factory = %sub.factory().name(),
			"generating sub-factory"
		);
		call.generate().map(Instance::into_value)
	}
}
