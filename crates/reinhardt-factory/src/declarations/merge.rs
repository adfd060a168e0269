//! Declaration inheritance and partitioning.

use indexmap::IndexMap;

use super::Declaration;
use crate::post_generation::PostGeneration;
use crate::value::NAMESPACE_SEPARATOR;

/// Merges a child's declarations over its parent's.
///
/// A child declaration replaces the parent declaration of the same name in
/// place. Names the child does not redeclare keep the parent's relative order,
/// and names new to the child are appended in the child's order.
pub fn merge_declarations(
	parent: &IndexMap<String, Declaration>,
	own: &IndexMap<String, Declaration>,
) -> IndexMap<String, Declaration> {
	let mut merged = parent.clone();
	for (name, declaration) in own {
		merged.insert(name.clone(), declaration.clone());
	}
	merged
}

/// Declarations of a factory, split by when and how they are resolved.
#[derive(Debug, Clone, Default)]
pub struct DeclarationSet {
	attributes: IndexMap<String, Declaration>,
	post_generation: IndexMap<String, PostGeneration>,
	parameters: IndexMap<String, IndexMap<String, Declaration>>,
}

impl DeclarationSet {
	/// Partitions merged declarations.
	///
	/// - [`Declaration::PostGeneration`] entries go to the post-generation set.
	/// - A name `outer__inner` whose `outer` is a post-generation or sub-factory
	///   declaration becomes parameter `inner` of `outer`, wherever it appears
	///   in the declaration order.
	/// - Everything else is an immediate attribute.
	pub fn partition(declarations: &IndexMap<String, Declaration>) -> Self {
		let mut set = Self::default();

		for (name, declaration) in declarations {
			if let Some((outer, inner)) = name.split_once(NAMESPACE_SEPARATOR) {
				let owned = declarations
					.get(outer)
					.is_some_and(Declaration::owns_parameters);
				if owned && !inner.is_empty() {
					set.parameters
						.entry(outer.to_string())
						.or_default()
						.insert(inner.to_string(), declaration.clone());
					continue;
				}
			}

			match declaration {
				Declaration::PostGeneration(post) => {
					set.post_generation.insert(name.clone(), post.clone());
				}
				other => {
					set.attributes.insert(name.clone(), other.clone());
				}
			}
		}

		set
	}

	/// Immediate declarations, in resolution order.
	pub fn attributes(&self) -> &IndexMap<String, Declaration> {
		&self.attributes
	}

	/// Post-generation declarations, in execution order.
	pub fn post_generation(&self) -> &IndexMap<String, PostGeneration> {
		&self.post_generation
	}

	/// Declared parameters of the post-generation or sub-factory declaration `outer`.
	pub fn parameters(&self, outer: &str) -> Option<&IndexMap<String, Declaration>> {
		self.parameters.get(outer)
	}

	/// Returns true if `name` is an immediate attribute.
	pub fn has_attribute(&self, name: &str) -> bool {
		self.attributes.contains_key(name)
	}

	/// Returns true if `name` is a post-generation declaration.
	pub fn has_post_generation(&self, name: &str) -> bool {
		self.post_generation.contains_key(name)
	}
}
