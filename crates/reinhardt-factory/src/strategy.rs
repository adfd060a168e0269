//! Construction strategies.
//!
//! A strategy decides what happens to the resolved attribute mapping:
//!
//! - [`Strategy::Build`] hands it to the model constructor.
//! - [`Strategy::Create`] hands it to the factory's creation hook, which
//!   conventionally persists the instance.
//! - [`Strategy::Stub`] wraps it in a [`Stub`](crate::stub::Stub) without
//!   touching the model at all.
//!
//! The strategy chosen for a call also applies to every nested
//! [`SubFactory`](crate::declarations::SubFactory) of that call.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::FactoryError;
use crate::factory::Factory;

/// Construction strategy of a factory call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
	/// Construct the model without persisting it.
	Build,
	/// Construct the model through the creation hook.
	Create,
	/// Produce a plain attribute holder.
	Stub,
}

impl Strategy {
	/// Returns the canonical name of the strategy.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Build => "build",
			Self::Create => "create",
			Self::Stub => "stub",
		}
	}

	/// Returns true if the strategy goes through the creation hook.
	pub fn persists(&self) -> bool {
		matches!(self, Self::Create)
	}
}

impl fmt::Display for Strategy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Strategy {
	type Err = FactoryError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		[Self::Build, Self::Create, Self::Stub]
			.into_iter()
			.find(|strategy| strategy.as_str().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| FactoryError::UnknownStrategy(s.to_string()))
	}
}

/// Reassigns the default strategy of `factory` and hands it back.
///
/// This is the functional form of [`Factory::use_strategy`], convenient right
/// after a definition:
///
/// ```ignore
/// let factory = use_strategy(
///     Factory::stub_builder("ProfileFactory").define()?,
///     Strategy::Create,
/// );
/// ```
///
/// Reassignment always succeeds; a stub-only factory rejects the new
/// strategy when it is invoked.
pub fn use_strategy(factory: Arc<Factory>, strategy: Strategy) -> Arc<Factory> {
	factory.use_strategy(strategy);
	factory
}
