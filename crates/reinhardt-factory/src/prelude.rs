//! Convenience re-exports for common usage.
//!
//! # Example
//!
//! ```ignore
//! use reinhardt_factory::prelude::*;
//!
//! // Now you have access to:
//! // - Factory definitions and calls
//! // - Declarations and post-generation hooks
//! // - Attribute values and error types
//! ```

// Error types
pub use crate::error::{ErrorKind, FactoryError, FactoryResult};

// Factory types
pub use crate::factory::{
	Factory, FactoryBuilder, FactoryCall, FactoryRegistry, Model, Target, get_factory,
	get_factory_for_model, register_factory,
};

// Declarations
pub use crate::context::ResolutionContext;
pub use crate::declarations::{Cycle, Declaration, SubFactory};
pub use crate::post_generation::{PostGeneration, PostGenerationArgs};

// Values and strategies
pub use crate::settings::FactorySettings;
pub use crate::strategy::{Strategy, use_strategy};
pub use crate::stub::Stub;
pub use crate::value::{Attributes, Instance, Value};
