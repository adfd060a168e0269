//! Declarative test fixture factories for the Reinhardt framework.
//!
//! This crate provides a Factory Boy style engine for producing test objects:
//!
//! - **Declarations**: literal values, sequences, lazy attributes, cycles and
//!   nested factories, resolved in declaration order
//! - **Strategies**: build, create or stub the same definition on demand
//! - **Inheritance**: derived factories override declarations in place and
//!   share their parent's sequence counter
//! - **Post-generation**: hooks run once the object exists, driven by
//!   call-time arguments
//!
//! # Quick Start
//!
//! Implement [`Model`](factory::Model) for the type to produce:
//!
//! ```ignore
//! use reinhardt_factory::prelude::*;
//!
//! struct User {
//!     id: Option<i64>,
//!     username: String,
//!     email: String,
//! }
//!
//! impl Model for User {
//!     fn from_attributes(mut attributes: Attributes) -> FactoryResult<Self> {
//!         Ok(Self {
//!             id: None,
//!             username: attributes.take("username")?,
//!             email: attributes.take("email")?,
//!         })
//!     }
//! }
//! ```
//!
//! Define a factory and use it:
//!
//! ```ignore
//! let users = Factory::builder("UserFactory")
//!     .model::<User>()
//!     .sequence("username", |n| format!("user{}", n))
//!     .lazy("email", |ctx| {
//!         Ok(format!("{}@example.com", ctx.get_as::<String>("username")?))
//!     })
//!     .define()?;
//!
//! let user: User = users.build()?.downcast()?;            // In-memory instance
//! let saved: User = users.create()?.downcast()?;          // Through Model::create
//! let stub = users.stub()?.downcast::<Stub>()?;          // Attributes only
//! let batch = users.call().set("email", "x@y.z").generate_batch(10)?;
//! ```
//!
//! # Architecture
//!
//! - [`Declaration`](declarations::Declaration) - Recipe of one attribute
//! - [`Factory`](factory::Factory) - Immutable definition built by a
//!   [`FactoryBuilder`](factory::FactoryBuilder)
//! - [`FactoryCall`](factory::FactoryCall) - One invocation with overrides
//! - [`Strategy`](strategy::Strategy) - What happens to the resolved attributes
//! - [`PostGeneration`](post_generation::PostGeneration) - Hooks run after construction
//! - [`FactorySettings`](settings::FactorySettings) - Root factory configuration

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod context;
pub mod declarations;
pub mod error;
pub mod factory;
pub mod post_generation;
pub mod prelude;
mod resolver;
pub mod sequence;
pub mod settings;
pub mod strategy;
pub mod stub;
pub mod value;

// Re-export commonly used types at crate root
pub use declarations::{Declaration, SubFactory};
pub use error::{FactoryError, FactoryResult};
pub use factory::{Factory, FactoryBuilder, FactoryCall, Model};
pub use strategy::Strategy;
pub use value::{Attributes, Instance, Value};
