//! Factory definitions, invocation and registry.

mod call;
mod definition;
mod dispatch;
pub mod model;
pub mod registry;

pub use call::FactoryCall;
pub use definition::{CreateHook, Factory, FactoryBuilder, PrepareHook};
pub use model::{Model, Target};
pub use registry::{
	FactoryRegistry, clear_factories, factory_count, factory_names, get_factory,
	get_factory_for_model, has_factory, register_factory,
};
