//! Domain layer - property declaration, binding resolution and access

pub mod coercion;
pub mod property;
pub mod resolver;
pub mod service;

pub use coercion::{Coercer, FlagCoercer, Format, RawCoercer, ScalarCoercer, StructuredCoercer};
pub use property::{ConfigProperty, DefaultValue};
pub use resolver::{
    BindingResolver, BindingSource, ClassOptions, ConfigClassBinding, ResolveStrategy,
};
pub use service::{ConfigClass, ConfigClassBuilder, ConfigInstance};
