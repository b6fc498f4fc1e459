//! Core of the Glint shader-graph *custom code* node.
//!
//! A custom-code node embeds an opaque fragment of target-language shader
//! code and exposes it to the surrounding graph through a dynamically-sized,
//! typed port set. This crate holds the three pieces with real invariants:
//!
//! - [`ports`] keeps the ordered, id-unique port registry with its lazy
//!   persisted/materialized boundary.
//! - [`codegen`] turns the current port set plus the fragment into call-site
//!   statements and a once-registered function definition.
//! - [`requirements`] answers the pipeline's static capability queries by
//!   OR-combining what the input ports declare.
//!
//! Everything else (editor widgets, undo, the graph walk that resolves port
//! values, preview rendering) lives in the host and reaches this crate
//! through [`CodeSink`], [`InputValueResolver`], and the [`DirtyScope`]
//! signals returned by mutating operations on [`CustomCodeNode`].

pub mod codegen;
pub mod error;
pub mod node;
pub mod ports;
pub mod requirements;
pub mod types;

pub use codegen::{
    function_name, output_variable_name, CodeSink, DefaultValueResolver, FunctionRegistry,
    InputValueResolver,
};
pub use error::GraphError;
pub use node::{CustomCodeNode, DirtyScope};
pub use ports::{PersistedPort, PersistedRegistry, Port, PortRegistry};
pub use requirements::{
    aggregate, NeededSpaces, PortRequirements, StageCapability, UvChannel, UvChannels,
};
pub use types::{PortDirection, Precision, ValueKind};
