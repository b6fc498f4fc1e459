//! The custom-code node aggregate: ports, fragment, emission, requirements.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codegen::{self, CodeSink, FunctionRegistry, InputValueResolver};
use crate::error::GraphError;
use crate::ports::{Port, PortRegistry};
use crate::requirements::{self, NeededSpaces, PortRequirements, StageCapability, UvChannel};
use crate::types::{Precision, ValueKind};

/// Severity of a change notification emitted by the node.
///
/// `Topological`: the port set or fragment may have structurally changed;
/// downstream consumers must re-run code generation and requirement
/// aggregation. `Graph`: a cosmetic attribute changed; a redisplay suffices.
///
/// The node only ever *returns* one of these; the surrounding controller
/// owns all UI wiring and decides what to do with each signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyScope {
    Topological,
    Graph,
}

fn default_name() -> String {
    "Custom Code".to_string()
}

fn default_preview() -> bool {
    true
}

/// A graph node wrapping a user-authored fragment of shader code behind a
/// dynamically-sized typed port set.
///
/// The fragment is opaque text: it is never parsed, validated, or
/// type-checked here. The node's job is to keep the port registry coherent,
/// to emit the call site and function definition deterministically, and to
/// answer the static capability queries the surrounding pipeline asks during
/// whole-graph analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomCodeNode {
    #[serde(default = "default_name")]
    pub name: String,
    id: Uuid,
    ports: PortRegistry,
    code: String,
    #[serde(default = "default_preview")]
    preview_visible: bool,
    #[serde(default)]
    precision: Precision,
}

impl Default for CustomCodeNode {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomCodeNode {
    /// A fresh node: one scalar input `In`, one scalar output `Out`, and a
    /// pass-through fragment.
    pub fn new() -> Self {
        CustomCodeNode {
            name: default_name(),
            id: Uuid::new_v4(),
            ports: PortRegistry::from_ports(
                vec![Port::input(0, "In", ValueKind::Scalar)],
                vec![Port::output(1, "Out", ValueKind::Scalar)],
            ),
            code: "Out = In;".to_string(),
            preview_visible: true,
            precision: Precision::default(),
        }
    }

    /// Identity used to derive the deterministic generated-function name.
    pub fn identity(&self) -> Uuid {
        self.id
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    /// Name the generated function will carry at the current precision.
    pub fn function_name(&self) -> String {
        codegen::function_name(self.id, self.precision)
    }

    /// Ordered input and output ports (materializing on first access).
    pub fn ports(&mut self) -> (&[Port], &[Port]) {
        self.ports.materialize()
    }

    pub fn find_input(&mut self, id: i32) -> Result<&Port, GraphError> {
        self.ports.find_input(id)
    }

    pub fn find_output(&mut self, id: i32) -> Result<&Port, GraphError> {
        self.ports.find_output(id)
    }

    /// Rebuild the compact persisted port form ahead of a document save.
    pub fn flush_ports(&mut self) {
        self.ports.flush()
    }

    // --- Editor-driven mutations ---------------------------------------

    pub fn set_code(&mut self, code: impl Into<String>) -> DirtyScope {
        self.code = code.into();
        DirtyScope::Topological
    }

    pub fn add_or_replace_port(&mut self, port: Port) -> Result<DirtyScope, GraphError> {
        self.ports.add_or_replace(port)?;
        Ok(DirtyScope::Topological)
    }

    /// Keep only ports whose id is in `valid_ids`; deletion is expressed as
    /// a set difference rather than an explicit remove call.
    pub fn retain_ports(&mut self, valid_ids: &HashSet<i32>) -> DirtyScope {
        self.ports.retain_only(valid_ids);
        DirtyScope::Topological
    }

    /// Explicit user trigger to re-run code generation.
    pub fn recompile(&self) -> DirtyScope {
        DirtyScope::Topological
    }

    pub fn set_precision(&mut self, precision: Precision) -> DirtyScope {
        self.precision = precision;
        DirtyScope::Topological
    }

    pub fn has_preview(&self) -> bool {
        true
    }

    pub fn preview_visible(&self) -> bool {
        self.preview_visible
    }

    pub fn set_preview_visible(&mut self, visible: bool) -> DirtyScope {
        self.preview_visible = visible;
        DirtyScope::Graph
    }

    // --- Emission -------------------------------------------------------

    /// Write this node's call-site statements into `sink`.
    pub fn generate_code(
        &mut self,
        resolver: &dyn InputValueResolver,
        sink: &mut dyn CodeSink,
    ) -> Result<(), GraphError> {
        let (inputs, outputs) = self.ports.materialize();
        codegen::emit_call_site(inputs, outputs, resolver, self.id, self.precision, sink)
    }

    /// Register this node's function definition into the shared registry.
    pub fn generate_function(&mut self, registry: &mut FunctionRegistry) {
        let (inputs, outputs) = self.ports.materialize();
        codegen::emit_function(inputs, outputs, &self.code, self.id, self.precision, registry);
    }

    // --- Static requirement queries -------------------------------------

    fn input_requirements(&mut self) -> PortRequirements {
        let (inputs, _) = self.ports.materialize();
        requirements::aggregate(inputs)
    }

    pub fn requires_normal(&mut self, _stage: StageCapability) -> NeededSpaces {
        self.input_requirements().normal
    }

    pub fn requires_tangent(&mut self, _stage: StageCapability) -> NeededSpaces {
        self.input_requirements().tangent
    }

    pub fn requires_bitangent(&mut self, _stage: StageCapability) -> NeededSpaces {
        self.input_requirements().bitangent
    }

    pub fn requires_view_direction(&mut self, _stage: StageCapability) -> NeededSpaces {
        self.input_requirements().view_direction
    }

    pub fn requires_position(&mut self, _stage: StageCapability) -> NeededSpaces {
        self.input_requirements().position
    }

    pub fn requires_screen_position(&mut self, _stage: StageCapability) -> bool {
        self.input_requirements().screen_position
    }

    pub fn requires_vertex_color(&mut self, _stage: StageCapability) -> bool {
        self.input_requirements().vertex_color
    }

    pub fn requires_mesh_uv(&mut self, channel: UvChannel, _stage: StageCapability) -> bool {
        self.input_requirements().requires_mesh_uv(channel)
    }
}
