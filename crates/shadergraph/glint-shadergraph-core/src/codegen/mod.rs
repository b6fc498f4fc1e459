//! Deterministic code emission for the custom-code node.
//!
//! Two independent entry points, both pure functions of the materialized
//! ports, the opaque fragment, the node identity, and the numeric precision:
//!
//! - [`emit_call_site`] writes the per-node statements (output declarations
//!   plus one call) into a caller-owned [`CodeSink`].
//! - [`emit_function`] registers the node's function definition into the
//!   shared [`FunctionRegistry`], deduplicated by name.
//!
//! A node with no ports emits nothing through either path: a port-less node
//! never calls its own fragment.

use uuid::Uuid;

use crate::error::GraphError;
use crate::ports::Port;
use crate::types::Precision;

mod function_registry;
pub use function_registry::FunctionRegistry;

#[cfg(test)]
mod tests;

/// Prefix carried by every generated function name.
const FUNCTION_PREFIX: &str = "Glint_CustomCode";

/// Caller-owned ordered statement sink.
pub trait CodeSink {
    fn add_statement(&mut self, statement: String);
}

impl CodeSink for Vec<String> {
    fn add_statement(&mut self, statement: String) {
        self.push(statement);
    }
}

/// External collaborator that resolves an input port to the expression
/// feeding it (an upstream node's variable, a property reference, ...).
pub trait InputValueResolver {
    fn resolve(&self, port: &Port) -> anyhow::Result<String>;
}

/// Fallback resolver: every input reads as its own default literal, the way
/// an unconnected port does.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultValueResolver {
    pub precision: Precision,
}

impl DefaultValueResolver {
    pub fn new(precision: Precision) -> Self {
        DefaultValueResolver { precision }
    }
}

impl InputValueResolver for DefaultValueResolver {
    fn resolve(&self, port: &Port) -> anyhow::Result<String> {
        Ok(port.default_expression(self.precision))
    }
}

/// Deterministic function-name key: prefix, identity token, precision tag.
///
/// Two distinct nodes never collide even with identical fragments, and the
/// same node requested twice in one pass always yields the same key.
pub fn function_name(identity: Uuid, precision: Precision) -> String {
    format!(
        "{}_{}_{}",
        FUNCTION_PREFIX,
        identity.simple(),
        precision.token()
    )
}

/// Deterministic local variable name binding an output port at the call site.
pub fn output_variable_name(identity: Uuid, port: &Port) -> String {
    format!("_{}_{}", identity.simple(), port.id)
}

/// Emit the call-site statements for one node: a local declaration per
/// output port, then a single call whose arguments are every input's
/// resolved expression followed by every output's declared variable, each
/// group in registry order.
pub fn emit_call_site(
    inputs: &[Port],
    outputs: &[Port],
    resolver: &dyn InputValueResolver,
    identity: Uuid,
    precision: Precision,
    sink: &mut dyn CodeSink,
) -> Result<(), GraphError> {
    if inputs.len() + outputs.len() == 0 {
        return Ok(());
    }

    let mut arguments = Vec::with_capacity(inputs.len() + outputs.len());
    for port in inputs {
        arguments.push(resolver.resolve(port)?);
    }
    for port in outputs {
        arguments.push(output_variable_name(identity, port));
    }

    for port in outputs {
        sink.add_statement(format!(
            "{} {};",
            port.kind.shader_type(precision),
            output_variable_name(identity, port)
        ));
    }
    sink.add_statement(format!(
        "{}({});",
        function_name(identity, precision),
        arguments.join(", ")
    ));
    Ok(())
}

/// Register the node's function definition: `void` function whose parameter
/// list is `<type> <name>` per input then `out <type> <name>` per output,
/// and whose body is the fragment text verbatim. Registration is idempotent
/// by key; a node with no ports registers nothing.
pub fn emit_function(
    inputs: &[Port],
    outputs: &[Port],
    code: &str,
    identity: Uuid,
    precision: Precision,
    registry: &mut FunctionRegistry,
) {
    let mut parameters = Vec::with_capacity(inputs.len() + outputs.len());
    for port in inputs {
        parameters.push(format!("{} {}", port.kind.shader_type(precision), port.name));
    }
    for port in outputs {
        parameters.push(format!(
            "out {} {}",
            port.kind.shader_type(precision),
            port.name
        ));
    }
    if parameters.is_empty() {
        return;
    }

    let name = function_name(identity, precision);
    registry.provide(&name, |source| {
        source.push_str(&format!("void {}({})\n", name, parameters.join(", ")));
        source.push_str("{\n");
        for line in code.lines() {
            source.push_str("    ");
            source.push_str(line);
            source.push('\n');
        }
        source.push_str("}\n");
    });
}
