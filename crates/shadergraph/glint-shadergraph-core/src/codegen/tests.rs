//! Behavioural coverage for the emission paths.

use super::*;
use crate::ports::Port;
use crate::types::{Precision, ValueKind};
use anyhow::bail;
use uuid::Uuid;

fn identity() -> Uuid {
    Uuid::from_u128(0x4242)
}

fn other_identity() -> Uuid {
    Uuid::from_u128(0x7777)
}

/// Resolves every input to `<name>_value`, standing in for the graph walk.
struct SuffixResolver;

impl InputValueResolver for SuffixResolver {
    fn resolve(&self, port: &Port) -> anyhow::Result<String> {
        Ok(format!("{}_value", port.name))
    }
}

struct FailingResolver;

impl InputValueResolver for FailingResolver {
    fn resolve(&self, port: &Port) -> anyhow::Result<String> {
        bail!("no value for port {}", port.id)
    }
}

fn two_in_one_out() -> (Vec<Port>, Vec<Port>) {
    (
        vec![
            Port::input(1, "A", ValueKind::Scalar),
            Port::input(2, "B", ValueKind::Scalar),
        ],
        vec![Port::output(3, "Out", ValueKind::Vec3)],
    )
}

// --- Call-site emission ------------------------------------------------

#[test]
fn call_site_declares_outputs_then_calls() {
    let (inputs, outputs) = two_in_one_out();
    let mut sink: Vec<String> = Vec::new();
    emit_call_site(
        &inputs,
        &outputs,
        &SuffixResolver,
        identity(),
        Precision::Full,
        &mut sink,
    )
    .unwrap();

    let out_var = output_variable_name(identity(), &outputs[0]);
    assert_eq!(sink.len(), 2);
    assert_eq!(sink[0], format!("float3 {out_var};"));
    assert_eq!(
        sink[1],
        format!(
            "{}(A_value, B_value, {out_var});",
            function_name(identity(), Precision::Full)
        )
    );
}

#[test]
fn arguments_keep_registry_order_inputs_first() {
    let inputs = vec![
        Port::input(5, "Z", ValueKind::Scalar),
        Port::input(1, "A", ValueKind::Scalar),
    ];
    let outputs = vec![
        Port::output(9, "Second", ValueKind::Scalar),
        Port::output(2, "First", ValueKind::Scalar),
    ];
    let mut sink: Vec<String> = Vec::new();
    emit_call_site(
        &inputs,
        &outputs,
        &SuffixResolver,
        identity(),
        Precision::Full,
        &mut sink,
    )
    .unwrap();

    let call = sink.last().unwrap();
    let expected = format!(
        "{}(Z_value, A_value, {}, {});",
        function_name(identity(), Precision::Full),
        output_variable_name(identity(), &outputs[0]),
        output_variable_name(identity(), &outputs[1]),
    );
    assert_eq!(call, &expected);
}

#[test]
fn it_should_emit_nothing_without_ports() {
    let mut sink: Vec<String> = Vec::new();
    emit_call_site(
        &[],
        &[],
        &SuffixResolver,
        identity(),
        Precision::Full,
        &mut sink,
    )
    .unwrap();
    assert!(sink.is_empty());
}

#[test]
fn resolver_failures_propagate() {
    let (inputs, outputs) = two_in_one_out();
    let mut sink: Vec<String> = Vec::new();
    let err = emit_call_site(
        &inputs,
        &outputs,
        &FailingResolver,
        identity(),
        Precision::Full,
        &mut sink,
    )
    .unwrap_err();
    assert!(matches!(err, crate::error::GraphError::Resolve(_)));
}

#[test]
fn default_resolver_renders_default_literals() {
    let inputs = vec![Port::input(1, "UVOffset", ValueKind::Vec2).with_default([0.5, 0.5, 0.0, 0.0])];
    let outputs = vec![Port::output(2, "Out", ValueKind::Scalar)];
    let mut sink: Vec<String> = Vec::new();
    emit_call_site(
        &inputs,
        &outputs,
        &DefaultValueResolver::new(Precision::Full),
        identity(),
        Precision::Full,
        &mut sink,
    )
    .unwrap();
    assert!(sink.last().unwrap().contains("float2(0.5, 0.5)"));
}

// --- Function emission -------------------------------------------------

#[test]
fn function_has_in_then_out_parameters_and_verbatim_body() {
    let (inputs, outputs) = two_in_one_out();
    let mut registry = FunctionRegistry::new();
    emit_function(
        &inputs,
        &outputs,
        "Out = float3(A, B, 0);",
        identity(),
        Precision::Full,
        &mut registry,
    );

    let name = function_name(identity(), Precision::Full);
    let source = registry.source(&name).unwrap();
    assert!(source.starts_with(&format!("void {name}(float A, float B, out float3 Out)")));
    assert!(source.contains("Out = float3(A, B, 0);"));
    assert!(source.ends_with("}\n"));
}

#[test]
fn half_precision_changes_types_and_key() {
    let (inputs, outputs) = two_in_one_out();
    let mut registry = FunctionRegistry::new();
    emit_function(
        &inputs,
        &outputs,
        "Out = half3(A, B, 0);",
        identity(),
        Precision::Half,
        &mut registry,
    );
    let name = function_name(identity(), Precision::Half);
    assert!(name.ends_with("_half"));
    let source = registry.source(&name).unwrap();
    assert!(source.contains("(half A, half B, out half3 Out)"));
}

#[test]
fn it_should_register_nothing_without_ports() {
    let mut registry = FunctionRegistry::new();
    emit_function(
        &[],
        &[],
        "anything at all",
        identity(),
        Precision::Full,
        &mut registry,
    );
    assert!(registry.is_empty());
}

#[test]
fn empty_fragment_yields_empty_body() {
    let (inputs, outputs) = two_in_one_out();
    let mut registry = FunctionRegistry::new();
    emit_function(&inputs, &outputs, "", identity(), Precision::Full, &mut registry);
    let source = registry
        .source(&function_name(identity(), Precision::Full))
        .unwrap();
    assert!(source.contains("{\n}\n"));
}

// --- Function registry -------------------------------------------------

#[test]
fn repeated_key_registers_once_and_skips_builder() {
    let mut registry = FunctionRegistry::new();
    registry.provide("k", |s| s.push_str("first"));
    let mut invoked = false;
    registry.provide("k", |_| invoked = true);
    assert!(!invoked);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.source("k"), Some("first"));
}

#[test]
fn identical_fragments_on_distinct_nodes_get_distinct_keys() {
    let (inputs, outputs) = two_in_one_out();
    let mut registry = FunctionRegistry::new();
    let code = "Out = float3(A, B, 0);";
    emit_function(&inputs, &outputs, code, identity(), Precision::Full, &mut registry);
    emit_function(
        &inputs,
        &outputs,
        code,
        other_identity(),
        Precision::Full,
        &mut registry,
    );
    assert_eq!(registry.len(), 2);
    assert_ne!(
        function_name(identity(), Precision::Full),
        function_name(other_identity(), Precision::Full)
    );
}

#[test]
fn concat_preserves_first_registration_order() {
    let mut registry = FunctionRegistry::new();
    registry.provide("b", |s| s.push_str("B"));
    registry.provide("a", |s| s.push_str("A"));
    registry.provide("b", |s| s.push_str("never"));
    assert_eq!(registry.concat(), "B\nA\n");
}
