//! Ordered, id-keyed port storage with a lazy persisted/materialized boundary.
//!
//! A [`PortRegistry`] exists in exactly one of two representations at any
//! time: the compact persisted tuples a graph document stores, or the full
//! [`Port`] values every operation works on. Conversion persisted →
//! materialized happens at most once per load, on first access; the reverse
//! conversion only ever happens through [`PortRegistry::flush`] (or the serde
//! snapshot), so a document that was never touched round-trips untouched.

use hashbrown::HashSet;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::GraphError;
use crate::types::{PortDirection, Precision, ValueKind};

/// A single typed, directional connection point of a node.
///
/// Ids are unique across both sides of one registry; names are display
/// strings and are not required to be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: i32,
    pub name: String,
    pub direction: PortDirection,
    pub kind: ValueKind,
    /// Literal used when nothing is connected to this port.
    #[serde(default)]
    pub default_value: [f32; 4],
}

impl Port {
    pub fn input(id: i32, name: impl Into<String>, kind: ValueKind) -> Self {
        Port {
            id,
            name: name.into(),
            direction: PortDirection::Input,
            kind,
            default_value: [0.0; 4],
        }
    }

    pub fn output(id: i32, name: impl Into<String>, kind: ValueKind) -> Self {
        Port {
            id,
            name: name.into(),
            direction: PortDirection::Output,
            kind,
            default_value: [0.0; 4],
        }
    }

    pub fn with_default(mut self, value: [f32; 4]) -> Self {
        self.default_value = value;
        self
    }

    /// Expression an unconnected port reads as, truncated to the port's
    /// arity, e.g. `float2(0, 0)` for a [`ValueKind::Vec2`] port.
    pub fn default_expression(&self, precision: Precision) -> String {
        let v = &self.default_value;
        match self.kind {
            ValueKind::Scalar => format!("{}", v[0]),
            ValueKind::Vec2 => format!("{}2({}, {})", precision.token(), v[0], v[1]),
            ValueKind::Vec3 => {
                format!("{}3({}, {}, {})", precision.token(), v[0], v[1], v[2])
            }
            ValueKind::Vec4 => format!(
                "{}4({}, {}, {}, {})",
                precision.token(),
                v[0],
                v[1],
                v[2],
                v[3]
            ),
        }
    }
}

/// Compact persisted form of a single port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedPort {
    pub id: i32,
    pub name: String,
    pub direction: PortDirection,
    pub kind: ValueKind,
    #[serde(default)]
    pub default_value: [f32; 4],
}

impl From<&Port> for PersistedPort {
    fn from(port: &Port) -> Self {
        PersistedPort {
            id: port.id,
            name: port.name.clone(),
            direction: port.direction,
            kind: port.kind,
            default_value: port.default_value,
        }
    }
}

impl From<PersistedPort> for Port {
    fn from(record: PersistedPort) -> Self {
        Port {
            id: record.id,
            name: record.name,
            direction: record.direction,
            kind: record.kind,
            default_value: record.default_value,
        }
    }
}

/// Wire shape of a registry: one ordered tuple array per side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedRegistry {
    pub inputs: Vec<PersistedPort>,
    pub outputs: Vec<PersistedPort>,
}

#[derive(Debug, Clone)]
enum Repr {
    Persisted {
        inputs: Vec<PersistedPort>,
        outputs: Vec<PersistedPort>,
    },
    Materialized {
        inputs: Vec<Port>,
        outputs: Vec<Port>,
    },
}

/// Ordered, id-unique collection of a node's ports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PersistedRegistry", into = "PersistedRegistry")]
pub struct PortRegistry {
    repr: Repr,
}

impl Default for PortRegistry {
    fn default() -> Self {
        PortRegistry::from_ports(Vec::new(), Vec::new())
    }
}

impl From<PersistedRegistry> for PortRegistry {
    fn from(persisted: PersistedRegistry) -> Self {
        PortRegistry {
            repr: Repr::Persisted {
                inputs: persisted.inputs,
                outputs: persisted.outputs,
            },
        }
    }
}

impl From<PortRegistry> for PersistedRegistry {
    fn from(registry: PortRegistry) -> Self {
        match registry.repr {
            Repr::Persisted { inputs, outputs } => PersistedRegistry { inputs, outputs },
            Repr::Materialized { inputs, outputs } => PersistedRegistry {
                inputs: inputs.iter().map(PersistedPort::from).collect(),
                outputs: outputs.iter().map(PersistedPort::from).collect(),
            },
        }
    }
}

impl PortRegistry {
    /// Build a registry directly from live ports. The caller is trusted the
    /// same way a persisted document is: no id validation is applied.
    pub fn from_ports(inputs: Vec<Port>, outputs: Vec<Port>) -> Self {
        PortRegistry {
            repr: Repr::Materialized { inputs, outputs },
        }
    }

    /// Ordered input and output ports, converting from the persisted form on
    /// first access. Idempotent on repeated calls.
    pub fn materialize(&mut self) -> (&[Port], &[Port]) {
        self.ensure_materialized();
        match &self.repr {
            Repr::Materialized { inputs, outputs } => (inputs, outputs),
            Repr::Persisted { .. } => unreachable!(),
        }
    }

    /// Overwrite the port with `port.id` in place, or append `port` to the
    /// sequence matching its direction.
    ///
    /// Rejects non-positive ids and ids already bound to the opposite side;
    /// neither rejection mutates the registry.
    pub fn add_or_replace(&mut self, port: Port) -> Result<(), GraphError> {
        if port.id <= 0 {
            return Err(GraphError::InvalidPort {
                id: port.id,
                reason: "id must be positive",
            });
        }
        let (inputs, outputs) = self.sides_mut();
        let (own, other) = match port.direction {
            PortDirection::Input => (inputs, outputs),
            PortDirection::Output => (outputs, inputs),
        };
        if other.iter().any(|p| p.id == port.id) {
            return Err(GraphError::InvalidPort {
                id: port.id,
                reason: "id already bound to the opposite side",
            });
        }
        match own.iter_mut().find(|p| p.id == port.id) {
            Some(existing) => *existing = port,
            None => own.push(port),
        }
        Ok(())
    }

    /// Remove every port whose id is not in `valid_ids`, from both sides,
    /// preserving the relative order of survivors.
    pub fn retain_only(&mut self, valid_ids: &HashSet<i32>) {
        let (inputs, outputs) = self.sides_mut();
        inputs.retain(|p| valid_ids.contains(&p.id));
        outputs.retain(|p| valid_ids.contains(&p.id));
    }

    /// Rebuild the persisted form from the live sequences, if materialization
    /// ever occurred. Otherwise a no-op: the last persisted form stays
    /// untouched, so unread data is never lost.
    pub fn flush(&mut self) {
        if let Repr::Materialized { inputs, outputs } = &self.repr {
            debug!(
                "flushing port registry ({} inputs, {} outputs)",
                inputs.len(),
                outputs.len()
            );
            self.repr = Repr::Persisted {
                inputs: inputs.iter().map(PersistedPort::from).collect(),
                outputs: outputs.iter().map(PersistedPort::from).collect(),
            };
        }
    }

    /// Look up an input port by id.
    pub fn find_input(&mut self, id: i32) -> Result<&Port, GraphError> {
        let (inputs, _) = self.materialize();
        inputs
            .iter()
            .find(|p| p.id == id)
            .ok_or(GraphError::PortNotFound { id })
    }

    /// Look up an output port by id.
    pub fn find_output(&mut self, id: i32) -> Result<&Port, GraphError> {
        let (_, outputs) = self.materialize();
        outputs
            .iter()
            .find(|p| p.id == id)
            .ok_or(GraphError::PortNotFound { id })
    }

    /// Combined port count across both sides.
    pub fn port_count(&mut self) -> usize {
        let (inputs, outputs) = self.materialize();
        inputs.len() + outputs.len()
    }

    fn ensure_materialized(&mut self) {
        if let Repr::Persisted { inputs, outputs } = &self.repr {
            trace!(
                "materializing port registry ({} input records, {} output records)",
                inputs.len(),
                outputs.len()
            );
            let inputs = rebuild_side(inputs, PortDirection::Input);
            let mut outputs = rebuild_side(outputs, PortDirection::Output);
            // Ids are unique across the union of both sides; inputs win.
            outputs.retain(|p| {
                let clash = inputs.iter().any(|i| i.id == p.id);
                if clash {
                    debug!("dropping output record {}: id already used by an input", p.id);
                }
                !clash
            });
            self.repr = Repr::Materialized { inputs, outputs };
        }
    }

    fn sides_mut(&mut self) -> (&mut Vec<Port>, &mut Vec<Port>) {
        self.ensure_materialized();
        match &mut self.repr {
            Repr::Materialized { inputs, outputs } => (inputs, outputs),
            Repr::Persisted { .. } => unreachable!(),
        }
    }
}

/// Rebuild one side from its persisted records, applying overwrite-by-id to
/// duplicates and dropping records stored under the wrong side. A corrupt or
/// hand-edited document can therefore never violate the uniqueness invariant.
fn rebuild_side(records: &[PersistedPort], direction: PortDirection) -> Vec<Port> {
    let mut ports: Vec<Port> = Vec::with_capacity(records.len());
    for record in records {
        if record.direction != direction {
            debug!(
                "dropping port record {}: stored under the wrong side",
                record.id
            );
            continue;
        }
        let port = Port::from(record.clone());
        match ports.iter_mut().find(|p| p.id == port.id) {
            Some(existing) => *existing = port,
            None => ports.push(port),
        }
    }
    ports
}
