//! Static capability requirements aggregated from a node's input ports.
//!
//! The surrounding pipeline asks, per node, which geometric quantities the
//! generated code will read (normal, tangent, position, ...) and in which
//! coordinate spaces. The answer is a conservative static approximation: a
//! port declares its needs from its kind alone, and the node ORs the vectors
//! of its *input* ports. The fragment text is never interpreted, and output
//! ports never contribute: a requirement is a precondition for evaluating
//! the fragment's inputs, not a postcondition of its outputs.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::ports::Port;
use crate::types::ValueKind;

bitflags! {
    /// Coordinate spaces a geometric quantity may be needed in. A port can
    /// need the same quantity in several spaces at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NeededSpaces: u8 {
        const OBJECT  = 1 << 0;
        const VIEW    = 1 << 1;
        const WORLD   = 1 << 2;
        const TANGENT = 1 << 3;
    }
}

bitflags! {
    /// Set of mesh UV channels a port reads.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct UvChannels: u8 {
        const UV0 = 1 << 0;
        const UV1 = 1 << 1;
        const UV2 = 1 << 2;
        const UV3 = 1 << 3;
    }
}

/// Mesh UV channel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UvChannel {
    Uv0,
    Uv1,
    Uv2,
    Uv3,
}

impl UvChannel {
    fn mask(self) -> UvChannels {
        match self {
            UvChannel::Uv0 => UvChannels::UV0,
            UvChannel::Uv1 => UvChannels::UV1,
            UvChannel::Uv2 => UvChannels::UV2,
            UvChannel::Uv3 => UvChannels::UV3,
        }
    }
}

/// Shader stage the caller is generating for. Passed through unused by the
/// aggregation itself; reserved for stage-specific filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageCapability {
    Vertex,
    Fragment,
    #[default]
    All,
}

/// Uniform requirement vector a port reports for itself.
///
/// One value answers every capability query; callers mask out the field they
/// care about instead of going through a separate contract per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRequirements {
    pub normal: NeededSpaces,
    pub tangent: NeededSpaces,
    pub bitangent: NeededSpaces,
    pub view_direction: NeededSpaces,
    pub position: NeededSpaces,
    pub screen_position: bool,
    pub vertex_color: bool,
    pub uv_channels: UvChannels,
}

impl Default for PortRequirements {
    fn default() -> Self {
        PortRequirements {
            normal: NeededSpaces::empty(),
            tangent: NeededSpaces::empty(),
            bitangent: NeededSpaces::empty(),
            view_direction: NeededSpaces::empty(),
            position: NeededSpaces::empty(),
            screen_position: false,
            vertex_color: false,
            uv_channels: UvChannels::empty(),
        }
    }
}

impl PortRequirements {
    /// Combine two vectors: bitwise OR for spaces, logical OR for booleans.
    pub fn union(self, other: Self) -> Self {
        PortRequirements {
            normal: self.normal | other.normal,
            tangent: self.tangent | other.tangent,
            bitangent: self.bitangent | other.bitangent,
            view_direction: self.view_direction | other.view_direction,
            position: self.position | other.position,
            screen_position: self.screen_position || other.screen_position,
            vertex_color: self.vertex_color || other.vertex_color,
            uv_channels: self.uv_channels | other.uv_channels,
        }
    }

    pub fn requires_mesh_uv(&self, channel: UvChannel) -> bool {
        self.uv_channels.contains(channel.mask())
    }
}

impl Port {
    /// What this port needs from the surrounding pipeline, judged solely
    /// from its declared kind.
    pub fn requirements(&self) -> PortRequirements {
        match self.kind {
            // Plain numeric shapes carry no geometric role.
            ValueKind::Scalar | ValueKind::Vec2 | ValueKind::Vec3 | ValueKind::Vec4 => {
                PortRequirements::default()
            }
        }
    }
}

/// OR-combine the requirement vectors of `ports`. Stateless; every call
/// folds over a fresh snapshot of the slice it is given.
pub fn aggregate(ports: &[Port]) -> PortRequirements {
    ports
        .iter()
        .fold(PortRequirements::default(), |acc, port| {
            acc.union(port.requirements())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_ors_spaces_and_booleans() {
        let a = PortRequirements {
            normal: NeededSpaces::OBJECT,
            screen_position: true,
            uv_channels: UvChannels::UV0,
            ..Default::default()
        };
        let b = PortRequirements {
            normal: NeededSpaces::WORLD,
            position: NeededSpaces::VIEW,
            vertex_color: true,
            uv_channels: UvChannels::UV2,
            ..Default::default()
        };
        let combined = a.union(b);
        assert_eq!(combined.normal, NeededSpaces::OBJECT | NeededSpaces::WORLD);
        assert_eq!(combined.position, NeededSpaces::VIEW);
        assert!(combined.screen_position);
        assert!(combined.vertex_color);
        assert!(combined.requires_mesh_uv(UvChannel::Uv0));
        assert!(combined.requires_mesh_uv(UvChannel::Uv2));
        assert!(!combined.requires_mesh_uv(UvChannel::Uv1));
    }

    #[test]
    fn union_is_commutative_and_idempotent() {
        let a = PortRequirements {
            tangent: NeededSpaces::TANGENT,
            vertex_color: true,
            ..Default::default()
        };
        let b = PortRequirements {
            bitangent: NeededSpaces::OBJECT | NeededSpaces::WORLD,
            ..Default::default()
        };
        assert_eq!(a.union(b), b.union(a));
        assert_eq!(a.union(a), a);
    }

    #[test]
    fn no_ports_aggregate_to_no_requirement() {
        let combined = aggregate(&[]);
        assert_eq!(combined, PortRequirements::default());
        assert!(combined.normal.is_empty());
        assert!(!combined.screen_position);
    }

    #[test]
    fn numeric_ports_declare_nothing() {
        let ports = vec![
            Port::input(1, "A", ValueKind::Scalar),
            Port::input(2, "B", ValueKind::Vec3),
            Port::input(3, "C", ValueKind::Vec4),
        ];
        assert_eq!(aggregate(&ports), PortRequirements::default());
    }
}
