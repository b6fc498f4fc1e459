use serde::{Deserialize, Serialize};

/// Closed set of numeric vector shapes a port can carry.
///
/// The set is deliberately small: the node's dynamic port lists only ever
/// deal in plain numeric values, and every shape maps 1:1 onto a concrete
/// target-language type once a [`Precision`] is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
}

impl ValueKind {
    /// Number of components carried by this shape.
    pub fn components(self) -> usize {
        match self {
            ValueKind::Scalar => 1,
            ValueKind::Vec2 => 2,
            ValueKind::Vec3 => 3,
            ValueKind::Vec4 => 4,
        }
    }

    /// Concrete target-language type name at the requested precision,
    /// e.g. `float3` or `half2`.
    pub fn shader_type(self, precision: Precision) -> String {
        match self {
            ValueKind::Scalar => precision.token().to_string(),
            ValueKind::Vec2 => format!("{}2", precision.token()),
            ValueKind::Vec3 => format!("{}3", precision.token()),
            ValueKind::Vec4 => format!("{}4", precision.token()),
        }
    }
}

/// Numeric precision the surrounding generation pass is running at.
///
/// Affects generated type names and the function-name key, never the logical
/// port shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    Full,
    Half,
}

impl Precision {
    /// Base type token, also used as the precision tag in function keys.
    pub fn token(self) -> &'static str {
        match self {
            Precision::Full => "float",
            Precision::Half => "half",
        }
    }
}

/// Which side of a node a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}
