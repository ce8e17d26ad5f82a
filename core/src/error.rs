//! Error types for scene construction and mutation.

/// Errors raised by scene-graph construction, mutation, and lookup.
///
/// Validation failures are raised eagerly at construction/mutation time;
/// only node-presence checks happen lazily, since the graph is mutable.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    /// Translation input had the wrong number of components.
    InvalidTranslation {
        /// Number of components actually supplied.
        len: usize,
    },
    /// Rotation input had the wrong number of components.
    InvalidRotation {
        /// Number of components actually supplied.
        len: usize,
    },
    /// Scale input had the wrong number of components.
    InvalidScale {
        /// Number of components actually supplied.
        len: usize,
    },
    /// Only 3D assets are supported.
    UnsupportedDimensionality(u8),
    /// A state-sensor property name is not in the allowed set.
    UnknownSensorProperty(String),
    /// A sensor parameter is negative or non-finite.
    InvalidSensor(String),
    /// An explicitly named node collides with a sibling of the same name.
    DuplicateName {
        /// The colliding name.
        name: String,
    },
    /// Reparenting would make a node its own ancestor.
    WouldCycle,
    /// No node with this name exists in the searched subtree.
    NodeNotFound(String),
    /// The node id refers to a removed (or never inserted) node.
    StaleNode,
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTranslation { len } => {
                write!(f, "translation must have 3 components (X, Y, Z), got {len}")
            }
            Self::InvalidRotation { len } => {
                write!(
                    f,
                    "rotation must have 3 (Euler degrees) or 4 (quaternion) components, got {len}"
                )
            }
            Self::InvalidScale { len } => {
                write!(
                    f,
                    "scale must have 1 (uniform) or 3 (X, Y, Z) components, got {len}"
                )
            }
            Self::UnsupportedDimensionality(d) => {
                write!(f, "{d}D assets are not implemented, only 3D is supported")
            }
            Self::UnknownSensorProperty(p) => {
                write!(f, "unknown state-sensor property: {p}")
            }
            Self::InvalidSensor(msg) => write!(f, "invalid sensor parameters: {msg}"),
            Self::DuplicateName { name } => {
                write!(f, "a sibling named '{name}' already exists")
            }
            Self::WouldCycle => write!(f, "cannot parent a node under its own subtree"),
            Self::NodeNotFound(name) => write!(f, "no node named '{name}' in scene"),
            Self::StaleNode => write!(f, "node id refers to a removed node"),
        }
    }
}

impl std::error::Error for SceneError {}
