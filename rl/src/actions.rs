//! Agent action declarations.
//!
//! Pure declarations of what an agent can do, consumed by the external
//! RL loop and forwarded verbatim to the engine. The default mappings
//! mirror the stock locomotion controllers.

/// Declares an agent's action interface.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionSpace {
    /// One action chosen per step from a named list.
    Discrete {
        /// Controller name (engine-side binding key).
        name: String,
        /// Action labels; the policy emits an index into this list.
        actions: Vec<String>,
    },
    /// One f32 per axis per step, in `[-1, 1]`.
    Continuous {
        /// Controller name (engine-side binding key).
        name: String,
        /// Axis labels, one feature each.
        axes: Vec<String>,
    },
}

impl ActionSpace {
    /// Default discrete movement controller.
    pub fn discrete_movement() -> Self {
        Self::Discrete {
            name: "movement".to_owned(),
            actions: [
                "move_forward",
                "move_backward",
                "move_left",
                "move_right",
                "turn_left",
                "turn_right",
            ]
            .map(str::to_owned)
            .to_vec(),
        }
    }

    /// Default continuous movement controller.
    pub fn continuous_movement() -> Self {
        Self::Continuous {
            name: "movement".to_owned(),
            axes: ["move_forward_backward", "move_right_left", "turn_right_left"]
                .map(str::to_owned)
                .to_vec(),
        }
    }

    /// Number of choices (discrete) or axes (continuous).
    pub fn len(&self) -> usize {
        match self {
            Self::Discrete { actions, .. } => actions.len(),
            Self::Continuous { axes, .. } => axes.len(),
        }
    }

    /// Whether the space declares no actions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
