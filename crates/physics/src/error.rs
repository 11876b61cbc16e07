//! Error taxonomy for scene construction and simulation.
//!
//! Every error is raised synchronously by the call that detects it and none are retried:
//! they all stem from invalid configuration, not from resource contention.

use crate::actor::ActorId;
use crate::joint::JointId;
use crate::scene::SceneState;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PhysicsError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// Malformed input, detected before the kernel is touched.
    #[error("invalid parameter in {context}: {reason}")]
    InvalidParameter {
        context: &'static str,
        reason: String,
    },

    /// A shape index at or past the actor's shape count.
    #[error("shape index {index} out of range (actor has {count} shapes)")]
    IndexOutOfRange { index: usize, count: usize },

    /// The kernel rejected geometry handed to the cooker. No shape is created.
    #[error("mesh cooking failed: {reason}")]
    Cooking { reason: String },

    /// The kernel context could not be created. The scene must not be stepped.
    #[error("kernel initialization failed: {reason}")]
    KernelInitialization { reason: String },

    /// Removing this actor would leave joints pointing at nothing.
    #[error("{actor} is still referenced by {} joint(s): {joints:?}", .joints.len())]
    DanglingReference { actor: ActorId, joints: Vec<JointId> },

    #[error("{0} is not registered in this scene")]
    UnknownActor(ActorId),

    #[error("{0} is not registered in this scene")]
    UnknownJoint(JointId),

    #[error("{joint} is a {actual} joint, not a {expected} joint")]
    JointKindMismatch {
        joint: JointId,
        expected: &'static str,
        actual: &'static str,
    },

    /// Shapes were added to a dynamic actor after its last mass recompute.
    #[error("dynamic actor '{actor}' has shapes added after its last mass recompute")]
    StaleMassProperties { actor: String },

    #[error("scene is {actual:?}, operation requires {expected:?}")]
    InvalidState {
        expected: SceneState,
        actual: SceneState,
    },
}

impl PhysicsError {
    pub(crate) fn invalid(context: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            context,
            reason: reason.into(),
        }
    }

    pub(crate) fn cooking(reason: impl Into<String>) -> Self {
        Self::Cooking {
            reason: reason.into(),
        }
    }

    /// True for malformed-input errors, including shape index bounds violations.
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. } | Self::IndexOutOfRange { .. }
        )
    }
}

/// Reject negative or non-finite values.
pub(crate) fn ensure_non_negative(context: &'static str, name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(PhysicsError::invalid(
            context,
            format!("{name} must be finite and >= 0, got {value}"),
        ));
    }
    Ok(())
}

/// Reject zero, negative or non-finite values.
pub(crate) fn ensure_positive(context: &'static str, name: &str, value: f32) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PhysicsError::invalid(
            context,
            format!("{name} must be finite and > 0, got {value}"),
        ));
    }
    Ok(())
}
