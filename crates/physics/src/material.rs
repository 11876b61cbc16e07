//! Surface materials shared by shapes.
//!
//! A material is immutable once created. The registry hands out reference-counted
//! handles; shapes keep a clone of the handle, so the material outlives every shape
//! that uses it.

use crate::error::{ensure_non_negative, Result};
use std::fmt;
use std::sync::Arc;

/// Identifier assigned by the registry, unique per registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(u32);

impl fmt::Display for MaterialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "material#{}", self.0)
    }
}

/// Friction and restitution coefficients of a surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    id: MaterialId,
    static_friction: f32,
    dynamic_friction: f32,
    restitution: f32,
}

/// Shared handle to a registered material.
pub type MaterialRef = Arc<Material>;

impl Material {
    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub fn static_friction(&self) -> f32 {
        self.static_friction
    }

    pub fn dynamic_friction(&self) -> f32 {
        self.dynamic_friction
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Friction coefficient handed to the kernel, which models a single coefficient
    /// for both sticking and sliding contacts.
    pub(crate) fn kernel_friction(&self) -> f32 {
        self.dynamic_friction
    }
}

/// Owns every material created for a scene, in creation order.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: Vec<MaterialRef>,
    next_id: u32,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new material. Identical coefficients still yield a distinct material.
    pub fn create(
        &mut self,
        static_friction: f32,
        dynamic_friction: f32,
        restitution: f32,
    ) -> Result<MaterialRef> {
        const CONTEXT: &str = "create_material";
        ensure_non_negative(CONTEXT, "static friction", static_friction)?;
        ensure_non_negative(CONTEXT, "dynamic friction", dynamic_friction)?;
        ensure_non_negative(CONTEXT, "restitution", restitution)?;

        let material = Arc::new(Material {
            id: MaterialId(self.next_id),
            static_friction,
            dynamic_friction,
            restitution,
        });
        self.next_id += 1;
        self.materials.push(Arc::clone(&material));
        log::debug!(
            "created {} (static {static_friction}, dynamic {dynamic_friction}, \
             restitution {restitution})",
            material.id
        );
        Ok(material)
    }

    pub fn get(&self, id: MaterialId) -> Option<&MaterialRef> {
        self.materials.iter().find(|m| m.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MaterialRef> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.materials.clear();
    }
}
