//! Materials and renderers of mirror surfaces.
//!
//! Mirror surfaces publish their reflection textures through texture
//! properties on the materials of their renderer. A property is only written
//! when the material declares it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Opaque handle to a texture allocated by the host renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u64);

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "texture#{}", self.0)
    }
}

/// A material with named texture slots.
#[derive(Debug, Clone, Default)]
pub struct Material {
    name: String,
    textures: HashMap<String, Option<TextureHandle>>,
}

impl Material {
    /// Creates a material without texture properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            textures: HashMap::new(),
        }
    }

    /// Declares a texture property, initially unbound.
    #[must_use]
    pub fn with_texture_property(mut self, property: impl Into<String>) -> Self {
        self.textures.insert(property.into(), None);
        self
    }

    /// Returns the material name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the material declares the given texture property.
    pub fn has_property(&self, property: &str) -> bool {
        self.textures.contains_key(property)
    }

    /// Binds a texture to an existing property.
    ///
    /// Returns `false` (and changes nothing) if the property is not declared.
    pub fn set_texture(&mut self, property: &str, texture: TextureHandle) -> bool {
        match self.textures.get_mut(property) {
            Some(slot) => {
                *slot = Some(texture);
                true
            }
            None => false,
        }
    }

    /// Returns the texture bound to a property.
    pub fn texture(&self, property: &str) -> Option<TextureHandle> {
        self.textures.get(property).copied().flatten()
    }
}

/// A material that may be shared between several renderers.
pub type SharedMaterial = Arc<RwLock<Material>>;

/// Wraps a material for sharing.
pub fn shared(material: Material) -> SharedMaterial {
    Arc::new(RwLock::new(material))
}

/// The renderer component drawing a mirror surface's mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshRenderer {
    /// Whether the renderer draws at all.
    pub enabled: bool,
    /// Shared materials, one per sub-mesh.
    pub materials: Vec<SharedMaterial>,
}

impl MeshRenderer {
    /// Creates an enabled renderer with the given shared materials.
    pub fn new(materials: Vec<SharedMaterial>) -> Self {
        Self {
            enabled: true,
            materials,
        }
    }

    /// Returns the primary shared material.
    pub fn shared_material(&self) -> Option<&SharedMaterial> {
        self.materials.first()
    }

    /// Binds `texture` to `property` on every material that declares it.
    ///
    /// Returns the number of materials written.
    pub fn bind_texture(&self, property: &str, texture: TextureHandle) -> usize {
        let mut written = 0;
        for material in &self.materials {
            match material.write() {
                Ok(mut material) => {
                    if material.set_texture(property, texture) {
                        written += 1;
                    }
                }
                Err(_) => log::warn!("material lock poisoned, skipping '{property}'"),
            }
        }
        written
    }
}
