//! Scene management
//!
//! A flat list of entities, each pairing one [`Geometry`] with a material and
//! a shared transform. No parenting and no persistence.

mod animation;
mod camera;
mod light;
mod orbit;
mod transform;

pub use animation::*;
pub use camera::*;
pub use light::*;
pub use orbit::*;
pub use transform::*;

use glam::{Vec3, Vec4};

use crate::geometry::{Geometry, SceneAttachment};
use crate::ViewerConfig;

/// Surface material
#[derive(Debug, Clone, PartialEq)]
pub enum Material {
    Phong { diffuse: Vec3 },
}

impl Default for Material {
    fn default() -> Self {
        Material::Phong { diffuse: Vec3::ONE }
    }
}

impl Material {
    pub fn phong(diffuse: Vec3) -> Self {
        Material::Phong { diffuse }
    }

    pub fn diffuse(&self) -> Vec3 {
        match self {
            Material::Phong { diffuse } => *diffuse,
        }
    }
}

/// Identifier of an entity within its scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

/// Geometry attached alongside a material and a transform
#[derive(Debug)]
pub struct Entity {
    pub geometry: Geometry,
    pub material: Material,
    pub transform: SharedTransform,
}

/// The scene containing all renderable content
#[derive(Debug)]
pub struct Scene {
    pub camera: Camera,
    pub light: PointLight,
    pub clear_color: Vec4,
    entities: Vec<Option<Entity>>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            camera: Camera::default(),
            light: PointLight::default(),
            clear_color: crate::DEFAULT_CLEAR_COLOR,
            entities: Vec::new(),
        }
    }

    /// Camera, light and clear color from a viewer configuration
    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut camera = config.camera.clone();
        if camera
            .set_aspect(config.width as f32, config.height as f32)
            .is_err()
        {
            log::warn!(
                "Keeping camera aspect {} for a {}x{} window",
                camera.aspect,
                config.width,
                config.height
            );
        }
        log::info!(
            "Scene for '{}': camera at {}, light at {}",
            config.title,
            camera.position,
            config.light.position
        );
        Self {
            camera,
            light: config.light.clone(),
            clear_color: config.clear_color,
            entities: Vec::new(),
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)?.as_ref()
    }

    /// Detach an entity, destroying its geometry with it
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.get_mut(id.0)?.take();
        if entity.is_some() {
            log::info!("Removed entity {}", id.0);
        }
        entity
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.entities
            .iter()
            .enumerate()
            .filter_map(|(i, e)| Some((EntityId(i), e.as_ref()?)))
    }

    pub fn len(&self) -> usize {
        self.entities.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indices drawn per frame across all entities
    pub fn index_count(&self) -> u64 {
        self.entities()
            .map(|(_, e)| e.geometry.index_count() as u64)
            .sum()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneAttachment for Scene {
    type Material = Material;
    type Transform = SharedTransform;
    type Handle = EntityId;

    fn attach(
        &mut self,
        geometry: Geometry,
        material: Material,
        transform: SharedTransform,
    ) -> EntityId {
        let id = EntityId(self.entities.len());
        log::info!(
            "Attached {:?} as entity {} ({} vertices)",
            geometry.label(),
            id.0,
            geometry.vertex_count()
        );
        self.entities.push(Some(Entity {
            geometry,
            material,
            transform,
        }));
        id
    }
}
