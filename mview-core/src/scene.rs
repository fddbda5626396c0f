use std::rc::Rc;

use crate::environment::EnvironmentMap;
use crate::geometry::Mesh;
use crate::material::StandardMaterial;
use crate::transform::Transform;

/// A mesh placed in the scene
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub mesh: Mesh,
    pub transform: Transform,
}

impl SceneObject {
    pub fn new(mesh: Mesh, transform: Transform) -> Self {
        Self { mesh, transform }
    }
}

/// Renderable objects plus the global display state drawn with them.
///
/// Every object is drawn with the one scene material, so a material change
/// applies to meshes added before and after it.
#[derive(Debug, Clone)]
pub struct Scene {
    objects: Vec<SceneObject>,
    pub material: StandardMaterial,
    background: Option<Rc<EnvironmentMap>>,
    environment: Option<Rc<EnvironmentMap>>,
    pub background_blurriness: f32,
    pub background_intensity: f32,
}

impl Scene {
    pub fn new(material: StandardMaterial) -> Self {
        Self {
            objects: Vec::new(),
            material,
            background: None,
            environment: None,
            background_blurriness: 0.0,
            background_intensity: 1.0,
        }
    }

    pub fn add(&mut self, object: SceneObject) {
        self.objects.push(object);
    }

    /// Removes every object, keeping material and environment.
    pub fn clear_objects(&mut self) {
        self.objects.clear();
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn background(&self) -> Option<&EnvironmentMap> {
        self.background.as_deref()
    }

    pub fn set_background(&mut self, texture: Rc<EnvironmentMap>) {
        self.background = Some(texture);
    }

    /// Texture used for image-based lighting
    pub fn environment(&self) -> Option<&EnvironmentMap> {
        self.environment.as_deref()
    }

    pub fn set_environment(&mut self, texture: Rc<EnvironmentMap>) {
        self.environment = Some(texture);
    }

    /// Whether background and environment are the same texture instance.
    pub fn shares_background_and_environment(&self) -> bool {
        match (&self.background, &self.environment) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(StandardMaterial::default())
    }
}
