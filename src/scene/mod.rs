//! Scene management

mod camera;
mod camera_controller;
mod light;
mod transform;

pub use camera::*;
pub use camera_controller::*;
pub use light::*;
pub use transform::*;

use glam::Vec3;

use crate::resources::{Material, Mesh};

/// Index of a render object inside its [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// A renderable object in the scene
#[derive(Debug, Clone)]
pub struct RenderObject {
    pub mesh_id: usize,
    pub material_id: usize,
    pub transform: Transform,
}

impl RenderObject {
    pub fn new(mesh_id: usize, material_id: usize) -> Self {
        Self {
            mesh_id,
            material_id,
            transform: Transform::default(),
        }
    }
}

/// The scene containing all renderable content
///
/// Meshes and materials are stored once and shared by index. Objects and
/// resources are only ever appended, so indices stay valid.
pub struct Scene {
    pub lights: Vec<DirectionalLight>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub objects: Vec<RenderObject>,
    /// Linear RGB added to every lit surface
    pub ambient_light: Vec3,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            lights: Vec::new(),
            meshes: Vec::new(),
            materials: Vec::new(),
            objects: Vec::new(),
            ambient_light: Vec3::ZERO,
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Add a directional light to the scene
    pub fn add_directional_light(&mut self, light: DirectionalLight) {
        self.lights.push(light);
    }

    /// Add a render object to the scene
    pub fn add_object(&mut self, object: RenderObject) -> ObjectId {
        let id = ObjectId(self.objects.len());
        self.objects.push(object);
        id
    }

    pub fn object(&self, id: ObjectId) -> Option<&RenderObject> {
        self.objects.get(id.0)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut RenderObject> {
        self.objects.get_mut(id.0)
    }

    /// The light used for shading; only the first one contributes
    pub fn directional_light(&self) -> Option<&DirectionalLight> {
        self.lights.first()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objects_reference_shared_resources() {
        let mut scene = Scene::new();
        let mesh = scene.add_mesh(Mesh::cube());
        let material = scene.add_material(Material::standard());
        let a = scene.add_object(RenderObject::new(mesh, material));
        let b = scene.add_object(RenderObject::new(mesh, material));

        assert_ne!(a, b);
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.object(b).map(|o| o.mesh_id), Some(mesh));
        assert!(scene.object(ObjectId(5)).is_none());
    }

    #[test]
    fn object_mut_edits_in_place() {
        let mut scene = Scene::new();
        let id = scene.add_object(RenderObject::new(0, 0));
        if let Some(obj) = scene.object_mut(id) {
            obj.transform.rotate_y(0.25);
        }
        assert_eq!(scene.object(id).map(|o| o.transform.rotation.y), Some(0.25));
    }

    #[test]
    fn first_light_is_the_directional_light() {
        let mut scene = Scene::new();
        assert!(scene.directional_light().is_none());
        scene.add_directional_light(DirectionalLight::new(Vec3::ONE, 1.0));
        scene.add_directional_light(DirectionalLight::new(Vec3::X, 0.5));
        assert_eq!(scene.directional_light().map(|l| l.intensity), Some(1.0));
    }
}
