use cgmath::Vector3;

use crate::models::TexturedModel;

/// One placement of a textured model in the world. Entities are plain data;
/// the scene hands them to the renderer every frame and the renderer forgets
/// them again once the frame is drawn.
#[derive(Debug, Clone, Copy)]
pub struct Entity {
    pub model: TexturedModel,
    pub position: Vector3<f32>,
    pub rot_x: f32,
    pub rot_y: f32,
    pub rot_z: f32,
    pub scale: f32,
}

impl Entity {
    pub fn new(
        model: TexturedModel,
        position: Vector3<f32>,
        rot_x: f32,
        rot_y: f32,
        rot_z: f32,
        scale: f32,
    ) -> Self {
        Self {
            model,
            position,
            rot_x,
            rot_y,
            rot_z,
            scale,
        }
    }
}

/// The scene's single directional light source.
#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub position: Vector3<f32>,
    pub colour: Vector3<f32>,
}

impl Light {
    pub fn new(position: Vector3<f32>, colour: Vector3<f32>) -> Self {
        Self { position, colour }
    }
}
