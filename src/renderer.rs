use std::collections::HashMap;

use cgmath::{vec3, Deg};
use glow::HasContext;
use log::trace;

use crate::camera::Camera;
use crate::entity::{Entity, Light};
use crate::error::EngineError;
use crate::maths;
use crate::models::TexturedModel;
use crate::shaders::{StaticShader, TerrainShader};
use crate::terrain::Terrain;

const FOV: f32 = 70.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 1000.0;

const SKY_RED: f32 = 0.54;
const SKY_GREEN: f32 = 0.62;
const SKY_BLUE: f32 = 0.69;

/// Per-frame grouping of entities by the GPU state they need. Everything
/// drawn with the same mesh and texture lands in one batch, so the renderer
/// binds that state once and then only uploads a transform per instance.
/// Rebuilt from scratch every frame; order within a batch follows insertion.
#[derive(Default)]
pub struct EntityBatches {
    batches: HashMap<TexturedModel, Vec<Entity>>,
}

impl EntityBatches {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: Entity) {
        self.batches.entry(entity.model).or_default().push(entity);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TexturedModel, &Vec<Entity>)> {
        self.batches.iter()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn instance_count(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    pub fn clear(&mut self) {
        self.batches.clear();
    }
}

pub fn enable_culling(gl: &glow::Context) {
    unsafe {
        gl.enable(glow::CULL_FACE);
        gl.cull_face(glow::BACK);
    }
}

pub fn disable_culling(gl: &glow::Context) {
    unsafe {
        gl.disable(glow::CULL_FACE);
    }
}

/// Draws entity batches with the static shader. One bind/unbind pair of GPU
/// state per distinct model+texture, one indexed draw per instance.
pub struct EntityRenderer;

impl EntityRenderer {
    pub fn render(&self, gl: &glow::Context, shader: &StaticShader, batches: &EntityBatches) {
        for (model, batch) in batches.iter() {
            self.prepare_textured_model(gl, shader, model);
            for entity in batch {
                self.prepare_instance(gl, shader, entity);
                unsafe {
                    gl.draw_elements(
                        glow::TRIANGLES,
                        model.raw_model.vertex_count,
                        glow::UNSIGNED_INT,
                        0,
                    );
                }
            }
            self.unbind_textured_model(gl);
        }
    }

    fn prepare_textured_model(&self, gl: &glow::Context, shader: &StaticShader, model: &TexturedModel) {
        unsafe {
            gl.bind_vertex_array(Some(model.raw_model.vao));
            gl.enable_vertex_attrib_array(0);
            gl.enable_vertex_attrib_array(1);
            gl.enable_vertex_attrib_array(2);
        }
        let texture = &model.texture;
        // Double-sided foliage keeps its back faces for the span of this
        // batch; unbind restores culling.
        if texture.has_transparency {
            disable_culling(gl);
        }
        shader.load_fake_lighting(gl, texture.use_fake_lighting);
        shader.load_shine_variables(gl, texture.shine_damper, texture.reflectivity);
        unsafe {
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(texture.id));
        }
    }

    fn unbind_textured_model(&self, gl: &glow::Context) {
        enable_culling(gl);
        unsafe {
            gl.disable_vertex_attrib_array(0);
            gl.disable_vertex_attrib_array(1);
            gl.disable_vertex_attrib_array(2);
            gl.bind_vertex_array(None);
        }
    }

    fn prepare_instance(&self, gl: &glow::Context, shader: &StaticShader, entity: &Entity) {
        let transformation = maths::create_transformation_matrix(
            entity.position,
            entity.rot_x,
            entity.rot_y,
            entity.rot_z,
            entity.scale,
        );
        shader.load_transformation_matrix(gl, &transformation);
    }
}

/// Draws terrain tiles. Same bind/enable/draw/disable/unbind shape as the
/// entity renderer but without batching — tiles are few and each carries its
/// own texture set.
pub struct TerrainRenderer;

impl TerrainRenderer {
    pub fn render(&self, gl: &glow::Context, shader: &TerrainShader, terrains: &[Terrain]) {
        for terrain in terrains {
            self.prepare_terrain(gl, shader, terrain);
            self.load_model_matrix(gl, shader, terrain);
            unsafe {
                gl.draw_elements(
                    glow::TRIANGLES,
                    terrain.model.vertex_count,
                    glow::UNSIGNED_INT,
                    0,
                );
            }
            self.unbind_terrain(gl);
        }
    }

    fn prepare_terrain(&self, gl: &glow::Context, shader: &TerrainShader, terrain: &Terrain) {
        unsafe {
            gl.bind_vertex_array(Some(terrain.model.vao));
            gl.enable_vertex_attrib_array(0);
            gl.enable_vertex_attrib_array(1);
            gl.enable_vertex_attrib_array(2);
        }
        self.bind_textures(gl, terrain);
        shader.load_shine_variables(gl, 1.0, 0.0);
    }

    /// The four surface textures on units 0-3 and the blend map on unit 4,
    /// matching the sampler wiring done once at shader construction.
    fn bind_textures(&self, gl: &glow::Context, terrain: &Terrain) {
        let pack = &terrain.texture_pack;
        unsafe {
            gl.active_texture(glow::TEXTURE0);
            gl.bind_texture(glow::TEXTURE_2D, Some(pack.background_texture.id));
            gl.active_texture(glow::TEXTURE1);
            gl.bind_texture(glow::TEXTURE_2D, Some(pack.r_texture.id));
            gl.active_texture(glow::TEXTURE2);
            gl.bind_texture(glow::TEXTURE_2D, Some(pack.g_texture.id));
            gl.active_texture(glow::TEXTURE3);
            gl.bind_texture(glow::TEXTURE_2D, Some(pack.b_texture.id));
            gl.active_texture(glow::TEXTURE4);
            gl.bind_texture(glow::TEXTURE_2D, Some(terrain.blend_map.id));
        }
    }

    fn unbind_terrain(&self, gl: &glow::Context) {
        unsafe {
            gl.disable_vertex_attrib_array(0);
            gl.disable_vertex_attrib_array(1);
            gl.disable_vertex_attrib_array(2);
            gl.bind_vertex_array(None);
        }
    }

    fn load_model_matrix(&self, gl: &glow::Context, shader: &TerrainShader, terrain: &Terrain) {
        let transformation = maths::create_transformation_matrix(
            vec3(terrain.x, 0.0, terrain.z),
            0.0,
            0.0,
            0.0,
            1.0,
        );
        shader.load_transformation_matrix(gl, &transformation);
    }
}

/// Owns both shaders and delegating renderers, collects the frame's draw
/// submissions and turns them into draws. After `render` returns, the
/// collections are empty again: nothing drawn this frame influences the
/// next.
pub struct MasterRenderer {
    static_shader: StaticShader,
    terrain_shader: TerrainShader,
    entity_renderer: EntityRenderer,
    terrain_renderer: TerrainRenderer,
    entities: EntityBatches,
    terrains: Vec<Terrain>,
}

impl MasterRenderer {
    pub fn new(gl: &glow::Context, aspect_ratio: f32) -> Result<Self, EngineError> {
        enable_culling(gl);

        let static_shader = StaticShader::new(gl)?;
        let terrain_shader = TerrainShader::new(gl)?;

        let renderer = Self {
            static_shader,
            terrain_shader,
            entity_renderer: EntityRenderer,
            terrain_renderer: TerrainRenderer,
            entities: EntityBatches::new(),
            terrains: Vec::new(),
        };
        renderer.load_projection(gl, aspect_ratio);
        Ok(renderer)
    }

    /// Camera intrinsics change only when the window aspect does, so the
    /// projection is pushed into both programs here rather than per frame.
    pub fn load_projection(&self, gl: &glow::Context, aspect_ratio: f32) {
        let projection = cgmath::perspective(Deg(FOV), aspect_ratio, NEAR_PLANE, FAR_PLANE);
        self.static_shader.start(gl);
        self.static_shader.load_projection_matrix(gl, &projection);
        self.static_shader.stop(gl);
        self.terrain_shader.start(gl);
        self.terrain_shader.load_projection_matrix(gl, &projection);
        self.terrain_shader.connect_texture_units(gl);
        self.terrain_shader.stop(gl);
    }

    pub fn process_entity(&mut self, entity: &Entity) {
        self.entities.push(*entity);
    }

    pub fn process_terrain(&mut self, terrain: &Terrain) {
        self.terrains.push(*terrain);
    }

    pub fn render(&mut self, gl: &glow::Context, light: &Light, camera: &Camera) {
        trace!(
            "frame: {} batches, {} instances, {} terrain tiles",
            self.entities.batch_count(),
            self.entities.instance_count(),
            self.terrains.len()
        );
        self.prepare(gl);

        self.terrain_shader.start(gl);
        self.terrain_shader.load_sky_colour(gl, SKY_RED, SKY_GREEN, SKY_BLUE);
        self.terrain_shader.load_light(gl, light);
        self.terrain_shader.load_view_matrix(gl, camera);
        self.terrain_renderer
            .render(gl, &self.terrain_shader, &self.terrains);
        self.terrain_shader.stop(gl);

        self.static_shader.start(gl);
        self.static_shader.load_sky_colour(gl, SKY_RED, SKY_GREEN, SKY_BLUE);
        self.static_shader.load_light(gl, light);
        self.static_shader.load_view_matrix(gl, camera);
        self.entity_renderer
            .render(gl, &self.static_shader, &self.entities);
        self.static_shader.stop(gl);

        self.terrains.clear();
        self.entities.clear();
    }

    fn prepare(&self, gl: &glow::Context) {
        unsafe {
            gl.enable(glow::DEPTH_TEST);
            gl.clear_color(SKY_RED, SKY_GREEN, SKY_BLUE, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    pub fn clean_up(&self, gl: &glow::Context) {
        self.static_shader.clean_up(gl);
        self.terrain_shader.clean_up(gl);
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;

    use cgmath::vec3;

    use super::*;
    use crate::models::RawModel;
    use crate::texture::ModelTexture;

    fn model(vao: u32, tex: u32) -> TexturedModel {
        TexturedModel::new(
            RawModel::new(glow::NativeVertexArray(NonZeroU32::new(vao).unwrap()), 6),
            ModelTexture::new(glow::NativeTexture(NonZeroU32::new(tex).unwrap())),
        )
    }

    fn entity(model: TexturedModel, x: f32) -> Entity {
        Entity::new(model, vec3(x, 0.0, 0.0), 0.0, 0.0, 0.0, 1.0)
    }

    #[test]
    fn entities_group_by_shared_model_and_texture() {
        let tree = model(1, 1);
        let fern = model(2, 2);
        let mut batches = EntityBatches::new();
        batches.push(entity(tree, 0.0));
        batches.push(entity(fern, 1.0));
        batches.push(entity(tree, 2.0));
        batches.push(entity(tree, 3.0));

        assert_eq!(batches.batch_count(), 2);
        assert_eq!(batches.instance_count(), 4);
    }

    #[test]
    fn batch_preserves_insertion_order_within_a_key() {
        let tree = model(1, 1);
        let mut batches = EntityBatches::new();
        for x in 0..5 {
            batches.push(entity(tree, x as f32));
        }

        let (_, batch) = batches.iter().next().unwrap();
        let xs: Vec<f32> = batch.iter().map(|e| e.position.x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn same_mesh_with_different_texture_is_a_separate_batch() {
        let plain = model(1, 1);
        let mossy = model(1, 2);
        let mut batches = EntityBatches::new();
        batches.push(entity(plain, 0.0));
        batches.push(entity(mossy, 0.0));

        assert_eq!(batches.batch_count(), 2);
    }

    #[test]
    fn clear_leaves_no_instance_state_behind() {
        let tree = model(1, 1);
        let mut batches = EntityBatches::new();
        batches.push(entity(tree, 0.0));
        batches.clear();

        assert_eq!(batches.batch_count(), 0);
        assert_eq!(batches.instance_count(), 0);
    }
}
