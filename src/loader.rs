use std::path::Path;

use glow::HasContext;
use log::{debug, info};

use crate::error::EngineError;
use crate::models::RawModel;
use crate::obj::ModelData;

/// Loads geometry and image data into GPU objects and keeps track of every
/// VAO, VBO and texture it creates, so the whole session's worth of GPU
/// memory can be released in one sweep at shutdown. The loader is the sole
/// owner of these objects; models, renderers and shaders only ever hold
/// copies of the handle values and never delete anything themselves.
pub struct Loader {
    vaos: Vec<glow::VertexArray>,
    vbos: Vec<glow::Buffer>,
    textures: Vec<glow::Texture>,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            vaos: Vec::new(),
            vbos: Vec::new(),
            textures: Vec::new(),
        }
    }

    /// Stores one mesh's attribute arrays in a fresh VAO: positions on
    /// attribute slot 0, texture coordinates on slot 1, normals on slot 2,
    /// plus the index buffer. The arrays must already be consistent —
    /// `3 * V`, `2 * V` and `3 * V` floats for the same vertex count `V`,
    /// every index below `V` — which is exactly what mesh ingestion hands
    /// over.
    pub fn load_to_vao(
        &mut self,
        gl: &glow::Context,
        positions: &[f32],
        texture_coords: &[f32],
        normals: &[f32],
        indices: &[u32],
    ) -> RawModel {
        let vao = self.create_vao(gl);
        self.bind_indices_buffer(gl, indices);
        self.store_data_in_attribute_list(gl, 0, 3, positions);
        self.store_data_in_attribute_list(gl, 1, 2, texture_coords);
        self.store_data_in_attribute_list(gl, 2, 3, normals);
        unsafe {
            gl.bind_vertex_array(None);
        }
        RawModel::new(vao, indices.len() as i32)
    }

    pub fn load_model(&mut self, gl: &glow::Context, data: &ModelData) -> RawModel {
        self.load_to_vao(
            gl,
            &data.vertices,
            &data.texture_coords,
            &data.normals,
            &data.indices,
        )
    }

    /// Decodes an image file and uploads it as a mipmapped RGBA texture.
    /// A missing or undecodable file is fatal: the asset set is fixed at
    /// build time, so nothing is gained by substituting a placeholder.
    pub fn load_texture(
        &mut self,
        gl: &glow::Context,
        path: &Path,
    ) -> Result<glow::Texture, EngineError> {
        let img = image::open(path)
            .map_err(|e| EngineError::asset_load(path, e))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        let data = img.into_raw();

        unsafe {
            let texture = gl.create_texture().expect("failed to create texture");
            self.textures.push(texture);
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));

            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR_MIPMAP_LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );

            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(&data)),
            );

            gl.generate_mipmap(glow::TEXTURE_2D);
            // Sharpen minified texels a little; without the bias the mipmap
            // chain blurs ground textures noticeably.
            gl.tex_parameter_f32(glow::TEXTURE_2D, glow::TEXTURE_LOD_BIAS, -0.4);

            debug!("loaded texture {path:?} ({width}x{height})");
            Ok(texture)
        }
    }

    /// Deletes every tracked VAO, buffer and texture. The tracking lists are
    /// drained as they are walked, so calling this a second time is a no-op
    /// rather than a double delete, and anything that was never successfully
    /// created is simply not in a list to begin with.
    pub fn clean_up(&mut self, gl: &glow::Context) {
        if self.vaos.is_empty() && self.vbos.is_empty() && self.textures.is_empty() {
            return;
        }
        info!(
            "releasing {} vertex arrays, {} buffers, {} textures",
            self.vaos.len(),
            self.vbos.len(),
            self.textures.len()
        );
        unsafe {
            for vao in self.vaos.drain(..) {
                gl.delete_vertex_array(vao);
            }
            for vbo in self.vbos.drain(..) {
                gl.delete_buffer(vbo);
            }
            for texture in self.textures.drain(..) {
                gl.delete_texture(texture);
            }
        }
    }

    fn create_vao(&mut self, gl: &glow::Context) -> glow::VertexArray {
        unsafe {
            let vao = gl
                .create_vertex_array()
                .expect("failed to create vertex array");
            self.vaos.push(vao);
            gl.bind_vertex_array(Some(vao));
            vao
        }
    }

    /// Uploads one tightly packed float attribute stream into its own VBO
    /// and points the given attribute slot at it. The slot is only wired up
    /// here; enabling it is the renderer's per-draw business.
    fn store_data_in_attribute_list(
        &mut self,
        gl: &glow::Context,
        attribute: u32,
        component_count: i32,
        data: &[f32],
    ) {
        unsafe {
            let vbo = gl.create_buffer().expect("failed to create buffer");
            self.vbos.push(vbo);
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(data),
                glow::STATIC_DRAW,
            );
            gl.vertex_attrib_pointer_f32(attribute, component_count, glow::FLOAT, false, 0, 0);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }

    fn bind_indices_buffer(&mut self, gl: &glow::Context, indices: &[u32]) {
        unsafe {
            let vbo = gl.create_buffer().expect("failed to create buffer");
            self.vbos.push(vbo);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STATIC_DRAW,
            );
        }
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
