use std::fs;
use std::path::Path;

use cgmath::{Matrix4, Vector3};
use glow::HasContext;
use log::debug;

use crate::camera::Camera;
use crate::entity::Light;
use crate::error::EngineError;
use crate::maths;

/// A compiled and linked GLSL program plus its two stage objects.
///
/// The concrete shaders below are thin layers over this: each one passes its
/// fixed attribute-slot contract to [`ShaderProgram::new`], resolves every
/// uniform it needs right after linking and caches the locations in named
/// fields, so no draw ever looks a uniform up by name.
pub struct ShaderProgram {
    program: glow::Program,
    vertex_shader: glow::Shader,
    fragment_shader: glow::Shader,
}

impl ShaderProgram {
    /// Compiles both stages, binds the attribute slots to their shader-input
    /// names and links. A compile or link failure is a broken build, not a
    /// runtime condition: the error carries the driver's info log and is
    /// expected to take the process down from the startup path.
    pub fn new(
        gl: &glow::Context,
        vertex_file: &Path,
        fragment_file: &Path,
        attributes: &[(u32, &str)],
    ) -> Result<Self, EngineError> {
        let vertex_shader = load_shader(gl, vertex_file, glow::VERTEX_SHADER)?;
        let fragment_shader = load_shader(gl, fragment_file, glow::FRAGMENT_SHADER)?;

        unsafe {
            let program = gl.create_program().expect("failed to create shader program");
            gl.attach_shader(program, vertex_shader);
            gl.attach_shader(program, fragment_shader);
            for (slot, name) in attributes {
                gl.bind_attrib_location(program, *slot, name);
            }
            gl.link_program(program);
            if !gl.get_program_link_status(program) {
                return Err(EngineError::ShaderLink {
                    log: gl.get_program_info_log(program),
                });
            }
            gl.validate_program(program);
            debug!("linked shader program from {vertex_file:?} + {fragment_file:?}");

            Ok(Self {
                program,
                vertex_shader,
                fragment_shader,
            })
        }
    }

    pub fn start(&self, gl: &glow::Context) {
        unsafe {
            gl.use_program(Some(self.program));
        }
    }

    pub fn stop(&self, gl: &glow::Context) {
        unsafe {
            gl.use_program(None);
        }
    }

    /// Detaches and deletes both stages, then the program. Call once, at
    /// shutdown.
    pub fn clean_up(&self, gl: &glow::Context) {
        self.stop(gl);
        unsafe {
            gl.detach_shader(self.program, self.vertex_shader);
            gl.detach_shader(self.program, self.fragment_shader);
            gl.delete_shader(self.vertex_shader);
            gl.delete_shader(self.fragment_shader);
            gl.delete_program(self.program);
        }
    }

    /// Resolves a uniform once, at construction time. `None` (a name the
    /// driver optimized out) makes the corresponding loads silent no-ops,
    /// same as loading to location -1 in plain GL.
    pub fn uniform_location(&self, gl: &glow::Context, name: &str) -> Option<glow::UniformLocation> {
        unsafe { gl.get_uniform_location(self.program, name) }
    }

    pub fn load_float(&self, gl: &glow::Context, location: Option<&glow::UniformLocation>, value: f32) {
        unsafe {
            gl.uniform_1_f32(location, value);
        }
    }

    pub fn load_int(&self, gl: &glow::Context, location: Option<&glow::UniformLocation>, value: i32) {
        unsafe {
            gl.uniform_1_i32(location, value);
        }
    }

    pub fn load_vector(
        &self,
        gl: &glow::Context,
        location: Option<&glow::UniformLocation>,
        vector: Vector3<f32>,
    ) {
        unsafe {
            gl.uniform_3_f32(location, vector.x, vector.y, vector.z);
        }
    }

    /// GLSL has no boolean uniforms; true goes over the wire as 1.0 and
    /// false as 0.0.
    pub fn load_bool(&self, gl: &glow::Context, location: Option<&glow::UniformLocation>, value: bool) {
        self.load_float(gl, location, if value { 1.0 } else { 0.0 });
    }

    pub fn load_matrix(
        &self,
        gl: &glow::Context,
        location: Option<&glow::UniformLocation>,
        matrix: &Matrix4<f32>,
    ) {
        let values: &[f32; 16] = matrix.as_ref();
        unsafe {
            gl.uniform_matrix_4_f32_slice(location, false, values);
        }
    }
}

fn load_shader(
    gl: &glow::Context,
    path: &Path,
    stage: u32,
) -> Result<glow::Shader, EngineError> {
    let source = fs::read_to_string(path).map_err(|e| EngineError::asset_load(path, e))?;
    unsafe {
        let shader = gl.create_shader(stage).expect("failed to create shader");
        gl.shader_source(shader, &source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            return Err(EngineError::ShaderCompile {
                path: path.to_path_buf(),
                log: gl.get_shader_info_log(shader),
            });
        }
        Ok(shader)
    }
}

/// Shader used for all textured entities: one directional light, specular
/// highlights, distance fog and the fake-lighting escape hatch for billboard
/// foliage.
pub struct StaticShader {
    program: ShaderProgram,
    location_transformation_matrix: Option<glow::UniformLocation>,
    location_projection_matrix: Option<glow::UniformLocation>,
    location_view_matrix: Option<glow::UniformLocation>,
    location_light_position: Option<glow::UniformLocation>,
    location_light_colour: Option<glow::UniformLocation>,
    location_shine_damper: Option<glow::UniformLocation>,
    location_reflectivity: Option<glow::UniformLocation>,
    location_use_fake_lighting: Option<glow::UniformLocation>,
    location_sky_colour: Option<glow::UniformLocation>,
}

const STATIC_VERTEX_FILE: &str = "shaders/static_vertex.glsl";
const STATIC_FRAGMENT_FILE: &str = "shaders/static_fragment.glsl";

impl StaticShader {
    pub fn new(gl: &glow::Context) -> Result<Self, EngineError> {
        let program = ShaderProgram::new(
            gl,
            STATIC_VERTEX_FILE.as_ref(),
            STATIC_FRAGMENT_FILE.as_ref(),
            &[(0, "position"), (1, "textureCoordinates"), (2, "normal")],
        )?;
        Ok(Self {
            location_transformation_matrix: program.uniform_location(gl, "transformationMatrix"),
            location_projection_matrix: program.uniform_location(gl, "projectionMatrix"),
            location_view_matrix: program.uniform_location(gl, "viewMatrix"),
            location_light_position: program.uniform_location(gl, "lightPosition"),
            location_light_colour: program.uniform_location(gl, "lightColour"),
            location_shine_damper: program.uniform_location(gl, "shineDamper"),
            location_reflectivity: program.uniform_location(gl, "reflectivity"),
            location_use_fake_lighting: program.uniform_location(gl, "useFakeLighting"),
            location_sky_colour: program.uniform_location(gl, "skyColour"),
            program,
        })
    }

    pub fn start(&self, gl: &glow::Context) {
        self.program.start(gl);
    }

    pub fn stop(&self, gl: &glow::Context) {
        self.program.stop(gl);
    }

    pub fn clean_up(&self, gl: &glow::Context) {
        self.program.clean_up(gl);
    }

    pub fn load_transformation_matrix(&self, gl: &glow::Context, matrix: &Matrix4<f32>) {
        self.program
            .load_matrix(gl, self.location_transformation_matrix.as_ref(), matrix);
    }

    pub fn load_projection_matrix(&self, gl: &glow::Context, matrix: &Matrix4<f32>) {
        self.program
            .load_matrix(gl, self.location_projection_matrix.as_ref(), matrix);
    }

    pub fn load_view_matrix(&self, gl: &glow::Context, camera: &Camera) {
        let view = maths::create_view_matrix(camera);
        self.program
            .load_matrix(gl, self.location_view_matrix.as_ref(), &view);
    }

    pub fn load_light(&self, gl: &glow::Context, light: &Light) {
        self.program
            .load_vector(gl, self.location_light_position.as_ref(), light.position);
        self.program
            .load_vector(gl, self.location_light_colour.as_ref(), light.colour);
    }

    pub fn load_shine_variables(&self, gl: &glow::Context, damper: f32, reflectivity: f32) {
        self.program
            .load_float(gl, self.location_shine_damper.as_ref(), damper);
        self.program
            .load_float(gl, self.location_reflectivity.as_ref(), reflectivity);
    }

    pub fn load_fake_lighting(&self, gl: &glow::Context, use_fake: bool) {
        self.program
            .load_bool(gl, self.location_use_fake_lighting.as_ref(), use_fake);
    }

    pub fn load_sky_colour(&self, gl: &glow::Context, r: f32, g: f32, b: f32) {
        self.program
            .load_vector(gl, self.location_sky_colour.as_ref(), cgmath::vec3(r, g, b));
    }
}

/// Shader for terrain tiles: the entity lighting/fog model plus four surface
/// textures weighted by a blend map.
pub struct TerrainShader {
    program: ShaderProgram,
    location_transformation_matrix: Option<glow::UniformLocation>,
    location_projection_matrix: Option<glow::UniformLocation>,
    location_view_matrix: Option<glow::UniformLocation>,
    location_light_position: Option<glow::UniformLocation>,
    location_light_colour: Option<glow::UniformLocation>,
    location_shine_damper: Option<glow::UniformLocation>,
    location_reflectivity: Option<glow::UniformLocation>,
    location_sky_colour: Option<glow::UniformLocation>,
    location_background_texture: Option<glow::UniformLocation>,
    location_r_texture: Option<glow::UniformLocation>,
    location_g_texture: Option<glow::UniformLocation>,
    location_b_texture: Option<glow::UniformLocation>,
    location_blend_map: Option<glow::UniformLocation>,
}

const TERRAIN_VERTEX_FILE: &str = "shaders/terrain_vertex.glsl";
const TERRAIN_FRAGMENT_FILE: &str = "shaders/terrain_fragment.glsl";

impl TerrainShader {
    pub fn new(gl: &glow::Context) -> Result<Self, EngineError> {
        let program = ShaderProgram::new(
            gl,
            TERRAIN_VERTEX_FILE.as_ref(),
            TERRAIN_FRAGMENT_FILE.as_ref(),
            &[(0, "position"), (1, "textureCoordinates"), (2, "normal")],
        )?;
        Ok(Self {
            location_transformation_matrix: program.uniform_location(gl, "transformationMatrix"),
            location_projection_matrix: program.uniform_location(gl, "projectionMatrix"),
            location_view_matrix: program.uniform_location(gl, "viewMatrix"),
            location_light_position: program.uniform_location(gl, "lightPosition"),
            location_light_colour: program.uniform_location(gl, "lightColour"),
            location_shine_damper: program.uniform_location(gl, "shineDamper"),
            location_reflectivity: program.uniform_location(gl, "reflectivity"),
            location_sky_colour: program.uniform_location(gl, "skyColour"),
            location_background_texture: program.uniform_location(gl, "backgroundTexture"),
            location_r_texture: program.uniform_location(gl, "rTexture"),
            location_g_texture: program.uniform_location(gl, "gTexture"),
            location_b_texture: program.uniform_location(gl, "bTexture"),
            location_blend_map: program.uniform_location(gl, "blendMap"),
            program,
        })
    }

    pub fn start(&self, gl: &glow::Context) {
        self.program.start(gl);
    }

    pub fn stop(&self, gl: &glow::Context) {
        self.program.stop(gl);
    }

    pub fn clean_up(&self, gl: &glow::Context) {
        self.program.clean_up(gl);
    }

    /// Pins the five samplers to texture units 0 through 4. Done once at
    /// construction, while the program is started; the terrain renderer
    /// binds the actual textures to those units every draw.
    pub fn connect_texture_units(&self, gl: &glow::Context) {
        self.program
            .load_int(gl, self.location_background_texture.as_ref(), 0);
        self.program.load_int(gl, self.location_r_texture.as_ref(), 1);
        self.program.load_int(gl, self.location_g_texture.as_ref(), 2);
        self.program.load_int(gl, self.location_b_texture.as_ref(), 3);
        self.program.load_int(gl, self.location_blend_map.as_ref(), 4);
    }

    pub fn load_transformation_matrix(&self, gl: &glow::Context, matrix: &Matrix4<f32>) {
        self.program
            .load_matrix(gl, self.location_transformation_matrix.as_ref(), matrix);
    }

    pub fn load_projection_matrix(&self, gl: &glow::Context, matrix: &Matrix4<f32>) {
        self.program
            .load_matrix(gl, self.location_projection_matrix.as_ref(), matrix);
    }

    pub fn load_view_matrix(&self, gl: &glow::Context, camera: &Camera) {
        let view = maths::create_view_matrix(camera);
        self.program
            .load_matrix(gl, self.location_view_matrix.as_ref(), &view);
    }

    pub fn load_light(&self, gl: &glow::Context, light: &Light) {
        self.program
            .load_vector(gl, self.location_light_position.as_ref(), light.position);
        self.program
            .load_vector(gl, self.location_light_colour.as_ref(), light.colour);
    }

    pub fn load_shine_variables(&self, gl: &glow::Context, damper: f32, reflectivity: f32) {
        self.program
            .load_float(gl, self.location_shine_damper.as_ref(), damper);
        self.program
            .load_float(gl, self.location_reflectivity.as_ref(), reflectivity);
    }

    pub fn load_sky_colour(&self, gl: &glow::Context, r: f32, g: f32, b: f32) {
        self.program
            .load_vector(gl, self.location_sky_colour.as_ref(), cgmath::vec3(r, g, b));
    }
}
