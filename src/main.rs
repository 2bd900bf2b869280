use std::path::{Path, PathBuf};

use cgmath::{vec3, Vector3};
use clap::Parser;
use log::{error, info};
use winit::application::ApplicationHandler;
use winit::event::{MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::WindowId;

mod camera;
mod display;
mod entity;
mod error;
mod input;
mod loader;
mod maths;
mod models;
mod obj;
mod renderer;
mod shaders;
mod terrain;
mod texture;

use camera::Camera;
use display::Display;
use entity::{Entity, Light};
use error::EngineError;
use input::Input;
use loader::Loader;
use models::TexturedModel;
use renderer::MasterRenderer;
use terrain::Terrain;
use texture::{ModelTexture, TerrainTexture, TerrainTexturePack};

const TITLE: &str = "Veldt";

#[derive(Parser, Debug)]
#[command(about = "Small OpenGL terrain-and-foliage renderer")]
struct Args {
    /// Directory holding the .obj meshes and .png textures.
    #[arg(long, default_value = "res")]
    assets: PathBuf,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,
}

/// Everything the application layer owns: placements, the light and the
/// camera. The renderer sees this only as a stream of per-frame submissions.
struct Scene {
    entities: Vec<Entity>,
    terrains: Vec<Terrain>,
    light: Light,
    camera: Camera,
}

#[derive(Default)]
struct App {
    args: Option<Args>,
    display: Option<Display>,
    loader: Option<Loader>,
    renderer: Option<MasterRenderer>,
    scene: Option<Scene>,
    input: Input,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.display.is_some() {
            return;
        }
        let args = self.args.as_ref().unwrap();

        let display = Display::create(event_loop, args.width, args.height, TITLE);
        let gl = display.gl.clone();
        let aspect_ratio = display.aspect_ratio();

        let mut loader = Loader::new();
        let renderer = match MasterRenderer::new(&gl, aspect_ratio) {
            Ok(renderer) => renderer,
            Err(e) => fatal(e),
        };
        let scene = match build_scene(&gl, &mut loader, &args.assets) {
            Ok(scene) => scene,
            Err(e) => fatal(e),
        };

        display.window.request_redraw();
        self.display = Some(display);
        self.loader = Some(loader);
        self.renderer = Some(renderer);
        self.scene = Some(scene);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("close requested, releasing GPU resources");
                if let Some(display) = &self.display {
                    let gl = display.gl.clone();
                    if let Some(renderer) = &self.renderer {
                        renderer.clean_up(&gl);
                    }
                    if let Some(loader) = &mut self.loader {
                        loader.clean_up(&gl);
                    }
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let (Some(display), Some(renderer)) = (&self.display, &self.renderer) {
                    display.resize(size.width, size.height);
                    if size.height != 0 {
                        renderer.load_projection(
                            &display.gl,
                            size.width as f32 / size.height as f32,
                        );
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.input.key_event(code, event.state);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.cursor_moved(position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.mouse_button(button, state);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / 50.0,
                };
                self.input.wheel(lines);
            }
            WindowEvent::RedrawRequested => self.draw_frame(),
            _ => (),
        }
    }
}

impl App {
    fn new(args: Args) -> Self {
        Self {
            args: Some(args),
            ..Self::default()
        }
    }

    /// One iteration of the frame loop: advance the camera, rebuild the
    /// frame's batches from the scene, draw, present.
    fn draw_frame(&mut self) {
        let (Some(display), Some(renderer), Some(scene)) = (
            self.display.as_mut(),
            self.renderer.as_mut(),
            self.scene.as_mut(),
        ) else {
            return;
        };
        let gl = display.gl.clone();

        scene.camera.update(&mut self.input, display.frame_time_seconds());

        for terrain in &scene.terrains {
            renderer.process_terrain(terrain);
        }
        for entity in &scene.entities {
            renderer.process_entity(entity);
        }
        renderer.render(&gl, &scene.light, &scene.camera);

        display.update();
        display.window.request_redraw();
    }
}

fn build_scene(
    gl: &glow::Context,
    loader: &mut Loader,
    assets: &Path,
) -> Result<Scene, EngineError> {
    let mut tree = load_textured_model(gl, loader, assets, "tree")?;
    tree.texture.set_shine_damper(10.0);
    tree.texture.set_reflectivity(0.2);

    let mut grass = load_textured_model(gl, loader, assets, "grass")?;
    grass.texture.set_has_transparency(true);
    grass.texture.set_use_fake_lighting(true);

    let mut fern = load_textured_model(gl, loader, assets, "fern")?;
    fern.texture.set_has_transparency(true);
    fern.texture.set_use_fake_lighting(true);

    let texture_pack = TerrainTexturePack::new(
        TerrainTexture::new(loader.load_texture(gl, &assets.join("grassy.png"))?),
        TerrainTexture::new(loader.load_texture(gl, &assets.join("dirt.png"))?),
        TerrainTexture::new(loader.load_texture(gl, &assets.join("flowers.png"))?),
        TerrainTexture::new(loader.load_texture(gl, &assets.join("path.png"))?),
    );
    let blend_map = TerrainTexture::new(loader.load_texture(gl, &assets.join("blend_map.png"))?);

    let terrains = vec![
        Terrain::new(-1, -1, gl, loader, texture_pack, blend_map),
        Terrain::new(0, -1, gl, loader, texture_pack, blend_map),
    ];

    let mut entities = Vec::new();
    for i in 0..200 {
        entities.push(Entity::new(tree, scatter(i, 1), 0.0, 0.0, 0.0, 1.0));
        entities.push(Entity::new(grass, scatter(i, 2), 0.0, 0.0, 0.0, 1.8));
        entities.push(Entity::new(fern, scatter(i, 3), 0.0, 0.0, 0.0, 0.85));
    }

    info!(
        "scene assembled: {} entities, {} terrain tiles",
        entities.len(),
        terrains.len()
    );

    Ok(Scene {
        entities,
        terrains,
        light: Light::new(vec3(20000.0, 20000.0, 2000.0), vec3(1.0, 1.0, 1.0)),
        camera: Camera::new(vec3(0.0, 6.0, 0.0)),
    })
}

fn load_textured_model(
    gl: &glow::Context,
    loader: &mut Loader,
    assets: &Path,
    name: &str,
) -> Result<TexturedModel, EngineError> {
    let data = obj::load_obj_file(&assets.join(format!("{name}.obj")))?;
    let raw_model = loader.load_model(gl, &data);
    let texture = ModelTexture::new(loader.load_texture(gl, &assets.join(format!("{name}.png")))?);
    Ok(TexturedModel::new(raw_model, texture))
}

/// Deterministic scatter over the two terrain tiles, so every run places the
/// foliage identically.
fn scatter(index: u32, salt: u32) -> Vector3<f32> {
    let hash = index
        .wrapping_mul(2654435761)
        .wrapping_add(salt.wrapping_mul(40503));
    let x = (hash % 800) as f32 - 400.0;
    let z = -(((hash >> 11) % 600) as f32);
    vec3(x, 0.0, z)
}

/// Startup failures are unrecoverable: log the chain and exit.
fn fatal(err: EngineError) -> ! {
    error!("fatal startup error: {err}");
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        error!("  caused by: {cause}");
        source = cause.source();
    }
    std::process::exit(1);
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let event_loop = EventLoop::new().expect("failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(args);
    event_loop.run_app(&mut app).expect("event loop error");
}
