use std::ffi::CString;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use glow::HasContext;
use glutin::config::ConfigTemplate;
use glutin::context::{ContextAttributesBuilder, PossiblyCurrentContext};
use glutin::display::{Display as GlutinDisplay, DisplayApiPreference};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use log::{info, warn};
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::Window;

/// The window, its GL surface/context and the frame timer, bundled so the
/// rest of the engine only ever sees a [`glow::Context`] and a delta time.
/// Presentation blocks on vsync, which is what paces the frame loop.
pub struct Display {
    pub window: Window,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    pub gl: Arc<glow::Context>,
    last_frame: Instant,
    delta: f32,
}

impl Display {
    pub fn create(event_loop: &ActiveEventLoop, width: u32, height: u32, title: &str) -> Display {
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(title)
                    .with_inner_size(LogicalSize::new(width, height)),
            )
            .expect("failed to create window");

        let display_handle = window.display_handle().unwrap();
        let window_handle = window.window_handle().unwrap();

        #[cfg(target_os = "windows")]
        let preference = DisplayApiPreference::Wgl(Some(window_handle.into()));
        #[cfg(target_os = "macos")]
        let preference = DisplayApiPreference::Cgl;
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        let preference = DisplayApiPreference::Egl;

        let display = unsafe {
            GlutinDisplay::new(display_handle.into(), preference)
                .expect("failed to create GL display")
        };

        let config = unsafe {
            display
                .find_configs(ConfigTemplate::default())
                .expect("failed to enumerate GL configs")
                .next()
                .expect("no suitable GL config")
        };

        let physical_size = window.inner_size();
        let surface_width = NonZeroU32::new(physical_size.width.max(1)).unwrap();
        let surface_height = NonZeroU32::new(physical_size.height.max(1)).unwrap();

        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            window_handle.into(),
            surface_width,
            surface_height,
        );
        let context_attributes = ContextAttributesBuilder::new().build(Some(window_handle.into()));

        let surface = unsafe {
            display
                .create_window_surface(&config, &surface_attributes)
                .expect("failed to create window surface")
        };
        let context = unsafe {
            display
                .create_context(&config, &context_attributes)
                .expect("failed to create GL context")
        }
        .make_current(&surface)
        .expect("failed to make GL context current");

        let gl = unsafe {
            Arc::new(glow::Context::from_loader_function(|s| {
                let c_str = CString::new(s).unwrap();
                display.get_proc_address(&c_str) as *const _
            }))
        };

        if let Err(e) =
            surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::new(1).unwrap()))
        {
            warn!("could not enable vsync: {e}");
        }

        unsafe {
            gl.viewport(0, 0, physical_size.width as i32, physical_size.height as i32);
        }

        info!(
            "created {}x{} window with GL context",
            physical_size.width, physical_size.height
        );

        Display {
            window,
            surface,
            context,
            gl,
            last_frame: Instant::now(),
            delta: 0.0,
        }
    }

    /// Presents the frame and advances the timer. The buffer swap blocks
    /// until the display is ready for another frame, so the returned delta
    /// tracks the real pace of the loop.
    pub fn update(&mut self) {
        self.surface
            .swap_buffers(&self.context)
            .expect("failed to swap buffers");
        let now = Instant::now();
        self.delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
    }

    pub fn frame_time_seconds(&self) -> f32 {
        self.delta
    }

    pub fn aspect_ratio(&self) -> f32 {
        let size = self.window.inner_size();
        size.width as f32 / size.height.max(1) as f32
    }

    pub fn resize(&self, width: u32, height: u32) {
        if let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.context, w, h);
            unsafe {
                self.gl.viewport(0, 0, width as i32, height as i32);
            }
        }
    }
}
