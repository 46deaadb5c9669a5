//! Neon V entry point
//!
//! Handles platform-specific initialization and runs the animation loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use neon_v::consts::*;
    use neon_v::renderer::RenderState;
    use neon_v::{BackgroundEffect, InitError, Scene, SceneConfig};

    const CANVAS_ID: &str = "canvas";

    /// App instance holding all state
    struct App {
        scene: Scene,
        background: BackgroundEffect,
        render_state: RenderState,
        canvas: HtmlCanvasElement,
        last_time: f64,
        /// Set by the resize listener, applied before the next frame
        pending_size: Option<(u32, u32)>,
    }

    impl App {
        /// Advance the scene and draw one frame
        fn frame(&mut self, dt: f32) {
            if let Some((width, height)) = self.pending_size.take() {
                self.canvas.set_width(width);
                self.canvas.set_height(height);
                self.render_state.resize(width, height);
            }

            self.scene.update(dt, &mut self.background);

            let (width, height) = self.render_state.size;
            self.background
                .advance(self.scene.state().elapsed, width, height);

            match self.render_state.render(&self.scene, &self.background) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                    self.render_state.resize(width, height);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }
    }

    /// Canvas size in device pixels
    fn canvas_size(window: &web_sys::Window, canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        (width.max(1), height.max(1))
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Neon V starting...");

        if let Err(e) = start().await {
            log::error!("Failed to start: {e}");
            show_error(&e);
        }
    }

    async fn start() -> Result<(), InitError> {
        let window = web_sys::window().ok_or(InitError::NoWindow)?;
        let document = window.document().ok_or(InitError::NoWindow)?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .and_then(|el| el.dyn_into().ok())
            .ok_or_else(|| InitError::NoCanvas(CANVAS_ID.to_string()))?;

        let (width, height) = canvas_size(&window, &canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let config = SceneConfig::load(&canvas);
        let seed = js_sys::Date::now() as u64;
        let scene = Scene::new(config, seed);

        // Initialize WebGPU, falling back to WebGL2
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height).await?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let app = Rc::new(RefCell::new(App {
            scene,
            background: BackgroundEffect::new(width, height),
            render_state,
            canvas,
            last_time: 0.0,
            pending_size: None,
        }));

        setup_resize_handler(&window, app.clone());
        request_animation_frame(app);

        log::info!("Neon V running!");
        Ok(())
    }

    /// Put the failure where the loading indicator was
    fn show_error(error: &InitError) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(loading) = document.get_element_by_id("loading") {
            loading.set_text_content(Some(&format!("Unable to start: {error}")));
            let _ = loading.set_attribute("class", "error");
        }
    }

    fn setup_resize_handler(window: &web_sys::Window, app: Rc<RefCell<App>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let mut a = app.borrow_mut();
            let size = canvas_size(&window, &a.canvas);
            a.pending_size = Some(size);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            app_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn app_loop(app: Rc<RefCell<App>>, time: f64) {
        {
            let mut a = app.borrow_mut();

            // Calculate delta time
            let dt = if a.last_time > 0.0 {
                ((time - a.last_time) / 1000.0) as f32
            } else {
                TICK_DT
            };
            a.last_time = time;

            a.frame(dt);
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

/// Headless run: drive the scene for a while and report what happened
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use neon_v::consts::TICK_DT;
    use neon_v::{BackgroundEffect, Scene, SceneConfig};

    env_logger::init();
    log::info!("Neon V (native) starting...");
    log::info!("Rendering requires a browser - run with `trunk serve` for the web version");

    const SIMULATED_SECONDS: f32 = 10.0;
    const WIDTH: u32 = 1280;
    const HEIGHT: u32 = 720;

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut scene = Scene::new(SceneConfig::load(), seed);
    let mut background = BackgroundEffect::new(WIDTH, HEIGHT);

    let mut explosion_frames = 0;
    let frames = (SIMULATED_SECONDS / TICK_DT).round() as u32;
    for _ in 0..frames {
        scene.update(TICK_DT, &mut background);
        background.advance(scene.state().elapsed, WIDTH, HEIGHT);
        if background.explosion_age(background.time()).is_some() {
            explosion_frames += 1;
        }
    }

    let state = scene.state();
    log::info!(
        "Simulated {:.1}s: {} ticks, rotation {:.2} rad, {} bolts, explosion visible for {} frames",
        state.elapsed,
        state.ticks,
        state.rotation,
        state.bolts_struck,
        explosion_frames
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
