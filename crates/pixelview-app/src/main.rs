mod app;
mod error;
mod filter;
mod gpu;
mod media;
mod render;
mod settings;
mod ui;
mod view;

use std::sync::Arc;

use anyhow::Result;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use app::App;
use settings::PlayerSettings;

struct PixelviewApp {
    app: Option<App>,
    window: Option<Arc<Window>>,
    settings: PlayerSettings,
}

impl PixelviewApp {
    fn new(settings: PlayerSettings) -> Self {
        Self {
            app: None,
            window: None,
            settings,
        }
    }
}

impl ApplicationHandler for PixelviewApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title("Pixelview")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        match App::new(window, &self.settings) {
            Ok(app) => {
                self.app = Some(app);
                log::info!("Pixelview initialized");
            }
            Err(e) => {
                log::error!("Failed to initialize app: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(app) = self.app.as_mut() else {
            return;
        };

        // Let egui handle events first
        let egui_consumed = app.egui_overlay.handle_event(&app.window, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                app.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } if !egui_consumed || !app.egui_overlay.wants_keyboard() => match key {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::Space => app.toggle_play(),
                KeyCode::Home => app.stop(),
                KeyCode::KeyF => {
                    let window = &app.window;
                    if window.fullscreen().is_some() {
                        window.set_fullscreen(None);
                    } else {
                        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
                    }
                }
                KeyCode::KeyD => app.egui_overlay.toggle_visible(),
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                app.update();

                // Snapshot before the UI borrows params mutably
                let info = app.playback_info();

                app.egui_overlay.begin_frame(&app.window);
                if app.egui_overlay.visible {
                    let ctx = app.egui_overlay.context();
                    ui::draw_controls(&ctx, &mut app.params, &info);
                }
                app.egui_overlay.end_frame(&app.window);

                match app.render() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        app.gpu.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of GPU memory");
                        event_loop.exit();
                    }
                    Err(e) => {
                        log::warn!("Surface error: {e}");
                    }
                }

                app.window.request_redraw();
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // --filter-test: CPU filter diagnostic (no GPU, no window)
    if std::env::args().any(|a| a == "--filter-test") {
        filter::run_diagnostic();
        return Ok(());
    }

    let settings = PlayerSettings::load();
    log::debug!("Settings: {settings:?}");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    let mut app = PixelviewApp::new(settings);
    event_loop.run_app(&mut app)?;

    Ok(())
}
