//! # Application State Management
//!
//! Window lifecycle and event dispatch. The application starts with a
//! [`GraphicsBuilder`] that initializes WebGPU off the event loop; once the
//! finished [`Graphics`] bundle arrives as a user event, the engine state is
//! constructed and events are routed to it.

pub mod graphics_resources_builder;

use std::sync::Arc;

use graphics_resources_builder::{Graphics, GraphicsBuilder, MaybeGraphics};

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::engine_state::EngineState;

/// The main application state container that manages the application's
/// lifecycle.
pub struct ApplicationState {
    /// The current graphics state, which may be initializing, ready, or
    /// already consumed
    pub graphics: MaybeGraphics,

    /// The initialized application state, if the application has started
    pub state: Option<InitializedApplicationState>,
}

/// The running state of the application after graphics initialization.
pub struct InitializedApplicationState {
    pub engine_state: EngineState,
    pub window: Arc<Window>,
}

impl ApplicationState {
    pub fn new(builder: GraphicsBuilder) -> Self {
        Self {
            graphics: MaybeGraphics::Builder(builder),
            state: None,
        }
    }

    /// Consumes the finished graphics bundle and builds the engine state.
    fn initialize_application_state(&mut self) {
        if let MaybeGraphics::Graphics(gfx) = &mut self.graphics {
            let taken_gfx = std::mem::take(gfx);
            let window = taken_gfx.window.expect("Window is missing");
            let engine_state = EngineState::new(
                taken_gfx.surface.expect("Surface is missing"),
                taken_gfx
                    .surface_config
                    .expect("Surface configuration is missing"),
                taken_gfx.device.expect("Device is missing"),
                taken_gfx.queue.expect("Queue is missing"),
                taken_gfx.feedback_shader_string,
                taken_gfx.voxelizer_shader_string,
                taken_gfx.forward_shader_string,
            );

            self.state = Some(InitializedApplicationState {
                engine_state,
                window,
            });

            self.graphics = MaybeGraphics::Moved;
        }
    }
}

impl ApplicationHandler<Graphics> for ApplicationState {
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(state) = &mut self.state {
            match event {
                WindowEvent::Resized(size) => {
                    state.engine_state.resize_surface(size);
                }
                WindowEvent::RedrawRequested => {
                    state.engine_state.render();
                }
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            state: ElementState::Pressed,
                            physical_key: PhysicalKey::Code(KeyCode::Escape),
                            ..
                        },
                    ..
                } => event_loop.exit(),
                _ => (),
            }
        } else if let WindowEvent::CloseRequested = event {
            event_loop.exit();
        }
    }

    /// Triggers graphics initialization on first resume.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let MaybeGraphics::Builder(builder) = &mut self.graphics {
            builder.build_and_send(event_loop);
        }
    }

    /// Receives the finished graphics bundle and starts the engine.
    fn user_event(&mut self, _event_loop: &ActiveEventLoop, graphics: Graphics) {
        self.graphics = MaybeGraphics::Graphics(graphics);
        self.initialize_application_state();
    }

    /// Advances the simulation and schedules the next frame.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            state.engine_state.update();
            state.window.request_redraw();
        }
    }
}
