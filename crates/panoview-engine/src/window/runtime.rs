use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Fullscreen, Window, WindowId};

use panoview_stereo::SurfaceSize;

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::translate_window_event;
use crate::input::InputState;
use crate::time::FrameScheduler;

/// How often `App::on_idle` runs while no render loop is registered.
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "panoview".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Runtime context passed to the application.
///
/// Commands are buffered and applied after the current callback returns.
#[derive(Default)]
pub struct RuntimeCtx {
    commands: Vec<RuntimeCommand>,
}

impl RuntimeCtx {
    /// Commands queued by the current callback, in order.
    pub fn pending(&self) -> &[RuntimeCommand] {
        &self.commands
    }

    /// Registers the per-refresh render loop (Idle → Running).
    pub fn start_loop(&mut self) {
        self.commands.push(RuntimeCommand::StartLoop);
    }

    /// Cancels the render loop (Running → Idle). Idempotent.
    pub fn cancel_loop(&mut self) {
        self.commands.push(RuntimeCommand::CancelLoop);
    }

    /// Enters borderless fullscreen on the current monitor, or leaves it.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.commands.push(RuntimeCommand::SetFullscreen(fullscreen));
    }

    pub fn exit(&mut self) {
        self.commands.push(RuntimeCommand::Exit);
    }
}

/// A request the application makes of the runtime.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RuntimeCommand {
    StartLoop,
    CancelLoop,
    SetFullscreen(bool),
    Exit,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(initial, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    initial: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    window: Option<WindowEntry>,
    scheduler: FrameScheduler,
    exit_requested: bool,

    /// Initialization failure reported back from `Runtime::run`.
    fatal: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(initial: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            initial,
            gpu_init,
            app,
            window: None,
            scheduler: FrameScheduler::new(),
            exit_requested: false,
            fatal: None,
        }
    }

    fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let config = self.initial.clone();
        let attrs = Window::default_attributes()
            .with_title(config.title)
            .with_inner_size(config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            input_state: InputState::default(),
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init)).context("GPU initialization failed")
            },
        }
        .try_build()
    }

    fn apply_commands(&mut self, event_loop: &ActiveEventLoop, mut ctx: RuntimeCtx) {
        for cmd in ctx.commands.drain(..) {
            match cmd {
                RuntimeCommand::StartLoop => {
                    self.scheduler.start();
                    if let Some(entry) = &self.window {
                        entry.with_window(|w| w.request_redraw());
                    }
                }
                RuntimeCommand::CancelLoop => self.scheduler.cancel(),
                RuntimeCommand::SetFullscreen(on) => {
                    if let Some(entry) = &self.window {
                        entry.with_window(|w| {
                            w.set_fullscreen(on.then_some(Fullscreen::Borderless(None)));
                        });
                    }
                }
                RuntimeCommand::Exit => self.request_exit(),
            }
        }

        if self.exit_requested {
            event_loop.exit();
        }
    }

    fn handle_control(&mut self, control: AppControl) {
        if control == AppControl::Exit {
            self.request_exit();
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.window = Some(entry);
            }
            Err(e) => {
                log::error!("fatal: {e:#}");
                self.fatal = Some(e);
                self.request_exit();
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }
        if self.window.is_none() {
            return;
        }

        if !self.scheduler.is_running() {
            let mut runtime_ctx = RuntimeCtx::default();
            let control = self.app.on_idle(&mut runtime_ctx);
            self.handle_control(control);
            self.apply_commands(event_loop, runtime_ctx);
        }

        if self.scheduler.is_running() {
            // One redraw per display refresh; FIFO present paces the loop.
            event_loop.set_control_flow(ControlFlow::Wait);
            if let Some(entry) = &self.window {
                entry.with_window(|w| w.request_redraw());
            }
        } else {
            event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + IDLE_POLL_INTERVAL));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, window) = (&mut self.app, &mut self.window);
        let Some(entry) = window.as_mut() else {
            return;
        };

        let mut runtime_ctx = RuntimeCtx::default();
        let mut control = AppControl::Continue;

        entry.with_mut(|fields| {
            if let Some(ev) = translate_window_event(fields.input_state, &event) {
                fields.input_state.apply_event(&ev);
                control = app.on_input(&ev, &mut runtime_ctx);
            }
        });

        self.handle_control(control);

        match &event {
            WindowEvent::CloseRequested => self.request_exit(),

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.window.as_mut() {
                    let size = SurfaceSize::new(new_size.width, new_size.height);
                    entry.with_gpu_mut(|gpu| gpu.resize(size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.window.as_mut() {
                    let inner = entry.with_window(|w| w.inner_size());
                    let size = SurfaceSize::new(inner.width, inner.height);
                    entry.with_gpu_mut(|gpu| gpu.resize(size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::RedrawRequested => {
                let (app, window, scheduler) = (&mut self.app, &mut self.window, &mut self.scheduler);

                if let Some(entry) = window.as_mut() {
                    if let Some(ft) = scheduler.tick(Instant::now()) {
                        entry.with_mut(|fields| {
                            let mut ctx = FrameCtx {
                                window: WindowCtx { window: fields.window },
                                gpu: fields.gpu,
                                time: ft,
                                runtime: &mut runtime_ctx,
                            };
                            control = app.on_frame(&mut ctx);
                        });
                    }
                }

                self.handle_control(control);
            }

            _ => {}
        }

        self.apply_commands(event_loop, runtime_ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_queue_in_call_order() {
        let mut ctx = RuntimeCtx::default();
        assert!(ctx.pending().is_empty());

        ctx.cancel_loop();
        ctx.set_fullscreen(true);
        ctx.start_loop();
        assert_eq!(
            ctx.pending(),
            &[
                RuntimeCommand::CancelLoop,
                RuntimeCommand::SetFullscreen(true),
                RuntimeCommand::StartLoop,
            ]
        );
    }
}
