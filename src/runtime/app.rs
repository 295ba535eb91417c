use std::cell::Cell;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Instant;

use anyhow::Result;
use softbuffer::{Context, Surface};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::Window;

use keybind::cli::ProbeConfig;
use keybind::keymap::{callback, raw_input_from_window_event, BindOptions, BindingRegistry, EventType};

/// Background while no key is held
const IDLE_COLOR: u32 = 0x1e1e1e;
/// Background while at least one key is held
const HELD_COLOR: u32 = 0x2d4f67;

/// Pattern that cycles through the configured contexts
const NEXT_CONTEXT_PATTERN: &str = "tab";

pub struct ProbeApp {
    registry: BindingRegistry,
    json: bool,
    /// Set by the context-cycling binding, consumed after dispatch
    next_context_requested: Rc<Cell<bool>>,
    window: Option<Rc<Window>>,
    context: Option<Context<Rc<Window>>>,
    surface: Option<Surface<Rc<Window>, Rc<Window>>>,
}

impl ProbeApp {
    pub fn new(config: ProbeConfig) -> Self {
        let mut registry = BindingRegistry::new();
        config.bindings.apply_settings(&mut registry);

        let ids = config.bindings.bind_all(&mut registry, |entry| {
            let label = entry.display_label();
            callback(move || println!("fired: {}", label))
        });
        tracing::info!("Bound {} listener(s)", ids.len());

        let next_context_requested = Rc::new(Cell::new(false));
        if !registry.contexts().is_empty() {
            let flag = Rc::clone(&next_context_requested);
            let bound = registry.bind(
                BindOptions::new(NEXT_CONTEXT_PATTERN),
                Some(callback(move || flag.set(true))),
                None,
            );
            if let Err(e) = bound {
                tracing::warn!("Context cycling unavailable: {}", e);
            }
        }

        Self {
            registry,
            json: config.json,
            next_context_requested,
            window: None,
            context: None,
            surface: None,
        }
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("keybind probe")
            .with_inner_size(LogicalSize::new(480, 240));

        let window = Rc::new(event_loop.create_window(window_attributes)?);
        let context = Context::new(Rc::clone(&window))
            .map_err(|e| anyhow::anyhow!("Failed to create context: {}", e))?;
        let surface = Surface::new(&context, Rc::clone(&window))
            .map_err(|e| anyhow::anyhow!("Failed to create surface: {}", e))?;

        self.window = Some(window);
        self.context = Some(context);
        self.surface = Some(surface);
        Ok(())
    }

    fn redraw(&mut self) -> Result<()> {
        let (Some(window), Some(surface)) = (&self.window, &mut self.surface) else {
            return Ok(());
        };

        let size = window.inner_size();
        let (Some(width), Some(height)) =
            (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            return Ok(());
        };

        surface
            .resize(width, height)
            .map_err(|e| anyhow::anyhow!("Failed to resize surface: {}", e))?;

        let color = if self.registry.pressed_records(EventType::Key).is_empty() {
            IDLE_COLOR
        } else {
            HELD_COLOR
        };

        let mut buffer = surface
            .buffer_mut()
            .map_err(|e| anyhow::anyhow!("Failed to get surface buffer: {}", e))?;
        buffer.fill(color);
        buffer
            .present()
            .map_err(|e| anyhow::anyhow!("Failed to present buffer: {}", e))?;
        Ok(())
    }

    /// Switch to the context after the current one, wrapping through "no context"
    fn cycle_context(&mut self) {
        let contexts: Vec<String> = self
            .registry
            .contexts()
            .into_iter()
            .map(str::to_string)
            .collect();

        let next = match self.registry.current_context() {
            None => contexts.first().cloned(),
            Some(current) => contexts
                .iter()
                .position(|c| c == current)
                .and_then(|idx| contexts.get(idx + 1))
                .cloned(),
        };

        self.registry.set_context(next.as_deref());
        println!("context: {}", next.as_deref().unwrap_or("(none)"));
    }

    fn print_snapshot(&self) {
        match serde_json::to_string(&self.registry.tracker().snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::warn!("Failed to serialize snapshot: {}", e),
        }
    }

    /// Returns true when the window should be redrawn
    fn handle_event(&mut self, event: &WindowEvent) -> bool {
        let Some(input) =
            raw_input_from_window_event(self.registry.key_table(), event, Instant::now())
        else {
            return false;
        };

        self.registry.dispatch(&input);

        if self.next_context_requested.replace(false) {
            self.cycle_context();
        }
        if self.json {
            self.print_snapshot();
        }
        true
    }
}

impl ApplicationHandler for ProbeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init_window(event_loop) {
                tracing::error!("Failed to open probe window: {}", e);
                event_loop.exit();
                return;
            }
        }
        self.registry.mount();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = &self.window else {
            return;
        };
        if window_id != window.id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    tracing::warn!("Redraw failed: {}", e);
                }
            }
            WindowEvent::Resized(_) => window.request_redraw(),
            other => {
                if self.handle_event(&other) {
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.registry.poll_timers(Instant::now());

        // Sleep until the next deferred sequence fire, if any
        match self.registry.next_deadline() {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.registry.unmount();
    }
}
