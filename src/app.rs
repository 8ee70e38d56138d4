use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use glam::{IVec2, Vec2};
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId, WindowLevel};

use crate::cat::frames::{self, SpriteFrame, SPRITE_SIZE};
use crate::cat::state::CatState;
use crate::cat::Cat;
use crate::click::{ClickBurst, CLICKS_TO_CLOSE, CLICKS_TO_SWAP_PALETTE, CLICK_WINDOW_MS};
use crate::error::PetError;
use crate::mask::{MaskCache, ShapeBackend};
use crate::platform::{self, PlatformShape};
use crate::render::SpriteRenderer;
use crate::sheet::{self, PaletteRing, SpriteSheet, SPRITE_DIR};

/// Target simulation tick rate (seconds per tick).
const TICK_RATE: f64 = 1.0 / 15.0;
/// Max accumulated time before we clamp (a stalled loop skips, never bursts).
const MAX_ACCUMULATOR: f64 = 0.25;
/// How often to log tick stats (seconds).
const STATS_LOG_INTERVAL: f64 = 30.0;
/// Spawn point when no monitor can be matched.
const FALLBACK_SPAWN: Vec2 = Vec2::new(400.0, 300.0);

// ---------------------------------------------------------------------------
// Tick stats
// ---------------------------------------------------------------------------

struct TickStats {
    tick_count: u64,
    last_log_time: Instant,
    ticks_since_log: u32,
    frame_time_max: f64,
}

impl TickStats {
    fn new() -> Self {
        Self {
            tick_count: 0,
            last_log_time: Instant::now(),
            ticks_since_log: 0,
            frame_time_max: 0.0,
        }
    }

    fn record_frame(&mut self, dt: f64) {
        self.frame_time_max = self.frame_time_max.max(dt);
    }

    fn record_tick(&mut self, state: CatState, masks: usize) {
        self.tick_count += 1;
        self.ticks_since_log += 1;

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= STATS_LOG_INTERVAL {
            log::info!(
                "Ticks/s: {:.1} | worst frame: {:.1}ms | state: {:?} | masks: {} | total ticks: {}",
                self.ticks_since_log as f64 / elapsed,
                self.frame_time_max * 1000.0,
                state,
                masks,
                self.tick_count,
            );
            self.last_log_time = Instant::now();
            self.ticks_since_log = 0;
            self.frame_time_max = 0.0;
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    window: Option<Arc<Window>>,
    renderer: Option<SpriteRenderer>,
    masks: Option<MaskCache<PlatformShape>>,
    cat: Option<Cat>,

    // Active palette
    sheet: SpriteSheet,
    palettes: PaletteRing,

    // RNG (shared, seeded once per session)
    rng: fastrand::Rng,

    // Fixed timestep
    start_time: Instant,
    last_frame_time: Option<Instant>,
    next_redraw: Instant,
    accumulator: f64,
    tick_stats: TickStats,

    /// Observed at the top of every tick.
    running: bool,
    last_pointer: IVec2,
    current_frame: Option<SpriteFrame>,

    close_clicks: ClickBurst,
    palette_clicks: ClickBurst,

    startup_error: Option<PetError>,
}

impl App {
    fn new(sheet: SpriteSheet, palettes: PaletteRing) -> Self {
        let now = Instant::now();
        Self {
            window: None,
            renderer: None,
            masks: None,
            cat: None,
            sheet,
            palettes,
            rng: fastrand::Rng::new(),
            start_time: now,
            last_frame_time: None,
            next_redraw: now,
            accumulator: 0.0,
            tick_stats: TickStats::new(),
            running: true,
            last_pointer: IVec2::ZERO,
            current_frame: None,
            close_clicks: ClickBurst::new(CLICKS_TO_CLOSE, CLICK_WINDOW_MS),
            palette_clicks: ClickBurst::new(CLICKS_TO_SWAP_PALETTE, CLICK_WINDOW_MS),
            startup_error: None,
        }
    }

    /// Milliseconds since startup, the engine's monotonic clock.
    fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Create the sprite window, shape backend, masks and renderer.
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), PetError> {
        let pointer = platform::cursor_position();
        if let Some(p) = pointer {
            self.last_pointer = p;
        }
        let spawn = spawn_point(event_loop, pointer);
        let cat = Cat::new(spawn, self.last_pointer, self.elapsed_ms());
        let origin = cat.window_origin();

        let attrs = WindowAttributes::default()
            .with_title("Desktop Cat")
            .with_decorations(false)
            .with_resizable(false)
            .with_transparent(true)
            .with_visible(false)
            .with_window_level(WindowLevel::AlwaysOnTop)
            .with_inner_size(PhysicalSize::new(SPRITE_SIZE, SPRITE_SIZE))
            .with_position(PhysicalPosition::new(origin.x, origin.y));

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| PetError::Window(e.to_string()))?,
        );
        log::info!("Sprite window created at ({}, {})", origin.x, origin.y);

        let mut masks = MaskCache::new(platform::shape_backend(&window)?);
        let built = masks.ensure_masks_for(&self.sheet, &frames::all_frames());
        log::info!("Pre-built {built} shape masks");

        let renderer = SpriteRenderer::new(window.clone(), &self.sheet)?;
        log::info!("wgpu + sprite pipeline initialized");

        window.set_visible(true);

        self.cat = Some(cat);
        self.masks = Some(masks);
        self.renderer = Some(renderer);
        self.window = Some(window);
        Ok(())
    }

    /// Run fixed-timestep behavior ticks.
    fn run_fixed_update(&mut self, dt: f64) {
        self.accumulator = (self.accumulator + dt).min(MAX_ACCUMULATOR);

        while self.accumulator >= TICK_RATE {
            self.tick();
            self.accumulator -= TICK_RATE;
        }
    }

    fn tick(&mut self) {
        if !self.running {
            return;
        }
        if platform::escape_pressed() {
            log::info!("ESC pressed, exiting");
            self.running = false;
            return;
        }
        let now_ms = self.elapsed_ms();
        let pointer = platform::cursor_position().unwrap_or(self.last_pointer);
        self.last_pointer = pointer;

        let Some(cat) = &mut self.cat else {
            return;
        };
        let out = cat.tick(pointer, now_ms, &mut self.rng);

        if let (Some(pos), Some(window)) = (out.window_pos, &self.window) {
            window.set_outer_position(PhysicalPosition::new(pos.x, pos.y));
        }
        self.current_frame = Some(out.frame);

        let mask_count = self.masks.as_ref().map_or(0, MaskCache::len);
        self.tick_stats.record_tick(cat.state(), mask_count);
    }

    /// Install the frame's mask (on change) and draw it.
    fn draw(&mut self) {
        let Some(frame) = self.current_frame else {
            return;
        };
        if let Some(masks) = &mut self.masks {
            masks.apply_for(&self.sheet, frame);
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.draw(frame);
        }
    }

    /// Cycle to the next palette. On failure the current one stays.
    fn swap_palette(&mut self) {
        match advance_palette(&mut self.palettes, self.masks.as_mut(), SpriteSheet::load) {
            Ok(sheet) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.upload_sheet(&sheet);
                }
                self.sheet = sheet;
            }
            Err(e) => log::error!("Palette swap aborted, keeping current sheet: {e}"),
        }
    }

    fn quit(&mut self, event_loop: &ActiveEventLoop, reason: &str) {
        log::info!("{reason}, exiting");
        self.running = false;
        event_loop.exit();
    }
}

/// Load the next palette, rebuild the masks against it and commit the ring.
/// Nothing is touched unless the load succeeds.
fn advance_palette<B: ShapeBackend>(
    palettes: &mut PaletteRing,
    masks: Option<&mut MaskCache<B>>,
    load: impl FnOnce(&Path) -> Result<SpriteSheet, PetError>,
) -> Result<SpriteSheet, PetError> {
    let (idx, path) = palettes
        .peek_next()
        .ok_or_else(|| PetError::NoPalettes(SPRITE_DIR.into()))?;
    log::info!("Swapping to palette [{idx}]: {}", path.display());

    let sheet = load(path)?;
    if let Some(masks) = masks {
        masks.rebuild(&sheet, &frames::all_frames());
    }
    palettes.set_current(idx);
    Ok(sheet)
}

/// Centre of the monitor under the pointer, else the primary monitor.
fn spawn_point(event_loop: &ActiveEventLoop, pointer: Option<IVec2>) -> Vec2 {
    let centre = |m: &winit::monitor::MonitorHandle| {
        let pos = m.position();
        let size = m.size();
        Vec2::new(
            pos.x as f32 + size.width as f32 / 2.0,
            pos.y as f32 + size.height as f32 / 2.0,
        )
    };

    if let Some(p) = pointer {
        for m in event_loop.available_monitors() {
            let pos = m.position();
            let size = m.size();
            if p.x >= pos.x
                && p.x < pos.x + size.width as i32
                && p.y >= pos.y
                && p.y < pos.y + size.height as i32
            {
                return centre(&m);
            }
        }
    }

    event_loop
        .primary_monitor()
        .map(|m| centre(&m))
        .unwrap_or(FALLBACK_SPAWN)
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("Startup failed: {e}");
            self.startup_error = Some(e);
            self.running = false;
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.running {
            event_loop.exit();
            return;
        }

        let now = Instant::now();
        if now >= self.next_redraw {
            if let Some(w) = &self.window {
                w.request_redraw();
            }
            self.next_redraw = now + Duration::from_secs_f64(TICK_RATE);
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_redraw));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.quit(event_loop, "Close requested"),
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                self.quit(event_loop, "ESC pressed");
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => {
                let now = self.elapsed_ms();
                match button {
                    MouseButton::Right if self.close_clicks.register(now) => {
                        self.quit(event_loop, "Close gesture");
                    }
                    MouseButton::Left if self.palette_clicks.register(now) => {
                        self.swap_palette();
                    }
                    _ => {}
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                // Only used where the platform can't report the global pointer.
                if let Some(origin) = self.window.as_ref().and_then(|w| w.inner_position().ok()) {
                    self.last_pointer =
                        IVec2::new(origin.x + position.x as i32, origin.y + position.y as i32);
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                if let Some(last) = self.last_frame_time {
                    let dt = now.duration_since(last).as_secs_f64();
                    self.tick_stats.record_frame(dt);
                    self.run_fixed_update(dt);
                } else {
                    // First frame: tick once so there is something to draw.
                    self.tick();
                }
                self.last_frame_time = Some(now);

                self.draw();
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(masks) = &mut self.masks {
            masks.clear();
        }
        log::info!("Shut down after {} ticks", self.tick_stats.tick_count);
    }
}

/// Entry point: discover palettes, load the first sheet and run the event loop.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let palettes = PaletteRing::new(sheet::discover_palettes(Path::new(SPRITE_DIR))?);
    let first = palettes
        .current()
        .ok_or_else(|| PetError::NoPalettes(SPRITE_DIR.into()))?;
    let sheet = SpriteSheet::load(first)?;
    log::info!("Loaded sprite sheet {}", first.display());

    let event_loop = EventLoop::new()?;
    let mut app = App::new(sheet, palettes);
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.startup_error.take() {
        return Err(e.into());
    }
    Ok(())
}
