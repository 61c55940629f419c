//! Host binding for the relay map
//!
//! `MapBackground` owns everything one attached map needs: the drawing
//! surface size, the projected geography, the frame scheduler and, once the
//! world map has been fetched, the animation engine. The terminal front end
//! (`run`, `snapshot`) drives it.

use crate::config::MapConfig;
use crate::engine::AnimationEngine;
use crate::geo::{GeographyLoadError, GeometryService, LandDataset, WorldGeometry};
use crate::help::{render_help_overlay, render_status, MAP_HELP};
use crate::relay::{build_connections, place_nodes};
use crate::render::braille::BrailleCanvas;
use crate::render::Canvas;
use crate::scheduler::{FrameScheduler, ManualScheduler, TickScheduler};
use crate::terminal::{self, Input, Terminal};
use crossterm::event::{KeyCode, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// How often the loop checks on a pending load when no frame is scheduled
const LOAD_POLL: Duration = Duration::from_millis(50);

/// Size of the element the map draws into, in logical pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

pub type LoadResult = Result<LandDataset, GeographyLoadError>;

/// Fetches the landmass on a worker thread; should give up once the flag is set
pub type LandLoader = Box<dyn FnOnce(&AtomicBool) -> LoadResult + Send>;

struct PendingLoad {
    receiver: Receiver<LoadResult>,
    cancel: Arc<AtomicBool>,
}

struct Attached<S> {
    surface: Surface,
    geometry: WorldGeometry,
    scheduler: S,
    rng: StdRng,
    node_count: usize,
    paused: bool,
    load: Option<PendingLoad>,
    engine: Option<AnimationEngine>,
}

impl<S: FrameScheduler> Attached<S> {
    /// Place nodes, wire them up and start a fresh engine
    fn initialize(&mut self) {
        let nodes = place_nodes(
            self.node_count,
            self.surface.width,
            self.surface.height,
            &self.geometry,
            &mut self.rng,
        );
        let connections = build_connections(&nodes, &mut self.rng);
        log::debug!(
            "relay network: {} nodes, {} connections, land {}",
            nodes.len(),
            connections.len(),
            if self.geometry.has_land() { "loaded" } else { "unavailable" }
        );

        let mut engine = AnimationEngine::new(nodes, connections);
        engine.set_paused(self.paused);
        engine.start(&mut self.scheduler);
        self.engine = Some(engine);
    }

    fn finish_load(&mut self, result: LoadResult) {
        self.load = None;
        match result {
            Ok(land) => self.geometry.set_land(Some(land)),
            Err(e) => log::warn!("world map unavailable, drawing without landmass: {}", e),
        }
        self.initialize();
    }
}

/// One relay map bound to a host surface
pub struct MapBackground<S: FrameScheduler> {
    attached: Option<Attached<S>>,
}

impl<S: FrameScheduler> MapBackground<S> {
    /// Bind to `container` and start loading the world map.
    ///
    /// With no container the map is inert: nothing loads, nothing is
    /// scheduled and every other call is a no-op. Without a loader the map
    /// starts straight away with no landmass.
    pub fn attach(
        container: Option<Surface>,
        node_count: usize,
        seed: u64,
        scheduler: S,
        loader: Option<LandLoader>,
    ) -> Self {
        let Some(surface) = container else {
            log::debug!("no surface to attach to; relay map stays inert");
            return Self { attached: None };
        };

        let mut attached = Attached {
            surface,
            geometry: WorldGeometry::new(surface.width, surface.height),
            scheduler,
            rng: StdRng::seed_from_u64(seed),
            node_count,
            paused: false,
            load: None,
            engine: None,
        };

        match loader {
            Some(loader) => {
                let (tx, receiver) = mpsc::channel();
                let cancel = Arc::new(AtomicBool::new(false));
                let flag = Arc::clone(&cancel);
                thread::spawn(move || {
                    let result = loader(&flag);
                    if !flag.load(Ordering::Relaxed) {
                        let _ = tx.send(result);
                    }
                });
                attached.load = Some(PendingLoad { receiver, cancel });
            }
            None => attached.initialize(),
        }

        Self { attached: Some(attached) }
    }

    #[cfg(test)]
    pub fn is_inert(&self) -> bool {
        self.attached.is_none()
    }

    pub fn is_loading(&self) -> bool {
        self.attached.as_ref().is_some_and(|a| a.load.is_some())
    }

    #[cfg(test)]
    pub fn engine(&self) -> Option<&AnimationEngine> {
        self.attached.as_ref()?.engine.as_ref()
    }

    #[cfg(test)]
    pub fn geometry(&self) -> Option<&WorldGeometry> {
        self.attached.as_ref().map(|a| &a.geometry)
    }

    pub fn scheduler(&self) -> Option<&S> {
        self.attached.as_ref().map(|a| &a.scheduler)
    }

    pub fn scheduler_mut(&mut self) -> Option<&mut S> {
        self.attached.as_mut().map(|a| &mut a.scheduler)
    }

    /// Pick up a finished load. Returns true when the network was built by this call.
    pub fn poll(&mut self) -> bool {
        let Some(attached) = self.attached.as_mut() else {
            return false;
        };
        let Some(load) = &attached.load else {
            return false;
        };

        let result = match load.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(GeographyLoadError::format("loader exited without a result")),
        };
        attached.finish_load(result);
        true
    }

    /// Block until the load settles or `timeout` passes; on timeout the
    /// load is abandoned and the map continues without landmass.
    pub fn wait_for_land(&mut self, timeout: Duration) {
        let deadline = Instant::now().checked_add(timeout);
        while self.is_loading() {
            if self.poll() {
                return;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                if let Some(attached) = self.attached.as_mut() {
                    if let Some(load) = &attached.load {
                        load.cancel.store(true, Ordering::Relaxed);
                    }
                    attached.finish_load(Err(GeographyLoadError::Cancelled));
                }
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Track a new surface size. Only the projection changes; nodes keep
    /// their pixel positions until the next regenerate.
    pub fn resize(&mut self, width: f64, height: f64) {
        if let Some(attached) = self.attached.as_mut() {
            attached.surface = Surface { width, height };
            attached.geometry.configure(width, height);
        }
    }

    /// Throw the network away and build a new one at the current size
    pub fn regenerate(&mut self) {
        let Some(attached) = self.attached.as_mut() else {
            return;
        };
        let Some(mut old) = attached.engine.take() else {
            return;
        };
        old.dispose(&mut attached.scheduler);
        attached.initialize();
    }

    pub fn set_paused(&mut self, paused: bool) {
        if let Some(attached) = self.attached.as_mut() {
            attached.paused = paused;
            if let Some(engine) = attached.engine.as_mut() {
                engine.set_paused(paused);
            }
        }
    }

    /// Draw the pending frame if it is due. Returns whether anything was drawn.
    pub fn render(&mut self, canvas: &mut dyn Canvas) -> bool {
        let Some(attached) = self.attached.as_mut() else {
            return false;
        };
        let Some(engine) = attached.engine.as_mut() else {
            return false;
        };
        let Some(token) = attached.scheduler.take_due() else {
            return false;
        };
        engine.on_frame(token, canvas, &attached.geometry, &mut attached.scheduler)
    }

    /// Stop animating, abandon any load in flight and let go of the surface.
    /// Safe to call more than once.
    pub fn dispose(&mut self) {
        let Some(mut attached) = self.attached.take() else {
            return;
        };
        if let Some(load) = attached.load.take() {
            load.cancel.store(true, Ordering::Relaxed);
        }
        if let Some(engine) = attached.engine.as_mut() {
            engine.dispose(&mut attached.scheduler);
        }
        log::debug!("relay map detached");
    }
}

impl<S: FrameScheduler> Drop for MapBackground<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// What a key press asks the host to do
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    None,
    Quit,
    Pause(bool),
    Regenerate,
    Speed(f32),
    Help,
}

/// Keyboard state for the interactive map
pub struct Controls {
    pub paused: bool,
    pub speed: f32,
    pub show_help: bool,
}

impl Controls {
    pub fn new(speed: f32) -> Self {
        Self { paused: false, speed, show_help: false }
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Action {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Char(' ') => {
                self.paused = !self.paused;
                Action::Pause(self.paused)
            }
            KeyCode::Char('r') => Action::Regenerate,
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
                Action::Help
            }
            // 1=fastest, 9=slowest, 0=very slow
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.speed = match c {
                    '1' => 0.005,
                    '2' => 0.01,
                    '3' => 0.02,
                    '4' => 0.03,
                    '5' => 0.05,
                    '6' => 0.07,
                    '7' => 0.1,
                    '8' => 0.15,
                    '9' | '0' => 0.2,
                    _ => self.speed,
                };
                Action::Speed(self.speed)
            }
            _ => Action::None,
        }
    }
}

fn loader_for(config: &MapConfig) -> Option<LandLoader> {
    let provider = config.provider()?;
    Some(Box::new(move |cancel: &AtomicBool| provider.load(cancel)))
}

fn surface_for(cols: u16, rows: u16, dot_size: f64) -> Surface {
    let (width, height) = BrailleCanvas::logical_size(cols, rows, dot_size);
    Surface { width, height }
}

/// Animate the map full screen until the user quits
pub fn run(config: &MapConfig) -> io::Result<()> {
    if !terminal::is_interactive() {
        log::warn!("stdout is not a terminal; try `relaymap snapshot`");
        return Ok(());
    }

    let mut term = Terminal::new(true)?;
    let (cols, rows) = term.size();
    let mut canvas = BrailleCanvas::new(cols, rows, config.dot_size);
    let mut controls = Controls::new(config.time_step);

    let scheduler = TickScheduler::new(config.frame_interval());
    let mut map = MapBackground::attach(
        Some(surface_for(cols, rows, config.dot_size)),
        config.nodes,
        config.seed_or_now(),
        scheduler,
        loader_for(config),
    );

    loop {
        map.poll();

        let wait = map
            .scheduler()
            .and_then(|s| s.time_until_due())
            .map_or(LOAD_POLL, |due| due.min(LOAD_POLL));

        if let Some(input) = term.next_input(wait)? {
            match input {
                Input::Resize(c, r) => {
                    term.resize(c, r);
                    term.clear_screen()?;
                    canvas.resize(c, r);
                    let surface = surface_for(c, r, config.dot_size);
                    map.resize(surface.width, surface.height);
                }
                Input::Key(code, modifiers) => match controls.handle_key(code, modifiers) {
                    Action::Quit => break,
                    Action::Pause(paused) => map.set_paused(paused),
                    Action::Regenerate => map.regenerate(),
                    Action::Speed(speed) => {
                        if let Some(s) = map.scheduler_mut() {
                            s.set_interval(Duration::from_secs_f32(speed));
                        }
                    }
                    Action::Help | Action::None => {}
                },
            }
        }

        let drew = map.render(&mut canvas);
        if drew || map.is_loading() {
            term.clear();
            canvas.blit(&mut term);
            if map.is_loading() {
                render_status(&mut term, "loading world map…");
            }
            if controls.show_help {
                render_help_overlay(&mut term, MAP_HELP);
            }
            term.present()?;
        }
    }

    map.dispose();
    Ok(())
}

/// Render `frames` frames off screen and print the last one
pub fn snapshot(config: &MapConfig, frames: usize, cols: u16, rows: u16) -> io::Result<()> {
    let mut term = Terminal::detached(cols, rows);
    let mut canvas = BrailleCanvas::new(cols, rows, config.dot_size);

    let mut map = MapBackground::attach(
        Some(surface_for(cols, rows, config.dot_size)),
        config.nodes,
        config.seed_or_now(),
        ManualScheduler::new(),
        loader_for(config),
    );
    map.wait_for_land(config.timeout.saturating_add(Duration::from_secs(1)));

    for _ in 0..frames.max(1) {
        map.render(&mut canvas);
    }
    map.dispose();

    canvas.blit(&mut term);
    term.print_to_stdout();
    Ok(())
}
