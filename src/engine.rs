//! Animation engine: advances relay state and draws one frame at a time
//!
//! Lifecycle is `Idle -> Running -> Disposed`. Once disposed the engine never
//! schedules another frame and cannot be restarted.

use crate::geo::GeometryService;
use crate::relay::{Connection, Node};
use crate::render::{palette, stop, Canvas, ColorStop};
use crate::scheduler::{FrameScheduler, FrameToken};

// Animation constants
const PULSE_STEP: f64 = 0.05;
const PULSE_DEPTH: f64 = 0.4;

const LINE_ALPHA: f64 = 0.25;
const LINE_WIDTH: f64 = 1.5;
const PACKET_RADIUS: f64 = 15.0;
const PACKET_CORE_RADIUS: f64 = 3.0;

const LAND_LINE_WIDTH: f64 = 1.0;

const PACKET_GLOW: [ColorStop; 3] = [
    stop(0.0, palette::CONNECTION.with_alpha(0.9)),
    stop(0.4, palette::CONNECTION.with_alpha(0.6)),
    stop(1.0, palette::CONNECTION.with_alpha(0.0)),
];

const NODE_GLOW: [ColorStop; 3] = [
    stop(0.0, palette::NODE.with_alpha(0.8)),
    stop(0.5, palette::NODE.with_alpha(0.4)),
    stop(1.0, palette::NODE.with_alpha(0.0)),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Disposed,
}

pub struct AnimationEngine {
    nodes: Vec<Node>,
    connections: Vec<Connection>,
    state: EngineState,
    pending: Option<FrameToken>,
    paused: bool,
    frames: u64,
}

impl AnimationEngine {
    pub fn new(nodes: Vec<Node>, connections: Vec<Connection>) -> Self {
        Self {
            nodes,
            connections,
            state: EngineState::Idle,
            pending: None,
            paused: false,
            frames: 0,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[cfg(test)]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[cfg(test)]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Frames drawn so far
    #[cfg(test)]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[cfg(test)]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// While paused frames are still drawn, but nothing moves
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Begin the frame loop. Only valid from `Idle`; returns whether it started.
    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) -> bool {
        if self.state != EngineState::Idle {
            log::debug!("ignoring start in state {:?}", self.state);
            return false;
        }
        self.state = EngineState::Running;
        self.pending = Some(scheduler.schedule_frame());
        true
    }

    /// Run the frame for `token` if it is the one this engine is waiting on,
    /// then request the next. Returns whether a frame was drawn.
    pub fn on_frame(
        &mut self,
        token: FrameToken,
        canvas: &mut dyn Canvas,
        geometry: &dyn GeometryService,
        scheduler: &mut dyn FrameScheduler,
    ) -> bool {
        if self.state != EngineState::Running || self.pending != Some(token) {
            return false;
        }

        self.render(canvas, geometry);
        self.pending = Some(scheduler.schedule_frame());
        true
    }

    /// Stop the loop. Safe to call repeatedly.
    pub fn dispose(&mut self, scheduler: &mut dyn FrameScheduler) {
        if let Some(token) = self.pending.take() {
            scheduler.cancel_frame(token);
        }
        if self.state != EngineState::Disposed {
            log::debug!("animation disposed after {} frames", self.frames);
        }
        self.state = EngineState::Disposed;
    }

    /// Draw one frame: landmass, then connections, then nodes on top.
    /// Connection and node state advances as each is drawn.
    pub fn render(&mut self, canvas: &mut dyn Canvas, geometry: &dyn GeometryService) {
        let advance = !self.paused;

        canvas.clear();

        if let Some(rings) = geometry.silhouette() {
            canvas.fill_rings(rings, palette::LAND_FILL, palette::LAND_STROKE, LAND_LINE_WIDTH);
        }

        for conn in &mut self.connections {
            if advance {
                conn.advance();
            }
            let (Some(from), Some(to)) = (self.nodes.get(conn.from), self.nodes.get(conn.to)) else {
                continue;
            };
            let (from, to) = (from.position, to.position);

            canvas.stroke_line(from, to, palette::CONNECTION.with_alpha(LINE_ALPHA), LINE_WIDTH);

            let packet = from.lerp(&to, conn.progress);
            canvas.fill_radial(packet, PACKET_RADIUS, &PACKET_GLOW);
            canvas.fill_circle(packet, PACKET_CORE_RADIUS, palette::HIGHLIGHT.with_alpha(0.9));
        }

        for node in &mut self.nodes {
            if advance {
                node.pulse += PULSE_STEP;
            }
            draw_node(canvas, node);
        }

        self.frames += 1;
    }
}

fn draw_node(canvas: &mut dyn Canvas, node: &Node) {
    let scale = 1.0 + node.pulse.sin() * PULSE_DEPTH;
    let r = node.radius * scale;

    canvas.fill_radial(node.position, r * 5.0, &NODE_GLOW);
    canvas.stroke_circle(node.position, r * 2.0, palette::NODE.with_alpha(0.6), 2.0);
    canvas.fill_circle(node.position, r * 1.5, palette::NODE);
    canvas.fill_circle(node.position, node.radius * 0.8, palette::HIGHLIGHT);
}
