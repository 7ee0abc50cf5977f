//! The layout refiner: a force simulation specialized for time-pinned
//! stream graphs.
//!
//! [`Refiner`] owns a [`Graph`] and relaxes the vertical arrangement of
//! its nodes while the horizontal axis stays locked to time. Each step
//! applies the configured forces in a fixed order, integrates the
//! resulting velocities with damping, and re-applies the hard
//! constraints (pinned x, viewport bounds, parent containment) so that
//! snapshots handed to callbacks are always well formed.

use log::{debug, info};

use braid_core::{
    geometry::clamp_saturating,
    graph::{Graph, LinkKind},
};

use crate::config::{Parameter, SimulationOptions};
use crate::sim::forces::{
    CenterPull, ChargeRepulsion, Collision, Jiggle, LinkAttraction, Velocity,
};

pub(crate) mod forces;

/// Callback invoked with a snapshot of the graph.
pub type Snapshot<'a> = dyn FnMut(&Graph) + 'a;

/// Spiral constants for seeding nodes without an initial position, laid
/// out phyllotaxis-style around the origin so no two seeds coincide.
const INITIAL_RADIUS: f32 = 10.0;
const INITIAL_ANGLE: f32 = std::f32::consts::PI * (3.0 - 2.236_068);

/// A force-directed refiner over a stream graph.
///
/// Construct it with [`Refiner::configure`], then drive it with
/// [`step`](Refiner::step), [`run`](Refiner::run) or
/// [`stop`](Refiner::stop). The graph can be inspected at any point via
/// [`graph`](Refiner::graph) and recovered with
/// [`into_graph`](Refiner::into_graph).
pub struct Refiner<'a> {
    graph: Graph,
    options: SimulationOptions,
    velocities: Vec<Velocity>,
    link_forces: Vec<LinkAttraction>,
    alpha: f32,
    ended: bool,
    jiggle: Jiggle,
    tick_callback: Option<Box<Snapshot<'a>>>,
    end_callback: Option<Box<Snapshot<'a>>>,
}

impl<'a> Refiner<'a> {
    /// Prepares a graph for refinement.
    ///
    /// Nodes with a time value get their x pinned to `time * time_scale`.
    /// Nodes without any position are seeded on a deterministic spiral
    /// so that coincident starts cannot trap the simulation. Links of
    /// each kind are resolved once here; links naming unknown nodes are
    /// dropped with a log message.
    pub fn configure(mut graph: Graph, options: SimulationOptions) -> Self {
        let time_scale = options.time_scale();
        for (index, node) in graph.nodes_mut().enumerate() {
            if let Some(time) = node.time() {
                node.pin_x(time * time_scale);
            }
            if node.position().x_is_unset() {
                let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
                let angle = index as f32 * INITIAL_ANGLE;
                node.set_x(radius * angle.cos());
            }
            if node.position().y_is_unset() {
                let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
                let angle = index as f32 * INITIAL_ANGLE;
                node.set_y(radius * angle.sin());
            }
        }

        let link_forces = LinkKind::ALL
            .iter()
            .map(|&kind| LinkAttraction::resolve(&graph, kind))
            .collect::<Vec<_>>();

        info!(
            nodes = graph.len(),
            links = link_forces.iter().map(LinkAttraction::len).sum::<usize>();
            "configured refiner"
        );

        let velocities = vec![Velocity::default(); graph.len()];
        Self {
            graph,
            options,
            velocities,
            link_forces,
            alpha: 1.0,
            ended: false,
            jiggle: Jiggle::new(),
            tick_callback: None,
            end_callback: None,
        }
    }

    /// Adjusts a single tuning parameter between steps.
    pub fn set_parameter(&mut self, parameter: Parameter) {
        self.options.apply(parameter);
    }

    /// Registers a callback invoked after every step.
    pub fn on_tick(&mut self, callback: impl FnMut(&Graph) + 'a) {
        self.tick_callback = Some(Box::new(callback));
    }

    /// Registers a callback invoked once, when the simulation cools
    /// below the alpha floor or is stopped.
    pub fn on_end(&mut self, callback: impl FnMut(&Graph) + 'a) {
        self.end_callback = Some(Box::new(callback));
    }

    /// Current cooling value. Starts at 1 and decays toward 0.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Whether the simulation has cooled below the floor or was stopped.
    pub fn ended(&self) -> bool {
        self.ended
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Advances the simulation by one step and fires the tick callback.
    /// When alpha first drops below the floor, fires the end callback.
    pub fn step(&mut self) {
        if self.ended {
            return;
        }
        self.advance();
        if let Some(callback) = self.tick_callback.as_mut() {
            callback(&self.graph);
        }
        if self.alpha < self.options.alpha_floor() {
            self.finish();
        }
    }

    /// Runs the simulation.
    ///
    /// With `steps == 0`, reheats alpha to 1 and steps until the
    /// simulation cools below the floor, firing the end callback at the
    /// end. With `steps > 0`, advances exactly that many steps without
    /// ever firing the end callback.
    pub fn run(&mut self, steps: usize) {
        if steps == 0 {
            self.alpha = 1.0;
            self.ended = false;
            let mut taken = 0usize;
            while !self.ended {
                self.step();
                taken += 1;
            }
            debug!(steps = taken; "refinement converged");
        } else {
            for _ in 0..steps {
                self.advance();
                if let Some(callback) = self.tick_callback.as_mut() {
                    callback(&self.graph);
                }
            }
        }
    }

    /// Stops the simulation immediately. Fires the end callback if it
    /// has not fired yet.
    pub fn stop(&mut self) {
        self.alpha = 0.0;
        if !self.ended {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.ended = true;
        if let Some(callback) = self.end_callback.as_mut() {
            callback(&self.graph);
        }
    }

    /// One full simulation step: decay alpha, apply all forces into the
    /// velocity buffer, integrate with damping, then restore the hard
    /// constraints.
    fn advance(&mut self) {
        self.alpha += (0.0 - self.alpha) * self.options.alpha_decay();

        CenterPull.apply(&self.graph, &mut self.velocities, self.alpha, &self.options);
        ChargeRepulsion.apply(
            &self.graph,
            &mut self.velocities,
            self.alpha,
            &self.options,
            &mut self.jiggle,
        );
        Collision.apply(&self.graph, &mut self.velocities, &self.options, &mut self.jiggle);
        for force in &self.link_forces {
            force.apply(
                &self.graph,
                &mut self.velocities,
                self.alpha,
                &self.options,
                &mut self.jiggle,
            );
        }

        self.integrate();
        self.enforce_constraints();
    }

    /// Applies damped velocities to positions. Pinned x coordinates are
    /// restored afterwards and their horizontal velocity cleared, so
    /// pinned nodes only ever move vertically.
    fn integrate(&mut self) {
        let damping = 1.0 - self.options.velocity_decay();
        for (index, node) in self.graph.nodes_mut().enumerate() {
            let velocity = &mut self.velocities[index];
            velocity.x *= damping;
            velocity.y *= damping;
            if let Some(pinned) = node.pinned_x() {
                node.set_x(pinned);
                velocity.x = 0.0;
            } else {
                node.set_x(node.x() + velocity.x);
            }
            node.set_y(node.y() + velocity.y);
        }
    }

    /// Clamps every node into the viewport, then clamps children into
    /// their parents.
    ///
    /// Two separate passes: a child is clamped against its parent's
    /// already-clamped extent, so one level of nesting is stable within
    /// a single step. Pinned nodes keep their x even when it falls
    /// outside the viewport.
    fn enforce_constraints(&mut self) {
        let viewport = self.options.viewport();
        let margin = self.options.margin();

        for node in self.graph.nodes_mut() {
            if node.pinned_x().is_none() {
                if let Some(width) = viewport.width() {
                    let half = node.size().half_width();
                    node.set_x(clamp_saturating(node.x(), half, width - half));
                }
            }
            if let Some(height) = viewport.height() {
                let half = node.size().half_height();
                node.set_y(clamp_saturating(node.y(), half + margin, height - half - margin));
            }
        }

        let clamps: Vec<(usize, f32)> = self
            .graph
            .nodes()
            .enumerate()
            .filter_map(|(index, node)| {
                let parent_id = node.parent()?;
                let Some(parent) = self.graph.node(parent_id) else {
                    debug!(
                        node = node.id().to_string(),
                        parent = parent_id.to_string();
                        "Skipping containment for missing parent"
                    );
                    return None;
                };
                let extent = parent.bounds().shrink_vertical(node.size().half_height());
                Some((index, extent.clamp_y(node.y())))
            })
            .collect();
        for (index, y) in clamps {
            self.graph.node_at_mut(index).set_y(y);
        }
    }
}
