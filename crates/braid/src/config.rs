//! Configuration types for the layout simulation.
//!
//! All simulation knobs live in one explicit value type,
//! [`SimulationOptions`], handed to [`Refiner::configure`] and adjusted
//! afterwards through [`Parameter`] values. There is no hidden force
//! registry; what the options say is what the simulation does.
//!
//! All types implement [`serde::Deserialize`] so a configuration file
//! can override any subset of the defaults.
//!
//! [`Refiner::configure`]: crate::sim::Refiner::configure

use serde::Deserialize;

use braid_core::graph::{LinkKind, Node};

/// Viewport bounds for the refined layout, in the renderer's coordinate
/// space. Either axis may be left unbounded.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct Viewport {
    width: Option<f32>,
    height: Option<f32>,
}

impl Viewport {
    /// Creates a viewport bounded on both axes.
    pub fn bounded(width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
        }
    }

    /// Creates a viewport with no bounds on either axis.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Returns the horizontal limit, if bounded.
    pub fn width(self) -> Option<f32> {
        self.width
    }

    /// Returns the vertical limit, if bounded.
    pub fn height(self) -> Option<f32> {
        self.height
    }
}

/// Per-force-group attraction parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LinkParams {
    strength: f32,
    iterations: usize,
    distance: f32,
}

impl LinkParams {
    /// Creates a parameter set for one link group.
    pub fn new(strength: f32, iterations: usize, distance: f32) -> Self {
        Self {
            strength,
            iterations,
            distance,
        }
    }

    /// Returns the attraction strength.
    pub fn strength(self) -> f32 {
        self.strength
    }

    /// Returns the number of relaxation passes per step.
    pub fn iterations(self) -> usize {
        self.iterations
    }

    /// Returns the target inter-node distance.
    pub fn distance(self) -> f32 {
        self.distance
    }
}

/// Attraction parameters for each of the four link groups.
///
/// Defaults reproduce the stream-chart tuning: stream and port edges are
/// stiff and target distance zero so linked nodes coincide, plain links
/// are moderate, and tags sit near their stream at an offset.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LinkGroups {
    stream: LinkParams,
    link: LinkParams,
    tag: LinkParams,
    port: LinkParams,
}

impl Default for LinkGroups {
    fn default() -> Self {
        Self {
            stream: LinkParams::new(1.0, 20, 0.0),
            link: LinkParams::new(0.5, 1, 0.0),
            tag: LinkParams::new(0.2, 1, 30.0),
            port: LinkParams::new(1.0, 20, 0.0),
        }
    }
}

impl LinkGroups {
    /// Returns the parameters for one link group.
    pub fn get(&self, kind: LinkKind) -> LinkParams {
        match kind {
            LinkKind::Stream => self.stream,
            LinkKind::Link => self.link,
            LinkKind::Tag => self.tag,
            LinkKind::Port => self.port,
        }
    }

    fn get_mut(&mut self, kind: LinkKind) -> &mut LinkParams {
        match kind {
            LinkKind::Stream => &mut self.stream,
            LinkKind::Link => &mut self.link,
            LinkKind::Tag => &mut self.tag,
            LinkKind::Port => &mut self.port,
        }
    }
}

/// How the collision radius of a node is derived.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusRule {
    /// The node's full height (the stream-chart default; bands collide
    /// vertically, not horizontally).
    NodeHeight,
    /// The node's height times a factor.
    Scaled(f32),
    /// A fixed radius for every node.
    Constant(f32),
}

impl RadiusRule {
    /// Resolves the collision radius for a node.
    pub fn radius(self, node: &Node) -> f32 {
        match self {
            RadiusRule::NodeHeight => node.height(),
            RadiusRule::Scaled(factor) => node.height() * factor,
            RadiusRule::Constant(radius) => radius,
        }
    }
}

/// A single simulation knob together with its new value.
///
/// Passed to [`Refiner::set_parameter`] to adjust a running simulation
/// without resetting node positions.
///
/// [`Refiner::set_parameter`]: crate::sim::Refiner::set_parameter
#[derive(Debug, Clone, Copy)]
pub enum Parameter {
    /// Global damping applied to velocities at integration time.
    VelocityDecay(f32),
    /// Per-step decay of the simulation's remaining energy.
    AlphaDecay(f32),
    /// Strength of the weak pull toward the vertical target.
    CenterStrength(f32),
    /// The vertical target position itself.
    CenterY(f32),
    /// Pairwise repulsion strength (negative repels).
    ChargeStrength(f32),
    /// Distance beyond which repulsion is not computed.
    ChargeMaxDistance(f32),
    /// Strength of the overlap-separation force.
    CollideStrength(f32),
    /// Rule deriving each node's collision radius.
    CollideRadius(RadiusRule),
    /// Attraction strength for one link group.
    LinkStrength(LinkKind, f32),
    /// Relaxation passes per step for one link group.
    LinkIterations(LinkKind, usize),
    /// Target inter-node distance for one link group.
    LinkDistance(LinkKind, f32),
}

/// All numeric knobs of the layout simulation.
///
/// Missing or out-of-range bounds degrade to "unbounded"; nothing here
/// is validated eagerly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    velocity_decay: f32,
    alpha_decay: f32,
    alpha_floor: f32,
    center_strength: f32,
    center_y: Option<f32>,
    charge_strength: f32,
    charge_max_distance: Option<f32>,
    collide_strength: f32,
    collide_radius: RadiusRule,
    links: LinkGroups,
    viewport: Viewport,
    margin: f32,
    time_scale: f32,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            velocity_decay: 0.15,
            alpha_decay: 0.07,
            alpha_floor: 0.001,
            center_strength: 0.001,
            center_y: None,
            charge_strength: -0.3,
            charge_max_distance: None,
            collide_strength: 0.003,
            collide_radius: RadiusRule::NodeHeight,
            links: LinkGroups::default(),
            viewport: Viewport::unbounded(),
            margin: 0.2,
            time_scale: 1000.0,
        }
    }
}

impl SimulationOptions {
    /// Returns options with the given viewport bounds.
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Returns options with the given time-to-x scale factor.
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Returns the velocity damping term.
    pub fn velocity_decay(&self) -> f32 {
        self.velocity_decay
    }

    /// Returns the per-step energy decay.
    pub fn alpha_decay(&self) -> f32 {
        self.alpha_decay
    }

    /// Returns the energy threshold below which a run has converged.
    pub fn alpha_floor(&self) -> f32 {
        self.alpha_floor
    }

    /// Returns the strength of the vertical-target pull.
    pub fn center_strength(&self) -> f32 {
        self.center_strength
    }

    /// Returns the effective vertical target: the configured value, or
    /// the middle of the bounded viewport, or zero.
    pub fn center_target(&self) -> f32 {
        self.center_y
            .or_else(|| self.viewport.height().map(|h| h / 2.0))
            .unwrap_or(0.0)
    }

    /// Returns the pairwise repulsion strength.
    pub fn charge_strength(&self) -> f32 {
        self.charge_strength
    }

    /// Returns the repulsion cutoff distance: the configured value, or
    /// the viewport height, or unbounded.
    pub fn charge_limit(&self) -> Option<f32> {
        self.charge_max_distance.or(self.viewport.height())
    }

    /// Returns the overlap-separation strength.
    pub fn collide_strength(&self) -> f32 {
        self.collide_strength
    }

    /// Returns the collision radius rule.
    pub fn collide_radius(&self) -> RadiusRule {
        self.collide_radius
    }

    /// Returns the attraction parameters for one link group.
    pub fn link_params(&self, kind: LinkKind) -> LinkParams {
        self.links.get(kind)
    }

    /// Returns the viewport bounds.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Returns the extra vertical margin kept free at the viewport
    /// edges.
    pub fn margin(&self) -> f32 {
        self.margin
    }

    /// Returns the factor mapping a node's time value to its pinned
    /// x-coordinate.
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Applies a single knob change, leaving everything else untouched.
    pub fn apply(&mut self, parameter: Parameter) {
        match parameter {
            Parameter::VelocityDecay(value) => self.velocity_decay = value,
            Parameter::AlphaDecay(value) => self.alpha_decay = value,
            Parameter::CenterStrength(value) => self.center_strength = value,
            Parameter::CenterY(value) => self.center_y = Some(value),
            Parameter::ChargeStrength(value) => self.charge_strength = value,
            Parameter::ChargeMaxDistance(value) => self.charge_max_distance = Some(value),
            Parameter::CollideStrength(value) => self.collide_strength = value,
            Parameter::CollideRadius(rule) => self.collide_radius = rule,
            Parameter::LinkStrength(kind, value) => self.links.get_mut(kind).strength = value,
            Parameter::LinkIterations(kind, value) => self.links.get_mut(kind).iterations = value,
            Parameter::LinkDistance(kind, value) => self.links.get_mut(kind).distance = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_defaults_match_stream_chart_tuning() {
        let options = SimulationOptions::default();

        assert_approx_eq!(f32, options.velocity_decay(), 0.15);
        assert_approx_eq!(f32, options.alpha_decay(), 0.07);
        assert_approx_eq!(f32, options.charge_strength(), -0.3);
        assert_approx_eq!(f32, options.collide_strength(), 0.003);
        assert_approx_eq!(f32, options.time_scale(), 1000.0);

        let stream = options.link_params(LinkKind::Stream);
        assert_approx_eq!(f32, stream.strength(), 1.0);
        assert_eq!(stream.iterations(), 20);
        assert_approx_eq!(f32, stream.distance(), 0.0);

        let tag = options.link_params(LinkKind::Tag);
        assert_approx_eq!(f32, tag.strength(), 0.2);
        assert_eq!(tag.iterations(), 1);
        assert_approx_eq!(f32, tag.distance(), 30.0);
    }

    #[test]
    fn test_center_target_prefers_explicit_value() {
        let mut options =
            SimulationOptions::default().with_viewport(Viewport::bounded(100.0, 80.0));
        assert_approx_eq!(f32, options.center_target(), 40.0);

        options.apply(Parameter::CenterY(10.0));
        assert_approx_eq!(f32, options.center_target(), 10.0);
    }

    #[test]
    fn test_center_target_unbounded_falls_back_to_zero() {
        let options = SimulationOptions::default();
        assert_approx_eq!(f32, options.center_target(), 0.0);
    }

    #[test]
    fn test_charge_limit_falls_back_to_viewport_height() {
        let options = SimulationOptions::default().with_viewport(Viewport::bounded(100.0, 80.0));
        assert_eq!(options.charge_limit(), Some(80.0));

        let unbounded = SimulationOptions::default();
        assert_eq!(unbounded.charge_limit(), None);
    }

    #[test]
    fn test_apply_targets_a_single_knob() {
        let mut options = SimulationOptions::default();

        options.apply(Parameter::LinkDistance(LinkKind::Tag, 50.0));
        assert_approx_eq!(f32, options.link_params(LinkKind::Tag).distance(), 50.0);
        // other groups untouched
        assert_approx_eq!(f32, options.link_params(LinkKind::Stream).distance(), 0.0);

        options.apply(Parameter::VelocityDecay(0.4));
        assert_approx_eq!(f32, options.velocity_decay(), 0.4);
        assert_approx_eq!(f32, options.alpha_decay(), 0.07);
    }

    #[test]
    fn test_radius_rules() {
        use braid_core::{geometry::Size, graph::Node, identifier::Id};

        let node = Node::new(Id::new("n"), Size::new(10.0, 16.0));

        assert_approx_eq!(f32, RadiusRule::NodeHeight.radius(&node), 16.0);
        assert_approx_eq!(f32, RadiusRule::Scaled(0.5).radius(&node), 8.0);
        assert_approx_eq!(f32, RadiusRule::Constant(3.0).radius(&node), 3.0);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let options: SimulationOptions = toml::from_str(
            r#"
            alpha_decay = 0.02

            [viewport]
            height = 600.0

            [links.tag]
            strength = 0.5
            iterations = 2
            distance = 20.0
            "#,
        )
        .expect("options should parse");

        assert_approx_eq!(f32, options.alpha_decay(), 0.02);
        // untouched fields keep their defaults
        assert_approx_eq!(f32, options.velocity_decay(), 0.15);
        assert_eq!(options.viewport().width(), None);
        assert_eq!(options.viewport().height(), Some(600.0));
        assert_approx_eq!(f32, options.link_params(LinkKind::Tag).strength(), 0.5);
        assert_eq!(options.link_params(LinkKind::Stream).iterations(), 20);
    }
}
