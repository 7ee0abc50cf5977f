//! The individual forces of the layout simulation.
//!
//! Numerical behavior follows the scheme popularized by d3-force: forces
//! accumulate into per-node velocities scaled by the decaying alpha
//! term, coincident points are separated by a tiny deterministic jiggle,
//! and positions are only touched at integration time. Forces never
//! move pinned coordinates; integration restores them afterwards.

use braid_core::graph::{Graph, LinkKind};

use crate::config::SimulationOptions;

/// Accumulated velocity of one node, parallel to the graph's insertion
/// order.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Velocity {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

/// Deterministic linear congruential generator producing the tiny
/// displacements that separate exactly coincident points.
///
/// A seeded LCG instead of a thread RNG keeps runs reproducible, which
/// the idempotence guarantee of the refiner depends on.
#[derive(Debug)]
pub(crate) struct Jiggle {
    state: u64,
}

impl Jiggle {
    const A: u64 = 1664525;
    const C: u64 = 1013904223;
    const M: u64 = 4294967296;

    pub(crate) fn new() -> Self {
        Self { state: 1 }
    }

    fn next(&mut self) -> f64 {
        self.state = (Self::A.wrapping_mul(self.state).wrapping_add(Self::C)) % Self::M;
        self.state as f64 / Self::M as f64
    }

    /// A displacement in roughly `[-5e-7, 5e-7]`, never exactly zero in
    /// practice.
    pub(crate) fn displacement(&mut self) -> f32 {
        ((self.next() - 0.5) * 1e-6) as f32
    }
}

/// Weak global pull of every node toward the vertical target position.
/// Used to keep the layout vertically centered in the viewport.
pub(crate) struct CenterPull;

impl CenterPull {
    pub(crate) fn apply(
        &self,
        graph: &Graph,
        vel: &mut [Velocity],
        alpha: f32,
        options: &SimulationOptions,
    ) {
        let target = options.center_target();
        let strength = options.center_strength();
        for (index, node) in graph.nodes().enumerate() {
            vel[index].y += (target - node.y()) * strength * alpha;
        }
    }
}

/// Pairwise charge repulsion between all nodes, cut off beyond a maximum
/// distance to bound its reach.
///
/// This is the exact O(n^2) formulation rather than a Barnes-Hut
/// approximation; stream-chart graphs stay small enough that the full
/// sum is both cheaper to maintain and exactly reproducible.
pub(crate) struct ChargeRepulsion;

impl ChargeRepulsion {
    pub(crate) fn apply(
        &self,
        graph: &Graph,
        vel: &mut [Velocity],
        alpha: f32,
        options: &SimulationOptions,
        jiggle: &mut Jiggle,
    ) {
        let strength = options.charge_strength();
        let limit_squared = options
            .charge_limit()
            .map_or(f32::INFINITY, |limit| limit * limit);
        // Below one unit of squared distance the force law switches to a
        // geometric mean to avoid blowing up on near-coincident points.
        const MIN_DISTANCE_SQUARED: f32 = 1.0;

        let positions: Vec<(f32, f32)> = graph.nodes().map(|node| (node.x(), node.y())).collect();

        for i in 0..positions.len() {
            for j in 0..positions.len() {
                if i == j {
                    continue;
                }
                let mut dx = positions[j].0 - positions[i].0;
                let mut dy = positions[j].1 - positions[i].1;
                let mut distance_squared = dx * dx + dy * dy;
                if distance_squared >= limit_squared {
                    continue;
                }
                if dx == 0.0 {
                    dx = jiggle.displacement();
                    distance_squared += dx * dx;
                }
                if dy == 0.0 {
                    dy = jiggle.displacement();
                    distance_squared += dy * dy;
                }
                if distance_squared < MIN_DISTANCE_SQUARED {
                    distance_squared = (MIN_DISTANCE_SQUARED * distance_squared).sqrt();
                }
                let weight = strength * alpha / distance_squared;
                vel[i].x += dx * weight;
                vel[i].y += dy * weight;
            }
        }
    }
}

/// Pushes overlapping nodes apart, weighted toward moving the smaller
/// node. Tuned weak so it corrects overlap without destabilizing the
/// rest of the layout.
pub(crate) struct Collision;

impl Collision {
    pub(crate) fn apply(
        &self,
        graph: &Graph,
        vel: &mut [Velocity],
        options: &SimulationOptions,
        jiggle: &mut Jiggle,
    ) {
        let strength = options.collide_strength();
        let rule = options.collide_radius();

        let projected: Vec<(f32, f32, f32)> = graph
            .nodes()
            .enumerate()
            .map(|(index, node)| {
                (
                    node.x() + vel[index].x,
                    node.y() + vel[index].y,
                    rule.radius(node),
                )
            })
            .collect();

        for i in 0..projected.len() {
            let (xi, yi, ri) = projected[i];
            for j in (i + 1)..projected.len() {
                let (xj, yj, rj) = projected[j];
                let sum = ri + rj;
                let mut dx = xi - xj;
                let mut dy = yi - yj;
                let mut distance_squared = dx * dx + dy * dy;
                if distance_squared >= sum * sum {
                    continue;
                }
                if dx == 0.0 {
                    dx = jiggle.displacement();
                    distance_squared += dx * dx;
                }
                if dy == 0.0 {
                    dy = jiggle.displacement();
                    distance_squared += dy * dy;
                }
                let distance = distance_squared.sqrt();
                let push = (sum - distance) / distance * strength;
                let (px, py) = (dx * push, dy * push);
                // The lighter node yields more
                let share = (rj * rj) / (ri * ri + rj * rj);
                vel[i].x += px * share;
                vel[i].y += py * share;
                vel[j].x -= px * (1.0 - share);
                vel[j].y -= py * (1.0 - share);
            }
        }
    }
}

/// A resolved link inside one force group.
#[derive(Debug, Clone, Copy)]
struct SimLink {
    source: usize,
    target: usize,
    /// Fraction of the correction carried by the target node, derived
    /// from the relative degrees of the endpoints within this group.
    bias: f32,
}

/// Spring-like attraction toward a target distance for every link of one
/// group.
///
/// Link endpoints are resolved to node positions once per configure;
/// links that name a missing node have already been dropped by then.
#[derive(Debug)]
pub(crate) struct LinkAttraction {
    kind: LinkKind,
    links: Vec<SimLink>,
}

impl LinkAttraction {
    /// Resolves the links of one group against the graph.
    pub(crate) fn resolve(graph: &Graph, kind: LinkKind) -> Self {
        let pairs = graph.resolved_links(kind);

        let mut degree = vec![0usize; graph.len()];
        for &(source, target) in &pairs {
            degree[source] += 1;
            degree[target] += 1;
        }

        let links = pairs
            .into_iter()
            .map(|(source, target)| SimLink {
                source,
                target,
                bias: degree[source] as f32 / (degree[source] + degree[target]) as f32,
            })
            .collect();

        Self { kind, links }
    }

    /// Returns the number of resolved links in this group.
    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }

    pub(crate) fn apply(
        &self,
        graph: &Graph,
        vel: &mut [Velocity],
        alpha: f32,
        options: &SimulationOptions,
        jiggle: &mut Jiggle,
    ) {
        let params = options.link_params(self.kind);
        let strength = params.strength();
        let distance = params.distance();

        for _ in 0..params.iterations() {
            for link in &self.links {
                let source = graph.node_at(link.source);
                let target = graph.node_at(link.target);

                let mut dx =
                    target.x() + vel[link.target].x - source.x() - vel[link.source].x;
                let mut dy =
                    target.y() + vel[link.target].y - source.y() - vel[link.source].y;
                if dx == 0.0 {
                    dx = jiggle.displacement();
                }
                if dy == 0.0 {
                    dy = jiggle.displacement();
                }

                let length = (dx * dx + dy * dy).sqrt();
                let correction = (length - distance) / length * alpha * strength;
                let (cx, cy) = (dx * correction, dy * correction);

                vel[link.target].x -= cx * link.bias;
                vel[link.target].y -= cy * link.bias;
                vel[link.source].x += cx * (1.0 - link.bias);
                vel[link.source].y += cy * (1.0 - link.bias);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braid_core::{
        geometry::{Point, Size},
        graph::Node,
        identifier::Id,
    };
    use float_cmp::assert_approx_eq;

    fn placed(name: &str, x: f32, y: f32) -> Node {
        Node::new(Id::new(name), Size::new(10.0, 10.0)).with_position(Point::new(x, y))
    }

    #[test]
    fn test_jiggle_is_deterministic_and_tiny() {
        let mut a = Jiggle::new();
        let mut b = Jiggle::new();

        for _ in 0..100 {
            let d = a.displacement();
            assert_eq!(d, b.displacement());
            assert!(d.abs() <= 5.1e-7);
        }
    }

    #[test]
    fn test_center_pull_moves_toward_target() {
        let mut graph = Graph::new();
        graph.insert(placed("above", 0.0, 10.0));
        graph.insert(placed("below", 0.0, 90.0));

        let options = SimulationOptions::default()
            .with_viewport(crate::config::Viewport::bounded(200.0, 100.0));
        let mut vel = vec![Velocity::default(); 2];

        CenterPull.apply(&graph, &mut vel, 1.0, &options);

        assert!(vel[0].y > 0.0, "node above center is pulled down");
        assert!(vel[1].y < 0.0, "node below center is pulled up");
        assert_approx_eq!(f32, vel[0].y, (50.0 - 10.0) * 0.001);
    }

    #[test]
    fn test_charge_repulsion_pushes_apart() {
        let mut graph = Graph::new();
        graph.insert(placed("left", 0.0, 0.0));
        graph.insert(placed("right", 10.0, 0.0));

        let options = SimulationOptions::default();
        let mut vel = vec![Velocity::default(); 2];
        let mut jiggle = Jiggle::new();

        ChargeRepulsion.apply(&graph, &mut vel, 1.0, &options, &mut jiggle);

        // negative strength repels: left node pushed further left
        assert!(vel[0].x < 0.0);
        assert!(vel[1].x > 0.0);
        assert_approx_eq!(f32, vel[0].x, vel[1].x * -1.0);
    }

    #[test]
    fn test_charge_repulsion_respects_cutoff() {
        let mut graph = Graph::new();
        graph.insert(placed("left", 0.0, 0.0));
        graph.insert(placed("right", 500.0, 0.0));

        let options = SimulationOptions::default()
            .with_viewport(crate::config::Viewport::bounded(1000.0, 100.0));
        let mut vel = vec![Velocity::default(); 2];
        let mut jiggle = Jiggle::new();

        ChargeRepulsion.apply(&graph, &mut vel, 1.0, &options, &mut jiggle);

        // 500 is beyond the 100-unit cutoff
        assert_eq!(vel[0].x, 0.0);
        assert_eq!(vel[1].x, 0.0);
    }

    #[test]
    fn test_collision_separates_overlapping_nodes() {
        let mut graph = Graph::new();
        graph.insert(placed("a", 0.0, 0.0));
        graph.insert(placed("b", 5.0, 0.0));

        let options = SimulationOptions::default();
        let mut vel = vec![Velocity::default(); 2];
        let mut jiggle = Jiggle::new();

        Collision.apply(&graph, &mut vel, &options, &mut jiggle);

        assert!(vel[0].x < 0.0);
        assert!(vel[1].x > 0.0);
    }

    #[test]
    fn test_collision_ignores_separated_nodes() {
        let mut graph = Graph::new();
        graph.insert(placed("a", 0.0, 0.0));
        graph.insert(placed("b", 100.0, 0.0));

        let options = SimulationOptions::default();
        let mut vel = vec![Velocity::default(); 2];
        let mut jiggle = Jiggle::new();

        Collision.apply(&graph, &mut vel, &options, &mut jiggle);

        assert_eq!(vel[0].x, 0.0);
        assert_eq!(vel[1].x, 0.0);
    }

    #[test]
    fn test_link_attraction_pulls_linked_nodes_together() {
        let mut graph = Graph::new();
        graph.insert(placed("a", 0.0, 0.0));
        graph.insert(placed("b", 100.0, 0.0));
        graph.link(Id::new("a"), Id::new("b"), LinkKind::Stream);

        let options = SimulationOptions::default();
        let force = LinkAttraction::resolve(&graph, LinkKind::Stream);
        assert_eq!(force.len(), 1);

        let mut vel = vec![Velocity::default(); 2];
        let mut jiggle = Jiggle::new();
        force.apply(&graph, &mut vel, 1.0, &options, &mut jiggle);

        assert!(vel[0].x > 0.0, "source pulled toward target");
        assert!(vel[1].x < 0.0, "target pulled toward source");
    }

    #[test]
    fn test_link_attraction_skips_unresolved_links() {
        let mut graph = Graph::new();
        graph.insert(placed("a", 0.0, 0.0));
        graph.link(Id::new("a"), Id::new("missing"), LinkKind::Tag);

        let force = LinkAttraction::resolve(&graph, LinkKind::Tag);
        assert_eq!(force.len(), 0);
    }

    #[test]
    fn test_link_bias_favors_less_connected_endpoint() {
        // hub has degree 2, each leaf degree 1; corrections should move
        // the leaves more than the hub.
        let mut graph = Graph::new();
        graph.insert(placed("hub", 0.0, 0.0));
        graph.insert(placed("leaf1", 50.0, 0.0));
        graph.insert(placed("leaf2", -50.0, 0.0));
        graph.link(Id::new("hub"), Id::new("leaf1"), LinkKind::Link);
        graph.link(Id::new("hub"), Id::new("leaf2"), LinkKind::Link);

        let options = SimulationOptions::default();
        let force = LinkAttraction::resolve(&graph, LinkKind::Link);
        let mut vel = vec![Velocity::default(); 3];
        let mut jiggle = Jiggle::new();
        force.apply(&graph, &mut vel, 1.0, &options, &mut jiggle);

        assert!(vel[1].x.abs() > vel[0].x.abs());
        assert!(vel[2].x.abs() > vel[0].x.abs());
    }
}
