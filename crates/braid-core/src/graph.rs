//! The layout graph model.
//!
//! A [`Graph`] is rebuilt from source records on every data change and
//! then handed to the refiner, which mutates node positions in place.
//! Downstream renderers read positions from the same nodes, so there is
//! no separate synchronization step (single writer, many readers within
//! one execution context).
//!
//! Referential slack is deliberate: links whose endpoints do not resolve
//! are dropped silently when force groups are built, and a parent id
//! that names no node simply disables the containment clamp for that
//! node. Both mirror how upstream stream-chart builders over-emit edges
//! for streams that turn out to be inactive at a given time unit.

use std::fmt;

use indexmap::IndexMap;
use log::debug;

use crate::{
    geometry::{Bounds, Point, Size},
    identifier::Id,
};

/// The force group a link belongs to.
///
/// Each kind is attracted with its own strength, iteration count, and
/// target distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Sequential continuation between consecutive time units of the
    /// same stream (or between a stream and its parent at a boundary).
    Stream,
    /// Explicit user- or data-declared connection between two streams.
    Link,
    /// Label attachment keeping a tag near its stream, at an offset.
    Tag,
    /// Connection anchor synthesized for non-merge links.
    Port,
}

impl LinkKind {
    /// All kinds, in force registration order.
    pub const ALL: [LinkKind; 4] = [
        LinkKind::Stream,
        LinkKind::Link,
        LinkKind::Tag,
        LinkKind::Port,
    ];
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkKind::Stream => "stream",
            LinkKind::Link => "link",
            LinkKind::Tag => "tag",
            LinkKind::Port => "port",
        };
        write!(f, "{name}")
    }
}

/// A typed directed relationship between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    source: Id,
    target: Id,
    kind: LinkKind,
}

impl Link {
    /// Creates a new link between two node identifiers.
    pub fn new(source: Id, target: Id, kind: LinkKind) -> Self {
        Self {
            source,
            target,
            kind,
        }
    }

    /// Returns the source node identifier.
    pub fn source(&self) -> Id {
        self.source
    }

    /// Returns the target node identifier.
    pub fn target(&self) -> Id {
        self.target
    }

    /// Returns the force group this link belongs to.
    pub fn kind(&self) -> LinkKind {
        self.kind
    }
}

/// A positioned, sized entity in the layout graph.
///
/// A node may be pinned on the x axis (when it encodes a time value) and
/// may reference a parent node whose vertical extent it must stay
/// inside. The parent reference is positional only; it does not tie the
/// nodes' lifetimes together.
#[derive(Debug, Clone)]
pub struct Node {
    id: Id,
    size: Size,
    position: Point,
    time: Option<f32>,
    pinned_x: Option<f32>,
    parent: Option<Id>,
}

impl Node {
    /// Creates a node with unset position and no parent.
    ///
    /// Width and height must be finite; a non-finite size is a caller
    /// contract violation and is only caught in debug builds.
    pub fn new(id: Id, size: Size) -> Self {
        debug_assert!(size.is_finite(), "Node {id} has non-finite size {size:?}");
        Self {
            id,
            size,
            position: Point::unset(),
            time: None,
            pinned_x: None,
            parent: None,
        }
    }

    /// Sets the initial position.
    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Sets the time value this node encodes. Timed nodes get their x
    /// pinned to `time * time_scale` when the refiner is configured.
    pub fn with_time(mut self, time: f32) -> Self {
        self.time = Some(time);
        self
    }

    /// Sets the parent reference for the containment clamp.
    pub fn with_parent(mut self, parent: Id) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Returns the node identifier.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Returns the node dimensions.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns the node width.
    pub fn width(&self) -> f32 {
        self.size.width()
    }

    /// Returns the node height.
    pub fn height(&self) -> f32 {
        self.size.height()
    }

    /// Returns the current center position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns the current x-coordinate of the node center.
    pub fn x(&self) -> f32 {
        self.position.x()
    }

    /// Returns the current y-coordinate of the node center.
    pub fn y(&self) -> f32 {
        self.position.y()
    }

    /// Returns the encoded time value, if any.
    pub fn time(&self) -> Option<f32> {
        self.time
    }

    /// Returns the pinned x-coordinate, if the node is pinned.
    pub fn pinned_x(&self) -> Option<f32> {
        self.pinned_x
    }

    /// Returns the parent node identifier, if any.
    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    /// Returns the rectangular extent centered on the current position.
    pub fn bounds(&self) -> Bounds {
        self.position.to_bounds(self.size)
    }

    /// Moves the node center horizontally.
    pub fn set_x(&mut self, x: f32) {
        self.position = self.position.with_x(x);
    }

    /// Moves the node center vertically.
    pub fn set_y(&mut self, y: f32) {
        self.position = self.position.with_y(y);
    }

    /// Pins the node's x-coordinate. The refiner restores this value
    /// after every integration step, so no force can move the node
    /// horizontally.
    pub fn pin_x(&mut self, x: f32) {
        self.pinned_x = Some(x);
        self.set_x(x);
    }
}

/// An insertion-ordered collection of nodes plus an ordered link list.
///
/// Node lookup by id is O(1); iteration follows insertion order, which
/// keeps the refiner deterministic across runs.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: IndexMap<Id, Node>,
    links: Vec<Link>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, replacing any existing node with the same id.
    pub fn insert(&mut self, node: Node) {
        self.nodes.insert(node.id(), node);
    }

    /// Appends a typed link. Endpoints are not required to resolve at
    /// insertion time; unresolved links are dropped when force groups
    /// are built.
    pub fn link(&mut self, source: Id, target: Id, kind: LinkKind) {
        self.links.push(Link::new(source, target, kind));
    }

    /// Returns the number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Checks whether a node with the given id exists.
    pub fn contains(&self, id: Id) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Returns the node with the given id, if it exists.
    pub fn node(&self, id: Id) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Returns a mutable reference to the node with the given id.
    pub fn node_mut(&mut self, id: Id) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Returns the node at the given insertion position.
    ///
    /// # Panics
    /// Panics if the position is out of range.
    pub fn node_at(&self, position: usize) -> &Node {
        &self.nodes[position]
    }

    /// Returns a mutable reference to the node at the given insertion
    /// position.
    ///
    /// # Panics
    /// Panics if the position is out of range.
    pub fn node_at_mut(&mut self, position: usize) -> &mut Node {
        self.nodes
            .get_index_mut(position)
            .map(|(_, node)| node)
            .expect("node position out of range")
    }

    /// Returns the insertion position of the node with the given id.
    pub fn position_of(&self, id: Id) -> Option<usize> {
        self.nodes.get_index_of(&id)
    }

    /// Returns an iterator over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Returns a mutable iterator over all nodes in insertion order.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// Returns all links in insertion order, including unresolved ones.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Returns the resolved `(source, target)` position pairs for one
    /// force group. Links with an endpoint that names no node are
    /// dropped silently.
    pub fn resolved_links(&self, kind: LinkKind) -> Vec<(usize, usize)> {
        self.links
            .iter()
            .filter(|link| link.kind() == kind)
            .filter_map(|link| {
                let source = self.position_of(link.source());
                let target = self.position_of(link.target());
                match (source, target) {
                    (Some(source), Some(target)) => Some((source, target)),
                    _ => {
                        debug!(
                            source = link.source().to_string(),
                            target = link.target().to_string(),
                            kind = link.kind().to_string();
                            "Dropping unresolved link"
                        );
                        None
                    }
                }
            })
            .collect()
    }
}
