//! Assembles tabular stream-chart records into a refinement graph.
//!
//! A chart is described by three record kinds: streams (a named band
//! active over a time range, with sampled heights), links (one stream
//! feeding into another, either merging or docking at a port), and tags
//! (labels riding along a stream). Assembly turns these into the
//! node-per-time-unit graph the [`Refiner`](crate::sim::Refiner)
//! relaxes: stream nodes chained with `Stream` links, ports parented to
//! their landing stream, tags tethered to their stream with a `Tag`
//! link.
//!
//! Malformed records are skipped with a warning rather than failing the
//! whole chart.

use std::collections::BTreeMap;

use log::warn;
use serde::Deserialize;

use braid_core::{
    geometry::Size,
    graph::{Graph, LinkKind, Node},
    identifier::Id,
};

/// Units of time a tag stays attached around its anchor: the span is
/// `[time - TAG_REACH, time + TAG_REACH)`.
const TAG_REACH: i32 = 2;

/// A named band active over `[start, end]`, one node per time unit.
///
/// `values` samples the band's height at specific times; heights between
/// samples are interpolated linearly, and times outside the sampled
/// range take the nearest sample. An empty map falls back to the default
/// height.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamSpec {
    pub name: String,
    pub start: i32,
    pub end: i32,
    #[serde(default)]
    pub values: BTreeMap<i32, f32>,
    /// Stream this one splits off from at `start`.
    #[serde(default)]
    pub parent_start: Option<String>,
    /// Stream this one rejoins after `end`.
    #[serde(default)]
    pub parent_end: Option<String>,
}

impl StreamSpec {
    fn contains(&self, time: i32) -> bool {
        self.start <= time && time <= self.end
    }

    fn clamp(&self, time: i32) -> i32 {
        time.clamp(self.start, self.end)
    }

    fn height_at(&self, time: i32, fallback: f32) -> f32 {
        let before = self.values.range(..=time).next_back();
        let after = self.values.range(time..).next();
        match (before, after) {
            (Some((&t0, &v0)), Some((&t1, &v1))) => {
                if t0 == t1 {
                    v0
                } else {
                    v0 + (v1 - v0) * (time - t0) as f32 / (t1 - t0) as f32
                }
            }
            (Some((_, &v)), None) | (None, Some((_, &v))) => v,
            (None, None) => fallback,
        }
    }
}

/// A connection from one stream into another.
///
/// With `merge` set the source visually flows into the target; without
/// it the source docks at a port node riding on the target.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkSpec {
    pub from: String,
    pub to: String,
    /// Departure time on the source stream.
    pub start: i32,
    /// Arrival time; defaults to the departure time.
    #[serde(default)]
    pub end: Option<i32>,
    #[serde(default)]
    pub merge: bool,
}

/// Where a tag sits relative to its stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagPlacement {
    /// Inside the band; every tag node is parented to the stream node
    /// at the same time unit.
    Inner,
    /// Above the band, tethered with a single tag link.
    #[default]
    Upper,
    /// Below the band, tethered with a single tag link.
    Lower,
}

/// A label anchored to one stream at one time.
#[derive(Debug, Clone, Deserialize)]
pub struct TagSpec {
    pub stream: String,
    pub time: i32,
    pub text: String,
    #[serde(default)]
    pub placement: TagPlacement,
}

/// A full chart description, the input to [`assemble`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChartData {
    pub streams: Vec<StreamSpec>,
    pub links: Vec<LinkSpec>,
    pub tags: Vec<TagSpec>,
}

/// Sizing knobs for the generated nodes.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WeaveOptions {
    /// Width of every stream and tag node, one time unit wide.
    pub node_width: f32,
    /// Stream height when a stream carries no height samples.
    pub default_height: f32,
    /// Height of tag nodes.
    pub tag_height: f32,
    /// Side length of the square port nodes.
    pub port_size: f32,
}

impl Default for WeaveOptions {
    fn default() -> Self {
        Self {
            node_width: 10.0,
            default_height: 10.0,
            tag_height: 8.0,
            port_size: 1.0,
        }
    }
}

/// Builds the refinement graph for a chart.
pub fn assemble(chart: &ChartData, options: &WeaveOptions) -> Graph {
    let mut graph = Graph::new();

    let streams: BTreeMap<&str, &StreamSpec> = chart
        .streams
        .iter()
        .filter(|stream| {
            if stream.start > stream.end {
                warn!(
                    stream = stream.name.as_str(),
                    start = stream.start,
                    end = stream.end;
                    "skipping stream with inverted time range"
                );
                return false;
            }
            true
        })
        .map(|stream| (stream.name.as_str(), stream))
        .collect();

    for &stream in streams.values() {
        add_stream_nodes(&mut graph, stream, options);
    }
    for &stream in streams.values() {
        add_continuations(&mut graph, stream, &streams);
    }
    for link in &chart.links {
        add_link(&mut graph, link, &streams, options);
    }
    for (index, tag) in chart.tags.iter().enumerate() {
        add_tag(&mut graph, index, tag, &streams, options);
    }

    graph
}

/// One node per active time unit, chained with stream links.
fn add_stream_nodes(graph: &mut Graph, stream: &StreamSpec, options: &WeaveOptions) {
    for time in stream.start..=stream.end {
        let id = Id::timed(&stream.name, time);
        let size = Size::new(
            options.node_width,
            stream.height_at(time, options.default_height),
        );
        graph.insert(Node::new(id, size).with_time(time as f32));
        if time > stream.start {
            graph.link(Id::timed(&stream.name, time - 1), id, LinkKind::Stream);
        }
    }
}

/// Stream links that splice a stream into the parents it splits from
/// and rejoins.
fn add_continuations(
    graph: &mut Graph,
    stream: &StreamSpec,
    streams: &BTreeMap<&str, &StreamSpec>,
) {
    if let Some(parent) = &stream.parent_start {
        match streams.get(parent.as_str()) {
            Some(parent_stream) => {
                let time = parent_stream.clamp(stream.start - 1);
                graph.link(
                    Id::timed(parent, time),
                    Id::timed(&stream.name, stream.start),
                    LinkKind::Stream,
                );
            }
            None => warn!(
                stream = stream.name.as_str(), parent = parent.as_str();
                "skipping split from unknown parent stream"
            ),
        }
    }
    if let Some(parent) = &stream.parent_end {
        match streams.get(parent.as_str()) {
            Some(parent_stream) => {
                let time = parent_stream.clamp(stream.end + 1);
                graph.link(
                    Id::timed(&stream.name, stream.end),
                    Id::timed(parent, time),
                    LinkKind::Stream,
                );
            }
            None => warn!(
                stream = stream.name.as_str(), parent = parent.as_str();
                "skipping rejoin into unknown parent stream"
            ),
        }
    }
}

/// Merge links join the two streams directly; non-merge links dock at a
/// synthesized port node riding on the target stream.
fn add_link(
    graph: &mut Graph,
    link: &LinkSpec,
    streams: &BTreeMap<&str, &StreamSpec>,
    options: &WeaveOptions,
) {
    if let Some(end) = link.end {
        if link.start > end {
            warn!(
                from = link.from.as_str(),
                to = link.to.as_str(),
                start = link.start,
                end = end;
                "skipping link with inverted time range"
            );
            return;
        }
    }

    let (Some(from), Some(to)) = (
        streams.get(link.from.as_str()),
        streams.get(link.to.as_str()),
    ) else {
        warn!(
            from = link.from.as_str(), to = link.to.as_str();
            "skipping link between unknown streams"
        );
        return;
    };

    let departure = from.clamp(link.start);
    let arrival = to.clamp(link.end.unwrap_or(link.start) + 1);
    let source = Id::timed(&link.from, departure);
    let landing = Id::timed(&link.to, arrival);

    if link.merge {
        graph.link(source, landing, LinkKind::Link);
    } else {
        let port = Id::new(&format!("{}->{}", link.from, link.to)).suffixed("port");
        graph.insert(
            Node::new(port, Size::new(options.port_size, options.port_size))
                .with_time(arrival as f32)
                .with_parent(landing),
        );
        graph.link(source, port, LinkKind::Port);
    }
}

/// A short run of tag nodes around the anchor time. Inner tags live
/// inside the band via per-unit parenting; outer tags hang off a single
/// tag link so the tag force can push them to their offset distance.
fn add_tag(
    graph: &mut Graph,
    index: usize,
    tag: &TagSpec,
    streams: &BTreeMap<&str, &StreamSpec>,
    options: &WeaveOptions,
) {
    let Some(stream) = streams.get(tag.stream.as_str()) else {
        warn!(
            stream = tag.stream.as_str(), text = tag.text.as_str();
            "skipping tag on unknown stream"
        );
        return;
    };
    if !stream.contains(tag.time) {
        warn!(
            stream = tag.stream.as_str(), time = tag.time, text = tag.text.as_str();
            "skipping tag outside its stream's time range"
        );
        return;
    }

    let name = format!("tag{index}");
    let size = Size::new(options.node_width, options.tag_height);

    for time in (tag.time - TAG_REACH)..(tag.time + TAG_REACH) {
        let id = Id::timed(&name, time);
        let mut node = Node::new(id, size).with_time(time as f32);
        if tag.placement == TagPlacement::Inner {
            node = node.with_parent(Id::timed(&tag.stream, time));
        }
        graph.insert(node);
        if time > tag.time - TAG_REACH {
            graph.link(Id::timed(&name, time - 1), id, LinkKind::Stream);
        }
    }

    if tag.placement != TagPlacement::Inner {
        graph.link(
            Id::timed(&tag.stream, stream.clamp(tag.time - 1)),
            Id::timed(&name, tag.time),
            LinkKind::Tag,
        );
    }
}
