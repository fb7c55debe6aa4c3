//! Automatic node placement.
//!
//! The built-in algorithm layers the graph with Kahn's algorithm and places
//! layers left to right. Nodes never reached (cycles, or nodes whose only
//! predecessors sit in a cycle) go into one trailing layer, so every node
//! gets a position.
//!
//! With the `layout` feature, [`LayoutAlgorithm::Sugiyama`] runs the
//! `rust-sugiyama` crate instead, which also reduces edge crossings.

use std::collections::{HashMap, HashSet};

use crate::config::{LayoutAlgorithm, LayoutOptions};
use crate::geometry::Rect;
use crate::graph::GraphModel;

/// Rounds `value` to the nearest multiple of `grid_size`. A non-positive
/// grid leaves the value unchanged.
pub fn snap_to_grid(value: f32, grid_size: f32) -> f32 {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return value;
    }
    (value / grid_size).round() * grid_size
}

/// Topological layers of `nodes`, considering only edges between them.
///
/// Layer order follows the order of `nodes`. Self-loops and edges leaving
/// the set are ignored.
pub fn kahn_layers(nodes: &[String], edges: &[(String, String)]) -> Vec<Vec<String>> {
    let members: HashSet<&str> = nodes.iter().map(String::as_str).collect();
    let mut in_degree: HashMap<&str, usize> = nodes.iter().map(|n| (n.as_str(), 0)).collect();
    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();

    for (src, dst) in edges {
        if src == dst || !members.contains(src.as_str()) || !members.contains(dst.as_str()) {
            continue;
        }
        successors.entry(src.as_str()).or_default().push(dst.as_str());
        if let Some(d) = in_degree.get_mut(dst.as_str()) {
            *d += 1;
        }
    }

    let mut placed: HashSet<&str> = HashSet::new();
    let mut frontier: Vec<&str> = nodes
        .iter()
        .map(String::as_str)
        .filter(|n| in_degree.get(n) == Some(&0))
        .collect();
    let mut layers: Vec<Vec<String>> = Vec::new();

    while !frontier.is_empty() {
        let mut next = Vec::new();
        for &node in &frontier {
            placed.insert(node);
            for &succ in successors.get(node).map(Vec::as_slice).unwrap_or(&[]) {
                if let Some(d) = in_degree.get_mut(succ) {
                    *d = d.saturating_sub(1);
                    if *d == 0 && !placed.contains(succ) && !next.contains(&succ) {
                        next.push(succ);
                    }
                }
            }
        }
        layers.push(frontier.iter().map(|s| s.to_string()).collect());
        frontier = next;
    }

    let unreached: Vec<String> = nodes.iter().filter(|n| !placed.contains(n.as_str())).cloned().collect();
    if !unreached.is_empty() {
        tracing::debug!(count = unreached.len(), "nodes not reached by layering, adding trailing layer");
        layers.push(unreached);
    }
    layers
}

/// Places nodes according to [`LayoutOptions`].
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    options: LayoutOptions,
}

impl LayoutEngine {
    pub fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    fn edges(graph: &GraphModel) -> Vec<(String, String)> {
        graph
            .connections()
            .map(|c| (c.source_node_hash.clone(), c.target_node_hash.clone()))
            .collect()
    }

    /// Lays out every node of the graph. Returns the hashes of the nodes
    /// that were positioned.
    pub fn auto_layout(&self, graph: &mut GraphModel) -> Vec<String> {
        let nodes: Vec<String> = graph.nodes().map(|n| n.hash.clone()).collect();
        self.layout_nodes(graph, &nodes, self.options.start_x, self.options.start_y)
    }

    /// Lays out `unmatched` to the right of the already positioned `matched`
    /// nodes, using only the edges among `unmatched`.
    pub fn auto_layout_subset(&self, graph: &mut GraphModel, unmatched: &[String], matched: &[String]) -> Vec<String> {
        if unmatched.is_empty() {
            return Vec::new();
        }
        let (start_x, start_y) = match bounding_box(graph, matched) {
            Some(bounds) => (bounds.right() + self.options.horizontal_spacing, bounds.y),
            None => (self.options.start_x, self.options.start_y),
        };
        self.layout_nodes(graph, unmatched, start_x, start_y)
    }

    fn layout_nodes(&self, graph: &mut GraphModel, nodes: &[String], start_x: f32, start_y: f32) -> Vec<String> {
        let nodes: Vec<String> = nodes.iter().filter(|h| graph.node(h).is_some()).cloned().collect();
        let edges = Self::edges(graph);

        let positions = match self.options.algorithm {
            LayoutAlgorithm::Layered => self.layered_positions(graph, &nodes, &edges, start_x, start_y),
            #[cfg(feature = "layout")]
            LayoutAlgorithm::Sugiyama => sugiyama::positions(graph, &nodes, &edges, &self.options, start_x, start_y),
            #[cfg(not(feature = "layout"))]
            LayoutAlgorithm::Sugiyama => {
                tracing::warn!("sugiyama layout requested without the `layout` feature, using layered layout");
                self.layered_positions(graph, &nodes, &edges, start_x, start_y)
            }
        };

        let mut moved = Vec::with_capacity(positions.len());
        for (hash, x, y) in positions {
            if let Some(node) = graph.node_mut(&hash) {
                node.x = x;
                node.y = y;
                moved.push(hash);
            }
        }
        moved
    }

    fn layered_positions(
        &self,
        graph: &GraphModel,
        nodes: &[String],
        edges: &[(String, String)],
        start_x: f32,
        start_y: f32,
    ) -> Vec<(String, f32, f32)> {
        let mut positions = Vec::with_capacity(nodes.len());
        let mut x = start_x;
        for layer in kahn_layers(nodes, edges) {
            let mut y = start_y;
            let mut max_width: f32 = 0.0;
            for hash in layer {
                let Some(node) = graph.node(&hash) else { continue };
                max_width = max_width.max(node.width);
                let height = node.height;
                positions.push((hash, x, y));
                y += height + self.options.vertical_spacing;
            }
            x += max_width + self.options.horizontal_spacing;
        }
        positions
    }
}

/// Union of the rects of the given nodes; unknown hashes are skipped.
pub fn bounding_box(graph: &GraphModel, hashes: &[String]) -> Option<Rect> {
    hashes
        .iter()
        .filter_map(|h| graph.node(h).map(|n| n.rect()))
        .reduce(|a, b| a.union(&b))
}

/// Translates the given nodes so their bounding box is centered on
/// `(cx, cy)`.
pub fn center_nodes(graph: &mut GraphModel, hashes: &[String], cx: f32, cy: f32) {
    let Some(bounds) = bounding_box(graph, hashes) else {
        return;
    };
    let center = bounds.center();
    let (dx, dy) = (cx - center.x, cy - center.y);
    for hash in hashes {
        if let Some(node) = graph.node_mut(hash) {
            node.x += dx;
            node.y += dy;
        }
    }
}

#[cfg(feature = "layout")]
mod sugiyama {
    use std::collections::HashMap;

    use crate::config::LayoutOptions;
    use crate::graph::GraphModel;

    /// Left-to-right Sugiyama placement, translated so the top-left of the
    /// result lands on `(start_x, start_y)`.
    pub(super) fn positions(
        graph: &GraphModel,
        nodes: &[String],
        edges: &[(String, String)],
        options: &LayoutOptions,
        start_x: f32,
        start_y: f32,
    ) -> Vec<(String, f32, f32)> {
        if nodes.is_empty() {
            return Vec::new();
        }

        let index: HashMap<&str, u32> = nodes
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i as u32))
            .collect();

        // Layers run along x, so the algorithm sees swapped sizes.
        let vertices: Vec<(u32, (f64, f64))> = nodes
            .iter()
            .filter_map(|h| {
                let node = graph.node(h)?;
                Some((*index.get(h.as_str())?, (node.height as f64, node.width as f64)))
            })
            .collect();

        let mapped_edges: Vec<(u32, u32)> = edges
            .iter()
            .filter(|(src, dst)| src != dst)
            .filter_map(|(src, dst)| Some((*index.get(src.as_str())?, *index.get(dst.as_str())?)))
            .collect();

        let mut config = rust_sugiyama::configure::Config::default();
        if options.vertical_spacing > 0.0 {
            config.vertex_spacing = options.vertical_spacing as f64;
        }

        let subgraphs = rust_sugiyama::from_vertices_and_edges(&vertices, &mapped_edges, &config);

        let mut raw: Vec<(String, f64, f64)> = Vec::with_capacity(nodes.len());
        for (layout, _width, _height) in &subgraphs {
            for &(idx, (x, y)) in layout {
                if let Some(hash) = nodes.get(idx) {
                    raw.push((hash.clone(), y, x));
                }
            }
        }

        let min_x = raw.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
        let min_y = raw.iter().map(|p| p.2).fold(f64::INFINITY, f64::min);
        raw.into_iter()
            .map(|(hash, x, y)| (hash, start_x + (x - min_x) as f32, start_y + (y - min_y) as f32))
            .collect()
    }
}
