//! Owned view of the graph handed to a renderer.
//!
//! A renderer (canvas, SVG, image export) receives a [`RenderState`] built
//! by [`Model::render_state`](crate::tea::Model::render_state) and needs
//! nothing else: node geometry, status, interaction flags and edges are all
//! copied in, so the renderer never touches the graph itself.

use serde::Serialize;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::task::{TaskId, TaskStatus};
use crate::layout::Point;
use crate::Result;
use crate::tea::Notification;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub position: Point,
    /// Position comes from a user placement rather than the default circle.
    pub pinned: bool,
    pub hovered: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    pub dependent: TaskId,
    pub prerequisite: TaskId,
    /// Submitted but not yet acknowledged.
    pub pending: bool,
}

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Monotonic version stamp for render states.
pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderState {
    pub version: u64,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub hovered: Option<TaskId>,
    pub selected: Option<TaskId>,
    pub notification: Option<Notification>,
}

impl RenderState {
    pub fn node(&self, id: TaskId) -> Option<&NodeView> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Something that turns a [`RenderState`] into an artifact: a document for
/// another process, an image, a canvas frame.
pub trait Renderer {
    type Output;

    fn render(&self, state: &RenderState) -> Result<Self::Output>;
}

/// Serializes the state for renderers living outside this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer {
    pub pretty: bool,
}

impl Renderer for JsonRenderer {
    type Output = String;

    fn render(&self, state: &RenderState) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(state)?
        } else {
            serde_json::to_string(state)?
        };
        Ok(json)
    }
}

/// Draws the graph as a standalone SVG image.
///
/// Edges run from prerequisite to dependent with an arrowhead on the
/// dependent end; pending edges are dashed.
#[derive(Debug, Clone, Copy)]
pub struct SvgRenderer {
    pub node_radius: f64,
    pub margin: f64,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            node_radius: 24.0,
            margin: 16.0,
        }
    }
}

fn status_fill(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "#e2e8f0",
        TaskStatus::InProgress => "#bee3f8",
        TaskStatus::Completed => "#c6f6d5",
        TaskStatus::Blocked => "#fed7d7",
    }
}

fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

impl SvgRenderer {
    /// Top-left corner and size of the drawing, including margins.
    fn bounds(&self, state: &RenderState) -> (Point, f64, f64) {
        let pad = self.node_radius + self.margin;
        let mut nodes = state.nodes.iter().map(|n| n.position);
        let Some(first) = nodes.next() else {
            return (Point::default(), 2.0 * pad, 2.0 * pad);
        };
        let (min, max) = nodes.fold((first, first), |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            )
        });
        let origin = Point::new(min.x - pad, min.y - pad);
        (origin, max.x - min.x + 2.0 * pad, max.y - min.y + 2.0 * pad)
    }
}

impl Renderer for SvgRenderer {
    type Output = String;

    fn render(&self, state: &RenderState) -> Result<String> {
        let (origin, width, height) = self.bounds(state);
        let mut svg = String::new();
        write!(
            svg,
            r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="{:.1} {:.1} {:.1} {:.1}" font-family="system-ui, sans-serif">
  <defs>
    <marker id="arrow" markerWidth="12" markerHeight="12" refX="10" refY="6" orient="auto" markerUnits="strokeWidth">
      <path d="M2,2 L10,6 L2,10 z" fill="context-stroke" />
    </marker>
  </defs>
"##,
            width, height, origin.x, origin.y, width, height
        )?;

        for edge in &state.edges {
            let (Some(from), Some(to)) = (state.node(edge.prerequisite), state.node(edge.dependent))
            else {
                continue;
            };
            // Stop at the rim so the arrowhead stays visible.
            let (a, b) = (from.position, to.position);
            let length = a.distance(b);
            if length <= 2.0 * self.node_radius {
                continue;
            }
            let trim = self.node_radius / length;
            let start = Point::new(a.x + (b.x - a.x) * trim, a.y + (b.y - a.y) * trim);
            let end = Point::new(b.x - (b.x - a.x) * trim, b.y - (b.y - a.y) * trim);
            let dash = if edge.pending {
                " stroke-dasharray=\"8 6\""
            } else {
                ""
            };
            writeln!(
                svg,
                "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#2d3748\" stroke-width=\"2\" marker-end=\"url(#arrow)\"{} />",
                start.x, start.y, end.x, end.y, dash
            )?;
        }

        for node in &state.nodes {
            let stroke_width = if node.selected || node.hovered { 4 } else { 2 };
            writeln!(
                svg,
                "  <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" fill=\"{}\" stroke=\"#2d3748\" stroke-width=\"{}\" />",
                node.position.x,
                node.position.y,
                self.node_radius,
                status_fill(node.status),
                stroke_width
            )?;
            writeln!(
                svg,
                "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"13\" text-anchor=\"middle\" dominant-baseline=\"central\">{}</text>",
                node.position.x,
                node.position.y,
                escape_xml(&node.title)
            )?;
        }

        svg.push_str("</svg>\n");
        Ok(svg)
    }
}
