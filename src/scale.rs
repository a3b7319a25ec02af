use std::collections::HashMap;

use eframe::egui::{Pos2, Rect, Vec2, vec2};

use crate::data::NodeRecord;
use crate::filter::Boundary;

/// The fixed normalized square every graph view renders in, independent of
/// camera state.
pub const GRAPH_MIN: f64 = 0.0;
pub const GRAPH_MAX: f64 = 500.0;

const GRAPH_CENTER: f32 = ((GRAPH_MIN + GRAPH_MAX) / 2.0) as f32;

/// Raw feature-space extrema of one axis over the full node universe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisExtent {
    pub min: f64,
    pub max: f64,
}

/// Axis-aligned rectangle in graph space. Callers keep `x1 <= x2` and
/// `y1 <= y2` except where a raw camera mapping is passed straight through.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GraphRect {
    pub x1: f64,
    pub x2: f64,
    pub y1: f64,
    pub y2: f64,
}

impl GraphRect {
    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

/// Per-axis scaling parameters, computed once from the full universe and
/// cached for the whole session. Extrema must come from the complete node
/// set: recomputing them from a filtered view would silently reposition
/// everything.
#[derive(Clone, Debug, Default)]
pub struct ScaleMap {
    params: HashMap<String, AxisExtent>,
}

impl ScaleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes and caches the extrema for an axis. Subsequent calls for the
    /// same axis are no-ops, so switching back to a previously seen axis
    /// reuses the original extrema.
    pub fn ensure_axis(&mut self, axis: &str, nodes: &[NodeRecord]) {
        if self.params.contains_key(axis) {
            return;
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for node in nodes {
            if let Some(value) = node.feature(axis) {
                min = min.min(value);
                max = max.max(value);
            }
        }

        let extent = if min.is_finite() && max.is_finite() {
            AxisExtent { min, max }
        } else {
            AxisExtent { min: 0.0, max: 0.0 }
        };
        self.params.insert(axis.to_owned(), extent);
    }

    pub fn extent(&self, axis: &str) -> Option<AxisExtent> {
        self.params.get(axis).copied()
    }

    /// Scales a raw feature value into `[GRAPH_MIN, GRAPH_MAX]`. Axes whose
    /// name contains "latitude" use inverted scaling so higher latitudes
    /// render toward the top of the view.
    pub fn feature_to_graph(&self, axis: &str, value: f64) -> f64 {
        let Some(extent) = self.params.get(axis) else {
            debug_assert!(false, "feature_to_graph on uncached axis {axis}");
            return (GRAPH_MIN + GRAPH_MAX) / 2.0;
        };

        let scaled = linear_rescale(*extent, value);
        if is_latitude(axis) {
            GRAPH_MAX - scaled
        } else {
            scaled
        }
    }

    /// Inverse of `feature_to_graph` for one coordinate.
    pub fn graph_to_feature(&self, axis: &str, scaled: f64) -> f64 {
        let Some(extent) = self.params.get(axis) else {
            debug_assert!(false, "graph_to_feature on uncached axis {axis}");
            return 0.0;
        };

        let scaled = if is_latitude(axis) {
            GRAPH_MAX - scaled
        } else {
            scaled
        };
        inverse_rescale(*extent, scaled)
    }

    /// Converts a graph-space interval into a feature-space boundary. The
    /// result is normalized because latitude inversion flips the endpoint
    /// order.
    pub fn graph_span_to_feature(&self, axis: &str, a: f64, b: f64) -> Boundary {
        let first = self.graph_to_feature(axis, a);
        let second = self.graph_to_feature(axis, b);
        Boundary {
            min: first.min(second),
            max: first.max(second),
        }
    }
}

fn is_latitude(axis: &str) -> bool {
    axis.to_ascii_lowercase().contains("latitude")
}

fn linear_rescale(extent: AxisExtent, value: f64) -> f64 {
    let span = extent.max - extent.min;
    if span.abs() < f64::EPSILON {
        // Degenerate axis: a constant midpoint keeps downstream positions
        // finite instead of propagating NaN everywhere.
        return (GRAPH_MIN + GRAPH_MAX) / 2.0;
    }

    GRAPH_MIN + (GRAPH_MAX - GRAPH_MIN) / span * (value - extent.min)
}

fn inverse_rescale(extent: AxisExtent, scaled: f64) -> f64 {
    let span = extent.max - extent.min;
    if span.abs() < f64::EPSILON {
        return extent.min;
    }

    extent.min + (scaled - GRAPH_MIN) * span / (GRAPH_MAX - GRAPH_MIN)
}

/// Maps a screen-space rectangle into graph space by proportional position
/// within the viewport, then through the camera's currently visible
/// graph-space rectangle. Recomputed on every call: pan and zoom change both
/// inputs continuously.
pub fn screen_to_graph(selection: Rect, viewport: Rect, camera: GraphRect) -> GraphRect {
    let fx1 = ((selection.left() - viewport.left()) / viewport.width()) as f64;
    let fx2 = ((selection.right() - viewport.left()) / viewport.width()) as f64;
    let fy1 = ((selection.top() - viewport.top()) / viewport.height()) as f64;
    let fy2 = ((selection.bottom() - viewport.top()) / viewport.height()) as f64;

    GraphRect {
        x1: camera.x1 + fx1 * camera.width(),
        x2: camera.x1 + fx2 * camera.width(),
        y1: camera.y1 + fy1 * camera.height(),
        y2: camera.y1 + fy2 * camera.height(),
    }
}

pub fn graph_to_screen(viewport: Rect, pan: Vec2, zoom: f32, graph: Vec2) -> Pos2 {
    viewport.center() + pan + (graph - vec2(GRAPH_CENTER, GRAPH_CENTER)) * zoom
}

pub fn screen_to_graph_point(viewport: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - viewport.center() - pan) / zoom + vec2(GRAPH_CENTER, GRAPH_CENTER)
}

/// The pan that keeps `graph` under `pointer` at the given zoom. Used to
/// zoom toward the cursor instead of the viewport center.
pub fn pan_for_anchor(viewport: Rect, pointer: Pos2, graph: Vec2, zoom: f32) -> Vec2 {
    pointer - viewport.center() - (graph - vec2(GRAPH_CENTER, GRAPH_CENTER)) * zoom
}

/// The graph-space rectangle currently visible under the given camera.
pub fn camera_graph_rect(viewport: Rect, pan: Vec2, zoom: f32) -> GraphRect {
    let top_left = screen_to_graph_point(viewport, pan, zoom, viewport.left_top());
    let bottom_right = screen_to_graph_point(viewport, pan, zoom, viewport.right_bottom());

    GraphRect {
        x1: top_left.x as f64,
        x2: bottom_right.x as f64,
        y1: top_left.y as f64,
        y2: bottom_right.y as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DEFAULT_NODE_COLOR, FeatureMap};
    use eframe::egui::pos2;

    fn node_with(axis: &str, value: f64) -> NodeRecord {
        let mut features = FeatureMap::new();
        features.insert(axis.to_owned(), value);
        NodeRecord {
            id: format!("{axis}-{value}"),
            features,
            x: 0.0,
            y: 0.0,
            color: DEFAULT_NODE_COLOR,
        }
    }

    fn scale_for(axis: &str, min: f64, max: f64) -> ScaleMap {
        let nodes = vec![node_with(axis, min), node_with(axis, max)];
        let mut scale = ScaleMap::new();
        scale.ensure_axis(axis, &nodes);
        scale
    }

    #[test]
    fn round_trip_without_latitude() {
        let scale = scale_for("DISTANCE", 10.0, 2500.0);
        for value in [10.0, 500.0, 1337.5, 2500.0] {
            let there = scale.feature_to_graph("DISTANCE", value);
            let back = scale.graph_to_feature("DISTANCE", there);
            assert!((back - value).abs() < 1e-9, "{value} -> {there} -> {back}");
        }
    }

    #[test]
    fn latitude_scaling_is_inverted() {
        let scale = scale_for("LATITUDE", -90.0, 90.0);
        assert!((scale.feature_to_graph("LATITUDE", 90.0) - GRAPH_MIN).abs() < 1e-9);
        assert!((scale.feature_to_graph("LATITUDE", -90.0) - GRAPH_MAX).abs() < 1e-9);

        // Substring match, case-insensitive.
        let scale = scale_for("origin_latitude", -90.0, 90.0);
        assert!((scale.feature_to_graph("origin_latitude", 90.0) - GRAPH_MIN).abs() < 1e-9);
    }

    #[test]
    fn latitude_round_trip_survives_inversion() {
        let scale = scale_for("LATITUDE", -90.0, 90.0);
        for value in [-90.0, -12.5, 0.0, 47.3, 90.0] {
            let there = scale.feature_to_graph("LATITUDE", value);
            let back = scale.graph_to_feature("LATITUDE", there);
            assert!((back - value).abs() < 1e-9);
        }
    }

    #[test]
    fn graph_span_is_normalized() {
        let scale = scale_for("LATITUDE", -90.0, 90.0);
        // Graph-space top (y1) is the higher latitude after inversion.
        let bounds = scale.graph_span_to_feature("LATITUDE", 0.0, 500.0);
        assert!((bounds.min - -90.0).abs() < 1e-9);
        assert!((bounds.max - 90.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_extent_stays_finite() {
        let scale = scale_for("CONSTANT", 7.0, 7.0);
        let scaled = scale.feature_to_graph("CONSTANT", 7.0);
        assert!((scaled - 250.0).abs() < 1e-9);
        assert!((scale.graph_to_feature("CONSTANT", scaled) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn extrema_are_cached_per_session() {
        let mut scale = scale_for("DISTANCE", 0.0, 100.0);
        // A later call with different data must not recompute the extrema.
        let other = vec![node_with("DISTANCE", 9000.0)];
        scale.ensure_axis("DISTANCE", &other);
        assert_eq!(
            scale.extent("DISTANCE"),
            Some(AxisExtent { min: 0.0, max: 100.0 })
        );
    }

    #[test]
    fn screen_rect_maps_proportionally() {
        let viewport = Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 400.0));
        let camera = GraphRect { x1: 100.0, x2: 300.0, y1: 50.0, y2: 150.0 };
        let selection = Rect::from_min_max(pos2(200.0, 100.0), pos2(600.0, 300.0));

        let mapped = screen_to_graph(selection, viewport, camera);
        assert!((mapped.x1 - 150.0).abs() < 1e-6);
        assert!((mapped.x2 - 250.0).abs() < 1e-6);
        assert!((mapped.y1 - 75.0).abs() < 1e-6);
        assert!((mapped.y2 - 125.0).abs() < 1e-6);
    }

    #[test]
    fn camera_transform_round_trips() {
        let viewport = Rect::from_min_max(pos2(0.0, 0.0), pos2(640.0, 480.0));
        let pan = vec2(31.0, -12.0);
        let zoom = 1.7;

        let graph = vec2(123.0, 456.0);
        let screen = graph_to_screen(viewport, pan, zoom, graph);
        let back = screen_to_graph_point(viewport, pan, zoom, screen);
        assert!((back.x - graph.x).abs() < 1e-3);
        assert!((back.y - graph.y).abs() < 1e-3);

        let camera = camera_graph_rect(viewport, pan, zoom);
        assert!(camera.x1 < camera.x2 && camera.y1 < camera.y2);
    }
}
