use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{
    self, Align2, Color32, CursorIcon, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2, pos2, vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::scale::{self, GraphRect};

use super::super::render_utils::{
    circle_visible, dim_color, draw_background, handle_camera, segment_visible, stroke_rect,
};
use super::super::{Corner, DragState, SearchMatchCache, ViewModel};

const HANDLE_HIT_RADIUS: f32 = 7.0;

fn box_screen_rect(viewport: Rect, pan: Vec2, zoom: f32, graph: GraphRect) -> Rect {
    let top_left =
        scale::graph_to_screen(viewport, pan, zoom, vec2(graph.x1 as f32, graph.y1 as f32));
    let bottom_right =
        scale::graph_to_screen(viewport, pan, zoom, vec2(graph.x2 as f32, graph.y2 as f32));
    Rect::from_min_max(top_left, bottom_right)
}

fn corner_positions(rect: Rect) -> [(Corner, Pos2); 4] {
    [
        (Corner::TopLeft, rect.left_top()),
        (Corner::TopRight, rect.right_top()),
        (Corner::BottomLeft, rect.left_bottom()),
        (Corner::BottomRight, rect.right_bottom()),
    ]
}

impl ViewModel {
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_matches
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .controller
            .graph
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(slot, node)| matcher.fuzzy_match(&node.id, query).map(|_| slot))
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_matches = Some(SearchMatchCache {
            query: query.to_owned(),
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    /// Drag-start hit test, topmost rectangle first. Corner handles are only
    /// live on the active rectangle; anywhere else starts a pan.
    fn hit_test_boxes(&self, viewport: Rect, pointer: Option<Pos2>) -> DragState {
        let Some(pointer) = pointer else {
            return DragState::Pan;
        };

        let detail = &self.controller.detail;
        for idx in (0..detail.boxes.len()).rev() {
            let Some(graph_rect) = detail.boxes[idx] else {
                continue;
            };
            let screen = box_screen_rect(viewport, detail.pan, detail.zoom, graph_rect);

            if detail.active_box == Some(idx) {
                for (corner, corner_pos) in corner_positions(screen) {
                    if corner_pos.distance(pointer) <= HANDLE_HIT_RADIUS {
                        return DragState::ResizeBox(idx, corner);
                    }
                }
            }

            if screen.expand(2.0).contains(pointer) {
                return DragState::MoveBox(idx);
            }
        }

        DragState::Pan
    }

    /// Applies a screen-space move/resize to one rectangle, then routes the
    /// resulting geometry through the coordinate translator back into the
    /// filter's feature boundaries. The rectangle itself is the edit's
    /// origin, so the write-back suppresses selection re-derivation.
    fn apply_box_drag(&mut self, viewport: Rect, idx: usize, delta: Vec2, corner: Option<Corner>) {
        let detail = &self.controller.detail;
        let Some(Some(graph_rect)) = detail.boxes.get(idx).copied() else {
            return;
        };

        let mut screen = box_screen_rect(viewport, detail.pan, detail.zoom, graph_rect);
        match corner {
            None => screen = screen.translate(delta),
            Some(Corner::TopLeft) => screen.min += delta,
            Some(Corner::TopRight) => {
                screen.max.x += delta.x;
                screen.min.y += delta.y;
            }
            Some(Corner::BottomLeft) => {
                screen.min.x += delta.x;
                screen.max.y += delta.y;
            }
            Some(Corner::BottomRight) => screen.max += delta,
        }
        // A corner dragged past its opposite flips the rectangle; keep the
        // geometry normalized before mapping it back.
        let screen = Rect::from_min_max(
            pos2(screen.min.x.min(screen.max.x), screen.min.y.min(screen.max.y)),
            pos2(screen.min.x.max(screen.max.x), screen.min.y.max(screen.max.y)),
        );

        let camera = scale::camera_graph_rect(viewport, detail.pan, detail.zoom);
        let mapped = scale::screen_to_graph(screen, viewport, camera);
        let normalized = GraphRect {
            x1: mapped.x1.min(mapped.x2),
            x2: mapped.x1.max(mapped.x2),
            y1: mapped.y1.min(mapped.y2),
            y2: mapped.y1.max(mapped.y2),
        };

        let x_axis = detail.x_axis.clone();
        let y_axis = detail.y_axis.clone();
        let x_bounds = detail
            .scale
            .graph_span_to_feature(&x_axis, normalized.x1, normalized.x2);
        let y_bounds = detail
            .scale
            .graph_span_to_feature(&y_axis, normalized.y1, normalized.y2);

        self.controller.detail.boxes[idx] = Some(normalized);
        self.controller.update_filter(idx, &x_axis, x_bounds, false);
        self.controller.update_filter(idx, &y_axis, y_bounds, false);
    }

    pub(in crate::app) fn draw_detail(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        {
            let detail = &mut self.controller.detail;
            handle_camera(ui, rect, &response, &mut detail.pan, &mut detail.zoom);
        }

        let pseudo_matches = self.cached_search_matches();

        if response.drag_started_by(egui::PointerButton::Primary) {
            self.drag = self.hit_test_boxes(rect, response.interact_pointer_pos());
            if let DragState::MoveBox(idx) | DragState::ResizeBox(idx, _) = self.drag {
                self.controller.detail.active_box = Some(idx);
            }
        }
        if response.drag_stopped() {
            self.drag = DragState::Idle;
        }

        let delta = response.drag_delta();
        if response.dragged_by(egui::PointerButton::Primary) && delta != Vec2::ZERO {
            match self.drag {
                DragState::Pan => self.controller.detail.pan += delta,
                DragState::MoveBox(idx) => self.apply_box_drag(rect, idx, delta, None),
                DragState::ResizeBox(idx, corner) => {
                    self.apply_box_drag(rect, idx, delta, Some(corner));
                }
                DragState::Idle => {}
            }
        }

        if response.clicked() {
            self.controller.detail.active_box =
                match self.hit_test_boxes(rect, response.interact_pointer_pos()) {
                    DragState::MoveBox(idx) | DragState::ResizeBox(idx, _) => Some(idx),
                    _ => None,
                };
        }

        let detail = &self.controller.detail;
        let graph = &self.controller.graph;
        let pan = detail.pan;
        let zoom = detail.zoom;

        let node_radius = (3.2 * zoom.powf(0.4)).clamp(1.5, 9.0);
        let edge_stroke_width = (0.9 * zoom.sqrt()).clamp(0.4, 2.2);

        let positions = graph
            .nodes
            .iter()
            .map(|node| scale::graph_to_screen(rect, pan, zoom, vec2(node.x, node.y)))
            .collect::<Vec<_>>();

        for edge in &graph.edges {
            if edge.hidden {
                continue;
            }
            let (Some(&src), Some(&dst)) = (
                graph.index_by_id.get(&edge.source),
                graph.index_by_id.get(&edge.target),
            ) else {
                continue;
            };

            let start = positions[src];
            let end = positions[dst];
            if !segment_visible(rect, start, end, 2.0) {
                continue;
            }
            painter.line_segment([start, end], Stroke::new(edge_stroke_width, edge.color));
        }

        let search_active = pseudo_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());
        let pointer = ui.input(|input| input.pointer.hover_pos());
        let mut hovered: Option<(usize, f32)> = None;

        for (slot, node) in graph.nodes.iter().enumerate() {
            let position = positions[slot];
            if !circle_visible(rect, position, node_radius) {
                continue;
            }

            let is_match = pseudo_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&slot));
            let color = if search_active && !is_match {
                dim_color(node.color, 0.35)
            } else {
                node.color
            };
            painter.circle_filled(position, node_radius, color);
            if is_match {
                painter.circle_stroke(
                    position,
                    node_radius + 1.5,
                    Stroke::new(1.4, Color32::from_rgb(103, 196, 255)),
                );
            }

            if let Some(pointer) = pointer {
                let distance = position.distance(pointer);
                if distance <= node_radius + 2.0
                    && hovered.is_none_or(|(_, best)| distance < best)
                {
                    hovered = Some((slot, distance));
                }
            }
        }
        self.hovered_node = hovered.map(|(slot, _)| slot);

        if self.hovered_node.is_some() {
            ui.output_mut(|output| output.cursor_icon = CursorIcon::PointingHand);
        }

        let detail = &self.controller.detail;
        for (idx, graph_rect) in detail.boxes.iter().enumerate() {
            let Some(graph_rect) = *graph_rect else {
                continue;
            };
            let screen = box_screen_rect(rect, pan, zoom, graph_rect);
            let is_active = detail.active_box == Some(idx);
            let color = self
                .controller
                .filter(idx)
                .map(|filter| filter.color)
                .unwrap_or(Color32::WHITE);

            stroke_rect(
                &painter,
                screen,
                Stroke::new(if is_active { 2.2 } else { 1.4 }, color),
            );
            if is_active {
                for (_, corner_pos) in corner_positions(screen) {
                    painter.circle_filled(corner_pos, 3.5, color);
                }
            }
        }

        if let Some(slot) = self.hovered_node {
            let node = &graph.nodes[slot];
            let format_value = |value: Option<f64>| {
                value
                    .map(|value| format!("{value:.2}"))
                    .unwrap_or_else(|| "-".to_owned())
            };
            let panel_text = format!(
                "{}  |  {} {}  |  {} {}",
                node.id,
                detail.x_axis,
                format_value(node.feature(&detail.x_axis)),
                detail.y_axis,
                format_value(node.feature(&detail.y_axis)),
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        self.last_detail_camera = Some(scale::camera_graph_rect(rect, pan, zoom));
    }
}
