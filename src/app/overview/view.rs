use eframe::egui::{self, Align2, Color32, FontId, Sense, Stroke, Ui, vec2};

use crate::scale;
use crate::util::format_count;

use super::super::ViewModel;
use super::super::render_utils::{handle_camera, rotate, segment_visible};

impl ViewModel {
    pub(in crate::app) fn draw_overview(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_rgb(15, 18, 24));

        {
            let over = &mut self.controller.over;
            handle_camera(ui, rect, &response, &mut over.pan, &mut over.zoom);
            if response.dragged_by(egui::PointerButton::Primary) {
                over.pan += response.drag_delta();
            }
        }

        let over = &self.controller.over;
        if over.grouped.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No selections yet - draw one in the detail view.",
                FontId::proportional(13.0),
                Color32::from_gray(140),
            );
            return;
        }

        let pan = over.pan;
        let zoom = over.zoom;
        let node_radius = (14.0 * zoom).clamp(7.0, 34.0);

        let positions = over
            .grouped
            .iter()
            .map(|grouped| scale::graph_to_screen(rect, pan, zoom, grouped.pos))
            .collect::<Vec<_>>();

        for ((from, to), aggregate) in over.aggregate_edges() {
            if from == to {
                // Self pairs are tracked for the counts but drawn as part of
                // the node label, not as a loop.
                continue;
            }
            let (Some(start), Some(end)) = (positions.get(from).copied(), positions.get(to).copied())
            else {
                continue;
            };
            if !segment_visible(rect, start, end, 6.0) {
                continue;
            }

            let direction = (end - start).normalized();
            // Perpendicular offset keeps A->B and B->A visually separate.
            let offset = direction.rot90() * 5.0;
            let tail = start + offset + direction * node_radius;
            let tip = end + offset - direction * (node_radius + 2.0);

            let stroke = Stroke::new(
                aggregate.weight.clamp(1.0, 10.0),
                over.grouped[from].color,
            );
            painter.line_segment([tail, tip], stroke);
            painter.line_segment([tip, tip + rotate(-direction, 0.5) * 9.0], stroke);
            painter.line_segment([tip, tip + rotate(-direction, -0.5) * 9.0], stroke);

            let midpoint = tail + (tip - tail) * 0.5 + offset * 1.8;
            painter.text(
                midpoint,
                Align2::CENTER_CENTER,
                format_count(aggregate.count),
                FontId::proportional(11.0),
                Color32::from_gray(220),
            );
        }

        for (idx, grouped) in over.grouped.iter().enumerate() {
            let position = positions[idx];
            painter.circle_filled(position, node_radius, grouped.color);
            painter.circle_stroke(
                position,
                node_radius,
                Stroke::new(1.2, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            );
            painter.text(
                position,
                Align2::CENTER_CENTER,
                idx.to_string(),
                FontId::proportional(12.0),
                Color32::from_gray(20),
            );

            let inner = match over.aggregate_edge(idx, idx) {
                Some(aggregate) => format!(
                    "{} nodes / {} edges ({} inner)",
                    format_count(grouped.node_ids.len()),
                    format_count(grouped.edge_slots.len()),
                    format_count(aggregate.count),
                ),
                None => format!(
                    "{} nodes / {} edges",
                    format_count(grouped.node_ids.len()),
                    format_count(grouped.edge_slots.len()),
                ),
            };
            painter.text(
                position + vec2(0.0, node_radius + 4.0),
                Align2::CENTER_TOP,
                inner,
                FontId::proportional(11.0),
                Color32::from_gray(225),
            );
        }
    }
}
