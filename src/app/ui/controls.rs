use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::EdgeDirection;
use crate::filter::{Boundary, Filter};
use crate::scale::{GRAPH_MAX, GRAPH_MIN, GraphRect};
use crate::util::format_count;

use super::super::ViewModel;

enum FilterAction {
    Recolor(usize, Color32),
    Bounds(usize, String, Boundary),
    Move(usize, bool),
    Remove(usize),
    Select(usize),
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Data & Filters");
        ui.add_space(4.0);
        ui.label(format!(
            "{} nodes, {} edges loaded",
            format_count(self.controller.graph.node_count()),
            format_count(self.controller.graph.edge_count())
        ));

        ui.separator();

        let node_features = self.controller.graph.node_features.clone();
        let mut x_axis = self.controller.detail.x_axis.clone();
        let mut y_axis = self.controller.detail.y_axis.clone();

        egui::ComboBox::from_label("X axis")
            .selected_text(x_axis.clone())
            .show_ui(ui, |ui| {
                for key in &node_features {
                    ui.selectable_value(&mut x_axis, key.clone(), key);
                }
            });
        egui::ComboBox::from_label("Y axis")
            .selected_text(y_axis.clone())
            .show_ui(ui, |ui| {
                for key in &node_features {
                    ui.selectable_value(&mut y_axis, key.clone(), key);
                }
            });
        if x_axis != self.controller.detail.x_axis || y_axis != self.controller.detail.y_axis {
            self.controller.set_axes(x_axis, y_axis);
        }
        for (label, axis) in [
            ("X", &self.controller.detail.x_axis),
            ("Y", &self.controller.detail.y_axis),
        ] {
            if let Some(extent) = self.controller.detail.scale.extent(axis) {
                ui.small(format!("{label}: {:.2} .. {:.2}", extent.min, extent.max));
            }
        }

        ui.add_space(4.0);

        let mut direction = self.controller.direction;
        ui.horizontal(|ui| {
            ui.label("Edges:");
            ui.selectable_value(&mut direction, EdgeDirection::Outgoing, "Outgoing")
                .on_hover_text("Index edges by their source node.");
            ui.selectable_value(&mut direction, EdgeDirection::Incoming, "Incoming")
                .on_hover_text("Index edges by their target node.");
        });
        if direction != self.controller.direction {
            self.controller.set_edge_direction(direction);
        }

        let mut show_unmapped = self.controller.detail.show_unmapped_edges;
        if ui
            .checkbox(&mut show_unmapped, "Show unmapped edges")
            .on_hover_text("Unmapped edges stay hidden by default to keep dense data readable.")
            .changed()
        {
            self.controller.detail.show_unmapped_edges = show_unmapped;
            self.controller.recalc_boxes();
        }

        ui.separator();

        ui.label("Search nodes")
            .on_hover_text("Fuzzy-highlight matching nodes without changing the partition.");
        ui.text_edit_singleline(&mut self.search);

        ui.separator();

        ui.horizontal(|ui| {
            ui.label(RichText::new("Selections").strong());
            if ui.button("Add selection").clicked() {
                self.add_selection();
            }
        });
        ui.small("Drag a rectangle to move it, drag its corners to resize. Delete removes the active one.");

        let x_axis = self.controller.detail.x_axis.clone();
        let y_axis = self.controller.detail.y_axis.clone();
        let active = self.controller.detail.active_box;
        let filter_count = self.controller.filter_count();
        let rows = (0..filter_count)
            .map(|idx| {
                let filter = self.controller.filter(idx).expect("dense filter indices");
                (
                    filter.color,
                    filter.node_boundary(&x_axis),
                    filter.node_boundary(&y_axis),
                )
            })
            .collect::<Vec<_>>();

        let mut action = None;
        for (idx, (color, x_bounds, y_bounds)) in rows.into_iter().enumerate() {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let mut edit_color = color;
                if ui.color_edit_button_srgba(&mut edit_color).changed() {
                    action = Some(FilterAction::Recolor(idx, edit_color));
                }
                if ui
                    .selectable_label(active == Some(idx), format!("#{idx}"))
                    .clicked()
                {
                    action = Some(FilterAction::Select(idx));
                }
                if ui
                    .add_enabled(idx > 0, egui::Button::new("Up").small())
                    .on_hover_text("Raise priority: earlier filters win overlaps.")
                    .clicked()
                {
                    action = Some(FilterAction::Move(idx, true));
                }
                if ui
                    .add_enabled(idx + 1 < filter_count, egui::Button::new("Down").small())
                    .clicked()
                {
                    action = Some(FilterAction::Move(idx, false));
                }
                if ui.small_button("Remove").clicked() {
                    action = Some(FilterAction::Remove(idx));
                }
            });

            for (axis, bounds) in [(&x_axis, x_bounds), (&y_axis, y_bounds)] {
                match bounds {
                    Some(bounds) => {
                        let mut min = bounds.min;
                        let mut max = bounds.max;
                        ui.horizontal(|ui| {
                            ui.small(axis.as_str());
                            ui.add(egui::DragValue::new(&mut min).speed(0.5));
                            ui.add(egui::DragValue::new(&mut max).speed(0.5));
                        });
                        if min != bounds.min || max != bounds.max {
                            action = Some(FilterAction::Bounds(
                                idx,
                                axis.clone(),
                                Boundary {
                                    min: min.min(max),
                                    max: max.max(min),
                                },
                            ));
                        }
                    }
                    None => {
                        ui.small(format!("{axis}: unconstrained"));
                    }
                }
            }
        }

        if let Some(action) = action {
            match action {
                FilterAction::Recolor(idx, color) => self.controller.update_filter_color(idx, color),
                FilterAction::Bounds(idx, axis, bounds) => {
                    self.controller.update_filter(idx, &axis, bounds, true);
                }
                FilterAction::Move(idx, is_upwards) => {
                    let new_idx = self.controller.move_filter(idx, is_upwards);
                    self.controller.detail.active_box = Some(new_idx);
                }
                FilterAction::Remove(idx) => self.controller.remove_filter(idx),
                FilterAction::Select(idx) => self.controller.detail.active_box = Some(idx),
            }
        }
    }

    /// Creates a new selection rectangle centered in the current detail
    /// viewport, sized relative to the zoom level, and registers its filter.
    fn add_selection(&mut self) {
        let camera = self.last_detail_camera.unwrap_or(GraphRect {
            x1: GRAPH_MIN,
            x2: GRAPH_MAX,
            y1: GRAPH_MIN,
            y2: GRAPH_MAX,
        });
        let center_x = (camera.x1 + camera.x2) / 2.0;
        let center_y = (camera.y1 + camera.y2) / 2.0;
        let half_width = camera.width().abs() * 0.175;
        let half_height = camera.height().abs() * 0.125;

        let detail = &self.controller.detail;
        let x_axis = detail.x_axis.clone();
        let y_axis = detail.y_axis.clone();
        let x_bounds =
            detail
                .scale
                .graph_span_to_feature(&x_axis, center_x - half_width, center_x + half_width);
        let y_bounds = detail.scale.graph_span_to_feature(
            &y_axis,
            center_y - half_height,
            center_y + half_height,
        );

        let color = self.controller.next_color();
        let filter = Filter::new(
            &[(x_axis.as_str(), x_bounds), (y_axis.as_str(), y_bounds)],
            color,
        );
        self.controller.add_filter(filter);
        self.controller.detail.active_box = Some(self.controller.filter_count() - 1);
    }
}
