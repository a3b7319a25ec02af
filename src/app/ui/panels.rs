use eframe::egui::{self, Align, Context, Key, Layout, Vec2};

use crate::util::format_count;

use super::super::{Controller, DragState, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(controller: Controller) -> Self {
        Self {
            controller,
            search: String::new(),
            search_matches: None,
            drag: DragState::Idle,
            hovered_node: None,
            last_detail_camera: None,
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context, reload_requested: &mut bool) {
        // Delete removes the active selection, unless a text field owns the
        // keyboard.
        if !ctx.wants_keyboard_input()
            && ctx.input(|input| input.key_pressed(Key::Delete))
            && let Some(idx) = self.controller.detail.active_box
        {
            self.controller.remove_filter(idx);
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("brushlink");
                    ui.separator();
                    ui.label(format!(
                        "nodes: {}",
                        format_count(self.controller.graph.node_count())
                    ));
                    ui.label(format!(
                        "edges: {}",
                        format_count(self.controller.graph.edge_count())
                    ));
                    ui.label(format!(
                        "axes: {} / {}",
                        self.controller.detail.x_axis, self.controller.detail.y_axis
                    ));
                    ui.label(format!("filters: {}", self.controller.filter_count()));
                    if ui.button("Reload data").clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if ui.button("Reset cameras").clicked() {
                            self.controller.detail.pan = Vec2::ZERO;
                            self.controller.detail.zoom = 1.0;
                            self.controller.over.pan = Vec2::ZERO;
                            self.controller.over.zoom = 1.0;
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(330.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.draw_controls(ui));
            });

        egui::TopBottomPanel::bottom("overview_panel")
            .resizable(true)
            .default_height(300.0)
            .show(ctx, |ui| self.draw_overview(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_detail(ui));
    }
}
