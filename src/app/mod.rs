use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, TryRecvError};

use eframe::egui::{self, Context};

use crate::data::{EdgeDirection, LoadConfig, LoadMessage, spawn_load};
use crate::scale::GraphRect;
use crate::util::format_count;

mod controller;
mod detail;
mod overview;
mod render_utils;
mod ui;

use controller::Controller;

pub struct BrushlinkApp {
    config: LoadConfig,
    x_axis: String,
    y_axis: String,
    direction: EdgeDirection,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<LoadMessage>,
        nodes_loaded: usize,
        edges_loaded: usize,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    controller: Controller,
    search: String,
    search_matches: Option<SearchMatchCache>,
    drag: DragState,
    hovered_node: Option<usize>,
    last_detail_camera: Option<GraphRect>,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<usize>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Pan,
    MoveBox(usize),
    ResizeBox(usize, Corner),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl BrushlinkApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: LoadConfig,
        x_axis: String,
        y_axis: String,
        direction: EdgeDirection,
    ) -> Self {
        let state = Self::start_load(config.clone());
        Self {
            config,
            x_axis,
            y_axis,
            direction,
            state,
        }
    }

    fn start_load(config: LoadConfig) -> AppState {
        AppState::Loading {
            rx: spawn_load(config),
            nodes_loaded: 0,
            edges_loaded: 0,
        }
    }
}

impl eframe::App for BrushlinkApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading {
                rx,
                nodes_loaded,
                edges_loaded,
            } => {
                loop {
                    match rx.try_recv() {
                        Ok(LoadMessage::NodesLoaded(count)) => *nodes_loaded = count,
                        Ok(LoadMessage::EdgesLoaded(count)) => *edges_loaded = count,
                        Ok(LoadMessage::Done(result)) => {
                            transition = Some(match result {
                                Ok(graph) => {
                                    let controller = Controller::new(
                                        graph,
                                        self.x_axis.clone(),
                                        self.y_axis.clone(),
                                        self.direction,
                                    );
                                    AppState::Ready(Box::new(ViewModel::new(controller)))
                                }
                                Err(error) => AppState::Error(error),
                            });
                            break;
                        }
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                            break;
                        }
                    }
                }

                let nodes_loaded = *nodes_loaded;
                let edges_loaded = *edges_loaded;
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading graph data...");
                        ui.add_space(8.0);
                        if nodes_loaded > 0 {
                            ui.label(format!("{} nodes", format_count(nodes_loaded)));
                        }
                        if edges_loaded > 0 {
                            ui.label(format!("{} edges...", format_count(edges_loaded)));
                        }
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load graph data");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.config.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                model.show(ctx, &mut reload_requested);

                if reload_requested {
                    transition = Some(Self::start_load(self.config.clone()));
                }
            }
        }

        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
