mod app;
mod data;
mod filter;
mod scale;
mod util;

use clap::Parser;

use crate::data::{EdgeDirection, LoadConfig};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON array of node records.
    #[arg(long, default_value = "res/nodes.json")]
    nodes: String,

    /// JSON array of edge records.
    #[arg(long, default_value = "res/edges.json")]
    edges: String,

    #[arg(long, default_value = "IATA_CODE")]
    node_id_col: String,

    #[arg(long, default_value = "EDGE_ID")]
    edge_id_col: String,

    #[arg(long, default_value = "ORIGIN_AIRPORT")]
    source_col: String,

    #[arg(long, default_value = "DESTINATION_AIRPORT")]
    target_col: String,

    #[arg(long, default_value = "LONGITUDE")]
    x_axis: String,

    #[arg(long, default_value = "LATITUDE")]
    y_axis: String,

    /// Index edges by their target node instead of their source node.
    #[arg(long)]
    incoming_edges: bool,
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = LoadConfig {
        nodes_file: args.nodes,
        edges_file: args.edges,
        node_id_col: args.node_id_col,
        edge_id_col: args.edge_id_col,
        source_col: args.source_col,
        target_col: args.target_col,
    };
    let direction = if args.incoming_edges {
        EdgeDirection::Incoming
    } else {
        EdgeDirection::Outgoing
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "brushlink",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::BrushlinkApp::new(
                cc,
                config,
                args.x_axis,
                args.y_axis,
                direction,
            )))
        }),
    )
}
