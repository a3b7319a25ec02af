use std::fs::File;
use std::io::BufReader;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};

use super::{DEFAULT_EDGE_COLOR, DEFAULT_NODE_COLOR, DataSet, EdgeRecord, FeatureMap, NodeRecord};

/// Column and file configuration for one ingestion run.
#[derive(Clone, Debug)]
pub struct LoadConfig {
    pub nodes_file: String,
    pub edges_file: String,
    pub node_id_col: String,
    pub edge_id_col: String,
    pub source_col: String,
    pub target_col: String,
}

/// Progress stream of a background load. `Done` is sent exactly once and is
/// the only synchronization point the rest of the system relies on: no
/// filter operation can run before it arrives.
pub enum LoadMessage {
    NodesLoaded(usize),
    EdgesLoaded(usize),
    Done(Result<DataSet, String>),
}

pub fn spawn_load(config: LoadConfig) -> Receiver<LoadMessage> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = collect_data_set(&config, &tx).map_err(|error| format!("{error:#}"));
        let _ = tx.send(LoadMessage::Done(result));
    });

    rx
}

fn collect_data_set(config: &LoadConfig, progress: &Sender<LoadMessage>) -> Result<DataSet> {
    let raw_nodes = read_json_records(&config.nodes_file)
        .with_context(|| format!("failed to read node file {}", config.nodes_file))?;

    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for record in &raw_nodes {
        let id = record_id(record, &config.node_id_col)
            .ok_or_else(|| anyhow!("node record without id column {}", config.node_id_col))?;

        nodes.push(NodeRecord {
            id,
            features: numeric_features(record),
            x: 0.0,
            y: 0.0,
            color: DEFAULT_NODE_COLOR,
        });
    }

    if nodes.is_empty() {
        return Err(anyhow!("node file {} contained no records", config.nodes_file));
    }
    let _ = progress.send(LoadMessage::NodesLoaded(nodes.len()));
    log::info!("loaded {} nodes from {}", nodes.len(), config.nodes_file);

    let known_ids = nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<std::collections::HashSet<_>>();

    let raw_edges = read_json_records(&config.edges_file)
        .with_context(|| format!("failed to read edge file {}", config.edges_file))?;

    let mut edges = Vec::with_capacity(raw_edges.len());
    let mut dropped = 0usize;
    for (count, record) in raw_edges.iter().enumerate() {
        let id = record_id(record, &config.edge_id_col)
            .ok_or_else(|| anyhow!("edge record without id column {}", config.edge_id_col))?;
        let source = record_id(record, &config.source_col);
        let target = record_id(record, &config.target_col);

        let (Some(source), Some(target)) = (source, target) else {
            dropped += 1;
            continue;
        };
        if !known_ids.contains(source.as_str()) || !known_ids.contains(target.as_str()) {
            dropped += 1;
            continue;
        }

        edges.push(EdgeRecord {
            id,
            source,
            target,
            features: numeric_features(record),
            hidden: false,
            color: DEFAULT_EDGE_COLOR,
        });

        if count % 987 == 0 {
            let _ = progress.send(LoadMessage::EdgesLoaded(count));
        }
    }

    if dropped > 0 {
        log::warn!("dropped {dropped} edges with unresolved endpoints");
    }
    log::info!("loaded {} edges from {}", edges.len(), config.edges_file);

    Ok(DataSet::new(nodes, edges))
}

fn read_json_records(path: &str) -> Result<Vec<Map<String, Value>>> {
    let file = File::open(path).with_context(|| format!("could not open {path}"))?;
    let parsed: Value =
        serde_json::from_reader(BufReader::new(file)).context("invalid JSON document")?;

    let array = parsed
        .as_array()
        .ok_or_else(|| anyhow!("expected a top-level JSON array of records"))?;

    let mut records = Vec::with_capacity(array.len());
    for entry in array {
        let object = entry
            .as_object()
            .ok_or_else(|| anyhow!("expected every record to be a JSON object"))?;
        records.push(object.clone());
    }

    Ok(records)
}

/// Identifier columns may hold strings or bare numbers; both normalize to a
/// string id.
fn record_id(record: &Map<String, Value>, column: &str) -> Option<String> {
    match record.get(column)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn numeric_features(record: &Map<String, Value>) -> FeatureMap {
    let mut features = FeatureMap::new();
    for (key, value) in record {
        if let Some(number) = value.as_f64() {
            features.insert(key.clone(), number);
        }
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_accepts_strings_and_numbers() {
        let mut record = Map::new();
        record.insert("IATA_CODE".to_owned(), Value::String("LAX".to_owned()));
        record.insert("EDGE_ID".to_owned(), Value::from(42));
        record.insert("FLAG".to_owned(), Value::Bool(true));

        assert_eq!(record_id(&record, "IATA_CODE"), Some("LAX".to_owned()));
        assert_eq!(record_id(&record, "EDGE_ID"), Some("42".to_owned()));
        assert_eq!(record_id(&record, "FLAG"), None);
        assert_eq!(record_id(&record, "MISSING"), None);
    }

    #[test]
    fn numeric_features_skip_non_numbers() {
        let mut record = Map::new();
        record.insert("DISTANCE".to_owned(), Value::from(2475.0));
        record.insert("ORIGIN_AIRPORT".to_owned(), Value::String("JFK".to_owned()));

        let features = numeric_features(&record);
        assert_eq!(features.get("DISTANCE"), Some(&2475.0));
        assert!(!features.contains_key("ORIGIN_AIRPORT"));
    }
}
