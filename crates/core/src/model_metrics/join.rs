//! Dense joining of stored metric records.
//!
//! Charts need every series of a panel on one shared x-axis. Given the raw
//! records for a set of processes, [`dense_join`] emits one row per
//! (process, step) cell of every (metric name, step name) group the process
//! contributes to, with `None` where that process logged nothing.
//!
//! # Ordering contract
//!
//! The output is what [`crate::model_metrics::panels::build_panels`] expects
//! (see [`is_panel_ordered`]):
//!
//! 1. rows are grouped by `(metric_name, step_name)`, groups in ascending order;
//! 2. within a group, steps ascend;
//! 3. within one step, processes appear in request order, and the same
//!    process sequence repeats for every step of the group.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::types::ProcessId;

/// A metric value as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRecord {
    pub process_id: ProcessId,
    pub metric_name: String,
    pub step_name: String,
    pub step: u32,
    pub metric_value: String,
}

/// One cell of the dense (process x step) grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRow {
    pub process_id: ProcessId,
    pub metric_name: String,
    pub step_name: String,
    pub step: u32,
    pub metric_value: Option<String>,
}

#[derive(Default)]
struct GroupCells {
    steps: BTreeSet<u32>,
    /// Contributing processes, by rank in the request.
    ranks: BTreeSet<usize>,
    values: HashMap<(usize, u32), String>,
}

/// Build the dense result set for `requested` processes.
///
/// Records of processes absent from `requested` are ignored. Repeated ids in
/// `requested` keep their first position.
pub fn dense_join(records: Vec<MetricRecord>, requested: &[ProcessId]) -> Vec<JoinedRow> {
    let mut rank_of: HashMap<ProcessId, usize> = HashMap::with_capacity(requested.len());
    for id in requested {
        let next = rank_of.len();
        rank_of.entry(*id).or_insert(next);
    }
    let mut by_rank = vec![ProcessId::nil(); rank_of.len()];
    for (id, rank) in &rank_of {
        by_rank[*rank] = *id;
    }

    let mut groups: BTreeMap<(String, String), GroupCells> = BTreeMap::new();
    for record in records {
        let Some(&rank) = rank_of.get(&record.process_id) else {
            continue;
        };
        let cells = groups
            .entry((record.metric_name, record.step_name))
            .or_default();
        cells.steps.insert(record.step);
        cells.ranks.insert(rank);
        cells.values.insert((rank, record.step), record.metric_value);
    }

    let capacity = groups
        .values()
        .map(|cells| cells.steps.len() * cells.ranks.len())
        .sum();
    let mut rows = Vec::with_capacity(capacity);

    for ((metric_name, step_name), mut cells) in groups {
        for &step in &cells.steps {
            for &rank in &cells.ranks {
                rows.push(JoinedRow {
                    process_id: by_rank[rank],
                    metric_name: metric_name.clone(),
                    step_name: step_name.clone(),
                    step,
                    metric_value: cells.values.remove(&(rank, step)),
                });
            }
        }
    }

    rows
}

/// Check the ordering contract documented at module level.
pub fn is_panel_ordered(rows: &[JoinedRow]) -> bool {
    let mut previous_key: Option<(&str, &str)> = None;

    for group in rows.chunk_by(|a, b| a.metric_name == b.metric_name && a.step_name == b.step_name) {
        let key = (group[0].metric_name.as_str(), group[0].step_name.as_str());
        if previous_key.is_some_and(|prev| prev >= key) {
            return false;
        }
        previous_key = Some(key);

        let blocks: Vec<&[JoinedRow]> = group.chunk_by(|a, b| a.step == b.step).collect();
        if blocks.windows(2).any(|w| w[0][0].step >= w[1][0].step) {
            return false;
        }
        let same_processes = |a: &[JoinedRow], b: &[JoinedRow]| {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.process_id == y.process_id)
        };
        if blocks.windows(2).any(|w| !same_processes(w[0], w[1])) {
            return false;
        }
    }
    true
}
