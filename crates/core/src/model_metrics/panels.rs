//! Reshaping joined metric rows into chart panels.
//!
//! Output shape (one Grafana-style data frame per panel):
//!
//! ```text
//! sections
//!   "training"                       <- prefix of "training/loss"
//!     Panel { title: "loss",
//!             series: [ epoch:  [1, 2, 3],
//!                       <p1>:   ["0.9", "0.7", "0.6"],
//!                       <p2>:   ["1.1", null, "0.8"] ] }
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::model_metrics::join::JoinedRow;
use crate::types::ProcessId;

/// Section for metric names without a `/` prefix.
pub const DEFAULT_SECTION: &str = "default";

/// Separator between section and title in a metric name.
pub const SECTION_SEPARATOR: char = '/';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
}

/// Column data of a [`Field`]. Steps are integers; metric values keep the
/// client's formatting and are `null` where a process has no point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValues {
    Steps(Vec<u32>),
    Metric(Vec<Option<String>>),
}

impl FieldValues {
    pub fn len(&self) -> usize {
        match self {
            FieldValues::Steps(v) => v.len(),
            FieldValues::Metric(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub values: FieldValues,
}

/// One chart: the shared step axis followed by one field per process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Panel {
    pub title: String,
    pub series: Vec<Field>,
}

/// Panels bucketed by section name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelMetricsView {
    pub sections: BTreeMap<String, Vec<Panel>>,
}

/// Split a metric name into `(section, title)` on the first separator.
///
/// `"training/acc"` -> `("training", "acc")`, `"a/b/c"` -> `("a", "b/c")`,
/// `"acc"` -> `("default", "acc")`.
pub fn split_metric_name(metric_name: &str) -> (&str, &str) {
    metric_name
        .split_once(SECTION_SEPARATOR)
        .unwrap_or((DEFAULT_SECTION, metric_name))
}

/// Fold ordered rows into sections of panels.
///
/// `rows` must satisfy the ordering contract of
/// [`crate::model_metrics::join::dense_join`]; the input is not re-sorted.
/// Panels keep the order of their groups within each section.
pub fn build_panels(rows: &[JoinedRow]) -> ModelMetricsView {
    let sections = rows
        .chunk_by(|a, b| a.metric_name == b.metric_name && a.step_name == b.step_name)
        .map(build_panel)
        .fold(
            BTreeMap::<String, Vec<Panel>>::new(),
            |mut sections, (section, panel)| {
                sections.entry(section).or_default().push(panel);
                sections
            },
        );

    ModelMetricsView { sections }
}

/// Build the panel for one non-empty `(metric_name, step_name)` group.
fn build_panel(group: &[JoinedRow]) -> (String, Panel) {
    let head = &group[0];
    let (section, title) = split_metric_name(&head.metric_name);

    let mut steps: Vec<u32> = Vec::new();
    let mut slots: HashMap<ProcessId, usize> = HashMap::new();
    let mut columns: Vec<(ProcessId, Vec<Option<String>>)> = Vec::new();

    for row in group {
        if steps.last() != Some(&row.step) {
            steps.push(row.step);
        }
        let position = steps.len() - 1;

        let slot = *slots.entry(row.process_id).or_insert_with(|| {
            columns.push((row.process_id, Vec::new()));
            columns.len() - 1
        });

        // Pad any positions this process skipped; a repeated (process, step)
        // cell replaces the earlier value.
        let values = &mut columns[slot].1;
        values.resize(position, None);
        values.push(row.metric_value.clone());
    }

    let step_count = steps.len();
    let mut series = Vec::with_capacity(columns.len() + 1);
    series.push(Field {
        name: head.step_name.clone(),
        field_type: FieldType::Number,
        values: FieldValues::Steps(steps),
    });
    series.extend(columns.into_iter().map(|(process_id, mut values)| {
        values.resize(step_count, None);
        Field {
            name: process_id.to_string(),
            field_type: FieldType::Number,
            values: FieldValues::Metric(values),
        }
    }));

    (
        section.to_string(),
        Panel {
            title: title.to_string(),
            series,
        },
    )
}
