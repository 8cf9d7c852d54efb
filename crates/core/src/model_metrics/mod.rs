//! Model-metric ingestion and chart shaping.
//!
//! ```text
//! request body --parse_batch--> MetricBatch --(db writer)--> model_metrics
//! model_metrics --(db reader)--> [MetricRecord] --dense_join--> [JoinedRow]
//!     --build_panels--> ModelMetricsView
//! ```

pub mod ingest;
pub mod join;
pub mod panels;

pub use ingest::{parse_batch, MetricBatch, MetricPoint, MetricSeries, MetricValue, StepPolicy};
pub use join::{dense_join, is_panel_ordered, JoinedRow, MetricRecord};
pub use panels::{
    build_panels, split_metric_name, Field, FieldType, FieldValues, ModelMetricsView, Panel,
};
