pub mod group;
pub mod model_metrics;
pub mod process;
