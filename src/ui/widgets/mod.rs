pub mod throughput;

pub use throughput::ThroughputChart;
