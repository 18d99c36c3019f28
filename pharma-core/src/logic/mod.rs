//! Pipeline logic, leaves first: features -> model -> artifact -> pipeline

pub mod numeric;
pub mod config;
pub mod features;
pub mod model;
pub mod artifact;
pub mod dataset;
pub mod pipeline;
