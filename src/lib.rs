//! Core library for the accweek-tools command line application.
//!
//! The library turns monthly accessory sales and inventory extracts into the
//! JSON summaries read by the reporting frontend. CSV and JSON adapters live
//! under [`accweek::tools::io`], shared types inside [`accweek::tools::model`],
//! the core/outlet rule in [`accweek::tools::classify`], the sparse totals in
//! [`accweek::tools::aggregate`], the dense output documents in
//! [`accweek::tools::reshape`], and the end-to-end runs under
//! [`accweek::tools::pipeline`].

pub mod accweek;

pub use accweek::tools::{
    Result, ToolError, aggregate, classify, config, error, filter, forecast, inspect, io, model,
    pipeline, reshape,
};
