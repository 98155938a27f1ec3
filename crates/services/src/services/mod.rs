//! News card batch services
//!
//! Gathers one article per category, renders a branded card for each and
//! hands the result to the delivery webhook, reporting progress as it goes.

pub mod analysis;
pub mod article;
pub mod batch;
pub mod categories;
pub mod compositor;
pub mod config;
pub mod delivery;
pub mod error;
pub mod imagery;
pub mod news;
pub mod progress;
pub mod task;
pub mod task_store;
pub mod upload;

pub use batch::{BatchOptions, BatchPipeline, BatchSummary, Collaborators};
pub use error::PipelineError;
