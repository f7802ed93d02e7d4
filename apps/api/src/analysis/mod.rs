//! The analysis pipeline: competitor discovery, data collection, scoring,
//! recommendations and the job orchestrator that sequences them.

pub mod collectors;
pub mod directories;
pub mod discovery;
pub mod domain;
pub mod handlers;
pub mod keywords;
pub mod models;
pub mod orchestrator;
pub mod recommendations;
pub mod report;
pub mod scoring;
