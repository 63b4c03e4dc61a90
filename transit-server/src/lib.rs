//! City transit route finder.
//!
//! Answers "which buses do I take to get from here to there": builds a
//! graph of the approved bus network, searches it with a penalty for each
//! change of bus, and describes the result as walks, rides and transfers
//! with fares, waits and alerts.

pub mod cache;
pub mod domain;
pub mod estimate;
pub mod graph;
pub mod planner;
pub mod routing;
pub mod store;
pub mod walking;
pub mod web;
