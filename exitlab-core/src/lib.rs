//! ExitLab Core — percentile ranking, exit pressure, trade states, simulation.
//!
//! This crate contains the deterministic heart of the exit analytics engine:
//! - Domain types (bars, indicator series, percentile observations, entry events)
//! - Rolling percentile ranker with zone classification
//! - Four-component exit pressure scorer
//! - Trade lifecycle state machine (rebound → … → reversal)
//! - Exposure policy (pressure + state → discrete action)
//! - Single-event strategy simulator with five exit strategy variants
//! - Entry-event scanner with optional ADX momentum filter
//!
//! Everything here is a pure function of its inputs: no I/O, no shared
//! mutable state, no clocks. Identical inputs produce byte-identical outputs.

pub mod domain;
pub mod indicators;
pub mod percentile;
pub mod policy;
pub mod pressure;
pub mod scan;
pub mod sim;
pub mod state;
