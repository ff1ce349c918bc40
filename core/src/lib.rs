//! trainsim-core: deterministic training-completion simulation.
//!
//! A run takes an employee roster, generates the week's manager
//! assignments, resolves completions per education type and writes the
//! resulting artifacts. See engine.rs for the execution order.

pub mod artifact;
pub mod assignment;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod ledger;
pub mod naming;
pub mod recommendation;
pub mod recommender;
pub mod resolver;
pub mod rng;
pub mod roster;
pub mod schedule;
pub mod source;
pub mod store;
pub mod types;
