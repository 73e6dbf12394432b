//! DreamLog - session core for a dream journal.
//!
//! Keeps the signed-in session observable and guarantees that every user
//! owns exactly one default collection ("Mira's room") in the hosted data
//! store, reconciling on each sign-in.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
