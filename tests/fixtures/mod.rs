//! Test fixtures for hos-planner.
//!
//! Provides:
//! - Real US city coordinates for long-haul trips
//! - A compliance checker that replays a segment sequence against a rule set

#![allow(dead_code)]

pub mod compliance;
pub mod us_cities;
