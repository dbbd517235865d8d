//! A concurrent Barnes–Hut quadtree for 2-D gravitational N-body frames.
//!
//! Each frame builds a fresh tree in three strictly ordered phases: parallel
//! insertion, bottom-up mass aggregation, then read-only force evaluation.
pub mod utils;
pub mod particles;
pub mod quadtree;
pub mod simulation;
