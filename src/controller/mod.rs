//! # Controller
//!
//! Cluster-side logic of the rotator.

pub mod reconciler;
