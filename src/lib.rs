//! Pronunciation grading: compare what a learner said with what they were
//! asked to say, and keep a record of how they did.
//!
//! The [`pronunciation`] module holds the pure scoring engine. Everything
//! else is boundary code: audio inspection, speech provider seams, metadata
//! storage and the command-line surface.

pub mod audio;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod pronunciation;
pub mod recordings;
pub mod service;
pub mod speech;
