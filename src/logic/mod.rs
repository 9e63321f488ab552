//! Logic Module - Detection & Correlation Engines
//!
//! ## Structure
//! - `events` / `source` - event records and the collaborator seams that supply them
//! - `features/` - fixed 14-dim event feature space
//! - `clustering/` - density clustering over feature vectors
//! - `patterns/` - tetrads, triple and grand conjunctions
//! - `similarity` - historical pair search
//! - `detection` - aggregate entry point over the engines above
//! - `correlation/` - precursor → disaster rule training and risk inference
//! - `scoring/` - severity & significance alerts

pub mod events;
pub mod source;

pub mod features;
pub mod clustering;
pub mod patterns;
pub mod similarity;
pub mod detection;

pub mod correlation;
pub mod scoring;
