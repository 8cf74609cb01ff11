//! aerologic - Lazy boolean evaluation over sorted key streams
//!
//! AND / OR / NOT computed by a tree of iterators pulling from ascending,
//! duplicate-free sources, with negation handled as deferred membership
//! tests instead of complement enumeration.

pub mod assembly;
pub mod config;
pub mod index;
pub mod nested;
pub mod observability;
