//! CLI command implementations.

pub mod cart;
pub mod catalog;
pub mod preview;
pub mod remote;
pub mod seed;
