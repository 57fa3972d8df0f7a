//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Batch policies for the Prompter port (unattended runs)
//! - The CLI crate provides the terminal Prompter adapter

pub mod policy;

pub use policy::BatchPolicy;
