//! Builders to construct a dispatcher from configuration.

pub mod engine_builder;

pub use engine_builder::build_dispatcher;
