//! rsbench core
//!
//! Builds synthetic C++ programs with a known struct layout and scores how much
//! of that layout a structure recovery tool reconstructs from the compiled binary.
//!
//! # Pipeline
//! 1. [`benchmark::generator`]: random acyclic struct graph plus functions that
//!    read every field
//! 2. [`benchmark::emitter`]: one translation unit for a native compiler
//! 3. [`benchmark::recovered`]: parse the recovery tool's struct listing
//! 4. [`benchmark::fingerprint`]: compare layouts by name-independent fingerprint

pub mod benchmark;
pub mod config;
