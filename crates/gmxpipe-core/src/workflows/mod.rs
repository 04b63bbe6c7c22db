//! # Workflows Module
//!
//! High-level assembly of the protein-ligand pipeline. Workflows translate a
//! [`PipelineConfig`](crate::engine::config::PipelineConfig) into the ordered
//! stage plan the engine executes, and provide the single end-to-end entry
//! point callers use.
//!
//! ## Architecture
//!
//! - **Simulation** ([`simulate`]) - System preparation through production:
//!   topology generation, complex assembly, box building, solvation,
//!   ionization, minimization, restraint generation, NVT/NPT equilibration,
//!   and the production run.
//! - **Analysis** ([`analysis`]) - Trajectory post-processing and the five
//!   plot-data analyses (deviation, fluctuation, hydrogen bonds, gyration,
//!   energy terms), each optionally handed to the plot viewer.
//! - **Entry Point** ([`run`]) - Precondition check, engine probe, plan
//!   assembly and validation, execution, and run-report persistence.

pub mod analysis;
pub mod run;
pub mod simulate;
