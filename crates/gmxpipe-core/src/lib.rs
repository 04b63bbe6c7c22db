//! # GMXPIPE Core Library
//!
//! An orchestration library for automated protein-ligand molecular dynamics
//! pipelines. The simulation physics is delegated entirely to an external
//! GROMACS installation (and an optional plot viewer); this library owns the
//! sequencing: which tool runs when, with which arguments, reading and
//! producing which named files in a working directory.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a
//! clear separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains the fixed file-name conventions of
//!   a pipeline run (`FileLayout`), the line-oriented text mutations applied to
//!   topology, coordinate, and parameter files (`textedit`), and the
//!   precondition checker that gates a run on its required input files.
//!
//! - **[`engine`]: The Logic Core.** This layer owns execution. It defines the
//!   stage descriptors (declared inputs, declared outputs, ordered actions),
//!   the external-command runner with captured output and explicit exit
//!   status, the sequential pipeline runner with its configurable failure
//!   policy, progress reporting, and the machine-readable run report.
//!
//! - **[`workflows`]: The Public API.** The highest-level, user-facing layer.
//!   It assembles the complete protein-ligand stage plan (preparation,
//!   solvation, ionization, minimization, equilibration, production, and
//!   trajectory analysis) and ties the engine together into a single
//!   end-to-end entry point.

pub mod core;
pub mod engine;
pub mod workflows;
