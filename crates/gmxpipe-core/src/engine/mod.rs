//! # Engine Module
//!
//! This module implements the execution engine of the pipeline: how stages
//! are described, how external tools are invoked, and how a full plan is
//! driven to completion.
//!
//! ## Overview
//!
//! Execution is strictly sequential; one external process runs at a time and
//! the runner waits for it synchronously. A stage declares its required input
//! artifacts and produced output artifacts up front, so the dependency graph
//! of a whole plan can be validated before the first tool is launched.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Every choice the legacy workflow made at
//!   an interactive prompt, hoisted into validated configuration.
//! - **Commands** ([`command`]) - External tool invocation with captured
//!   output, explicit exit status, and optional stdin feeds for tools that
//!   read group selections interactively.
//! - **Stages** ([`stage`]) - Stage descriptors and plan-level dependency
//!   validation.
//! - **Execution** ([`runner`]) - The sequential runner with its explicit
//!   abort-or-continue failure policy.
//! - **Progress** ([`progress`]) - Callback-based progress reporting.
//! - **Reporting** ([`report`]) - The machine-readable per-run report.
//! - **Errors** ([`error`]) - Engine-specific error types.

pub mod command;
pub mod config;
pub mod error;
pub mod progress;
pub mod report;
pub mod runner;
pub mod stage;
