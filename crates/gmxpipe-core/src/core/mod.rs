//! # Core Module
//!
//! This module provides the fundamental building blocks shared by every
//! pipeline stage: the naming conventions of the files a run reads and writes,
//! the text-level mutations applied to those files between external tool
//! invocations, and the precondition check that gates a run.
//!
//! ## Overview
//!
//! A pipeline run communicates between stages exclusively through named files
//! in a single working directory. This module makes that contract explicit:
//!
//! - **File Conventions** ([`files`]) - The required input files of a run and
//!   the fixed names of every artifact the pipeline produces.
//! - **Text Mutations** ([`textedit`]) - Insertion, replacement, and token
//!   substitution applied to topology, coordinate, and parameter files.
//! - **Preconditions** ([`preconditions`]) - Existence checks for the required
//!   input files, reported with the specific missing file name.

pub mod files;
pub mod preconditions;
pub mod textedit;
