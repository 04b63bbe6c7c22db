use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "gmxpipe - An automated protein-ligand molecular dynamics pipeline driving an external GROMACS installation.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute the full pipeline, from receptor preparation to trajectory analysis.
    Run(PipelineArgs),
    /// Resolve and print the stage plan without executing anything.
    Plan(PipelineArgs),
    /// Check the required input files and the engine installation.
    Check(PipelineArgs),
}

/// Arguments shared by every pipeline-facing subcommand.
#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Working directory holding the input files; all artifacts land here.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Pipeline configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Common overrides ---
    /// Override the simulation engine launcher (default: gmx).
    #[arg(long, value_name = "PATH")]
    pub engine: Option<String>,

    /// Override the force field handed to the preparation stage.
    #[arg(long, value_name = "NAME")]
    pub force_field: Option<String>,

    /// Override the water model (spc, spce, tip3p, tip4p, tip5p).
    #[arg(long, value_name = "NAME")]
    pub water_model: Option<String>,

    /// Override the simulation box geometry (cubic, triclinic, dodecahedron, octahedron).
    #[arg(long, value_name = "NAME")]
    pub box_type: Option<String>,

    /// Override the molecule name the ligand carries in the topology.
    #[arg(long, value_name = "NAME")]
    pub ligand_name: Option<String>,

    /// Override the production run length in integration steps.
    #[arg(long, value_name = "INT")]
    pub steps: Option<u64>,

    /// Keep executing stages after a failure instead of aborting.
    #[arg(long)]
    pub continue_on_failure: bool,

    /// Do not launch the plot viewer on analysis outputs.
    #[arg(long)]
    pub no_plots: bool,
}
