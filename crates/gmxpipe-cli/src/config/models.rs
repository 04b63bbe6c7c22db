use gmxpipe::engine::config::PipelineConfig;
use std::path::PathBuf;

/// Fully merged configuration the subcommands operate on.
pub struct AppConfig {
    pub workdir: PathBuf,
    pub pipeline: PipelineConfig,
}
