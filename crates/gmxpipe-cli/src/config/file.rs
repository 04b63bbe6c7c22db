use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileEngineConfig {
    pub binary: Option<String>,
    #[serde(rename = "plot-viewer")]
    pub plot_viewer: Option<String>,
    pub plots: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileSystemConfig {
    #[serde(rename = "force-field")]
    pub force_field: Option<String>,
    #[serde(rename = "water-model")]
    pub water_model: Option<String>,
    #[serde(rename = "solvent-configuration")]
    pub solvent_configuration: Option<String>,
    #[serde(rename = "ligand-name")]
    pub ligand_name: Option<String>,
    #[serde(rename = "ligand-placeholder")]
    pub ligand_placeholder: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileBoxConfig {
    #[serde(rename = "type")]
    pub box_type: Option<String>,
    #[serde(rename = "padding-nm")]
    pub padding_nm: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileIonConfig {
    pub positive: Option<String>,
    pub negative: Option<String>,
    pub concentration: Option<f64>,
    pub neutralize: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileRestraintConfig {
    #[serde(rename = "force-constant")]
    pub force_constant: Option<f64>,
    pub group: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileProductionConfig {
    pub steps: Option<u64>,
    #[serde(rename = "steps-token")]
    pub steps_token: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileSelectionConfig {
    pub coupling: Option<(String, String)>,
    pub centering: Option<String>,
    pub output: Option<String>,
    pub deviation: Option<String>,
    pub fluctuation: Option<String>,
    #[serde(rename = "hydrogen-bonds")]
    pub hydrogen_bonds: Option<(String, String)>,
    pub gyration: Option<String>,
    #[serde(rename = "energy-terms")]
    pub energy_terms: Option<Vec<String>>,
    #[serde(rename = "time-unit")]
    pub time_unit: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FilePipelineConfig {
    #[serde(rename = "on-failure")]
    pub on_failure: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileLayoutConfig {
    pub receptor: Option<String>,
    pub ligand: Option<String>,
    #[serde(rename = "ligand-topology")]
    pub ligand_topology: Option<String>,
    #[serde(rename = "ion-params")]
    pub ion_params: Option<String>,
    #[serde(rename = "minimization-params")]
    pub minimization_params: Option<String>,
    #[serde(rename = "nvt-params")]
    pub nvt_params: Option<String>,
    #[serde(rename = "npt-params")]
    pub npt_params: Option<String>,
    #[serde(rename = "production-params")]
    pub production_params: Option<String>,
}

/// On-disk TOML configuration; every field optional, merged over the
/// built-in defaults and under the CLI overrides.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub engine: Option<FileEngineConfig>,
    pub system: Option<FileSystemConfig>,
    #[serde(rename = "box")]
    pub simulation_box: Option<FileBoxConfig>,
    pub ions: Option<FileIonConfig>,
    pub restraints: Option<FileRestraintConfig>,
    pub production: Option<FileProductionConfig>,
    pub selections: Option<FileSelectionConfig>,
    pub pipeline: Option<FilePipelineConfig>,
    pub files: Option<FileLayoutConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration file from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn a_partial_file_parses_with_everything_else_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gmxpipe.toml");
        fs::write(
            &path,
            r#"
[system]
force-field = "amber99sb-ildn"
water-model = "tip3p"

[production]
steps = 500000

[pipeline]
on-failure = "continue"
"#,
        )
        .unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        let system = config.system.unwrap();
        assert_eq!(system.force_field.as_deref(), Some("amber99sb-ildn"));
        assert_eq!(system.water_model.as_deref(), Some("tip3p"));
        assert_eq!(config.production.unwrap().steps, Some(500_000));
        assert_eq!(config.pipeline.unwrap().on_failure.as_deref(), Some("continue"));
        assert!(config.ions.is_none());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gmxpipe.toml");
        fs::write(&path, "[system]\nforcefield = \"typo\"\n").unwrap();

        assert!(matches!(
            FileConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn a_missing_file_is_an_io_error() {
        assert!(matches!(
            FileConfig::from_file(Path::new("/nonexistent/gmxpipe.toml")),
            Err(CliError::Io(_))
        ));
    }
}
