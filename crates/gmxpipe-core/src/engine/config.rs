use crate::core::files::FileLayout;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },

    #[error("Unknown option '{value}' for parameter '{parameter}'")]
    UnknownOption {
        parameter: &'static str,
        value: String,
    },
}

/// Water model handed to the preparation stage. One of the choices the
/// legacy workflow made at an interactive prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaterModel {
    Spc,
    Spce,
    Tip3p,
    Tip4p,
    Tip5p,
}

impl WaterModel {
    pub fn as_flag(&self) -> &'static str {
        match self {
            WaterModel::Spc => "spc",
            WaterModel::Spce => "spce",
            WaterModel::Tip3p => "tip3p",
            WaterModel::Tip4p => "tip4p",
            WaterModel::Tip5p => "tip5p",
        }
    }
}

impl FromStr for WaterModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "spc" => Ok(WaterModel::Spc),
            "spce" => Ok(WaterModel::Spce),
            "tip3p" => Ok(WaterModel::Tip3p),
            "tip4p" => Ok(WaterModel::Tip4p),
            "tip5p" => Ok(WaterModel::Tip5p),
            other => Err(ConfigError::UnknownOption {
                parameter: "water-model",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for WaterModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

/// Simulation box geometry for the box-building stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxType {
    Cubic,
    Triclinic,
    Dodecahedron,
    Octahedron,
}

impl BoxType {
    pub fn as_flag(&self) -> &'static str {
        match self {
            BoxType::Cubic => "cubic",
            BoxType::Triclinic => "triclinic",
            BoxType::Dodecahedron => "dodecahedron",
            BoxType::Octahedron => "octahedron",
        }
    }
}

impl FromStr for BoxType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cubic" => Ok(BoxType::Cubic),
            "triclinic" => Ok(BoxType::Triclinic),
            "dodecahedron" => Ok(BoxType::Dodecahedron),
            "octahedron" => Ok(BoxType::Octahedron),
            other => Err(ConfigError::UnknownOption {
                parameter: "box-type",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for BoxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

/// What the runner does after a stage fails.
///
/// `Abort` marks all remaining stages as skipped. `Continue` reproduces the
/// legacy behavior of pressing on over stale or absent outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    #[default]
    Abort,
    Continue,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(FailurePolicy::Abort),
            "continue" => Ok(FailurePolicy::Continue),
            other => Err(ConfigError::UnknownOption {
                parameter: "on-failure",
                value: other.to_string(),
            }),
        }
    }
}

/// External binaries the pipeline drives.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Simulation engine launcher, resolved through `PATH` unless absolute.
    pub binary: String,
    /// Interactive plot viewer launched on each analysis output.
    pub plot_viewer: String,
    /// Disable to run fully unattended.
    pub plots: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: "gmx".to_string(),
            plot_viewer: "xmgrace".to_string(),
            plots: true,
        }
    }
}

/// Identity of the molecular system being assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemConfig {
    /// Force-field name passed to the preparation stage (`pdb2gmx -ff`).
    pub force_field: String,
    pub water_model: WaterModel,
    /// Pre-equilibrated solvent configuration used by the solvation stage.
    pub solvent_configuration: String,
    /// Molecule name the ligand carries in the system topology.
    pub ligand_name: String,
    /// Placeholder molecule name inside the ligand parameter topology,
    /// rewritten to `ligand_name` before the first compile stage.
    pub ligand_placeholder: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            force_field: "oplsaa".to_string(),
            water_model: WaterModel::Spc,
            solvent_configuration: "spc216.gro".to_string(),
            ligand_name: "LIG".to_string(),
            ligand_placeholder: "MOL".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxConfig {
    pub box_type: BoxType,
    /// Minimum solute-to-box distance in nanometers.
    pub padding_nm: f64,
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            box_type: BoxType::Cubic,
            padding_nm: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IonConfig {
    pub positive: String,
    pub negative: String,
    /// Target ionic concentration in mol/L.
    pub concentration: f64,
    /// Neutralize the net system charge.
    pub neutralize: bool,
    /// Continuous-solvent group whose molecules are replaced by ions.
    pub solvent_group: String,
}

impl Default for IonConfig {
    fn default() -> Self {
        Self {
            positive: "NA".to_string(),
            negative: "CL".to_string(),
            concentration: 0.15,
            neutralize: true,
            solvent_group: "SOL".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestraintConfig {
    /// Isotropic force constant in kJ mol^-1 nm^-2.
    pub force_constant: f64,
    /// Group selected when generating the ligand restraints; the heavy-atom
    /// group created by the ligand indexing stage.
    pub group: String,
}

impl Default for RestraintConfig {
    fn default() -> Self {
        Self {
            force_constant: 1000.0,
            group: "3".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductionConfig {
    /// Integration step count patched over `steps_token` in the production
    /// parameter file.
    pub steps: u64,
    pub steps_token: String,
}

impl Default for ProductionConfig {
    fn default() -> Self {
        Self {
            steps: 5_000_000,
            steps_token: "NSTEPS".to_string(),
        }
    }
}

/// Named group selections fed to the tools that read them from stdin.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    /// Two groups merged into the temperature-coupling group.
    pub coupling: (String, String),
    /// Group the trajectory is centered on during post-processing.
    pub centering: String,
    /// Group written to the processed trajectory and reference frame.
    pub output: String,
    /// Group used for the structural-deviation fit and calculation.
    pub deviation: String,
    /// Group used for the per-residue fluctuation analysis.
    pub fluctuation: String,
    /// Donor/acceptor group pair for the hydrogen-bond count.
    pub hydrogen_bonds: (String, String),
    /// Group used for the radius-of-gyration analysis.
    pub gyration: String,
    /// Energy terms extracted from the energy log.
    pub energy_terms: Vec<String>,
    /// Time unit override applied to time-resolved analyses.
    pub time_unit: String,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            coupling: ("Protein".to_string(), "LIG".to_string()),
            centering: "Protein".to_string(),
            output: "System".to_string(),
            deviation: "Backbone".to_string(),
            fluctuation: "Backbone".to_string(),
            hydrogen_bonds: ("Protein".to_string(), "LIG".to_string()),
            gyration: "Protein".to_string(),
            energy_terms: vec!["Potential".to_string()],
            time_unit: "ns".to_string(),
        }
    }
}

/// Complete configuration of a pipeline run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineConfig {
    pub engine: EngineConfig,
    pub system: SystemConfig,
    pub simulation_box: BoxConfig,
    pub ions: IonConfig,
    pub restraints: RestraintConfig,
    pub production: ProductionConfig,
    pub selections: SelectionConfig,
    pub failure_policy: FailurePolicy,
    pub layout: FileLayout,
}

/// Builder over [`PipelineConfig`]. Starts from the conventional defaults;
/// `build` validates the combination.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn engine_binary(mut self, binary: impl Into<String>) -> Self {
        self.config.engine.binary = binary.into();
        self
    }
    pub fn plot_viewer(mut self, viewer: impl Into<String>) -> Self {
        self.config.engine.plot_viewer = viewer.into();
        self
    }
    pub fn plots(mut self, enabled: bool) -> Self {
        self.config.engine.plots = enabled;
        self
    }
    pub fn force_field(mut self, name: impl Into<String>) -> Self {
        self.config.system.force_field = name.into();
        self
    }
    pub fn water_model(mut self, model: WaterModel) -> Self {
        self.config.system.water_model = model;
        self
    }
    pub fn solvent_configuration(mut self, name: impl Into<String>) -> Self {
        self.config.system.solvent_configuration = name.into();
        self
    }
    pub fn ligand_name(mut self, name: impl Into<String>) -> Self {
        self.config.system.ligand_name = name.into();
        self
    }
    pub fn ligand_placeholder(mut self, token: impl Into<String>) -> Self {
        self.config.system.ligand_placeholder = token.into();
        self
    }
    pub fn box_type(mut self, box_type: BoxType) -> Self {
        self.config.simulation_box.box_type = box_type;
        self
    }
    pub fn box_padding_nm(mut self, padding: f64) -> Self {
        self.config.simulation_box.padding_nm = padding;
        self
    }
    pub fn ion_concentration(mut self, molar: f64) -> Self {
        self.config.ions.concentration = molar;
        self
    }
    pub fn ion_names(mut self, positive: impl Into<String>, negative: impl Into<String>) -> Self {
        self.config.ions.positive = positive.into();
        self.config.ions.negative = negative.into();
        self
    }
    pub fn neutralize(mut self, neutralize: bool) -> Self {
        self.config.ions.neutralize = neutralize;
        self
    }
    pub fn restraint_force_constant(mut self, force: f64) -> Self {
        self.config.restraints.force_constant = force;
        self
    }
    pub fn restraint_group(mut self, group: impl Into<String>) -> Self {
        self.config.restraints.group = group.into();
        self
    }
    pub fn production_steps(mut self, steps: u64) -> Self {
        self.config.production.steps = steps;
        self
    }
    pub fn steps_token(mut self, token: impl Into<String>) -> Self {
        self.config.production.steps_token = token.into();
        self
    }
    pub fn coupling_groups(
        mut self,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        self.config.selections.coupling = (first.into(), second.into());
        self
    }
    pub fn centering_group(mut self, group: impl Into<String>) -> Self {
        self.config.selections.centering = group.into();
        self
    }
    pub fn output_group(mut self, group: impl Into<String>) -> Self {
        self.config.selections.output = group.into();
        self
    }
    pub fn deviation_group(mut self, group: impl Into<String>) -> Self {
        self.config.selections.deviation = group.into();
        self
    }
    pub fn fluctuation_group(mut self, group: impl Into<String>) -> Self {
        self.config.selections.fluctuation = group.into();
        self
    }
    pub fn hydrogen_bond_groups(
        mut self,
        first: impl Into<String>,
        second: impl Into<String>,
    ) -> Self {
        self.config.selections.hydrogen_bonds = (first.into(), second.into());
        self
    }
    pub fn gyration_group(mut self, group: impl Into<String>) -> Self {
        self.config.selections.gyration = group.into();
        self
    }
    pub fn energy_terms(mut self, terms: Vec<String>) -> Self {
        self.config.selections.energy_terms = terms;
        self
    }
    pub fn time_unit(mut self, unit: impl Into<String>) -> Self {
        self.config.selections.time_unit = unit.into();
        self
    }
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.config.failure_policy = policy;
        self
    }
    pub fn layout(mut self, layout: FileLayout) -> Self {
        self.config.layout = layout;
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let config = self.config;
        let invalid = |parameter: &'static str, reason: &str| ConfigError::InvalidParameter {
            parameter,
            reason: reason.to_string(),
        };

        if config.system.force_field.trim().is_empty() {
            return Err(invalid("force-field", "must not be empty"));
        }
        if config.system.ligand_name.trim().is_empty() {
            return Err(invalid("ligand-name", "must not be empty"));
        }
        if !(config.simulation_box.padding_nm > 0.0) {
            return Err(invalid("box-padding-nm", "must be positive"));
        }
        if config.ions.concentration < 0.0 {
            return Err(invalid("ion-concentration", "must not be negative"));
        }
        if config.production.steps == 0 {
            return Err(invalid("production-steps", "must be at least 1"));
        }
        if config.production.steps_token.trim().is_empty() {
            return Err(invalid("steps-token", "must not be empty"));
        }
        if config.selections.energy_terms.is_empty() {
            return Err(invalid("energy-terms", "at least one term is required"));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_build_successfully() {
        let config = PipelineConfigBuilder::new().build().unwrap();
        assert_eq!(config.engine.binary, "gmx");
        assert_eq!(config.system.force_field, "oplsaa");
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.production.steps, 5_000_000);
    }

    #[test]
    fn zero_padding_is_rejected() {
        let result = PipelineConfigBuilder::new().box_padding_nm(0.0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { parameter: "box-padding-nm", .. })
        ));
    }

    #[test]
    fn zero_production_steps_are_rejected() {
        let result = PipelineConfigBuilder::new().production_steps(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidParameter { parameter: "production-steps", .. })
        ));
    }

    #[test]
    fn empty_energy_terms_are_rejected() {
        let result = PipelineConfigBuilder::new().energy_terms(Vec::new()).build();
        assert!(result.is_err());
    }

    #[test]
    fn water_model_parses_known_options_only() {
        assert_eq!("tip3p".parse::<WaterModel>().unwrap(), WaterModel::Tip3p);
        assert!(matches!(
            "tip42".parse::<WaterModel>(),
            Err(ConfigError::UnknownOption { parameter: "water-model", .. })
        ));
    }

    #[test]
    fn box_type_round_trips_through_its_flag() {
        for box_type in [
            BoxType::Cubic,
            BoxType::Triclinic,
            BoxType::Dodecahedron,
            BoxType::Octahedron,
        ] {
            assert_eq!(box_type.as_flag().parse::<BoxType>().unwrap(), box_type);
        }
    }

    #[test]
    fn failure_policy_defaults_to_abort() {
        assert_eq!(FailurePolicy::default(), FailurePolicy::Abort);
        assert_eq!("continue".parse::<FailurePolicy>().unwrap(), FailurePolicy::Continue);
    }
}
