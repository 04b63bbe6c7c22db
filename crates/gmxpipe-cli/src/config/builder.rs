use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::PipelineArgs;
use crate::error::Result;
use gmxpipe::core::files::FileLayout;
use gmxpipe::engine::config::{
    BoxType, FailurePolicy, PipelineConfigBuilder, WaterModel,
};
use tracing::debug;

/// Merges the built-in defaults, the optional configuration file, and the
/// command-line overrides into a validated [`AppConfig`]. Later layers win.
pub fn build_config(args: &PipelineArgs) -> Result<AppConfig> {
    let file = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };

    let mut builder = PipelineConfigBuilder::new();
    builder = apply_file(builder, &file)?;
    builder = apply_cli(builder, args)?;

    let pipeline = builder.build()?;
    debug!(
        "Resolved configuration: engine '{}', force field '{}'",
        pipeline.engine.binary, pipeline.system.force_field
    );

    Ok(AppConfig {
        workdir: args.dir.clone(),
        pipeline,
    })
}

fn apply_file(
    mut builder: PipelineConfigBuilder,
    file: &FileConfig,
) -> Result<PipelineConfigBuilder> {
    if let Some(engine) = &file.engine {
        if let Some(binary) = &engine.binary {
            builder = builder.engine_binary(binary);
        }
        if let Some(viewer) = &engine.plot_viewer {
            builder = builder.plot_viewer(viewer);
        }
        if let Some(plots) = engine.plots {
            builder = builder.plots(plots);
        }
    }

    if let Some(system) = &file.system {
        if let Some(name) = &system.force_field {
            builder = builder.force_field(name);
        }
        if let Some(model) = &system.water_model {
            builder = builder.water_model(model.parse::<WaterModel>()?);
        }
        if let Some(name) = &system.solvent_configuration {
            builder = builder.solvent_configuration(name);
        }
        if let Some(name) = &system.ligand_name {
            builder = builder.ligand_name(name);
        }
        if let Some(token) = &system.ligand_placeholder {
            builder = builder.ligand_placeholder(token);
        }
    }

    if let Some(sim_box) = &file.simulation_box {
        if let Some(kind) = &sim_box.box_type {
            builder = builder.box_type(kind.parse::<BoxType>()?);
        }
        if let Some(padding) = sim_box.padding_nm {
            builder = builder.box_padding_nm(padding);
        }
    }

    if let Some(ions) = &file.ions {
        match (&ions.positive, &ions.negative) {
            (Some(positive), Some(negative)) => {
                builder = builder.ion_names(positive, negative);
            }
            (Some(positive), None) => {
                builder = builder.ion_names(positive, "CL");
            }
            (None, Some(negative)) => {
                builder = builder.ion_names("NA", negative);
            }
            (None, None) => {}
        }
        if let Some(molar) = ions.concentration {
            builder = builder.ion_concentration(molar);
        }
        if let Some(neutralize) = ions.neutralize {
            builder = builder.neutralize(neutralize);
        }
    }

    if let Some(restraints) = &file.restraints {
        if let Some(force) = restraints.force_constant {
            builder = builder.restraint_force_constant(force);
        }
        if let Some(group) = &restraints.group {
            builder = builder.restraint_group(group);
        }
    }

    if let Some(production) = &file.production {
        if let Some(steps) = production.steps {
            builder = builder.production_steps(steps);
        }
        if let Some(token) = &production.steps_token {
            builder = builder.steps_token(token);
        }
    }

    if let Some(selections) = &file.selections {
        if let Some((first, second)) = &selections.coupling {
            builder = builder.coupling_groups(first, second);
        }
        if let Some(group) = &selections.centering {
            builder = builder.centering_group(group);
        }
        if let Some(group) = &selections.output {
            builder = builder.output_group(group);
        }
        if let Some(group) = &selections.deviation {
            builder = builder.deviation_group(group);
        }
        if let Some(group) = &selections.fluctuation {
            builder = builder.fluctuation_group(group);
        }
        if let Some((first, second)) = &selections.hydrogen_bonds {
            builder = builder.hydrogen_bond_groups(first, second);
        }
        if let Some(group) = &selections.gyration {
            builder = builder.gyration_group(group);
        }
        if let Some(terms) = &selections.energy_terms {
            builder = builder.energy_terms(terms.clone());
        }
        if let Some(unit) = &selections.time_unit {
            builder = builder.time_unit(unit);
        }
    }

    if let Some(pipeline) = &file.pipeline {
        if let Some(policy) = &pipeline.on_failure {
            builder = builder.failure_policy(policy.parse::<FailurePolicy>()?);
        }
    }

    if let Some(files) = &file.files {
        builder = builder.layout(merge_layout(files));
    }

    Ok(builder)
}

fn apply_cli(
    mut builder: PipelineConfigBuilder,
    args: &PipelineArgs,
) -> Result<PipelineConfigBuilder> {
    if let Some(binary) = &args.engine {
        builder = builder.engine_binary(binary);
    }
    if let Some(name) = &args.force_field {
        builder = builder.force_field(name);
    }
    if let Some(model) = &args.water_model {
        builder = builder.water_model(model.parse::<WaterModel>()?);
    }
    if let Some(kind) = &args.box_type {
        builder = builder.box_type(kind.parse::<BoxType>()?);
    }
    if let Some(name) = &args.ligand_name {
        builder = builder.ligand_name(name);
    }
    if let Some(steps) = args.steps {
        builder = builder.production_steps(steps);
    }
    if args.continue_on_failure {
        builder = builder.failure_policy(FailurePolicy::Continue);
    }
    if args.no_plots {
        builder = builder.plots(false);
    }
    Ok(builder)
}

fn merge_layout(overrides: &super::file::FileLayoutConfig) -> FileLayout {
    let mut layout = FileLayout::default();
    if let Some(name) = &overrides.receptor {
        layout.receptor = name.clone();
    }
    if let Some(name) = &overrides.ligand {
        layout.ligand = name.clone();
    }
    if let Some(name) = &overrides.ligand_topology {
        layout.ligand_topology = name.clone();
    }
    if let Some(name) = &overrides.ion_params {
        layout.ion_params = name.clone();
    }
    if let Some(name) = &overrides.minimization_params {
        layout.minimization_params = name.clone();
    }
    if let Some(name) = &overrides.nvt_params {
        layout.nvt_params = name.clone();
    }
    if let Some(name) = &overrides.npt_params {
        layout.npt_params = name.clone();
    }
    if let Some(name) = &overrides.production_params {
        layout.production_params = name.clone();
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PipelineArgs;
    use crate::error::CliError;
    use std::fs;
    use std::path::PathBuf;

    fn bare_args() -> PipelineArgs {
        PipelineArgs {
            dir: PathBuf::from("."),
            config: None,
            engine: None,
            force_field: None,
            water_model: None,
            box_type: None,
            ligand_name: None,
            steps: None,
            continue_on_failure: false,
            no_plots: false,
        }
    }

    #[test]
    fn defaults_survive_an_empty_invocation() {
        let config = build_config(&bare_args()).unwrap().pipeline;
        assert_eq!(config.engine.binary, "gmx");
        assert_eq!(config.system.force_field, "oplsaa");
        assert_eq!(config.system.water_model, WaterModel::Spc);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert!(config.engine.plots);
    }

    #[test]
    fn cli_overrides_win_over_the_file() {
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
"#,
        )
        .unwrap();

        let mut args = bare_args();
        args.config = Some(path);
        args.water_model = Some("tip4p".to_string());

        let config = build_config(&args).unwrap().pipeline;
        assert_eq!(config.system.force_field, "amber99sb-ildn");
        assert_eq!(config.system.water_model, WaterModel::Tip4p);
        assert_eq!(config.production.steps, 500_000);
    }

    #[test]
    fn flags_flip_policy_and_plots() {
        let mut args = bare_args();
        args.continue_on_failure = true;
        args.no_plots = true;

        let config = build_config(&args).unwrap().pipeline;
        assert_eq!(config.failure_policy, FailurePolicy::Continue);
        assert!(!config.engine.plots);
    }

    #[test]
    fn file_layout_overrides_merge_over_default_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gmxpipe.toml");
        fs::write(
            &path,
            "[files]\nreceptor = \"protein.pdb\"\n",
        )
        .unwrap();

        let mut args = bare_args();
        args.config = Some(path);

        let layout = build_config(&args).unwrap().pipeline.layout;
        assert_eq!(layout.receptor, "protein.pdb");
        assert_eq!(layout.ligand, "ligand.pdb");
    }

    #[test]
    fn an_unknown_water_model_is_rejected() {
        let mut args = bare_args();
        args.water_model = Some("tip9p".to_string());

        assert!(matches!(
            build_config(&args),
            Err(CliError::Config(_))
        ));
    }
}
