use crate::core::files;
use crate::engine::command::ToolCommand;
use crate::engine::config::PipelineConfig;
use crate::engine::stage::StageSpec;

fn gmx(config: &PipelineConfig) -> ToolCommand {
    ToolCommand::new(&config.engine.binary)
}

/// Appends the plot-viewer launch when plots are enabled.
fn with_plot(stage: StageSpec, config: &PipelineConfig, artifact: &str) -> StageSpec {
    if config.engine.plots {
        stage.invoke(ToolCommand::new(&config.engine.plot_viewer).arg(artifact))
    } else {
        stage
    }
}

/// Builds the post-processing and analysis stages of the pipeline.
pub fn stages(config: &PipelineConfig) -> Vec<StageSpec> {
    vec![
        recenter_trajectory(config),
        extract_reference_frame(config),
        analyze_deviation(config),
        analyze_fluctuation(config),
        analyze_hydrogen_bonds(config),
        analyze_gyration(config),
        extract_energy(config),
    ]
}

/// Stage 15: re-center and re-wrap the production trajectory into a compact
/// periodic image. The legacy interactive group picks (fit set, output set)
/// are answered over stdin.
fn recenter_trajectory(config: &PipelineConfig) -> StageSpec {
    StageSpec::new("recenter-trajectory")
        .input(files::with_ext(files::MD_PREFIX, "tpr"))
        .input(files::with_ext(files::MD_PREFIX, "xtc"))
        .output(files::CENTERED_TRAJECTORY)
        .invoke(
            gmx(config)
                .arg("trjconv")
                .args(["-s", files::with_ext(files::MD_PREFIX, "tpr").as_str()])
                .args(["-f", files::with_ext(files::MD_PREFIX, "xtc").as_str()])
                .args(["-o", files::CENTERED_TRAJECTORY])
                .arg("-center")
                .args(["-pbc", "mol"])
                .args(["-ur", "compact"])
                .stdin(format!(
                    "{}\n{}\n",
                    config.selections.centering, config.selections.output
                )),
        )
}

/// Stage 16: single reference frame at time zero from the processed
/// trajectory.
fn extract_reference_frame(config: &PipelineConfig) -> StageSpec {
    StageSpec::new("extract-reference-frame")
        .input(files::with_ext(files::MD_PREFIX, "tpr"))
        .input(files::CENTERED_TRAJECTORY)
        .output(files::REFERENCE_FRAME)
        .invoke(
            gmx(config)
                .arg("trjconv")
                .args(["-s", files::with_ext(files::MD_PREFIX, "tpr").as_str()])
                .args(["-f", files::CENTERED_TRAJECTORY])
                .args(["-o", files::REFERENCE_FRAME])
                .args(["-dump", "0"])
                .stdin(format!("{}\n", config.selections.output)),
        )
}

/// Structural deviation over time, in the configured time unit. Fit and
/// calculation use the same group.
fn analyze_deviation(config: &PipelineConfig) -> StageSpec {
    let group = &config.selections.deviation;
    let stage = StageSpec::new("analyze-deviation")
        .input(files::with_ext(files::MD_PREFIX, "tpr"))
        .input(files::CENTERED_TRAJECTORY)
        .output(files::DEVIATION_PLOT)
        .invoke(
            gmx(config)
                .arg("rms")
                .args(["-s", files::with_ext(files::MD_PREFIX, "tpr").as_str()])
                .args(["-f", files::CENTERED_TRAJECTORY])
                .args(["-o", files::DEVIATION_PLOT])
                .args(["-tu", config.selections.time_unit.as_str()])
                .stdin(format!("{}\n{}\n", group, group)),
        );
    with_plot(stage, config, files::DEVIATION_PLOT)
}

/// Positional fluctuation per residue.
fn analyze_fluctuation(config: &PipelineConfig) -> StageSpec {
    let stage = StageSpec::new("analyze-fluctuation")
        .input(files::with_ext(files::MD_PREFIX, "tpr"))
        .input(files::CENTERED_TRAJECTORY)
        .output(files::FLUCTUATION_PLOT)
        .invoke(
            gmx(config)
                .arg("rmsf")
                .args(["-s", files::with_ext(files::MD_PREFIX, "tpr").as_str()])
                .args(["-f", files::CENTERED_TRAJECTORY])
                .args(["-o", files::FLUCTUATION_PLOT])
                .arg("-res")
                .stdin(format!("{}\n", config.selections.fluctuation)),
        );
    with_plot(stage, config, files::FLUCTUATION_PLOT)
}

/// Hydrogen-bond count over time between the configured group pair, in the
/// configured time unit.
fn analyze_hydrogen_bonds(config: &PipelineConfig) -> StageSpec {
    let (donor, acceptor) = &config.selections.hydrogen_bonds;
    let stage = StageSpec::new("analyze-hydrogen-bonds")
        .input(files::with_ext(files::MD_PREFIX, "tpr"))
        .input(files::CENTERED_TRAJECTORY)
        .output(files::HBOND_PLOT)
        .invoke(
            gmx(config)
                .arg("hbond")
                .args(["-s", files::with_ext(files::MD_PREFIX, "tpr").as_str()])
                .args(["-f", files::CENTERED_TRAJECTORY])
                .args(["-num", files::HBOND_PLOT])
                .args(["-tu", config.selections.time_unit.as_str()])
                .stdin(format!("{}\n{}\n", donor, acceptor)),
        );
    with_plot(stage, config, files::HBOND_PLOT)
}

/// Radius of gyration over the trajectory.
fn analyze_gyration(config: &PipelineConfig) -> StageSpec {
    let stage = StageSpec::new("analyze-gyration")
        .input(files::with_ext(files::MD_PREFIX, "tpr"))
        .input(files::CENTERED_TRAJECTORY)
        .output(files::GYRATION_PLOT)
        .invoke(
            gmx(config)
                .arg("gyrate")
                .args(["-s", files::with_ext(files::MD_PREFIX, "tpr").as_str()])
                .args(["-f", files::CENTERED_TRAJECTORY])
                .args(["-o", files::GYRATION_PLOT])
                .stdin(format!("{}\n", config.selections.gyration)),
        );
    with_plot(stage, config, files::GYRATION_PLOT)
}

/// Energy-term extraction from the production energy log. The term list is
/// fed over stdin, terminated by an empty line.
fn extract_energy(config: &PipelineConfig) -> StageSpec {
    let stage = StageSpec::new("extract-energy")
        .input(files::with_ext(files::MD_PREFIX, "edr"))
        .output(files::ENERGY_PLOT)
        .invoke(
            gmx(config)
                .arg("energy")
                .args(["-f", files::with_ext(files::MD_PREFIX, "edr").as_str()])
                .args(["-o", files::ENERGY_PLOT])
                .stdin(format!("{}\n\n", config.selections.energy_terms.join("\n"))),
        );
    with_plot(stage, config, files::ENERGY_PLOT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::PipelineConfigBuilder;
    use crate::engine::stage::StageAction;

    fn commands(stage: &StageSpec) -> Vec<&ToolCommand> {
        stage
            .actions
            .iter()
            .filter_map(|action| match action {
                StageAction::Invoke(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn builds_the_seven_analysis_stages_in_order() {
        let config = PipelineConfigBuilder::new().build().unwrap();
        let names: Vec<&str> = stages(&config).iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "recenter-trajectory",
                "extract-reference-frame",
                "analyze-deviation",
                "analyze-fluctuation",
                "analyze-hydrogen-bonds",
                "analyze-gyration",
                "extract-energy",
            ]
        );
    }

    #[test]
    fn recentering_feeds_both_group_picks() {
        let config = PipelineConfigBuilder::new()
            .centering_group("Protein")
            .output_group("System")
            .build()
            .unwrap();
        let stage = recenter_trajectory(&config);
        let cmd = commands(&stage)[0];
        assert!(cmd.rendered().contains("-pbc mol"));
        assert_eq!(cmd.stdin.as_deref(), Some("Protein\nSystem\n"));
    }

    #[test]
    fn each_analysis_launches_the_viewer_when_plots_are_enabled() {
        let config = PipelineConfigBuilder::new().plots(true).build().unwrap();
        for stage in stages(&config).iter().skip(2) {
            let cmds = commands(stage);
            assert_eq!(cmds.len(), 2, "stage '{}' should end in a plot", stage.name);
            assert_eq!(cmds[1].program, "xmgrace");
        }
    }

    #[test]
    fn disabling_plots_removes_every_viewer_launch() {
        let config = PipelineConfigBuilder::new().plots(false).build().unwrap();
        for stage in stages(&config) {
            for cmd in commands(&stage) {
                assert_ne!(cmd.program, "xmgrace");
            }
        }
    }

    #[test]
    fn time_unit_override_reaches_deviation_and_hydrogen_bonds() {
        let config = PipelineConfigBuilder::new().time_unit("ps").build().unwrap();
        let all = stages(&config);
        let rms = commands(&all[2])[0];
        let hbond = commands(&all[4])[0];
        assert!(rms.rendered().contains("-tu ps"));
        assert!(hbond.rendered().contains("-tu ps"));
    }

    #[test]
    fn energy_extraction_terminates_the_term_list() {
        let config = PipelineConfigBuilder::new()
            .energy_terms(vec!["Potential".to_string(), "Temperature".to_string()])
            .build()
            .unwrap();
        let stage = extract_energy(&config);
        let cmd = commands(&stage)[0];
        assert_eq!(cmd.stdin.as_deref(), Some("Potential\nTemperature\n\n"));
    }
}
