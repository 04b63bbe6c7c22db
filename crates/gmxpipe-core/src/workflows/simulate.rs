use crate::core::files::{self, FileLayout};
use crate::core::textedit::TextEdit;
use crate::engine::command::ToolCommand;
use crate::engine::config::PipelineConfig;
use crate::engine::stage::StageSpec;

/// Selection fed to the ligand indexing stage: every ligand atom except
/// hydrogens, i.e. the heavy atoms the restraints act on.
const LIGAND_HEAVY_ATOMS: &str = "0 & ! a H*";

fn gmx(config: &PipelineConfig) -> ToolCommand {
    ToolCommand::new(&config.engine.binary)
}

/// Builds the preparation-through-production stages of the pipeline.
pub fn stages(config: &PipelineConfig) -> Vec<StageSpec> {
    let layout = &config.layout;
    vec![
        prepare_receptor(config, layout),
        assemble_complex(config, layout),
        include_ligand_topology(config, layout),
        rename_ligand_molecule(config, layout),
        define_box(config, layout),
        solvate(config, layout),
        add_ions(config, layout),
        minimize(config, layout),
        index_ligand(config, layout),
        restrain_ligand(config, layout),
        index_system(config, layout),
        equilibrate_nvt(config, layout),
        equilibrate_npt(config, layout),
        production(config, layout),
    ]
}

/// Stage 1: force-field-parameterized topology + coordinates from the
/// receptor. The legacy interactive force-field and water-model prompts are
/// answered through flags.
fn prepare_receptor(config: &PipelineConfig, layout: &FileLayout) -> StageSpec {
    StageSpec::new("prepare-receptor")
        .input(&layout.receptor)
        .output(files::PROCESSED_RECEPTOR)
        .output(files::SYSTEM_TOPOLOGY)
        .output(files::RECEPTOR_RESTRAINTS)
        .invoke(
            gmx(config)
                .arg("pdb2gmx")
                .args(["-f", layout.receptor.as_str()])
                .args(["-o", files::PROCESSED_RECEPTOR])
                .args(["-p", files::SYSTEM_TOPOLOGY])
                .args(["-i", files::RECEPTOR_RESTRAINTS])
                .args(["-ff", config.system.force_field.as_str()])
                .args(["-water", config.system.water_model.as_flag()]),
        )
}

/// Stage 2: ligand coordinates, then the combined complex. The ligand atom
/// records are spliced ahead of the box line and the atom-count line is
/// rewritten to match.
fn assemble_complex(config: &PipelineConfig, layout: &FileLayout) -> StageSpec {
    StageSpec::new("assemble-complex")
        .input(&layout.ligand)
        .input(files::PROCESSED_RECEPTOR)
        .output(files::LIGAND_COORDS)
        .output(files::COMPLEX)
        .invoke(
            gmx(config)
                .arg("editconf")
                .args(["-f", layout.ligand.as_str()])
                .args(["-o", files::LIGAND_COORDS]),
        )
        .copy(files::PROCESSED_RECEPTOR, files::COMPLEX)
        .edit(TextEdit::MergeCoordinates {
            target: files::COMPLEX.to_string(),
            source: files::LIGAND_COORDS.to_string(),
        })
}

/// Stage 3: splice the ligand into the system topology. The include goes
/// right after the force-field include; the molecule count is appended to
/// the `[ molecules ]` section at the end of the file.
fn include_ligand_topology(config: &PipelineConfig, layout: &FileLayout) -> StageSpec {
    let forcefield_include = format!(
        "#include \"{}.ff/forcefield.itp\"",
        config.system.force_field
    );
    StageSpec::new("include-ligand-topology")
        .input(files::SYSTEM_TOPOLOGY)
        .output(files::SYSTEM_TOPOLOGY)
        .edit(TextEdit::InsertAfter {
            path: files::SYSTEM_TOPOLOGY.to_string(),
            anchor: forcefield_include,
            text: format!(
                "\n; Include ligand topology\n#include \"{}\"",
                layout.ligand_topology
            ),
        })
        .edit(TextEdit::AppendBlock {
            path: files::SYSTEM_TOPOLOGY.to_string(),
            text: format!("{} 1", config.system.ligand_name),
        })
}

/// Stage 4: rewrite the placeholder molecule name inside the ligand topology
/// to the name the system topology uses.
fn rename_ligand_molecule(config: &PipelineConfig, layout: &FileLayout) -> StageSpec {
    StageSpec::new("rename-ligand-molecule")
        .input(&layout.ligand_topology)
        .output(layout.ligand_topology.clone())
        .edit(TextEdit::SubstituteToken {
            path: layout.ligand_topology.clone(),
            token: config.system.ligand_placeholder.clone(),
            value: config.system.ligand_name.clone(),
        })
}

/// Stage 5: simulation box of the configured geometry and padding, centered
/// on the complex.
fn define_box(config: &PipelineConfig, _layout: &FileLayout) -> StageSpec {
    StageSpec::new("define-box")
        .input(files::COMPLEX)
        .output(files::BOXED)
        .invoke(
            gmx(config)
                .arg("editconf")
                .args(["-f", files::COMPLEX])
                .args(["-o", files::BOXED])
                .args(["-bt", config.simulation_box.box_type.as_flag()])
                .args(["-d", config.simulation_box.padding_nm.to_string().as_str()])
                .arg("-c"),
        )
}

/// Stage 6: solvation with the reference water configuration. The tool
/// updates the topology's solvent molecule count itself.
fn solvate(config: &PipelineConfig, _layout: &FileLayout) -> StageSpec {
    StageSpec::new("solvate")
        .input(files::BOXED)
        .input(files::SYSTEM_TOPOLOGY)
        .output(files::SOLVATED)
        .output(files::SYSTEM_TOPOLOGY)
        .invoke(
            gmx(config)
                .arg("solvate")
                .args(["-cp", files::BOXED])
                .args(["-cs", config.system.solvent_configuration.as_str()])
                .args(["-p", files::SYSTEM_TOPOLOGY])
                .args(["-o", files::SOLVATED]),
        )
}

/// Stage 7: compile and run ion placement. The solvent-group prompt is
/// answered over stdin.
fn add_ions(config: &PipelineConfig, layout: &FileLayout) -> StageSpec {
    let mut genion = gmx(config)
        .arg("genion")
        .args(["-s", files::ION_RUN_INPUT])
        .args(["-o", files::IONIZED])
        .args(["-p", files::SYSTEM_TOPOLOGY])
        .args(["-pname", config.ions.positive.as_str()])
        .args(["-nname", config.ions.negative.as_str()])
        .args(["-conc", config.ions.concentration.to_string().as_str()]);
    if config.ions.neutralize {
        genion = genion.arg("-neutral");
    }
    StageSpec::new("add-ions")
        .input(&layout.ion_params)
        .input(files::SOLVATED)
        .input(files::SYSTEM_TOPOLOGY)
        .output(files::ION_RUN_INPUT)
        .output(files::IONIZED)
        .output(files::SYSTEM_TOPOLOGY)
        .invoke(
            gmx(config)
                .arg("grompp")
                .args(["-f", layout.ion_params.as_str()])
                .args(["-c", files::SOLVATED])
                .args(["-p", files::SYSTEM_TOPOLOGY])
                .args(["-o", files::ION_RUN_INPUT]),
        )
        .invoke(genion.stdin(format!("{}\n", config.ions.solvent_group)))
}

/// Stage 8: compile and run energy minimization.
fn minimize(config: &PipelineConfig, layout: &FileLayout) -> StageSpec {
    StageSpec::new("minimize")
        .input(&layout.minimization_params)
        .input(files::IONIZED)
        .input(files::SYSTEM_TOPOLOGY)
        .output(files::with_ext(files::EM_PREFIX, "tpr"))
        .output(files::with_ext(files::EM_PREFIX, "gro"))
        .output(files::with_ext(files::EM_PREFIX, "edr"))
        .invoke(
            gmx(config)
                .arg("grompp")
                .args(["-f", layout.minimization_params.as_str()])
                .args(["-c", files::IONIZED])
                .args(["-p", files::SYSTEM_TOPOLOGY])
                .args(["-o", files::with_ext(files::EM_PREFIX, "tpr").as_str()]),
        )
        .invoke(
            gmx(config)
                .arg("mdrun")
                .arg("-v")
                .args(["-deffnm", files::EM_PREFIX]),
        )
}

/// Stage 9: heavy-atom index group for the ligand, used by the restraint
/// generation stage. The selection is piped to the tool's prompt.
fn index_ligand(config: &PipelineConfig, _layout: &FileLayout) -> StageSpec {
    StageSpec::new("index-ligand")
        .input(files::LIGAND_COORDS)
        .output(files::LIGAND_INDEX)
        .invoke(
            gmx(config)
                .arg("make_ndx")
                .args(["-f", files::LIGAND_COORDS])
                .args(["-o", files::LIGAND_INDEX])
                .stdin(format!("{}\nq\n", LIGAND_HEAVY_ATOMS)),
        )
}

/// Stage 10: ligand position restraints from the heavy-atom group, plus the
/// `#ifdef`-guarded include spliced in after the ligand topology include.
fn restrain_ligand(config: &PipelineConfig, layout: &FileLayout) -> StageSpec {
    let force = config.restraints.force_constant.to_string();
    StageSpec::new("restrain-ligand")
        .input(files::LIGAND_COORDS)
        .input(files::LIGAND_INDEX)
        .input(files::SYSTEM_TOPOLOGY)
        .output(files::LIGAND_RESTRAINTS)
        .output(files::SYSTEM_TOPOLOGY)
        .invoke(
            gmx(config)
                .arg("genrestr")
                .args(["-f", files::LIGAND_COORDS])
                .args(["-n", files::LIGAND_INDEX])
                .args(["-o", files::LIGAND_RESTRAINTS])
                .args(["-fc", force.as_str(), force.as_str(), force.as_str()])
                .stdin(format!("{}\n", config.restraints.group)),
        )
        .edit(TextEdit::InsertAfter {
            path: files::SYSTEM_TOPOLOGY.to_string(),
            anchor: format!("#include \"{}\"", layout.ligand_topology),
            text: format!(
                "\n; Ligand position restraints\n#ifdef POSRES\n#include \"{}\"\n#endif",
                files::LIGAND_RESTRAINTS
            ),
        })
}

/// Stage 11: combined temperature-coupling group, the union of the two
/// configured groups.
fn index_system(config: &PipelineConfig, _layout: &FileLayout) -> StageSpec {
    let (first, second) = &config.selections.coupling;
    StageSpec::new("index-system")
        .input(files::with_ext(files::EM_PREFIX, "gro"))
        .output(files::SYSTEM_INDEX)
        .invoke(
            gmx(config)
                .arg("make_ndx")
                .args(["-f", files::with_ext(files::EM_PREFIX, "gro").as_str()])
                .args(["-o", files::SYSTEM_INDEX])
                .stdin(format!("\"{}\" | \"{}\"\nq\n", first, second)),
        )
}

/// Stage 12: NVT equilibration; the minimized structure is both starting
/// coordinates and restraint reference.
fn equilibrate_nvt(config: &PipelineConfig, layout: &FileLayout) -> StageSpec {
    let minimized = files::with_ext(files::EM_PREFIX, "gro");
    StageSpec::new("equilibrate-nvt")
        .input(&layout.nvt_params)
        .input(&minimized)
        .input(files::SYSTEM_TOPOLOGY)
        .input(files::SYSTEM_INDEX)
        .output(files::with_ext(files::NVT_PREFIX, "tpr"))
        .output(files::with_ext(files::NVT_PREFIX, "gro"))
        .output(files::with_ext(files::NVT_PREFIX, "cpt"))
        .invoke(
            gmx(config)
                .arg("grompp")
                .args(["-f", layout.nvt_params.as_str()])
                .args(["-c", minimized.as_str()])
                .args(["-r", minimized.as_str()])
                .args(["-p", files::SYSTEM_TOPOLOGY])
                .args(["-n", files::SYSTEM_INDEX])
                .args(["-o", files::with_ext(files::NVT_PREFIX, "tpr").as_str()]),
        )
        .invoke(gmx(config).arg("mdrun").args(["-deffnm", files::NVT_PREFIX]))
}

/// Stage 13: NPT equilibration continuing from the NVT state.
fn equilibrate_npt(config: &PipelineConfig, layout: &FileLayout) -> StageSpec {
    let nvt_coords = files::with_ext(files::NVT_PREFIX, "gro");
    StageSpec::new("equilibrate-npt")
        .input(&layout.npt_params)
        .input(&nvt_coords)
        .input(files::with_ext(files::NVT_PREFIX, "cpt"))
        .input(files::SYSTEM_TOPOLOGY)
        .input(files::SYSTEM_INDEX)
        .output(files::with_ext(files::NPT_PREFIX, "tpr"))
        .output(files::with_ext(files::NPT_PREFIX, "gro"))
        .output(files::with_ext(files::NPT_PREFIX, "cpt"))
        .invoke(
            gmx(config)
                .arg("grompp")
                .args(["-f", layout.npt_params.as_str()])
                .args(["-c", nvt_coords.as_str()])
                .args(["-t", files::with_ext(files::NVT_PREFIX, "cpt").as_str()])
                .args(["-r", nvt_coords.as_str()])
                .args(["-p", files::SYSTEM_TOPOLOGY])
                .args(["-n", files::SYSTEM_INDEX])
                .args(["-o", files::with_ext(files::NPT_PREFIX, "tpr").as_str()]),
        )
        .invoke(gmx(config).arg("mdrun").args(["-deffnm", files::NPT_PREFIX]))
}

/// Stage 14: patch the run-length token in the production parameter file,
/// then compile and run production from the NPT checkpoint.
fn production(config: &PipelineConfig, layout: &FileLayout) -> StageSpec {
    StageSpec::new("production")
        .input(&layout.production_params)
        .input(files::with_ext(files::NPT_PREFIX, "gro"))
        .input(files::with_ext(files::NPT_PREFIX, "cpt"))
        .input(files::SYSTEM_TOPOLOGY)
        .input(files::SYSTEM_INDEX)
        .output(files::with_ext(files::MD_PREFIX, "tpr"))
        .output(files::with_ext(files::MD_PREFIX, "xtc"))
        .output(files::with_ext(files::MD_PREFIX, "edr"))
        .edit(TextEdit::SubstituteToken {
            path: layout.production_params.clone(),
            token: config.production.steps_token.clone(),
            value: config.production.steps.to_string(),
        })
        .invoke(
            gmx(config)
                .arg("grompp")
                .args(["-f", layout.production_params.as_str()])
                .args(["-c", files::with_ext(files::NPT_PREFIX, "gro").as_str()])
                .args(["-t", files::with_ext(files::NPT_PREFIX, "cpt").as_str()])
                .args(["-p", files::SYSTEM_TOPOLOGY])
                .args(["-n", files::SYSTEM_INDEX])
                .args(["-o", files::with_ext(files::MD_PREFIX, "tpr").as_str()]),
        )
        .invoke(gmx(config).arg("mdrun").args(["-deffnm", files::MD_PREFIX]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::PipelineConfigBuilder;
    use crate::engine::stage::StageAction;

    fn default_config() -> PipelineConfig {
        PipelineConfigBuilder::new().build().unwrap()
    }

    fn first_command(stage: &StageSpec) -> &ToolCommand {
        stage
            .actions
            .iter()
            .find_map(|action| match action {
                StageAction::Invoke(cmd) => Some(cmd),
                _ => None,
            })
            .expect("stage has no tool invocation")
    }

    #[test]
    fn builds_the_fourteen_simulation_stages_in_order() {
        let names: Vec<&str> = stages(&default_config())
            .iter()
            .map(|stage| stage.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "prepare-receptor",
                "assemble-complex",
                "include-ligand-topology",
                "rename-ligand-molecule",
                "define-box",
                "solvate",
                "add-ions",
                "minimize",
                "index-ligand",
                "restrain-ligand",
                "index-system",
                "equilibrate-nvt",
                "equilibrate-npt",
                "production",
            ]
        );
    }

    #[test]
    fn preparation_answers_the_legacy_prompts_with_flags() {
        let config = default_config();
        let stages = stages(&config);
        let cmd = first_command(&stages[0]);
        let rendered = cmd.rendered();
        assert!(rendered.contains("pdb2gmx"));
        assert!(rendered.contains("-ff oplsaa"));
        assert!(rendered.contains("-water spc"));
        assert!(cmd.stdin.is_none());
    }

    #[test]
    fn ion_placement_feeds_the_solvent_group_on_stdin() {
        let config = default_config();
        let all = stages(&config);
        let add_ions = all.iter().find(|s| s.name == "add-ions").unwrap();
        let genion = add_ions
            .actions
            .iter()
            .filter_map(|action| match action {
                StageAction::Invoke(cmd) => Some(cmd),
                _ => None,
            })
            .nth(1)
            .unwrap();
        assert!(genion.rendered().contains("genion"));
        assert!(genion.rendered().contains("-neutral"));
        assert_eq!(genion.stdin.as_deref(), Some("SOL\n"));
    }

    #[test]
    fn coupling_union_quotes_both_group_names() {
        let config = PipelineConfigBuilder::new()
            .coupling_groups("Protein", "JZ4")
            .build()
            .unwrap();
        let all = stages(&config);
        let index = all.iter().find(|s| s.name == "index-system").unwrap();
        let cmd = first_command(index);
        assert_eq!(cmd.stdin.as_deref(), Some("\"Protein\" | \"JZ4\"\nq\n"));
    }

    #[test]
    fn production_patches_the_step_token_before_compiling() {
        let config = PipelineConfigBuilder::new()
            .production_steps(250_000)
            .build()
            .unwrap();
        let all = stages(&config);
        let production = all.last().unwrap();
        match &production.actions[0] {
            StageAction::Edit(TextEdit::SubstituteToken { path, token, value }) => {
                assert_eq!(path, "md.mdp");
                assert_eq!(token, "NSTEPS");
                assert_eq!(value, "250000");
            }
            other => panic!("expected the token substitution first, got {:?}", other),
        }
    }

    #[test]
    fn restraint_include_is_guarded_and_anchored_on_the_ligand_include() {
        let config = default_config();
        let all = stages(&config);
        let restrain = all.iter().find(|s| s.name == "restrain-ligand").unwrap();
        let edit = restrain
            .actions
            .iter()
            .find_map(|action| match action {
                StageAction::Edit(edit) => Some(edit),
                _ => None,
            })
            .unwrap();
        match edit {
            TextEdit::InsertAfter { anchor, text, .. } => {
                assert_eq!(anchor, "#include \"ligand.itp\"");
                assert!(text.contains("#ifdef POSRES"));
                assert!(text.contains("posre_ligand.itp"));
            }
            other => panic!("unexpected edit: {:?}", other),
        }
    }
}
