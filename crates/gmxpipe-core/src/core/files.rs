use serde::{Deserialize, Serialize};

/// System topology produced by the preparation stage and mutated in place by
/// later stages (ligand include, restraint include, molecule counts).
pub const SYSTEM_TOPOLOGY: &str = "topol.top";
/// Receptor position restraints written alongside the topology.
pub const RECEPTOR_RESTRAINTS: &str = "posre.itp";
/// Receptor coordinates after force-field processing.
pub const PROCESSED_RECEPTOR: &str = "receptor_processed.gro";
/// Ligand coordinates after conversion from the input structure.
pub const LIGAND_COORDS: &str = "ligand.gro";
/// Combined receptor + ligand coordinates.
pub const COMPLEX: &str = "complex.gro";
/// Complex centered in the simulation box.
pub const BOXED: &str = "newbox.gro";
/// Solvated system.
pub const SOLVATED: &str = "solv.gro";
/// Run input compiled for ion placement.
pub const ION_RUN_INPUT: &str = "ions.tpr";
/// Solvated system with ions added.
pub const IONIZED: &str = "solv_ions.gro";
/// Heavy-atom index groups for the ligand.
pub const LIGAND_INDEX: &str = "index_ligand.ndx";
/// Ligand position restraints generated from the heavy-atom group.
pub const LIGAND_RESTRAINTS: &str = "posre_ligand.itp";
/// Index file holding the combined temperature-coupling group.
pub const SYSTEM_INDEX: &str = "index.ndx";

/// Per-stage output prefixes used with the engine's `-deffnm` convention.
pub const EM_PREFIX: &str = "em";
pub const NVT_PREFIX: &str = "nvt";
pub const NPT_PREFIX: &str = "npt";
pub const MD_PREFIX: &str = "md";

/// Production trajectory after re-centering and periodic re-wrapping.
pub const CENTERED_TRAJECTORY: &str = "md_center.xtc";
/// Single reference frame extracted at time zero.
pub const REFERENCE_FRAME: &str = "start.gro";

/// Final analysis deliverables.
pub const DEVIATION_PLOT: &str = "rmsd.xvg";
pub const FLUCTUATION_PLOT: &str = "rmsf.xvg";
pub const HBOND_PLOT: &str = "hbond.xvg";
pub const GYRATION_PLOT: &str = "gyrate.xvg";
pub const ENERGY_PLOT: &str = "energy.xvg";

/// Machine-readable run report written at the end of every run.
pub const RUN_REPORT: &str = "gmxpipe-report.toml";

/// Derives an artifact name from a `-deffnm` prefix.
pub fn with_ext(prefix: &str, ext: &str) -> String {
    format!("{}.{}", prefix, ext)
}

/// The input files a run expects to pre-exist in the working directory.
///
/// Every name is relative to the working directory. The defaults match the
/// conventional layout of a protein-ligand run; each name can be overridden
/// when a project uses different conventions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileLayout {
    /// Receptor structure (atomic positions).
    pub receptor: String,
    /// Ligand structure (atomic positions).
    pub ligand: String,
    /// Ligand parameter topology, spliced into the system topology.
    pub ligand_topology: String,
    /// Parameter file for the ion-placement compile stage.
    pub ion_params: String,
    /// Parameter file for energy minimization.
    pub minimization_params: String,
    /// Parameter file for NVT equilibration.
    pub nvt_params: String,
    /// Parameter file for NPT equilibration.
    pub npt_params: String,
    /// Parameter file for the production run; holds the run-length token.
    pub production_params: String,
}

impl Default for FileLayout {
    fn default() -> Self {
        Self {
            receptor: "receptor.pdb".to_string(),
            ligand: "ligand.pdb".to_string(),
            ligand_topology: "ligand.itp".to_string(),
            ion_params: "ions.mdp".to_string(),
            minimization_params: "em.mdp".to_string(),
            nvt_params: "nvt.mdp".to_string(),
            npt_params: "npt.mdp".to_string(),
            production_params: "md.mdp".to_string(),
        }
    }
}

impl FileLayout {
    /// All files that must exist before any stage runs, in check order.
    pub fn required_inputs(&self) -> Vec<&str> {
        vec![
            &self.receptor,
            &self.ligand,
            &self.ligand_topology,
            &self.ion_params,
            &self.minimization_params,
            &self.nvt_params,
            &self.npt_params,
            &self.production_params,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_requires_eight_inputs() {
        let layout = FileLayout::default();
        let inputs = layout.required_inputs();
        assert_eq!(inputs.len(), 8);
        assert!(inputs.contains(&"receptor.pdb"));
        assert!(inputs.contains(&"md.mdp"));
    }

    #[test]
    fn prefix_extension_joins_with_a_dot() {
        assert_eq!(with_ext(EM_PREFIX, "tpr"), "em.tpr");
        assert_eq!(with_ext(MD_PREFIX, "xtc"), "md.xtc");
    }

    #[test]
    fn custom_names_flow_through_required_inputs() {
        let layout = FileLayout {
            receptor: "protein.pdb".to_string(),
            ..FileLayout::default()
        };
        assert!(layout.required_inputs().contains(&"protein.pdb"));
        assert!(!layout.required_inputs().contains(&"receptor.pdb"));
    }
}
