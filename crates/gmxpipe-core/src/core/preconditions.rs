use crate::core::files::FileLayout;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
#[error("Required input file is missing: {path}", path = .0.display())]
pub struct PreconditionError(pub PathBuf);

/// Verifies that every required input file exists, failing on the first
/// missing one. Existence only; a zero-byte or malformed file passes.
pub fn check(dir: &Path, layout: &FileLayout) -> Result<(), PreconditionError> {
    for name in layout.required_inputs() {
        let path = dir.join(name);
        if !path.is_file() {
            return Err(PreconditionError(path));
        }
        debug!("Precondition satisfied: {}", path.display());
    }
    Ok(())
}

/// Lists every missing required input, for diagnostics that should not stop
/// at the first failure.
pub fn missing(dir: &Path, layout: &FileLayout) -> Vec<PathBuf> {
    layout
        .required_inputs()
        .into_iter()
        .map(|name| dir.join(name))
        .filter(|path| !path.is_file())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn seed_all(dir: &Path, layout: &FileLayout) {
        for name in layout.required_inputs() {
            fs::write(dir.join(name), "").unwrap();
        }
    }

    #[test]
    fn passes_when_every_required_input_exists() {
        let dir = tempdir().unwrap();
        let layout = FileLayout::default();
        seed_all(dir.path(), &layout);

        assert!(check(dir.path(), &layout).is_ok());
        assert!(missing(dir.path(), &layout).is_empty());
    }

    #[test]
    fn names_the_missing_file() {
        let dir = tempdir().unwrap();
        let layout = FileLayout::default();
        seed_all(dir.path(), &layout);
        fs::remove_file(dir.path().join("nvt.mdp")).unwrap();

        let err = check(dir.path(), &layout).unwrap_err();
        assert_eq!(err.0, dir.path().join("nvt.mdp"));
        assert_eq!(missing(dir.path(), &layout), vec![dir.path().join("nvt.mdp")]);
    }

    #[test]
    fn empty_files_satisfy_the_check() {
        let dir = tempdir().unwrap();
        let layout = FileLayout::default();
        seed_all(dir.path(), &layout);

        // All fixtures are zero-byte; content is never validated.
        assert!(check(dir.path(), &layout).is_ok());
    }
}
