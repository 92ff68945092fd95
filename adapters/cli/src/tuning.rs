//! Loading of tuning overrides from TOML files.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tank_arena_core::Tuning;
use thiserror::Error;

/// Failure to read or parse a tuning file.
#[derive(Debug, Error)]
pub(crate) enum TuningError {
    /// The file could not be read.
    #[error("could not read tuning file {}", path.display())]
    Read {
        /// Location of the file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The file is not valid tuning TOML.
    #[error("could not parse tuning file {}", path.display())]
    Parse {
        /// Location of the file.
        path: PathBuf,
        /// Underlying parse failure.
        #[source]
        source: toml::de::Error,
    },
}

/// Reads tuning overrides from `path`; unspecified values keep their defaults.
pub(crate) fn load(path: &Path) -> Result<Tuning, TuningError> {
    let text = fs::read_to_string(path).map_err(|source| TuningError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| TuningError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let tuning: Tuning = toml::from_str("burst_size = 5\nparalysis_blocks_movement = true\n")
            .expect("valid tuning");
        assert_eq!(tuning.burst_size, 5);
        assert!(tuning.paralysis_blocks_movement);
        assert_eq!(tuning.ordinary_shot_cost, Tuning::default().ordinary_shot_cost);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Tuning>("burst_sise = 5\n").is_err());
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = load(Path::new("/definitely/not/here.toml")).expect_err("missing file");
        assert!(error.to_string().contains("/definitely/not/here.toml"));
        assert!(matches!(error, TuningError::Read { .. }));
    }
}
