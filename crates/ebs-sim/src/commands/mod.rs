use std::error::Error;
use std::fs;
use std::path::Path;

use ebs_core::config::{FitGuesses, SimConfig};
use ebs_core::{Axis, EbsError, ErrorInfo};
use ebs_fit::FitOpts;

pub mod evolve;
pub mod fit_hist;
pub mod snapshot;

pub(crate) fn serde_error(code: &str, err: impl std::fmt::Display, path: &Path) -> EbsError {
    EbsError::Serde(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

pub(crate) fn load_config(path: &Path) -> Result<SimConfig, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    let config: SimConfig =
        serde_yaml::from_str(&contents).map_err(|err| serde_error("config-yaml", err, path))?;
    config.validate()?;
    Ok(config)
}

pub(crate) fn fit_opts(guesses: &FitGuesses, axis: Axis) -> FitOpts {
    let initial_guess = match axis {
        Axis::X => guesses.x,
        Axis::Y => guesses.y,
        Axis::Z => guesses.z,
    };
    FitOpts {
        initial_guess,
        ..FitOpts::default()
    }
}

pub(crate) fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|err| serde_error("artifact-json", err, path))?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_config_surfaces_structured_serde_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("run.yaml");
        fs::write(&path, "cross_angle_mrad: [not, a, number]").expect("write config");

        let err = load_config(&path).expect_err("config must not parse");
        let err = err.downcast_ref::<EbsError>().expect("structured error");
        assert!(matches!(err, EbsError::Serde(_)));
        assert_eq!(err.info().code, "config-yaml");
        assert!(err.info().context.contains_key("path"));
    }
}
