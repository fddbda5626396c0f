/// Command line and config file handling of the terminal host
use mview_core::{ParamError, Parameter, ViewerConfig};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const HELP: &str = "\
mview-terminal - STL model viewer for the terminal

USAGE:
  mview-terminal [OPTIONS]

OPTIONS:
  --model PATH          STL mesh to display
  --hdri PATH           Equirectangular .hdr environment map
  --config FILE         TOML viewer config; flags override its values
  --render-scale N      Buffer size relative to the terminal (0.1 to 2)
  -h, --help            Print this help

Set RUST_LOG=debug for diagnostics on stderr.
";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Args(#[from] pico_args::Error),

    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Param(#[from] ParamError),

    #[error("unexpected arguments: {0:?}")]
    Unexpected(Vec<OsString>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub help: bool,
    pub config: ViewerConfig,
}

pub fn parse_args(mut args: pico_args::Arguments) -> Result<Options, CliError> {
    if args.contains(["-h", "--help"]) {
        return Ok(Options {
            help: true,
            config: ViewerConfig::default(),
        });
    }

    let mut config = match args.opt_value_from_str::<_, String>("--config")? {
        Some(path) => load_config(Path::new(&path))?,
        None => ViewerConfig::default(),
    };

    if let Some(model) = args.opt_value_from_str("--model")? {
        config.model = model;
    }
    if let Some(hdri) = args.opt_value_from_str("--hdri")? {
        config.hdri = hdri;
    }
    if let Some(scale) = args.opt_value_from_str::<_, String>("--render-scale")? {
        let value = Parameter::RenderScale.parse(&scale)?;
        config.display.set(Parameter::RenderScale, value);
    }

    let rest = args.finish();
    if !rest.is_empty() {
        return Err(CliError::Unexpected(rest));
    }

    Ok(Options {
        help: false,
        config,
    })
}

pub fn load_config(path: &Path) -> Result<ViewerConfig, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_owned(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| CliError::Parse {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mview_core::Color;

    fn args(list: &[&str]) -> pico_args::Arguments {
        pico_args::Arguments::from_vec(list.iter().map(OsString::from).collect())
    }

    #[test]
    fn test_defaults_without_flags() {
        let options = parse_args(args(&[])).unwrap();
        assert!(!options.help);
        assert_eq!(options.config, ViewerConfig::default());
    }

    #[test]
    fn test_flags_override_sources() {
        let options = parse_args(args(&[
            "--model",
            "part.stl",
            "--hdri",
            "studio.hdr",
            "--render-scale",
            "5",
        ]))
        .unwrap();

        assert_eq!(options.config.model, "part.stl");
        assert_eq!(options.config.hdri, "studio.hdr");
        assert_eq!(options.config.display.render_scale, 2.0);
    }

    #[test]
    fn test_rejects_bad_render_scale() {
        assert!(matches!(
            parse_args(args(&["--render-scale", "big"])),
            Err(CliError::Param(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_arguments() {
        assert!(matches!(
            parse_args(args(&["stray"])),
            Err(CliError::Unexpected(_))
        ));
    }

    #[test]
    fn test_help() {
        assert!(parse_args(args(&["-h"])).unwrap().help);
    }

    #[test]
    fn test_toml_config() {
        let config: ViewerConfig = toml::from_str(
            r##"
model = "bracket.stl"

[display]
fov = 30.0
color = "#ff0000"
bgIntensity = 2.0
"##,
        )
        .unwrap();

        assert_eq!(config.model, "bracket.stl");
        assert_eq!(config.hdri, ViewerConfig::default().hdri);
        assert_eq!(config.display.fov, 30.0);
        assert_eq!(config.display.color, Color::RED);
        assert_eq!(config.display.bg_intensity, 2.0);
        assert_eq!(config.display.roughness, 0.4);
    }

    #[test]
    fn test_missing_config_file() {
        assert!(matches!(
            load_config(Path::new("/nonexistent/mview.toml")),
            Err(CliError::Read { .. })
        ));
    }
}
