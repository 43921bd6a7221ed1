//! Command-line arguments shared by every test program
//!
//! Programs flatten [`CommonArgs`] into their own clap `Parser` and fix their
//! per-program defaults in a [`CommonDefaults`] before resolving.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, ValueEnum};

use super::config::{self, Config, ConfigError};
use crate::graphics::RendererBackend;

bitflags::bitflags! {
    /// Categories of diagnostic logging
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VerboseFlags: u8 {
        /// Window creation
        const VIDEO = 0b0000_0001;
        /// Monitor video modes
        const MODES = 0b0000_0010;
        /// Adapter, backend and surface details
        const RENDER = 0b0000_0100;
        /// Every translated event
        const EVENT = 0b0000_1000;
    }
}

/// One `--verbose` value
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VerboseCategory {
    Video,
    Modes,
    Render,
    Event,
}

impl VerboseCategory {
    pub fn flag(self) -> VerboseFlags {
        match self {
            VerboseCategory::Video => VerboseFlags::VIDEO,
            VerboseCategory::Modes => VerboseFlags::MODES,
            VerboseCategory::Render => VerboseFlags::RENDER,
            VerboseCategory::Event => VerboseFlags::EVENT,
        }
    }
}

/// Which loop drives the ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DriveMode {
    /// `while !done` loop that pumps platform events between ticks
    #[default]
    Blocking,
    /// Platform event loop calls one tick per iteration
    Scheduled,
}

/// Window size given as `WIDTHxHEIGHT`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl FromStr for Geometry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
        let width: u32 = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width '{}'", w))?;
        let height: u32 = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height '{}'", h))?;
        if width == 0 || height == 0 {
            return Err(format!("geometry must be non-zero, got {}x{}", width, height));
        }
        Ok(Self { width, height })
    }
}

/// Arguments every test program accepts
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Number of windows to open
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub windows: Option<u32>,

    /// Window size, e.g. 800x600 (default from config, else 640x480)
    #[arg(long, value_name = "WxH")]
    pub geometry: Option<Geometry>,

    /// Window title
    #[arg(long)]
    pub title: Option<String>,

    /// Graphics backend
    #[arg(long, value_enum)]
    pub renderer: Option<RendererBackend>,

    /// Present without waiting for vertical sync
    #[arg(long)]
    pub no_vsync: bool,

    /// Enable diagnostic logging for a category (repeatable)
    #[arg(long, value_enum)]
    pub verbose: Vec<VerboseCategory>,

    /// Configuration file (default: rendertest.toml in the config directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Extra directory to search for assets (repeatable)
    #[arg(long = "asset-dir", value_name = "DIR")]
    pub asset_dirs: Vec<PathBuf>,

    /// Loop driver
    #[arg(long, value_enum)]
    pub drive: Option<DriveMode>,
}

/// Per-program defaults, overridden by explicit flags
#[derive(Debug, Clone)]
pub struct CommonDefaults {
    pub title: String,
    pub renderer: RendererBackend,
    /// Always enabled; `--verbose` adds to these
    pub verbose: VerboseFlags,
    /// Searched after `--asset-dir` and the config's paths
    pub asset_dirs: Vec<PathBuf>,
}

impl Default for CommonDefaults {
    fn default() -> Self {
        Self {
            title: "rendertest".to_string(),
            renderer: RendererBackend::default(),
            verbose: VerboseFlags::empty(),
            asset_dirs: Vec::new(),
        }
    }
}

/// Fully resolved options used to build the common state
#[derive(Debug, Clone, PartialEq)]
pub struct CommonOptions {
    pub windows: usize,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub renderer: RendererBackend,
    pub vsync: bool,
    pub verbose: VerboseFlags,
    pub asset_dirs: Vec<PathBuf>,
    pub drive: DriveMode,
}

impl Default for CommonOptions {
    fn default() -> Self {
        CommonArgs::default().resolve(&CommonDefaults::default(), &Config::default())
    }
}

impl CommonArgs {
    /// Load the config file named by `--config`, or the default one.
    ///
    /// Only an explicitly named file is an error when missing or malformed.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        match &self.config {
            Some(path) => config::load_from(path),
            None => Ok(config::load()),
        }
    }

    pub fn resolve(&self, defaults: &CommonDefaults, config: &Config) -> CommonOptions {
        let (width, height) = match self.geometry {
            Some(g) => (g.width, g.height),
            None => (config.video.width, config.video.height),
        };

        let verbose = self
            .verbose
            .iter()
            .fold(defaults.verbose, |flags, category| flags | category.flag());

        let asset_dirs = self
            .asset_dirs
            .iter()
            .chain(&config.assets.search_paths)
            .chain(&defaults.asset_dirs)
            .cloned()
            .collect();

        CommonOptions {
            windows: self.windows.unwrap_or(1).max(1) as usize,
            width,
            height,
            title: self.title.clone().unwrap_or_else(|| defaults.title.clone()),
            renderer: self.renderer.unwrap_or(defaults.renderer),
            vsync: config.video.vsync && !self.no_vsync,
            verbose,
            asset_dirs,
            drive: self.drive.unwrap_or_default(),
        }
    }
}

impl CommonOptions {
    pub fn is_verbose(&self, flags: VerboseFlags) -> bool {
        self.verbose.contains(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        common: CommonArgs,
    }

    fn parse(args: &[&str]) -> CommonArgs {
        TestCli::try_parse_from(std::iter::once("test").chain(args.iter().copied()))
            .unwrap()
            .common
    }

    #[test]
    fn test_geometry_parse() {
        assert_eq!(
            "800x600".parse::<Geometry>(),
            Ok(Geometry {
                width: 800,
                height: 600
            })
        );
        assert!("800".parse::<Geometry>().is_err());
        assert!("0x600".parse::<Geometry>().is_err());
        assert!("axb".parse::<Geometry>().is_err());
    }

    #[test]
    fn test_defaults_without_flags() {
        let defaults = CommonDefaults {
            renderer: RendererBackend::Vulkan,
            verbose: VerboseFlags::RENDER,
            ..Default::default()
        };
        let options = parse(&[]).resolve(&defaults, &Config::default());

        assert_eq!(options.windows, 1);
        assert_eq!((options.width, options.height), (640, 480));
        assert_eq!(options.renderer, RendererBackend::Vulkan);
        assert_eq!(options.verbose, VerboseFlags::RENDER);
        assert!(options.vsync);
        assert_eq!(options.drive, DriveMode::Blocking);
    }

    #[test]
    fn test_flags_override_defaults() {
        let defaults = CommonDefaults {
            renderer: RendererBackend::Vulkan,
            verbose: VerboseFlags::RENDER,
            ..Default::default()
        };
        let args = parse(&[
            "--renderer",
            "gl",
            "--verbose",
            "event",
            "--verbose",
            "video",
            "--windows",
            "3",
            "--geometry",
            "320x200",
            "--no-vsync",
            "--drive",
            "scheduled",
        ]);
        let options = args.resolve(&defaults, &Config::default());

        assert_eq!(options.renderer, RendererBackend::Gl);
        // Categories are unioned with the program's defaults
        assert_eq!(
            options.verbose,
            VerboseFlags::RENDER | VerboseFlags::EVENT | VerboseFlags::VIDEO
        );
        assert_eq!(options.windows, 3);
        assert_eq!((options.width, options.height), (320, 200));
        assert!(!options.vsync);
        assert_eq!(options.drive, DriveMode::Scheduled);
    }

    #[test]
    fn test_zero_windows_rejected() {
        let result = TestCli::try_parse_from(["test", "--windows", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_asset_dir_order() {
        let mut config = Config::default();
        config.assets.search_paths = vec![PathBuf::from("from-config")];
        let defaults = CommonDefaults {
            asset_dirs: vec![PathBuf::from("builtin")],
            ..Default::default()
        };
        let options = parse(&["--asset-dir", "from-cli"]).resolve(&defaults, &config);
        assert_eq!(
            options.asset_dirs,
            vec![
                PathBuf::from("from-cli"),
                PathBuf::from("from-config"),
                PathBuf::from("builtin"),
            ]
        );
    }

    #[test]
    fn test_config_geometry_and_vsync() {
        let mut config = Config::default();
        config.video.width = 1024;
        config.video.height = 768;
        config.video.vsync = false;
        let options = parse(&[]).resolve(&CommonDefaults::default(), &config);
        assert_eq!((options.width, options.height), (1024, 768));
        assert!(!options.vsync);
    }
}
