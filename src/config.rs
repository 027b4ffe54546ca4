use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::display::font::DEFAULT_FONT;
use crate::display::layout::Orientation;
use crate::display::renderer::DEFAULT_SETTLE_TIME;
use crate::display::traits::RefreshMode;

/// Text shown by the default scene
pub const DEFAULT_MESSAGE: &str = "Hello Arkkeys!";

const MAX_SETTLE_MS: u64 = 60_000;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration. Every field is optional so layers merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub display: Option<DisplayConfig>,
    pub text: Option<TextConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    pub driver: Option<DriverKind>,
    pub orientation: Option<Orientation>,
    pub refresh: Option<RefreshMode>,
    pub settle_ms: Option<u64>,
    pub bus: Option<SpiBusConfig>,
    /// mock only: native size and where to dump frames
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pbm_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TextConfig {
    pub message: Option<String>,
    pub font: Option<String>,
}

/// SPI + GPIO wiring, defaults match the Waveshare HAT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiBusConfig {
    pub bus: String,        // e.g. "/dev/spidev0.0"
    pub speed_hz: u32,
    pub gpio_chip: String,  // e.g. "/dev/gpiochip0"
    pub dc_pin: u32,        // BCM numbering
    pub rst_pin: u32,
    pub busy_pin: u32,
}

impl Default for SpiBusConfig {
    fn default() -> Self {
        Self {
            bus: "/dev/spidev0.0".to_string(),
            speed_hz: 4_000_000,
            gpio_chip: "/dev/gpiochip0".to_string(),
            dc_pin: 25,
            rst_pin: 17,
            busy_pin: 24,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    /// Waveshare 2.13" V4 on SPI
    #[default]
    #[value(name = "epd2in13_v4")]
    Epd2in13V4,
    /// In-memory panel, optionally dumping frames as PBM
    Mock,
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "arkeys-eink", version, about = "ARKeys e-ink panel renderer")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    /// Enable debug log level
    #[arg(short = 'v', long = "debug", alias = "verbose", action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long, value_enum)]
    pub driver: Option<DriverKind>,
    #[arg(long, value_enum)]
    pub orientation: Option<Orientation>,
    #[arg(long, value_enum)]
    pub refresh: Option<RefreshMode>,
    #[arg(long)]
    pub settle_ms: Option<u64>,
    #[arg(long)]
    pub message: Option<String>,
    #[arg(long)]
    pub font: Option<String>,
    /// mock driver: write each displayed frame to this PBM file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub pbm: Option<PathBuf>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
    #[command(subcommand)]
    pub scene: Option<Scene>,
}

/// What to put on the panel; `hello` when omitted
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Scene {
    /// Centered message, then sleep
    Hello,
    /// Seven-segment digits 0 to 9
    Segments {
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
    /// Tracker layout with random typing data
    Tracker {
        #[arg(long, default_value_t = 5)]
        iterations: u32,
        #[arg(long, default_value_t = 2000)]
        interval_ms: u64,
    },
    /// Typing metrics home screen from a simulated feed
    Metrics {
        #[arg(long, default_value_t = 30)]
        frames: u32,
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
    },
}

impl Config {
    pub fn from_yaml_str(s: &str) -> Result<Config, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    fn display_cfg(&self) -> DisplayConfig {
        self.display.clone().unwrap_or_default()
    }

    pub fn driver(&self) -> DriverKind {
        self.display_cfg().driver.unwrap_or_default()
    }

    pub fn orientation(&self) -> Orientation {
        self.display_cfg().orientation.unwrap_or_default()
    }

    pub fn refresh(&self) -> RefreshMode {
        self.display_cfg().refresh.unwrap_or_default()
    }

    pub fn settle_time(&self) -> Duration {
        self.display_cfg().settle_ms.map(Duration::from_millis).unwrap_or(DEFAULT_SETTLE_TIME)
    }

    pub fn bus(&self) -> SpiBusConfig {
        self.display_cfg().bus.unwrap_or_default()
    }

    pub fn message(&self) -> String {
        self.text.as_ref()
            .and_then(|t| t.message.clone())
            .unwrap_or_else(|| DEFAULT_MESSAGE.to_string())
    }

    pub fn font(&self) -> String {
        self.text.as_ref()
            .and_then(|t| t.font.clone())
            .unwrap_or_else(|| DEFAULT_FONT.to_string())
    }

    /// Effective config as YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Public entry point: read YAML, merge CLI, validate.
pub fn load(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/arkeys/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/arkeys/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/arkeys.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["arkeys.yaml", "config.yaml", "config/arkeys.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    Config::from_yaml_str(&s)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
pub fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
    match (&mut dst.text, src.text) {
        (None, Some(t)) => dst.text = Some(t),
        (Some(d), Some(s)) => {
            if s.message.is_some() { d.message = s.message; }
            if s.font.is_some()    { d.font = s.font; }
        }
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.driver.is_some()      { dst.driver = src.driver; }
    if src.orientation.is_some() { dst.orientation = src.orientation; }
    if src.refresh.is_some()     { dst.refresh = src.refresh; }
    if src.settle_ms.is_some()   { dst.settle_ms = src.settle_ms; }
    if src.bus.is_some()         { dst.bus = src.bus; }
    if src.width.is_some()       { dst.width = src.width; }
    if src.height.is_some()      { dst.height = src.height; }
    if src.pbm_path.is_some()    { dst.pbm_path = src.pbm_path; }
}

pub fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.debug               { cfg.log_level = Some("debug".to_string()); }

    let any_display = cli.driver.is_some()
        || cli.orientation.is_some()
        || cli.refresh.is_some()
        || cli.settle_ms.is_some()
        || cli.pbm.is_some();
    if any_display {
        let display = cfg.display.get_or_insert_with(DisplayConfig::default);
        if cli.driver.is_some()      { display.driver = cli.driver; }
        if cli.orientation.is_some() { display.orientation = cli.orientation; }
        if cli.refresh.is_some()     { display.refresh = cli.refresh; }
        if cli.settle_ms.is_some()   { display.settle_ms = cli.settle_ms; }
        if cli.pbm.is_some()         { display.pbm_path = cli.pbm.clone(); }
    }

    if cli.message.is_some() || cli.font.is_some() {
        let text = cfg.text.get_or_insert_with(TextConfig::default);
        if cli.message.is_some() { text.message = cli.message.clone(); }
        if cli.font.is_some()    { text.font = cli.font.clone(); }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(filter) = cfg.log_level.as_deref() {
        validate_log_filter(filter)?;
    }
    if let Some(display) = cfg.display.as_ref() {
        if display.width == Some(0) || display.height == Some(0) {
            return Err(ConfigError::Validation("display width/height must be > 0".into()));
        }
        if let Some(ms) = display.settle_ms {
            if ms > MAX_SETTLE_MS {
                return Err(ConfigError::Validation(format!(
                    "display settle_ms must be <= {}", MAX_SETTLE_MS
                )));
            }
        }
        if let Some(bus) = display.bus.as_ref() {
            if bus.speed_hz == 0 {
                return Err(ConfigError::Validation("display bus speed_hz must be > 0".into()));
            }
            let pins = [bus.dc_pin, bus.rst_pin, bus.busy_pin];
            if pins[0] == pins[1] || pins[0] == pins[2] || pins[1] == pins[2] {
                return Err(ConfigError::Validation(
                    "display bus dc_pin, rst_pin and busy_pin must differ".into(),
                ));
            }
        }
    }
    Ok(())
}

/// Check the `module=level` parts of an env_logger filter such as
/// `arkeys_eink=debug,warn`. A bare word is either a level or a module name,
/// and anything after `/` is a message regex, so neither is checked here.
fn validate_log_filter(filter: &str) -> Result<(), ConfigError> {
    let directives = filter.split('/').next().unwrap_or_default();
    for directive in directives.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        if let Some((module, level)) = directive.split_once('=') {
            if module.trim().is_empty() || level.trim().parse::<log::LevelFilter>().is_err() {
                return Err(ConfigError::Validation(format!(
                    "bad log_level directive '{}'", directive
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["arkeys-eink"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.driver(), DriverKind::Epd2in13V4);
        assert_eq!(cfg.orientation(), Orientation::Swapped);
        assert_eq!(cfg.refresh(), RefreshMode::Full);
        assert_eq!(cfg.settle_time(), Duration::from_secs(2));
        assert_eq!(cfg.message(), "Hello Arkkeys!");
        assert_eq!(cfg.font(), "7x13");
        assert_eq!(cfg.bus().dc_pin, 25);
    }

    #[test]
    fn test_no_arguments_means_hello_with_defaults() {
        let cli = cli(&[]);
        assert_eq!(cli.scene, None);
        let mut cfg = Config::default();
        apply_cli_overrides(&mut cfg, &cli);
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_yaml_parse() {
        let cfg = Config::from_yaml_str(
            r#"
log_level: debug
display:
  driver: mock
  orientation: native
  refresh: partial
  settle_ms: 500
  bus:
    bus: /dev/spidev0.1
    busy_pin: 5
text:
  message: Hi
"#,
        ).unwrap();

        assert_eq!(cfg.driver(), DriverKind::Mock);
        assert_eq!(cfg.orientation(), Orientation::Native);
        assert_eq!(cfg.refresh(), RefreshMode::Partial);
        assert_eq!(cfg.settle_time(), Duration::from_millis(500));
        let bus = cfg.bus();
        assert_eq!(bus.bus, "/dev/spidev0.1");
        assert_eq!(bus.busy_pin, 5);
        assert_eq!(bus.rst_pin, 17); // untouched fields keep HAT defaults
        assert_eq!(cfg.message(), "Hi");
        assert_eq!(cfg.font(), "7x13");
    }

    #[test]
    fn test_cli_overrides_yaml() {
        let mut cfg = Config::from_yaml_str("display:\n  driver: epd2in13_v4\n  settle_ms: 100\n").unwrap();
        let cli = cli(&["--driver", "mock", "--message", "Yo", "-v", "--pbm", "/tmp/x.pbm"]);
        apply_cli_overrides(&mut cfg, &cli);

        assert_eq!(cfg.driver(), DriverKind::Mock);
        assert_eq!(cfg.settle_time(), Duration::from_millis(100));
        assert_eq!(cfg.message(), "Yo");
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        assert_eq!(cfg.display.unwrap().pbm_path, Some(PathBuf::from("/tmp/x.pbm")));
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut dst = Config::from_yaml_str("text:\n  message: A\n  font: 10x20\n").unwrap();
        merge(&mut dst, Config::from_yaml_str("text:\n  message: B\n").unwrap());
        assert_eq!(dst.message(), "B");
        assert_eq!(dst.font(), "10x20");
    }

    #[test]
    fn test_scene_subcommands() {
        assert_eq!(cli(&["segments"]).scene, Some(Scene::Segments { interval_ms: 1000 }));
        assert_eq!(
            cli(&["tracker", "--iterations", "2"]).scene,
            Some(Scene::Tracker { iterations: 2, interval_ms: 2000 })
        );
    }

    #[test]
    fn test_validation() {
        let bad = [
            "log_level: arkeys_eink=chatty\n",
            "log_level: =debug\n",
            "display:\n  width: 0\n",
            "display:\n  settle_ms: 120000\n",
            "display:\n  bus:\n    dc_pin: 24\n",
            "display:\n  bus:\n    speed_hz: 0\n",
        ];
        for yaml in bad {
            let cfg = Config::from_yaml_str(yaml).unwrap();
            assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))), "{}", yaml);
        }
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_log_level_accepts_env_logger_filters() {
        for filter in ["debug", "arkeys_eink=debug,warn", "arkeys_eink", "info,arkeys_eink::display=trace/frame"] {
            let cfg = Config { log_level: Some(filter.to_string()), ..Default::default() };
            assert!(validate(&cfg).is_ok(), "{}", filter);
        }
    }

    #[test]
    fn test_missing_explicit_config_file() {
        let cli = cli(&["--config", "/nonexistent/arkeys.yaml"]);
        assert!(matches!(load(&cli), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_dump_round_trips() {
        let cfg = Config::from_yaml_str("display:\n  driver: mock\n").unwrap();
        let yaml = cfg.to_yaml().unwrap();
        assert_eq!(Config::from_yaml_str(&yaml).unwrap(), cfg);
    }
}
