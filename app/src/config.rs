use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use camino::{Utf8Path, Utf8PathBuf};
use filmfluency_core::filter::{DEFAULT_MAX_SCORE, DEFAULT_MIN_WORDS};

use crate::ffmpeg::{FFMpegBinary, DEFAULT_SCREENSHOT_OFFSET};

const QUALIFIER: &str = "io";
const ORGANIZATION: &str = "filmfluency";
const APP: &str = "filmfluency";
const APP_CAPS: &str = "FILMFLUENCY";

const FFMPEG_CMD_KEY: &str = "ffmpeg";
const OUTPUT_ROOT_KEY: &str = "output_root";
const MIN_WORDS_KEY: &str = "min_words";
const MAX_SCORE_KEY: &str = "max_score";
const SCREENSHOT_OFFSET_KEY: &str = "screenshot_offset_secs";

const DEFAULT_CONFIG_FILE: &str = "filmfluency.toml";

type ExtConfigBuilder = config::ConfigBuilder<config::builder::DefaultState>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    ConfigError(#[from] config::ConfigError),
    #[error("unable to get user home directory")]
    NoUserHome,
    #[error("path is not utf8: {:?}", _0)]
    NonUtf8Path(PathBuf),
    #[error("invalid value for `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

fn camino_path(std_path: &Path) -> Result<&Utf8Path, ConfigError> {
    Utf8Path::from_path(std_path).ok_or_else(|| ConfigError::NonUtf8Path(std_path.to_path_buf()))
}

fn new_config_builder() -> Result<ExtConfigBuilder, ConfigError> {
    Ok(config::Config::builder()
        .set_default(FFMPEG_CMD_KEY, Option::<&str>::None)?
        .set_default(OUTPUT_ROOT_KEY, ".")?
        .set_default(MIN_WORDS_KEY, DEFAULT_MIN_WORDS as i64)?
        .set_default(MAX_SCORE_KEY, DEFAULT_MAX_SCORE)?
        .set_default(
            SCREENSHOT_OFFSET_KEY,
            DEFAULT_SCREENSHOT_OFFSET.as_secs_f64(),
        )?)
}

/// Layers defaults, an optional toml file, `FILMFLUENCY_*` environment
/// variables and command line overrides, in that order.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config_dir: Option<Utf8PathBuf>,
    config_path: Option<Utf8PathBuf>,
    load_environment: bool,
    config_builder: ExtConfigBuilder,
}

impl ConfigBuilder {
    /// Builder that looks for `filmfluency.toml` in the user config directory.
    pub fn new_with_user_dirs() -> Result<Self, ConfigError> {
        let dirs = directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, APP)
            .ok_or(ConfigError::NoUserHome)?;
        let config_dir = camino_path(dirs.config_dir())?.to_path_buf();
        Ok(Self {
            config_dir: Some(config_dir),
            ..Self::new()?
        })
    }

    /// Builder with only the built-in defaults.
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            config_dir: None,
            config_path: None,
            load_environment: false,
            config_builder: new_config_builder()?,
        })
    }

    /// Should we load configuration from the environment?
    pub fn load_environment(mut self, load_environment: bool) -> Self {
        self.load_environment = load_environment;
        self
    }

    fn set_path_override(mut self, key: &str, path: Option<&Path>) -> Result<Self, ConfigError> {
        let path_override = path.map(camino_path).transpose()?;
        let str_override = path_override.as_ref().map(|c| c.as_str());
        self.config_builder = self
            .config_builder
            .set_override_option(key, str_override)?;
        Ok(self)
    }

    pub fn config_file(mut self, config_file: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(p) = config_file {
            self.config_path = Some(camino_path(p)?.to_path_buf());
        }
        Ok(self)
    }

    pub fn output_root(self, output_root: Option<&Path>) -> Result<Self, ConfigError> {
        self.set_path_override(OUTPUT_ROOT_KEY, output_root)
    }

    pub fn ffmpeg_override(self, ffmpeg: Option<&Path>) -> Result<Self, ConfigError> {
        self.set_path_override(FFMPEG_CMD_KEY, ffmpeg)
    }

    pub fn build(mut self) -> Result<FilmFluencyConfig, ConfigError> {
        let cfg_file = self
            .config_path
            .take()
            .or_else(|| self.config_dir.as_ref().map(|d| d.join(DEFAULT_CONFIG_FILE)));

        if let Some(cfg_file) = cfg_file {
            if cfg_file.exists() {
                log::debug!("loading config file {}", cfg_file);
                self.config_builder = self
                    .config_builder
                    .add_source(config::File::from(cfg_file.as_std_path()));
            } else {
                log::trace!("no config file at {}", cfg_file);
            }
        }

        if self.load_environment {
            self.config_builder = self
                .config_builder
                .add_source(config::Environment::with_prefix(APP_CAPS))
        }

        let cfg = FilmFluencyConfig {
            inner: self.config_builder.build()?,
        };
        cfg.validate()?;
        log::trace!("{:#?}", cfg);
        Ok(cfg)
    }
}

#[derive(Debug, Clone)]
pub struct FilmFluencyConfig {
    inner: config::Config,
}

impl FilmFluencyConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.min_words()?;
        self.max_score()?;
        self.screenshot_offset()?;
        self.ffmpeg()?;
        Ok(())
    }

    pub fn ffmpeg(&self) -> Result<FFMpegBinary, ConfigError> {
        Ok(match self.inner.get::<Option<String>>(FFMPEG_CMD_KEY)? {
            Some(s) => FFMpegBinary::new(s),
            None => FFMpegBinary::default(),
        })
    }

    pub fn output_root(&self) -> Result<PathBuf, ConfigError> {
        Ok(PathBuf::from(self.inner.get_string(OUTPUT_ROOT_KEY)?))
    }

    pub fn min_words(&self) -> Result<usize, ConfigError> {
        let v = self.inner.get_int(MIN_WORDS_KEY)?;
        usize::try_from(v).map_err(|_| ConfigError::InvalidValue {
            key: MIN_WORDS_KEY,
            reason: format!("{} is negative", v),
        })
    }

    pub fn max_score(&self) -> Result<f64, ConfigError> {
        let v = self.inner.get_float(MAX_SCORE_KEY)?;
        if v.is_nan() {
            return Err(ConfigError::InvalidValue {
                key: MAX_SCORE_KEY,
                reason: "not a number".to_owned(),
            });
        }
        Ok(v)
    }

    pub fn screenshot_offset(&self) -> Result<Duration, ConfigError> {
        let v = self.inner.get_float(SCREENSHOT_OFFSET_KEY)?;
        Duration::try_from_secs_f64(v).map_err(|e| ConfigError::InvalidValue {
            key: SCREENSHOT_OFFSET_KEY,
            reason: e.to_string(),
        })
    }
}
