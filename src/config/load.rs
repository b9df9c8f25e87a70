use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file and then applies environment
/// overrides (prefix `NEUROPLAYER`), falling back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("NEUROPLAYER")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        let fft = self.analysis.fft_size;
        if !fft.is_power_of_two() || !(64..=32768).contains(&fft) {
            return Err(format!(
                "analysis.fft_size must be a power of two in 64..=32768 (got {fft})"
            ));
        }
        if !(0.0..1.0).contains(&self.analysis.smoothing) {
            return Err("analysis.smoothing must be in [0, 1)".to_string());
        }
        if self.analysis.min_db >= self.analysis.max_db {
            return Err("analysis.min_db must be lower than analysis.max_db".to_string());
        }
        for (name, [lo, hi]) in [
            ("bass_bins", self.analysis.bass_bins),
            ("mid_bins", self.analysis.mid_bins),
        ] {
            if lo >= hi || hi > self.analysis.bins() {
                return Err(format!("analysis.{name} must be a non-empty range within the spectrum"));
            }
        }
        if self.playlist.page_size == 0 {
            return Err("playlist.page_size must be >= 1".to_string());
        }
        if self.audio.initial_volume > 100 {
            return Err("audio.initial_volume must be <= 100".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `NEUROPLAYER_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("NEUROPLAYER_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/neuroplayer/config.toml`
/// or `~/.config/neuroplayer/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("neuroplayer").join("config.toml"))
}
