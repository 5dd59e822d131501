// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Platform configuration from the build environment.

use std::{collections::HashMap, env, path::PathBuf, str::FromStr};

use tracing::debug;

use crate::{
    error::{Error, Result},
    params::{CacheGeometry, CacheLevel, PlatformParams, Versions},
};

/// Format of the build timestamp in both generated files.
pub const TIMESTAMP_FORMAT: &str = "%b %d %Y %H:%M:%S";

/// Location of the generated files relative to the platform root.
const BOOTROM_DIR: &str = "design/chipset/rv64_platform/bootrom";

/// Everything read from the environment for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    pub num_cores: usize,
    pub x_tiles: u32,
    pub y_tiles: u32,
    pub network_config: String,
    pub sys_freq_hz: Option<u64>,
    pub board_name: Option<String>,
    pub caches: CacheGeometry,
    /// Root of the platform checkout.
    pub platform_root: Option<PathBuf>,
    /// Root of the core complex checkout.
    pub core_root: Option<PathBuf>,
}

impl PlatformConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Read the configuration through `lookup`, which returns the value of a
    /// variable or `None` when it is not set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let vars = Vars { lookup: &lookup };

        let num_cores = vars.required("PITON_NUM_TILES")?;
        if num_cores < 1 {
            return Err(Error::Configuration(
                "PITON_NUM_TILES must be at least 1".to_string(),
            ));
        }

        let cache = |level: &str| -> Result<CacheLevel> {
            Ok(CacheLevel {
                size_bytes: vars.required(&format!("CONFIG_{level}_SIZE"))?,
                associativity: vars.required(&format!("CONFIG_{level}_ASSOCIATIVITY"))?,
            })
        };

        let config = PlatformConfig {
            num_cores,
            x_tiles: vars.required("PITON_X_TILES")?,
            y_tiles: vars.required("PITON_Y_TILES")?,
            network_config: vars.required_str("PITON_NETWORK_CONFIG")?,
            sys_freq_hz: vars.optional("CONFIG_SYS_FREQ")?,
            // An empty board name counts as unset.
            board_name: lookup("PROTOSYN_RUNTIME_BOARD").filter(|name| !name.is_empty()),
            caches: CacheGeometry {
                l1i: cache("L1I")?,
                l1d: cache("L1D")?,
                l15: cache("L15")?,
                l2: cache("L2")?,
            },
            platform_root: lookup("DV_ROOT").map(PathBuf::from),
            core_root: lookup("ARIANE_ROOT").map(PathBuf::from),
        };
        debug!("platform configuration: {config:?}");

        Ok(config)
    }

    /// Where the generated files go when no directory is given explicitly.
    pub fn default_out_dir(&self) -> Option<PathBuf> {
        self.platform_root
            .as_ref()
            .map(|root| root.join(BOOTROM_DIR))
    }

    /// Combine the configuration with the values only known at generation
    /// time into the parameters the generators take.
    pub fn into_params(self, versions: Versions, timestamp: String) -> PlatformParams {
        let mut params = PlatformParams::with_sys_freq(self.num_cores, self.sys_freq_hz);
        params.board_name = self.board_name;
        params.timestamp = timestamp;
        params.x_tiles = self.x_tiles;
        params.y_tiles = self.y_tiles;
        params.network_config = self.network_config;
        params.versions = versions;
        params.caches = self.caches;
        params
    }
}

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn build_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

struct Vars<'a, F: Fn(&str) -> Option<String>> {
    lookup: &'a F,
}

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn required_str(&self, key: &str) -> Result<String> {
        (self.lookup)(key)
            .ok_or_else(|| Error::Configuration(format!("{key} is not set")))
    }

    fn required<T: FromStr>(&self, key: &str) -> Result<T>
    where
        T::Err: std::fmt::Display,
    {
        let value = self.required_str(key)?;
        parse_var(key, &value)
    }

    fn optional<T: FromStr>(&self, key: &str) -> Result<Option<T>>
    where
        T::Err: std::fmt::Display,
    {
        (self.lookup)(key)
            .map(|value| parse_var(key, &value))
            .transpose()
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|err| Error::Configuration(format!("{key}={value:?} is malformed: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> HashMap<String, String> {
        [
            ("PITON_NUM_TILES", "4"),
            ("PITON_X_TILES", "2"),
            ("PITON_Y_TILES", "2"),
            ("PITON_NETWORK_CONFIG", "2dmesh_config"),
            ("CONFIG_L1I_SIZE", "16384"),
            ("CONFIG_L1I_ASSOCIATIVITY", "4"),
            ("CONFIG_L1D_SIZE", "8192"),
            ("CONFIG_L1D_ASSOCIATIVITY", "4"),
            ("CONFIG_L15_SIZE", "8192"),
            ("CONFIG_L15_ASSOCIATIVITY", "4"),
            ("CONFIG_L2_SIZE", "65536"),
            ("CONFIG_L2_ASSOCIATIVITY", "4"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn defaults_when_optional_values_are_unset() {
        let config = PlatformConfig::from_map(&vars()).unwrap();
        assert_eq!(config.num_cores, 4);
        assert_eq!(config.sys_freq_hz, None);
        assert_eq!(config.board_name, None);
        assert_eq!(config.default_out_dir(), None);
        assert_eq!(config.caches.l2.size_bytes, 65536);

        let params = config.into_params(Versions::default(), "now".to_string());
        assert_eq!(params.core_freq_hz, 50_000_000);
        assert_eq!(params.timebase_freq_hz, 50_000_000 / 128);
        assert_eq!(params.configured_freq_hz, None);
        assert_eq!(params.timestamp, "now");
    }

    #[test]
    fn reads_optional_values() {
        let mut vars = vars();
        vars.insert("CONFIG_SYS_FREQ".to_string(), "100000000".to_string());
        vars.insert("PROTOSYN_RUNTIME_BOARD".to_string(), "genesys2".to_string());
        vars.insert("DV_ROOT".to_string(), "/work/piton".to_string());

        let config = PlatformConfig::from_map(&vars).unwrap();
        assert_eq!(config.sys_freq_hz, Some(100_000_000));
        assert_eq!(config.board_name.as_deref(), Some("genesys2"));
        assert_eq!(
            config.default_out_dir(),
            Some(PathBuf::from("/work/piton/design/chipset/rv64_platform/bootrom"))
        );

        let params = config.into_params(Versions::default(), String::new());
        assert_eq!(params.periph_freq_hz, 100_000_000);
        assert_eq!(params.configured_freq_hz, Some(100_000_000));
    }

    #[test]
    fn empty_board_is_unset() {
        let mut vars = vars();
        vars.insert("PROTOSYN_RUNTIME_BOARD".to_string(), String::new());
        let config = PlatformConfig::from_map(&vars).unwrap();
        assert_eq!(config.board_name, None);
    }

    #[test]
    fn missing_required_value() {
        let mut vars = vars();
        vars.remove("PITON_X_TILES");
        let err = PlatformConfig::from_map(&vars).unwrap_err();
        assert!(matches!(err, Error::Configuration(msg) if msg.contains("PITON_X_TILES")));
    }

    #[test]
    fn malformed_values() {
        let mut vars = vars();
        vars.insert("CONFIG_SYS_FREQ".to_string(), "fast".to_string());
        assert!(matches!(
            PlatformConfig::from_map(&vars),
            Err(Error::Configuration(_))
        ));

        let mut vars = self::vars();
        vars.insert("PITON_NUM_TILES".to_string(), "0".to_string());
        assert!(matches!(
            PlatformConfig::from_map(&vars),
            Err(Error::Configuration(_))
        ));
    }
}
