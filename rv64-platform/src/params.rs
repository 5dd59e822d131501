// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};

/// Frequency used when the platform does not configure one.
pub const DEFAULT_SYS_FREQ_HZ: u64 = 50_000_000;

/// The timebase runs at the system frequency divided by this.
pub const TIMEBASE_DIVIDER: u64 = 128;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Versions {
    pub platform: String,
    pub core_complex: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheLevel {
    pub size_bytes: u64,
    pub associativity: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheGeometry {
    pub l1i: CacheLevel,
    pub l1d: CacheLevel,
    pub l15: CacheLevel,
    pub l2: CacheLevel,
}

/// Everything the generators need to know about the platform besides its
/// device list. Built once per run and passed around as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformParams {
    pub num_cores: usize,
    pub core_freq_hz: u64,
    pub timebase_freq_hz: u64,
    pub periph_freq_hz: u64,
    /// The system frequency as configured, `None` when the default was used.
    pub configured_freq_hz: Option<u64>,
    pub board_name: Option<String>,
    pub timestamp: String,
    pub x_tiles: u32,
    pub y_tiles: u32,
    pub network_config: String,
    pub versions: Versions,
    pub caches: CacheGeometry,
}

impl PlatformParams {
    /// Parameters for a platform running every clock from `sys_freq_hz`.
    pub fn with_sys_freq(num_cores: usize, sys_freq_hz: Option<u64>) -> Self {
        let freq = sys_freq_hz.unwrap_or(DEFAULT_SYS_FREQ_HZ);
        PlatformParams {
            num_cores,
            core_freq_hz: freq,
            timebase_freq_hz: freq / TIMEBASE_DIVIDER,
            periph_freq_hz: freq,
            configured_freq_hz: sys_freq_hz,
            board_name: None,
            timestamp: String::new(),
            x_tiles: 1,
            y_tiles: 1,
            network_config: String::new(),
            versions: Versions::default(),
            caches: CacheGeometry::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_cores < 1 {
            return Err(Error::Configuration(format!(
                "the platform needs at least one core, got {}",
                self.num_cores
            )));
        }
        Ok(())
    }
}
