// SPDX-FileCopyrightText: 2024 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Generation of the boot files for an OpenPiton + Ariane platform: the
//! device tree source and the banner header printed by the bootrom.

pub mod banner;
pub mod build_utils;
pub mod config;
pub mod dts;
pub mod error;
pub mod input_language;
pub mod inventory;
pub mod params;
pub mod reg_cells;
pub mod version;

use tracing::debug;

pub use crate::banner::generate_info_header;
pub use crate::dts::generate_dts;
pub use crate::error::{Error, Result};
pub use crate::input_language::{parse, parse_xml, DeviceDesc, DeviceInventory};
pub use crate::inventory::Inventory;
pub use crate::params::PlatformParams;

/// The two documents produced by one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub dts: String,
    pub info_header: String,
}

/// Run both generators over the same inputs.
///
/// Either both documents are produced or an error is returned.
pub fn generate(devices: &[DeviceDesc], params: &PlatformParams) -> Result<GeneratedFiles> {
    let dts = generate_dts(devices, params)?;
    let memory_size = Inventory::new(devices).memory_size();
    debug!("main memory is {memory_size} bytes");
    let info_header = generate_info_header(params, memory_size);

    Ok(GeneratedFiles { dts, info_header })
}
