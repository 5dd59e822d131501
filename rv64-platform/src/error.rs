// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

/// Everything that can stop a generation run.
///
/// None of these are retried. A run either produces both documents or none.
#[derive(Debug, Error)]
pub enum Error {
    /// A platform parameter is missing or malformed and has no default.
    #[error("invalid platform configuration: {0}")]
    Configuration(String),

    /// The interrupt sources counted up front do not match the interrupt
    /// numbers handed out while emitting peripheral nodes.
    #[error(
        "interrupt routing mismatch: counted {counted} interrupt sources, \
         assigned {assigned} interrupt numbers"
    )]
    Consistency { counted: usize, assigned: usize },

    #[error("cell count must be 0, 1 or 2, got {cells}")]
    MalformedCellCount { cells: u32 },

    #[error("failed to parse device inventory: {0}")]
    Inventory(#[from] serde_json::Error),

    #[error("failed to parse device inventory XML: {0}")]
    InventoryXml(#[from] quick_xml::DeError),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not determine version of {}: {reason}", path.display())]
    Version { path: PathBuf, reason: String },

    #[error("formatting failed")]
    Format(#[from] fmt::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
