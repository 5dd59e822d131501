// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Encoding of `reg` properties into 32-bit cells.

use crate::error::{Error, Result};

/// Number of 32-bit cells used for one half of a `reg` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cells {
    Zero,
    One,
    Two,
}

impl TryFrom<u32> for Cells {
    type Error = Error;

    fn try_from(cells: u32) -> Result<Self> {
        match cells {
            0 => Ok(Cells::Zero),
            1 => Ok(Cells::One),
            2 => Ok(Cells::Two),
            cells => Err(Error::MalformedCellCount { cells }),
        }
    }
}

impl Cells {
    /// Split `value` into this many cells, most significant first.
    fn split(self, value: u64) -> impl Iterator<Item = u32> {
        let hi = (value >> 32) as u32;
        let lo = value as u32;
        let cells = match self {
            Cells::Zero => vec![],
            Cells::One => vec![lo],
            Cells::Two => vec![hi, lo],
        };
        cells.into_iter()
    }
}

/// The cells of a `reg` entry: address cells followed by size cells.
pub fn reg_cells(base: u64, length: u64, address: Cells, size: Cells) -> Vec<u32> {
    address.split(base).chain(size.split(length)).collect()
}

/// Format a `reg` entry as it appears between `<` and `>`.
///
/// Every cell is printed as `0x%08x` and preceded by a single space, so an
/// entry without any cells is the empty string.
#[must_use]
pub fn reg_fmt(base: u64, length: u64, address: Cells, size: Cells) -> String {
    reg_cells(base, length, address, size)
        .into_iter()
        .map(|cell| format!(" 0x{cell:08x}"))
        .collect()
}

/// Like [`reg_fmt`], but with unchecked cell counts.
pub fn encode(base: u64, length: u64, address_cells: u32, size_cells: u32) -> Result<String> {
    let address = Cells::try_from(address_cells)?;
    let size = Cells::try_from(size_cells)?;
    Ok(reg_fmt(base, length, address, size))
}
