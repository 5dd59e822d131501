// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Lookups over the device list that the generators share.

use crate::input_language::DeviceDesc;

/// Base address reported for the console UART when the inventory has none.
pub const NO_UART_BASE: u64 = 0xDEAD_BEEF;

/// The device names the generators know about. Anything else is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    Memory,
    Uart,
    Sd,
    Net,
    Clint,
    Plic,
}

impl DeviceKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "mem" => Some(DeviceKind::Memory),
            "uart" => Some(DeviceKind::Uart),
            "sd" => Some(DeviceKind::Sd),
            "net" => Some(DeviceKind::Net),
            "ariane_clint" => Some(DeviceKind::Clint),
            "ariane_plic" => Some(DeviceKind::Plic),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceKind::Memory => "mem",
            DeviceKind::Uart => "uart",
            DeviceKind::Sd => "sd",
            DeviceKind::Net => "net",
            DeviceKind::Clint => "ariane_clint",
            DeviceKind::Plic => "ariane_plic",
        }
    }

    /// Whether devices of this kind get an interrupt number on the PLIC.
    ///
    /// Both the interrupt source count and the emission of `interrupts`
    /// properties go through this table.
    pub fn takes_interrupt(self) -> bool {
        matches!(self, DeviceKind::Uart | DeviceKind::Net)
    }
}

/// A view over the device list in inventory order.
#[derive(Debug, Clone, Copy)]
pub struct Inventory<'a> {
    devices: &'a [DeviceDesc],
}

impl<'a> Inventory<'a> {
    pub fn new(devices: &'a [DeviceDesc]) -> Self {
        Inventory { devices }
    }

    /// All recognized devices, in inventory order.
    pub fn known(&self) -> impl Iterator<Item = (DeviceKind, &'a DeviceDesc)> + 'a {
        self.devices
            .iter()
            .filter_map(|dev| DeviceKind::from_name(&dev.name).map(|kind| (kind, dev)))
    }

    /// Singleton lookup: when several devices share a kind the last one in
    /// inventory order wins.
    pub fn last_of(&self, kind: DeviceKind) -> Option<&'a DeviceDesc> {
        self.devices.iter().rev().find(|dev| dev.name == kind.name())
    }

    pub fn memory(&self) -> Option<&'a DeviceDesc> {
        self.last_of(DeviceKind::Memory)
    }

    /// Size of main memory in bytes, 0 when there is no memory device.
    pub fn memory_size(&self) -> u64 {
        self.memory().map_or(0, |mem| mem.length)
    }

    /// Base of the console UART, [`NO_UART_BASE`] when there is none.
    pub fn uart_base(&self) -> u64 {
        self.last_of(DeviceKind::Uart)
            .map_or(NO_UART_BASE, |uart| uart.base)
    }

    /// Number of devices that need a PLIC interrupt number.
    pub fn interrupt_sources(&self) -> usize {
        self.known().filter(|(kind, _)| kind.takes_interrupt()).count()
    }
}
