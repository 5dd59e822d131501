// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! Generate the device tree source describing the platform.
//!
//! The tree contains:
//! - one CPU node per core, each with its own local interrupt controller
//! - the main memory range
//! - CLINT and PLIC nodes routing interrupts to every core
//! - UART, SD card and Ethernet nodes, with PLIC interrupt numbers handed out
//!   in inventory order

use std::fmt::Write;

use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    input_language::DeviceDesc,
    inventory::{DeviceKind, Inventory, NO_UART_BASE},
    params::PlatformParams,
    reg_cells::{reg_fmt, Cells},
};

/// CLINT lines per core: machine software and machine timer.
const CLINT_LINES: [u32; 2] = [3, 7];

/// PLIC lines per core: machine external and supervisor external.
const PLIC_LINES: [u32; 2] = [11, 9];

const UART_BAUD: u32 = 115_200;

/// Hands out PLIC interrupt numbers, starting at 1.
#[derive(Debug)]
struct IrqAllocator {
    next: u32,
}

impl IrqAllocator {
    fn new() -> Self {
        IrqAllocator { next: 1 }
    }

    fn assign(&mut self) -> u32 {
        let irq = self.next;
        self.next += 1;
        irq
    }

    fn assigned(&self) -> usize {
        (self.next - 1) as usize
    }
}

fn ensure_consistent(counted: usize, assigned: usize) -> Result<()> {
    if counted != assigned {
        return Err(Error::Consistency { counted, assigned });
    }
    Ok(())
}

/// `reg` value for a node below the root, which uses two address and two
/// size cells.
fn root_reg(dev: &DeviceDesc) -> String {
    reg_fmt(dev.base, dev.length, Cells::Two, Cells::Two)
}

/// `interrupts-extended` entries binding `lines` to every core's controller.
fn per_core_lines(num_cores: usize, lines: [u32; 2]) -> String {
    (0..num_cores)
        .flat_map(|k| lines.map(|line| format!("&CPU{k}_intc {line}")))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generate the device tree source for `devices`.
///
/// Fails without producing any output when `params` is invalid or when the
/// interrupt numbers handed out do not match the interrupt source count.
pub fn generate_dts(devices: &[DeviceDesc], params: &PlatformParams) -> Result<String> {
    params.validate()?;

    let inventory = Inventory::new(devices);
    let uart_base = inventory.uart_base();
    if uart_base == NO_UART_BASE {
        warn!("no uart in device list, using placeholder base 0x{NO_UART_BASE:08x}");
    }

    let mut output = String::new();
    write_header(&mut output, params, uart_base)?;
    write_cpus(&mut output, params)?;

    if let Some(mem) = inventory.memory() {
        writeln!(output)?;
        writeln!(output, "    memory@{:08x} {{", mem.base)?;
        writeln!(output, "        u-boot,dm-pre-reloc;")?;
        writeln!(output, "        device_type = \"memory\";")?;
        writeln!(output, "        reg = <{}>;", root_reg(mem))?;
        writeln!(output, "    }};")?;
    } else {
        debug!("no memory in device list, skipping memory node");
    }

    let num_irqs = inventory.interrupt_sources();
    debug!("{num_irqs} interrupt sources in device list");

    let mut irqs = IrqAllocator::new();
    for (kind, dev) in inventory.known() {
        match kind {
            DeviceKind::Memory => {}
            DeviceKind::Clint => write_clint(&mut output, params, dev)?,
            DeviceKind::Plic => write_plic(&mut output, params, dev, num_irqs)?,
            DeviceKind::Uart => write_uart(&mut output, params, dev, irqs.assign())?,
            DeviceKind::Sd => write_sd(&mut output, dev)?,
            DeviceKind::Net => write_net(&mut output, dev, irqs.assign())?,
        }
    }

    writeln!(output, "}};")?;

    ensure_consistent(num_irqs, irqs.assigned())?;

    Ok(output)
}

fn write_header(output: &mut String, params: &PlatformParams, uart_base: u64) -> Result<()> {
    writeln!(output, "// DTS generated by rv64-platform")?;
    writeln!(output, "// OpenPiton + Ariane framework")?;
    writeln!(output, "// Date: {}", params.timestamp)?;
    writeln!(output, "// Console UART: 0x{uart_base:08x}")?;
    writeln!(output)?;
    writeln!(output, "/dts-v1/;")?;
    writeln!(output)?;
    writeln!(output, "/ {{")?;
    writeln!(output, "    #address-cells = <2>;")?;
    writeln!(output, "    #size-cells = <2>;")?;
    writeln!(output, "    u-boot,dm-pre-reloc;")?;
    writeln!(output, "    compatible = \"openpiton,cva6platform\";")?;
    writeln!(output)?;
    writeln!(output, "    chosen {{")?;
    writeln!(output, "        u-boot,dm-pre-reloc;")?;
    writeln!(output, "        stdout-path = \"uart0:{UART_BAUD}\";")?;
    writeln!(output, "    }};")?;
    writeln!(output)?;
    writeln!(output, "    aliases {{")?;
    writeln!(output, "        u-boot,dm-pre-reloc;")?;
    writeln!(output, "        console = &uart0;")?;
    writeln!(output, "        serial0 = &uart0;")?;
    writeln!(output, "    }};")?;
    Ok(())
}

fn write_cpus(output: &mut String, params: &PlatformParams) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "    cpus {{")?;
    writeln!(output, "        #address-cells = <1>;")?;
    writeln!(output, "        #size-cells = <0>;")?;
    writeln!(output, "        u-boot,dm-pre-reloc;")?;
    writeln!(output, "        timebase-frequency = <{}>;", params.timebase_freq_hz)?;

    for k in 0..params.num_cores {
        writeln!(output)?;
        writeln!(output, "        CPU{k}: cpu@{k} {{")?;
        writeln!(output, "            clock-frequency = <{}>;", params.core_freq_hz)?;
        writeln!(output, "            u-boot,dm-pre-reloc;")?;
        writeln!(output, "            device_type = \"cpu\";")?;
        writeln!(output, "            reg = <{k}>;")?;
        writeln!(output, "            status = \"okay\";")?;
        writeln!(output, "            compatible = \"openhwgroup, cva6\", \"riscv\";")?;
        writeln!(output, "            riscv,isa = \"rv64imafdc\";")?;
        writeln!(output, "            mmu-type = \"riscv,sv39\";")?;
        writeln!(output, "            tlb-split;")?;
        writeln!(output, "            // hart local interrupt controller")?;
        writeln!(output, "            CPU{k}_intc: interrupt-controller {{")?;
        writeln!(output, "                #interrupt-cells = <1>;")?;
        writeln!(output, "                interrupt-controller;")?;
        writeln!(output, "                compatible = \"riscv,cpu-intc\";")?;
        writeln!(output, "            }};")?;
        writeln!(output, "        }};")?;
    }

    writeln!(output, "    }};")?;
    Ok(())
}

fn write_clint(output: &mut String, params: &PlatformParams, dev: &DeviceDesc) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "    clint@{:08x} {{", dev.base)?;
    writeln!(output, "        u-boot,dm-pre-reloc;")?;
    writeln!(output, "        compatible = \"riscv,clint0\";")?;
    writeln!(
        output,
        "        interrupts-extended = <{}>;",
        per_core_lines(params.num_cores, CLINT_LINES)
    )?;
    writeln!(output, "        reg = <{}>;", root_reg(dev))?;
    writeln!(output, "        reg-names = \"control\";")?;
    writeln!(output, "    }};")?;
    Ok(())
}

fn write_plic(
    output: &mut String,
    params: &PlatformParams,
    dev: &DeviceDesc,
    num_irqs: usize,
) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "    PLIC0: plic@{:08x} {{", dev.base)?;
    writeln!(output, "        u-boot,dm-pre-reloc;")?;
    writeln!(output, "        #address-cells = <0>;")?;
    writeln!(output, "        #interrupt-cells = <1>;")?;
    writeln!(output, "        compatible = \"riscv,plic0\";")?;
    writeln!(output, "        interrupt-controller;")?;
    writeln!(
        output,
        "        interrupts-extended = <{}>;",
        per_core_lines(params.num_cores, PLIC_LINES)
    )?;
    writeln!(output, "        reg = <{}>;", root_reg(dev))?;
    writeln!(output, "        riscv,max-priority = <7>;")?;
    writeln!(output, "        riscv,ndev = <{num_irqs}>;")?;
    writeln!(output, "    }};")?;
    Ok(())
}

fn write_uart(
    output: &mut String,
    params: &PlatformParams,
    dev: &DeviceDesc,
    irq: u32,
) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "    uart0: uart@{:08x} {{", dev.base)?;
    writeln!(output, "        u-boot,dm-pre-reloc;")?;
    writeln!(output, "        compatible = \"ns16550\";")?;
    writeln!(output, "        reg = <{}>;", root_reg(dev))?;
    writeln!(output, "        clock-frequency = <{}>;", params.periph_freq_hz)?;
    writeln!(output, "        current-speed = <{UART_BAUD}>;")?;
    writeln!(output, "        interrupt-parent = <&PLIC0>;")?;
    writeln!(output, "        interrupts = <{irq}>;")?;
    // Registers sit on 8 bit boundaries.
    writeln!(output, "        reg-shift = <0>;")?;
    writeln!(output, "    }};")?;
    Ok(())
}

fn write_sd(output: &mut String, dev: &DeviceDesc) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "    sdhci_0: sdhci@{:08x} {{", dev.base)?;
    writeln!(output, "        u-boot,dm-pre-reloc;")?;
    writeln!(output, "        status = \"okay\";")?;
    writeln!(output, "        compatible = \"openpiton,piton-mmc\";")?;
    writeln!(output, "        reg = <{}>;", root_reg(dev))?;
    writeln!(output, "    }};")?;
    Ok(())
}

fn write_net(output: &mut String, dev: &DeviceDesc, irq: u32) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "    eth: ethernet@{:08x} {{", dev.base)?;
    writeln!(output, "        compatible = \"xlnx,xps-ethernetlite-1.00.a\";")?;
    writeln!(output, "        device_type = \"network\";")?;
    writeln!(output, "        reg = <{}>;", root_reg(dev))?;
    writeln!(output, "        interrupt-parent = <&PLIC0>;")?;
    writeln!(output, "        interrupts = <{irq}>;")?;
    writeln!(output, "        local-mac-address = [ 00 18 3E 02 E3 E5 ];")?;
    writeln!(output, "        phy-handle = <&phy0>;")?;
    writeln!(output, "        xlnx,duplex = <0x1>;")?;
    writeln!(output, "        xlnx,include-global-buffers = <0x1>;")?;
    writeln!(output, "        xlnx,include-internal-loopback = <0x0>;")?;
    writeln!(output, "        xlnx,include-mdio = <0x1>;")?;
    writeln!(output, "        xlnx,rx-ping-pong = <0x1>;")?;
    writeln!(output, "        xlnx,s-axi-id-width = <0x1>;")?;
    writeln!(output, "        xlnx,tx-ping-pong = <0x1>;")?;
    writeln!(output, "        xlnx,use-internal = <0x0>;")?;
    writeln!(output, "        axi_ethernetlite_0_mdio: mdio {{")?;
    writeln!(output, "            #address-cells = <1>;")?;
    writeln!(output, "            #size-cells = <0>;")?;
    writeln!(output, "            phy0: phy@1 {{")?;
    writeln!(output, "                compatible = \"ethernet-phy-id001C.C915\";")?;
    writeln!(output, "                device_type = \"ethernet-phy\";")?;
    writeln!(output, "                reg = <1>;")?;
    writeln!(output, "            }};")?;
    writeln!(output, "        }};")?;
    writeln!(output, "    }};")?;
    Ok(())
}
