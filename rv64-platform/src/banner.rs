// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

//! The boot banner printed by the bootrom at power-on, emitted as a C header
//! declaring `const char info[]`.

use crate::params::{CacheLevel, PlatformParams};

pub const NO_BOARD: &str = "None (Simulation)";
pub const UNKNOWN_FREQ: &str = "Unknown";

/// Number of version characters shown.
pub const SHORT_VERSION_LEN: usize = 8;

/// Printable width of every banner line, excluding the line ending.
const BANNER_WIDTH: usize = 40;

/// Width of the label column.
const LABEL_WIDTH: usize = 19;

pub fn short_version(version: &str) -> &str {
    match version.char_indices().nth(SHORT_VERSION_LEN) {
        Some((idx, _)) => &version[..idx],
        None => version,
    }
}

pub fn board_label(params: &PlatformParams) -> &str {
    match params.board_name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => NO_BOARD,
    }
}

pub fn freq_label(params: &PlatformParams) -> String {
    match params.configured_freq_hz {
        Some(hz) => format!("{} MHz", hz / 1_000_000),
        None => UNKNOWN_FREQ.to_string(),
    }
}

fn cache_label(cache: &CacheLevel) -> String {
    format!("{:3} kB / {}", cache.size_bytes / 1024, cache.associativity)
}

/// Lines of the banner, without padding or line endings.
fn banner_lines(params: &PlatformParams, memory_size_bytes: u64) -> Vec<String> {
    let rule = "-".repeat(BANNER_WIDTH);
    let title = format!("--{:^width$}--", "OpenPiton+Ariane Platform", width = BANNER_WIDTH - 4);
    let field = |label: &str, value: &str| format!("{:<LABEL_WIDTH$}{value}", format!("{label}:"));
    let caches = &params.caches;

    vec![
        rule.clone(),
        title,
        rule.clone(),
        field("OpenPiton Version", short_version(&params.versions.platform)),
        field("Ariane Version", short_version(&params.versions.core_complex)),
        String::new(),
        field("FPGA Board", board_label(params)),
        field("Build Date", &params.timestamp),
        String::new(),
        field("#X-Tiles", &params.x_tiles.to_string()),
        field("#Y-Tiles", &params.y_tiles.to_string()),
        field("#Cores", &params.num_cores.to_string()),
        field("Core Freq", &freq_label(params)),
        field("Network", &params.network_config),
        field("DRAM Size", &format!("{} MB", memory_size_bytes / 1024 / 1024)),
        String::new(),
        field("L1I Size / Assoc", &cache_label(&caches.l1i)),
        field("L1D Size / Assoc", &cache_label(&caches.l1d)),
        field("L15 Size / Assoc", &cache_label(&caches.l15)),
        field("L2  Size / Assoc", &cache_label(&caches.l2)),
        rule,
    ]
}

/// Escape `line` for use inside a C string literal.
fn c_escape(line: &str) -> String {
    line.chars()
        .flat_map(|c| match c {
            '"' => vec!['\\', '"'],
            '\\' => vec!['\\', '\\'],
            c if c.is_ascii_graphic() || c == ' ' => vec![c],
            _ => vec!['?'],
        })
        .collect()
}

/// Generate `info.h` for the given platform and memory size.
#[must_use]
pub fn generate_info_header(params: &PlatformParams, memory_size_bytes: u64) -> String {
    let mut output = String::new();

    output.push_str("// Info string generated by rv64-platform\n");
    output.push_str("// OpenPiton + Ariane framework\n");
    output.push_str(&format!("// Date: {}\n\n", params.timestamp));
    output.push_str("const char info[] = {\n");
    output.push_str("\"\\r\\n\\r\\n\"\n");

    let lines = banner_lines(params, memory_size_bytes);
    let last = lines.len() - 1;
    for (i, line) in lines.iter().enumerate() {
        let ending = if i == last { "\\r\\n\\r\\n\\r\\n" } else { "\\r\\n" };
        output.push_str(&format!("\"{:<BANNER_WIDTH$}{ending}\"\n", c_escape(line)));
    }

    output.push_str("};\n");
    output
}
