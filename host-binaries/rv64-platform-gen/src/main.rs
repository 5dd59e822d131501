// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use std::{
    fmt::{Debug, Display},
    fs::read_to_string,
    io::{Error as IoError, Result as IoResult},
    path::{Path, PathBuf},
};

use clap::Parser;
use rv64_platform::{
    build_utils::write_outputs,
    config::{build_timestamp, PlatformConfig},
    params::Versions,
    version::head_commit,
};
use tracing::{info, warn};

/// Generate the device tree and boot banner for an OpenPiton + Ariane
/// platform.
///
/// Platform parameters are read from the environment (`PITON_NUM_TILES`,
/// `CONFIG_SYS_FREQ`, ...).
#[derive(Parser)]
struct Clap {
    /// The platform's device list: an OpenPiton devices `.xml` file, or JSON.
    #[arg(short, long)]
    devices: PathBuf,
    /// Directory for `rv64_platform.dts` and `info.h`. Defaults to the
    /// bootrom directory below `$DV_ROOT`.
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
    /// Platform version instead of the `HEAD` commit of `$DV_ROOT`.
    #[arg(long)]
    platform_version: Option<String>,
    /// Core complex version instead of the `HEAD` commit of `$ARIANE_ROOT`.
    #[arg(long)]
    core_version: Option<String>,
    /// Build timestamp instead of the current local time.
    #[arg(long)]
    timestamp: Option<String>,
    /// Print both files to stdout instead of writing them.
    #[arg(long)]
    print: bool,
}

trait IntoIoResult<T> {
    fn into_io_result(self, prefix: impl AsRef<str>) -> IoResult<T>;
}

impl<T, E: Debug + Display> IntoIoResult<T> for Result<T, E> {
    fn into_io_result(self, prefix: impl AsRef<str>) -> IoResult<T> {
        self.map_err(|err| {
            IoError::other(format!(
                "{}\nShort: {err}\nLong: {err:?}",
                prefix.as_ref()
            ))
        })
    }
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};
    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .without_time()
        .with_writer(std::io::stderr)
        .with_filter(
            // No default, use RUST_LOG or fall back to WARN.
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
                .from_env_lossy(),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .init();
}

/// Explicit version if given, otherwise the `HEAD` commit of `root`.
fn resolve_version(explicit: Option<String>, root: Option<&Path>, what: &str) -> IoResult<String> {
    if let Some(version) = explicit {
        return Ok(version);
    }
    let Some(root) = root else {
        warn!("no repository for the {what} version, leaving it empty");
        return Ok(String::new());
    };
    head_commit(root).into_io_result(format!("Failed to get {what} version."))
}

fn main() -> IoResult<()> {
    init_logging();
    let Clap {
        devices,
        out_dir,
        platform_version,
        core_version,
        timestamp,
        print,
    } = Clap::parse();

    let config = PlatformConfig::from_env().into_io_result("Failed to read configuration.")?;

    let src = read_to_string(&devices)?;
    let is_xml = devices.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
    let parse_error = format!("Failed to parse {}.", devices.display());
    let inventory = if is_xml {
        rv64_platform::parse_xml(&src).into_io_result(parse_error)?
    } else {
        rv64_platform::parse(&src).into_io_result(parse_error)?
    };
    info!("{} devices in {}", inventory.devices.len(), devices.display());

    let platform_root = config
        .platform_root
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let versions = Versions {
        platform: resolve_version(platform_version, Some(&platform_root), "platform")?,
        core_complex: resolve_version(core_version, config.core_root.as_deref(), "core complex")?,
    };

    let out_dir = match out_dir.or_else(|| config.default_out_dir()) {
        Some(dir) => dir,
        None if print => PathBuf::new(),
        None => {
            return Err(IoError::other(
                "No output directory: pass --out-dir or set DV_ROOT.",
            ))
        }
    };

    let timestamp = timestamp.unwrap_or_else(build_timestamp);
    let params = config.into_params(versions, timestamp);
    let files =
        rv64_platform::generate(&inventory.devices, &params).into_io_result("Generation failed.")?;

    if print {
        println!("{}", files.dts);
        println!("{}", files.info_header);
        return Ok(());
    }

    write_outputs(&out_dir, &files)
        .into_io_result(format!("Failed to write to {}.", out_dir.display()))?;
    println!("Wrote platform files to {}", out_dir.display());

    Ok(())
}
