// SPDX-FileCopyrightText: 2025 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use std::{collections::HashMap, fs};

use rv64_platform::{
    build_utils::{write_outputs, DTS_FILE_NAME, INFO_FILE_NAME},
    config::PlatformConfig,
    generate, parse, parse_xml,
    params::Versions,
    Error,
};

const DEVICES: &str = r#"{
    "devices": [
        { "name": "chip_bridge", "base": "0x8000000000", "length": "0x8000000000" },
        { "name": "mem", "base": "0x80000000", "length": "0x40000000" },
        { "name": "ariane_clint", "base": "0xe102000000", "length": "0xc0000" },
        { "name": "ariane_plic", "base": "0xe200000000", "length": "0x4000000" },
        { "name": "uart", "base": "0xfff0c2c000", "length": "0xd000" },
        { "name": "sd", "base": "0xf000000000", "length": "0x10000000" },
        { "name": "net", "base": "0xfff0c30000", "length": "0x10000" }
    ]
}"#;

const DEVICES_XML: &str = r#"<devices>
    <port><name>chip_bridge</name><base>0x8000000000</base><length>0x8000000000</length></port>
    <port><name>mem</name><base>0x80000000</base><length>0x40000000</length></port>
    <port><name>ariane_clint</name><base>0xe102000000</base><length>0xc0000</length></port>
    <port><name>ariane_plic</name><base>0xe200000000</base><length>0x4000000</length></port>
    <port><name>uart</name><base>0xfff0c2c000</base><length>0xd000</length></port>
    <port><name>sd</name><base>0xf000000000</base><length>0x10000000</length></port>
    <port><name>net</name><base>0xfff0c30000</base><length>0x10000</length></port>
</devices>"#;

fn env(num_tiles: &str) -> HashMap<String, String> {
    [
        ("PITON_NUM_TILES", num_tiles),
        ("PITON_X_TILES", "2"),
        ("PITON_Y_TILES", "1"),
        ("PITON_NETWORK_CONFIG", "2dmesh_config"),
        ("CONFIG_SYS_FREQ", "66667000"),
        ("PROTOSYN_RUNTIME_BOARD", "genesys2"),
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

fn versions() -> Versions {
    Versions {
        platform: "0123456789abcdef0123456789abcdef01234567".to_string(),
        core_complex: "fedcba9876543210fedcba9876543210fedcba98".to_string(),
    }
}

#[test]
fn generates_and_writes_both_files() {
    let inventory = parse(DEVICES).unwrap();
    let params = PlatformConfig::from_map(&env("2"))
        .unwrap()
        .into_params(versions(), "Jan 01 2025 12:00:00".to_string());

    let files = generate(&inventory.devices, &params).unwrap();

    let dts = &files.dts;
    assert!(dts.contains("memory@80000000 {"));
    assert!(dts.contains("riscv,ndev = <2>;"));
    assert!(dts.contains("uart0: uart@fff0c2c000 {"));
    assert!(dts.contains("reg = < 0x000000ff 0xf0c2c000 0x00000000 0x0000d000>;"));
    assert!(dts.contains("interrupts = <1>;"));
    assert!(dts.contains("interrupts = <2>;"));
    assert!(dts.contains("sdhci_0: sdhci@f000000000 {"));
    assert!(dts.contains("timebase-frequency = <520835>;"));
    assert!(dts.contains(
        "interrupts-extended = <&CPU0_intc 3 &CPU0_intc 7 &CPU1_intc 3 &CPU1_intc 7>;"
    ));
    assert!(!dts.contains("chip_bridge"));

    let info = &files.info_header;
    assert!(info.contains("01234567"));
    assert!(!info.contains("012345678"));
    assert!(info.contains("fedcba98"));
    assert!(info.contains("genesys2"));
    assert!(info.contains("66 MHz"));
    assert!(info.contains("1024 MB"));
    assert!(info.contains("Jan 01 2025 12:00:00"));

    let dir = tempfile::tempdir().unwrap();
    write_outputs(dir.path(), &files).unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join(DTS_FILE_NAME)).unwrap(),
        files.dts
    );
    assert_eq!(
        fs::read_to_string(dir.path().join(INFO_FILE_NAME)).unwrap(),
        files.info_header
    );

    // same inputs, same bytes
    assert_eq!(generate(&inventory.devices, &params).unwrap(), files);
}

#[test]
fn invalid_params_produce_nothing() {
    let inventory = parse(DEVICES).unwrap();
    let mut params = PlatformConfig::from_map(&env("1"))
        .unwrap()
        .into_params(versions(), String::new());
    params.num_cores = 0;

    let result = generate(&inventory.devices, &params);
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn zero_tiles_rejected_by_config() {
    assert!(matches!(
        PlatformConfig::from_map(&env("0")),
        Err(Error::Configuration(_))
    ));
}

#[test]
fn xml_and_json_inventories_agree() {
    let params = PlatformConfig::from_map(&env("2"))
        .unwrap()
        .into_params(versions(), "Jan 01 2025 12:00:00".to_string());

    let from_json = generate(&parse(DEVICES).unwrap().devices, &params).unwrap();
    let from_xml = generate(&parse_xml(DEVICES_XML).unwrap().devices, &params).unwrap();

    assert_eq!(from_xml.dts, from_json.dts);
    assert_eq!(from_xml.info_header, from_json.info_header);
}
