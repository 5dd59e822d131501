// SPDX-FileCopyrightText: 2024 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One entry of the platform's device list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct DeviceDesc {
    pub name: String,
    #[serde(deserialize_with = "address")]
    pub base: u64,
    #[serde(deserialize_with = "address")]
    pub length: u64,
}

impl DeviceDesc {
    pub fn new(name: impl Into<String>, base: u64, length: u64) -> Self {
        DeviceDesc {
            name: name.into(),
            base,
            length,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct DeviceInventory {
    pub devices: Vec<DeviceDesc>,
}

impl TryFrom<Value> for DeviceInventory {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let devices = match value {
            Value::Array(_) => value,
            Value::Object(mut obj) => {
                let Some(devices) = obj.remove("devices") else {
                    return Err("DeviceInventory must have a \"devices\" field".to_string());
                };
                devices
            }
            _ => return Err("DeviceInventory must be a JSON object or array".to_string()),
        };

        let devices = serde_json::from_value(devices).map_err(|err| err.to_string())?;
        Ok(DeviceInventory { devices })
    }
}

/// Addresses are either plain JSON numbers or `0x` prefixed hex strings.
fn parse_address(value: &Value) -> Result<u64, String> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .ok_or_else(|| format!("address {number} is not an unsigned 64 bit integer")),
        Value::String(s) => {
            let s = s.trim().replace('_', "");
            let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => s.parse(),
            };
            parsed.map_err(|err| format!("invalid address {s:?}: {err}"))
        }
        _ => Err(format!("address must be a number or a string, got {value}")),
    }
}

fn address<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    parse_address(&value).map_err(serde::de::Error::custom)
}

/// Parse a device inventory from JSON.
pub fn parse(src: &str) -> Result<DeviceInventory, serde_json::Error> {
    serde_json::from_str(src)
}

/// `<devices>` root of an OpenPiton devices XML file.
#[derive(Deserialize)]
struct XmlDevices {
    #[serde(rename = "port", default)]
    ports: Vec<XmlPort>,
}

/// One `<port>`. Flags such as `<noc2in/>` or `<stream_accessible/>` are
/// ignored.
#[derive(Deserialize)]
struct XmlPort {
    name: String,
    base: String,
    length: String,
}

impl TryFrom<XmlPort> for DeviceDesc {
    type Error = String;

    fn try_from(port: XmlPort) -> Result<Self, Self::Error> {
        let base = parse_address(&Value::String(port.base))?;
        let length = parse_address(&Value::String(port.length))?;
        Ok(DeviceDesc::new(port.name.trim(), base, length))
    }
}

/// Parse a device inventory from an OpenPiton devices XML file, a
/// `<devices>` element holding one `<port>` per device.
pub fn parse_xml(src: &str) -> Result<DeviceInventory, quick_xml::DeError> {
    let XmlDevices { ports } = quick_xml::de::from_str(src)?;
    let devices = ports
        .into_iter()
        .map(DeviceDesc::try_from)
        .collect::<Result<_, _>>()
        .map_err(<quick_xml::DeError as serde::de::Error>::custom)?;
    Ok(DeviceInventory { devices })
}
