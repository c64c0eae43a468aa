//! Loading device descriptors and IOMMU group tables from files

use crate::error::{PcidevError, Result};
use crate::types::{DeviceDescriptor, IommuGroups};
use crate::{from_json, from_yaml};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// A document holding either a single descriptor or a list of them
#[derive(Deserialize)]
#[serde(untagged)]
enum Descriptors {
    Many(Vec<DeviceDescriptor>),
    One(Box<DeviceDescriptor>),
}

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        PcidevError::input_error(path.display().to_string(), e.to_string(), Some(Box::new(e)))
    })
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn parse<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let data = read_to_string(path)?;
    if is_json(path) {
        from_json(&data)
    } else {
        from_yaml(&data)
    }
}

/// Load device descriptors from a JSON (`.json`) or YAML (anything else) file
pub fn load_descriptors(path: &Path) -> Result<Vec<DeviceDescriptor>> {
    let devices = match parse::<Descriptors>(path)? {
        Descriptors::Many(devices) => devices,
        Descriptors::One(device) => vec![*device],
    };
    debug!(path = %path.display(), count = devices.len(), "Loaded device descriptors");
    Ok(devices)
}

/// Load an IOMMU group table (bus address -> group number)
pub fn load_iommu_groups(path: &Path) -> Result<IommuGroups> {
    let groups: IommuGroups = parse(path)?;
    debug!(path = %path.display(), count = groups.len(), "Loaded IOMMU groups");
    Ok(groups)
}
