use crate::resource_name::ResourceNamer;
use crate::types::{DeviceDescriptor, IommuGroups};
use serde::{Deserialize, Serialize};

/// Observed state of a PCI device on a node
///
/// Rebuilt from scratch on every observation; never patched field by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PciDeviceStatus {
    pub address: String,
    pub vendor_id: String,
    pub device_id: String,
    /// Class ID followed by subclass ID, e.g. "0300"
    pub class_id: String,
    /// IOMMU group number, empty when the address has no group
    pub iommu_group: String,
    pub node_name: String,
    /// Name advertised by the device plugin, e.g. "nvidia.com/GA102_GEFORCE_RTX_3090"
    pub resource_name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kernel_driver_in_use: String,
}

/// DNS-safe record name for a device on a host: `<hostname>-<address without ':' and '.'>`
pub fn object_name(address: &str, hostname: &str) -> String {
    let addr_dns_safe: String = address.chars().filter(|c| *c != ':' && *c != '.').collect();
    format!("{}-{}", hostname, addr_dns_safe)
}

/// Human-readable description, e.g. `"Ethernet controller: Intel Corporation I350"`.
///
/// Prefers the subclass name over the class name; unknown names are replaced
/// by `"<Kind> <id>"` placeholders.
pub fn description(dev: &DeviceDescriptor) -> String {
    let class_name = dev
        .subclass
        .name()
        .or_else(|| dev.class.name())
        .map(str::to_string)
        .unwrap_or_else(|| format!("Class {}", dev.class_id()));

    format!(
        "{}: {} {}",
        class_name,
        dev.vendor.display_or("Vendor"),
        dev.product.display_or("Device")
    )
}

/// Build a full status snapshot for a device observed on `hostname`
pub fn build_status(
    namer: &ResourceNamer,
    dev: &DeviceDescriptor,
    hostname: &str,
    iommu_groups: &IommuGroups,
) -> PciDeviceStatus {
    PciDeviceStatus {
        address: dev.address.clone(),
        vendor_id: dev.vendor.id.clone(),
        device_id: dev.product.id.clone(),
        class_id: dev.class_id(),
        iommu_group: iommu_groups
            .get(&dev.address)
            .map(|group| group.to_string())
            .unwrap_or_default(),
        node_name: hostname.to_string(),
        resource_name: namer.resource_name(dev),
        description: description(dev),
        kernel_driver_in_use: dev.driver.clone(),
    }
}
