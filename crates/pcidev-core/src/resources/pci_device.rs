use super::{validate_base, Resource, ResourceError};
use crate::error::{PcidevError, Result};
use crate::resource_name::ResourceNamer;
use crate::status::{build_status, object_name, PciDeviceStatus};
use crate::types::{DeviceDescriptor, IommuGroups};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// API version of the PCIDevice record
pub const API_VERSION: &str = "devices.harvesterhci.io/v1beta1";

/// Kind of the PCIDevice record
pub const KIND: &str = "PCIDevice";

/// Annotation mirroring the kernel driver bound to the device
pub const PCI_DEVICE_DRIVER_ANNOTATION: &str = "harvesterhci.io/pcideviceDriver";

/// Desired state of a PCI device. Currently empty; the record is observe-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PciDeviceSpec {}

/// Cluster-scoped record describing one PCI device on one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PciDevice {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PciDeviceSpec,
    #[serde(default)]
    pub status: PciDeviceStatus,
}

impl PciDevice {
    /// Build a new record for a device seen on `hostname`.
    ///
    /// The IOMMU group is left empty; callers fill it in with
    /// [`PciDevice::refresh_status`] once groups are known.
    pub fn build_new(namer: &ResourceNamer, dev: &DeviceDescriptor, hostname: &str) -> Self {
        let name = object_name(&dev.address, hostname);
        debug!(name = %name, address = %dev.address, "Building PCIDevice record");

        let annotations = BTreeMap::from([(
            PCI_DEVICE_DRIVER_ANNOTATION.to_string(),
            dev.driver.clone(),
        )]);

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ObjectMeta {
                name: Some(name),
                annotations: Some(annotations),
                ..Default::default()
            },
            spec: PciDeviceSpec::default(),
            status: build_status(namer, dev, hostname, &IommuGroups::new()),
        }
    }

    /// Replace the whole status with a fresh snapshot
    pub fn refresh_status(
        &mut self,
        namer: &ResourceNamer,
        dev: &DeviceDescriptor,
        hostname: &str,
        iommu_groups: &IommuGroups,
    ) {
        self.status = build_status(namer, dev, hostname, iommu_groups);
    }

    /// Validate the record before it is handed to the persistence layer
    pub fn ensure_valid(&self) -> Result<()> {
        self.validate().map_err(|e| {
            PcidevError::validation_failed(
                KIND,
                e.to_string(),
                "Object names must be DNS-1123 subdomains; use a lowercase node name",
            )
        })
    }
}

impl Resource for PciDevice {
    fn api_version(&self) -> String {
        self.api_version.clone()
    }

    fn kind(&self) -> String {
        self.kind.clone()
    }

    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }

    fn validate(&self) -> std::result::Result<(), ResourceError> {
        validate_base(&self.metadata)?;

        if self.metadata.namespace.is_some() {
            return Err(ResourceError::ValidationFailed(
                "PCIDevice is cluster-scoped and must not have a namespace".to_string(),
            ));
        }
        if self.status.resource_name.is_empty() {
            return Err(ResourceError::MissingField("status.resourceName".to_string()));
        }

        Ok(())
    }
}
