//! Pcidev Core - name derivation for PCI devices exposed to Kubernetes
//!
//! This crate provides:
//! - Sanitization of PCI database vendor/product names
//! - Device-plugin resource names that fit the unix socket path limit
//! - DNS-safe object names and status snapshots for PCIDevice records
//! - Error types with miette diagnostics
//! - Serialization helpers

pub mod error;
pub mod input;
pub mod resource_name;
pub mod resources;
pub mod sanitize;
pub mod status;
pub mod types;

// Re-export commonly used types
pub use error::{PcidevError, Result};
pub use input::{load_descriptors, load_iommu_groups};
pub use resource_name::{resource_name, NamingConfig, ResourceNamer};
pub use resources::{is_valid_name, PciDevice, PciDeviceSpec, Resource, ResourceError};
pub use status::{build_status, description, object_name, PciDeviceStatus};
pub use types::{DeviceDescriptor, IommuGroups, PciIdent};

// Re-export k8s-openapi types for convenience
pub use k8s_openapi;
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Serialize a resource to JSON
pub fn to_json<T: serde::Serialize>(resource: &T) -> Result<String> {
    serde_json::to_string(resource).map_err(|e| {
        PcidevError::serialization_error(
            format!("Failed to serialize to JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Serialize a resource to pretty JSON
pub fn to_json_pretty<T: serde::Serialize>(resource: &T) -> Result<String> {
    serde_json::to_string_pretty(resource).map_err(|e| {
        PcidevError::serialization_error(
            format!("Failed to serialize to JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Deserialize a resource from JSON
pub fn from_json<T: for<'de> serde::Deserialize<'de>>(data: &str) -> Result<T> {
    serde_json::from_str(data).map_err(|e| {
        PcidevError::serialization_error(
            format!("Failed to deserialize from JSON: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Serialize a resource to YAML
pub fn to_yaml<T: serde::Serialize>(resource: &T) -> Result<String> {
    serde_yaml::to_string(resource).map_err(|e| {
        PcidevError::serialization_error(
            format!("Failed to serialize to YAML: {}", e),
            Some(Box::new(e)),
        )
    })
}

/// Deserialize a resource from YAML
pub fn from_yaml<T: for<'de> serde::Deserialize<'de>>(data: &str) -> Result<T> {
    serde_yaml::from_str(data).map_err(|e| {
        PcidevError::serialization_error(
            format!("Failed to deserialize from YAML: {}", e),
            Some(Box::new(e)),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nic() -> DeviceDescriptor {
        DeviceDescriptor {
            address: "0000:5e:00.2".to_string(),
            vendor: PciIdent::known("15b3", "Mellanox Technologies"),
            product: PciIdent::known("101a", "MT28800 Family [ConnectX-5 Ex Virtual Function]"),
            class: PciIdent::known("02", "Network controller"),
            subclass: PciIdent::known("00", "Ethernet controller"),
            driver: "mlx5_core".to_string(),
        }
    }

    #[test]
    fn test_json_roundtrip() {
        let device = PciDevice::build_new(&ResourceNamer::default(), &nic(), "node-1");

        let json = to_json(&device).unwrap();
        assert!(json.contains("node-1-00005e002"));

        let deserialized: PciDevice = from_json(&json).unwrap();
        assert_eq!(deserialized, device);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let device = PciDevice::build_new(&ResourceNamer::default(), &nic(), "node-1");

        let yaml = to_yaml(&device).unwrap();
        assert!(yaml.contains("mellanox.com/MT28800_FAMILY_CONNECTX5_EX_VIRTUAL_FUNCTION"));

        let deserialized: PciDevice = from_yaml(&yaml).unwrap();
        assert_eq!(deserialized.status, device.status);
    }
}
