//! Device descriptors handed over by the hardware enumeration layer

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mapping from PCI bus address to IOMMU group number
pub type IommuGroups = BTreeMap<String, u32>;

/// A numeric PCI identifier paired with its database name, if the database knows one.
///
/// `name == None` is the "unknown" state. A device legitimately named
/// "unknown" stays a known name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PciIdent {
    /// Hex identifier as reported by the bus (e.g., "10de")
    pub id: String,
    /// Human-readable name from the PCI database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PciIdent {
    /// Create an identifier with a known name
    pub fn known(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }

    /// Create an identifier whose name the database does not know
    pub fn unknown(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Get the known name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The known name, or a `"<Kind> <id>"` placeholder
    pub fn display_or(&self, kind: &str) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{} {}", kind, self.id),
        }
    }
}

/// A PCI device as observed by the hardware enumeration layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    /// Bus address, `domain:bus:slot.function` (e.g., "0000:3b:00.0")
    pub address: String,
    pub vendor: PciIdent,
    pub product: PciIdent,
    pub class: PciIdent,
    pub subclass: PciIdent,
    /// Kernel driver bound to the device, empty when none
    #[serde(default)]
    pub driver: String,
}

impl DeviceDescriptor {
    /// Class and subclass IDs concatenated, class first (e.g., "03" + "02" = "0302")
    pub fn class_id(&self) -> String {
        format!("{}{}", self.class.id, self.subclass.id)
    }
}
