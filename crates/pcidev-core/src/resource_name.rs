//! Resource-name synthesis for the device-plugin registration protocol
//!
//! A resource name has the shape `<vendor>.com/<PRODUCT_SEGMENT>`. The device
//! plugin embeds it in a unix socket path, and unix socket paths are capped at
//! 108 bytes (see unix(7)). Names that would overflow the cap are shortened by
//! replacing known verbose markers, and as a last resort the product segment
//! is replaced by the numeric product ID.

use crate::sanitize::{sanitize_product, vendor_label};
use crate::types::{DeviceDescriptor, PciIdent};
use tracing::debug;

/// Directory and file prefix of device-plugin registration sockets
pub const PLUGIN_NAME_PREFIX: &str = "/var/lib/kubelet/device-plugins/kubevirt-";

/// Maximum length of a unix socket path
pub const SOCKET_FILE_NAME_LIMIT: usize = 108;

/// Long-form virtual-function marker
pub const VF_SUFFIX: &str = "VIRTUAL_FUNCTION";

/// Short-form virtual-function marker
pub const SHORTENED_VF_SUFFIX: &str = "VF";

/// Suffix appended to the vendor label to make it domain-shaped
pub const VENDOR_DOMAIN_SUFFIX: &str = ".com";

/// Vendor label used when the PCI database does not know the vendor
pub const UNKNOWN_VENDOR_LABEL: &str = "unknown";

/// A known substring that may be replaced by a shorter spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortening {
    pub long: &'static str,
    pub short: &'static str,
}

impl Shortening {
    /// Whether this shortening has anything to replace in `segment`
    pub fn applies_to(&self, segment: &str) -> bool {
        segment.contains(self.long)
    }

    /// Replace every occurrence of the long form with the short form
    pub fn apply(&self, segment: &str) -> String {
        segment.replace(self.long, self.short)
    }
}

/// Shortenings in priority order. Each `short` must be strictly shorter than
/// its `long` so that the fitting loop always makes progress.
pub const SHORTENINGS: &[Shortening] = &[Shortening {
    long: VF_SUFFIX,
    short: SHORTENED_VF_SUFFIX,
}];

/// Socket constraints the resource name must satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConfig {
    /// Prefix of the registration socket path
    pub plugin_name_prefix: String,
    /// Maximum allowed socket path length in bytes
    pub socket_path_limit: usize,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            plugin_name_prefix: PLUGIN_NAME_PREFIX.to_string(),
            socket_path_limit: SOCKET_FILE_NAME_LIMIT,
        }
    }
}

/// Derives resource names under a given [`NamingConfig`]
#[derive(Debug, Clone, Default)]
pub struct ResourceNamer {
    config: NamingConfig,
}

impl ResourceNamer {
    pub fn new(config: NamingConfig) -> Self {
        Self { config }
    }

    /// Derive the resource name for a device
    pub fn resource_name(&self, dev: &DeviceDescriptor) -> String {
        let vendor = vendor_base(&dev.vendor);

        match dev.product.name() {
            Some(product_name) => {
                let segment = sanitize_product(product_name);
                self.fit(&vendor, &segment, &dev.product.id)
            }
            // Unknown to the PCI database: the ID alone is the segment
            None => format!("{}/{}", vendor, dev.product.id),
        }
    }

    /// The registration socket path a plugin for this name would use
    pub fn socket_path(&self, vendor_base: &str, segment: &str) -> String {
        format!(
            "{}/{}-{}.sock",
            self.config.plugin_name_prefix, vendor_base, segment
        )
    }

    /// Whether `<vendor_base>/<segment>` fits under the socket path limit
    pub fn fits(&self, vendor_base: &str, segment: &str) -> bool {
        self.socket_path(vendor_base, segment).len() <= self.config.socket_path_limit
    }

    /// Fit `<vendor_base>/<segment>` under the socket path limit.
    ///
    /// Applies [`SHORTENINGS`] in priority order until the name fits. If no
    /// shortening is left, the numeric `product_id` replaces the segment and
    /// the result is returned without another length check.
    pub fn fit(&self, vendor_base: &str, segment: &str, product_id: &str) -> String {
        let mut candidate = segment.to_string();

        loop {
            if self.fits(vendor_base, &candidate) {
                return format!("{}/{}", vendor_base, candidate);
            }

            match SHORTENINGS.iter().find(|s| s.applies_to(&candidate)) {
                Some(shortening) => {
                    debug!(
                        vendor = vendor_base,
                        segment = %candidate,
                        long = shortening.long,
                        short = shortening.short,
                        "Shortening resource name to fit socket path limit"
                    );
                    candidate = shortening.apply(&candidate);
                }
                None => {
                    debug!(
                        vendor = vendor_base,
                        segment = %candidate,
                        product_id,
                        "Resource name too long, falling back to product ID"
                    );
                    return format!("{}/{}", vendor_base, product_id);
                }
            }
        }
    }
}

/// Domain-shaped vendor prefix, e.g. `nvidia.com`.
///
/// An unknown vendor becomes `unknown.com`, so existing resource names for
/// devices missing from the PCI database keep their spelling.
pub fn vendor_base(vendor: &PciIdent) -> String {
    let label = vendor
        .name()
        .map(vendor_label)
        .unwrap_or_else(|| UNKNOWN_VENDOR_LABEL.to_string());
    format!("{}{}", label, VENDOR_DOMAIN_SUFFIX)
}

/// Derive the resource name for a device with the default socket constraints
pub fn resource_name(dev: &DeviceDescriptor) -> String {
    ResourceNamer::default().resource_name(dev)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(vendor: PciIdent, product: PciIdent) -> DeviceDescriptor {
        DeviceDescriptor {
            address: "0000:3b:00.0".to_string(),
            vendor,
            product,
            class: PciIdent::known("03", "Display controller"),
            subclass: PciIdent::known("00", "VGA compatible controller"),
            driver: "nvidia".to_string(),
        }
    }

    #[test]
    fn test_nvidia_resource_name() {
        let dev = device(
            PciIdent::known("10de", "NVIDIA Corporation"),
            PciIdent::known("2204", "GA102 [GeForce RTX 3090]"),
        );
        assert_eq!(resource_name(&dev), "nvidia.com/GA102_GEFORCE_RTX_3090");
    }

    #[test]
    fn test_unknown_product_uses_id() {
        let dev = device(
            PciIdent::known("1002", "Advanced Micro Devices, Inc. [AMD/ATI]"),
            PciIdent::unknown("67df"),
        );
        assert_eq!(resource_name(&dev), "amd.com/67df");
    }

    #[test]
    fn test_unknown_product_skips_length_check() {
        let namer = ResourceNamer::new(NamingConfig {
            plugin_name_prefix: PLUGIN_NAME_PREFIX.to_string(),
            socket_path_limit: 10,
        });
        let dev = device(
            PciIdent::known("10de", "NVIDIA Corporation"),
            PciIdent::unknown("2204"),
        );
        assert_eq!(namer.resource_name(&dev), "nvidia.com/2204");
    }

    #[test]
    fn test_unknown_vendor() {
        let dev = device(PciIdent::unknown("1af4"), PciIdent::unknown("1000"));
        assert_eq!(resource_name(&dev), "unknown.com/1000");

        // The vendor ID never leaks into the vendor base
        let dev = device(PciIdent::unknown("1A F4/x"), PciIdent::unknown("1000"));
        assert_eq!(resource_name(&dev), "unknown.com/1000");
    }

    #[test]
    fn test_vendor_without_alphanumerics() {
        let dev = device(PciIdent::known("1af4", "(!)"), PciIdent::unknown("1000"));
        assert_eq!(resource_name(&dev), ".com/1000");
    }

    #[test]
    fn test_empty_bracket_alias_is_kept() {
        let dev = device(
            PciIdent::known("1002", "Slash only [/ATI]"),
            PciIdent::unknown("1000"),
        );
        assert_eq!(resource_name(&dev), ".com/1000");
    }

    #[test]
    fn test_unmatched_bracket_vendor() {
        let dev = device(
            PciIdent::known("8086", "Intel Corporation [Broken"),
            PciIdent::unknown("1572"),
        );
        assert_eq!(resource_name(&dev), "intel.com/1572");
    }

    #[test]
    fn test_socket_path_shape() {
        let namer = ResourceNamer::default();
        assert_eq!(
            namer.socket_path("nvidia.com", "GA102"),
            "/var/lib/kubelet/device-plugins/kubevirt-/nvidia.com-GA102.sock"
        );
    }

    #[test]
    fn test_vf_marker_shortened() {
        // 121 bytes of socket path before shortening, 93 after
        let dev = device(
            PciIdent::known("15b3", "Mellanox Technologies"),
            PciIdent::known(
                "1018",
                "MT28800 Family [ConnectX-5 Ex Virtual Function] Virtual Function",
            ),
        );
        let namer = ResourceNamer::default();
        let segment = "MT28800_FAMILY_CONNECTX5_EX_VIRTUAL_FUNCTION_VIRTUAL_FUNCTION";
        assert_eq!(namer.socket_path("mellanox.com", segment).len(), 121);

        let name = namer.resource_name(&dev);
        assert_eq!(name, "mellanox.com/MT28800_FAMILY_CONNECTX5_EX_VF_VF");
        assert_eq!(
            namer
                .socket_path("mellanox.com", "MT28800_FAMILY_CONNECTX5_EX_VF_VF")
                .len(),
            93
        );
    }

    #[test]
    fn test_long_name_falls_back_to_id() {
        let dev = device(
            PciIdent::known("10de", "NVIDIA Corporation"),
            PciIdent::known("20b5", "A".repeat(60)),
        );
        assert_eq!(resource_name(&dev), "nvidia.com/20b5");
    }

    #[test]
    fn test_shortening_insufficient_falls_back_to_id() {
        let long_name = format!("{} Virtual Function", "X".repeat(60));
        let dev = device(
            PciIdent::known("15b3", "Mellanox Technologies"),
            PciIdent::known("101e", long_name),
        );
        assert_eq!(resource_name(&dev), "mellanox.com/101e");
    }

    #[test]
    fn test_exact_limit_fits() {
        let namer = ResourceNamer::default();
        // 48 bytes of fixed framing plus "nvidia.com" leaves 50 for the segment
        let segment = "B".repeat(50);
        assert_eq!(namer.socket_path("nvidia.com", &segment).len(), SOCKET_FILE_NAME_LIMIT);
        assert_eq!(
            namer.fit("nvidia.com", &segment, "1234"),
            format!("nvidia.com/{}", segment)
        );

        let segment = "B".repeat(51);
        assert_eq!(namer.fit("nvidia.com", &segment, "1234"), "nvidia.com/1234");
    }

    #[test]
    fn test_custom_limit() {
        let namer = ResourceNamer::new(NamingConfig {
            plugin_name_prefix: "/run/dp/".to_string(),
            socket_path_limit: 40,
        });
        // "/run/dp//intel.com-" (19) + segment + ".sock" (5)
        assert_eq!(namer.fit("intel.com", "I350_VIRTUAL_FUNCTION", "1520"), "intel.com/I350_VF");
        assert_eq!(namer.fit("intel.com", "SHORT", "1520"), "intel.com/SHORT");
    }

    #[test]
    fn test_length_invariant() {
        let namer = ResourceNamer::default();
        let names = [
            "GA102 [GeForce RTX 3090]",
            "MT2892 Family [ConnectX-6 Dx Virtual Function]",
            "Ethernet Controller X710 Virtual Function Virtual Function Virtual Function",
            "Some Extremely Verbose Product Name That Keeps Going And Going Forever",
        ];
        for (i, name) in names.iter().enumerate() {
            let id = format!("{:04x}", i);
            let dev = device(
                PciIdent::known("8086", "Intel Corporation"),
                PciIdent::known(id.clone(), *name),
            );
            let rn = namer.resource_name(&dev);
            let (vendor, segment) = rn.split_once('/').unwrap();
            assert!(
                namer.fits(vendor, segment) || segment == id,
                "{rn} neither fits nor is the ID fallback"
            );
        }
    }

    #[test]
    fn test_shortening_idempotent_without_marker() {
        for s in SHORTENINGS {
            assert!(s.short.len() < s.long.len());
            assert_eq!(s.apply("GA102_GEFORCE_RTX_3090"), "GA102_GEFORCE_RTX_3090");
            let once = s.apply("X710_VIRTUAL_FUNCTION");
            assert_eq!(s.apply(&once), once);
        }
    }

    #[test]
    fn test_deterministic() {
        let dev = device(
            PciIdent::known("15b3", "Mellanox Technologies"),
            PciIdent::known("1018", "MT28800 Family [ConnectX-5 Ex Virtual Function]"),
        );
        assert_eq!(resource_name(&dev), resource_name(&dev.clone()));
    }
}
