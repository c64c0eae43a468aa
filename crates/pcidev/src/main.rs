use clap::{Args, Parser, Subcommand, ValueEnum};
use pcidev_core::resource_name::{PLUGIN_NAME_PREFIX, SOCKET_FILE_NAME_LIMIT};
use pcidev_core::{
    load_descriptors, load_iommu_groups, object_name, to_json_pretty, to_yaml, DeviceDescriptor,
    IommuGroups, NamingConfig, PciDevice, PciIdent, ResourceNamer,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "pcidev", about = "Derive PCI device resource and object names")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Socket constraints the resource name must fit
#[derive(Args)]
struct SocketArgs {
    /// Prefix of the device-plugin registration socket path
    #[arg(long, env = "PCIDEV_PLUGIN_PREFIX", default_value = PLUGIN_NAME_PREFIX)]
    plugin_prefix: String,
    /// Maximum socket path length in bytes
    #[arg(long, env = "PCIDEV_SOCKET_LIMIT", default_value_t = SOCKET_FILE_NAME_LIMIT)]
    socket_limit: usize,
}

impl SocketArgs {
    fn namer(&self) -> ResourceNamer {
        ResourceNamer::new(NamingConfig {
            plugin_name_prefix: self.plugin_prefix.clone(),
            socket_path_limit: self.socket_limit,
        })
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the device-plugin resource name for one device
    ResourceName {
        /// Vendor name from the PCI database (omit when unknown)
        #[arg(long)]
        vendor_name: Option<String>,
        /// Vendor ID, e.g. 10de
        #[arg(long)]
        vendor_id: String,
        /// Product name from the PCI database (omit when unknown)
        #[arg(long)]
        product_name: Option<String>,
        /// Product ID, e.g. 2204
        #[arg(long)]
        product_id: String,
        #[command(flatten)]
        socket: SocketArgs,
    },
    /// Print the object name for a device on a node
    ObjectName {
        /// PCI bus address, e.g. 0000:3b:00.0
        #[arg(long)]
        address: String,
        /// Node the device is attached to
        #[arg(long, env = "NODE_NAME")]
        node_name: String,
    },
    /// Build PCIDevice records for every descriptor in a file
    Describe {
        /// JSON or YAML file with one descriptor or a list of them
        #[arg(long)]
        device: PathBuf,
        /// Node the devices are attached to (defaults to the host name)
        #[arg(long, env = "NODE_NAME")]
        node_name: Option<String>,
        /// JSON or YAML file mapping bus addresses to IOMMU groups
        #[arg(long)]
        iommu_groups: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        output: OutputFormat,
        #[command(flatten)]
        socket: SocketArgs,
    },
}

fn main() -> miette::Result<()> {
    // Logs go to stderr so stdout carries only the generated names and records
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ResourceName {
            vendor_name,
            vendor_id,
            product_name,
            product_id,
            socket,
        } => {
            run_resource_name(
                ident(vendor_id, vendor_name),
                ident(product_id, product_name),
                &socket,
            );
            Ok(())
        }
        Commands::ObjectName { address, node_name } => {
            println!("{}", object_name(&address, &node_name));
            Ok(())
        }
        Commands::Describe {
            device,
            node_name,
            iommu_groups,
            output,
            socket,
        } => run_describe(&device, node_name, iommu_groups.as_deref(), output, &socket),
    }
}

fn ident(id: String, name: Option<String>) -> PciIdent {
    PciIdent { id, name }
}

/// Print the resource name for a single vendor/product pair
fn run_resource_name(vendor: PciIdent, product: PciIdent, socket: &SocketArgs) {
    let dev = DeviceDescriptor {
        address: String::new(),
        vendor,
        product,
        class: PciIdent::unknown(""),
        subclass: PciIdent::unknown(""),
        driver: String::new(),
    };
    println!("{}", socket.namer().resource_name(&dev));
}

/// Build and print a PCIDevice record per descriptor
fn run_describe(
    device_file: &std::path::Path,
    node_name: Option<String>,
    iommu_file: Option<&std::path::Path>,
    output: OutputFormat,
    socket: &SocketArgs,
) -> miette::Result<()> {
    let hostname = match node_name {
        Some(name) => name,
        None => sys_info::hostname()
            .map_err(|e| miette::miette!("Failed to detect host name, pass --node-name: {}", e))?,
    };

    let devices = load_descriptors(device_file)?;
    let iommu_groups = match iommu_file {
        Some(path) => load_iommu_groups(path)?,
        None => IommuGroups::new(),
    };

    info!(
        node = %hostname,
        devices = devices.len(),
        iommu_groups = iommu_groups.len(),
        "Building PCIDevice records"
    );

    let namer = socket.namer();
    let records = devices
        .iter()
        .map(|dev| {
            let mut record = PciDevice::build_new(&namer, dev, &hostname);
            record.refresh_status(&namer, dev, &hostname, &iommu_groups);
            record.ensure_valid()?;
            Ok(record)
        })
        .collect::<pcidev_core::Result<Vec<PciDevice>>>()?;

    let rendered = match output {
        OutputFormat::Json => to_json_pretty(&records)?,
        OutputFormat::Yaml => to_yaml(&records)?,
    };
    println!("{}", rendered);

    Ok(())
}
