//! One-shot notification of the external importer.
//!
//! The importer listens on a local TCP port. The exporter connects, sends a
//! single UTF-8 command line and closes the connection; nothing is read back.

use crate::error::Result;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::net::{Ipv4Addr, Shutdown, SocketAddr, SocketAddrV4, TcpStream};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 55720;
pub const COMMAND_PREFIX: &str = "unrealToUnityImporter?";
pub const MANIFEST_ARGUMENT: &str = "ImportDescriptorPath=";

/// Where the importer listens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyTarget {
    pub address: SocketAddr,
    /// Connect timeout in milliseconds.
    pub timeout_ms: u64,
}

impl NotifyTarget {
    pub fn localhost(port: u16) -> Self {
        Self {
            address: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port)),
            ..Default::default()
        }
    }
}

impl Default for NotifyTarget {
    fn default() -> Self {
        Self {
            address: SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            timeout_ms: 2000,
        }
    }
}

/// Build the command line: `unrealToUnityImporter?ImportDescriptorPath=<path>`.
///
/// Without a manifest path only the prefix is sent.
pub fn import_command(manifest_path: Option<&Path>) -> String {
    let mut command = String::from(COMMAND_PREFIX);
    if let Some(path) = manifest_path.filter(|p| !p.as_os_str().is_empty()) {
        command.push_str(MANIFEST_ARGUMENT);
        command.push_str(&path.to_string_lossy());
    }
    command
}

/// Send `command` to `target` and close the connection.
pub fn send_command(target: &NotifyTarget, command: &str) -> Result<()> {
    let mut stream = TcpStream::connect_timeout(&target.address, Duration::from_millis(target.timeout_ms))?;
    stream.write_all(command.as_bytes())?;
    stream.flush()?;
    stream.shutdown(Shutdown::Both)?;
    Ok(())
}

/// Tell the importer a manifest is ready.
///
/// Failures are logged and reported as `false`; they never fail the export.
pub fn notify_importer(target: &NotifyTarget, manifest_path: &Path) -> bool {
    match send_command(target, &import_command(Some(manifest_path))) {
        Ok(()) => {
            info!("Notified importer at {}", target.address);
            true
        }
        Err(e) => {
            error!("Could not notify importer at {}: {}", target.address, e);
            false
        }
    }
}
