// src/node.rs
//! Stable numeric host identifier used for default callsigns

use std::path::Path;
use std::sync::OnceLock;

static HOST_NODE: OnceLock<u64> = OnceLock::new();

/// 48-bit host identifier, computed once per process.
///
/// Uses the first non-loopback hardware address found in sysfs. When no
/// address is available a random 48-bit number with the multicast bit
/// set is used instead, so it cannot collide with a real address.
pub fn host_node() -> u64 {
    *HOST_NODE.get_or_init(|| {
        hardware_node(Path::new("/sys/class/net")).unwrap_or_else(random_node)
    })
}

fn hardware_node(net_dir: &Path) -> Option<u64> {
    let mut interfaces: Vec<_> = std::fs::read_dir(net_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name() != "lo")
        .map(|entry| entry.path())
        .collect();
    interfaces.sort();

    interfaces.iter().find_map(|iface| {
        let address = std::fs::read_to_string(iface.join("address")).ok()?;
        parse_mac(address.trim()).filter(|node| *node != 0)
    })
}

/// Parse a colon separated MAC address into its integer value
fn parse_mac(address: &str) -> Option<u64> {
    let octets: Vec<&str> = address.split(':').collect();
    if octets.len() != 6 {
        return None;
    }

    octets.iter().try_fold(0u64, |node, octet| {
        u8::from_str_radix(octet, 16).ok().map(|b| (node << 8) | b as u64)
    })
}

fn random_node() -> u64 {
    (rand::random::<u64>() & 0xffff_ffff_ffff) | (1 << 40)
}
