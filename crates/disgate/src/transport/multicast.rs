// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! Multicast group management and interface discovery.
//!
//! Exercises that multicast DIS traffic expect receivers to join the group on
//! every interface that can see the range network, not just the default
//! route. Join failures on individual interfaces are non-fatal; missing the
//! group entirely is.

use std::io;
use std::net::{Ipv4Addr, UdpSocket};

/// Join `group` on all available non-loopback interfaces.
///
/// A per-interface join failure is logged and skipped (VPN and container
/// adapters routinely refuse multicast). With no usable interface the join
/// falls back to UNSPECIFIED and lets the kernel route it.
pub fn join_group(socket: &UdpSocket, group: Ipv4Addr) -> io::Result<()> {
    let interfaces = multicast_interfaces()?;

    if interfaces.is_empty() {
        log::warn!("[transport] no suitable interfaces found, joining {} on UNSPECIFIED", group);
        socket.join_multicast_v4(&group, &Ipv4Addr::UNSPECIFIED)?;
    } else {
        for iface in &interfaces {
            match socket.join_multicast_v4(&group, iface) {
                Ok(()) => {
                    log::debug!("[transport] joined {} on interface {}", group, iface);
                }
                Err(e) if e.raw_os_error() == Some(98) => {
                    // EADDRINUSE: already joined on the same physical NIC
                    log::debug!("[transport] {} already joined on {}, skipping", group, iface);
                }
                Err(e) => {
                    log::debug!(
                        "[transport] join {} on {} failed (non-fatal): {}",
                        group,
                        iface,
                        e
                    );
                }
            }
        }
    }

    socket.set_multicast_loop_v4(true)?;
    Ok(())
}

/// All non-loopback IPv4 interfaces suitable for multicast.
///
/// `DISGATE_MULTICAST_IF` forces a single interface (testing and
/// multi-homed range hosts).
pub fn multicast_interfaces() -> io::Result<Vec<Ipv4Addr>> {
    if let Ok(var) = std::env::var("DISGATE_MULTICAST_IF") {
        if let Ok(addr) = var.parse::<Ipv4Addr>() {
            log::debug!("[transport] using DISGATE_MULTICAST_IF override: {}", addr);
            return Ok(vec![addr]);
        }
        log::warn!(
            "[transport] invalid DISGATE_MULTICAST_IF='{}', falling back to auto-detect",
            var
        );
    }

    let interfaces = match local_ip_address::list_afinet_netifas() {
        Ok(ifs) => ifs,
        Err(e) => {
            log::debug!("[transport] failed to list network interfaces: {}", e);
            return Ok(vec![]);
        }
    };

    let mut addrs = Vec::new();
    for (name, ip) in interfaces {
        if let std::net::IpAddr::V4(ipv4) = ip {
            if !ipv4.is_loopback() {
                log::trace!("[transport] candidate interface {} = {}", name, ipv4);
                addrs.push(ipv4);
            }
        }
    }

    log::debug!("[transport] discovered {} non-loopback interfaces", addrs.len());
    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_discovery_never_errors() {
        // Result depends on the host, but the call itself must not fail and
        // must not report loopback.
        let interfaces = multicast_interfaces().expect("discovery should not error");
        assert!(interfaces.iter().all(|ip| !ip.is_loopback()));
    }
}
