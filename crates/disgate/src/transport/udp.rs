// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 disgate contributors

//! DIS datagram receiver.

use crate::config::{RuntimeConfig, MAX_DATAGRAM_SIZE};
use crate::engine::{handle_datagram, EntityStateReport};
use crate::relay::{RelayHub, RelayPolicy};
use crate::transport::multicast::join_group;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Blocking receive loop: one socket, one decode pipeline, one hub.
///
/// Bound with SO_REUSEADDR and SO_BROADCAST so a receiver can share the DIS
/// port with other tools on the same host and still see broadcast exercises.
pub struct DisReceiver {
    socket: Arc<UdpSocket>,
    hub: RelayHub,
    policy: RelayPolicy,
    shutdown: Arc<AtomicBool>,
}

/// Handle for stopping a running receiver from another thread.
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}

impl DisReceiver {
    /// Bind the receive socket per `config` and join the multicast group when
    /// one is configured.
    pub fn bind(config: &RuntimeConfig, hub: RelayHub, policy: RelayPolicy) -> io::Result<Self> {
        let raw = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        raw.set_reuse_address(true)?;
        raw.set_broadcast(true)?;

        let bind_addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, config.port);
        raw.bind(&SocketAddr::V4(bind_addr).into())?;

        let socket: UdpSocket = raw.into();
        log::info!("[transport] listening on {}", socket.local_addr()?);

        if let Some(group) = config.multicast_group {
            join_group(&socket, group)?;
            log::info!("[transport] joined multicast group {}", group);
        }

        // Periodic wakeup so the loop can observe the shutdown flag.
        socket.set_read_timeout(Some(Duration::from_millis(250)))?;

        Ok(Self {
            socket: Arc::new(socket),
            hub,
            policy,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Address the socket actually bound to (resolves port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
        }
    }

    /// Receive and process a single datagram.
    ///
    /// Returns `Ok(None)` on a read timeout or a datagram that was filtered
    /// or malformed; transport-level errors other than timeouts propagate.
    pub fn poll_once(&self) -> io::Result<Option<Arc<EntityStateReport>>> {
        let mut buffer = [0u8; MAX_DATAGRAM_SIZE];
        let (len, source) = match self.socket.recv_from(&mut buffer) {
            Ok(received) => received,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        Ok(handle_datagram(&self.hub, self.policy, &buffer[..len], source))
    }

    /// Run until the shutdown handle fires.
    ///
    /// Datagram-level problems never break the loop; only socket failures do.
    pub fn run(&self) -> io::Result<()> {
        log::info!("[transport] receive loop started (policy {:?})", self.policy);
        while !self.shutdown.load(Ordering::Relaxed) {
            self.poll_once()?;
        }
        log::info!("[transport] receive loop stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{EntityId, EntityStatePdu};
    use crate::relay::RelayEvent;

    fn test_config() -> RuntimeConfig {
        // Port 0: the OS picks a free port, so tests never collide.
        RuntimeConfig {
            port: 0,
            multicast_group: None,
        }
    }

    #[test]
    fn test_bind_resolves_ephemeral_port() {
        let hub = RelayHub::new();
        let receiver =
            DisReceiver::bind(&test_config(), hub, RelayPolicy::Decoded).expect("bind");
        let addr = receiver.local_addr().expect("local addr");
        assert_ne!(addr.port(), 0);
    }

    #[test]
    fn test_loopback_datagram_reaches_subscriber() {
        let hub = RelayHub::new();
        let sub = hub.subscribe(8);
        let receiver =
            DisReceiver::bind(&test_config(), hub, RelayPolicy::Decoded).expect("bind");
        let port = receiver.local_addr().expect("local addr").port();

        let pdu = EntityStatePdu {
            entity_id: EntityId { site: 9, application: 8, entity: 7 },
            marking: "BRAVO".to_string(),
            location: [crate::geo::WGS84_A, 0.0, 0.0],
            ..EntityStatePdu::default()
        };
        let sender = UdpSocket::bind("127.0.0.1:0").expect("sender bind");
        sender
            .send_to(&pdu.encode(), ("127.0.0.1", port))
            .expect("send");

        // Poll until the datagram arrives; the read timeout bounds each try.
        let mut report = None;
        for _ in 0..20 {
            if let Some(r) = receiver.poll_once().expect("poll") {
                report = Some(r);
                break;
            }
        }
        let report = report.expect("datagram should arrive on loopback");
        assert_eq!(report.marking, "BRAVO");
        assert_eq!(report.entity_id, EntityId { site: 9, application: 8, entity: 7 });

        match sub.try_recv().expect("hub event") {
            RelayEvent::Report(r) => assert_eq!(r.marking, "BRAVO"),
            RelayEvent::Raw { .. } => panic!("decoded policy publishes reports"),
        }
    }

    #[test]
    fn test_garbage_datagram_is_dropped_not_fatal() {
        let hub = RelayHub::new();
        let sub = hub.subscribe(8);
        let receiver =
            DisReceiver::bind(&test_config(), hub, RelayPolicy::Decoded).expect("bind");
        let port = receiver.local_addr().expect("local addr").port();

        let sender = UdpSocket::bind("127.0.0.1:0").expect("sender bind");
        sender.send_to(&[0xFF; 32], ("127.0.0.1", port)).expect("send");

        for _ in 0..3 {
            if receiver.poll_once().expect("poll must not error").is_some() {
                panic!("garbage must not produce a report");
            }
            if sub.try_recv().is_some() {
                panic!("garbage must not reach subscribers");
            }
        }
    }

    #[test]
    fn test_shutdown_stops_run_loop() {
        let hub = RelayHub::new();
        let receiver =
            DisReceiver::bind(&test_config(), hub, RelayPolicy::Decoded).expect("bind");
        let handle = receiver.shutdown_handle();

        let worker = std::thread::spawn(move || receiver.run());
        handle.shutdown();
        worker
            .join()
            .expect("receive thread")
            .expect("run exits cleanly");
    }
}
