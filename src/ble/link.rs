//! Central-link supervision: scanning, connecting, attribute discovery,
//! and subscription for the single peer slot.
//!
//! `LinkSupervisor` is a pure state machine. The BLE driver feeds it
//! `LinkEvent`s and executes the `LinkAction`s it returns; the supervisor
//! itself never touches the radio. All link state (the peer slot, the
//! discovery walk, the subscription flag) lives in this one struct, so a
//! second connection attempt while one is pending is impossible by
//! construction.

use heapless::Vec;

use crate::ble::adv_filter;
use crate::config;

/// First and last valid ATT attribute handles.
pub const ATT_FIRST_HANDLE: u16 = 0x0001;
pub const ATT_LAST_HANDLE: u16 = 0xffff;

/// Raw 48-bit peer address as carried in advertising reports.
pub type PeerAddr = [u8; 6];

/// Connection lifecycle of the single peer slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// Not scanning yet (waiting for the start gate).
    Idle,
    /// Scanning for the target peripheral.
    Scanning,
    /// Connection request in flight.
    Connecting { peer: PeerAddr },
    /// Link established; discovery/subscription progress is tracked
    /// separately.
    Connected { peer: PeerAddr },
}

/// Attribute-walk phase. Each phase issues one discovery request; the
/// shared result event is routed by this tag.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiscoveryPhase {
    /// Locate the vendor primary service.
    Service,
    /// Locate the stream characteristic inside the service.
    Characteristic,
    /// Locate the CCC descriptor behind the characteristic.
    Descriptor,
}

/// UUID a discovery request searches for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TargetUuid {
    /// 16-bit SIG-assigned UUID.
    Short(u16),
    /// 128-bit vendor UUID, little-endian wire order.
    Long([u8; 16]),
}

/// Outcome of a subscribe request. An "already subscribed" answer from
/// the stack is harmless and treated as success.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SubscribeStatus {
    Ok,
    AlreadySubscribed,
    Failed(u8),
}

/// Everything the BLE stack can tell the supervisor.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum LinkEvent<'a> {
    /// An advertising report arrived while scanning.
    DeviceFound {
        peer: PeerAddr,
        adv_type: u8,
        data: &'a [u8],
    },
    /// The pending connection attempt succeeded.
    Connected,
    /// The pending connection attempt failed (synchronous refusal or
    /// error callback).
    ConnectFailed,
    /// The link dropped, any reason code.
    Disconnected { reason: u8 },
    /// One discovery request completed. `None` means no matching
    /// attribute in the searched range.
    DiscoverResult { handle: Option<u16> },
    /// The subscribe request was answered.
    SubscribeResult(SubscribeStatus),
}

/// Everything the supervisor can ask the BLE stack (and the host
/// protocol) to do.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkAction {
    /// Begin scanning after the given delay.
    StartScan { delay_ms: u32 },
    /// Stop the active scan.
    StopScan,
    /// Initiate a connection to the peer.
    Connect { peer: PeerAddr },
    /// Issue one attribute-discovery request.
    Discover {
        phase: DiscoveryPhase,
        uuid: TargetUuid,
        start_handle: u16,
        end_handle: u16,
    },
    /// Write the CCC descriptor to enable notifications on the value
    /// handle.
    Subscribe { value_handle: u16, ccc_handle: u16 },
    /// Subscription is live; tell the host.
    Subscribed,
}

/// Actions produced by one event. A device-found match is the widest
/// case (stop scan, then connect).
pub type LinkActions = Vec<LinkAction, 2>;

/// Progress of the three-step attribute walk for the current connection.
#[derive(Clone, Copy, Debug)]
struct DiscoverySession {
    phase: DiscoveryPhase,
    start_handle: u16,
    end_handle: u16,
    value_handle: Option<u16>,
}

pub struct LinkSupervisor {
    state: LinkState,
    session: Option<DiscoverySession>,
    subscribed: bool,
    rescan_delay_ms: u32,
}

impl LinkSupervisor {
    /// `rescan_delay_ms` is the wait before scanning restarts after a
    /// failed connect or a disconnect. The first scan is always
    /// immediate.
    pub const fn new(rescan_delay_ms: u32) -> Self {
        Self {
            state: LinkState::Idle,
            session: None,
            subscribed: false,
            rescan_delay_ms,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Phase of the walk in progress, `None` once it completed or was
    /// abandoned.
    pub fn discovery_phase(&self) -> Option<DiscoveryPhase> {
        self.session.map(|s| s.phase)
    }

    /// Leave `Idle` and request the first scan. No-op in any other
    /// state, so a repeated start command cannot restart a live link.
    pub fn start(&mut self) -> LinkActions {
        let mut actions = Vec::new();
        if matches!(self.state, LinkState::Idle) {
            self.state = LinkState::Scanning;
            let _ = actions.push(LinkAction::StartScan { delay_ms: 0 });
        }
        actions
    }

    /// The single transition function: consume one event, return the
    /// actions to execute, in order.
    pub fn handle(&mut self, event: LinkEvent<'_>) -> LinkActions {
        match event {
            LinkEvent::DeviceFound {
                peer,
                adv_type,
                data,
            } => self.on_device_found(peer, adv_type, data),
            LinkEvent::Connected => self.on_connected(),
            LinkEvent::ConnectFailed => self.on_connect_failed(),
            LinkEvent::Disconnected { .. } => self.on_disconnected(),
            LinkEvent::DiscoverResult { handle } => self.on_discover_result(handle),
            LinkEvent::SubscribeResult(status) => self.on_subscribe_result(status),
        }
    }

    fn on_device_found(&mut self, peer: PeerAddr, adv_type: u8, data: &[u8]) -> LinkActions {
        let mut actions = Vec::new();
        // Reports are only acted on while scanning; a pending or active
        // connection suppresses further connect attempts.
        if self.state != LinkState::Scanning {
            return actions;
        }
        if !adv_filter::is_connectable(adv_type) {
            return actions;
        }
        if !adv_filter::contains_service_uuid(data, &config::STREAM_SERVICE_UUID_LE) {
            return actions;
        }
        self.state = LinkState::Connecting { peer };
        let _ = actions.push(LinkAction::StopScan);
        let _ = actions.push(LinkAction::Connect { peer });
        actions
    }

    fn on_connected(&mut self) -> LinkActions {
        let mut actions = Vec::new();
        let LinkState::Connecting { peer } = self.state else {
            return actions;
        };
        self.state = LinkState::Connected { peer };
        let session = DiscoverySession {
            phase: DiscoveryPhase::Service,
            start_handle: ATT_FIRST_HANDLE,
            end_handle: ATT_LAST_HANDLE,
            value_handle: None,
        };
        let _ = actions.push(Self::discover_action(&session));
        self.session = Some(session);
        actions
    }

    fn on_connect_failed(&mut self) -> LinkActions {
        let mut actions = Vec::new();
        if matches!(self.state, LinkState::Connecting { .. }) {
            self.state = LinkState::Scanning;
            let _ = actions.push(LinkAction::StartScan {
                delay_ms: self.rescan_delay_ms,
            });
        }
        actions
    }

    /// Full teardown. Every disconnect is treated identically, whatever
    /// the reason code or walk phase: release the slot, drop the
    /// session, clear the subscription, scan again.
    fn on_disconnected(&mut self) -> LinkActions {
        let mut actions = Vec::new();
        if matches!(self.state, LinkState::Idle | LinkState::Scanning) {
            return actions;
        }
        self.session = None;
        self.subscribed = false;
        self.state = LinkState::Scanning;
        let _ = actions.push(LinkAction::StartScan {
            delay_ms: self.rescan_delay_ms,
        });
        actions
    }

    fn on_discover_result(&mut self, handle: Option<u16>) -> LinkActions {
        let mut actions = Vec::new();
        if !matches!(self.state, LinkState::Connected { .. }) {
            return actions;
        }
        let Some(mut session) = self.session.take() else {
            return actions;
        };
        let Some(handle) = handle else {
            // Nothing matched in range. The walk is abandoned; the link
            // stays up, unsubscribed, until the peer drops it.
            return actions;
        };
        match session.phase {
            DiscoveryPhase::Service => {
                session.start_handle = handle.saturating_add(1);
                session.phase = DiscoveryPhase::Characteristic;
                let _ = actions.push(Self::discover_action(&session));
                self.session = Some(session);
            }
            DiscoveryPhase::Characteristic => {
                // The characteristic value sits right behind the
                // declaration attribute.
                session.value_handle = Some(handle.saturating_add(1));
                session.start_handle = handle.saturating_add(2);
                session.phase = DiscoveryPhase::Descriptor;
                let _ = actions.push(Self::discover_action(&session));
                self.session = Some(session);
            }
            DiscoveryPhase::Descriptor => {
                if let Some(value_handle) = session.value_handle {
                    let _ = actions.push(LinkAction::Subscribe {
                        value_handle,
                        ccc_handle: handle,
                    });
                }
                // Walk complete; the session is consumed.
            }
        }
        actions
    }

    fn on_subscribe_result(&mut self, status: SubscribeStatus) -> LinkActions {
        let mut actions = Vec::new();
        if !matches!(self.state, LinkState::Connected { .. }) {
            return actions;
        }
        if self.subscribed {
            return actions;
        }
        match status {
            SubscribeStatus::Ok | SubscribeStatus::AlreadySubscribed => {
                self.subscribed = true;
                // Drivers that run the whole walk in one call close the
                // session here instead of in the descriptor step.
                self.session = None;
                let _ = actions.push(LinkAction::Subscribed);
            }
            SubscribeStatus::Failed(_) => {}
        }
        actions
    }

    fn discover_action(session: &DiscoverySession) -> LinkAction {
        let uuid = match session.phase {
            DiscoveryPhase::Service => TargetUuid::Long(config::STREAM_SERVICE_UUID_LE),
            DiscoveryPhase::Characteristic => TargetUuid::Long(config::STREAM_CHR_UUID_LE),
            DiscoveryPhase::Descriptor => TargetUuid::Short(config::CCC_DESCRIPTOR_UUID),
        };
        LinkAction::Discover {
            phase: session.phase,
            uuid,
            start_handle: session.start_handle,
            end_handle: session.end_handle,
        }
    }
}
