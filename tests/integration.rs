//! Integration tests for bt2uart host-testable logic.
//!
//! These stitch the link supervisor, the bridge and the framing layer
//! together the way the firmware tasks do, one event at a time.

use bt2uart::ble::link::{
    DiscoveryPhase, LinkAction, LinkEvent, LinkState, LinkSupervisor, SubscribeStatus,
};
use bt2uart::bridge::{Bridge, BridgeMode, GateEffect};
use bt2uart::config;

const PEER: [u8; 6] = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66];

/// Advertising payload carrying the stream service in a Complete List
/// of 128-bit Service UUIDs record.
fn stream_adv() -> [u8; 18] {
    let mut data = [0u8; 18];
    data[0] = 17;
    data[1] = 0x07;
    data[2..18].copy_from_slice(&config::STREAM_SERVICE_UUID_LE);
    data
}

fn connected_supervisor() -> LinkSupervisor {
    let mut link = LinkSupervisor::new(0);
    link.start();
    let adv = stream_adv();
    link.handle(LinkEvent::DeviceFound {
        peer: PEER,
        adv_type: 0x00,
        data: &adv,
    });
    link.handle(LinkEvent::Connected);
    link
}

/// Run the three-step attribute walk and acknowledge the subscription.
fn walk_to_subscribed(link: &mut LinkSupervisor) {
    link.handle(LinkEvent::DiscoverResult {
        handle: Some(0x0010),
    });
    link.handle(LinkEvent::DiscoverResult {
        handle: Some(0x0011),
    });
    link.handle(LinkEvent::DiscoverResult {
        handle: Some(0x0013),
    });
    link.handle(LinkEvent::SubscribeResult(SubscribeStatus::Ok));
}

#[test]
fn full_session_releases_gate_subscribes_and_flushes() {
    let mut bridge: Bridge<256> = Bridge::new();
    let mut link = LinkSupervisor::new(0);
    let mut wire = [0u8; 300];

    // Host opens the session before any BLE activity.
    assert_eq!(
        bridge.on_host_byte(config::CMD_START, &mut wire),
        GateEffect::ReleaseStart
    );
    assert_eq!(bridge.mode(), BridgeMode::Accumulate);

    // Gate released: scanning begins.
    let actions = link.start();
    assert!(matches!(actions[0], LinkAction::StartScan { .. }));

    // The stream peripheral shows up and the link comes together.
    let adv = stream_adv();
    let actions = link.handle(LinkEvent::DeviceFound {
        peer: PEER,
        adv_type: 0x00,
        data: &adv,
    });
    assert_eq!(actions[0], LinkAction::StopScan);
    assert_eq!(actions[1], LinkAction::Connect { peer: PEER });

    let actions = link.handle(LinkEvent::Connected);
    assert!(matches!(
        actions[0],
        LinkAction::Discover {
            phase: DiscoveryPhase::Service,
            ..
        }
    ));

    // Three-step attribute walk: service, characteristic, descriptor.
    let actions = link.handle(LinkEvent::DiscoverResult {
        handle: Some(0x000c),
    });
    assert!(matches!(
        actions[0],
        LinkAction::Discover {
            phase: DiscoveryPhase::Characteristic,
            ..
        }
    ));
    let actions = link.handle(LinkEvent::DiscoverResult {
        handle: Some(0x000d),
    });
    assert!(matches!(
        actions[0],
        LinkAction::Discover {
            phase: DiscoveryPhase::Descriptor,
            ..
        }
    ));
    let actions = link.handle(LinkEvent::DiscoverResult {
        handle: Some(0x000f),
    });
    assert_eq!(
        actions[0],
        LinkAction::Subscribe {
            value_handle: 0x000e,
            ccc_handle: 0x000f,
        }
    );

    let actions = link.handle(LinkEvent::SubscribeResult(SubscribeStatus::Ok));
    assert_eq!(actions[0], LinkAction::Subscribed);

    // Subscription status reaches the host as a framed byte.
    let n = bridge.subscribed_frame(&mut wire);
    assert_eq!(&wire[..n], &[config::MSG_CONN_OK, config::FRAME_TERMINATOR]);

    // Stream data accumulates until the host asks for it.
    assert_eq!(bridge.on_notification(b"hello ", &mut wire), 0);
    assert_eq!(bridge.on_notification(b"world", &mut wire), 0);
    match bridge.on_host_byte(config::CMD_SEND_DATA, &mut wire) {
        GateEffect::Flush { len } => assert_eq!(&wire[..len], b"hello world\0"),
        _ => panic!("expected flush effect"),
    }
    assert_eq!(bridge.buffered(), 0);
}

#[test]
fn forward_mode_frames_notifications_immediately() {
    // Without a start command the bridge forwards as frames arrive.
    let mut bridge: Bridge<64> = Bridge::new();
    let mut wire = [0u8; 65];

    let n = bridge.on_notification(&[0xde, 0xad], &mut wire);
    assert_eq!(&wire[..n], &[0xde, 0xad, 0x00]);
}

#[test]
fn discovery_exhaustion_leaves_link_degraded_until_disconnect() {
    let mut link = connected_supervisor();

    // Service discovery comes back empty: the walk is abandoned but the
    // link itself is kept.
    let actions = link.handle(LinkEvent::DiscoverResult { handle: None });
    assert!(actions.is_empty());
    assert_eq!(link.state(), LinkState::Connected { peer: PEER });
    assert!(!link.is_subscribed());

    // Only the disconnect restarts the cycle.
    let actions = link.handle(LinkEvent::Disconnected { reason: 0x08 });
    assert!(matches!(actions[0], LinkAction::StartScan { .. }));
    assert_eq!(link.state(), LinkState::Scanning);
}

#[test]
fn next_connection_walks_and_subscribes_afresh() {
    let mut link = connected_supervisor();
    walk_to_subscribed(&mut link);
    assert!(link.is_subscribed());

    link.handle(LinkEvent::Disconnected { reason: 0x13 });
    assert!(!link.is_subscribed());

    // Second cycle goes through the full walk again.
    let adv = stream_adv();
    link.handle(LinkEvent::DeviceFound {
        peer: PEER,
        adv_type: 0x00,
        data: &adv,
    });
    let actions = link.handle(LinkEvent::Connected);
    assert!(matches!(
        actions[0],
        LinkAction::Discover {
            phase: DiscoveryPhase::Service,
            ..
        }
    ));
    walk_to_subscribed(&mut link);
    assert!(link.is_subscribed());
}

#[test]
fn flush_separates_payloads_by_arrival_order() {
    // Same inputs, two arrival orders: frame contents are determined
    // entirely by the order the bridge sees the events.
    let mut wire = [0u8; 64];

    let mut first: Bridge<64> = Bridge::new();
    let _ = first.on_host_byte(config::CMD_START, &mut wire);
    first.on_notification(b"AB", &mut wire);
    first.on_notification(b"CD", &mut wire);
    match first.on_host_byte(config::CMD_SEND_DATA, &mut wire) {
        GateEffect::Flush { len } => assert_eq!(&wire[..len], b"ABCD\0"),
        _ => panic!("expected flush effect"),
    }

    let mut second: Bridge<64> = Bridge::new();
    let _ = second.on_host_byte(config::CMD_START, &mut wire);
    second.on_notification(b"AB", &mut wire);
    match second.on_host_byte(config::CMD_SEND_DATA, &mut wire) {
        GateEffect::Flush { len } => assert_eq!(&wire[..len], b"AB\0"),
        _ => panic!("expected flush effect"),
    }

    // The late payload lands in the next frame.
    second.on_notification(b"CD", &mut wire);
    match second.on_host_byte(config::CMD_SEND_DATA, &mut wire) {
        GateEffect::Flush { len } => assert_eq!(&wire[..len], b"CD\0"),
        _ => panic!("expected flush effect"),
    }
}
