//! BLE central driver - executes link supervisor actions against the
//! SoftDevice.
//!
//! The supervisor decides, the driver does: scanning, connecting, GATT
//! discovery and the notification loop all run here, and every
//! milestone is fed back into the supervisor as an event. The driver
//! never takes a lifecycle decision of its own.

use crate::ble::link::{LinkAction, LinkActions, LinkEvent, LinkSupervisor, SubscribeStatus};
use crate::ble::{adv_filter, stream_client, BleErrorTag};
use crate::bridge::BridgeInput;
use crate::config;
use crate::config::BRIDGE_QUEUE_DEPTH;
use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::{central, Address, Connection};
use nrf_softdevice::{raw, Softdevice};

/// Retry pause after the SoftDevice refuses to start a scan.
const SCAN_RETRY_MS: u64 = 1000;

/// Run the central role forever: scan, connect, subscribe, bridge,
/// rescan on teardown.
///
/// When `WAIT_FOR_START_COMMAND` is set the whole cycle stays parked
/// until the host's start command releases `start_gate`.
pub async fn run(
    sd: &'static Softdevice,
    inputs: Sender<'static, CriticalSectionRawMutex, BridgeInput, BRIDGE_QUEUE_DEPTH>,
    start_gate: &'static Signal<CriticalSectionRawMutex, ()>,
) -> ! {
    if config::WAIT_FOR_START_COMMAND {
        info!("BLE central gated - waiting for host start command");
        start_gate.wait().await;
    }

    let mut link = LinkSupervisor::new(config::RESCAN_DELAY_MS);
    link.start();
    info!("BLE central started - scanning for stream peripheral");

    loop {
        let target = match scan_for_peer(sd, &mut link).await {
            Ok(address) => address,
            Err(_) => {
                warn!("BLE scan failed to start - retrying");
                Timer::after(Duration::from_millis(SCAN_RETRY_MS)).await;
                continue;
            }
        };

        // The supervisor already issued StopScan; returning from the
        // scan future has stopped the scanner.
        let whitelist = [&target];
        let conn_cfg = central::ConnectConfig {
            scan_config: central::ScanConfig {
                whitelist: Some(&whitelist),
                ..Default::default()
            },
            conn_params: raw::ble_gap_conn_params_t {
                min_conn_interval: config::BLE_CONN_INTERVAL_MIN,
                max_conn_interval: config::BLE_CONN_INTERVAL_MAX,
                slave_latency: config::BLE_PERIPHERAL_LATENCY,
                conn_sup_timeout: config::BLE_SUP_TIMEOUT,
            },
            ..Default::default()
        };

        let conn = match central::connect(sd, &conn_cfg).await {
            Ok(conn) => conn,
            Err(_) => {
                warn!("GAP connect failed");
                let actions = link.handle(LinkEvent::ConnectFailed);
                wait_rescan(&actions).await;
                continue;
            }
        };

        info!("Connected to {}", target);
        link.handle(LinkEvent::Connected);

        match stream_client::discover_and_subscribe(&conn).await {
            Ok(client) => {
                let actions = link.handle(LinkEvent::SubscribeResult(SubscribeStatus::Ok));
                if actions.contains(&LinkAction::Subscribed) {
                    inputs.send(BridgeInput::Subscribed).await;
                }
                stream_client::run_notification_loop(&conn, &client, &inputs).await;
            }
            Err(tag) => {
                warn!("Stream setup failed: {}", tag);
                match tag {
                    BleErrorTag::StreamServiceNotFound => {
                        link.handle(LinkEvent::DiscoverResult { handle: None });
                    }
                    _ => {
                        link.handle(LinkEvent::SubscribeResult(SubscribeStatus::Failed(0)));
                    }
                }
                hold_until_disconnect(&conn).await;
            }
        }

        info!("Link closed");
        let actions = link.handle(LinkEvent::Disconnected { reason: 0 });
        wait_rescan(&actions).await;
    }
}

/// Scan until the supervisor picks a peer to connect to.
///
/// Every advertisement report is fed into the supervisor; when it
/// answers with a `Connect` action the scan stops and the peer address
/// is handed to the connect path.
async fn scan_for_peer(
    sd: &Softdevice,
    link: &mut LinkSupervisor,
) -> Result<Address, BleErrorTag> {
    // Passive scan; the stream service UUID rides in the primary
    // advertising payload, so scan responses are not needed.
    let scan_cfg = central::ScanConfig::default();

    central::scan(sd, &scan_cfg, |params| {
        let data =
            unsafe { core::slice::from_raw_parts(params.data.p_data, params.data.len as usize) };
        let peer = params.peer_addr.addr;
        let adv_type = report_adv_type(params);

        let actions = link.handle(LinkEvent::DeviceFound {
            peer,
            adv_type,
            data,
        });

        if actions.contains(&LinkAction::Connect { peer }) {
            let address = Address::from_raw(params.peer_addr);
            info!("Stream peripheral found: {} (RSSI {})", address, params.rssi);
            Some(address)
        } else {
            None
        }
    })
    .await
    .map_err(|_| BleErrorTag::ScanFailed)
}

/// Collapse the S140 extended report type bitfield back into the
/// classic GAP PDU constants the advertisement filter understands.
fn report_adv_type(params: &raw::ble_gap_evt_adv_report_t) -> u8 {
    let kind = &params.type_;
    if kind.scan_response() != 0 {
        adv_filter::ADV_TYPE_SCAN_RSP
    } else if kind.directed() != 0 {
        adv_filter::ADV_TYPE_DIRECT_IND
    } else if kind.connectable() != 0 {
        adv_filter::ADV_TYPE_IND
    } else if kind.scannable() != 0 {
        adv_filter::ADV_TYPE_SCAN_IND
    } else {
        adv_filter::ADV_TYPE_NONCONN_IND
    }
}

/// Honour the rescan delay attached to the supervisor's `StartScan`
/// action before the next scan pass begins.
async fn wait_rescan(actions: &LinkActions) {
    for action in actions.iter() {
        if let LinkAction::StartScan { delay_ms } = action {
            if *delay_ms > 0 {
                Timer::after(Duration::from_millis(*delay_ms as u64)).await;
            }
        }
    }
}

/// Park on a link that failed stream setup. No data will ever flow, but
/// the link is not torn down from this side; the hold ends when the
/// peer or the supervision timeout closes the connection.
async fn hold_until_disconnect(conn: &Connection) {
    while conn.handle().is_some() {
        Timer::after(Duration::from_secs(1)).await;
    }
}
