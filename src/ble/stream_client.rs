//! BLE GATT stream client - discovers and subscribes to the vendor
//! stream characteristic on a connected peripheral.
//!
//! After GAP connection is established, this module:
//! 1. Discovers the vendor stream service.
//! 2. Finds the stream characteristic inside it.
//! 3. Enables CCCD notifications on the stream characteristic.
//! 4. Forwards received payloads to the bridge task via the input queue.

use crate::ble::BleErrorTag;
use crate::bridge::BridgeInput;
use crate::config::{BRIDGE_QUEUE_DEPTH, MAX_NOTIFICATION_LEN};
use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use heapless::Vec;
use nrf_softdevice::ble::{gatt_client, Connection};

/// nrf-softdevice GATT client struct for the vendor stream service.
///
/// The `#[nrf_softdevice::gatt_client]` macro generates discovery and
/// notify helpers for the listed characteristic. Discovery resolves the
/// service range first, then the characteristic value handle, then the
/// CCC descriptor handle.
#[nrf_softdevice::gatt_client(uuid = "12345678-1234-5678-1234-56789abcdef0")]
pub struct StreamServiceClient {
    /// Stream payload - notifications carry the data we bridge to UART.
    #[characteristic(uuid = "12345678-1234-5678-1234-56789abcdef1", notify)]
    pub stream: Vec<u8, MAX_NOTIFICATION_LEN>,
}

/// Discover the stream service on the connected peripheral and enable
/// notifications on its characteristic.
///
/// Returns the `StreamServiceClient` on success so the caller can manage
/// the subscription lifetime.
pub async fn discover_and_subscribe(
    conn: &Connection,
) -> Result<StreamServiceClient, BleErrorTag> {
    info!("Discovering stream service...");

    // GATT service/characteristic/descriptor discovery.
    let client: StreamServiceClient = gatt_client::discover(conn)
        .await
        .map_err(|_| BleErrorTag::StreamServiceNotFound)?;

    info!("Stream service discovered");

    // Write the CCC descriptor to turn notifications on.
    client
        .stream_cccd_write(true)
        .await
        .map_err(|_| BleErrorTag::SubscribeFailed)?;

    info!("Subscribed to stream notifications");
    Ok(client)
}

/// Run the notification listener loop.
///
/// Blocks until the connection drops. Each received payload is handed
/// to `inputs` for the bridge task to consume.
pub async fn run_notification_loop(
    conn: &Connection,
    client: &StreamServiceClient,
    inputs: &Sender<'_, CriticalSectionRawMutex, BridgeInput, BRIDGE_QUEUE_DEPTH>,
) {
    info!("Stream notification loop started");

    // gatt_client::run processes GATT events and calls our closure for
    // each notification on the subscribed characteristic.
    let _result = gatt_client::run(conn, client, |event| match event {
        StreamServiceClientEvent::StreamNotification(payload) => {
            // try_send avoids blocking in the event callback; if the
            // bridge task is behind, the payload is dropped.
            if inputs.try_send(BridgeInput::Notification(payload)).is_err() {
                warn!("bridge queue full - dropping notification");
            }
        }
    })
    .await;

    info!("Stream notification loop ended (connection closed)");
}
