//! UARTE host link - command pump and frame writer.
//!
//! Initialises the nRF52840 UARTE0 peripheral and runs the two tasks
//! that talk to the host: an RX pump feeding command bytes into the
//! bridge queue, and the bridge loop itself, which owns the bridge
//! state and the TX half so every frame reaches the wire in order.

use crate::bridge::{Bridge, BridgeInput, GateEffect};
use crate::config::{BRIDGE_BUFFER_CAPACITY, BRIDGE_QUEUE_DEPTH, MAX_FRAME_LEN};
use defmt::{info, warn};
use embassy_nrf::{bind_interrupts, peripherals, uarte};
use embassy_nrf::uarte::{Uarte, UarteRx, UarteTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_sync::signal::Signal;

bind_interrupts!(struct Irqs {
    UARTE0_UART0 => uarte::InterruptHandler<peripherals::UARTE0>;
});

/// Initialise the UART host link and split it into TX/RX halves.
///
/// Must be called exactly once.
pub fn init(
    uarte: peripherals::UARTE0,
    rxd: peripherals::P0_08,
    txd: peripherals::P0_06,
) -> (
    UarteTx<'static, peripherals::UARTE0>,
    UarteRx<'static, peripherals::UARTE0>,
) {
    let mut cfg = uarte::Config::default();
    cfg.parity = uarte::Parity::EXCLUDED;
    cfg.baudrate = uarte::Baudrate::BAUD115200;

    let uart = Uarte::new(uarte, Irqs, rxd, txd, cfg);

    info!("UART host link initialised (115200 8N1)");

    uart.split()
}

/// Read host bytes one at a time and feed them into the bridge queue.
///
/// Every inbound byte is treated as a potential command; the bridge
/// decides which ones mean anything.
pub async fn rx_pump(
    mut rx: UarteRx<'static, peripherals::UARTE0>,
    inputs: Sender<'static, CriticalSectionRawMutex, BridgeInput, BRIDGE_QUEUE_DEPTH>,
) -> ! {
    info!("UART rx task started - listening for host commands");

    let mut byte = [0u8; 1];
    loop {
        match rx.read(&mut byte).await {
            Ok(()) => inputs.send(BridgeInput::HostByte(byte[0])).await,
            Err(e) => warn!("UART rx read failed: {:?}", e),
        }
    }
}

/// Single consumer of the bridge queue.
///
/// Owns the bridge state and the UART TX half, so notification handling
/// and host commands are serialized by construction and frames cannot
/// interleave on the wire.
pub async fn bridge_loop(
    inputs: Receiver<'static, CriticalSectionRawMutex, BridgeInput, BRIDGE_QUEUE_DEPTH>,
    mut tx: UarteTx<'static, peripherals::UARTE0>,
    start_gate: &'static Signal<CriticalSectionRawMutex, ()>,
) -> ! {
    info!("Bridge task started - waiting for inputs");

    let mut bridge: Bridge<BRIDGE_BUFFER_CAPACITY> = Bridge::new();
    let mut frame = [0u8; MAX_FRAME_LEN];

    loop {
        let written = match inputs.receive().await {
            BridgeInput::Notification(payload) => bridge.on_notification(&payload, &mut frame),
            BridgeInput::HostByte(byte) => match bridge.on_host_byte(byte, &mut frame) {
                GateEffect::None => 0,
                GateEffect::ReleaseStart => {
                    info!("Host start command - releasing the scan gate");
                    start_gate.signal(());
                    0
                }
                GateEffect::Flush { len } => {
                    info!("Host flush command - {} byte frame", len);
                    len
                }
            },
            BridgeInput::Subscribed => bridge.subscribed_frame(&mut frame),
        };

        if written > 0 {
            if let Err(e) = tx.write(&frame[..written]).await {
                warn!("UART tx write failed: {:?}", e);
            }
        }
    }
}
