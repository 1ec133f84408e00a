//! bt2uart firmware entry point.
//!
//! Boots the SoftDevice, brings up the UART host link and spawns the
//! bridge tasks:
//! - SoftDevice runner
//! - BLE central (scan / connect / subscribe)
//! - UART RX command pump
//! - bridge loop (single consumer of the input queue, owns UART TX)

#![no_std]
#![no_main]

mod ble;
mod bridge;
mod config;
mod serial;

use defmt_rtt as _;
use panic_probe as _;

use defmt::info;
use embassy_executor::Spawner;
use embassy_nrf::interrupt::{self, InterruptExt as _};
use embassy_nrf::peripherals;
use embassy_nrf::uarte::{UarteRx, UarteTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::signal::Signal;
use nrf_softdevice::{raw, Softdevice};

use crate::bridge::BridgeInput;
use crate::config::BRIDGE_QUEUE_DEPTH;

/// Single serializing queue for everything the bridge reacts to.
static BRIDGE_INPUTS: Channel<CriticalSectionRawMutex, BridgeInput, BRIDGE_QUEUE_DEPTH> =
    Channel::new();

/// One-shot gate released by the host's start command.
static START_GATE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    info!("SoftDevice task started");
    sd.run().await
}

#[embassy_executor::task]
async fn central_task(
    sd: &'static Softdevice,
    inputs: Sender<'static, CriticalSectionRawMutex, BridgeInput, BRIDGE_QUEUE_DEPTH>,
) -> ! {
    ble::central::run(sd, inputs, &START_GATE).await
}

#[embassy_executor::task]
async fn uart_rx_task(
    rx: UarteRx<'static, peripherals::UARTE0>,
    inputs: Sender<'static, CriticalSectionRawMutex, BridgeInput, BRIDGE_QUEUE_DEPTH>,
) -> ! {
    serial::uart::rx_pump(rx, inputs).await
}

#[embassy_executor::task]
async fn bridge_task(
    inputs: Receiver<'static, CriticalSectionRawMutex, BridgeInput, BRIDGE_QUEUE_DEPTH>,
    tx: UarteTx<'static, peripherals::UARTE0>,
) -> ! {
    serial::uart::bridge_loop(inputs, tx, &START_GATE).await
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t {
            att_mtu: config::BLE_ATT_MTU,
        }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 0,
            central_role_count: 1,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: config::BLE_DEVICE_NAME.as_ptr() as _,
            current_len: config::BLE_DEVICE_NAME.len() as u16,
            max_len: config::BLE_DEVICE_NAME.len() as u16,
            write_perm: unsafe { core::mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("bt2uart booting");

    let mut nrf_config = embassy_nrf::config::Config::default();
    // The SoftDevice reserves interrupt priorities 0, 1 and 4.
    nrf_config.gpiote_interrupt_priority = interrupt::Priority::P2;
    nrf_config.time_interrupt_priority = interrupt::Priority::P2;
    let p = embassy_nrf::init(nrf_config);

    interrupt::UARTE0_UART0.set_priority(interrupt::Priority::P3);

    let (tx, rx) = serial::uart::init(p.UARTE0, p.P0_08, p.P0_06);

    let sd = Softdevice::enable(&softdevice_config());

    spawner.must_spawn(softdevice_task(sd));
    spawner.must_spawn(bridge_task(BRIDGE_INPUTS.receiver(), tx));
    spawner.must_spawn(uart_rx_task(rx, BRIDGE_INPUTS.sender()));
    spawner.must_spawn(central_task(sd, BRIDGE_INPUTS.sender()));

    info!("bt2uart ready");
}
