//! Advertising-report filtering.
//!
//! Pure functions deciding whether a raw advertising report belongs to
//! the target peripheral: the report must be connectable and its data
//! records must carry the vendor service UUID.

/// GAP advertisement types (Bluetooth Core Vol 6, Part B).
pub const ADV_TYPE_IND: u8 = 0x00;
pub const ADV_TYPE_DIRECT_IND: u8 = 0x01;
pub const ADV_TYPE_SCAN_IND: u8 = 0x02;
pub const ADV_TYPE_NONCONN_IND: u8 = 0x03;
pub const ADV_TYPE_SCAN_RSP: u8 = 0x04;

/// Only undirected and directed connectable advertising may be answered
/// with a connection request.
pub fn is_connectable(adv_type: u8) -> bool {
    adv_type == ADV_TYPE_IND || adv_type == ADV_TYPE_DIRECT_IND
}

/// Check if raw advertisement data carries the given 128-bit service UUID.
///
/// Walks the length-prefixed AD records and inspects the 128-bit
/// service-UUID lists (incomplete 0x06, complete 0x07), comparing each
/// 16-byte entry against `uuid` (little-endian wire order).
pub fn contains_service_uuid(data: &[u8], uuid: &[u8; 16]) -> bool {
    let mut i = 0;
    while i < data.len() {
        let len = data[i] as usize;
        if len == 0 || i + len >= data.len() {
            break;
        }
        let ad_type = data[i + 1];
        if ad_type == 0x06 || ad_type == 0x07 {
            let uuid_data = &data[i + 2..i + 1 + len];
            for chunk in uuid_data.chunks_exact(16) {
                if chunk == uuid {
                    return true;
                }
            }
        }
        i += len + 1;
    }
    false
}
