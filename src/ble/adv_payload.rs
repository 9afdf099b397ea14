//! Legacy advertising payload construction.
//!
//! Each AD structure is `[len, type, data...]` where `len` covers the
//! type byte and the data. A legacy payload holds at most 31 bytes.

use heapless::Vec;

/// Maximum legacy advertising / scan response payload length.
pub const MAX_ADV_DATA_LEN: usize = 31;

pub const AD_TYPE_FLAGS: u8 = 0x01;
pub const AD_TYPE_INCOMPLETE_UUID16: u8 = 0x02;
pub const AD_TYPE_COMPLETE_UUID16: u8 = 0x03;
pub const AD_TYPE_SHORTENED_NAME: u8 = 0x08;
pub const AD_TYPE_COMPLETE_NAME: u8 = 0x09;

/// LE General Discoverable Mode.
pub const FLAG_LE_GENERAL_DISC: u8 = 0x02;
/// BR/EDR Not Supported.
pub const FLAG_BR_EDR_NOT_SUPPORTED: u8 = 0x04;

pub type AdvData = Vec<u8, MAX_ADV_DATA_LEN>;

/// Advertising data: discoverability flags followed by the local name.
///
/// A name that does not fit is cut and sent as a Shortened Local Name.
pub fn advertising_data(name: &str) -> AdvData {
    let mut data = AdvData::new();
    push_structure(
        &mut data,
        AD_TYPE_FLAGS,
        &[FLAG_LE_GENERAL_DISC | FLAG_BR_EDR_NOT_SUPPORTED],
    );

    let room = MAX_ADV_DATA_LEN - data.len() - 2;
    if name.len() <= room {
        push_structure(&mut data, AD_TYPE_COMPLETE_NAME, name.as_bytes());
    } else {
        // Never split a UTF-8 sequence.
        let mut cut = room;
        while !name.is_char_boundary(cut) {
            cut -= 1;
        }
        push_structure(&mut data, AD_TYPE_SHORTENED_NAME, name[..cut].as_bytes());
    }
    data
}

/// Scan response listing 16-bit service UUIDs (little-endian on air).
///
/// UUIDs that do not fit are dropped and the list is marked incomplete.
pub fn scan_response(service_uuids: &[u16]) -> AdvData {
    let mut data = AdvData::new();
    if service_uuids.is_empty() {
        return data;
    }

    let fit = ((MAX_ADV_DATA_LEN - 2) / 2).min(service_uuids.len());
    let ad_type = if fit == service_uuids.len() {
        AD_TYPE_COMPLETE_UUID16
    } else {
        AD_TYPE_INCOMPLETE_UUID16
    };

    let mut uuids: Vec<u8, MAX_ADV_DATA_LEN> = Vec::new();
    for uuid in &service_uuids[..fit] {
        let _ = uuids.extend_from_slice(&uuid.to_le_bytes());
    }
    push_structure(&mut data, ad_type, &uuids);
    data
}

/// Iterate over the `(type, data)` pairs of a payload, stopping at the
/// first malformed structure.
pub fn ad_structures(data: &[u8]) -> impl Iterator<Item = (u8, &[u8])> {
    let mut i = 0;
    core::iter::from_fn(move || {
        let len = *data.get(i)? as usize;
        if len == 0 || i + len >= data.len() {
            return None;
        }
        let ad_type = data[i + 1];
        let body = &data[i + 2..i + 1 + len];
        i += len + 1;
        Some((ad_type, body))
    })
}

fn push_structure(data: &mut AdvData, ad_type: u8, body: &[u8]) {
    // Callers size `body` to the remaining room.
    let _ = data.push(body.len() as u8 + 1);
    let _ = data.push(ad_type);
    let _ = data.extend_from_slice(body);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(data: &[u8], ad_type: u8) -> Option<&[u8]> {
        ad_structures(data)
            .find(|(t, _)| *t == ad_type)
            .map(|(_, body)| body)
    }

    #[test]
    fn advertising_data_has_flags_and_name() {
        let data = advertising_data("NRF52_ADC");
        assert_eq!(
            data.as_slice(),
            &[
                0x02, 0x01, 0x06, // flags
                0x0A, 0x09, b'N', b'R', b'F', b'5', b'2', b'_', b'A', b'D', b'C',
            ]
        );
    }

    #[test]
    fn long_name_is_shortened_to_fit() {
        let name = "A-very-long-device-name-that-overflows";
        let data = advertising_data(name);
        assert_eq!(data.len(), MAX_ADV_DATA_LEN);
        assert_eq!(find(&data, AD_TYPE_COMPLETE_NAME), None);
        let short = find(&data, AD_TYPE_SHORTENED_NAME).unwrap();
        assert_eq!(short, &name.as_bytes()[..26]);
    }

    #[test]
    fn shortened_name_ends_on_a_char_boundary() {
        // 25 ASCII bytes, then a two-byte char straddling the 26-byte limit.
        let name = "abcdefghijklmnopqrstuvwxyé";
        let data = advertising_data(name);
        let short = find(&data, AD_TYPE_SHORTENED_NAME).unwrap();
        assert_eq!(short, b"abcdefghijklmnopqrstuvwxy");
        assert!(core::str::from_utf8(short).is_ok());
    }

    #[test]
    fn scan_response_lists_uuids_little_endian() {
        let data = scan_response(&[0xFFF0, 0x180A]);
        assert_eq!(data.as_slice(), &[0x05, 0x03, 0xF0, 0xFF, 0x0A, 0x18]);
    }

    #[test]
    fn scan_response_marks_truncated_list_incomplete() {
        let uuids = [0x1800u16; 20];
        let data = scan_response(&uuids);
        let body = find(&data, AD_TYPE_INCOMPLETE_UUID16).unwrap();
        assert_eq!(body.len(), 28);
        assert!(data.len() <= MAX_ADV_DATA_LEN);
    }

    #[test]
    fn empty_uuid_list_gives_empty_scan_response() {
        assert!(scan_response(&[]).is_empty());
    }

    #[test]
    fn parser_stops_at_zero_length() {
        let data = [0x02, 0x01, 0x06, 0x00, 0x09, b'x'];
        assert_eq!(ad_structures(&data).count(), 1);
    }

    #[test]
    fn parser_stops_at_truncated_structure() {
        let data = [0x05, 0x09, b'a', b'b'];
        assert_eq!(ad_structures(&data).count(), 0);
    }
}
