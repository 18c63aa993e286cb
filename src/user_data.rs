// ATSC1 user_data_registered_itu_t_t35 envelope validation.

use log::debug;

const COUNTRY_CODE_UNITED_STATES: u8 = 0xB5;
const ATSC_PROVIDER_CODE: u16 = 49;
const ATSC1_IDENTIFIER: &[u8; 4] = b"GA94";
const CAPTION_DATA_TYPE_CODE: u8 = 0x03;

// Validate and strip the ATSC1 envelope of a T.35 SEI payload. On success returns the caption
// data body (payload[8..len-1], the trailing marker byte dropped). Any envelope mismatch yields
// None; a malformed frame should not poison the decoder.
pub fn parse_user_data(payload: &[u8]) -> Option<&[u8]> {
    if payload.len() < 8 {
        debug!("user_data payload too short for ATSC1 envelope ({} bytes)", payload.len());
        return None;
    }

    if payload[0] != COUNTRY_CODE_UNITED_STATES {
        debug!("unexpected country code {:#x}", payload[0]);
        return None;
    }

    let provider_code = u16::from_be_bytes([payload[1], payload[2]]);
    if provider_code != ATSC_PROVIDER_CODE {
        debug!("unexpected provider code {provider_code}");
        return None;
    }

    if &payload[3..7] != ATSC1_IDENTIFIER {
        debug!("unexpected user identifier {:?}", &payload[3..7]);
        return None;
    }

    if payload[7] != CAPTION_DATA_TYPE_CODE {
        debug!("unexpected user_data_type_code {:#x}", payload[7]);
        return None;
    }

    // Drop the trailing marker byte (`cc_data.marker_bits`/terminator); if only the header is
    // present there is no body left to return.
    if payload.len() <= 8 {
        return Some(&[]);
    }
    Some(&payload[8..payload.len() - 1])
}
