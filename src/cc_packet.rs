// CC packet extraction from a validated ATSC1 caption-data body.

// One CEA-708 cc_data_pkt entry carrying a CEA-608 byte pair. Only field_type == 0 (NTSC field
// 1) packets are ever decoded by Cea608Stream; field_type == 1 packets are extracted here but
// the decoder drops them on sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CcPacket {
    pub field_type: u8,
    pub pts: i64,
    pub cc_data: u16,
}

const CC_DATA_PRESENT: u8 = 0x40;
const CC_COUNT_MASK: u8 = 0x1F;
const CC_VALID: u8 = 0x04;
const FIELD_TYPE_MASK: u8 = 0x03;

// Extract the cc_data_pkt triples from body (the bytes returned by
// user_data::parse_user_data), tagging each with pts. A filler packet (the 0x40 bit clear in
// byte 0) or a zero count contributes nothing. If count * 3 + 2 would run past the end of
// body, extraction stops at the last full triple rather than reading out of bounds.
pub fn extract_cc_packets(body: &[u8], pts: i64) -> Vec<CcPacket> {
    let mut out = Vec::new();

    let Some(&header) = body.first() else {
        return out;
    };
    if header & CC_DATA_PRESENT == 0 {
        return out;
    }

    let count = (header & CC_COUNT_MASK) as usize;
    for i in 0..count {
        let off = i * 3;
        let Some(&flags) = body.get(off + 2) else {
            break;
        };
        let (Some(&b3), Some(&b4)) = (body.get(off + 3), body.get(off + 4)) else {
            break;
        };

        if flags & CC_VALID == 0 {
            continue;
        }

        out.push(CcPacket {
            field_type: flags & FIELD_TYPE_MASK,
            pts,
            cc_data: ((b3 as u16) << 8) | b4 as u16,
        });
    }

    out
}
