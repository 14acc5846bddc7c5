// src/protocol/packet.rs
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use std::borrow::Cow;
use std::io::{Cursor, Read};

use super::DecodeError;
use crate::models::game::GameStatus;

/// The status request. Opaque and fixed: the server ignores anything else.
pub const STATUS_REQUEST: [u8; 13] = [
    b'f', b'H', 0x07, 0x00, 0x00, 0x00, b'=', 0x1E, 0x02, 0x11, b'E', 0x05, 0x00,
];

pub const HEADER_LEN: usize = 7;
/// Magic, encoding tag and the length field. The length counts every byte after these.
pub const LENGTH_PREFIX_LEN: usize = 6;
/// The body starts after the header and three further bytes.
pub const PAYLOAD_OFFSET: usize = 10;
pub const MAX_FRAME_LEN: usize = 64 * 1024;

pub const NUM_NATIONS: usize = 250;
pub const BYTES_PER_NATION: usize = 3;
pub const NATION_BLOCK_LEN: usize = NUM_NATIONS * BYTES_PER_NATION;

/// Every fixed-width body field: 6 bytes, 6 bytes, u32 timer, u8, u32 turn, u32, u8.
pub const FIXED_FIELDS_LEN: usize = 6 + 6 + 4 + 1 + 4 + 4 + 1;
pub const MIN_BODY_LEN: usize = FIXED_FIELDS_LEN + NATION_BLOCK_LEN;
/// Game names are short; anything longer is a hostile or broken reply.
pub const MAX_NAME_LEN: usize = 1024;
pub const MAX_BODY_LEN: usize = MIN_BODY_LEN + MAX_NAME_LEN;

const MAGIC: u8 = b'f';
const PLAIN_TAG: u8 = b'H';
const COMPRESSED_TAG: u8 = b'J';
const CLOSE_CODE: u8 = 11;

const MS_PER_HOUR: f64 = 3_600_000.0;

pub type NationSlot = [u8; BYTES_PER_NATION];

/// `< c c L B`: magic, encoding tag, little-endian length, one flag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub magic: u8,
    pub encoding: u8,
    pub length: u32,
    pub flag: u8,
}

impl PacketHeader {
    pub fn parse(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < HEADER_LEN {
            return Err(DecodeError::TooShort {
                expected: HEADER_LEN,
                actual: buf.len(),
            });
        }

        Ok(Self {
            magic: buf[0],
            encoding: buf[1],
            length: LittleEndian::read_u32(&buf[2..LENGTH_PREFIX_LEN]),
            flag: buf[LENGTH_PREFIX_LEN],
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0] = self.magic;
        out[1] = self.encoding;
        LittleEndian::write_u32(&mut out[2..LENGTH_PREFIX_LEN], self.length);
        out[LENGTH_PREFIX_LEN] = self.flag;
        out
    }

    pub fn is_compressed(&self) -> bool {
        self.encoding == COMPRESSED_TAG
    }

    /// Total frame size this header announces, prefix included.
    pub fn frame_len(&self) -> usize {
        LENGTH_PREFIX_LEN + self.length as usize
    }
}

/// Sent after the reply to tell the server we are done. Never answered.
pub fn close_request() -> [u8; HEADER_LEN] {
    PacketHeader {
        magic: MAGIC,
        encoding: PLAIN_TAG,
        length: 1,
        flag: CLOSE_CODE,
    }
    .to_bytes()
}

/// How long the frame in `buf` will be once complete, if enough of it has arrived to tell.
pub fn expected_frame_len(buf: &[u8]) -> Option<usize> {
    if buf.len() < LENGTH_PREFIX_LEN {
        return None;
    }
    Some(LENGTH_PREFIX_LEN + LittleEndian::read_u32(&buf[2..LENGTH_PREFIX_LEN]) as usize)
}

/// Length of the null-padded game name in a body of `body_len` bytes.
///
/// The name is the only variable field, so it takes whatever the fixed fields and the
/// nation block leave over. A miscount here shifts every field after the name.
pub fn name_field_len(body_len: usize) -> Result<usize, DecodeError> {
    body_len
        .checked_sub(MIN_BODY_LEN)
        .ok_or(DecodeError::NegativeNameLength {
            body_len,
            minimum: MIN_BODY_LEN,
        })
}

/// Milliseconds to hours, rounded to two decimals.
pub fn hours_remaining(remaining_ms: u32) -> f64 {
    (f64::from(remaining_ms) / MS_PER_HOUR * 100.0).round() / 100.0
}

/// The decoded general-info body.
///
/// The nation block is kept raw. Its per-byte meaning is not documented anywhere we
/// trust, so controller and turn state come from the hosting API instead.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralInfo {
    pub preamble: [u8; 6],
    pub name: String,
    pub settings: [u8; 6],
    pub remaining_ms: u32,
    pub timer_flag: u8,
    pub nation_slots: Vec<NationSlot>,
    pub turn: u32,
    pub trailer: u32,
    pub tail: u8,
}

impl GeneralInfo {
    pub fn parse(body: &[u8]) -> Result<Self, DecodeError> {
        let name_len = name_field_len(body.len())?;
        let mut cursor = Cursor::new(body);

        let mut preamble = [0u8; 6];
        cursor.read_exact(&mut preamble)?;

        let mut raw_name = vec![0u8; name_len];
        cursor.read_exact(&mut raw_name)?;
        while raw_name.last() == Some(&0) {
            raw_name.pop();
        }
        let name = String::from_utf8_lossy(&raw_name).into_owned();

        let mut settings = [0u8; 6];
        cursor.read_exact(&mut settings)?;
        let remaining_ms = cursor.read_u32::<LittleEndian>()?;
        let timer_flag = cursor.read_u8()?;

        let mut nation_slots = Vec::with_capacity(NUM_NATIONS);
        for _ in 0..NUM_NATIONS {
            let mut slot: NationSlot = [0; BYTES_PER_NATION];
            cursor.read_exact(&mut slot)?;
            nation_slots.push(slot);
        }

        let turn = cursor.read_u32::<LittleEndian>()?;
        let trailer = cursor.read_u32::<LittleEndian>()?;
        let tail = cursor.read_u8()?;

        Ok(Self {
            preamble,
            name,
            settings,
            remaining_ms,
            timer_flag,
            nation_slots,
            turn,
            trailer,
            tail,
        })
    }

    pub fn hours_remaining(&self) -> f64 {
        hours_remaining(self.remaining_ms)
    }

    pub fn status(&self) -> GameStatus {
        GameStatus {
            name: self.name.clone(),
            turn: self.turn,
            hours_remaining: self.hours_remaining(),
        }
    }

    /// Serializes back into body layout. Used to fake servers.
    pub fn to_body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(MIN_BODY_LEN + self.name.len());
        body.extend_from_slice(&self.preamble);
        body.extend_from_slice(self.name.as_bytes());
        body.extend_from_slice(&self.settings);
        body.extend_from_slice(&self.remaining_ms.to_le_bytes());
        body.push(self.timer_flag);
        for slot in self.nation_slots.iter().take(NUM_NATIONS) {
            body.extend_from_slice(slot);
        }
        let missing = NUM_NATIONS.saturating_sub(self.nation_slots.len());
        body.extend(std::iter::repeat(0u8).take(missing * BYTES_PER_NATION));
        body.extend_from_slice(&self.turn.to_le_bytes());
        body.extend_from_slice(&self.trailer.to_le_bytes());
        body.push(self.tail);
        body
    }
}

/// Strips the header, inflates if flagged, and unpacks the body.
pub fn decode_frame(frame: &[u8]) -> Result<GeneralInfo, DecodeError> {
    let header = PacketHeader::parse(frame)?;
    if header.magic != MAGIC {
        return Err(DecodeError::BadMagic(header.magic));
    }

    let declared = header.frame_len();
    if declared > MAX_FRAME_LEN {
        return Err(DecodeError::FrameTooLarge(declared));
    }
    if declared < PAYLOAD_OFFSET || frame.len() < declared {
        return Err(DecodeError::Truncated {
            declared,
            actual: frame.len(),
        });
    }

    let payload = &frame[PAYLOAD_OFFSET..declared];
    let body: Cow<'_, [u8]> = if header.is_compressed() {
        // One byte past the limit is enough to tell an oversized body apart.
        let mut inflated = Vec::with_capacity(MIN_BODY_LEN + 64);
        ZlibDecoder::new(payload)
            .take(MAX_BODY_LEN as u64 + 1)
            .read_to_end(&mut inflated)
            .map_err(DecodeError::Decompress)?;
        Cow::Owned(inflated)
    } else {
        Cow::Borrowed(payload)
    };

    if body.len() > MAX_BODY_LEN {
        return Err(DecodeError::BodyTooLarge {
            limit: MAX_BODY_LEN,
        });
    }

    GeneralInfo::parse(&body)
}
