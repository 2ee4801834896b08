//! Key/value messages exchanged with the phone
//!
//! Messages use the AppMessage dictionary layout:
//!
//! ```text
//! u8 count
//! count * { u32 key (LE), u8 type, u16 length (LE), value[length] }
//! ```
//!
//! Integers are 1, 2 or 4 bytes little-endian. C strings carry their NUL terminator.

/// Key carrying the temperature, in both directions.
pub const KEY_TEMPERATURE: u32 = 0;

/// Capacity of a single outbound message.
pub const OUTBOX_CAPACITY: usize = 16;

const TUPLE_HEADER_LEN: usize = 7;

const TYPE_BYTE_ARRAY: u8 = 0;
const TYPE_CSTRING: u8 = 1;
const TYPE_UINT: u8 = 2;
const TYPE_INT: u8 = 3;

/// Reason reported by the transport for a failed or dropped message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AppMessageResult {
    /// No phone connected
    NotConnected,
    /// The phone didn't acknowledge in time
    SendTimeout,
    /// The phone refused the message
    SendRejected,
    /// A message is already in flight
    Busy,
    /// No room left to queue the message
    BufferOverflow,
    /// The message could not be decoded
    InvalidArgument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Buffer ends inside a tuple
    Truncated,
    /// Unsupported tuple type
    UnknownType(u8),
    /// Integer tuple with a length other than 1, 2 or 4
    InvalidLength(u16),
    /// C string that isn't UTF-8 or lacks its terminator
    InvalidUtf8,
    /// Output buffer too small
    BufferOverflow,
}

/// Value of a single tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TupleValue<'a> {
    Bytes(&'a [u8]),
    CString(&'a str),
    Uint(u32),
    Int(i32),
}

impl TupleValue<'_> {
    /// Integer payload as `i32`. Unsigned values are reinterpreted.
    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            TupleValue::Int(value) => Some(value),
            TupleValue::Uint(value) => Some(value as i32),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tuple<'a> {
    pub key: u32,
    pub value: TupleValue<'a>,
}

/// A validated inbound message.
#[derive(Debug, Clone, Copy)]
pub struct Dictionary<'a> {
    count: u8,
    tuples: &'a [u8],
}

impl<'a> Dictionary<'a> {
    /// Validate `bytes` and wrap them for iteration.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, Error> {
        let (&count, tuples) = bytes.split_first().ok_or(Error::Truncated)?;

        let mut rest = tuples;
        for _ in 0..count {
            let (_, tail) = decode_tuple(rest)?;
            rest = tail;
        }
        if !rest.is_empty() {
            debug!("Ignoring {} trailing bytes", rest.len());
        }

        Ok(Self { count, tuples })
    }

    /// Number of tuples.
    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> Tuples<'a> {
        Tuples {
            remaining: self.count,
            rest: self.tuples,
        }
    }

    /// First tuple with the given key.
    pub fn find(&self, key: u32) -> Option<Tuple<'a>> {
        self.iter().find(|tuple| tuple.key == key)
    }
}

impl<'a> IntoIterator for &Dictionary<'a> {
    type Item = Tuple<'a>;
    type IntoIter = Tuples<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the tuples of a [`Dictionary`].
pub struct Tuples<'a> {
    remaining: u8,
    rest: &'a [u8],
}

impl<'a> Iterator for Tuples<'a> {
    type Item = Tuple<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // Already validated by `Dictionary::parse`
        let (tuple, rest) = decode_tuple(self.rest).ok()?;
        self.rest = rest;
        Some(tuple)
    }
}

fn decode_tuple(bytes: &[u8]) -> Result<(Tuple<'_>, &[u8]), Error> {
    if bytes.len() < TUPLE_HEADER_LEN {
        return Err(Error::Truncated);
    }
    let key = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let kind = bytes[4];
    let length = u16::from_le_bytes([bytes[5], bytes[6]]);

    let body = &bytes[TUPLE_HEADER_LEN..];
    if body.len() < length as usize {
        return Err(Error::Truncated);
    }
    let (data, rest) = body.split_at(length as usize);

    let value = match kind {
        TYPE_BYTE_ARRAY => TupleValue::Bytes(data),
        TYPE_CSTRING => {
            let (&last, text) = data.split_last().ok_or(Error::InvalidUtf8)?;
            if last != 0 {
                return Err(Error::InvalidUtf8);
            }
            TupleValue::CString(core::str::from_utf8(text).map_err(|_| Error::InvalidUtf8)?)
        }
        TYPE_UINT => TupleValue::Uint(match *data {
            [b0] => b0 as u32,
            [b0, b1] => u16::from_le_bytes([b0, b1]) as u32,
            [b0, b1, b2, b3] => u32::from_le_bytes([b0, b1, b2, b3]),
            _ => return Err(Error::InvalidLength(length)),
        }),
        TYPE_INT => TupleValue::Int(match *data {
            [b0] => b0 as i8 as i32,
            [b0, b1] => i16::from_le_bytes([b0, b1]) as i32,
            [b0, b1, b2, b3] => i32::from_le_bytes([b0, b1, b2, b3]),
            _ => return Err(Error::InvalidLength(length)),
        }),
        other => return Err(Error::UnknownType(other)),
    };

    Ok((Tuple { key, value }, rest))
}

/// Encodes tuples into a caller provided buffer.
pub struct DictionaryWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> DictionaryWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Result<Self, Error> {
        let first = buf.first_mut().ok_or(Error::BufferOverflow)?;
        *first = 0;
        Ok(Self { buf, len: 1 })
    }

    pub fn write_u8(&mut self, key: u32, value: u8) -> Result<(), Error> {
        self.write(key, TYPE_UINT, &[value])
    }

    pub fn write_i32(&mut self, key: u32, value: i32) -> Result<(), Error> {
        self.write(key, TYPE_INT, &value.to_le_bytes())
    }

    fn write(&mut self, key: u32, kind: u8, data: &[u8]) -> Result<(), Error> {
        let end = self.len + TUPLE_HEADER_LEN + data.len();
        if end > self.buf.len() || self.buf[0] == u8::MAX {
            return Err(Error::BufferOverflow);
        }

        let tuple = &mut self.buf[self.len..end];
        tuple[..4].copy_from_slice(&key.to_le_bytes());
        tuple[4] = kind;
        tuple[5..7].copy_from_slice(&(data.len() as u16).to_le_bytes());
        tuple[TUPLE_HEADER_LEN..].copy_from_slice(data);

        self.buf[0] += 1;
        self.len = end;
        Ok(())
    }

    /// Encoded length.
    pub fn finish(self) -> usize {
        self.len
    }
}

/// An encoded message waiting to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    buf: [u8; OUTBOX_CAPACITY],
    len: usize,
}

impl OutboundMessage {
    /// Ask the phone for a fresh temperature reading.
    ///
    /// The payload is a single zero byte under [`KEY_TEMPERATURE`]; only its arrival matters.
    pub fn temperature_request() -> Self {
        let mut buf = [0; OUTBOX_CAPACITY];
        let mut len = 0;
        if let Ok(mut writer) = DictionaryWriter::new(&mut buf) {
            if writer.write_u8(KEY_TEMPERATURE, 0).is_ok() {
                len = writer.finish();
            }
        }
        Self { buf, len }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}
