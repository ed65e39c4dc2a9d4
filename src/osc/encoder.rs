//! OSC message encoder
//!
//! Encoding is a two step affair - [`encoded_len`] validates the input and computes the exact
//! wire size, only then are bytes written. A failed encode therefore never leaves a partially
//! written buffer behind.
use super::{
    padded_len, padded_str_len, Argument, FormatError, OscMessage, Slot, ADDRESS_MARKER,
    MAX_ADDRESS_SIZE, MAX_ARGUMENTS, MAX_MESSAGE_SIZE, TYPE_TAG_MARKER,
};
use crate::endian;

/// Validates `address` and `args` and returns the size of their wire form
pub fn encoded_len(address: &str, args: &[Argument<'_>]) -> Result<usize, FormatError> {
    if address.len() > MAX_ADDRESS_SIZE || address.as_bytes().first() != Some(&ADDRESS_MARKER) {
        return Err(FormatError::AddressTooLong);
    }
    if address.as_bytes().contains(&0) {
        return Err(FormatError::EmbeddedNul);
    }
    if args.len() > MAX_ARGUMENTS {
        return Err(FormatError::TooManyArguments);
    }

    // ',' + one tag per argument
    let mut len = padded_str_len(address.len()) + padded_str_len(1 + args.len());
    for arg in args {
        if let Argument::Text(s) = arg {
            if s.as_bytes().contains(&0) {
                return Err(FormatError::EmbeddedNul);
            }
        }
        len += arg.encoded_len();
    }
    Ok(len)
}

/// Encodes a message into the caller owned `out` buffer, returns the number of bytes written
///
/// On error `out` is left untouched.
pub fn encode_into(
    address: &str,
    args: &[Argument<'_>],
    out: &mut [u8],
) -> Result<usize, FormatError> {
    let len = encoded_len(address, args)?;
    if len > MAX_MESSAGE_SIZE || len > out.len() {
        return Err(FormatError::BufferOverflow);
    }
    let mut writer = Writer::new(&mut out[..len]);
    writer.put_str(address.as_bytes());
    writer.put_type_tags(args);
    for arg in args {
        writer.put_argument(arg);
    }
    Ok(writer.pos)
}

impl OscMessage {
    /// Builds a new message from an address and ordered arguments
    ///
    /// ```
    /// use pico_osc::{Argument, OscMessage};
    ///
    /// let msg = OscMessage::encode("/trig", &[Argument::Int32(1)]).unwrap();
    /// assert_eq!(msg.as_bytes(), b"/trig\0\0\0,i\0\0\0\0\0\x01");
    /// ```
    pub fn encode(address: &str, args: &[Argument<'_>]) -> Result<OscMessage, FormatError> {
        let mut msg = OscMessage::new();
        msg.write(address, args)?;
        Ok(msg)
    }

    /// Re-encodes this message in place, reusing its storage
    ///
    /// On error the previous contents are kept as they were.
    pub fn write(&mut self, address: &str, args: &[Argument<'_>]) -> Result<(), FormatError> {
        let len = encoded_len(address, args)?;
        if len > MAX_MESSAGE_SIZE {
            return Err(FormatError::BufferOverflow);
        }

        self.reset();
        self.buf
            .resize_default(len)
            .map_err(|_| FormatError::BufferOverflow)?;
        let written = encode_into(address, args, &mut self.buf)?;
        debug_assert_eq!(written, len);

        self.address_len = address.len();
        self.tag_start = padded_str_len(address.len());
        let mut pos = self.tag_start + padded_str_len(1 + args.len());
        for arg in args {
            let slot = match *arg {
                Argument::Int32(v) => Slot::Int32(v),
                Argument::Float32(v) => Slot::Float32(v),
                Argument::Text(s) => Slot::Text {
                    start: pos,
                    len: s.len(),
                },
            };
            // capacity checked by encoded_len
            self.slots
                .push(slot)
                .map_err(|_| FormatError::TooManyArguments)?;
            pos += arg.encoded_len();
        }
        Ok(())
    }
}

/// Cursor over an output slice sized exactly by [`encoded_len`]
struct Writer<'b> {
    out: &'b mut [u8],
    pos: usize,
}

impl<'b> Writer<'b> {
    fn new(out: &'b mut [u8]) -> Self {
        Self { out, pos: 0 }
    }

    fn put(&mut self, bytes: &[u8]) {
        self.out[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }

    /// NUL terminator plus zero padding up to the next 4-byte boundary
    fn terminate(&mut self) {
        let end = padded_len(self.pos + 1);
        self.out[self.pos..end].fill(0);
        self.pos = end;
    }

    fn put_str(&mut self, bytes: &[u8]) {
        self.put(bytes);
        self.terminate();
    }

    fn put_type_tags(&mut self, args: &[Argument<'_>]) {
        self.put(&[TYPE_TAG_MARKER]);
        for arg in args {
            self.put(&[arg.type_tag().as_byte()]);
        }
        self.terminate();
    }

    fn put_argument(&mut self, arg: &Argument<'_>) {
        match *arg {
            Argument::Int32(v) => self.put(&endian::to_network(v).to_ne_bytes()),
            Argument::Float32(v) => self.put(&endian::to_network(v.to_bits()).to_ne_bytes()),
            Argument::Text(s) => self.put_str(s.as_bytes()),
        }
    }
}
