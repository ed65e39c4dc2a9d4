//! OSC message decoder
//!
//! Parses one received datagram in a single forward scan. Everything is bounded by the declared
//! length, malformed or hostile input ends in a [`ParseError`], never in a read past the end.
use core::convert::TryFrom;
use heapless::Vec;

use super::{
    padded_str_len, OscMessage, ParseError, Slot, TypeTag, ADDRESS_MARKER, MAX_ADDRESS_SIZE,
    MAX_ARGUMENTS, MAX_MESSAGE_SIZE, TYPE_TAG_MARKER,
};
use crate::endian;

/// Parses the first `length` bytes of `buffer` into a new message
pub fn decode(buffer: &[u8], length: usize) -> Result<OscMessage, ParseError> {
    let mut msg = OscMessage::new();
    msg.read(buffer, length)?;
    Ok(msg)
}

impl OscMessage {
    /// Parses the first `length` bytes of `buffer`
    ///
    /// ```
    /// use pico_osc::{Argument, OscMessage};
    ///
    /// let data = b"/trig\0\0\0,i\0\0\0\0\0\x01";
    /// let msg = OscMessage::decode(data, data.len()).unwrap();
    /// assert_eq!(msg.address(), "/trig");
    /// assert_eq!(msg.argument(0), Some(Argument::Int32(1)));
    /// ```
    pub fn decode(buffer: &[u8], length: usize) -> Result<OscMessage, ParseError> {
        decode(buffer, length)
    }

    /// Parses into this message, reusing its storage
    ///
    /// On error the previous contents are kept as they were.
    pub fn read(&mut self, buffer: &[u8], length: usize) -> Result<(), ParseError> {
        if length > MAX_MESSAGE_SIZE {
            return Err(ParseError::InvalidLength);
        }
        let data = buffer.get(..length).ok_or(ParseError::InvalidLength)?;
        let parsed = parse(data)?;

        self.reset();
        self.buf
            .extend_from_slice(data)
            .map_err(|_| ParseError::InvalidLength)?;
        self.address_len = parsed.address_len;
        self.tag_start = parsed.tag_start;
        self.slots = parsed.slots;
        Ok(())
    }
}

struct Parsed {
    address_len: usize,
    tag_start: usize,
    slots: Vec<Slot, MAX_ARGUMENTS>,
}

fn parse(data: &[u8]) -> Result<Parsed, ParseError> {
    let mut reader = Reader::new(data);

    if data.first() != Some(&ADDRESS_MARKER) {
        return Err(ParseError::MissingAddressMarker);
    }
    let address_len = reader
        .nul_position()
        .ok_or(ParseError::MissingAddressMarker)?;
    if address_len > MAX_ADDRESS_SIZE {
        return Err(ParseError::MissingAddressMarker);
    }
    check_utf8(&data[..address_len])?;
    // no room left for the type tag after the padded address
    reader
        .skip_str(address_len)
        .ok_or(ParseError::MissingTypeTagMarker)?;

    let tag_start = reader.pos;
    if reader.peek() != Some(TYPE_TAG_MARKER) {
        return Err(ParseError::MissingTypeTagMarker);
    }
    let tag_len = reader
        .nul_position()
        .ok_or(ParseError::MissingTypeTagMarker)?;
    let tags = &data[tag_start + 1..tag_start + tag_len];
    if tags.len() > MAX_ARGUMENTS {
        return Err(ParseError::TooManyArguments);
    }
    reader
        .skip_str(tag_len)
        .ok_or(ParseError::MissingTypeTagMarker)?;

    let mut slots = Vec::<Slot, MAX_ARGUMENTS>::new();
    for &tag in tags {
        let tag = TypeTag::try_from(tag)?;
        if reader.is_at_end() {
            return Err(ParseError::TypeTagArgumentMismatch);
        }
        let slot = match tag {
            TypeTag::Int32 => {
                let word = reader.take_word().ok_or(ParseError::TruncatedArgument)?;
                Slot::Int32(endian::from_network(i32::from_ne_bytes(word)))
            }
            TypeTag::Float32 => {
                let word = reader.take_word().ok_or(ParseError::TruncatedArgument)?;
                Slot::Float32(f32::from_bits(endian::from_network(u32::from_ne_bytes(
                    word,
                ))))
            }
            TypeTag::Text => {
                let start = reader.pos;
                let len = reader
                    .nul_position()
                    .ok_or(ParseError::TruncatedArgument)?;
                reader.skip_str(len).ok_or(ParseError::TruncatedArgument)?;
                check_utf8(&data[start..start + len])?;
                Slot::Text { start, len }
            }
        };
        slots
            .push(slot)
            .map_err(|_| ParseError::TooManyArguments)?;
    }

    // leftover bytes are argument data without a type tag
    if !reader.is_at_end() {
        return Err(ParseError::TypeTagArgumentMismatch);
    }

    Ok(Parsed {
        address_len,
        tag_start,
        slots,
    })
}

fn check_utf8(bytes: &[u8]) -> Result<(), ParseError> {
    core::str::from_utf8(bytes)
        .map(|_| ())
        .map_err(|_| ParseError::InvalidString)
}

/// Forward-only cursor, every access is checked against the slice end
struct Reader<'b> {
    data: &'b [u8],
    pos: usize,
}

impl<'b> Reader<'b> {
    fn new(data: &'b [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Length of the string starting at the cursor, `None` when it is not NUL-terminated
    fn nul_position(&self) -> Option<usize> {
        self.data.get(self.pos..)?.iter().position(|b| *b == 0)
    }

    /// Skips a string of `len` bytes with its terminator and padding
    fn skip_str(&mut self, len: usize) -> Option<()> {
        let end = self.pos + padded_str_len(len);
        if end > self.data.len() {
            return None;
        }
        self.pos = end;
        Some(())
    }

    fn take_word(&mut self) -> Option<[u8; 4]> {
        let bytes = self.data.get(self.pos..self.pos + 4)?;
        let mut word = [0u8; 4];
        word.copy_from_slice(bytes);
        self.pos += 4;
        Some(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osc::{Argument, FormatError};
    use rand::{thread_rng, Rng};

    #[test]
    fn test_decode_float_message() {
        let data = b"/synth/freq\0,f\0\0\x43\xdc\x00\x00";
        let msg = decode(data, data.len()).unwrap();
        assert_eq!(msg.address(), "/synth/freq");
        assert_eq!(msg.type_tag(), ",f");
        assert_eq!(msg.argument(0), Some(Argument::Float32(440.0)));
        assert_eq!(msg.as_bytes(), &data[..]);
    }

    #[test]
    fn test_decode_mixed_arguments() {
        let original = OscMessage::encode(
            "/mixer/ch/1",
            &[
                Argument::Text("gain"),
                Argument::Float32(-3.5),
                Argument::Int32(i32::MAX),
                Argument::Text(""),
            ],
        )
        .unwrap();
        let msg = decode(original.as_bytes(), original.len()).unwrap();
        assert_eq!(msg.address(), "/mixer/ch/1");
        assert_eq!(msg.type_tag(), ",sfis");
        let args: std::vec::Vec<_> = msg.arguments().collect();
        assert_eq!(
            args,
            vec![
                Argument::Text("gain"),
                Argument::Float32(-3.5),
                Argument::Int32(i32::MAX),
                Argument::Text(""),
            ]
        );
        assert_eq!(msg, original);
    }

    #[test]
    fn test_decode_respects_length() {
        // trailing garbage beyond the declared length is ignored
        let mut data = [0xffu8; 32];
        data[..16].copy_from_slice(b"/trig\0\0\0,i\0\0\0\0\0\x07");
        let msg = decode(&data, 16).unwrap();
        assert_eq!(msg.argument(0), Some(Argument::Int32(7)));
        assert_eq!(msg.len(), 16);
    }

    #[test]
    fn test_decode_missing_address_marker() {
        let data = b"trig\0\0\0\0,i\0\0\0\0\0\x01";
        assert_eq!(
            decode(data, data.len()),
            Err(ParseError::MissingAddressMarker)
        );
        assert_eq!(decode(&[], 0), Err(ParseError::MissingAddressMarker));
    }

    #[test]
    fn test_decode_unterminated_address() {
        let data = b"/abcdefg";
        assert_eq!(
            decode(data, data.len()),
            Err(ParseError::MissingAddressMarker)
        );
        // the NUL exists but past the declared length
        let data = b"/abcdefg\0\0\0\0";
        assert_eq!(decode(data, 8), Err(ParseError::MissingAddressMarker));
    }

    #[test]
    fn test_decode_missing_type_tag() {
        let data = b"/trig\0\0\0";
        assert_eq!(
            decode(data, data.len()),
            Err(ParseError::MissingTypeTagMarker)
        );
        let data = b"/trig\0\0\0i\0\0\0\0\0\0\x01";
        assert_eq!(
            decode(data, data.len()),
            Err(ParseError::MissingTypeTagMarker)
        );
        let data = b"/trig\0\0\0,iii";
        assert_eq!(
            decode(data, data.len()),
            Err(ParseError::MissingTypeTagMarker)
        );
    }

    #[test]
    fn test_decode_truncated_int() {
        let data = b"/trig\0\0\0,i\0\0\0\x01";
        assert_eq!(
            decode(data, data.len()),
            Err(ParseError::TruncatedArgument)
        );
    }

    #[test]
    fn test_decode_truncated_string() {
        let data = b"/a\0\0,s\0\0abcd";
        assert_eq!(
            decode(data, data.len()),
            Err(ParseError::TruncatedArgument)
        );
        // terminator present, padding cut off
        let data = b"/a\0\0,s\0\0ab\0";
        assert_eq!(
            decode(data, data.len()),
            Err(ParseError::TruncatedArgument)
        );
    }

    #[test]
    fn test_decode_tag_without_argument() {
        let data = b"/a\0\0,ii\0\0\0\0\x01";
        assert_eq!(
            decode(data, data.len()),
            Err(ParseError::TypeTagArgumentMismatch)
        );
    }

    #[test]
    fn test_decode_argument_without_tag() {
        let data = b"/a\0\0,i\0\0\0\0\0\x01\0\0\0\x02";
        assert_eq!(
            decode(data, data.len()),
            Err(ParseError::TypeTagArgumentMismatch)
        );
    }

    #[test]
    fn test_decode_unsupported_type() {
        let data = b"/a\0\0,b\0\0\0\0\0\x01";
        assert_eq!(
            decode(data, data.len()),
            Err(ParseError::UnsupportedArgumentType(b'b'))
        );
    }

    #[test]
    fn test_decode_invalid_utf8() {
        let data = b"/\xff\0\0,\0\0\0";
        assert_eq!(decode(data, data.len()), Err(ParseError::InvalidString));
        let data = b"/a\0\0,s\0\0\xc3\0\0\0";
        assert_eq!(decode(data, data.len()), Err(ParseError::InvalidString));
    }

    #[test]
    fn test_decode_invalid_length() {
        let data = b"/a\0\0,\0\0\0";
        assert_eq!(decode(data, 9), Err(ParseError::InvalidLength));
        let big = [0u8; MAX_MESSAGE_SIZE + 4];
        assert_eq!(
            decode(&big, MAX_MESSAGE_SIZE + 4),
            Err(ParseError::InvalidLength)
        );
    }

    #[test]
    fn test_decode_too_many_tags() {
        let mut data = [0u8; 4 + 68];
        data[..2].copy_from_slice(b"/a");
        data[4] = b',';
        for b in &mut data[5..5 + MAX_ARGUMENTS + 1] {
            *b = b'i';
        }
        assert_eq!(
            decode(&data, data.len()),
            Err(ParseError::TooManyArguments)
        );
    }

    #[test]
    fn test_read_failure_keeps_previous_contents() {
        let mut msg = OscMessage::encode("/keep", &[Argument::Text("me")]).unwrap();
        let before = msg.clone();
        let data = b"/trig\0\0\0,i\0\0\0\x01";
        assert_eq!(
            msg.read(data, data.len()),
            Err(ParseError::TruncatedArgument)
        );
        assert_eq!(msg, before);
    }

    #[test]
    fn test_read_reuses_message() {
        let mut msg = OscMessage::encode("/old", &[Argument::Int32(1), Argument::Int32(2)]).unwrap();
        let data = b"/new\0\0\0\0,\0\0\0";
        msg.read(data, data.len()).unwrap();
        assert_eq!(msg.address(), "/new");
        assert_eq!(msg.arg_count(), 0);
        assert_eq!(msg.type_tag(), ",");
    }

    #[test]
    fn test_every_prefix_is_rejected() {
        let msg = OscMessage::encode(
            "/prefix",
            &[
                Argument::Int32(1),
                Argument::Text("abcdef"),
                Argument::Float32(2.0),
            ],
        )
        .unwrap();
        for length in 0..msg.len() {
            assert!(
                decode(msg.as_bytes(), length).is_err(),
                "prefix of {} bytes decoded",
                length
            );
        }
        assert!(decode(msg.as_bytes(), msg.len()).is_ok());
    }

    #[test]
    fn test_random_garbage_never_panics() {
        let mut rng = thread_rng();
        let mut arr = [0u8; MAX_MESSAGE_SIZE];
        for _ in 0..64 {
            rng.try_fill(&mut arr[..]).unwrap();
            // bias towards structurally plausible input
            arr[0] = b'/';
            let length = rng.gen_range(0, MAX_MESSAGE_SIZE + 1);
            if let Ok(msg) = decode(&arr, length) {
                assert_eq!(msg.len() % 4, 0);
                assert_eq!(msg.arg_count() + 1, msg.type_tag().len());
            }
        }
    }

    #[test]
    fn test_tag_argument_parity() {
        for args in [
            &[][..],
            &[Argument::Int32(1)][..],
            &[Argument::Text("a"), Argument::Text("bb"), Argument::Float32(0.0)][..],
        ] {
            let encoded = OscMessage::encode("/p", args).unwrap();
            let msg = decode(encoded.as_bytes(), encoded.len()).unwrap();
            assert_eq!(msg.arg_count(), msg.type_tag().len() - 1);
            assert_eq!(msg.arg_count(), args.len());
        }
    }

    #[test]
    fn test_format_error_is_not_parse_error() {
        // encode guards what decode would reject
        assert_eq!(
            OscMessage::encode("nope", &[]),
            Err(FormatError::AddressTooLong)
        );
        let data = b"nope\0\0\0\0,\0\0\0";
        assert_eq!(
            decode(data, data.len()),
            Err(ParseError::MissingAddressMarker)
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum OwnedArgument {
            Int32(i32),
            Float32(f32),
            Text(String),
        }

        impl OwnedArgument {
            fn as_argument(&self) -> Argument<'_> {
                match self {
                    OwnedArgument::Int32(v) => Argument::Int32(*v),
                    OwnedArgument::Float32(v) => Argument::Float32(*v),
                    OwnedArgument::Text(s) => Argument::Text(s),
                }
            }
        }

        fn argument_strategy() -> impl Strategy<Value = OwnedArgument> {
            prop_oneof![
                any::<i32>().prop_map(OwnedArgument::Int32),
                any::<f32>()
                    .prop_filter("NaN never compares equal", |f| !f.is_nan())
                    .prop_map(OwnedArgument::Float32),
                "[a-zA-Z0-9 _/.-]{0,40}".prop_map(OwnedArgument::Text),
            ]
        }

        proptest! {
            /// Property: any valid message survives encode then decode
            #[test]
            fn prop_roundtrip(
                address in "/[a-z0-9_/]{0,60}",
                owned in prop::collection::vec(argument_strategy(), 0..=16),
            ) {
                let args: std::vec::Vec<Argument<'_>> =
                    owned.iter().map(OwnedArgument::as_argument).collect();
                let encoded = OscMessage::encode(&address, &args).unwrap();
                prop_assert_eq!(encoded.len() % 4, 0);

                let decoded = decode(encoded.as_bytes(), encoded.len()).unwrap();
                prop_assert_eq!(decoded.address(), address.as_str());
                let decoded_args: std::vec::Vec<Argument<'_>> = decoded.arguments().collect();
                prop_assert_eq!(decoded_args, args);
                prop_assert_eq!(decoded.arg_count(), decoded.type_tag().len() - 1);
            }

            /// Property: decode never panics, whatever the bytes and length
            #[test]
            fn prop_decode_arbitrary_bytes(
                data in prop::collection::vec(any::<u8>(), 0..256),
                cut in 0usize..256,
            ) {
                let length = cut.min(data.len());
                if let Ok(msg) = decode(&data, length) {
                    prop_assert_eq!(msg.len(), length);
                    prop_assert_eq!(msg.len() % 4, 0);
                }
            }
        }
    }
}
