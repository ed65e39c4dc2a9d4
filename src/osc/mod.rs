//! Open Sound Control message model
//!
//! An [`OscMessage`] owns the serialized wire form of exactly one OSC 1.0 message, kept in a
//! fixed-capacity buffer, so no heap is needed to build or parse one:
//!
//! ```text
//! [address][NUL][pad->4] [','][tags][NUL][pad->4] [arg0][pad->4] ... [argN][pad->4]
//! ```
//!
//! Messages are built with [`OscMessage::encode`] / [`OscMessage::write`] (see [`encoder`]) and
//! parsed with [`OscMessage::decode`] (see [`decoder`]). Supported argument types are `i`
//! (int32), `f` (float32) and `s` (string).
use core::convert::TryFrom;
#[cfg(feature = "std")]
use core::fmt;
use heapless::Vec;

pub mod decoder;
pub mod encoder;

/// Maximum size of a serialized OSC message
pub const MAX_MESSAGE_SIZE: usize = 1024;
/// Maximum length of an OSC address, without the NUL terminator
pub const MAX_ADDRESS_SIZE: usize = 255;
/// Maximum number of arguments in one message
pub const MAX_ARGUMENTS: usize = 64;

pub const ADDRESS_MARKER: u8 = b'/';
pub const TYPE_TAG_MARKER: u8 = b',';
/// Separator of the textual `kind@value` argument form, see [`Argument::parse`]
pub const ARGUMENT_SEPARATOR: char = '@';

pub type MessageBuffer = Vec<u8, MAX_MESSAGE_SIZE>;

/// Rounds `len` up to the next 4-byte boundary
#[inline]
pub const fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

/// Length on the wire of a NUL-terminated, padded string of `len` bytes
#[inline]
pub const fn padded_str_len(len: usize) -> usize {
    padded_len(len + 1)
}

/// Errors raised while building a message
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum FormatError {
    /// Address is longer than [`MAX_ADDRESS_SIZE`] or does not start with `/`
    AddressTooLong,
    UnsupportedArgumentType(char),
    /// Encoded message does not fit [`MAX_MESSAGE_SIZE`] or the target buffer
    BufferOverflow,
    TooManyArguments,
    /// Address or string argument contains a NUL byte
    EmbeddedNul,
}

/// Errors raised while parsing a received message
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum ParseError {
    MissingAddressMarker,
    MissingTypeTagMarker,
    TruncatedArgument,
    TypeTagArgumentMismatch,
    UnsupportedArgumentType(u8),
    TooManyArguments,
    /// Address or string argument is not valid UTF-8
    InvalidString,
    /// Declared length exceeds the buffer or [`MAX_MESSAGE_SIZE`]
    InvalidLength,
}

/// Errors of the textual `kind@value` argument form
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum ParseArgumentError {
    MissingSeparator,
    InvalidValue,
    Format(FormatError),
}

impl From<FormatError> for ParseArgumentError {
    fn from(e: FormatError) -> ParseArgumentError {
        ParseArgumentError::Format(e)
    }
}

#[cfg(feature = "std")]
impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FormatError::AddressTooLong => write!(
                f,
                "address must start with '/' and be at most {} bytes",
                MAX_ADDRESS_SIZE
            ),
            FormatError::UnsupportedArgumentType(c) => {
                write!(f, "unsupported argument type '{}'", c)
            }
            FormatError::BufferOverflow => write!(f, "message does not fit the buffer"),
            FormatError::TooManyArguments => {
                write!(f, "more than {} arguments", MAX_ARGUMENTS)
            }
            FormatError::EmbeddedNul => write!(f, "string contains a NUL byte"),
        }
    }
}

#[cfg(feature = "std")]
impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::MissingAddressMarker => write!(f, "missing or unterminated address"),
            ParseError::MissingTypeTagMarker => write!(f, "missing or unterminated type tag"),
            ParseError::TruncatedArgument => write!(f, "argument runs past end of message"),
            ParseError::TypeTagArgumentMismatch => {
                write!(f, "type tags do not match argument data")
            }
            ParseError::UnsupportedArgumentType(b) => {
                write!(f, "unsupported argument type {:#04x}", b)
            }
            ParseError::TooManyArguments => write!(f, "more than {} arguments", MAX_ARGUMENTS),
            ParseError::InvalidString => write!(f, "string is not valid UTF-8"),
            ParseError::InvalidLength => write!(f, "declared length exceeds the buffer"),
        }
    }
}

#[cfg(feature = "std")]
impl fmt::Display for ParseArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseArgumentError::MissingSeparator => {
                write!(f, "expected kind{}value", ARGUMENT_SEPARATOR)
            }
            ParseArgumentError::InvalidValue => write!(f, "value does not parse as its kind"),
            ParseArgumentError::Format(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FormatError {}
#[cfg(feature = "std")]
impl std::error::Error for ParseError {}
#[cfg(feature = "std")]
impl std::error::Error for ParseArgumentError {}

/// Type of a single argument, one character of the type tag string
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum TypeTag {
    Int32,
    Float32,
    Text,
}

impl TypeTag {
    pub const fn as_char(self) -> char {
        match self {
            TypeTag::Int32 => 'i',
            TypeTag::Float32 => 'f',
            TypeTag::Text => 's',
        }
    }

    pub const fn as_byte(self) -> u8 {
        self.as_char() as u8
    }
}

impl TryFrom<char> for TypeTag {
    type Error = FormatError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'i' => Ok(TypeTag::Int32),
            'f' => Ok(TypeTag::Float32),
            's' => Ok(TypeTag::Text),
            other => Err(FormatError::UnsupportedArgumentType(other)),
        }
    }
}

impl TryFrom<u8> for TypeTag {
    type Error = ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            b'i' => Ok(TypeTag::Int32),
            b'f' => Ok(TypeTag::Float32),
            b's' => Ok(TypeTag::Text),
            other => Err(ParseError::UnsupportedArgumentType(other)),
        }
    }
}

/// A single typed OSC argument
///
/// `Text` borrows - from the caller when encoding, from the message buffer when decoding.
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum Argument<'a> {
    Int32(i32),
    Float32(f32),
    Text(&'a str),
}

impl<'a> Argument<'a> {
    pub const fn type_tag(&self) -> TypeTag {
        match self {
            Argument::Int32(_) => TypeTag::Int32,
            Argument::Float32(_) => TypeTag::Float32,
            Argument::Text(_) => TypeTag::Text,
        }
    }

    /// Number of bytes this argument occupies on the wire, padding included
    pub const fn encoded_len(&self) -> usize {
        match self {
            Argument::Int32(_) | Argument::Float32(_) => 4,
            Argument::Text(s) => padded_str_len(s.len()),
        }
    }

    /// Parses the textual `kind@value` form, e.g. `i@1`, `f@440.0` or `s@hello`
    pub fn parse(s: &'a str) -> Result<Self, ParseArgumentError> {
        let (kind, value) = s
            .split_once(ARGUMENT_SEPARATOR)
            .ok_or(ParseArgumentError::MissingSeparator)?;
        let mut chars = kind.chars();
        let tag = match (chars.next(), chars.next()) {
            (Some(c), None) => TypeTag::try_from(c)?,
            (Some(c), Some(_)) => return Err(FormatError::UnsupportedArgumentType(c).into()),
            (None, _) => return Err(ParseArgumentError::MissingSeparator),
        };
        match tag {
            TypeTag::Int32 => value
                .parse()
                .map(Argument::Int32)
                .map_err(|_| ParseArgumentError::InvalidValue),
            TypeTag::Float32 => value
                .parse()
                .map(Argument::Float32)
                .map_err(|_| ParseArgumentError::InvalidValue),
            TypeTag::Text => Ok(Argument::Text(value)),
        }
    }
}

impl From<i32> for Argument<'_> {
    fn from(v: i32) -> Self {
        Argument::Int32(v)
    }
}

impl From<f32> for Argument<'_> {
    fn from(v: f32) -> Self {
        Argument::Float32(v)
    }
}

impl<'a> From<&'a str> for Argument<'a> {
    fn from(v: &'a str) -> Self {
        Argument::Text(v)
    }
}

/// Decoded form of an argument, strings point into the message buffer
#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub(crate) enum Slot {
    Int32(i32),
    Float32(f32),
    Text { start: usize, len: usize },
}

/// One OSC message in wire form
///
/// The message is a plain value - construct it, fill it by encoding or decoding, pass it to a
/// [`Transport`](crate::transport::Transport), [`reset`](OscMessage::reset) it for reuse.
#[derive(Clone, PartialEq)]
pub struct OscMessage {
    pub(crate) buf: MessageBuffer,
    pub(crate) address_len: usize,
    pub(crate) tag_start: usize,
    pub(crate) slots: Vec<Slot, MAX_ARGUMENTS>,
}

impl OscMessage {
    /// Creates an empty message (size 0)
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            address_len: 0,
            tag_start: 0,
            slots: Vec::new(),
        }
    }

    /// Empties the message so the storage can be reused
    pub fn reset(&mut self) {
        self.buf.clear();
        self.slots.clear();
        self.address_len = 0;
        self.tag_start = 0;
    }

    /// Serialized wire form, ready to be sent as one datagram
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Size of the wire form, always a multiple of 4
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn address(&self) -> &str {
        self.str_at(0, self.address_len)
    }

    /// Type tag string including the leading `,`, empty for an empty message
    pub fn type_tag(&self) -> &str {
        if self.buf.is_empty() {
            return "";
        }
        self.str_at(self.tag_start, 1 + self.slots.len())
    }

    pub fn arg_count(&self) -> usize {
        self.slots.len()
    }

    pub fn argument(&self, index: usize) -> Option<Argument<'_>> {
        self.slots.get(index).map(|slot| self.resolve(slot))
    }

    pub fn arguments(&self) -> impl Iterator<Item = Argument<'_>> + '_ {
        self.slots.iter().map(move |slot| self.resolve(slot))
    }

    fn resolve(&self, slot: &Slot) -> Argument<'_> {
        match *slot {
            Slot::Int32(v) => Argument::Int32(v),
            Slot::Float32(v) => Argument::Float32(v),
            Slot::Text { start, len } => Argument::Text(self.str_at(start, len)),
        }
    }

    // ranges are validated as in-bounds UTF-8 when the message is built
    fn str_at(&self, start: usize, len: usize) -> &str {
        self.buf
            .get(start..start + len)
            .and_then(|bytes| core::str::from_utf8(bytes).ok())
            .unwrap_or("")
    }
}

impl Default for OscMessage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl fmt::Debug for OscMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "OscMessage {{ address: {:?}, type_tag: {:?}, arguments: [",
            self.address(),
            self.type_tag()
        )?;
        for (i, arg) in self.arguments().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", arg)?;
        }
        write!(f, "], bytes: {:02x?} }}", &self.buf[..])
    }
}
