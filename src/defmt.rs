use defmt::Formatter;

use crate::osc::{Argument, FormatError, OscMessage, ParseArgumentError, ParseError, TypeTag};
use crate::transport::{Endpoint, TransportError};

impl defmt::Format for FormatError {
    fn format(&self, fmt: Formatter<'_>) {
        match self {
            FormatError::AddressTooLong => defmt::write!(fmt, "FormatError::AddressTooLong"),
            FormatError::UnsupportedArgumentType(c) => {
                defmt::write!(fmt, "FormatError::UnsupportedArgumentType({=char})", c)
            }
            FormatError::BufferOverflow => defmt::write!(fmt, "FormatError::BufferOverflow"),
            FormatError::TooManyArguments => defmt::write!(fmt, "FormatError::TooManyArguments"),
            FormatError::EmbeddedNul => defmt::write!(fmt, "FormatError::EmbeddedNul"),
        }
    }
}

impl defmt::Format for ParseError {
    fn format(&self, fmt: Formatter<'_>) {
        match self {
            ParseError::MissingAddressMarker => {
                defmt::write!(fmt, "ParseError::MissingAddressMarker")
            }
            ParseError::MissingTypeTagMarker => {
                defmt::write!(fmt, "ParseError::MissingTypeTagMarker")
            }
            ParseError::TruncatedArgument => defmt::write!(fmt, "ParseError::TruncatedArgument"),
            ParseError::TypeTagArgumentMismatch => {
                defmt::write!(fmt, "ParseError::TypeTagArgumentMismatch")
            }
            ParseError::UnsupportedArgumentType(b) => {
                defmt::write!(fmt, "ParseError::UnsupportedArgumentType({=u8:#x})", b)
            }
            ParseError::TooManyArguments => defmt::write!(fmt, "ParseError::TooManyArguments"),
            ParseError::InvalidString => defmt::write!(fmt, "ParseError::InvalidString"),
            ParseError::InvalidLength => defmt::write!(fmt, "ParseError::InvalidLength"),
        }
    }
}

impl defmt::Format for ParseArgumentError {
    fn format(&self, fmt: Formatter<'_>) {
        match self {
            ParseArgumentError::MissingSeparator => {
                defmt::write!(fmt, "ParseArgumentError::MissingSeparator")
            }
            ParseArgumentError::InvalidValue => {
                defmt::write!(fmt, "ParseArgumentError::InvalidValue")
            }
            ParseArgumentError::Format(e) => defmt::write!(fmt, "ParseArgumentError::{}", e),
        }
    }
}

impl defmt::Format for TransportError {
    fn format(&self, fmt: Formatter<'_>) {
        match self {
            TransportError::BindFailed => defmt::write!(fmt, "TransportError::BindFailed"),
            TransportError::SendFailed => defmt::write!(fmt, "TransportError::SendFailed"),
            TransportError::ReceiveFailed => defmt::write!(fmt, "TransportError::ReceiveFailed"),
            TransportError::QueueFull => defmt::write!(fmt, "TransportError::QueueFull"),
            TransportError::Oversized => defmt::write!(fmt, "TransportError::Oversized"),
        }
    }
}

impl defmt::Format for TypeTag {
    fn format(&self, fmt: Formatter<'_>) {
        defmt::write!(fmt, "{=char}", self.as_char())
    }
}

impl defmt::Format for Argument<'_> {
    fn format(&self, fmt: Formatter<'_>) {
        match self {
            Argument::Int32(v) => defmt::write!(fmt, "Int32({=i32})", v),
            Argument::Float32(v) => defmt::write!(fmt, "Float32({=f32})", v),
            Argument::Text(s) => defmt::write!(fmt, "Text({=str})", s),
        }
    }
}

impl defmt::Format for Endpoint {
    fn format(&self, fmt: Formatter<'_>) {
        let [a, b, c, d] = self.ip;
        defmt::write!(fmt, "{=u8}.{=u8}.{=u8}.{=u8}:{=u16}", a, b, c, d, self.port)
    }
}

impl defmt::Format for OscMessage {
    fn format(&self, fmt: Formatter<'_>) {
        defmt::write!(
            fmt,
            "OscMessage {{ address: {=str}, type_tag: {=str}, arguments: [",
            self.address(),
            self.type_tag()
        );
        for (i, arg) in self.arguments().enumerate() {
            if i > 0 {
                defmt::write!(fmt, ", ");
            }
            defmt::write!(fmt, "{}", arg);
        }
        defmt::write!(fmt, "] }}")
    }
}
