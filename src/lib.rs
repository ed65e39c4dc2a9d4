//! Open Sound Control message codec for UDP on embedded network stacks
//!
//! [`OscMessage`] holds one OSC 1.0 message in a fixed-capacity buffer. Encoding and decoding
//! work without a heap, so the crate runs on `no_std` targets with the `std` feature off.
//!
//! ```
//! use pico_osc::{Argument, OscMessage};
//!
//! let msg = OscMessage::encode("/synth/freq", &[Argument::Float32(440.0)]).unwrap();
//! assert_eq!(msg.len(), 20);
//!
//! let decoded = OscMessage::decode(msg.as_bytes(), msg.len()).unwrap();
//! assert_eq!(decoded.address(), "/synth/freq");
//! assert_eq!(decoded.argument(0), Some(Argument::Float32(440.0)));
//! ```
//!
//! Sending and receiving are left to the network stack, see [`transport`].

#![cfg_attr(not(feature = "std"), no_std)]

pub mod endian;
pub mod osc;
pub mod transport;

// include defmt::Format implementations
// we don't want them derive()d in the modules unless defmt-impl feature is set
#[cfg(feature = "defmt-impl")]
pub mod defmt;

// reexport heapless
pub use heapless;

pub use osc::{
    decoder::decode, encoder::encode_into, Argument, FormatError, OscMessage, ParseArgumentError,
    ParseError, TypeTag, MAX_ADDRESS_SIZE, MAX_ARGUMENTS, MAX_MESSAGE_SIZE,
};
pub use transport::{DatagramQueue, Endpoint, Received, Transport, TransportError};
