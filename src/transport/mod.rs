//! Datagram transport seam
//!
//! The codec never touches a socket. Whatever owns the network stack implements [`Transport`]
//! for sending, and hands every received datagram to a [`DatagramQueue`]. The queue only copies
//! bytes, so `on_receive` is safe to call from a receive interrupt or network stack callback;
//! decoding happens later in [`DatagramQueue::poll`], in ordinary control flow.
//!
//! One OSC message per datagram, no bundles.
#[cfg(feature = "std")]
use core::fmt;
use heapless::spsc::{Consumer, Producer, Queue};

use crate::osc::{MessageBuffer, OscMessage, ParseError, MAX_MESSAGE_SIZE};

#[cfg(feature = "std")]
pub mod udp;

/// Port used by the CLI and demos when none is given
pub const DEFAULT_OSC_PORT: u16 = 9000;
/// Queue depth used by the demos, holds `DEFAULT_QUEUE_DEPTH - 1` datagrams
pub const DEFAULT_QUEUE_DEPTH: usize = 8;

#[derive(Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub enum TransportError {
    BindFailed,
    SendFailed,
    ReceiveFailed,
    /// Receive queue has no free slot, the datagram was dropped
    QueueFull,
    /// Datagram is larger than [`MAX_MESSAGE_SIZE`] or its declared length exceeds the buffer
    Oversized,
}

#[cfg(feature = "std")]
impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            TransportError::BindFailed => write!(f, "could not bind socket"),
            TransportError::SendFailed => write!(f, "could not send datagram"),
            TransportError::ReceiveFailed => write!(f, "could not receive datagram"),
            TransportError::QueueFull => write!(f, "receive queue is full"),
            TransportError::Oversized => write!(
                f,
                "datagram is larger than {} bytes",
                MAX_MESSAGE_SIZE
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}

/// IPv4 address and UDP port of a peer
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Debug))]
pub struct Endpoint {
    pub ip: [u8; 4],
    pub port: u16,
}

impl Endpoint {
    pub const fn new(ip: [u8; 4], port: u16) -> Self {
        Self { ip, port }
    }
}

#[cfg(feature = "std")]
impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b, c, d] = self.ip;
        write!(f, "{}.{}.{}.{}:{}", a, b, c, d, self.port)
    }
}

#[cfg(feature = "std")]
impl From<std::net::SocketAddrV4> for Endpoint {
    fn from(addr: std::net::SocketAddrV4) -> Endpoint {
        Endpoint::new(addr.ip().octets(), addr.port())
    }
}

#[cfg(feature = "std")]
impl From<Endpoint> for std::net::SocketAddrV4 {
    fn from(endpoint: Endpoint) -> std::net::SocketAddrV4 {
        std::net::SocketAddrV4::new(endpoint.ip.into(), endpoint.port)
    }
}

/// Sending half provided by the network stack integration
pub trait Transport {
    fn send(&mut self, bytes: &[u8], destination: Endpoint) -> Result<(), TransportError>;

    fn send_message(
        &mut self,
        message: &OscMessage,
        destination: Endpoint,
    ) -> Result<(), TransportError> {
        self.send(message.as_bytes(), destination)
    }
}

/// Raw bytes of one received datagram, not yet parsed
#[derive(Clone)]
pub struct Datagram {
    bytes: MessageBuffer,
    source: Endpoint,
}

impl Datagram {
    /// Copies the first `length` bytes of `bytes`
    pub fn new(bytes: &[u8], length: usize, source: Endpoint) -> Result<Self, TransportError> {
        if length > MAX_MESSAGE_SIZE {
            return Err(TransportError::Oversized);
        }
        let payload = bytes.get(..length).ok_or(TransportError::Oversized)?;
        let bytes = MessageBuffer::from_slice(payload).map_err(|_| TransportError::Oversized)?;
        Ok(Self { bytes, source })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn source(&self) -> Endpoint {
        self.source
    }

    pub fn decode(&self) -> Received {
        let message = OscMessage::decode(&self.bytes, self.bytes.len());
        #[cfg(feature = "defmt-impl")]
        if let Err(e) = &message {
            defmt::warn!("dropping malformed datagram from {}: {}", self.source, e);
        }
        Received {
            source: self.source,
            message,
        }
    }
}

/// Outcome of decoding one queued datagram
///
/// A malformed datagram is reported here and otherwise dropped, it never stops the receiver.
#[cfg_attr(feature = "std", derive(Debug))]
pub struct Received {
    pub source: Endpoint,
    pub message: Result<OscMessage, ParseError>,
}

fn enqueue<const N: usize>(
    producer: &mut Producer<'_, Datagram, N>,
    bytes: &[u8],
    length: usize,
    source: Endpoint,
) -> Result<(), TransportError> {
    let result = Datagram::new(bytes, length, source).and_then(|datagram| {
        producer
            .enqueue(datagram)
            .map_err(|_| TransportError::QueueFull)
    });
    #[cfg(feature = "defmt-impl")]
    if let Err(e) = &result {
        defmt::warn!("dropping datagram from {}: {}", source, e);
    }
    result
}

/// Bounded queue of received datagrams
///
/// Holds up to `N - 1` datagrams. Use it directly when receive and processing share one
/// context, or [`split`](DatagramQueue::split) it into a sink for the receive callback and a
/// source for the main loop.
pub struct DatagramQueue<const N: usize> {
    queue: Queue<Datagram, N>,
}

impl<const N: usize> DatagramQueue<N> {
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
        }
    }

    /// Receive callback - copies the datagram, does not parse it
    pub fn on_receive(
        &mut self,
        bytes: &[u8],
        length: usize,
        source: Endpoint,
    ) -> Result<(), TransportError> {
        self.split().0.on_receive(bytes, length, source)
    }

    /// Decodes the oldest queued datagram
    pub fn poll(&mut self) -> Option<Received> {
        self.queue.dequeue().map(|datagram| datagram.decode())
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    pub fn split(&mut self) -> (DatagramSink<'_, N>, DatagramSource<'_, N>) {
        let (producer, consumer) = self.queue.split();
        (DatagramSink { producer }, DatagramSource { consumer })
    }
}

impl<const N: usize> Default for DatagramQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producing end of a [`DatagramQueue`], lives in the receive callback
pub struct DatagramSink<'q, const N: usize> {
    producer: Producer<'q, Datagram, N>,
}

impl<'q, const N: usize> DatagramSink<'q, N> {
    pub fn on_receive(
        &mut self,
        bytes: &[u8],
        length: usize,
        source: Endpoint,
    ) -> Result<(), TransportError> {
        enqueue(&mut self.producer, bytes, length, source)
    }

    /// Whether another datagram can be accepted
    pub fn ready(&self) -> bool {
        self.producer.ready()
    }
}

/// Consuming end of a [`DatagramQueue`], lives in the main loop
pub struct DatagramSource<'q, const N: usize> {
    consumer: Consumer<'q, Datagram, N>,
}

impl<'q, const N: usize> DatagramSource<'q, N> {
    pub fn poll(&mut self) -> Option<Received> {
        self.consumer.dequeue().map(|datagram| datagram.decode())
    }

    pub fn ready(&self) -> bool {
        self.consumer.ready()
    }
}
