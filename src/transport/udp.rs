//! Host side UDP transport over `std::net`
//!
//! Lets desktop tools and tests talk to OSC devices through the same [`Transport`] and
//! [`DatagramQueue`] seams an embedded network stack integration uses.
use std::io::ErrorKind;
use std::net::{SocketAddr, SocketAddrV4, UdpSocket};

use super::{DatagramQueue, Endpoint, Transport, TransportError};
use crate::osc::MAX_MESSAGE_SIZE;

/// Non-blocking UDP socket
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Binds to `local`, port 0 picks a free port
    pub fn bind(local: Endpoint) -> Result<Self, TransportError> {
        let socket =
            UdpSocket::bind(SocketAddrV4::from(local)).map_err(|_| TransportError::BindFailed)?;
        socket
            .set_nonblocking(true)
            .map_err(|_| TransportError::BindFailed)?;
        Ok(Self { socket })
    }

    pub fn local_endpoint(&self) -> Result<Endpoint, TransportError> {
        match self.socket.local_addr() {
            Ok(SocketAddr::V4(addr)) => Ok(addr.into()),
            _ => Err(TransportError::BindFailed),
        }
    }

    /// Moves every pending datagram into `queue`, returns how many were queued
    ///
    /// Stops early once the queue is full, the rest stays in the socket buffer. Oversized
    /// datagrams and datagrams from IPv6 peers are dropped.
    pub fn receive_into<const N: usize>(
        &self,
        queue: &mut DatagramQueue<N>,
    ) -> Result<usize, TransportError> {
        // one spare byte to detect oversized datagrams
        let mut scratch = [0u8; MAX_MESSAGE_SIZE + 1];
        let mut queued = 0;
        while !queue.is_full() {
            match self.socket.recv_from(&mut scratch) {
                Ok((length, SocketAddr::V4(source))) => {
                    match queue.on_receive(&scratch, length, source.into()) {
                        Ok(()) => queued += 1,
                        Err(TransportError::Oversized) => (),
                        Err(e) => return Err(e),
                    }
                }
                Ok((_, SocketAddr::V6(_))) => (),
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(_) => return Err(TransportError::ReceiveFailed),
            }
        }
        Ok(queued)
    }
}

impl Transport for UdpTransport {
    fn send(&mut self, bytes: &[u8], destination: Endpoint) -> Result<(), TransportError> {
        self.socket
            .send_to(bytes, SocketAddrV4::from(destination))
            .map(|_| ())
            .map_err(|_| TransportError::SendFailed)
    }
}
