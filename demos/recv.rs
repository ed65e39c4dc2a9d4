use std::env;
use std::thread;
use std::time::Duration;

use pico_osc::{
    transport::{udp::UdpTransport, DEFAULT_OSC_PORT, DEFAULT_QUEUE_DEPTH},
    DatagramQueue, Endpoint,
};

/// usage: recv [port]
fn main() {
    let port = env::args()
        .nth(1)
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_OSC_PORT);

    let transport = match UdpTransport::bind(Endpoint::new([0, 0, 0, 0], port)) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("Failed to bind port {}. Error: {}", port, e);
            ::std::process::exit(1);
        }
    };
    println!("listening on port {}", port);

    let mut queue = DatagramQueue::<DEFAULT_QUEUE_DEPTH>::new();
    loop {
        if let Err(e) = transport.receive_into(&mut queue) {
            eprintln!("{}", e);
        }
        while let Some(received) = queue.poll() {
            match received.message {
                Ok(message) => println!("{} -> {:?}", received.source, message),
                Err(e) => eprintln!("dropped datagram from {}: {}", received.source, e),
            }
        }
        thread::sleep(Duration::from_millis(10));
    }
}
