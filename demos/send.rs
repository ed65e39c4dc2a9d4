use std::env;
use std::net::SocketAddrV4;

use pico_osc::{
    transport::{udp::UdpTransport, DEFAULT_OSC_PORT},
    Argument, Endpoint, OscMessage, Transport,
};

/// usage: send [ip:port] <address> [i@1 f@2.5 s@text ...]
fn main() {
    let mut args = env::args().skip(1).peekable();

    let destination = match args.peek().and_then(|a| a.parse::<SocketAddrV4>().ok()) {
        Some(addr) => {
            args.next();
            Endpoint::from(addr)
        }
        None => Endpoint::new([127, 0, 0, 1], DEFAULT_OSC_PORT),
    };
    let address = args.next().unwrap_or_else(|| "/ping".to_string());
    let raw_arguments: Vec<String> = args.collect();

    let mut arguments = Vec::new();
    for raw in &raw_arguments {
        match Argument::parse(raw) {
            Ok(argument) => arguments.push(argument),
            Err(e) => {
                eprintln!("could not parse argument \"{}\": {}", raw, e);
                ::std::process::exit(1);
            }
        }
    }

    let message = match OscMessage::encode(&address, &arguments) {
        Ok(message) => message,
        Err(e) => {
            eprintln!("could not encode message: {}", e);
            ::std::process::exit(1);
        }
    };

    match UdpTransport::bind(Endpoint::new([0, 0, 0, 0], 0)) {
        Ok(mut transport) => match transport.send_message(&message, destination) {
            Ok(()) => println!("sent {:?} to {}", message, destination),
            Err(e) => eprintln!("{}", e),
        },
        Err(e) => {
            eprintln!("Failed to bind socket. Error: {}", e);
            ::std::process::exit(1);
        }
    }
}
