use std::env;

use pico_osc::{Argument, OscMessage, MAX_MESSAGE_SIZE};

const USAGE: &str = "usage: oscmsg <address> [i@<int>|f@<float>|s@<text>]...\n       oscmsg --decode <hex>";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None | Some("--help") => Err(USAGE.into()),
        Some("--decode") => decode(args.get(1).ok_or(USAGE)?),
        Some(address) => encode(address, &args[1..]),
    }
}

fn encode(address: &str, raw_arguments: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let arguments = raw_arguments
        .iter()
        .map(|a| Argument::parse(a))
        .collect::<Result<Vec<_>, _>>()?;
    let message = OscMessage::encode(address, &arguments)?;

    let mut hex = [0u8; 2 * MAX_MESSAGE_SIZE];
    let hex_len = base16::encode_config_slice(message.as_bytes(), base16::EncodeLower, &mut hex);
    println!("{}", std::str::from_utf8(&hex[..hex_len])?);
    Ok(())
}

fn decode(hex: &str) -> Result<(), Box<dyn std::error::Error>> {
    let clean = match hex.starts_with("0x") || hex.starts_with("0X") {
        true => &hex[2..],
        false => hex,
    };
    if clean.len() / 2 > MAX_MESSAGE_SIZE {
        return Err(format!("message longer than {} bytes", MAX_MESSAGE_SIZE).into());
    }

    let mut bytes = [0u8; MAX_MESSAGE_SIZE];
    let len = base16::decode_slice(clean, &mut bytes)
        .map_err(|e| format!("invalid hex: {:?}", e))?;
    let message = OscMessage::decode(&bytes, len)?;

    println!("address:  {}", message.address());
    println!("type tag: {}", message.type_tag());
    for (i, argument) in message.arguments().enumerate() {
        println!("  [{}] {:?}", i, argument);
    }
    Ok(())
}
