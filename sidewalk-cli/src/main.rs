use std::error::Error;

use bitvec::prelude::*;
use clap::{Parser, Subcommand};
use sidewalk_codec::protocol::{CommandClass, NormalId, OpCode};
use sidewalk_codec::{CustomData, Message, MessageHeader, TimestampMode};

/// Inspect and build Sidewalk sensor monitoring messages
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a hex-encoded message to JSON
    Decode {
        /// Message bytes as hex
        hex: String,

        /// Exact bit length of the message; trailing pad bits beyond it
        /// are discarded. Defaults to all bits of the input.
        #[arg(long)]
        bits: Option<usize>,
    },

    /// Decode a 3-byte custom data value to a storage record
    DecodeCustomData {
        /// Value bytes as hex (6 hex digits)
        hex: String,

        /// Device the measurement came from
        #[arg(long, default_value = "unknown")]
        device_id: String,

        /// Epoch milliseconds to stamp the record with
        #[arg(long, conflicts_with = "gps")]
        time_ms: Option<i64>,

        /// Stamp with GPS-epoch seconds instead of wall-clock milliseconds
        #[arg(long)]
        gps: bool,
    },

    /// Encode the action request header and print it as hex
    EncodeActionReq,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    match args.command {
        Command::Decode { hex, bits } => {
            let bytes = hex::decode(hex)?;
            let all_bits = bytes.view_bits::<Msb0>();
            let len = bits.unwrap_or(all_bits.len());
            if len > all_bits.len() {
                return Err(format!("--bits {len} exceeds the {} input bits", all_bits.len()).into());
            }
            let message = Message::decode(&all_bits[..len])?;
            println!("{}", serde_json::to_string_pretty(&message_json(&message))?);
        }
        Command::DecodeCustomData {
            hex,
            device_id,
            time_ms,
            gps,
        } => {
            let bytes = hex::decode(hex)?;
            let data = CustomData::from_slice(&bytes)?;
            let mode = match (time_ms, gps) {
                (Some(ms), _) => TimestampMode::Explicit(ms),
                (None, true) => TimestampMode::GpsSeconds,
                (None, false) => TimestampMode::WallClock,
            };
            let record = data.into_record(device_id, mode);
            println!("{}", serde_json::to_string_pretty(&record.to_json())?);
        }
        Command::EncodeActionReq => {
            let header = MessageHeader::new(OpCode::Write, CommandClass::Default, NormalId::ActionReq)?;
            let bits = header.encode()?;
            // pad to whole bytes for transport
            let mut padded = bits.clone();
            padded.resize(padded.len().div_ceil(8) * 8, false);
            println!("{} ({} bits)", hex::encode(padded.into_vec()), bits.len());
        }
    }

    Ok(())
}

fn message_json(message: &Message) -> serde_json::Value {
    let records: Vec<serde_json::Value> = message
        .records
        .iter()
        .map(|record| {
            serde_json::json!({
                "tag": record.tag.to_string(),
                "format": record.format.to_string(),
                "length": record.declared_len(),
                "value": hex::encode(&record.value),
            })
        })
        .collect();

    serde_json::json!({
        "op": message.header.op.to_string(),
        "class": message.header.class.to_string(),
        "id": message.header.id.to_string(),
        "records": records,
    })
}
