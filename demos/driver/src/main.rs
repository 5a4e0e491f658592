//! RDP sender driver.
//!
//! Fills a buffer of `2^power` words, opens a connection with the given link
//! properties, optionally pushes the buffer through it, and closes. The
//! process exits with the status code of the first failure, or 0.

use std::io::Write;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use clap::error::ErrorKind;
use rdp_sender::core::constants::{MAGIC_PORT, MAX_PAYLOAD_SIZE, MAX_PKT_SIZE};
use rdp_sender::{RdpError, RdpResult, SenderConfig, SenderConfigBuilder, SenderSocket};

/// Largest accepted buffer exponent.
const MAX_BUFFER_POWER: u32 = 30;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Arguments {
    /// Receiver host name or dotted-quad address.
    destination: String,
    /// Buffer holds 2^power 32-bit words.
    buffer_power: u32,
    /// Sender window, in packets.
    window: u32,
    /// Round-trip propagation delay, in seconds.
    rtt: f32,
    /// Forward loss probability.
    loss_forward: f32,
    /// Return loss probability.
    loss_return: f32,
    /// Bottleneck link speed, in Mbps.
    speed_mbps: u32,
    /// Port of the receiver.
    #[arg(long, default_value_t = MAGIC_PORT)]
    port: u16,
    /// Send the buffer between open and close.
    #[arg(long)]
    transfer: bool,
    /// Log retransmission detail.
    #[arg(short, long)]
    verbose: bool,
}

impl Arguments {
    fn config(&self) -> RdpResult<SenderConfig> {
        if self.buffer_power > MAX_BUFFER_POWER {
            return Err(RdpError::InvalidArguments(format!(
                "buffer power {} exceeds {MAX_BUFFER_POWER}",
                self.buffer_power
            )));
        }
        SenderConfigBuilder::new()
            .destination(self.destination.clone())
            .port(self.port)
            .window(self.window)
            .rtt(self.rtt)
            .speed(self.speed_mbps as f32 * 1e6)
            .loss(self.loss_forward, self.loss_return)
            .build()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Arguments::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => exit_status(&RdpError::InvalidArguments(e.kind().to_string())),
            };
        }
    };
    init_logger(args.verbose);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("Main:   failed with status {}: {e}", e.status_code());
            exit_status(&e)
        }
    }
}

async fn run(args: &Arguments) -> RdpResult<()> {
    let config = args.config()?;
    println!(
        "Main:   sender W = {}, RTT = {:.3} sec, loss {} / {}, link {} Mbps",
        config.window,
        config.link.rtt,
        config.link.loss_forward(),
        config.link.loss_return(),
        args.speed_mbps
    );

    print!(
        "Main:   initializing u32 array with 2^{} elements... ",
        args.buffer_power
    );
    let _ = std::io::stdout().flush();
    let start = Instant::now();
    let words: Vec<u32> = (0..1u32 << args.buffer_power).collect();
    println!("done in {} ms", start.elapsed().as_millis());

    let mut socket = SenderSocket::bind().await?;

    let start = Instant::now();
    socket.open_config(&config).await?;
    println!(
        "Main:   connected to {} in {:.3} sec, pkt size {MAX_PKT_SIZE} bytes",
        config.destination,
        start.elapsed().as_secs_f64()
    );

    let start = Instant::now();
    if args.transfer {
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_le_bytes()).collect();
        for chunk in bytes.chunks(MAX_PAYLOAD_SIZE) {
            socket.send(chunk).await?;
        }
    }
    let transfer = start.elapsed();

    socket.close().await?;
    println!(
        "Main:   transfer finished in {:.3} sec",
        transfer.as_secs_f64()
    );
    Ok(())
}

fn exit_status(error: &RdpError) -> ExitCode {
    ExitCode::from(u8::try_from(error.status_code()).unwrap_or(u8::MAX))
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}
