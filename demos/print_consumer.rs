//! Minimal Live Link consumer
//!
//! Listens for producers and prints every decoded message. Frames are
//! summarized once per second per subject to avoid spam.
//!
//! Run with: cargo run --example print_consumer [BIND_ADDR]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use livelink_rs::protocol::constants::MAX_MESSAGE_SIZE;
use livelink_rs::protocol::read_message;
use tokio::net::{TcpListener, TcpStream};

async fn handle_producer(mut socket: TcpStream, peer: SocketAddr) {
    let mut last_report: HashMap<String, Instant> = HashMap::new();
    let mut frames: HashMap<String, u64> = HashMap::new();

    loop {
        let msg = match read_message(&mut socket, MAX_MESSAGE_SIZE).await {
            Ok(Some(msg)) => msg,
            Ok(None) => {
                println!("[{}] Producer closed connection", peer);
                return;
            }
            Err(e) => {
                println!("[{}] Read error: {}", peer, e);
                return;
            }
        };

        match msg.command.as_str() {
            "hello" => println!(
                "[{}] Hello: interface={:?} version={:?}",
                peer,
                msg.body.get_string("interface"),
                msg.body.get_number("version")
            ),
            "subject" => println!(
                "[{}] Subject: {:?} role={:?}",
                peer,
                msg.subject(),
                msg.body.get_string("role")
            ),
            "frame" => {
                let subject = msg.subject().unwrap_or_default().to_string();
                *frames.entry(subject.clone()).or_default() += 1;

                let due = last_report
                    .get(&subject)
                    .map_or(true, |at| at.elapsed() >= Duration::from_secs(1));
                if due {
                    println!(
                        "[{}] Frame: {} worldTime={:?} total={} data={:?}",
                        peer,
                        subject,
                        msg.body.get_number("worldTime"),
                        frames[&subject],
                        msg.body.get("data")
                    );
                    last_report.insert(subject, Instant::now());
                }
            }
            "goodbye" => println!("[{}] Goodbye", peer),
            other => println!("[{}] Unknown command: {}", peer, other),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("livelink_rs=debug".parse()?),
        )
        .init();

    let bind_addr: SocketAddr = match std::env::args().nth(1) {
        Some(arg) => arg.replace("localhost", "127.0.0.1").parse()?,
        None => "127.0.0.1:11111".parse()?,
    };

    let listener = TcpListener::bind(bind_addr).await?;
    println!("Listening on {}", bind_addr);

    loop {
        let (socket, peer) = listener.accept().await?;
        println!("[{}] Producer connected", peer);
        tokio::spawn(handle_producer(socket, peer));
    }
}
