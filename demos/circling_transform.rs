//! Circling transform producer
//!
//! Streams a single transform subject, "circle", moving around a circle on
//! the X-Y plane 100 units above the origin.
//!
//! Run with: cargo run --example circling_transform [CONSUMER_ADDR]
//!
//! Start a consumer first, for example:
//!   cargo run --example print_consumer 127.0.0.1:11111
//!   cargo run --example circling_transform 127.0.0.1:11111

use std::net::SocketAddr;
use std::time::Duration;

use livelink_rs::{LiveLink, Transform, API_VERSION};

/// Number of circles to perform
const CIRCLES: f64 = 30.0;

/// Radius of the circle on the X-Y plane
const CIRCLE_RADIUS: f64 = 200.0;

/// Number of steps over all circles
const STEP_COUNT: u32 = 10_000;

/// Units above the origin
const HEIGHT: f32 = 100.0;

/// Frame interval (not exact)
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if LiveLink::version() != API_VERSION {
        eprintln!("error: wrong version");
        std::process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("livelink_rs=info".parse()?),
        )
        .init();

    let addr: SocketAddr = match std::env::args().nth(1) {
        Some(arg) => arg.replace("localhost", "127.0.0.1").parse()?,
        None => "127.0.0.1:11111".parse()?,
    };

    let link = LiveLink::tcp(addr);
    link.set_connection_callback(|| println!("Connection changed"));
    link.initialize("CirclingTransform")?;

    println!("Starting...");

    link.set_transform_structure("circle", None)?;

    let mut xform = Transform::identity();
    xform.translation[2] = HEIGHT;

    let step = 2.0 * std::f64::consts::PI * CIRCLES / STEP_COUNT as f64;
    let mut angle: f64 = 0.0;
    let mut world_time = 0.0;

    for _ in 0..STEP_COUNT {
        xform.translation[0] = (angle.sin() * CIRCLE_RADIUS) as f32;
        xform.translation[1] = (angle.cos() * CIRCLE_RADIUS) as f32;

        link.update_transform_frame("circle", world_time, None, None, &xform)?;

        angle += step;
        std::thread::sleep(FRAME_INTERVAL);
        world_time += FRAME_INTERVAL.as_millis() as f64;
    }

    let stats = link.stats();
    println!(
        "Done: queued={} dropped={} connects={}",
        stats.frames_queued,
        stats.frames_dropped(),
        stats.connects
    );

    link.uninitialize()?;
    Ok(())
}
