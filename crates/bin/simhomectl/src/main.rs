//! # simhomectl
//!
//! Composition root that wires the virtual house into the control panel and
//! the parameters form, then reads commands from standard input.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialize logging
//! - Construct the virtual house, parameter service, heater and flags
//! - Keep a live layout view refreshed from the event bus
//! - Dispatch console lines and bus events to the console
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

use std::sync::Arc;

use simhome_adapter_virtual::{VirtualFlags, VirtualHeater, VirtualHouse, VirtualParameters};
use simhome_app::event_bus::InProcessEventBus;
use simhome_app::ports::FlagStore;
use simhome_app::services::LayoutView;
use simhomectl::config::Config;
use simhomectl::console::{Console, Reply, read_layout};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .with_writer(std::io::stderr)
        .init();

    // House
    let flags = Arc::new(VirtualFlags::default());
    let (house, layout) = match &config.house.layout_file {
        Some(path) => {
            tracing::info!(path = %path.display(), "uploading layout file");
            (VirtualHouse::default(), Some(read_layout(path)?))
        }
        None => {
            flags.set_layout_uploaded(true);
            (VirtualHouse::demo()?, None)
        }
    };
    let house = Arc::new(house);

    // Event bus
    let bus = InProcessEventBus::new(config.bus.capacity);
    let mut events = bus.subscribe();

    // Console
    let mut console = Console::new(
        Arc::clone(&house),
        Arc::new(VirtualParameters::default()),
        Arc::new(VirtualHeater::default()),
        flags,
        bus.clone(),
    );
    print_lines(&console.start(layout).await?);

    // Live layout view
    let mut view = LayoutView::new(Arc::clone(&house));
    view.reload().await?;
    let view_task = tokio::spawn(view.run(bus.subscribe()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match console.run_line(&line).await {
                    Reply::Lines(output) => print_lines(&output),
                    Reply::Quit => break,
                }
            }
            Some(event) = events.recv() => {
                print_lines(&console.handle_event(&event).await);
            }
        }
    }

    drop(console);
    drop(events);
    drop(bus);
    let view = view_task.await?;
    tracing::info!(
        revision = view.revision(),
        locations = view.locations().len(),
        "layout view stopped"
    );
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
