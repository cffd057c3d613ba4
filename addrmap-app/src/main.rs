//! addrmap - register addresses and show them as map markers
//!
//! Command-line front end: `register` plays the registration form, the other
//! subcommands play the map screen and its record list.

use addrmap_app::models::MapViewState;
use addrmap_app::services::{
    FixedLocation, Geocoder, MapSyncController, Navigator, NominatimGeocoder, RegistrationWorkflow,
};
use addrmap_common::config::{
    default_config_path, load_toml_config, RootFolderInitializer, RootFolderResolver, TomlConfig,
};
use addrmap_common::events::{AppEvent, EventBus, View};
use addrmap_common::{
    Coordinate, FileKeyValueStore, FormFields, KeyValueStore, MemoryKeyValueStore, RecordStore,
};
use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "addrmap", version, about = "Register addresses and show them on a map")]
struct Cli {
    /// Data folder (overrides ADDRMAP_ROOT_FOLDER and the config file)
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Config file (default: platform config dir, addrmap/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep records in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Device latitude
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Device longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Geocode an address and store it
    Register {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        street: String,
        #[arg(long, default_value = "")]
        number: String,
        #[arg(long, default_value = "")]
        city: String,
        #[arg(long, default_value = "")]
        state: String,
    },
    /// Show the record list
    List,
    /// Show the map markers and the device position
    Markers,
    /// Center the map on a record
    Focus { index: usize },
    /// Delete a record
    Delete { index: usize },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.clone().or_else(default_config_path) {
        Some(path) => load_toml_config(&path)?,
        None => TomlConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!(
        "Starting addrmap v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let backend: Arc<dyn KeyValueStore> = if cli.ephemeral {
        info!("Using in-memory store");
        Arc::new(MemoryKeyValueStore::new())
    } else {
        let root_folder = RootFolderResolver::new()
            .with_cli_arg(cli.root_folder.clone())
            .with_toml(&config)
            .resolve();
        let initializer = RootFolderInitializer::new(root_folder);
        initializer.ensure_directory_exists()?;
        info!("Store: {}", initializer.store_path().display());
        Arc::new(FileKeyValueStore::new(initializer.store_path()))
    };

    let location = match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => FixedLocation::new(Some(Coordinate::new(lat, lon)?)),
        _ => FixedLocation::from_config(config.location.as_ref()).map_err(|e| anyhow!(e))?,
    };

    let bus = EventBus::new(64);
    let mut events = bus.subscribe();

    let mut map = MapSyncController::new(RecordStore::new(backend.clone()), config.map.zoom_delta)
        .with_event_bus(bus.clone());
    map.activate(&location).await;
    let mut navigator = Navigator::new(View::Map, bus.clone());
    pump_events(&mut events, &mut navigator, &mut map).await;

    match cli.command {
        Command::Register {
            name,
            street,
            number,
            city,
            state,
        } => {
            navigator.navigate(View::Register);

            let geocoder: Arc<dyn Geocoder> = Arc::new(
                NominatimGeocoder::new(&config.geocoder).map_err(|e| anyhow!(e))?,
            );
            let mut workflow = RegistrationWorkflow::new(geocoder, RecordStore::new(backend))
                .with_event_bus(bus.clone());

            let form = FormFields::new(name, street, number, city, state);
            let outcome = workflow.submit(&form).await;
            if !outcome.is_done() {
                bail!("{}", outcome.user_message());
            }
            println!("{}", outcome.user_message());

            // Back on the map: the activation event triggers the reload
            pump_events(&mut events, &mut navigator, &mut map).await;
            print_markers(&map);
        }
        Command::List => {
            for entry in map.record_list() {
                println!("[{}] {}", entry.index, entry.name);
            }
        }
        Command::Markers => print_markers(&map),
        Command::Focus { index } => {
            if !map.select(index) {
                bail!("No record at index {}", index);
            }
            if let Some(region) = map.viewport() {
                println!(
                    "Camera: {:.6}, {:.6} (span {} x {})",
                    region.center.latitude,
                    region.center.longitude,
                    region.latitude_delta,
                    region.longitude_delta
                );
            }
        }
        Command::Delete { index } => {
            if index >= map.records().len() {
                bail!("No record at index {}", index);
            }
            let name = map.records()[index].name.clone();
            map.delete_at(index).await?;
            println!("Deleted {}", name);
        }
    }

    Ok(())
}

/// Deliver queued events to the navigator and the map until the queue is empty
async fn pump_events<S: KeyValueStore>(
    events: &mut broadcast::Receiver<AppEvent>,
    navigator: &mut Navigator,
    map: &mut MapSyncController<S>,
) {
    loop {
        match events.try_recv() {
            Ok(event) => {
                navigator.handle_event(&event);
                map.handle_event(&event).await;
            }
            Err(broadcast::error::TryRecvError::Lagged(_)) => map.on_focus().await,
            Err(_) => break,
        }
    }
}

fn print_markers<S: KeyValueStore>(map: &MapSyncController<S>) {
    match map.view_state() {
        MapViewState::LocationError(message) => println!("Location: {}", message),
        MapViewState::Loading => println!("Location: loading..."),
        MapViewState::Ready => {
            if let Some(here) = map.position_marker() {
                println!(
                    "{}: {:.6}, {:.6}",
                    here.title, here.coordinate.latitude, here.coordinate.longitude
                );
            }
        }
    }

    for (index, marker) in map.markers().iter().enumerate() {
        println!(
            "[{}] {} ({}) @ {:.6}, {:.6}",
            index,
            marker.title,
            marker.description,
            marker.coordinate.latitude,
            marker.coordinate.longitude
        );
    }
}
