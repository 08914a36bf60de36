use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use waypath_client::{MissionReceiver, MissionTransport, SenderConfig, TcpMissionSender};
use waypath_core::config::{AppConfig, ExportConfig, LogFormat, LoggingConfig};
use waypath_geo::{tiles_around, DirectoryTileSource, LocalFrame, TileLayer};
use waypath_mission::{EventScript, InteractionController, MissionDocument, MissionFile};

/// Waypath - GPS mission planner for ground rovers
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long, env = "WAYPATH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the canonical payload of a mission file
    Export {
        /// Mission file (YAML or JSON)
        #[arg(short, long)]
        mission: PathBuf,

        /// Write the payload line here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Send a mission file to the configured receiver
    Send {
        /// Mission file (YAML or JSON)
        #[arg(short, long)]
        mission: PathBuf,

        /// Override receiver host
        #[arg(long)]
        host: Option<String>,

        /// Override receiver port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Listen for missions and print each payload as it arrives
    Receive {
        /// Override bind address (host:port)
        #[arg(short, long)]
        bind: Option<String>,

        /// Exit after this many missions
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Run a pointer event script through the interaction controller
    Replay {
        /// Event script (YAML)
        #[arg(short, long)]
        script: PathBuf,

        /// Mission file to start from (empty mission when omitted)
        #[arg(short, long)]
        mission: Option<PathBuf>,

        /// Override the script's view magnification
        #[arg(long)]
        magnification: Option<f64>,

        /// Save the edited mission as a mission file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Send the edited mission to the configured receiver
        #[arg(long)]
        send: bool,
    },

    /// List tiles around the frame origin with their planar placement
    Tiles {
        /// Tiles on each side of the origin tile (overrides config)
        #[arg(short, long)]
        radius: Option<u32>,

        /// Check which tiles exist in the configured tile directory
        #[arg(long)]
        load: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;
    init_tracing(&config.logging)?;

    if let Some(path) = &args.config {
        info!(path = %path.display(), "Configuration loaded");
    }

    match args.command {
        Command::Export { mission, output } => export(&mission, output.as_deref()),
        Command::Send {
            mission,
            host,
            port,
        } => {
            let mut export = config.export.clone();
            if let Some(host) = host {
                export.host = host;
            }
            if let Some(port) = port {
                export.port = port;
            }
            export.validate()?;

            let document = MissionFile::from_path(&mission)?.into_document()?;
            send(&export, &document).await
        }
        Command::Receive { bind, count } => {
            let bind = bind.unwrap_or_else(|| config.receiver.bind_address());
            receive(&bind, &config, count).await
        }
        Command::Replay {
            script,
            mission,
            magnification,
            save,
            send: send_after,
        } => {
            let document = replay(&config, &script, mission.as_deref(), magnification)?;

            if let Some(path) = save {
                let yaml = MissionFile::from_document(&document).to_yaml()?;
                fs::write(&path, yaml)
                    .with_context(|| format!("Failed to write mission file {}", path.display()))?;
                info!(path = %path.display(), "Mission saved");
            }

            println!("{}", document.to_canonical_payload().to_json()?);

            if send_after {
                send(&config.export, &document).await?;
            }
            Ok(())
        }
        Command::Tiles { radius, load } => tiles(&config, radius.unwrap_or(config.tiles.radius), load),
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_config_builder(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()))?,
        None => AppConfig::default(),
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    logging.parse_level()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match logging.format {
        LogFormat::Text => builder.with_target(false).init(),
        LogFormat::Json => builder.json().init(),
    }

    Ok(())
}

fn export(mission: &Path, output: Option<&Path>) -> Result<()> {
    let document = MissionFile::from_path(mission)?.into_document()?;
    if document.is_empty() {
        warn!(path = %mission.display(), "Mission has no waypoints");
    }

    let line = document.to_canonical_payload().to_json_line()?;
    match output {
        Some(path) => {
            fs::write(path, &line)
                .with_context(|| format!("Failed to write payload to {}", path.display()))?;
            info!(path = %path.display(), bytes = line.len(), "Payload written");
        }
        None => print!("{line}"),
    }
    Ok(())
}

async fn send(export: &ExportConfig, document: &MissionDocument) -> Result<()> {
    let sender = TcpMissionSender::new(SenderConfig::from(export));
    let report = sender
        .send_document(document)
        .await
        .with_context(|| format!("Failed to send mission to {}", export.address()))?;

    info!(
        addr = %report.address,
        bytes = report.bytes,
        attempts = report.attempts,
        "Mission delivered"
    );
    Ok(())
}

async fn receive(bind: &str, config: &AppConfig, count: Option<usize>) -> Result<()> {
    let receiver = MissionReceiver::bind(bind, config.receiver.read_timeout()).await?;
    info!(addr = %receiver.local_addr()?, "Waiting for missions, Ctrl-C to stop");

    let mut handle = receiver.spawn(16);
    let mut received = 0usize;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            mission = handle.next() => {
                let Some(mission) = mission else { break };
                println!("{}", mission.payload.to_json()?);
                info!(
                    peer = %mission.peer,
                    received_at = %mission.received_at.to_rfc3339(),
                    "Mission printed"
                );

                received += 1;
                if count.is_some_and(|limit| received >= limit) {
                    break;
                }
            }
        }
    }

    let snapshot = handle.status().metrics().snapshot();
    info!(
        missions = snapshot.missions_received,
        errors = snapshot.errors,
        "Receiver stopped"
    );
    handle.shutdown().await
}

fn replay(
    config: &AppConfig,
    script: &Path,
    mission: Option<&Path>,
    magnification: Option<f64>,
) -> Result<MissionDocument> {
    let frame = LocalFrame::from_config(&config.frame)?;

    let mut script = EventScript::from_path(script)?;
    if let Some(magnification) = magnification {
        script.magnification = magnification;
    }

    let mut document = match mission {
        Some(path) => MissionFile::from_path(path)?.into_document()?,
        None => MissionDocument::new(),
    };

    let mut controller = InteractionController::new();
    let summary = script.replay(&mut document, &mut controller, &frame, &config.interaction);
    info!(
        applied = summary.applied,
        rejected = summary.rejected,
        changes = summary.changes.len(),
        waypoints = document.path().len(),
        "Replay finished"
    );

    Ok(document)
}

fn tiles(config: &AppConfig, radius: u32, load: bool) -> Result<()> {
    let frame = LocalFrame::from_config(&config.frame)?;
    let keys = tiles_around(&frame, radius);

    let mut layer = TileLayer::new();
    if load {
        let source = DirectoryTileSource::new(&config.tiles.root);
        layer.request(&source, keys.iter().copied());
        let delivered = layer.pump();
        info!(
            root = %config.tiles.root.display(),
            requested = keys.len(),
            delivered,
            "Tiles loaded"
        );
    }

    for key in &keys {
        let corner = frame.tile_corner(*key);
        let state = match (load, layer.get(key)) {
            (false, _) => "",
            (true, Some(_)) => "present",
            (true, None) => "missing",
        };
        println!("{key}\t{:.3}\t{:.3}\t{state}", corner.x, corner.y);
    }
    Ok(())
}
