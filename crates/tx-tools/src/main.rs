//! Transform tools command line entry point
//!
//! Loads a RON scene, applies one translate or rotate command through the
//! programmatic API and logs the fragments it moved.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use glam::Vec3;
use parking_lot::Mutex;
use tx_core::{
    ConfigError, InMemoryScene, NodeId, NodeSelection, SceneAdapter, SceneError, SceneFileError,
    SelectionScope, SharedScene, TransformConfig, TransformError,
};
use tx_tools::{CenterMode, TransformApi};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("No model named '{0}'")]
    UnknownModel(String),
    #[error("Scene file: {0}")]
    File(#[from] SceneFileError),
    #[error("Config file: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Lookup(#[from] SceneError),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Apply one transform to the nodes of a RON scene
#[derive(Parser, Debug)]
#[command(name = "tx", version)]
struct Cli {
    /// Scene file (RON)
    scene: PathBuf,

    /// Tool configuration (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the transformed scene to this file
    #[arg(short, long)]
    save: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Move nodes by a vector, or place each of them on a point
    #[command(allow_negative_numbers = true)]
    Translate {
        /// Model name
        model: String,
        /// Node ids, comma separated
        #[arg(value_parser = parse_nodes)]
        nodes: NodeIds,
        x: f32,
        y: f32,
        z: f32,
        /// Center every node on (x, y, z) instead of moving by it
        #[arg(long)]
        absolute: bool,
    },
    /// Rotate nodes about an axis
    #[command(allow_negative_numbers = true)]
    Rotate {
        /// Model name
        model: String,
        /// Node ids, comma separated
        #[arg(value_parser = parse_nodes)]
        nodes: NodeIds,
        ax: f32,
        ay: f32,
        az: f32,
        /// Angle in degrees
        degrees: f32,
        /// Rotation center
        #[arg(long, value_enum, default_value_t = Center::Median)]
        center: Center,
        /// Explicit rotation center `x,y,z`; overrides --center
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        pivot: Option<Vec3>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeIds(Vec<NodeId>);

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Center {
    /// Every node about its own center
    Individual,
    /// All nodes about the center of their union
    Median,
}

fn parse_nodes(value: &str) -> Result<NodeIds, String> {
    value
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| {
            part.trim()
                .parse()
                .map(NodeId)
                .map_err(|e| format!("'{part}': {e}"))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(NodeIds)
}

fn parse_point(value: &str) -> Result<Vec3, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f32>().map_err(|e| format!("'{part}': {e}")))
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got '{value}'")),
    }
}

impl Command {
    fn model(&self) -> &str {
        match self {
            Self::Translate { model, .. } | Self::Rotate { model, .. } => model,
        }
    }

    fn nodes(&self) -> Vec<NodeId> {
        match self {
            Self::Translate { nodes, .. } | Self::Rotate { nodes, .. } => nodes.0.clone(),
        }
    }
}

fn center_mode(center: Center, pivot: Option<Vec3>) -> CenterMode {
    match (pivot, center) {
        (Some(point), _) => CenterMode::Custom(point),
        (None, Center::Individual) => CenterMode::Individual,
        (None, Center::Median) => CenterMode::Median,
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => TransformConfig::load(path)?,
        None => TransformConfig::default(),
    };
    let memory = InMemoryScene::load(&cli.scene)?;
    let name = cli.command.model();
    let model = memory
        .models()
        .find(|model| model.name == name)
        .map(|model| model.id)
        .ok_or_else(|| CliError::UnknownModel(name.to_string()))?;

    let nodes = match config.selection_scope {
        SelectionScope::Picked => cli.command.nodes(),
        SelectionScope::WholeModel => vec![memory.root_node(model)?],
    };
    let selection = NodeSelection::new(model, nodes);

    let scene = Arc::new(Mutex::new(memory));
    let shared: SharedScene = scene.clone();
    let api = TransformApi::new(shared);
    let count = match cli.command {
        Command::Translate {
            x, y, z, absolute, ..
        } => api.try_translate(&selection, Vec3::new(x, y, z), absolute)?,
        Command::Rotate {
            ax,
            ay,
            az,
            degrees,
            center,
            pivot,
            ..
        } => api.try_rotate(
            &selection,
            Vec3::new(ax, ay, az),
            degrees.to_radians(),
            center_mode(center, pivot),
        )?,
    };
    tracing::info!("{} fragments updated", count);

    let mut scene = scene.lock();
    for (model, fragment) in scene.take_dirty() {
        let transform = scene.transform(model, fragment)?;
        tracing::info!(
            "{}: position {:?}, rotation (xyz) {:?}",
            fragment,
            transform.position,
            transform.euler_xyz()
        );
    }

    if let Some(path) = &cli.save {
        scene.save(path)?;
        tracing::info!("Saved scene to {}", path.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tx_tools=debug,tx_gizmo=info,tx_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
