//! Converts glTF models and motions into compressed scene files.

use std::path::{
  Path,
  PathBuf,
};

use anyhow::{
  bail,
  Context,
  Result,
};
use clap::{
  Parser,
  Subcommand,
  ValueEnum,
};
use serde::Deserialize;

use rechor::prelude::*;
use rechor::options::DEFAULT_FRAME_RATE;

#[derive(Parser)]
#[command(name = "rechor")]
#[command(version, about = "Convert glTF models and motions into compressed scene files")]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
  Binary,
  Text,
}

impl From<FormatArg> for RechorFormat {
  fn from(format: FormatArg) -> Self {
    match format {
      FormatArg::Binary => RechorFormat::Binary,
      FormatArg::Text => RechorFormat::Text,
    }
  }
}

#[derive(Subcommand)]
enum Commands {
  /// Convert a model, and optionally its motions, into a scene file.
  Convert {
    /// The model file (meshes, materials and skins).
    model: PathBuf,

    /// A motion file to bake, may be repeated.
    #[arg(short, long)]
    anim: Vec<PathBuf>,

    /// The output scene file.
    #[arg(short, long)]
    output: PathBuf,

    /// The encoding of the scene records.
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// The zstd compression level.
    #[arg(short, long)]
    level: Option<i32>,

    /// The frames per second used to bake motions.
    #[arg(long)]
    frame_rate: Option<f32>,

    /// A JSON file with default save options and frame rate.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read the written file back and compare it to the converted scene.
    #[arg(long)]
    verify: bool,
  },

  /// Print statistics of a scene file.
  Inspect {
    /// The scene file.
    path: PathBuf,

    /// The encoding of the scene records.
    #[arg(short, long, value_enum, default_value = "binary")]
    format: FormatArg,
  },
}

fn default_frame_rate() -> f32 {
  DEFAULT_FRAME_RATE
}

/// The contents of a `--config` file.
#[derive(Deserialize)]
struct ConvertConfig {
  #[serde(flatten)]
  save: RechorSaveOptions,
  #[serde(default = "default_frame_rate")]
  frame_rate: f32,
}

impl Default for ConvertConfig {
  fn default() -> Self {
    Self {
      save: RechorSaveOptions::default(),
      frame_rate: DEFAULT_FRAME_RATE,
    }
  }
}

struct ConvertArgs {
  model: PathBuf,
  anims: Vec<PathBuf>,
  output: PathBuf,
  save: RechorSaveOptions,
  frame_rate: f32,
  verify: bool,
}

fn convert(args: ConvertArgs) -> Result<()> {
  if !(args.frame_rate > 0.0) {
    bail!("Frame rate must be positive, got {}.", args.frame_rate);
  }

  let mut importer = RechorImporter::with_frame_rate(args.frame_rate);
  importer.load(&args.model, RechorImportOptions::MESH | RechorImportOptions::BONE_WEIGHT)
    .with_context(|| format!("Failed to load model \"{}\"", args.model.display()))?;
  for anim in args.anims.iter() {
    importer.load(anim, RechorImportOptions::ANIM)
      .with_context(|| format!("Failed to load motion \"{}\"", anim.display()))?;
  }

  let mut scene = RechorScene::default();
  importer.process(&mut scene);
  scene.save_with(&args.output, &args.save)
    .with_context(|| format!("Failed to save \"{}\"", args.output.display()))?;
  log::info!(
    "Wrote {} meshes ({} vertices, {} triangles) and {} anims to \"{}\".",
    scene.meshes.len(),
    scene.num_of_vertices(),
    scene.num_of_triangles(),
    scene.anims.len(),
    args.output.display(),
  );

  if args.verify {
    let load_options = RechorLoadOptions {
      format: args.save.format,
      ..Default::default()
    };
    let loaded = RechorScene::load_with(&args.output, &load_options)
      .with_context(|| format!("Failed to read back \"{}\"", args.output.display()))?;
    if loaded != scene {
      bail!("\"{}\" does not read back as the converted scene.", args.output.display());
    }
    log::info!("Verified \"{}\".", args.output.display());
  }
  Ok(())
}

fn inspect(path: &Path, format: RechorFormat) -> Result<()> {
  let options = RechorLoadOptions {
    format,
    ..Default::default()
  };
  let scene = RechorScene::load_with(path, &options)
    .with_context(|| format!("Failed to load \"{}\"", path.display()))?;

  println!("{}", path.display());
  println!("  meshes: {}", scene.meshes.len());
  for (index, mesh) in scene.meshes.iter().enumerate() {
    println!(
      "    [{}] vertices: {}, triangles: {}, skinned: {}, texture: \"{}\"",
      index,
      mesh.vertex_count(),
      mesh.triangle_count(),
      mesh.has_skin(),
      mesh.texture,
    );
  }
  println!("  anims: {}", scene.anims.len());
  for (index, anim) in scene.anims.iter().enumerate() {
    let frames = anim.meshes.iter().map(|frame| frame.frame_count()).max().unwrap_or(0);
    println!("    [{}] meshes: {}, frames: {}", index, anim.meshes.len(), frames);
  }
  Ok(())
}

fn main() -> Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
  let cli = Cli::parse();

  match cli.command {
    Commands::Convert { model, anim, output, format, level, frame_rate, config, verify } => {
      let config = match config {
        Some(path) => {
          let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config \"{}\"", path.display()))?;
          serde_json::from_str::<ConvertConfig>(&text)
            .with_context(|| format!("Failed to parse config \"{}\"", path.display()))?
        },
        None => ConvertConfig::default(),
      };
      let mut save = config.save;
      if let Some(format) = format {
        save.format = format.into();
      }
      if let Some(level) = level {
        save.compression_level = level;
      }
      convert(ConvertArgs {
        model,
        anims: anim,
        output,
        save,
        frame_rate: frame_rate.unwrap_or(config.frame_rate),
        verify,
      })
    },
    Commands::Inspect { path, format } => inspect(&path, format.into()),
  }
}
