use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use mixdeck::{
    CpuSurface, CpuSurfaceOpts, Fps, FrameTicker, Geometry, LayerKind, LayerSpec, Point,
    PngSequenceSink, SourceFrame, StillImage, Studio, StudioOpts, Timer,
};

#[derive(Parser, Debug)]
#[command(name = "mixdeck", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a scene file into a single PNG.
    Frame(FrameArgs),
    /// Composite a scene file into a numbered PNG sequence.
    Frames(FramesArgs),
    /// Print the hit-test result for a canvas point as JSON.
    Hit(HitArgs),
}

#[derive(Parser, Debug)]
struct SceneArgs {
    /// Input scene JSON. Asset paths are resolved relative to its directory.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Font used for text and timer layers.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Clock reading in milliseconds, for running timers.
    #[arg(long, default_value_t = 0)]
    elapsed_ms: u64,

    /// Select the layer at this 0-based store index before rendering.
    #[arg(long)]
    select: Option<usize>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Number of frames.
    #[arg(long)]
    frames: u64,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct HitArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Canvas x.
    #[arg(long, allow_negative_numbers = true)]
    x: f64,

    /// Canvas y.
    #[arg(long, allow_negative_numbers = true)]
    y: f64,
}

/// Scene description read by the CLI.
#[derive(serde::Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct SceneFile {
    #[serde(default)]
    opts: Option<StudioOpts>,
    #[serde(default)]
    layers: Vec<LayerEntry>,
}

#[derive(serde::Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct LayerEntry {
    kind: String,
    #[serde(default)]
    geometry: Option<Geometry>,
    #[serde(default)]
    opacity: Option<f32>,
    #[serde(default = "default_true")]
    visible: bool,
    /// Image or SVG file for source-backed kinds.
    #[serde(default)]
    path: Option<PathBuf>,
    /// Solid fill for source-backed kinds, or text color.
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    size_px: Option<f32>,
    /// Timer start value; zero or absent counts up.
    #[serde(default)]
    seconds: Option<u64>,
    #[serde(default)]
    running: bool,
}

fn default_true() -> bool {
    true
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Frames(args) => cmd_frames(args),
        Command::Hit(args) => cmd_hit(args),
    }
}

#[tracing::instrument(skip_all, fields(scene = %args.scene.in_path.display()))]
fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut studio = load_scene(&args.scene.in_path)?;
    if let Some(idx) = args.select {
        let id = *studio
            .store()
            .ids()
            .get(idx)
            .with_context(|| format!("--select {idx}: scene has {} layers", studio.store().len()))?;
        studio.select(id);
    }

    let mut surface = CpuSurface::new(studio.canvas(), surface_opts(&args.scene)?)?;
    studio.render_frame(&mut surface, Duration::from_millis(args.elapsed_ms))?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    mixdeck::write_png(&args.out, &surface.frame())?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

#[tracing::instrument(skip_all, fields(scene = %args.scene.in_path.display(), frames = args.frames))]
fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let mut studio = load_scene(&args.scene.in_path)?;
    let mut surface = CpuSurface::new(studio.canvas(), surface_opts(&args.scene)?)?;
    let mut sink = PngSequenceSink::new(&args.out_dir);

    let ticker = FrameTicker::new(Fps::new(args.fps, 1)?, Duration::ZERO);
    let stats = ticker.run(&mut studio, &mut surface, &mut sink, args.frames)?;

    eprintln!("wrote {} frames to {}", stats.frames, args.out_dir.display());
    Ok(())
}

fn cmd_hit(args: HitArgs) -> anyhow::Result<()> {
    let studio = load_scene(&args.in_path)?;
    let hit = studio.hit_test(Point::new(args.x, args.y));

    let index = hit.and_then(|h| studio.store().position(h.layer));
    let out = serde_json::json!({
        "hit": hit,
        "index": index,
    });
    println!("{}", serde_json::to_string(&out)?);
    Ok(())
}

fn surface_opts(args: &SceneArgs) -> anyhow::Result<CpuSurfaceOpts> {
    let opts = CpuSurfaceOpts::default();
    Ok(match &args.font {
        Some(path) => opts.with_font_path(path)?,
        None => opts,
    })
}

fn load_scene(path: &Path) -> anyhow::Result<Studio> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read scene '{}'", path.display()))?;
    let scene: SceneFile = serde_json::from_str(&text)
        .with_context(|| format!("parse scene '{}'", path.display()))?;
    let root = path.parent().unwrap_or_else(|| Path::new("."));

    let opts = scene.opts.unwrap_or_default();
    let mut studio = Studio::new(opts)?;
    for (i, entry) in scene.layers.into_iter().enumerate() {
        let spec = layer_spec(&studio, entry, root).with_context(|| format!("layer {i}"))?;
        studio.create_layer(spec)?;
    }
    Ok(studio)
}

fn layer_spec(studio: &Studio, entry: LayerEntry, root: &Path) -> anyhow::Result<LayerSpec> {
    let kind: LayerKind = entry.kind.parse()?;
    let mut spec = match kind {
        LayerKind::Text => {
            let mut style = studio.text_style(entry.text.unwrap_or_default());
            if let Some(c) = &entry.color {
                style = style.with_color(mixdeck::parse_hex_color(c)?);
            }
            if let Some(px) = entry.size_px {
                style = style.with_size(px);
            }
            LayerSpec::text(style)
        }
        LayerKind::Timer => {
            let mut timer = Timer::from_seconds(entry.seconds.unwrap_or(0));
            if entry.running {
                timer.start(Duration::ZERO);
            }
            LayerSpec::timer(timer)
        }
        _ => LayerSpec::source(kind, still_source(&entry, root)?),
    };

    if let Some(g) = entry.geometry {
        spec = spec.at(g);
    }
    if let Some(o) = entry.opacity {
        spec = spec.with_opacity(o);
    }
    Ok(spec.with_visible(entry.visible))
}

fn still_source(entry: &LayerEntry, root: &Path) -> anyhow::Result<StillImage> {
    if let Some(rel) = &entry.path {
        let path = root.join(rel);
        let bytes =
            std::fs::read(&path).with_context(|| format!("read image '{}'", path.display()))?;
        let is_svg = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
        return Ok(if is_svg {
            StillImage::svg(&bytes, 1.0)?
        } else {
            StillImage::decode(&bytes)?
        });
    }
    if let Some(c) = &entry.color {
        let color = mixdeck::parse_hex_color(c)?;
        return Ok(StillImage::loaded(SourceFrame::solid(1, 1, color)?));
    }
    anyhow::bail!("source layer needs \"path\" or \"color\"")
}
