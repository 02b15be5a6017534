use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use layerframe::{
    CropShape, CropTarget, EditorOpts, EditorState, FrameDocument, InMemoryAssetPipeline, Layer,
    LayerFrame, Rect, rect_xywh,
};

#[derive(Parser, Debug)]
#[command(name = "layerframe", version)]
struct Cli {
    /// Log at debug level.
    #[arg(long, global = true)]
    verbose: bool,

    /// Editor options JSON overriding the defaults.
    #[arg(long, global = true)]
    opts: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the layers of a frame document in paint order.
    Inspect(InspectArgs),
    /// Import a frame document and export it again (z-indices re-derived).
    Normalize(NormalizeArgs),
    /// Crop an image file.
    Crop(CropArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input frame document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct NormalizeArgs {
    /// Input frame document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output frame document JSON.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct CropArgs {
    /// Input image (any format the `image` crate decodes).
    #[arg(long)]
    image: PathBuf,

    /// Crop box in image pixels: `x,y,w,h`.
    #[arg(long, value_parser = parse_rect)]
    rect: Rect,

    /// Cut the inscribed circle instead of the rectangle.
    #[arg(long)]
    circle: bool,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    let opts = match &cli.opts {
        Some(path) => {
            let s = std::fs::read_to_string(path)
                .with_context(|| format!("read opts '{}'", path.display()))?;
            EditorOpts::from_json(&s).with_context(|| format!("parse opts '{}'", path.display()))?
        }
        None => EditorOpts::default(),
    };

    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args, opts),
        Command::Normalize(args) => cmd_normalize(args, opts),
        Command::Crop(args) => cmd_crop(args, opts),
    }
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid number in '{s}': {e}"))?;
    match parts.as_slice() {
        [x, y, w, h] if *w > 0.0 && *h > 0.0 => Ok(rect_xywh(*x, *y, *w, *h)),
        [_, _, _, _] => Err(format!("width and height must be positive in '{s}'")),
        _ => Err(format!("expected x,y,w,h, got '{s}'")),
    }
}

fn load_session(path: &Path, opts: EditorOpts) -> anyhow::Result<EditorState> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read document '{}'", path.display()))?;
    let doc = FrameDocument::from_json(&s)
        .with_context(|| format!("parse document '{}'", path.display()))?;
    let mut state = EditorState::new(opts);
    state
        .import_frame(&doc)
        .with_context(|| format!("import document '{}'", path.display()))?;
    Ok(state)
}

fn cmd_inspect(args: InspectArgs, opts: EditorOpts) -> anyhow::Result<()> {
    let state = load_session(&args.in_path, opts)?;
    let natural = state.base_image().natural_size;
    println!(
        "image {} ({}x{})",
        state.base_image().source.url.as_deref().unwrap_or("-"),
        natural.width,
        natural.height
    );
    for (z, (entry, layer)) in state.store().painted().enumerate() {
        let frame = match layer.frame() {
            LayerFrame::Percent(r) => format!(
                "{:.2}%,{:.2}% {:.2}%x{:.2}%",
                r.x, r.y, r.width, r.height
            ),
            LayerFrame::Natural(r) => format!(
                "{:.1},{:.1} {:.1}x{:.1}",
                r.x0,
                r.y0,
                r.width(),
                r.height()
            ),
        };
        let hidden = if entry.visible { "" } else { " hidden" };
        println!(
            "{:>3} {:<8} {:>14} {frame} {}{hidden}",
            z + 1,
            format!("{:?}", layer.kind()).to_lowercase(),
            layer.id().to_string(),
            describe(layer)
        );
    }
    Ok(())
}

fn describe(layer: &Layer) -> String {
    match layer {
        Layer::Text(t) => format!("{:?}", t.content),
        Layer::Shape(s) => s.raster_url.clone().unwrap_or_else(|| "-".to_owned()),
        Layer::Overlay(o) => o.source.url.clone().unwrap_or_else(|| "-".to_owned()),
    }
}

fn cmd_normalize(args: NormalizeArgs, opts: EditorOpts) -> anyhow::Result<()> {
    let state = load_session(&args.in_path, opts)?;
    let doc = state.export_frame().context("export document")?;
    let json = doc.to_json_pretty().context("serialize document")?;
    create_parent(&args.out)?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("write document '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_crop(args: CropArgs, opts: EditorOpts) -> anyhow::Result<()> {
    let bitmap = image::open(&args.image)
        .with_context(|| format!("open image '{}'", args.image.display()))?
        .to_rgba8();

    let mut state = EditorState::new(opts);
    state.load_base_bitmap(None, bitmap);
    state.start_crop(CropTarget::BaseImage)?;
    state.update_crop_rect(args.rect, None)?;
    if args.circle {
        state.set_crop_shape(CropShape::Circle)?;
    }
    let mut pipeline = InMemoryAssetPipeline::new();
    state.apply_crop_with(&mut pipeline).context("apply crop")?;

    let cropped = state
        .base_image()
        .source
        .bitmap
        .clone()
        .context("cropped bitmap missing")?;
    create_parent(&args.out)?;
    cropped
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    eprintln!(
        "wrote {} ({}x{})",
        args.out.display(),
        cropped.width(),
        cropped.height()
    );
    Ok(())
}

fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
