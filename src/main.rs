use clap::{ArgAction, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use slidefill::geometry::{ContainerSize, FillRect, FillSource, ImageGeometry, OffsetInfo, SrcRect};
use slidefill::imaging::{AppliedEffect, ImageBytes, RustEngine, get_dimensions};
use slidefill::process::{self, BatchItem};
use slidefill::units::Bounds;
use slidefill::{config, output};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "slidefill")]
#[command(about = "Bake PowerPoint fillRect/srcRect picture fills into bitmaps")]
#[command(long_about = "\
Bake PowerPoint fillRect/srcRect picture fills into bitmaps

A picture in a .pptx deck is drawn through two rectangles:

  <a:srcRect l t r b/>            crop of the embedded bitmap (0-100%)
  <a:stretch><a:fillRect l t r b/> inset (+) or overhang (-) relative to
                                   the shape frame

slidefill produces a bitmap exactly the size of the shape frame with both
applied. Areas the picture does not cover are transparent.

Fractions on the command line are plain numbers: 0.1 = 10%.

Run 'slidefill gen-config' to generate a documented slidefill.toml.")]
#[command(version)]
struct Cli {
    /// Config file; stock defaults are used when it does not exist
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Transform one picture
    Transform(TransformArgs),
    /// Transform every picture listed in a JSON manifest
    Batch(BatchArgs),
    /// Print a stock slidefill.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct TransformArgs {
    /// Source image
    input: PathBuf,

    /// Shape frame size in points, e.g. 1349.96x759.29
    #[arg(long, value_parser = parse_container)]
    container: ContainerSize,

    /// fillRect as left,top,right,bottom fractions
    #[arg(long, value_parser = parse_fill_rect, allow_hyphen_values = true)]
    fill_rect: Option<FillRect>,

    /// srcRect as left,top,right,bottom fractions
    #[arg(long, value_parser = parse_src_rect)]
    src_rect: Option<SrcRect>,

    /// Output file
    #[arg(long, short)]
    output: PathBuf,

    /// Record debug diagnostics in the effect log
    #[arg(long)]
    debug: bool,
}

#[derive(clap::Args)]
struct BatchArgs {
    /// JSON manifest: an array of jobs
    manifest: PathBuf,

    /// Directory for transformed pictures and results.json
    #[arg(long, default_value = "slidefill-out")]
    out_dir: PathBuf,
}

/// One picture in a batch manifest. Positions and sizes are in points.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Job {
    id: String,
    /// Relative paths resolve against the manifest's directory.
    source: PathBuf,
    #[serde(default)]
    x: f64,
    #[serde(default)]
    y: f64,
    width: f64,
    height: f64,
    fill_rect: Option<FillRect>,
    offset: Option<OffsetInfo>,
    src_rect: Option<Fractions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Fractions {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

#[derive(Debug, Serialize)]
struct ResultRecord<'a> {
    id: &'a str,
    file: String,
    mime: &'static str,
    was_processed: bool,
    applied_effects: &'a [AppliedEffect],
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

fn parse_container(s: &str) -> Result<ContainerSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid size '{v}': {e}"))
    };
    Ok(ContainerSize::new(parse(w)?, parse(h)?))
}

fn parse_fractions(s: &str) -> Result<[f64; 4], String> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid fraction in '{s}': {e}"))?;
    <[f64; 4]>::try_from(values)
        .map_err(|v| format!("expected 4 values (left,top,right,bottom), got {}", v.len()))
}

fn parse_fill_rect(s: &str) -> Result<FillRect, String> {
    let [l, t, r, b] = parse_fractions(s)?;
    Ok(FillRect::new(l, t, r, b))
}

fn parse_src_rect(s: &str) -> Result<SrcRect, String> {
    let [l, t, r, b] = parse_fractions(s)?;
    SrcRect::new(l, t, r, b)
        .ok_or_else(|| "srcRect values must be in [0, 1) with left+right and top+bottom below 1".into())
}

/// Output file for the picture at 0-based `position`.
///
/// Ids are mapped to a safe alphabet, which can make distinct ids collide;
/// the 3-digit position prefix keeps every name unique.
fn output_file_name(position: usize, id: &str, extension: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{:0>3}-{stem}.{extension}", position + 1)
}

fn init_tracing(verbose: u8) -> Result<(), Box<dyn std::error::Error>> {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Transform(args) => {
            let pipeline = config::load_config(&cli.config)?;
            let engine = RustEngine::with_settings(pipeline.engine_settings());
            let image = ImageBytes::new(std::fs::read(&args.input)?);

            let result = process::maybe_transform(
                &engine,
                &image,
                args.fill_rect.as_ref(),
                args.src_rect.as_ref(),
                args.container,
                args.debug || pipeline.debug.effects,
            );
            std::fs::write(&args.output, &result.data)?;
            let dimensions = get_dimensions(&engine, &result.data).ok();
            output::print_transform_output(&args.output, dimensions, &result);
        }
        Command::Batch(args) => {
            let pipeline = config::load_config(&cli.config)?;
            let engine = RustEngine::with_settings(pipeline.engine_settings());
            let items = load_batch(&args.manifest)?;

            std::fs::create_dir_all(&args.out_dir)?;
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let results = process::process_batch(
                &engine,
                &items,
                pipeline.batch_options(),
                Some(tx),
            )?;
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            let mut records = Vec::with_capacity(results.len());
            for (position, entry) in results.entries().iter().enumerate() {
                let result = &entry.result;
                let file = output_file_name(position, &entry.id, result.kind.extension());
                std::fs::write(args.out_dir.join(&file), &result.data)?;
                records.push(ResultRecord {
                    id: &entry.id,
                    file,
                    mime: result.mime_type(),
                    was_processed: result.was_processed,
                    applied_effects: &result.applied_effects,
                    error: result.error.as_deref(),
                });
            }
            let json = serde_json::to_string_pretty(&records)?;
            std::fs::write(args.out_dir.join("results.json"), json)?;
            output::print_batch_summary(&results.summary(), &args.out_dir);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Read a batch manifest and the pictures it lists.
fn load_batch(manifest: &Path) -> Result<Vec<BatchItem>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(manifest)?;
    let jobs: Vec<Job> = serde_json::from_str(&content)?;
    let base = manifest.parent().unwrap_or(Path::new("."));

    jobs.into_iter()
        .map(|job| -> Result<BatchItem, Box<dyn std::error::Error>> {
            let path = base.join(&job.source);
            let data = std::fs::read(&path)
                .map_err(|e| format!("{}: {}: {e}", job.id, path.display()))?;

            let src_rect = job.src_rect.and_then(|f| {
                let rect = SrcRect::new(f.left, f.top, f.right, f.bottom);
                if rect.is_none() {
                    tracing::warn!(id = %job.id, "ignoring out-of-range src_rect");
                }
                rect
            });
            let geometry = ImageGeometry::new(
                Bounds::new(job.x, job.y, job.width, job.height),
                FillSource::from_parts(job.fill_rect, job.offset),
                src_rect,
            );
            Ok(BatchItem {
                id: job.id,
                image: ImageBytes::new(data),
                geometry,
            })
        })
        .collect()
}
