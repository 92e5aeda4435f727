//! retouch: headless driver for mask authoring, cutouts and canvas
//! expansion.
//!
//! Replays recorded pointer events into a mask, composites images with
//! masks, pads images for generative fill, and prints edit-service
//! request bodies. Useful for reproducing editor behavior outside the
//! browser and for producing fixtures.
//!
//! # Usage
//!
//! ```text
//! retouch mask --events strokes.json --natural 1024x768 -o mask.png
//! retouch cutout --original photo.jpg --mask mask.png -o cutout.png
//! retouch expand --input photo.jpg --ratio 16:9 -o padded.png
//! retouch request --image photo.jpg --mask mask.png --prompt "remove the car"
//! ```
//!
//! Image arguments accept a file path or a `data:` URL. Set `RUST_LOG`
//! to adjust log output (written to stderr).

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use retouch_canvas::{
    AspectRatio, BrushConfig, CanvasError, DataUrl, Dimensions, EditRequest, ImageSource,
    PointerEvent, StrokeLayer, codec,
};

/// Headless mask authoring, cutouts and canvas expansion.
#[derive(Parser)]
#[command(name = "retouch", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay pointer events into a mask PNG at natural resolution.
    Mask {
        /// JSON array of pointer events in surface-local coordinates.
        #[arg(long)]
        events: PathBuf,

        /// Natural image size as WIDTHxHEIGHT.
        #[arg(long, value_parser = parse_dimensions, required_unless_present = "image")]
        natural: Option<Dimensions>,

        /// Take the natural size from this image instead.
        #[arg(long, conflicts_with = "natural")]
        image: Option<String>,

        /// Initial surface size as WIDTHxHEIGHT. Without it the events
        /// must start with a `resize`.
        #[arg(long, value_parser = parse_dimensions)]
        display: Option<Dimensions>,

        /// Brush width in display pixels.
        #[arg(long, default_value_t = BrushConfig::DEFAULT_BRUSH_SIZE)]
        brush_size: f64,

        /// Full brush config as a JSON string.
        ///
        /// When provided, `--brush-size` is ignored.
        #[arg(long)]
        config_json: Option<String>,

        /// Output PNG path.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Cut an image out along a mask.
    Cutout {
        /// Original image (path or data URL).
        #[arg(long)]
        original: String,

        /// Mask image (path or data URL).
        #[arg(long)]
        mask: String,

        /// Output PNG path. Prints a data URL to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Pad an image with transparency to an aspect ratio.
    Expand {
        /// Input image (path or data URL).
        #[arg(long)]
        input: String,

        /// Target ratio, e.g. 16:9.
        #[arg(long)]
        ratio: AspectRatio,

        /// Output PNG path.
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the JSON body of an edit request.
    Request {
        /// Image to edit (path or data URL).
        #[arg(long)]
        image: String,

        /// Optional mask (path or data URL).
        #[arg(long)]
        mask: Option<String>,

        /// Edit instruction.
        #[arg(long)]
        prompt: String,

        /// Fail instead of falling back to a whole-image edit when no
        /// mask is given.
        #[arg(long)]
        require_mask: bool,
    },
}

/// Errors surfaced to the command line.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("nothing was drawn; no mask produced")]
    EmptyMask,

    #[error("could not apply mask to image")]
    CutoutFailed,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("retouch=info,retouch_canvas=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Mask {
            events,
            natural,
            image,
            display,
            brush_size,
            config_json,
            output,
        } => {
            let config = match config_json {
                Some(json) => serde_json::from_str(&json)?,
                None => BrushConfig::default().with_brush_size(brush_size),
            };
            let natural = match (natural, image) {
                (Some(natural), _) => natural,
                (None, Some(location)) => Dimensions::of(&load_image(&location)?),
                (None, None) => return Err(CanvasError::EmptyInput.into()),
            };
            let text = std::fs::read_to_string(&events).map_err(|source| CliError::Read {
                path: events.clone(),
                source,
            })?;
            let events: Vec<PointerEvent> = serde_json::from_str(&text)?;

            let layer = replay(config, display, &events)?;
            let png = layer.mask_png(natural)?.ok_or(CliError::EmptyMask)?;
            write_file(&output, &png)?;
            tracing::info!(
                strokes = layer.stroke_count(),
                %natural,
                output = %output.display(),
                "wrote mask"
            );
            Ok(())
        }
        Command::Cutout {
            original,
            mask,
            output,
        } => {
            let original = read_location(&original)?;
            let mask = read_location(&mask)?;
            let url = retouch_canvas::apply_mask_to_image(
                ImageSource::Bytes(&original),
                ImageSource::Bytes(&mask),
            )
            .ok_or(CliError::CutoutFailed)?;
            match output {
                Some(path) => {
                    let png = DataUrl::parse(&url)?.into_data();
                    write_file(&path, &png)?;
                    tracing::info!(output = %path.display(), "wrote cutout");
                }
                None => println!("{url}"),
            }
            Ok(())
        }
        Command::Expand {
            input,
            ratio,
            output,
        } => {
            let image = load_image(&input)?;
            let expanded = retouch_canvas::expand_to_aspect_ratio(&image, ratio)?;
            write_file(&output, &codec::encode_png(&expanded)?)?;
            tracing::info!(
                from = %Dimensions::of(&image),
                to = %Dimensions::of(&expanded),
                output = %output.display(),
                "wrote expanded image"
            );
            Ok(())
        }
        Command::Request {
            image,
            mask,
            prompt,
            require_mask,
        } => {
            let image = to_data_url(&image)?;
            let mask = mask.as_deref().map(to_data_url).transpose()?;
            let request = if require_mask {
                EditRequest::masked_edit(image, mask, prompt)?
            } else {
                EditRequest::edit(image, mask, prompt)
            };
            println!("{}", serde_json::to_string_pretty(&request)?);
            Ok(())
        }
    }
}

/// Feed `events` into a fresh layer.
fn replay(
    config: BrushConfig,
    display: Option<Dimensions>,
    events: &[PointerEvent],
) -> Result<StrokeLayer, CanvasError> {
    let mut layer = StrokeLayer::new(config)?;
    if let Some(display) = display {
        layer.resize(display);
    }
    for event in events {
        layer.apply(*event);
    }
    Ok(layer)
}

/// Parse `WIDTHxHEIGHT`.
fn parse_dimensions(s: &str) -> Result<Dimensions, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let width: u32 = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let height: u32 = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    let dims = Dimensions::new(width, height);
    if dims.is_empty() {
        return Err(format!("{s:?} has no pixels"));
    }
    Ok(dims)
}

/// Raw bytes from a file path or a `data:` URL.
fn read_location(location: &str) -> Result<Vec<u8>, CliError> {
    if location.starts_with("data:") {
        return Ok(DataUrl::parse(location)?.into_data());
    }
    let path = Path::new(location);
    std::fs::read(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn load_image(location: &str) -> Result<retouch_canvas::RgbaImage, CliError> {
    Ok(codec::decode_rgba(&read_location(location)?)?)
}

/// A data URL for `location`, sniffing the MIME type of file contents.
fn to_data_url(location: &str) -> Result<DataUrl, CliError> {
    if location.starts_with("data:") {
        return Ok(DataUrl::parse(location)?);
    }
    let bytes = read_location(location)?;
    let format = image::guess_format(&bytes).map_err(CanvasError::from)?;
    Ok(DataUrl::new(format.to_mime_type(), bytes))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, bytes).map_err(|source| CliError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use retouch_canvas::MaskClass;

    #[test]
    fn parses_dimensions() {
        assert_eq!(
            parse_dimensions("1024x768").unwrap(),
            Dimensions::new(1024, 768)
        );
        assert_eq!(parse_dimensions("5X7").unwrap(), Dimensions::new(5, 7));
        assert!(parse_dimensions("1024").is_err());
        assert!(parse_dimensions("0x10").is_err());
        assert!(parse_dimensions("ax10").is_err());
    }

    #[test]
    fn reads_data_url_locations() {
        let bytes = read_location("data:image/png;base64,AQID").unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert!(matches!(
            read_location("data:oops"),
            Err(CliError::Canvas(CanvasError::InvalidDataUrl(_)))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_location("/definitely/not/here.png").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.png"));
    }

    #[test]
    fn replays_events_json() {
        let json = r#"[
            {"type": "resize", "width": 100, "height": 100},
            {"type": "down", "x": 10.0, "y": 50.0},
            {"type": "move", "x": 90.0, "y": 50.0},
            {"type": "up"}
        ]"#;
        let events: Vec<PointerEvent> = serde_json::from_str(json).unwrap();
        let layer = replay(BrushConfig::default(), None, &events).unwrap();
        assert_eq!(layer.stroke_count(), 1);
        let mask = layer
            .rasterize_to(Dimensions::new(200, 200))
            .unwrap()
            .unwrap();
        assert_eq!(mask.class_at(100, 100), Some(MaskClass::Foreground));
        assert_eq!(mask.class_at(100, 10), Some(MaskClass::Background));
    }

    #[test]
    fn initial_display_size_enables_drawing() {
        let events = [PointerEvent::Down { x: 5.0, y: 5.0 }, PointerEvent::Up];
        let without = replay(BrushConfig::default(), None, &events).unwrap();
        assert!(!without.has_content());
        let with = replay(
            BrushConfig::default(),
            Some(Dimensions::new(10, 10)),
            &events,
        )
        .unwrap();
        assert!(with.has_content());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
