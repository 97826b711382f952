use std::{fs, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framepump::{DecodeEngine, FfmpegLogLevel};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framepump info input.mp4 --json\n  framepump dump input.mp4 --out frames --count 50 --progress\n  framepump dump input.mp4 --out frames --seek 0:01:30 --count 1\n  framepump completions zsh > _framepump";

#[derive(Debug, Parser)]
#[command(
    name = "framepump",
    version,
    about = "Decode video frames from media files to RGB images",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional logging output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar where supported.
    #[arg(long)]
    progress: bool,

    /// Allow overwriting existing output files.
    #[arg(long)]
    overwrite: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print stream and timing information for a media file.
    #[command(
        about = "Print video stream information",
        visible_alias = "probe",
        after_help = "Examples:\n  framepump info input.mp4\n  framepump info input.mp4 --json"
    )]
    Info {
        /// Input media path or URL.
        input: String,

        /// Output information as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Decode frames and write them as PNG images.
    #[command(
        about = "Decode frames to image files",
        after_help = "Examples:\n  framepump dump input.mp4 --out frames --count 50\n  framepump dump input.mp4 --out frames --seek 90 --count 1 --ext jpg"
    )]
    Dump {
        /// Input media path or URL.
        input: String,
        /// Output directory for decoded frame images.
        #[arg(long)]
        out: PathBuf,
        /// Maximum number of frames to decode (default: until end of stream).
        #[arg(long)]
        count: Option<u64>,
        /// Seek to this time before decoding (seconds, mm:ss, or hh:mm:ss).
        #[arg(long)]
        seek: Option<String>,
        /// Output image extension (png, jpg, jpeg, bmp, tiff).
        #[arg(long, default_value = "png")]
        ext: String,
    },

    /// Generate shell completions.
    #[command(about = "Generate shell completion scripts")]
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Parse `ss[.frac]`, `mm:ss[.frac]`, or `hh:mm:ss[.frac]` into seconds.
fn parse_timecode(value: &str) -> Result<f64, Box<dyn std::error::Error>> {
    let parts: Vec<&str> = value.split(':').collect();
    let seconds = match parts.as_slice() {
        [seconds] => seconds.parse::<f64>()?,
        [minutes, seconds] => minutes.parse::<f64>()? * 60.0 + seconds.parse::<f64>()?,
        [hours, minutes, seconds] => {
            hours.parse::<f64>()? * 3600.0
                + minutes.parse::<f64>()? * 60.0
                + seconds.parse::<f64>()?
        }
        _ => return Err(format!("invalid timecode: {value}").into()),
    };
    if seconds < 0.0 {
        return Err(format!("timecode must not be negative: {value}").into());
    }
    Ok(seconds)
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(FfmpegLogLevel::Quiet),
        "panic" => Some(FfmpegLogLevel::Panic),
        "fatal" => Some(FfmpegLogLevel::Fatal),
        "error" => Some(FfmpegLogLevel::Error),
        "warning" => Some(FfmpegLogLevel::Warning),
        "info" => Some(FfmpegLogLevel::Info),
        "verbose" => Some(FfmpegLogLevel::Verbose),
        "debug" => Some(FfmpegLogLevel::Debug),
        "trace" => Some(FfmpegLogLevel::Trace),
        _ => None,
    }
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &global.log_level {
        let parsed = parse_log_level(level).ok_or(format!("unsupported --log-level: {level}"))?;
        framepump::set_ffmpeg_log_level(parsed);
    }
    Ok(())
}

fn open_input(input: &str) -> Result<DecodeEngine, Box<dyn std::error::Error>> {
    Ok(DecodeEngine::open(input)?)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Info { input, json } => {
            let engine = open_input(&input)?;
            let info = engine.info();
            let duration = engine.duration();

            if json {
                let payload = json!({
                    "width": info.width,
                    "height": info.height,
                    "fps": info.frames_per_second,
                    "codec": info.codec,
                    "pixel_format": info.pixel_format,
                    "stream_index": info.stream_index,
                    "duration_seconds": duration,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "Video: {}x{} @ {:.2} fps [{}]",
                    info.width, info.height, info.frames_per_second, info.codec,
                );
                if let Some(pixel_format) = &info.pixel_format {
                    println!("Pixel format: {pixel_format}");
                }
                match duration {
                    Some(seconds) => println!("Duration: {seconds:.3}s"),
                    None => println!("Duration: unknown"),
                }
            }
        }
        Commands::Dump {
            input,
            out,
            count,
            seek,
            ext,
        } => {
            if out.exists() {
                if !cli.global.overwrite {
                    return Err(format!(
                        "output directory already exists: {} (use --overwrite)",
                        out.display()
                    )
                    .into());
                }
                eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    format!("writing into existing directory {}", out.display()).yellow()
                );
            }
            fs::create_dir_all(&out)?;

            let mut engine = open_input(&input)?;

            if let Some(timecode) = seek {
                let seconds = parse_timecode(&timecode)?;
                engine.seek(seconds)?;
                if cli.global.verbose {
                    eprintln!("seeked to {seconds:.3}s");
                }
            }

            let ext_clean = ext.trim_start_matches('.').to_ascii_lowercase();
            let limit = count.unwrap_or(u64::MAX);

            let progress_bar = if cli.global.progress {
                let pb = match count {
                    Some(total) => ProgressBar::new(total),
                    None => ProgressBar::no_length(),
                };
                let style = ProgressStyle::with_template(
                    "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
                )?;
                pb.set_style(style.progress_chars("##-"));
                Some(pb)
            } else {
                None
            };

            let mut dumped = 0_u64;
            while dumped < limit {
                let Some((image, frame)) = engine.decode_next_image()? else {
                    break;
                };

                let output_path = out.join(format!("frame_{dumped:06}.{ext_clean}"));
                if output_path.exists() && !cli.global.overwrite {
                    return Err(format!(
                        "output file already exists: {} (use --overwrite)",
                        output_path.display()
                    )
                    .into());
                }
                image.save(&output_path)?;
                dumped += 1;

                if let Some(pb) = &progress_bar {
                    pb.inc(1);
                }
                if cli.global.verbose {
                    eprintln!(
                        "saved frame at {:.3}s -> {}",
                        frame.pts_seconds,
                        output_path.display()
                    );
                }
            }

            if let Some(pb) = progress_bar {
                pb.finish_with_message("done");
            }

            println!(
                "{} {}",
                "success:".green().bold(),
                format!("Decoded {dumped} frame(s) to {}", out.display()).green()
            );
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framepump", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_log_level, parse_timecode};

    #[test]
    fn parse_timecode_formats() {
        assert_eq!(parse_timecode("75").unwrap(), 75.0);
        assert_eq!(parse_timecode("01:15").unwrap(), 75.0);
        assert_eq!(parse_timecode("00:01:15.5").unwrap(), 75.5);
    }

    #[test]
    fn parse_timecode_rejects_garbage() {
        assert!(parse_timecode("abc").is_err());
        assert!(parse_timecode("1:2:3:4").is_err());
        assert!(parse_timecode("-5").is_err());
    }

    #[test]
    fn parse_log_level_aliases() {
        assert!(parse_log_level("quiet").is_some());
        assert!(parse_log_level("WARNING").is_some());
        assert!(parse_log_level("chatty").is_none());
    }
}
