use clap::{Parser, Subcommand};
use magick_resize::imaging::{self, ImageBackend, MagickBackend, ResizeMode};
use magick_resize::{config, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "magick-resize")]
#[command(about = "Resize images through ImageMagick")]
#[command(long_about = "\
Resize images through ImageMagick

Resize modes:

  scale       exactly WxH, aspect ratio ignored
  fit         fit inside WxH, aspect ratio kept
  fit-pad     fit into 300x300, then pad with white to WxH
  crop        no resampling; center on a white WxH canvas, trim overflow
  scale-crop  cover WxH, trim overflow around the center

Quality is 91 when width + height < 600, otherwise 99. Metadata is stripped.

Executables and the per-command timeout are read from magick-resize.toml in
the config directory. Run 'magick-resize gen-config' for a documented file.")]
#[command(version)]
struct Cli {
    /// Directory containing magick-resize.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log each ImageMagick command line (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize SOURCE into DESTINATION
    Resize {
        source: PathBuf,
        /// Output path; may equal SOURCE to overwrite it in place
        destination: PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(long, value_enum)]
        mode: ResizeMode,
    },
    /// Print the pixel size of an image as WxH
    Identify { source: PathBuf },
    /// Report whether ImageMagick can be run and which executables are used
    Check,
    /// Print a stock magick-resize.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Resize {
            source,
            destination,
            width,
            height,
            mode,
        } => {
            let backend = MagickBackend::new(config::load_config(&cli.config_dir)?);
            imaging::resize(&backend, &source, &destination, width, height, mode)?;
            let params = imaging::plan_resize(&source, &destination, width, height, mode);
            let result: Option<(u32, u32)> = match backend.identify(&destination) {
                Ok(dims) => Some(dims.into()),
                Err(e) => {
                    log::warn!("could not read back {}: {e}", destination.display());
                    None
                }
            };
            for line in output::format_resize(&params, result) {
                println!("{line}");
            }
        }
        Command::Identify { source } => {
            let backend = MagickBackend::new(config::load_config(&cli.config_dir)?);
            let size = imaging::get_image_size(&backend, &source)?;
            println!("{}", output::format_size(size));
        }
        Command::Check => {
            let backend = MagickBackend::new(config::load_config(&cli.config_dir)?);
            let available = backend.is_available();
            for line in output::format_check(available, backend.tools(), backend.config()) {
                println!("{line}");
            }
            if !available {
                std::process::exit(1);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `warn`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
