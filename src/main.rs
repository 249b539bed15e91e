use clap::{Parser, Subcommand};
use image::{GrayImage, Luma};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use geo_image_dataset::config::PipelineConfig;
use geo_image_dataset::core::imaging::{normalize, FileDecoder, ImageDecoder, NormalizedImage};
use geo_image_dataset::logging::setup_logging;
use geo_image_dataset::{prepare_dataset, DatasetResult};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Build, filter and balance a labeled image catalog", long_about = None)]
struct Cli {
    /// Pipeline config JSON; defaults to the platform config location
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the catalog, apply the denylist, balance classes and print counts
    Catalog {
        /// Override the configured dataset root
        #[clap(short, long)]
        root: Option<PathBuf>,
        /// Override the configured balancing seed
        #[clap(short, long)]
        seed: Option<u64>,
    },
    /// Normalize one image with the configured options and save it as PNG
    Normalize {
        image: PathBuf,
        output: PathBuf,
    },
}

impl Command {
    fn exec(self, mut config: PipelineConfig) -> DatasetResult<()> {
        match self {
            Command::Catalog { root, seed } => {
                if let Some(root) = root {
                    config.dataset_root = root;
                }
                if let Some(seed) = seed {
                    config.seed = seed;
                }

                let prepared = prepare_dataset(&config)?;
                println!("Raw catalog:\n{}", prepared.raw_counts().render_table());
                println!("Balanced catalog:\n{}", prepared.balanced_counts().render_table());
                Ok(())
            }
            Command::Normalize { image, output } => {
                let decoded = FileDecoder.decode(&image)?;
                let normalized = normalize(decoded, &config.normalize)?;

                let saved = match normalized {
                    NormalizedImage::Rgb(img) => img.save(&output),
                    NormalizedImage::Gray(tensor) => {
                        let (width, height) = tensor.dimensions();
                        GrayImage::from_fn(width, height, |x, y| {
                            Luma([(tensor.get_pixel(x, y)[0] * 255.0).round() as u8])
                        })
                        .save(&output)
                    }
                };
                saved?;
                info!("Normalized {:?} -> {:?}", image, output);
                Ok(())
            }
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PipelineConfig::load_from(path),
        None => PipelineConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = setup_logging(&config.log_dir) {
        eprintln!("Failed to set up logging: {}", e);
        return ExitCode::FAILURE;
    }

    match cli.command.exec(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
