// imgmill/src/main.rs
use anyhow::Context;
use clap::Parser;
use imgmill::{
    answer_is_yes, prompt, prompt_optional, prompt_parsed, prompt_yes_no, Cli, Commands, CropEdge,
    CropSpec, ExtraMetadata, OutputFormat, Pipeline, ProcessConfig, RunStats, DEFAULT_QUALITY,
};
use log::LevelFilter;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match cli.command {
        Commands::Run {
            directory,
            crop_percent,
            crop_edge,
            keep_metadata,
            format,
            compress,
            quality,
            resize,
            author,
            keyword,
            copyright,
        } => {
            let format: OutputFormat = format.parse()?;

            let crop = match (crop_percent, crop_edge) {
                (Some(percent), Some(edge)) => Some(CropSpec {
                    percent,
                    edge: edge.into(),
                }),
                _ => None,
            };

            let compress = if compress || quality.is_some() {
                Some(quality.unwrap_or(DEFAULT_QUALITY))
            } else {
                None
            };

            let extra = ExtraMetadata {
                author,
                keyword,
                copyright,
            };
            let extra = if extra.is_empty() { None } else { Some(extra) };
            if keep_metadata && extra.is_some() {
                log::warn!("--author/--keyword/--copyright are ignored when keeping metadata");
            }

            let config = ProcessConfig {
                directory,
                crop,
                keep_metadata,
                format,
                compress,
                resize,
                extra,
            };

            let stats = Pipeline::new(config)
                .run()
                .context("batch processing failed")?;
            print_summary(&stats);
        }
        Commands::Interactive => {
            interactive_loop()?;
        }
    }

    Ok(())
}

/// Prompt for a full configuration, process the directory, and start over.
/// Mistyped settings surface as configuration errors and restart the loop
/// without touching any file.
fn interactive_loop() -> anyhow::Result<()> {
    println!(
        "imgmill processes every png/jpg/jpeg/webp image in a directory in place:\n\
         optional cropping, metadata handling, format conversion, compression,\n\
         and resizing. Press Ctrl+C to quit."
    );

    loop {
        let config = match prompt_config() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {}", e);
                continue;
            }
        };

        match Pipeline::new(config).run() {
            Ok(stats) => print_summary(&stats),
            Err(e) => eprintln!("Error: {}", e),
        }

        prompt("Press Enter to configure another run...")?;
    }
}

fn prompt_config() -> anyhow::Result<ProcessConfig> {
    let directory = PathBuf::from(prompt("Enter the directory of images:")?);

    let crop = if prompt_yes_no("Crop images?")? {
        let percent: f32 = prompt_parsed("Enter the % to crop images by:")?;
        let edge: CropEdge = prompt_parsed("Crop from (top, bottom, left, right):")?;
        Some(CropSpec { percent, edge })
    } else {
        None
    };

    let keep_metadata = prompt_yes_no("Keep metadata?")?;

    let format: OutputFormat =
        prompt_parsed("Enter the format to save images as (png, jpg, jpeg, webp):")?;

    let compress = if prompt_yes_no("Compress images?")? {
        let answer = prompt(&format!("Quality (1-100, default {}):", DEFAULT_QUALITY))?;
        let quality = if answer.is_empty() {
            DEFAULT_QUALITY
        } else {
            answer.parse().context("quality must be a number")?
        };
        Some(quality)
    } else {
        None
    };

    let resize = if prompt_yes_no("Resize images?")? {
        Some(prompt_parsed("Resize images by %:")?)
    } else {
        None
    };

    let mut extra = None;
    if !keep_metadata
        && answer_is_yes(&prompt(
            "Would you like to add metadata (author, keyword, copyright)? (yes/no):",
        )?)
    {
        let fields = ExtraMetadata {
            author: prompt_optional("Enter author:")?,
            keyword: prompt_optional("Enter keyword:")?,
            copyright: prompt_optional("Enter copyright:")?,
        };
        if !fields.is_empty() {
            extra = Some(fields);
        }
    }

    Ok(ProcessConfig {
        directory,
        crop,
        keep_metadata,
        format,
        compress,
        resize,
        extra,
    })
}

fn print_summary(stats: &RunStats) {
    println!("Processed {} files.", stats.total_files);
    println!(
        "Total space saved: {}",
        imgmill::format_space_delta(stats.space_saved)
    );
    if !stats.errors.is_empty() {
        println!("{} file(s) skipped due to errors:", stats.errors.len());
        for (path, err) in &stats.errors {
            println!("  {}: {}", path.display(), err);
        }
    }
}
