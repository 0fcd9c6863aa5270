// imgmill/src/cli.rs
use crate::core::CropEdge;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(
    name = "imgmill",
    about = "Batch in-place image converter: crop, reformat, compress, resize, and manage metadata",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one batch pass over a directory with settings from flags
    Run {
        /// Directory whose images are rewritten in place
        directory: PathBuf,

        /// Crop this percentage off one edge (0-100, exclusive)
        #[arg(long, value_name = "PERCENT", requires = "crop_edge")]
        crop_percent: Option<f32>,

        /// Edge to crop from
        #[arg(long, value_enum, requires = "crop_percent")]
        crop_edge: Option<Edge>,

        /// Carry the original EXIF metadata over to the replacement file
        #[arg(long)]
        keep_metadata: bool,

        /// Output format: png, jpg, jpeg, or webp
        #[arg(short, long, default_value = "jpeg")]
        format: String,

        /// Run the lossy re-encode pass
        #[arg(long)]
        compress: bool,

        /// Quality for the re-encode pass (1-100, default 85); implies --compress
        #[arg(short, long, value_name = "QUALITY")]
        quality: Option<u8>,

        /// Scale both dimensions to this percentage (must be > 0)
        #[arg(long, value_name = "PERCENT")]
        resize: Option<f32>,

        /// Author written as PNG text metadata (only when metadata is dropped)
        #[arg(long)]
        author: Option<String>,

        /// Keyword written as PNG text metadata (only when metadata is dropped)
        #[arg(long)]
        keyword: Option<String>,

        /// Copyright written as PNG text metadata (only when metadata is dropped)
        #[arg(long)]
        copyright: Option<String>,
    },

    /// Prompt for a full configuration, process, and repeat
    Interactive,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl From<Edge> for CropEdge {
    fn from(edge: Edge) -> Self {
        match edge {
            Edge::Top => CropEdge::Top,
            Edge::Bottom => CropEdge::Bottom,
            Edge::Left => CropEdge::Left,
            Edge::Right => CropEdge::Right,
        }
    }
}

pub fn prompt(question: &str) -> io::Result<String> {
    print!("{} ", question);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Anything other than an explicit yes counts as "no".
pub fn prompt_yes_no(question: &str) -> io::Result<bool> {
    let answer = prompt(&format!("{} (yes/no):", question))?;
    Ok(answer_is_yes(&answer))
}

pub fn answer_is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Re-asks until the answer parses.
pub fn prompt_parsed<T>(question: &str) -> io::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    loop {
        let answer = prompt(question)?;
        match answer.parse::<T>() {
            Ok(value) => return Ok(value),
            Err(e) => println!("Invalid input: {}", e),
        }
    }
}

/// Empty answers become `None` so untouched fields are simply not written.
pub fn prompt_optional(question: &str) -> io::Result<Option<String>> {
    let answer = prompt(question)?;
    Ok(if answer.is_empty() { None } else { Some(answer) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn unrecognized_answers_default_to_no() {
        assert!(answer_is_yes("y"));
        assert!(answer_is_yes("YES"));
        assert!(!answer_is_yes("n"));
        assert!(!answer_is_yes(""));
        assert!(!answer_is_yes("sure"));
        assert!(!answer_is_yes("maybe"));
    }

    #[test]
    fn edge_maps_to_core_edge() {
        assert_eq!(CropEdge::from(Edge::Top), CropEdge::Top);
        assert_eq!(CropEdge::from(Edge::Right), CropEdge::Right);
    }
}
