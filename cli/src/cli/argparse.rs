use std::path::PathBuf;

use clap::Parser;

pub fn get_args() -> CliOpts {
    CliOpts::parse()
}

/// Cut the hardest lines of dialogue out of a movie for language practice.
#[derive(Parser, Debug)]
#[clap(version = clap::crate_version!())]
pub struct CliOpts {
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Movie file to cut clips from
    #[clap(long)]
    pub movie: PathBuf,

    /// SubRip subtitles for the movie
    #[clap(long)]
    pub srt: PathBuf,

    /// Also grab a still frame from every clip
    #[clap(long)]
    pub screenshot: bool,

    /// Upload every artifact to `s3://bucket[/prefix]`
    #[clap(long, requires = "id")]
    pub s3: Option<String>,

    /// Identifier for this movie, used to name outputs
    #[clap(long)]
    pub id: Option<String>,

    #[clap(flatten)]
    pub settings: ConfigOpts,
}

#[derive(Parser, Debug)]
pub struct ConfigOpts {
    /// Path to a toml config file.
    ///
    /// If not provided, `filmfluency.toml` in the user config dir is used when present.
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Path to the ffmpeg executable
    #[clap(long)]
    pub ffmpeg: Option<PathBuf>,

    /// Directory the `clips_<id>` output directory is created in
    #[clap(long)]
    pub output_root: Option<PathBuf>,
}
