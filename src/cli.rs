use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// IIIF Presentation API base; manifests live at `{base}/{pid}/manifest`.
    #[arg(long, global = true)]
    pub presentation_base: Option<String>,

    /// Per-request HTTP timeout.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the item identifier a Handle resolves to.
    Resolve(ResolveArgs),
    /// Print one IIIF image URL per page without downloading.
    Urls(ImageArgs),
    /// Download every page of the item.
    Download(DownloadArgs),
}

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Handle URL (e.g. http://handle.slv.vic.gov.au/10381/12345).
    #[arg(long)]
    pub handle: String,
}

#[derive(Debug, Args)]
pub struct ImageArgs {
    /// Handle URL (e.g. http://handle.slv.vic.gov.au/10381/12345).
    #[arg(long)]
    pub handle: String,

    /// Image format (jpg, tif, png; other values are sent as-is).
    #[arg(long, default_value = "jpg")]
    pub format: String,

    /// Maximum width in pixels.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_width: Option<u32>,

    /// Maximum height in pixels.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_height: Option<u32>,
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub image: ImageArgs,

    /// Output directory for page images (default: `images`).
    #[arg(long)]
    pub out: Option<String>,

    /// Print one JSON record per written page instead of the path.
    #[arg(long)]
    pub json: bool,
}
