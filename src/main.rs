use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser as _;
use slv_iiif::cli::{Cli, Command, ImageArgs};
use slv_iiif::{Config, DownloadRequest, ImageFormat, SizeSpec};

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    slv_iiif::logging::init(cli.verbose).context("init logging")?;
    tracing::debug!(?cli, "parsed cli");

    let mut config = Config::from_env();
    if let Some(base) = cli.presentation_base.clone() {
        config.presentation_base = base;
    }
    if let Some(secs) = cli.timeout_secs {
        config.client.timeout = Duration::from_secs(secs);
    }

    match cli.command {
        Command::Resolve(args) => {
            let session = slv_iiif::session::Session::open(&config.client)?;
            let pid = slv_iiif::handle::resolve(&session, &args.handle).context("resolve")?;
            println!("{pid}");
        }
        Command::Urls(args) => {
            let request = download_request(&args);
            let pages = slv_iiif::list_image_urls(&config, &request).context("urls")?;
            for page in pages {
                println!("{}", page.url);
            }
        }
        Command::Download(args) => {
            if let Some(out) = args.out.as_deref() {
                config.output_dir = PathBuf::from(out);
            }
            let request = download_request(&args.image);
            let pages = slv_iiif::download_images(&config, &request).context("download")?;
            for page in pages {
                if args.json {
                    println!(
                        "{}",
                        serde_json::to_string(&page).context("serialize page record")?
                    );
                } else {
                    println!("{}", page.path.display());
                }
            }
        }
    }

    Ok(())
}

fn download_request(args: &ImageArgs) -> DownloadRequest {
    DownloadRequest::new(args.handle.as_str())
        .with_format(ImageFormat::from(args.format.as_str()))
        .with_size(SizeSpec::new(args.max_width, args.max_height))
}
