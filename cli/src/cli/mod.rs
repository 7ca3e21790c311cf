use anyhow::Context;
use app::{
    config::{ConfigBuilder, FilmFluencyConfig},
    ffmpeg::ClipCommands,
    upload::{uploader_for, ArtifactUploader, S3Destination},
    CancelFlag, ExtractionRequest, Pipeline, RunSummary,
};
use filmfluency_core::DialogueFilter;

pub use argparse::get_args;

mod argparse;

fn build_config(opts: &argparse::ConfigOpts) -> anyhow::Result<FilmFluencyConfig> {
    ConfigBuilder::new_with_user_dirs()
        .context("could not create config builder")?
        .load_environment(true)
        .config_file(opts.config.as_deref())
        .context("could not set config file")?
        .ffmpeg_override(opts.ffmpeg.as_deref())
        .context("could not set ffmpeg path")?
        .output_root(opts.output_root.as_deref())
        .context("could not set output root")?
        .build()
        .context("could not build app config")
}

async fn build_uploader(
    args: &argparse::CliOpts,
) -> anyhow::Result<Option<Box<dyn ArtifactUploader>>> {
    let Some(url) = &args.s3 else {
        return Ok(None);
    };
    let destination: S3Destination = url.parse()?;
    let movie_id = args
        .id
        .clone()
        .ok_or_else(|| anyhow::anyhow!("--s3 requires --id"))?;
    let uploader = uploader_for(destination, movie_id)
        .await
        .context("could not set up uploads")?;
    Ok(Some(uploader))
}

fn install_interrupt_handler(cancel: &CancelFlag) {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupted, stopping after the current clip");
            cancel.cancel();
        }
    });
}

pub async fn run_cli(args: &argparse::CliOpts) -> anyhow::Result<()> {
    if !args.movie.is_file() {
        anyhow::bail!("movie file not found: {:?}", args.movie);
    }

    let cfg = build_config(&args.settings)?;
    let ffmpeg = cfg.ffmpeg()?;
    ffmpeg
        .check_available()
        .await
        .context("ffmpeg is required to cut clips")?;
    let uploader = build_uploader(args).await?;

    let output_dir = app::clip_output_dir(&cfg.output_root()?, args.id.as_deref());
    let media =
        ClipCommands::new(ffmpeg, &output_dir).screenshot_offset(cfg.screenshot_offset()?);
    let filter = DialogueFilter::new(cfg.min_words()?, cfg.max_score()?);

    let cancel = CancelFlag::new();
    install_interrupt_handler(&cancel);

    let request = ExtractionRequest {
        movie: args.movie.clone(),
        subtitles: args.srt.clone(),
        screenshot: args.screenshot,
    };
    let summary = Pipeline::new(&media, filter, &output_dir)
        .uploader(uploader.as_deref())
        .show_progress(true)
        .run(&request, &cancel)
        .await?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("report: {}", summary.report_path.display());
    println!("clips:  {}", summary.output_dir.display());
    println!(
        "{} of {} important dialogues clipped",
        summary.clips_produced(),
        summary.selected
    );
    for o in &summary.outcomes {
        match (&o.clip, &o.error) {
            (Some(clip), _) => println!("  #{} {} -> {}", o.index, o.range, clip.display()),
            (None, Some(e)) => println!("  #{} {} failed: {}", o.index, o.range, e),
            (None, None) => {}
        }
        for location in &o.uploaded {
            println!("      uploaded {}", location);
        }
    }
    if summary.cancelled {
        println!(
            "cancelled, {} dialogues were not processed",
            summary.selected - summary.outcomes.len()
        );
    }
}
