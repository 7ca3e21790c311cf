use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use filmfluency_core::{load_cues, ClipRange, DialogueFilter, ScoredDialogue};
use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    media::MediaCollaborator,
    report::{report_path, save_report},
    upload::ArtifactUploader,
    FilmFluencyAppError,
};

const LOCAL_RUN_ID: &str = "local";

/// Shared stop signal, checked between clips.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> CancelFlag {
        CancelFlag::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// `<output_root>/clips_<movie_id>`, or `clips_local` without an id.
pub fn clip_output_dir(output_root: &Path, movie_id: Option<&str>) -> PathBuf {
    output_root.join(format!("clips_{}", movie_id.unwrap_or(LOCAL_RUN_ID)))
}

#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub movie: PathBuf,
    pub subtitles: PathBuf,
    pub screenshot: bool,
}

/// What happened to a single selected dialogue.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipOutcome {
    pub index: u32,
    pub range: ClipRange,
    pub clip: Option<PathBuf>,
    pub screenshot: Option<PathBuf>,
    pub audio: Option<PathBuf>,
    pub uploaded: Vec<String>,
    pub error: Option<String>,
}

impl ClipOutcome {
    fn new(index: u32, range: ClipRange) -> ClipOutcome {
        ClipOutcome {
            index,
            range,
            clip: None,
            screenshot: None,
            audio: None,
            uploaded: Vec::new(),
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report_path: PathBuf,
    pub output_dir: PathBuf,
    pub selected: usize,
    pub outcomes: Vec<ClipOutcome>,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn clips_produced(&self) -> usize {
        self.outcomes.iter().filter(|o| o.clip.is_some()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ClipOutcome> {
        self.outcomes.iter().filter(|o| o.error.is_some())
    }
}

/// Select hard dialogue from a subtitle file and turn each one into media.
///
/// The report is always written before any media work starts. Clips are
/// processed one at a time in subtitle order; a failed cut is recorded on its
/// outcome and the run moves on.
#[derive(Debug)]
pub struct Pipeline<'a, M> {
    media: &'a M,
    filter: DialogueFilter,
    output_dir: PathBuf,
    uploader: Option<&'a dyn ArtifactUploader>,
    progress: ProgressBar,
}

impl<'a, M: MediaCollaborator> Pipeline<'a, M> {
    pub fn new<P: Into<PathBuf>>(media: &'a M, filter: DialogueFilter, output_dir: P) -> Self {
        Pipeline {
            media,
            filter,
            output_dir: output_dir.into(),
            uploader: None,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn uploader(mut self, uploader: Option<&'a dyn ArtifactUploader>) -> Self {
        self.uploader = uploader;
        self
    }

    /// Draw a progress bar on stderr while clips are produced.
    pub fn show_progress(mut self, show: bool) -> Self {
        self.progress = if show {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        self
    }

    pub fn select(&self, subtitles: &Path) -> Result<Vec<ScoredDialogue>, FilmFluencyAppError> {
        let cues = load_cues(subtitles)?;
        let selected = self.filter.filter(&cues);
        log::info!(
            "selected {} of {} cues from {:?}",
            selected.len(),
            cues.len(),
            subtitles
        );
        Ok(selected)
    }

    pub async fn run(
        &self,
        request: &ExtractionRequest,
        cancel: &CancelFlag,
    ) -> Result<RunSummary, FilmFluencyAppError> {
        let dialogues = self.select(&request.subtitles)?;

        let report = report_path(&request.subtitles);
        save_report(&report, &dialogues)?;
        if let Some(uploader) = self.uploader {
            if let Err(e) = uploader.upload(&report).await {
                log::warn!("could not upload report {:?}: {}", report, e);
            }
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| FilmFluencyAppError::OutputDir {
                path: self.output_dir.clone(),
                source,
            })?;

        self.progress.set_length(dialogues.len() as u64);
        self.progress.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40}] {pos}/{len} clips {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut outcomes = Vec::with_capacity(dialogues.len());
        let mut cancelled = false;
        for dialogue in &dialogues {
            if cancel.is_cancelled() {
                log::warn!(
                    "cancelled with {} of {} clips done",
                    outcomes.len(),
                    dialogues.len()
                );
                cancelled = true;
                break;
            }
            self.progress
                .set_message(dialogue.start.whole_seconds().to_string());
            outcomes.push(
                self.process(&request.movie, dialogue, request.screenshot)
                    .await,
            );
            self.progress.inc(1);
        }
        self.progress.finish_and_clear();

        Ok(RunSummary {
            report_path: report,
            output_dir: self.output_dir.clone(),
            selected: dialogues.len(),
            outcomes,
            cancelled,
        })
    }

    async fn process(
        &self,
        movie: &Path,
        dialogue: &ScoredDialogue,
        screenshot: bool,
    ) -> ClipOutcome {
        let range = ClipRange::adjust(dialogue.start, dialogue.end);
        let mut outcome = ClipOutcome::new(dialogue.index, range);
        log::debug!(
            "dialogue {} ({:.1}): {}",
            dialogue.index,
            dialogue.score,
            range
        );

        let clip = match self.media.cut(movie, &range).await {
            Ok(clip) => clip,
            Err(e) => {
                log::warn!("dialogue {}: {}", dialogue.index, e);
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };

        if screenshot {
            outcome.screenshot = self.media.screenshot(&clip).await;
        }
        outcome.audio = self.media.extract_audio(&clip).await;
        outcome.clip = Some(clip);

        if let Some(uploader) = self.uploader {
            let artifacts = [&outcome.clip, &outcome.screenshot, &outcome.audio];
            let mut uploaded = Vec::new();
            for path in artifacts.into_iter().flatten() {
                match uploader.upload(path).await {
                    Ok(location) => uploaded.push(location),
                    Err(e) => log::warn!("could not upload {:?}: {}", path, e),
                }
            }
            outcome.uploaded = uploaded;
        }
        outcome
    }
}
