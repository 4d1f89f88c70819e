use std::{
    sync::{Arc, LazyLock},
    time::Duration,
};

use depot_dl::types::Progress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use crate::utils::progress_enabled;

static MULTI: LazyLock<Arc<MultiProgress>> = LazyLock::new(|| Arc::new(MultiProgress::new()));

/// Pause progress display, run the closure, then resume.
pub fn suspend<F: FnOnce()>(f: F) {
    MULTI.suspend(f);
}

/// Stop and clear all progress bars.
pub fn stop() {
    MULTI.clear().ok();
}

fn download_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{spinner:.cyan} {wide_bar:.cyan/dim}  {bytes}/{total_bytes}  {bytes_per_sec}  {eta}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("━━─")
}

/// Creates a hidden bar that becomes visible once a download starts.
pub fn create_download_job() -> ProgressBar {
    let pb = if progress_enabled() {
        MULTI.add(ProgressBar::new(0))
    } else {
        MULTI.add(ProgressBar::hidden())
    };
    pb.set_style(download_style());
    pb
}

/// Updates `pb` for one download event. The bar is reused across labels.
pub fn handle_download_progress(state: Progress, pb: &ProgressBar) {
    match state {
        Progress::Starting { total } => {
            pb.reset();
            pb.set_length(total);
            pb.enable_steady_tick(Duration::from_millis(100));
        }
        Progress::Chunk { current, total } => {
            if pb.length() != Some(total) {
                pb.set_length(total);
            }
            pb.set_position(current);
        }
        Progress::Complete { .. } => {
            pb.disable_steady_tick();
            pb.finish_and_clear();
        }
    }
}
