use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use rdm_core::progress::ProgressListener;

/// Exponential moving average smoothing factor for the displayed speed.
/// Lower values smooth harder; 0.3 settles within a couple of updates
/// without visible jitter.
const SPEED_EMA_ALPHA: f64 = 0.3;

struct SpeedTracker {
    last_instant: Instant,
    last_downloaded: u64,
    smoothed_bytes_per_sec: f64,
}

/// Renders a single indicatif bar for the whole download, with an
/// EMA-smoothed throughput readout in the template.
///
/// One bar, not one-per-range: the core only hands its listener the
/// aggregate `(downloaded, total)` pair (see
/// [`rdm_core::progress::ProgressListener`]), so there is nothing
/// per-range left to render here.
pub struct TerminalProgressListener {
    bar: ProgressBar,
    tracker: Mutex<SpeedTracker>,
}

impl TerminalProgressListener {
    pub fn new(total_bytes: u64) -> Self {
        let style = ProgressStyle::with_template(
            "[{bar:40.cyan/blue}] {bytes}/{total_bytes} ({msg}) ETA {eta}",
        )
        .unwrap()
        .progress_chars("=>-");

        let bar = ProgressBar::new(total_bytes.max(1));
        bar.set_style(style);

        Self {
            bar,
            tracker: Mutex::new(SpeedTracker {
                last_instant: Instant::now(),
                last_downloaded: 0,
                smoothed_bytes_per_sec: 0.0,
            }),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("done");
    }

    pub fn abandon(&self, message: impl Into<String>) {
        self.bar.abandon_with_message(message.into());
    }
}

#[async_trait]
impl ProgressListener for TerminalProgressListener {
    async fn on_progress(&self, bytes_downloaded: u64, total_bytes: u64) {
        self.bar.set_length(total_bytes.max(1));
        self.bar.set_position(bytes_downloaded);

        let speed = {
            let mut tracker = self.tracker.lock().unwrap();
            let now = Instant::now();
            let elapsed = now.duration_since(tracker.last_instant).as_secs_f64();
            if elapsed > 0.0 {
                let delta_bytes = bytes_downloaded.saturating_sub(tracker.last_downloaded) as f64;
                let instantaneous = delta_bytes / elapsed;
                tracker.smoothed_bytes_per_sec = SPEED_EMA_ALPHA * instantaneous
                    + (1.0 - SPEED_EMA_ALPHA) * tracker.smoothed_bytes_per_sec;
                tracker.last_instant = now;
                tracker.last_downloaded = bytes_downloaded;
            }
            tracker.smoothed_bytes_per_sec
        };

        self.bar.set_message(format_speed(speed));
    }
}

fn format_speed(bytes_per_sec: f64) -> String {
    const UNITS: [&str; 5] = ["B/s", "KiB/s", "MiB/s", "GiB/s", "TiB/s"];
    let mut value = bytes_per_sec;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sub_kib_speed_in_bytes() {
        assert_eq!(format_speed(512.0), "512.0 B/s");
    }

    #[test]
    fn formats_mib_speed() {
        assert_eq!(format_speed(2.5 * 1024.0 * 1024.0), "2.5 MiB/s");
    }
}
