//! Preview playback through the headless channel.
//!
//! Tracks are requested in order through one [`PlaybackController`], the way
//! clicks on successive play buttons would arrive. Each request stops whatever
//! was playing before it.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};
use xaudi_core::{
    CatalogStore, Category, PlaybackController, ProductId, Progress, Storage, TimedChannel,
    Track, Transition,
};

/// Upper bound on the progress sampling interval.
const SAMPLE_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("{name} must be a non-negative number of seconds, got {value}")]
    InvalidSeconds { name: &'static str, value: f64 },

    #[error("no {category} product with id {id}")]
    UnknownProduct { category: Category, id: String },
}

/// Timing for a preview run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewOptions {
    pub clip: Duration,
    pub switch_after: Option<Duration>,
    pub tick: Duration,
}

impl PreviewOptions {
    /// Build options from command-line seconds.
    ///
    /// # Errors
    ///
    /// Returns an error for negative, NaN, or infinite values.
    pub fn from_seconds(seconds: f64, switch_after: Option<f64>) -> Result<Self, PreviewError> {
        let clip = to_duration("--seconds", seconds)?;
        let switch_after = switch_after
            .map(|s| to_duration("--switch-after", s))
            .transpose()?;
        let tick = (clip / 4).clamp(Duration::from_millis(10), SAMPLE_INTERVAL);
        Ok(Self {
            clip,
            switch_after,
            tick,
        })
    }
}

fn to_duration(name: &'static str, value: f64) -> Result<Duration, PreviewError> {
    Duration::try_from_secs_f64(value).map_err(|_| PreviewError::InvalidSeconds { name, value })
}

fn log_transition(player: &PlaybackController<TimedChannel>, transition: &Transition) {
    if let Some(previous) = &transition.previous {
        info!("  {previous}: {}", player.control(previous).label());
    }
    if let Some(current) = &transition.current {
        info!("  {current}: {}", player.control(current).label());
    }
    info!("Now playing: {}", player.now_playing());
}

/// Play each product's preview in turn.
///
/// Returns the ids whose preview actually started.
///
/// # Errors
///
/// Returns an error if any id is not in the category's catalog. Nothing plays
/// in that case.
pub async fn run<S: Storage>(
    storage: S,
    category: Category,
    ids: &[String],
    options: &PreviewOptions,
) -> Result<Vec<ProductId>, PreviewError> {
    let store = CatalogStore::new(storage);
    let tracks = ids
        .iter()
        .map(|id| {
            store
                .find(category, &ProductId::new(id.as_str()))
                .map(|product| Track::from(&product))
                .ok_or_else(|| PreviewError::UnknownProduct {
                    category,
                    id: id.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut player = PlaybackController::new(TimedChannel::new(options.clip));
    let mut started = Vec::new();

    for (index, track) in tracks.iter().enumerate() {
        info!("Play {}", track.title);
        let transition = player.request(track);
        log_transition(&player, &transition);

        if transition.current.is_none() {
            warn!("No preview for {}", track.id);
            continue;
        }
        started.push(track.id.clone());

        let has_next = index + 1 < tracks.len();
        let opened = Instant::now();
        let mut ticker = tokio::time::interval(options.tick);
        let mut shown_quarter = None;

        loop {
            ticker.tick().await;

            if has_next
                && options
                    .switch_after
                    .is_some_and(|after| opened.elapsed() >= after)
            {
                break;
            }

            let percent = match player.sample_progress() {
                Progress::Percent(percent) => percent,
                Progress::Ended(transition) => {
                    info!("Finished {}", track.title);
                    log_transition(&player, &transition);
                    break;
                }
                Progress::Stopped => break,
            };

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let quarter = (percent / 25.0).floor() as u8;
            if shown_quarter != Some(quarter) {
                shown_quarter = Some(quarter);
                info!("  {:>3.0}%", percent);
            }
        }
    }

    Ok(started)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use xaudi_core::MemoryStorage;

    #[test]
    fn test_options_reject_bad_seconds() {
        assert!(PreviewOptions::from_seconds(-1.0, None).is_err());
        assert!(PreviewOptions::from_seconds(f64::NAN, None).is_err());
        assert!(PreviewOptions::from_seconds(1.0, Some(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_options_bound_tick() {
        let long = PreviewOptions::from_seconds(30.0, Some(5.0)).unwrap();
        assert_eq!(long.tick, SAMPLE_INTERVAL);
        assert_eq!(long.switch_after, Some(Duration::from_secs(5)));

        let short = PreviewOptions::from_seconds(0.0, None).unwrap();
        assert_eq!(short.tick, Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_unknown_id_plays_nothing() {
        let storage = MemoryStorage::new();
        CatalogStore::new(&storage).seed().unwrap();
        let options = PreviewOptions::from_seconds(0.05, None).unwrap();

        let ids = vec!["beat-01".to_string(), "beat-404".to_string()];
        let err = run(&storage, Category::Beats, &ids, &options).await.unwrap_err();
        assert!(matches!(err, PreviewError::UnknownProduct { .. }));
    }

    #[tokio::test]
    async fn test_plays_through_and_switches() {
        let storage = MemoryStorage::new();
        CatalogStore::new(&storage).seed().unwrap();
        let options = PreviewOptions::from_seconds(0.05, Some(0.01)).unwrap();

        let ids = vec!["beat-01".to_string(), "beat-02".to_string()];
        let started = run(&storage, Category::Beats, &ids, &options).await.unwrap();
        assert_eq!(started, [ProductId::new("beat-01"), ProductId::new("beat-02")]);
    }

    #[tokio::test]
    async fn test_presets_have_no_preview() {
        let storage = MemoryStorage::new();
        CatalogStore::new(&storage).seed().unwrap();
        let options = PreviewOptions::from_seconds(0.05, None).unwrap();

        let ids = vec!["preset-01".to_string()];
        let started = run(&storage, Category::VocalPresets, &ids, &options).await.unwrap();
        assert!(started.is_empty());
    }
}
