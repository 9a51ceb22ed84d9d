//! Playback Controller: one shared audio channel for product previews.
//!
//! The controller owns the channel and the only copy of the playback state.
//! Requesting a track that is already playing stops it; requesting any
//! other track stops the current one first, so at most one control ever
//! shows a playing state. A channel that refuses to start leaves the
//! controller idle and the failure is swallowed.

use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::product::Product;
use crate::types::ProductId;

/// Label shown in the "now playing" slot while nothing plays.
pub const IDLE_LABEL: &str = "—";

/// Reasons a channel refuses to start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The platform declined to start audio (e.g. no user gesture).
    #[error("playback declined: {0}")]
    Declined(String),

    /// No source is bound to the channel.
    #[error("no preview available")]
    NoPreview,
}

/// The single audio output previews play through.
pub trait AudioChannel {
    /// Bind a new source, replacing any previous one.
    fn load(&mut self, source: &str);

    /// Start playing the bound source from the beginning.
    ///
    /// # Errors
    ///
    /// Returns [`PlaybackError`] if playback cannot start.
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Stop playback and release the bound source.
    fn stop(&mut self);

    /// Current playback position.
    fn position(&self) -> Duration;

    /// Length of the bound source, once known.
    fn duration(&self) -> Option<Duration>;

    /// Whether the bound source has played to its end.
    fn has_ended(&self) -> bool;
}

/// What a play button needs to know about a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: ProductId,
    pub title: String,
    pub preview: Option<String>,
}

impl From<&Product> for Track {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            preview: product.audio.clone(),
        }
    }
}

/// Controller state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing { id: ProductId, title: String },
}

/// Visual state of one product's play button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    Playing,
}

impl ControlState {
    /// Button caption.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Play",
            Self::Playing => "Pause",
        }
    }
}

/// The controls affected by a state change.
///
/// Views re-render the `previous` and `current` controls, the now-playing
/// label, and restart the progress bar.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transition {
    /// Track that was playing before the change.
    pub previous: Option<ProductId>,
    /// Track playing after the change.
    pub current: Option<ProductId>,
}

impl Transition {
    /// Whether anything changed.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.previous.is_none() && self.current.is_none()
    }
}

/// One reading of the progress bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    /// Fill, in percent within `[0, 100]`.
    Percent(f64),
    /// The track reached its end on this sample. The transition names the
    /// control to reset.
    Ended(Transition),
    /// Nothing is being sampled.
    Stopped,
}

impl Progress {
    /// The fill percentage, if a track is still playing.
    #[must_use]
    pub const fn percent(&self) -> Option<f64> {
        match self {
            Self::Percent(p) => Some(*p),
            Self::Ended(_) | Self::Stopped => None,
        }
    }
}

/// Single-channel preview player.
#[derive(Debug)]
pub struct PlaybackController<C> {
    channel: C,
    state: PlaybackState,
    sampling: bool,
}

impl<C: AudioChannel> PlaybackController<C> {
    /// Take ownership of the shared channel.
    pub const fn new(channel: C) -> Self {
        Self {
            channel,
            state: PlaybackState::Idle,
            sampling: false,
        }
    }

    /// Handle a click on a track's play button.
    pub fn request(&mut self, track: &Track) -> Transition {
        let previous = self.playing_id().cloned();

        if previous.as_ref() == Some(&track.id) {
            self.halt();
            debug!(id = %track.id, "preview stopped");
            return Transition {
                previous,
                current: None,
            };
        }

        if previous.is_some() {
            self.halt();
        }

        let Some(source) = track.preview.as_deref() else {
            debug!(id = %track.id, "track has no preview");
            return Transition {
                previous,
                current: None,
            };
        };

        self.channel.load(source);
        if let Err(e) = self.channel.play() {
            debug!(id = %track.id, error = %e, "preview start declined");
            self.channel.stop();
            return Transition {
                previous,
                current: None,
            };
        }

        self.state = PlaybackState::Playing {
            id: track.id.clone(),
            title: track.title.clone(),
        };
        self.sampling = true;
        debug!(id = %track.id, "preview started");

        Transition {
            previous,
            current: Some(track.id.clone()),
        }
    }

    /// Handle the channel reaching the end of the track.
    pub fn on_ended(&mut self) -> Transition {
        let previous = self.playing_id().cloned();
        if previous.is_some() {
            self.halt();
        }
        Transition {
            previous,
            current: None,
        }
    }

    /// Read the progress bar.
    ///
    /// Reaching the end of the track transitions to idle, stops sampling and
    /// reports [`Progress::Ended`] once. Later samples report
    /// [`Progress::Stopped`].
    pub fn sample_progress(&mut self) -> Progress {
        if !self.sampling {
            return Progress::Stopped;
        }
        if self.channel.has_ended() {
            return Progress::Ended(self.on_ended());
        }

        let position = self.channel.position().as_secs_f64();
        let percent = match self.channel.duration() {
            Some(total) if !total.is_zero() => position / total.as_secs_f64() * 100.0,
            _ => 0.0,
        };
        Progress::Percent(percent.clamp(0.0, 100.0))
    }

    fn halt(&mut self) {
        self.channel.stop();
        self.state = PlaybackState::Idle;
        self.sampling = false;
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Id of the playing track, if any.
    #[must_use]
    pub const fn playing_id(&self) -> Option<&ProductId> {
        match &self.state {
            PlaybackState::Idle => None,
            PlaybackState::Playing { id, .. } => Some(id),
        }
    }

    /// State of the play button for `id`.
    #[must_use]
    pub fn control(&self, id: &ProductId) -> ControlState {
        if self.playing_id() == Some(id) {
            ControlState::Playing
        } else {
            ControlState::Idle
        }
    }

    /// Text for the now-playing slot.
    #[must_use]
    pub fn now_playing(&self) -> &str {
        match &self.state {
            PlaybackState::Idle => IDLE_LABEL,
            PlaybackState::Playing { title, .. } => title,
        }
    }

    /// Whether the progress bar is being sampled.
    #[must_use]
    pub const fn is_sampling(&self) -> bool {
        self.sampling
    }

    /// Borrow the underlying channel.
    #[must_use]
    pub const fn channel(&self) -> &C {
        &self.channel
    }
}

// =============================================================================
// Headless channel
// =============================================================================

/// A channel that "plays" silence for a fixed clip length.
///
/// Used where no audio device is available; position follows a monotonic
/// clock from the moment `play` succeeds.
#[derive(Debug, Clone)]
pub struct TimedChannel {
    clip: Duration,
    source: Option<String>,
    started: Option<Instant>,
}

impl TimedChannel {
    /// Create a channel whose every source lasts `clip`.
    #[must_use]
    pub const fn new(clip: Duration) -> Self {
        Self {
            clip,
            source: None,
            started: None,
        }
    }

    /// The bound source, if any.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl AudioChannel for TimedChannel {
    fn load(&mut self, source: &str) {
        self.source = Some(source.to_string());
        self.started = None;
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.source.is_none() {
            return Err(PlaybackError::NoPreview);
        }
        self.started = Some(Instant::now());
        Ok(())
    }

    fn stop(&mut self) {
        self.source = None;
        self.started = None;
    }

    fn position(&self) -> Duration {
        self.started
            .map_or(Duration::ZERO, |started| started.elapsed().min(self.clip))
    }

    fn duration(&self) -> Option<Duration> {
        self.source.as_ref().map(|_| self.clip)
    }

    fn has_ended(&self) -> bool {
        self.started
            .is_some_and(|started| started.elapsed() >= self.clip)
    }
}
