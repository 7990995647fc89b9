//! Inbound media handling and the rendering surface contract
//!
//! The controller collects inbound tracks for the current session into a
//! single [`LiveStream`], which is handed to the embedding view layer's
//! [`RenderSurface`] on first track. The stream is replaced wholesale on
//! each new session, never shared between two sessions.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::track::track_remote::TrackRemote;

use crate::Result;

/// Media kind of an inbound track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
    Unknown,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Audio => write!(f, "audio"),
            TrackKind::Video => write!(f, "video"),
            TrackKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Handle to one inbound media track
#[derive(Clone)]
pub struct MediaTrack {
    id: String,
    kind: TrackKind,
    remote: Option<Arc<TrackRemote>>,
}

impl MediaTrack {
    pub(crate) fn from_remote(track: Arc<TrackRemote>) -> Self {
        let kind = match track.kind() {
            RTPCodecType::Audio => TrackKind::Audio,
            RTPCodecType::Video => TrackKind::Video,
            _ => TrackKind::Unknown,
        };
        Self {
            id: track.id().to_string(),
            kind,
            remote: Some(track),
        }
    }

    #[cfg(test)]
    pub(crate) fn synthetic(id: &str, kind: TrackKind) -> Self {
        Self {
            id: id.to_string(),
            kind,
            remote: None,
        }
    }

    /// Track identifier as negotiated in the SDP
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Media kind of this track
    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    /// Underlying remote track, for surfaces that read RTP directly
    pub fn remote(&self) -> Option<&Arc<TrackRemote>> {
        self.remote.as_ref()
    }
}

impl fmt::Debug for MediaTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaTrack")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

/// The single output media stream of one session
///
/// Cloning is cheap; all clones view the same track list. The controller
/// appends tracks as they arrive, so a surface holding the stream sees
/// later tracks of the same session without a new `attach`.
#[derive(Clone, Default)]
pub struct LiveStream {
    tracks: Arc<RwLock<Vec<MediaTrack>>>,
}

impl LiveStream {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_track(&self, track: MediaTrack) {
        self.tracks.write().push(track);
    }

    /// All tracks received so far for this session
    pub fn tracks(&self) -> Vec<MediaTrack> {
        self.tracks.read().clone()
    }

    /// Number of tracks received so far
    pub fn track_count(&self) -> usize {
        self.tracks.read().len()
    }

    /// Whether any track has arrived yet
    pub fn is_empty(&self) -> bool {
        self.tracks.read().is_empty()
    }

    /// First video track, if one has arrived
    pub fn video_track(&self) -> Option<MediaTrack> {
        self.tracks
            .read()
            .iter()
            .find(|t| t.kind() == TrackKind::Video)
            .cloned()
    }
}

impl fmt::Debug for LiveStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveStream")
            .field("track_count", &self.track_count())
            .finish()
    }
}

/// Output surface provided by the embedding view layer
///
/// `attach` is called once per session, on the first inbound track.
/// `play` starts playback; a rejection (autoplay policy) is logged and
/// suppressed by the controller, never propagated.
pub trait RenderSurface: Send + Sync {
    /// Hand the session's output stream to the rendering layer
    fn attach(&self, stream: LiveStream);

    /// Begin playback on the attached stream
    fn play(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_accumulates_tracks_across_clones() {
        let stream = LiveStream::new();
        let view = stream.clone();
        assert!(view.is_empty());

        stream.add_track(MediaTrack::synthetic("video0", TrackKind::Video));
        stream.add_track(MediaTrack::synthetic("audio0", TrackKind::Audio));

        assert_eq!(view.track_count(), 2);
        assert_eq!(view.video_track().unwrap().id(), "video0");
        assert_eq!(view.tracks()[1].kind(), TrackKind::Audio);
    }

    #[test]
    fn synthetic_tracks_have_no_remote() {
        let track = MediaTrack::synthetic("video0", TrackKind::Video);
        assert!(track.remote().is_none());
        assert_eq!(track.id(), "video0");
        assert_eq!(format!("{}", track.kind()), "video");
    }
}
