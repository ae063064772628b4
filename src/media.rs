#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoplayPolicy {
    #[default]
    Allow,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Unstarted,
    Playing,
    Ended,
}

impl PlaybackStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::Playing => "playing",
            Self::Ended => "ended",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MediaState {
    pub(crate) status: PlaybackStatus,
    pub(crate) playback_rate: f64,
    pub(crate) default_playback_rate: f64,
}

impl MediaState {
    pub(crate) fn new() -> Self {
        Self {
            status: PlaybackStatus::Unstarted,
            playback_rate: 1.0,
            default_playback_rate: 1.0,
        }
    }
}
