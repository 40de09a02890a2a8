/// Capture engine state machine.
///
/// State transitions:
/// ```text
/// idle → connecting → listening ⇄ retrying
///                        ↓          ↓
///                        └→ stopped ←┘
/// stopped → connecting (new session)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Connecting,
    Listening,
    /// Waiting to reopen the stream after `attempt` consecutive failures.
    Retrying { attempt: u32 },
    Stopped,
}

impl CaptureState {
    pub fn is_retrying(&self) -> bool {
        matches!(self, Self::Retrying { .. })
    }

    /// A session is live: ingestion is running or about to.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Listening | Self::Retrying { .. })
    }

    /// Clips can only be cut while the engine holds a live buffer.
    pub fn can_save(&self) -> bool {
        matches!(self, Self::Listening | Self::Retrying { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Listening => "listening",
            Self::Retrying { .. } => "retrying",
            Self::Stopped => "stopped",
        }
    }
}
