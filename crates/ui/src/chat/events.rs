use parlor_session::SessionId;

/// Emitted when a sidebar row is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionSelected {
    pub session_id: SessionId,
}

/// Emitted by the sidebar "New chat" button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSessionRequested;

/// Emitted on every edit of the composer text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftChanged {
    pub text: String,
}

/// Emitted when the user presses Enter or clicks send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitRequested;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsRequested;
