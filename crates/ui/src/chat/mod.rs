pub mod composer_input;
/// Events the chat regions use to talk to their parent view.
pub mod events;
pub mod message_feed;
pub mod scroll_manager;
pub mod sidebar;
pub mod view;

pub use composer_input::ComposerInput;
pub use events::{
    DraftChanged, NewSessionRequested, SessionSelected, SettingsRequested, SubmitRequested,
};
pub use message_feed::MessageFeed;
pub use scroll_manager::ScrollManager;
pub use sidebar::{ChatSidebar, SessionRow};
pub use view::ChatView;
