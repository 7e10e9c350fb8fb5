//! Headless chat state for Parlor.
//!
//! Sessions, messages, the composer draft and the simulated assistant all live
//! here, independent of any rendering toolkit.
#![deny(unsafe_code)]

pub mod chat;
pub mod clock;
pub mod composer;
pub mod config;
pub mod ids;
pub mod message;
pub mod responder;
pub mod store;

pub use chat::{ChatState, DeliveryRejection};
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use composer::Composer;
pub use config::{
    ChatConfig, DEFAULT_CANNED_REPLY, DEFAULT_RESPONSE_DELAY_MS, DEFAULT_SESSION_TITLE,
    DeliveryPolicy, MAX_RESPONSE_DELAY_MS,
};
pub use ids::{IdCounter, MessageId, ReplyTicket, SessionId};
pub use message::{Author, Message, Session};
pub use responder::{
    CANNED_RESPONDER_ID, CannedResponder, PendingReply, Reply, ReplyHandle, ReplyRequest,
    ReplyTarget, Responder, ResponderError, ResponderResult, ResponderWorker,
};
pub use store::{SeedSession, SelectRejection, SessionStore, demo_sessions};
