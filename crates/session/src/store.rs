use std::sync::Arc;

use crate::clock::Clock;
use crate::config::{ChatConfig, DEFAULT_SESSION_TITLE};
use crate::ids::{IdCounter, MessageId, SessionId};
use crate::message::{Author, Message, Session};

/// Session blueprint used to populate a fresh store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSession {
    pub title: String,
    pub messages: Vec<(Author, String)>,
}

impl SeedSession {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, author: Author, content: impl Into<String>) -> Self {
        self.messages.push((author, content.into()));
        self
    }
}

/// The three sample conversations shown on first launch, in display order.
pub fn demo_sessions() -> Vec<SeedSession> {
    vec![
        SeedSession::new(DEFAULT_SESSION_TITLE)
            .with_message(Author::User, "Hi! How are you?")
            .with_message(
                Author::Assistant,
                "Hi! All is great, thanks for asking. How are you? How can I help?",
            ),
        SeedSession::new("Website development")
            .with_message(Author::User, "Help me build a website"),
        SeedSession::new("Learning React").with_message(Author::User, "Explain hooks in React"),
    ]
}

/// Returned when a selection names a session that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectRejection {
    UnknownSession {
        requested: SessionId,
        active: SessionId,
    },
}

/// Owns the ordered session collection and the active-session pointer.
///
/// The collection is never empty and the active id always names a stored
/// session: construction seeds at least one session, creation inserts and
/// activates in one step, and nothing removes sessions.
pub struct SessionStore {
    sessions: Vec<Session>,
    active_session_id: SessionId,
    session_ids: IdCounter,
    message_ids: IdCounter,
    default_title: String,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(config: &ChatConfig, clock: Arc<dyn Clock>) -> Self {
        let seed = if config.seed_demo_sessions {
            demo_sessions()
        } else {
            Vec::new()
        };

        Self::seeded(seed, config.default_session_title.clone(), clock)
    }

    /// Builds a store from explicit blueprints. The first blueprint becomes
    /// the active session; an empty list yields one empty default session.
    pub fn seeded(
        seed: Vec<SeedSession>,
        default_title: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let default_title = default_title.into();
        let mut session_ids = IdCounter::default();
        let mut message_ids = IdCounter::default();
        let now = clock.now();

        let mut blueprints = seed;
        if blueprints.is_empty() {
            blueprints.push(SeedSession::new(default_title.clone()));
        }

        let sessions = blueprints
            .into_iter()
            .map(|blueprint| {
                let mut session = Session::new(session_ids.allocate(), blueprint.title, now);
                for (author, content) in blueprint.messages {
                    session.push(Message::new(message_ids.allocate(), author, content, now));
                }
                session
            })
            .collect::<Vec<_>>();

        let active_session_id = sessions[0].id();
        tracing::debug!(
            sessions = sessions.len(),
            active = %active_session_id,
            "seeded session store"
        );

        Self {
            sessions,
            active_session_id,
            session_ids,
            message_ids,
            default_title,
            clock,
        }
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn session(&self, session_id: SessionId) -> Option<&Session> {
        self.sessions
            .iter()
            .find(|session| session.id() == session_id)
    }

    pub fn contains(&self, session_id: SessionId) -> bool {
        self.session(session_id).is_some()
    }

    pub fn active_session_id(&self) -> SessionId {
        self.active_session_id
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.session(self.active_session_id)
    }

    pub fn default_title(&self) -> &str {
        &self.default_title
    }

    pub fn set_default_title(&mut self, title: impl Into<String>) {
        self.default_title = title.into();
    }

    /// Prepends a new empty session and makes it active.
    pub fn create_session(&mut self) -> SessionId {
        let session_id = self.session_ids.allocate();
        let session = Session::new(session_id, self.default_title.clone(), self.clock.now());

        self.sessions.insert(0, session);
        self.active_session_id = session_id;
        tracing::debug!(session = %session_id, total = self.sessions.len(), "created session");
        session_id
    }

    /// Moves the active pointer. Unknown ids leave the pointer untouched.
    pub fn select_session(&mut self, session_id: SessionId) -> Result<(), SelectRejection> {
        if !self.contains(session_id) {
            return Err(SelectRejection::UnknownSession {
                requested: session_id,
                active: self.active_session_id,
            });
        }

        if self.active_session_id != session_id {
            tracing::debug!(from = %self.active_session_id, to = %session_id, "selected session");
            self.active_session_id = session_id;
        }

        Ok(())
    }

    /// Appends a message and bumps the session's activity time.
    ///
    /// Returns `None` without touching anything when the session is unknown.
    pub fn append_message(
        &mut self,
        session_id: SessionId,
        author: Author,
        content: impl Into<String>,
    ) -> Option<MessageId> {
        let Some(session) = self
            .sessions
            .iter_mut()
            .find(|session| session.id() == session_id)
        else {
            tracing::debug!(session = %session_id, "ignored append to unknown session");
            return None;
        };

        let message_id = self.message_ids.allocate();
        session.push(Message::new(message_id, author, content, self.clock.now()));
        tracing::debug!(session = %session_id, message = %message_id, ?author, "appended message");
        Some(message_id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::time::Duration;

    use super::*;
    use crate::clock::{ManualClock, Timestamp};

    fn manual_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Timestamp::from_unix_millis(1_700_000_000_000)))
    }

    fn demo_store(clock: Arc<ManualClock>) -> SessionStore {
        SessionStore::new(&ChatConfig::default(), clock)
    }

    #[test]
    fn demo_seed_matches_first_launch_layout() {
        let store = demo_store(manual_clock());

        let titles = store
            .sessions()
            .iter()
            .map(|session| session.title().to_string())
            .collect::<Vec<_>>();
        assert_eq!(
            titles,
            vec!["New chat", "Website development", "Learning React"]
        );
        assert_eq!(store.active_session_id(), SessionId::new(1));

        let first = store.active_session().expect("active session exists");
        assert_eq!(first.messages().len(), 2);
        assert!(first.messages()[0].is_user());
        assert!(!first.messages()[1].is_user());

        let message_ids = store
            .sessions()
            .iter()
            .flat_map(|session| session.messages().iter().map(|message| message.id.get()))
            .collect::<Vec<_>>();
        assert_eq!(message_ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn disabled_seed_still_yields_one_active_session() {
        let config = ChatConfig {
            seed_demo_sessions: false,
            ..ChatConfig::default()
        };
        let store = SessionStore::new(&config, manual_clock());

        assert_eq!(store.len(), 1);
        let active = store.active_session().expect("active session exists");
        assert!(active.is_empty());
        assert_eq!(active.title(), DEFAULT_SESSION_TITLE);
    }

    #[test]
    fn create_session_prepends_and_activates() {
        let mut store = demo_store(manual_clock());
        let before = store.len();

        let created = store.create_session();

        assert_eq!(store.len(), before + 1);
        assert_eq!(store.sessions()[0].id(), created);
        assert_eq!(store.active_session_id(), created);
        assert!(store.sessions()[0].is_empty());
        assert_eq!(store.sessions()[0].title(), DEFAULT_SESSION_TITLE);
    }

    #[test]
    fn rapid_creations_never_collide() {
        let mut store = demo_store(manual_clock());

        let created = (0..50).map(|_| store.create_session()).collect::<Vec<_>>();
        let unique = created.iter().copied().collect::<HashSet<_>>();

        assert_eq!(unique.len(), created.len());
        assert!(created.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn selecting_unknown_session_keeps_active_pointer() {
        let mut store = demo_store(manual_clock());
        store
            .select_session(SessionId::new(2))
            .expect("seeded session is selectable");

        let rejection = store.select_session(SessionId::new(999));

        assert_eq!(
            rejection,
            Err(SelectRejection::UnknownSession {
                requested: SessionId::new(999),
                active: SessionId::new(2),
            })
        );
        assert_eq!(store.active_session_id(), SessionId::new(2));
    }

    #[test]
    fn append_to_unknown_session_is_a_no_op() {
        let mut store = demo_store(manual_clock());
        let snapshot = store.sessions().to_vec();

        assert_eq!(
            store.append_message(SessionId::new(42), Author::User, "lost"),
            None
        );
        assert_eq!(store.sessions(), snapshot.as_slice());
    }

    #[test]
    fn append_updates_last_activity_even_when_clock_rewinds() {
        let clock = manual_clock();
        let mut store = demo_store(clock.clone());
        let session_id = store.create_session();

        clock.advance(Duration::from_secs(30));
        store.append_message(session_id, Author::User, "first");
        let after_first = store.session(session_id).map(Session::last_activity_at);

        clock.set(Timestamp::from_unix_millis(5));
        store.append_message(session_id, Author::Assistant, "second");

        let session = store.session(session_id).expect("session exists");
        assert_eq!(Some(session.last_activity_at()), after_first);
        let last = session.last_message().expect("message appended");
        assert!(session.last_activity_at() >= last.created_at);
        assert_eq!(session.messages().len(), 2);
    }

    #[test]
    fn message_ids_are_unique_across_sessions() {
        let mut store = demo_store(manual_clock());
        let first = store.active_session_id();
        let second = store.create_session();

        let ids = [
            store.append_message(first, Author::User, "a"),
            store.append_message(second, Author::User, "b"),
            store.append_message(first, Author::Assistant, "c"),
        ];

        let unique = ids.iter().flatten().collect::<HashSet<_>>();
        assert_eq!(unique.len(), 3);
    }
}
