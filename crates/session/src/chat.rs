use std::collections::BTreeMap;
use std::sync::Arc;

use crate::clock::Clock;
use crate::composer::Composer;
use crate::config::{ChatConfig, DeliveryPolicy};
use crate::ids::{IdCounter, MessageId, ReplyTicket, SessionId};
use crate::message::{Author, Session};
use crate::responder::{Reply, ReplyRequest, ReplyTarget};
use crate::store::{SelectRejection, SessionStore};

/// Why a reply was not appended anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryRejection {
    /// The ticket was never issued, or already delivered or abandoned.
    UnknownTicket(ReplyTicket),
    /// The ticket exists but was issued for another session.
    TargetMismatch {
        expected: ReplyTarget,
        received: ReplyTarget,
    },
    SessionMissing(SessionId),
}

/// Single owner of all chat view state.
///
/// Rendering reads from here; user actions and landed replies mutate it only
/// through these methods. The composing flag stays raised while at least one
/// reply ticket is outstanding.
pub struct ChatState {
    store: SessionStore,
    composer: Composer,
    in_flight: BTreeMap<ReplyTicket, ReplyTarget>,
    tickets: IdCounter,
    delivery_policy: DeliveryPolicy,
}

impl ChatState {
    pub fn new(config: &ChatConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_store(SessionStore::new(config, clock), config.delivery_policy)
    }

    pub fn with_store(store: SessionStore, delivery_policy: DeliveryPolicy) -> Self {
        Self {
            store,
            composer: Composer::new(),
            in_flight: BTreeMap::new(),
            tickets: IdCounter::default(),
            delivery_policy,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn sessions(&self) -> &[Session] {
        self.store.sessions()
    }

    pub fn active_session_id(&self) -> SessionId {
        self.store.active_session_id()
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.store.active_session()
    }

    pub fn draft(&self) -> &str {
        self.composer.draft()
    }

    pub fn can_submit(&self) -> bool {
        self.composer.can_submit()
    }

    pub fn is_composing(&self) -> bool {
        self.composer.is_composing()
    }

    pub fn delivery_policy(&self) -> DeliveryPolicy {
        self.delivery_policy
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// True while a reply asked from `session_id` has not landed yet.
    pub fn awaiting_reply_in(&self, session_id: SessionId) -> bool {
        self.in_flight
            .values()
            .any(|target| target.session_id == session_id)
    }

    /// Applies reloaded configuration. In-flight replies keep their targets.
    pub fn apply_config(&mut self, config: &ChatConfig) {
        self.delivery_policy = config.delivery_policy;
        self.store
            .set_default_title(config.default_session_title.clone());
    }

    pub fn create_session(&mut self) -> SessionId {
        self.store.create_session()
    }

    pub fn select_session(&mut self, session_id: SessionId) -> Result<(), SelectRejection> {
        self.store.select_session(session_id)
    }

    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.composer.update_draft(text);
    }

    /// Sends the draft as a user message to the active session.
    ///
    /// Blank drafts change nothing and return `None`. Otherwise the draft is
    /// cleared, the composing flag is raised, and the returned request must
    /// be handed to a responder.
    pub fn submit(&mut self) -> Option<ReplyRequest> {
        let session_id = self.store.active_session_id();
        let prompt = self.composer.take_draft()?;

        if self
            .store
            .append_message(session_id, Author::User, prompt.clone())
            .is_none()
        {
            // Unreachable while the active pointer is valid; keep the draft rather than lose it.
            self.composer.update_draft(prompt);
            return None;
        }

        let target = ReplyTarget::new(session_id, self.tickets.allocate());
        self.in_flight.insert(target.ticket, target);
        self.composer.set_composing(true);
        tracing::debug!(ticket = %target.ticket, session = %session_id, "submitted prompt");

        Some(ReplyRequest { target, prompt })
    }

    /// Appends a landed reply and retires its ticket.
    pub fn deliver_reply(&mut self, reply: Reply) -> Result<MessageId, DeliveryRejection> {
        let received = reply.target;
        let Some(expected) = self.in_flight.get(&received.ticket).copied() else {
            return Err(DeliveryRejection::UnknownTicket(received.ticket));
        };
        if expected != received {
            return Err(DeliveryRejection::TargetMismatch { expected, received });
        }

        self.retire(received.ticket);

        let destination = match self.delivery_policy {
            DeliveryPolicy::OriginSession => expected.session_id,
            DeliveryPolicy::ActiveSession => self.store.active_session_id(),
        };

        self.store
            .append_message(destination, Author::Assistant, reply.content)
            .ok_or(DeliveryRejection::SessionMissing(destination))
    }

    /// Retires a ticket whose reply will never land (cancelled or failed).
    pub fn abandon_reply(&mut self, target: ReplyTarget) -> bool {
        match self.in_flight.get(&target.ticket) {
            Some(expected) if *expected == target => {
                self.retire(target.ticket);
                true
            }
            _ => false,
        }
    }

    fn retire(&mut self, ticket: ReplyTicket) {
        self.in_flight.remove(&ticket);
        self.composer.set_composing(!self.in_flight.is_empty());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::clock::{ManualClock, Timestamp};
    use crate::config::DEFAULT_CANNED_REPLY;
    use crate::message::Message;
    use crate::responder::{CannedResponder, ReplyHandle, Responder};
    use crate::store::SeedSession;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Timestamp::from_unix_millis(1_000)))
    }

    fn demo_state() -> ChatState {
        ChatState::new(&ChatConfig::default(), clock())
    }

    fn single_empty_session_state(policy: DeliveryPolicy) -> ChatState {
        let store = SessionStore::seeded(vec![SeedSession::new("New chat")], "New chat", clock());
        ChatState::with_store(store, policy)
    }

    fn contents(messages: &[Message]) -> Vec<(&str, bool)> {
        messages
            .iter()
            .map(|message| (message.content.as_str(), message.is_user()))
            .collect()
    }

    fn canned(target: ReplyTarget) -> Reply {
        Reply {
            target,
            content: DEFAULT_CANNED_REPLY.to_string(),
        }
    }

    #[test]
    fn blank_submit_leaves_messages_and_draft_alone() {
        let mut state = demo_state();
        let before = state.active_session().map(|session| session.messages().to_vec());

        state.update_draft("   \t");
        let request = state.submit();

        assert_eq!(request, None);
        assert_eq!(state.draft(), "   \t");
        assert!(!state.is_composing());
        assert_eq!(
            state.active_session().map(|session| session.messages().to_vec()),
            before
        );
    }

    #[test]
    fn submit_appends_user_message_and_raises_composing() {
        let mut state = demo_state();
        let before = state.active_session().map_or(0, |session| session.messages().len());

        state.update_draft("X");
        let request = state.submit().expect("non-blank draft submits");

        let session = state.active_session().expect("active session exists");
        assert_eq!(session.messages().len(), before + 1);
        let last = session.last_message().expect("message appended");
        assert_eq!(last.content, "X");
        assert!(last.is_user());
        assert_eq!(state.draft(), "");
        assert!(state.is_composing());
        assert!(state.composer().is_composing());
        assert!(!state.can_submit());
        assert_eq!(request.prompt, "X");
        assert_eq!(request.target.session_id, session.id());
    }

    #[test]
    fn end_to_end_single_exchange() {
        let mut state = single_empty_session_state(DeliveryPolicy::OriginSession);
        assert_eq!(state.active_session_id(), SessionId::new(1));

        state.update_draft("hi");
        let request = state.submit().expect("submit");
        assert_eq!(
            contents(state.active_session().expect("active").messages()),
            vec![("hi", true)]
        );
        assert!(state.is_composing());

        state
            .deliver_reply(canned(request.target))
            .expect("reply delivered");

        assert_eq!(
            contents(state.active_session().expect("active").messages()),
            vec![("hi", true), (DEFAULT_CANNED_REPLY, false)]
        );
        assert!(!state.is_composing());
    }

    #[test]
    fn origin_policy_delivers_to_the_sending_session() {
        let mut state = demo_state();
        let origin = state.active_session_id();
        state.update_draft("question");
        let request = state.submit().expect("submit");

        let elsewhere = state.create_session();
        state.deliver_reply(canned(request.target)).expect("delivered");

        let origin_session = state.store().session(origin).expect("origin exists");
        assert_eq!(
            origin_session.last_message().map(|message| message.author),
            Some(Author::Assistant)
        );
        assert!(state.store().session(elsewhere).expect("new session").is_empty());
        assert_eq!(state.active_session_id(), elsewhere);
    }

    #[test]
    fn active_policy_delivers_to_whatever_is_active_on_landing() {
        let mut state = single_empty_session_state(DeliveryPolicy::ActiveSession);
        let origin = state.active_session_id();
        state.update_draft("question");
        let request = state.submit().expect("submit");

        let elsewhere = state.create_session();
        state.deliver_reply(canned(request.target)).expect("delivered");

        let origin_messages = state.store().session(origin).expect("origin").messages();
        assert_eq!(contents(origin_messages), vec![("question", true)]);
        let landed = state.store().session(elsewhere).expect("elsewhere").messages();
        assert_eq!(contents(landed), vec![(DEFAULT_CANNED_REPLY, false)]);
    }

    #[test]
    fn composing_stays_raised_until_every_reply_lands() {
        let mut state = demo_state();

        state.update_draft("one");
        let first = state.submit().expect("first submit");
        state.update_draft("two");
        let second = state.submit().expect("second submit");
        assert_eq!(state.in_flight_count(), 2);

        state.deliver_reply(canned(first.target)).expect("first lands");
        assert!(state.is_composing());

        state.deliver_reply(canned(second.target)).expect("second lands");
        assert!(!state.is_composing());
    }

    #[test]
    fn replies_are_delivered_once() {
        let mut state = demo_state();
        state.update_draft("hello");
        let request = state.submit().expect("submit");

        state.deliver_reply(canned(request.target)).expect("first delivery");
        let again = state.deliver_reply(canned(request.target));

        assert_eq!(
            again,
            Err(DeliveryRejection::UnknownTicket(request.target.ticket))
        );
        let assistant_replies = state
            .active_session()
            .expect("active")
            .messages()
            .iter()
            .filter(|message| message.content == DEFAULT_CANNED_REPLY)
            .count();
        assert_eq!(assistant_replies, 1);
    }

    #[test]
    fn mismatched_target_is_rejected_without_retiring_ticket() {
        let mut state = demo_state();
        state.update_draft("hello");
        let request = state.submit().expect("submit");
        let forged = ReplyTarget::new(SessionId::new(3), request.target.ticket);

        let rejected = state.deliver_reply(canned(forged));

        assert!(matches!(
            rejected,
            Err(DeliveryRejection::TargetMismatch { .. })
        ));
        assert!(state.is_composing());
        assert!(state.awaiting_reply_in(request.target.session_id));
    }

    #[test]
    fn abandoning_a_reply_clears_composing_without_appending() {
        let mut state = demo_state();
        state.update_draft("hello");
        let request = state.submit().expect("submit");
        let before = state.active_session().expect("active").messages().len();

        assert!(state.abandon_reply(request.target));
        assert!(!state.abandon_reply(request.target));

        assert!(!state.is_composing());
        assert_eq!(state.active_session().expect("active").messages().len(), before);
    }

    #[test]
    fn selecting_unknown_session_is_ignored() {
        let mut state = demo_state();
        let active = state.active_session_id();

        assert!(state.select_session(SessionId::new(4_242)).is_err());
        assert_eq!(state.active_session_id(), active);
    }

    #[test]
    fn apply_config_switches_policy_and_new_session_title() {
        let mut state = demo_state();
        let config = ChatConfig {
            default_session_title: "Scratchpad".to_string(),
            delivery_policy: DeliveryPolicy::ActiveSession,
            ..ChatConfig::default()
        };

        state.apply_config(&config);
        let created = state.create_session();

        assert_eq!(state.delivery_policy(), DeliveryPolicy::ActiveSession);
        assert_eq!(state.store().default_title(), "Scratchpad");
        assert_eq!(
            state.store().session(created).map(Session::title),
            Some("Scratchpad")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_reply_round_trip_through_the_responder() {
        let mut state = single_empty_session_state(DeliveryPolicy::OriginSession);
        let responder = CannedResponder::from_config(&ChatConfig::default());

        state.update_draft("hi");
        let request = state.submit().expect("submit");
        let ReplyHandle { reply, worker } = responder.respond(request).expect("respond");
        tokio::spawn(worker);

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert!(state.is_composing());

        let reply = reply.wait().await.expect("reply lands");
        state.deliver_reply(reply).expect("delivered");

        assert!(!state.is_composing());
        assert_eq!(
            contents(state.active_session().expect("active").messages()),
            vec![("hi", true), (DEFAULT_CANNED_REPLY, false)]
        );
    }
}
