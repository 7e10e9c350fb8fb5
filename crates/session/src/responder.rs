use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use snafu::Snafu;
use tokio::sync::oneshot;

use crate::config::ChatConfig;
use crate::ids::{ReplyTicket, SessionId};

pub const CANNED_RESPONDER_ID: &str = "canned";

/// Routing key for one in-flight reply: the session it was asked from and
/// the ticket that distinguishes it from every other reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyTarget {
    pub session_id: SessionId,
    pub ticket: ReplyTicket,
}

impl ReplyTarget {
    pub const fn new(session_id: SessionId, ticket: ReplyTicket) -> Self {
        Self { session_id, ticket }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRequest {
    pub target: ReplyTarget,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub target: ReplyTarget,
    pub content: String,
}

pub type ResponderWorker = BoxFuture<'static, ()>;
pub type ResponderResult<T> = Result<T, ResponderError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ResponderError {
    #[snafu(display("reply {} was cancelled before it landed", target.ticket))]
    Cancelled {
        stage: &'static str,
        target: ReplyTarget,
    },
    #[snafu(display("reply worker for {} exited without a result", target.ticket))]
    WorkerGone {
        stage: &'static str,
        target: ReplyTarget,
    },
    #[snafu(display("reply request {} has an empty prompt", target.ticket))]
    EmptyPrompt {
        stage: &'static str,
        target: ReplyTarget,
    },
}

/// Receiving half of a reply. Await it with [`PendingReply::wait`];
/// cancelling or dropping it aborts the worker.
pub struct PendingReply {
    target: ReplyTarget,
    reply_rx: oneshot::Receiver<ResponderResult<Reply>>,
    cancel_tx: Option<oneshot::Sender<()>>,
}

impl PendingReply {
    pub(crate) fn new(
        target: ReplyTarget,
        reply_rx: oneshot::Receiver<ResponderResult<Reply>>,
        cancel_tx: oneshot::Sender<()>,
    ) -> Self {
        Self {
            target,
            reply_rx,
            cancel_tx: Some(cancel_tx),
        }
    }

    pub fn target(&self) -> ReplyTarget {
        self.target
    }

    /// Signals the worker to stop. Returns false if it was already signalled
    /// or has finished.
    pub fn cancel(&mut self) -> bool {
        self.cancel_tx
            .take()
            .map(|tx| tx.send(()).is_ok())
            .unwrap_or(false)
    }

    pub async fn wait(mut self) -> ResponderResult<Reply> {
        let outcome = (&mut self.reply_rx).await;
        // The worker is done either way; nothing left to cancel.
        self.cancel_tx = None;

        match outcome {
            Ok(result) => result,
            Err(_) => WorkerGoneSnafu {
                stage: "pending-reply-wait",
                target: self.target,
            }
            .fail(),
        }
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        if let Some(cancel_tx) = self.cancel_tx.take() {
            let _ = cancel_tx.send(());
        }
    }
}

/// A reply in two halves: the caller spawns `worker` on tokio and awaits `reply`.
pub struct ReplyHandle {
    pub reply: PendingReply,
    pub worker: ResponderWorker,
}

/// Produces assistant replies for submitted prompts.
pub trait Responder: Send + Sync {
    fn id(&self) -> &str;
    fn respond(&self, request: ReplyRequest) -> ResponderResult<ReplyHandle>;
}

/// Answers every prompt with the same text after a fixed delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedResponder {
    delay: Duration,
    reply_text: String,
}

impl CannedResponder {
    pub fn new(delay: Duration, reply_text: impl Into<String>) -> Self {
        Self {
            delay,
            reply_text: reply_text.into(),
        }
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(config.response_delay(), config.canned_reply.clone())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn reply_text(&self) -> &str {
        &self.reply_text
    }
}

impl Responder for CannedResponder {
    fn id(&self) -> &str {
        CANNED_RESPONDER_ID
    }

    fn respond(&self, request: ReplyRequest) -> ResponderResult<ReplyHandle> {
        let target = request.target;
        if request.prompt.trim().is_empty() {
            return EmptyPromptSnafu {
                stage: "canned-respond",
                target,
            }
            .fail();
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        let delay = self.delay;
        let content = self.reply_text.clone();

        let worker = async move {
            let outcome = tokio::select! {
                _ = tokio::time::sleep(delay) => Ok(Reply { target, content }),
                // A dropped sender counts as cancellation too.
                _ = &mut cancel_rx => CancelledSnafu {
                    stage: "canned-reply-delay",
                    target,
                }
                .fail(),
            };

            if reply_tx.send(outcome).is_err() {
                tracing::debug!(ticket = %target.ticket, "reply receiver dropped before delivery");
            }
        }
        .boxed();

        tracing::debug!(
            ticket = %target.ticket,
            session = %target.session_id,
            delay_ms = delay.as_millis() as u64,
            "scheduled canned reply"
        );

        Ok(ReplyHandle {
            reply: PendingReply::new(target, reply_rx, cancel_tx),
            worker,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str) -> ReplyRequest {
        ReplyRequest {
            target: ReplyTarget::new(SessionId::new(1), ReplyTicket::new(1)),
            prompt: prompt.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn canned_reply_lands_after_the_configured_delay() {
        let responder = CannedResponder::from_config(&ChatConfig::default());
        let ReplyHandle { reply, worker } = responder.respond(request("hi")).expect("respond");
        let worker = tokio::spawn(worker);
        let started = tokio::time::Instant::now();

        let reply = reply.wait().await.expect("reply arrives");

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(1_500));
        assert!(elapsed < Duration::from_millis(1_510));
        assert_eq!(reply.content, crate::config::DEFAULT_CANNED_REPLY);
        assert_eq!(reply.target.session_id, SessionId::new(1));
        worker.await.expect("worker joins");
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_lands_before_the_delay() {
        let responder = CannedResponder::new(Duration::from_millis(1_500), "later");
        let ReplyHandle { reply, worker } = responder.respond(request("hi")).expect("respond");
        tokio::spawn(worker);

        let early = tokio::time::timeout(Duration::from_millis(1_499), reply.wait()).await;

        assert!(early.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_resolves_with_cancelled_error() {
        let responder = CannedResponder::new(Duration::from_secs(5), "never");
        let ReplyHandle { mut reply, worker } =
            responder.respond(request("hi")).expect("respond");
        let worker = tokio::spawn(worker);
        assert_eq!(reply.target(), request("hi").target);

        assert!(reply.cancel());
        assert!(!reply.cancel());

        let outcome = reply.wait().await;
        assert!(matches!(outcome, Err(ResponderError::Cancelled { .. })));
        worker.await.expect("worker joins");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_pending_reply_stops_the_worker_early() {
        let responder = CannedResponder::new(Duration::from_secs(60), "never");
        let ReplyHandle { reply, worker } = responder.respond(request("hi")).expect("respond");
        let worker = tokio::spawn(worker);
        let started = tokio::time::Instant::now();

        drop(reply);
        worker.await.expect("worker joins");

        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn dropped_worker_reports_worker_gone() {
        let responder = CannedResponder::new(Duration::from_millis(10), "unused");
        let ReplyHandle { reply, worker } = responder.respond(request("hi")).expect("respond");
        drop(worker);

        let outcome = reply.wait().await;

        assert!(matches!(outcome, Err(ResponderError::WorkerGone { .. })));
    }

    #[test]
    fn from_config_takes_delay_and_text_from_settings() {
        let config = ChatConfig {
            response_delay_ms: 250,
            canned_reply: "Custom answer".to_string(),
            ..ChatConfig::default()
        };

        let responder = CannedResponder::from_config(&config);

        assert_eq!(responder.delay(), Duration::from_millis(250));
        assert_eq!(responder.reply_text(), "Custom answer");
        assert_eq!(responder.id(), CANNED_RESPONDER_ID);
    }

    #[test]
    fn blank_prompt_is_refused() {
        let responder = CannedResponder::from_config(&ChatConfig::default());

        let refused = responder.respond(request("   "));

        assert!(matches!(refused, Err(ResponderError::EmptyPrompt { .. })));
    }
}
