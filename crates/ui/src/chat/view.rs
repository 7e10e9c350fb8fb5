use std::collections::HashMap;
use std::sync::Arc;

use gpui::*;
use gpui_component::{ActiveTheme, Root, v_flex};
use gpui_tokio_bridge::Tokio;
use parlor_session::{
    CannedResponder, ChatConfig, ChatState, Reply, ReplyRequest, ReplyTarget, ReplyTicket,
    Responder, ResponderResult, SessionId, SystemClock,
};

use crate::chat::events::{
    DraftChanged, NewSessionRequested, SessionSelected, SettingsRequested, SubmitRequested,
};
use crate::chat::sidebar::session_rows;
use crate::chat::{ChatSidebar, ComposerInput, MessageFeed};
use crate::settings::{SettingsChanged, SettingsState, SettingsView};

/// The two halves of one in-flight reply: the tokio worker producing it and
/// the foreground task waiting to apply it.
struct ReplyTasks {
    _worker: Task<Result<(), gpui_tokio_bridge::JoinError>>,
    reader: Task<()>,
}

/// Owns [`ChatState`] and keeps the sidebar, feed and composer in sync with it.
pub struct ChatView {
    state: ChatState,
    responder: Arc<dyn Responder>,
    sidebar: Entity<ChatSidebar>,
    feed: Entity<MessageFeed>,
    composer: Entity<ComposerInput>,
    settings_state: Entity<SettingsState>,
    settings_window: Option<WindowHandle<Root>>,
    reply_tasks: HashMap<ReplyTicket, ReplyTasks>,
}

impl ChatView {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let settings_state = SettingsState::new(cx);
        let settings = settings_state.read(cx).settings();

        let sidebar = cx.new(ChatSidebar::new);
        let feed = cx.new(MessageFeed::new);
        let composer = cx.new(|cx| ComposerInput::new(window, cx));

        cx.subscribe(&sidebar, |this, _, event: &SessionSelected, cx| {
            this.select_session(event.session_id, cx);
        })
        .detach();

        cx.subscribe_in(&sidebar, window, |this, _, _: &NewSessionRequested, window, cx| {
            this.create_session(window, cx);
        })
        .detach();

        cx.subscribe(&sidebar, |this, _, _: &SettingsRequested, cx| {
            this.open_settings(cx);
        })
        .detach();

        cx.subscribe(&composer, |this, _, event: &DraftChanged, cx| {
            this.update_draft(&event.text, cx);
        })
        .detach();

        cx.subscribe_in(&composer, window, |this, _, _: &SubmitRequested, window, cx| {
            this.submit(window, cx);
        })
        .detach();

        cx.subscribe(&settings_state, |this, _, event: &SettingsChanged, cx| {
            this.handle_settings_changed(event, cx);
        })
        .detach();

        let mut this = Self {
            state: ChatState::new(&settings.chat, Arc::new(SystemClock)),
            responder: Self::responder_for(&settings.chat),
            sidebar,
            feed,
            composer,
            settings_state,
            settings_window: None,
            reply_tasks: HashMap::new(),
        };
        this.sync_all(cx);
        this
    }

    fn responder_for(config: &ChatConfig) -> Arc<dyn Responder> {
        Arc::new(CannedResponder::from_config(config))
    }

    pub fn sidebar(&self) -> &Entity<ChatSidebar> {
        &self.sidebar
    }

    pub fn active_title(&self) -> SharedString {
        self.state
            .active_session()
            .map(|session| SharedString::from(session.title().to_string()))
            .unwrap_or_default()
    }

    pub fn create_session(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let session_id = self.state.create_session();
        tracing::debug!(session = %session_id, "created session");
        self.sync_all(cx);
        self.composer
            .update(cx, |composer, cx| composer.focus(window, cx));
    }

    pub fn open_settings_panel(&mut self, cx: &mut Context<Self>) {
        self.open_settings(cx);
    }

    fn select_session(&mut self, session_id: SessionId, cx: &mut Context<Self>) {
        if let Err(rejection) = self.state.select_session(session_id) {
            tracing::warn!("ignored session selection: {rejection:?}");
            return;
        }
        self.sync_all(cx);
    }

    fn update_draft(&mut self, text: &str, cx: &mut Context<Self>) {
        if self.state.draft() == text {
            return;
        }
        self.state.update_draft(text);
        let can_submit = self.state.can_submit();
        self.composer
            .update(cx, |composer, cx| composer.set_can_submit(can_submit, cx));
    }

    fn submit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let Some(request) = self.state.submit() else {
            return;
        };

        self.composer
            .update(cx, |composer, cx| composer.clear(window, cx));
        self.dispatch_reply(request, cx);
        self.sync_all(cx);
    }

    fn dispatch_reply(&mut self, request: ReplyRequest, cx: &mut Context<Self>) {
        let target = request.target;

        let handle = match self.responder.respond(request) {
            Ok(handle) => handle,
            Err(error) => {
                tracing::warn!("responder `{}` refused prompt: {error}", self.responder.id());
                self.state.abandon_reply(target);
                return;
            }
        };

        let worker = Tokio::spawn(cx, handle.worker);
        let pending = handle.reply;
        let reader = cx.spawn(async move |this, cx| {
            let outcome = pending.wait().await;
            let _ = this.update(cx, |this, cx| {
                this.finish_reply(target, outcome, cx);
            });
        });

        self.reply_tasks.insert(
            target.ticket,
            ReplyTasks {
                _worker: worker,
                reader,
            },
        );
    }

    fn finish_reply(
        &mut self,
        target: ReplyTarget,
        outcome: ResponderResult<Reply>,
        cx: &mut Context<Self>,
    ) {
        // This runs inside the reader task, so let it finish on its own.
        if let Some(tasks) = self.reply_tasks.remove(&target.ticket) {
            tasks.reader.detach();
        }

        match outcome {
            Ok(reply) => match self.state.deliver_reply(reply) {
                Ok(message_id) => {
                    tracing::debug!(
                        ticket = %target.ticket,
                        message = %message_id,
                        "reply delivered"
                    );
                }
                Err(rejection) => {
                    tracing::warn!(ticket = %target.ticket, "dropped reply: {rejection:?}");
                }
            },
            Err(error) => {
                tracing::warn!("reply {} did not arrive: {error}", target.ticket);
                self.state.abandon_reply(target);
            }
        }

        self.sync_all(cx);
    }

    fn handle_settings_changed(&mut self, event: &SettingsChanged, cx: &mut Context<Self>) {
        event.settings.apply_theme(None, cx);
        cx.refresh_windows();

        // Replies already in flight keep the delay and text they started with.
        self.responder = Self::responder_for(&event.settings.chat);
        self.state.apply_config(&event.settings.chat);
        tracing::info!("applied updated chat settings");
        self.sync_all(cx);
    }

    fn open_settings(&mut self, cx: &mut Context<Self>) {
        if let Some(settings_window) = self.settings_window.as_ref()
            && settings_window
                .update(cx, |_, window, _| {
                    window.activate_window();
                })
                .is_ok()
        {
            return;
        }

        self.settings_window = None;

        let settings_state = self.settings_state.clone();
        let settings_bounds = Bounds::centered(None, size(px(560.), px(680.)), cx);
        let settings_window = cx.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(settings_bounds)),
                titlebar: Some(TitlebarOptions {
                    title: Some("Parlor Settings".into()),
                    appears_transparent: true,
                    traffic_light_position: Some(point(px(14.), px(14.))),
                    ..Default::default()
                }),
                ..Default::default()
            },
            move |window, cx| {
                let settings_view = cx.new(|cx| SettingsView::new(&settings_state, window, cx));
                cx.new(|cx| Root::new(settings_view, window, cx))
            },
        );

        match settings_window {
            Ok(settings_window) => {
                self.settings_window = Some(settings_window);
            }
            Err(error) => {
                tracing::error!("failed to open settings window: {}", error);
            }
        }
    }

    /// Pushes fresh snapshots of [`ChatState`] into every region.
    fn sync_all(&mut self, cx: &mut Context<Self>) {
        let rows = session_rows(&self.state);
        self.sidebar
            .update(cx, |sidebar, cx| sidebar.set_rows(rows, cx));

        if let Some(session) = self.state.active_session() {
            let session_id = session.id();
            let messages = session.messages().to_vec();
            let composing = self.state.is_composing();
            self.feed.update(cx, |feed, cx| {
                feed.set_snapshot(session_id, messages, composing, cx);
            });
        }

        let can_submit = self.state.can_submit();
        self.composer
            .update(cx, |composer, cx| composer.set_can_submit(can_submit, cx));
        cx.notify();
    }
}

impl Render for ChatView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .id("chat-view")
            .relative()
            .size_full()
            .min_h_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(
                div()
                    .id("chat-view-feed")
                    .flex_1()
                    .min_h_0()
                    .child(self.feed.clone()),
            )
            .child(
                div()
                    .id("chat-view-composer")
                    .flex_shrink_0()
                    .w_full()
                    .border_t_1()
                    .border_color(theme.border)
                    .child(self.composer.clone()),
            )
    }
}
