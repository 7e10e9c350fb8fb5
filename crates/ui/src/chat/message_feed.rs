use std::f32::consts::PI;
use std::time::Duration;

use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{ActiveTheme, Icon, IconName, h_flex, label::Label, v_flex};
use parlor_session::{Author, Message, SessionId};

use crate::chat::scroll_manager::ScrollManager;

const FEED_MAX_WIDTH: Pixels = px(760.);
const USER_BUBBLE_MAX_WIDTH: Pixels = px(540.);
const ASSISTANT_BUBBLE_MAX_WIDTH: Pixels = px(600.);
const AVATAR_SIZE: Pixels = px(28.);
const TYPING_DOT_COUNT: usize = 3;
const TYPING_CYCLE: Duration = Duration::from_millis(1_200);

/// Opacity of one typing dot at `progress` through the cycle. Dots are
/// phase-shifted so the pulse travels left to right.
fn typing_dot_opacity(dot_index: usize, progress: f32) -> f32 {
    let phase = (progress - dot_index as f32 / TYPING_DOT_COUNT as f32).rem_euclid(1.0);
    (0.25 + 0.75 * (phase * PI).sin()).clamp(0.25, 1.0)
}

/// User avatars sit after their bubble at the right edge; assistant avatars
/// lead at the left.
fn avatar_trails_bubble(author: Author) -> bool {
    matches!(author, Author::User)
}

/// Renders the active session's history plus the typing indicator.
pub struct MessageFeed {
    session_id: Option<SessionId>,
    messages: Vec<Message>,
    composing: bool,
    scroll_manager: ScrollManager,
}

impl MessageFeed {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self {
            session_id: None,
            messages: Vec::new(),
            composing: false,
            scroll_manager: ScrollManager::new(),
        }
    }

    pub fn set_snapshot(
        &mut self,
        session_id: SessionId,
        messages: Vec<Message>,
        composing: bool,
        cx: &mut Context<Self>,
    ) {
        let switched = self.session_id != Some(session_id);
        let grew = messages.len() > self.messages.len() || (composing && !self.composing);
        if !switched && !grew && self.messages == messages && self.composing == composing {
            return;
        }

        if switched {
            self.scroll_manager.reset();
        } else if grew {
            self.scroll_manager.request_scroll_to_bottom_if_following();
        }

        self.session_id = Some(session_id);
        self.messages = messages;
        self.composing = composing;
        cx.notify();
    }

    fn render_avatar(&self, author: Author, cx: &App) -> Div {
        let theme = cx.theme();
        let avatar = div()
            .size(AVATAR_SIZE)
            .flex_shrink_0()
            .rounded_full()
            .flex()
            .items_center()
            .justify_center();

        match author {
            Author::User => avatar
                .border_1()
                .border_color(theme.border)
                .bg(theme.muted)
                .child(
                    Icon::new(IconName::CircleUser)
                        .size(px(16.))
                        .text_color(theme.foreground),
                ),
            Author::Assistant => avatar
                .bg(theme.primary)
                .text_color(theme.primary_foreground)
                .text_xs()
                .font_weight(FontWeight::SEMIBOLD)
                .child("AI"),
        }
    }

    fn render_message(&self, message: &Message, cx: &App) -> AnyElement {
        let theme = cx.theme();
        let content = SharedString::from(message.content.clone());

        if avatar_trails_bubble(message.author) {
            return h_flex()
                .w_full()
                .items_start()
                .justify_end()
                .gap_3()
                .child(
                    div()
                        .max_w(USER_BUBBLE_MAX_WIDTH)
                        .px(px(14.))
                        .py(px(10.))
                        .rounded_lg()
                        .bg(theme.accent)
                        .text_color(theme.accent_foreground)
                        .text_sm()
                        .child(content),
                )
                .child(self.render_avatar(message.author, cx))
                .into_any_element();
        }

        h_flex()
            .w_full()
            .items_start()
            .gap_3()
            .child(self.render_avatar(message.author, cx))
            .child(
                div()
                    .max_w(ASSISTANT_BUBBLE_MAX_WIDTH)
                    .px(px(14.))
                    .py(px(10.))
                    .rounded_lg()
                    .bg(theme.muted)
                    .text_color(theme.foreground)
                    .text_sm()
                    .child(content),
            )
            .into_any_element()
    }

    fn render_typing_indicator(&self, cx: &App) -> AnyElement {
        let theme = cx.theme();
        let dot_color = theme.muted_foreground;

        h_flex()
            .id("typing-indicator")
            .w_full()
            .items_center()
            .gap_3()
            .child(self.render_avatar(Author::Assistant, cx))
            .child(
                h_flex()
                    .px(px(14.))
                    .py(px(12.))
                    .gap_1()
                    .rounded_lg()
                    .bg(theme.muted)
                    .children((0..TYPING_DOT_COUNT).map(move |dot_index| {
                        div()
                            .size(px(7.))
                            .rounded_full()
                            .bg(dot_color)
                            .with_animation(
                                ("typing-dot", dot_index),
                                Animation::new(TYPING_CYCLE).repeat(),
                                move |dot, progress| {
                                    dot.opacity(typing_dot_opacity(dot_index, progress))
                                },
                            )
                    })),
            )
            .into_any_element()
    }

    fn render_empty_state(&self, cx: &App) -> AnyElement {
        v_flex()
            .size_full()
            .items_center()
            .justify_center()
            .gap_2()
            .child(Label::new("How can I help you today?").text_lg())
            .child(
                Label::new("Type a message below to start the conversation.")
                    .text_sm()
                    .text_color(cx.theme().muted_foreground),
            )
            .into_any_element()
    }
}

impl Render for MessageFeed {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if self.messages.is_empty() && !self.composing {
            return self.render_empty_state(cx);
        }

        self.scroll_manager.prepare_frame();
        let rows: Vec<AnyElement> = self
            .messages
            .iter()
            .map(|message| self.render_message(message, cx))
            .collect();

        div()
            .id("message-feed")
            .size_full()
            .min_h_0()
            .overflow_y_scroll()
            .track_scroll(self.scroll_manager.handle())
            .child(
                v_flex()
                    .w_full()
                    .max_w(FEED_MAX_WIDTH)
                    .mx_auto()
                    .px_4()
                    .py_4()
                    .gap_4()
                    .children(rows)
                    .when(self.composing, |feed| {
                        feed.child(self.render_typing_indicator(cx))
                    }),
            )
            .into_any_element()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_dots_stay_visible_and_bounded() {
        for dot_index in 0..TYPING_DOT_COUNT {
            for step in 0..=20 {
                let opacity = typing_dot_opacity(dot_index, step as f32 / 20.0);
                assert!((0.25..=1.0).contains(&opacity), "opacity {opacity} out of range");
            }
        }
    }

    #[test]
    fn user_avatar_trails_and_assistant_avatar_leads() {
        assert!(avatar_trails_bubble(Author::User));
        assert!(!avatar_trails_bubble(Author::Assistant));
    }

    #[test]
    fn typing_dots_are_out_of_phase() {
        let first = typing_dot_opacity(0, 0.5);
        let second = typing_dot_opacity(1, 0.5);

        assert!((first - second).abs() > 0.1);
    }
}
