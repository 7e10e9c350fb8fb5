use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, Icon, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    list::ListItem,
    v_flex,
};
use parlor_session::{ChatState, SessionId};

use crate::chat::events::{NewSessionRequested, SessionSelected, SettingsRequested};

const SESSION_ROW_MIN_HEIGHT: f32 = 52.0;
const PREVIEW_MAX_CHARS: usize = 48;
const SESSION_ROW_GROUP: &str = "session-row";

/// Render snapshot of one session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRow {
    pub session_id: SessionId,
    pub title: SharedString,
    pub preview: Option<SharedString>,
    pub active: bool,
    pub awaiting_reply: bool,
}

/// Builds sidebar rows in collection order (newest session first).
pub fn session_rows(state: &ChatState) -> Vec<SessionRow> {
    let active_session_id = state.active_session_id();

    state
        .sessions()
        .iter()
        .map(|session| SessionRow {
            session_id: session.id(),
            title: SharedString::from(session.title().to_string()),
            preview: session
                .last_message()
                .map(|message| SharedString::from(preview_text(&message.content))),
            active: session.id() == active_session_id,
            awaiting_reply: state.awaiting_reply_in(session.id()),
        })
        .collect()
}

/// Uppercased first letter of the title, shown in the row's leading badge.
fn title_initial(title: &str) -> SharedString {
    title
        .trim()
        .chars()
        .next()
        .map(|initial| SharedString::from(initial.to_uppercase().to_string()))
        .unwrap_or_else(|| SharedString::from("#"))
}

/// First line of `content`, cut to a fixed number of characters.
fn preview_text(content: &str) -> String {
    let first_line = content.trim().lines().next().unwrap_or_default();
    let mut chars = first_line.chars();
    let mut preview: String = chars.by_ref().take(PREVIEW_MAX_CHARS).collect();
    if chars.next().is_some() {
        preview.push('…');
    }
    preview
}

pub struct ChatSidebar {
    rows: Vec<SessionRow>,
}

impl EventEmitter<SessionSelected> for ChatSidebar {}
impl EventEmitter<NewSessionRequested> for ChatSidebar {}
impl EventEmitter<SettingsRequested> for ChatSidebar {}

impl ChatSidebar {
    pub fn new(_cx: &mut Context<Self>) -> Self {
        Self { rows: Vec::new() }
    }

    pub fn set_rows(&mut self, rows: Vec<SessionRow>, cx: &mut Context<Self>) {
        if self.rows != rows {
            self.rows = rows;
            cx.notify();
        }
    }

    fn render_toolbar(&mut self, cx: &mut Context<Self>) -> impl IntoElement {
        h_flex().w_full().px_3().pt(px(8.)).pb_2().child(
            Button::new("new-chat")
                .w_full()
                .small()
                .primary()
                .icon(IconName::Plus)
                .child("New chat")
                .on_click(cx.listener(|_, _, _window, cx| {
                    cx.emit(NewSessionRequested);
                })),
        )
    }

    fn render_row(&self, index: usize, row: &SessionRow, cx: &mut Context<Self>) -> AnyElement {
        let theme = cx.theme();
        let session_id = row.session_id;

        div()
            .w_full()
            .px_2()
            .group(SESSION_ROW_GROUP)
            .child(
                ListItem::new(("session", index))
                    .w_full()
                    .min_h(px(SESSION_ROW_MIN_HEIGHT))
                    .px_3()
                    .py_2()
                    .rounded_md()
                    .selected(row.active)
                    .on_click(cx.listener(move |this, _event: &ClickEvent, _window, cx| {
                        this.select(session_id, cx);
                    }))
                    .child(
                        h_flex()
                            .w_full()
                            .gap_2()
                            .items_center()
                            .child(
                                div()
                                    .size(px(28.))
                                    .flex_shrink_0()
                                    .rounded_md()
                                    .bg(theme.muted)
                                    .text_color(theme.muted_foreground)
                                    .text_xs()
                                    .font_weight(FontWeight::SEMIBOLD)
                                    .flex()
                                    .items_center()
                                    .justify_center()
                                    .child(title_initial(&row.title)),
                            )
                            .child(
                                v_flex()
                                    .flex_1()
                                    .min_w_0()
                                    .gap_0p5()
                                    .child(
                                        div()
                                            .truncate()
                                            .child(Label::new(row.title.clone()).text_sm()),
                                    )
                                    .when_some(row.preview.clone(), |column, preview| {
                                        column.child(
                                            div().truncate().child(
                                                Label::new(preview)
                                                    .text_xs()
                                                    .text_color(theme.muted_foreground),
                                            ),
                                        )
                                    }),
                            )
                            .when(row.awaiting_reply, |row_content| {
                                row_content.child(
                                    div().size(px(6.)).rounded_full().bg(theme.primary),
                                )
                            })
                            .child(
                                // Row actions only show while the row is hovered.
                                h_flex()
                                    .gap_0p5()
                                    .invisible()
                                    .group_hover(SESSION_ROW_GROUP, |style| style.visible())
                                    .child(
                                        Button::new(("session-edit", index))
                                            .ghost()
                                            .xsmall()
                                            .icon(IconName::Ellipsis)
                                            .tooltip("Rename")
                                            .on_click(|_, _, cx| cx.stop_propagation()),
                                    )
                                    .child(
                                        Button::new(("session-delete", index))
                                            .ghost()
                                            .xsmall()
                                            .icon(IconName::Delete)
                                            .tooltip("Delete")
                                            .on_click(|_, _, cx| cx.stop_propagation()),
                                    ),
                            ),
                    ),
            )
            .into_any_element()
    }

    fn render_session_list(&mut self, cx: &mut Context<Self>) -> AnyElement {
        if self.rows.is_empty() {
            return v_flex()
                .flex_1()
                .items_center()
                .justify_center()
                .child(
                    Label::new("No chats yet")
                        .text_sm()
                        .text_color(cx.theme().muted_foreground),
                )
                .into_any_element();
        }

        let rows = self.rows.clone();
        v_flex()
            .id("session-list")
            .flex_1()
            .min_h_0()
            .gap_1()
            .overflow_y_scroll()
            .children(
                rows.iter()
                    .enumerate()
                    .map(|(index, row)| self.render_row(index, row, cx)),
            )
            .into_any_element()
    }

    fn render_footer(&mut self, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        h_flex()
            .w_full()
            .items_center()
            .justify_between()
            .px_3()
            .py_2()
            .border_t_1()
            .border_color(theme.border)
            .child(
                h_flex()
                    .gap_2()
                    .items_center()
                    .child(
                        div()
                            .id("sidebar-user-avatar")
                            .size(px(32.))
                            .rounded_full()
                            .border_1()
                            .border_color(theme.border)
                            .bg(theme.muted)
                            .flex()
                            .items_center()
                            .justify_center()
                            .child(
                                Icon::new(IconName::CircleUser)
                                    .size(px(18.))
                                    .text_color(theme.foreground),
                            ),
                    )
                    .child(Label::new("You").text_sm()),
            )
            .child(
                Button::new("sidebar-settings")
                    .ghost()
                    .small()
                    .icon(IconName::Settings)
                    .on_click(cx.listener(|_, _, _, cx| {
                        cx.emit(SettingsRequested);
                    })),
            )
    }

    fn select(&mut self, session_id: SessionId, cx: &mut Context<Self>) {
        cx.emit(SessionSelected { session_id });
    }
}

impl Render for ChatSidebar {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .size_full()
            .min_w_0()
            .overflow_hidden()
            .bg(theme.background)
            .child(self.render_toolbar(cx))
            .child(self.render_session_list(cx))
            .child(self.render_footer(cx))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parlor_session::{ChatConfig, ManualClock, Timestamp};

    use super::*;

    fn demo_state() -> ChatState {
        ChatState::new(
            &ChatConfig::default(),
            Arc::new(ManualClock::new(Timestamp::from_unix_millis(1_000))),
        )
    }

    #[test]
    fn rows_follow_collection_order_and_mark_active() {
        let state = demo_state();

        let rows = session_rows(&state);

        let titles: Vec<&str> = rows.iter().map(|row| row.title.as_ref()).collect();
        assert_eq!(
            titles,
            vec!["New chat", "Website development", "Learning React"]
        );
        assert_eq!(
            rows.iter().filter(|row| row.active).count(),
            1,
            "exactly one row is highlighted"
        );
        assert!(rows[0].active);
        assert_eq!(
            rows[1].preview.as_ref().map(|preview| preview.as_ref()),
            Some("Help me build a website")
        );
    }

    #[test]
    fn new_session_row_is_first_active_and_has_no_preview() {
        let mut state = demo_state();

        let created = state.create_session();
        let rows = session_rows(&state);

        assert_eq!(rows[0].session_id, created);
        assert!(rows[0].active);
        assert_eq!(rows[0].preview, None);
        assert!(rows[1..].iter().all(|row| !row.active));
    }

    #[test]
    fn awaiting_reply_marks_origin_row() {
        let mut state = demo_state();
        let origin = state.active_session_id();
        state.update_draft("hello");
        let request = state.submit();
        assert!(request.is_some());
        state.create_session();

        let rows = session_rows(&state);

        let origin_row = rows
            .iter()
            .find(|row| row.session_id == origin)
            .expect("origin row present");
        assert!(origin_row.awaiting_reply);
        assert!(!rows[0].awaiting_reply);
    }

    #[test]
    fn title_initial_is_uppercased_first_letter() {
        assert_eq!(title_initial("learning React").as_ref(), "L");
        assert_eq!(title_initial("  website").as_ref(), "W");
        assert_eq!(title_initial("").as_ref(), "#");
    }

    #[test]
    fn preview_uses_first_line_and_truncates() {
        assert_eq!(preview_text("  short  "), "short");
        assert_eq!(preview_text("first line\nsecond line"), "first line");

        let long = "x".repeat(PREVIEW_MAX_CHARS + 10);
        let preview = preview_text(&long);
        assert_eq!(preview.chars().count(), PREVIEW_MAX_CHARS + 1);
        assert!(preview.ends_with('…'));
    }
}
