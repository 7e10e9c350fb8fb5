use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputEvent, InputState},
    v_flex,
};

use crate::chat::events::{DraftChanged, SubmitRequested};

/// Text entry plus send button. Holds no chat state of its own: every edit is
/// forwarded as [`DraftChanged`] and the parent decides whether a submit is
/// allowed.
pub struct ComposerInput {
    input_state: Entity<InputState>,
    can_submit: bool,
    // Shift+Enter inserts the newline itself and the input still reports
    // PressEnter afterwards; that one must not submit.
    swallow_next_enter: bool,
}

impl EventEmitter<DraftChanged> for ComposerInput {}
impl EventEmitter<SubmitRequested> for ComposerInput {}

impl ComposerInput {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let input_state = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder("Type a message...")
                .auto_grow(1, 8)
        });

        cx.subscribe_in(
            &input_state,
            window,
            |this, state, event: &InputEvent, window, cx| match event {
                InputEvent::Change => {
                    let text = state.read(cx).value().to_string();
                    cx.emit(DraftChanged { text });
                }
                InputEvent::PressEnter { secondary } => {
                    if *secondary || this.swallow_next_enter {
                        this.swallow_next_enter = false;
                        return;
                    }
                    this.strip_enter_newline(window, cx);
                    this.submit(cx);
                }
                _ => {}
            },
        )
        .detach();

        Self {
            input_state,
            can_submit: false,
            swallow_next_enter: false,
        }
    }

    /// Mirrors the draft's submittable state onto the send button.
    pub fn set_can_submit(&mut self, can_submit: bool, cx: &mut Context<Self>) {
        if self.can_submit != can_submit {
            self.can_submit = can_submit;
            cx.notify();
        }
    }

    pub fn clear(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            state.set_value("", window, cx);
        });
        self.swallow_next_enter = false;
    }

    pub fn focus(&self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| state.focus(window, cx));
    }

    fn insert_newline(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.swallow_next_enter = true;
        self.input_state.update(cx, |state, cx| {
            state.insert("\n", window, cx);
        });
    }

    fn strip_enter_newline(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.input_state.update(cx, |state, cx| {
            let value = state.value().to_string();
            if let Some(stripped) = value.strip_suffix('\n') {
                state.set_value(stripped.to_string(), window, cx);
            }
        });
    }

    fn submit(&mut self, cx: &mut Context<Self>) {
        let text = self.input_state.read(cx).value().to_string();
        cx.emit(DraftChanged { text });
        cx.emit(SubmitRequested);
    }
}

impl Render for ComposerInput {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex().bg(theme.background).p_3().child(
            h_flex()
                .w_full()
                .items_end()
                .gap_2()
                .px_3()
                .py_2()
                .rounded_lg()
                .border_1()
                .border_color(theme.border)
                .bg(theme.background)
                .on_key_down(cx.listener(|this, event: &KeyDownEvent, window, cx| {
                    if event.keystroke.key == "enter" && event.keystroke.modifiers.shift {
                        this.insert_newline(window, cx);
                    }
                }))
                .child(div().flex_1().min_w_0().child(Input::new(&self.input_state).w_full()))
                .child(
                    Button::new("composer-send")
                        .small()
                        .primary()
                        .icon(IconName::ArrowUp)
                        .disabled(!self.can_submit)
                        .on_click(cx.listener(|this, _, _window, cx| {
                            this.submit(cx);
                        })),
                ),
        )
    }
}
