use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IndexPath, Sizable, ThemeMode, ThemeRegistry,
    button::{Button, ButtonVariants},
    h_flex,
    input::{Input, InputState},
    select::{Select, SelectState},
    v_flex,
};
use parlor_session::{ChatConfig, DeliveryPolicy};

use crate::settings::state::{AppSettings, SettingsState};

pub struct SettingsView {
    state: Entity<SettingsState>,
    delay_input: Entity<InputState>,
    reply_input: Entity<InputState>,
    title_input: Entity<InputState>,
    theme_preset_select: Entity<SelectState<Vec<SharedString>>>,
    theme_mode: ThemeMode,
    delivery_policy: DeliveryPolicy,
    error_message: Option<String>,
}

impl SettingsView {
    fn theme_names(cx: &App) -> Vec<SharedString> {
        ThemeRegistry::global(cx)
            .sorted_themes()
            .iter()
            .map(|theme| theme.name.clone())
            .collect()
    }

    fn selected_theme_index(
        theme_names: &[SharedString],
        selected_theme_name: &str,
    ) -> Option<IndexPath> {
        if selected_theme_name.trim().is_empty() {
            return None;
        }

        theme_names
            .iter()
            .position(|theme_name| theme_name.as_ref() == selected_theme_name.trim())
            .map(|index| IndexPath::default().row(index))
    }

    pub fn new(state: &Entity<SettingsState>, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let settings = state.read(cx).settings();

        let delay_input =
            cx.new(|cx| InputState::new(window, cx).placeholder("Reply delay in milliseconds"));
        delay_input.update(cx, |input_state, cx| {
            input_state.set_value(settings.chat.response_delay_ms.to_string(), window, cx);
        });

        let reply_input = cx.new(|cx| {
            InputState::new(window, cx)
                .placeholder("Canned assistant reply")
                .auto_grow(2, 6)
        });
        reply_input.update(cx, |input_state, cx| {
            input_state.set_value(settings.chat.canned_reply.clone(), window, cx);
        });

        let title_input =
            cx.new(|cx| InputState::new(window, cx).placeholder("Title for new chats"));
        title_input.update(cx, |input_state, cx| {
            input_state.set_value(settings.chat.default_session_title.clone(), window, cx);
        });

        let theme_names = Self::theme_names(cx);
        let selected_theme_index = Self::selected_theme_index(&theme_names, &settings.theme_name);
        let theme_preset_select = cx.new(|cx| {
            SelectState::new(theme_names, selected_theme_index, window, cx).searchable(true)
        });

        Self {
            state: state.clone(),
            delay_input,
            reply_input,
            title_input,
            theme_preset_select,
            theme_mode: settings.theme_mode,
            delivery_policy: settings.chat.delivery_policy,
            error_message: None,
        }
    }

    fn select_light_mode(&mut self, _: &ClickEvent, _: &mut Window, cx: &mut Context<Self>) {
        self.theme_mode = ThemeMode::Light;
        cx.notify();
    }

    fn select_dark_mode(&mut self, _: &ClickEvent, _: &mut Window, cx: &mut Context<Self>) {
        self.theme_mode = ThemeMode::Dark;
        cx.notify();
    }

    fn select_origin_delivery(&mut self, _: &ClickEvent, _: &mut Window, cx: &mut Context<Self>) {
        self.delivery_policy = DeliveryPolicy::OriginSession;
        cx.notify();
    }

    fn select_active_delivery(&mut self, _: &ClickEvent, _: &mut Window, cx: &mut Context<Self>) {
        self.delivery_policy = DeliveryPolicy::ActiveSession;
        cx.notify();
    }

    fn save_settings(&mut self, _: &ClickEvent, window: &mut Window, cx: &mut Context<Self>) {
        let raw_delay = self.delay_input.read(cx).value().to_string();
        let Some(response_delay_ms) = parse_delay_ms(&raw_delay) else {
            self.error_message = Some(format!(
                "Reply delay must be a whole number, got {raw_delay:?}"
            ));
            cx.notify();
            return;
        };

        let current = self.state.read(cx).settings();
        let theme_name = self
            .theme_preset_select
            .read(cx)
            .selected_value()
            .map(|theme_name| theme_name.to_string())
            .unwrap_or_default();

        let new_settings = AppSettings {
            theme_mode: self.theme_mode,
            theme_name,
            chat: ChatConfig {
                response_delay_ms,
                canned_reply: self.reply_input.read(cx).value().to_string(),
                default_session_title: self.title_input.read(cx).value().to_string(),
                delivery_policy: self.delivery_policy,
                ..current.chat.clone()
            },
        };

        match self
            .state
            .update(cx, |state, cx| state.update_settings(new_settings, cx))
        {
            Ok(()) => {
                self.error_message = None;
                window.remove_window();
            }
            Err(error) => {
                tracing::error!("failed to save settings: {error}");
                self.error_message = Some(format!("Failed to save settings: {error}"));
                cx.notify();
            }
        }
    }

    fn cancel(&mut self, _: &ClickEvent, window: &mut Window, _: &mut Context<Self>) {
        self.error_message = None;
        window.remove_window();
    }

    fn render_field(&self, label: &'static str, input: &Entity<InputState>, cx: &App) -> Div {
        v_flex()
            .gap_1()
            .child(
                div()
                    .text_sm()
                    .text_color(cx.theme().foreground)
                    .child(label),
            )
            .child(Input::new(input).w_full())
    }

    fn render_choice(
        &self,
        id: &'static str,
        label: &'static str,
        selected: bool,
        handler: fn(&mut Self, &ClickEvent, &mut Window, &mut Context<Self>),
        cx: &mut Context<Self>,
    ) -> Button {
        Button::new(id)
            .small()
            .when(selected, |button| button.primary())
            .when(!selected, |button| button.ghost())
            .child(label)
            .on_click(cx.listener(handler))
    }
}

impl Render for SettingsView {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme_mode = self.theme_mode;
        let delivery_policy = self.delivery_policy;
        let light = self.render_choice(
            "settings-theme-light",
            "Light",
            theme_mode == ThemeMode::Light,
            Self::select_light_mode,
            cx,
        );
        let dark = self.render_choice(
            "settings-theme-dark",
            "Dark",
            theme_mode == ThemeMode::Dark,
            Self::select_dark_mode,
            cx,
        );
        let origin = self.render_choice(
            "settings-delivery-origin",
            "Sending chat",
            delivery_policy == DeliveryPolicy::OriginSession,
            Self::select_origin_delivery,
            cx,
        );
        let active = self.render_choice(
            "settings-delivery-active",
            "Open chat",
            delivery_policy == DeliveryPolicy::ActiveSession,
            Self::select_active_delivery,
            cx,
        );
        let delay_field = self.render_field("Reply Delay (ms)", &self.delay_input, cx);
        let reply_field = self.render_field("Assistant Reply", &self.reply_input, cx);
        let title_field = self.render_field("New Chat Title", &self.title_input, cx);
        let theme = cx.theme();

        v_flex()
            .id("settings-view")
            .size_full()
            .gap_4()
            .p_4()
            .pt_8()
            .bg(theme.background)
            .child(
                div()
                    .text_lg()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(theme.foreground)
                    .child("Settings"),
            )
            .child(
                v_flex()
                    .gap_3()
                    .child(
                        v_flex()
                            .gap_1()
                            .child(div().text_sm().text_color(theme.foreground).child("Theme Mode"))
                            .child(h_flex().gap_2().child(light).child(dark)),
                    )
                    .child(
                        v_flex()
                            .gap_1()
                            .child(
                                div()
                                    .text_sm()
                                    .text_color(theme.foreground)
                                    .child("Theme Preset"),
                            )
                            .child(
                                Select::new(&self.theme_preset_select)
                                    .w_full()
                                    .placeholder("Follow mode")
                                    .search_placeholder("Search theme preset")
                                    .cleanable(true),
                            ),
                    )
                    .child(delay_field)
                    .child(reply_field)
                    .child(title_field)
                    .child(
                        v_flex()
                            .gap_1()
                            .child(
                                div()
                                    .text_sm()
                                    .text_color(theme.foreground)
                                    .child("Deliver Replies To"),
                            )
                            .child(h_flex().gap_2().child(origin).child(active)),
                    ),
            )
            .when_some(self.error_message.clone(), |el, error| {
                el.child(div().text_sm().text_color(theme.danger).child(error))
            })
            .child(
                h_flex()
                    .gap_2()
                    .justify_end()
                    .child(
                        Button::new("settings-cancel")
                            .ghost()
                            .small()
                            .child("Cancel")
                            .on_click(cx.listener(Self::cancel)),
                    )
                    .child(
                        Button::new("settings-save")
                            .primary()
                            .small()
                            .child("Save")
                            .on_click(cx.listener(Self::save_settings)),
                    ),
            )
    }
}

/// Accepts a non-negative whole number of milliseconds, ignoring padding.
pub fn parse_delay_ms(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::parse_delay_ms;

    #[test]
    fn delay_parsing_accepts_padded_integers_only() {
        assert_eq!(parse_delay_ms(" 1500 "), Some(1_500));
        assert_eq!(parse_delay_ms("0"), Some(0));
        assert_eq!(parse_delay_ms("1.5"), None);
        assert_eq!(parse_delay_ms("-3"), None);
        assert_eq!(parse_delay_ms(""), None);
    }
}
