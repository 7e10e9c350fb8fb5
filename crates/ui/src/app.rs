use std::path::PathBuf;

use gpui::prelude::FluentBuilder;
use gpui::*;
use gpui_component::{
    ActiveTheme, IconName, Sizable,
    button::{Button, ButtonVariants},
    h_flex,
    label::Label,
    v_flex,
};

use crate::chat::ChatView;

pub const SIDEBAR_DEFAULT_WIDTH: f32 = 280.0;
pub const SIDEBAR_MIN_WIDTH: f32 = 200.0;
pub const SIDEBAR_MAX_WIDTH: f32 = 420.0;
pub const SIDEBAR_COLLAPSED_WIDTH: f32 = 56.0;
#[cfg(target_os = "macos")]
const TOP_BAR_LEFT_PADDING: f32 = 78.0;
#[cfg(not(target_os = "macos"))]
const TOP_BAR_LEFT_PADDING: f32 = 16.0;
const _: () = {
    assert!(SIDEBAR_COLLAPSED_WIDTH < SIDEBAR_MIN_WIDTH);
    assert!(SIDEBAR_MIN_WIDTH < SIDEBAR_DEFAULT_WIDTH);
    assert!(SIDEBAR_DEFAULT_WIDTH < SIDEBAR_MAX_WIDTH);
};

const SHELL_KEY_CONTEXT: &str = "ChatAppShell";

gpui::actions!(shell, [NewChat, ToggleSidebar, Quit]);

/// Directory watched for user theme files.
pub fn default_themes_path() -> PathBuf {
    PathBuf::from("./themes")
}

/// Width the sidebar takes when dragged to `drag_x`.
pub fn compute_sidebar_width(drag_x: f32) -> f32 {
    if drag_x.is_nan() {
        return SIDEBAR_DEFAULT_WIDTH;
    }
    drag_x.clamp(SIDEBAR_MIN_WIDTH, SIDEBAR_MAX_WIDTH)
}

/// Width actually rendered for the sidebar container.
pub fn displayed_sidebar_width(collapsed: bool, expanded_width: f32) -> f32 {
    if collapsed {
        SIDEBAR_COLLAPSED_WIDTH
    } else {
        compute_sidebar_width(expanded_width)
    }
}

fn top_bar_height(window: &Window) -> Pixels {
    (1.75 * window.rem_size()).max(px(34.0))
}

#[derive(Clone)]
struct SidebarResizeDrag;

struct InvisibleDrag;

impl Render for InvisibleDrag {
    fn render(&mut self, _: &mut Window, _: &mut Context<Self>) -> impl IntoElement {
        div()
    }
}

/// Root layout: resizable session sidebar on the left, chat on the right.
pub struct ChatAppShell {
    chat_view: Entity<ChatView>,
    focus_handle: FocusHandle,
    sidebar_collapsed: bool,
    sidebar_width: f32,
    title_bar_should_move: bool,
}

impl ChatAppShell {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let chat_view = cx.new(|cx| ChatView::new(window, cx));
        cx.observe(&chat_view, |_, _, cx| cx.notify()).detach();

        let focus_handle = cx.focus_handle();
        focus_handle.focus(window, cx);

        Self {
            chat_view,
            focus_handle,
            sidebar_collapsed: false,
            sidebar_width: SIDEBAR_DEFAULT_WIDTH,
            title_bar_should_move: false,
        }
    }

    fn toggle_sidebar(&mut self, cx: &mut Context<Self>) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        tracing::debug!(collapsed = self.sidebar_collapsed, "toggled sidebar");
        cx.notify();
    }

    fn resize_sidebar(&mut self, drag_x: f32, cx: &mut Context<Self>) {
        self.sidebar_width = compute_sidebar_width(drag_x);
        cx.notify();
    }

    fn new_chat(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        self.chat_view
            .update(cx, |chat_view, cx| chat_view.create_session(window, cx));
    }

    fn open_settings(&mut self, cx: &mut Context<Self>) {
        self.chat_view
            .update(cx, |chat_view, cx| chat_view.open_settings_panel(cx));
    }

    fn on_new_chat(&mut self, _: &NewChat, window: &mut Window, cx: &mut Context<Self>) {
        self.new_chat(window, cx);
    }

    fn on_toggle_sidebar(&mut self, _: &ToggleSidebar, _: &mut Window, cx: &mut Context<Self>) {
        self.toggle_sidebar(cx);
    }
}

impl Focusable for ChatAppShell {
    fn focus_handle(&self, _: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl Render for ChatAppShell {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let toolbar_height = top_bar_height(window);
        let collapsed = self.sidebar_collapsed;

        div()
            .id("app-shell")
            .key_context(SHELL_KEY_CONTEXT)
            .track_focus(&self.focus_handle)
            .on_action(cx.listener(Self::on_new_chat))
            .on_action(cx.listener(Self::on_toggle_sidebar))
            .size_full()
            .relative()
            .bg(theme.background)
            .child(
                v_flex()
                    .size_full()
                    .child(
                        h_flex()
                            .id("app-shell-body")
                            .flex_1()
                            .min_w_0()
                            .min_h_0()
                            .pt(toolbar_height)
                            .overflow_hidden()
                            .child(self.render_sidebar(cx))
                            .when(!collapsed, |el| el.child(self.render_resize_handle(cx)))
                            .child(
                                v_flex()
                                    .id("main-content")
                                    .flex_1()
                                    .h_full()
                                    .min_w_0()
                                    .min_h_0()
                                    .overflow_hidden()
                                    .child(self.chat_view.clone()),
                            ),
                    )
                    .child(self.render_bottom_bar(cx)),
            )
            .child(
                div()
                    .absolute()
                    .top_0()
                    .left_0()
                    .right_0()
                    .child(self.render_top_bar(window, toolbar_height, cx)),
            )
    }
}

impl ChatAppShell {
    fn render_top_bar(
        &self,
        window: &Window,
        toolbar_height: Pixels,
        cx: &Context<Self>,
    ) -> impl IntoElement {
        let theme = cx.theme();
        let title = self.chat_view.read(cx).active_title();

        h_flex()
            .id("app-top-bar")
            .window_control_area(WindowControlArea::Drag)
            .on_mouse_down_out(cx.listener(|this, _, _window, _cx| {
                this.title_bar_should_move = false;
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, _, _window, _cx| {
                    this.title_bar_should_move = false;
                }),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, _, _window, _cx| {
                    this.title_bar_should_move = true;
                }),
            )
            .on_mouse_move(cx.listener(|this, _, window, _cx| {
                if this.title_bar_should_move {
                    this.title_bar_should_move = false;
                    window.start_window_move();
                }
            }))
            .w_full()
            .h(toolbar_height)
            .flex_shrink_0()
            .pl(px(TOP_BAR_LEFT_PADDING))
            .pr_4()
            .items_center()
            .justify_between()
            .bg(theme.background)
            .border_b_1()
            .border_color(theme.border)
            .child(
                Label::new("Parlor")
                    .text_sm()
                    .font_weight(FontWeight::SEMIBOLD)
                    .text_color(theme.muted_foreground),
            )
            .child(
                div()
                    .id("active-session-title")
                    .flex_1()
                    .min_w_0()
                    .truncate()
                    .text_sm()
                    .text_color(theme.foreground)
                    .child(title),
            )
            .child(self.render_linux_window_controls(window, cx))
    }

    fn render_linux_window_controls(&self, window: &Window, cx: &Context<Self>) -> AnyElement {
        #[cfg(target_os = "linux")]
        {
            let maximize_icon = if window.is_maximized() {
                IconName::WindowRestore
            } else {
                IconName::WindowMaximize
            };

            h_flex()
                .id("linux-window-controls")
                .items_center()
                .on_mouse_down(MouseButton::Left, |_, _, cx| cx.stop_propagation())
                .gap_2()
                .child(
                    Button::new("window-minimize")
                        .ghost()
                        .small()
                        .icon(IconName::WindowMinimize)
                        .on_click(cx.listener(|_, _, window, _| window.minimize_window())),
                )
                .child(
                    Button::new("window-maximize")
                        .ghost()
                        .small()
                        .icon(maximize_icon)
                        .on_click(cx.listener(|_, _, window, _| window.zoom_window())),
                )
                .child(
                    Button::new("window-close")
                        .ghost()
                        .small()
                        .icon(IconName::WindowClose)
                        .on_click(cx.listener(|_, _, window, _| window.remove_window())),
                )
                .into_any_element()
        }

        #[cfg(not(target_os = "linux"))]
        {
            let _ = (window, cx);
            div().into_any_element()
        }
    }

    fn render_bottom_bar(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let toggle_icon = if self.sidebar_collapsed {
            IconName::PanelLeftOpen
        } else {
            IconName::PanelLeftClose
        };

        h_flex()
            .id("app-bottom-bar")
            .w_full()
            .flex_shrink_0()
            .items_center()
            .gap_1()
            .px_3()
            .py_1()
            .border_t_1()
            .border_color(theme.border)
            .child(
                Button::new("sidebar-toggle")
                    .ghost()
                    .small()
                    .icon(toggle_icon)
                    .on_click(cx.listener(|this, _, _window, cx| this.toggle_sidebar(cx))),
            )
            .child(
                Button::new("shell-settings")
                    .ghost()
                    .small()
                    .icon(IconName::Settings)
                    .on_click(cx.listener(|this, _, _window, cx| this.open_settings(cx))),
            )
    }

    fn render_sidebar(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let width = displayed_sidebar_width(self.sidebar_collapsed, self.sidebar_width);
        let content = if self.sidebar_collapsed {
            v_flex()
                .id("collapsed-sidebar")
                .size_full()
                .items_center()
                .py_3()
                .child(
                    Button::new("new-chat-collapsed")
                        .ghost()
                        .small()
                        .icon(IconName::Plus)
                        .on_click(cx.listener(|this, _, window, cx| this.new_chat(window, cx))),
                )
                .into_any_element()
        } else {
            self.chat_view.read(cx).sidebar().clone().into_any_element()
        };

        div()
            .id("sidebar-container")
            .h_full()
            .min_w_0()
            .flex_shrink_0()
            .w(px(width))
            .overflow_hidden()
            .bg(theme.background)
            .border_r_1()
            .border_color(theme.border)
            .child(content)
    }

    fn render_resize_handle(&self, cx: &Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        div()
            .id("sidebar-resize-handle")
            .w(px(1.0))
            .h_full()
            .flex_shrink_0()
            .cursor(CursorStyle::ResizeLeftRight)
            .bg(theme.border)
            .hover(|el| el.bg(theme.primary))
            .on_drag(SidebarResizeDrag, |_, _, _, cx| cx.new(|_| InvisibleDrag))
            .on_drag_move::<SidebarResizeDrag>(cx.listener(
                |this, event: &DragMoveEvent<SidebarResizeDrag>, _window, cx| {
                    this.resize_sidebar(event.event.position.x.into(), cx);
                },
            ))
    }
}
