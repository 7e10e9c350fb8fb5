use gpui::*;
use gpui_component::{Root, ThemeRegistry};
use tracing_subscriber::EnvFilter;

use ui::app::{ChatAppShell, NewChat, Quit, ToggleSidebar, default_themes_path};
use ui::settings::SettingsStore;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    init_tracing();

    let app = Application::new().with_assets(gpui_component_assets::Assets);

    app.run(|cx| {
        gpui_tokio_bridge::init(cx);
        gpui_component::init(cx);

        // Missing theme directories are fine; the built-in themes remain.
        if let Err(err) = ThemeRegistry::watch_dir(default_themes_path(), cx, |cx| {
            SettingsStore::load().settings().apply_theme(None, cx);
        }) {
            tracing::warn!("failed to watch themes directory: {err}. using built-in themes");
            SettingsStore::load().settings().apply_theme(None, cx);
        }

        cx.on_action(|_: &Quit, cx| {
            tracing::info!("quit requested");
            cx.quit();
        });

        cx.bind_keys([
            KeyBinding::new("cmd-q", Quit, None),
            KeyBinding::new("cmd-n", NewChat, None),
            KeyBinding::new("cmd-b", ToggleSidebar, None),
        ]);

        cx.spawn(async move |cx| {
            cx.update(|cx| {
                let options = WindowOptions {
                    window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                        None,
                        size(px(1100.), px(760.)),
                        cx,
                    ))),
                    titlebar: Some(TitlebarOptions {
                        title: Some("Parlor".into()),
                        appears_transparent: true,
                        traffic_light_position: Some(point(px(9.), px(9.))),
                        ..Default::default()
                    }),
                    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
                    window_decorations: Some(WindowDecorations::Client),
                    #[cfg(not(any(target_os = "linux", target_os = "freebsd")))]
                    window_decorations: None,
                    ..Default::default()
                };

                let opened = cx.open_window(options, |window, cx| {
                    let shell = cx.new(|cx| ChatAppShell::new(window, cx));
                    cx.new(|cx| Root::new(shell, window, cx))
                });

                match opened {
                    Ok(_) => {
                        tracing::info!("opened main window");
                        cx.activate(true);
                    }
                    Err(error) => {
                        tracing::error!("failed to open main window: {error}");
                        cx.quit();
                    }
                }
            })
        })
        .detach();
    });
}
