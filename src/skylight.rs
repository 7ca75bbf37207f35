use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use skylight::cli::Cli;
use skylight::event::UserEvent;
use skylight::menu::AppMenu;
use skylight::notify::NotificationLayer;
use skylight::tray::{MenuAction, StatusItem, TrayMenu};
use skylight::window::{OverlayWindow, Surface};
use skylight::{ConfigManager, DEFAULT_LOG_LEVEL, VERSION};
use skylight_core::{
    Appearance, AppearanceWatch, CommandOutcome, FRAME_SAVE_NAME, FrameStore, HotkeyListener,
    KeyCommand, ListenerAction, Modifiers, OverlayController,
};
use skylight_launch::{StartupInstaller, current_executable};
use tao::event::{ElementState, Event, StartCause, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};
use tao::keyboard::{Key, ModifiersState};
use tao::window::Theme;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tray_icon::menu::MenuEvent;

fn main() -> Result<()> {
    // Initialize the logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SKYLIGHT_LOG")
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
        )
        .finish()
        .with(NotificationLayer::new())
        .init();

    let cli = Cli::parse();
    if cli.install_startup {
        return install_startup();
    }
    if cli.uninstall_startup {
        return uninstall_startup();
    }
    info!(
        version = VERSION,
        "Starting skylight. To run at login, use: skylight --install-startup"
    );

    // Load config
    let config_manager = ConfigManager::new()?;
    let mut config = config_manager.load()?;
    // save back the config to create the file if it doesn't exist
    config_manager.save(&config)?;
    info!(path = ?config_manager.config_path(), trigger = %config.trigger(), "Config loaded");

    let frame_store = FrameStore::new(ConfigManager::default_config_dir()?);
    let saved_frame = frame_store.load(FRAME_SAVE_NAME).unwrap_or_else(|e| {
        warn!("Ignoring saved window frame: {:#}", e);
        None
    });

    let listener = Arc::new(HotkeyListener::new(config.trigger()));

    #[allow(unused_mut)]
    let mut event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    #[cfg(target_os = "macos")]
    {
        use tao::platform::macos::{ActivationPolicy, EventLoopExtMacOS};
        event_loop.set_activation_policy(ActivationPolicy::Accessory);
    }
    let event_sender = event_loop.create_proxy();

    let menu_sender = event_sender.clone();
    MenuEvent::set_event_handler(Some(move |event| {
        menu_sender.send_event(UserEvent::Menu(event)).ok();
    }));

    let tray_menu = TrayMenu::new(config.trigger())?;
    let app_menu = AppMenu::new()?;
    let mut overlay = OverlayWindow::build(&event_loop, event_sender.clone(), saved_frame)?;
    let mut controller = OverlayController::new();

    let mut appearance = AppearanceWatch::new(appearance_of(overlay.window().theme()));
    let appearance_sender = event_sender.clone();
    appearance.subscribe(move |appearance| {
        appearance_sender
            .send_event(UserEvent::AppearanceChanged(appearance))
            .ok();
    });

    // The tap is installed before the loop starts, a failure only costs the
    // global trigger.
    #[cfg(target_os = "macos")]
    let event_tap = match skylight::tap::EventTap::install(listener.clone(), event_sender.clone()) {
        Ok(tap) => Some(tap),
        Err(e) => {
            error!("{:#} Continuing without a global trigger.", e);
            None
        }
    };
    #[cfg(not(target_os = "macos"))]
    warn!("The global trigger is only available on macOS");

    let mut status_item = None;
    let mut modifiers = ModifiersState::empty();

    event_loop.run(move |event, target, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::NewEvents(StartCause::Init) => {
                app_menu.install();

                // We create the icon once the event loop is actually running
                // to prevent issues like https://github.com/tauri-apps/tray-icon/issues/90
                match StatusItem::build(&tray_menu, appearance.current()) {
                    Ok(item) => status_item = Some(item),
                    Err(e) => error!("{:#}", e),
                }

                // We have to request a redraw here to have the icon actually show up.
                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};

                    let rl = CFRunLoopGetMain();
                    CFRunLoopWakeUp(rl);
                }

                controller.show(&mut Surface::new(&mut overlay, target));
                info!("Skylight ready");
            }

            Event::UserEvent(event) => match event {
                UserEvent::Hotkey(ListenerAction::Toggle) => {
                    controller.toggle(&mut Surface::new(&mut overlay, target));
                }
                UserEvent::Hotkey(ListenerAction::TriggerCaptured(trigger)) => {
                    tray_menu.show_trigger(trigger);
                    if let Err(e) = config_manager.save_trigger(&mut config, trigger) {
                        error!("Failed to save trigger: {:#}", e);
                    }
                }
                UserEvent::Hotkey(ListenerAction::PassThrough) => {}
                UserEvent::TapDisabled => {
                    #[cfg(target_os = "macos")]
                    if let Some(tap) = &event_tap {
                        tap.enable();
                    }
                }
                UserEvent::Menu(event) => {
                    if let Some(action) = tray_menu.action(&event.id) {
                        match action {
                            MenuAction::ToggleWindow => {
                                controller.toggle(&mut Surface::new(&mut overlay, target));
                            }
                            MenuAction::ResetSizeAndPosition => {
                                controller
                                    .reset_size_and_position(&mut Surface::new(&mut overlay, target));
                            }
                            MenuAction::Home => overlay.go_home(),
                            MenuAction::Quit => {
                                quit(&mut overlay, &frame_store, &mut status_item, control_flow);
                            }
                            MenuAction::SetTrigger => {
                                if listener.begin_capture() {
                                    tray_menu.show_capturing();
                                }
                            }
                            MenuAction::Install => match install_startup() {
                                Ok(()) => {
                                    // The login item launches a fresh instance.
                                    info!("Installation successful, exiting.");
                                    quit(&mut overlay, &frame_store, &mut status_item, control_flow);
                                }
                                Err(e) => error!("Installation unsuccessful: {:#}", e),
                            },
                            MenuAction::Uninstall => match uninstall_startup() {
                                Ok(()) => controller.hide(&mut Surface::new(&mut overlay, target)),
                                Err(e) => error!("Uninstall unsuccessful: {:#}", e),
                            },
                        }
                    } else if let Some(command) = app_menu.command(&event.id) {
                        match command {
                            KeyCommand::Hide => {
                                controller.hide(&mut Surface::new(&mut overlay, target));
                            }
                            KeyCommand::Quit => {
                                quit(&mut overlay, &frame_store, &mut status_item, control_flow);
                            }
                            // Routed to the first responder by the predefined menu items.
                            KeyCommand::Edit(_) => {}
                        }
                    }
                }
                UserEvent::BackgroundColor(css) => {
                    controller.on_background_color(&mut Surface::new(&mut overlay, target), &css);
                }
                UserEvent::AppearanceChanged(appearance) => {
                    if let Some(item) = status_item.as_mut() {
                        item.set_appearance(appearance);
                    }
                }
            },

            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(size) => {
                    let content = overlay.content_size(size);
                    overlay.mark_frame_dirty();
                    controller.on_resized(&mut Surface::new(&mut overlay, target), content);
                }
                WindowEvent::Moved(_) => overlay.mark_frame_dirty(),
                WindowEvent::Focused(false) => persist_frame(&mut overlay, &frame_store),
                WindowEvent::CloseRequested => {
                    controller.hide(&mut Surface::new(&mut overlay, target));
                }
                WindowEvent::ThemeChanged(theme) => {
                    appearance.update(appearance_of(theme));
                }
                WindowEvent::ModifiersChanged(state) => modifiers = state,
                WindowEvent::KeyboardInput {
                    event: key_event, ..
                } if key_event.state == ElementState::Pressed => {
                    let Key::Character(text) = key_event.logical_key else {
                        return;
                    };
                    let Some(key) = text.chars().next() else {
                        return;
                    };
                    let outcome = controller.handle_key_command(
                        &mut Surface::new(&mut overlay, target),
                        modifiers_of(modifiers),
                        key,
                    );
                    if outcome == CommandOutcome::Quit {
                        quit(&mut overlay, &frame_store, &mut status_item, control_flow);
                    }
                }
                _ => {}
            },

            Event::LoopDestroyed => persist_frame(&mut overlay, &frame_store),

            _ => {}
        }
    });
}

fn install_startup() -> Result<()> {
    let installer = StartupInstaller::new()?;
    let executable = current_executable()?;
    let descriptor = installer
        .install(&executable)
        .context("Failed to install login item")?;
    info!("Installed as startup app. Launch Agent created at {}.", descriptor.display());
    Ok(())
}

fn uninstall_startup() -> Result<()> {
    StartupInstaller::new()?
        .uninstall()
        .context("Failed to remove login item")
}

fn persist_frame(overlay: &mut OverlayWindow, store: &FrameStore) {
    if let Some(frame) = overlay.take_dirty_frame() {
        if let Err(e) = store.save(FRAME_SAVE_NAME, frame) {
            warn!("Failed to save window frame: {:#}", e);
        }
    }
}

/// Saves the window frame and leaves the event loop, which removes the
/// status item and the event tap with it.
fn quit(
    overlay: &mut OverlayWindow,
    store: &FrameStore,
    status_item: &mut Option<StatusItem>,
    control_flow: &mut ControlFlow,
) {
    persist_frame(overlay, store);
    status_item.take();
    *control_flow = ControlFlow::Exit;
}

fn appearance_of(theme: Theme) -> Appearance {
    match theme {
        Theme::Dark => Appearance::Dark,
        _ => Appearance::Light,
    }
}

fn modifiers_of(state: ModifiersState) -> Modifiers {
    Modifiers::from_flags(
        state.super_key(),
        state.alt_key(),
        state.control_key(),
        state.shift_key(),
    )
}
