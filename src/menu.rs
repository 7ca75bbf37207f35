//! The application menu.
//!
//! Skylight runs as an accessory app and never shows a menu bar of its own,
//! but macOS still routes key equivalents through the main menu while the
//! overlay is key. The Edit entries reach the focused web content natively,
//! Hide and Quit go through the overlay controller.

use anyhow::{Context, Result};
use skylight_core::{APP_NAME_PRETTY, KeyCommand};
use tray_icon::menu::accelerator::{Accelerator, Code, Modifiers};
use tray_icon::menu::{Menu, MenuId, MenuItem, PredefinedMenuItem, Submenu};

pub struct AppMenu {
    menu: Menu,
    hide: MenuItem,
    quit: MenuItem,
}

impl AppMenu {
    pub fn new() -> Result<Self> {
        let hide = MenuItem::new(
            format!("Hide {APP_NAME_PRETTY}"),
            true,
            Some(Accelerator::new(Some(Modifiers::SUPER), Code::KeyH)),
        );
        let quit = MenuItem::new(
            format!("Quit {APP_NAME_PRETTY}"),
            true,
            Some(Accelerator::new(Some(Modifiers::SUPER), Code::KeyQ)),
        );

        let app = Submenu::with_items(APP_NAME_PRETTY, true, &[&hide, &quit])
            .context("Failed to build application submenu")?;
        let edit = Submenu::with_items(
            "Edit",
            true,
            &[
                &PredefinedMenuItem::select_all(None),
                &PredefinedMenuItem::copy(None),
                &PredefinedMenuItem::cut(None),
                &PredefinedMenuItem::paste(None),
            ],
        )
        .context("Failed to build edit submenu")?;

        let menu = Menu::new();
        menu.append_items(&[&app, &edit])
            .context("Failed to build application menu")?;

        Ok(Self { menu, hide, quit })
    }

    /// Installs the menu as the application's main menu.
    pub fn install(&self) {
        #[cfg(target_os = "macos")]
        self.menu.init_for_nsapp();
    }

    pub fn command(&self, id: &MenuId) -> Option<KeyCommand> {
        if self.hide.id() == id {
            Some(KeyCommand::Hide)
        } else if self.quit.id() == id {
            Some(KeyCommand::Quit)
        } else {
            None
        }
    }
}
