//! The menu bar status item and its menu.

use anyhow::{Context, Result};
use skylight_core::{APP_NAME_PRETTY, Appearance, Trigger};
use tracing::{debug, warn};
use tray_icon::menu::accelerator::{Accelerator, Code, Modifiers};
use tray_icon::menu::{Menu, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{TrayIcon, TrayIconBuilder};

use crate::icon::IconVariant;

/// Entries of the status item menu. Each one forwards to a controller method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ToggleWindow,
    ResetSizeAndPosition,
    Home,
    Quit,
    SetTrigger,
    Install,
    Uninstall,
}

fn cmd(code: Code) -> Option<Accelerator> {
    Some(Accelerator::new(Some(Modifiers::SUPER), code))
}

fn trigger_text(trigger: Trigger) -> String {
    format!("Trigger: {trigger}")
}

pub struct TrayMenu {
    menu: Menu,
    trigger_label: MenuItem,
    entries: Vec<(MenuItem, MenuAction)>,
}

impl TrayMenu {
    pub fn new(trigger: Trigger) -> Result<Self> {
        let trigger_label = MenuItem::new(trigger_text(trigger), false, None);
        let entry = |text: &str, accelerator, action| (MenuItem::new(text, true, accelerator), action);
        let entries = vec![
            entry("Toggle Window", cmd(Code::KeyT), MenuAction::ToggleWindow),
            entry("Reset Size & Position", cmd(Code::KeyR), MenuAction::ResetSizeAndPosition),
            entry("Home", cmd(Code::KeyG), MenuAction::Home),
            entry("Set New Trigger", None, MenuAction::SetTrigger),
            entry("Install at Login", None, MenuAction::Install),
            entry("Uninstall from Login", None, MenuAction::Uninstall),
            entry("Quit", cmd(Code::KeyQ), MenuAction::Quit),
        ];

        let menu = Menu::new();
        menu.append_items(&[
            &MenuItem::new(APP_NAME_PRETTY, false, None),
            &trigger_label,
            &PredefinedMenuItem::separator(),
            &entries[0].0,
            &entries[1].0,
            &entries[2].0,
            &PredefinedMenuItem::separator(),
            &entries[3].0,
            &entries[4].0,
            &entries[5].0,
            &PredefinedMenuItem::separator(),
            &entries[6].0,
        ])
        .context("Failed to build tray menu")?;

        Ok(Self {
            menu,
            trigger_label,
            entries,
        })
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn action(&self, id: &MenuId) -> Option<MenuAction> {
        self.entries
            .iter()
            .find(|(item, _)| item.id() == id)
            .map(|(_, action)| *action)
    }

    /// Shows that the next key press will become the trigger.
    pub fn show_capturing(&self) {
        self.trigger_label.set_text("Trigger: press the new combination");
    }

    /// Refreshes the entry showing the current trigger.
    pub fn show_trigger(&self, trigger: Trigger) {
        self.trigger_label.set_text(trigger_text(trigger));
    }
}

/// The menu bar icon, switched between variants as the appearance changes.
pub struct StatusItem {
    tray: TrayIcon,
    variant: IconVariant,
}

impl StatusItem {
    pub fn build(menu: &TrayMenu, appearance: Appearance) -> Result<Self> {
        let variant = IconVariant::for_appearance(appearance);
        let tray = TrayIconBuilder::new()
            .with_menu(Box::new(menu.menu().clone()))
            .with_tooltip(APP_NAME_PRETTY)
            .with_icon(variant.icon())
            .build()
            .context("Failed to create status item")?;
        Ok(Self { tray, variant })
    }

    pub fn set_appearance(&mut self, appearance: Appearance) {
        let variant = IconVariant::for_appearance(appearance);
        if variant == self.variant {
            return;
        }
        debug!(?variant, "Switching status icon");
        if let Err(e) = self.tray.set_icon(Some(variant.icon())) {
            warn!("Failed to update status icon: {}", e);
            return;
        }
        self.variant = variant;
    }
}
