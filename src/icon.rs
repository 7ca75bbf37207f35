use std::sync::LazyLock;

use skylight_core::Appearance;

const COLOR_LIGHT_APPEARANCE: (u8, u8, u8) = (0, 0, 0);
const COLOR_DARK_APPEARANCE: (u8, u8, u8) = (255, 255, 255);
const ICON_BYTES: &[u8] = include_bytes!("../assets/icon.png");
pub const ICON_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/icon.png");

static ICON_LIGHT: LazyLock<tray_icon::Icon> =
    LazyLock::new(|| load_icon(IconVariant::Light.color()));
static ICON_DARK: LazyLock<tray_icon::Icon> =
    LazyLock::new(|| load_icon(IconVariant::Dark.color()));

/// Status bar icon variants. The light variant is drawn black to stand out on
/// a light menu bar, the dark variant is drawn white.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconVariant {
    Light,
    Dark,
}

impl IconVariant {
    pub fn for_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Light => IconVariant::Light,
            Appearance::Dark => IconVariant::Dark,
        }
    }

    fn color(self) -> (u8, u8, u8) {
        match self {
            IconVariant::Light => COLOR_LIGHT_APPEARANCE,
            IconVariant::Dark => COLOR_DARK_APPEARANCE,
        }
    }

    pub fn icon(self) -> tray_icon::Icon {
        match self {
            IconVariant::Light => ICON_LIGHT.clone(),
            IconVariant::Dark => ICON_DARK.clone(),
        }
    }
}

/// Decodes the bundled template and paints every pixel in `(r, g, b)`,
/// keeping the alpha channel.
fn recolor(bytes: &[u8], (r, g, b): (u8, u8, u8)) -> image::ImageResult<image::RgbaImage> {
    let mut image = image::load_from_memory(bytes)?.into_rgba8();
    for pixel in image.pixels_mut() {
        pixel[0] = r;
        pixel[1] = g;
        pixel[2] = b;
    }
    Ok(image)
}

fn load_icon(color: (u8, u8, u8)) -> tray_icon::Icon {
    let image = recolor(ICON_BYTES, color).expect("Failed to decode bundled icon");
    let (width, height) = image.dimensions();
    tray_icon::Icon::from_rgba(image.into_raw(), width, height).expect("Failed to open icon")
}
