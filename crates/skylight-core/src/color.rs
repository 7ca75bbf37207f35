//! Page background colors reported by the hosted page.
//!
//! The page reports `getComputedStyle(document.body).backgroundColor`, which is
//! always in `rgb(r, g, b)` or `rgba(r, g, b, a)` form. Anything else is
//! ignored.

/// A color with channels normalized to `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl Rgb {
    pub const fn new(red: f64, green: f64, blue: f64) -> Self {
        Self { red, green, blue }
    }

    /// Parses a computed CSS color, returning `None` for anything malformed.
    ///
    /// Alpha is accepted but dropped, the chrome is always painted opaque.
    pub fn from_css(value: &str) -> Option<Rgb> {
        let value = value.trim();
        if !value.starts_with("rgb") {
            return None;
        }
        let open = value.find('(')?;
        let close = open + value[open..].find(')')?;

        let channels = value[open + 1..close]
            .split(',')
            .map(|channel| channel.trim().parse::<f64>().ok().filter(|c| c.is_finite()))
            .collect::<Option<Vec<_>>>()?;
        let [red, green, blue, ..] = channels[..] else {
            return None;
        };

        let normalize = |channel: f64| (channel / 255.0).clamp(0.0, 1.0);
        Some(Rgb::new(normalize(red), normalize(green), normalize(blue)))
    }

    /// Opaque 8-bit RGBA, as expected by window backgrounds.
    pub fn to_rgba8(self) -> (u8, u8, u8, u8) {
        let scale = |channel: f64| (channel * 255.0).round() as u8;
        (scale(self.red), scale(self.green), scale(self.blue), 255)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb() {
        assert_eq!(Rgb::from_css("rgb(255, 0, 0)"), Some(Rgb::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_rgba_drops_alpha() {
        let color = Rgb::from_css("rgba(0,51,255,0.5)").unwrap();
        assert_eq!(color, Rgb::new(0.0, 0.2, 1.0));
        assert_eq!(color.to_rgba8(), (0, 51, 255, 255));
    }

    #[test]
    fn test_out_of_range_channels_are_clamped() {
        assert_eq!(
            Rgb::from_css("rgb(300, -4, 127.5)"),
            Some(Rgb::new(1.0, 0.0, 0.5))
        );
    }

    #[test]
    fn test_malformed_is_ignored() {
        for value in [
            "not-a-color",
            "",
            "rgb",
            "rgb(",
            "rgb(1, 2)",
            "rgb(1, 2, three)",
            "rgb(1, 2, 3",
            "rgb)1, 2, 3(",
            "hsl(0, 100%, 50%)",
            "#ff0000",
            "rgb(NaN, 0, 0)",
        ] {
            assert_eq!(Rgb::from_css(value), None, "{value:?}");
        }
    }
}
