use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest height the preview surface shrinks to
pub const MIN_SURFACE_HEIGHT: f64 = 300.0;

/// Logical page widths a section is previewed at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewport {
    Mobile,
    Tablet,
    #[default]
    Desktop,
}

impl Viewport {
    pub const ALL: [Viewport; 3] = [Viewport::Mobile, Viewport::Tablet, Viewport::Desktop];

    pub fn width(self) -> u32 {
        match self {
            Viewport::Mobile => 375,
            Viewport::Tablet => 768,
            Viewport::Desktop => 1200,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Viewport::Mobile => "mobile",
            Viewport::Tablet => "tablet",
            Viewport::Desktop => "desktop",
        }
    }

    /// Uniform scale that fits the logical width into `container_width`.
    /// Never scales up.
    pub fn scale(self, container_width: f64) -> f64 {
        let target = f64::from(self.width());
        if container_width > 0.0 && container_width < target {
            container_width / target
        } else {
            1.0
        }
    }

    /// Size the surface for a container and the height the sandbox last
    /// reported.
    pub fn fit(self, container_width: f64, reported_height: f64) -> SurfaceFit {
        let scale = self.scale(container_width);
        let height = reported_height.max(MIN_SURFACE_HEIGHT);
        SurfaceFit {
            width: self.width(),
            scale,
            height,
            scaled_height: height * scale,
        }
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Viewport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mobile" => Ok(Viewport::Mobile),
            "tablet" => Ok(Viewport::Tablet),
            "desktop" => Ok(Viewport::Desktop),
            other => Err(format!("unknown viewport '{}' (expected mobile, tablet or desktop)", other)),
        }
    }
}

/// Rendered at `width` logical pixels, displayed at `scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceFit {
    pub width: u32,
    pub scale: f64,
    pub height: f64,
    pub scaled_height: f64,
}

impl SurfaceFit {
    /// Inline style for the element holding the sandbox: logical width,
    /// scaled from the top-left corner.
    pub fn frame_style(&self) -> String {
        format!(
            "width:{}px;height:{}px;transform:scale({});transform-origin:0 0;",
            self.width, self.height, self.scale
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widths() {
        assert_eq!(Viewport::Mobile.width(), 375);
        assert_eq!(Viewport::Tablet.width(), 768);
        assert_eq!(Viewport::Desktop.width(), 1200);
    }

    #[test]
    fn test_narrow_container_scales_down() {
        let fit = Viewport::Desktop.fit(600.0, 1000.0);
        assert_eq!(fit.scale, 0.5);
        assert_eq!(fit.height, 1000.0);
        assert_eq!(fit.scaled_height, 500.0);
    }

    #[test]
    fn test_wide_container_never_scales_up() {
        assert_eq!(Viewport::Mobile.scale(1440.0), 1.0);
        assert_eq!(Viewport::Tablet.scale(768.0), 1.0);
    }

    #[test]
    fn test_minimum_height() {
        let fit = Viewport::Mobile.fit(375.0, 40.0);
        assert_eq!(fit.height, MIN_SURFACE_HEIGHT);
        assert_eq!(fit.scaled_height, MIN_SURFACE_HEIGHT);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Tablet".parse::<Viewport>(), Ok(Viewport::Tablet));
        assert!("watch".parse::<Viewport>().is_err());
    }
}
