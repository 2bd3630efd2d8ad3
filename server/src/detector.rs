use std::str::FromStr;

use measure_shared::PixelDims;

/// Finds the dominant rectangle in the current camera frame.
pub trait Detector: Send + Sync {
    fn locate_reference(&self) -> Option<PixelDims>;
    fn locate_object(&self) -> Option<PixelDims>;
}

/// Reports the same rectangle for every frame; `None` simulates an empty
/// scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedDetector {
    pub rect: Option<PixelDims>,
}

impl FixedDetector {
    pub const DEFAULT_RECT: PixelDims = PixelDims {
        x: 220.0,
        y: 160.0,
        w: 200.0,
        h: 126.0,
    };

    pub fn new(rect: PixelDims) -> Self {
        Self { rect: Some(rect) }
    }
}

impl Default for FixedDetector {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RECT)
    }
}

impl Detector for FixedDetector {
    fn locate_reference(&self) -> Option<PixelDims> {
        self.rect
    }

    fn locate_object(&self) -> Option<PixelDims> {
        self.rect
    }
}

/// `x,y,w,h` in pixels, or `none`, as passed to `--detect`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectArg(pub Option<PixelDims>);

impl From<DetectArg> for FixedDetector {
    fn from(arg: DetectArg) -> Self {
        Self { rect: arg.0 }
    }
}

impl FromStr for DetectArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("none") {
            return Ok(DetectArg(None));
        }
        let parts = value
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|error| format!("invalid number in {value:?}: {error}"))?;
        let [x, y, w, h] = parts[..] else {
            return Err(format!("expected x,y,w,h, got {value:?}"));
        };
        if !(w > 0.0 && h > 0.0) {
            return Err("width and height must be positive".to_string());
        }
        Ok(DetectArg(Some(PixelDims { x, y, w, h })))
    }
}
