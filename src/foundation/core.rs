use crate::foundation::error::{SlideError, SlideResult};

/// Output resolution every frame is normalized to (portrait 9:16).
pub const TARGET_RESOLUTION: Resolution = Resolution {
    width: 1080,
    height: 1920,
};

/// Switch interval used when the caller does not send one.
pub const DEFAULT_SWITCH_TIME: &str = "0.5";

/// 0-based index of a frame in the output video.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct FrameIndex(pub u64);

/// Frame size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Resolution {
    /// Width divided by height.
    pub fn ratio(self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32,
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> SlideResult<Self> {
        if den == 0 {
            return Err(SlideError::input("fps denominator must be > 0"));
        }
        if num == 0 {
            return Err(SlideError::input("fps numerator must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Convert frame count to seconds.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        (frames as f64) * self.frame_duration_secs()
    }
}

impl std::fmt::Display for Fps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// How long each image stays on screen, in seconds. Always finite and `> 0`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct SwitchInterval(f64);

impl SwitchInterval {
    /// Parse the raw form value (`"0.5"`, `" 2 "`, `"1e-1"`).
    pub fn parse(raw: &str) -> SlideResult<Self> {
        let trimmed = raw.trim();
        let secs: f64 = trimmed
            .parse()
            .map_err(|_| SlideError::input(format!("invalid switch time '{trimmed}'")))?;
        Self::from_secs(secs)
    }

    /// Validate a switch interval given in seconds.
    pub fn from_secs(secs: f64) -> SlideResult<Self> {
        if !secs.is_finite() || secs <= 0.0 {
            return Err(SlideError::input(format!(
                "switch time must be a positive number of seconds, got {secs}"
            )));
        }
        Ok(Self(secs))
    }

    /// Seconds per image.
    pub fn secs(self) -> f64 {
        self.0
    }

    /// Frame rate `1 / secs` as an exact rational at microsecond precision.
    pub fn fps(self) -> SlideResult<Fps> {
        const MICROS: u64 = 1_000_000;
        let den_micros = (self.0 * MICROS as f64).round() as u64;
        if den_micros == 0 {
            return Err(SlideError::input(format!(
                "switch time {} is below the 1us resolution",
                self.0
            )));
        }
        let g = gcd(MICROS, den_micros);
        let num = u32::try_from(MICROS / g);
        let den = u32::try_from(den_micros / g);
        match (num, den) {
            (Ok(num), Ok(den)) => Fps::new(num, den),
            _ => Err(SlideError::input(format!(
                "switch time {} cannot be expressed as a frame rate",
                self.0
            ))),
        }
    }

    /// Total video duration for `frame_count` images.
    pub fn video_duration_secs(self, frame_count: u64) -> f64 {
        frame_count as f64 * self.0
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
