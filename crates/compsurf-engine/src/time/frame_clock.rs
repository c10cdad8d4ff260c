use std::time::Duration;

/// Frame timing snapshot handed to scenes.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct FrameTime {
    /// Host timestamp of this frame, in milliseconds.
    pub time_ms: u32,

    /// Time elapsed since the previous frame, in seconds (clamped).
    pub dt: f32,

    /// Monotonic frame counter, starting at zero.
    pub frame_index: u64,
}

/// Derives [`FrameTime`] from host-supplied millisecond timestamps.
///
/// Host clocks are 32-bit and wrap; the delta is computed with wrapping
/// arithmetic and then clamped, so a wrap or a backwards jump yields `dt_max`
/// rather than a pathological value.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<u32>,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a clock with the default clamps (0.1 ms to 250 ms).
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last_ms: None,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Advances the clock to `time_ms` and returns the frame snapshot.
    pub fn advance(&mut self, time_ms: u32) -> FrameTime {
        let dt = match self.last_ms {
            None => self.dt_min,
            Some(prev) => {
                let elapsed = Duration::from_millis(u64::from(time_ms.wrapping_sub(prev)));
                elapsed.clamp(self.dt_min, self.dt_max)
            }
        };

        self.last_ms = Some(time_ms);

        let ft = FrameTime {
            time_ms,
            dt: dt.as_secs_f32(),
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
