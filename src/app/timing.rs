use std::time::{Duration, Instant};

/// Longest step handed to the editor, so a stall does not fling the camera.
const MAX_FRAME_DT: f32 = 0.1;
const TITLE_REFRESH_SECS: f32 = 0.5;

pub struct FrameTiming {
    last_frame_time: Option<Instant>,
    last_fps_time: Instant,
    frame_count: u32,
    pub frame_dt: f32,
    base_title: String,
}

impl FrameTiming {
    pub fn new(base_title: String) -> Self {
        Self {
            last_frame_time: None,
            last_fps_time: Instant::now(),
            frame_count: 0,
            frame_dt: 1.0 / 60.0,
            base_title,
        }
    }

    /// Advances one frame and returns a window title when the fps readout
    /// is due for a refresh.
    pub fn update(&mut self, now: Instant, status: &str) -> Option<String> {
        let dt_duration = if let Some(last) = self.last_frame_time {
            now.saturating_duration_since(last)
        } else {
            Duration::from_millis(16)
        };
        self.last_frame_time = Some(now);
        self.frame_dt = dt_duration.as_secs_f32().clamp(0.0, MAX_FRAME_DT);

        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.last_fps_time);
        if elapsed.as_secs_f32() < TITLE_REFRESH_SECS {
            return None;
        }
        let fps = self.frame_count as f32 / elapsed.as_secs_f32();
        self.frame_count = 0;
        self.last_fps_time = now;
        Some(format!("{} - {:.1} fps - {}", self.base_title, fps, status))
    }
}
