use std::time::{Duration, Instant};

/// Frame rate of one completed measuring window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRateSample {
    pub frames: usize,
    pub elapsed: f64,
    pub fps: f64,
}

/// Summary reported when measuring is switched off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRateSummary {
    pub measures: usize,
    /// `None` when no window completed while measuring.
    pub average_fps: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Disabled,
    Measuring {
        window_start: Instant,
        frames: usize,
        total_fps: f64,
        measures: usize,
    },
}

/// Counts frames over fixed windows while enabled. Time is passed in by the
/// caller so the monitor never reads the clock on its own.
#[derive(Debug, Clone)]
pub struct FrameRateMonitor {
    window: Duration,
    state: State,
}

impl FrameRateMonitor {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: State::Disabled,
        }
    }

    pub fn is_measuring(&self) -> bool {
        matches!(self.state, State::Measuring { .. })
    }

    pub fn enable(&mut self, now: Instant) {
        self.state = State::Measuring {
            window_start: now,
            frames: 0,
            total_fps: 0.0,
            measures: 0,
        };
    }

    pub fn disable(&mut self) -> Option<FrameRateSummary> {
        match std::mem::replace(&mut self.state, State::Disabled) {
            State::Disabled => None,
            State::Measuring {
                total_fps,
                measures,
                ..
            } => Some(FrameRateSummary {
                measures,
                average_fps: if measures > 0 {
                    Some(total_fps / measures as f64)
                } else {
                    None
                },
            }),
        }
    }

    /// Switches measuring on or off. Returns the summary when switching off.
    pub fn toggle(&mut self, now: Instant) -> Option<FrameRateSummary> {
        if self.is_measuring() {
            self.disable()
        } else {
            self.enable(now);
            None
        }
    }

    /// Records one rendered frame. Returns a sample each time a window
    /// completes.
    pub fn frame(&mut self, now: Instant) -> Option<FrameRateSample> {
        let window = self.window;
        if let State::Measuring {
            window_start,
            frames,
            total_fps,
            measures,
        } = &mut self.state
        {
            *frames += 1;
            let elapsed = now.saturating_duration_since(*window_start);
            if elapsed >= window {
                let elapsed = elapsed.as_secs_f64();
                let sample = FrameRateSample {
                    frames: *frames,
                    elapsed,
                    fps: *frames as f64 / elapsed,
                };
                *total_fps += sample.fps;
                *measures += 1;
                *frames = 0;
                *window_start = now;
                return Some(sample);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Duration {
        Duration::from_millis(3500)
    }

    #[test]
    fn test_disabled_monitor_ignores_frames() {
        let mut monitor = FrameRateMonitor::new(window());
        let t0 = Instant::now();
        assert!(!monitor.is_measuring());
        assert_eq!(monitor.frame(t0 + Duration::from_secs(10)), None);
        assert_eq!(monitor.disable(), None);
    }

    #[test]
    fn test_seventy_frames_in_window() {
        let mut monitor = FrameRateMonitor::new(window());
        let t0 = Instant::now();
        assert_eq!(monitor.toggle(t0), None);
        assert!(monitor.is_measuring());

        for i in 1..70u64 {
            assert_eq!(monitor.frame(t0 + Duration::from_millis(i * 50)), None);
        }
        let sample = monitor.frame(t0 + window()).unwrap();
        assert_eq!(sample.frames, 70);
        assert_eq!(sample.elapsed, 3.5);
        assert_eq!(sample.fps, 20.0);

        let summary = monitor.toggle(t0 + window()).unwrap();
        assert_eq!(
            summary,
            FrameRateSummary {
                measures: 1,
                average_fps: Some(20.0)
            }
        );
        assert!(!monitor.is_measuring());
    }

    #[test]
    fn test_average_over_windows() {
        let mut monitor = FrameRateMonitor::new(window());
        let t0 = Instant::now();
        monitor.enable(t0);

        let mut now = t0;
        let mut samples = vec![];
        for frames in &[70u64, 35] {
            let step = window() / *frames as u32;
            for _ in 0..*frames {
                now += step;
                if let Some(sample) = monitor.frame(now) {
                    samples.push(sample);
                }
            }
        }

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].fps, 20.0);
        assert_eq!(samples[1].fps, 10.0);
        let summary = monitor.disable().unwrap();
        assert_eq!(summary.measures, 2);
        assert_eq!(summary.average_fps, Some(15.0));
    }

    #[test]
    fn test_toggle_resets_counters() {
        let mut monitor = FrameRateMonitor::new(window());
        let t0 = Instant::now();
        monitor.toggle(t0);
        for i in 1..=10u64 {
            monitor.frame(t0 + Duration::from_millis(i));
        }
        let summary = monitor.toggle(t0 + Duration::from_secs(1)).unwrap();
        assert_eq!(summary.measures, 0);
        assert_eq!(summary.average_fps, None);

        // frames counted before the restart do not leak into the new window
        let t1 = t0 + Duration::from_secs(2);
        monitor.toggle(t1);
        for i in 1..=7u64 {
            let sample = monitor.frame(t1 + Duration::from_millis(i * 500));
            if i < 7 {
                assert_eq!(sample, None);
            } else {
                assert_eq!(sample.unwrap().frames, 7);
            }
        }
    }
}
