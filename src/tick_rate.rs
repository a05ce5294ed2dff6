use std::time::{Duration, Instant};

/// Counts ticks and reports how many landed in each elapsed one-second window.
#[derive(Debug, Clone, Default)]
pub struct TickRateMeter {
    window_start: Option<Instant>,
    ticks_in_window: u32,
    last_rate: Option<u32>,
}

const WINDOW: Duration = Duration::from_secs(1);

impl TickRateMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a tick now. Returns the completed window's rate when one closes.
    pub fn record(&mut self) -> Option<u32> {
        self.record_at(Instant::now())
    }

    pub fn record_at(&mut self, now: Instant) -> Option<u32> {
        let start = *self.window_start.get_or_insert(now);
        self.ticks_in_window += 1;

        if now.saturating_duration_since(start) >= WINDOW {
            let rate = self.ticks_in_window;
            self.last_rate = Some(rate);
            self.ticks_in_window = 0;
            self.window_start = Some(now);
            Some(rate)
        } else {
            None
        }
    }

    /// Rate of the most recently closed window.
    pub fn ticks_per_second(&self) -> Option<u32> {
        self.last_rate
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_second() {
        let mut meter = TickRateMeter::new();
        let start = Instant::now();
        let mut reports = Vec::new();
        for i in 0..=100u64 {
            if let Some(rate) = meter.record_at(start + Duration::from_millis(i * 20)) {
                reports.push(rate);
            }
        }
        // Windows close at 1000 ms and 2000 ms.
        assert_eq!(reports, vec![51, 50]);
        assert_eq!(meter.ticks_per_second(), Some(50));
    }

    #[test]
    fn silent_until_first_window_closes() {
        let mut meter = TickRateMeter::new();
        let start = Instant::now();
        assert_eq!(meter.record_at(start), None);
        assert_eq!(meter.record_at(start + Duration::from_millis(999)), None);
        assert_eq!(meter.ticks_per_second(), None);
        meter.reset();
        assert_eq!(meter.ticks_per_second(), None);
    }
}
