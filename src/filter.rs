//! Rolling-average threshold filter with hysteresis.
//!
//! Each analog set-point channel gets one filter.  A fixed-size ring of raw
//! ADC samples damps sample noise; a Schmitt-trigger comparison against the
//! averaged threshold damps state chatter when a reading hovers near it.
//! The two mechanisms are independent and compose.

/// Raw ADC full scale for the set-point channels (10-bit).
///
/// The pots are calibrated against this range; the ADC unit is configured
/// for 10-bit width in `hw_init` to match.
pub const FULL_SCALE: f32 = 1023.0;

/// Default rolling-average window depth.
pub const SAMPLE_WINDOW: usize = 5;

/// Rolling-average sampler + hysteresis comparator over one analog channel.
///
/// `N` is the ring depth.  The ring starts empty and the mean is taken over
/// the samples stored so far, not the full capacity, until it first fills.
pub struct ThresholdFilter<const N: usize = 5> {
    /// Raw sample ring.  `write_pos` always points at the oldest slot, which
    /// is the next to be overwritten.
    samples: [u16; N],
    write_pos: usize,
    /// Valid sample count; saturates at `N`.
    filled: usize,
    /// Optional physical-unit mapping for the raw mean.  Absent on channels
    /// that are compared in raw ADC units.
    range: Option<(f32, f32)>,
    /// Offset subtracted from the threshold while the channel is alarmed.
    hysteresis: f32,
    /// Last comparator outcome; the hysteresis side depends on it.
    state_ok: bool,
}

impl<const N: usize> ThresholdFilter<N> {
    /// A filter that exposes only the raw sample mean from `value()`.
    pub fn new() -> Self {
        Self {
            samples: [0; N],
            write_pos: 0,
            filled: 0,
            range: None,
            hysteresis: 0.0,
            state_ok: true,
        }
    }

    /// A filter whose `value()` maps the raw mean into `[min, max]`.
    pub fn with_range(min: f32, max: f32, hysteresis: f32) -> Self {
        Self {
            range: Some((min, max)),
            hysteresis,
            ..Self::new()
        }
    }

    /// Insert one raw sample, overwriting the oldest once the ring is full.
    ///
    /// Call once per cycle per channel; skipping a cycle simply leaves the
    /// previous sample as the most recent.
    pub fn update(&mut self, raw: u16) {
        self.samples[self.write_pos] = raw;
        self.write_pos = (self.write_pos + 1) % N;
        if self.filled < N {
            self.filled += 1;
        }
    }

    /// Arithmetic mean over the stored samples.
    ///
    /// Defined as `0.0` while no sample has been taken — callers get a
    /// bottom-of-scale threshold rather than an error during the first
    /// cycles after boot.
    pub fn sample_mean(&self) -> f32 {
        if self.filled == 0 {
            return 0.0;
        }
        let sum: f32 = self.samples[..self.filled].iter().map(|&s| f32::from(s)).sum();
        sum / self.filled as f32
    }

    /// Current threshold value.
    ///
    /// With a range configured, the raw mean is mapped linearly from
    /// `[0, FULL_SCALE]` into `[min, max]` and then quantized *down* to the
    /// nearest half unit (`floor(x * 2) / 2`).  The truncating quantization
    /// is part of the calibration contract — the front-panel scale marks are
    /// printed in half units.  Without a range, the raw mean is returned
    /// unmodified.
    pub fn value(&self) -> f32 {
        let mean = self.sample_mean();
        match self.range {
            Some((min, max)) => {
                let scaled = min + (mean / FULL_SCALE) * (max - min);
                (scaled * 2.0).floor() / 2.0
            }
            None => mean,
        }
    }

    /// Compare a live physical reading against the threshold.
    ///
    /// Schmitt trigger: while the state is OK the reading is compared
    /// against `value()` directly; once alarmed, it must drop below
    /// `value() - hysteresis` to re-arm.  The outcome is persisted and
    /// returned (`true` = below threshold, OK).
    pub fn compare(&mut self, reading: f32) -> bool {
        self.state_ok = if self.state_ok {
            reading < self.value()
        } else {
            reading < self.value() - self.hysteresis
        };
        self.state_ok
    }

    /// Last comparator outcome without re-evaluating.
    pub fn state_ok(&self) -> bool {
        self.state_ok
    }
}

impl<const N: usize> Default for ThresholdFilter<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_is_zero_before_first_sample() {
        let f: ThresholdFilter = ThresholdFilter::new();
        assert_eq!(f.sample_mean(), 0.0);
        assert_eq!(f.value(), 0.0);
    }

    #[test]
    fn mean_covers_only_stored_samples_while_filling() {
        let mut f: ThresholdFilter = ThresholdFilter::new();
        f.update(100);
        assert_eq!(f.sample_mean(), 100.0);
        f.update(300);
        assert_eq!(f.sample_mean(), 200.0);
    }

    #[test]
    fn ring_overwrites_oldest_when_full() {
        let mut f: ThresholdFilter<3> = ThresholdFilter::new();
        for raw in [10, 20, 30] {
            f.update(raw);
        }
        assert_eq!(f.sample_mean(), 20.0);

        // Fourth sample evicts the 10.
        f.update(40);
        assert_eq!(f.sample_mean(), 30.0);
    }

    #[test]
    fn mean_tracks_most_recent_window_after_many_updates() {
        let mut f: ThresholdFilter = ThresholdFilter::new();
        for raw in 0..100u16 {
            f.update(raw);
        }
        // Last five samples are 95..=99.
        assert_eq!(f.sample_mean(), 97.0);
    }

    #[test]
    fn value_maps_and_quantizes_down() {
        let mut f: ThresholdFilter = ThresholdFilter::with_range(0.0, 100.0, 1.0);
        for raw in [100, 200, 300, 400, 500] {
            f.update(raw);
        }
        assert_eq!(f.sample_mean(), 300.0);
        // 300 / 1023 * 100 = 29.32.. -> floor(58.65..) / 2 = 29.0
        assert_eq!(f.value(), 29.0);
    }

    #[test]
    fn value_without_range_is_raw_mean() {
        let mut f: ThresholdFilter = ThresholdFilter::new();
        f.update(511);
        assert_eq!(f.value(), 511.0);
    }

    #[test]
    fn value_is_monotone_in_the_mean() {
        let mut prev = f32::MIN;
        for raw in (0..=1023u16).step_by(7) {
            let mut f: ThresholdFilter<1> = ThresholdFilter::with_range(0.0, 100.0, 0.0);
            f.update(raw);
            let v = f.value();
            assert!(v >= prev, "value() went down at raw={raw}");
            prev = v;
        }
    }

    #[test]
    fn compare_trips_above_threshold() {
        let mut f: ThresholdFilter = ThresholdFilter::with_range(0.0, 100.0, 2.0);
        for _ in 0..5 {
            f.update(512); // threshold ~= 50.0
        }
        assert!(f.compare(40.0));
        assert!(!f.compare(55.0));
    }

    #[test]
    fn compare_holds_alarm_inside_hysteresis_band() {
        let mut f: ThresholdFilter = ThresholdFilter::with_range(0.0, 100.0, 2.0);
        for _ in 0..5 {
            f.update(512);
        }
        let threshold = f.value();

        assert!(!f.compare(threshold + 1.0), "should trip above threshold");
        // Below threshold but inside the hysteresis band: stays alarmed.
        assert!(!f.compare(threshold - 1.0));
        // Below threshold - hysteresis: re-arms.
        assert!(f.compare(threshold - 3.0));
        // And a plain comparison applies again afterwards.
        assert!(!f.compare(threshold + 0.5));
    }

    #[test]
    fn zero_hysteresis_degenerates_to_plain_comparator() {
        let mut f: ThresholdFilter = ThresholdFilter::with_range(0.0, 100.0, 0.0);
        for _ in 0..5 {
            f.update(512);
        }
        let threshold = f.value();
        assert!(!f.compare(threshold + 0.5));
        assert!(f.compare(threshold - 0.5));
        assert!(!f.compare(threshold + 0.5));
    }
}
