// Series processor - Smoothing, resampling and display range
use super::graph_style::{GraphStyle, SmoothingKernel};
use super::telemetry::{ProcessedSeries, RawSample};

const SECOND_PASS_WINDOW: usize = 5;
const RANGE_BUFFER_RATIO: f64 = 0.2;
const MIN_RANGE_BUFFER: f64 = 1.0;

/// Turn raw samples into a fixed-size, smoothed series. Returns `None` for
/// empty input so the caller can keep whatever it displayed before.
pub fn process(samples: &[RawSample], style: &GraphStyle) -> Option<ProcessedSeries> {
    if samples.is_empty() {
        return None;
    }

    let raw: Vec<f64> = samples.iter().map(|s| s.value).collect();
    let mut smoothed = smooth(&raw, style.smoothing_window, style.smoothing_kernel);
    if style.double_smoothing {
        smoothed = smooth(&smoothed, SECOND_PASS_WINDOW, SmoothingKernel::Uniform);
    }

    let values = resample(&smoothed, style.points);
    let (range_min, range_max) = display_range(&values)?;
    Some(ProcessedSeries::new(values, range_min, range_max))
}

/// Symmetric weighted moving average. Edge positions use a truncated window
/// normalized by the weights actually used. Series no longer than the window
/// are returned unchanged.
pub fn smooth(values: &[f64], window: usize, kernel: SmoothingKernel) -> Vec<f64> {
    if values.len() <= window {
        return values.to_vec();
    }

    let half = window / 2;
    let spread = window as f64 / 2.0;
    let last = values.len() - 1;

    (0..values.len())
        .map(|i| {
            let support = &values[i.saturating_sub(half)..=(i + half).min(last)];
            let offset = i.saturating_sub(half);
            let (mut sum, mut total_weight) = (0.0, 0.0);
            let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
            for (k, &v) in support.iter().enumerate() {
                let weight = kernel_weight(kernel, i.abs_diff(offset + k), spread);
                sum += v * weight;
                total_weight += weight;
                lo = lo.min(v);
                hi = hi.max(v);
            }
            // Rounding must not push the average outside its own support.
            (sum / total_weight).clamp(lo, hi)
        })
        .collect()
}

fn kernel_weight(kernel: SmoothingKernel, distance: usize, spread: f64) -> f64 {
    if distance == 0 {
        return 1.0;
    }
    match kernel {
        SmoothingKernel::Uniform => 1.0,
        SmoothingKernel::Gaussian => {
            let d = distance as f64;
            (-(d * d) / spread).exp()
        }
    }
}

/// Uniform-stride downsampling to `target` points. The newest value always
/// ends the output.
pub fn resample(values: &[f64], target: usize) -> Vec<f64> {
    let len = values.len();
    if len <= target {
        return values.to_vec();
    }

    let mut out: Vec<f64> = (0..target).map(|i| values[i * len / target]).collect();
    if let (Some(tail), Some(&newest)) = (out.last_mut(), values.last()) {
        *tail = newest;
    }
    out
}

/// Whole-number bounds with headroom above and below the data. The span is
/// never zero, even for a flat series.
pub fn display_range(values: &[f64]) -> Option<(f64, f64)> {
    let (min, max) = values.iter().fold(None, |acc: Option<(f64, f64)>, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;

    let buffer = ((max - min) * RANGE_BUFFER_RATIO).max(MIN_RANGE_BUFFER);
    Some(((min - buffer).floor(), (max + buffer).ceil()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn samples(values: &[f64]) -> Vec<RawSample> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let ts = Utc.timestamp_opt(1_700_000_000 + i as i64 * 60, 0).unwrap();
                RawSample::new(ts, v)
            })
            .collect()
    }

    fn style(points: usize, window: usize) -> GraphStyle {
        GraphStyle {
            points,
            smoothing_window: window,
            ..GraphStyle::default()
        }
    }

    #[test]
    fn test_smoothing_preserves_length() {
        let values: Vec<f64> = (0..37).map(|i| (i as f64 * 0.7).sin() * 3.0 + 20.0).collect();
        for window in [1, 3, 5, 7, 9, 36, 40] {
            for kernel in [SmoothingKernel::Uniform, SmoothingKernel::Gaussian] {
                assert_eq!(smooth(&values, window, kernel).len(), values.len());
            }
        }
    }

    #[test]
    fn test_short_series_skips_smoothing() {
        let values = [21.0, 25.0, 19.0];
        assert_eq!(smooth(&values, 3, SmoothingKernel::Gaussian), values.to_vec());
        assert_eq!(smooth(&values, 7, SmoothingKernel::Uniform), values.to_vec());
    }

    #[test]
    fn test_uniform_edges_use_truncated_window() {
        let smoothed = smooth(&[0.0, 3.0, 6.0, 9.0], 3, SmoothingKernel::Uniform);
        assert_eq!(smoothed, vec![1.5, 3.0, 6.0, 7.5]);
    }

    #[test]
    fn test_alternating_series_is_pulled_inward() {
        let smoothed = smooth(&[10.0, 20.0, 10.0, 20.0, 10.0], 3, SmoothingKernel::Gaussian);
        assert_eq!(smoothed.len(), 5);
        for v in &smoothed[1..4] {
            assert!(*v > 10.0 && *v < 20.0, "interior value {v} not strictly inside");
        }
        for v in [smoothed[0], smoothed[4]] {
            assert!((10.0..=20.0).contains(&v), "edge value {v} out of bounds");
        }
    }

    #[test]
    fn test_resample_bounds() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();

        let out = resample(&values, 30);
        assert_eq!(out.len(), 30);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 3.0);
        assert_eq!(*out.last().unwrap(), 99.0);

        assert_eq!(resample(&values, 100), values);
        assert_eq!(resample(&values[..12], 50).len(), 12);
    }

    #[test]
    fn test_resample_keeps_newest_reading() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let out = resample(&values, 3);
        assert_eq!(out, vec![1.0, 3.0, 7.0]);
    }

    #[test]
    fn test_range_invariant() {
        let cases: [&[f64]; 5] = [
            &[18.0],
            &[-4.2, -3.9, -5.1],
            &[19.5, 22.25, 21.0, 20.75],
            &[0.0, 100.0],
            &[1e-3, 2e-3],
        ];
        for values in cases {
            let (lo, hi) = display_range(values).unwrap();
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert!(hi - lo >= 1.0);
            assert!(lo <= min && max <= hi);
            assert_eq!(lo, lo.floor());
            assert_eq!(hi, hi.ceil());
        }
        assert_eq!(display_range(&[]), None);
    }

    #[test]
    fn test_wide_range_uses_proportional_buffer() {
        // buffer = 100 * 0.2 = 20
        assert_eq!(display_range(&[0.0, 100.0]), Some((-20.0, 120.0)));
    }

    #[test]
    fn test_flat_series_gets_two_degree_span() {
        let series = process(&samples(&[18.0; 10]), &GraphStyle::default()).unwrap();
        assert_eq!(series.range_min, 17.0);
        assert_eq!(series.range_max, 19.0);
        assert_eq!(series.span(), 2.0);
    }

    #[test]
    fn test_few_samples_keep_their_count() {
        let series = process(&samples(&[20.0, 21.0, 22.0]), &style(50, 7)).unwrap();
        assert_eq!(series.values, vec![20.0, 21.0, 22.0]);
    }

    #[test]
    fn test_process_downsamples_to_target() {
        let values: Vec<f64> = (0..240).map(|i| 20.0 + (i as f64 / 20.0).cos()).collect();
        let series = process(&samples(&values), &style(40, 7)).unwrap();
        assert_eq!(series.values.len(), 40);
        assert!(series.range_max > series.range_min);
    }

    #[test]
    fn test_double_smoothing_flattens_spike() {
        let mut values = vec![20.0; 30];
        values[15] = 30.0;
        let single = process(&samples(&values), &style(50, 3)).unwrap();
        let double = process(
            &samples(&values),
            &GraphStyle {
                double_smoothing: true,
                ..style(50, 3)
            },
        )
        .unwrap();
        let peak = |s: &ProcessedSeries| s.values.iter().cloned().fold(f64::MIN, f64::max);
        assert!(peak(&double) < peak(&single));
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert_eq!(process(&[], &GraphStyle::default()), None);
    }
}
