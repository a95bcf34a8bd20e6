// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-channel statistics over pixel samples.

use retusche_core::Rgb;

/// Per-channel mean, truncated towards zero. `None` for an empty sample.
pub(crate) fn channel_mean(samples: &[[u8; 3]]) -> Option<Rgb> {
    if samples.is_empty() {
        return None;
    }
    let mut sums = [0u64; 3];
    for px in samples {
        for (sum, &c) in sums.iter_mut().zip(px) {
            *sum += u64::from(c);
        }
    }
    let n = samples.len() as u64;
    Some(Rgb::from(sums.map(|s| (s / n) as u8)))
}

/// Per-channel median. For an even count the two middle values are
/// averaged and truncated. `None` for an empty sample.
pub(crate) fn channel_median(samples: &[[u8; 3]]) -> Option<Rgb> {
    if samples.is_empty() {
        return None;
    }
    let mut out = [0u8; 3];
    let mut channel: Vec<u8> = Vec::with_capacity(samples.len());
    for (c, slot) in out.iter_mut().enumerate() {
        channel.clear();
        channel.extend(samples.iter().map(|px| px[c]));
        channel.sort_unstable();
        let mid = channel.len() / 2;
        *slot = if channel.len() % 2 == 1 {
            channel[mid]
        } else {
            ((u16::from(channel[mid - 1]) + u16::from(channel[mid])) / 2) as u8
        };
    }
    Some(Rgb::from(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_truncates() {
        let samples = [[0, 10, 255], [1, 11, 254]];
        assert_eq!(channel_mean(&samples), Some(Rgb::new(0, 10, 254)));
    }

    #[test]
    fn median_ignores_outlier() {
        let samples = [[200, 200, 200], [200, 200, 200], [0, 0, 0], [201, 199, 200], [200, 200, 200]];
        assert_eq!(channel_median(&samples), Some(Rgb::new(200, 200, 200)));
    }

    #[test]
    fn median_of_even_count_averages_middle_pair() {
        let samples = [[10, 0, 0], [20, 0, 0], [31, 0, 0], [40, 0, 0]];
        assert_eq!(channel_median(&samples), Some(Rgb::new(25, 0, 0)));
    }

    #[test]
    fn empty_sample_has_no_statistic() {
        assert_eq!(channel_mean(&[]), None);
        assert_eq!(channel_median(&[]), None);
    }
}
