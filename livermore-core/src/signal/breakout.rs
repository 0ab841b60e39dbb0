//! Strong-breakout rule.
//!
//! Evaluated on the most recent bar of a series. Three conditions must hold:
//!
//! 1. **Breakout**: close above the highest high of the `lookback_days`
//!    bars before today (today excluded).
//! 2. **Above all averages**: close above every configured SMA of close.
//! 3. **Up streak**: at least `min_up_streak` consecutive up-days ending
//!    today, counted backward until the first flat or down session.
//!
//! When all hold the stop is the higher of today's low and a fixed fraction
//! of entry, so the position never risks more than `1 - money_stop_ratio`.

use serde::Serialize;

use crate::domain::{Bar, PriceSeries};
use crate::indicators::{HighestHigh, Indicator, IndicatorValues, Sma};

/// Moving-average windows the close must clear.
pub const DEFAULT_MA_PERIODS: [usize; 4] = [5, 10, 20, 60];

/// Rule parameters. Fields are private so every window is checked once at
/// construction and `inspect` can rely on non-zero periods.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakoutRule {
    lookback_days: usize,
    ma_periods: Vec<usize>,
    money_stop_ratio: f64,
    min_up_streak: usize,
}

impl Default for BreakoutRule {
    fn default() -> Self {
        Self::new(60)
    }
}

/// Every intermediate value of one evaluation, for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inspection {
    pub bar_count: usize,
    pub close: f64,
    pub low: f64,
    pub prior_high: f64,
    /// `(period, value)`; NaN when the series is shorter than the period.
    pub averages: Vec<(usize, f64)>,
    pub up_streak: usize,
    pub is_breakout: bool,
    pub is_above_averages: bool,
    pub has_up_streak: bool,
}

impl Inspection {
    pub fn passed(&self) -> bool {
        self.is_breakout && self.is_above_averages && self.has_up_streak
    }
}

/// Price levels of a qualifying breakout. Full precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakout {
    pub entry_price: f64,
    pub prior_high: f64,
    pub up_streak: usize,
    pub technical_stop: f64,
    pub money_stop: f64,
    pub stop_loss: f64,
}

impl BreakoutRule {
    pub fn new(lookback_days: usize) -> Self {
        assert!(lookback_days >= 1, "lookback must be >= 1");
        Self {
            lookback_days,
            ma_periods: DEFAULT_MA_PERIODS.to_vec(),
            money_stop_ratio: 0.90,
            min_up_streak: 2,
        }
    }

    /// Replace the moving-average windows.
    pub fn with_ma_periods(mut self, periods: Vec<usize>) -> Self {
        assert!(periods.iter().all(|&p| p >= 1), "ma periods must be >= 1");
        self.ma_periods = periods;
        self
    }

    pub fn lookback_days(&self) -> usize {
        self.lookback_days
    }

    pub fn ma_periods(&self) -> &[usize] {
        &self.ma_periods
    }

    pub fn money_stop_ratio(&self) -> f64 {
        self.money_stop_ratio
    }

    pub fn min_up_streak(&self) -> usize {
        self.min_up_streak
    }

    /// Bars required before evaluation is attempted.
    pub fn min_bars(&self) -> usize {
        self.lookback_days + 2
    }

    /// Compute every condition on the last bar, or `None` for short history.
    pub fn inspect(&self, series: &PriceSeries) -> Option<Inspection> {
        let bars = series.bars();
        if bars.len() < self.min_bars() {
            return None;
        }
        let today = series.last()?;
        let today_index = bars.len() - 1;

        let smas: Vec<Sma> = self.ma_periods.iter().map(|&p| Sma::new(p)).collect();
        let prior_high_indicator = HighestHigh::new(self.lookback_days);
        let mut indicators: Vec<&dyn Indicator> = smas.iter().map(|s| s as &dyn Indicator).collect();
        indicators.push(&prior_high_indicator);
        let values = IndicatorValues::compute_all(&indicators, bars);

        // Window ending yesterday.
        let prior_high = values
            .get(prior_high_indicator.name(), today_index - 1)
            .unwrap_or(f64::NAN);
        let averages: Vec<(usize, f64)> = smas
            .iter()
            .map(|sma| {
                let value = values.get(sma.name(), today_index).unwrap_or(f64::NAN);
                (sma.period(), value)
            })
            .collect();
        let up_streak = consecutive_up_days(bars);

        // Comparisons against NaN are false, so undefined levels fail closed.
        Some(Inspection {
            bar_count: bars.len(),
            close: today.close,
            low: today.low,
            prior_high,
            is_breakout: today.close > prior_high,
            is_above_averages: averages.iter().all(|&(_, avg)| today.close > avg),
            has_up_streak: up_streak >= self.min_up_streak,
            averages,
            up_streak,
        })
    }

    pub fn detect(&self, series: &PriceSeries) -> Option<Breakout> {
        let inspection = self.inspect(series)?;
        if !inspection.passed() {
            return None;
        }
        Some(self.levels(&inspection))
    }

    fn levels(&self, inspection: &Inspection) -> Breakout {
        let entry_price = inspection.close;
        let technical_stop = inspection.low;
        let money_stop = entry_price * self.money_stop_ratio;
        Breakout {
            entry_price,
            prior_high: inspection.prior_high,
            up_streak: inspection.up_streak,
            technical_stop,
            money_stop,
            stop_loss: technical_stop.max(money_stop),
        }
    }
}

/// Up-days ending at the most recent bar. Not bounded by any window.
pub fn consecutive_up_days(bars: &[Bar]) -> usize {
    let mut count = 0;
    for bar in bars.iter().rev() {
        if !bar.is_up_day() {
            break;
        }
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(i: usize, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    /// Up-days with open = close - 1, low = close - 2.
    fn up_series(closes: &[f64], highs: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .zip(highs)
            .enumerate()
            .map(|(i, (&c, &h))| bar(i, c - 1.0, h, c - 2.0, c))
            .collect();
        PriceSeries::new("TEST", bars).unwrap()
    }

    #[test]
    fn streak_counts_until_first_non_up_day() {
        let bars = vec![
            bar(0, 10.0, 11.0, 9.0, 10.5),
            bar(1, 10.5, 11.0, 9.0, 10.0), // down
            bar(2, 10.0, 11.0, 9.0, 10.2),
            bar(3, 10.2, 11.0, 9.0, 10.4),
            bar(4, 10.4, 11.0, 9.0, 10.6),
        ];
        assert_eq!(consecutive_up_days(&bars), 3);
    }

    #[test]
    fn flat_day_breaks_streak() {
        let bars = vec![
            bar(0, 10.0, 11.0, 9.0, 10.5),
            bar(1, 10.0, 11.0, 9.0, 10.0), // flat
            bar(2, 10.0, 11.0, 9.0, 10.2),
        ];
        assert_eq!(consecutive_up_days(&bars), 1);
    }

    #[test]
    fn streak_of_empty_series_is_zero() {
        assert_eq!(consecutive_up_days(&[]), 0);
    }

    #[test]
    fn prior_high_excludes_today_and_respects_window() {
        // 64 bars; the very first high (500) is outside the 60-bar window.
        let mut closes = vec![100.0; 62];
        closes.extend([115.0, 120.0]);
        let mut highs = vec![110.0; 62];
        highs[0] = 500.0;
        highs.extend([116.0, 121.0]);
        let series = up_series(&closes, &highs);
        let inspection = BreakoutRule::new(60).inspect(&series).unwrap();
        assert_eq!(inspection.prior_high, 116.0);
        assert!(inspection.is_breakout);
    }

    #[test]
    fn short_series_is_not_inspected() {
        let series = up_series(&[100.0; 61], &[101.0; 61]);
        assert!(BreakoutRule::new(60).inspect(&series).is_none());
        let series = up_series(&[100.0; 62], &[101.0; 62]);
        assert!(BreakoutRule::new(60).inspect(&series).is_some());
    }

    #[test]
    fn undefined_average_fails_closed() {
        // 12 bars clears lookback 10 but not the 60-day average.
        let mut closes: Vec<f64> = (0..11).map(|i| 100.0 + i as f64).collect();
        closes.push(130.0);
        let highs: Vec<f64> = closes.iter().map(|c| c + 0.5).collect();
        let series = up_series(&closes, &highs);
        let inspection = BreakoutRule::new(10).inspect(&series).unwrap();
        assert!(inspection.is_breakout);
        assert!(inspection.averages.iter().any(|&(p, v)| p == 60 && v.is_nan()));
        assert!(!inspection.is_above_averages);
        assert!(BreakoutRule::new(10).detect(&series).is_none());
    }

    #[test]
    fn money_stop_wins_when_low_is_far() {
        let mut closes = vec![100.0; 68];
        closes.extend([115.0, 120.0]);
        let mut highs = vec![110.0; 68];
        highs.extend([116.0, 121.0]);
        let mut series_bars = up_series(&closes, &highs).bars().to_vec();
        // Wide-range day: low far below entry.
        series_bars[69].low = 90.0;
        let series = PriceSeries::new("TEST", series_bars).unwrap();
        let b = BreakoutRule::new(60).detect(&series).unwrap();
        assert_eq!(b.technical_stop, 90.0);
        assert_eq!(b.money_stop, 120.0 * 0.90);
        assert_eq!(b.stop_loss, 120.0 * 0.90);
    }

    #[test]
    fn single_up_day_fails_streak() {
        let mut closes = vec![100.0; 68];
        closes.extend([115.0, 120.0]);
        let mut highs = vec![110.0; 68];
        highs.extend([116.0, 121.0]);
        let mut bars = up_series(&closes, &highs).bars().to_vec();
        bars[68].open = 116.0; // down day right before today
        let series = PriceSeries::new("TEST", bars).unwrap();
        let inspection = BreakoutRule::new(60).inspect(&series).unwrap();
        assert_eq!(inspection.up_streak, 1);
        assert!(!inspection.has_up_streak);
        assert!(BreakoutRule::new(60).detect(&series).is_none());
    }

    #[test]
    fn missing_high_inside_window_is_ignored() {
        let mut closes = vec![100.0; 68];
        closes.extend([115.0, 120.0]);
        let mut highs = vec![110.0; 68];
        highs.extend([116.0, 121.0]);
        let mut bars = up_series(&closes, &highs).bars().to_vec();
        bars[60].high = f64::NAN;
        let series = PriceSeries::new("TEST", bars).unwrap();
        let rule = BreakoutRule::new(60);
        assert_eq!(rule.inspect(&series).unwrap().prior_high, 116.0);
        assert!(rule.detect(&series).is_some());
    }

    #[test]
    #[should_panic(expected = "lookback must be >= 1")]
    fn zero_lookback_is_rejected() {
        let _ = BreakoutRule::new(0);
    }

    #[test]
    #[should_panic(expected = "ma periods must be >= 1")]
    fn zero_average_period_is_rejected() {
        let _ = BreakoutRule::new(10).with_ma_periods(vec![5, 0]);
    }

    #[test]
    fn custom_periods_drop_the_long_average() {
        // Same 12-bar series that fails the default 60-day average.
        let mut closes: Vec<f64> = (0..11).map(|i| 100.0 + i as f64).collect();
        closes.push(130.0);
        let highs: Vec<f64> = closes.iter().map(|c| c + 0.5).collect();
        let series = up_series(&closes, &highs);
        let rule = BreakoutRule::new(10).with_ma_periods(vec![5, 10]);
        assert_eq!(rule.ma_periods(), &[5, 10]);
        assert_eq!(rule.lookback_days(), 10);
        assert_eq!(rule.min_up_streak(), 2);
        assert_eq!(rule.money_stop_ratio(), 0.90);
        let b = rule.detect(&series).unwrap();
        assert_eq!(b.entry_price, 130.0);
        assert_eq!(b.prior_high, 110.5);
    }
}
