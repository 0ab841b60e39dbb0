//! End-to-end evaluation of single instruments through a mock provider.

use chrono::NaiveDate;
use livermore_core::data::{DataError, DataProvider, DataSource, FetchResult};
use livermore_core::domain::{Bar, Instrument, PriceSeries, Venue};
use livermore_core::signal::{BreakoutRule, EvaluationOutcome, SignalEvaluator};
use livermore_core::universe::{
    CommodityTable, ListingDirectory, MetadataResolver, COMMODITY_CATEGORY, OTHER_CATEGORY,
};
use std::sync::atomic::{AtomicUsize, Ordering};

// ── Helpers ──────────────────────────────────────────────────────────

fn date(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
}

/// open = close - 1, low = close - 2, so every bar is an up-day.
fn bars_from(closes: &[f64], highs: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .zip(highs)
        .enumerate()
        .map(|(i, (&close, &high))| Bar {
            date: date(i),
            open: close - 1.0,
            high,
            low: close - 2.0,
            close,
            volume: 1_000,
        })
        .collect()
}

/// 68 quiet sessions at 100 under a 110 ceiling, then two thrusts.
fn breakout_bars() -> Vec<Bar> {
    let mut closes = vec![100.0; 68];
    closes.extend([115.0, 120.0]);
    let mut highs = vec![110.0; 68];
    highs.extend([116.0, 121.0]);
    bars_from(&closes, &highs)
}

fn series(symbol: &str, bars: Vec<Bar>) -> PriceSeries {
    PriceSeries::new(symbol, bars).unwrap()
}

fn listing() -> ListingDirectory {
    let csv = "\
type,code,name,ISIN,start,market,group,CFI
股票,2330,台積電,TW0002330008,1994/09/05,上市,半導體業,ESVUFR
股票,6488,環球晶,TW0006488000,2015/09/25,上櫃,半導體業,ESVUFR
ETF,0050,元大台灣50,TW0000050004,2003/06/30,上市,,CEOGEU
";
    ListingDirectory::from_reader(csv.as_bytes()).unwrap()
}

fn evaluator() -> SignalEvaluator {
    let resolver = MetadataResolver::new()
        .with_source(CommodityTable::default_futures())
        .with_source(listing());
    SignalEvaluator::new(BreakoutRule::new(60), resolver)
}

struct FixedProvider {
    bars: Vec<Bar>,
    calls: AtomicUsize,
}

impl FixedProvider {
    fn new(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            calls: AtomicUsize::new(0),
        }
    }
}

impl DataProvider for FixedProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    fn fetch(&self, symbol: &str, _: NaiveDate, _: NaiveDate) -> Result<FetchResult, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars: self.bars.clone(),
            source: DataSource::Synthetic,
        })
    }
}

struct FailingProvider;

impl DataProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    fn fetch(&self, symbol: &str, _: NaiveDate, _: NaiveDate) -> Result<FetchResult, DataError> {
        Err(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        })
    }
}

// ── Breakout detection ───────────────────────────────────────────────

#[test]
fn classic_breakout_produces_expected_levels() {
    let instrument = Instrument::from_symbol("2330.TW");
    let result = evaluator()
        .evaluate(&instrument, &series("2330.TW", breakout_bars()))
        .expect("should qualify");

    assert_eq!(result.symbol, "2330");
    assert_eq!(result.name, "台積電");
    assert_eq!(result.category, "半導體業");
    assert_eq!(result.price, 120.0);
    assert_eq!(result.prior_high, 116.0);
    assert_eq!(result.up_streak, 70);
    // low 118 beats the 108 money stop
    assert_eq!(result.stop_loss, 118.0);
}

#[test]
fn result_fields_satisfy_breakout_invariants() {
    let instrument = Instrument::from_symbol("2330.TW");
    let rule = BreakoutRule::new(60);
    let s = series("2330.TW", breakout_bars());
    let result = evaluator().evaluate(&instrument, &s).unwrap();
    let inspection = rule.inspect(&s).unwrap();

    assert!(result.price > result.prior_high);
    assert!(result.up_streak >= 2);
    for (period, avg) in inspection.averages {
        assert!(result.price > avg, "close not above SMA{period}");
    }
    let last = s.last().unwrap();
    assert_eq!(result.stop_loss, last.low.max(result.price * 0.90));
}

#[test]
fn close_equal_to_prior_high_is_not_a_breakout() {
    let mut closes = vec![100.0; 68];
    closes.extend([115.0, 116.0]);
    let mut highs = vec![110.0; 68];
    highs.extend([116.0, 117.0]);
    let s = series("2330.TW", bars_from(&closes, &highs));

    let inspection = BreakoutRule::new(60).inspect(&s).unwrap();
    assert_eq!(inspection.prior_high, 116.0);
    assert!(!inspection.is_breakout);
    assert!(evaluator().evaluate(&Instrument::from_symbol("2330.TW"), &s).is_none());
}

#[test]
fn today_high_does_not_count_toward_prior_high() {
    // Today's 500 high must not raise the bar it is compared against.
    let mut bars = breakout_bars();
    bars[69].high = 500.0;
    let inspection = BreakoutRule::new(60)
        .inspect(&series("2330.TW", bars))
        .unwrap();
    assert_eq!(inspection.prior_high, 116.0);
    assert!(inspection.is_breakout);
}

#[test]
fn down_day_today_breaks_streak() {
    let mut bars = breakout_bars();
    bars[69].open = 120.5;
    let s = series("2330.TW", bars);
    let inspection = BreakoutRule::new(60).inspect(&s).unwrap();
    assert_eq!(inspection.up_streak, 0);
    assert!(evaluator().evaluate(&Instrument::from_symbol("2330.TW"), &s).is_none());
}

#[test]
fn close_below_fast_average_disqualifies() {
    // A crash then a small rebound: new high not reached, SMA5 above close.
    let mut closes = vec![100.0; 60];
    closes.extend([200.0, 200.0, 200.0, 200.0, 200.0, 200.0, 200.0, 200.0, 150.0, 160.0]);
    let mut highs = vec![110.0; 60];
    highs.extend([201.0; 8]);
    highs.extend([151.0, 161.0]);
    let inspection = BreakoutRule::new(60)
        .inspect(&series("X.TW", bars_from(&closes, &highs)))
        .unwrap();
    assert!(!inspection.is_above_averages);
    assert!(!inspection.passed());
}

#[test]
fn strictly_declining_series_never_qualifies() {
    let closes: Vec<f64> = (0..80).map(|i| 200.0 - i as f64).collect();
    let highs: Vec<f64> = closes.iter().map(|c| c + 0.5).collect();
    let s = series("2317.TW", bars_from(&closes, &highs));
    let inspection = BreakoutRule::new(60).inspect(&s).unwrap();
    assert!(!inspection.is_breakout);
    assert!(!inspection.is_above_averages);
    assert!(evaluator().evaluate(&Instrument::from_symbol("2317.TW"), &s).is_none());
}

// ── Metadata ─────────────────────────────────────────────────────────

#[test]
fn commodity_keeps_full_symbol_and_truncates_name() {
    let result = evaluator()
        .evaluate(&Instrument::commodity("CL=F"), &series("CL=F", breakout_bars()))
        .unwrap();
    assert_eq!(result.symbol, "CL=F");
    assert_eq!(result.name, "Crude Oi..");
    assert_eq!(result.category, COMMODITY_CATEGORY);
}

#[test]
fn otc_equity_strips_two_suffix() {
    let result = evaluator()
        .evaluate(
            &Instrument::equity("6488", Venue::OverTheCounter),
            &series("6488.TWO", breakout_bars()),
        )
        .unwrap();
    assert_eq!(result.symbol, "6488");
    assert_eq!(result.name, "環球晶");
}

#[test]
fn empty_group_falls_back_to_other_category() {
    let result = evaluator()
        .evaluate(&Instrument::from_symbol("0050.TW"), &series("0050.TW", breakout_bars()))
        .unwrap();
    assert_eq!(result.category, OTHER_CATEGORY);
}

#[test]
fn unknown_symbol_uses_raw_symbol_as_name() {
    let result = evaluator()
        .evaluate(&Instrument::from_symbol("9999.TW"), &series("9999.TW", breakout_bars()))
        .unwrap();
    assert_eq!(result.symbol, "9999");
    assert_eq!(result.name, "9999.TW");
    assert_eq!(result.category, OTHER_CATEGORY);
}

// ── scan_symbol boundary ─────────────────────────────────────────────

#[test]
fn scan_symbol_matches_through_provider() {
    let provider = FixedProvider::new(breakout_bars());
    let outcome = evaluator().scan_symbol(
        &provider,
        &Instrument::from_symbol("2330.TW"),
        date(0),
        date(200),
    );
    assert!(matches!(outcome, EvaluationOutcome::Match(ref r) if r.symbol == "2330"));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn scan_symbol_reports_short_history() {
    let provider = FixedProvider::new(breakout_bars()[..61].to_vec());
    let outcome = evaluator().scan_symbol(
        &provider,
        &Instrument::from_symbol("2330.TW"),
        date(0),
        date(200),
    );
    assert!(matches!(
        outcome,
        EvaluationOutcome::InsufficientData {
            bars: 61,
            required: 62
        }
    ));
}

#[test]
fn scan_symbol_drops_void_bars_before_counting() {
    let mut bars = breakout_bars();
    bars.insert(
        30,
        Bar {
            date: date(30),
            open: f64::NAN,
            high: f64::NAN,
            low: f64::NAN,
            close: f64::NAN,
            volume: 0,
        },
    );
    let provider = FixedProvider::new(bars);
    let outcome = evaluator().scan_symbol(
        &provider,
        &Instrument::from_symbol("2330.TW"),
        date(0),
        date(200),
    );
    assert!(matches!(outcome, EvaluationOutcome::Match(_)));
}

#[test]
fn scan_symbol_contains_fetch_errors() {
    let outcome = evaluator().scan_symbol(
        &FailingProvider,
        &Instrument::from_symbol("2330.TW"),
        date(0),
        date(200),
    );
    assert!(matches!(
        outcome,
        EvaluationOutcome::Failed(DataError::SymbolNotFound { .. })
    ));
}

#[test]
fn scan_symbol_contains_out_of_order_bars() {
    let mut bars = breakout_bars();
    bars.swap(10, 11);
    let outcome = evaluator().scan_symbol(
        &FixedProvider::new(bars),
        &Instrument::from_symbol("2330.TW"),
        date(0),
        date(200),
    );
    assert!(matches!(outcome, EvaluationOutcome::Failed(DataError::Validation(_))));
}

#[test]
fn evaluation_is_deterministic() {
    let s = series("2330.TW", breakout_bars());
    let instrument = Instrument::from_symbol("2330.TW");
    let ev = evaluator();
    assert_eq!(ev.evaluate(&instrument, &s), ev.evaluate(&instrument, &s));
}
