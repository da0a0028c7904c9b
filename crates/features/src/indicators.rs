//! Slice-level building blocks for the feature engine.
//!
//! Every function here is pure. A `None` entry means "undefined at this
//! position" and is never conflated with a zero value.

use ta::Next;
use ta::indicators::SimpleMovingAverage as Sma;

/// One-period percentage change. The first position is undefined.
pub fn daily_returns(closes: &[f64]) -> Vec<Option<f64>> {
    let mut returns = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return returns;
    }
    returns.push(None);
    returns.extend(closes.windows(2).map(|w| Some((w[1] - w[0]) / w[0])));
    returns
}

/// Compounded growth of the defined returns, minus one.
///
/// Undefined returns stay undefined and do not break the running product.
pub fn cumulative_returns(returns: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut growth = 1.0;
    returns
        .iter()
        .map(|r| {
            r.map(|r| {
                growth *= 1.0 + r;
                growth - 1.0
            })
        })
        .collect()
}

/// Trailing simple mean over exactly `window` values.
///
/// The first `window - 1` positions are undefined; partial windows are never
/// averaged. A zero window yields an all-undefined column.
pub fn moving_average(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let Ok(mut sma) = Sma::new(window) else {
        return vec![None; closes.len()];
    };
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let value = sma.next(*close);
            (i + 1 >= window).then_some(value)
        })
        .collect()
}

/// Trailing sample standard deviation over exactly `window` values.
///
/// A position is defined only when all `window` trailing values are defined.
/// Windows below two have no sample deviation and yield undefined columns.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window < 2 {
        return vec![None; values.len()];
    }
    let mut out = vec![None; values.len()];
    let mut buffer = Vec::with_capacity(window);
    for end in window..=values.len() {
        buffer.clear();
        buffer.extend(values[end - window..end].iter().flatten().copied());
        if buffer.len() == window {
            out[end - 1] = Some(sample_std(&buffer));
        }
    }
    out
}

/// The defined entries of a column, in order.
pub fn defined(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); NaN below two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}
