use crate::alignment::AlignedTable;
use serde::Serialize;

/// Pairwise Pearson correlations between tickers' daily returns.
///
/// Stored row-major over `tickers`. Entries are NaN when a pair has fewer than
/// two jointly defined observations or one side has zero variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    tickers: Vec<String>,
    values: Vec<f64>,
    /// Number of common dates the matrix was computed over.
    observations: usize,
}

/// One off-diagonal entry of a [`CorrelationMatrix`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickerPair {
    pub first: String,
    pub second: String,
    pub correlation: f64,
}

impl CorrelationMatrix {
    /// Builds the matrix from an aligned return table.
    ///
    /// Only the upper triangle is computed; the lower one is mirrored so the
    /// result is symmetric bit for bit.
    pub fn from_table(table: &AlignedTable) -> Self {
        let n = table.tickers.len();
        let mut values = vec![f64::NAN; n * n];

        for i in 0..n {
            let own: Vec<f64> = table.columns[i].iter().flatten().copied().collect();
            values[i * n + i] = if pearson(&own, &own).is_nan() { f64::NAN } else { 1.0 };

            for j in (i + 1)..n {
                let (x, y): (Vec<f64>, Vec<f64>) = table.columns[i]
                    .iter()
                    .zip(&table.columns[j])
                    .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
                    .unzip();
                let r = pearson(&x, &y);
                values[i * n + j] = r;
                values[j * n + i] = r;
            }
        }

        Self {
            tickers: table.tickers.clone(),
            values,
            observations: table.len(),
        }
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    pub fn observations(&self) -> usize {
        self.observations
    }

    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Correlation between two tickers, `None` if either is not in the matrix.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.values[i * self.len() + j])
    }

    pub fn row(&self, ticker: &str) -> Option<&[f64]> {
        let n = self.len();
        let i = self.index_of(ticker)?;
        Some(&self.values[i * n..(i + 1) * n])
    }

    /// Every unordered pair of distinct tickers, in row-major order.
    pub fn pairs(&self) -> impl Iterator<Item = TickerPair> + '_ {
        let n = self.len();
        (0..n).flat_map(move |i| {
            ((i + 1)..n).map(move |j| TickerPair {
                first: self.tickers[i].clone(),
                second: self.tickers[j].clone(),
                correlation: self.values[i * n + j],
            })
        })
    }

    fn index_of(&self, ticker: &str) -> Option<usize> {
        self.tickers.iter().position(|t| t == ticker)
    }
}

/// Pearson correlation of two equally long samples.
///
/// NaN when there are fewer than two observations or either sample is
/// constant. The result is clamped to `[-1, 1]` against rounding drift.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 2 {
        return f64::NAN;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    (cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}
