use serde::{Deserialize, Serialize};

use crate::error::DistFitError;
use crate::fitting::resolve;
use crate::models::{Distribution, FitResult, Stratum, StratumSeries};

/// One row of the method comparison report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub species_group: String,
    pub cover_type: String,
    pub distribution: String,
    pub sample_size: u64,
    /// Control RSS, tally space
    pub rss_control: f64,
    /// Test RSS, stand-table space
    pub rss_test: f64,
    /// Squared distance between both fits projected to stand-table space
    pub rss_diff: f64,
    pub chisq_control: f64,
    pub chisq_test: f64,
}

/// Observed values with both fitted curves in one residual space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelSeries {
    pub dbh: Vec<f64>,
    pub observed: Vec<f64>,
    pub control: Vec<f64>,
    pub test: Vec<f64>,
}

/// Control and test fits of one distribution on one stratum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodComparison {
    pub record: ComparisonRecord,
    pub distribution: Distribution,
    pub control: FitResult,
    pub test: FitResult,
    /// Tally space: tally, control fit, test fit × compression
    pub hps: PanelSeries,
    /// Stand-table space: stand table, control fit ÷ compression, test fit
    pub stand_table: PanelSeries,
}

/// Pearson chi-square over the points with positive expectation.
pub fn chi_square(observed: &[f64], expected: &[f64]) -> f64 {
    observed
        .iter()
        .zip(expected)
        .filter(|(_, e)| **e > 0.0)
        .map(|(o, e)| (o - e).powi(2) / e)
        .sum()
}

/// Fit `distribution_name` to `stratum` with both methods and summarise.
///
/// Expansion factors come from the stratum's precomputed column when present,
/// otherwise from `baf`.
pub fn compare_methods(
    stratum: &Stratum,
    distribution_name: &str,
    baf: f64,
    size_bias_order: f64,
) -> Result<MethodComparison, DistFitError> {
    let pair = resolve(distribution_name)?;
    let series = stratum.series(baf)?;

    let control = (pair.control)(&series.dbh, &series.tally, size_bias_order)?;
    let test = (pair.test_with_expansion)(&series.dbh, &series.tally, &series.expansion)?;

    Ok(summarise(stratum, distribution_name, pair.distribution, &series, control, test))
}

fn summarise(
    stratum: &Stratum,
    distribution_name: &str,
    distribution: Distribution,
    series: &StratumSeries,
    control: FitResult,
    test: FitResult,
) -> MethodComparison {
    let control_stand: Vec<f64> = control
        .fitted
        .iter()
        .zip(&series.compression)
        .map(|(f, c)| f / c)
        .collect();
    let test_hps: Vec<f64> = test
        .fitted
        .iter()
        .zip(&series.compression)
        .map(|(f, c)| f * c)
        .collect();

    let rss_diff = control_stand
        .iter()
        .zip(&test.fitted)
        .map(|(c, t)| (c - t).powi(2))
        .sum();

    let record = ComparisonRecord {
        species_group: stratum.species_group.clone(),
        cover_type: stratum.cover_type.clone(),
        distribution: distribution_name.to_string(),
        sample_size: stratum.sample_size(),
        rss_control: control.rss,
        rss_test: test.rss,
        rss_diff,
        chisq_control: chi_square(&series.tally, &control.fitted),
        chisq_test: chi_square(&series.stand_table, &test.fitted),
    };

    MethodComparison {
        record,
        distribution,
        hps: PanelSeries {
            dbh: series.dbh.clone(),
            observed: series.tally.clone(),
            control: control.fitted.clone(),
            test: test_hps,
        },
        stand_table: PanelSeries {
            dbh: series.dbh.clone(),
            observed: series.stand_table.clone(),
            control: control_stand,
            test: test.fitted.clone(),
        },
        control,
        test,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::weibull_size_biased_density;
    use crate::models::{Dataset, Observation};

    fn weibull_stratum() -> Stratum {
        let mut ds = Dataset::new("Comparison");
        for i in 1..=10 {
            let dbh = 5.0 * i as f64;
            let tally = weibull_size_biased_density(dbh, 2.0, 20.0, 100.0, 2.0)
                * (1.0 + 0.01 * (i as f64).cos());
            ds.observations.push(Observation {
                species_group: "SW".to_string(),
                cover_type: "closed".to_string(),
                dbh_cm: dbh,
                tally,
                expansion_factor: None,
            });
        }
        ds.stratum("SW", "closed").unwrap()
    }

    #[test]
    fn test_chi_square_skips_non_positive_expectation() {
        let observed = [2.0, 3.0, 5.0];
        let expected = [1.0, 0.0, 5.0];
        assert!((chi_square(&observed, &expected) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_chi_square_perfect_fit() {
        assert_eq!(chi_square(&[1.0, 2.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_compare_methods_record() {
        let stratum = weibull_stratum();
        let cmp = compare_methods(&stratum, "Weibull", 2.0, 2.0).unwrap();
        assert_eq!(cmp.distribution, Distribution::Weibull);
        assert_eq!(cmp.record.distribution, "Weibull");
        assert_eq!(cmp.record.species_group, "SW");
        assert_eq!(cmp.record.sample_size, stratum.sample_size());
        assert_eq!(cmp.record.rss_control, cmp.control.rss);
        assert_eq!(cmp.record.rss_test, cmp.test.rss);
        assert!(cmp.record.rss_diff >= 0.0);
        assert!(cmp.record.chisq_control >= 0.0);
        assert!(cmp.record.chisq_test >= 0.0);
    }

    #[test]
    fn test_panels_project_between_spaces() {
        let stratum = weibull_stratum();
        let series = stratum.series(2.0).unwrap();
        let cmp = compare_methods(&stratum, "weibull", 2.0, 2.0).unwrap();

        assert_eq!(cmp.hps.observed, series.tally);
        assert_eq!(cmp.stand_table.observed, series.stand_table);
        assert_eq!(cmp.hps.control, cmp.control.fitted);
        assert_eq!(cmp.stand_table.test, cmp.test.fitted);
        for i in 0..series.dbh.len() {
            let back = cmp.stand_table.control[i] * series.compression[i];
            assert!((back - cmp.control.fitted[i]).abs() < 1e-9);
            let fwd = cmp.hps.test[i] / series.compression[i];
            assert!((fwd - cmp.test.fitted[i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rss_diff_matches_projection() {
        let stratum = weibull_stratum();
        let cmp = compare_methods(&stratum, "gamma", 2.0, 2.0).unwrap();
        let expected: f64 = cmp
            .stand_table
            .control
            .iter()
            .zip(&cmp.stand_table.test)
            .map(|(c, t)| (c - t).powi(2))
            .sum();
        assert_eq!(cmp.record.rss_diff, expected);
    }

    #[test]
    fn test_unsupported_distribution() {
        let stratum = weibull_stratum();
        assert!(matches!(
            compare_methods(&stratum, "beta", 2.0, 2.0),
            Err(DistFitError::UnsupportedDistribution(_))
        ));
    }
}
