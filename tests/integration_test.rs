use assert_approx_eq::assert_approx_eq;

use hps_distfit::{
    analysis::{compare_methods, parameter_estimates, run_batch},
    config::{Config, MetaPlot},
    distributions::{weibull_density, weibull_size_biased_density},
    fitting::{
        fit_control_gamma, fit_control_weibull, fit_test_weibull, fit_test_weibull_with_expansion,
        resolve,
    },
    io::{read_dataset, write_csv, write_excel, write_json, write_report_csv, write_report_latex},
    models::{Dataset, Distribution, FitMethod, Observation, ResidualSpace},
    sampling::{compression_factors, expansion_factor, expansion_factors, stand_table},
    DistFitError,
};

fn diameters() -> Vec<f64> {
    (1..=12).map(|i| 4.0 * i as f64).collect()
}

fn jitter(values: &[f64], phase: f64) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| v * (1.0 + 0.02 * ((i as f64) * 1.3 + phase).sin()))
        .collect()
}

fn push_stratum(ds: &mut Dataset, species: &str, cover: &str, tally: &[f64]) {
    for (dbh, t) in diameters().into_iter().zip(tally) {
        ds.observations.push(Observation {
            species_group: species.to_string(),
            cover_type: cover.to_string(),
            dbh_cm: dbh,
            tally: *t,
            expansion_factor: None,
        });
    }
}

fn create_test_dataset() -> Dataset {
    let x = diameters();
    let mut ds = Dataset::new("binned_meta_plots");
    push_stratum(
        &mut ds,
        "SW",
        "closed",
        &jitter(&weibull_size_biased_density(&x, 2.2, 22.0, 120.0, 2.0), 0.0),
    );
    push_stratum(
        &mut ds,
        "BW",
        "open",
        &jitter(&weibull_size_biased_density(&x, 1.8, 16.0, 60.0, 2.0), 0.7),
    );
    ds
}

#[test]
fn test_control_fit_recovers_generating_weibull() {
    let x = diameters();
    let tally = jitter(&weibull_size_biased_density(&x, 2.2, 22.0, 120.0, 2.0), 0.0);
    let fit = fit_control_weibull(&x, &tally, 2.0).unwrap();

    assert!((fit.params[0] - 2.2).abs() / 2.2 < 0.15);
    assert!((fit.params[1] - 22.0).abs() / 22.0 < 0.15);
    assert_eq!(fit.residual_space(), ResidualSpace::Tally);
    assert_eq!(fit.fitted.len(), x.len());
}

#[test]
fn test_test_fit_recovers_stand_table_model() {
    let x = diameters();
    let stand = weibull_density(&x, 2.0, 18.0, 800.0);
    let compression = compression_factors(&x, 2.0).unwrap();
    let tally: Vec<f64> = stand.iter().zip(&compression).map(|(s, c)| s * c).collect();

    let fit = fit_test_weibull(&x, &tally, 2.0).unwrap();
    assert!((fit.params[0] - 2.0).abs() < 1e-2);
    assert!((fit.params[1] - 18.0).abs() < 1e-1);
    assert!((fit.params[2] - 800.0).abs() / 800.0 < 1e-2);
    assert!(fit.rss < 1e-3);
}

#[test]
fn test_fitted_is_model_at_returned_parameters() {
    let x = diameters();
    let tally = jitter(&weibull_size_biased_density(&x, 2.2, 22.0, 120.0, 2.0), 0.3);
    let control = fit_control_weibull(&x, &tally, 2.0).unwrap();
    let test = fit_test_weibull(&x, &tally, 2.0).unwrap();

    let p = &control.params;
    assert_eq!(control.fitted, weibull_size_biased_density(&x, p[0], p[1], p[2], 2.0));
    let p = &test.params;
    assert_eq!(test.fitted, weibull_density(&x, p[0], p[1], p[2]));
}

#[test]
fn test_precomputed_expansion_matches_baf_path() {
    let x = diameters();
    let tally = jitter(&weibull_size_biased_density(&x, 2.2, 22.0, 120.0, 2.0), 0.0);
    let expansion = expansion_factors(&x, 2.0).unwrap();

    let by_baf = fit_test_weibull(&x, &tally, 2.0).unwrap();
    let by_ef = fit_test_weibull_with_expansion(&x, &tally, &expansion).unwrap();
    assert_eq!(by_baf.params, by_ef.params);
    assert_eq!(by_baf.rss, by_ef.rss);
}

#[test]
fn test_stand_table_uses_expansion_factor() {
    let st = stand_table(&[2.0], &[expansion_factor(10.0, 2.0).unwrap()]).unwrap();
    assert_approx_eq!(st[0], 509.296, 1e-3);
}

#[test]
fn test_registry_dispatch() {
    let w = resolve("Weibull").unwrap();
    let g = resolve("gamma").unwrap();
    assert_eq!(w.distribution, Distribution::Weibull);
    assert_eq!(g.distribution, Distribution::Gamma);

    let x = diameters();
    let tally = jitter(&weibull_size_biased_density(&x, 2.2, 22.0, 120.0, 2.0), 0.0);
    let via_pair = (w.control)(&x, &tally, 2.0).unwrap();
    let direct = fit_control_weibull(&x, &tally, 2.0).unwrap();
    assert_eq!(via_pair.params, direct.params);

    assert!(matches!(
        resolve("lognormal"),
        Err(DistFitError::UnsupportedDistribution(_))
    ));
}

#[test]
fn test_gamma_control_fit_runs_on_weibull_data() {
    let x = diameters();
    let tally = jitter(&weibull_size_biased_density(&x, 2.2, 22.0, 120.0, 2.0), 0.0);
    let fit = fit_control_gamma(&x, &tally, 2.0).unwrap();
    assert_eq!(fit.distribution, Distribution::Gamma);
    assert_eq!(fit.method, FitMethod::Control { size_bias_order: 2.0 });
    assert!(fit.rss.is_finite());
}

#[test]
fn test_insufficient_data_rejected() {
    let err = fit_control_weibull(&[10.0, 12.0], &[1.0, 2.0], 2.0).unwrap_err();
    assert!(matches!(err, DistFitError::InsufficientData(_)));
}

#[test]
fn test_compare_methods_on_dataset_stratum() {
    let ds = create_test_dataset();
    let stratum = ds.stratum("SW", "closed").unwrap();
    let cmp = compare_methods(&stratum, "weibull", 2.0, 2.0).unwrap();

    assert_eq!(cmp.record.species_group, "SW");
    assert_eq!(cmp.record.distribution, "weibull");
    assert_eq!(cmp.record.sample_size, stratum.sample_size());
    assert_eq!(cmp.record.rss_control, cmp.control.rss);
    assert_eq!(cmp.record.rss_test, cmp.test.rss);
    assert!(cmp.record.rss_diff >= 0.0);
    assert_eq!(cmp.hps.dbh.len(), 12);
    assert_eq!(cmp.stand_table.observed.len(), 12);
}

#[test]
fn test_parameter_estimates_bracket_values() {
    let ds = create_test_dataset();
    let stratum = ds.stratum("BW", "open").unwrap();
    let cmp = compare_methods(&stratum, "weibull", 2.0, 2.0).unwrap();
    let estimates = parameter_estimates(&cmp.control, 0.95).unwrap();
    assert_eq!(estimates.len(), 3);
    for est in &estimates {
        assert!(est.lower <= est.value && est.value <= est.upper);
        assert_eq!(est.degrees_of_freedom, 9);
    }
}

#[test]
fn test_batch_produces_records_and_skips_missing_strata() {
    let ds = create_test_dataset();
    let config = Config {
        meta_plots: vec![
            MetaPlot {
                species_group: "SW".to_string(),
                cover_type: "closed".to_string(),
                distributions: None,
            },
            MetaPlot {
                species_group: "PJ".to_string(),
                cover_type: "closed".to_string(),
                distributions: None,
            },
        ],
        ..Config::default()
    };

    let outcome = run_batch(&ds, &config, false).unwrap();
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].species_group, "PJ");
    let records = outcome.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].distribution, "weibull");
    assert_eq!(records[1].distribution, "gamma");

    assert!(matches!(
        run_batch(&ds, &config, true),
        Err(DistFitError::DataAvailability(_))
    ));
}

#[test]
fn test_dataset_formats_roundtrip_into_batch() {
    let ds = create_test_dataset();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default();

    let csv_path = dir.path().join("binned.csv");
    let json_path = dir.path().join("binned.json");
    let xlsx_path = dir.path().join("binned.xlsx");
    write_csv(&ds, &csv_path).unwrap();
    write_json(&ds, &json_path, false).unwrap();
    write_excel(&ds, &xlsx_path).unwrap();

    for path in [&csv_path, &json_path, &xlsx_path] {
        let loaded = read_dataset(path).unwrap();
        assert_eq!(loaded.len(), ds.len());
        let outcome = run_batch(&loaded, &config, true).unwrap();
        assert_eq!(outcome.records().len(), 4);
    }
}

#[test]
fn test_report_files_written() {
    let ds = create_test_dataset();
    let outcome = run_batch(&ds, &Config::default(), false).unwrap();
    let records = outcome.records();
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("method_comparison.csv");
    let tex_path = dir.path().join("method_comparison.tex");
    write_report_csv(&records, &csv_path).unwrap();
    write_report_latex(&records, &tex_path).unwrap();

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("species_group,cover_type,distribution,sample_size,rss_control"));
    assert_eq!(csv.lines().count(), records.len() + 1);

    let tex = std::fs::read_to_string(&tex_path).unwrap();
    assert!(tex.contains("\\toprule"));
    assert!(tex.contains("BW & open & gamma"));
}
