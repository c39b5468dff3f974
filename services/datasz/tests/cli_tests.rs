use std::fs;

use datasz::render::{OutputFormat, NO_STREAMS_MESSAGE};
use datasz::settings::{Overrides, ResolvedSettings, Settings};
use datasz::{execute, run_estimate};
use test_utils::assert_approx_eq;
use test_utils::fixtures::{expected, SUITE_PRICE_PER_TIB, SUITE_STASHMASTER};
use test_utils::paths::{write_fixture, write_suite_fixture, SuiteFixture};

fn settings_for(fixture: &SuiteFixture) -> ResolvedSettings {
    ResolvedSettings {
        stash_dir: fixture.stash_dir.clone(),
        ratio_db: Some(fixture.ratio_db_path.clone()),
        price_per_tib: SUITE_PRICE_PER_TIB,
        currency: "GBP".to_string(),
    }
}

#[test]
fn test_run_estimate_on_suite() {
    let fixture = write_suite_fixture().unwrap();
    let report = run_estimate(&fixture.config_path, &settings_for(&fixture)).unwrap();

    let stream = report.stream(5).expect("stream 5 reported");
    assert_approx_eq!(stream.summary.data_words.year, expected::STREAM5_WORDS[3], 0.5);
    assert_eq!(report.run_length_days, expected::RUN_LENGTH_DAYS);
}

#[test]
fn test_text_output_lists_streams_and_total() {
    let fixture = write_suite_fixture().unwrap();
    let text = execute(&fixture.config_path, &settings_for(&fixture), OutputFormat::Text).unwrap();

    assert!(text.contains("Stream  5"));
    assert!(text.contains("Stream  6"));
    assert!(text.contains("Climate-meaning file 1"));
    assert!(text.contains("Total storage cost per year:"));
    assert!(text.contains("m01s00i024"));
    assert!(!text.contains(NO_STREAMS_MESSAGE));
}

#[test]
fn test_json_output_parses() {
    let fixture = write_suite_fixture().unwrap();
    let json = execute(&fixture.config_path, &settings_for(&fixture), OutputFormat::Json).unwrap();

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["price_per_tib"].as_f64(), Some(SUITE_PRICE_PER_TIB));
    assert!(value["streams"].as_array().is_some_and(|s| !s.is_empty()));
}

#[test]
fn test_unset_ratio_db_uses_unpacked_sizes() {
    let fixture = write_suite_fixture().unwrap();
    let mut settings = settings_for(&fixture);
    settings.ratio_db = None;

    let report = run_estimate(&fixture.config_path, &settings).unwrap();
    let stream = report.stream(5).unwrap();
    assert_approx_eq!(stream.summary.data_words.year, stream.summary.unpacked_year_words, 0.5);
}

#[test]
fn test_config_without_streams_prints_message() {
    let config = "[namelist:nlsizes]\nglobal_row_length=96\nglobal_rows=73\n\n\
        [namelist:nlstcgen]\ndump_frequency_units=2\ndumpfreqim=10\nl_meaning_sequence=.false.\n\
        secs_per_periodim=86400\nsteps_per_periodim=72\n\n\
        [namelist:run_dyn]\nl_endgame=.true.\n";
    let fixture = write_fixture(config, SUITE_STASHMASTER, None).unwrap();

    let text = execute(&fixture.config_path, &settings_for(&fixture), OutputFormat::Text).unwrap();
    assert!(text.contains(NO_STREAMS_MESSAGE));
}

#[test]
fn test_missing_config_is_reported() {
    let fixture = write_suite_fixture().unwrap();
    let missing = fixture.root().join("nope.conf");
    let err = execute(&missing, &settings_for(&fixture), OutputFormat::Text).unwrap_err();
    assert!(format!("{:#}", err).contains("run configuration"));
}

#[test]
fn test_settings_file_drives_estimate() {
    let fixture = write_suite_fixture().unwrap();
    let settings_path = fixture.root().join("datasz.yaml");
    fs::write(
        &settings_path,
        format!(
            "stash_dir: {}\nratio_db: {}\nprice_per_tib: 170.0\ncurrency: EUR\n",
            fixture.stash_dir.display(),
            fixture.ratio_db_path.display()
        ),
    )
    .unwrap();

    let resolved = Settings::load(&settings_path)
        .unwrap()
        .resolve(Overrides::default())
        .unwrap();
    let doubled = run_estimate(&fixture.config_path, &resolved).unwrap();
    let base = run_estimate(&fixture.config_path, &settings_for(&fixture)).unwrap();

    assert_approx_eq!(doubled.total_cost_per_year, base.total_cost_per_year * 2.0, 1e-9);
    let text = execute(&fixture.config_path, &resolved, OutputFormat::Text).unwrap();
    assert!(text.contains("EUR"));
}
