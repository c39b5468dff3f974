//! End-to-end estimates for the reference suite.

use datasz_common::{DataszError, PeriodValues, StashCode};
use rose_config::RoseConfig;
use stashmaster::{RatioTable, StashMaster};
use test_utils::{
    assert_approx_eq, expected, write_fixture, write_suite_fixture, SUITE_CONFIG, SUITE_PRICE_PER_TIB,
    SUITE_RATIO_DB, SUITE_STASHMASTER,
};
use volume_estimator::report::BYTES_PER_TIB;
use volume_estimator::{
    estimate, CommonParameters, PackingFlag, UsageCatalog, VolumeReport,
};

fn run(config_text: &str, ratio_db: Option<&str>) -> Result<VolumeReport, DataszError> {
    let fixture = write_fixture(config_text, SUITE_STASHMASTER, ratio_db).unwrap();
    let config = RoseConfig::from_path(&fixture.config_path)?;
    let stash = StashMaster::from_dir(&fixture.stash_dir)?;
    let ratios = RatioTable::from_path(&fixture.ratio_db_path)?;
    estimate(&config, &stash, &ratios, SUITE_PRICE_PER_TIB)
}

fn suite_report() -> VolumeReport {
    run(SUITE_CONFIG, Some(SUITE_RATIO_DB)).unwrap()
}

fn assert_words(actual: &PeriodValues<f64>, expected: [f64; 4]) {
    assert_approx_eq!(actual.day, expected[0], 1e-6);
    assert_approx_eq!(actual.month, expected[1], 1e-6);
    assert_approx_eq!(actual.quarter, expected[2], 1e-6);
    assert_approx_eq!(actual.year, expected[3], 1e-6);
}

// ============================================================================
// Derived parameters
// ============================================================================

#[test]
fn test_common_parameters_for_reference_suite() {
    let config = RoseConfig::parse(SUITE_CONFIG).unwrap();
    let common = CommonParameters::derive(&config).unwrap();

    assert_eq!(common.steps_per_day, 72.0);
    assert_eq!(common.dump_freq_steps, expected::DUMP_FREQ_STEPS);
    assert_eq!(common.meaning.periods, expected::MEANING_PERIODS);
    assert_eq!(common.run_length_days, expected::RUN_LENGTH_DAYS);
    assert!(common.uses_endgame_grid);
}

#[test]
fn test_usage_catalog_for_reference_suite() {
    let config = RoseConfig::parse(SUITE_CONFIG).unwrap();
    let usage = UsageCatalog::build(&config).unwrap();

    // UPDUMP goes to a dump and UPOFF is switched off
    assert_eq!(usage.len(), 3);
    assert!(["UP6", "UPM", "UPMEAN"].iter().all(|name| usage.contains(name)));
    assert!(!usage.contains("UPDUMP"));
    assert!(!usage.contains("UPOFF"));

    let upm = usage.get("UPM").unwrap();
    assert_eq!(upm.data_start_words, expected::DATA_START_WORDS_MIN);
    assert_eq!(upm.header_words_no_data, expected::HEADER_WORDS_NO_DATA_MIN);

    let up6 = usage.get("UP6").unwrap();
    assert_eq!(up6.data_start_words, expected::DATA_START_WORDS_PP6);
    assert_eq!(up6.header_words_no_data, expected::HEADER_WORDS_NO_DATA_PP6);
}

// ============================================================================
// Stream totals
// ============================================================================

#[test]
fn test_monthly_stream_totals() {
    let report = suite_report();
    let stream = report.stream(5).unwrap();

    assert_eq!(stream.file_id, "pp5");
    assert_eq!(stream.files_per_day, 1.0);
    assert_words(&stream.summary.data_words, expected::STREAM5_WORDS);
    assert_approx_eq!(stream.summary.unpacked_year_words, expected::STREAM5_UNPACKED_YEAR, 1e-6);
    assert_eq!(stream.summary.fields_per_year, expected::STREAM5_FIELDS_YEAR);

    assert_words(
        &stream.summary.native_file_bytes,
        [2_881_536.0, 17_889_280.0, 48_424_960.0, 185_835_520.0],
    );
    assert_approx_eq!(stream.summary.export_file_bytes.year, 91_995_456.0, 1e-6);
    assert_approx_eq!(stream.summary.export_file_bytes.day, 131_124.0, 1e-6);
    assert_eq!(stream.summary.fields_per_file.day, 3);
    assert_eq!(stream.summary.fields_per_file.year, 1428);

    let compression = stream.summary.compression_percent.unwrap();
    assert_approx_eq!(
        compression,
        expected::STREAM5_WORDS[3] * 100.0 / expected::STREAM5_UNPACKED_YEAR,
        1e-9
    );
    assert_approx_eq!(
        stream.summary.cost_per_year,
        91_995_456.0 / BYTES_PER_TIB * SUITE_PRICE_PER_TIB,
        1e-12
    );
}

#[test]
fn test_monthly_stream_listing() {
    let report = suite_report();
    let stream = report.stream(5).unwrap();

    let codes: Vec<StashCode> = stream.entries.iter().map(|e| e.key.code).collect();
    assert_eq!(
        codes,
        vec![
            StashCode::new(0, 2),
            StashCode::new(3, 236),
            StashCode::new(8, 223),
            StashCode::new(16, 222),
            StashCode::new(26, 4),
        ]
    );

    // Level selection 2 without imn selects no levels
    let no_levels = &stream.entries[1];
    assert_eq!(no_levels.levels, 0);
    assert!(no_levels.words.is_zero());
    assert_eq!(no_levels.active_years, 1);

    // Packing code -99 wins over the database ratio
    let soil = &stream.entries[2];
    assert_eq!(soil.ratio, 100.0);
    assert_eq!(soil.levels, 4);

    // Twice a year falls between the supported frequencies
    let twice_yearly = &stream.entries[3];
    assert!(twice_yearly.words.is_zero());
    assert!(!twice_yearly.ignored);

    let river = &stream.entries[4];
    assert_eq!((river.nx, river.ny), (360, 180));
    assert_approx_eq!(river.words.day, 32_512.0, 1e-9);
}

#[test]
fn test_hourly_reinitialised_stream() {
    let report = suite_report();
    let stream = report.stream(6).unwrap();

    assert_eq!(stream.files_per_day, expected::STREAM6_FILES_PER_DAY);
    assert_words(&stream.summary.data_words, expected::STREAM6_WORDS);
    assert_approx_eq!(stream.summary.native_file_bytes.day, 17_219_584.0, 1e-6);
    assert_eq!(stream.summary.fields_per_file.day, 1);

    let ignored: Vec<StashCode> = stream
        .entries
        .iter()
        .filter(|e| e.ignored)
        .map(|e| e.key.code)
        .collect();
    assert_eq!(ignored, vec![StashCode::new(0, 2), StashCode::new(5, 216)]);

    let no_ratio = stream
        .entries
        .iter()
        .find(|e| e.key.code == StashCode::new(3, 236))
        .unwrap();
    assert_eq!(no_ratio.flags, vec![PackingFlag::NoHistoricalRatio]);
}

// ============================================================================
// Climate-meaning files
// ============================================================================

#[test]
fn test_mean_file_totals() {
    let report = suite_report();
    assert_eq!(report.mean_files.len(), 1);
    let mean = report.mean_file(1).unwrap();

    assert_eq!(mean.meaning_periods, expected::MEANING_PERIODS);
    assert_eq!(mean.file_bases.len(), 3);
    assert_words(&mean.summary.data_words, expected::MEAN1_WORDS);

    // The empty day period only pays for the bare header
    assert_approx_eq!(mean.summary.native_file_bytes.day, 2_105_376.0, 1e-6);
    assert_approx_eq!(mean.summary.native_file_bytes.year, 2_691_072.0, 1e-6);
    assert_eq!(mean.summary.export_file_bytes.day, 0.0);

    let zonal = mean
        .entries
        .iter()
        .find(|e| e.key.code == StashCode::new(30, 201))
        .unwrap();
    assert_eq!((zonal.nx, zonal.ny), (1, 144));
    assert_eq!(zonal.flags, vec![PackingFlag::SingleColumnUnpacked]);

    let hemisphere = mean
        .entries
        .iter()
        .find(|e| e.key.code == StashCode::new(0, 24))
        .unwrap();
    assert_eq!(hemisphere.ny, 73);
    assert!(hemisphere.words.is_zero());
}

#[test]
fn test_meaning_off_drops_mean_files() {
    let text = SUITE_CONFIG.replace("l_meaning_sequence=.true.", "l_meaning_sequence=.false.");
    let report = run(&text, Some(SUITE_RATIO_DB)).unwrap();
    assert!(report.mean_files.is_empty());
    assert_eq!(report.streams.len(), 2);
}

// ============================================================================
// Report-wide properties
// ============================================================================

#[test]
fn test_total_cost_sums_every_bucket() {
    let report = suite_report();
    let sum: f64 = report
        .streams
        .iter()
        .map(|s| s.summary.cost_per_year)
        .chain(report.mean_files.iter().map(|m| m.summary.cost_per_year))
        .sum();
    assert_approx_eq!(report.total_cost_per_year, sum, 1e-12);
    assert_approx_eq!(report.run_cost, report.total_cost_per_year, 1e-12);
    assert_eq!(report.price_per_tib, SUITE_PRICE_PER_TIB);
}

#[test]
fn test_estimate_is_repeatable() {
    let first = suite_report();
    let second = suite_report();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_missing_ratio_database_assumes_unpacked() {
    let report = run(SUITE_CONFIG, None).unwrap();
    let stream = report.stream(5).unwrap();
    let all_levels = &stream.entries[0];
    assert_eq!(all_levels.ratio, 100.0);
    assert_eq!(all_levels.flags, vec![PackingFlag::NoHistoricalRatio]);
    assert_approx_eq!(
        stream.summary.data_words.year,
        stream.summary.unpacked_year_words,
        1e-6
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_required_setting_is_fatal() {
    let text = SUITE_CONFIG.replace("dumpfreqim=10\n", "");
    let err = run(&text, Some(SUITE_RATIO_DB)).unwrap_err();
    assert_eq!(err, DataszError::missing("namelist:nlstcgen", "dumpfreqim"));
    assert!(err.is_config_error());
}

#[test]
fn test_unknown_stash_code_is_fatal() {
    let text = SUITE_CONFIG.replace("isec=26\nitem=4", "isec=26\nitem=5");
    let err = run(&text, Some(SUITE_RATIO_DB)).unwrap_err();
    assert!(matches!(err, DataszError::Metadata(_)));
}

#[test]
fn test_written_fixture_round_trips_through_disk() {
    let fixture = write_suite_fixture().unwrap();
    let config = RoseConfig::from_path(&fixture.config_path).unwrap();
    let in_memory = RoseConfig::parse(SUITE_CONFIG).unwrap();
    assert_eq!(
        CommonParameters::derive(&config).unwrap(),
        CommonParameters::derive(&in_memory).unwrap()
    );
}
