use std::fs;

use datasz_common::DataszError;
use rose_config::{ConfigFacts, RoseConfig};
use test_utils::fixtures::SUITE_CONFIG;

#[test]
fn test_suite_config_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rose-app.conf");
    fs::write(&path, SUITE_CONFIG).unwrap();

    let config = RoseConfig::from_path(&path).unwrap();

    assert_eq!(config.integer("namelist:nlsizes", "global_row_length").unwrap(), 192);
    assert!(config.logical("namelist:run_dyn", "l_endgame").unwrap());
    assert_eq!(
        config.integer_array("namelist:nlstcgen", "meanfreqim").unwrap(),
        vec![3, 3, 4, 10]
    );
    assert_eq!(
        config.character("namelist:nlstcall_pp(pp6)", "file_id").unwrap(),
        "pp6"
    );
}

#[test]
fn test_suite_config_ignored_entries() {
    let config = RoseConfig::parse(SUITE_CONFIG).unwrap();

    assert!(!config.is_active("namelist:nlstcgen", "mean_4_filename_base"));
    assert!(!config
        .sections_with_prefix("namelist:use(")
        .contains(&"namelist:use(e5f6a7b8)"));
    assert_eq!(config.sections_with_prefix("namelist:use(").len(), 4);
    assert_eq!(config.sections_with_prefix("namelist:streq(").len(), 13);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = RoseConfig::from_path(dir.path().join("rose-app.conf")).unwrap_err();
    assert!(matches!(err, DataszError::Io(_)));
}

#[test]
fn test_missing_option_names_section_and_option() {
    let config = RoseConfig::parse(SUITE_CONFIG).unwrap();
    let err = config.integer("namelist:nlstcgen", "dumpfreqts").unwrap_err();
    assert!(err.is_config_error());
    assert_eq!(
        err.to_string(),
        "Cannot find configuration setting: namelist:nlstcgen=dumpfreqts"
    );
}
