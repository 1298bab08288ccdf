//! Integration tests for the read-only session.

use ncio::{DataSlice, IoError, NcType, NetcdfIn, NetcdfOut};

fn write_sample(path: &std::path::Path, alpha: &[f64]) {
    let mut out = NetcdfOut::create(path).expect("create");
    out.add_1d("alpha", NcType::Double, DataSlice::Double(alpha), "n", "m/s")
        .expect("add alpha");
    out.close().expect("close");
}

#[test]
fn missing_file_is_file_not_found() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let err = NetcdfIn::open(dir.path().join("absent.nc")).unwrap_err();
    assert!(matches!(err, IoError::FileNotFound { .. }));
}

#[test]
fn missing_variable_is_variable_not_found() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("sample.nc");
    write_sample(&path, &[1.0, 2.0]);

    let reader = NetcdfIn::open(&path).expect("open");
    let err = reader.read_values::<f64>("omega").unwrap_err();
    match err {
        IoError::VariableNotFound { name, .. } => assert_eq!(name, "omega"),
        other => panic!("expected VariableNotFound, got {other:?}"),
    }
}

#[test]
fn read_into_caller_buffer() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("sample.nc");
    let alpha = [0.5, 1.5, 2.5];
    write_sample(&path, &alpha);

    let reader = NetcdfIn::open(&path).expect("open");
    assert_eq!(reader.variable_len("alpha").expect("len"), 3);

    let mut buf = [0.0f64; 3];
    reader.read_into("alpha", &mut buf).expect("read into");
    assert_eq!(buf, alpha);
}

#[test]
fn read_into_wrong_length_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("sample.nc");
    write_sample(&path, &[0.5, 1.5, 2.5]);

    let reader = NetcdfIn::open(&path).expect("open");
    let mut too_short = [0.0f64; 2];
    let err = reader.read_into("alpha", &mut too_short).unwrap_err();
    assert!(matches!(
        err,
        IoError::BufferLength {
            expected: 3,
            got: 2,
            ..
        }
    ));
}

#[test]
fn candidate_list_returns_first_present_name() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("sample.nc");
    let alpha = [4.0, 5.0, 6.0];
    write_sample(&path, &alpha);

    let reader = NetcdfIn::open(&path).expect("open");
    // "beta" does not exist; "alpha" does and wins.
    let (name, values) = reader
        .read_first::<f64>(&["beta", "alpha"])
        .expect("candidate read succeeds");
    assert_eq!(name, "alpha");
    assert_eq!(values, alpha);
}

#[test]
fn exhausted_candidates_report_joined_list() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("sample.nc");
    write_sample(&path, &[1.0]);

    let reader = NetcdfIn::open(&path).expect("open");
    let err = reader.read_first::<f64>(&["beta", "gamma"]).unwrap_err();
    match err {
        IoError::VariableNotFound { name, .. } => assert_eq!(name, "beta,gamma"),
        other => panic!("expected VariableNotFound, got {other:?}"),
    }
}
