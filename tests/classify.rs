//! Classification adapter and scaler behaviour with a scripted estimator.

mod common;

use ddos_monitor::classify::{ClassifyError, Prediction};
use ddos_monitor::features::{Feature, FeatureVector, FEATURE_DIM};
use ddos_monitor::model::{ModelError, OnnxClassifier, StandardScaler};
use std::path::Path;
use std::sync::atomic::Ordering;

#[test]
fn maps_class_codes() {
    let fv = FeatureVector::zeroed();

    let (benign, _) = common::adapter(0);
    assert_eq!(benign.classify(&fv).unwrap(), Prediction::Benign);

    let (attack, _) = common::adapter(1);
    assert_eq!(attack.classify(&fv).unwrap(), Prediction::Attack);

    for code in [2, -1, 255] {
        let (adapter, probe) = common::adapter(code);
        match adapter.classify(&fv) {
            Err(ClassifyError::ModelOutput { code: got }) => assert_eq!(got, code),
            other => panic!("expected ModelOutput error, got {other:?}"),
        }
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn missing_key_fails_before_model() {
    let mut fv = FeatureVector::zeroed();
    fv.remove(Feature::FlowPacketsPerSec);

    let (adapter, probe) = common::adapter(1);
    match adapter.classify(&fv) {
        Err(ClassifyError::Schema { missing }) => assert_eq!(missing, Feature::FlowPacketsPerSec),
        other => panic!("expected Schema error, got {other:?}"),
    }
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn scales_in_canonical_order_before_predict() {
    let mean = vec![1.0; FEATURE_DIM];
    let mut scale = vec![2.0; FEATURE_DIM];
    scale[3] = 0.0;
    let scaler = StandardScaler::new(mean, scale).unwrap();
    let (adapter, probe) = common::adapter_with_scaler(0, scaler);

    let mut fv = FeatureVector::zeroed();
    fv.set(Feature::DestinationPort, 443.0);
    fv.set(Feature::IdleStd, 5.0);
    adapter.classify(&fv).unwrap();

    let row = probe.last_row.lock().unwrap().clone();
    assert_eq!(row.len(), FEATURE_DIM);
    assert_eq!(row[0], 221.0);
    assert_eq!(row[1], -0.5);
    // zero scale leaves the centered value as is
    assert_eq!(row[3], -1.0);
    assert_eq!(row[21], 2.0);
}

#[test]
fn scaler_width_mismatch_is_a_model_error() {
    let (adapter, probe) = common::adapter_with_scaler(0, StandardScaler::identity(FEATURE_DIM - 1));
    match adapter.classify(&FeatureVector::zeroed()) {
        Err(ClassifyError::Model(ModelError::Dimension { expected, got })) => {
            assert_eq!(expected, FEATURE_DIM - 1);
            assert_eq!(got, FEATURE_DIM);
        }
        other => panic!("expected dimension error, got {other:?}"),
    }
    assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn scaler_loads_from_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scaler.json");
    let mean: Vec<f64> = (0..FEATURE_DIM).map(|i| i as f64).collect();
    let scale = vec![1.0; FEATURE_DIM];
    std::fs::write(&path, serde_json::json!({ "mean": mean, "scale": scale }).to_string()).unwrap();

    let scaler = StandardScaler::load(&path).unwrap();
    assert_eq!(scaler.dim(), FEATURE_DIM);
    let out = scaler.transform(&[10.0; FEATURE_DIM]).unwrap();
    assert_eq!(out[0], 10.0);
    assert_eq!(out[10], 0.0);
}

#[test]
fn scaler_rejects_bad_artifacts() {
    let dir = tempfile::tempdir().unwrap();

    let missing = StandardScaler::load(&dir.path().join("nope.json"));
    assert!(matches!(missing, Err(ModelError::Artifact { .. })));

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "not json").unwrap();
    assert!(matches!(StandardScaler::load(&garbage), Err(ModelError::ScalerFormat(_))));

    let uneven = dir.path().join("uneven.json");
    std::fs::write(&uneven, r#"{"mean":[0.0,1.0],"scale":[1.0]}"#).unwrap();
    assert!(matches!(
        StandardScaler::load(&uneven),
        Err(ModelError::Dimension { expected: 2, got: 1 })
    ));
}

#[test]
fn onnx_missing_model_is_an_artifact_error() {
    let result = OnnxClassifier::load(Path::new("nonexistent.onnx"));
    assert!(matches!(result, Err(ModelError::Artifact { .. })));
}

#[test]
fn prediction_labels() {
    assert_eq!(Prediction::Benign.to_string(), "BENIGN");
    assert_eq!(Prediction::Attack.to_string(), "DDoS");
    assert_eq!(serde_json::to_string(&Prediction::Attack).unwrap(), "\"attack\"");
    assert!(Prediction::Attack.is_attack());
}
