//! Replace non-finite feature values before they reach the classifier.

use super::FeatureVector;

/// Copy of `features` with every NaN / ±inf replaced by 0. The input is left untouched.
pub fn sanitize(features: &FeatureVector) -> FeatureVector {
    features
        .iter()
        .map(|(f, v)| (f, if v.is_finite() { v } else { 0.0 }))
        .collect()
}

pub fn is_finite_vector(features: &FeatureVector) -> bool {
    features.iter().all(|(_, v)| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::Feature;

    #[test]
    fn replaces_non_finite_and_keeps_keys() {
        let mut fv = FeatureVector::zeroed();
        fv.set(Feature::FwdPacketLengthMin, f64::INFINITY);
        fv.set(Feature::BwdPacketLengthMin, f64::NEG_INFINITY);
        fv.set(Feature::FlowBytesPerSec, f64::NAN);
        fv.set(Feature::DestinationPort, 443.0);

        let clean = sanitize(&fv);
        assert_eq!(clean.len(), fv.len());
        assert_eq!(clean.get(Feature::FwdPacketLengthMin), Some(0.0));
        assert_eq!(clean.get(Feature::BwdPacketLengthMin), Some(0.0));
        assert_eq!(clean.get(Feature::FlowBytesPerSec), Some(0.0));
        assert_eq!(clean.get(Feature::DestinationPort), Some(443.0));
        assert!(is_finite_vector(&clean));
        // caller's copy unchanged
        assert_eq!(fv.get(Feature::FwdPacketLengthMin), Some(f64::INFINITY));
    }

    #[test]
    fn missing_keys_stay_missing() {
        let mut fv = FeatureVector::zeroed();
        fv.remove(Feature::IdleStd);
        assert_eq!(sanitize(&fv).get(Feature::IdleStd), None);
    }
}
