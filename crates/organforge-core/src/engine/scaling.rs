use crate::core::models::biometrics::{BiometricsError, PatientBiometrics};
use crate::core::models::scale::{ScaleClamp, ScaleFactor, SizeAdjustment};
use crate::core::templates::template::OrganTemplate;
use tracing::debug;

/// Scales an organ template to a patient.
///
/// The body-size ratio is a power law in height and weight relative to the template's
/// reference patient. The age multiplier is taken relative to the reference patient's own
/// age, so the reference patient always maps to exactly `1.0` before clamping. The
/// result is clamped to the template's `[min_scale, max_scale]`, and the applied bound
/// is recorded.
///
/// # Errors
///
/// Returns [`BiometricsError`] naming the first field outside its accepted range.
pub fn compute_scale(
    template: &OrganTemplate,
    biometrics: &PatientBiometrics,
) -> Result<ScaleFactor, BiometricsError> {
    biometrics.validate()?;

    let policy = &template.scaling;
    let reference = &template.reference;

    let body_size_ratio = (biometrics.height_cm / reference.height_cm)
        .powf(policy.height_exponent)
        * (biometrics.weight_kg / reference.weight_kg).powf(policy.weight_exponent);
    let age_multiplier = policy.age_curve.multiplier(biometrics.age_years);
    let reference_age_multiplier = policy.age_curve.multiplier(reference.age_years);
    let raw = body_size_ratio * age_multiplier / reference_age_multiplier;

    let (value, clamp) = if raw < policy.min_scale {
        (policy.min_scale, ScaleClamp::Lower)
    } else if raw > policy.max_scale {
        (policy.max_scale, ScaleClamp::Upper)
    } else {
        (raw, ScaleClamp::None)
    };

    debug!(
        organ = %template.organ_type,
        body_size_ratio,
        age_multiplier,
        reference_age_multiplier,
        raw,
        value,
        clamp = %clamp,
        "Computed scale factor."
    );

    Ok(ScaleFactor {
        body_size_ratio,
        age_multiplier,
        reference_age_multiplier,
        raw,
        value,
        clamp,
        adjustment: SizeAdjustment::None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::biometrics::BiometricField;
    use crate::core::models::organ::OrganType;
    use crate::core::templates::registry::TemplateRegistry;
    use crate::core::templates::template::tests::sample_template;
    use proptest::prelude::*;

    #[test]
    fn reference_patient_maps_to_identity() {
        let template = sample_template();
        let scale = compute_scale(&template, &template.reference).unwrap();
        assert_eq!(scale.value, 1.0);
        assert_eq!(scale.clamp, ScaleClamp::None);
    }

    #[test]
    fn builtin_heart_for_forty_year_old_adult_is_close_to_one() {
        let registry = TemplateRegistry::builtin().unwrap();
        let heart = registry.get(OrganType::Heart).unwrap();
        let scale = compute_scale(heart, &PatientBiometrics::new(175.0, 70.0, 40.0)).unwrap();
        assert!((scale.value - 1.0).abs() <= 0.05, "scale = {}", scale.value);
        assert!(scale.value < 1.0);
    }

    #[test]
    fn larger_patient_gets_larger_organ() {
        let template = sample_template();
        let scale = compute_scale(&template, &PatientBiometrics::new(190.0, 95.0, 35.0)).unwrap();
        let expected = (190.0f64 / 175.0).powf(0.6) * (95.0f64 / 70.0).powf(0.4);
        assert!((scale.body_size_ratio - expected).abs() < 1e-12);
        assert!((scale.value - expected).abs() < 1e-12);
    }

    #[test]
    fn children_get_a_juvenile_boost_relative_to_body_size() {
        let template = sample_template();
        let scale = compute_scale(&template, &PatientBiometrics::new(110.0, 20.0, 6.0)).unwrap();
        assert!(scale.age_multiplier > 1.0);
        assert!(scale.raw > scale.body_size_ratio);
    }

    #[test]
    fn out_of_policy_scale_is_clamped_and_recorded() {
        let template = sample_template();

        let tiny = compute_scale(&template, &PatientBiometrics::new(50.0, 1.0, 0.0)).unwrap();
        assert_eq!(tiny.clamp, ScaleClamp::Lower);
        assert_eq!(tiny.value, template.scaling.min_scale);
        assert!(tiny.raw < tiny.value);

        let huge = compute_scale(&template, &PatientBiometrics::new(250.0, 300.0, 35.0)).unwrap();
        assert_eq!(huge.clamp, ScaleClamp::Upper);
        assert_eq!(huge.value, template.scaling.max_scale);
    }

    #[test]
    fn invalid_biometrics_are_rejected_with_field() {
        let template = sample_template();
        let err = compute_scale(&template, &PatientBiometrics::new(175.0, 301.0, 35.0)).unwrap_err();
        assert_eq!(err.field, BiometricField::WeightKg);
        assert_eq!(err.value, 301.0);
    }

    fn valid_biometrics() -> impl Strategy<Value = PatientBiometrics> {
        (50.0f64..=250.0, 1.0f64..=300.0, 0.0f64..=120.0)
            .prop_map(|(h, w, a)| PatientBiometrics::new(h, w, a))
    }

    proptest! {
        /// Every valid patient yields a scale inside the organ's policy bounds.
        #[test]
        fn scale_stays_within_policy_bounds(
            biometrics in valid_biometrics(),
            organ_index in 0usize..4,
        ) {
            let registry = TemplateRegistry::builtin().unwrap();
            let template = registry.get(OrganType::ALL[organ_index]).unwrap();
            let scale = compute_scale(template, &biometrics).unwrap();

            prop_assert!(scale.value >= template.scaling.min_scale);
            prop_assert!(scale.value <= template.scaling.max_scale);
            prop_assert_eq!(scale, compute_scale(template, &biometrics).unwrap());
        }

        /// Growing height and weight together never shrinks the organ.
        #[test]
        fn proportional_growth_never_decreases_scale(
            biometrics in valid_biometrics(),
            growth in 1.0f64..1.5,
            organ_index in 0usize..4,
        ) {
            let grown = PatientBiometrics::new(
                (biometrics.height_cm * growth).min(250.0),
                (biometrics.weight_kg * growth).min(300.0),
                biometrics.age_years,
            );
            let registry = TemplateRegistry::builtin().unwrap();
            let template = registry.get(OrganType::ALL[organ_index]).unwrap();

            let before = compute_scale(template, &biometrics).unwrap();
            let after = compute_scale(template, &grown).unwrap();
            prop_assert!(after.value >= before.value);
        }
    }
}
