use crate::entities::{BloodPressureCategory, Classification};

/// Classify a reading into its severity band
///
/// Bands overlap, so they are checked from the most to the least severe and the
/// first match wins. Any integer pair is accepted; pairs that match no band are
/// `Unclassified`.
pub fn classify(systolic: i32, diastolic: i32) -> Classification {
    categorize_blood_pressure(systolic, diastolic).into()
}

/// Category part of [`classify`]
pub fn categorize_blood_pressure(systolic: i32, diastolic: i32) -> BloodPressureCategory {
    if systolic >= 180 || diastolic >= 110 {
        BloodPressureCategory::HypertensionGrade3
    } else if (160..=179).contains(&systolic) || (100..=109).contains(&diastolic) {
        BloodPressureCategory::HypertensionGrade2
    } else if (140..=159).contains(&systolic) || (90..=99).contains(&diastolic) {
        BloodPressureCategory::HypertensionGrade1
    } else if (130..=139).contains(&systolic) || (85..=89).contains(&diastolic) {
        BloodPressureCategory::NormalHigh
    } else if (120..=129).contains(&systolic) || (80..=84).contains(&diastolic) {
        BloodPressureCategory::Normal
    } else if systolic < 120 && diastolic < 80 {
        BloodPressureCategory::Optimal
    } else {
        BloodPressureCategory::Unclassified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bp_category_examples() {
        assert_eq!(categorize_blood_pressure(118, 75), BloodPressureCategory::Optimal);
        assert_eq!(categorize_blood_pressure(125, 82), BloodPressureCategory::Normal);
        assert_eq!(categorize_blood_pressure(135, 86), BloodPressureCategory::NormalHigh);
        assert_eq!(categorize_blood_pressure(150, 95), BloodPressureCategory::HypertensionGrade1);
        assert_eq!(categorize_blood_pressure(165, 100), BloodPressureCategory::HypertensionGrade2);
        assert_eq!(categorize_blood_pressure(190, 115), BloodPressureCategory::HypertensionGrade3);
    }

    #[test]
    fn test_first_match_wins() {
        // Systolic alone reaches grade 3
        assert_eq!(categorize_blood_pressure(185, 70), BloodPressureCategory::HypertensionGrade3);

        // Diastolic alone reaches grade 3
        assert_eq!(categorize_blood_pressure(110, 112), BloodPressureCategory::HypertensionGrade3);

        // The more severe of the two readings decides
        assert_eq!(categorize_blood_pressure(125, 105), BloodPressureCategory::HypertensionGrade2);
        assert_eq!(categorize_blood_pressure(145, 70), BloodPressureCategory::HypertensionGrade1);
        assert_eq!(categorize_blood_pressure(100, 86), BloodPressureCategory::NormalHigh);
        assert_eq!(categorize_blood_pressure(110, 80), BloodPressureCategory::Normal);
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(categorize_blood_pressure(180, 0), BloodPressureCategory::HypertensionGrade3);
        assert_eq!(categorize_blood_pressure(179, 0), BloodPressureCategory::HypertensionGrade2);
        assert_eq!(categorize_blood_pressure(160, 0), BloodPressureCategory::HypertensionGrade2);
        assert_eq!(categorize_blood_pressure(159, 0), BloodPressureCategory::HypertensionGrade1);
        assert_eq!(categorize_blood_pressure(140, 0), BloodPressureCategory::HypertensionGrade1);
        assert_eq!(categorize_blood_pressure(139, 0), BloodPressureCategory::NormalHigh);
        assert_eq!(categorize_blood_pressure(130, 0), BloodPressureCategory::NormalHigh);
        assert_eq!(categorize_blood_pressure(129, 0), BloodPressureCategory::Normal);
        assert_eq!(categorize_blood_pressure(120, 0), BloodPressureCategory::Normal);
        assert_eq!(categorize_blood_pressure(119, 79), BloodPressureCategory::Optimal);
    }

    #[test]
    fn test_extreme_inputs_still_classify() {
        assert_eq!(categorize_blood_pressure(1000, -5), BloodPressureCategory::HypertensionGrade3);
        assert_eq!(categorize_blood_pressure(119, 1000), BloodPressureCategory::HypertensionGrade3);
        assert_eq!(categorize_blood_pressure(-40, -40), BloodPressureCategory::Optimal);

        let colors_match = (-10..=320)
            .step_by(7)
            .flat_map(|s| (-10..=220).step_by(5).map(move |d| (s, d)))
            .all(|(s, d)| {
                let c = classify(s, d);
                c.color == c.category.color()
            });
        assert!(colors_match);
    }

    #[test]
    fn test_colors() {
        assert_eq!(classify(190, 115).color, "#8b0000");
        assert_eq!(classify(165, 100).color, "#dc3545");
        assert_eq!(classify(150, 95).color, "#fd7e14");
        assert_eq!(classify(135, 86).color, "#ffc107");
        assert_eq!(classify(125, 82).color, "#28a745");
        assert_eq!(classify(118, 75).color, "#20c997");
        assert_eq!(BloodPressureCategory::Unclassified.color(), "#6c757d");
    }
}
