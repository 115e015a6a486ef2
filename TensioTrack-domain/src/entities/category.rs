use serde::Serialize;
use std::fmt;

/// Blood pressure category derived from a (systolic, diastolic) pair
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum BloodPressureCategory {
    /// Systolic < 120 and diastolic < 80
    Optimal,

    /// Systolic 120-129 or diastolic 80-84
    Normal,

    /// Systolic 130-139 or diastolic 85-89
    NormalHigh,

    /// Systolic 140-159 or diastolic 90-99
    HypertensionGrade1,

    /// Systolic 160-179 or diastolic 100-109
    HypertensionGrade2,

    /// Systolic >= 180 or diastolic >= 110
    HypertensionGrade3,

    /// None of the bands matched
    Unclassified,
}

impl BloodPressureCategory {
    /// Badge color as a hex string
    pub fn color(&self) -> &'static str {
        match self {
            BloodPressureCategory::HypertensionGrade3 => "#8b0000",
            BloodPressureCategory::HypertensionGrade2 => "#dc3545",
            BloodPressureCategory::HypertensionGrade1 => "#fd7e14",
            BloodPressureCategory::NormalHigh => "#ffc107",
            BloodPressureCategory::Normal => "#28a745",
            BloodPressureCategory::Optimal => "#20c997",
            BloodPressureCategory::Unclassified => "#6c757d",
        }
    }

    /// Label shown on the badge
    pub fn label(&self) -> &'static str {
        match self {
            BloodPressureCategory::HypertensionGrade3 => "Hypertension grade 3",
            BloodPressureCategory::HypertensionGrade2 => "Hypertension grade 2",
            BloodPressureCategory::HypertensionGrade1 => "Hypertension grade 1",
            BloodPressureCategory::NormalHigh => "Normal Haute",
            BloodPressureCategory::Normal => "Normale",
            BloodPressureCategory::Optimal => "Optimale",
            BloodPressureCategory::Unclassified => "Non classifiée",
        }
    }
}

impl fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of classifying a reading: the category and its display color
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Classification {
    pub category: BloodPressureCategory,
    pub color: &'static str,
}

impl From<BloodPressureCategory> for Classification {
    fn from(category: BloodPressureCategory) -> Self {
        Self {
            category,
            color: category.color(),
        }
    }
}
