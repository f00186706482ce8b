use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::formulas;

/// Closed reference interval `[low, high]` for a metric.
///
/// Serialized as a two-element array so profile files read naturally:
/// `"weight": [55.0, 74.5]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
}

impl ReferenceRange {
    pub fn new(low: f64, high: f64) -> Self {
        ReferenceRange { low, high }
    }

    pub fn as_bounds(&self) -> [f64; 2] {
        [self.low, self.high]
    }

    /// Inclusive membership test; a reversed range never contains anything
    pub fn contains(&self, value: f64) -> bool {
        formulas::is_in_range(value, &self.as_bounds())
    }

    pub fn is_well_formed(&self) -> bool {
        self.low <= self.high
    }

    /// Both bounds multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        ReferenceRange {
            low: self.low * factor,
            high: self.high * factor,
        }
    }

    pub fn span(&self) -> f64 {
        self.high - self.low
    }
}

impl From<[f64; 2]> for ReferenceRange {
    fn from(bounds: [f64; 2]) -> Self {
        ReferenceRange::new(bounds[0], bounds[1])
    }
}

impl From<ReferenceRange> for [f64; 2] {
    fn from(range: ReferenceRange) -> Self {
        range.as_bounds()
    }
}

/// Normative bands configured per subject. A missing entry means no check applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceRanges {
    pub weight: Option<ReferenceRange>,
    pub body_fat_mass: Option<ReferenceRange>,
    pub body_fat_percentage: Option<ReferenceRange>,
    pub bmi: Option<ReferenceRange>,
    pub muscle_mass: Option<ReferenceRange>,
    pub lean_body_mass: Option<ReferenceRange>,
    pub total_body_water: Option<ReferenceRange>,
    pub protein: Option<ReferenceRange>,
    pub inorganic_salt: Option<ReferenceRange>,
    /// Stored as a fraction (0.36..0.39), displayed as a percentage
    pub extracellular_water_ratio: Option<ReferenceRange>,
}

impl ReferenceRanges {
    /// Every configured range paired with its field name
    pub fn entries(&self) -> Vec<(&'static str, ReferenceRange)> {
        [
            ("weight", self.weight),
            ("body_fat_mass", self.body_fat_mass),
            ("body_fat_percentage", self.body_fat_percentage),
            ("bmi", self.bmi),
            ("muscle_mass", self.muscle_mass),
            ("lean_body_mass", self.lean_body_mass),
            ("total_body_water", self.total_body_water),
            ("protein", self.protein),
            ("inorganic_salt", self.inorganic_salt),
            ("extracellular_water_ratio", self.extracellular_water_ratio),
        ]
        .into_iter()
        .filter_map(|(name, range)| range.map(|r| (name, r)))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sex::Male => write!(f, "Male"),
            Sex::Female => write!(f, "Female"),
        }
    }
}

/// Static subject profile, loaded once and never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Subject's display name
    pub name: String,

    /// Date of birth
    pub birthday: NaiveDate,

    pub sex: Sex,

    /// Height in centimeters
    pub height_cm: f64,

    /// Reference ranges for the ranged metrics
    #[serde(default)]
    pub ranges: ReferenceRanges,
}

/// A measured value paired with its unit of measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
}

impl Quantity {
    pub fn new(value: f64, unit: impl Into<String>) -> Self {
        Quantity {
            value,
            unit: unit.into(),
        }
    }

    pub fn kg(value: f64) -> Self {
        Quantity::new(value, "kg")
    }
}

/// Muscle measured in one body region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMeasurement {
    /// Absolute muscle weight
    pub weight: Quantity,

    /// Percentage relative to the population standard (100 = standard)
    pub percent_of_standard: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MuscleBalance {
    pub left_upper_arm: RegionMeasurement,
    pub right_upper_arm: RegionMeasurement,
    pub trunk: RegionMeasurement,
    pub left_lower_limb: RegionMeasurement,
    pub right_lower_limb: RegionMeasurement,
}

impl MuscleBalance {
    pub fn get(&self, region: Region) -> &RegionMeasurement {
        match region {
            Region::LeftUpperArm => &self.left_upper_arm,
            Region::RightUpperArm => &self.right_upper_arm,
            Region::Trunk => &self.trunk,
            Region::LeftLowerLimb => &self.left_lower_limb,
            Region::RightLowerLimb => &self.right_lower_limb,
        }
    }
}

/// One body-composition scan. The date is the record's identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Scan date, unique across the dataset
    pub date: NaiveDate,

    /// Composite wellness score on a 0-100 scale
    pub score: u8,

    pub weight: Quantity,
    pub body_fat_mass: Quantity,
    pub muscle_mass: Quantity,
    pub lean_body_mass: Quantity,
    pub total_body_water: Quantity,
    pub protein: Quantity,
    pub inorganic_salt: Quantity,
    pub skeletal_muscle: Quantity,

    /// Extracellular water as a fraction of total body water
    pub extracellular_water_ratio: f64,

    pub muscle_balance: MuscleBalance,
}

/// The eleven main tracked metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Weight,
    LeanBodyMass,
    BodyFatMass,
    BodyFatPercentage,
    MuscleMass,
    Bmi,
    SkeletalMuscle,
    Protein,
    InorganicSalt,
    TotalBodyWater,
    ExtracellularWater,
}

impl Metric {
    /// Order used for trend charts
    pub const CHART_ORDER: [Metric; 11] = [
        Metric::Weight,
        Metric::LeanBodyMass,
        Metric::BodyFatMass,
        Metric::BodyFatPercentage,
        Metric::MuscleMass,
        Metric::Bmi,
        Metric::SkeletalMuscle,
        Metric::Protein,
        Metric::InorganicSalt,
        Metric::TotalBodyWater,
        Metric::ExtracellularWater,
    ];

    /// Order used for the single-record detail view
    pub const DETAIL_ORDER: [Metric; 11] = [
        Metric::Weight,
        Metric::BodyFatMass,
        Metric::BodyFatPercentage,
        Metric::Bmi,
        Metric::MuscleMass,
        Metric::LeanBodyMass,
        Metric::TotalBodyWater,
        Metric::Protein,
        Metric::InorganicSalt,
        Metric::ExtracellularWater,
        Metric::SkeletalMuscle,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Metric::Weight => "weight",
            Metric::LeanBodyMass => "lean_body_mass",
            Metric::BodyFatMass => "body_fat_mass",
            Metric::BodyFatPercentage => "body_fat_percentage",
            Metric::MuscleMass => "muscle_mass",
            Metric::Bmi => "bmi",
            Metric::SkeletalMuscle => "skeletal_muscle",
            Metric::Protein => "protein",
            Metric::InorganicSalt => "inorganic_salt",
            Metric::TotalBodyWater => "total_body_water",
            Metric::ExtracellularWater => "extracellular_water",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Metric::Weight => "Weight",
            Metric::LeanBodyMass => "Lean Body Mass",
            Metric::BodyFatMass => "Body Fat Mass",
            Metric::BodyFatPercentage => "Body Fat %",
            Metric::MuscleMass => "Muscle Mass",
            Metric::Bmi => "BMI",
            Metric::SkeletalMuscle => "Skeletal Muscle",
            Metric::Protein => "Protein",
            Metric::InorganicSalt => "Inorganic Salt",
            Metric::TotalBodyWater => "Total Body Water",
            Metric::ExtracellularWater => "Extracellular Water %",
        }
    }

    pub fn from_key(key: &str) -> Option<Metric> {
        Metric::CHART_ORDER.into_iter().find(|m| m.key() == key)
    }

    /// Derived values are shown at a fixed precision; stored values as recorded
    pub fn decimal_places(&self) -> Option<u32> {
        match self {
            Metric::BodyFatPercentage | Metric::Bmi => Some(2),
            _ => None,
        }
    }

    /// Display value of this metric for one record
    pub fn value(&self, record: &Record, profile: &Profile) -> f64 {
        match self {
            Metric::Weight => record.weight.value,
            Metric::LeanBodyMass => record.lean_body_mass.value,
            Metric::BodyFatMass => record.body_fat_mass.value,
            Metric::BodyFatPercentage => {
                formulas::body_fat_percentage(record.body_fat_mass.value, record.weight.value)
            }
            Metric::MuscleMass => record.muscle_mass.value,
            Metric::Bmi => formulas::bmi(record.weight.value, profile.height_cm),
            Metric::SkeletalMuscle => record.skeletal_muscle.value,
            Metric::Protein => record.protein.value,
            Metric::InorganicSalt => record.inorganic_salt.value,
            Metric::TotalBodyWater => record.total_body_water.value,
            Metric::ExtracellularWater => record.extracellular_water_ratio * 100.0,
        }
    }

    /// Unit fixed by the metric itself rather than by the recorded data
    pub fn static_unit(&self) -> Option<&'static str> {
        match self {
            Metric::BodyFatPercentage | Metric::ExtracellularWater => Some("%"),
            _ => None,
        }
    }

    /// Unit string shown next to the value; BMI is unitless
    pub fn unit<'a>(&self, record: &'a Record) -> Option<&'a str> {
        match self {
            Metric::Weight => Some(&record.weight.unit),
            Metric::LeanBodyMass => Some(&record.lean_body_mass.unit),
            Metric::BodyFatMass => Some(&record.body_fat_mass.unit),
            Metric::BodyFatPercentage | Metric::ExtracellularWater => self.static_unit(),
            Metric::MuscleMass => Some(&record.muscle_mass.unit),
            Metric::Bmi => None,
            Metric::SkeletalMuscle => Some(&record.skeletal_muscle.unit),
            Metric::Protein => Some(&record.protein.unit),
            Metric::InorganicSalt => Some(&record.inorganic_salt.unit),
            Metric::TotalBodyWater => Some(&record.total_body_water.unit),
        }
    }

    /// Static range from the profile, already scaled to display units.
    ///
    /// Skeletal muscle has no static range; its band depends on the record's weight.
    pub fn profile_range(&self, profile: &Profile) -> Option<ReferenceRange> {
        let ranges = &profile.ranges;
        match self {
            Metric::Weight => ranges.weight,
            Metric::LeanBodyMass => ranges.lean_body_mass,
            Metric::BodyFatMass => ranges.body_fat_mass,
            Metric::BodyFatPercentage => ranges.body_fat_percentage,
            Metric::MuscleMass => ranges.muscle_mass,
            Metric::Bmi => ranges.bmi,
            Metric::SkeletalMuscle => None,
            Metric::Protein => ranges.protein,
            Metric::InorganicSalt => ranges.inorganic_salt,
            Metric::TotalBodyWater => ranges.total_body_water,
            Metric::ExtracellularWater => ranges.extracellular_water_ratio.map(|r| r.scaled(100.0)),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Body regions of the muscle-balance breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    LeftUpperArm,
    RightUpperArm,
    Trunk,
    LeftLowerLimb,
    RightLowerLimb,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::LeftUpperArm,
        Region::RightUpperArm,
        Region::Trunk,
        Region::LeftLowerLimb,
        Region::RightLowerLimb,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Region::LeftUpperArm => "left_upper_arm",
            Region::RightUpperArm => "right_upper_arm",
            Region::Trunk => "trunk",
            Region::LeftLowerLimb => "left_lower_limb",
            Region::RightLowerLimb => "right_lower_limb",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Region::LeftUpperArm => "Left Upper Arm",
            Region::RightUpperArm => "Right Upper Arm",
            Region::Trunk => "Trunk",
            Region::LeftLowerLimb => "Left Lower Limb",
            Region::RightLowerLimb => "Right Lower Limb",
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}
