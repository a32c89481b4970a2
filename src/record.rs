use std::fmt;

/// Funding-stage options offered by the form, in display order.
pub const STAGE_OPTIONS: [&str; 6] = [
    "Series A",
    "Series B",
    "IPO",
    "Acquired",
    "Unknown",
    "Seed",
];

/// Inclusive bounds for the reporting-year field.
pub const YEAR_MIN: i32 = 2020;
pub const YEAR_MAX: i32 = 2030;

/// Feature names in the order the model artifacts were trained against.
pub const FIELD_NAMES: [&str; 7] = [
    "industry",
    "country",
    "stage",
    "location",
    "source",
    "funds_raised",
    "year",
];

/// One assembled submission: everything the classifier needs to score a
/// single company.
///
/// Field order here mirrors [`FIELD_NAMES`]; [`CompanyRecord::fields`]
/// yields values in that order so downstream encoding never has to guess
/// the column layout.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyRecord {
    pub industry: String,
    pub country: String,
    pub stage: String,
    pub location: String,
    pub source: String,
    /// Funds raised in millions of dollars. Never negative.
    pub funds_raised: f64,
    /// Reporting year, within [`YEAR_MIN`]..=[`YEAR_MAX`].
    pub year: i32,
}

/// A single field value, typed so numeric fields pass through encoding
/// untouched while text fields go through the category mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(f64),
    Integer(i64),
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => write!(f, "{}", text),
            FieldValue::Number(value) => write!(f, "{:.1}", value),
            FieldValue::Integer(value) => write!(f, "{}", value),
        }
    }
}

impl Default for CompanyRecord {
    /// The initial form values.
    fn default() -> Self {
        Self {
            industry: "Retail".to_string(),
            country: "United States".to_string(),
            stage: STAGE_OPTIONS[0].to_string(),
            location: "SF Bay Area".to_string(),
            source: "TechCrunch".to_string(),
            funds_raised: 50.0,
            year: 2023,
        }
    }
}

impl CompanyRecord {
    /// Returns every field as a `(name, value)` pair in trained column
    /// order.
    pub fn fields(&self) -> [(&'static str, FieldValue<'_>); 7] {
        [
            ("industry", FieldValue::Text(&self.industry)),
            ("country", FieldValue::Text(&self.country)),
            ("stage", FieldValue::Text(&self.stage)),
            ("location", FieldValue::Text(&self.location)),
            ("source", FieldValue::Text(&self.source)),
            ("funds_raised", FieldValue::Number(self.funds_raised)),
            ("year", FieldValue::Integer(self.year as i64)),
        ]
    }

    /// Looks a single field up by its trained column name.
    pub fn value_of(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "industry" => Some(FieldValue::Text(&self.industry)),
            "country" => Some(FieldValue::Text(&self.country)),
            "stage" => Some(FieldValue::Text(&self.stage)),
            "location" => Some(FieldValue::Text(&self.location)),
            "source" => Some(FieldValue::Text(&self.source)),
            "funds_raised" => Some(FieldValue::Number(self.funds_raised)),
            "year" => Some(FieldValue::Integer(self.year as i64)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fields_follow_trained_order() {
        let record = CompanyRecord::default();
        let names: Vec<&str> = record.fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, FIELD_NAMES);
    }

    #[test]
    fn test_default_record_values() {
        let record = CompanyRecord::default();
        assert_eq!(record.industry, "Retail");
        assert_eq!(record.country, "United States");
        assert_eq!(record.stage, "Series A");
        assert_eq!(record.location, "SF Bay Area");
        assert_eq!(record.source, "TechCrunch");
        assert_eq!(record.funds_raised, 50.0);
        assert_eq!(record.year, 2023);
    }

    #[test]
    fn test_value_of_matches_fields() {
        let record = CompanyRecord::default();
        for (name, value) in record.fields() {
            assert_eq!(record.value_of(name), Some(value));
        }
        assert_eq!(record.value_of("headcount"), None);
    }

    #[test]
    fn test_default_stage_is_an_offered_option() {
        let record = CompanyRecord::default();
        assert!(STAGE_OPTIONS.contains(&record.stage.as_str()));
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Text("Retail").to_string(), "Retail");
        assert_eq!(FieldValue::Number(50.0).to_string(), "50.0");
        assert_eq!(FieldValue::Integer(2023).to_string(), "2023");
    }

    #[test]
    fn test_year_bounds_are_sane() {
        assert!(YEAR_MIN < YEAR_MAX);
        let record = CompanyRecord::default();
        assert!((YEAR_MIN..=YEAR_MAX).contains(&record.year));
    }
}
