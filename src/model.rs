use serde::{Deserialize, Serialize};

/// Comparison rule applied to a field's values. Resolved once from the
/// field catalog; never inferred per-record from the field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldCategory {
    Date,
    Identifier,
    OrganizationName,
    AddressComponent,
    FreeText,
    Generic,
}

impl FieldCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Identifier => "identifier",
            Self::OrganizationName => "organization-name",
            Self::AddressComponent => "address-component",
            Self::FreeText => "free-text",
            Self::Generic => "generic",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "date" => Some(Self::Date),
            "identifier" => Some(Self::Identifier),
            "organization-name" => Some(Self::OrganizationName),
            "address-component" => Some(Self::AddressComponent),
            "free-text" => Some(Self::FreeText),
            "generic" => Some(Self::Generic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    TruePositive,
    TrueNegative,
    FalsePositive,
    FalseNegative,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TruePositive => "true_positive",
            Self::TrueNegative => "true_negative",
            Self::FalsePositive => "false_positive",
            Self::FalseNegative => "false_negative",
        }
    }
}

/// How an equivalent pair was judged equivalent, kept for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    BothAbsent,
    ExactNormalized,
    DateNormalized,
    RawIdentity,
    IdentifierContainment,
    SubstringContainment,
    TokenOverlap,
}

impl MatchMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BothAbsent => "both_absent",
            Self::ExactNormalized => "exact_normalized",
            Self::DateNormalized => "date_normalized",
            Self::RawIdentity => "raw_identity",
            Self::IdentifierContainment => "identifier_containment",
            Self::SubstringContainment => "substring_containment",
            Self::TokenOverlap => "token_overlap",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::TruePositive => self.true_positives += 1,
            Outcome::TrueNegative => self.true_negatives += 1,
            Outcome::FalsePositive => self.false_positives += 1,
            Outcome::FalseNegative => self.false_negatives += 1,
        }
    }

    pub fn absorb(&mut self, other: &OutcomeCounts) {
        self.true_positives += other.true_positives;
        self.true_negatives += other.true_negatives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    pub fn errors(&self) -> usize {
        self.false_positives + self.false_negatives
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldStats {
    pub field: String,
    pub category: FieldCategory,
    pub counts: OutcomeCounts,
    pub errors: usize,
    pub miss_rate: Option<f64>,
    pub false_alarm_rate: Option<f64>,
    pub difficulty: Difficulty,
}

/// One scored (document, field) pair, emitted under `--details`.
#[derive(Debug, Clone, Serialize)]
pub struct RecordJudgment {
    pub doc_id: String,
    pub field: String,
    pub category: FieldCategory,
    pub expected: Option<String>,
    pub extracted: Option<String>,
    pub outcome: Outcome,
    pub match_method: Option<MatchMethod>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputProvenance {
    pub path: String,
    pub sha256: String,
    pub document_count: usize,
    pub field_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreInputs {
    pub ground_truth: InputProvenance,
    pub extracted: InputProvenance,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreSettings {
    pub date_order: String,
    pub jaccard_threshold: f64,
    pub identifier_overhang_max: usize,
    pub field_config_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccuracyReportManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub generated_at: String,
    pub command: String,
    pub inputs: ScoreInputs,
    pub settings: ScoreSettings,
    pub total_records: usize,
    pub accuracy: Option<f64>,
    pub counts: OutcomeCounts,
    pub fields: Vec<FieldStats>,
    pub diagnostics: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<RecordJudgment>>,
}
