use super::*;

/// One aligned (document, field) pair ready for scoring. Both sides keep
/// their raw values; absence is decided at classification time so null
/// sentinels and whitespace-only strings fall out the same way.
#[derive(Debug, Clone)]
pub struct FieldRecord {
    pub doc_id: String,
    pub field: String,
    pub category: FieldCategory,
    pub expected: Option<String>,
    pub extracted: Option<String>,
}

/// Ordered rules, first match wins:
/// both absent -> TN; only extracted present -> FP; only expected present
/// -> FN; both present and equivalent -> TP; both present and not
/// equivalent -> FP. A wrong-but-present value is charged once as FP and
/// never doubles as FN.
pub fn classify_record(
    record: &FieldRecord,
    matcher: &ValueMatcher,
) -> (Outcome, Option<MatchMethod>) {
    let expected_present = !is_absent(record.expected.as_deref());
    let extracted_present = !is_absent(record.extracted.as_deref());

    match (expected_present, extracted_present) {
        (false, false) => (Outcome::TrueNegative, Some(MatchMethod::BothAbsent)),
        (false, true) => (Outcome::FalsePositive, None),
        (true, false) => (Outcome::FalseNegative, None),
        (true, true) => {
            let expected = record.expected.as_deref().unwrap_or_default();
            let extracted = record.extracted.as_deref().unwrap_or_default();
            match matcher.equivalence(record.category, expected, extracted) {
                Some(method) => (Outcome::TruePositive, Some(method)),
                None => (Outcome::FalsePositive, None),
            }
        }
    }
}
