use super::*;

/// Fold of classification outcomes into per-field and global counters.
/// Folding is associative: accumulators built over batch halves merge
/// into the same counts as one pass over the whole batch.
#[derive(Debug, Default)]
pub struct ScoreAccumulator {
    fields: BTreeMap<String, FieldTally>,
    totals: OutcomeCounts,
}

#[derive(Debug)]
struct FieldTally {
    category: FieldCategory,
    counts: OutcomeCounts,
}

impl ScoreAccumulator {
    pub fn observe(&mut self, record: &FieldRecord, outcome: Outcome) {
        let tally = self
            .fields
            .entry(record.field.clone())
            .or_insert_with(|| FieldTally {
                category: record.category,
                counts: OutcomeCounts::default(),
            });
        tally.counts.record(outcome);
        self.totals.record(outcome);
    }

    pub fn merge(&mut self, other: ScoreAccumulator) {
        self.totals.absorb(&other.totals);
        for (field, tally) in other.fields {
            match self.fields.get_mut(&field) {
                Some(existing) => existing.counts.absorb(&tally.counts),
                None => {
                    self.fields.insert(field, tally);
                }
            }
        }
    }

    /// Global counters plus the ranked per-field table: errors descending,
    /// ties broken by field name so report order is stable.
    pub fn finish(self) -> (OutcomeCounts, Vec<FieldStats>) {
        let mut fields = self
            .fields
            .into_iter()
            .map(|(field, tally)| {
                let counts = tally.counts;
                FieldStats {
                    field,
                    category: tally.category,
                    errors: counts.errors(),
                    miss_rate: ratio(
                        counts.false_negatives,
                        counts.false_negatives + counts.true_positives,
                    ),
                    false_alarm_rate: ratio(
                        counts.false_positives,
                        counts.false_positives + counts.true_negatives,
                    ),
                    difficulty: difficulty_for(tally.category),
                    counts,
                }
            })
            .collect::<Vec<FieldStats>>();

        fields.sort_by(|a, b| b.errors.cmp(&a.errors).then_with(|| a.field.cmp(&b.field)));

        (self.totals, fields)
    }
}

pub fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

pub fn accuracy(counts: &OutcomeCounts) -> Option<f64> {
    ratio(
        counts.true_positives + counts.true_negatives,
        counts.total(),
    )
}

/// Difficulty is a function of category alone, so the tag is stable for a
/// field across runs.
pub fn difficulty_for(category: FieldCategory) -> Difficulty {
    match category {
        FieldCategory::Date | FieldCategory::Identifier => Difficulty::Easy,
        FieldCategory::AddressComponent
        | FieldCategory::OrganizationName
        | FieldCategory::Generic => Difficulty::Medium,
        FieldCategory::FreeText => Difficulty::Hard,
    }
}
