use super::*;

/// Values the extraction side emits for "not found". Treated as absent on
/// either side, the same as an empty or whitespace-only string.
const ABSENT_SENTINELS: &[&str] = &["null", "none", "n/a"];

/// Formats tried in order for the date category. A fixed list bounds the
/// parse cost per record; first successful parse wins.
const DAY_FIRST_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%m-%d-%Y",
    "%d.%m.%Y",
    "%m.%d.%Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d/%m/%y",
    "%m/%d/%y",
    "%d-%m-%y",
    "%d.%m.%y",
];

const MONTH_FIRST_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%m.%d.%Y",
    "%d.%m.%Y",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%B %d, %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%m/%d/%y",
    "%d/%m/%y",
    "%m-%d-%y",
    "%m.%d.%y",
];

pub fn is_absent(value: Option<&str>) -> bool {
    let Some(raw) = value else {
        return true;
    };
    let trimmed = raw.trim();
    trimmed.is_empty()
        || ABSENT_SENTINELS
            .iter()
            .any(|sentinel| trimmed.eq_ignore_ascii_case(sentinel))
}

/// Lowercase with runs of whitespace collapsed to single spaces.
pub fn normalize_comparable(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Similarity of the whitespace-delimited token sets of two normalized
/// strings: |intersection| / |union|.
pub fn token_jaccard(left: &str, right: &str) -> f64 {
    let left_tokens: HashSet<&str> = left.split_whitespace().collect();
    let right_tokens: HashSet<&str> = right.split_whitespace().collect();

    let union = left_tokens.union(&right_tokens).count();
    if union == 0 {
        return 0.0;
    }
    let shared = left_tokens.intersection(&right_tokens).count();
    shared as f64 / union as f64
}

/// Per-category equivalence judge. Holds the compiled date-cleanup regexes
/// and the tunable thresholds for one scoring run.
pub struct ValueMatcher {
    date_order: DateOrder,
    jaccard_threshold: f64,
    identifier_overhang_max: usize,
    ordinal_suffix: Regex,
    of_word: Regex,
}

impl ValueMatcher {
    pub fn new(
        date_order: DateOrder,
        jaccard_threshold: f64,
        identifier_overhang_max: usize,
    ) -> Result<Self> {
        let ordinal_suffix = Regex::new(r"(?i)(\d+)(?:st|nd|rd|th)")
            .context("failed to compile ordinal suffix regex")?;
        let of_word =
            Regex::new(r"(?i)\bof\b").context("failed to compile date filler word regex")?;

        Ok(Self {
            date_order,
            jaccard_threshold,
            identifier_overhang_max,
            ordinal_suffix,
            of_word,
        })
    }

    /// Judges two present values for one category. `Some` carries the rule
    /// that matched; `None` means not equivalent.
    pub fn equivalence(
        &self,
        category: FieldCategory,
        expected: &str,
        extracted: &str,
    ) -> Option<MatchMethod> {
        match category {
            FieldCategory::Date => self.date_equivalence(expected, extracted),
            FieldCategory::Identifier => self.identifier_equivalence(expected, extracted),
            FieldCategory::OrganizationName | FieldCategory::FreeText => {
                self.fuzzy_equivalence(expected, extracted)
            }
            FieldCategory::AddressComponent | FieldCategory::Generic => {
                (normalize_comparable(expected) == normalize_comparable(extracted))
                    .then_some(MatchMethod::ExactNormalized)
            }
        }
    }

    /// Canonical calendar date for a raw value, or `None` when no known
    /// format applies. Unparseable values only ever match on raw identity.
    pub fn canonical_date(&self, raw: &str) -> Option<NaiveDate> {
        let cleaned = self.scrub_date_text(raw);
        if cleaned.is_empty() {
            return None;
        }

        let formats = match self.date_order {
            DateOrder::DayFirst => DAY_FIRST_DATE_FORMATS,
            DateOrder::MonthFirst => MONTH_FIRST_DATE_FORMATS,
        };

        formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
    }

    fn date_equivalence(&self, expected: &str, extracted: &str) -> Option<MatchMethod> {
        match (self.canonical_date(expected), self.canonical_date(extracted)) {
            (Some(left), Some(right)) => (left == right).then_some(MatchMethod::DateNormalized),
            _ => (expected == extracted).then_some(MatchMethod::RawIdentity),
        }
    }

    fn identifier_equivalence(&self, expected: &str, extracted: &str) -> Option<MatchMethod> {
        let left = expected.trim();
        let right = extracted.trim();

        if left == right {
            return Some(MatchMethod::ExactNormalized);
        }
        if self.identifier_containment(left, right) {
            return Some(MatchMethod::IdentifierContainment);
        }
        None
    }

    /// One value may carry a short leading or trailing overhang the other
    /// lacks, e.g. policy "G11687785-23" against extracted "G11687785".
    fn identifier_containment(&self, left: &str, right: &str) -> bool {
        let (short, long) = if left.len() <= right.len() {
            (left, right)
        } else {
            (right, left)
        };
        if short.is_empty() {
            return false;
        }

        let overhang_len = long.len() - short.len();
        if overhang_len == 0 || overhang_len > self.identifier_overhang_max {
            return false;
        }

        let overhang = if let Some(tail) = long.strip_prefix(short) {
            tail
        } else if long.ends_with(short) {
            &long[..overhang_len]
        } else {
            return false;
        };

        overhang.chars().all(is_overhang_char)
    }

    fn fuzzy_equivalence(&self, expected: &str, extracted: &str) -> Option<MatchMethod> {
        let left = normalize_comparable(expected);
        let right = normalize_comparable(extracted);

        if left == right {
            return Some(MatchMethod::ExactNormalized);
        }

        let (short, long) = if left.len() <= right.len() {
            (&left, &right)
        } else {
            (&right, &left)
        };
        if !short.is_empty() && long.contains(short.as_str()) {
            return Some(MatchMethod::SubstringContainment);
        }

        (token_jaccard(&left, &right) >= self.jaccard_threshold).then_some(MatchMethod::TokenOverlap)
    }

    fn scrub_date_text(&self, raw: &str) -> String {
        let without_ordinals = self.ordinal_suffix.replace_all(raw.trim(), "$1");
        let without_filler = self.of_word.replace_all(&without_ordinals, " ");
        without_filler
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn is_overhang_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '/' | '.')
}
