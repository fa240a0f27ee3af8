use super::*;

fn matcher() -> ValueMatcher {
    ValueMatcher::new(DateOrder::DayFirst, 0.5, 4).unwrap()
}

fn record(
    field: &str,
    category: FieldCategory,
    expected: Option<&str>,
    extracted: Option<&str>,
) -> FieldRecord {
    FieldRecord {
        doc_id: "doc-1".to_string(),
        field: field.to_string(),
        category,
        expected: expected.map(str::to_string),
        extracted: extracted.map(str::to_string),
    }
}

#[test]
fn null_sentinels_count_as_absent() {
    assert!(is_absent(None));
    assert!(is_absent(Some("")));
    assert!(is_absent(Some("   ")));
    assert!(is_absent(Some("null")));
    assert!(is_absent(Some("None")));
    assert!(is_absent(Some("N/A")));

    assert!(!is_absent(Some("0")));
    assert!(!is_absent(Some("NA 123")));
}

#[test]
fn date_match_is_format_invariant() {
    let matcher = matcher();

    assert_eq!(
        matcher.equivalence(FieldCategory::Date, "27-05-2023", "May 27, 2023"),
        Some(MatchMethod::DateNormalized)
    );
    assert_eq!(
        matcher.equivalence(FieldCategory::Date, "May 27, 2023", "27-05-2023"),
        Some(MatchMethod::DateNormalized)
    );
    assert_eq!(
        matcher.equivalence(FieldCategory::Date, "20th of May 2023", "20.05.2023"),
        Some(MatchMethod::DateNormalized)
    );
    assert_eq!(
        matcher.equivalence(FieldCategory::Date, "2023-05-27", "27/05/2023"),
        Some(MatchMethod::DateNormalized)
    );

    assert_eq!(
        matcher.equivalence(FieldCategory::Date, "27-05-2023", "28-05-2023"),
        None
    );
}

#[test]
fn unparseable_dates_only_match_on_identical_text() {
    let matcher = matcher();

    assert_eq!(
        matcher.equivalence(FieldCategory::Date, "sometime last spring", "sometime last spring"),
        Some(MatchMethod::RawIdentity)
    );
    assert_eq!(
        matcher.equivalence(FieldCategory::Date, "sometime last spring", "last spring"),
        None
    );
    assert_eq!(
        matcher.equivalence(FieldCategory::Date, "27-05-2023", "sometime last spring"),
        None
    );
    // Identity is literal, so even trailing whitespace breaks it.
    assert_eq!(
        matcher.equivalence(FieldCategory::Date, "May-ish 2023 ", "May-ish 2023"),
        None
    );
}

#[test]
fn date_order_resolves_ambiguous_numeric_forms() {
    let day_first = ValueMatcher::new(DateOrder::DayFirst, 0.5, 4).unwrap();
    let month_first = ValueMatcher::new(DateOrder::MonthFirst, 0.5, 4).unwrap();

    assert_eq!(
        day_first.canonical_date("05-04-2023"),
        NaiveDate::from_ymd_opt(2023, 4, 5)
    );
    assert_eq!(
        month_first.canonical_date("05-04-2023"),
        NaiveDate::from_ymd_opt(2023, 5, 4)
    );

    assert_eq!(
        day_first.equivalence(FieldCategory::Date, "05-04-2023", "April 5, 2023"),
        Some(MatchMethod::DateNormalized)
    );
    assert_eq!(
        month_first.equivalence(FieldCategory::Date, "05-04-2023", "May 4, 2023"),
        Some(MatchMethod::DateNormalized)
    );
    assert_eq!(
        month_first.equivalence(FieldCategory::Date, "05-04-2023", "April 5, 2023"),
        None
    );
}

#[test]
fn identifier_tolerates_short_prefix_or_suffix_overhang() {
    let matcher = matcher();

    assert_eq!(
        matcher.equivalence(FieldCategory::Identifier, "G11687785-23", "G11687785"),
        Some(MatchMethod::IdentifierContainment)
    );
    assert_eq!(
        matcher.equivalence(FieldCategory::Identifier, "G11687785", "G11687785-23"),
        Some(MatchMethod::IdentifierContainment)
    );
    assert_eq!(
        matcher.equivalence(FieldCategory::Identifier, " G11687785 ", "G11687785"),
        Some(MatchMethod::ExactNormalized)
    );
}

#[test]
fn identifier_rejects_long_overhang_and_unrelated_values() {
    let matcher = matcher();

    assert_eq!(
        matcher.equivalence(FieldCategory::Identifier, "G11687785", "X99999999"),
        None
    );
    // Six extra characters is past the default overhang limit.
    assert_eq!(
        matcher.equivalence(FieldCategory::Identifier, "CLM-2023-001", "CLM-2023-001-REV-A"),
        None
    );
    // Containment must be at an end, not in the middle.
    assert_eq!(
        matcher.equivalence(FieldCategory::Identifier, "G11687785", "XG11687785Z"),
        None
    );
}

#[test]
fn organization_names_match_on_substring_containment() {
    let matcher = matcher();

    assert_eq!(
        matcher.equivalence(
            FieldCategory::OrganizationName,
            "4 Ever Life Insurance Company",
            "4 Ever Life Insurance Company / Global Atlantic Financial Group"
        ),
        Some(MatchMethod::SubstringContainment)
    );
    assert_eq!(
        matcher.equivalence(FieldCategory::OrganizationName, "ACME  LTD", "acme ltd"),
        Some(MatchMethod::ExactNormalized)
    );
}

#[test]
fn organization_names_match_on_token_overlap() {
    let matcher = matcher();

    assert_eq!(
        matcher.equivalence(
            FieldCategory::OrganizationName,
            "Global Atlantic Financial Group",
            "Atlantic Global Group LLC"
        ),
        Some(MatchMethod::TokenOverlap)
    );
    assert_eq!(
        matcher.equivalence(FieldCategory::OrganizationName, "Acme Corp", "Globex Inc"),
        None
    );
}

#[test]
fn free_text_shares_the_fuzzy_rules() {
    let matcher = matcher();

    assert_eq!(
        matcher.equivalence(
            FieldCategory::FreeText,
            "Water damage from burst pipe",
            "water  damage from burst pipe"
        ),
        Some(MatchMethod::ExactNormalized)
    );
    // Four shared tokens over a union of eight sits exactly at the 0.5 bar.
    assert_eq!(
        matcher.equivalence(
            FieldCategory::FreeText,
            "Water damage from burst pipe",
            "Burst pipe caused water damage to kitchen"
        ),
        Some(MatchMethod::TokenOverlap)
    );
}

#[test]
fn address_components_require_normalized_equality() {
    let matcher = matcher();

    assert_eq!(
        matcher.equivalence(FieldCategory::AddressComponent, "London", "london "),
        Some(MatchMethod::ExactNormalized)
    );
    assert_eq!(
        matcher.equivalence(FieldCategory::AddressComponent, "London", "London, UK"),
        None
    );
    assert_eq!(
        matcher.equivalence(FieldCategory::Generic, "active", "ACTIVE"),
        Some(MatchMethod::ExactNormalized)
    );
    assert_eq!(
        matcher.equivalence(FieldCategory::Generic, "active", "inactive"),
        None
    );
}

#[test]
fn classification_follows_ordered_rules() {
    let matcher = matcher();

    let (outcome, method) = classify_record(
        &record("claimant_city", FieldCategory::AddressComponent, None, None),
        &matcher,
    );
    assert_eq!(outcome, Outcome::TrueNegative);
    assert_eq!(method, Some(MatchMethod::BothAbsent));

    let (outcome, method) = classify_record(
        &record("claimant_city", FieldCategory::AddressComponent, Some(""), Some("  ")),
        &matcher,
    );
    assert_eq!(outcome, Outcome::TrueNegative);
    assert_eq!(method, Some(MatchMethod::BothAbsent));

    let (outcome, _) = classify_record(
        &record("claimant_city", FieldCategory::AddressComponent, None, Some("123 Main St")),
        &matcher,
    );
    assert_eq!(outcome, Outcome::FalsePositive);

    let (outcome, _) = classify_record(
        &record("claimant_city", FieldCategory::AddressComponent, Some("123 Main St"), Some("null")),
        &matcher,
    );
    assert_eq!(outcome, Outcome::FalseNegative);

    let (outcome, method) = classify_record(
        &record("claimant_city", FieldCategory::AddressComponent, Some("London"), Some("London")),
        &matcher,
    );
    assert_eq!(outcome, Outcome::TruePositive);
    assert_eq!(method, Some(MatchMethod::ExactNormalized));

    // A wrong-but-present value is one false positive, never also a miss.
    let (outcome, method) = classify_record(
        &record("claimant_city", FieldCategory::AddressComponent, Some("London"), Some("Leeds")),
        &matcher,
    );
    assert_eq!(outcome, Outcome::FalsePositive);
    assert_eq!(method, None);
}

#[test]
fn every_record_lands_in_exactly_one_bucket() {
    let matcher = matcher();
    let batch = vec![
        record("loss_date", FieldCategory::Date, Some("27-05-2023"), Some("May 27, 2023")),
        record("loss_date", FieldCategory::Date, Some("nonsense"), Some("other nonsense")),
        record("policy_number", FieldCategory::Identifier, None, Some("P1")),
        record("claimant_city", FieldCategory::AddressComponent, Some("null"), Some("N/A")),
        record("diagnosis", FieldCategory::FreeText, Some("fracture"), None),
    ];

    let mut accumulator = ScoreAccumulator::default();
    for item in &batch {
        let (outcome, _) = classify_record(item, &matcher);
        accumulator.observe(item, outcome);
    }
    let (counts, _) = accumulator.finish();

    assert_eq!(counts.total(), batch.len());
    assert_eq!(counts.true_positives, 1);
    assert_eq!(counts.true_negatives, 1);
    assert_eq!(counts.false_positives, 2);
    assert_eq!(counts.false_negatives, 1);
}

#[test]
fn four_record_batch_reports_half_accuracy() {
    let matcher = matcher();
    let batch = vec![
        record("incident_date", FieldCategory::Date, Some("27-05-2023"), Some("May 27, 2023")),
        record("policy_number", FieldCategory::Identifier, Some("G11687785-23"), Some("G11687785")),
        record("claimant_city", FieldCategory::AddressComponent, Some("London"), Some("")),
        record("insured_name", FieldCategory::OrganizationName, Some(""), Some("Acme Ltd")),
    ];

    let mut accumulator = ScoreAccumulator::default();
    for item in &batch {
        let (outcome, _) = classify_record(item, &matcher);
        accumulator.observe(item, outcome);
    }
    let (counts, fields) = accumulator.finish();

    assert_eq!(counts.total(), 4);
    assert_eq!(counts.true_positives, 2);
    assert_eq!(counts.true_negatives, 0);
    assert_eq!(counts.false_positives, 1);
    assert_eq!(counts.false_negatives, 1);
    assert_eq!(accuracy(&counts), Some(0.5));

    assert_eq!(fields[0].field, "claimant_city");
    assert_eq!(fields[0].miss_rate, Some(1.0));
    assert_eq!(fields[0].false_alarm_rate, None);
    assert_eq!(fields[1].field, "insured_name");
    assert_eq!(fields[1].false_alarm_rate, Some(1.0));
    assert_eq!(fields[1].miss_rate, None);
}

#[test]
fn merged_accumulators_match_a_single_pass() {
    let matcher = matcher();
    let batch = vec![
        record("loss_date", FieldCategory::Date, Some("27-05-2023"), Some("2023-05-27")),
        record("claim_number", FieldCategory::Identifier, Some("A100"), Some("A100")),
        record("insured_name", FieldCategory::OrganizationName, Some("Acme Ltd"), None),
        record("loss_date", FieldCategory::Date, Some("01-02-2023"), Some("03-02-2023")),
        record("claimant_city", FieldCategory::AddressComponent, None, Some("Leeds")),
        record("diagnosis", FieldCategory::FreeText, None, None),
    ];

    let mut single = ScoreAccumulator::default();
    for item in &batch {
        let (outcome, _) = classify_record(item, &matcher);
        single.observe(item, outcome);
    }

    let mut left = ScoreAccumulator::default();
    for item in &batch[..3] {
        let (outcome, _) = classify_record(item, &matcher);
        left.observe(item, outcome);
    }
    let mut right = ScoreAccumulator::default();
    for item in &batch[3..] {
        let (outcome, _) = classify_record(item, &matcher);
        right.observe(item, outcome);
    }
    left.merge(right);

    let (single_counts, single_fields) = single.finish();
    let (merged_counts, merged_fields) = left.finish();

    assert_eq!(merged_counts.true_positives, single_counts.true_positives);
    assert_eq!(merged_counts.true_negatives, single_counts.true_negatives);
    assert_eq!(merged_counts.false_positives, single_counts.false_positives);
    assert_eq!(merged_counts.false_negatives, single_counts.false_negatives);

    let single_rank = single_fields
        .iter()
        .map(|stats| (stats.field.as_str(), stats.errors))
        .collect::<Vec<_>>();
    let merged_rank = merged_fields
        .iter()
        .map(|stats| (stats.field.as_str(), stats.errors))
        .collect::<Vec<_>>();
    assert_eq!(merged_rank, single_rank);
}

#[test]
fn rates_are_undefined_without_their_denominator() {
    assert_eq!(ratio(0, 0), None);
    assert_eq!(ratio(3, 4), Some(0.75));
    assert_eq!(accuracy(&OutcomeCounts::default()), None);
}

#[test]
fn rates_use_only_their_own_denominators() {
    let matcher = matcher();
    let batch = vec![
        record("loss_date", FieldCategory::Date, Some("27-05-2023"), Some("27-05-2023")),
        record("loss_date", FieldCategory::Date, Some("28-05-2023"), None),
        record("insured_name", FieldCategory::OrganizationName, None, Some("Acme Ltd")),
        record("insured_name", FieldCategory::OrganizationName, None, None),
    ];

    let mut accumulator = ScoreAccumulator::default();
    for item in &batch {
        let (outcome, _) = classify_record(item, &matcher);
        accumulator.observe(item, outcome);
    }
    let (_, fields) = accumulator.finish();

    assert_eq!(fields[0].field, "insured_name");
    assert_eq!(fields[0].false_alarm_rate, Some(0.5));
    assert_eq!(fields[0].miss_rate, None);
    assert_eq!(fields[1].field, "loss_date");
    assert_eq!(fields[1].miss_rate, Some(0.5));
    assert_eq!(fields[1].false_alarm_rate, None);
}

#[test]
fn report_ranks_fields_by_errors_then_name() {
    let matcher = matcher();
    let batch = vec![
        record("loss_date", FieldCategory::Date, Some("27-05-2023"), Some("nonsense")),
        record("loss_date", FieldCategory::Date, Some("28-05-2023"), None),
        record("claim_number", FieldCategory::Identifier, Some("A1"), None),
        record("insured_name", FieldCategory::OrganizationName, Some("Acme"), Some("Zenith")),
        record("loss_city", FieldCategory::AddressComponent, Some("London"), Some("London")),
    ];

    let mut accumulator = ScoreAccumulator::default();
    for item in &batch {
        let (outcome, _) = classify_record(item, &matcher);
        accumulator.observe(item, outcome);
    }
    let (_, fields) = accumulator.finish();

    let names = fields.iter().map(|stats| stats.field.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["loss_date", "claim_number", "insured_name", "loss_city"]);
}

#[test]
fn difficulty_tags_follow_category() {
    assert_eq!(difficulty_for(FieldCategory::Date), Difficulty::Easy);
    assert_eq!(difficulty_for(FieldCategory::Identifier), Difficulty::Easy);
    assert_eq!(difficulty_for(FieldCategory::AddressComponent), Difficulty::Medium);
    assert_eq!(difficulty_for(FieldCategory::OrganizationName), Difficulty::Medium);
    assert_eq!(difficulty_for(FieldCategory::Generic), Difficulty::Medium);
    assert_eq!(difficulty_for(FieldCategory::FreeText), Difficulty::Hard);
}

#[test]
fn category_names_round_trip() {
    let all = [
        FieldCategory::Date,
        FieldCategory::Identifier,
        FieldCategory::OrganizationName,
        FieldCategory::AddressComponent,
        FieldCategory::FreeText,
        FieldCategory::Generic,
    ];
    for category in all {
        assert_eq!(FieldCategory::parse(category.as_str()), Some(category));
    }
    assert_eq!(FieldCategory::parse("company"), None);
}

#[test]
fn catalog_defaults_unknown_fields_to_generic() {
    let catalog = FieldCatalog::builtin();

    assert_eq!(catalog.category_for("loss_date"), FieldCategory::Date);
    assert_eq!(catalog.category_for("policy_number"), FieldCategory::Identifier);
    assert_eq!(catalog.category_for("mystery_field"), FieldCategory::Generic);
}

#[test]
fn field_config_overrides_apply_and_unknown_categories_degrade() {
    let mut catalog = FieldCatalog::builtin();
    let mut diagnostics = Vec::new();
    let overrides = HashMap::from([
        ("loss_date".to_string(), "free-text".to_string()),
        ("reviewer_notes".to_string(), "paragraph".to_string()),
    ]);

    catalog.apply_overrides(overrides, &mut diagnostics);

    assert_eq!(catalog.category_for("loss_date"), FieldCategory::FreeText);
    assert_eq!(catalog.category_for("reviewer_notes"), FieldCategory::Generic);
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].contains("paragraph"));
}

#[test]
fn alignment_is_driven_by_ground_truth() {
    let catalog = FieldCatalog::builtin();

    let mut ground_truth = DocumentSet::default();
    ground_truth.documents.insert(
        "a.pdf".to_string(),
        BTreeMap::from([
            ("claimant_city".to_string(), Some("London".to_string())),
            ("loss_date".to_string(), Some("27-05-2023".to_string())),
        ]),
    );
    ground_truth.documents.insert(
        "b.pdf".to_string(),
        BTreeMap::from([("loss_date".to_string(), None)]),
    );

    let mut extracted = DocumentSet::default();
    extracted.documents.insert(
        "a.pdf".to_string(),
        BTreeMap::from([
            ("loss_date".to_string(), Some("2023-05-27".to_string())),
            ("surprise_field".to_string(), Some("zzz".to_string())),
        ]),
    );
    extracted.documents.insert(
        "c.pdf".to_string(),
        BTreeMap::from([("loss_date".to_string(), Some("01-01-2020".to_string()))]),
    );

    let mut diagnostics = Vec::new();
    let records = align_records(&catalog, &ground_truth, &extracted, &mut diagnostics);

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].field, "claimant_city");
    assert_eq!(records[0].extracted, None);
    assert_eq!(records[1].field, "loss_date");
    assert_eq!(records[1].category, FieldCategory::Date);
    assert_eq!(records[1].extracted.as_deref(), Some("2023-05-27"));
    assert_eq!(records[2].doc_id, "b.pdf");
    assert_eq!(records[2].expected, None);
    assert_eq!(records[2].extracted, None);

    assert!(diagnostics.iter().any(|d| d.contains("'b.pdf'")));
    assert!(diagnostics.iter().any(|d| d.contains("surprise_field")));
    assert!(diagnostics.iter().any(|d| d.contains("'c.pdf'")));
}

#[test]
fn loader_skips_malformed_lines_and_keeps_the_last_duplicate() {
    let data = concat!(
        r#"{"file_path": "a.pdf", "expected_kvp": {"loss_date": "27-05-2023"}, "attachments": []}"#,
        "\n",
        "not json at all\n",
        "\n",
        r#"{"file_path": "", "expected_kvp": {"loss_date": "01-01-2020"}}"#,
        "\n",
        r#"{"file_path": "a.pdf", "expected_kvp": {"loss_date": "28-05-2023"}}"#,
        "\n",
    );

    let mut diagnostics = Vec::new();
    let documents =
        read_ground_truth(io::Cursor::new(data.as_bytes()), "test.jsonl", &mut diagnostics)
            .unwrap();

    assert_eq!(documents.document_count(), 1);
    assert_eq!(
        documents.documents["a.pdf"]["loss_date"].as_deref(),
        Some("28-05-2023")
    );
    assert_eq!(diagnostics.len(), 3);
    assert!(diagnostics.iter().any(|d| d.contains("malformed line 2")));
    assert!(diagnostics.iter().any(|d| d.contains("without a document id")));
    assert!(diagnostics.iter().any(|d| d.contains("last entry wins")));
}

#[test]
fn loader_rejects_inputs_with_no_usable_records() {
    let mut diagnostics = Vec::new();
    let result = read_ground_truth(
        io::Cursor::new(b"oops\n".as_slice()),
        "empty.jsonl",
        &mut diagnostics,
    );
    assert!(result.is_err());
}

#[test]
fn extraction_rows_flatten_scalars_and_nulls() {
    let data =
        r#"{"file_path": "a.pdf", "extracted_data": {"premium": 12500, "loss_city": null}}"#;

    let mut diagnostics = Vec::new();
    let documents = read_extraction_output(
        io::Cursor::new(data.as_bytes()),
        "extracted.jsonl",
        &mut diagnostics,
    )
    .unwrap();

    let fields = &documents.documents["a.pdf"];
    assert_eq!(fields["premium"].as_deref(), Some("12500"));
    assert_eq!(fields["loss_city"], None);
    assert!(diagnostics.is_empty());
}

#[test]
fn json_scalars_compare_as_text() {
    assert_eq!(scalar_to_string(&serde_json::Value::Null), None);
    assert_eq!(
        scalar_to_string(&serde_json::json!("London")),
        Some("London".to_string())
    );
    assert_eq!(
        scalar_to_string(&serde_json::json!(12500)),
        Some("12500".to_string())
    );
    assert_eq!(
        scalar_to_string(&serde_json::json!(true)),
        Some("true".to_string())
    );
}
