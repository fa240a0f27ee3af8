use super::*;

pub fn run(args: ScoreArgs) -> Result<()> {
    let started_ts = Utc::now();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let report_path = args.report_path.clone().unwrap_or_else(|| {
        args.report_dir.join(format!(
            "accuracy_report_{}.json",
            utc_compact_string(started_ts)
        ))
    });

    info!(
        run_id = %run_id,
        ground_truth = %args.ground_truth.display(),
        extracted = %args.extracted.display(),
        "starting scoring run"
    );

    let mut diagnostics = Vec::new();

    let catalog = match args.field_config.as_deref() {
        Some(path) => FieldCatalog::with_overrides(path, &mut diagnostics)?,
        None => FieldCatalog::builtin(),
    };
    let matcher = ValueMatcher::new(
        args.date_order,
        args.jaccard_threshold,
        args.identifier_overhang_max,
    )?;

    let ground_truth = load_ground_truth(&args.ground_truth, &mut diagnostics)?;
    let extracted = load_extraction_output(&args.extracted, &mut diagnostics)?;

    info!(
        ground_truth_docs = ground_truth.document_count(),
        extracted_docs = extracted.document_count(),
        "loaded datasets"
    );

    let records = align_records(&catalog, &ground_truth, &extracted, &mut diagnostics);

    let mut accumulator = ScoreAccumulator::default();
    let mut judgments = args.details.then(Vec::new);

    for record in &records {
        let (outcome, match_method) = classify_record(record, &matcher);
        accumulator.observe(record, outcome);

        if let Some(list) = judgments.as_mut() {
            list.push(RecordJudgment {
                doc_id: record.doc_id.clone(),
                field: record.field.clone(),
                category: record.category,
                expected: record.expected.clone(),
                extracted: record.extracted.clone(),
                outcome,
                match_method,
            });
        }
    }

    let (counts, fields) = accumulator.finish();
    let total_records = counts.total();
    let overall_accuracy = accuracy(&counts);

    let manifest = AccuracyReportManifest {
        manifest_version: REPORT_MANIFEST_VERSION,
        run_id,
        generated_at: now_utc_string(),
        command: render_score_command(&args),
        inputs: ScoreInputs {
            ground_truth: input_provenance(&args.ground_truth, &ground_truth)?,
            extracted: input_provenance(&args.extracted, &extracted)?,
        },
        settings: ScoreSettings {
            date_order: args.date_order.as_str().to_string(),
            jaccard_threshold: args.jaccard_threshold,
            identifier_overhang_max: args.identifier_overhang_max,
            field_config_path: args
                .field_config
                .as_ref()
                .map(|path| path.display().to_string()),
        },
        total_records,
        accuracy: overall_accuracy,
        counts,
        fields,
        diagnostics,
        records: judgments,
    };

    write_json_pretty(&report_path, &manifest)?;
    info!(path = %report_path.display(), "wrote accuracy report");

    if args.json {
        write_json_summary(&manifest)?;
    } else {
        write_text_summary(&manifest)?;
    }

    info!(
        total = manifest.total_records,
        true_positives = manifest.counts.true_positives,
        true_negatives = manifest.counts.true_negatives,
        false_positives = manifest.counts.false_positives,
        false_negatives = manifest.counts.false_negatives,
        "scoring completed"
    );

    Ok(())
}

fn input_provenance(path: &Path, documents: &DocumentSet) -> Result<InputProvenance> {
    Ok(InputProvenance {
        path: path.display().to_string(),
        sha256: sha256_file(path)?,
        document_count: documents.document_count(),
        field_count: documents.field_count(),
    })
}

fn render_score_command(args: &ScoreArgs) -> String {
    let mut command = vec![
        "kvscore".to_string(),
        "score".to_string(),
        "--ground-truth".to_string(),
        args.ground_truth.display().to_string(),
        "--extracted".to_string(),
        args.extracted.display().to_string(),
        "--report-dir".to_string(),
        args.report_dir.display().to_string(),
        "--date-order".to_string(),
        args.date_order.as_str().to_string(),
        "--jaccard-threshold".to_string(),
        args.jaccard_threshold.to_string(),
        "--identifier-overhang-max".to_string(),
        args.identifier_overhang_max.to_string(),
    ];

    if let Some(path) = &args.field_config {
        command.push("--field-config".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.report_path {
        command.push("--report-path".to_string());
        command.push(path.display().to_string());
    }
    if args.details {
        command.push("--details".to_string());
    }
    if args.json {
        command.push("--json".to_string());
    }

    command.join(" ")
}

fn write_json_summary(manifest: &AccuracyReportManifest) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, manifest)
        .context("failed to serialize report summary")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_summary(manifest: &AccuracyReportManifest) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Run: {}", manifest.run_id)?;
    writeln!(
        output,
        "Inputs: ground_truth={} ({} docs, {} fields) extracted={} ({} docs, {} fields)",
        manifest.inputs.ground_truth.path,
        manifest.inputs.ground_truth.document_count,
        manifest.inputs.ground_truth.field_count,
        manifest.inputs.extracted.path,
        manifest.inputs.extracted.document_count,
        manifest.inputs.extracted.field_count,
    )?;
    writeln!(
        output,
        "Records: {} accuracy={} TP={} TN={} FP={} FN={}",
        manifest.total_records,
        format_rate(manifest.accuracy),
        manifest.counts.true_positives,
        manifest.counts.true_negatives,
        manifest.counts.false_positives,
        manifest.counts.false_negatives,
    )?;

    writeln!(output, "Fields by errors:")?;
    for (rank, field) in manifest.fields.iter().enumerate() {
        writeln!(
            output,
            "{}.\t{}\t{}\terrors={}\tmiss_rate={}\tfalse_alarm_rate={}\t{}",
            rank + 1,
            field.field,
            field.category.as_str(),
            field.errors,
            format_rate(field.miss_rate),
            format_rate(field.false_alarm_rate),
            field.difficulty.as_str(),
        )?;
    }

    if !manifest.diagnostics.is_empty() {
        writeln!(output, "Diagnostics: {}", manifest.diagnostics.len())?;
        for diagnostic in &manifest.diagnostics {
            writeln!(output, "\t{diagnostic}")?;
        }
    }

    output.flush()?;
    Ok(())
}

fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(value) => format!("{value:.3}"),
        None => "undefined".to_string(),
    }
}
