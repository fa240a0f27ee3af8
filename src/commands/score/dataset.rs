use super::*;

#[derive(Debug, Deserialize)]
struct GroundTruthRow {
    file_path: String,
    #[serde(default)]
    expected_kvp: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ExtractionRow {
    file_path: String,
    #[serde(default)]
    extracted_data: HashMap<String, serde_json::Value>,
}

/// Documents keyed by identifier, each a field-to-value map. JSON null and
/// missing keys both surface as `None`.
#[derive(Debug, Default)]
pub struct DocumentSet {
    pub documents: BTreeMap<String, BTreeMap<String, Option<String>>>,
}

impl DocumentSet {
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    pub fn field_count(&self) -> usize {
        self.documents.values().map(|fields| fields.len()).sum()
    }
}

pub fn load_ground_truth(path: &Path, diagnostics: &mut Vec<String>) -> Result<DocumentSet> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_ground_truth(
        BufReader::new(file),
        &path.display().to_string(),
        diagnostics,
    )
}

pub fn load_extraction_output(path: &Path, diagnostics: &mut Vec<String>) -> Result<DocumentSet> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_extraction_output(
        BufReader::new(file),
        &path.display().to_string(),
        diagnostics,
    )
}

pub fn read_ground_truth<R: BufRead>(
    reader: R,
    origin: &str,
    diagnostics: &mut Vec<String>,
) -> Result<DocumentSet> {
    read_document_set(reader, "ground truth", origin, diagnostics, |line| {
        serde_json::from_str::<GroundTruthRow>(line).map(|row| (row.file_path, row.expected_kvp))
    })
}

pub fn read_extraction_output<R: BufRead>(
    reader: R,
    origin: &str,
    diagnostics: &mut Vec<String>,
) -> Result<DocumentSet> {
    read_document_set(reader, "extraction output", origin, diagnostics, |line| {
        serde_json::from_str::<ExtractionRow>(line).map(|row| (row.file_path, row.extracted_data))
    })
}

/// Reads one JSON document record per line. A malformed line is skipped
/// with a warning and a diagnostics entry; it never aborts the run.
fn read_document_set<R, F>(
    reader: R,
    label: &str,
    origin: &str,
    diagnostics: &mut Vec<String>,
    parse: F,
) -> Result<DocumentSet>
where
    R: BufRead,
    F: Fn(&str) -> serde_json::Result<(String, HashMap<String, serde_json::Value>)>,
{
    let mut documents = BTreeMap::new();

    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line =
            line.with_context(|| format!("failed to read line {line_number} of {origin}"))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (doc_id, values) = match parse(trimmed) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(
                    input = label,
                    path = origin,
                    line = line_number,
                    error = %err,
                    "skipping malformed line"
                );
                diagnostics.push(format!(
                    "{label}: skipped malformed line {line_number} in {origin}"
                ));
                continue;
            }
        };

        if doc_id.trim().is_empty() {
            warn!(input = label, line = line_number, "skipping record without document id");
            diagnostics.push(format!(
                "{label}: skipped line {line_number} without a document id"
            ));
            continue;
        }

        let fields = values
            .into_iter()
            .map(|(field, value)| (field, scalar_to_string(&value)))
            .collect::<BTreeMap<String, Option<String>>>();

        if documents.insert(doc_id.clone(), fields).is_some() {
            warn!(input = label, doc = %doc_id, "duplicate document entry, keeping the last");
            diagnostics.push(format!("{label}: duplicate document '{doc_id}', last entry wins"));
        }
    }

    if documents.is_empty() {
        bail!("no usable records in {origin}");
    }

    Ok(DocumentSet { documents })
}

/// Ground-truth values may be JSON strings, numbers, or booleans; all are
/// compared as text. JSON null means absent.
pub fn scalar_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Pairs every ground-truth (document, field) with its extracted value.
/// The ground truth drives the record universe: extracted documents or
/// fields without a ground-truth side are noted in diagnostics and left
/// unscored.
pub fn align_records(
    catalog: &FieldCatalog,
    ground_truth: &DocumentSet,
    extracted: &DocumentSet,
    diagnostics: &mut Vec<String>,
) -> Vec<FieldRecord> {
    let mut records = Vec::new();

    for (doc_id, expected_fields) in &ground_truth.documents {
        let extracted_fields = extracted.documents.get(doc_id);
        if extracted_fields.is_none() {
            warn!(doc = %doc_id, "no extraction output for document");
            diagnostics.push(format!("no extraction output for document '{doc_id}'"));
        }

        for (field, expected) in expected_fields {
            let extracted_value = extracted_fields
                .and_then(|fields| fields.get(field))
                .and_then(|value| value.clone());

            records.push(FieldRecord {
                doc_id: doc_id.clone(),
                field: field.clone(),
                category: catalog.category_for(field),
                expected: expected.clone(),
                extracted: extracted_value,
            });
        }
    }

    for (doc_id, fields) in &extracted.documents {
        match ground_truth.documents.get(doc_id) {
            None => {
                diagnostics.push(format!(
                    "extraction output for unknown document '{doc_id}' ignored"
                ));
            }
            Some(expected_fields) => {
                for field in fields.keys() {
                    if !expected_fields.contains_key(field) {
                        diagnostics.push(format!(
                            "extracted field '{field}' on document '{doc_id}' has no ground truth, ignored"
                        ));
                    }
                }
            }
        }
    }

    records
}
