use super::*;

/// Default categories for the field names the extraction pipeline emits
/// across claim, policy, medical, legal, and invoice documents. Person-name
/// fields share the organization-name rule: both want containment and token
/// overlap rather than strict equality.
const BUILTIN_FIELD_CATEGORIES: &[(&str, FieldCategory)] = &[
    ("loss_date", FieldCategory::Date),
    ("incident_date", FieldCategory::Date),
    ("date_reported", FieldCategory::Date),
    ("date_received", FieldCategory::Date),
    ("date_of_birth", FieldCategory::Date),
    ("dob", FieldCategory::Date),
    ("date_of_service", FieldCategory::Date),
    ("effective_date", FieldCategory::Date),
    ("expiration_date", FieldCategory::Date),
    ("inspection_date", FieldCategory::Date),
    ("filing_date", FieldCategory::Date),
    ("invoice_date", FieldCategory::Date),
    ("due_date", FieldCategory::Date),
    ("date_sent", FieldCategory::Date),
    ("claim_number", FieldCategory::Identifier),
    ("policy_number", FieldCategory::Identifier),
    ("case_number", FieldCategory::Identifier),
    ("report_number", FieldCategory::Identifier),
    ("badge_number", FieldCategory::Identifier),
    ("medical_record_number", FieldCategory::Identifier),
    ("endorsement_number", FieldCategory::Identifier),
    ("invoice_number", FieldCategory::Identifier),
    ("docket_number", FieldCategory::Identifier),
    ("insured_name", FieldCategory::OrganizationName),
    ("carrier_name", FieldCategory::OrganizationName),
    ("vendor_name", FieldCategory::OrganizationName),
    ("court_name", FieldCategory::OrganizationName),
    ("claimant_name", FieldCategory::OrganizationName),
    ("patient_name", FieldCategory::OrganizationName),
    ("physician_name", FieldCategory::OrganizationName),
    ("driver_name", FieldCategory::OrganizationName),
    ("officer_name", FieldCategory::OrganizationName),
    ("adjuster_name", FieldCategory::OrganizationName),
    ("judge_name", FieldCategory::OrganizationName),
    ("plaintiff", FieldCategory::OrganizationName),
    ("defendant", FieldCategory::OrganizationName),
    ("sender", FieldCategory::OrganizationName),
    ("recipient", FieldCategory::OrganizationName),
    ("first_name", FieldCategory::OrganizationName),
    ("last_name", FieldCategory::OrganizationName),
    ("loss_location", FieldCategory::AddressComponent),
    ("incident_location", FieldCategory::AddressComponent),
    ("property_address", FieldCategory::AddressComponent),
    ("claimant_address", FieldCategory::AddressComponent),
    ("loss_street", FieldCategory::AddressComponent),
    ("loss_city", FieldCategory::AddressComponent),
    ("claimant_city", FieldCategory::AddressComponent),
    ("loss_state", FieldCategory::AddressComponent),
    ("claimant_state", FieldCategory::AddressComponent),
    ("loss_zip", FieldCategory::AddressComponent),
    ("loss_country", FieldCategory::AddressComponent),
    ("incident_description", FieldCategory::FreeText),
    ("loss_description", FieldCategory::FreeText),
    ("cause_of_loss", FieldCategory::FreeText),
    ("diagnosis", FieldCategory::FreeText),
    ("treatment", FieldCategory::FreeText),
    ("chief_complaint", FieldCategory::FreeText),
    ("liability_determination", FieldCategory::FreeText),
    ("coverage_recommendation", FieldCategory::FreeText),
    ("vehicle_info", FieldCategory::FreeText),
    ("witness_names", FieldCategory::FreeText),
    ("medications", FieldCategory::FreeText),
    ("subject", FieldCategory::FreeText),
    ("email_body", FieldCategory::FreeText),
    // Amounts, codes, and the remaining schema fields compare strictly.
    ("estimated_damages", FieldCategory::Generic),
    ("damage_estimate", FieldCategory::Generic),
    ("premium", FieldCategory::Generic),
    ("deductible", FieldCategory::Generic),
    ("coverage_limits", FieldCategory::Generic),
    ("coverage_type", FieldCategory::Generic),
    ("total_amount", FieldCategory::Generic),
    ("payment_terms", FieldCategory::Generic),
    ("invoice_period", FieldCategory::Generic),
    ("incident_time", FieldCategory::Generic),
    ("icd_codes", FieldCategory::Generic),
    ("case_type", FieldCategory::Generic),
    ("citation_issued", FieldCategory::Generic),
];

#[derive(Debug, Deserialize)]
struct FieldConfigFile {
    #[serde(default)]
    fields: HashMap<String, String>,
}

/// Field name to comparison category, resolved once per run. Fields with
/// no entry score with the strict generic rule.
pub struct FieldCatalog {
    categories: HashMap<String, FieldCategory>,
}

impl FieldCatalog {
    pub fn builtin() -> Self {
        let categories = BUILTIN_FIELD_CATEGORIES
            .iter()
            .map(|(field, category)| ((*field).to_string(), *category))
            .collect();
        Self { categories }
    }

    /// Builtin catalog with entries from a config file layered on top.
    pub fn with_overrides(path: &Path, diagnostics: &mut Vec<String>) -> Result<Self> {
        let config: FieldConfigFile = load_json_file(path)?;
        let mut catalog = Self::builtin();
        catalog.apply_overrides(config.fields, diagnostics);
        Ok(catalog)
    }

    /// An unknown category string downgrades that field to generic instead
    /// of failing the run. Entries apply in sorted order so diagnostics
    /// come out deterministic.
    pub fn apply_overrides(
        &mut self,
        overrides: HashMap<String, String>,
        diagnostics: &mut Vec<String>,
    ) {
        let mut entries = overrides.into_iter().collect::<Vec<(String, String)>>();
        entries.sort();

        for (field, raw_category) in entries {
            match FieldCategory::parse(&raw_category) {
                Some(category) => {
                    self.categories.insert(field, category);
                }
                None => {
                    warn!(
                        field = %field,
                        category = %raw_category,
                        "unknown field category, using generic"
                    );
                    diagnostics.push(format!(
                        "field config: unknown category '{raw_category}' for field '{field}', using generic"
                    ));
                    self.categories.insert(field, FieldCategory::Generic);
                }
            }
        }
    }

    pub fn category_for(&self, field: &str) -> FieldCategory {
        self.categories
            .get(field)
            .copied()
            .unwrap_or(FieldCategory::Generic)
    }
}
