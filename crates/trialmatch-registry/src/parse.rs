//! Parsing of raw registry responses into [`TrialRecord`]s.
//!
//! Serde models cover only the subset of the study schema this system
//! reads. Every field is optional on the wire; extraction applies the
//! fallback chain per field and skips records that lack an identifier.

use serde::Deserialize;

use crate::types::TrialRecord;

// =============================================================================
// Wire types (consumed subset of the v2 study schema)
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStudiesPage {
    #[serde(default)]
    pub studies: Vec<RawStudy>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStudy {
    #[serde(default)]
    pub protocol_section: ProtocolSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolSection {
    #[serde(default)]
    pub identification_module: IdentificationModule,
    #[serde(default)]
    pub status_module: StatusModule,
    #[serde(default)]
    pub design_module: DesignModule,
    #[serde(default)]
    pub contacts_locations_module: ContactsLocationsModule,
    #[serde(default)]
    pub sponsor_collaborators_module: SponsorCollaboratorsModule,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentificationModule {
    pub nct_id: Option<String>,
    pub brief_title: Option<String>,
    pub official_title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusModule {
    pub overall_status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignModule {
    #[serde(default)]
    pub phases: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactsLocationsModule {
    #[serde(default)]
    pub locations: Vec<RawSite>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSite {
    pub facility: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SponsorCollaboratorsModule {
    pub lead_sponsor: Option<LeadSponsor>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSponsor {
    pub name: Option<String>,
}

// =============================================================================
// Extraction
// =============================================================================

/// Flatten a raw page into trial records.
///
/// `requested_location` backfills records whose first site omits geography.
/// A study without an NCT identifier is skipped and logged; a bad record
/// never aborts the batch.
pub fn parse_page(
    page: &RawStudiesPage,
    requested_location: &str,
    nationwide: bool,
) -> Vec<TrialRecord> {
    let mut records = Vec::with_capacity(page.studies.len());
    for study in &page.studies {
        match parse_study(study, requested_location, nationwide) {
            Some(record) => records.push(record),
            None => {
                tracing::warn!("Skipping registry study with no NCT identifier");
            }
        }
    }
    records
}

fn parse_study(
    study: &RawStudy,
    requested_location: &str,
    nationwide: bool,
) -> Option<TrialRecord> {
    let protocol = &study.protocol_section;
    let ident = &protocol.identification_module;

    let nct_id = ident.nct_id.as_deref().filter(|id| !id.is_empty())?;

    let title = ident
        .brief_title
        .clone()
        .or_else(|| ident.official_title.clone())
        .unwrap_or_else(|| "Untitled Study".to_string());

    let status = protocol
        .status_module
        .overall_status
        .as_deref()
        .map(display_status)
        .unwrap_or_else(|| "Unknown".to_string());

    let phase = protocol
        .design_module
        .phases
        .first()
        .map(|p| display_phase(p))
        .unwrap_or_else(|| "Not Specified".to_string());

    let first_site = protocol.contacts_locations_module.locations.first();
    let facility = first_site
        .and_then(|s| s.facility.clone())
        .unwrap_or_else(|| "Multiple Sites".to_string());
    let location = first_site
        .and_then(|s| match (s.city.as_deref(), s.state.as_deref()) {
            (Some(city), Some(state)) if !city.is_empty() && !state.is_empty() => {
                Some(format!("{} {}", city, state))
            }
            _ => None,
        })
        .unwrap_or_else(|| requested_location.to_string());

    let sponsor = protocol
        .sponsor_collaborators_module
        .lead_sponsor
        .as_ref()
        .and_then(|s| s.name.clone())
        .unwrap_or_else(|| "Unknown Sponsor".to_string());

    Some(TrialRecord {
        registry_id: nct_id.to_string(),
        title,
        phase,
        status,
        location,
        facility,
        sponsor,
        link: format!("https://clinicaltrials.gov/study/{}", nct_id),
        is_nationwide: nationwide,
    })
}

/// Render the registry's internal phase labels for display:
/// `PHASE2` → "Phase 2", `EARLY_PHASE1` → "Early Phase 1".
fn display_phase(raw: &str) -> String {
    match raw {
        "NA" => "Not Applicable".to_string(),
        "EARLY_PHASE1" => "Early Phase 1".to_string(),
        other if other.starts_with("PHASE") => {
            format!("Phase {}", &other["PHASE".len()..])
        }
        other => other.to_string(),
    }
}

/// Render the registry's SCREAMING_SNAKE status labels for display:
/// `RECRUITING` → "Recruiting", `ACTIVE_NOT_RECRUITING` → "Active Not
/// Recruiting".
fn display_status(raw: &str) -> String {
    raw.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(json: &str) -> RawStudiesPage {
        serde_json::from_str(json).unwrap()
    }

    const FULL_STUDY: &str = r#"{
        "studies": [{
            "protocolSection": {
                "identificationModule": {
                    "nctId": "NCT04567890",
                    "briefTitle": "Pembrolizumab in Early Breast Cancer",
                    "officialTitle": "A Phase 2 Study of Pembrolizumab"
                },
                "statusModule": { "overallStatus": "RECRUITING" },
                "designModule": { "phases": ["PHASE2"] },
                "contactsLocationsModule": {
                    "locations": [
                        { "facility": "Dana-Farber Cancer Institute", "city": "Boston", "state": "Massachusetts" },
                        { "facility": "Second Site", "city": "Cambridge", "state": "Massachusetts" }
                    ]
                },
                "sponsorCollaboratorsModule": {
                    "leadSponsor": { "name": "Dana-Farber" }
                }
            }
        }]
    }"#;

    // ---- Full record ----

    #[test]
    fn test_parse_full_study() {
        let records = parse_page(&page(FULL_STUDY), "Boston Massachusetts", false);
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.registry_id, "NCT04567890");
        assert_eq!(rec.title, "Pembrolizumab in Early Breast Cancer");
        assert_eq!(rec.phase, "Phase 2");
        assert_eq!(rec.status, "Recruiting");
        assert_eq!(rec.location, "Boston Massachusetts");
        assert_eq!(rec.facility, "Dana-Farber Cancer Institute");
        assert_eq!(rec.sponsor, "Dana-Farber");
        assert_eq!(rec.link, "https://clinicaltrials.gov/study/NCT04567890");
        assert!(!rec.is_nationwide);
    }

    #[test]
    fn test_nationwide_flag_applied() {
        let records = parse_page(&page(FULL_STUDY), "Boston Massachusetts", true);
        assert!(records[0].is_nationwide);
    }

    // ---- Fallback chain ----

    #[test]
    fn test_title_falls_back_to_official_then_placeholder() {
        let records = parse_page(
            &page(
                r#"{ "studies": [{ "protocolSection": { "identificationModule": {
                    "nctId": "NCT1", "officialTitle": "Official Only" } } }] }"#,
            ),
            "x",
            false,
        );
        assert_eq!(records[0].title, "Official Only");

        let records = parse_page(
            &page(
                r#"{ "studies": [{ "protocolSection": { "identificationModule": {
                    "nctId": "NCT1" } } }] }"#,
            ),
            "x",
            false,
        );
        assert_eq!(records[0].title, "Untitled Study");
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let records = parse_page(
            &page(
                r#"{ "studies": [{ "protocolSection": { "identificationModule": {
                    "nctId": "NCT2", "briefTitle": "Minimal" } } }] }"#,
            ),
            "Fargo North Dakota",
            false,
        );
        let rec = &records[0];
        assert_eq!(rec.status, "Unknown");
        assert_eq!(rec.phase, "Not Specified");
        assert_eq!(rec.facility, "Multiple Sites");
        assert_eq!(rec.location, "Fargo North Dakota");
        assert_eq!(rec.sponsor, "Unknown Sponsor");
    }

    #[test]
    fn test_site_without_geography_uses_requested_location() {
        let records = parse_page(
            &page(
                r#"{ "studies": [{ "protocolSection": {
                    "identificationModule": { "nctId": "NCT3", "briefTitle": "T" },
                    "contactsLocationsModule": { "locations": [ { "facility": "Somewhere" } ] }
                } }] }"#,
            ),
            "Boise Idaho",
            false,
        );
        assert_eq!(records[0].facility, "Somewhere");
        assert_eq!(records[0].location, "Boise Idaho");
    }

    // ---- Skip-and-continue ----

    #[test]
    fn test_study_without_id_is_skipped_not_fatal() {
        let records = parse_page(
            &page(
                r#"{ "studies": [
                    { "protocolSection": { "identificationModule": { "briefTitle": "No ID" } } },
                    { "protocolSection": { "identificationModule": { "nctId": "NCT4", "briefTitle": "Good" } } }
                ] }"#,
            ),
            "x",
            false,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].registry_id, "NCT4");
    }

    #[test]
    fn test_empty_page_parses_to_empty_vec() {
        assert!(parse_page(&page(r#"{ "studies": [] }"#), "x", false).is_empty());
        assert!(parse_page(&page(r#"{}"#), "x", false).is_empty());
    }

    // ---- Display normalization ----

    #[test]
    fn test_display_phase_forms() {
        assert_eq!(display_phase("PHASE1"), "Phase 1");
        assert_eq!(display_phase("PHASE2"), "Phase 2");
        assert_eq!(display_phase("PHASE3"), "Phase 3");
        assert_eq!(display_phase("EARLY_PHASE1"), "Early Phase 1");
        assert_eq!(display_phase("NA"), "Not Applicable");
        assert_eq!(display_phase("Phase 2"), "Phase 2");
    }

    #[test]
    fn test_display_status_forms() {
        assert_eq!(display_status("RECRUITING"), "Recruiting");
        assert_eq!(
            display_status("ACTIVE_NOT_RECRUITING"),
            "Active Not Recruiting"
        );
        assert_eq!(display_status("ENROLLING_BY_INVITATION"), "Enrolling By Invitation");
        assert_eq!(display_status(""), "");
    }
}
