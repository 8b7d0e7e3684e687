//! Raw listing → flat record mapping.
//!
//! Nested source objects may be absent entirely or arrive with missing
//! sub-keys; every gap maps to null, never to a failed record.

use crate::db::JobRecord;
use crate::fetcher::RawListing;

pub fn normalize(raw: &RawListing) -> JobRecord {
    JobRecord {
        id: raw.id.clone(),
        title: raw.title.clone(),
        company: raw.company.as_ref().and_then(|c| c.display_name.clone()),
        area_list: raw
            .location
            .as_ref()
            .and_then(|l| l.area.as_deref())
            .map(encode_area_list),
        location: raw.location.as_ref().and_then(|l| l.display_name.clone()),
        category: raw.category.as_ref().and_then(|c| c.label.clone()),
        salary_min: raw.salary_min,
        salary_max: raw.salary_max,
        salary_is_predicted: raw.salary_is_predicted.clone(),
        latitude: raw.latitude,
        longitude: raw.longitude,
        contract_type: raw.contract_type.clone(),
        contract_time: raw.contract_time.clone(),
        description: raw.description.clone(),
        created: raw.created.clone(),
        redirect_url: raw.redirect_url.clone(),
    }
}

/// Serialize the hierarchical area breadcrumb for storage.
pub fn encode_area_list(area: &[String]) -> String {
    serde_json::to_string(area).unwrap_or_default()
}

/// Decode a stored breadcrumb back into its ordered form.
pub fn decode_area_list(raw: &str) -> Option<Vec<String>> {
    serde_json::from_str(raw).ok()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{CategoryRef, CompanyRef, LocationRef};

    #[test]
    fn missing_nested_objects_map_to_null() {
        let raw = RawListing {
            id: Some("1".to_string()),
            title: Some("Data Analyst".to_string()),
            ..Default::default()
        };
        let rec = normalize(&raw);
        assert_eq!(rec.id.as_deref(), Some("1"));
        assert!(rec.company.is_none());
        assert!(rec.location.is_none());
        assert!(rec.area_list.is_none());
        assert!(rec.category.is_none());
    }

    #[test]
    fn nested_object_without_subkey_maps_to_null() {
        let raw = RawListing {
            id: Some("1".to_string()),
            company: Some(CompanyRef { display_name: None }),
            location: Some(LocationRef {
                display_name: Some("London".to_string()),
                area: None,
            }),
            ..Default::default()
        };
        let rec = normalize(&raw);
        assert!(rec.company.is_none());
        assert_eq!(rec.location.as_deref(), Some("London"));
        assert!(rec.area_list.is_none());
    }

    #[test]
    fn full_listing_flattens() {
        let raw = RawListing {
            id: Some("42".to_string()),
            title: Some("Data Scientist".to_string()),
            company: Some(CompanyRef {
                display_name: Some("Acme".to_string()),
            }),
            location: Some(LocationRef {
                display_name: Some("London".to_string()),
                area: Some(vec!["UK".to_string(), "London".to_string()]),
            }),
            category: Some(CategoryRef {
                label: Some("IT Jobs".to_string()),
            }),
            salary_min: Some(50000.0),
            salary_max: Some(70000.0),
            ..Default::default()
        };
        let rec = normalize(&raw);
        assert_eq!(rec.company.as_deref(), Some("Acme"));
        assert_eq!(rec.category.as_deref(), Some("IT Jobs"));
        assert_eq!(rec.area_list.as_deref(), Some(r#"["UK","London"]"#));
        assert_eq!(rec.salary_max, Some(70000.0));
    }

    #[test]
    fn area_list_roundtrips() {
        let area = vec!["UK".to_string(), "London".to_string(), "Camden".to_string()];
        let encoded = encode_area_list(&area);
        assert_eq!(decode_area_list(&encoded), Some(area));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert_eq!(decode_area_list("not json"), None);
        assert_eq!(decode_area_list(r#"{"a":1}"#), None);
    }

    #[test]
    fn empty_area_encodes_and_decodes() {
        let encoded = encode_area_list(&[]);
        assert_eq!(decode_area_list(&encoded), Some(vec![]));
    }
}
