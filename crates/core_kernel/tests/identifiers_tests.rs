//! Unit tests for strongly-typed identifiers

use core_kernel::{
    CompanyId, ClientId, LocationId, FacilityProfileId,
    SeasonalRuleId, MonthlyOverrideId, ServiceLineItemId,
};
use std::collections::BTreeSet;
use uuid::Uuid;

#[test]
fn test_prefixes() {
    assert!(CompanyId::new().to_string().starts_with("CMP-"));
    assert!(ClientId::new().to_string().starts_with("CLI-"));
    assert!(LocationId::new().to_string().starts_with("LOC-"));
    assert!(FacilityProfileId::new().to_string().starts_with("FAC-"));
    assert!(SeasonalRuleId::new().to_string().starts_with("SSN-"));
    assert!(MonthlyOverrideId::new().to_string().starts_with("MOV-"));
    assert!(ServiceLineItemId::new().to_string().starts_with("SLI-"));
}

#[test]
fn test_new_v7_ids_sort_by_creation() {
    let first = FacilityProfileId::new_v7();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = FacilityProfileId::new_v7();
    assert!(first < second);

    let set: BTreeSet<_> = [second, first].into_iter().collect();
    assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![first, second]);
}

#[test]
fn test_invalid_string_fails_to_parse() {
    assert!("FAC-not-a-uuid".parse::<FacilityProfileId>().is_err());
}

#[test]
fn test_serializes_transparently() {
    let uuid = Uuid::new_v4();
    let id = ClientId::from_uuid(uuid);
    assert_eq!(serde_json::to_value(id).unwrap(), serde_json::json!(uuid.to_string()));
}
