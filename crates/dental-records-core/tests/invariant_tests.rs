//! Property tests for grouping, filtering and the Jalali calendar.

use std::collections::HashSet;

use chrono::NaiveDate;
use dental_records_core::browser::{group_by_file_number, matches_term};
use dental_records_core::calendar::{is_leap_year, ClinicClock, JalaliDate};
use dental_records_core::forms::distinct_values;
use dental_records_core::{RecordId, VisitField, VisitFields, VisitRecord};
use proptest::prelude::*;

fn arb_record(id: i64) -> impl Strategy<Value = VisitRecord> {
    (
        prop::sample::select(vec!["A1", "A2", "B7", "", "۱۲"]),
        "[a-zA-Z ]{0,8}",
        "[a-zA-Z]{0,6}",
        prop::sample::select(vec!["Dr. Karimi", "Dr. Rahimi", ""]),
        0u32..28,
    )
        .prop_map(move |(file_number, name, services, doctor, day)| VisitRecord {
            id: RecordId(id),
            fields: VisitFields {
                file_number: file_number.to_string(),
                name,
                services,
                doctor: doctor.to_string(),
                ..VisitFields::default()
            },
            created_at: format!("2026-02-{:02}T09:30:00", day + 1),
        })
}

fn arb_records() -> impl Strategy<Value = Vec<VisitRecord>> {
    (0usize..20).prop_flat_map(|n| {
        (0..n)
            .map(|i| arb_record(i as i64 + 1))
            .collect::<Vec<_>>()
    })
}

proptest! {
    #[test]
    fn prop_groups_are_exhaustive_and_disjoint(records in arb_records()) {
        let groups = group_by_file_number(&records);

        let keys: HashSet<&str> = records.iter().map(|r| r.file_number()).collect();
        prop_assert_eq!(groups.len(), keys.len());

        let mut seen = HashSet::new();
        for group in &groups {
            prop_assert!(!group.is_empty());
            for record in &group.records {
                prop_assert_eq!(record.file_number(), group.file_number);
                prop_assert!(seen.insert(record.id));
            }
        }
        prop_assert_eq!(seen.len(), records.len());
    }

    #[test]
    fn prop_group_keeps_input_order(records in arb_records()) {
        for group in group_by_file_number(&records) {
            let ids: Vec<RecordId> = group.records.iter().map(|r| r.id).collect();
            let mut sorted = ids.clone();
            sorted.sort();
            prop_assert_eq!(ids, sorted);
        }
    }

    #[test]
    fn prop_search_matches_iff_substring(records in arb_records(), term in "[a-zA-Z0-9 .-]{0,4}") {
        let clock = ClinicClock::default();
        for record in &records {
            let expected = term.is_empty()
                || VisitField::SEARCHABLE
                    .iter()
                    .any(|field| record.fields.get(*field).contains(term.as_str()))
                || clock.jalali_date(&record.created_at).contains(term.as_str());
            prop_assert_eq!(matches_term(record, &term, &clock), expected);
        }
    }

    #[test]
    fn prop_jalali_round_trip(days in 0i64..(365 * 300)) {
        let start = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap();
        let date = start + chrono::Duration::days(days);
        let jalali = JalaliDate::from_gregorian(date);
        prop_assert_eq!(jalali.to_gregorian(), Some(date));

        let reparsed: JalaliDate = jalali.to_string().parse().unwrap();
        prop_assert_eq!(reparsed, jalali);
    }

    #[test]
    fn prop_esfand_length(year in 1300i32..1600) {
        let last = if is_leap_year(year) { 30 } else { 29 };
        prop_assert!(JalaliDate::new(year, 12, last).is_ok());
        prop_assert!(JalaliDate::new(year, 12, last + 1).is_err());
    }

    #[test]
    fn prop_distinct_values(values in prop::collection::vec("[ab]{0,2}", 0..30)) {
        let distinct = distinct_values(values.clone());

        let unique: HashSet<&String> = distinct.iter().collect();
        prop_assert_eq!(unique.len(), distinct.len());
        prop_assert!(distinct.iter().all(|v| !v.is_empty()));

        let firsts: Vec<String> = values
            .iter()
            .enumerate()
            .filter(|(i, v)| !v.is_empty() && !values[..*i].contains(v))
            .map(|(_, v)| v.clone())
            .collect();
        prop_assert_eq!(distinct, firsts);
    }
}
