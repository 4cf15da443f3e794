//! Grouping of visit records by file number.

use std::collections::HashMap;

use crate::models::VisitRecord;

/// Every record sharing one file number, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordGroup<'a> {
    pub file_number: &'a str,
    pub records: Vec<&'a VisitRecord>,
}

impl<'a> RecordGroup<'a> {
    /// The record shown for this group in the main table.
    pub fn first(&self) -> &'a VisitRecord {
        self.records[0]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Group records by exact file number, groups in order of first appearance.
pub fn group_by_file_number<'a, I>(records: I) -> Vec<RecordGroup<'a>>
where
    I: IntoIterator<Item = &'a VisitRecord>,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<RecordGroup<'a>> = Vec::new();

    for record in records {
        let file_number = record.file_number();
        match index.get(file_number) {
            Some(&slot) => groups[slot].records.push(record),
            None => {
                index.insert(file_number, groups.len());
                groups.push(RecordGroup {
                    file_number,
                    records: vec![record],
                });
            }
        }
    }

    groups
}
