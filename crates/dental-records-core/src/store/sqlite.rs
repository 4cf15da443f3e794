//! SQLite-backed record store.

use super::{RecordStore, StoreError, StoreResult};
use crate::db::Database;
use crate::models::{NewVisit, RecordId, VisitField, VisitFields, VisitRecord};

impl RecordStore for Database {
    fn insert(&self, visit: &NewVisit) -> StoreResult<VisitRecord> {
        Ok(self.insert_visit(visit)?)
    }

    fn select_all(&self) -> StoreResult<Vec<VisitRecord>> {
        Ok(self.list_visits()?)
    }

    fn select_column(&self, field: VisitField) -> StoreResult<Vec<String>> {
        Ok(self.column_values(field)?)
    }

    fn update(&self, id: RecordId, fields: &VisitFields) -> StoreResult<()> {
        if self.update_visit(id, fields)? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }

    fn delete(&self, id: RecordId) -> StoreResult<()> {
        if self.delete_visit(id)? {
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_visit(file_number: &str) -> NewVisit {
        NewVisit {
            fields: VisitFields {
                file_number: file_number.into(),
                name: "Sara".into(),
                ..VisitFields::default()
            },
            created_at: "2026-10-18T10:00:00".into(),
        }
    }

    #[test]
    fn test_store_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let store: &dyn RecordStore = &db;

        let inserted = store.insert(&new_visit("A1")).unwrap();
        let all = store.select_all().unwrap();
        assert_eq!(all, vec![inserted]);
    }

    #[test]
    fn test_missing_ids_are_not_found() {
        let db = Database::open_in_memory().unwrap();

        let err = db.update(RecordId(5), &VisitFields::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(RecordId(5))));

        let err = db.delete(RecordId(5)).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(RecordId(5))));
    }
}
