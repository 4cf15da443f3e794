//! Visit record database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::{NewVisit, RecordId, VisitField, VisitFields, VisitRecord};

const SELECT_VISIT: &str = r#"
    SELECT id, file_number, name, father_name, doctor, corrective_doctor,
           services, which_tooth, return_doctor, return_reason, created_at
    FROM users
"#;

impl Database {
    /// Insert a new visit and return it with its assigned id.
    pub fn insert_visit(&self, visit: &NewVisit) -> DbResult<VisitRecord> {
        let fields = &visit.fields;
        self.conn.execute(
            r#"
            INSERT INTO users (
                file_number, name, father_name, doctor, corrective_doctor,
                services, which_tooth, return_doctor, return_reason, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                fields.file_number,
                fields.name,
                fields.father_name,
                fields.doctor,
                fields.corrective_doctor,
                fields.services,
                fields.which_tooth,
                fields.return_doctor,
                fields.return_reason,
                visit.created_at,
            ],
        )?;

        Ok(VisitRecord {
            id: RecordId(self.conn.last_insert_rowid()),
            fields: fields.clone(),
            created_at: visit.created_at.clone(),
        })
    }

    /// Get a visit by id.
    pub fn get_visit(&self, id: RecordId) -> DbResult<Option<VisitRecord>> {
        self.conn
            .query_row(
                &format!("{SELECT_VISIT} WHERE id = ?"),
                [id.0],
                visit_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// List all visits in insertion order.
    pub fn list_visits(&self) -> DbResult<Vec<VisitRecord>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_VISIT} ORDER BY id"))?;
        let rows = stmt.query_map([], visit_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Every value of one column in insertion order, `NULL` as empty.
    pub fn column_values(&self, field: VisitField) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM users ORDER BY id",
            field.column()
        ))?;
        let rows = stmt.query_map([], |row| {
            Ok(row.get::<_, Option<String>>(0)?.unwrap_or_default())
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Overwrite the user fields of a visit.
    pub fn update_visit(&self, id: RecordId, fields: &VisitFields) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE users SET
                file_number = ?2,
                name = ?3,
                father_name = ?4,
                doctor = ?5,
                corrective_doctor = ?6,
                services = ?7,
                which_tooth = ?8,
                return_doctor = ?9,
                return_reason = ?10
            WHERE id = ?1
            "#,
            params![
                id.0,
                fields.file_number,
                fields.name,
                fields.father_name,
                fields.doctor,
                fields.corrective_doctor,
                fields.services,
                fields.which_tooth,
                fields.return_doctor,
                fields.return_reason,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a visit.
    pub fn delete_visit(&self, id: RecordId) -> DbResult<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM users WHERE id = ?", [id.0])?;
        Ok(rows_affected > 0)
    }
}

fn visit_from_row(row: &Row<'_>) -> rusqlite::Result<VisitRecord> {
    let text = |index: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(index)?.unwrap_or_default())
    };

    Ok(VisitRecord {
        id: RecordId(row.get(0)?),
        fields: VisitFields {
            file_number: text(1)?,
            name: text(2)?,
            father_name: text(3)?,
            doctor: text(4)?,
            corrective_doctor: text(5)?,
            services: text(6)?,
            which_tooth: text(7)?,
            return_doctor: text(8)?,
            return_reason: text(9)?,
        },
        created_at: text(10)?,
    })
}
