//! Fixed Persian UI labels.

use crate::models::VisitField;

pub const DEFAULT_CLINIC_NAME: &str = "کلینیک دندانپزشکی پارسه";

pub const SAVED_NOTICE: &str = "اطلاعات با موفقیت ذخیره شد";
pub const HISTORY_TITLE: &str = "تاریخچه شماره پرونده";
pub const DATE_TIME: &str = "تاریخ و ساعت";
pub const NO_DATA: &str = "No data available";

pub const DETAIL_FILE_NUMBER: &str = "شماره پرونده";
pub const DETAIL_NAME: &str = "نام";
pub const DETAIL_FATHER_NAME: &str = "نام پدر";

/// Column header for a field in the records and history tables.
pub fn field_label(field: VisitField) -> &'static str {
    match field {
        VisitField::FileNumber => "شماره پرونده",
        VisitField::Name => "نام و نام خانوادگی",
        VisitField::FatherName => "نام پدر",
        VisitField::Doctor => "پزشک",
        VisitField::CorrectiveDoctor => "پزشک اصلاح",
        VisitField::Services => "خدمات",
        VisitField::WhichTooth => "جزییات خدمات",
        VisitField::ReturnDoctor => "پزشک عودت",
        VisitField::ReturnReason => "دلیل عودت",
    }
}

/// Dialog title for one file number's history.
pub fn history_title(file_number: &str) -> String {
    format!("{} {}", HISTORY_TITLE, file_number)
}
