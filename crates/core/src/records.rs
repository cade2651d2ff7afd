//! Site, labour and attendance records consumed by reports.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    amount::{lenient, lenient_hours, lenient_id, lenient_total},
    calendar::lenient_date,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteStatus {
    Completed,
    OnHold,
    #[default]
    OnProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabourType {
    OfficeStaff,
    HireWorker,
    SubcontractorLabour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    HalfDay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: i64,
    pub site_name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_date::deserialize")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date::deserialize")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_total::deserialize")]
    pub budget: Decimal,
    #[serde(default)]
    pub status: SiteStatus,
}

impl Site {
    pub fn is_active(&self) -> bool {
        self.status == SiteStatus::OnProgress
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Labour {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub site_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub labour_group_id: Option<i64>,
    pub full_name: String,
    pub labour_type: LabourType,
    #[serde(default, deserialize_with = "lenient::deserialize")]
    pub daily_wage: Decimal,
    #[serde(default)]
    pub status: RecordStatus,
}

impl Labour {
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub site_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_id::deserialize")]
    pub labour_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_date::deserialize")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub status: AttendanceStatus,
    #[serde(default, deserialize_with = "lenient_hours::deserialize")]
    pub hours_worked: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn site_defaults_to_in_progress() {
        let site: Site =
            serde_json::from_str(r#"{"id":1,"siteName":"Tower A","budget":"1500000.00"}"#)
                .expect("site");
        assert!(site.is_active());
        assert_eq!(site.budget, dec!(1500000));
    }

    #[test]
    fn labour_parses_snake_case_enums() {
        let labour: Labour = serde_json::from_str(
            r#"{"id":3,"fullName":"Ravi","labourType":"subcontractor_labour","dailyWage":"650","status":"inactive"}"#,
        )
        .expect("labour");
        assert_eq!(labour.labour_type, LabourType::SubcontractorLabour);
        assert!(!labour.is_active());
    }

    #[test]
    fn attendance_status_defaults_to_present() {
        let entry: Attendance =
            serde_json::from_str(r#"{"labourId":3,"date":"2024-05-02"}"#).expect("attendance");
        assert_eq!(entry.status, AttendanceStatus::Present);
        assert_eq!(entry.hours_worked, Decimal::ZERO);
    }

    #[test]
    fn hours_worked_outside_column_range_becomes_zero() {
        let entry: Attendance =
            serde_json::from_str(r#"{"labourId":3,"hoursWorked":"8.5"}"#).expect("attendance");
        assert_eq!(entry.hours_worked, dec!(8.5));

        let entry: Attendance =
            serde_json::from_str(r#"{"labourId":3,"hoursWorked":240}"#).expect("attendance");
        assert_eq!(entry.hours_worked, Decimal::ZERO);
    }
}
