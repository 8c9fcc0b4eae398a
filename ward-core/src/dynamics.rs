//! Bảng động thái: hàng là chỉ số lâm sàng, cột là ngày theo dõi.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::BoardError;
use crate::model::{DynValues, Patient, PatientPatch, Reading};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct DynRow {
    pub key: &'static str,
    pub label: &'static str,
    /// Hàng tiêu đề nhóm, không có ô nhập.
    pub group: bool,
}

const fn group(key: &'static str, label: &'static str) -> DynRow {
    DynRow {
        key,
        label,
        group: true,
    }
}

const fn param(key: &'static str, label: &'static str) -> DynRow {
    DynRow {
        key,
        label,
        group: false,
    }
}

pub static DYNAMICS_ROWS: [DynRow; 35] = [
    group("scales", "Шкалы"),
    param("sofa", "SOFA"),
    param("apache", "APACHE"),
    param("gcs", "ШКГ"),
    group("neuro", "Сознание"),
    param("neuro_note", "Сознание"),
    group("cv", "Сердечно-сосудистая система"),
    param("hemo", "Гемодинамика"),
    param("bp", "АД"),
    param("hr", "ЧСС"),
    param("inotrop", "Инотропная/вазопрессорная поддержка"),
    param("cv_note", "Особенности"),
    group("resp", "Дыхательная система"),
    param("vent", "ИВЛ"),
    param("rr", "ЧД"),
    param("spo2", "SpO2"),
    param("mode", "Режим"),
    param("vin", "Vin"),
    param("pip", "PIP"),
    param("peep", "PEEP"),
    param("fio2", "FIO2"),
    param("petco2", "PetCO2"),
    group("hep1", "Гепаторенальная функция"),
    param("diuresis", "Темп диуреза"),
    param("urea", "Мочевина"),
    param("crea", "Креатинин"),
    param("bili", "Билирубин"),
    param("alt", "АЛТ"),
    param("ast", "АСТ"),
    param("hep_note", "Особенности"),
    group("hem", "Гемоторенальная функция"),
    param("hb", "Hb"),
    param("rbc", "Эритроциты"),
    param("hct", "Ht"),
    param("plt", "Тромбоциты"),
];

pub fn find_row(key: &str) -> Option<&'static DynRow> {
    DYNAMICS_ROWS.iter().find(|row| row.key == key)
}

/// Nhãn cột ngày dạng DD.MM.YYYY.
pub fn date_label(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DynamicsRowView {
    pub key: &'static str,
    pub label: &'static str,
    pub group: bool,
    /// `None` với hàng tiêu đề; ô trống là chuỗi rỗng.
    pub cells: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DynamicsTable {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<DynamicsRowView>,
}

pub fn build_table(patient: &Patient) -> DynamicsTable {
    let rows = DYNAMICS_ROWS
        .iter()
        .map(|row| DynamicsRowView {
            key: row.key,
            label: row.label,
            group: row.group,
            cells: (!row.group).then(|| {
                patient
                    .dyn_dates
                    .iter()
                    .map(|&date| patient.reading(row.key, date))
                    .collect()
            }),
        })
        .collect();

    DynamicsTable {
        dates: patient.dyn_dates.clone(),
        rows,
    }
}

/// Thêm cột hôm nay vào đầu; `None` nếu ngày đó đã có.
pub fn add_monitoring_column(dates: &[NaiveDate], today: NaiveDate) -> Option<Vec<NaiveDate>> {
    if dates.contains(&today) {
        return None;
    }
    let mut next = Vec::with_capacity(dates.len() + 1);
    next.push(today);
    next.extend_from_slice(dates);
    Some(next)
}

/// Ghi một ô; các ô khác giữ nguyên.
pub fn write_cell(
    values: &DynValues,
    row_key: &str,
    date: NaiveDate,
    value: Reading,
) -> Result<DynValues, BoardError> {
    let row = find_row(row_key).ok_or_else(|| BoardError::UnknownRow(row_key.to_string()))?;
    if row.group {
        return Err(BoardError::GroupRowNotEditable(row.label.to_string()));
    }

    let mut next = values.clone();
    next.entry(row.key.to_string())
        .or_default()
        .insert(date, value);
    Ok(next)
}

pub fn monitoring_column_patch(patient: &Patient, today: NaiveDate) -> Option<PatientPatch> {
    add_monitoring_column(&patient.dyn_dates, today).map(|dates| PatientPatch {
        dyn_dates: Some(dates),
        ..PatientPatch::default()
    })
}

pub fn cell_patch(
    patient: &Patient,
    row_key: &str,
    date: NaiveDate,
    value: Reading,
) -> Result<PatientPatch, BoardError> {
    let values = write_cell(&patient.dyn_values, row_key, date, value)?;
    Ok(PatientPatch {
        dyn_values: Some(values),
        ..PatientPatch::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{day, patient};
    use crate::model::RiskLevel;

    #[test]
    fn canonical_rows_have_unique_keys() {
        let mut keys: Vec<&str> = DYNAMICS_ROWS.iter().map(|row| row.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), DYNAMICS_ROWS.len());
        assert_eq!(DYNAMICS_ROWS.iter().filter(|row| row.group).count(), 6);
    }

    #[test]
    fn monitoring_column_is_added_once_per_day() {
        let today = day("2026-10-19");
        let dates = vec![day("2026-10-18"), day("2026-10-17")];

        let once = add_monitoring_column(&dates, today).expect("cột mới");
        assert_eq!(once, [today, day("2026-10-18"), day("2026-10-17")]);
        assert!(add_monitoring_column(&once, today).is_none());
    }

    #[test]
    fn cell_write_leaves_other_cells_alone() {
        let mut p = patient("p-1", "ГБ №1", RiskLevel::High);
        let (d1, d2) = (day("2026-10-19"), day("2026-10-18"));
        p.dyn_dates = vec![d1, d2];
        p.dyn_values = write_cell(&p.dyn_values, "hr", d2, Reading::Number(88.0))
            .expect("hàng hợp lệ");

        let next = write_cell(&p.dyn_values, "hr", d1, "120".into()).expect("hàng hợp lệ");
        assert_eq!(next["hr"][&d1], Reading::Text("120".to_string()));
        assert_eq!(next["hr"][&d2], Reading::Number(88.0));
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn group_rows_and_unknown_rows_reject_writes() {
        let values = DynValues::new();
        let date = day("2026-10-19");
        assert!(matches!(
            write_cell(&values, "scales", date, "x".into()),
            Err(BoardError::GroupRowNotEditable(_))
        ));
        assert!(matches!(
            write_cell(&values, "nope", date, "x".into()),
            Err(BoardError::UnknownRow(_))
        ));
    }

    #[test]
    fn table_fills_missing_cells_with_empty_strings() {
        let mut p = patient("p-1", "ГБ №1", RiskLevel::High);
        let date = day("2026-10-19");
        p.dyn_dates = vec![date];
        p.dyn_values = write_cell(&p.dyn_values, "sofa", date, Reading::Number(7.0))
            .expect("hàng hợp lệ");

        let table = build_table(&p);
        assert_eq!(table.rows.len(), DYNAMICS_ROWS.len());
        assert_eq!(table.rows[0].cells, None);
        assert_eq!(table.rows[1].cells, Some(vec!["7".to_string()]));
        assert_eq!(table.rows[2].cells, Some(vec![String::new()]));
    }

    #[test]
    fn typed_cell_text_survives_each_keystroke() {
        let mut p = patient("p-1", "ГБ №1", RiskLevel::High);
        let date = day("2026-10-19");
        p.dyn_dates = vec![date];

        for typed in ["36.6", "7,5", "0.25", "007", "120/80"] {
            let mut shown = String::new();
            for key in typed.chars() {
                shown.push(key);
                let patch = cell_patch(&p, "fio2", date, Reading::from(shown.clone()))
                    .expect("hàng hợp lệ");
                let mut next = p.clone();
                patch.apply_to(&mut next);
                shown = next.reading("fio2", date);
            }
            assert_eq!(shown, typed);
        }
    }

    #[test]
    fn date_label_is_day_first() {
        assert_eq!(date_label(day("2026-10-09")), "09.10.2026");
    }
}
