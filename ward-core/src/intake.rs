//! Form tiếp nhận bệnh nhân: kiểm tra trường bắt buộc, tính điểm (mô phỏng),
//! chuyển thành bản ghi `Patient`.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{
    DynValues, Patient, PatientStatus, Reading, RiskLevel, Vital, VitalKey,
};

/// Mức ý thức, tra bảng ra điểm Glasgow.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Consciousness {
    #[default]
    Clear,
    Obtunded,
    Stupor,
    Coma1,
    Coma2,
    Coma3,
    Sedated,
}

impl Consciousness {
    pub const ALL: [Consciousness; 7] = [
        Consciousness::Clear,
        Consciousness::Obtunded,
        Consciousness::Stupor,
        Consciousness::Coma1,
        Consciousness::Coma2,
        Consciousness::Coma3,
        Consciousness::Sedated,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Consciousness::Clear => "ясное",
            Consciousness::Obtunded => "оглушение",
            Consciousness::Stupor => "сопор",
            Consciousness::Coma1 => "кома1",
            Consciousness::Coma2 => "кома2",
            Consciousness::Coma3 => "кома3",
            Consciousness::Sedated => "седация",
        }
    }

    pub fn gcs(self) -> u8 {
        match self {
            Consciousness::Clear => 15,
            Consciousness::Obtunded => 13,
            Consciousness::Stupor => 10,
            Consciousness::Coma1 => 8,
            Consciousness::Coma2 => 6,
            Consciousness::Coma3 => 4,
            Consciousness::Sedated => 9,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[default]
    Male,
    Female,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    pub fn short(self) -> &'static str {
        match self {
            Sex::Male => "М",
            Sex::Female => "Ж",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sex::Male => "Мужской",
            Sex::Female => "Женский",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosisType {
    Preliminary,
    #[default]
    Clinical,
}

impl DiagnosisType {
    pub const ALL: [DiagnosisType; 2] = [DiagnosisType::Preliminary, DiagnosisType::Clinical];

    pub fn label(self) -> &'static str {
        match self {
            DiagnosisType::Preliminary => "Предварительный",
            DiagnosisType::Clinical => "Клинический",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisEntry {
    pub date: Option<NaiveDate>,
    pub icd_code: Option<String>,
    pub text: Option<String>,
}

/// Giá trị form tiếp nhận, giữ nguyên như người dùng nhập.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct IntakeForm {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub birth_date: Option<NaiveDate>,
    pub sex: Sex,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub mrn: String,
    pub admit_at: Option<NaiveDateTime>,
    pub bed_no: Option<u32>,
    pub department: Option<String>,
    pub diagnosis_type: DiagnosisType,
    pub diagnoses: Vec<DiagnosisEntry>,
    pub consciousness: Option<Consciousness>,
    pub vasopressors: bool,
    pub ventilation: bool,
    pub rr: Option<f64>,
    pub spo2: Option<f64>,
    pub temp: Option<f64>,
    pub hr: Option<f64>,
    pub sbp: Option<f64>,
    pub dbp: Option<f64>,
    pub fio2: Option<f64>,
    pub peep: Option<f64>,
    pub lactate: Option<f64>,
    pub sofa: Option<u8>,
    pub apache: Option<u8>,
    pub gcs_score: Option<u8>,
    pub extended: bool,
}

/// Điểm tính theo yêu cầu, từng trường một.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScoreField {
    Sofa,
    Apache,
    Gcs,
}

const DEFAULT_RR: f64 = 16.0;
const DEFAULT_SPO2: f64 = 96.0;
const DEFAULT_TEMP: f64 = 36.8;
const DEFAULT_HR: f64 = 80.0;
const DEFAULT_SBP: f64 = 110.0;

fn clamp_score(raw: f64, max: u8) -> u8 {
    raw.round().clamp(0.0, f64::from(max)) as u8
}

/// Công thức tuyến tính mô phỏng, kẹp trong [0, 24].
pub fn calc_sofa(form: &IntakeForm) -> u8 {
    let raw = form.rr.unwrap_or(DEFAULT_RR) / 4.0
        + form.spo2.unwrap_or(DEFAULT_SPO2) / 10.0
        + form.temp.unwrap_or(DEFAULT_TEMP) / 5.0
        + form.hr.unwrap_or(DEFAULT_HR) / 50.0
        + form.sbp.unwrap_or(DEFAULT_SBP) / 60.0;
    clamp_score(raw, 24)
}

/// Công thức tuyến tính mô phỏng, kẹp trong [0, 71].
pub fn calc_apache(form: &IntakeForm) -> u8 {
    let raw = form.temp.unwrap_or(DEFAULT_TEMP) * 2.0
        + form.hr.unwrap_or(DEFAULT_HR) / 2.0
        + form.spo2.unwrap_or(DEFAULT_SPO2) / 3.0
        + form.rr.unwrap_or(DEFAULT_RR) / 2.0;
    clamp_score(raw, 71)
}

pub fn calc_gcs(form: &IntakeForm) -> u8 {
    form.consciousness.unwrap_or_default().gcs()
}

/// Mức nguy cơ ban đầu suy từ điểm SOFA đã nhập.
pub fn risk_from_sofa(sofa: Option<u8>) -> RiskLevel {
    match sofa {
        Some(score) if score >= 10 => RiskLevel::High,
        Some(score) if score >= 6 => RiskLevel::Medium,
        Some(_) => RiskLevel::Low,
        None => RiskLevel::Medium,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum IntakeField {
    LastName,
    FirstName,
    Mrn,
    AdmitAt,
    BedNo,
    Department,
}

impl IntakeField {
    /// Thông báo hiển thị ngay dưới trường.
    pub fn message(self) -> &'static str {
        match self {
            IntakeField::LastName => "Укажите фамилию",
            IntakeField::FirstName => "Укажите имя",
            IntakeField::Mrn => "Укажите № ИБ",
            IntakeField::AdmitAt => "Укажите дату поступления",
            IntakeField::BedNo => "Выберите койку",
            IntakeField::Department => "Выберите отделение",
        }
    }
}

/// Tất cả trường bắt buộc còn thiếu.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", summary(.missing))]
pub struct IntakeErrors {
    pub missing: Vec<IntakeField>,
}

fn summary(fields: &[IntakeField]) -> String {
    fields
        .iter()
        .map(|field| field.message())
        .collect::<Vec<_>>()
        .join("; ")
}

impl IntakeErrors {
    pub fn message_for(&self, field: IntakeField) -> Option<&'static str> {
        self.missing
            .contains(&field)
            .then(|| field.message())
    }
}

/// Form đã qua kiểm tra; các trường bắt buộc chắc chắn có mặt.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidIntake {
    form: IntakeForm,
    admit_at: NaiveDateTime,
    bed_no: u32,
    department: String,
}

impl IntakeForm {
    /// Gán kết quả tính cho một trường điểm.
    pub fn calculate(&mut self, field: ScoreField) {
        match field {
            ScoreField::Sofa => self.sofa = Some(calc_sofa(self)),
            ScoreField::Apache => self.apache = Some(calc_apache(self)),
            ScoreField::Gcs => self.gcs_score = Some(calc_gcs(self)),
        }
    }

    /// Nhãn "Койка №N / Отделение" hoặc "—" khi chưa chọn đủ.
    pub fn bed_label(&self) -> String {
        match (self.bed_no, self.department.as_deref()) {
            (Some(bed), Some(department)) if !department.is_empty() => {
                format!("Койка №{bed} / {department}")
            }
            _ => "—".to_string(),
        }
    }

    pub fn validate(&self) -> Result<ValidIntake, IntakeErrors> {
        let mut missing = Vec::new();
        if self.last_name.trim().is_empty() {
            missing.push(IntakeField::LastName);
        }
        if self.first_name.trim().is_empty() {
            missing.push(IntakeField::FirstName);
        }
        if self.mrn.trim().is_empty() {
            missing.push(IntakeField::Mrn);
        }
        if self.admit_at.is_none() {
            missing.push(IntakeField::AdmitAt);
        }
        if self.bed_no.is_none() {
            missing.push(IntakeField::BedNo);
        }
        let department = self
            .department
            .as_deref()
            .map(str::trim)
            .filter(|department| !department.is_empty());
        if department.is_none() {
            missing.push(IntakeField::Department);
        }

        match (self.admit_at, self.bed_no, department) {
            (Some(admit_at), Some(bed_no), Some(department)) if missing.is_empty() => {
                Ok(ValidIntake {
                    form: self.clone(),
                    admit_at,
                    bed_no,
                    department: department.to_string(),
                })
            }
            _ => Err(IntakeErrors { missing }),
        }
    }
}

fn format_number(value: f64) -> String {
    Reading::Number(value).to_string()
}

impl ValidIntake {
    pub fn form(&self) -> &IntakeForm {
        &self.form
    }

    /// Dựng bản ghi bệnh nhân với một cột động thái (ngày nhập viện).
    pub fn into_patient(self, id: String) -> Patient {
        let form = self.form;
        let admit_date = self.admit_at.date();

        let age = match form.birth_date.and_then(|birth| admit_date.years_since(birth)) {
            Some(years) => format!("{} {years} лет", form.sex.short()),
            None => "—".to_string(),
        };
        let code = form
            .diagnoses
            .iter()
            .find_map(|entry| entry.icd_code.clone().filter(|code| !code.is_empty()))
            .unwrap_or_else(|| "—".to_string());

        let reading = |value: Option<f64>| value.map(Reading::Number).unwrap_or_else(|| "—".into());
        let blood_pressure = match (form.sbp, form.dbp) {
            (Some(sbp), Some(dbp)) => Some(Reading::Text(format!(
                "{}/{}",
                format_number(sbp),
                format_number(dbp)
            ))),
            (Some(sbp), None) => Some(Reading::Number(sbp)),
            _ => None,
        };
        let vitals = vec![
            Vital::new(
                VitalKey::Sofa,
                form.sofa
                    .map(|score| Reading::Number(f64::from(score)))
                    .unwrap_or_else(|| "—".into()),
            )
            .flagged(form.sofa.is_some_and(|score| score >= 10)),
            Vital::new(VitalKey::Spo2, reading(form.spo2)),
            Vital::new(VitalKey::Hr, reading(form.hr)),
            Vital::new(
                VitalKey::Bp,
                blood_pressure.clone().unwrap_or_else(|| "—".into()),
            ),
            Vital::new(
                VitalKey::Temp,
                form.temp
                    .map(|temp| Reading::Text(format!("{temp:.1}")))
                    .unwrap_or_else(|| "—".into()),
            ),
        ];

        let mut dyn_values = DynValues::new();
        let mut put = |key: &str, value: Option<Reading>| {
            if let Some(value) = value.filter(|value| !value.is_blank()) {
                dyn_values
                    .entry(key.to_string())
                    .or_default()
                    .insert(admit_date, value);
            }
        };
        let score = |value: Option<u8>| value.map(|score| Reading::Number(f64::from(score)));
        put("sofa", score(form.sofa));
        put("apache", score(form.apache));
        put("gcs", score(form.gcs_score));
        put(
            "neuro_note",
            form.consciousness.map(|state| state.label().into()),
        );
        put("bp", blood_pressure);
        put("hr", form.hr.map(Reading::Number));
        put("rr", form.rr.map(Reading::Number));
        put("spo2", form.spo2.map(Reading::Number));
        put("fio2", form.fio2.map(Reading::Number));
        put("peep", form.peep.map(Reading::Number));
        put("vent", form.ventilation.then(|| "Да".into()));
        put("inotrop", form.vasopressors.then(|| "Да".into()));

        let mut tags = Vec::new();
        if form.ventilation {
            tags.push("ИВЛ".to_string());
        }

        Patient {
            id,
            unit: self.department,
            bed: format!("Койка №{}", self.bed_no),
            case_id: form.mrn.trim().to_string(),
            name: format!("{} {}", form.last_name.trim(), form.first_name.trim()),
            age,
            code,
            risk: risk_from_sofa(form.sofa),
            vitals,
            tags,
            extended: form.extended,
            status: PatientStatus::Active,
            notes: Vec::new(),
            tasks: Vec::new(),
            chat: Vec::new(),
            routes: Vec::new(),
            dyn_dates: vec![admit_date],
            dyn_values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{at, day};

    fn filled() -> IntakeForm {
        IntakeForm {
            last_name: "Иванов".to_string(),
            first_name: "Иван".to_string(),
            mrn: "ИБ-77".to_string(),
            admit_at: Some(at("2026-10-19", "08:30")),
            bed_no: Some(4),
            department: Some("ОРИТ 2".to_string()),
            ..IntakeForm::default()
        }
    }

    #[test]
    fn defaults_clamp_to_upper_bounds() {
        let form = IntakeForm::default();
        // 4 + 9.6 + 7.36 + 1.6 + 1.83 ≈ 24.4
        assert_eq!(calc_sofa(&form), 24);
        assert_eq!(calc_apache(&form), 71);
        assert_eq!(calc_gcs(&form), 15);
    }

    #[test]
    fn sofa_follows_linear_formula() {
        let form = IntakeForm {
            rr: Some(8.0),
            spo2: Some(50.0),
            temp: Some(10.0),
            hr: Some(50.0),
            sbp: Some(60.0),
            ..IntakeForm::default()
        };
        // 2 + 5 + 2 + 1 + 1
        assert_eq!(calc_sofa(&form), 11);
    }

    #[test]
    fn apache_never_goes_below_zero() {
        let form = IntakeForm {
            temp: Some(-100.0),
            hr: Some(0.0),
            spo2: Some(0.0),
            rr: Some(0.0),
            ..IntakeForm::default()
        };
        assert_eq!(calc_apache(&form), 0);
    }

    #[test]
    fn gcs_lookup_covers_every_state() {
        let scores: Vec<u8> = Consciousness::ALL.iter().map(|state| state.gcs()).collect();
        assert_eq!(scores, [15, 13, 10, 8, 6, 4, 9]);
        assert!(scores.iter().all(|score| (4..=15).contains(score)));
    }

    #[test]
    fn calculate_only_fills_requested_field() {
        let mut form = IntakeForm {
            consciousness: Some(Consciousness::Stupor),
            ..IntakeForm::default()
        };
        form.calculate(ScoreField::Gcs);
        assert_eq!(form.gcs_score, Some(10));
        assert_eq!(form.sofa, None);
        assert_eq!(form.apache, None);
    }

    #[test]
    fn validation_lists_every_missing_required_field() {
        let err = IntakeForm::default().validate().expect_err("form rỗng");
        assert_eq!(
            err.missing,
            [
                IntakeField::LastName,
                IntakeField::FirstName,
                IntakeField::Mrn,
                IntakeField::AdmitAt,
                IntakeField::BedNo,
                IntakeField::Department,
            ]
        );
        assert_eq!(err.message_for(IntakeField::LastName), Some("Укажите фамилию"));
    }

    #[test]
    fn whitespace_only_last_name_is_missing() {
        let form = IntakeForm {
            last_name: "   ".to_string(),
            ..filled()
        };
        let err = form.validate().expect_err("thiếu họ");
        assert_eq!(err.missing, [IntakeField::LastName]);
        assert_eq!(err.message_for(IntakeField::Mrn), None);
    }

    #[test]
    fn valid_form_becomes_patient() {
        let mut form = IntakeForm {
            birth_date: Some(day("1980-11-01")),
            sex: Sex::Female,
            sbp: Some(120.0),
            dbp: Some(80.0),
            hr: Some(95.0),
            ventilation: true,
            diagnoses: vec![DiagnosisEntry {
                icd_code: Some("A00".to_string()),
                ..DiagnosisEntry::default()
            }],
            ..filled()
        };
        form.sofa = Some(12);

        let patient = form.validate().expect("form hợp lệ").into_patient("p-new".to_string());
        let admitted = day("2026-10-19");

        assert_eq!(patient.name, "Иванов Иван");
        assert_eq!(patient.unit, "ОРИТ 2");
        assert_eq!(patient.bed, "Койка №4");
        assert_eq!(patient.case_id, "ИБ-77");
        assert_eq!(patient.age, "Ж 45 лет");
        assert_eq!(patient.code, "A00");
        assert_eq!(patient.risk, RiskLevel::High);
        assert_eq!(patient.vitals.len(), 5);
        assert!(patient.vitals[0].abnormal);
        assert_eq!(patient.tags, ["ИВЛ"]);
        assert_eq!(patient.dyn_dates, [admitted]);
        assert_eq!(patient.reading("bp", admitted), "120/80");
        assert_eq!(patient.reading("vent", admitted), "Да");
        assert_eq!(patient.reading("apache", admitted), "");
    }

    #[test]
    fn risk_thresholds_from_sofa() {
        assert_eq!(risk_from_sofa(None), RiskLevel::Medium);
        assert_eq!(risk_from_sofa(Some(5)), RiskLevel::Low);
        assert_eq!(risk_from_sofa(Some(6)), RiskLevel::Medium);
        assert_eq!(risk_from_sofa(Some(10)), RiskLevel::High);
    }

    #[test]
    fn bed_label_needs_both_parts() {
        assert_eq!(filled().bed_label(), "Койка №4 / ОРИТ 2");
        assert_eq!(IntakeForm::default().bed_label(), "—");
    }
}
