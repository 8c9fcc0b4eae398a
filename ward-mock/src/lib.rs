//! Mock patient sources for the ward board: a seedable random roster and a
//! JSON fixture loader.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use tracing::{debug, info};
use ward_core::{
    BoardError, ChatMessage, DynValues, Patient, PatientSeeder, PatientStatus, RiskLevel, Trend,
    Vital, VitalKey,
};

const UNITS: [&str; 5] = ["ЦКБ №1", "ГБ №1", "ГБ №2", "МКДЦ", "ГБ №3"];
const NAMES: [&str; 6] = ["Анна", "Иван", "Виктор", "Мария", "Олег", "Ксения"];
const SEXES: [&str; 2] = ["Ж", "М"];

/// Starter conversation attached to every seeded patient.
const PATIENT_CHAT: [(&str, &str, u32, u32); 2] = [
    (
        "Георгий А.А • Кардиохирург",
        "Высокий уровень лейкоцитов — нужна помощь.",
        11,
        13,
    ),
    (
        "Анна В.А • Кардиолог",
        "Попробуйте скорректировать питание.",
        11,
        15,
    ),
];

const COMMON_CHAT: [(&str, &str, u32, u32); 2] = [
    (
        "Геннадий А.А • Кардиохирург",
        "Ознакомился с приказом 513. Что делать с пунктом №2",
        11,
        13,
    ),
    (
        "Олег В.А • Кардиохирург",
        "Включите его в общий документ",
        11,
        15,
    ),
];

/// Roster layout: (risk, first id number, count).
const ROSTER: [(RiskLevel, u32, u32); 3] = [
    (RiskLevel::High, 1, 10),
    (RiskLevel::Medium, 20, 15),
    (RiskLevel::Low, 40, 12),
];

/// Random roster generator. The same seed always yields the same patients
/// for the same `today`.
#[derive(Debug, Clone)]
pub struct RandomSeeder {
    rng: StdRng,
}

impl RandomSeeder {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[self.rng.gen_range(0..options.len())]
    }

    fn make_patient(&mut self, number: u32, risk: RiskLevel, today: NaiveDate) -> Patient {
        let id = format!("p-{number}");
        let dates = monitoring_dates(today);

        let unit = self.pick(&UNITS).to_string();
        let bed = format!("Оргт 1:{}", self.rng.gen_range(1..=6));
        let name = self.pick(&NAMES).to_string();
        let sex = self.pick(&SEXES);
        let age = format!("{sex} {} лет", self.rng.gen_range(22..=78));
        let code = format!(
            "A {}.{}",
            self.rng.gen_range(10..=16),
            self.rng.gen_range(1..=9)
        );
        let tags = if self.rng.gen_bool(0.4) {
            vec!["МКЦЦ".to_string(), "ИВЛ".to_string()]
        } else {
            vec!["ИВЛ".to_string()]
        };
        let extended = self.rng.gen_bool(0.2);

        let vitals = vec![
            Vital::new(VitalKey::Sofa, f64::from(self.rng.gen_range(6..=15_u32))).flagged(true),
            Vital::new(VitalKey::Spo2, f64::from(self.rng.gen_range(88..=100_u32)))
                .with_trend(Trend::Up),
            Vital::new(VitalKey::Hr, f64::from(self.rng.gen_range(60..=145_u32)))
                .with_trend(Trend::Flat),
            Vital::new(
                VitalKey::Bp,
                format!(
                    "{}/{}",
                    self.rng.gen_range(90..=160),
                    self.rng.gen_range(60..=100)
                ),
            ),
            Vital::new(
                VitalKey::Temp,
                format!("{:.1}", 36.0 + self.rng.gen::<f64>() * 2.0),
            ),
        ];

        let chat = PATIENT_CHAT
            .iter()
            .enumerate()
            .map(|(index, &(author, text, hour, minute))| ChatMessage {
                id: format!("{id}-m{}", index + 1),
                author: author.to_string(),
                text: text.to_string(),
                sent_at: at_time(today, hour, minute),
                attachments: Vec::new(),
            })
            .collect();

        Patient {
            id,
            unit,
            bed,
            case_id: "КД-14".to_string(),
            name,
            age,
            code,
            risk,
            vitals,
            tags,
            extended,
            status: PatientStatus::Active,
            notes: Vec::new(),
            tasks: Vec::new(),
            chat,
            routes: Vec::new(),
            dyn_dates: dates,
            // Cells start empty; missing entries read back as "".
            dyn_values: DynValues::new(),
        }
    }
}

impl PatientSeeder for RandomSeeder {
    fn seed(&mut self, today: NaiveDate) -> Vec<Patient> {
        let mut patients = Vec::new();
        for (risk, first, count) in ROSTER {
            for number in first..first + count {
                patients.push(self.make_patient(number, risk, today));
            }
        }
        info!(patients = patients.len(), %today, "seeded mock roster");
        patients
    }
}

/// Today plus the two previous days, newest first.
fn monitoring_dates(today: NaiveDate) -> Vec<NaiveDate> {
    (0..3)
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .collect()
}

fn at_time(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| day.and_time(NaiveTime::default()))
}

/// The two starter messages of the shared department channel.
pub fn common_channel_seed(today: NaiveDate) -> Vec<ChatMessage> {
    COMMON_CHAT
        .iter()
        .enumerate()
        .map(|(index, &(author, text, hour, minute))| ChatMessage {
            id: format!("common-{}", index + 1),
            author: author.to_string(),
            text: text.to_string(),
            sent_at: at_time(today, hour, minute),
            attachments: Vec::new(),
        })
        .collect()
}

/// Load a fixed patient set from a JSON string.
pub fn load_patients_str(json: &str) -> Result<Vec<Patient>, BoardError> {
    let value: Value =
        serde_json::from_str(json).map_err(|err| BoardError::Parse(err.to_string()))?;
    load_patients_value(value)
}

/// Load a fixed patient set from a `serde_json::Value`.
///
/// Accepts either a bare array of patients or an object with a `patients`
/// array.
pub fn load_patients_value(value: Value) -> Result<Vec<Patient>, BoardError> {
    let list = match value {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => map.remove("patients").ok_or_else(|| {
            BoardError::Parse("Expected an array or an object with `patients`".to_string())
        })?,
        other => {
            return Err(BoardError::Parse(format!(
                "Expected patient array, received {}",
                kind_of(&other)
            )))
        }
    };

    let patients: Vec<Patient> =
        serde_json::from_value(list).map_err(|err| BoardError::Parse(err.to_string()))?;
    debug!(patients = patients.len(), "loaded patient fixture");
    Ok(patients)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
    }

    #[test]
    fn roster_ids_follow_risk_blocks() {
        let patients = RandomSeeder::new(1).seed(today());
        assert_eq!(patients.len(), 37);
        assert_eq!(patients[0].id, "p-1");
        assert_eq!(patients[9].id, "p-10");
        assert_eq!(patients[10].id, "p-20");
        assert_eq!(patients[36].id, "p-51");
        assert!(patients[..10].iter().all(|p| p.risk == RiskLevel::High));
        assert!(patients[25..].iter().all(|p| p.risk == RiskLevel::Low));
    }

    #[test]
    fn seeded_values_stay_in_range() {
        for patient in RandomSeeder::new(7).seed(today()) {
            assert!(UNITS.contains(&patient.unit.as_str()));
            assert!(NAMES.contains(&patient.name.as_str()));
            assert_eq!(patient.vitals.len(), 5);
            assert!(patient.vitals[0].abnormal);
            assert_eq!(patient.dyn_dates.len(), 3);
            assert_eq!(patient.dyn_dates[0], today());
            assert_eq!(patient.chat.len(), 2);
            assert_eq!(patient.reading("sofa", today()), "");
        }
    }

    #[test]
    fn loader_rejects_scalars() {
        let err = load_patients_str("42").expect_err("number is not a roster");
        assert!(matches!(err, BoardError::Parse(message) if message.contains("number")));
    }

    #[test]
    fn common_seed_has_two_messages_in_order() {
        let common = common_channel_seed(today());
        assert_eq!(common.len(), 2);
        assert!(common[0].sent_at < common[1].sent_at);
        assert_eq!(common[1].time_label(), "11:15");
    }
}
