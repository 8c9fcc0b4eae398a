//! Mô hình dữ liệu bệnh nhân và các bản ghi đi kèm.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Mức nguy cơ, quyết định cột hiển thị trên bảng.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Thứ tự cột cố định trên bảng.
    pub const ALL: [RiskLevel; 3] = [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low];

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Low => "low",
        }
    }

    /// Tiêu đề cột.
    pub fn title(self) -> &'static str {
        match self {
            RiskLevel::High => "Высокий риск",
            RiskLevel::Medium => "Умеренный риск",
            RiskLevel::Low => "Низкий риск",
        }
    }

    /// Nhãn ngắn dùng trong KPI và menu chuyển cột.
    pub fn short_label(self) -> &'static str {
        match self {
            RiskLevel::High => "Высокий",
            RiskLevel::Medium => "Умеренный",
            RiskLevel::Low => "Низкий",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            RiskLevel::High => "#ff4d4f",
            RiskLevel::Medium => "#fa8c16",
            RiskLevel::Low => "#52c41a",
        }
    }
}

/// Tab lọc theo mức nguy cơ.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskTab {
    #[default]
    All,
    High,
    Medium,
    Low,
}

impl RiskTab {
    pub fn level(self) -> Option<RiskLevel> {
        match self {
            RiskTab::All => None,
            RiskTab::High => Some(RiskLevel::High),
            RiskTab::Medium => Some(RiskLevel::Medium),
            RiskTab::Low => Some(RiskLevel::Low),
        }
    }
}

impl From<RiskLevel> for RiskTab {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::High => RiskTab::High,
            RiskLevel::Medium => RiskTab::Medium,
            RiskLevel::Low => RiskTab::Low,
        }
    }
}

/// Phạm vi hiển thị: tất cả, bệnh nhân đã ghim, hoặc một cơ sở.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Scope {
    #[default]
    All,
    Mine,
    Org { org: String },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VitalKey {
    Sofa,
    Spo2,
    Hr,
    Bp,
    Temp,
}

impl VitalKey {
    pub const ALL: [VitalKey; 5] = [
        VitalKey::Sofa,
        VitalKey::Spo2,
        VitalKey::Hr,
        VitalKey::Bp,
        VitalKey::Temp,
    ];

    pub fn label(self) -> &'static str {
        match self {
            VitalKey::Sofa => "SOFA",
            VitalKey::Spo2 => "SpO₂",
            VitalKey::Hr => "ЧСС",
            VitalKey::Bp => "АД",
            VitalKey::Temp => "T°",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

/// Giá trị đo: số hoặc chuỗi tự do (ví dụ huyết áp "120/80").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
}

impl Reading {
    pub fn is_blank(&self) -> bool {
        matches!(self, Reading::Text(text) if text.trim().is_empty())
    }
}

impl Default for Reading {
    fn default() -> Self {
        Reading::Text(String::new())
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reading::Number(value) if value.fract() == 0.0 => write!(f, "{value:.0}"),
            Reading::Number(value) => write!(f, "{value}"),
            Reading::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for Reading {
    fn from(value: &str) -> Self {
        Reading::Text(value.to_string())
    }
}

impl From<String> for Reading {
    fn from(value: String) -> Self {
        Reading::Text(value)
    }
}

impl From<f64> for Reading {
    fn from(value: f64) -> Self {
        Reading::Number(value)
    }
}

/// Một chỉ số sống hiển thị dạng "pill" trên thẻ bệnh nhân.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vital {
    pub key: VitalKey,
    pub label: String,
    pub value: Reading,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<Trend>,
    #[serde(default)]
    pub abnormal: bool,
}

impl Vital {
    pub fn new(key: VitalKey, value: impl Into<Reading>) -> Self {
        Self {
            key,
            label: key.label().to_string(),
            value: value.into(),
            trend: None,
            abnormal: false,
        }
    }

    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = Some(trend);
        self
    }

    pub fn flagged(mut self, abnormal: bool) -> Self {
        self.abnormal = abnormal;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PatientStatus {
    #[default]
    Active,
    Transferred,
    Deceased,
}

/// Tệp đính kèm (chỉ giữ metadata, không có nội dung).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

impl AttachmentRef {
    /// Nhãn hiển thị, kèm dung lượng KB nếu có.
    pub fn label(&self) -> String {
        match self.size_bytes {
            Some(size) => format!("{} • {:.1} КБ", self.name, size as f64 / 1024.0),
            None => self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: String,
    pub text: String,
    pub at: NaiveDateTime,
}

/// Loại nhiệm vụ, gán tường minh khi tạo.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    #[default]
    Task,
    Consultation,
}

/// Tiền tố mà dữ liệu cũ dùng để đánh dấu hội chẩn.
pub const CONSULTATION_MARKER: &str = "консультация:";

/// Suy ra loại nhiệm vụ từ văn bản: hội chẩn khi phần đã trim, viết thường
/// bắt đầu bằng `CONSULTATION_MARKER`.
pub fn classify_task_text(text: &str) -> TaskKind {
    if text.trim().to_lowercase().starts_with(CONSULTATION_MARKER) {
        TaskKind::Consultation
    } else {
        TaskKind::Task
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "TaskRecord", rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    pub due: Option<NaiveDate>,
    pub done: bool,
    pub kind: TaskKind,
    pub created_at: Option<NaiveDateTime>,
}

impl Task {
    pub fn is_consultation(&self) -> bool {
        self.kind == TaskKind::Consultation
    }

    /// Tiêu đề hiển thị; hội chẩn có tiền tố "Консультация:".
    pub fn title(&self) -> String {
        match self.kind {
            TaskKind::Consultation if classify_task_text(&self.text) == TaskKind::Task => {
                format!("Консультация: {}", self.text)
            }
            _ => self.text.clone(),
        }
    }
}

/// Dạng tuần tự hóa của `Task`; bản ghi cũ có thể thiếu `kind`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: String,
    text: String,
    #[serde(default)]
    due: Option<NaiveDate>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    kind: Option<TaskKind>,
    #[serde(default)]
    created_at: Option<NaiveDateTime>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let kind = record
            .kind
            .unwrap_or_else(|| classify_task_text(&record.text));
        Self {
            id: record.id,
            text: record.text,
            due: record.due,
            done: record.done,
            kind,
            created_at: record.created_at,
        }
    }
}

/// Sự kiện chuyển viện (đã lên kế hoạch hoặc đã thực hiện).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteEvent {
    pub id: String,
    pub date: NaiveDate,
    pub to_org: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub recorded_at: NaiveDateTime,
}

impl RouteEvent {
    pub fn title(&self) -> String {
        match &self.comment {
            Some(comment) => format!("Перевод → {} ({comment})", self.to_org),
            None => format!("Перевод → {}", self.to_org),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub author: String,
    pub text: String,
    pub sent_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentRef>,
}

impl ChatMessage {
    /// Giờ gửi dạng HH:MM.
    pub fn time_label(&self) -> String {
        self.sent_at.format("%H:%M").to_string()
    }
}

/// Tin nhắn kênh chung có cùng cấu trúc với tin nhắn theo bệnh nhân.
pub type CommonMessage = ChatMessage;

/// Bảng động thái: khóa chỉ số → ngày → giá trị.
pub type DynValues = BTreeMap<String, BTreeMap<NaiveDate, Reading>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub unit: String,
    pub bed: String,
    pub case_id: String,
    pub name: String,
    pub age: String,
    pub code: String,
    pub risk: RiskLevel,
    #[serde(default)]
    pub vitals: Vec<Vital>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub extended: bool,
    #[serde(default)]
    pub status: PatientStatus,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub chat: Vec<ChatMessage>,
    #[serde(default)]
    pub routes: Vec<RouteEvent>,
    #[serde(default)]
    pub dyn_dates: Vec<NaiveDate>,
    #[serde(default)]
    pub dyn_values: DynValues,
}

impl Patient {
    /// Đọc một ô của bảng động thái; ô trống trả về chuỗi rỗng.
    pub fn reading(&self, row_key: &str, date: NaiveDate) -> String {
        self.dyn_values
            .get(row_key)
            .and_then(|cells| cells.get(&date))
            .map(Reading::to_string)
            .unwrap_or_default()
    }

    /// Các trường dùng cho tìm kiếm tự do.
    pub fn search_fields(&self) -> [&str; 6] {
        [
            &self.name,
            &self.unit,
            &self.code,
            &self.case_id,
            &self.age,
            &self.bed,
        ]
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.chat.last()
    }
}

/// Bản vá nông cho `Patient`: trường `Some` ghi đè, `None` giữ nguyên.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientPatch {
    pub unit: Option<String>,
    pub bed: Option<String>,
    pub case_id: Option<String>,
    pub name: Option<String>,
    pub age: Option<String>,
    pub code: Option<String>,
    pub risk: Option<RiskLevel>,
    pub vitals: Option<Vec<Vital>>,
    pub tags: Option<Vec<String>>,
    pub extended: Option<bool>,
    pub status: Option<PatientStatus>,
    pub notes: Option<Vec<Note>>,
    pub tasks: Option<Vec<Task>>,
    pub chat: Option<Vec<ChatMessage>>,
    pub routes: Option<Vec<RouteEvent>>,
    pub dyn_dates: Option<Vec<NaiveDate>>,
    pub dyn_values: Option<DynValues>,
}

impl PatientPatch {
    pub fn risk(level: RiskLevel) -> Self {
        Self {
            risk: Some(level),
            ..Self::default()
        }
    }

    pub fn extended(enabled: bool) -> Self {
        Self {
            extended: Some(enabled),
            ..Self::default()
        }
    }

    pub fn status(status: PatientStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Ghép bản vá vào bản ghi, không đụng tới `id`.
    pub fn apply_to(self, patient: &mut Patient) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = self.$field {
                    patient.$field = value;
                })*
            };
        }

        merge!(
            unit, bed, case_id, name, age, code, risk, vitals, tags, extended, status, notes,
            tasks, chat, routes, dyn_dates, dyn_values,
        );
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M")
            .expect("ngày giờ mẫu hợp lệ")
    }

    pub fn day(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("ngày mẫu hợp lệ")
    }

    pub fn patient(id: &str, unit: &str, risk: RiskLevel) -> Patient {
        Patient {
            id: id.to_string(),
            unit: unit.to_string(),
            bed: "Оргт 1:1".to_string(),
            case_id: "КД-14".to_string(),
            name: "Анна".to_string(),
            age: "Ж 40 лет".to_string(),
            code: "A 12.3".to_string(),
            risk,
            vitals: VitalKey::ALL
                .into_iter()
                .map(|key| Vital::new(key, 1.0))
                .collect(),
            tags: vec!["ИВЛ".to_string()],
            extended: false,
            status: PatientStatus::Active,
            notes: Vec::new(),
            tasks: Vec::new(),
            chat: Vec::new(),
            routes: Vec::new(),
            dyn_dates: Vec::new(),
            dyn_values: DynValues::new(),
        }
    }

    pub fn task(id: &str, text: &str, kind: TaskKind, created: NaiveDateTime) -> Task {
        Task {
            id: id.to_string(),
            text: text.to_string(),
            due: None,
            done: false,
            kind,
            created_at: Some(created),
        }
    }

    pub fn message(id: &str, text: &str, sent_at: NaiveDateTime) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            author: "Анна В.А • Кардиолог".to_string(),
            text: text.to_string(),
            sent_at,
            attachments: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn consultation_prefix_is_case_insensitive_but_needs_colon() {
        assert_eq!(
            classify_task_text("Консультация: кардиолог"),
            TaskKind::Consultation
        );
        assert_eq!(
            classify_task_text("  консультация: невролог"),
            TaskKind::Consultation
        );
        assert_eq!(classify_task_text("консультация завтра"), TaskKind::Task);
        assert_eq!(classify_task_text("Обычная задача"), TaskKind::Task);
        assert_eq!(
            classify_task_text("Нужна Консультация: позже"),
            TaskKind::Task
        );
    }

    #[test]
    fn legacy_task_without_kind_is_classified_from_text() {
        let json = r#"[
            {"id": "t1", "text": "Консультация: кардиолог"},
            {"id": "t2", "text": "консультация завтра"},
            {"id": "t3", "text": "Обычная задача", "kind": "consultation"}
        ]"#;
        let tasks: Vec<Task> = serde_json::from_str(json).expect("JSON mẫu hợp lệ");
        assert!(tasks[0].is_consultation());
        assert!(!tasks[1].is_consultation());
        assert!(tasks[2].is_consultation());
    }

    #[test]
    fn consultation_title_does_not_double_the_marker() {
        let created = at("2026-10-19", "09:00");
        let explicit = task("t1", "кардиолог", TaskKind::Consultation, created);
        assert_eq!(explicit.title(), "Консультация: кардиолог");

        let legacy = task("t2", "Консультация: кардиолог", TaskKind::Consultation, created);
        assert_eq!(legacy.title(), "Консультация: кардиолог");
    }

    #[test]
    fn missing_dynamics_cell_reads_as_empty() {
        let mut p = patient("p-1", "ГБ №1", RiskLevel::High);
        let date = day("2026-10-19");
        assert_eq!(p.reading("sofa", date), "");

        p.dyn_values
            .entry("sofa".to_string())
            .or_default()
            .insert(date, Reading::Number(9.0));
        assert_eq!(p.reading("sofa", date), "9");
        assert_eq!(p.reading("sofa", day("2026-10-18")), "");
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let original = patient("p-1", "ГБ №1", RiskLevel::Low);
        let mut patched = original.clone();
        PatientPatch {
            name: Some("Иван".to_string()),
            ..PatientPatch::default()
        }
        .apply_to(&mut patched);

        assert_eq!(patched.name, "Иван");
        patched.name = original.name.clone();
        assert_eq!(patched, original);
    }

    #[test]
    fn attachment_label_shows_kilobytes() {
        let file = AttachmentRef {
            name: "ЭКГ.pdf".to_string(),
            size_bytes: Some(2048),
        };
        assert_eq!(file.label(), "ЭКГ.pdf • 2.0 КБ");
    }
}
