//! Tạo bản ghi mới (ghi chú, nhiệm vụ, chuyển viện, tin nhắn) và bản vá
//! tương ứng cho bệnh nhân.

use chrono::NaiveDate;
use tracing::debug;

use crate::collab::{Clock, IdGenerator};
use crate::model::{
    AttachmentRef, ChatMessage, Note, Patient, PatientPatch, RouteEvent, Task, TaskKind,
};

/// Gắn định danh và thời gian cho bản ghi do người dùng tạo.
pub struct RecordFactory<'a> {
    clock: &'a dyn Clock,
    ids: &'a dyn IdGenerator,
}

impl<'a> RecordFactory<'a> {
    pub fn new(clock: &'a dyn Clock, ids: &'a dyn IdGenerator) -> Self {
        Self { clock, ids }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn next_id(&self) -> String {
        self.ids.next_id()
    }

    /// `None` khi văn bản rỗng.
    pub fn note(&self, text: &str) -> Option<Note> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Note {
            id: self.ids.next_id(),
            text: text.to_string(),
            at: self.clock.now(),
        })
    }

    pub fn task(&self, text: &str, due: Option<NaiveDate>, kind: TaskKind) -> Option<Task> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Task {
            id: self.ids.next_id(),
            text: text.to_string(),
            due,
            done: false,
            kind,
            created_at: Some(self.clock.now()),
        })
    }

    /// Ngày chuyển mặc định là hôm nay.
    pub fn route(&self, date: Option<NaiveDate>, to_org: &str, comment: Option<&str>) -> RouteEvent {
        RouteEvent {
            id: self.ids.next_id(),
            date: date.unwrap_or_else(|| self.clock.today()),
            to_org: to_org.trim().to_string(),
            comment: comment
                .map(str::trim)
                .filter(|comment| !comment.is_empty())
                .map(str::to_string),
            recorded_at: self.clock.now(),
        }
    }

    /// `None` khi không có chữ và không có tệp đính kèm.
    pub fn message(
        &self,
        author: &str,
        text: &str,
        attachments: Vec<AttachmentRef>,
    ) -> Option<ChatMessage> {
        let text = text.trim();
        if text.is_empty() && attachments.is_empty() {
            debug!("bỏ qua tin nhắn rỗng");
            return None;
        }
        Some(ChatMessage {
            id: self.ids.next_id(),
            author: author.to_string(),
            text: text.to_string(),
            sent_at: self.clock.now(),
            attachments,
        })
    }
}

/// Ghi chú mới nằm đầu danh sách.
pub fn with_note(patient: &Patient, note: Note) -> PatientPatch {
    let mut notes = Vec::with_capacity(patient.notes.len() + 1);
    notes.push(note);
    notes.extend(patient.notes.iter().cloned());
    PatientPatch {
        notes: Some(notes),
        ..PatientPatch::default()
    }
}

pub fn with_task(patient: &Patient, task: Task) -> PatientPatch {
    let mut tasks = patient.tasks.clone();
    tasks.push(task);
    PatientPatch {
        tasks: Some(tasks),
        ..PatientPatch::default()
    }
}

/// Sự kiện chuyển viện mới nằm đầu danh sách.
pub fn with_route(patient: &Patient, route: RouteEvent) -> PatientPatch {
    let mut routes = Vec::with_capacity(patient.routes.len() + 1);
    routes.push(route);
    routes.extend(patient.routes.iter().cloned());
    PatientPatch {
        routes: Some(routes),
        ..PatientPatch::default()
    }
}

pub fn with_message(patient: &Patient, message: ChatMessage) -> PatientPatch {
    let mut chat = patient.chat.clone();
    chat.push(message);
    PatientPatch {
        chat: Some(chat),
        ..PatientPatch::default()
    }
}

/// Giá trị form lập kế hoạch bên trái trang chat.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanningForm {
    pub note: String,
    pub task_text: String,
    pub task_due: Option<NaiveDate>,
    pub consult_text: String,
    pub consult_due: Option<NaiveDate>,
    pub route_date: Option<NaiveDate>,
    pub route_org: String,
    pub route_comment: String,
}

/// Các bản ghi sinh ra từ một lần gửi form lập kế hoạch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlannedRecords {
    pub note: Option<Note>,
    pub task: Option<Task>,
    pub consult: Option<Task>,
    pub route: Option<RouteEvent>,
}

impl PlannedRecords {
    pub fn is_empty(&self) -> bool {
        self.note.is_none() && self.task.is_none() && self.consult.is_none() && self.route.is_none()
    }

    /// Gộp tất cả bản ghi vào một bản vá duy nhất.
    pub fn into_patch(self, patient: &Patient) -> PatientPatch {
        let mut current = patient.clone();
        let mut patch = PatientPatch::default();
        if let Some(note) = self.note {
            let step = with_note(&current, note);
            current.notes = step.notes.clone().unwrap_or_default();
            patch.notes = step.notes;
        }
        for task in [self.task, self.consult].into_iter().flatten() {
            let step = with_task(&current, task);
            current.tasks = step.tasks.clone().unwrap_or_default();
            patch.tasks = step.tasks;
        }
        if let Some(route) = self.route {
            patch.routes = with_route(&current, route).routes;
        }
        patch
    }
}

impl PlanningForm {
    /// Nhóm nào có dữ liệu thì tạo bản ghi; nhóm trống bị bỏ qua.
    pub fn build(&self, factory: &RecordFactory<'_>) -> PlannedRecords {
        let route = (self.route_date.is_some() || !self.route_org.trim().is_empty()).then(|| {
            factory.route(
                self.route_date,
                &self.route_org,
                Some(self.route_comment.as_str()),
            )
        });
        PlannedRecords {
            note: factory.note(&self.note),
            task: factory.task(&self.task_text, self.task_due, TaskKind::Task),
            consult: factory.task(&self.consult_text, self.consult_due, TaskKind::Consultation),
            route,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{FixedClock, SequentialIds};
    use crate::model::fixtures::{at, day, patient};
    use crate::model::RiskLevel;

    fn clock() -> FixedClock {
        FixedClock(at("2026-10-19", "14:05"))
    }

    #[test]
    fn empty_send_creates_nothing() {
        let (clock, ids) = (clock(), SequentialIds::new("m"));
        let factory = RecordFactory::new(&clock, &ids);
        assert!(factory.message("Вы", "", Vec::new()).is_none());
        assert!(factory.message("Вы", "   ", Vec::new()).is_none());
    }

    #[test]
    fn attachment_only_message_is_sent() {
        let (clock, ids) = (clock(), SequentialIds::new("m"));
        let factory = RecordFactory::new(&clock, &ids);
        let message = factory
            .message(
                "Вы",
                "",
                vec![AttachmentRef {
                    name: "снимок.png".to_string(),
                    size_bytes: None,
                }],
            )
            .expect("có tệp đính kèm");
        assert_eq!(message.text, "");
        assert_eq!(message.time_label(), "14:05");
        assert_eq!(message.id, "m-1");
    }

    #[test]
    fn notes_and_routes_are_prepended_tasks_appended() {
        let (clock, ids) = (clock(), SequentialIds::new("r"));
        let factory = RecordFactory::new(&clock, &ids);
        let mut p = patient("p-1", "ГБ №1", RiskLevel::High);

        for text in ["первая", "вторая"] {
            let note = factory.note(text).expect("ghi chú");
            with_note(&p, note).apply_to(&mut p);
            let task = factory.task(text, None, TaskKind::Task).expect("nhiệm vụ");
            with_task(&p, task).apply_to(&mut p);
        }

        assert_eq!(p.notes[0].text, "вторая");
        assert_eq!(p.tasks[0].text, "первая");
    }

    #[test]
    fn route_defaults_to_today_and_drops_blank_comment() {
        let (clock, ids) = (clock(), SequentialIds::new("r"));
        let factory = RecordFactory::new(&clock, &ids);
        let route = factory.route(None, "МКДЦ", Some("  "));
        assert_eq!(route.date, day("2026-10-19"));
        assert_eq!(route.comment, None);
        assert_eq!(route.title(), "Перевод → МКДЦ");
    }

    #[test]
    fn planning_form_skips_empty_groups() {
        let (clock, ids) = (clock(), SequentialIds::new("x"));
        let factory = RecordFactory::new(&clock, &ids);
        let form = PlanningForm {
            consult_text: "кардиолог".to_string(),
            ..PlanningForm::default()
        };
        let records = form.build(&factory);
        assert!(records.note.is_none());
        assert!(records.task.is_none());
        assert!(records.route.is_none());
        let consult = records.consult.clone().expect("hội chẩn");
        assert!(consult.is_consultation());
        assert_eq!(consult.title(), "Консультация: кардиолог");

        let p = patient("p-1", "ГБ №1", RiskLevel::High);
        let patch = records.into_patch(&p);
        assert_eq!(patch.tasks.map(|tasks| tasks.len()), Some(1));
        assert!(patch.notes.is_none());
    }

    #[test]
    fn planning_form_task_and_consult_share_one_patch() {
        let (clock, ids) = (clock(), SequentialIds::new("x"));
        let factory = RecordFactory::new(&clock, &ids);
        let form = PlanningForm {
            task_text: "ЭКГ".to_string(),
            consult_text: "невролог".to_string(),
            route_org: "ГБ №3".to_string(),
            ..PlanningForm::default()
        };
        let p = patient("p-1", "ГБ №1", RiskLevel::High);
        let patch = form.build(&factory).into_patch(&p);
        let tasks = patch.tasks.expect("nhiệm vụ");
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].kind, TaskKind::Task);
        assert_eq!(tasks[1].kind, TaskKind::Consultation);
        assert_eq!(patch.routes.map(|routes| routes.len()), Some(1));
    }
}
