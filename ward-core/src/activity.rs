//! Tổng hợp hoạt động mới nhất của nhiều bệnh nhân cho khung xem trước chat.
//!
//! Chỉ đọc, không sửa bản ghi nguồn.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::config::PreviewLimits;
use crate::model::{ChatMessage, Note, Patient, RouteEvent, Task};

/// Thông tin tối thiểu về bệnh nhân đi kèm một mục hoạt động.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PatientRef<'a> {
    pub id: &'a str,
    pub unit: &'a str,
    pub case_id: &'a str,
    pub name: &'a str,
}

impl<'a> From<&'a Patient> for PatientRef<'a> {
    fn from(patient: &'a Patient) -> Self {
        Self {
            id: &patient.id,
            unit: &patient.unit,
            case_id: &patient.case_id,
            name: &patient.name,
        }
    }
}

/// Cặp (bệnh nhân, mục).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Activity<'a, T> {
    pub patient: PatientRef<'a>,
    pub item: &'a T,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDigest<'a> {
    /// Tin nhắn cuối cùng của mỗi bệnh nhân có chat.
    pub patient_chats: Vec<Activity<'a, ChatMessage>>,
    pub routes: Vec<Activity<'a, RouteEvent>>,
    pub consults: Vec<Activity<'a, Task>>,
    pub tasks: Vec<Activity<'a, Task>>,
    pub notes: Vec<Activity<'a, Note>>,
    /// Kênh chung theo thứ tự thời gian.
    pub common: &'a [ChatMessage],
}

impl<'a> ActivityDigest<'a> {
    /// Bản rút gọn cho tab tổng quan: N mục mới nhất mỗi loại,
    /// N tin cuối của kênh chung.
    pub fn preview(&self, limits: &PreviewLimits) -> ActivityDigest<'a> {
        let common = self.common;
        let common_from = common.len().saturating_sub(limits.common);
        ActivityDigest {
            patient_chats: head(&self.patient_chats, limits.patient_chats),
            routes: head(&self.routes, limits.routes),
            consults: head(&self.consults, limits.consults),
            tasks: head(&self.tasks, limits.tasks),
            notes: head(&self.notes, limits.notes),
            common: &common[common_from..],
        }
    }
}

fn head<T: Clone>(items: &[T], limit: usize) -> Vec<T> {
    items.iter().take(limit).cloned().collect()
}

/// Gom hoạt động từ các bệnh nhân đang hiển thị, mới nhất trước.
/// Bằng thời gian thì giữ thứ tự bệnh nhân nguồn.
pub fn aggregate<'a, I>(patients: I, common: &'a [ChatMessage]) -> ActivityDigest<'a>
where
    I: IntoIterator<Item = &'a Patient>,
{
    let mut digest = ActivityDigest {
        common,
        ..ActivityDigest::default()
    };

    for patient in patients {
        let owner = PatientRef::from(patient);
        if let Some(last) = patient.last_message() {
            digest.patient_chats.push(Activity {
                patient: owner,
                item: last,
            });
        }
        for route in &patient.routes {
            digest.routes.push(Activity {
                patient: owner,
                item: route,
            });
        }
        for task in &patient.tasks {
            let entry = Activity {
                patient: owner,
                item: task,
            };
            if task.is_consultation() {
                digest.consults.push(entry);
            } else {
                digest.tasks.push(entry);
            }
        }
        for note in &patient.notes {
            digest.notes.push(Activity {
                patient: owner,
                item: note,
            });
        }
    }

    newest_first(&mut digest.patient_chats, |message| Some(message.sent_at));
    newest_first(&mut digest.routes, |route| Some(route.recorded_at));
    newest_first(&mut digest.consults, |task| task.created_at);
    newest_first(&mut digest.tasks, |task| task.created_at);
    newest_first(&mut digest.notes, |note| Some(note.at));
    digest
}

fn newest_first<T>(items: &mut [Activity<'_, T>], stamp: impl Fn(&T) -> Option<NaiveDateTime>) {
    items.sort_by(|a, b| stamp(b.item).cmp(&stamp(a.item)));
}

/// Loại mục trong dòng sự kiện của một bệnh nhân.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FeedKind {
    Notes,
    Tasks,
    Routes,
}

impl FeedKind {
    pub const ALL: [FeedKind; 3] = [FeedKind::Notes, FeedKind::Tasks, FeedKind::Routes];

    pub fn label(self) -> &'static str {
        match self {
            FeedKind::Notes => "Записи",
            FeedKind::Tasks => "Задачи",
            FeedKind::Routes => "Маршрутизация",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedItem {
    pub kind: FeedKind,
    pub date: Option<NaiveDateTime>,
    pub title: String,
}

/// Dòng sự kiện ghép nhiệm vụ, chuyển viện và ghi chú, mới nhất trước.
pub fn patient_feed(patient: &Patient, enabled: &[FeedKind]) -> Vec<FeedItem> {
    let mut feed = Vec::new();

    if enabled.contains(&FeedKind::Tasks) {
        feed.extend(patient.tasks.iter().map(|task| FeedItem {
            kind: FeedKind::Tasks,
            date: task
                .due
                .and_then(|due| due.and_hms_opt(0, 0, 0))
                .or(task.created_at),
            title: task.title(),
        }));
    }
    if enabled.contains(&FeedKind::Routes) {
        feed.extend(patient.routes.iter().map(|route| FeedItem {
            kind: FeedKind::Routes,
            date: route.date.and_hms_opt(0, 0, 0),
            title: route.title(),
        }));
    }
    if enabled.contains(&FeedKind::Notes) {
        feed.extend(patient.notes.iter().map(|note| FeedItem {
            kind: FeedKind::Notes,
            date: Some(note.at),
            title: note.text.clone(),
        }));
    }

    feed.sort_by(|a, b| b.date.cmp(&a.date));
    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{at, day, message, patient, task};
    use crate::model::{RiskLevel, TaskKind};

    fn note(id: &str, text: &str, when: NaiveDateTime) -> Note {
        Note {
            id: id.to_string(),
            text: text.to_string(),
            at: when,
        }
    }

    fn route(id: &str, org: &str, when: NaiveDateTime) -> RouteEvent {
        RouteEvent {
            id: id.to_string(),
            date: when.date(),
            to_org: org.to_string(),
            comment: None,
            recorded_at: when,
        }
    }

    fn roster() -> Vec<Patient> {
        let mut first = patient("p-1", "ГБ №1", RiskLevel::High);
        first.chat = vec![
            message("m1", "первое", at("2026-10-19", "11:13")),
            message("m2", "последнее", at("2026-10-19", "11:15")),
        ];
        first.tasks = vec![
            task("t1", "кардиолог", TaskKind::Consultation, at("2026-10-18", "10:00")),
            task("t2", "Сдать анализы", TaskKind::Task, at("2026-10-19", "08:00")),
        ];
        first.notes = vec![note("n1", "стабилен", at("2026-10-19", "09:00"))];

        let mut second = patient("p-2", "ГБ №2", RiskLevel::Low);
        second.chat = vec![message("m3", "вопрос", at("2026-10-19", "12:00"))];
        second.routes = vec![route("r1", "МКДЦ", at("2026-10-19", "07:30"))];
        second.tasks = vec![task("t3", "ЭКГ", TaskKind::Task, at("2026-10-19", "09:30"))];

        let third = patient("p-3", "МКДЦ", RiskLevel::Medium);
        vec![first, second, third]
    }

    #[test]
    fn gathers_latest_message_per_patient_newest_first() {
        let patients = roster();
        let digest = aggregate(&patients, &[]);
        let chats: Vec<(&str, &str)> = digest
            .patient_chats
            .iter()
            .map(|entry| (entry.patient.id, entry.item.text.as_str()))
            .collect();
        assert_eq!(chats, [("p-2", "вопрос"), ("p-1", "последнее")]);
    }

    #[test]
    fn splits_consultations_from_plain_tasks() {
        let patients = roster();
        let digest = aggregate(&patients, &[]);
        let consults: Vec<&str> = digest.consults.iter().map(|e| e.item.id.as_str()).collect();
        let tasks: Vec<&str> = digest.tasks.iter().map(|e| e.item.id.as_str()).collect();
        assert_eq!(consults, ["t1"]);
        assert_eq!(tasks, ["t3", "t2"]);
    }

    #[test]
    fn aggregation_does_not_mutate_sources() {
        let patients = roster();
        let before = patients.clone();
        let _ = aggregate(&patients, &[]);
        assert_eq!(patients, before);
    }

    #[test]
    fn preview_caps_each_kind_and_keeps_tail_of_common() {
        let patients = roster();
        let common: Vec<ChatMessage> = (1..=5)
            .map(|i| message(&format!("c{i}"), "общий", at("2026-10-19", &format!("10:0{i}"))))
            .collect();
        let digest = aggregate(&patients, &common);
        let limits = PreviewLimits {
            patient_chats: 1,
            tasks: 1,
            ..PreviewLimits::default()
        };
        let preview = digest.preview(&limits);

        assert_eq!(preview.patient_chats.len(), 1);
        assert_eq!(preview.patient_chats[0].patient.id, "p-2");
        assert_eq!(preview.tasks.len(), 1);
        assert_eq!(preview.tasks[0].item.id, "t3");
        let tail: Vec<&str> = preview.common.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(tail, ["c3", "c4", "c5"]);
        assert_eq!(digest.tasks.len(), 2);
    }

    #[test]
    fn feed_merges_enabled_kinds_newest_first() {
        let mut p = roster().remove(0);
        p.routes = vec![route("r1", "ГБ №3", at("2026-10-20", "10:00"))];
        p.tasks[1].due = Some(day("2026-10-21"));

        let feed = patient_feed(&p, &FeedKind::ALL);
        let titles: Vec<&str> = feed.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(
            titles,
            [
                "Сдать анализы",
                "Перевод → ГБ №3",
                "стабилен",
                "Консультация: кардиолог"
            ]
        );

        let only_notes = patient_feed(&p, &[FeedKind::Notes]);
        assert_eq!(only_notes.len(), 1);
        assert_eq!(only_notes[0].kind, FeedKind::Notes);
    }
}
