//! Trạng thái ứng dụng và reducer thuần.
//!
//! UI tạo bản ghi qua `RecordFactory` rồi gửi `BoardAction`; reducer chỉ ghép
//! dữ liệu, không gọi đồng hồ hay sinh định danh.

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::activity::{aggregate, ActivityDigest};
use crate::board::{org_counts, partition, toggle_pin, BoardColumns, OrgCount, RiskCounts};
use crate::config::BoardConfig;
use crate::dynamics::{cell_patch, monitoring_column_patch};
use crate::error::BoardError;
use crate::filter::{filter_patients, FilterCriteria};
use crate::model::{
    ChatMessage, Note, Patient, PatientPatch, Reading, RiskLevel, RiskTab, RouteEvent, Scope, Task,
};
use crate::planning::{with_message, with_note, with_route, with_task, PlannedRecords};
use crate::store::PatientStore;

#[derive(Debug, Clone, PartialEq)]
pub enum BoardAction {
    SetScope(Scope),
    SetQuery(String),
    SetRiskTab(RiskTab),
    SetCompact(bool),
    TogglePin(String),
    MovePatient { id: String, to: RiskLevel },
    Upsert { id: String, patch: PatientPatch },
    AppendPatient(Patient),
    AddNote { patient_id: String, note: Note },
    AddTask { patient_id: String, task: Task },
    AddRoute { patient_id: String, route: RouteEvent },
    ApplyPlan { patient_id: String, records: PlannedRecords },
    SendMessage { patient_id: String, message: ChatMessage },
    SendCommon(ChatMessage),
    SetExtended { patient_id: String, enabled: bool },
    AddMonitoringColumn { patient_id: String, today: NaiveDate },
    SetCell {
        patient_id: String,
        row: String,
        date: NaiveDate,
        value: Reading,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    pub store: PatientStore,
    pub pinned: Vec<String>,
    pub filter: FilterCriteria,
    pub compact: bool,
    pub common: Vec<ChatMessage>,
    pub config: BoardConfig,
}

impl BoardState {
    pub fn new(patients: Vec<Patient>, common: Vec<ChatMessage>, config: BoardConfig) -> Self {
        info!(patients = patients.len(), "khởi tạo bảng theo dõi");
        Self {
            store: PatientStore::new(patients),
            common,
            config,
            ..Self::default()
        }
    }

    pub fn patient(&self, id: &str) -> Option<&Patient> {
        self.store.get_by_id(id)
    }

    pub fn is_pinned(&self, id: &str) -> bool {
        self.pinned.iter().any(|pinned| pinned == id)
    }

    pub fn visible(&self) -> Vec<&Patient> {
        filter_patients(self.store.all(), &self.pinned, &self.filter)
    }

    pub fn columns(&self) -> BoardColumns<'_> {
        partition(&self.visible())
    }

    /// KPI tính trên toàn bộ bệnh nhân.
    pub fn counts(&self) -> RiskCounts {
        RiskCounts::of(self.store.all())
    }

    pub fn orgs(&self) -> Vec<OrgCount> {
        org_counts(self.store.all())
    }

    /// Hoạt động của các bệnh nhân đang hiển thị cùng kênh chung.
    pub fn activity(&self) -> ActivityDigest<'_> {
        aggregate(self.visible(), &self.common)
    }

    /// Áp dụng một hành động. Lỗi chỉ xảy ra khi bệnh nhân không tồn tại
    /// hoặc ô động thái không hợp lệ; khi đó trạng thái không đổi.
    pub fn apply(&mut self, action: BoardAction) -> Result<(), BoardError> {
        match action {
            BoardAction::SetScope(scope) => self.filter.scope = scope,
            BoardAction::SetQuery(query) => self.filter.query = query,
            BoardAction::SetRiskTab(tab) => self.filter.risk_tab = tab,
            BoardAction::SetCompact(compact) => self.compact = compact,
            BoardAction::TogglePin(id) => {
                self.pinned = toggle_pin(&self.pinned, &id);
                debug!(patient_id = %id, pinned = self.is_pinned(&id), "đổi trạng thái ghim");
            }
            BoardAction::MovePatient { id, to } => {
                if !self.store.move_to(&id, to) {
                    return Err(BoardError::PatientNotFound(id));
                }
            }
            BoardAction::Upsert { id, patch } => {
                self.store.upsert(&id, patch);
            }
            BoardAction::AppendPatient(patient) => self.store.append(patient),
            BoardAction::AddNote { patient_id, note } => {
                self.patch_with(&patient_id, |patient| Ok(with_note(patient, note)))?
            }
            BoardAction::AddTask { patient_id, task } => {
                self.patch_with(&patient_id, |patient| Ok(with_task(patient, task)))?
            }
            BoardAction::AddRoute { patient_id, route } => {
                self.patch_with(&patient_id, |patient| Ok(with_route(patient, route)))?
            }
            BoardAction::ApplyPlan {
                patient_id,
                records,
            } => self.patch_with(&patient_id, |patient| Ok(records.into_patch(patient)))?,
            BoardAction::SendMessage {
                patient_id,
                message,
            } => self.patch_with(&patient_id, |patient| Ok(with_message(patient, message)))?,
            BoardAction::SendCommon(message) => {
                debug!(message_id = %message.id, "tin nhắn kênh chung");
                self.common.push(message);
            }
            BoardAction::SetExtended {
                patient_id,
                enabled,
            } => self.patch_with(&patient_id, |_| Ok(PatientPatch::extended(enabled)))?,
            BoardAction::AddMonitoringColumn { patient_id, today } => {
                self.patch_with(&patient_id, |patient| {
                    Ok(monitoring_column_patch(patient, today).unwrap_or_default())
                })?
            }
            BoardAction::SetCell {
                patient_id,
                row,
                date,
                value,
            } => self.patch_with(&patient_id, |patient| cell_patch(patient, &row, date, value))?,
        }
        Ok(())
    }

    fn patch_with<F>(&mut self, id: &str, build: F) -> Result<(), BoardError>
    where
        F: FnOnce(&Patient) -> Result<PatientPatch, BoardError>,
    {
        let patient = self
            .store
            .get_by_id(id)
            .ok_or_else(|| BoardError::PatientNotFound(id.to_string()))?;
        let patch = build(patient)?;
        if !patch.is_empty() {
            self.store.upsert(id, patch);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{FixedClock, SequentialIds};
    use crate::model::fixtures::{at, day, patient};
    use crate::planning::RecordFactory;
    use crate::route::Route;

    fn state() -> BoardState {
        BoardState::new(
            vec![
                patient("p-1", "ГБ №1", RiskLevel::High),
                patient("p-2", "ГБ №2", RiskLevel::Medium),
                patient("p-3", "ГБ №1", RiskLevel::Low),
            ],
            Vec::new(),
            BoardConfig::default(),
        )
    }

    #[test]
    fn detail_routes_to_unknown_patient_find_nothing() {
        let state = state();
        for path in ["#/patient/ghost/dynamics", "#/patient/ghost/chat"] {
            let id = match Route::parse(path) {
                Route::Dynamics { id } | Route::Chat { id } => id,
                other => panic!("tuyến không mong đợi: {other:?}"),
            };
            assert_eq!(id, "ghost");
            assert!(state.patient(&id).is_none());
            assert!(state.store.get_by_id(&id).is_none());
        }
        assert!(state.patient("p-1").is_some());
        assert_eq!(Route::parse("#/nowhere"), Route::NotFound);
    }

    #[test]
    fn scope_then_tab_narrows_visible_columns() {
        let mut state = state();
        state
            .apply(BoardAction::SetScope(Scope::Org {
                org: "ГБ №1".to_string(),
            }))
            .expect("đổi phạm vi");
        assert_eq!(state.visible().len(), 2);

        state
            .apply(BoardAction::SetRiskTab(RiskTab::Low))
            .expect("đổi tab");
        let columns = state.columns();
        assert_eq!(columns.low.len(), 1);
        assert!(columns.high.is_empty());
        assert_eq!(state.counts().total, 3);
    }

    #[test]
    fn mine_scope_follows_pins() {
        let mut state = state();
        state
            .apply(BoardAction::TogglePin("p-2".to_string()))
            .expect("ghim");
        state
            .apply(BoardAction::SetScope(Scope::Mine))
            .expect("phạm vi");
        let ids: Vec<&str> = state.visible().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p-2"]);
    }

    #[test]
    fn move_twice_to_same_tier_keeps_partition() {
        let mut state = state();
        let move_high = || BoardAction::MovePatient {
            id: "p-1".to_string(),
            to: RiskLevel::High,
        };
        let before = state.clone();
        state.apply(move_high()).expect("chuyển cột");
        state.apply(move_high()).expect("chuyển cột");
        assert_eq!(state.columns(), before.columns());
    }

    #[test]
    fn monitoring_column_twice_same_day_adds_one() {
        let mut state = state();
        let today = day("2026-10-19");
        for _ in 0..2 {
            state
                .apply(BoardAction::AddMonitoringColumn {
                    patient_id: "p-1".to_string(),
                    today,
                })
                .expect("thêm cột");
        }
        assert_eq!(state.patient("p-1").map(|p| p.dyn_dates.clone()), Some(vec![today]));
    }

    #[test]
    fn empty_send_keeps_message_count() {
        let mut state = state();
        let clock = FixedClock(at("2026-10-19", "10:00"));
        let ids = SequentialIds::new("m");
        let factory = RecordFactory::new(&clock, &ids);

        if let Some(message) = factory.message("Вы", "", Vec::new()) {
            state
                .apply(BoardAction::SendCommon(message))
                .expect("gửi");
        }
        assert!(state.common.is_empty());

        let message = factory.message("Вы", " привет ", Vec::new()).expect("tin nhắn");
        state
            .apply(BoardAction::SendMessage {
                patient_id: "p-2".to_string(),
                message,
            })
            .expect("gửi");
        let chat = &state.patient("p-2").expect("có bệnh nhân").chat;
        assert_eq!(chat.len(), 1);
        assert_eq!(chat[0].text, "привет");
    }

    #[test]
    fn actions_on_unknown_patient_report_not_found() {
        let mut state = state();
        let before = state.clone();
        let err = state
            .apply(BoardAction::SetExtended {
                patient_id: "nonexistent".to_string(),
                enabled: true,
            })
            .expect_err("không có bệnh nhân");
        assert!(matches!(err, BoardError::PatientNotFound(id) if id == "nonexistent"));
        assert_eq!(state, before);
    }

    #[test]
    fn group_cell_edit_is_rejected_without_changes() {
        let mut state = state();
        let before = state.clone();
        let result = state.apply(BoardAction::SetCell {
            patient_id: "p-1".to_string(),
            row: "resp".to_string(),
            date: day("2026-10-19"),
            value: "x".into(),
        });
        assert!(matches!(result, Err(BoardError::GroupRowNotEditable(_))));
        assert_eq!(state, before);
    }

    #[test]
    fn activity_only_covers_visible_patients() {
        let mut state = state();
        let clock = FixedClock(at("2026-10-19", "10:00"));
        let ids = SequentialIds::new("n");
        let factory = RecordFactory::new(&clock, &ids);
        for id in ["p-1", "p-2"] {
            let note = factory.note("осмотр").expect("ghi chú");
            state
                .apply(BoardAction::AddNote {
                    patient_id: id.to_string(),
                    note,
                })
                .expect("thêm ghi chú");
        }
        state
            .apply(BoardAction::SetScope(Scope::Org {
                org: "ГБ №2".to_string(),
            }))
            .expect("phạm vi");

        let activity = state.activity();
        assert_eq!(activity.notes.len(), 1);
        assert_eq!(activity.notes[0].patient.id, "p-2");
    }
}
