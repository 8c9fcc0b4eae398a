//! Kho bệnh nhân trong bộ nhớ.
//!
//! Mọi thay đổi dựng một danh sách mới rồi thay tham chiếu một lần, nên các
//! view dẫn xuất luôn thấy một snapshot nhất quán.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::model::{Patient, PatientPatch, RiskLevel};

/// Ghép bản vá vào bệnh nhân có `id`; các bản ghi khác giữ nguyên.
/// Không tìm thấy `id` thì trả lại bản sao y nguyên, không thêm bản ghi mới.
pub fn apply_upsert(patients: &[Patient], id: &str, patch: &PatientPatch) -> Vec<Patient> {
    patients
        .iter()
        .map(|patient| {
            if patient.id == id {
                let mut next = patient.clone();
                patch.clone().apply_to(&mut next);
                next
            } else {
                patient.clone()
            }
        })
        .collect()
}

/// Thêm bệnh nhân mới lên đầu danh sách.
pub fn apply_append(patients: &[Patient], patient: Patient) -> Vec<Patient> {
    let mut next = Vec::with_capacity(patients.len() + 1);
    next.push(patient);
    next.extend(patients.iter().cloned());
    next
}

/// Chuyển bệnh nhân sang cột nguy cơ khác.
pub fn apply_move(patients: &[Patient], id: &str, to: RiskLevel) -> Vec<Patient> {
    apply_upsert(patients, id, &PatientPatch::risk(to))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientStore {
    patients: Rc<Vec<Patient>>,
}

impl PatientStore {
    pub fn new(patients: Vec<Patient>) -> Self {
        Self {
            patients: Rc::new(patients),
        }
    }

    pub fn all(&self) -> &[Patient] {
        &self.patients
    }

    /// Tham chiếu tới snapshot hiện tại.
    pub fn snapshot(&self) -> Rc<Vec<Patient>> {
        Rc::clone(&self.patients)
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|patient| patient.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get_by_id(id).is_some()
    }

    /// Trả về `false` (và không đổi gì) nếu không có bệnh nhân `id`.
    pub fn upsert(&mut self, id: &str, patch: PatientPatch) -> bool {
        if !self.contains(id) {
            warn!(patient_id = id, "bỏ qua upsert: không có bệnh nhân");
            return false;
        }
        debug!(patient_id = id, "upsert bệnh nhân");
        self.patients = Rc::new(apply_upsert(&self.patients, id, &patch));
        true
    }

    pub fn append(&mut self, patient: Patient) {
        debug!(patient_id = %patient.id, unit = %patient.unit, "thêm bệnh nhân mới");
        self.patients = Rc::new(apply_append(&self.patients, patient));
    }

    pub fn move_to(&mut self, id: &str, to: RiskLevel) -> bool {
        if self
            .get_by_id(id)
            .is_some_and(|patient| patient.risk == to)
        {
            return true;
        }
        debug!(patient_id = id, risk = to.as_str(), "chuyển cột nguy cơ");
        self.upsert(id, PatientPatch::risk(to))
    }
}
