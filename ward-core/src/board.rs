//! Chia danh sách đã lọc thành ba cột nguy cơ và các số liệu KPI.

use serde::Serialize;

use crate::model::{Patient, RiskLevel};

/// Ba cột cố định; mỗi cột giữ thứ tự đầu vào.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BoardColumns<'a> {
    pub high: Vec<&'a Patient>,
    pub medium: Vec<&'a Patient>,
    pub low: Vec<&'a Patient>,
}

impl<'a> BoardColumns<'a> {
    pub fn column(&self, level: RiskLevel) -> &[&'a Patient] {
        match level {
            RiskLevel::High => &self.high,
            RiskLevel::Medium => &self.medium,
            RiskLevel::Low => &self.low,
        }
    }

    pub fn len(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (RiskLevel, &[&'a Patient])> + '_ {
        RiskLevel::ALL
            .into_iter()
            .map(move |level| (level, self.column(level)))
    }
}

pub fn partition<'a>(patients: &[&'a Patient]) -> BoardColumns<'a> {
    let mut columns = BoardColumns::default();
    for &patient in patients {
        match patient.risk {
            RiskLevel::High => columns.high.push(patient),
            RiskLevel::Medium => columns.medium.push(patient),
            RiskLevel::Low => columns.low.push(patient),
        }
    }
    columns
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RiskCounts {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskCounts {
    pub fn of<'a>(patients: impl IntoIterator<Item = &'a Patient>) -> Self {
        patients
            .into_iter()
            .fold(Self::default(), |mut counts, patient| {
                counts.total += 1;
                match patient.risk {
                    RiskLevel::High => counts.high += 1,
                    RiskLevel::Medium => counts.medium += 1,
                    RiskLevel::Low => counts.low += 1,
                }
                counts
            })
    }

    pub fn get(&self, level: RiskLevel) -> usize {
        match level {
            RiskLevel::High => self.high,
            RiskLevel::Medium => self.medium,
            RiskLevel::Low => self.low,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OrgCount {
    pub name: String,
    pub total: usize,
}

/// Các cơ sở có bệnh nhân, nhiều nhất trước; bằng nhau thì theo lần xuất hiện đầu.
pub fn org_counts(patients: &[Patient]) -> Vec<OrgCount> {
    let mut counts: Vec<OrgCount> = Vec::new();
    for patient in patients {
        match counts.iter_mut().find(|org| org.name == patient.unit) {
            Some(org) => org.total += 1,
            None => counts.push(OrgCount {
                name: patient.unit.clone(),
                total: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.total.cmp(&a.total));
    counts
}

/// Ghim khi chưa có, bỏ ghim khi đã có.
pub fn toggle_pin(pinned: &[String], id: &str) -> Vec<String> {
    if pinned.iter().any(|existing| existing == id) {
        pinned
            .iter()
            .filter(|existing| *existing != id)
            .cloned()
            .collect()
    } else {
        let mut next = pinned.to_vec();
        next.push(id.to_string());
        next
    }
}
