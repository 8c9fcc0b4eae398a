//! Lọc danh sách bệnh nhân theo phạm vi, từ khóa và tab nguy cơ.

use serde::{Deserialize, Serialize};

use crate::model::{Patient, RiskTab, Scope};

/// Trạng thái bộ lọc của bảng.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub risk_tab: RiskTab,
}

pub fn in_scope(patient: &Patient, scope: &Scope, pinned: &[String]) -> bool {
    match scope {
        Scope::All => true,
        Scope::Mine => pinned.iter().any(|id| *id == patient.id),
        Scope::Org { org } => patient.unit == *org,
    }
}

/// `query` phải đã được trim và viết thường; rỗng nghĩa là không lọc.
pub fn matches_query(patient: &Patient, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    patient
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(query))
}

pub fn matches_tab(patient: &Patient, tab: RiskTab) -> bool {
    tab.level().map_or(true, |level| patient.risk == level)
}

/// Áp dụng lần lượt: phạm vi, từ khóa, tab nguy cơ. Giữ nguyên thứ tự nguồn.
pub fn filter_patients<'a>(
    patients: &'a [Patient],
    pinned: &[String],
    criteria: &FilterCriteria,
) -> Vec<&'a Patient> {
    let query = criteria.query.trim().to_lowercase();
    patients
        .iter()
        .filter(|patient| in_scope(patient, &criteria.scope, pinned))
        .filter(|patient| matches_query(patient, &query))
        .filter(|patient| matches_tab(patient, criteria.risk_tab))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::patient;
    use crate::model::RiskLevel;

    fn roster() -> Vec<Patient> {
        let mut first = patient("1", "A", RiskLevel::High);
        first.name = "Мария".to_string();
        let mut second = patient("2", "B", RiskLevel::Low);
        second.name = "Олег".to_string();
        second.code = "B 15.2".to_string();
        let mut third = patient("3", "A", RiskLevel::Low);
        third.bed = "Оргт 1:5".to_string();
        vec![first, second, third]
    }

    fn ids(list: &[&Patient]) -> Vec<String> {
        list.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn org_scope_and_risk_tab_combine() {
        let patients = roster();
        let criteria = FilterCriteria {
            scope: Scope::Org {
                org: "A".to_string(),
            },
            query: String::new(),
            risk_tab: RiskTab::High,
        };
        assert_eq!(ids(&filter_patients(&patients, &[], &criteria)), ["1"]);
    }

    #[test]
    fn filter_order_does_not_change_result() {
        let patients = roster();
        let scope = Scope::Org {
            org: "A".to_string(),
        };
        let tab = RiskTab::High;

        let reversed: Vec<&Patient> = patients
            .iter()
            .filter(|p| matches_tab(p, tab))
            .filter(|p| matches_query(p, ""))
            .filter(|p| in_scope(p, &scope, &[]))
            .collect();
        let documented = filter_patients(
            &patients,
            &[],
            &FilterCriteria {
                scope,
                query: String::new(),
                risk_tab: tab,
            },
        );
        assert_eq!(ids(&reversed), ids(&documented));
    }

    #[test]
    fn mine_scope_keeps_only_pinned() {
        let patients = roster();
        let pinned = vec!["3".to_string(), "404".to_string()];
        let criteria = FilterCriteria {
            scope: Scope::Mine,
            ..FilterCriteria::default()
        };
        assert_eq!(ids(&filter_patients(&patients, &pinned, &criteria)), ["3"]);
    }

    #[test]
    fn search_is_trimmed_case_insensitive_substring() {
        let patients = roster();
        let by = |query: &str| {
            ids(&filter_patients(
                &patients,
                &[],
                &FilterCriteria {
                    query: query.to_string(),
                    ..FilterCriteria::default()
                },
            ))
        };

        assert_eq!(by("  МАРИЯ "), ["1"]);
        assert_eq!(by("b 15"), ["2"]);
        assert_eq!(by("1:5"), ["3"]);
        assert_eq!(by("кд-14"), ["1", "2", "3"]);
        assert_eq!(by("   "), ["1", "2", "3"]);
        assert!(by("нет такого").is_empty());
    }

    #[test]
    fn same_inputs_give_same_output() {
        let patients = roster();
        let criteria = FilterCriteria {
            query: "а".to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(
            ids(&filter_patients(&patients, &[], &criteria)),
            ids(&filter_patients(&patients, &[], &criteria))
        );
    }
}
