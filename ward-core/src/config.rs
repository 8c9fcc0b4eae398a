//! Cấu hình bảng theo dõi.

use serde::{Deserialize, Serialize};

/// Số mục tối đa ở tab tổng quan cho từng loại hoạt động.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreviewLimits {
    pub patient_chats: usize,
    pub routes: usize,
    pub consults: usize,
    pub tasks: usize,
    pub notes: usize,
    pub common: usize,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self {
            patient_chats: 4,
            routes: 3,
            consults: 3,
            tasks: 3,
            notes: 3,
            common: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardConfig {
    pub preview: PreviewLimits,
    /// Tên người gửi gắn vào tin nhắn của người dùng hiện tại.
    pub author_label: String,
    /// Danh sách cơ sở tiếp nhận khi chuyển viện.
    pub route_orgs: Vec<String>,
    /// Khoa tiếp nhận trong form nhập viện.
    pub departments: Vec<String>,
    pub bed_count: u32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            preview: PreviewLimits::default(),
            author_label: "Вы".to_string(),
            route_orgs: ["ЦКБ №1", "ГБ №1", "ГБ №2", "МКДЦ", "ГБ №3"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            departments: ["ОРИТ 1", "ОРИТ 2", "ОРИТ 3"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            bed_count: 20,
        }
    }
}

/// Cấu hình một phần (từ JS hoặc file JSON); trường thiếu lấy mặc định.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialBoardConfig {
    #[serde(default)]
    pub preview_patient_chats: Option<usize>,
    #[serde(default)]
    pub preview_routes: Option<usize>,
    #[serde(default)]
    pub preview_consults: Option<usize>,
    #[serde(default)]
    pub preview_tasks: Option<usize>,
    #[serde(default)]
    pub preview_notes: Option<usize>,
    #[serde(default)]
    pub preview_common: Option<usize>,
    #[serde(default)]
    pub author_label: Option<String>,
    #[serde(default)]
    pub route_orgs: Option<Vec<String>>,
    #[serde(default)]
    pub departments: Option<Vec<String>>,
    #[serde(default)]
    pub bed_count: Option<u32>,
}

impl From<PartialBoardConfig> for BoardConfig {
    fn from(cfg: PartialBoardConfig) -> Self {
        let mut base = BoardConfig::default();
        let preview = &mut base.preview;
        if let Some(limit) = cfg.preview_patient_chats {
            preview.patient_chats = limit;
        }
        if let Some(limit) = cfg.preview_routes {
            preview.routes = limit;
        }
        if let Some(limit) = cfg.preview_consults {
            preview.consults = limit;
        }
        if let Some(limit) = cfg.preview_tasks {
            preview.tasks = limit;
        }
        if let Some(limit) = cfg.preview_notes {
            preview.notes = limit;
        }
        if let Some(limit) = cfg.preview_common {
            preview.common = limit;
        }
        if let Some(label) = cfg.author_label {
            base.author_label = label;
        }
        if let Some(orgs) = cfg.route_orgs {
            base.route_orgs = orgs;
        }
        if let Some(departments) = cfg.departments {
            base.departments = departments;
        }
        if let Some(count) = cfg.bed_count {
            base.bed_count = count;
        }
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_overrides_only_given_fields() {
        let cfg = BoardConfig::from(PartialBoardConfig {
            preview_tasks: Some(5),
            author_label: Some("Дежурный".to_string()),
            ..PartialBoardConfig::default()
        });

        assert_eq!(cfg.preview.tasks, 5);
        assert_eq!(cfg.preview.patient_chats, 4);
        assert_eq!(cfg.author_label, "Дежурный");
        assert_eq!(cfg.route_orgs.len(), 5);
        assert_eq!(cfg.bed_count, 20);
    }
}
