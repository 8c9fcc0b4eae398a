//! Bridge WASM <-> JavaScript trung lập framework.

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;
use ward_core::{
    aggregate, build_table, filter_patients, partition, BoardConfig, BoardError, ChatMessage,
    Clock, FilterCriteria, IntakeForm, PartialBoardConfig, Patient, PatientSeeder, RiskCounts,
    ScoreField, SystemClock,
};
use ward_mock::{common_channel_seed, RandomSeeder};

fn read<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    from_value(value).map_err(|err| JsValue::from_str(&format!("Không đọc được {what}: {err}")))
}

fn write<T: Serialize>(value: &T, what: &str) -> Result<JsValue, JsValue> {
    to_value(value).map_err(|err| JsValue::from_str(&format!("Không serialize {what}: {err}")))
}

fn read_config(config: Option<JsValue>) -> Result<BoardConfig, JsValue> {
    match config {
        Some(js_cfg) => {
            let cfg: PartialBoardConfig = read(js_cfg, "config")?;
            Ok(BoardConfig::from(cfg))
        }
        None => Ok(BoardConfig::default()),
    }
}

fn format_board_error(err: BoardError) -> String {
    format!("Board error: {err}")
}

fn install_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

#[derive(Serialize)]
struct BoardView<'a> {
    high: Vec<&'a Patient>,
    medium: Vec<&'a Patient>,
    low: Vec<&'a Patient>,
    counts: RiskCounts,
}

/// Lọc theo phạm vi/từ khóa/tab rồi chia ba cột; KPI tính trên toàn bộ danh sách.
#[wasm_bindgen]
pub fn board_columns(
    patients: JsValue,
    pinned: JsValue,
    criteria: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    install_hook();

    let patients: Vec<Patient> = read(patients, "danh sách bệnh nhân")?;
    let pinned: Vec<String> = read(pinned, "danh sách ghim")?;
    let criteria: FilterCriteria = match criteria {
        Some(js_criteria) => read(js_criteria, "bộ lọc")?,
        None => FilterCriteria::default(),
    };

    let visible = filter_patients(&patients, &pinned, &criteria);
    let columns = partition(&visible);
    let view = BoardView {
        high: columns.high,
        medium: columns.medium,
        low: columns.low,
        counts: RiskCounts::of(&patients),
    };
    write(&view, "bảng")
}

/// Bản xem trước hoạt động (đã cắt theo giới hạn trong config).
#[wasm_bindgen]
pub fn aggregate_activity(
    patients: JsValue,
    common: JsValue,
    config: Option<JsValue>,
) -> Result<JsValue, JsValue> {
    install_hook();

    let patients: Vec<Patient> = read(patients, "danh sách bệnh nhân")?;
    let common: Vec<ChatMessage> = read(common, "kênh chung")?;
    let cfg = read_config(config)?;

    let digest = aggregate(&patients, &common);
    write(&digest.preview(&cfg.preview), "hoạt động")
}

#[wasm_bindgen]
pub fn dynamics_table(patient: JsValue) -> Result<JsValue, JsValue> {
    install_hook();

    let patient: Patient = read(patient, "bệnh nhân")?;
    write(&build_table(&patient), "bảng động thái")
}

/// Tính một trường điểm ("sofa" | "apache" | "gcs") và trả lại form đã cập nhật.
#[wasm_bindgen]
pub fn calculate_intake_score(form: JsValue, field: JsValue) -> Result<JsValue, JsValue> {
    install_hook();

    let mut form: IntakeForm = read(form, "form tiếp nhận")?;
    let field: ScoreField = read(field, "trường điểm")?;
    form.calculate(field);
    write(&form, "form tiếp nhận")
}

/// Kiểm tra form và dựng bệnh nhân mới. Lỗi liệt kê mọi trường bắt buộc còn thiếu.
#[wasm_bindgen]
pub fn submit_intake(form: JsValue, id: String) -> Result<JsValue, JsValue> {
    install_hook();

    let form: IntakeForm = read(form, "form tiếp nhận")?;
    let valid = form
        .validate()
        .map_err(|err| JsValue::from_str(&format_board_error(err.into())))?;
    write(&valid.into_patient(id), "bệnh nhân")
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SeedBundle {
    patients: Vec<Patient>,
    common: Vec<ChatMessage>,
}

/// Sinh danh sách mẫu; `today` dạng YYYY-MM-DD, mặc định là ngày hiện tại.
#[wasm_bindgen]
pub fn seed_board(seed: u32, today: Option<String>) -> Result<JsValue, JsValue> {
    install_hook();

    let today = match today {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .map_err(|err| JsValue::from_str(&format!("Ngày không hợp lệ: {err}")))?,
        None => SystemClock.today(),
    };
    let bundle = SeedBundle {
        patients: RandomSeeder::new(u64::from(seed)).seed(today),
        common: common_channel_seed(today),
    };
    write(&bundle, "dữ liệu mẫu")
}
