use thiserror::Error;

use crate::intake::IntakeErrors;

/// Lỗi chung của bảng theo dõi.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Пациент не найден: {0}")]
    PatientNotFound(String),
    #[error("Строка-заголовок «{0}» не редактируется")]
    GroupRowNotEditable(String),
    #[error("Неизвестный параметр динамики: {0}")]
    UnknownRow(String),
    #[error(transparent)]
    Validation(#[from] IntakeErrors),
    #[error("Не удалось прочитать данные: {0}")]
    Parse(String),
}
