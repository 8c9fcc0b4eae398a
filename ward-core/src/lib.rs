//! Logic lõi của bảng theo dõi bệnh nhân hồi sức: kho bệnh nhân, bộ lọc,
//! phân cột theo nguy cơ, tổng hợp hoạt động, bảng động thái và form nhập viện.

pub mod activity;
pub mod board;
pub mod collab;
pub mod config;
pub mod dynamics;
pub mod error;
pub mod filter;
pub mod intake;
pub mod model;
pub mod planning;
pub mod route;
pub mod state;
pub mod store;

pub use activity::{aggregate, patient_feed, Activity, ActivityDigest, FeedItem, FeedKind, PatientRef};
pub use board::{org_counts, partition, toggle_pin, BoardColumns, OrgCount, RiskCounts};
pub use collab::{
    Clock, FixedClock, FixedSeeder, IdGenerator, PatientSeeder, SequentialIds, SystemClock,
    UuidIds,
};
pub use config::{BoardConfig, PartialBoardConfig, PreviewLimits};
pub use dynamics::{build_table, date_label, DynRow, DynamicsTable, DYNAMICS_ROWS};
pub use error::BoardError;
pub use filter::{filter_patients, FilterCriteria};
pub use intake::{
    calc_apache, calc_gcs, calc_sofa, risk_from_sofa, Consciousness, DiagnosisEntry,
    DiagnosisType, IntakeErrors, IntakeField, IntakeForm, ScoreField, Sex, ValidIntake,
};
pub use model::*;
pub use planning::{PlannedRecords, PlanningForm, RecordFactory};
pub use route::Route;
pub use state::{BoardAction, BoardState};
pub use store::PatientStore;
