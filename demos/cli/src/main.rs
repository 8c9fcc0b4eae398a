use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use ward_core::{
    BoardAction, BoardConfig, BoardState, Clock, PartialBoardConfig, PatientSeeder, RiskTab,
    Scope, SystemClock,
};
use ward_mock::{common_channel_seed, load_patients_str, RandomSeeder};

#[derive(Parser, Debug)]
#[command(
    name = "ward-cli",
    about = "In bảng bệnh nhân theo mức nguy cơ và bản xem trước hoạt động."
)]
struct Args {
    /// File JSON danh sách bệnh nhân; bỏ trống thì sinh dữ liệu mẫu.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Seed cho dữ liệu mẫu.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// File JSON cấu hình một phần.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Phạm vi: all | mine | org:<tên cơ sở>.
    #[arg(long, default_value = "all", value_parser = parse_scope)]
    scope: Scope,

    /// Từ khóa tìm kiếm.
    #[arg(short, long, default_value = "")]
    query: String,

    /// Tab nguy cơ: all | high | medium | low.
    #[arg(long, default_value = "all", value_parser = parse_tab)]
    risk: RiskTab,

    /// Ghim bệnh nhân (lặp lại được).
    #[arg(long = "pin")]
    pins: Vec<String>,
}

fn parse_scope(raw: &str) -> Result<Scope, String> {
    match raw {
        "all" => Ok(Scope::All),
        "mine" => Ok(Scope::Mine),
        other => match other.strip_prefix("org:") {
            Some(org) if !org.trim().is_empty() => Ok(Scope::Org {
                org: org.trim().to_string(),
            }),
            _ => Err(format!("phạm vi không hợp lệ: {other}")),
        },
    }
}

fn parse_tab(raw: &str) -> Result<RiskTab, String> {
    match raw {
        "all" => Ok(RiskTab::All),
        "high" => Ok(RiskTab::High),
        "medium" => Ok(RiskTab::Medium),
        "low" => Ok(RiskTab::Low),
        other => Err(format!("tab không hợp lệ: {other}")),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<BoardConfig> {
    let Some(path) = path else {
        return Ok(BoardConfig::default());
    };
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Không đọc được file {path:?}"))?;
    let partial: PartialBoardConfig = serde_json::from_str(&data)
        .with_context(|| format!("Config không hợp lệ: {path:?}"))?;
    Ok(partial.into())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;
    let today = SystemClock.today();

    let patients = match &args.input {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .with_context(|| format!("Không đọc được file {path:?}"))?;
            load_patients_str(&data)?
        }
        None => RandomSeeder::new(args.seed).seed(today),
    };
    info!(patients = patients.len(), "đã nạp danh sách bệnh nhân");

    let mut state = BoardState::new(patients, common_channel_seed(today), config);
    for id in &args.pins {
        if !state.store.contains(id) {
            bail!("Không có bệnh nhân để ghim: {id}");
        }
        state.apply(BoardAction::TogglePin(id.clone()))?;
    }
    state.apply(BoardAction::SetScope(args.scope))?;
    state.apply(BoardAction::SetQuery(args.query))?;
    state.apply(BoardAction::SetRiskTab(args.risk))?;

    let counts = state.counts();
    println!(
        "Всего: {} | Высокий: {} | Умеренный: {} | Низкий: {}",
        counts.total, counts.high, counts.medium, counts.low
    );

    let columns = state.columns();
    for (level, patients) in columns.iter() {
        println!("\n== {} ({}) ==", level.title(), patients.len());
        for patient in patients {
            let pin = if state.is_pinned(&patient.id) { "*" } else { " " };
            println!(
                "{pin} {:<6} {:<8} {:<10} {:<10} {}",
                patient.id, patient.name, patient.unit, patient.bed, patient.code
            );
        }
    }

    let digest = state.activity();
    let preview = digest.preview(&state.config.preview);
    println!("\n== Новые сообщения ==");
    for entry in &preview.patient_chats {
        println!(
            "[{}] {} • {}: {}",
            entry.item.time_label(),
            entry.patient.name,
            entry.item.author,
            entry.item.text
        );
    }
    for entry in &preview.routes {
        println!("{} • {}", entry.patient.name, entry.item.title());
    }
    for entry in preview.consults.iter().chain(&preview.tasks) {
        println!("{} • {}", entry.patient.name, entry.item.title());
    }
    for entry in &preview.notes {
        println!("{} • {}", entry.patient.name, entry.item.text);
    }
    println!("\n== Общий чат ==");
    for message in preview.common {
        println!("[{}] {}: {}", message.time_label(), message.author, message.text);
    }

    Ok(())
}
