#![cfg(target_arch = "wasm32")]

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Node};

const STYLE_TAG_SELECTOR: &str = "style[data-ward-ui]";

/// CSS mặc định, các biến màu có thể ghi đè từ trang chủ.
pub const DEFAULT_STYLES: &str = r#"
:root {
  --ward-font-family: 'Inter', system-ui, -apple-system, 'Segoe UI', sans-serif;
  --ward-bg: #f4f6fa;
  --ward-card-bg: #ffffff;
  --ward-border: rgba(148, 163, 184, 0.32);
  --ward-radius: 12px;
  --ward-text: #1f2933;
  --ward-muted: #5b6776;
  --ward-accent: #2563eb;
  --ward-accent-soft: rgba(37, 99, 235, 0.12);
  --ward-danger: #b42318;
}

.ward-root {
  font-family: var(--ward-font-family);
  background: var(--ward-bg);
  color: var(--ward-text);
  min-height: 100vh;
  padding: 20px 24px;
  box-sizing: border-box;
}

.ward-root button {
  font: inherit;
  cursor: pointer;
  border: 1px solid var(--ward-border);
  background: var(--ward-card-bg);
  border-radius: 8px;
  padding: 6px 12px;
}

.ward-root button.primary {
  background: var(--ward-accent);
  border-color: var(--ward-accent);
  color: #fff;
}

.ward-root input,
.ward-root select,
.ward-root textarea {
  font: inherit;
  border: 1px solid var(--ward-border);
  border-radius: 8px;
  padding: 6px 8px;
  background: #fff;
}

.page-header {
  display: flex;
  align-items: center;
  gap: 16px;
  margin-bottom: 16px;
}

.page-header h1 {
  font-size: 1.3rem;
  margin: 0;
  flex: 1;
}

.kpi-inline {
  display: flex;
  gap: 12px;
  font-size: 0.9rem;
}

.kpi-inline .kpi-dot {
  display: inline-block;
  width: 8px;
  height: 8px;
  border-radius: 50%;
  margin-right: 4px;
}

.scope-bar,
.risk-tabs,
.toolbar {
  display: flex;
  flex-wrap: wrap;
  gap: 8px;
  margin-bottom: 12px;
  align-items: center;
}

.chip.is-active,
.tab.is-active {
  background: var(--ward-accent-soft);
  border-color: var(--ward-accent);
  color: var(--ward-accent);
}

.chip-count {
  margin-left: 6px;
  color: var(--ward-muted);
  font-variant-numeric: tabular-nums;
}

.toolbar input[type="search"] {
  min-width: 280px;
  flex: 1;
}

.board-layout {
  display: grid;
  grid-template-columns: minmax(0, 3fr) minmax(320px, 1fr);
  gap: 16px;
}

.board-columns {
  display: grid;
  grid-template-columns: repeat(3, minmax(0, 1fr));
  gap: 12px;
}

.board-column {
  display: flex;
  flex-direction: column;
  gap: 10px;
}

.board-column > header {
  display: flex;
  justify-content: space-between;
  font-weight: 600;
  border-top: 4px solid var(--column-color, var(--ward-border));
  padding-top: 8px;
}

.column-empty,
.empty-state {
  color: var(--ward-muted);
  font-size: 0.9rem;
  padding: 12px 0;
}

.patient-card,
.panel {
  background: var(--ward-card-bg);
  border: 1px solid var(--ward-border);
  border-radius: var(--ward-radius);
  padding: 12px;
}

.patient-card.is-pinned {
  border-color: var(--ward-accent);
}

.patient-card h3 {
  margin: 0 0 4px;
  font-size: 1rem;
}

.patient-meta {
  color: var(--ward-muted);
  font-size: 0.82rem;
  display: flex;
  flex-wrap: wrap;
  gap: 6px;
}

.tag {
  background: rgba(71, 84, 103, 0.1);
  border-radius: 999px;
  padding: 2px 8px;
  font-size: 0.75rem;
}

.vital-pills {
  display: flex;
  flex-wrap: wrap;
  gap: 6px;
  margin: 8px 0;
}

.vital-pill {
  border: 1px solid var(--ward-border);
  border-radius: 999px;
  padding: 2px 8px;
  font-size: 0.8rem;
  font-variant-numeric: tabular-nums;
}

.vital-pill.is-abnormal {
  border-color: var(--ward-danger);
  color: var(--ward-danger);
}

.card-actions {
  display: flex;
  flex-wrap: wrap;
  gap: 6px;
  font-size: 0.8rem;
}

.card-actions button {
  padding: 3px 8px;
}

.activity-list {
  list-style: none;
  margin: 0;
  padding: 0;
  display: flex;
  flex-direction: column;
  gap: 8px;
}

.activity-item {
  border-bottom: 1px solid var(--ward-border);
  padding-bottom: 6px;
  cursor: pointer;
}

.activity-item small {
  color: var(--ward-muted);
  display: block;
}

.activity-section h4 {
  margin: 12px 0 6px;
  font-size: 0.9rem;
}

.chat-log {
  list-style: none;
  padding: 0;
  margin: 0 0 10px;
  display: flex;
  flex-direction: column;
  gap: 8px;
  max-height: 420px;
  overflow-y: auto;
}

.chat-message .chat-author {
  font-weight: 600;
  font-size: 0.82rem;
}

.chat-message .chat-time {
  color: var(--ward-muted);
  font-size: 0.75rem;
  margin-left: 6px;
}

.chat-attachment {
  color: var(--ward-accent);
  font-size: 0.8rem;
}

.chat-compose {
  display: flex;
  flex-direction: column;
  gap: 6px;
}

.detail-layout {
  display: grid;
  grid-template-columns: minmax(320px, 1fr) minmax(0, 1.4fr);
  gap: 16px;
}

.planning-form fieldset {
  border: 1px solid var(--ward-border);
  border-radius: 8px;
  margin: 0 0 10px;
  display: flex;
  flex-direction: column;
  gap: 6px;
}

.form-status {
  color: #067647;
  font-size: 0.85rem;
}

.feed-filters {
  display: flex;
  gap: 12px;
  margin-bottom: 8px;
}

.dynamics-table {
  border-collapse: collapse;
  width: 100%;
  background: var(--ward-card-bg);
}

.dynamics-table th,
.dynamics-table td {
  border: 1px solid var(--ward-border);
  padding: 4px 6px;
  font-size: 0.85rem;
}

.dynamics-table tr.group-row th {
  background: rgba(71, 84, 103, 0.08);
  text-align: left;
}

.dynamics-table td input {
  width: 100%;
  box-sizing: border-box;
  border: none;
  padding: 2px;
}

.intake-form section {
  background: var(--ward-card-bg);
  border: 1px solid var(--ward-border);
  border-radius: var(--ward-radius);
  padding: 12px 16px;
  margin-bottom: 12px;
}

.form-grid {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(220px, 1fr));
  gap: 10px 16px;
}

.form-field {
  display: flex;
  flex-direction: column;
  gap: 4px;
  font-size: 0.85rem;
}

.form-field .field-error {
  color: var(--ward-danger);
  font-size: 0.78rem;
}

.score-field {
  display: flex;
  gap: 6px;
}

.not-found {
  text-align: center;
  padding: 48px 0;
}

@media (max-width: 1100px) {
  .board-layout,
  .detail-layout {
    grid-template-columns: 1fr;
  }

  .board-columns {
    grid-template-columns: 1fr;
  }
}
"#;

pub fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.query_selector(STYLE_TAG_SELECTOR)?.is_some() {
        return Ok(());
    }

    let head = document
        .head()
        .ok_or_else(|| JsValue::from_str("Document không có thẻ <head>"))?;

    let style_el = document.create_element("style")?;
    style_el.set_attribute("data-ward-ui", "v1")?;
    style_el.set_text_content(Some(DEFAULT_STYLES));
    head.append_child(&style_el.clone().dyn_into::<Node>()?)?;

    Ok(())
}
