//! Trang chính: thanh phạm vi, KPI, tìm kiếm, ba cột nguy cơ và khung xem
//! trước hoạt động.

use ward_core::{
    Activity, ActivityDigest, BoardAction, ChatMessage, Note, Patient, RecordFactory, RiskLevel,
    RiskTab, Route, RouteEvent, Scope, SystemClock, Task, UuidIds,
};
use yew::prelude::*;

use crate::app::AppContext;
use crate::widgets::{input_value, ChatPanel, OutgoingMessage};

#[function_component(BoardPage)]
pub fn board_page() -> Html {
    let Some(ctx) = use_context::<AppContext>() else {
        return html! {};
    };
    let state = ctx.state();
    let counts = state.counts();
    let columns = state.columns();

    let on_search = {
        let ctx = ctx.clone();
        Callback::from(move |event: InputEvent| {
            ctx.dispatch(BoardAction::SetQuery(input_value(&event)))
        })
    };
    let on_compact = {
        let ctx = ctx.clone();
        let compact = state.compact;
        Callback::from(move |_: MouseEvent| ctx.dispatch(BoardAction::SetCompact(!compact)))
    };

    html! {
        <>
            <header class="page-header">
                <h1>{"Мониторинг пациентов"}</h1>
                <div class="kpi-inline">
                    <span>{ format!("Всего: {}", counts.total) }</span>
                    {
                        for RiskLevel::ALL.into_iter().map(|level| html! {
                            <span>
                                <span class="kpi-dot" style={format!("background:{}", level.color())} />
                                { format!("{}: {}", level.short_label(), counts.get(level)) }
                            </span>
                        })
                    }
                </div>
                <button type="button" class="primary" onclick={ctx.go(Route::NewPatient)}>{"Добавить"}</button>
            </header>
            { render_scope_bar(&ctx) }
            <div class="toolbar">
                <input
                    type="search"
                    placeholder="Поиск по имени, отделению, коду…"
                    value={state.filter.query.clone()}
                    oninput={on_search}
                    aria-label="Поиск пациентов"
                />
                { render_risk_tabs(&ctx) }
                <button
                    type="button"
                    class={classes!("tab", state.compact.then_some("is-active"))}
                    onclick={on_compact}
                >
                    {"Компактный вид"}
                </button>
            </div>
            <div class="board-layout">
                <div class="board-columns">
                    {
                        for columns.iter().map(|(level, patients)| html! {
                            <section class="board-column" style={format!("--column-color:{}", level.color())}>
                                <header>
                                    <span>{ level.title() }</span>
                                    <span class="chip-count">{ patients.len() }</span>
                                </header>
                                {
                                    if patients.is_empty() {
                                        html! { <div class="column-empty">{"Нет пациентов"}</div> }
                                    } else {
                                        html! { for patients.iter().map(|patient| render_card(&ctx, patient)) }
                                    }
                                }
                            </section>
                        })
                    }
                </div>
                <ActivityPanel />
            </div>
        </>
    }
}

fn render_scope_bar(ctx: &AppContext) -> Html {
    let state = ctx.state();
    let mut chips = vec![
        (Scope::All, "Все пациенты".to_string(), state.store.len()),
        (Scope::Mine, "Мои пациенты".to_string(), state.pinned.len()),
    ];
    chips.extend(state.orgs().into_iter().map(|org| {
        (
            Scope::Org {
                org: org.name.clone(),
            },
            org.name,
            org.total,
        )
    }));

    html! {
        <nav class="scope-bar" aria-label="Фильтр отделений">
            {
                for chips.into_iter().map(|(scope, label, count)| {
                    let is_active = state.filter.scope == scope;
                    let ctx = ctx.clone();
                    let onclick = Callback::from(move |_: MouseEvent| {
                        ctx.dispatch(BoardAction::SetScope(scope.clone()))
                    });
                    html! {
                        <button type="button" class={classes!("chip", is_active.then_some("is-active"))} {onclick}>
                            { label }
                            <span class="chip-count">{ count }</span>
                        </button>
                    }
                })
            }
        </nav>
    }
}

fn render_risk_tabs(ctx: &AppContext) -> Html {
    let current = ctx.state().filter.risk_tab;
    let tabs = [
        (RiskTab::All, "Все"),
        (RiskTab::High, RiskLevel::High.short_label()),
        (RiskTab::Medium, RiskLevel::Medium.short_label()),
        (RiskTab::Low, RiskLevel::Low.short_label()),
    ];

    html! {
        <div class="risk-tabs" role="tablist">
            {
                for tabs.into_iter().map(|(tab, label)| {
                    let ctx = ctx.clone();
                    let onclick = Callback::from(move |_: MouseEvent| {
                        ctx.dispatch(BoardAction::SetRiskTab(tab))
                    });
                    html! {
                        <button type="button" class={classes!("tab", (current == tab).then_some("is-active"))} {onclick}>
                            { label }
                        </button>
                    }
                })
            }
        </div>
    }
}

fn render_card(ctx: &AppContext, patient: &Patient) -> Html {
    let state = ctx.state();
    let pinned = state.is_pinned(&patient.id);

    let on_pin = {
        let ctx = ctx.clone();
        let id = patient.id.clone();
        Callback::from(move |_: MouseEvent| ctx.dispatch(BoardAction::TogglePin(id.clone())))
    };

    let moves = RiskLevel::ALL
        .into_iter()
        .filter(|level| *level != patient.risk)
        .map(|level| {
            let ctx = ctx.clone();
            let id = patient.id.clone();
            let onclick = Callback::from(move |_: MouseEvent| {
                ctx.dispatch(BoardAction::MovePatient {
                    id: id.clone(),
                    to: level,
                })
            });
            html! {
                <button type="button" {onclick}>{ format!("Переместить: {}", level.short_label()) }</button>
            }
        });

    html! {
        <article class={classes!("patient-card", pinned.then_some("is-pinned"))} key={patient.id.clone()}>
            <h3>{ patient.name.clone() }</h3>
            <div class="patient-meta">
                <span>{ patient.age.clone() }</span>
                <span>{ patient.unit.clone() }</span>
                <span>{ patient.bed.clone() }</span>
                <span>{ patient.case_id.clone() }</span>
                <span>{ patient.code.clone() }</span>
                { for patient.tags.iter().map(|tag| html! { <span class="tag">{ tag.clone() }</span> }) }
                { patient.extended.then(|| html! { <span class="tag">{"Расширенный"}</span> }).unwrap_or_default() }
            </div>
            {
                if state.compact {
                    html! {}
                } else {
                    html! {
                        <div class="vital-pills">
                            {
                                for patient.vitals.iter().map(|vital| html! {
                                    <span class={classes!("vital-pill", vital.abnormal.then_some("is-abnormal"))}>
                                        { format!("{} {}{}", vital.label, vital.value, trend_arrow(vital.trend)) }
                                    </span>
                                })
                            }
                        </div>
                    }
                }
            }
            <div class="card-actions">
                <button type="button" onclick={on_pin}>{ if pinned { "Открепить" } else { "Закрепить" } }</button>
                <button type="button" onclick={ctx.go(Route::Dynamics { id: patient.id.clone() })}>{"Динамика"}</button>
                <button type="button" onclick={ctx.go(Route::Chat { id: patient.id.clone() })}>{"Чат"}</button>
                { for moves }
            </div>
        </article>
    }
}

fn trend_arrow(trend: Option<ward_core::Trend>) -> &'static str {
    match trend {
        Some(ward_core::Trend::Up) => " ↑",
        Some(ward_core::Trend::Down) => " ↓",
        Some(ward_core::Trend::Flat) => " →",
        None => "",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreviewTab {
    Overview,
    Chats,
    Routes,
    Consults,
    Tasks,
    Notes,
    Common,
}

impl PreviewTab {
    const ALL: [PreviewTab; 7] = [
        PreviewTab::Overview,
        PreviewTab::Chats,
        PreviewTab::Routes,
        PreviewTab::Consults,
        PreviewTab::Tasks,
        PreviewTab::Notes,
        PreviewTab::Common,
    ];

    fn label(self) -> &'static str {
        match self {
            PreviewTab::Overview => "Новые сообщения",
            PreviewTab::Chats => "Чаты",
            PreviewTab::Routes => "Маршрутизация",
            PreviewTab::Consults => "Консультации",
            PreviewTab::Tasks => "Задачи",
            PreviewTab::Notes => "Записи",
            PreviewTab::Common => "Общий чат",
        }
    }
}

/// Khung "Чаты и планирование" bên phải bảng.
#[function_component(ActivityPanel)]
fn activity_panel() -> Html {
    let tab = use_state(|| PreviewTab::Overview);
    let Some(ctx) = use_context::<AppContext>() else {
        return html! {};
    };
    let state = ctx.state();
    let digest = state.activity();

    let tabs = PreviewTab::ALL.into_iter().map(|option| {
        let tab = tab.clone();
        let is_active = *tab == option;
        let onclick = Callback::from(move |_: MouseEvent| tab.set(option));
        html! {
            <button type="button" class={classes!("tab", is_active.then_some("is-active"))} {onclick}>
                { option.label() }
            </button>
        }
    });

    let body = match *tab {
        PreviewTab::Overview => render_overview(&ctx, &digest.preview(&state.config.preview)),
        PreviewTab::Chats => render_section(&ctx, None, &digest.patient_chats, chat_line),
        PreviewTab::Routes => render_section(&ctx, None, &digest.routes, route_line),
        PreviewTab::Consults => render_section(&ctx, None, &digest.consults, task_line),
        PreviewTab::Tasks => render_section(&ctx, None, &digest.tasks, task_line),
        PreviewTab::Notes => render_section(&ctx, None, &digest.notes, note_line),
        PreviewTab::Common => {
            let on_send = {
                let ctx = ctx.clone();
                Callback::from(move |outgoing: OutgoingMessage| {
                    let clock = SystemClock;
                    let ids = UuidIds;
                    let factory = RecordFactory::new(&clock, &ids);
                    let author = ctx.state().config.author_label.clone();
                    if let Some(message) =
                        factory.message(&author, &outgoing.text, outgoing.attachments)
                    {
                        ctx.dispatch(BoardAction::SendCommon(message));
                    }
                })
            };
            html! {
                <ChatPanel title="Общий чат" messages={state.common.clone()} {on_send} />
            }
        }
    };

    html! {
        <aside class="panel activity-panel">
            <h3>{"Чаты и планирование"}</h3>
            <div class="risk-tabs">{ for tabs }</div>
            { body }
        </aside>
    }
}

fn render_overview(ctx: &AppContext, preview: &ActivityDigest<'_>) -> Html {
    html! {
        <>
            { render_section(ctx, Some("Чаты по пациентам"), &preview.patient_chats, chat_line) }
            { render_section(ctx, Some("Маршрутизация"), &preview.routes, route_line) }
            { render_section(ctx, Some("Консультации"), &preview.consults, task_line) }
            { render_section(ctx, Some("Задачи"), &preview.tasks, task_line) }
            { render_section(ctx, Some("Записи"), &preview.notes, note_line) }
            <div class="activity-section">
                <h4>{"Общий чат"}</h4>
                <ul class="activity-list">
                    { for preview.common.iter().map(common_line) }
                </ul>
            </div>
        </>
    }
}

fn render_section<T>(
    ctx: &AppContext,
    title: Option<&str>,
    items: &[Activity<'_, T>],
    line: fn(&T) -> (String, String),
) -> Html {
    html! {
        <div class="activity-section">
            { title.map(|title| html! { <h4>{ title.to_string() }</h4> }).unwrap_or_default() }
            <ul class="activity-list">
                {
                    if items.is_empty() {
                        html! { <li class="empty-state">{"Нет записей."}</li> }
                    } else {
                        html! {
                            for items.iter().map(|entry| {
                                let (text, when) = line(entry.item);
                                let owner = format!("{} • {} • {}", entry.patient.name, entry.patient.unit, entry.patient.case_id);
                                html! {
                                    <li class="activity-item" onclick={ctx.go(Route::Chat { id: entry.patient.id.to_string() })}>
                                        <small>{ owner }</small>
                                        <span>{ text }</span>
                                        <small>{ when }</small>
                                    </li>
                                }
                            })
                        }
                    }
                }
            </ul>
        </div>
    }
}

fn chat_line(message: &ChatMessage) -> (String, String) {
    (
        format!("{}: {}", message.author, message.text),
        message.time_label(),
    )
}

fn route_line(route: &RouteEvent) -> (String, String) {
    (route.title(), ward_core::date_label(route.date))
}

fn task_line(task: &Task) -> (String, String) {
    let when = task
        .due
        .map(ward_core::date_label)
        .unwrap_or_default();
    (task.title(), when)
}

fn note_line(note: &Note) -> (String, String) {
    (note.text.clone(), note.at.format("%d.%m.%Y %H:%M").to_string())
}

fn common_line(message: &ChatMessage) -> Html {
    html! {
        <li class="activity-item" key={message.id.clone()}>
            <small>{ format!("{} • {}", message.author, message.time_label()) }</small>
            <span>{ message.text.clone() }</span>
        </li>
    }
}
