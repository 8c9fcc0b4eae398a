use chrono::NaiveDate;
use ward_core::{
    patient_feed, BoardAction, FeedKind, PlanningForm, RecordFactory, Route, SystemClock, UuidIds,
};
use yew::prelude::*;

use crate::app::AppContext;
use crate::widgets::{
    checkbox_value, input_value, render_not_found, select_value, textarea_value, ChatPanel,
    OutgoingMessage,
};

#[derive(Properties, PartialEq)]
pub struct ChatPageProps {
    pub id: String,
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn date_value(date: Option<NaiveDate>) -> String {
    date.map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Trang chat theo bệnh nhân: form lập kế hoạch, dòng sự kiện và chat.
#[function_component(ChatPage)]
pub fn chat_page(props: &ChatPageProps) -> Html {
    let form = use_state(PlanningForm::default);
    let status = use_state(|| None::<&'static str>);
    let feed_kinds = use_state(|| FeedKind::ALL.to_vec());
    let Some(ctx) = use_context::<AppContext>() else {
        return html! {};
    };
    let Some(patient) = ctx.state().patient(&props.id) else {
        return render_not_found(&ctx, "Пациент не найден");
    };

    let edit = |apply: fn(&mut PlanningForm, String)| {
        let form = form.clone();
        move |value: String| {
            let mut next = (*form).clone();
            apply(&mut next, value);
            form.set(next);
        }
    };
    let on_note = {
        let set = edit(|form, value| form.note = value);
        Callback::from(move |event: InputEvent| set(textarea_value(&event)))
    };
    let on_task_text = {
        let set = edit(|form, value| form.task_text = value);
        Callback::from(move |event: InputEvent| set(input_value(&event)))
    };
    let on_task_due = {
        let set = edit(|form, value| form.task_due = parse_date(&value));
        Callback::from(move |event: InputEvent| set(input_value(&event)))
    };
    let on_consult_text = {
        let set = edit(|form, value| form.consult_text = value);
        Callback::from(move |event: InputEvent| set(input_value(&event)))
    };
    let on_consult_due = {
        let set = edit(|form, value| form.consult_due = parse_date(&value));
        Callback::from(move |event: InputEvent| set(input_value(&event)))
    };
    let on_route_date = {
        let set = edit(|form, value| form.route_date = parse_date(&value));
        Callback::from(move |event: InputEvent| set(input_value(&event)))
    };
    let on_route_org = {
        let set = edit(|form, value| form.route_org = value);
        Callback::from(move |event: Event| set(select_value(&event)))
    };
    let on_route_comment = {
        let set = edit(|form, value| form.route_comment = value);
        Callback::from(move |event: InputEvent| set(input_value(&event)))
    };

    let on_submit = {
        let ctx = ctx.clone();
        let form = form.clone();
        let status = status.clone();
        let id = props.id.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let clock = SystemClock;
            let ids = UuidIds;
            let records = form.build(&RecordFactory::new(&clock, &ids));
            if records.is_empty() {
                return;
            }
            ctx.dispatch(BoardAction::ApplyPlan {
                patient_id: id.clone(),
                records,
            });
            form.set(PlanningForm::default());
            status.set(Some("Запись добавлена"));
        })
    };

    let on_send = {
        let ctx = ctx.clone();
        let id = props.id.clone();
        Callback::from(move |outgoing: OutgoingMessage| {
            let clock = SystemClock;
            let ids = UuidIds;
            let factory = RecordFactory::new(&clock, &ids);
            let author = ctx.state().config.author_label.clone();
            if let Some(message) = factory.message(&author, &outgoing.text, outgoing.attachments) {
                ctx.dispatch(BoardAction::SendMessage {
                    patient_id: id.clone(),
                    message,
                });
            }
        })
    };

    let feed = patient_feed(patient, &feed_kinds);
    let feed_filters = FeedKind::ALL.into_iter().map(|kind| {
        let feed_kinds = feed_kinds.clone();
        let checked = feed_kinds.contains(&kind);
        let onchange = Callback::from(move |event: Event| {
            let mut next: Vec<FeedKind> = (*feed_kinds)
                .iter()
                .copied()
                .filter(|enabled| *enabled != kind)
                .collect();
            if checkbox_value(&event) {
                next.push(kind);
            }
            feed_kinds.set(next);
        });
        html! {
            <label>
                <input type="checkbox" {checked} {onchange} />
                { kind.label() }
            </label>
        }
    });

    let orgs = ctx.state().config.route_orgs.clone();

    html! {
        <>
            <header class="page-header">
                <button type="button" onclick={ctx.go(Route::Board)}>{"Назад"}</button>
                <h1>{ format!("{} • {} • {}", patient.name, patient.unit, patient.bed) }</h1>
                <button type="button" onclick={ctx.go(Route::Dynamics { id: patient.id.clone() })}>{"Динамика"}</button>
            </header>
            <div class="detail-layout">
                <div>
                    <form class="panel planning-form" onsubmit={on_submit}>
                        <h3>{"Действие над пациентом"}</h3>
                        <fieldset>
                            <legend>{"Заметка"}</legend>
                            <textarea
                                rows="3"
                                placeholder="Опишите событие / добавьте заметку"
                                value={form.note.clone()}
                                oninput={on_note}
                            />
                        </fieldset>
                        <fieldset>
                            <legend>{"Запланировать задачу"}</legend>
                            <input type="text" placeholder="Задача" value={form.task_text.clone()} oninput={on_task_text} />
                            <input type="date" value={date_value(form.task_due)} oninput={on_task_due} />
                        </fieldset>
                        <fieldset>
                            <legend>{"Запланировать консультацию"}</legend>
                            <input type="text" placeholder="Тема консультации" value={form.consult_text.clone()} oninput={on_consult_text} />
                            <input type="date" value={date_value(form.consult_due)} oninput={on_consult_due} />
                        </fieldset>
                        <fieldset>
                            <legend>{"Запланировать маршрутизацию"}</legend>
                            <input type="date" value={date_value(form.route_date)} oninput={on_route_date} />
                            <select onchange={on_route_org}>
                                <option value="" selected={form.route_org.is_empty()}>{"Медицинская организация"}</option>
                                {
                                    for orgs.into_iter().map(|org| html! {
                                        <option value={org.clone()} selected={form.route_org == org}>{ org.clone() }</option>
                                    })
                                }
                            </select>
                            <input type="text" placeholder="Комментарий" value={form.route_comment.clone()} oninput={on_route_comment} />
                        </fieldset>
                        <button type="submit" class="primary">{"Добавить"}</button>
                        { status.map(|text| html! { <span class="form-status">{ text }</span> }).unwrap_or_default() }
                    </form>
                    <section class="panel">
                        <h3>{"Лента событий"}</h3>
                        <div class="feed-filters">{ for feed_filters }</div>
                        <ul class="activity-list">
                            {
                                if feed.is_empty() {
                                    html! { <li class="empty-state">{"Нет записей по выбранным типам."}</li> }
                                } else {
                                    html! {
                                        for feed.iter().map(|item| html! {
                                            <li class="activity-item">
                                                <small>{ item.kind.label() }</small>
                                                <span>{ item.title.clone() }</span>
                                                <small>
                                                    { item.date.map(|date| date.format("%d.%m.%Y %H:%M").to_string()).unwrap_or_default() }
                                                </small>
                                            </li>
                                        })
                                    }
                                }
                            }
                        </ul>
                    </section>
                </div>
                <ChatPanel title="Чат по пациенту" messages={patient.chat.clone()} {on_send} />
            </div>
        </>
    }
}
