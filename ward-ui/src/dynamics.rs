use chrono::NaiveDate;
use ward_core::{build_table, date_label, BoardAction, Clock, Reading, Route, SystemClock};
use yew::prelude::*;

use crate::app::AppContext;
use crate::widgets::{checkbox_value, input_value, render_not_found};

#[derive(Properties, PartialEq)]
pub struct DynamicsPageProps {
    pub id: String,
}

#[function_component(DynamicsPage)]
pub fn dynamics_page(props: &DynamicsPageProps) -> Html {
    let Some(ctx) = use_context::<AppContext>() else {
        return html! {};
    };
    let Some(patient) = ctx.state().patient(&props.id) else {
        return render_not_found(&ctx, "Пациент не найден");
    };
    let table = build_table(patient);

    let on_new_column = {
        let ctx = ctx.clone();
        let id = props.id.clone();
        Callback::from(move |_: MouseEvent| {
            ctx.dispatch(BoardAction::AddMonitoringColumn {
                patient_id: id.clone(),
                today: SystemClock.today(),
            })
        })
    };
    let on_extended = {
        let ctx = ctx.clone();
        let id = props.id.clone();
        Callback::from(move |event: Event| {
            ctx.dispatch(BoardAction::SetExtended {
                patient_id: id.clone(),
                enabled: checkbox_value(&event),
            })
        })
    };

    let cell = |row: &'static str, date: NaiveDate, value: String| {
        let ctx = ctx.clone();
        let id = props.id.clone();
        let oninput = Callback::from(move |event: InputEvent| {
            ctx.dispatch(BoardAction::SetCell {
                patient_id: id.clone(),
                row: row.to_string(),
                date,
                value: Reading::from(input_value(&event)),
            })
        });
        html! {
            <td>
                <input type="text" {value} {oninput} placeholder="—" />
            </td>
        }
    };

    html! {
        <>
            <header class="page-header">
                <button type="button" onclick={ctx.go(Route::Board)}>{"Назад"}</button>
                <h1>{ format!("Динамика • {} • {}", patient.name, patient.case_id) }</h1>
                <label>
                    <input type="checkbox" checked={patient.extended} onchange={on_extended} />
                    {"Расширенный мониторинг"}
                </label>
                <button type="button" class="primary" onclick={on_new_column}>{"Новый мониторинг"}</button>
                <button type="button" onclick={ctx.go(Route::Chat { id: patient.id.clone() })}>{"Чат"}</button>
            </header>
            <table class="dynamics-table">
                <thead>
                    <tr>
                        <th>{"Параметр"}</th>
                        { for table.dates.iter().map(|date| html! { <th>{ date_label(*date) }</th> }) }
                    </tr>
                </thead>
                <tbody>
                    {
                        for table.rows.iter().map(|row| match &row.cells {
                            None => html! {
                                <tr class="group-row" key={row.key}>
                                    <th colspan={(table.dates.len() + 1).to_string()}>{ row.label }</th>
                                </tr>
                            },
                            Some(cells) => html! {
                                <tr key={row.key}>
                                    <th>{ row.label }</th>
                                    {
                                        for table.dates.iter().zip(cells).map(|(date, value)| {
                                            cell(row.key, *date, value.clone())
                                        })
                                    }
                                </tr>
                            },
                        })
                    }
                </tbody>
            </table>
            {
                if table.dates.is_empty() {
                    html! { <p class="empty-state">{"Нажмите «Новый мониторинг», чтобы добавить столбец."}</p> }
                } else {
                    html! {}
                }
            }
        </>
    }
}
