//! Trang tiếp nhận bệnh nhân mới.

use chrono::{NaiveDate, NaiveDateTime};
use ward_core::{
    BoardAction, Consciousness, DiagnosisEntry, DiagnosisType, IdGenerator, IntakeErrors,
    IntakeField, IntakeForm, Route, ScoreField, Sex, UuidIds,
};
use yew::prelude::*;

use crate::app::AppContext;
use crate::draft::NumberDrafts;
use crate::widgets::{checkbox_value, input_value, select_value};

const DATETIME_INPUT: &str = "%Y-%m-%dT%H:%M";

fn parse_score(raw: &str) -> Option<u8> {
    raw.trim().parse::<u8>().ok()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

fn show_date(value: Option<NaiveDate>) -> String {
    value
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Chỉ số của phần tử trong `options`, dùng làm `value` của `<option>`.
fn pick<T: Copy>(options: &[T], raw: &str) -> Option<T> {
    raw.parse::<usize>()
        .ok()
        .and_then(|index| options.get(index).copied())
}

fn on_text(form: &UseStateHandle<IntakeForm>, apply: fn(&mut IntakeForm, String)) -> Callback<InputEvent> {
    let form = form.clone();
    Callback::from(move |event: InputEvent| {
        let mut next = (*form).clone();
        apply(&mut next, input_value(&event));
        form.set(next);
    })
}

fn on_select(form: &UseStateHandle<IntakeForm>, apply: fn(&mut IntakeForm, String)) -> Callback<Event> {
    let form = form.clone();
    Callback::from(move |event: Event| {
        let mut next = (*form).clone();
        apply(&mut next, select_value(&event));
        form.set(next);
    })
}

fn on_toggle(form: &UseStateHandle<IntakeForm>, apply: fn(&mut IntakeForm, bool)) -> Callback<Event> {
    let form = form.clone();
    Callback::from(move |event: Event| {
        let mut next = (*form).clone();
        apply(&mut next, checkbox_value(&event));
        form.set(next);
    })
}

fn on_diagnosis(
    form: &UseStateHandle<IntakeForm>,
    index: usize,
    apply: fn(&mut DiagnosisEntry, String),
) -> Callback<InputEvent> {
    let form = form.clone();
    Callback::from(move |event: InputEvent| {
        let mut next = (*form).clone();
        if let Some(entry) = next.diagnoses.get_mut(index) {
            apply(entry, input_value(&event));
        }
        form.set(next);
    })
}

fn on_calculate(form: &UseStateHandle<IntakeForm>, field: ScoreField) -> Callback<MouseEvent> {
    let form = form.clone();
    Callback::from(move |_: MouseEvent| {
        let mut next = (*form).clone();
        next.calculate(field);
        form.set(next);
    })
}

fn field(label: &str, error: Option<&'static str>, control: Html) -> Html {
    html! {
        <label class="form-field">
            <span>{ label.to_string() }</span>
            { control }
            { error.map(|message| html! { <span class="field-error">{ message }</span> }).unwrap_or_default() }
        </label>
    }
}

/// Ô số giữ chuỗi nháp; form nhận `None` khi chuỗi chưa đọc được thành số.
fn number_field(
    label: &str,
    key: &'static str,
    form: &UseStateHandle<IntakeForm>,
    drafts: &UseStateHandle<NumberDrafts>,
    apply: fn(&mut IntakeForm, Option<f64>),
) -> Html {
    let oninput = {
        let form = form.clone();
        let drafts = drafts.clone();
        Callback::from(move |event: InputEvent| {
            let (next_drafts, value) = drafts.edit(key, input_value(&event));
            let mut next = (*form).clone();
            apply(&mut next, value);
            drafts.set(next_drafts);
            form.set(next);
        })
    };
    field(
        label,
        None,
        html! { <input type="text" inputmode="decimal" value={drafts.text(key)} {oninput} /> },
    )
}

fn score_field(
    label: &str,
    value: Option<u8>,
    oninput: Callback<InputEvent>,
    onclick: Callback<MouseEvent>,
) -> Html {
    field(
        label,
        None,
        html! {
            <div class="score-field">
                <input
                    type="number"
                    value={value.map(|score| score.to_string()).unwrap_or_default()}
                    {oninput}
                />
                <button type="button" {onclick}>{"Рассчитать"}</button>
            </div>
        },
    )
}

#[function_component(AddPatientPage)]
pub fn add_patient_page() -> Html {
    let form = use_state(IntakeForm::default);
    let drafts = use_state(NumberDrafts::default);
    let errors = use_state(|| None::<IntakeErrors>);
    let Some(ctx) = use_context::<AppContext>() else {
        return html! {};
    };
    let config = &ctx.state().config;
    let error_for = |field: IntakeField| {
        errors
            .as_ref()
            .and_then(|errors| errors.message_for(field))
    };

    let on_submit = {
        let ctx = ctx.clone();
        let form = form.clone();
        let errors = errors.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            match form.validate() {
                Ok(valid) => {
                    errors.set(None);
                    let patient = valid.into_patient(UuidIds.next_id());
                    ctx.dispatch(BoardAction::AppendPatient(patient));
                    ctx.navigate.emit(Route::Board);
                }
                Err(missing) => errors.set(Some(missing)),
            }
        })
    };

    let on_add_diagnosis = {
        let form = form.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = (*form).clone();
            next.diagnoses.push(DiagnosisEntry::default());
            form.set(next);
        })
    };

    let diagnoses = form.diagnoses.iter().enumerate().map(|(index, entry)| {
        html! {
            <div class="form-grid" key={index}>
                { field("Дата постановки", None, html! {
                    <input
                        type="date"
                        value={show_date(entry.date)}
                        oninput={on_diagnosis(&form, index, |entry, raw| entry.date = parse_date(&raw))}
                    />
                }) }
                { field("МКБ", None, html! {
                    <input
                        type="text"
                        value={entry.icd_code.clone().unwrap_or_default()}
                        oninput={on_diagnosis(&form, index, |entry, raw| {
                            entry.icd_code = Some(raw.trim().to_string()).filter(|code| !code.is_empty())
                        })}
                    />
                }) }
                { field("Описание диагноза", None, html! {
                    <input
                        type="text"
                        value={entry.text.clone().unwrap_or_default()}
                        oninput={on_diagnosis(&form, index, |entry, raw| {
                            entry.text = Some(raw).filter(|text| !text.trim().is_empty())
                        })}
                    />
                }) }
            </div>
        }
    });

    let bed_options = (1..=config.bed_count).map(|bed| {
        html! {
            <option value={bed.to_string()} selected={form.bed_no == Some(bed)}>{ format!("Койка №{bed}") }</option>
        }
    });
    let department_options = config.departments.iter().map(|department| {
        html! {
            <option value={department.clone()} selected={form.department.as_deref() == Some(department.as_str())}>
                { department.clone() }
            </option>
        }
    });

    html! {
        <>
            <header class="page-header">
                <button type="button" onclick={ctx.go(Route::Board)}>{"Назад"}</button>
                <h1>{"Новый пациент"}</h1>
                <span>{ form.bed_label() }</span>
            </header>
            <form class="intake-form" onsubmit={on_submit} novalidate=true>
                <section>
                    <h3>{"1. Данные пациента"}</h3>
                    <div class="form-grid">
                        { field("Фамилия", error_for(IntakeField::LastName), html! {
                            <input type="text" value={form.last_name.clone()}
                                oninput={on_text(&form, |form, raw| form.last_name = raw)} />
                        }) }
                        { field("Имя", error_for(IntakeField::FirstName), html! {
                            <input type="text" value={form.first_name.clone()}
                                oninput={on_text(&form, |form, raw| form.first_name = raw)} />
                        }) }
                        { field("Отчество", None, html! {
                            <input type="text" value={form.middle_name.clone()}
                                oninput={on_text(&form, |form, raw| form.middle_name = raw)} />
                        }) }
                        { field("Дата рождения", None, html! {
                            <input type="date" value={show_date(form.birth_date)}
                                oninput={on_text(&form, |form, raw| form.birth_date = parse_date(&raw))} />
                        }) }
                        { field("Пол", None, html! {
                            <select onchange={on_select(&form, |form, raw| {
                                if let Some(sex) = pick(&Sex::ALL, &raw) {
                                    form.sex = sex;
                                }
                            })}>
                                {
                                    for Sex::ALL.iter().enumerate().map(|(index, sex)| html! {
                                        <option value={index.to_string()} selected={form.sex == *sex}>{ sex.label() }</option>
                                    })
                                }
                            </select>
                        }) }
                        { number_field("Рост, см", "height_cm", &form, &drafts, |form, value| form.height_cm = value) }
                        { number_field("Вес, кг", "weight_kg", &form, &drafts, |form, value| form.weight_kg = value) }
                        { field("№ ИБ", error_for(IntakeField::Mrn), html! {
                            <input type="text" value={form.mrn.clone()}
                                oninput={on_text(&form, |form, raw| form.mrn = raw)} />
                        }) }
                        { field("Дата/время поступления в ОРИТ", error_for(IntakeField::AdmitAt), html! {
                            <input
                                type="datetime-local"
                                value={form.admit_at.map(|at| at.format(DATETIME_INPUT).to_string()).unwrap_or_default()}
                                oninput={on_text(&form, |form, raw| {
                                    form.admit_at = NaiveDateTime::parse_from_str(&raw, DATETIME_INPUT).ok()
                                })}
                            />
                        }) }
                        { field("Койка", error_for(IntakeField::BedNo), html! {
                            <select onchange={on_select(&form, |form, raw| form.bed_no = raw.parse().ok())}>
                                <option value="" selected={form.bed_no.is_none()}>{"Выберите койку"}</option>
                                { for bed_options }
                            </select>
                        }) }
                        { field("Отделение", error_for(IntakeField::Department), html! {
                            <select onchange={on_select(&form, |form, raw| {
                                form.department = Some(raw).filter(|department| !department.is_empty())
                            })}>
                                <option value="" selected={form.department.is_none()}>{"Выберите отделение"}</option>
                                { for department_options }
                            </select>
                        }) }
                    </div>
                </section>
                <section>
                    <h3>{"2. Диагнозы"}</h3>
                    <div class="form-grid">
                        { field("Диагноз", None, html! {
                            <select onchange={on_select(&form, |form, raw| {
                                if let Some(kind) = pick(&DiagnosisType::ALL, &raw) {
                                    form.diagnosis_type = kind;
                                }
                            })}>
                                {
                                    for DiagnosisType::ALL.iter().enumerate().map(|(index, kind)| html! {
                                        <option value={index.to_string()} selected={form.diagnosis_type == *kind}>{ kind.label() }</option>
                                    })
                                }
                            </select>
                        }) }
                    </div>
                    { for diagnoses }
                    <button type="button" onclick={on_add_diagnosis}>{"Добавить диагноз"}</button>
                </section>
                <section>
                    <h3>{"3. Состояние пациента"}</h3>
                    <div class="form-grid">
                        { field("Сознание", None, html! {
                            <select onchange={on_select(&form, |form, raw| form.consciousness = pick(&Consciousness::ALL, &raw))}>
                                <option value="" selected={form.consciousness.is_none()}>{"Выберите значение"}</option>
                                {
                                    for Consciousness::ALL.iter().enumerate().map(|(index, state)| html! {
                                        <option value={index.to_string()} selected={form.consciousness == Some(*state)}>{ state.label() }</option>
                                    })
                                }
                            </select>
                        }) }
                        <label class="form-field">
                            <span>{"Инотропы/вазопрессоры"}</span>
                            <input type="checkbox" checked={form.vasopressors}
                                onchange={on_toggle(&form, |form, on| form.vasopressors = on)} />
                        </label>
                        <label class="form-field">
                            <span>{"ИВЛ"}</span>
                            <input type="checkbox" checked={form.ventilation}
                                onchange={on_toggle(&form, |form, on| form.ventilation = on)} />
                        </label>
                        { number_field("ЧД", "rr", &form, &drafts, |form, value| form.rr = value) }
                        { number_field("SpO2", "spo2", &form, &drafts, |form, value| form.spo2 = value) }
                        { number_field("T°", "temp", &form, &drafts, |form, value| form.temp = value) }
                        { number_field("ЧСС", "hr", &form, &drafts, |form, value| form.hr = value) }
                        { number_field("АД сист.", "sbp", &form, &drafts, |form, value| form.sbp = value) }
                        { number_field("АД диаст.", "dbp", &form, &drafts, |form, value| form.dbp = value) }
                        { number_field("FiO2", "fio2", &form, &drafts, |form, value| form.fio2 = value) }
                        { number_field("PEEP", "peep", &form, &drafts, |form, value| form.peep = value) }
                        { number_field("Лактат", "lactate", &form, &drafts, |form, value| form.lactate = value) }
                        { score_field("SOFA", form.sofa,
                            on_text(&form, |form, raw| form.sofa = parse_score(&raw)),
                            on_calculate(&form, ScoreField::Sofa)) }
                        { score_field("APACHE", form.apache,
                            on_text(&form, |form, raw| form.apache = parse_score(&raw)),
                            on_calculate(&form, ScoreField::Apache)) }
                        { score_field("ШКГ (GCS)", form.gcs_score,
                            on_text(&form, |form, raw| form.gcs_score = parse_score(&raw)),
                            on_calculate(&form, ScoreField::Gcs)) }
                        <label class="form-field">
                            <span>{"Расширенный мониторинг"}</span>
                            <input type="checkbox" checked={form.extended}
                                onchange={on_toggle(&form, |form, on| form.extended = on)} />
                        </label>
                    </div>
                </section>
                <div class="toolbar">
                    <button type="button" onclick={ctx.go(Route::Board)}>{"Отмена"}</button>
                    <button type="submit" class="primary">{"Сохранить"}</button>
                </div>
            </form>
        </>
    }
}
