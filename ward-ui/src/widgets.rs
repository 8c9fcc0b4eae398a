use ward_core::{AttachmentRef, ChatMessage, Route};
use web_sys::{HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};
use yew::prelude::*;
use yew::TargetCast;

use crate::app::AppContext;

pub fn render_not_found(ctx: &AppContext, message: &str) -> Html {
    html! {
        <div class="not-found panel">
            <p>{ message.to_string() }</p>
            <button type="button" onclick={ctx.go(Route::Board)}>{"Назад"}</button>
        </div>
    }
}

pub fn input_value(event: &InputEvent) -> String {
    event.target_unchecked_into::<HtmlInputElement>().value()
}

pub fn textarea_value(event: &InputEvent) -> String {
    event.target_unchecked_into::<HtmlTextAreaElement>().value()
}

pub fn select_value(event: &Event) -> String {
    event.target_unchecked_into::<HtmlSelectElement>().value()
}

pub fn checkbox_value(event: &Event) -> bool {
    event.target_unchecked_into::<HtmlInputElement>().checked()
}

/// Metadata các tệp đã chọn; nội dung tệp không được đọc.
pub fn selected_files(event: &Event) -> Vec<AttachmentRef> {
    let input: HtmlInputElement = event.target_unchecked_into();
    let Some(files) = input.files() else {
        return Vec::new();
    };
    (0..files.length())
        .filter_map(|index| files.get(index))
        .map(|file| AttachmentRef {
            name: file.name(),
            size_bytes: Some(file.size().max(0.0) as u64),
        })
        .collect()
}

#[derive(Clone, PartialEq)]
pub struct OutgoingMessage {
    pub text: String,
    pub attachments: Vec<AttachmentRef>,
}

#[derive(Properties, PartialEq)]
pub struct ChatPanelProps {
    pub title: AttrValue,
    pub messages: Vec<ChatMessage>,
    pub on_send: Callback<OutgoingMessage>,
}

/// Khung chat dùng chung cho chat theo bệnh nhân và kênh chung.
#[function_component(ChatPanel)]
pub fn chat_panel(props: &ChatPanelProps) -> Html {
    let draft = use_state(String::new);
    let files = use_state(Vec::<AttachmentRef>::new);
    // Đổi key để trình duyệt tạo lại ô chọn tệp sau mỗi lần gửi.
    let file_input_key = use_state(|| 0_u32);

    let on_input = {
        let draft = draft.clone();
        Callback::from(move |event: InputEvent| draft.set(textarea_value(&event)))
    };

    let on_files = {
        let files = files.clone();
        Callback::from(move |event: Event| files.set(selected_files(&event)))
    };

    let on_send = {
        let draft = draft.clone();
        let files = files.clone();
        let file_input_key = file_input_key.clone();
        let on_send = props.on_send.clone();
        Callback::from(move |_: MouseEvent| {
            on_send.emit(OutgoingMessage {
                text: (*draft).clone(),
                attachments: (*files).clone(),
            });
            draft.set(String::new());
            files.set(Vec::new());
            file_input_key.set(*file_input_key + 1);
        })
    };

    html! {
        <section class="panel chat-panel">
            <h3>{ props.title.clone() }</h3>
            <ul class="chat-log">
                {
                    if props.messages.is_empty() {
                        html! { <li class="empty-state">{"Нет сообщений."}</li> }
                    } else {
                        html! { for props.messages.iter().map(render_message) }
                    }
                }
            </ul>
            <div class="chat-compose">
                <textarea
                    rows="2"
                    placeholder="Написать сообщение..."
                    value={(*draft).clone()}
                    oninput={on_input}
                />
                <input
                    key={*file_input_key}
                    type="file"
                    multiple=true
                    onchange={on_files}
                />
                {
                    for files.iter().map(|file| html! {
                        <span class="chat-attachment">{ file.label() }</span>
                    })
                }
                <button type="button" class="primary" onclick={on_send}>{"Отправить"}</button>
            </div>
        </section>
    }
}

pub fn render_message(message: &ChatMessage) -> Html {
    html! {
        <li class="chat-message" key={message.id.clone()}>
            <div>
                <span class="chat-author">{ message.author.clone() }</span>
                <span class="chat-time">{ message.time_label() }</span>
            </div>
            { (!message.text.is_empty()).then(|| html! { <p>{ message.text.clone() }</p> }).unwrap_or_default() }
            {
                for message.attachments.iter().map(|file| html! {
                    <div class="chat-attachment">{ file.label() }</div>
                })
            }
        </li>
    }
}
