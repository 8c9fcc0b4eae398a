use std::rc::Rc;

use serde_wasm_bindgen::from_value;
use ward_core::{
    BoardAction, BoardConfig, BoardState, Clock, PartialBoardConfig, PatientSeeder, Route,
    SystemClock,
};
use ward_mock::{common_channel_seed, RandomSeeder};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, Document, Element, Window};
use yew::prelude::*;

use crate::board::BoardPage;
use crate::chat::ChatPage;
use crate::dynamics::DynamicsPage;
use crate::intake::AddPatientPage;
use crate::styles;
use crate::widgets::render_not_found;

/// Bọc `BoardState` để dùng với `use_reducer`. Hành động lỗi được ghi ra
/// console và trạng thái giữ nguyên.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState(pub BoardState);

impl Reducible for UiState {
    type Action = BoardAction;

    fn reduce(self: Rc<Self>, action: BoardAction) -> Rc<Self> {
        let mut next = self.0.clone();
        match next.apply(action) {
            Ok(()) => Rc::new(UiState(next)),
            Err(err) => {
                console::warn_1(&JsValue::from_str(&err.to_string()));
                self
            }
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct AppContext {
    pub board: UseReducerHandle<UiState>,
    pub navigate: Callback<Route>,
}

impl AppContext {
    pub fn state(&self) -> &BoardState {
        &self.board.0
    }

    pub fn dispatch(&self, action: BoardAction) {
        self.board.dispatch(action);
    }

    pub fn go(&self, route: Route) -> Callback<MouseEvent> {
        let navigate = self.navigate.clone();
        Callback::from(move |_| navigate.emit(route.clone()))
    }
}

fn current_route() -> Route {
    web_sys::window()
        .and_then(|window| window.location().hash().ok())
        .map(|hash| Route::parse(&hash))
        .unwrap_or(Route::Board)
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: BoardConfig,
    pub seed: u64,
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    use_effect_with((), |_| {
        if let Some(window) = web_sys::window() {
            if let Some(document) = window.document() {
                if let Err(err) = styles::ensure_styles(&document) {
                    console::error_1(&err);
                }
            }
        }
        || ()
    });

    let board = {
        let config = props.config.clone();
        let seed = props.seed;
        use_reducer(move || {
            let today = SystemClock.today();
            let patients = RandomSeeder::new(seed).seed(today);
            UiState(BoardState::new(
                patients,
                common_channel_seed(today),
                config,
            ))
        })
    };

    let route = use_state(current_route);

    {
        let route = route.clone();
        use_effect_with((), move |_| {
            let listener = Closure::<dyn Fn()>::new(move || route.set(current_route()));
            let window = web_sys::window();
            if let Some(window) = &window {
                if let Err(err) = window
                    .add_event_listener_with_callback("hashchange", listener.as_ref().unchecked_ref())
                {
                    console::error_1(&err);
                }
            }
            move || {
                if let Some(window) = window {
                    if let Err(err) = window.remove_event_listener_with_callback(
                        "hashchange",
                        listener.as_ref().unchecked_ref(),
                    ) {
                        console::error_1(&err);
                    }
                }
            }
        });
    }

    let navigate = {
        let route = route.clone();
        Callback::from(move |next: Route| {
            if let Some(window) = web_sys::window() {
                if let Err(err) = window.location().set_hash(&next.path()) {
                    console::error_1(&err);
                }
            }
            route.set(next);
        })
    };

    let context = AppContext { board, navigate };
    let page = match (*route).clone() {
        Route::Board => html! { <BoardPage /> },
        Route::Dynamics { id } => html! { <DynamicsPage {id} /> },
        Route::Chat { id } => html! { <ChatPage {id} /> },
        Route::NewPatient => html! { <AddPatientPage /> },
        Route::NotFound => render_not_found(&context, "Страница не найдена"),
    };

    html! {
        <ContextProvider<AppContext> context={context}>
            <div class="ward-root">{ page }</div>
        </ContextProvider<AppContext>>
    }
}

/// Gắn ứng dụng vào phần tử khớp `selector`. `config` là cấu hình một phần,
/// `seed` cố định danh sách bệnh nhân mẫu.
#[wasm_bindgen]
pub fn mount_board_view(
    selector: &str,
    config: Option<JsValue>,
    seed: Option<u32>,
) -> Result<(), JsValue> {
    let window: Window = web_sys::window().ok_or_else(|| JsValue::from_str("Không có window"))?;
    let document: Document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Không truy cập được document"))?;

    let target: Element = document
        .query_selector(selector)
        .map_err(|err| JsValue::from_str(&format!("Selector lỗi: {err:?}")))?
        .ok_or_else(|| JsValue::from_str("Không tìm thấy element theo selector"))?;

    let config = match config {
        Some(js_cfg) => BoardConfig::from(from_value::<PartialBoardConfig>(js_cfg)?),
        None => BoardConfig::default(),
    };
    let seed = seed.map(u64::from).unwrap_or_else(|| {
        // Không có seed thì lấy theo thời điểm mở trang.
        SystemClock.now().and_utc().timestamp().unsigned_abs()
    });

    yew::Renderer::<App>::with_root_and_props(target, AppProps { config, seed }).render();
    Ok(())
}
