//! Giao diện Yew của bảng theo dõi hồi sức cho môi trường WebAssembly.

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod board;
#[cfg(target_arch = "wasm32")]
mod chat;
#[cfg(target_arch = "wasm32")]
mod dynamics;
pub mod draft;
#[cfg(target_arch = "wasm32")]
mod intake;
#[cfg(target_arch = "wasm32")]
mod styles;
#[cfg(target_arch = "wasm32")]
mod widgets;

#[cfg(target_arch = "wasm32")]
pub use app::mount_board_view;

#[cfg(not(target_arch = "wasm32"))]
pub fn mount_board_view(
    _: &str,
    _: Option<wasm_bindgen::JsValue>,
    _: Option<u32>,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(wasm_bindgen::JsValue::from_str(
        "ward-ui chỉ hỗ trợ biên dịch target wasm32",
    ))
}
