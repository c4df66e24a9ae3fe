#[cfg(target_arch = "wasm32")]
use std::cell::Cell;

#[cfg(target_arch = "wasm32")]
use js_sys::{Array, Function, Object, Reflect};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, JsValue};

use puzzledrop_core::{ConfigError, ImageError};

/// Name of the loader object `index.html` installs on `window`.
pub(crate) const BOOT_GLOBAL: &str = "__PD_BOOT";

#[cfg(target_arch = "wasm32")]
thread_local! {
    static LOADER_HIDDEN: Cell<bool> = const { Cell::new(false) };
}

/// Why the page could not get a round going.
#[derive(Clone, Copy, Debug)]
pub(crate) enum BootFailure<'a> {
    Mount,
    Image(&'a ImageError),
    Config(&'a ConfigError),
}

impl BootFailure<'_> {
    pub(crate) fn code(&self) -> &'static str {
        match *self {
            BootFailure::Mount => "mount",
            BootFailure::Image(err) | BootFailure::Config(ConfigError::Image(err)) => match err {
                ImageError::EmptyUrl | ImageError::UnsupportedUrl(_) => "image-url",
                ImageError::InvalidSize { .. } => "image-size",
                ImageError::Status { .. } => "image-status",
                ImageError::Network(_) => "image-network",
            },
            BootFailure::Config(_) => "config",
        }
    }

    pub(crate) fn message(&self) -> String {
        match self {
            BootFailure::Mount => "The page could not be set up.".to_string(),
            BootFailure::Image(err) => err.to_string(),
            BootFailure::Config(err) => err.to_string(),
        }
    }

    pub(crate) fn hint(&self) -> &'static str {
        match self.code() {
            "image-url" => "Pick another image or load a random one.",
            "image-size" => "Check the image size in the config.",
            "image-status" => "The image service refused the request. Retry in a moment.",
            "image-network" => "Check the connection and retry.",
            "config" => "Fix the query parameters and reload.",
            _ => "Reload the page.",
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn boot_object() -> Option<Object> {
    let window = web_sys::window()?;
    let value = Reflect::get(&window, &JsValue::from_str(BOOT_GLOBAL)).ok()?;
    if value.is_null() || value.is_undefined() {
        return None;
    }
    value.dyn_into::<Object>().ok()
}

/// Calls `method` on the loader object; a page without one is left alone.
#[cfg(target_arch = "wasm32")]
fn notify(method: &str, args: &[&str]) {
    let Some(boot) = boot_object() else {
        return;
    };
    let Ok(func) = Reflect::get(&boot, &JsValue::from_str(method))
        .and_then(|value| value.dyn_into::<Function>().map_err(JsValue::from))
    else {
        return;
    };
    let array: Array = args.iter().map(|arg| JsValue::from_str(arg)).collect();
    let _ = func.apply(&boot, &array);
}

pub(crate) fn set_phase(label: &str, detail: &str) {
    #[cfg(target_arch = "wasm32")]
    notify("setPhase", &[label, detail]);
    #[cfg(not(target_arch = "wasm32"))]
    let _ = (label, detail);
}

/// Swaps the loader for the error banner and its retry button.
pub(crate) fn fail(failure: BootFailure<'_>) {
    let message = failure.message();
    #[cfg(target_arch = "wasm32")]
    notify("fail", &[failure.code(), message.as_str(), failure.hint()]);
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

/// Hides the loader. Only the first call reaches the page.
pub(crate) fn ready() {
    #[cfg(target_arch = "wasm32")]
    {
        if LOADER_HIDDEN.with(|hidden| hidden.replace(true)) {
            return;
        }
        notify("ready", &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_failures_map_to_codes() {
        assert_eq!(BootFailure::Image(&ImageError::EmptyUrl).code(), "image-url");
        assert_eq!(
            BootFailure::Image(&ImageError::Status { code: 503 }).code(),
            "image-status"
        );
        let offline = ImageError::Network("offline".to_string());
        assert_eq!(BootFailure::Image(&offline).code(), "image-network");
        assert_eq!(
            BootFailure::Image(&offline).hint(),
            "Check the connection and retry."
        );
    }

    #[test]
    fn config_failures_keep_image_details() {
        let wrapped = ConfigError::Image(ImageError::EmptyUrl);
        assert_eq!(BootFailure::Config(&wrapped).code(), "image-url");
        let zero = ConfigError::ZeroDuration { key: "piece_secs" };
        let failure = BootFailure::Config(&zero);
        assert_eq!(failure.code(), "config");
        assert_eq!(failure.message(), zero.to_string());
        assert_eq!(BootFailure::Mount.hint(), "Reload the page.");
    }
}
