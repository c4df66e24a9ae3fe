use puzzledrop_core::image::validate_image_url;
use puzzledrop_core::{ImageError, ImageSource};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, Response, Url};

/// Resolves the image to show. Random images are fetched once so every tile
/// shares the URL the endpoint redirected to.
pub(crate) async fn resolve_puzzle_image_src(source: &ImageSource) -> Result<String, ImageError> {
    let request_url = source.request_url()?;
    match source {
        ImageSource::Picked { .. } => Ok(request_url),
        ImageSource::Random { .. } => fetch_final_url(&request_url).await,
    }
}

async fn fetch_final_url(url: &str) -> Result<String, ImageError> {
    let window = web_sys::window().ok_or_else(|| ImageError::Network("no window".to_string()))?;
    let value = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|err| ImageError::Network(js_error_text(&err)))?;
    let response: Response = value
        .dyn_into()
        .map_err(|_| ImageError::Network("fetch did not return a response".to_string()))?;
    if !response.ok() {
        return Err(ImageError::Status {
            code: response.status(),
        });
    }
    let final_url = response.url();
    if final_url.is_empty() {
        return validate_image_url(url);
    }
    validate_image_url(&final_url)
}

pub(crate) fn create_object_url(file: &File) -> Result<String, ImageError> {
    Url::create_object_url_with_blob(file).map_err(|err| ImageError::Network(js_error_text(&err)))
}

pub(crate) fn revoke_object_url(url: &str) {
    let _ = Url::revoke_object_url(url);
}

fn js_error_text(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    err.dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .unwrap_or_else(|| "unknown error".to_string())
}
