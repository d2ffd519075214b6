use js_sys::JSON;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use scrollfx_core::{
    AnimationOptions, BackgroundInit, Config, ElementInit, Engine, Inputs, Outputs, ParallaxId,
    ParallaxOptions, RandomSource, TargetId,
};

mod logging;

pub use logging::init_logging;

#[wasm_bindgen]
pub struct ScrollFx {
    core: Engine,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Glyph randomness from `Math.random`.
struct JsRandom;

impl RandomSource for JsRandom {
    fn next_f64(&mut self) -> f64 {
        js_sys::Math::random()
    }
}

/// Deserialize through `JSON.stringify` + serde_json so integer options
/// (`start`, `stepsPerGlyph`) and untagged values like `finish` see JSON
/// numbers exactly as the attribute adapter does.
fn from_json<T: DeserializeOwned>(value: &JsValue, what: &str) -> Result<T, JsError> {
    let text = JSON::stringify(value)
        .map_err(|e| JsError::new(&format!("{what} stringify error: {e:?}")))?
        .as_string()
        .ok_or_else(|| JsError::new(&format!("{what}: stringify produced non-string")))?;
    serde_json::from_str(&text).map_err(|e| JsError::new(&format!("{what} parse error: {e}")))
}

/// Optional JS object as a JSON value (`None` for undefined/null).
fn optional_json(value: &JsValue, what: &str) -> Result<Option<serde_json::Value>, JsError> {
    if jsvalue_is_undefined_or_null(value) {
        Ok(None)
    } else {
        from_json(value, what).map(Some)
    }
}

/// A dataset (`DOMStringMap`) or plain object of string attributes.
fn attribute_pairs(value: &JsValue, what: &str) -> Result<Vec<(String, String)>, JsError> {
    if jsvalue_is_undefined_or_null(value) {
        return Ok(Vec::new());
    }
    let map: serde_json::Map<String, serde_json::Value> = from_json(value, what)?;
    Ok(map
        .into_iter()
        .map(|(k, v)| {
            let text = match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            };
            (k, text)
        })
        .collect())
}

#[wasm_bindgen]
impl ScrollFx {
    /// Create a new engine instance. Pass a JSON config object or undefined/null for defaults.
    /// Example:
    ///   new ScrollFx({ capabilities: { video: true, transforms3d: true },
    ///                  viewport: { scrollY: 0, width: 1280, height: 800 } })
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<ScrollFx, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };

        Ok(ScrollFx {
            core: Engine::new(cfg).with_random(JsRandom),
        })
    }

    /// Bind a count/scramble animation. `element` is `{ top, height, text }`.
    /// Returns the target id (u32).
    #[wasm_bindgen(js_name = bind_animation)]
    pub fn bind_animation(
        &mut self,
        opts: JsValue,
        element: JsValue,
        now: f64,
    ) -> Result<u32, JsError> {
        let opts: AnimationOptions = if jsvalue_is_undefined_or_null(&opts) {
            AnimationOptions::default()
        } else {
            from_json(&opts, "animation options")?
        };
        let element: ElementInit = swb::from_value(element)
            .map_err(|e| JsError::new(&format!("element error: {e}")))?;
        let id = self
            .core
            .bind_animation(opts, &element, now)
            .map_err(|e| JsError::new(&format!("bind_animation: {e}")))?;
        Ok(id.0)
    }

    /// Bind from an element's `dataset` (`animate`, `animateDuration`, ...)
    /// with optional explicit options on top.
    #[wasm_bindgen(js_name = bind_animation_from_dataset)]
    pub fn bind_animation_from_dataset(
        &mut self,
        dataset: JsValue,
        explicit: JsValue,
        element: JsValue,
        now: f64,
    ) -> Result<u32, JsError> {
        let pairs = attribute_pairs(&dataset, "dataset")?;
        let explicit = optional_json(&explicit, "explicit options")?;
        let element: ElementInit = swb::from_value(element)
            .map_err(|e| JsError::new(&format!("element error: {e}")))?;
        let id = self
            .core
            .bind_animation_from_attributes(
                pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                explicit.as_ref(),
                &element,
                now,
            )
            .map_err(|e| JsError::new(&format!("bind_animation_from_dataset: {e}")))?;
        Ok(id.0)
    }

    /// Bind a parallax/video background. `container` is
    /// `{ top, width, height, videoDisabled }`. Returns the background id (u32).
    #[wasm_bindgen(js_name = bind_parallax)]
    pub fn bind_parallax(
        &mut self,
        opts: JsValue,
        container: JsValue,
        now: f64,
    ) -> Result<u32, JsError> {
        let opts: ParallaxOptions = if jsvalue_is_undefined_or_null(&opts) {
            ParallaxOptions::default()
        } else {
            from_json(&opts, "parallax options")?
        };
        let container: BackgroundInit = swb::from_value(container)
            .map_err(|e| JsError::new(&format!("container error: {e}")))?;
        let id = self
            .core
            .bind_parallax(opts, &container, now)
            .map_err(|e| JsError::new(&format!("bind_parallax: {e}")))?;
        Ok(id.0)
    }

    /// Bind a background from its `dataset` (`backgroundMp4Src`, ...).
    #[wasm_bindgen(js_name = bind_parallax_from_dataset)]
    pub fn bind_parallax_from_dataset(
        &mut self,
        dataset: JsValue,
        explicit: JsValue,
        container: JsValue,
        now: f64,
    ) -> Result<u32, JsError> {
        let pairs = attribute_pairs(&dataset, "dataset")?;
        let explicit = optional_json(&explicit, "explicit options")?;
        let container: BackgroundInit = swb::from_value(container)
            .map_err(|e| JsError::new(&format!("container error: {e}")))?;
        let id = self
            .core
            .bind_parallax_from_attributes(
                pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
                explicit.as_ref(),
                &container,
                now,
            )
            .map_err(|e| JsError::new(&format!("bind_parallax_from_dataset: {e}")))?;
        Ok(id.0)
    }

    #[wasm_bindgen(js_name = unbind_animation)]
    pub fn unbind_animation(&mut self, target: u32) -> Result<(), JsError> {
        self.core
            .unbind_animation(TargetId(target))
            .map_err(|e| JsError::new(&format!("unbind_animation: {e}")))
    }

    #[wasm_bindgen(js_name = unbind_parallax)]
    pub fn unbind_parallax(&mut self, parallax: u32) -> Result<(), JsError> {
        self.core
            .unbind_parallax(ParallaxId(parallax))
            .map_err(|e| JsError::new(&format!("unbind_parallax: {e}")))
    }

    /// Cancel an animation at its next tick boundary. Resolves to false when
    /// it had already finished.
    #[wasm_bindgen]
    pub fn cancel(&mut self, target: u32, now: f64) -> Result<bool, JsError> {
        self.core
            .cancel(TargetId(target), now)
            .map_err(|e| JsError::new(&format!("cancel: {e}")))
    }

    /// `{ trigger, phase }` for a bound animation, or undefined.
    #[wasm_bindgen(js_name = animation_status)]
    pub fn animation_status(&self, target: u32) -> Result<JsValue, JsError> {
        match self.core.animation_status(TargetId(target)) {
            Some(status) => {
                swb::to_value(&status).map_err(|e| JsError::new(&format!("status error: {e}")))
            }
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Earliest clock value at which `update` has timer work to do.
    #[wasm_bindgen(js_name = next_deadline)]
    pub fn next_deadline(&self) -> Option<f64> {
        self.core.next_deadline()
    }

    /// Advance the engine to `now` (ms, host clock) with inputs JSON. Returns Outputs JSON.
    #[wasm_bindgen]
    pub fn update(&mut self, now: f64, inputs_json: JsValue) -> Result<JsValue, JsError> {
        let inputs: Inputs = if jsvalue_is_undefined_or_null(&inputs_json) {
            Inputs::default()
        } else {
            swb::from_value(inputs_json).map_err(|e| JsError::new(&format!("inputs error: {e}")))?
        };
        let out: &Outputs = self.core.update(now, inputs);
        out.serialize(&swb::Serializer::json_compatible())
            .map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
