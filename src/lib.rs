#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod geom;
pub mod parse;
pub mod pipeline;

use std::fmt;

use pipeline::{MeshMaterial, Params, RegenerationController, SkippedFeature, World, export_world};
use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WorldView {
    revision: u64,
    translation: [f64; 3],
    anchor: [f64; 2],
    meshes: Vec<MeshView>,
    skipped: Vec<SkippedFeature>,
    summary: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeshView {
    id: usize,
    positions: Vec<f64>,
    normals: Vec<f64>,
    uvs: Vec<f64>,
    indices: Vec<u32>,
    material: MeshMaterial,
    triangle_count: usize,
}

fn world_view(world: &World, revision: u64) -> WorldView {
    let meshes = world
        .meshes
        .iter()
        .map(|refined| {
            let mesh = &refined.mesh;
            MeshView {
                id: refined.source,
                positions: mesh.positions_flat().to_vec(),
                normals: mesh.normals_flat().map(<[f64]>::to_vec).unwrap_or_default(),
                uvs: mesh.uvs_flat().map(<[f64]>::to_vec).unwrap_or_default(),
                indices: mesh.indices.clone(),
                material: refined.material,
                triangle_count: mesh.triangle_count(),
            }
        })
        .collect();

    WorldView {
        revision,
        translation: world.translation.to_array(),
        anchor: [world.anchor.lon, world.anchor.lat],
        meshes,
        skipped: world.skipped.clone(),
        summary: world.diagnostics.summary(),
    }
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    initialized: bool,
    controller: RegenerationController,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Engine {
        Engine {
            initialized: true,
            controller: RegenerationController::new(Params::default()),
        }
    }

    /// Geeft terug of de engine de minimale initialisatie heeft doorlopen.
    #[wasm_bindgen]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Laad een GeoJSON-document en genereer direct de wereld.
    ///
    /// # Errors
    /// Ongeldige invoer of een anker dat niet bepaald kan worden; de vorige
    /// wereld blijft dan staan.
    #[wasm_bindgen]
    pub fn load_geojson(&mut self, text: &str) -> Result<(), JsValue> {
        self.controller.load_geojson(text).map_err(to_js_error)?;
        debug_log!(
            "GeoJSON geladen: {} polygonen",
            self.controller.input().map_or(0, |input| input.polygon_count())
        );
        Ok(())
    }

    /// Haal de bedieningselementen op voor UI-generatie.
    ///
    /// # Errors
    /// Alleen als serialisatie naar JavaScript mislukt.
    #[wasm_bindgen]
    pub fn get_controls(&self) -> Result<JsValue, JsValue> {
        let controls = self.controller.params().controls();
        serde_wasm_bindgen::to_value(&controls).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Stel een numerieke parameter in op basis van naam of alias.
    ///
    /// # Errors
    /// Onbekende namen, niet-eindige waarden of een mislukte regeneratie.
    #[wasm_bindgen]
    pub fn set_param_number(&mut self, name: &str, value: f64) -> Result<(), JsValue> {
        if !value.is_finite() {
            return Err(js_error("parameterwaarde moet een eindig getal zijn"));
        }
        self.controller.set_param(name, value).map_err(to_js_error)?;
        Ok(())
    }

    /// Stel een booleaanse parameter in op basis van naam of alias.
    ///
    /// # Errors
    /// Onbekende namen of een mislukte regeneratie.
    #[wasm_bindgen]
    pub fn set_param_bool(&mut self, name: &str, value: bool) -> Result<(), JsValue> {
        self.controller.set_param(name, value).map_err(to_js_error)?;
        Ok(())
    }

    /// Vervang alle parameters door een JSON-configuratie.
    ///
    /// # Errors
    /// Ongeldige JSON of een mislukte regeneratie.
    #[wasm_bindgen]
    pub fn set_params_json(&mut self, json: &str) -> Result<(), JsValue> {
        let params = Params::from_json_str(json).map_err(to_js_error)?;
        self.controller.replace_params(params).map_err(to_js_error)
    }

    /// Haalt de huidige wereld op voor de renderer.
    ///
    /// # Errors
    /// Als er nog geen wereld gegenereerd is.
    #[wasm_bindgen]
    pub fn get_world(&self) -> Result<JsValue, JsValue> {
        let world = self
            .controller
            .world()
            .ok_or_else(|| js_error("er is nog geen wereld gegenereerd"))?;
        let view = world_view(world, self.controller.revision());
        serde_wasm_bindgen::to_value(&view).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Exporteert de huidige wereld als JSON; `None` als er niets te
    /// exporteren is.
    #[wasm_bindgen]
    #[must_use]
    pub fn export_json(&self) -> Option<String> {
        let document = export_world(self.controller.world()?)?;
        match document.to_json_string() {
            Ok(json) => Some(json),
            Err(err) => {
                log::warn!("export mislukt: {err}");
                None
            }
        }
    }

    #[wasm_bindgen]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.controller.revision()
    }

    #[wasm_bindgen]
    #[must_use]
    pub fn rebuild_count(&self) -> u64 {
        self.controller.rebuild_count()
    }

    /// Features die bij de laatste regeneratie overgeslagen werden.
    ///
    /// # Errors
    /// Alleen als serialisatie naar JavaScript mislukt.
    #[wasm_bindgen]
    pub fn skipped_features(&self) -> Result<JsValue, JsValue> {
        let skipped: &[SkippedFeature] = self
            .controller
            .world()
            .map_or(&[][..], |world| world.skipped.as_slice());
        serde_wasm_bindgen::to_value(&skipped).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
