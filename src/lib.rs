//! Graph Explorer - WASM Module
//!
//! Interactive exploration of a directed graph: a force-directed main view,
//! a synchronized overview (minimap) and a lazily expanded hierarchy view.
//! Compiled to WebAssembly and exposed to JavaScript via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: input document and the immutable graph model (petgraph)
//! - `layout`: force-directed layout engine over SoA buffers
//! - `view`: dual-view renderer, pan/zoom transform, viewport sync
//! - `tree`: hierarchy derivation and lazy expansion
//! - `spatial`: R-tree spatial indexing for pointer hit testing
//! - `explorer`: the session tying the above together
//!
//! The host calls `frame()` once per animation frame, then drains the
//! recorded draw commands and applies them to its SVG or canvas surfaces.

use js_sys::Float32Array;
use log::{Level, info};
use serde::Serialize;
use serde_wasm_bindgen::Serializer;
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod explorer;
pub mod graph;
pub mod layout;
pub mod spatial;
pub mod tree;
pub mod view;

pub use config::ExplorerConfig;
pub use error::{Error, Result};
pub use explorer::{Explorer, Interaction};

use graph::{GraphDocument, GraphModel, NodeId};
use tree::{EntryId, TreeCommand};
use view::CommandBuffer;

/// Initialize logging and the panic hook.
#[wasm_bindgen(start)]
pub fn init() {
    if console_log::init_with_level(Level::Debug).is_err() {
        web_sys::console::warn_1(&"graph-explorer: logger already installed".into());
    }
    console_error_panic_hook::set_once();
    info!("graph-explorer initialized");
}

type JsResult<T> = std::result::Result<T, JsError>;

fn parse_config(config: JsValue) -> Result<ExplorerConfig> {
    if config.is_undefined() || config.is_null() {
        return Ok(ExplorerConfig::default());
    }
    let config: ExplorerConfig = serde_wasm_bindgen::from_value(config)?;
    config.validate()?;
    Ok(config)
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> JsResult<JsValue> {
    Ok(value.serialize(&Serializer::json_compatible())?)
}

/// Main entry point for JavaScript.
///
/// Wraps an `Explorer` session and the command buffer it draws into.
#[wasm_bindgen]
pub struct GraphExplorerWasm {
    explorer: Explorer,
    commands: CommandBuffer,
}

impl GraphExplorerWasm {
    fn with_model(model: GraphModel, config: ExplorerConfig) -> Self {
        Self {
            explorer: Explorer::new(model, config),
            commands: CommandBuffer::new(),
        }
    }

    fn dispatch(&mut self, interaction: Interaction) -> JsResult<()> {
        Ok(self.explorer.handle(interaction, &mut self.commands)?)
    }
}

#[wasm_bindgen]
impl GraphExplorerWasm {
    /// Load a graph from JSON text.
    ///
    /// `config` is an optional configuration object; missing fields take
    /// their defaults.
    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str, config: JsValue) -> JsResult<GraphExplorerWasm> {
        let config = parse_config(config)?;
        let model = GraphModel::from_json_str(json)?;
        Ok(Self::with_model(model, config))
    }

    /// Load a graph from a JavaScript object of the same shape as the JSON
    /// document.
    #[wasm_bindgen(js_name = fromValue)]
    pub fn from_value(document: JsValue, config: JsValue) -> JsResult<GraphExplorerWasm> {
        let config = parse_config(config)?;
        let document: GraphDocument =
            serde_wasm_bindgen::from_value(document).map_err(Error::from)?;
        let model = GraphModel::from_document(&document)?;
        Ok(Self::with_model(model, config))
    }

    // =========================================================================
    // Frame loop
    // =========================================================================

    /// Tick the layout and draw. Returns whether the layout moved.
    pub fn frame(&mut self) -> bool {
        self.explorer.frame(&mut self.commands)
    }

    /// Take the draw commands recorded since the last call.
    #[wasm_bindgen(js_name = drainCommands)]
    pub fn drain_commands(&mut self) -> JsResult<JsValue> {
        to_js(&self.commands.drain())
    }

    #[wasm_bindgen(js_name = isAtRest)]
    pub fn is_at_rest(&self) -> bool {
        self.explorer.is_at_rest()
    }

    pub fn alpha(&self) -> f32 {
        self.explorer.engine().alpha()
    }

    // =========================================================================
    // Pointer and view interactions
    // =========================================================================

    /// Pointer pressed on the main view, in screen coordinates.
    ///
    /// Returns the grabbed node slot, or undefined when the press starts a pan.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32) -> JsResult<Option<u32>> {
        let node = self.explorer.pointer_down(x, y, &mut self.commands)?;
        Ok(node.map(u32::from))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32) -> JsResult<()> {
        Ok(self.explorer.pointer_move(x, y, &mut self.commands)?)
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) -> JsResult<()> {
        Ok(self.explorer.pointer_up(&mut self.commands)?)
    }

    /// Zoom by `factor` about the screen point `(x, y)`.
    pub fn zoom(&mut self, factor: f32, x: f32, y: f32) -> JsResult<()> {
        self.dispatch(Interaction::Zoom { factor, x, y })
    }

    pub fn pan(&mut self, dx: f32, dy: f32) -> JsResult<()> {
        self.dispatch(Interaction::Pan { dx, dy })
    }

    /// Clear the pin left on a node by a drag.
    pub fn release(&mut self, node: u32) -> JsResult<()> {
        self.dispatch(Interaction::Release { node: NodeId(node) })
    }

    /// Centre the main view on a node and highlight it.
    pub fn focus(&mut self, node: u32) -> JsResult<()> {
        self.dispatch(Interaction::Focus { node: NodeId(node) })
    }

    /// Hierarchy entry clicked.
    #[wasm_bindgen(js_name = toggleEntry)]
    pub fn toggle_entry(&mut self, entry: u32) -> JsResult<()> {
        self.dispatch(Interaction::Tree(TreeCommand::toggle(EntryId(entry))))
    }

    /// Current overview rectangle `{x, y, width, height}`.
    pub fn viewport(&self) -> JsResult<JsValue> {
        to_js(&self.explorer.viewport())
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Show only nodes whose id or attribute values contain `text`. Returns
    /// the number of nodes shown.
    pub fn search(&mut self, text: &str) -> JsResult<u32> {
        let shown = self.explorer.search(text, &mut self.commands)?;
        Ok(shown as u32)
    }

    // =========================================================================
    // Model queries
    // =========================================================================

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.explorer.model().node_count() as u32
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.explorer.model().edge_count() as u32
    }

    /// Slot of the node with the given document id.
    #[wasm_bindgen(js_name = nodeIndex)]
    pub fn node_index(&self, id: &str) -> Option<u32> {
        self.explorer.model().node_id(id).map(u32::from)
    }

    /// Document ids in slot order.
    #[wasm_bindgen(js_name = nodeIds)]
    pub fn node_ids(&self) -> Vec<String> {
        self.explorer
            .model()
            .nodes()
            .iter()
            .map(|node| node.id().to_owned())
            .collect()
    }

    // =========================================================================
    // Position Buffers
    // =========================================================================

    /// Get a zero-copy view of X positions.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Read it immediately, do not store it.
    #[wasm_bindgen(js_name = positionsXView)]
    pub fn positions_x_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.explorer.engine().state().positions_x()) }
    }

    /// Get a zero-copy view of Y positions. Same caveats as `positionsXView`.
    #[wasm_bindgen(js_name = positionsYView)]
    pub fn positions_y_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.explorer.engine().state().positions_y()) }
    }

    /// Copy of the positions as `[x0, y0, x1, y1, ...]`.
    pub fn positions(&self) -> Vec<f32> {
        let state = self.explorer.engine().state();
        state
            .positions_x()
            .iter()
            .zip(state.positions_y())
            .flat_map(|(&x, &y)| [x, y])
            .collect()
    }
}
