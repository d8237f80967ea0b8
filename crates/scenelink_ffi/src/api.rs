//! FFI use-case API for host-language bindings.
//!
//! # Responsibility
//! - Expose scene-node and feature operations through stable string handles.
//! - Surface the liveness guard as a plain error string.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Node handles cross the boundary as `graph:index:generation` strings and
//!   features as UUID strings; neither form owns the referenced node.
//! - One process-wide scene session backs every call.
//! - The session holds attached features until `feature_release` or
//!   `scene_reset`.

use log::warn;
use once_cell::sync::Lazy;
use scenelink_core::{
    assert_valid, core_version as core_version_inner, init_logging as init_logging_inner,
    ping as ping_inner, AttachedFeature, FeatureId, FeatureKind, NodeHandle, SharedSceneGraph,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

struct SceneSession {
    scene: SharedSceneGraph,
    features: HashMap<FeatureId, AttachedFeature>,
}

impl SceneSession {
    fn new() -> Self {
        Self {
            scene: SharedSceneGraph::new(),
            features: HashMap::new(),
        }
    }
}

static SESSION: Lazy<Mutex<SceneSession>> = Lazy::new(|| Mutex::new(SceneSession::new()));

fn session() -> MutexGuard<'static, SceneSession> {
    SESSION.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Minimal health-check API for binding smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic action response envelope for scene operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Node handle or feature id produced by the operation.
    pub handle: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl SceneActionResponse {
    fn success(message: impl Into<String>, handle: Option<String>) -> Self {
        Self {
            ok: true,
            handle,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            handle: None,
            message: message.into(),
        }
    }
}

/// Replaces the process scene with a fresh graph.
///
/// Every previously issued node handle and feature id becomes invalid.
/// Returns the new root handle.
#[flutter_rust_bridge::frb(sync)]
pub fn scene_reset() -> String {
    let mut session = session();
    *session = SceneSession::new();
    session.scene.read(|graph| graph.root().to_string())
}

/// Returns the root handle of the current scene.
#[flutter_rust_bridge::frb(sync)]
pub fn scene_root() -> String {
    session().scene.read(|graph| graph.root().to_string())
}

/// Creates a node under `parent` (root when `None`).
///
/// # FFI contract
/// - Never panics.
/// - Returns the new node handle on success.
#[flutter_rust_bridge::frb(sync)]
pub fn scene_create_node(parent: Option<String>, name: String) -> SceneActionResponse {
    let session = session();
    let parent = match parent {
        Some(raw) => match parse_handle(&raw) {
            Ok(handle) => Some(handle),
            Err(message) => return SceneActionResponse::failure(message),
        },
        None => None,
    };

    let created = session.scene.write(|graph| {
        let parent = parent.unwrap_or_else(|| graph.root());
        graph.add_child(parent, name.trim())
    });
    match created {
        Ok(handle) => SceneActionResponse::success("Node created.", Some(handle.to_string())),
        Err(err) => SceneActionResponse::failure(format!("scene_create_node failed: {err}")),
    }
}

/// Destroys a node and its subtree.
#[flutter_rust_bridge::frb(sync)]
pub fn scene_destroy_node(handle: String) -> SceneActionResponse {
    with_node(&handle, "scene_destroy_node", |scene, node| {
        scene
            .write(|graph| graph.destroy(node))
            .map(|removed| format!("Destroyed {removed} node(s)."))
            .map_err(|err| err.to_string())
    })
}

/// Detaches a node; its subtree stays alive but unreachable.
#[flutter_rust_bridge::frb(sync)]
pub fn scene_detach_node(handle: String) -> SceneActionResponse {
    with_node(&handle, "scene_detach_node", |scene, node| {
        scene
            .write(|graph| graph.detach(node))
            .map(|()| "Node detached.".to_string())
            .map_err(|err| err.to_string())
    })
}

/// Re-parents a node under `parent`.
#[flutter_rust_bridge::frb(sync)]
pub fn scene_reattach_node(handle: String, parent: String) -> SceneActionResponse {
    let parent = match parse_handle(&parent) {
        Ok(parent) => parent,
        Err(message) => return SceneActionResponse::failure(message),
    };
    with_node(&handle, "scene_reattach_node", |scene, node| {
        scene
            .write(|graph| graph.reattach(node, parent))
            .map(|()| "Node reattached.".to_string())
            .map_err(|err| err.to_string())
    })
}

/// Attaches a feature of `kind` to a node; returns the feature id.
#[flutter_rust_bridge::frb(sync)]
pub fn feature_attach(handle: String, kind: String) -> SceneActionResponse {
    let node = match parse_handle(&handle) {
        Ok(node) => node,
        Err(message) => return SceneActionResponse::failure(message),
    };
    let mut session = session();
    let attached = session
        .scene
        .attach_feature(node, FeatureKind::from_label(&kind));
    match attached {
        Ok(feature) => {
            let id = feature.id();
            session.features.insert(id, feature);
            SceneActionResponse::success("Feature attached.", Some(id.to_string()))
        }
        Err(err) => SceneActionResponse::failure(format!("feature_attach failed: {err}")),
    }
}

/// Runs the liveness guard on a feature.
///
/// # FFI contract
/// - Returns empty string when the feature's node is live.
/// - Returns the guard's diagnostic message when the node is gone or detached.
/// - Returns a lookup error for malformed or unknown feature ids.
#[flutter_rust_bridge::frb(sync)]
pub fn feature_assert_valid(feature_id: String) -> String {
    let id = match parse_feature_id(&feature_id) {
        Ok(id) => id,
        Err(message) => return message,
    };
    let session = session();
    let Some(feature) = session.features.get(&id) else {
        return format!("feature not found: {id}");
    };
    match assert_valid(feature) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Forgets a feature id issued by `feature_attach`.
///
/// The session keeps every attached feature until it is released or the
/// scene is reset; hosts release ids they no longer use.
///
/// # FFI contract
/// - Returns empty string when the feature was released.
/// - Returns a lookup error for malformed or unknown feature ids.
/// - Never touches the referenced node.
#[flutter_rust_bridge::frb(sync)]
pub fn feature_release(feature_id: String) -> String {
    let id = match parse_feature_id(&feature_id) {
        Ok(id) => id,
        Err(message) => return message,
    };
    match session().features.remove(&id) {
        Some(_) => String::new(),
        None => {
            warn!(
                "event=ffi_call module=ffi status=error op=feature_release feature={}",
                id
            );
            format!("feature not found: {id}")
        }
    }
}

fn parse_feature_id(raw: &str) -> Result<FeatureId, String> {
    let raw = raw.trim();
    Uuid::parse_str(raw).map_err(|err| format!("invalid feature id `{raw}`: {err}"))
}

fn parse_handle(raw: &str) -> Result<NodeHandle, String> {
    raw.parse::<NodeHandle>()
        .map_err(|err| format!("invalid node handle: {err}"))
}

fn with_node(
    raw: &str,
    operation: &str,
    f: impl FnOnce(&SharedSceneGraph, NodeHandle) -> Result<String, String>,
) -> SceneActionResponse {
    let node = match parse_handle(raw) {
        Ok(node) => node,
        Err(message) => return SceneActionResponse::failure(message),
    };
    let session = session();
    match f(&session.scene, node) {
        Ok(message) => SceneActionResponse::success(message, Some(node.to_string())),
        Err(err) => {
            warn!(
                "event=ffi_call module=ffi status=error op={} node={}",
                operation, node
            );
            SceneActionResponse::failure(format!("{operation} failed: {err}"))
        }
    }
}
