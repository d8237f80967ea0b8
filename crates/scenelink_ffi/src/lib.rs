//! Host-language binding surface for `scenelink_core`.

pub mod api;
