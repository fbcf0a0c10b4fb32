//! First-visit tracking
//!
//! The one piece of persistence the game keeps: which phases have already
//! shown their story intro, so replays jump straight to the action. Stored
//! in sessionStorage on the web (a new tab gets the intros again) and held
//! in memory everywhere else.

use serde::{Deserialize, Serialize};

/// Phases the player has already entered this session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VisitedPhases {
    ids: Vec<u32>,
}

impl VisitedPhases {
    /// sessionStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "astro_rescue_visited";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, phase_id: u32) -> bool {
        self.ids.contains(&phase_id)
    }

    /// Record a visit. Returns `true` the first time this phase is seen.
    pub fn mark(&mut self, phase_id: u32) -> bool {
        if self.contains(phase_id) {
            return false;
        }
        self.ids.push(phase_id);
        self.save();
        true
    }

    /// Load from sessionStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.session_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(visited) = serde_json::from_str(&json) {
                    return visited;
                }
                log::warn!("Discarding unreadable visited-phase record");
            }
        }

        Self::default()
    }

    /// Save to sessionStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.session_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn save(&self) {
        // In-memory only off the web
    }
}
