//! Page notification hooks
//!
//! The browser page re-renders when the studio reports a change. On wasm these
//! call global JavaScript functions the page must define:
//! `onWizardStateChanged(state, step)`, `onSketchesChanged(count)` and
//! `onNotice(message)`. Native builds only log.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Report the new wizard phase and its stepper position
#[cfg(target_arch = "wasm32")]
pub fn wizard_state_changed(state: &str, step: usize) {
    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_name = onWizardStateChanged)]
        fn on_wizard_state_changed(state: &str, step: u32);
    }
    on_wizard_state_changed(state, step as u32);
}

/// Report how many sketches the bouquet holds
#[cfg(target_arch = "wasm32")]
pub fn sketches_changed(count: usize) {
    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_name = onSketchesChanged)]
        fn on_sketches_changed(count: u32);
    }
    on_sketches_changed(count as u32);
}

/// Show a message to the user
#[cfg(target_arch = "wasm32")]
pub fn notice(message: &str) {
    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_name = onNotice)]
        fn on_notice(message: &str);
    }
    on_notice(message);
}

// Log-only versions for non-WASM platforms
#[cfg(not(target_arch = "wasm32"))]
pub fn wizard_state_changed(state: &str, step: usize) {
    log::debug!("state -> {} (step {})", state, step + 1);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn sketches_changed(count: usize) {
    log::debug!("sketches -> {}", count);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn notice(message: &str) {
    log::warn!("{}", message);
}
