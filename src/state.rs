use parking_lot::RwLock;
use std::sync::Arc;

use crate::types::PlaybackState;

pub type SharedState = Arc<RwLock<PlaybackState>>;

pub fn create_state() -> SharedState {
    Arc::new(RwLock::new(PlaybackState::default()))
}
