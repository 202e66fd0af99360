// Context types to group parameters

use std::sync::Arc;

use crate::{media::MediaEventSender, state::StateStore};

use super::DashboardConfiguration;

/// Dashboard server context, shared by the HTTP and WebSocket servers
#[derive(Clone)]
pub struct DashboardContext {
    /// Server configuration
    pub config: Arc<DashboardConfiguration>,

    /// State store
    pub store: Arc<StateStore>,

    /// Sender for the media server events received over HTTP
    pub media_events: MediaEventSender,
}
