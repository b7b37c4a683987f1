use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Navigation destinations known to the app.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Route {
    Login,
    Feed,
}

impl Route {
    /// Whether the route may only be shown with an active session.
    pub fn requires_auth(self) -> bool {
        match self {
            Self::Login => false,
            Self::Feed => true,
        }
    }
}
