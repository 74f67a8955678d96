//! Directory administrators

use serde::{Deserialize, Serialize};

/// An entry in the administrators allow-list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Admin {
    pub id: i32,
    pub email: String,
    /// User id issued by the identity provider
    pub uid: String,
}
