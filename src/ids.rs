//! Identifier types for the window/page/panel/tab hierarchy.
//!
//! Two families are kept deliberately distinct:
//! - Entity ids (`TabId`, `PanelId`, `PageId`, `WindowId`) are UUIDs. `TabId`
//!   is the stable identifier persisted in sessions and used to key terminal
//!   creation so a restored Tab rebinds predictably.
//! - `TerminalId` is pool-local and recycled; it never leaves the process.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID (e.g. one read back from a session file)
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // Short form keeps log lines readable
                let s = self.0.simple().to_string();
                write!(f, "{}", &s[..8])
            }
        }
    };
}

uuid_id!(
    /// Stable Tab identifier; survives process restart
    TabId
);
uuid_id!(
    /// Panel identifier (a leaf of a Page's layout tree)
    PanelId
);
uuid_id!(
    /// Page identifier
    PageId
);
uuid_id!(
    /// Window identifier
    WindowId
);

/// Pool-local runtime terminal identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerminalId(pub u64);

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
