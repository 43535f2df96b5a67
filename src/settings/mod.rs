//! Layered listener settings.
//!
//! Settings are read from a file (YAML, TOML or JSON) and then overridden by
//! prefixed environment variables, the same precedence a service config uses:
//!
//! ```yaml
//! target: 42
//! start_immediately: true
//! address:
//!   selector: "nsrt"
//!   scope: "outp"
//!   element: 0
//! ```
//!
//! With `with_env_overrides("LISTENER", "__")`, `LISTENER_TARGET=7` replaces
//! the target and `LISTENER_ADDRESS__SCOPE=inpt` replaces the scope.

mod loader;

pub use loader::SettingsLoader;

use crate::core::{element, scope, FourCharCode, PropertyAddress, SELECTOR_WILDCARD};
use serde::{Deserialize, Serialize};

/// Settings for one [`PropertyChangeListener`](crate::core::PropertyChangeListener).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerSettings {
    /// Raw identifier of the object to observe.
    pub target: u32,

    /// Subscription address. Omitted means every property.
    #[serde(default)]
    pub address: Option<AddressSettings>,

    /// Start listening as soon as the listener is built.
    #[serde(default)]
    pub start_immediately: bool,
}

impl ListenerSettings {
    /// The address to register, falling back to the wildcard.
    pub fn property_address(&self) -> PropertyAddress {
        self.address
            .as_ref()
            .map(AddressSettings::to_address)
            .unwrap_or(PropertyAddress::WILDCARD)
    }
}

/// Address fields as written in settings.
///
/// Selector and scope accept four-char strings (`"nsrt"`, `"glob"`, `"****"`)
/// or integers. Scope defaults to global and element to main, matching
/// [`PropertyAddress::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressSettings {
    /// Property selector.
    #[serde(default = "default_selector")]
    pub selector: FourCharCode,
    /// Property scope.
    #[serde(default = "default_scope")]
    pub scope: FourCharCode,
    /// Property element.
    #[serde(default = "default_element")]
    pub element: u32,
}

impl AddressSettings {
    /// Convert into a [`PropertyAddress`].
    pub fn to_address(&self) -> PropertyAddress {
        PropertyAddress {
            selector: self.selector,
            scope: self.scope,
            element: self.element,
        }
    }
}

fn default_selector() -> FourCharCode {
    SELECTOR_WILDCARD
}

fn default_scope() -> FourCharCode {
    scope::GLOBAL
}

fn default_element() -> u32 {
    element::MAIN
}
