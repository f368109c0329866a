//! Request scope resolution and the restricted-volume gate.
//!
//! The gate runs before any session is opened: a rejected scope costs no
//! credential use and no network round-trip.

/// Directories whose per-user contents are never exposed.
pub const RESTRICTED_DIRS: [&str; 2] = ["/home", "/windows-home"];

/// Error type for scope rejection.
#[derive(Debug, PartialEq)]
pub enum AccessError {
    /// Requested scope resolves into the restricted set.
    RestrictedScope(String),
}

impl std::fmt::Display for AccessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessError::RestrictedScope(dir) => {
                write!(f, "Access to {} is restricted", dir)
            }
        }
    }
}

impl std::error::Error for AccessError {}

/// Directory scope selectable through the `volume` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Home,
    Windows,
    Scratch,
}

impl Scope {
    /// Maps the request's `volume` selector to a scope.
    ///
    /// Anything unrecognized or absent falls back to scratch.
    pub fn from_volume_param(param: Option<&str>) -> Self {
        match param {
            Some("home") => Scope::Home,
            Some("windows") => Scope::Windows,
            _ => Scope::Scratch,
        }
    }

    /// Directory this scope scans for per-user usage.
    pub fn directory(self) -> &'static str {
        match self {
            Scope::Home => "/home",
            Scope::Windows => "/windows-home",
            Scope::Scratch => "/scratch",
        }
    }

    /// Resolves to the scan directory, rejecting restricted scopes.
    pub fn resolve(self) -> Result<&'static str, AccessError> {
        let dir = self.directory();
        if RESTRICTED_DIRS.contains(&dir) {
            Err(AccessError::RestrictedScope(dir.to_string()))
        } else {
            Ok(dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scope_is_scratch() {
        assert_eq!(Scope::from_volume_param(None), Scope::Scratch);
        assert_eq!(Scope::from_volume_param(Some("bogus")), Scope::Scratch);
        assert_eq!(Scope::from_volume_param(Some("")), Scope::Scratch);
    }

    #[test]
    fn named_scopes_resolve_to_their_directories() {
        assert_eq!(Scope::from_volume_param(Some("home")), Scope::Home);
        assert_eq!(Scope::from_volume_param(Some("windows")), Scope::Windows);
        assert_eq!(Scope::Home.directory(), "/home");
        assert_eq!(Scope::Windows.directory(), "/windows-home");
        assert_eq!(Scope::Scratch.directory(), "/scratch");
    }

    #[test]
    fn scratch_is_permitted() {
        assert_eq!(Scope::Scratch.resolve().unwrap(), "/scratch");
    }

    #[test]
    fn personal_volumes_are_rejected() {
        let err = Scope::Home.resolve().unwrap_err();
        assert_eq!(err, AccessError::RestrictedScope("/home".to_string()));
        assert!(Scope::Windows.resolve().is_err());
    }
}
