//! The inspection session: current platform, current source text and the
//! last good rendering.
//!
//! [`Session::update_types`] is the "text changed" handler.  It persists the
//! text, asks the registry to parse it and either replaces the rendered forest
//! or records the error.  A failed parse never touches the previous forest.

use crate::core::platform::{PlatformRef, PlatformRegistry, SourcePosition};
use crate::core::render::{render_result, DisplayForest};
use crate::prefs::{SettingsStore, PLATFORM_KEY, TYPES_KEY};

/// What the last update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// A fresh forest replaced the old one.
    Rendered,
    /// The text was rejected; the old forest is still shown.
    Rejected,
}

/// The message shown under the editor while the text is invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    pub message: String,
    /// Where the host says the problem is, when it says.
    pub position: Option<SourcePosition>,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub platform: PlatformRef,
    pub source: String,
    pub forest: Option<DisplayForest>,
    pub error: Option<SessionError>,
}

/// NUL characters confuse hosts that hand the text to C APIs.
fn sanitise(text: &str) -> String {
    text.replace('\0', "")
}

impl Session {
    /// Start from whatever the store remembers.  The persisted platform wins
    /// over `default_platform`.
    pub fn restore(store: &dyn SettingsStore, default_platform: &str) -> Self {
        let platform = store
            .get(PLATFORM_KEY)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| default_platform.to_string());
        Self {
            platform: PlatformRef::new(platform),
            source: store.get(TYPES_KEY).map(|s| sanitise(&s)).unwrap_or_default(),
            forest: None,
            error: None,
        }
    }

    pub fn set_source(&mut self, text: &str) {
        self.source = sanitise(text);
    }

    /// Persist the current text, re-parse it and re-render.
    pub fn update_types(
        &mut self,
        registry: &dyn PlatformRegistry,
        store: &mut dyn SettingsStore,
    ) -> UpdateOutcome {
        if let Err(e) = store.set(TYPES_KEY, &self.source) {
            tracing::warn!("failed to persist source text: {e:#}");
        }

        match registry.parse_types_from_source(&self.platform, &self.source) {
            Ok(result) => {
                if result.is_empty() {
                    tracing::debug!("no declarations in source");
                }
                self.forest = Some(render_result(&result));
                self.error = None;
                UpdateOutcome::Rendered
            }
            Err(e) => {
                tracing::debug!("parse rejected on {}: {e}", self.platform);
                self.error = Some(SessionError {
                    message: e.to_string(),
                    position: e.as_syntax().and_then(|s| s.position),
                });
                UpdateOutcome::Rejected
            }
        }
    }

    /// Switch platform, remember it, and re-parse the current text.
    pub fn select_platform(
        &mut self,
        platform: PlatformRef,
        registry: &dyn PlatformRegistry,
        store: &mut dyn SettingsStore,
    ) -> UpdateOutcome {
        tracing::info!("platform switched: {} -> {}", self.platform, platform);
        if let Err(e) = store.set(PLATFORM_KEY, platform.name()) {
            tracing::warn!("failed to persist platform: {e:#}");
        }
        self.platform = platform;
        self.update_types(registry, store)
    }

    pub fn is_invalid(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::core::platform::{PlatformError, SyntaxError};
    use crate::core::render::tests::point_result;
    use crate::core::types::ParseResult;
    use crate::prefs::MemorySettings;

    /// Accepts any text mentioning `Point`, rejects text containing `!`.
    #[derive(Default)]
    pub(crate) struct FakeRegistry {
        pub(crate) seen: RefCell<Vec<(String, String)>>,
    }

    impl PlatformRegistry for FakeRegistry {
        fn list_platforms(&self) -> Result<Vec<PlatformRef>, PlatformError> {
            Ok(vec![
                PlatformRef::new("windows-x86_64"),
                PlatformRef::new("linux-x86"),
                PlatformRef::new("mac-aarch64"),
            ])
        }

        fn parse_types_from_source(
            &self,
            platform: &PlatformRef,
            source: &str,
        ) -> Result<ParseResult, PlatformError> {
            self.seen
                .borrow_mut()
                .push((platform.name().to_string(), source.to_string()));
            if let Some(idx) = source.find('!') {
                let line = source[..idx].matches('\n').count() + 1;
                return Err(SyntaxError {
                    message: format!("input:{line}: unexpected '!'"),
                    position: Some(SourcePosition { line, column: 1 }),
                }
                .into());
            }
            if source.contains("Point") {
                Ok(point_result())
            } else {
                Ok(ParseResult::default())
            }
        }
    }

    #[test]
    fn good_text_renders_and_persists() {
        let registry = FakeRegistry::default();
        let mut store = MemorySettings::default();
        let mut session = Session::default();
        session.set_source("struct Point { int x; int y; };");

        assert_eq!(session.update_types(&registry, &mut store), UpdateOutcome::Rendered);
        let forest = session.forest.as_ref().unwrap();
        assert_eq!(forest.group("Types").unwrap().children[0].label, "Point");
        assert!(!session.is_invalid());
        assert_eq!(
            store.get(TYPES_KEY).as_deref(),
            Some("struct Point { int x; int y; };")
        );
    }

    #[test]
    fn bad_text_keeps_previous_forest() {
        let registry = FakeRegistry::default();
        let mut store = MemorySettings::default();
        let mut session = Session::default();
        session.set_source("struct Point { int x; int y; };");
        session.update_types(&registry, &mut store);
        let before = session.forest.clone();

        session.set_source("struct Point {\n int x!");
        assert_eq!(session.update_types(&registry, &mut store), UpdateOutcome::Rejected);
        assert_eq!(session.forest, before);
        let err = session.error.as_ref().unwrap();
        assert_eq!(err.message, "input:2: unexpected '!'");
        assert_eq!(err.position, Some(SourcePosition { line: 2, column: 1 }));
        // The rejected text is still what gets remembered.
        assert_eq!(store.get(TYPES_KEY).as_deref(), Some("struct Point {\n int x!"));

        session.set_source("struct Point { int x; };");
        session.update_types(&registry, &mut store);
        assert!(session.error.is_none());
    }

    #[test]
    fn nul_characters_are_stripped() {
        let registry = FakeRegistry::default();
        let mut store = MemorySettings::default();
        let mut session = Session::default();
        session.set_source("int\0 a;");
        session.update_types(&registry, &mut store);
        assert_eq!(registry.seen.borrow()[0].1, "int a;");
    }

    #[test]
    fn restore_prefers_persisted_platform() {
        let mut store = MemorySettings::default();
        let session = Session::restore(&store, "linux-x86");
        assert_eq!(session.platform.name(), "linux-x86");
        assert_eq!(session.source, "");

        store.set(PLATFORM_KEY, "mac-aarch64").unwrap();
        store.set(TYPES_KEY, "int a;").unwrap();
        let session = Session::restore(&store, "linux-x86");
        assert_eq!(session.platform.name(), "mac-aarch64");
        assert_eq!(session.source, "int a;");
    }

    #[test]
    fn switching_platform_reparses_and_remembers() {
        let registry = FakeRegistry::default();
        let mut store = MemorySettings::default();
        let mut session = Session::default();
        session.set_source("Point");
        session.select_platform(PlatformRef::new("linux-x86"), &registry, &mut store);
        assert_eq!(store.get(PLATFORM_KEY).as_deref(), Some("linux-x86"));
        assert_eq!(registry.seen.borrow()[0], ("linux-x86".to_string(), "Point".to_string()));
    }

    #[test]
    fn host_failures_surface_as_messages() {
        struct Down;
        impl PlatformRegistry for Down {
            fn list_platforms(&self) -> Result<Vec<PlatformRef>, PlatformError> {
                Err(PlatformError::NoHost)
            }
            fn parse_types_from_source(
                &self,
                _: &PlatformRef,
                _: &str,
            ) -> Result<ParseResult, PlatformError> {
                Err(PlatformError::NoHost)
            }
        }

        let mut session = Session::default();
        let outcome = session.update_types(&Down, &mut MemorySettings::default());
        assert_eq!(outcome, UpdateOutcome::Rejected);
        let err = session.error.unwrap();
        assert!(err.message.starts_with("no type host configured"));
        assert_eq!(err.position, None);
    }
}
