pub mod preferences;

pub use preferences::{
    OrientationChoice, PaperChoice, Preferences, PreferencesError, PreferencesStore,
    PrintPreferences,
};
