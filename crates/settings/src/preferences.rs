use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use exam_request_printing::{
    CaptionTemplate, Margin, Orientation, PaperId, PrintComposer, PrintJobOptions,
    StyleTemplate, SurfaceGeometry, TemplateError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const PREFERENCES_VERSION: u32 = 1;
const MAX_MARGIN_MM: f32 = 50.0;
const MIN_SURFACE_EDGE: u32 = 200;
const MAX_SURFACE_EDGE: u32 = 8000;

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("failed to read preferences {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse preferences {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize preferences {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write preferences {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to prepare directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Host configuration for the exam request form. Request data is never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub print: PrintPreferences,
}

fn default_version() -> u32 {
    PREFERENCES_VERSION
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: PREFERENCES_VERSION,
            print: PrintPreferences::default(),
        }
    }
}

impl Preferences {
    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = PREFERENCES_VERSION;
        }
        self.print.sanitize();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaperChoice {
    #[default]
    A4,
    Letter,
}

impl From<PaperChoice> for PaperId {
    fn from(choice: PaperChoice) -> Self {
        match choice {
            PaperChoice::A4 => PaperId::A4,
            PaperChoice::Letter => PaperId::Letter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrientationChoice {
    #[default]
    Portrait,
    Landscape,
}

impl From<OrientationChoice> for Orientation {
    fn from(choice: OrientationChoice) -> Self {
        match choice {
            OrientationChoice::Portrait => Orientation::Portrait,
            OrientationChoice::Landscape => Orientation::Landscape,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintPreferences {
    #[serde(default = "default_title")]
    pub document_title: String,
    #[serde(default)]
    pub paper: PaperChoice,
    #[serde(default)]
    pub orientation: OrientationChoice,
    #[serde(default = "default_margins")]
    pub margins_mm: f32,
    #[serde(default = "default_surface_width")]
    pub surface_width: u32,
    #[serde(default = "default_surface_height")]
    pub surface_height: u32,
    #[serde(default)]
    pub style_template_path: Option<PathBuf>,
    #[serde(default)]
    pub caption_template: Option<String>,
}

fn default_title() -> String {
    "Imprimir Pedido".to_string()
}

fn default_margins() -> f32 {
    10.0
}

fn default_surface_width() -> u32 {
    SurfaceGeometry::default().width
}

fn default_surface_height() -> u32 {
    SurfaceGeometry::default().height
}

impl Default for PrintPreferences {
    fn default() -> Self {
        Self {
            document_title: default_title(),
            paper: PaperChoice::default(),
            orientation: OrientationChoice::default(),
            margins_mm: default_margins(),
            surface_width: default_surface_width(),
            surface_height: default_surface_height(),
            style_template_path: None,
            caption_template: None,
        }
    }
}

impl PrintPreferences {
    fn sanitize(&mut self) {
        if self.document_title.trim().is_empty() {
            self.document_title = default_title();
        }
        if !self.margins_mm.is_finite() || self.margins_mm < 0.0 {
            self.margins_mm = default_margins();
        }
        self.margins_mm = self.margins_mm.min(MAX_MARGIN_MM);
        if self.surface_width == 0 {
            self.surface_width = default_surface_width();
        }
        if self.surface_height == 0 {
            self.surface_height = default_surface_height();
        }
        self.surface_width = self.surface_width.clamp(MIN_SURFACE_EDGE, MAX_SURFACE_EDGE);
        self.surface_height = self.surface_height.clamp(MIN_SURFACE_EDGE, MAX_SURFACE_EDGE);
        if self
            .style_template_path
            .as_ref()
            .is_some_and(|path| path.as_os_str().is_empty())
        {
            self.style_template_path = None;
        }
        if self
            .caption_template
            .as_deref()
            .is_some_and(|caption| caption.trim().is_empty())
        {
            self.caption_template = None;
        }
    }

    pub fn job_options(&self) -> PrintJobOptions {
        PrintJobOptions::new(
            self.document_title.clone(),
            self.paper.into(),
            self.orientation.into(),
            Margin::uniform(self.margins_mm),
            SurfaceGeometry {
                width: self.surface_width,
                height: self.surface_height,
            },
        )
    }

    /// Loads the configured stylesheet, or the built-in one when none is set.
    pub fn style_template(&self) -> Result<StyleTemplate, TemplateError> {
        match &self.style_template_path {
            Some(path) => {
                debug!(path = %path.display(), "loading print style template");
                StyleTemplate::load(path)
            }
            None => Ok(StyleTemplate::builtin()),
        }
    }

    pub fn caption(&self) -> Result<CaptionTemplate, TemplateError> {
        match &self.caption_template {
            Some(raw) => CaptionTemplate::parse(raw),
            None => Ok(CaptionTemplate::default()),
        }
    }

    /// Builds a composer configured from these preferences.
    pub fn composer(&self) -> Result<PrintComposer, TemplateError> {
        Ok(PrintComposer::new(self.job_options(), self.style_template()?)
            .with_caption(self.caption()?))
    }
}

#[derive(Debug)]
pub struct PreferencesStore {
    path: PathBuf,
    data: Preferences,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>, preferences: Preferences) -> Self {
        Self {
            path: path.into(),
            data: preferences,
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, PreferencesError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            debug!(path = %path.display(), "preferences missing, using defaults");
            let mut data = Preferences::default();
            data.sanitize();
            return Ok(Self { path, data });
        }

        let contents = fs::read_to_string(&path).map_err(|source| PreferencesError::Read {
            path: path.clone(),
            source,
        })?;
        let mut data: Preferences =
            serde_json::from_str(&contents).map_err(|source| PreferencesError::Parse {
                path: path.clone(),
                source,
            })?;
        data.sanitize();
        Ok(Self { path, data })
    }

    pub fn preferences(&self) -> &Preferences {
        &self.data
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.data
    }

    pub fn update<F>(&mut self, op: F) -> Result<(), PreferencesError>
    where
        F: FnOnce(&mut Preferences),
    {
        op(&mut self.data);
        self.data.sanitize();
        self.save()
    }

    pub fn overwrite(&mut self, preferences: Preferences) -> Result<(), PreferencesError> {
        self.data = preferences;
        self.data.sanitize();
        self.save()
    }

    /// Writes to a sibling `.tmp` file first, then renames over the target.
    pub fn save(&self) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PreferencesError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let payload = serde_json::to_string_pretty(&self.data).map_err(|source| {
            PreferencesError::Serialize {
                path: self.path.clone(),
                source,
            }
        })?;

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload.as_bytes()).map_err(|source| PreferencesError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| PreferencesError::Write {
            path: self.path.clone(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_restores_unusable_values() {
        let mut prefs = PrintPreferences {
            document_title: "  ".into(),
            margins_mm: f32::NAN,
            surface_width: 0,
            surface_height: 20_000,
            style_template_path: Some(PathBuf::new()),
            caption_template: Some(" ".into()),
            ..PrintPreferences::default()
        };
        prefs.sanitize();
        assert_eq!(prefs.document_title, "Imprimir Pedido");
        assert_eq!(prefs.margins_mm, 10.0);
        assert_eq!(prefs.surface_width, 1200);
        assert_eq!(prefs.surface_height, MAX_SURFACE_EDGE);
        assert!(prefs.style_template_path.is_none());
        assert!(prefs.caption_template.is_none());
    }

    #[test]
    fn margins_are_capped() {
        let mut prefs = PrintPreferences {
            margins_mm: 120.0,
            ..PrintPreferences::default()
        };
        prefs.sanitize();
        assert_eq!(prefs.margins_mm, MAX_MARGIN_MM);
    }

    #[test]
    fn job_options_follow_preferences() {
        let prefs = PrintPreferences {
            document_title: "Pedido UTI".into(),
            paper: PaperChoice::Letter,
            orientation: OrientationChoice::Landscape,
            margins_mm: 6.0,
            ..PrintPreferences::default()
        };
        let options = prefs.job_options();
        assert_eq!(options.title, "Pedido UTI");
        assert_eq!(options.paper, PaperId::Letter);
        assert_eq!(options.orientation, Orientation::Landscape);
        assert_eq!(options.margins, Margin::uniform(6.0));
        assert_eq!(options.surface, SurfaceGeometry::default());
    }

    #[test]
    fn invalid_caption_is_reported() {
        let prefs = PrintPreferences {
            caption_template: Some("&x".into()),
            ..PrintPreferences::default()
        };
        assert!(matches!(prefs.caption(), Err(TemplateError::UnknownToken('x'))));
        assert!(prefs.composer().is_err());
    }

    #[test]
    fn orientation_serializes_lowercase() {
        let json = serde_json::to_string(&PrintPreferences::default()).unwrap();
        assert!(json.contains("\"orientation\":\"portrait\""));
        assert!(json.contains("\"paper\":\"A4\""));
    }
}
