//! OCR fallback for pages without usable embedded text.
//!
//! The recognition engine is an injected dependency. [`OcrService`] owns its
//! lazy, one-time initialization and the locale degradation policy: when the
//! engine cannot load the full locale set, each locale is tried on its own
//! and the first that loads is kept.

mod fallback;
mod tesseract;

use std::fmt;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{BoundingBox, Locale, PositionedFragment};
use crate::source::RasterImage;

pub use fallback::OcrFallback;
pub use tesseract::{parse_tsv, TesseractEngine, TesseractLoader, DEFAULT_TESSERACT};

/// One recognized paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrResult {
    /// Bounding quadrilateral in pixels, starting at the top-left corner
    pub corners: [(f32, f32); 4],
    /// Recognized text
    pub text: String,
}

impl OcrResult {
    /// Axis-aligned result from a pixel rectangle.
    pub fn from_rect(left: f32, top: f32, width: f32, height: f32, text: impl Into<String>) -> Self {
        let right = left + width;
        let bottom = top + height;
        Self {
            corners: [(left, top), (right, top), (right, bottom), (left, bottom)],
            text: text.into(),
        }
    }

    /// Same shape as digitally extracted text, positioned at the first corner.
    pub fn into_fragment(self) -> PositionedFragment {
        let (x, y) = self.corners[0];
        let bbox = BoundingBox::from_points(&self.corners);
        let fragment = PositionedFragment::new(self.text, x, y);
        match bbox {
            Some(bbox) => fragment.with_bounds(bbox),
            None => fragment,
        }
    }
}

/// A loaded recognition engine.
pub trait OcrEngine: Send + Sync {
    /// Recognize paragraphs in a page image.
    fn read_text(&self, image: &RasterImage) -> Result<Vec<OcrResult>>;
}

/// Builds an engine for a locale set.
pub trait OcrLoader: Send + Sync {
    /// Load an engine able to read every locale in `locales`.
    fn load(&self, locales: &[Locale]) -> Result<Box<dyn OcrEngine>>;
}

/// Outcome of OCR initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrStatus {
    /// Loaded with the full locale set
    Ready(Vec<Locale>),
    /// Full set failed; running with a reduced set
    Degraded {
        requested: Vec<Locale>,
        active: Vec<Locale>,
        cause: String,
    },
    /// No locale set could be loaded
    Unavailable(String),
}

impl OcrStatus {
    /// Whether OCR can run at all.
    pub fn is_usable(&self) -> bool {
        !matches!(self, OcrStatus::Unavailable(_))
    }

    /// Locales the engine was loaded with.
    pub fn active_locales(&self) -> &[Locale] {
        match self {
            OcrStatus::Ready(locales) => locales,
            OcrStatus::Degraded { active, .. } => active,
            OcrStatus::Unavailable(_) => &[],
        }
    }
}

impl fmt::Display for OcrStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes = |locales: &[Locale]| {
            locales
                .iter()
                .map(|l| l.code())
                .collect::<Vec<_>>()
                .join("+")
        };
        match self {
            OcrStatus::Ready(locales) => write!(f, "ready ({})", codes(locales)),
            OcrStatus::Degraded {
                requested,
                active,
                cause,
            } => write!(
                f,
                "degraded ({} of {}): {}",
                codes(active),
                codes(requested),
                cause
            ),
            OcrStatus::Unavailable(cause) => write!(f, "unavailable: {}", cause),
        }
    }
}

struct Initialized {
    engine: Option<Box<dyn OcrEngine>>,
    status: OcrStatus,
}

/// Shared OCR service, initialized on first use.
///
/// Initialization runs at most once even under concurrent first use; the
/// resulting engine is read-only afterwards.
pub struct OcrService {
    locales: Vec<Locale>,
    loader: Arc<dyn OcrLoader>,
    state: OnceLock<Initialized>,
}

impl OcrService {
    /// Service for `locales`, tried in the given order on degradation.
    pub fn new(locales: Vec<Locale>, loader: Arc<dyn OcrLoader>) -> Self {
        Self {
            locales,
            loader,
            state: OnceLock::new(),
        }
    }

    /// Service over every supported locale.
    pub fn with_all_locales(loader: Arc<dyn OcrLoader>) -> Self {
        Self::new(Locale::ALL.to_vec(), loader)
    }

    /// Configured locales.
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    /// Initialization outcome, initializing if needed.
    pub fn status(&self) -> &OcrStatus {
        &self.state().status
    }

    fn state(&self) -> &Initialized {
        self.state.get_or_init(|| self.initialize())
    }

    fn initialize(&self) -> Initialized {
        let cause = match self.loader.load(&self.locales) {
            Ok(engine) => {
                log::info!("OCR ready for {:?}", self.locales);
                return Initialized {
                    engine: Some(engine),
                    status: OcrStatus::Ready(self.locales.clone()),
                };
            }
            Err(e) => e.to_string(),
        };
        log::warn!("OCR failed to load {:?}: {}", self.locales, cause);

        if self.locales.len() > 1 {
            for locale in &self.locales {
                match self.loader.load(std::slice::from_ref(locale)) {
                    Ok(engine) => {
                        log::warn!("OCR degraded to {}", locale.code());
                        return Initialized {
                            engine: Some(engine),
                            status: OcrStatus::Degraded {
                                requested: self.locales.clone(),
                                active: vec![*locale],
                                cause,
                            },
                        };
                    }
                    Err(e) => log::debug!("OCR locale {} unavailable: {}", locale.code(), e),
                }
            }
        }

        log::warn!("OCR unavailable; scanned pages keep their embedded text");
        Initialized {
            engine: None,
            status: OcrStatus::Unavailable(cause),
        }
    }

    /// Recognize a page image as positioned fragments.
    pub fn recognize(&self, image: &RasterImage) -> Result<Vec<PositionedFragment>> {
        let state = self.state();
        let engine = match &state.engine {
            Some(engine) => engine,
            None => return Err(Error::OcrInit(state.status.to_string())),
        };
        let results = engine.read_text(image)?;
        Ok(results.into_iter().map(OcrResult::into_fragment).collect())
    }
}

impl fmt::Debug for OcrService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OcrService")
            .field("locales", &self.locales)
            .field("status", &self.state.get().map(|s| &s.status))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedEngine(Vec<OcrResult>);

    impl OcrEngine for FixedEngine {
        fn read_text(&self, _image: &RasterImage) -> Result<Vec<OcrResult>> {
            Ok(self.0.clone())
        }
    }

    /// Loads only the locale sets it is told to accept.
    struct PickyLoader {
        accepts: Vec<Vec<Locale>>,
        calls: AtomicUsize,
    }

    impl PickyLoader {
        fn new(accepts: Vec<Vec<Locale>>) -> Self {
            Self {
                accepts,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl OcrLoader for PickyLoader {
        fn load(&self, locales: &[Locale]) -> Result<Box<dyn OcrEngine>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.accepts.iter().any(|set| set == locales) {
                Ok(Box::new(FixedEngine(vec![OcrResult::from_rect(
                    10.0, 10.0, 40.0, 12.0, "world",
                )])))
            } else {
                Err(Error::OcrInit(format!("no model for {:?}", locales)))
            }
        }
    }

    fn image() -> RasterImage {
        RasterImage {
            width: 800,
            height: 1000,
            png: Vec::new(),
        }
    }

    #[test]
    fn test_ready_with_full_set() {
        let loader = Arc::new(PickyLoader::new(vec![Locale::ALL.to_vec()]));
        let service = OcrService::with_all_locales(loader.clone());
        assert_eq!(service.status(), &OcrStatus::Ready(Locale::ALL.to_vec()));

        let fragments = service.recognize(&image()).unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].text, "world");
        assert_eq!((fragments[0].x, fragments[0].y), (10.0, 10.0));
    }

    #[test]
    fn test_degrades_to_single_locale() {
        let loader = Arc::new(PickyLoader::new(vec![vec![Locale::English]]));
        let service = OcrService::new(vec![Locale::Hebrew, Locale::English], loader);

        match service.status() {
            OcrStatus::Degraded { active, .. } => assert_eq!(active, &vec![Locale::English]),
            other => panic!("expected degraded, got {:?}", other),
        }
        assert!(service.status().is_usable());
        assert!(service.recognize(&image()).is_ok());
    }

    #[test]
    fn test_degradation_follows_configured_order() {
        let loader = Arc::new(PickyLoader::new(vec![
            vec![Locale::English],
            vec![Locale::Hebrew],
        ]));
        let service = OcrService::new(vec![Locale::Hebrew, Locale::English], loader);
        assert_eq!(service.status().active_locales(), &[Locale::Hebrew]);
    }

    #[test]
    fn test_unavailable_is_recoverable_error() {
        let loader = Arc::new(PickyLoader::new(Vec::new()));
        let service = OcrService::with_all_locales(loader);

        assert!(!service.status().is_usable());
        let err = service.recognize(&image()).unwrap_err();
        assert!(matches!(err, Error::OcrInit(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_initializes_once() {
        let loader = Arc::new(PickyLoader::new(vec![Locale::ALL.to_vec()]));
        let service = OcrService::with_all_locales(loader.clone());
        assert_eq!(loader.calls.load(Ordering::SeqCst), 0);

        for _ in 0..3 {
            service.recognize(&image()).unwrap();
        }
        assert_eq!(loader.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fragment_uses_first_corner() {
        let result = OcrResult {
            corners: [(30.0, 5.0), (90.0, 7.0), (88.0, 20.0), (28.0, 18.0)],
            text: "tilted".to_string(),
        };
        let fragment = result.into_fragment();
        assert_eq!((fragment.x, fragment.y), (30.0, 5.0));
        let bbox = fragment.bbox.unwrap();
        assert_eq!(bbox.x, 28.0);
        assert_eq!(bbox.right(), 90.0);
    }
}
