//! Service container for dependency injection
//!
//! Wires the session controller to its surface, layout and settings.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::application::services::SessionController;
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::layout::{TidyLayout, TreeLayout};
use crate::infrastructure::terminal::TerminalSurface;
use crate::infrastructure::traits::{RecordingSurface, RenderSurface};

/// Container holding the collaborators every session shares.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Where transitions are drawn
    pub surface: Arc<dyn RenderSurface>,

    /// Node placement for tree frames
    pub layout: Arc<dyn TreeLayout>,
}

impl ServiceContainer {
    /// Create a container with real implementations.
    ///
    /// Headless containers record transitions instead of drawing them.
    pub fn new(settings: Settings, headless: bool) -> Self {
        let surface: Arc<dyn RenderSurface> = if headless {
            Arc::new(RecordingSurface::new())
        } else {
            Arc::new(TerminalSurface::stdout())
        };
        let layout = Arc::new(TidyLayout::new(settings.tree.width, settings.tree.height));
        Self::with_deps(settings, surface, layout)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        surface: Arc<dyn RenderSurface>,
        layout: Arc<dyn TreeLayout>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            surface,
            layout,
        }
    }

    /// Start a session; a seed makes its datasets reproducible.
    pub fn session(&self, seed: Option<u64>) -> ApplicationResult<SessionController> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        SessionController::new(
            self.settings.clone(),
            self.surface.clone(),
            self.layout.clone(),
            rng,
        )
    }
}
