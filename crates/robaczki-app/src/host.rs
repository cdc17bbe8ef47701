//! Host runtime: owns the render surface and drives one world frame per callback.

use robaczki_core::{Bounds, Error, HostConfig, Result, SimConfig};
use robaczki_world::{FrameReport, RecordingCanvas, World};
use tracing::{debug, info};

/// Space the embedding environment offers for the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Size of the render surface actually provisioned
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }
}

/// Fit the surface into the viewport minus margins, capped at the configured maximum.
pub fn fit_surface(viewport: Viewport, config: &HostConfig) -> SurfaceSize {
    let fit = |available: f64, margin: f64, max: f64| {
        if available.is_finite() {
            (available - margin).min(max).max(0.0)
        } else {
            max
        }
    };
    SurfaceSize {
        width: fit(viewport.width, config.margin_x, config.max_width),
        height: fit(viewport.height, config.margin_y, config.max_height),
    }
}

struct Session {
    world: World,
    canvas: RecordingCanvas,
    surface: SurfaceSize,
}

/// Owner of the running simulation. At most one session exists per host.
pub struct Host {
    config: SimConfig,
    session: Option<Session>,
}

impl Host {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config: config.sanitized(),
            session: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Provision the surface and populate the world.
    ///
    /// Returns false, changing nothing, when a session is already running.
    pub fn start(&mut self, viewport: Viewport) -> bool {
        if self.session.is_some() {
            debug!("Start requested while already running; ignoring");
            return false;
        }

        let surface = fit_surface(viewport, &self.config.host);
        let world = World::with_bounds(self.config.clone(), surface.bounds());
        info!(
            event = "host_started",
            surface_width = surface.width,
            surface_height = surface.height,
            fps = self.config.host.frames_per_second,
            "Simulation started"
        );

        self.session = Some(Session {
            world,
            canvas: RecordingCanvas::new(surface.width, surface.height),
            surface,
        });
        true
    }

    /// Re-fit the surface after the viewport changed. No-op before `start`.
    pub fn resize(&mut self, viewport: Viewport) -> Option<SurfaceSize> {
        let surface = fit_surface(viewport, &self.config.host);
        let session = self.session.as_mut()?;
        if session.surface != surface {
            session.surface = surface;
            session.canvas.set_size(surface.width, surface.height);
            session.world.resize(surface.bounds());
        }
        Some(surface)
    }

    /// The per-frame callback
    pub fn frame(&mut self) -> Result<FrameReport> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| Error::InvalidState("frame requested before start".to_string()))?;
        session.canvas.clear();
        Ok(session.world.frame(&mut session.canvas))
    }

    pub fn world(&self) -> Option<&World> {
        self.session.as_ref().map(|s| &s.world)
    }

    pub fn world_mut(&mut self) -> Option<&mut World> {
        self.session.as_mut().map(|s| &mut s.world)
    }

    /// Draw commands issued by the most recent frame
    pub fn canvas(&self) -> Option<&RecordingCanvas> {
        self.session.as_ref().map(|s| &s.canvas)
    }

    pub fn surface(&self) -> Option<SurfaceSize> {
        self.session.as_ref().map(|s| s.surface)
    }
}
