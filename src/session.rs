//! Render session: one off-screen render of one figure, start to cleanup.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::export::{FormatFlags, VectorExportRenderer};
use crate::rendering::{
    extract, ContextConfig, ContextRegistry, ImageTensor, OffscreenContext, PixelBuffer,
    RasterRenderer,
};
use crate::scene::{Handle, SceneHost};
use crate::{Dimensions, Error, PrintConfig, Result};

/// What to produce from the figure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// Return the pixels as an [`ImageTensor`].
    Raster,
    /// Write a vector document to `path`; see [`FormatFlags::parse`].
    VectorExport { path: PathBuf, format_flags: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutput {
    Image(ImageTensor),
    /// Files written, primary format first.
    Exported(Vec<PathBuf>),
}

/// Lifecycle of a session. Failures after context creation still end in
/// `Cleaned`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    ContextReady,
    Rendering,
    ImageReady,
    Exported,
    Cleaned,
}

/// Runs renders against a [`SceneHost`].
///
/// Each call creates a fresh software context, renders, destroys the context
/// and then hands the current-context slot back: the previously current
/// context is re-selected if still alive, and a visible figure is toggled
/// off and on so its canvas reacquires the slot.
#[derive(Debug)]
pub struct RenderSession {
    config: PrintConfig,
    state: SessionState,
}

impl RenderSession {
    pub fn new(config: PrintConfig) -> Self {
        Self {
            config,
            state: SessionState::Idle,
        }
    }

    pub fn config(&self) -> &PrintConfig {
        &self.config
    }

    /// State reached by the last call to [`render`](Self::render).
    pub fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        log::debug!("session {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Render `handle` in the given mode.
    pub fn render(
        &mut self,
        host: &mut dyn SceneHost,
        handle: Handle,
        mode: OutputMode,
    ) -> Result<RenderOutput> {
        match mode {
            OutputMode::Raster => self.render_image(host, handle).map(RenderOutput::Image),
            OutputMode::VectorExport { path, format_flags } => self
                .render_to_file(host, handle, &path, &format_flags)
                .map(RenderOutput::Exported),
        }
    }

    /// Rasterize `handle` and return its pixels.
    pub fn render_image(&mut self, host: &mut dyn SceneHost, handle: Handle) -> Result<ImageTensor> {
        self.state = SessionState::Idle;
        self.run(host, handle, SessionState::ImageReady, |_, host, ctx, _| {
            rasterize(host, handle, ctx)
        })
    }

    /// Export `handle` to `path` and every extra format named in
    /// `format_flags`; returns the files written, primary first.
    pub fn render_to_file(
        &mut self,
        host: &mut dyn SceneHost,
        handle: Handle,
        path: &Path,
        format_flags: &str,
    ) -> Result<Vec<PathBuf>> {
        self.state = SessionState::Idle;
        if !self.config.vector_export {
            return Err(Error::UnsupportedBuildConfiguration(
                "vector export is not available in this build".into(),
            ));
        }
        let flags = FormatFlags::parse(format_flags)?;
        self.run(host, handle, SessionState::Exported, |session, host, _, dims| {
            session.export(host, handle, path, &flags, dims)
        })
    }

    /// Context lifecycle around `job`: create, bind, run, destroy, restore.
    fn run<T>(
        &mut self,
        host: &mut dyn SceneHost,
        handle: Handle,
        done: SessionState,
        job: impl FnOnce(&Self, &dyn SceneHost, &mut OffscreenContext, Dimensions) -> Result<T>,
    ) -> Result<T> {
        let dims = figure_dimensions(&*host, handle)?;

        let previous = ContextRegistry::current();
        let mut ctx = OffscreenContext::create(ContextConfig::SOFTWARE)?
            .with_max_viewport(self.config.max_viewport);
        let buffer = PixelBuffer::allocate(dims.width, dims.height)?;
        if !ctx.bind(buffer, dims.width, dims.height) {
            return Err(Error::ContextBindFailed(format!(
                "cannot bind a {}x{} buffer to {}",
                dims.width,
                dims.height,
                ctx.id()
            )));
        }
        self.transition(SessionState::ContextReady);

        if self.config.log_capabilities {
            if let Some(caps) = ctx.capabilities() {
                log::debug!(
                    "Depth={} Stencil={} Accum={}",
                    caps.depth_bits,
                    caps.stencil_bits,
                    caps.accum_bits
                );
            }
        }

        let was_visible = host.is_visible(handle);
        self.transition(SessionState::Rendering);

        let result = job(&*self, &*host, &mut ctx, dims);
        match &result {
            Ok(_) => self.transition(done),
            Err(err) => log::debug!("render of figure {} failed: {}", handle, err),
        }

        ctx.destroy();
        restore_previous(previous);
        if was_visible {
            host.set_visible(handle, false);
            host.set_visible(handle, true);
        }
        self.transition(SessionState::Cleaned);

        result
    }

    /// Write every requested format, the primary one to `path`. On failure
    /// every file this call created is removed again.
    fn export(
        &self,
        host: &dyn SceneHost,
        handle: Handle,
        path: &Path,
        flags: &FormatFlags,
        dims: Dimensions,
    ) -> Result<Vec<PathBuf>> {
        log::info!(
            "exporting Width={} Height={} path={} term={}",
            dims.width,
            dims.height,
            path.display(),
            flags
        );

        let renderer =
            VectorExportRenderer::new(self.config.document_title.clone(), self.config.bsp_epsilon);
        let mut written: Vec<PathBuf> = Vec::with_capacity(flags.formats().len());
        for (i, &format) in flags.formats().iter().enumerate() {
            let target = if i == 0 {
                path.to_path_buf()
            } else {
                path.with_extension(format.extension())
            };
            if i > 0 && target == path {
                log::warn!(
                    "skipping {} output: it would overwrite {}",
                    format,
                    path.display()
                );
                continue;
            }

            let file = match File::create(&target) {
                Ok(file) => file,
                Err(source) => {
                    remove_outputs(&written);
                    return Err(Error::SinkOpenFailed {
                        path: target,
                        source,
                    });
                }
            };
            written.push(target);
            let mut sink = BufWriter::new(file);
            let outcome = renderer
                .draw(host, handle, &mut sink, &flags.for_format(format))
                .and_then(|()| sink.flush().map_err(Error::from));
            if let Err(err) = outcome {
                drop(sink);
                remove_outputs(&written);
                return Err(err);
            }
        }
        Ok(written)
    }
}

fn rasterize(host: &dyn SceneHost, handle: Handle, ctx: &mut OffscreenContext) -> Result<ImageTensor> {
    RasterRenderer::new(ctx).draw(host, handle);
    let buffer = ctx
        .buffer()
        .ok_or_else(|| Error::ContextBindFailed(format!("{} lost its buffer", ctx.id())))?;
    Ok(extract(buffer.as_bytes(), buffer.width(), buffer.height()))
}

fn remove_outputs(paths: &[PathBuf]) {
    for path in paths {
        if let Err(err) = std::fs::remove_file(path) {
            log::warn!("cannot remove partial output {}: {}", path.display(), err);
        }
    }
}

/// Pixel size of a live figure root, from its internal bounding box.
fn figure_dimensions(host: &dyn SceneHost, handle: Handle) -> Result<Dimensions> {
    let is_root = host
        .resolve(handle)
        .is_some_and(|obj| host.is_figure_root(obj));
    if !is_root {
        return Err(Error::InvalidHandle(format!(
            "{} does not refer to a figure",
            handle
        )));
    }
    let bb = host
        .bounding_box(handle, true)
        .ok_or_else(|| Error::InvalidHandle(format!("figure {} has no bounding box", handle)))?;
    // `as` truncates toward zero and maps negative or NaN sizes to 0
    Ok(Dimensions::new(bb.width as u32, bb.height as u32))
}

fn restore_previous(previous: Option<crate::rendering::ContextId>) {
    let Some(previous) = previous else {
        return;
    };
    if ContextRegistry::current() == Some(previous) {
        return;
    }
    if !ContextRegistry::make_current(previous) {
        log::warn!("previous context {} is gone, cannot re-select it", previous);
    }
}
