use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, info};

use crate::classify::WeatherClass;
use crate::error::VideoError;

/// Opaque handle to an attached playback element, issued by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoHandle(pub u64);

/// Platform video capability. `load_metadata` resolves once the clip's
/// metadata is ready (no full buffering). `start_playback` attaches a new
/// element and resolves only after playback has actually started; on failure
/// the surface discards its partial element before returning, so the caller
/// never sees a half-attached player. `teardown` removes a previously
/// returned element.
#[allow(async_fn_in_trait)]
pub trait VideoSurface {
    async fn load_metadata(&self, src: &str) -> Result<(), VideoError>;
    async fn start_playback(&self, src: &str) -> Result<VideoHandle, VideoError>;
    fn teardown(&self, handle: VideoHandle);
}

#[derive(Clone, Copy)]
struct ActiveVideo {
    class: WeatherClass,
    handle: VideoHandle,
}

struct VideoState {
    /// class -> clip URL, populated on first successful preload and never
    /// evicted. A failed preload stores nothing and is retried next time.
    sources: HashMap<WeatherClass, String>,
    active: Option<ActiveVideo>,
    /// Bumped per change request; in-flight switches that observe a newer
    /// value discard themselves instead of clobbering the winner.
    epoch: u64,
}

/// Ambient background manager: at most one active clip, per-class source
/// cache, last-requested-class wins. Interior state sits behind a RefCell,
/// never borrowed across an await, so overlapping `change_background`
/// futures interleave safely on the single cooperative task.
pub struct VideoBackground<S> {
    surface: S,
    base_url: String,
    preload_timeout: Duration,
    state: RefCell<VideoState>,
}

impl<S: VideoSurface> VideoBackground<S> {
    pub fn new(surface: S, base_url: impl Into<String>, preload_timeout: Duration) -> Self {
        Self {
            surface,
            base_url: base_url.into(),
            preload_timeout,
            state: RefCell::new(VideoState {
                sources: HashMap::new(),
                active: None,
                epoch: 0,
            }),
        }
    }

    pub fn active_class(&self) -> Option<WeatherClass> {
        self.state.borrow().active.map(|a| a.class)
    }

    fn video_src(&self, class: WeatherClass) -> String {
        format!(
            "{}/weather_{}.mp4",
            self.base_url.trim_end_matches('/'),
            class
        )
    }

    /// Swap the ambient clip to the one for `class`. No-op when that class
    /// is already active. On any failure the previously active clip keeps
    /// playing.
    pub async fn change_background(&self, class: WeatherClass) -> Result<(), VideoError> {
        let epoch = {
            let mut state = self.state.borrow_mut();
            if state.active.map(|a| a.class) == Some(class) {
                return Ok(());
            }
            state.epoch += 1;
            state.epoch
        };

        let src = self.resolve_source(class).await?;

        if self.state.borrow().epoch != epoch {
            debug!("background switch to {class} superseded before playback");
            return Ok(());
        }

        self.switch_to_new_video(&src, class, epoch).await
    }

    /// Clip URL for `class`, preloading and memoizing it on first use.
    async fn resolve_source(&self, class: WeatherClass) -> Result<String, VideoError> {
        if let Some(src) = self.state.borrow().sources.get(&class) {
            return Ok(src.clone());
        }

        let src = self.video_src(class);
        match timeout(self.preload_timeout, self.surface.load_metadata(&src)).await {
            // Deadline won the race: the pending load is dropped with it.
            Err(_) => return Err(VideoError::PreloadTimeout { src }),
            Ok(Err(e)) => return Err(e),
            Ok(Ok(())) => {}
        }

        self.state.borrow_mut().sources.insert(class, src.clone());
        Ok(src)
    }

    /// Start the new element; tear the previous one down only after playback
    /// has confirmedly started. A switch that lost the race to a newer
    /// request tears down its own element instead.
    async fn switch_to_new_video(
        &self,
        src: &str,
        class: WeatherClass,
        epoch: u64,
    ) -> Result<(), VideoError> {
        let handle = self.surface.start_playback(src).await?;

        let previous = {
            let mut state = self.state.borrow_mut();
            if state.epoch != epoch {
                drop(state);
                debug!("background switch to {class} superseded after playback start");
                self.surface.teardown(handle);
                return Ok(());
            }
            state.active.replace(ActiveVideo { class, handle })
        };

        if let Some(prev) = previous {
            self.surface.teardown(prev.handle);
        }
        Ok(())
    }
}

/// Surface that logs transitions instead of driving a real player; stands in
/// for the platform on the CLI.
#[derive(Default)]
pub struct LogSurface {
    next_handle: Cell<u64>,
}

impl LogSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VideoSurface for LogSurface {
    async fn load_metadata(&self, src: &str) -> Result<(), VideoError> {
        debug!("preloading {src}");
        Ok(())
    }

    async fn start_playback(&self, src: &str) -> Result<VideoHandle, VideoError> {
        let id = self.next_handle.get();
        self.next_handle.set(id + 1);
        info!("ambient background now playing {src}");
        Ok(VideoHandle(id))
    }

    fn teardown(&self, handle: VideoHandle) {
        debug!("removed background element #{}", handle.0);
    }
}
