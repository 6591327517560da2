//! Cancellable marker move animation
//!
//! A move is a chain of ticks posted to a [`FrameScheduler`]. Each tick reads
//! the clock, samples a linear tween between the marker's projected start
//! position and the target, writes the position once and reposts itself
//! until the duration has elapsed. The final tick lands exactly on the target
//! and applies the completion visibility.
//!
//! Every marker has one slot recording the animation that currently owns it.
//! Starting a move on a marker cancels the previous owner, and ticks only
//! write while holding the slot lock and still owning it, so two chains can
//! never interleave writes on the same marker, even on a threaded scheduler.

use crate::animation::tweening::{Tween, TweenState};
use crate::core::config::MarkerAnimationConfig;
use crate::core::geo::LatLng;
use crate::runtime::{cancel_unfinished, TaskHandle};
use crate::traits::{Clock, FrameScheduler, HostMap, MarkerHandle, MarkerId, Projection};
use crate::{MapError, Result};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

/// Marker visibility once a move completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletionVisibility {
    #[default]
    Show,
    Hide,
}

impl CompletionVisibility {
    pub fn visible(self) -> bool {
        matches!(self, CompletionVisibility::Show)
    }
}

type MarkerSlot = Arc<Mutex<Option<AnimationHandle>>>;
type SlotRegistry = Mutex<FxHashMap<MarkerId, MarkerSlot>>;

struct HandleInner {
    id: u64,
    marker_id: MarkerId,
    state: AtomicU8,
    slot: Weak<Mutex<Option<AnimationHandle>>>,
}

impl HandleInner {
    /// Running -> `to`; finished or cancelled animations stay as they are
    fn settle(&self, to: TweenState) -> bool {
        self.state
            .compare_exchange(
                TweenState::Running as u8,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

/// Handle to one marker move. Cloning shares the same animation.
#[derive(Clone)]
pub struct AnimationHandle {
    inner: Arc<HandleInner>,
}

impl AnimationHandle {
    fn new(id: u64, marker_id: MarkerId, slot: &MarkerSlot) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id,
                marker_id,
                state: AtomicU8::new(TweenState::Running as u8),
                slot: Arc::downgrade(slot),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn marker_id(&self) -> MarkerId {
        self.inner.marker_id
    }

    pub fn state(&self) -> TweenState {
        TweenState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    pub fn is_running(&self) -> bool {
        self.state() == TweenState::Running
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == TweenState::Cancelled
    }

    pub fn is_finished(&self) -> bool {
        self.state() == TweenState::Finished
    }

    /// Stops the move where it is. No marker write happens after this
    /// returns; a no-op once the move has finished.
    pub fn cancel(&self) {
        let Some(slot) = self.inner.slot.upgrade() else {
            self.inner.settle(TweenState::Cancelled);
            return;
        };
        let Ok(mut owner) = slot.lock() else {
            self.inner.settle(TweenState::Cancelled);
            return;
        };
        if self.inner.settle(TweenState::Cancelled) {
            log::debug!("marker {} move {} cancelled", self.marker_id(), self.id());
        }
        if owner.as_ref().map_or(false, |current| current.id() == self.id()) {
            *owner = None;
        }
    }
}

impl TaskHandle for AnimationHandle {
    fn is_finished(&self) -> bool {
        AnimationHandle::is_finished(self)
    }

    fn cancel(&self) {
        AnimationHandle::cancel(self)
    }
}

impl std::fmt::Debug for AnimationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationHandle")
            .field("id", &self.id())
            .field("marker_id", &self.marker_id())
            .field("state", &self.state())
            .finish()
    }
}

enum Step {
    Continue,
    Finished,
    Stopped,
}

/// State of one running move, owned by its tick chain
struct MarkerMove<M: MarkerHandle + ?Sized> {
    marker: Arc<M>,
    tween: Tween<LatLng>,
    started_at: Duration,
    frame_interval: Duration,
    on_complete: CompletionVisibility,
    handle: AnimationHandle,
    slot: MarkerSlot,
    registry: Weak<SlotRegistry>,
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn FrameScheduler>,
}

impl<M: MarkerHandle + ?Sized + 'static> MarkerMove<M> {
    fn tick(self) {
        match self.step() {
            Step::Continue => {
                let scheduler = self.scheduler.clone();
                let delay = self.frame_interval;
                scheduler.post_delayed(delay, Box::new(move || self.tick()));
            }
            Step::Finished => {
                log::debug!(
                    "marker {} move {} finished at {:?}",
                    self.handle.marker_id(),
                    self.handle.id(),
                    self.tween.to
                );
                self.prune();
            }
            Step::Stopped => self.prune(),
        }
    }

    fn step(&self) -> Step {
        let Ok(mut owner) = self.slot.lock() else {
            return Step::Stopped;
        };

        let owns_marker = owner
            .as_ref()
            .map_or(false, |current| current.id() == self.handle.id());
        if !owns_marker || !self.handle.is_running() {
            return Step::Stopped;
        }

        if !self.marker.is_attached() {
            log::debug!(
                "marker {} detached, dropping move {}",
                self.handle.marker_id(),
                self.handle.id()
            );
            self.handle.inner.settle(TweenState::Cancelled);
            *owner = None;
            return Step::Stopped;
        }

        let elapsed = self.clock.now().saturating_sub(self.started_at);
        let sample = self.tween.sample(elapsed);
        self.marker.set_position(sample.value);

        if !sample.finished {
            return Step::Continue;
        }

        self.handle.inner.settle(TweenState::Finished);
        self.marker.set_visible(self.on_complete.visible());
        *owner = None;
        Step::Finished
    }

    /// Drops the marker's slot once nobody owns it
    fn prune(&self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let Ok(mut slots) = registry.lock() else {
            return;
        };
        let marker_id = self.handle.marker_id();
        let idle = slots
            .get(&marker_id)
            .map_or(false, |slot| slot.lock().map_or(false, |owner| owner.is_none()));
        if idle {
            slots.remove(&marker_id);
        }
    }
}

/// Animates markers to new positions, one move per marker at a time
pub struct MarkerAnimator {
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn FrameScheduler>,
    config: MarkerAnimationConfig,
    slots: Arc<SlotRegistry>,
    next_id: AtomicU64,
}

impl MarkerAnimator {
    pub fn new(
        clock: Arc<dyn Clock>,
        scheduler: Arc<dyn FrameScheduler>,
        config: MarkerAnimationConfig,
    ) -> Self {
        Self {
            clock,
            scheduler,
            config,
            slots: Arc::new(Mutex::new(FxHashMap::default())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &MarkerAnimationConfig {
        &self.config
    }

    /// Replaces the settings used by moves started from now on
    pub fn set_config(&mut self, config: MarkerAnimationConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Moves `marker` from its displayed position to `target`.
    ///
    /// The start is the marker position passed through the map projection
    /// and back, so it matches what is on screen. Any move already running
    /// on the marker is cancelled first. Returns as soon as the first tick
    /// is posted.
    pub fn animate_marker_to<M>(
        &self,
        map: &dyn HostMap,
        marker: &Arc<M>,
        target: LatLng,
    ) -> Result<AnimationHandle>
    where
        M: MarkerHandle + ?Sized + 'static,
    {
        self.validate(marker.as_ref(), &target)?;
        let start = self.displayed_position(map.projection().as_ref(), marker.position());
        self.animate_marker_between(marker, start, target)
    }

    /// Same as [`MarkerAnimator::animate_marker_to`] with an explicit start
    pub fn animate_marker_between<M>(
        &self,
        marker: &Arc<M>,
        start: LatLng,
        target: LatLng,
    ) -> Result<AnimationHandle>
    where
        M: MarkerHandle + ?Sized + 'static,
    {
        self.validate(marker.as_ref(), &target)?;
        if !start.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "animation start {:?} is out of range",
                start
            )));
        }

        let marker_id = marker.id();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        // Registry then slot, the same order `prune` takes them, so a slot
        // is never dropped between being looked up and being claimed
        let (slot, handle) = {
            let mut slots = self
                .slots
                .lock()
                .map_err(|_| MapError::Runtime("marker animation registry poisoned".into()))?;
            let slot = slots.entry(marker_id).or_default().clone();
            let handle = AnimationHandle::new(id, marker_id, &slot);
            let mut owner = slot
                .lock()
                .map_err(|_| MapError::Runtime("marker animation slot poisoned".into()))?;
            if let Some(previous) = owner.take() {
                if previous.inner.settle(TweenState::Cancelled) {
                    log::debug!(
                        "marker {} move {} superseded by move {}",
                        marker_id,
                        previous.id(),
                        id
                    );
                }
            }
            *owner = Some(handle.clone());
            drop(owner);
            (slot, handle)
        };

        log::debug!(
            "marker {} move {} from ({:.6}, {:.6}) to ({:.6}, {:.6}) over {} ms",
            marker_id,
            id,
            start.lat,
            start.lng,
            target.lat,
            target.lng,
            self.config.duration_ms
        );

        let animation = MarkerMove {
            marker: marker.clone(),
            tween: Tween::with_easing(start, target, self.config.duration(), self.config.easing),
            started_at: self.clock.now(),
            frame_interval: self.config.frame_interval(),
            on_complete: self.config.on_complete,
            handle: handle.clone(),
            slot,
            registry: Arc::downgrade(&self.slots),
            clock: self.clock.clone(),
            scheduler: self.scheduler.clone(),
        };
        self.scheduler.post(Box::new(move || animation.tick()));

        Ok(handle)
    }

    /// Cancels the move running on `marker_id`, if any
    pub fn cancel(&self, marker_id: MarkerId) -> bool {
        match self.current(marker_id) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels every move in flight. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let handles: Vec<AnimationHandle> = match self.slots.lock() {
            Ok(slots) => slots
                .values()
                .filter_map(|slot| slot.lock().ok().and_then(|owner| owner.clone()))
                .collect(),
            Err(_) => return 0,
        };
        let cancelled = cancel_unfinished(handles);
        if cancelled > 0 {
            log::debug!("cancelled {} marker moves", cancelled);
        }
        cancelled
    }

    /// The move currently owning `marker_id`
    pub fn current(&self, marker_id: MarkerId) -> Option<AnimationHandle> {
        let slot = self.slots.lock().ok()?.get(&marker_id).cloned()?;
        let owner = slot.lock().ok()?;
        owner.clone()
    }

    pub fn is_animating(&self, marker_id: MarkerId) -> bool {
        self.current(marker_id).is_some()
    }

    /// Number of markers with a move in flight
    pub fn active_count(&self) -> usize {
        self.slots.lock().map_or(0, |slots| {
            slots
                .values()
                .filter(|slot| slot.lock().map_or(false, |owner| owner.is_some()))
                .count()
        })
    }

    fn validate<M: MarkerHandle + ?Sized>(&self, marker: &M, target: &LatLng) -> Result<()> {
        if !target.is_valid() {
            log::warn!("refusing to move marker {} to {:?}", marker.id(), target);
            return Err(MapError::InvalidCoordinates(format!(
                "target {:?} is out of range",
                target
            )));
        }
        if !marker.is_attached() {
            log::warn!("refusing to move detached marker {}", marker.id());
            return Err(MapError::MarkerDetached(marker.id()));
        }
        Ok(())
    }

    fn displayed_position(&self, projection: &dyn Projection, position: LatLng) -> LatLng {
        let screen = projection.to_screen_location(&position);
        let screen = if self.config.snap_start_to_pixel {
            screen.round()
        } else {
            screen
        };
        projection.from_screen_location(&screen)
    }
}
