use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use progress_core::{
    update, AnalysisRequest, Effect, EntityId, JobId, Msg, Notice, TrackerConfig, TrackerState,
    TrackerViewModel,
};
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior, Sleep};
use tracker_logging::{tracker_debug, tracker_info, tracker_warn};

use crate::ProgressClient;

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    pub poll_interval: Duration,
    pub animation_tick: Duration,
    /// How long 100% stays visible before the tracker goes idle.
    pub completion_hold: Duration,
    pub core: TrackerConfig,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            animation_tick: Duration::from_millis(700),
            completion_hold: Duration::from_millis(800),
            core: TrackerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerEvent {
    ViewChanged(TrackerViewModel),
    Notice(Notice),
}

/// Owner of one tracker instance. Dropping the handle disposes the tracker.
pub struct TrackerHandle {
    msg_tx: mpsc::UnboundedSender<Msg>,
    event_rx: mpsc::UnboundedReceiver<TrackerEvent>,
    view_rx: watch::Receiver<TrackerViewModel>,
    task: Option<JoinHandle<()>>,
}

impl TrackerHandle {
    /// Spawns the driver task on the current tokio runtime.
    pub fn spawn(client: Arc<dyn ProgressClient>, settings: TrackerSettings) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let state = TrackerState::with_config(settings.core.clone());
        let (view_tx, view_rx) = watch::channel(state.view());

        let driver = Driver {
            state,
            client,
            settings,
            msg_tx: msg_tx.clone(),
            event_tx,
            view_tx,
            poll: None,
            animation: None,
            hold: None,
            in_flight: JoinSet::new(),
        };
        let task = tokio::spawn(driver.run(msg_rx));

        Self {
            msg_tx,
            event_rx,
            view_rx,
            task: Some(task),
        }
    }

    /// Follow an already submitted job.
    pub fn start(&self, job_id: JobId, entity_id: EntityId) {
        self.send(Msg::Start { job_id, entity_id });
    }

    /// Submit a new analysis and follow it.
    pub fn analyze(&self, request: AnalysisRequest) {
        self.send(Msg::Analyze(request));
    }

    pub fn snapshot(&self) -> TrackerViewModel {
        self.view_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerViewModel> {
        self.view_rx.clone()
    }

    pub fn try_recv(&mut self) -> Option<TrackerEvent> {
        self.event_rx.try_recv().ok()
    }

    pub async fn next_event(&mut self) -> Option<TrackerEvent> {
        self.event_rx.recv().await
    }

    /// Stop every timer, abort in-flight requests and wait for the driver.
    pub async fn dispose(mut self) {
        self.send(Msg::Dispose);
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracker_warn!("Tracker driver ended abnormally: {}", err);
            }
        }
    }

    fn send(&self, msg: Msg) {
        if self.msg_tx.send(msg).is_err() {
            tracker_debug!("Tracker driver already stopped");
        }
    }
}

impl Drop for TrackerHandle {
    fn drop(&mut self) {
        let _ = self.msg_tx.send(Msg::Dispose);
    }
}

struct Driver {
    state: TrackerState,
    client: Arc<dyn ProgressClient>,
    settings: TrackerSettings,
    msg_tx: mpsc::UnboundedSender<Msg>,
    event_tx: mpsc::UnboundedSender<TrackerEvent>,
    view_tx: watch::Sender<TrackerViewModel>,
    poll: Option<Interval>,
    animation: Option<Interval>,
    hold: Option<(JobId, Pin<Box<Sleep>>)>,
    in_flight: JoinSet<()>,
}

impl Driver {
    async fn run(mut self, mut msg_rx: mpsc::UnboundedReceiver<Msg>) {
        loop {
            let msg = tokio::select! {
                received = msg_rx.recv() => received.unwrap_or(Msg::Dispose),
                _ = next_tick(&mut self.poll) => Msg::PollTick,
                _ = next_tick(&mut self.animation) => Msg::AnimationTick,
                job_id = hold_elapsed(&mut self.hold) => Msg::HoldElapsed { job_id },
                Some(_) = self.in_flight.join_next(), if !self.in_flight.is_empty() => continue,
            };
            self.dispatch(msg);
            if self.state.is_disposed() {
                break;
            }
        }
        self.in_flight.abort_all();
        tracker_info!("Tracker disposed");
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        // Views go out before notices so a notice always follows the view it concludes.
        if was_dirty {
            self.publish_view();
        }
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::SubmitAnalysis(request) => {
                let client = self.client.clone();
                let msg_tx = self.msg_tx.clone();
                self.in_flight.spawn(async move {
                    match client.submit_analysis(&request).await {
                        Ok(()) => tracker_info!("Analysis accepted for job {}", request.job_id),
                        Err(err) => {
                            let _ = msg_tx.send(Msg::SubmitFailed {
                                job_id: request.job_id,
                                reason: err.to_string(),
                            });
                        }
                    }
                });
            }
            Effect::StartPolling { job_id } => {
                tracker_debug!("Polling job {} every {:?}", job_id, self.settings.poll_interval);
                self.poll = Some(new_interval(self.settings.poll_interval));
            }
            Effect::StopPolling => self.poll = None,
            Effect::FetchProgress { job_id, seq } => {
                let client = self.client.clone();
                let msg_tx = self.msg_tx.clone();
                self.in_flight.spawn(async move {
                    let msg = match client.fetch_progress(&job_id).await {
                        Ok(report) => Msg::PollResponse {
                            job_id,
                            seq,
                            report,
                        },
                        Err(err) => Msg::PollFailed {
                            job_id,
                            seq,
                            error: err.to_string(),
                        },
                    };
                    let _ = msg_tx.send(msg);
                });
            }
            Effect::StartAnimation => {
                if self.animation.is_none() {
                    self.animation = Some(new_interval(self.settings.animation_tick));
                }
            }
            Effect::StopAnimation => self.animation = None,
            Effect::ScheduleHold { job_id } => {
                let sleep = tokio::time::sleep(self.settings.completion_hold);
                self.hold = Some((job_id, Box::pin(sleep)));
            }
            Effect::CancelHold => self.hold = None,
            Effect::Notify(notice) => {
                let _ = self.event_tx.send(TrackerEvent::Notice(notice));
            }
        }
    }

    fn publish_view(&self) {
        let view = self.state.view();
        self.view_tx.send_replace(view.clone());
        let _ = self.event_tx.send(TrackerEvent::ViewChanged(view));
    }
}

/// First tick fires one full period after start.
fn new_interval(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn hold_elapsed(hold: &mut Option<(JobId, Pin<Box<Sleep>>)>) -> JobId {
    let Some((_, sleep)) = hold.as_mut() else {
        return std::future::pending::<JobId>().await;
    };
    sleep.as_mut().await;
    match hold.take() {
        Some((job_id, _)) => job_id,
        None => std::future::pending::<JobId>().await,
    }
}
