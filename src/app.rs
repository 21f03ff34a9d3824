//! Control-loop context: owns every piece of mutable state and arbitrates the
//! event sources once per poll.
//!
//! Per tick, in order:
//! 1. gather at most one candidate event (shake, then trigger; or the
//!    debounced button when the accelerometer is absent)
//! 2. offer it to the session, firing the presenter and audio on acceptance
//! 3. expire the display hold
//! 4. redraw the idle view while nothing is showing

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::config::Config;
use crate::input::Debouncer;
use crate::motion::{is_shaking, shake_signal, MotionSensor};
use crate::responses;
use crate::session::{EventSource, Session};
use crate::ui::{Audio, Presenter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Motion,
    Button,
}

pub struct App<S, P, A> {
    sensor: S,
    presenter: P,
    audio: Option<A>,
    session: Session,
    button: Debouncer,
    config: Config,
    mode: InputMode,
    // set by an accepted shake, cleared by the next quiet sample
    shake_latched: bool,
    last_accel_log: Option<u64>,
    last_answer: Option<&'static str>,
}

impl<S, P, A> App<S, P, A>
where
    S: MotionSensor,
    P: Presenter,
    A: Audio,
{
    pub fn new(sensor: S, presenter: P, audio: Option<A>, config: Config) -> Self {
        let mode = if sensor.is_initialized() {
            InputMode::Motion
        } else {
            InputMode::Button
        };
        Self {
            sensor,
            presenter,
            audio,
            session: Session::new(config.cooldown_ms, config.display_hold_ms),
            button: Debouncer::new(config.debounce_ms),
            config,
            mode,
            shake_latched: false,
            last_accel_log: None,
            last_answer: None,
        }
    }

    /// Bring up the accelerometer and pick the input mode. Never fails: a
    /// sensor that does not come up leaves the device in button mode.
    pub fn start(&mut self, delay: &mut impl DelayNs) -> InputMode {
        self.mode = match self.sensor.initialize(delay) {
            Ok(()) => {
                info!("Shake detection enabled, shake the device to get a response");
                InputMode::Motion
            }
            Err(e) => {
                warn!("Accelerometer init failed: {:?}", e);
                info!("Button mode enabled, press the button to get a response");
                InputMode::Button
            }
        };
        self.mode
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_showing(&self) -> bool {
        self.session.is_showing()
    }

    pub fn last_answer(&self) -> Option<&'static str> {
        self.last_answer
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn audio(&self) -> Option<&A> {
        self.audio.as_ref()
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// One poll. `button_high` is the raw pin level, `trigger` whether an
    /// external request arrived since the last poll. Returns the source of
    /// the event accepted this tick, if any.
    pub fn tick(&mut self, now_ms: u64, button_high: bool, trigger: bool) -> Option<EventSource> {
        let candidate = match self.mode {
            InputMode::Motion => self.poll_motion(now_ms, trigger),
            // trigger requests are not honoured without the accelerometer
            InputMode::Button => self
                .button
                .update(now_ms, button_high)
                .then_some(EventSource::Button),
        };

        let accepted = candidate.filter(|source| self.session.try_accept(now_ms, *source));
        if let Some(source) = accepted {
            self.respond(now_ms, source);
        }

        if self.session.expire(now_ms) {
            match self.mode {
                InputMode::Motion => info!("Ready for next shake..."),
                InputMode::Button => info!("Ready for next button press..."),
            }
        } else if !self.session.is_showing() {
            self.presenter.show_idle(now_ms, self.mode);
        }

        accepted
    }

    fn poll_motion(&mut self, now_ms: u64, trigger: bool) -> Option<EventSource> {
        let shaking = match self.sensor.read_sample() {
            Ok(sample) => {
                self.log_sample(now_ms, &sample);
                Some(is_shaking(&sample, self.config.shake_threshold_g))
            }
            Err(e) => {
                // missing sample: no motion event, latch untouched
                warn!("Accelerometer read failed: {:?}", e);
                None
            }
        };

        if shaking == Some(false) {
            self.shake_latched = false;
        }

        if shaking == Some(true) && !self.shake_latched && self.session.can_accept(now_ms) {
            self.shake_latched = true;
            info!("SHAKE DETECTED!");
            return Some(EventSource::Motion);
        }

        trigger.then_some(EventSource::Trigger)
    }

    fn respond(&mut self, now_ms: u64, source: EventSource) {
        let answer = responses::pick(now_ms);
        info!("=== MAGIC 8-BALL RESPONSE ({}) ===", source.as_str());
        info!(">> {} <<", answer);

        self.presenter.show_response(answer);
        if let Some(audio) = self.audio.as_mut() {
            audio.play_random_clip();
        }
        self.last_answer = Some(answer);
    }

    fn log_sample(&mut self, now_ms: u64, sample: &crate::motion::MotionSample) {
        let due = self
            .last_accel_log
            .map_or(true, |t| now_ms.saturating_sub(t) > self.config.accel_log_interval_ms);
        if !due {
            return;
        }
        self.last_accel_log = Some(now_ms);
        debug!(
            "Accel: X={:.2}g Y={:.2}g Z={:.2}g Total={:.2}g Diff from 1g={:.2}",
            sample.x,
            sample.y,
            sample.z,
            sample.magnitude(),
            shake_signal(sample)
        );
    }
}
