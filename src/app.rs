use crate::host::{LandingHost, MountOptions};
use crate::phase::PhaseSchedule;
use crate::record::GifRecorder;
use crate::settings::Viewport;
use log::{error, info};
use rand::rngs::StdRng;
use std::cell::Cell;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

/// Recording frames are this many dots per GIF pixel side
const RECORD_SCALE: usize = 2;

/// Main application state
pub struct App {
    pub host: LandingHost,
    pub text: String,
    pub viewport: Viewport,
    pub schedule: PhaseSchedule,
    pub show_status: bool,
    /// Keep the finished screen up until a key is pressed
    pub hold: bool,
    completed: Rc<Cell<bool>>,
    recorder: Option<GifRecorder<BufWriter<File>>>,
}

impl App {
    pub fn new(options: MountOptions, rng: StdRng) -> Self {
        let completed = Rc::new(Cell::new(false));
        let flag = completed.clone();
        let text = options.text.clone();
        let viewport = options.viewport;
        let schedule = options.schedule;

        let host = LandingHost::mount(
            options,
            rng,
            Box::new(move || {
                info!("host notified of completion");
                flag.set(true);
            }),
        );

        Self {
            host,
            text,
            viewport,
            schedule,
            show_status: false,
            hold: false,
            completed,
            recorder: None,
        }
    }

    /// Record every rendered frame into `recorder`
    pub fn attach_recorder(&mut self, recorder: GifRecorder<BufWriter<File>>) {
        self.recorder = Some(recorder);
    }

    /// Size a recorder to the current surface
    pub fn recording_size(&self) -> (usize, usize) {
        let (w, h) = self
            .host
            .surface()
            .map(|s| crate::braille::dot_resolution(s.width, s.height))
            .unwrap_or((0, 0));
        (w * RECORD_SCALE, h * RECORD_SCALE)
    }

    /// Run one animation frame
    pub fn tick(&mut self) {
        self.host.tick();
        self.capture_frame();
    }

    fn capture_frame(&mut self) {
        let Some(recorder) = self.recorder.as_mut() else {
            return;
        };
        let (w, h) = recorder.dimensions();
        let Some(dots) = self.host.render_at(w, h) else {
            return;
        };
        if let Err(e) = recorder.capture(&dots, self.host.brightness()) {
            error!("recording stopped: {}", e);
            self.recorder = None;
        }
    }

    pub fn resize(&mut self, canvas_width: u16, canvas_height: u16) {
        self.host.resize(canvas_width, canvas_height);
    }

    pub fn toggle_status(&mut self) {
        self.show_status = !self.show_status;
    }

    pub fn is_complete(&self) -> bool {
        self.completed.get()
    }

    /// The loop should end now: finished and not holding the final screen
    pub fn should_exit(&self) -> bool {
        self.is_complete() && !self.hold
    }

    /// Release the animation and flush any recording
    pub fn unmount(&mut self) {
        self.host.teardown();
        if let Some(recorder) = self.recorder.take() {
            if let Err(e) = recorder.finish() {
                error!("failed to finish recording: {}", e);
            }
        }
    }
}
