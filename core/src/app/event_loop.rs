//! Loop drivers
//!
//! A test program implements [`LoopTick`]; either driver calls the same
//! `tick` until the program reports done:
//!
//! - [`DriveMode::Blocking`]: `while !done` loop that pumps platform events
//!   with a zero timeout between ticks
//! - [`DriveMode::Scheduled`]: the platform event loop owns scheduling and
//!   calls one tick from `about_to_wait`
//!
//! [`run_blocking`] is the same loop without a platform layer.

use std::sync::Arc;

use hashbrown::HashMap;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use super::args::{CommonOptions, DriveMode, VerboseFlags};
use super::common::CommonState;
use super::events::{TestEvent, translate_window_event};
use super::fps::{FrameCounter, RunSummary};
use super::quit::QuitFlag;
use super::types::SetupError;
use crate::graphics::{GpuContext, Renderer, WgpuRenderer, create_instance};

/// One step of a test program's main loop
pub trait LoopTick<R: Renderer> {
    /// Drain pending events, then draw every open window.
    fn tick(&mut self, common: &mut CommonState<R>);

    fn is_done(&self) -> bool;

    /// Release program resources before the common state is dropped.
    fn teardown(&mut self, _common: &mut CommonState<R>) {}
}

/// What a driver does after one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Iteration {
    Continue,
    Exit,
}

/// Step once unless done, then report whether the loop should exit.
///
/// A pending quit request is queued ahead of the step's events.
fn iterate<R: Renderer, A: LoopTick<R>>(
    app: &mut A,
    common: &mut CommonState<R>,
    counter: &mut FrameCounter,
    quit: &QuitFlag,
) -> Iteration {
    if !app.is_done() {
        if quit.take() {
            common.push_event(TestEvent::Quit);
        }
        counter.tick();
        app.tick(common);
    }
    if app.is_done() {
        Iteration::Exit
    } else {
        Iteration::Continue
    }
}

/// Tick `app` until done, without a platform event source.
///
/// Events must already be queued on `common`.
pub fn run_blocking<R: Renderer, A: LoopTick<R>>(
    app: &mut A,
    common: &mut CommonState<R>,
) -> RunSummary {
    let mut counter = FrameCounter::start();
    let quit = QuitFlag::new();
    while iterate(app, common, &mut counter, &quit) == Iteration::Continue {}
    app.teardown(common);
    counter.summary()
}

struct Session<R, A> {
    common: CommonState<R>,
    app: A,
    window_ids: HashMap<WindowId, usize>,
    counter: FrameCounter,
    quit: QuitFlag,
}

impl<R: Renderer, A: LoopTick<R>> Session<R, A> {
    fn iterate(&mut self) -> Iteration {
        iterate(
            &mut self.app,
            &mut self.common,
            &mut self.counter,
            &self.quit,
        )
    }

    fn finish(mut self) -> RunSummary {
        self.app.teardown(&mut self.common);
        let summary = self.counter.summary();
        // Renderers (and with them the windows) go last
        drop(self);
        summary
    }
}

/// winit handler that creates the windows and feeds events to the session
struct Harness<R, A, F> {
    options: CommonOptions,
    drive: DriveMode,
    builder: Option<F>,
    session: Option<Session<R, A>>,
    error: Option<SetupError>,
    quit: QuitFlag,
}

impl<R, A, F> Harness<R, A, F>
where
    R: Renderer,
    A: LoopTick<R>,
    F: FnOnce(&mut CommonState<R>) -> Result<A, SetupError>,
{
    fn new(options: CommonOptions, drive: DriveMode, builder: F, quit: QuitFlag) -> Self {
        Self {
            options,
            drive,
            builder: Some(builder),
            session: None,
            error: None,
            quit,
        }
    }

    fn is_started(&self) -> bool {
        self.builder.is_none()
    }

    /// Build the program on `common` and start counting ticks.
    fn start(
        &mut self,
        mut common: CommonState<R>,
        window_ids: HashMap<WindowId, usize>,
    ) -> Result<(), SetupError> {
        let Some(builder) = self.builder.take() else {
            return Err(SetupError::EventLoop("program already started".to_string()));
        };
        let app = builder(&mut common)?;
        self.session = Some(Session {
            common,
            app,
            window_ids,
            counter: FrameCounter::start(),
            quit: self.quit.clone(),
        });
        Ok(())
    }

    fn fail(&mut self, error: SetupError) {
        tracing::error!("{}", error);
        self.error = Some(error);
    }

    fn queue_window_event(&mut self, window_id: WindowId, event: &WindowEvent) {
        let Some(session) = &mut self.session else {
            return;
        };
        let Some(&index) = session.window_ids.get(&window_id) else {
            return;
        };
        if let Some(event) = translate_window_event(index, event) {
            session.common.push_event(event);
        }
    }

    /// Scheduled driver: one iteration per `about_to_wait`.
    fn scheduled_iteration(&mut self) -> Iteration {
        if self.drive != DriveMode::Scheduled {
            return Iteration::Continue;
        }
        match &mut self.session {
            Some(session) => session.iterate(),
            None => Iteration::Continue,
        }
    }

    /// Blocking driver: one iteration after pumping platform events.
    fn blocking_iteration(&mut self, platform_exited: bool) -> Iteration {
        if self.error.is_some() || platform_exited {
            return Iteration::Exit;
        }
        match &mut self.session {
            Some(session) => session.iterate(),
            None => Iteration::Continue,
        }
    }

    fn finish(mut self) -> Result<RunSummary, SetupError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        let Some(session) = self.session.take() else {
            return Err(SetupError::EventLoop(
                "event loop exited before windows were created".to_string(),
            ));
        };
        Ok(session.finish())
    }
}

impl<A, F> Harness<WgpuRenderer, A, F>
where
    A: LoopTick<WgpuRenderer>,
    F: FnOnce(&mut CommonState<WgpuRenderer>) -> Result<A, SetupError>,
{
    fn open_windows(
        &self,
        event_loop: &ActiveEventLoop,
    ) -> Result<(CommonState<WgpuRenderer>, HashMap<WindowId, usize>), SetupError> {
        let options = &self.options;
        let instance = create_instance(options.renderer);

        let mut windows = Vec::with_capacity(options.windows);
        for index in 0..options.windows {
            let title = if options.windows > 1 {
                format!("{} {}", options.title, index)
            } else {
                options.title.clone()
            };
            let attributes = Window::default_attributes()
                .with_title(title)
                .with_inner_size(LogicalSize::new(options.width, options.height));

            let window = event_loop
                .create_window(attributes)
                .map_err(|e| SetupError::Window(e.to_string()))?;
            let window = Arc::new(window);

            if options.is_verbose(VerboseFlags::VIDEO) {
                let size = window.inner_size();
                tracing::info!("Created window {}: {}x{}", index, size.width, size.height);
            }

            let surface = instance
                .create_surface(window.clone())
                .map_err(|e| SetupError::Gpu(e.to_string()))?;
            windows.push((window, surface));
        }

        let Some((first_window, first_surface)) = windows.first() else {
            return Err(SetupError::Window("no windows requested".to_string()));
        };

        if options.is_verbose(VerboseFlags::MODES)
            && let Some(monitor) = first_window.current_monitor()
        {
            tracing::info!(
                "Video modes for {}:",
                monitor.name().unwrap_or_else(|| "unknown monitor".to_string())
            );
            for mode in monitor.video_modes() {
                let size = mode.size();
                tracing::info!(
                    "  {}x{} {}bpp {}mHz",
                    size.width,
                    size.height,
                    mode.bit_depth(),
                    mode.refresh_rate_millihertz()
                );
            }
        }

        let gpu = GpuContext::new(&instance, first_surface)
            .map_err(|e| SetupError::Gpu(format!("{:#}", e)))?;

        if options.is_verbose(VerboseFlags::RENDER) {
            let info = &gpu.adapter_info;
            tracing::info!(
                "Renderer: {} ({:?}, {:?}, driver: {} {})",
                info.name,
                info.backend,
                info.device_type,
                info.driver,
                info.driver_info
            );
        }

        let mut common = CommonState::new(options.clone());
        let mut window_ids = HashMap::new();
        for (window, surface) in windows {
            let id = window.id();
            let renderer = WgpuRenderer::new(gpu.clone(), window, surface, options.vsync)
                .map_err(|e| SetupError::Gpu(format!("{:#}", e)))?;
            if options.is_verbose(VerboseFlags::RENDER) {
                tracing::info!(
                    "Window {} surface format: {:?}",
                    common.num_windows(),
                    renderer.surface_format()
                );
            }
            window_ids.insert(id, common.add_window(renderer));
        }

        Ok((common, window_ids))
    }
}

impl<A, F> ApplicationHandler for Harness<WgpuRenderer, A, F>
where
    A: LoopTick<WgpuRenderer>,
    F: FnOnce(&mut CommonState<WgpuRenderer>) -> Result<A, SetupError>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.is_started() {
            return;
        }
        event_loop.set_control_flow(ControlFlow::Poll);

        let started = self
            .open_windows(event_loop)
            .and_then(|(common, window_ids)| self.start(common, window_ids));
        if let Err(e) = started {
            self.fail(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        self.queue_window_event(window_id, &event);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.scheduled_iteration() == Iteration::Exit {
            event_loop.exit();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        tracing::debug!("Event loop exiting");
    }
}

/// Open the windows described by `options`, build the program with
/// `builder`, and drive it until done.
///
/// Ctrl+C is delivered to the program as [`TestEvent::Quit`]. The returned
/// summary counts every tick from the first one.
pub fn run<A, F>(options: CommonOptions, builder: F) -> Result<RunSummary, SetupError>
where
    A: LoopTick<WgpuRenderer>,
    F: FnOnce(&mut CommonState<WgpuRenderer>) -> Result<A, SetupError>,
{
    let event_loop = EventLoop::new().map_err(|e| SetupError::EventLoop(e.to_string()))?;
    let drive = effective_drive_mode(options.drive);
    tracing::debug!("Driving loop with {:?}", drive);

    let quit = QuitFlag::new();
    quit.listen_for_ctrl_c();

    let mut harness: Harness<WgpuRenderer, A, F> = Harness::new(options, drive, builder, quit);
    match drive {
        DriveMode::Blocking => drive_blocking(event_loop, &mut harness)?,
        DriveMode::Scheduled => event_loop
            .run_app(&mut harness)
            .map_err(|e| SetupError::EventLoop(e.to_string()))?,
    }

    harness.finish()
}

#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "android"
))]
fn effective_drive_mode(requested: DriveMode) -> DriveMode {
    requested
}

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "android"
)))]
fn effective_drive_mode(requested: DriveMode) -> DriveMode {
    if requested == DriveMode::Blocking {
        tracing::warn!("Blocking driver unavailable on this platform, using scheduled");
    }
    DriveMode::Scheduled
}

#[cfg(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "android"
))]
fn drive_blocking<A, F>(
    mut event_loop: EventLoop<()>,
    harness: &mut Harness<WgpuRenderer, A, F>,
) -> Result<(), SetupError>
where
    A: LoopTick<WgpuRenderer>,
    F: FnOnce(&mut CommonState<WgpuRenderer>) -> Result<A, SetupError>,
{
    use std::time::Duration;
    use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};

    loop {
        let status = event_loop.pump_app_events(Some(Duration::ZERO), harness);
        let platform_exited = match status {
            PumpStatus::Exit(code) => {
                tracing::debug!("Event loop exited with code {}", code);
                true
            }
            PumpStatus::Continue => false,
        };
        if harness.blocking_iteration(platform_exited) == Iteration::Exit {
            return Ok(());
        }
    }
}

#[cfg(not(any(
    target_os = "windows",
    target_os = "macos",
    target_os = "linux",
    target_os = "android"
)))]
fn drive_blocking<A, F>(
    event_loop: EventLoop<()>,
    harness: &mut Harness<WgpuRenderer, A, F>,
) -> Result<(), SetupError>
where
    A: LoopTick<WgpuRenderer>,
    F: FnOnce(&mut CommonState<WgpuRenderer>) -> Result<A, SetupError>,
{
    event_loop
        .run_app(harness)
        .map_err(|e| SetupError::EventLoop(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::app::events::Keycode;
    use crate::test_utils::TestRenderer;

    /// Counts ticks and stops on the common handler's done flag
    #[derive(Default)]
    struct CountingApp {
        ticks: u32,
        done: bool,
        /// Tick count seen by `teardown`
        torn_down: Rc<Cell<Option<u32>>>,
    }

    impl LoopTick<TestRenderer> for CountingApp {
        fn tick(&mut self, common: &mut CommonState<TestRenderer>) {
            self.ticks += 1;
            while let Some(event) = common.poll_event() {
                common.common_event(&event, &mut self.done);
            }
        }

        fn is_done(&self) -> bool {
            self.done
        }

        fn teardown(&mut self, _common: &mut CommonState<TestRenderer>) {
            self.torn_down.set(Some(self.ticks));
        }
    }

    type Builder =
        Box<dyn FnOnce(&mut CommonState<TestRenderer>) -> Result<CountingApp, SetupError>>;

    fn new_harness(
        drive: DriveMode,
        builder: Builder,
        quit: QuitFlag,
    ) -> Harness<TestRenderer, CountingApp, Builder> {
        Harness::new(CommonOptions::default(), drive, builder, quit)
    }

    /// Builder that queues `events` and shares the app's teardown record
    fn queueing_builder(events: Vec<TestEvent>, torn_down: Rc<Cell<Option<u32>>>) -> Builder {
        Box::new(move |common: &mut CommonState<TestRenderer>| {
            for event in events {
                common.push_event(event);
            }
            Ok(CountingApp {
                torn_down,
                ..Default::default()
            })
        })
    }

    fn one_window() -> CommonState<TestRenderer> {
        CommonState::with_renderers(CommonOptions::default(), vec![TestRenderer::default()])
    }

    /// Iterate the way `drive` does once platform events are delivered.
    fn drive_until_exit(harness: &mut Harness<TestRenderer, CountingApp, Builder>) {
        for _ in 0..100 {
            let iteration = match harness.drive {
                DriveMode::Blocking => harness.blocking_iteration(false),
                DriveMode::Scheduled => harness.scheduled_iteration(),
            };
            if iteration == Iteration::Exit {
                return;
            }
        }
        panic!("{:?} driver never exited", harness.drive);
    }

    /// Run one window under `drive` with `events` queued at startup.
    fn run_headless(
        drive: DriveMode,
        events: Vec<TestEvent>,
        quit: QuitFlag,
    ) -> (RunSummary, Option<u32>) {
        let torn_down = Rc::new(Cell::new(None));
        let mut harness = new_harness(drive, queueing_builder(events, torn_down.clone()), quit);
        harness.start(one_window(), HashMap::new()).unwrap();
        drive_until_exit(&mut harness);
        let summary = harness.finish().unwrap();
        (summary, torn_down.get())
    }

    #[test]
    fn test_run_blocking_stops_after_close() {
        let mut common = one_window();
        common.push_event(TestEvent::WindowCloseRequested { window: 0 });

        let mut app = CountingApp::default();
        let summary = run_blocking(&mut app, &mut common);

        assert_eq!(app.ticks, 1);
        assert_eq!(summary.frames, 1);
        assert_eq!(app.torn_down.get(), Some(1));
    }

    #[test]
    fn test_run_blocking_escape() {
        let mut common = one_window();
        common.push_event(TestEvent::KeyDown {
            window: 0,
            key: Keycode::Char('a'),
            repeat: false,
        });
        common.push_event(TestEvent::KeyDown {
            window: 0,
            key: Keycode::Escape,
            repeat: false,
        });

        let mut app = CountingApp::default();
        run_blocking(&mut app, &mut common);
        assert_eq!(app.ticks, 1);
        assert!(app.done);
    }

    #[test]
    fn test_run_blocking_already_done() {
        let mut common = CommonState::<TestRenderer>::new(CommonOptions::default());
        let mut app = CountingApp {
            done: true,
            ..Default::default()
        };
        let summary = run_blocking(&mut app, &mut common);
        assert_eq!(summary.frames, 0);
        assert_eq!(app.ticks, 0);
    }

    #[test]
    fn test_drivers_agree_on_window_close() {
        let close = || vec![TestEvent::WindowCloseRequested { window: 0 }];

        let (blocking, blocking_teardown) =
            run_headless(DriveMode::Blocking, close(), QuitFlag::new());
        let (scheduled, scheduled_teardown) =
            run_headless(DriveMode::Scheduled, close(), QuitFlag::new());

        assert_eq!(blocking.frames, 1);
        assert_eq!(scheduled.frames, blocking.frames);
        // Teardown ran after the last tick, before the session was dropped
        assert_eq!(blocking_teardown, Some(1));
        assert_eq!(scheduled_teardown, Some(1));
    }

    #[test]
    fn test_quit_request_ends_loop_normally() {
        for drive in [DriveMode::Blocking, DriveMode::Scheduled] {
            let quit = QuitFlag::new();
            quit.request();

            let (summary, torn_down) = run_headless(drive, Vec::new(), quit.clone());

            assert_eq!(summary.frames, 1, "{:?}", drive);
            assert_eq!(torn_down, Some(1), "{:?}", drive);
            assert!(!quit.take(), "{:?} left the request pending", drive);
        }
    }

    #[test]
    fn test_quit_request_mid_run() {
        let quit = QuitFlag::new();
        let torn_down = Rc::new(Cell::new(None));
        let mut harness = new_harness(
            DriveMode::Scheduled,
            queueing_builder(Vec::new(), torn_down.clone()),
            quit.clone(),
        );
        harness.start(one_window(), HashMap::new()).unwrap();

        assert_eq!(harness.scheduled_iteration(), Iteration::Continue);
        assert_eq!(harness.scheduled_iteration(), Iteration::Continue);
        quit.request();
        assert_eq!(harness.scheduled_iteration(), Iteration::Exit);

        let summary = harness.finish().unwrap();
        assert_eq!(summary.frames, 3);
        assert_eq!(torn_down.get(), Some(3));
    }

    #[test]
    fn test_platform_exit_stops_blocking_driver() {
        let torn_down = Rc::new(Cell::new(None));
        let mut harness = new_harness(
            DriveMode::Blocking,
            queueing_builder(Vec::new(), torn_down.clone()),
            QuitFlag::new(),
        );
        harness.start(one_window(), HashMap::new()).unwrap();

        assert_eq!(harness.blocking_iteration(true), Iteration::Exit);
        // The scheduled hook never steps a blocking run
        assert_eq!(harness.scheduled_iteration(), Iteration::Continue);

        let summary = harness.finish().unwrap();
        assert_eq!(summary.frames, 0);
        assert_eq!(torn_down.get(), Some(0));
    }

    #[test]
    fn test_builder_failure_exits_with_error() {
        let failing: Builder = Box::new(|_: &mut CommonState<TestRenderer>| {
            Err(SetupError::Texture("sample.bmp".to_string()))
        });
        let mut harness = new_harness(DriveMode::Blocking, failing, QuitFlag::new());

        let error = harness.start(one_window(), HashMap::new()).unwrap_err();
        harness.fail(error);

        assert!(harness.is_started());
        assert_eq!(harness.blocking_iteration(false), Iteration::Exit);
        let error = harness.finish().unwrap_err();
        assert_eq!(error.exit_code(), SetupError::EXIT_CODE);
    }

    #[test]
    fn test_finish_without_session() {
        let harness = new_harness(
            DriveMode::Scheduled,
            queueing_builder(Vec::new(), Rc::default()),
            QuitFlag::new(),
        );
        assert!(matches!(harness.finish(), Err(SetupError::EventLoop(_))));
    }
}
