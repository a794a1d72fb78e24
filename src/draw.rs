use std::{
    io::{stdout, Write},
    sync::{
        atomic::{AtomicU64, Ordering},
        mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
        Arc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Print, PrintStyledContent, Stylize},
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen, SetTitle,
    },
};
use log::{debug, info, warn};

use crate::{config::Settings, proc::Simulation};

type Err = Box<dyn std::error::Error>;
type Result<T> = std::result::Result<T, Err>;

/// Tick intervals in milliseconds that `j`/`k` step through.
pub const DELAYS: [u64; 10] = [25, 50, 100, 150, 200, 300, 500, 800, 1200, 2000];

/// Whether a surface of `need` (columns, lines) fits a terminal of `term`.
#[inline]
pub fn fits(need: (u16, u16), term: (u16, u16)) -> bool {
    need.0 <= term.0 && need.1 <= term.1
}

/// Fails unless the current terminal can show the whole board and its
/// status line.
pub fn check_surface(settings: &Settings) -> Result<()> {
    let need = settings.surface_size();
    let term = terminal::size()?;
    if !fits(need, term) {
        return Err(format!(
            "terminal is {}x{} but a {}x{} board needs {}x{}",
            term.0, term.1, settings.rows, settings.cols, need.0, need.1
        )
        .into());
    }
    Ok(())
}

/// Handle on the background thread that paces generations.
///
/// Ticks arrive on `ticks()` every interval until the handle is cancelled
/// or dropped.
pub struct Ticker {
    ticks: Receiver<()>,
    cancel: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    interval_ms: Arc<AtomicU64>,
}

impl Ticker {
    pub fn start(interval: Duration) -> Result<Self> {
        let (tick_tx, ticks) = mpsc::channel();
        let (cancel, cancel_rx) = mpsc::channel::<()>();
        let interval_ms = Arc::new(AtomicU64::new(interval.as_millis() as u64));
        let shared = Arc::clone(&interval_ms);

        let handle = thread::Builder::new()
            .name("Tick machine".into())
            .spawn(move || loop {
                let wait = Duration::from_millis(shared.load(Ordering::Relaxed));
                match cancel_rx.recv_timeout(wait) {
                    Err(RecvTimeoutError::Timeout) => {
                        if tick_tx.send(()).is_err() {
                            break;
                        }
                    }
                    _ => break,
                }
            })?;

        Ok(Ticker {
            ticks,
            cancel: Some(cancel),
            handle: Some(handle),
            interval_ms,
        })
    }

    #[inline]
    pub fn ticks(&self) -> &Receiver<()> {
        &self.ticks
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::Relaxed))
    }

    /// Takes effect from the next tick on.
    pub fn set_interval(&self, interval: Duration) {
        self.interval_ms
            .store(interval.as_millis() as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// Stops the thread and waits for it. Pending ticks are discarded.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("tick thread panicked");
            }
        }
        while self.ticks.try_recv().is_ok() {}
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Action {
    Quit,
    Pause,
    Faster,
    Slower,
}

pub fn action(key: &KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char('p') => Some(Action::Pause),
        KeyCode::Char('j') => Some(Action::Faster),
        KeyCode::Char('k') => Some(Action::Slower),
        _ => None,
    }
}

/// Position in `DELAYS` closest to `tick`.
pub fn delay_index(tick: Duration) -> usize {
    let ms = tick.as_millis() as u64;
    DELAYS
        .iter()
        .enumerate()
        .min_by_key(|&(_, d)| d.abs_diff(ms))
        .map_or(0, |(i, _)| i)
}

enum State {
    Running,
    Paused,
    Finished(&'static str),
}

pub fn run(sim: Simulation, settings: &Settings) -> Result<()> {
    check_surface(settings)?;

    runup()?;
    let d = draw(sim, settings);
    shutdown()?;
    d
}

fn runup() -> Result<()> {
    execute!(stdout(), EnterAlternateScreen, SetTitle("Life on a torus"), Hide)?;
    enable_raw_mode()?;
    clear()?;
    Ok(())
}

fn shutdown() -> Result<()> {
    execute!(stdout(), LeaveAlternateScreen, Show)?;
    disable_raw_mode()?;
    Ok(())
}

fn clear() -> Result<()> {
    execute!(stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    Ok(())
}

fn draw(mut sim: Simulation, settings: &Settings) -> Result<()> {
    let mut ticker = Ticker::start(settings.tick)?;
    let mut delay = delay_index(settings.tick);
    let mut state = State::Running;
    info!(
        "running {}x{} board, torus: {}, tick {:?}",
        sim.rows(),
        sim.cols(),
        sim.on_torus(),
        settings.tick
    );

    let mut out = stdout();
    paint(&mut out, &sim, settings, &status(&sim, &state))?;

    loop {
        if event::poll(Duration::from_millis(15))? {
            if let Event::Key(key) = event::read()? {
                if let State::Finished(_) = state {
                    if key.kind == KeyEventKind::Press {
                        break;
                    }
                }
                match action(&key) {
                    Some(Action::Quit) => {
                        debug!("closed by user at generation {}", sim.generation());
                        break;
                    }
                    Some(Action::Pause) => {
                        state = match state {
                            State::Running => State::Paused,
                            State::Paused => State::Running,
                            f => f,
                        };
                        paint(&mut out, &sim, settings, &status(&sim, &state))?;
                    }
                    Some(Action::Faster) => {
                        delay = delay.saturating_sub(1);
                        ticker.set_interval(Duration::from_millis(DELAYS[delay]));
                        debug!("tick is now {:?}", ticker.interval());
                    }
                    Some(Action::Slower) => {
                        delay = (delay + 1).min(DELAYS.len() - 1);
                        ticker.set_interval(Duration::from_millis(DELAYS[delay]));
                        debug!("tick is now {:?}", ticker.interval());
                    }
                    None => {}
                }
            }
        }

        if !ticker.is_active() {
            continue;
        }
        match ticker.ticks().try_recv() {
            Ok(()) => {}
            Err(TryRecvError::Empty) => continue,
            Err(TryRecvError::Disconnected) => return Err("tick thread stopped".into()),
        }
        if let State::Paused = state {
            continue;
        }

        sim.advance();
        if !sim.has_life() {
            state = State::Finished("extinct");
        } else if sim.is_settled() {
            state = State::Finished("settled");
        }
        if let State::Finished(why) = state {
            info!("{} at generation {}", why, sim.generation());
            ticker.cancel();
        }
        paint(&mut out, &sim, settings, &status(&sim, &state))?;
    }

    ticker.cancel();
    Ok(())
}

fn status(sim: &Simulation, state: &State) -> String {
    let head = format!("gen {}  alive {}", sim.generation(), sim.count_alive());
    match state {
        State::Running => format!("{}  [p]ause [j/k] speed [q]uit", head),
        State::Paused => format!("{}  paused", head),
        State::Finished(why) => format!("{}  {}, press any key", head, why),
    }
}

/// Draws the board, two terminal columns per cell, followed by a status line.
pub fn paint<W: Write>(
    out: &mut W,
    sim: &Simulation,
    settings: &Settings,
    status: &str,
) -> std::io::Result<()> {
    for (i, row) in sim.board().iter_rows().enumerate() {
        queue!(out, MoveTo(0, i as u16))?;
        for &alive in row {
            let color = if alive {
                settings.alive_color
            } else {
                settings.dead_color
            };
            queue!(out, PrintStyledContent("  ".on(color)))?;
        }
    }
    queue!(
        out,
        MoveTo(0, sim.rows() as u16),
        Clear(ClearType::CurrentLine),
        Print(status)
    )?;
    out.flush()
}
