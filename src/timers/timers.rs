use std::collections::HashMap;
use std::io::Write;
use std::time::{Duration, Instant};

type TimerMap = HashMap<&'static str, InnerTimer>;

#[derive(Debug, Default)]
struct InnerTimer {
    start: Option<Instant>,
    elapsed: Duration,
    calls: u32,
    children: TimerMap,
}

impl InnerTimer {
    fn start(&mut self) {
        self.start = Some(Instant::now());
        self.calls += 1;
    }

    fn stop(&mut self) {
        if let Some(instant) = self.start.take() {
            self.elapsed += instant.elapsed();
        }
    }

    // a running timer banks its time and keeps `start` as a marker
    fn suspend(&mut self) {
        if let Some(instant) = self.start {
            self.elapsed += instant.elapsed();
            self.children.values_mut().for_each(InnerTimer::suspend);
        }
    }

    fn resume(&mut self) {
        if self.start.is_some() {
            self.start = Some(Instant::now());
            self.children.values_mut().for_each(InnerTimer::resume);
        }
    }
}

fn lookup<'a>(map: &'a TimerMap, path: &[&'static str]) -> Option<&'a InnerTimer> {
    let (first, rest) = path.split_first()?;
    rest.iter()
        .try_fold(map.get(first)?, |t, key| t.children.get(key))
}

fn lookup_mut<'a>(map: &'a mut TimerMap, path: &[&'static str]) -> Option<&'a mut InnerTimer> {
    let (first, rest) = path.split_first()?;
    rest.iter()
        .try_fold(map.get_mut(first)?, |t, key| t.children.get_mut(key))
}

fn print_map(map: &TimerMap, out: &mut dyn Write, depth: usize) -> std::io::Result<()> {
    // sorted for reproducible output
    let mut keys: Vec<_> = map.keys().collect();
    keys.sort();
    for key in keys {
        let t = &map[key];
        let indent = " ".repeat(4 * depth);
        if t.calls > 1 {
            writeln!(out, "{indent}{key} : {:?} ({} calls)", t.elapsed, t.calls)?;
        } else {
            writeln!(out, "{indent}{key} : {:?}", t.elapsed)?;
        }
        print_map(&t.children, out, depth + 1)?;
    }
    Ok(())
}

/// Nested wall clock timers, keyed by static names.
///
/// Timers started while another is current become its children, so the
/// collection records a call tree of the solve phases.  A timer started
/// repeatedly accumulates its time and counts its calls.
#[derive(Default, Debug)]
pub struct Timers {
    stack: Vec<&'static str>,
    roots: TimerMap,
}

impl Timers {
    pub fn reset_timer(&mut self, key: &'static str) {
        self.roots.insert(key, InnerTimer::default());
    }

    /// Start `key` as a child of the running timer, or as a root timer
    pub fn start_as_current(&mut self, key: &'static str) {
        match lookup_mut(&mut self.roots, &self.stack) {
            Some(active) => active.children.entry(key).or_default().start(),
            None => self.roots.entry(key).or_default().start(),
        }
        self.stack.push(key);
    }

    pub fn stop_current(&mut self) {
        if let Some(active) = lookup_mut(&mut self.roots, &self.stack) {
            active.stop();
        }
        self.stack.pop();
    }

    // used by notimeit!
    pub fn suspend(&mut self) {
        self.roots.values_mut().for_each(InnerTimer::suspend);
    }

    // used by notimeit!
    pub fn resume(&mut self) {
        self.roots.values_mut().for_each(InnerTimer::resume);
    }

    pub fn total_time(&self) -> Duration {
        self.roots.values().map(|t| t.elapsed).sum()
    }

    /// Elapsed time of the timer at `path` in the call tree, e.g.
    /// `&["solve", "restart"]`.
    pub fn elapsed(&self, path: &[&'static str]) -> Option<Duration> {
        lookup(&self.roots, path).map(|t| t.elapsed)
    }

    /// Number of times the timer at `path` was started
    pub fn calls(&self, path: &[&'static str]) -> Option<u32> {
        lookup(&self.roots, path).map(|t| t.calls)
    }

    pub fn print(&self, out: &mut dyn Write) -> std::io::Result<()> {
        print_map(&self.roots, out, 0)
    }
}

macro_rules! timeit {
    ($timer:ident => $key:literal; $($tt:tt)+) => {

        $timer.start_as_current($key);
        $(
            $tt
        )+
        $timer.stop_current();
    }
}
pub(crate) use timeit;

macro_rules! notimeit {
    ($timer:ident; $($tt:tt)+) => {

        $timer.suspend();
        $(
            $tt
        )+
        $timer.resume();
    }
}
pub(crate) use notimeit;

#[test]
fn test_timer_tree() {
    let mut timers = Timers::default();
    timeit! {timers => "solve"; {
        for _ in 0..2 {
            timeit! {timers => "restart"; {
                std::thread::sleep(Duration::from_millis(1));
            }}
        }
        notimeit! {timers; {
            std::thread::sleep(Duration::from_millis(1));
        }}
    }}

    let solve = timers.elapsed(&["solve"]).unwrap();
    let restart = timers.elapsed(&["solve", "restart"]).unwrap();
    assert!(restart >= Duration::from_millis(2));
    assert!(solve >= restart);
    assert_eq!(timers.calls(&["solve", "restart"]), Some(2));
    assert!(timers.elapsed(&["restart"]).is_none());
    assert_eq!(timers.total_time(), solve);

    let mut buf = Vec::new();
    timers.print(&mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.starts_with("solve : "));
    assert!(text.contains("    restart : "));
    assert!(text.contains("(2 calls)"));
}
