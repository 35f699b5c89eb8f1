// ---------------------------------
// enum for managing callbacks
// ---------------------------------

/// User function called once per outer iteration.   Returning `true`
/// stops the solver with status `StoppedByUser`.
#[derive(Default, Debug, Clone, Copy)]
pub(crate) enum Callback<I> {
    #[default]
    None,
    Rust(fn(&I) -> bool),
}

impl<I> Callback<I> {
    fn call(&self, info: &I) -> bool {
        match self {
            Callback::None => false,
            Callback::Rust(f) => f(info),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SolverCallbacks<I> {
    /// callback for termination
    pub termination_callback: Callback<I>,
}

impl<I> Default for SolverCallbacks<I> {
    fn default() -> Self {
        Self {
            termination_callback: Callback::None,
        }
    }
}

impl<I> SolverCallbacks<I> {
    pub(crate) fn check_termination(&self, info: &I) -> bool {
        self.termination_callback.call(info)
    }
}

#[test]
fn test_termination_callback() {
    let mut callbacks = SolverCallbacks::<u32>::default();
    assert!(!callbacks.check_termination(&10));

    callbacks.termination_callback = Callback::Rust(|its: &u32| *its >= 5);
    assert!(!callbacks.check_termination(&4));
    assert!(callbacks.check_termination(&5));
}
