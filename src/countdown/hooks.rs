//! Observer hooks invoked by the countdown state machine

/// A host-supplied notification callback. Hooks carry no arguments; the
/// host reads state through snapshots, not through the callback.
pub type Hook = Box<dyn Fn() + Send + Sync>;

/// The optional observer hooks for one countdown instance.
///
/// `on_tick` fires once per counted-down second, before the decrement for
/// that second is applied. `on_finish` fires at most once ever, the first
/// time the remaining duration reaches zero through any path. `on_press`
/// is a forwarded interaction hook; its presence makes the rendered
/// surface interactive.
#[derive(Default)]
pub struct CountdownHooks {
    pub(crate) on_tick: Option<Hook>,
    pub(crate) on_finish: Option<Hook>,
    pub(crate) on_press: Option<Hook>,
}

impl CountdownHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_tick(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_tick = Some(Box::new(hook));
        self
    }

    pub fn on_finish(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_finish = Some(Box::new(hook));
        self
    }

    pub fn on_press(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_press = Some(Box::new(hook));
        self
    }
}

impl std::fmt::Debug for CountdownHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountdownHooks")
            .field("on_tick", &self.on_tick.is_some())
            .field("on_finish", &self.on_finish.is_some())
            .field("on_press", &self.on_press.is_some())
            .finish()
    }
}
