/// Hook the engine calls between sector-sized steps so the caller can feed a
/// watchdog or service other housekeeping. It must not re-enter the engine.
pub trait Heartbeat {
    fn beat(&mut self);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoHeartbeat;

impl Heartbeat for NoHeartbeat {
    fn beat(&mut self) {}
}

impl<F: FnMut()> Heartbeat for F {
    fn beat(&mut self) {
        self()
    }
}
