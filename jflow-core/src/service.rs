//! Host-driven service lifecycle
//!
//! The host container owns the call sequence: `init` once after
//! construction, `start` before traffic, `apply` once per message, then
//! `stop` and `close` on the way down. Components must not assume ownership
//! of when these are called, and must not retain per-message state across
//! `apply` calls; caching compiled configuration (a parsed path expression,
//! a compiled schema) at `init` is the intended use of that hook.

use crate::error::Result;
use crate::message::Message;

/// A message-processing component managed by the host lifecycle.
pub trait Service {
    /// Compile and cache configuration. Called once before `start`.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Transition into the running state.
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Process one message in place.
    fn apply(&mut self, message: &mut Message) -> Result<()>;

    /// Transition out of the running state.
    fn stop(&mut self) {}

    /// Release any held resources. The component is not reused afterwards.
    fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl Service for Recorder {
        fn init(&mut self) -> Result<()> {
            self.calls.push("init");
            Ok(())
        }

        fn start(&mut self) -> Result<()> {
            self.calls.push("start");
            Ok(())
        }

        fn apply(&mut self, _message: &mut Message) -> Result<()> {
            self.calls.push("apply");
            Ok(())
        }

        fn stop(&mut self) {
            self.calls.push("stop");
        }

        fn close(&mut self) {
            self.calls.push("close");
        }
    }

    #[test]
    fn test_host_call_sequence() {
        let mut svc = Recorder::default();
        let mut msg = Message::from_text("{}");

        svc.init().unwrap();
        svc.start().unwrap();
        svc.apply(&mut msg).unwrap();
        svc.apply(&mut msg).unwrap();
        svc.stop();
        svc.close();

        assert_eq!(
            svc.calls,
            vec!["init", "start", "apply", "apply", "stop", "close"]
        );
    }

    #[test]
    fn test_default_hooks_are_noops() {
        struct Passthrough;
        impl Service for Passthrough {
            fn apply(&mut self, _message: &mut Message) -> Result<()> {
                Ok(())
            }
        }

        let mut svc = Passthrough;
        assert!(svc.init().is_ok());
        assert!(svc.start().is_ok());
        svc.stop();
        svc.close();
    }
}
