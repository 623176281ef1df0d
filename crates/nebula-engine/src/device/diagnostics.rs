use std::sync::{Arc, Mutex, MutexGuard};

/// Collects uncaptured wgpu errors.
///
/// wgpu reports validation failures (bad WGSL, incompatible pipeline layouts)
/// through the device's uncaptured error handler, which panics by default.
/// The sink replaces that handler: every error is logged and kept until the
/// shader compiler/linker drains it to decide whether a step failed.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
    errors: Arc<Mutex<Vec<String>>>,
}

impl DiagnosticSink {
    /// Creates a sink and installs it as `device`'s uncaptured error handler.
    pub fn install(device: &wgpu::Device) -> Self {
        let sink = Self::default();
        let handler_sink = sink.clone();
        device.on_uncaptured_error(Arc::new(move |err: wgpu::Error| {
            log::error!("wgpu error: {err}");
            handler_sink.push(err.to_string());
        }));
        sink
    }

    /// Records a diagnostic.
    pub fn push(&self, message: impl Into<String>) {
        self.lock().push(message.into());
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // A panic while holding the lock cannot leave a Vec<String> half-written.
        self.errors.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_sink() {
        let sink = DiagnosticSink::default();
        sink.push("first");
        sink.push(String::from("second"));
        assert!(!sink.is_empty());
        assert_eq!(sink.drain(), vec!["first".to_string(), "second".to_string()]);
        assert!(sink.is_empty());
    }

    #[test]
    fn clones_share_storage() {
        let sink = DiagnosticSink::default();
        let other = sink.clone();
        other.push("from clone");
        assert_eq!(sink.drain().len(), 1);
    }
}
