//! Backend availability detection.

use super::{Backend, BackendSet};
use crate::host::HostProbe;

/// Determines which backends the host can use.
pub struct BackendDetector<'a> {
    host: &'a dyn HostProbe,
}

impl<'a> BackendDetector<'a> {
    pub fn new(host: &'a dyn HostProbe) -> Self {
        Self { host }
    }

    /// Whether every launcher of a backend is on the PATH.
    pub fn is_available(&self, backend: Backend) -> bool {
        backend
            .launchers()
            .iter()
            .all(|launcher| self.host.find_binary(launcher).is_some())
    }

    /// Probe every backend, dropping the disabled ones.
    pub fn detect(&self, disabled: &[Backend]) -> BackendSet {
        let detected: BackendSet = Backend::ALL
            .iter()
            .copied()
            .filter(|b| !disabled.contains(b))
            .filter(|b| self.is_available(*b))
            .collect();

        tracing::debug!(
            "available backends: {}",
            detected
                .iter()
                .map(|b| b.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        detected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockHost;

    #[test]
    fn empty_host_has_no_backends() {
        let host = MockHost::new();
        assert!(BackendDetector::new(&host).detect(&[]).is_empty());
    }

    #[test]
    fn apt_needs_both_launchers() {
        let host = MockHost::new().with_binary("apt-get", None);
        let detector = BackendDetector::new(&host);
        assert!(!detector.is_available(Backend::Apt));

        let host = MockHost::new()
            .with_binary("apt-get", None)
            .with_binary("dpkg", None);
        assert!(BackendDetector::new(&host).is_available(Backend::Apt));
    }

    #[test]
    fn detects_several_backends() {
        let host = MockHost::new()
            .with_binary("cargo", None)
            .with_binary("sh", None)
            .with_binary("curl", None);
        let set = BackendDetector::new(&host).detect(&[]);
        assert!(set.contains(Backend::Cargo));
        assert!(set.contains(Backend::Script));
        assert!(set.contains(Backend::CurlScript));
        assert!(!set.contains(Backend::Npm));
    }

    #[test]
    fn disabled_backends_are_removed() {
        let host = MockHost::new()
            .with_binary("cargo", None)
            .with_binary("sh", None);
        let set = BackendDetector::new(&host).detect(&[Backend::Script]);
        assert!(set.contains(Backend::Cargo));
        assert!(!set.contains(Backend::Script));
    }
}
