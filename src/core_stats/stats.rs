use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Server wide counters, shared by every session.
#[derive(Debug)]
pub struct FtpStatistics {
    start_time: DateTime<Local>,
    uploads: AtomicU64,
    downloads: AtomicU64,
    deletes: AtomicU64,
    directories_created: AtomicU64,
    directories_removed: AtomicU64,
    bytes_uploaded: AtomicU64,
    bytes_downloaded: AtomicU64,
    current_logins: AtomicU64,
    total_logins: AtomicU64,
    current_anonymous_logins: AtomicU64,
    total_anonymous_logins: AtomicU64,
    failed_logins: AtomicU64,
    current_connections: AtomicU64,
    total_connections: AtomicU64,
}

/// Point in time copy of [`FtpStatistics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticsSnapshot {
    pub start_time: DateTime<Local>,
    pub uploads: u64,
    pub downloads: u64,
    pub deletes: u64,
    pub directories_created: u64,
    pub directories_removed: u64,
    pub bytes_uploaded: u64,
    pub bytes_downloaded: u64,
    pub current_logins: u64,
    pub total_logins: u64,
    pub current_anonymous_logins: u64,
    pub total_anonymous_logins: u64,
    pub failed_logins: u64,
    pub current_connections: u64,
    pub total_connections: u64,
}

impl Default for FtpStatistics {
    fn default() -> Self {
        Self::new()
    }
}

fn decrement(counter: &AtomicU64) {
    // Saturate at zero if a close is reported without a matching open.
    let _ = counter.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| v.checked_sub(1));
}

impl FtpStatistics {
    pub fn new() -> Self {
        Self {
            start_time: Local::now(),
            uploads: AtomicU64::new(0),
            downloads: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            directories_created: AtomicU64::new(0),
            directories_removed: AtomicU64::new(0),
            bytes_uploaded: AtomicU64::new(0),
            bytes_downloaded: AtomicU64::new(0),
            current_logins: AtomicU64::new(0),
            total_logins: AtomicU64::new(0),
            current_anonymous_logins: AtomicU64::new(0),
            total_anonymous_logins: AtomicU64::new(0),
            failed_logins: AtomicU64::new(0),
            current_connections: AtomicU64::new(0),
            total_connections: AtomicU64::new(0),
        }
    }

    pub fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    pub fn set_upload(&self, bytes: u64) {
        self.uploads.fetch_add(1, Ordering::Relaxed);
        self.bytes_uploaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn set_download(&self, bytes: u64) {
        self.downloads.fetch_add(1, Ordering::Relaxed);
        self.bytes_downloaded.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn set_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_mkdir(&self) {
        self.directories_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_rmdir(&self) {
        self.directories_removed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_login(&self, anonymous: bool) {
        self.current_logins.fetch_add(1, Ordering::Relaxed);
        self.total_logins.fetch_add(1, Ordering::Relaxed);
        if anonymous {
            self.current_anonymous_logins.fetch_add(1, Ordering::Relaxed);
            self.total_anonymous_logins.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn set_logout(&self, anonymous: bool) {
        decrement(&self.current_logins);
        if anonymous {
            decrement(&self.current_anonymous_logins);
        }
    }

    pub fn set_login_fail(&self) {
        self.failed_logins.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_open_connection(&self) {
        self.current_connections.fetch_add(1, Ordering::Relaxed);
        self.total_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_close_connection(&self) {
        decrement(&self.current_connections);
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            start_time: self.start_time,
            uploads: self.uploads.load(Ordering::Relaxed),
            downloads: self.downloads.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            directories_created: self.directories_created.load(Ordering::Relaxed),
            directories_removed: self.directories_removed.load(Ordering::Relaxed),
            bytes_uploaded: self.bytes_uploaded.load(Ordering::Relaxed),
            bytes_downloaded: self.bytes_downloaded.load(Ordering::Relaxed),
            current_logins: self.current_logins.load(Ordering::Relaxed),
            total_logins: self.total_logins.load(Ordering::Relaxed),
            current_anonymous_logins: self.current_anonymous_logins.load(Ordering::Relaxed),
            total_anonymous_logins: self.total_anonymous_logins.load(Ordering::Relaxed),
            failed_logins: self.failed_logins.load(Ordering::Relaxed),
            current_connections: self.current_connections.load(Ordering::Relaxed),
            total_connections: self.total_connections.load(Ordering::Relaxed),
        }
    }
}

impl StatisticsSnapshot {
    /// One line summary for the log.
    pub fn format_stats(&self) -> String {
        format!(
            "up since {}: {} connection(s), {} login(s) ({} failed), {} upload(s) {} bytes, {} download(s) {} bytes, {} delete(s)",
            self.start_time.format("%Y-%m-%d %H:%M:%S"),
            self.total_connections,
            self.total_logins,
            self.failed_logins,
            self.uploads,
            self.bytes_uploaded,
            self.downloads,
            self.bytes_downloaded,
            self.deletes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = FtpStatistics::new();
        stats.set_open_connection();
        stats.set_login(true);
        stats.set_upload(10);
        stats.set_upload(5);
        stats.set_download(7);
        stats.set_delete();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.uploads, 2);
        assert_eq!(snapshot.bytes_uploaded, 15);
        assert_eq!(snapshot.downloads, 1);
        assert_eq!(snapshot.deletes, 1);
        assert_eq!(snapshot.current_anonymous_logins, 1);

        stats.set_logout(true);
        stats.set_close_connection();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.current_logins, 0);
        assert_eq!(snapshot.total_logins, 1);
        assert_eq!(snapshot.current_connections, 0);
        assert_eq!(snapshot.total_connections, 1);
    }

    #[test]
    fn test_close_without_open_saturates() {
        let stats = FtpStatistics::new();
        stats.set_close_connection();
        stats.set_logout(false);
        assert_eq!(stats.snapshot().current_connections, 0);
        assert_eq!(stats.snapshot().current_logins, 0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let stats = FtpStatistics::new();
        stats.set_mkdir();
        let text = toml::to_string(&stats.snapshot()).unwrap();
        assert!(text.contains("directories_created = 1"));
        assert!(stats.snapshot().format_stats().contains("0 upload(s)"));
    }
}
