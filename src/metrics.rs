use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("verification_requests_total", "Total number of confirmation requests").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("verification_rate_limited_total", "Requests denied by the attempt limit").unwrap();
    pub static ref EMAILS_SENT: Counter =
        register_counter!("verification_emails_sent_total", "Verification emails handed to the mail provider").unwrap();
    pub static ref DISPATCH_FAILURES: Counter =
        register_counter!("verification_dispatch_failures_total", "Failed link generations or sends").unwrap();
    pub static ref DISPATCH_LATENCY: Histogram = register_histogram!(
        "verification_dispatch_latency_seconds",
        "Link generation plus send latency in seconds"
    )
    .unwrap();
    pub static ref TRACKED_IDENTIFIERS: Gauge =
        register_gauge!("verification_tracked_identifiers", "Email addresses with an attempt record").unwrap();
}
