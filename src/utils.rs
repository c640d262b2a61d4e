use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use backoff::{future::retry, ExponentialBackoff};
use log::warn;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Retry `f` with exponential backoff, giving up after `retry_times` retries.
///
/// `what` names the operation in log lines.
pub async fn retry_wrapper<I, E, F, Fut>(what: &str, retry_times: usize, f: F) -> Result<I, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<I, E>>,
    E: std::fmt::Display,
{
    let cur_times = AtomicUsize::new(0);
    retry(backoff_config(), || async {
        let times = cur_times.fetch_add(1, Ordering::AcqRel) + 1;
        if times > 1 {
            warn!("retrying {what} (attempt {times})");
        }
        f().await
            .map_err(|err| {
                warn!("{what} failed: {err}");
                map_to_backoff_err(err, times, retry_times)
            })
    })
        .await
}

fn map_to_backoff_err<E>(err: E, cur_times: usize, max_retries: usize) -> backoff::Error<E> {
    if cur_times > max_retries {
        backoff::Error::permanent(err)
    } else {
        backoff::Error::transient(err)
    }
}

#[inline]
fn backoff_config() -> ExponentialBackoff {
    ExponentialBackoff {
        initial_interval: Duration::from_millis(500),
        max_interval: Duration::from_millis(4000),
        max_elapsed_time: Some(Duration::from_secs(30)),
        ..Default::default()
    }
}

/// Accept a JSON string or number as a string field.
///
/// Upstream payloads send ids as `12`, `"12"` or `null` depending on the day.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
