use tokio::sync::watch;

use crate::crypto;
use crate::db;
use crate::state::SharedState;

/// Start a delivery worker pool on a dedicated Tokio runtime with its own
/// thread pool. This runs on a separate OS thread and blocks until shutdown
/// is signaled.
pub fn run_pool(
    state: SharedState,
    shutdown: watch::Receiver<bool>,
    worker_count: usize,
) -> std::thread::JoinHandle<()> {
    std::thread::Builder::new()
        .name("delivery-pool".into())
        .spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(worker_count)
                .thread_name("delivery-worker")
                .enable_all()
                .build()
                .expect("Failed to build worker runtime");

            runtime.block_on(async {
                let mut handles = Vec::with_capacity(worker_count);

                for id in 0..worker_count {
                    handles.push(tokio::spawn(run(id, state.clone(), shutdown.clone())));
                }

                tracing::info!("Webhook delivery pool started ({worker_count} workers)");

                for handle in handles {
                    let _ = handle.await;
                }

                tracing::info!("Webhook delivery pool stopped");
            });
        })
        .expect("Failed to spawn worker pool thread")
}

/// A single worker loop that polls the delivery queue and sends items.
async fn run(id: usize, state: SharedState, mut shutdown: watch::Receiver<bool>) {
    tracing::debug!("Worker {id} started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        match process_next(&state).await {
            Ok(true) => continue,
            Ok(false) => {}
            Err(e) => {
                tracing::error!("Worker {id} error: {e}");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_secs(1)) => {}
            _ = shutdown.changed() => {}
        }
    }

    tracing::debug!("Worker {id} stopped");
}

/// Try to claim and deliver the next queued webhook. Returns true if an item
/// was processed.
async fn process_next(state: &SharedState) -> Result<bool, String> {
    let delivery = db::webhook_deliveries::claim_next(&state.pool)
        .await
        .map_err(|e| format!("Failed to claim delivery: {e}"))?;

    let delivery = match delivery {
        Some(d) => d,
        None => return Ok(false),
    };

    tracing::debug!(
        "Delivering {} (webhook={}, event={}, attempt={})",
        delivery.id,
        delivery.webhook_id,
        delivery.event,
        delivery.attempts
    );

    let webhook = db::webhooks::find_by_id_unscoped(&state.pool, delivery.webhook_id)
        .await
        .map_err(|e| format!("Failed to load webhook: {e}"))?;

    let webhook = match webhook {
        Some(w) => w,
        None => {
            let error = format!("Webhook {} no longer exists", delivery.webhook_id);
            let _ = db::webhook_deliveries::mark_failed(
                &state.pool,
                delivery.id,
                delivery.max_attempts,
                delivery.max_attempts,
                &error,
            )
            .await;
            return Ok(true);
        }
    };

    let secret = match webhook.secret.as_deref() {
        Some(ciphertext) => match crypto::decrypt(ciphertext, &state.config.encryption_key) {
            Ok(secret) => Some(secret),
            Err(e) => {
                tracing::error!("Failed to decrypt secret for webhook {}: {e}", webhook.id);
                None
            }
        },
        None => None,
    };

    let outcome = state
        .dispatcher
        .send(&webhook.url, &delivery.payload, secret.as_deref())
        .await;

    let _ = db::webhooks::record_delivery(&state.pool, webhook.id, outcome.success).await;

    if outcome.success {
        let _ = db::webhook_deliveries::mark_completed(&state.pool, delivery.id).await;
    } else {
        let error = outcome
            .error
            .unwrap_or_else(|| "Unknown delivery error".to_string());
        tracing::warn!(
            "Delivery {} to {} failed (attempt {}/{}): {error}",
            delivery.id,
            webhook.url,
            delivery.attempts,
            delivery.max_attempts
        );
        let _ = db::webhook_deliveries::mark_failed(
            &state.pool,
            delivery.id,
            delivery.attempts,
            delivery.max_attempts,
            &error,
        )
        .await;
    }

    Ok(true)
}
