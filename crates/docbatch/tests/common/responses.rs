//! Canned service responses

use serde_json::{json, Value};

/// Acknowledgement of a submission creating one job per `(job_id, prompt_name)`.
pub fn submit_ack(batch_id: &str, jobs: &[(&str, &str)]) -> Value {
    json!({
        "batch_id": batch_id,
        "total": jobs.len(),
        "jobs": jobs
            .iter()
            .map(|(job_id, prompt_name)| json!({"job_id": job_id, "prompt_name": prompt_name}))
            .collect::<Vec<_>>(),
    })
}

/// Batch status body. Failed jobs carry an error message.
pub fn batch_status(batch_id: &str, status: &str, completed: u32, jobs: &[(&str, &str)]) -> Value {
    json!({
        "batch_id": batch_id,
        "status": status,
        "completed_jobs": completed,
        "total_jobs": jobs.len(),
        "jobs": jobs
            .iter()
            .map(|(job_id, job_status)| {
                let mut job = json!({"job_id": job_id, "status": job_status});
                if *job_status == "failed" {
                    job["error_message"] = json!("model quota exceeded");
                }
                job
            })
            .collect::<Vec<_>>(),
    })
}

/// Finished job detail.
pub fn job_detail(prompt_name: &str, result_text: &str) -> Value {
    json!({
        "status": "finished",
        "total_tokens": 1234,
        "result_text": result_text,
        "prompt_name": prompt_name,
    })
}

/// Active prompt catalogue with the given names.
pub fn active_prompts(names: &[&str]) -> Value {
    Value::Array(
        names
            .iter()
            .map(|name| json!({"prompt_name": name, "is_active": true}))
            .collect(),
    )
}

/// Result listing, newest first.
pub fn result_listing(ids: &[u64]) -> Value {
    Value::Array(ids.iter().map(|id| json!({"id": id})).collect())
}

/// Stored result body.
pub fn stored_result(id: u64, batch_id: &str, status: &str, prompt_name: &str, text: &str) -> Value {
    json!({
        "id": id,
        "batch_id": batch_id,
        "status": status,
        "prompt_name": prompt_name,
        "result_text": text,
    })
}

/// Error body with a plain `detail` message.
pub fn error_detail(message: &str) -> Value {
    json!({"detail": message})
}

/// Validation error body as produced for a malformed request.
pub fn error_validation(field: &str, message: &str) -> Value {
    json!({
        "detail": [{
            "loc": ["body", field],
            "msg": message,
            "type": "missing"
        }]
    })
}
