use metrics::counter;

/// Counts one store call, labelled `outcome="ok"` or `outcome="error"`.
pub fn record_store_operation<T, E>(operation: &'static str, result: &Result<T, E>) {
    let outcome = if result.is_ok() { "ok" } else { "error" };
    counter!(
        "spot_store_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}
