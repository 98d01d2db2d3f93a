//! Utility macros for reducing boilerplate

/// Implement `FromRef<AppState>` so handlers can extract one piece of the
/// shared state directly.
///
/// # Example
/// ```ignore
/// impl_from_ref!(TaskStore, tasks);
/// // Expands to:
/// impl axum::extract::FromRef<AppState> for TaskStore {
///     fn from_ref(state: &AppState) -> Self {
///         state.tasks.clone()
///     }
/// }
/// ```
#[macro_export]
macro_rules! impl_from_ref {
    ($type:ty, $field:ident) => {
        impl axum::extract::FromRef<$crate::state::AppState> for $type {
            fn from_ref(state: &$crate::state::AppState) -> Self {
                state.$field.clone()
            }
        }
    };
}

/// Serve `$fallback` when `$items` is empty, counting the substitution.
///
/// Evaluates to `$items` or the fallback.
#[macro_export]
macro_rules! or_fallback {
    ($items:expr, $resource:literal, $fallback:expr) => {{
        let items = $items;
        if items.is_empty() {
            $crate::telemetry::metrics::fallback_served($resource);
            $fallback
        } else {
            items
        }
    }};
}
