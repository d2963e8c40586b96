use std::fmt;

/// A request-scoped logger for admission decisions.
///
/// `DecisionLog` is created by [`AdmissionEngine::decide`](crate::AdmissionEngine::decide)
/// for every request and tags each event with the request ID, so all the
/// checks one request went through can be followed in the logs.
///
/// Credentials reach it only as [`Secret`](crate::Secret) values, whose
/// `Debug` and `Display` implementations are redacted.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DecisionLog<'a> {
    request_id: &'a str,
}

impl<'a> DecisionLog<'a> {
    pub(crate) fn new(request_id: &'a str) -> Self {
        Self { request_id }
    }

    pub(crate) fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, "{}", args);
    }

    pub(crate) fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, "{}", args);
    }

    pub(crate) fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(request_id = %self.request_id, "{}", args);
    }

    pub(crate) fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, "{}", args);
    }
}
