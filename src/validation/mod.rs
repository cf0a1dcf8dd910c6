use std::borrow::Cow;

/// A single failed check: the message plus the offending parameter name,
/// rendered to clients as `"msg: param"`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub msg: String,
    pub param: String,
}

/// Per-request validation error list. Handlers inspect it before touching the
/// store and fail fast with one aggregated 400 message.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, msg: impl Into<String>, param: impl Into<String>) {
        self.errors.push(FieldError { msg: msg.into(), param: param.into() });
    }

    /// Record an error unless the condition holds.
    pub fn check(&mut self, ok: bool, msg: &str, param: &str) {
        if !ok {
            self.push(msg, param);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// All failures joined as `"msg: param, msg: param"`.
    pub fn joined_message(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.msg, e.param))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Fold in the output of a `validator`-derived body check. Fields are
    /// sorted so the aggregated message is deterministic.
    pub fn extend_from_validator(&mut self, errors: &validator::ValidationErrors) {
        let mut fields: Vec<(&str, &Vec<validator::ValidationError>)> =
            errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        for (field, field_errors) in fields {
            for error in field_errors {
                let msg = error
                    .message
                    .clone()
                    .unwrap_or(Cow::Borrowed("Invalid value"));
                self.push(msg.to_string(), field);
            }
        }
    }
}
