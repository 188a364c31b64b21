//! The validate-or-reject decision procedure.
//!
//! Checks run in a fixed order:
//!
//! 1. validation off (no reference shape, or disabled) → skip, body untouched
//! 2. read the payload, preserving it if configured
//! 3. empty payload + body required → reject
//! 4. empty payload + body optional → pass, no value
//! 5. parse as JSON, then match against the derived schema
//!
//! Step 1 must not read the body: a request that validation never looks at
//! keeps its stream intact for downstream, whatever the preserve setting.
//! An absent reference shape wins over an explicitly set `enabled = true`.

use bytes::Bytes;
use jsonschema::Validator;
use serde_json::Value;
use tracing::warn;

use crate::Request;
use crate::body::read_payload;
use crate::config::Config;
use crate::schema::derive_schema;

const MISSING_BODY: &str = "body is missing, but is required";

/// The per-request result of body validation.
///
/// `validated_value` holds the exact bytes that were evaluated against the
/// schema — never a re-encoded form — and is absent when validation was
/// skipped or the body was empty. Violation messages come from the schema
/// matcher verbatim, in the order it reports them.
pub(crate) struct ValidationOutcome {
    pub validated_value: Option<Bytes>,
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    /// Step 1: validation never ran, the body was never read.
    fn skipped() -> Self {
        Self { validated_value: None, is_valid: true, errors: Vec::new() }
    }

    /// Step 4: validation ran, the body was empty but allowed to be.
    fn passed_without_value() -> Self {
        Self { validated_value: None, is_valid: true, errors: Vec::new() }
    }

    fn rejected(validated_value: Option<Bytes>, errors: Vec<String>) -> Self {
        Self { validated_value, is_valid: false, errors }
    }
}

/// Holds the frozen configuration and the schema derived from it.
///
/// Constructed once per middleware instance and shared across concurrent
/// requests; nothing in here mutates after construction.
pub(crate) struct BodyValidator {
    config: Config,
    schema: Option<Validator>,
}

impl BodyValidator {
    pub fn new(config: Config) -> Self {
        let schema = config
            .request_validation
            .reference_shape
            .as_ref()
            .and_then(|shape| {
                derive_schema(shape, config.request_validation.allow_additional_fields)
            });
        Self { config, schema }
    }

    pub async fn validate(&self, req: &mut Request) -> ValidationOutcome {
        let Some(schema) = self.active_schema() else {
            return ValidationOutcome::skipped();
        };

        let payload = match read_payload(req, self.config.preserve_payload).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("request body read failed, treating body as empty: {e}");
                Bytes::new()
            }
        };

        if payload.is_empty() {
            return self.empty_body_outcome();
        }

        check_document(schema, payload)
    }

    /// No shape means no schema means no validation — even when `enabled`
    /// was set explicitly.
    fn active_schema(&self) -> Option<&Validator> {
        self.schema
            .as_ref()
            .filter(|_| self.config.request_validation.enabled)
    }

    fn empty_body_outcome(&self) -> ValidationOutcome {
        if self.config.request_validation.body_required {
            ValidationOutcome::rejected(None, vec![MISSING_BODY.to_owned()])
        } else {
            ValidationOutcome::passed_without_value()
        }
    }
}

fn check_document(schema: &Validator, payload: Bytes) -> ValidationOutcome {
    let document: Value = match serde_json::from_slice(&payload) {
        Ok(value) => value,
        Err(e) => return ValidationOutcome::rejected(Some(payload), vec![e.to_string()]),
    };

    // Matcher messages pass through verbatim and in matcher order.
    let errors: Vec<String> = schema.iter_errors(&document).map(|e| e.to_string()).collect();
    ValidationOutcome {
        is_valid: errors.is_empty(),
        validated_value: Some(payload),
        errors,
    }
}
