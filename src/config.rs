//! Middleware configuration.
//!
//! Built once, frozen, shared for the lifetime of the middleware. Builders
//! replace closure-style options: a later setter call for the same field
//! overrides an earlier one, and anything you don't set keeps its default.
//!
//! | field                     | default |
//! |---------------------------|---------|
//! | `preserve_payload`        | `true`  |
//! | `reference_shape`         | unset   |
//! | `body_required`           | `true`  |
//! | `enabled`                 | `true`  |
//! | `allow_additional_fields` | `true`  |

use crate::schema::ReferenceShape;

/// Top-level middleware configuration.
///
/// ```rust
/// use torii::{Config, FieldKind, ReferenceShape, RequestValidationConfig};
///
/// let config = Config::builder()
///     .preserve_payload(false)
///     .request_validation(
///         RequestValidationConfig::builder()
///             .reference_shape(ReferenceShape::new().field("name", FieldKind::String))
///             .body_required(false)
///             .build(),
///     )
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    pub(crate) preserve_payload: bool,
    pub(crate) request_validation: RequestValidationConfig,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder { config: Config::default() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preserve_payload: true,
            request_validation: RequestValidationConfig::default(),
        }
    }
}

/// Builder for [`Config`].
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Keep the request body re-readable after validation consumed it.
    ///
    /// Defaults to `true`. Set to `false` only when no downstream code
    /// reads the raw body — after validation, the body stream will be
    /// exhausted.
    pub fn preserve_payload(mut self, value: bool) -> Self {
        self.config.preserve_payload = value;
        self
    }

    pub fn request_validation(mut self, value: RequestValidationConfig) -> Self {
        self.config.request_validation = value;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

/// What to validate request bodies against, and how strictly.
#[derive(Clone, Debug)]
pub struct RequestValidationConfig {
    pub(crate) reference_shape: Option<ReferenceShape>,
    pub(crate) body_required: bool,
    pub(crate) enabled: bool,
    pub(crate) allow_additional_fields: bool,
}

impl RequestValidationConfig {
    pub fn builder() -> RequestValidationConfigBuilder {
        RequestValidationConfigBuilder { config: RequestValidationConfig::default() }
    }
}

impl Default for RequestValidationConfig {
    fn default() -> Self {
        Self {
            reference_shape: None,
            body_required: true,
            enabled: true,
            allow_additional_fields: true,
        }
    }
}

/// Builder for [`RequestValidationConfig`].
pub struct RequestValidationConfigBuilder {
    config: RequestValidationConfig,
}

impl RequestValidationConfigBuilder {
    /// The shape request bodies must match. Leaving it unset disables body
    /// validation entirely, regardless of [`enabled`](Self::enabled).
    pub fn reference_shape(mut self, shape: ReferenceShape) -> Self {
        self.config.reference_shape = Some(shape);
        self
    }

    /// Reject requests whose body is missing or empty. Defaults to `true`.
    pub fn body_required(mut self, value: bool) -> Self {
        self.config.body_required = value;
        self
    }

    /// Kill switch. With `false`, requests pass through untouched even
    /// when a reference shape is configured.
    pub fn enabled(mut self, value: bool) -> Self {
        self.config.enabled = value;
        self
    }

    /// Accept fields not named in the reference shape. Defaults to `true`;
    /// set to `false` to reject unknown fields.
    pub fn allow_additional_fields(mut self, value: bool) -> Self {
        self.config.allow_additional_fields = value;
        self
    }

    pub fn build(self) -> RequestValidationConfig {
        self.config
    }
}
