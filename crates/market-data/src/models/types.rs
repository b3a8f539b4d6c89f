use std::borrow::Cow;

/// Provider identifier - mostly static constants
pub type ProviderId = Cow<'static, str>;

/// Data source tag stamped on quotes when no provider produced a value.
pub const DATA_SOURCE_NONE: &str = "none";
