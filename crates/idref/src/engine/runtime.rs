use crate::consts::ERR_NS;
use crate::engine::location::Location;
use crate::xdm::ExpandedName;
use core::fmt;
use std::sync::Arc;

/// Error codes raised while resolving identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    FODC0001, // root of the context node is not a document node
    FOER0000, // generic error, e.g. reported by an index backend
    XPTY0004, // type error (token coercion, wrong argument kind)
    XPDY0002, // context item undefined
    // Fallback / unknown (kept last)
    Unknown,
}

impl ErrorCode {
    /// Returns the QName for this code in the xqt-errors namespace.
    pub fn qname(&self) -> ExpandedName {
        ExpandedName {
            ns_uri: Some(ERR_NS.to_string()),
            local: self.local().to_string(),
        }
    }

    fn local(self) -> &'static str {
        match self {
            ErrorCode::FODC0001 => "FODC0001",
            ErrorCode::FOER0000 => "FOER0000",
            ErrorCode::XPTY0004 => "XPTY0004",
            ErrorCode::XPDY0002 => "XPDY0002",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }

    pub fn from_code(s: &str) -> Self {
        match s {
            "err:FODC0001" => ErrorCode::FODC0001,
            "err:FOER0000" => ErrorCode::FOER0000,
            "err:XPTY0004" => ErrorCode::XPTY0004,
            "err:XPDY0002" => ErrorCode::XPDY0002,
            _ => ErrorCode::Unknown,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "err:{}", self.local())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>, // optional chained cause
    pub location: Option<Location>,
}

impl Error {
    pub fn from_code(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            message: msg.into(),
            source: None,
            location: None,
        }
    }

    /// The context node's root is not a document node.
    pub fn root_not_document() -> Self {
        Self::from_code(ErrorCode::FODC0001, "root of the context node is not a document node")
    }

    /// A requested value could not be coerced to an identifier token.
    pub fn token_coercion(type_name: &str) -> Self {
        Self::from_code(
            ErrorCode::XPTY0004,
            format!("cannot use {type_name} as an identifier token"),
        )
    }

    /// Compose an error with a source cause.
    pub fn with_source(
        mut self,
        source: impl Into<Option<Arc<dyn std::error::Error + Send + Sync>>>,
    ) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Attaches `location` unless the error already carries one.
    pub(crate) fn located(mut self, location: Option<&Location>) -> Self {
        if self.location.is_none() {
            self.location = location.cloned();
        }
        self
    }

    pub fn is_root_not_document(&self) -> bool {
        self.code == ErrorCode::FODC0001
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(f, "error at {loc}: {} ({})", self.message, self.code),
            None => write!(f, "error: {} ({})", self.message, self.code),
        }
    }
}

/// How the resolver picks between index lookups and sequential scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyPreference {
    /// Use an index whenever the document has one carrying id-like attribute names.
    #[default]
    Auto,
    /// Always scan; indexes and their metadata are never consulted.
    ScanOnly,
}

#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    pub location: Option<Location>,
    pub strategy: StrategyPreference,
}

/// Builder for `ResolverOptions`.
pub struct ResolverOptionsBuilder {
    opts: ResolverOptions,
}

impl Default for ResolverOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverOptionsBuilder {
    pub fn new() -> Self {
        Self { opts: ResolverOptions::default() }
    }

    /// Location of the calling expression, attached to every error the resolver reports.
    pub fn with_location(mut self, location: Location) -> Self {
        self.opts.location = Some(location);
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyPreference) -> Self {
        self.opts.strategy = strategy;
        self
    }

    pub fn build(self) -> ResolverOptions {
        self.opts
    }
}
