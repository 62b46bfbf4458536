/// Namespace bound to the reserved `xml` prefix.
pub const XML_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace of the W3C-defined XPath/XQuery error codes (xqt-errors).
pub const ERR_NS: &str = "http://www.w3.org/2005/xqt-errors";

/// Standard function namespace (`fn:`).
pub const FNS: &str = "http://www.w3.org/2005/xpath-functions";
