#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    pub ns_uri: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(ns_uri: Option<String>, local: impl Into<String>) -> Self {
        Self { ns_uri, local: local.into() }
    }
}

/// Atomic values handed to the id functions by the evaluation layer.
///
/// Only the string-like variants can be coerced to identifier tokens; the
/// others exist so the function surface can reject them with a type error.
#[derive(Debug, Clone, PartialEq)]
pub enum XdmAtomicValue {
    Boolean(bool),
    String(String),
    Integer(i64),
    Decimal(f64),
    Double(f64),
    AnyUri(String),
    UntypedAtomic(String),
}

impl XdmAtomicValue {
    /// Name of the atomic type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            XdmAtomicValue::Boolean(_) => "xs:boolean",
            XdmAtomicValue::String(_) => "xs:string",
            XdmAtomicValue::Integer(_) => "xs:integer",
            XdmAtomicValue::Decimal(_) => "xs:decimal",
            XdmAtomicValue::Double(_) => "xs:double",
            XdmAtomicValue::AnyUri(_) => "xs:anyURI",
            XdmAtomicValue::UntypedAtomic(_) => "xs:untypedAtomic",
        }
    }
}

impl From<&str> for XdmAtomicValue {
    fn from(s: &str) -> Self {
        XdmAtomicValue::String(s.to_string())
    }
}

pub type XdmSequence<N> = Vec<XdmItem<N>>;

#[derive(Debug, Clone, PartialEq)]
pub enum XdmItem<N> {
    Node(N),
    Atomic(XdmAtomicValue),
}

impl<N> From<XdmAtomicValue> for XdmItem<N> {
    fn from(a: XdmAtomicValue) -> Self {
        XdmItem::Atomic(a)
    }
}
