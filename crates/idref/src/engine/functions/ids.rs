use crate::consts::FNS;
use crate::engine::ids::{Direction, IdResolver, IdSequence};
use crate::engine::runtime::{Error, ErrorCode, ResolverOptions};
use crate::model::XdmNode;
use crate::xdm::{ExpandedName, XdmAtomicValue, XdmItem, XdmSequence};

/// The identifier functions of the standard function library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdFunction {
    Id,
    ElementWithId,
    IdRef,
}

impl IdFunction {
    pub fn local_name(self) -> &'static str {
        match self {
            IdFunction::Id => "id",
            IdFunction::ElementWithId => "element-with-id",
            IdFunction::IdRef => "idref",
        }
    }

    pub fn qname(self) -> ExpandedName {
        ExpandedName::new(Some(FNS.to_string()), self.local_name())
    }

    pub fn direction(self) -> Direction {
        match self {
            IdFunction::Id | IdFunction::ElementWithId => Direction::Id,
            IdFunction::IdRef => Direction::IdRef,
        }
    }

    /// The one-argument forms read the context item.
    pub fn depends_on_context(arity: usize) -> bool {
        arity == 1
    }
}

/// Coerces one requested value to the string that is split into tokens.
fn token_string<N: XdmNode>(item: &XdmItem<N>) -> Result<String, Error> {
    match item {
        XdmItem::Node(n) => Ok(n.string_value()),
        XdmItem::Atomic(XdmAtomicValue::String(s) | XdmAtomicValue::UntypedAtomic(s) | XdmAtomicValue::AnyUri(s)) => {
            Ok(s.clone())
        }
        XdmItem::Atomic(other) => Err(Error::token_coercion(other.type_name())),
    }
}

fn node_arg<N: XdmNode>(f: IdFunction, items: &XdmSequence<N>) -> Result<N, Error> {
    match items.as_slice() {
        [XdmItem::Node(n)] => Ok(n.clone()),
        _ => Err(Error::from_code(
            ErrorCode::XPTY0004,
            format!("{}: second argument must be a single node", f.local_name()),
        )),
    }
}

fn context_node<N: XdmNode>(f: IdFunction, context_item: Option<&XdmItem<N>>) -> Result<N, Error> {
    match context_item {
        Some(XdmItem::Node(n)) => Ok(n.clone()),
        Some(XdmItem::Atomic(_)) => Err(Error::from_code(
            ErrorCode::XPTY0004,
            format!("{}: context item is not a node", f.local_name()),
        )),
        None => Err(Error::from_code(
            ErrorCode::XPDY0002,
            format!("{}: context item is undefined", f.local_name()),
        )),
    }
}

/// Call surface for `fn:id`, `fn:element-with-id` and `fn:idref`.
///
/// One instance serves one query evaluation; the index metadata gathered by
/// its resolver is shared by all calls made through it.
pub struct IdFunctions<N: XdmNode> {
    resolver: IdResolver<N>,
}

impl<N: XdmNode> Default for IdFunctions<N> {
    fn default() -> Self {
        Self::new(ResolverOptions::default())
    }
}

impl<N: XdmNode> IdFunctions<N> {
    pub fn new(options: ResolverOptions) -> Self {
        Self { resolver: IdResolver::new(options) }
    }

    pub fn resolver(&self) -> &IdResolver<N> {
        &self.resolver
    }

    /// `id($arg [, $node])`
    pub fn id(&mut self, args: &[XdmSequence<N>], context_item: Option<&XdmItem<N>>) -> Result<IdSequence<N>, Error> {
        self.call(IdFunction::Id, args, context_item)
    }

    /// `element-with-id($arg [, $node])`; resolved like `id`.
    pub fn element_with_id(
        &mut self,
        args: &[XdmSequence<N>],
        context_item: Option<&XdmItem<N>>,
    ) -> Result<IdSequence<N>, Error> {
        self.call(IdFunction::ElementWithId, args, context_item)
    }

    /// `idref($arg [, $node])`
    pub fn idref(&mut self, args: &[XdmSequence<N>], context_item: Option<&XdmItem<N>>) -> Result<IdSequence<N>, Error> {
        self.call(IdFunction::IdRef, args, context_item)
    }

    pub fn call(
        &mut self,
        f: IdFunction,
        args: &[XdmSequence<N>],
        context_item: Option<&XdmItem<N>>,
    ) -> Result<IdSequence<N>, Error> {
        let located = |e: Error| e.located(self.resolver.options().location.as_ref());
        let (values, node) = match args {
            [values] => (values, context_node(f, context_item).map_err(located)?),
            [values, node] => (values, node_arg(f, node).map_err(located)?),
            _ => {
                return Err(located(Error::from_code(
                    ErrorCode::XPTY0004,
                    format!("{}: expected 1 or 2 arguments, got {}", f.local_name(), args.len()),
                )));
            }
        };
        self.resolver.resolve(values.iter().map(token_string), &node, f.direction())
    }
}
